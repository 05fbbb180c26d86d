use crate::dtype::DType;
use crate::exec::ArgId;
use crate::op::OpKind;

/// All errors that can occur during primitive resolution and dispatch.
///
/// The taxonomy is shared across engines rather than invented per backend.
/// Two failure classes matter for the resolution walk and must never be
/// confused:
///
/// - [`Error::Unsupported`] — every candidate in an implementation list
///   declined. Terminal for that resolution request, but not a caller bug.
/// - [`Error::InvalidArguments`] (and the structured variants below it) —
///   the caller handed a candidate internally inconsistent input. This
///   aborts the walk immediately; it is never treated as "try the next
///   candidate".
///
/// A candidate that merely cannot serve a request does not produce an error
/// at all; it returns [`crate::Candidacy::Declined`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Every candidate in the implementation list declined.
    #[error("no implementation for {op} on engine {engine}")]
    Unsupported { op: OpKind, engine: String },

    /// Internally inconsistent caller input. Propagates immediately.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Rank mismatch between operand descriptors.
    #[error("rank mismatch: expected rank {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },

    /// Dimension mismatch between operand descriptors.
    #[error("dim mismatch ({context}): {left} vs {right}")]
    DimMismatch {
        context: &'static str,
        left: usize,
        right: usize,
    },

    /// DType mismatch between operand descriptors.
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch { expected: DType, got: DType },

    /// Dimension index out of range for a descriptor's rank.
    #[error("dimension out of range: dim {dim} for rank {rank}")]
    DimOutOfRange { dim: usize, rank: usize },

    /// No storage bound to an operand role in the execution context.
    #[error("no storage bound for argument {0:?}")]
    MissingArgument(ArgId),

    /// Kernel name not present in the engine's registry.
    #[error("kernel '{0}' not found in engine registry")]
    KernelNotFound(String),

    /// The compute stream reported a submission failure. Propagated
    /// verbatim; this core performs no retries and no interpretation.
    #[error("enqueue failed: {0}")]
    Enqueue(String),

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    /// Create an invalid-arguments error from a message.
    pub fn invalid_args(s: impl Into<String>) -> Self {
        Error::InvalidArguments(s.into())
    }

    /// Whether this is the terminal "every candidate declined" condition.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported { .. })
    }
}

/// Convenience Result type used throughout Stoat.
pub type Result<T> = std::result::Result<T, Error>;

/// Macro for early return with a formatted error message.
/// Usage: `bail!("something went wrong: {}", detail)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($($arg)*)))
    };
}
