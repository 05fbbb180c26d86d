use std::fmt;

use crate::dtype::DType;
use crate::error::{Error, Result};

// MemDesc — Backend-agnostic operand descriptor
//
// A MemDesc describes one tensor operand of an operation: its logical
// extents, its element type, and a physical layout tag. It deliberately
// carries no storage: implementation candidates probe descriptors long
// before any device memory is bound.
//
// Descriptors are immutable values. Candidates reference them, never
// mutate them, and a resolved primitive descriptor copies whatever launch
// parameters it derives from them.

/// Physical memory layout tag for an operand.
///
/// `Any` means the caller lets the implementation pick; concrete tags name
/// a fixed dimension ordering. The tag set is closed and small on purpose:
/// the dispatch mechanism only compares tags, it never interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutTag {
    /// Placeholder: layout not yet chosen.
    Any,
    /// Plain 1-D contiguous data.
    X,
    /// 2-D batch x channels.
    Nc,
    /// 2-D weights, output-major.
    Oi,
    /// 2-D weights, input-major.
    Io,
    /// 4-D weights.
    Oihw,
    /// 4-D activations, channels-first.
    Nchw,
    /// 4-D activations, channels-last.
    Nhwc,
}

impl LayoutTag {
    /// Whether this is the `Any` placeholder rather than a concrete layout.
    pub fn is_any(&self) -> bool {
        matches!(self, LayoutTag::Any)
    }
}

impl fmt::Display for LayoutTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LayoutTag::Any => "any",
            LayoutTag::X => "x",
            LayoutTag::Nc => "nc",
            LayoutTag::Oi => "oi",
            LayoutTag::Io => "io",
            LayoutTag::Oihw => "oihw",
            LayoutTag::Nchw => "nchw",
            LayoutTag::Nhwc => "nhwc",
        };
        write!(f, "{}", s)
    }
}

/// Maximum supported descriptor rank.
pub const MAX_RANK: usize = 12;

/// Immutable description of one tensor operand: extents, element type,
/// and physical layout tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemDesc {
    dims: Vec<usize>,
    dtype: DType,
    tag: LayoutTag,
}

impl MemDesc {
    /// Create a descriptor. Rank must be between 1 and [`MAX_RANK`].
    pub fn new(dims: impl Into<Vec<usize>>, dtype: DType, tag: LayoutTag) -> Result<Self> {
        let dims = dims.into();
        if dims.is_empty() || dims.len() > MAX_RANK {
            return Err(Error::invalid_args(format!(
                "descriptor rank must be 1..={}, got {}",
                MAX_RANK,
                dims.len()
            )));
        }
        Ok(MemDesc { dims, dtype, tag })
    }

    /// The extents as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Size of a specific dimension.
    pub fn dim(&self, d: usize) -> Result<usize> {
        self.dims.get(d).copied().ok_or(Error::DimOutOfRange {
            dim: d,
            rank: self.rank(),
        })
    }

    /// Total number of elements (product of all extents).
    pub fn elem_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// The element type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// The physical layout tag.
    pub fn tag(&self) -> LayoutTag {
        self.tag
    }
}

impl fmt::Display for MemDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}:{}", self.dims, self.dtype, self.tag)
    }
}
