use std::collections::HashMap;

use crate::args::StorageHandle;
use crate::error::{Error, Result};
use crate::stream::ComputeStream;

// ExecCtx — Live storage bindings for one primitive execution
//
// A primitive descriptor is resolved against abstract operand descriptors;
// actual device buffers only appear at execution time, bound by role. The
// context is supplied fresh per call, which is what makes one immutable
// primitive safely shareable across concurrent executions.

/// Operand roles a storage can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgId {
    Src,
    Weights,
    Bias,
    Dst,
    DiffSrc,
    DiffDst,
    DiffWeights,
    DiffBias,
    From,
    To,
}

/// Execution context: the compute stream to submit on plus the storages
/// bound to each operand role.
pub struct ExecCtx<'a> {
    stream: &'a dyn ComputeStream,
    args: HashMap<ArgId, StorageHandle>,
}

impl<'a> ExecCtx<'a> {
    pub fn new(stream: &'a dyn ComputeStream) -> Self {
        ExecCtx {
            stream,
            args: HashMap::new(),
        }
    }

    /// Bind a storage to a role (builder style).
    pub fn with_arg(mut self, id: ArgId, storage: StorageHandle) -> Self {
        self.args.insert(id, storage);
        self
    }

    /// Bind a storage to a role.
    pub fn bind(&mut self, id: ArgId, storage: StorageHandle) {
        self.args.insert(id, storage);
    }

    /// The storage bound to `id`. Missing bindings are caller error.
    pub fn storage(&self, id: ArgId) -> Result<StorageHandle> {
        self.args
            .get(&id)
            .copied()
            .ok_or(Error::MissingArgument(id))
    }

    /// The storage bound to `id`, or the null storage when the role is
    /// intentionally unbound (e.g. an absent bias).
    pub fn storage_or_null(&self, id: ArgId) -> StorageHandle {
        self.args.get(&id).copied().unwrap_or(StorageHandle::null())
    }

    pub fn stream(&self) -> &dyn ComputeStream {
        self.stream
    }
}
