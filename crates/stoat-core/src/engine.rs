use std::fmt;

use crate::desc::MemDesc;
use crate::error::Result;
use crate::primitive::{InnerProductImplFn, ReorderImplFn};
use crate::stream::KernelHandle;

// Engine — One compute device/backend context hosting primitives
//
// WHY A TRAIT AND NOT AN ENUM?
//
// New engines live in their own crates (stoat-gpu today, others later)
// without this crate enumerating them. What the mechanism needs from an
// engine is deliberately small: its kind, a kernel-registry lookup, and
// the ordered implementation list for each operation.
//
// Implementation lists are 'static const data built at compile time and
// never mutated, so arbitrarily many threads may resolve against the same
// engine concurrently without locking.

/// Kind of compute device an engine represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Cpu,
    Gpu,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineKind::Cpu => "cpu",
            EngineKind::Gpu => "gpu",
        };
        write!(f, "{}", s)
    }
}

/// A compute device/backend context capable of hosting primitives.
pub trait Engine: fmt::Debug + Send + Sync {
    /// The device kind candidates probe before anything else.
    fn kind(&self) -> EngineKind;

    /// A human-readable name for this engine (e.g., "gpu:0").
    fn name(&self) -> String;

    /// Look up a compiled kernel by name in the engine's registry.
    /// Compilation itself happens when the backend constructs the engine.
    fn kernel(&self, name: &str) -> Result<KernelHandle>;

    /// Ordered candidate list for reorder between `src` and `dst`.
    /// The descriptors let an engine swap lists per layout pair; engines
    /// with a single policy ignore them.
    fn reorder_impl_list(&self, src: &MemDesc, dst: &MemDesc) -> &[ReorderImplFn];

    /// Ordered candidate list for inner product.
    fn inner_product_impl_list(&self) -> &[InnerProductImplFn];
}
