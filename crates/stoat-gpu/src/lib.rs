//! # stoat-gpu
//!
//! GPU engine for Stoat: the implementation lists and the primitives
//! behind them.
//!
//! ARCHITECTURE:
//! - [`GpuEngine`] implements the `Engine` trait. Its kernel registry is
//!   populated from [`kernels::KERNEL_NAMES`] at construction; compiling
//!   and loading the kernels is the device layer's concern.
//! - Implementation lists are const fn-pointer arrays, one per operation.
//!   Their content and order ARE the backend's priority policy: the
//!   resolution walk in stoat-core stays order-agnostic.
//! - Reorder prefers the vendor library and falls back to the portable
//!   kernel; inner product prefers the gemm library for the shapes it
//!   serves and falls back to the type-specialized reference kernels.
//!
//! USAGE:
//!   let engine = GpuEngine::new(0);
//!   let pd = stoat_core::inner_product(&engine, &desc, &attr)?;
//!   let prim = pd.create_primitive(&engine)?;
//!   prim.execute(&ctx)?;

pub mod gemm_inner_product;
pub mod inner_product;
pub mod kernels;
pub mod reorder;

use std::collections::HashMap;
use std::fmt;

use stoat_core::{
    Engine, EngineKind, Error, InnerProductImplFn, KernelHandle, MemDesc, ReorderImplFn, Result,
};

pub use gemm_inner_product::GemmInnerProductPd;
pub use inner_product::{IpConf, IpTypeTag, RefInnerProductPd};
pub use reorder::{GenericReorderPd, VendorReorderPd};

// Implementation lists — the priority policy, as data

const REORDER_IMPL_LIST: &[ReorderImplFn] =
    &[VendorReorderPd::create, GenericReorderPd::create];

const INNER_PRODUCT_IMPL_LIST: &[InnerProductImplFn] =
    &[GemmInnerProductPd::create, RefInnerProductPd::create];

// GpuEngine

/// A GPU engine hosting the candidate lists above.
pub struct GpuEngine {
    ordinal: usize,
    registry: HashMap<&'static str, KernelHandle>,
}

impl GpuEngine {
    /// Create the engine for the given device ordinal and populate its
    /// kernel registry.
    pub fn new(ordinal: usize) -> Self {
        let registry = kernels::KERNEL_NAMES
            .iter()
            .enumerate()
            .map(|(i, &name)| (name, KernelHandle::new(name, i as u64 + 1)))
            .collect();
        GpuEngine { ordinal, registry }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

impl fmt::Debug for GpuEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GpuEngine(gpu:{})", self.ordinal)
    }
}

impl Engine for GpuEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Gpu
    }

    fn name(&self) -> String {
        format!("gpu:{}", self.ordinal)
    }

    fn kernel(&self, name: &str) -> Result<KernelHandle> {
        self.registry
            .get(name)
            .cloned()
            .ok_or_else(|| Error::KernelNotFound(name.to_string()))
    }

    fn reorder_impl_list(&self, _src: &MemDesc, _dst: &MemDesc) -> &[ReorderImplFn] {
        REORDER_IMPL_LIST
    }

    fn inner_product_impl_list(&self) -> &[InnerProductImplFn] {
        INNER_PRODUCT_IMPL_LIST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_serves_every_known_kernel() {
        let engine = GpuEngine::new(0);
        for name in kernels::KERNEL_NAMES {
            let handle = engine.kernel(name).unwrap();
            assert_eq!(handle.name(), *name);
        }
        assert!(matches!(
            engine.kernel("no_such_kernel"),
            Err(Error::KernelNotFound(_))
        ));
    }

    #[test]
    fn test_engine_identity() {
        let engine = GpuEngine::new(2);
        assert_eq!(engine.kind(), EngineKind::Gpu);
        assert_eq!(engine.name(), "gpu:2");
    }
}
