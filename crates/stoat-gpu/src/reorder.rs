use stoat_core::{
    ArgId, Attr, Candidacy, DType, Engine, EngineKind, ExecCtx, KernelArgList, KernelHandle,
    LayoutTag, NdRange, OpKind, Primitive, PrimitiveDesc, ReorderDesc, Result,
};

// Reorder — layout conversion between two operand descriptors
//
// Two candidates, walked in the order the engine's list gives them:
//
//   vendor  — the device library's direct reorder. Fast, but only for the
//             layout/type pairs the library ships.
//   generic — the portable fallback kernel. Serves any structurally valid
//             pair with concrete layouts.
//
// Which one sits first is list data owned by the engine, not a rule baked
// into either candidate.

fn reorder_post_ops_supported(attr: &Attr) -> bool {
    // Reorder fuses no elementwise/sum post-ops; output scaling is fine.
    !attr.has_eltwise() && !attr.has_sum()
}

// Vendor reorder

/// Layout pairs the device library converts directly.
fn vendor_supported_pair(src: LayoutTag, dst: LayoutTag) -> bool {
    use LayoutTag::*;
    matches!(
        (src, dst),
        (Nchw, Nhwc) | (Nhwc, Nchw) | (Oi, Io) | (Io, Oi) | (X, X) | (Nc, Nc) | (Nchw, Nchw)
            | (Nhwc, Nhwc)
    )
}

/// Primitive descriptor for the device-library reorder.
#[derive(Debug)]
pub struct VendorReorderPd {
    nelems: usize,
    scale: f32,
}

impl VendorReorderPd {
    pub fn create(engine: &dyn Engine, desc: &ReorderDesc, attr: &Attr) -> Result<Candidacy> {
        if engine.kind() != EngineKind::Gpu {
            return Candidacy::declined();
        }
        let (src, dst) = (desc.src(), desc.dst());
        if src.tag().is_any() || dst.tag().is_any() {
            return Candidacy::declined();
        }
        // The library converts layout only, never element type, and has no
        // bf16 kernels.
        if src.dtype() != dst.dtype() || src.dtype() == DType::BF16 {
            return Candidacy::declined();
        }
        if src.rank() > 4 {
            return Candidacy::declined();
        }
        if !vendor_supported_pair(src.tag(), dst.tag()) {
            return Candidacy::declined();
        }
        if !reorder_post_ops_supported(attr) {
            return Candidacy::declined();
        }
        Candidacy::accepted(VendorReorderPd {
            nelems: src.elem_count(),
            scale: attr.output_scale(),
        })
    }
}

impl PrimitiveDesc for VendorReorderPd {
    fn op_kind(&self) -> OpKind {
        OpKind::Reorder
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::Gpu
    }

    fn impl_name(&self) -> &'static str {
        "gpu:vendor"
    }

    fn create_primitive(&self, engine: &dyn Engine) -> Result<Box<dyn Primitive>> {
        let kernel = engine.kernel("vendor_reorder")?;
        Ok(Box::new(ReorderExec {
            kernel,
            nelems: self.nelems,
            scale: self.scale,
        }))
    }
}

// Generic reorder

/// Primitive descriptor for the portable fallback reorder.
#[derive(Debug)]
pub struct GenericReorderPd {
    nelems: usize,
    scale: f32,
}

impl GenericReorderPd {
    pub fn create(engine: &dyn Engine, desc: &ReorderDesc, attr: &Attr) -> Result<Candidacy> {
        if engine.kind() != EngineKind::Gpu {
            return Candidacy::declined();
        }
        if desc.src().tag().is_any() || desc.dst().tag().is_any() {
            return Candidacy::declined();
        }
        if !reorder_post_ops_supported(attr) {
            return Candidacy::declined();
        }
        Candidacy::accepted(GenericReorderPd {
            nelems: desc.src().elem_count(),
            scale: attr.output_scale(),
        })
    }
}

impl PrimitiveDesc for GenericReorderPd {
    fn op_kind(&self) -> OpKind {
        OpKind::Reorder
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::Gpu
    }

    fn impl_name(&self) -> &'static str {
        "gpu:generic:any"
    }

    fn create_primitive(&self, engine: &dyn Engine) -> Result<Box<dyn Primitive>> {
        let kernel = engine.kernel("generic_reorder")?;
        Ok(Box::new(ReorderExec {
            kernel,
            nelems: self.nelems,
            scale: self.scale,
        }))
    }
}

// Shared executor
//
// Both descriptors launch the same way: one work item per element,
// arguments 0 src, 1 dst, 2 output scale. Only the kernel differs.

struct ReorderExec {
    kernel: KernelHandle,
    nelems: usize,
    scale: f32,
}

impl Primitive for ReorderExec {
    fn execute(&self, ctx: &ExecCtx<'_>) -> Result<()> {
        let src = ctx.storage(ArgId::From)?;
        let dst = ctx.storage(ArgId::To)?;

        let mut args = KernelArgList::new();
        args.set(0, src);
        args.set(1, dst);
        args.set(2, self.scale);

        let range = NdRange::from(self.nelems);
        ctx.stream().parallel_for(&range, &self.kernel, &args)
    }
}
