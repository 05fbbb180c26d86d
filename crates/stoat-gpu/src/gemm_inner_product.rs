use stoat_core::{
    ArgId, Attr, Candidacy, DType, Engine, EngineKind, ExecCtx, InnerProductDesc, KernelArgList,
    KernelHandle, NdRange, OpKind, Primitive, PrimitiveDesc, PropKind, Result, StorageHandle,
};

use crate::inner_product::IpConf;

// Gemm inner product — device gemm-library path
//
// The f32 forward pass with no spatial extents is exactly a gemm, and the
// device's matrix library beats a one-thread-per-output reference kernel
// for it. This candidate accepts only the shapes the library serves
// directly and declines everything else; it sits in front of the reference
// candidate in the engine's list, which is the entire priority policy.

/// Primitive descriptor for the library-backed inner product.
#[derive(Debug)]
pub struct GemmInnerProductPd {
    conf: IpConf,
}

impl GemmInnerProductPd {
    pub fn create(engine: &dyn Engine, desc: &InnerProductDesc, attr: &Attr) -> Result<Candidacy> {
        if engine.kind() != EngineKind::Gpu {
            return Candidacy::declined();
        }
        if desc.prop() != PropKind::Forward {
            return Candidacy::declined();
        }
        let all_f32 = desc.src().dtype() == DType::F32
            && desc.weights().dtype() == DType::F32
            && desc.dst().dtype() == DType::F32
            && desc.bias().map_or(true, |b| b.dtype() == DType::F32);
        if !all_f32 {
            return Candidacy::declined();
        }
        if desc.src().tag().is_any() || desc.weights().tag().is_any() || desc.dst().tag().is_any()
        {
            return Candidacy::declined();
        }
        // Spatial inner products fall back to the reference kernel.
        if desc.id() * desc.ih() * desc.iw() != 1 {
            return Candidacy::declined();
        }
        // The library fuses nothing.
        if !attr.is_default() {
            return Candidacy::declined();
        }
        Candidacy::accepted(GemmInnerProductPd {
            conf: IpConf::from_desc(desc),
        })
    }

    pub fn conf(&self) -> &IpConf {
        &self.conf
    }
}

impl PrimitiveDesc for GemmInnerProductPd {
    fn op_kind(&self) -> OpKind {
        OpKind::InnerProduct
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::Gpu
    }

    fn impl_name(&self) -> &'static str {
        "gpu:gemm"
    }

    fn create_primitive(&self, engine: &dyn Engine) -> Result<Box<dyn Primitive>> {
        let kernel = engine.kernel("gemm_inner_product_fwd_f32")?;
        Ok(Box::new(GemmInnerProduct {
            kernel,
            conf: self.conf,
        }))
    }
}

/// Executor: submits the library kernel over an (mb, oc) grid.
struct GemmInnerProduct {
    kernel: KernelHandle,
    conf: IpConf,
}

impl Primitive for GemmInnerProduct {
    fn execute(&self, ctx: &ExecCtx<'_>) -> Result<()> {
        let src = ctx.storage(ArgId::Src)?;
        let weights = ctx.storage(ArgId::Weights)?;
        let bias = if self.conf.with_bias {
            ctx.storage(ArgId::Bias)?
        } else {
            StorageHandle::null()
        };
        let dst = ctx.storage(ArgId::Dst)?;

        let mut args = KernelArgList::new();
        args.set(0, src);
        args.set(1, weights);
        args.set(2, bias);
        args.set(3, dst);

        let range = NdRange::new(&[self.conf.mb, self.conf.oc])?;
        ctx.stream().parallel_for(&range, &self.kernel, &args)
    }
}
