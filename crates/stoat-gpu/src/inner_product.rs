use std::marker::PhantomData;

use half::{bf16, f16};

use stoat_core::{
    Attr, Candidacy, DType, Element, Engine, EngineKind, ExecCtx, InnerProductDesc, KernelArgList,
    KernelHandle, NdRange, OpKind, Primitive, PrimitiveDesc, PropKind, Result,
};
use stoat_core::{ArgId, Error, StorageHandle};

// Reference inner product — portable GPU implementation
//
// One control-flow template per direction, written generically over the
// element types and instantiated once per supported type combination. The
// combination is picked when the primitive descriptor is created; the
// execution hot path contains no type switch of any kind.
//
// Kernel bodies live in the device layer. What this module owns is the
// launch contract: the positional argument order each kernel expects and
// the iteration space it is written against.

/// Closed enumeration of the type combinations the reference inner product
/// is instantiated for. Anything outside this set is a decline, never an
/// error: another candidate (or engine) may still serve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpTypeTag {
    /// s8 x s8 -> s8, s32 accumulator.
    S8S8S8,
    /// s8 x s8 -> u8, s32 accumulator.
    S8S8U8,
    /// s8 x s8 -> s32, s32 accumulator.
    S8S8S32,
    /// u8 x s8 -> s8, s32 accumulator.
    U8S8S8,
    /// u8 x s8 -> u8, s32 accumulator.
    U8S8U8,
    /// u8 x s8 -> s32, s32 accumulator.
    U8S8S32,
    /// bf16 throughout, f32 accumulator.
    Bf16,
    /// f16 throughout, f32 accumulator.
    F16,
    /// f32 throughout.
    F32,
}

impl IpTypeTag {
    /// Map an (src, weights, dst) dtype triple onto the closed set.
    pub fn from_dtypes(src: DType, wei: DType, dst: DType) -> Option<IpTypeTag> {
        use DType::*;
        match (src, wei, dst) {
            (S8, S8, S8) => Some(IpTypeTag::S8S8S8),
            (S8, S8, U8) => Some(IpTypeTag::S8S8U8),
            (S8, S8, S32) => Some(IpTypeTag::S8S8S32),
            (U8, S8, S8) => Some(IpTypeTag::U8S8S8),
            (U8, S8, U8) => Some(IpTypeTag::U8S8U8),
            (U8, S8, S32) => Some(IpTypeTag::U8S8S32),
            (BF16, BF16, BF16) => Some(IpTypeTag::Bf16),
            (F16, F16, F16) => Some(IpTypeTag::F16),
            (F32, F32, F32) => Some(IpTypeTag::F32),
            _ => None,
        }
    }

    /// Accumulator dtype for this combination.
    pub fn acc(self) -> DType {
        match self {
            IpTypeTag::S8S8S8
            | IpTypeTag::S8S8U8
            | IpTypeTag::S8S8S32
            | IpTypeTag::U8S8S8
            | IpTypeTag::U8S8U8
            | IpTypeTag::U8S8S32 => DType::S32,
            IpTypeTag::Bf16 | IpTypeTag::F16 | IpTypeTag::F32 => DType::F32,
        }
    }

    /// Which directions this combination is instantiated for. The integer
    /// and f16 combinations are inference-only.
    pub fn supports(self, prop: PropKind) -> bool {
        match prop {
            PropKind::Forward => true,
            PropKind::BackwardData | PropKind::BackwardWeights => {
                matches!(self, IpTypeTag::Bf16 | IpTypeTag::F32)
            }
        }
    }
}

// IpConf — Launch-shape parameters derived at descriptor-creation time

/// Precomputed shape parameters the executors derive their iteration
/// spaces from. Copied out of the operation descriptor once, at
/// resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpConf {
    pub mb: usize,
    pub oc: usize,
    pub ic: usize,
    pub id: usize,
    pub ih: usize,
    pub iw: usize,
    pub with_bias: bool,
}

impl IpConf {
    pub fn from_desc(desc: &InnerProductDesc) -> IpConf {
        IpConf {
            mb: desc.mb(),
            oc: desc.oc(),
            ic: desc.ic(),
            id: desc.id(),
            ih: desc.ih(),
            iw: desc.iw(),
            with_bias: desc.bias().is_some(),
        }
    }

    /// Forward: one work item per (mb, oc) output element.
    pub fn fwd_range(&self) -> NdRange {
        NdRange::from(self.mb * self.oc)
    }

    /// Backward by data: one work item per diff-src element.
    pub fn bwd_data_range(&self) -> NdRange {
        NdRange::from(self.mb * self.ic * self.id * self.ih * self.iw)
    }

    /// Backward by weights: one work item per diff-weights element.
    pub fn bwd_weights_range(&self) -> NdRange {
        NdRange::from(self.oc * self.ic * self.ih * self.iw * self.id)
    }
}

// RefInnerProductPd — Primitive descriptor / implementation candidate

/// Validated plan for the reference inner product. One instance is created
/// per successful candidate probe and owns everything the executors need:
/// the type tag, the launch-shape parameters, and the post-op scalars.
#[derive(Debug)]
pub struct RefInnerProductPd {
    prop: PropKind,
    tag: IpTypeTag,
    conf: IpConf,
    attr: Attr,
}

impl RefInnerProductPd {
    /// Implementation candidate entry. Declines on non-GPU engines,
    /// placeholder layouts, and type combinations outside the closed set.
    pub fn create(engine: &dyn Engine, desc: &InnerProductDesc, attr: &Attr) -> Result<Candidacy> {
        if engine.kind() != EngineKind::Gpu {
            return Candidacy::declined();
        }
        if desc.src().tag().is_any() || desc.weights().tag().is_any() || desc.dst().tag().is_any()
        {
            return Candidacy::declined();
        }
        let Some(tag) = IpTypeTag::from_dtypes(
            desc.src().dtype(),
            desc.weights().dtype(),
            desc.dst().dtype(),
        ) else {
            return Candidacy::declined();
        };
        if !tag.supports(desc.prop()) {
            return Candidacy::declined();
        }
        if let Some(bias) = desc.bias() {
            // Bias is carried at destination precision or f32.
            if bias.dtype() != desc.dst().dtype() && bias.dtype() != DType::F32 {
                return Candidacy::declined();
            }
        }
        // Post-ops are a forward-only concept; attaching them to a backward
        // pass is caller misuse, not a capability gap.
        if desc.prop() != PropKind::Forward && !attr.is_default() {
            return Err(Error::invalid_args(
                "post-op attributes on a backward inner product",
            ));
        }
        Candidacy::accepted(RefInnerProductPd {
            prop: desc.prop(),
            tag,
            conf: IpConf::from_desc(desc),
            attr: attr.clone(),
        })
    }

    pub fn type_tag(&self) -> IpTypeTag {
        self.tag
    }

    pub fn conf(&self) -> &IpConf {
        &self.conf
    }
}

impl PrimitiveDesc for RefInnerProductPd {
    fn op_kind(&self) -> OpKind {
        OpKind::InnerProduct
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::Gpu
    }

    fn impl_name(&self) -> &'static str {
        "gpu:ref:any"
    }

    fn create_primitive(&self, engine: &dyn Engine) -> Result<Box<dyn Primitive>> {
        use IpTypeTag::*;
        let conf = self.conf;
        let attr = self.attr.clone();
        Ok(match self.prop {
            PropKind::Forward => match self.tag {
                S8S8S8 => Box::new(RefInnerProductFwd::<i8, i8, i8, i32>::new(engine, conf, attr)?),
                S8S8U8 => Box::new(RefInnerProductFwd::<i8, i8, u8, i32>::new(engine, conf, attr)?),
                S8S8S32 => {
                    Box::new(RefInnerProductFwd::<i8, i8, i32, i32>::new(engine, conf, attr)?)
                }
                U8S8S8 => Box::new(RefInnerProductFwd::<u8, i8, i8, i32>::new(engine, conf, attr)?),
                U8S8U8 => Box::new(RefInnerProductFwd::<u8, i8, u8, i32>::new(engine, conf, attr)?),
                U8S8S32 => {
                    Box::new(RefInnerProductFwd::<u8, i8, i32, i32>::new(engine, conf, attr)?)
                }
                Bf16 => Box::new(RefInnerProductFwd::<bf16, bf16, bf16, f32>::new(
                    engine, conf, attr,
                )?),
                F16 => Box::new(RefInnerProductFwd::<f16, f16, f16, f32>::new(
                    engine, conf, attr,
                )?),
                F32 => Box::new(RefInnerProductFwd::<f32, f32, f32, f32>::new(
                    engine, conf, attr,
                )?),
            },
            PropKind::BackwardData => match self.tag {
                F32 => Box::new(RefInnerProductBwdData::<f32, f32, f32, f32>::new(
                    engine, conf,
                )?),
                Bf16 => Box::new(RefInnerProductBwdData::<bf16, bf16, bf16, f32>::new(
                    engine, conf,
                )?),
                other => {
                    return Err(Error::msg(format!(
                        "no backward-data instantiation for {:?}",
                        other
                    )))
                }
            },
            PropKind::BackwardWeights => match self.tag {
                F32 => Box::new(RefInnerProductBwdWeights::<f32, f32>::new(engine, conf)?),
                Bf16 => Box::new(RefInnerProductBwdWeights::<bf16, f32>::new(engine, conf)?),
                other => {
                    return Err(Error::msg(format!(
                        "no backward-weights instantiation for {:?}",
                        other
                    )))
                }
            },
        })
    }
}

// Executors — One generic template per direction
//
// Argument order is each kernel's ABI and is fixed per direction,
// independent of the active type instantiation:
//
//   forward:          0 src, 1 weights, 2 bias, 3 dst,
//                     4 eltwise_alpha, 5 eltwise_beta, 6 sum_scale,
//                     7 output_scale
//   backward-data:    0 diff_src, 1 weights, 2 diff_dst
//   backward-weights: 0 src, 1 diff_weights, 2 diff_bias, 3 diff_dst

/// Forward executor, instantiated per (src, weights, dst, acc) combination.
pub struct RefInnerProductFwd<S, W, D, A> {
    kernel: KernelHandle,
    conf: IpConf,
    attr: Attr,
    _types: PhantomData<fn() -> (S, W, D, A)>,
}

impl<S: Element, W: Element, D: Element, A: Element> RefInnerProductFwd<S, W, D, A> {
    fn kernel_name() -> String {
        format!(
            "ref_inner_product_fwd_{}{}{}",
            S::DTYPE,
            W::DTYPE,
            D::DTYPE
        )
    }

    pub fn new(engine: &dyn Engine, conf: IpConf, attr: Attr) -> Result<Self> {
        let kernel = engine.kernel(&Self::kernel_name())?;
        Ok(RefInnerProductFwd {
            kernel,
            conf,
            attr,
            _types: PhantomData,
        })
    }
}

impl<S: Element, W: Element, D: Element, A: Element> Primitive
    for RefInnerProductFwd<S, W, D, A>
{
    fn execute(&self, ctx: &ExecCtx<'_>) -> Result<()> {
        let src = ctx.storage(ArgId::Src)?;
        let weights = ctx.storage(ArgId::Weights)?;
        // The plan decided at resolution time whether a bias exists; a
        // stray context binding must not resurrect one.
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
        args.set(4, self.attr.eltwise_alpha());
        args.set(5, self.attr.eltwise_beta());
        args.set(6, self.attr.sum_scale());
        args.set(7, self.attr.output_scale());

        let range = self.conf.fwd_range();
        ctx.stream().parallel_for(&range, &self.kernel, &args)
    }
}

/// Backward-by-data executor, instantiated per (diff_src, weights,
/// diff_dst, acc) combination.
pub struct RefInnerProductBwdData<S, W, D, A> {
    kernel: KernelHandle,
    conf: IpConf,
    _types: PhantomData<fn() -> (S, W, D, A)>,
}

impl<S: Element, W: Element, D: Element, A: Element> RefInnerProductBwdData<S, W, D, A> {
    fn kernel_name() -> String {
        format!(
            "ref_inner_product_bwd_data_{}{}{}",
            S::DTYPE,
            W::DTYPE,
            D::DTYPE
        )
    }

    pub fn new(engine: &dyn Engine, conf: IpConf) -> Result<Self> {
        let kernel = engine.kernel(&Self::kernel_name())?;
        Ok(RefInnerProductBwdData {
            kernel,
            conf,
            _types: PhantomData,
        })
    }
}

impl<S: Element, W: Element, D: Element, A: Element> Primitive
    for RefInnerProductBwdData<S, W, D, A>
{
    fn execute(&self, ctx: &ExecCtx<'_>) -> Result<()> {
        let diff_src = ctx.storage(ArgId::DiffSrc)?;
        let weights = ctx.storage(ArgId::Weights)?;
        let diff_dst = ctx.storage(ArgId::DiffDst)?;

        let mut args = KernelArgList::new();
        args.set(0, diff_src);
        args.set(1, weights);
        args.set(2, diff_dst);

        let range = self.conf.bwd_data_range();
        ctx.stream().parallel_for(&range, &self.kernel, &args)
    }
}

/// Backward-by-weights executor, instantiated per (data, acc) pair; all
/// data operands share one dtype in this direction.
pub struct RefInnerProductBwdWeights<T, A> {
    kernel: KernelHandle,
    conf: IpConf,
    _types: PhantomData<fn() -> (T, A)>,
}

impl<T: Element, A: Element> RefInnerProductBwdWeights<T, A> {
    fn kernel_name() -> String {
        format!("ref_inner_product_bwd_weights_{}", T::DTYPE)
    }

    pub fn new(engine: &dyn Engine, conf: IpConf) -> Result<Self> {
        let kernel = engine.kernel(&Self::kernel_name())?;
        Ok(RefInnerProductBwdWeights {
            kernel,
            conf,
            _types: PhantomData,
        })
    }
}

impl<T: Element, A: Element> Primitive for RefInnerProductBwdWeights<T, A> {
    fn execute(&self, ctx: &ExecCtx<'_>) -> Result<()> {
        let src = ctx.storage(ArgId::Src)?;
        let diff_weights = ctx.storage(ArgId::DiffWeights)?;
        let diff_bias = if self.conf.with_bias {
            ctx.storage(ArgId::DiffBias)?
        } else {
            StorageHandle::null()
        };
        let diff_dst = ctx.storage(ArgId::DiffDst)?;

        let mut args = KernelArgList::new();
        args.set(0, src);
        args.set(1, diff_weights);
        args.set(2, diff_bias);
        args.set(3, diff_dst);

        let range = self.conf.bwd_weights_range();
        ctx.stream().parallel_for(&range, &self.kernel, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_closed_set() {
        use DType::*;
        assert_eq!(
            IpTypeTag::from_dtypes(S8, S8, U8),
            Some(IpTypeTag::S8S8U8)
        );
        assert_eq!(IpTypeTag::from_dtypes(F32, F32, F32), Some(IpTypeTag::F32));
        // weights must be s8 in the integer combinations
        assert_eq!(IpTypeTag::from_dtypes(S8, U8, S8), None);
        // no mixed float/int combinations
        assert_eq!(IpTypeTag::from_dtypes(F32, BF16, F32), None);
        assert_eq!(IpTypeTag::from_dtypes(F16, F16, F32), None);
    }

    #[test]
    fn test_accumulators() {
        assert_eq!(IpTypeTag::S8S8S32.acc(), DType::S32);
        assert_eq!(IpTypeTag::U8S8U8.acc(), DType::S32);
        assert_eq!(IpTypeTag::Bf16.acc(), DType::F32);
        assert_eq!(IpTypeTag::F16.acc(), DType::F32);
        assert_eq!(IpTypeTag::F32.acc(), DType::F32);
    }

    #[test]
    fn test_backward_support_is_float_only() {
        assert!(IpTypeTag::F32.supports(PropKind::BackwardData));
        assert!(IpTypeTag::Bf16.supports(PropKind::BackwardWeights));
        assert!(!IpTypeTag::F16.supports(PropKind::BackwardData));
        assert!(!IpTypeTag::S8S8S32.supports(PropKind::BackwardWeights));
    }

    #[test]
    fn test_iteration_space_products() {
        let conf = IpConf {
            mb: 4,
            oc: 10,
            ic: 3,
            id: 2,
            ih: 5,
            iw: 7,
            with_bias: false,
        };
        assert_eq!(conf.fwd_range().total(), 4 * 10);
        assert_eq!(conf.bwd_data_range().total(), 4 * 3 * 2 * 5 * 7);
        assert_eq!(conf.bwd_weights_range().total(), 10 * 3 * 5 * 7 * 2);
    }

    #[test]
    fn test_kernel_names_follow_type_params() {
        assert_eq!(
            RefInnerProductFwd::<i8, i8, i32, i32>::kernel_name(),
            "ref_inner_product_fwd_s8s8s32"
        );
        assert_eq!(
            RefInnerProductBwdData::<bf16, bf16, bf16, f32>::kernel_name(),
            "ref_inner_product_bwd_data_bf16bf16bf16"
        );
        assert_eq!(
            RefInnerProductBwdWeights::<f32, f32>::kernel_name(),
            "ref_inner_product_bwd_weights_f32"
        );
    }
}
