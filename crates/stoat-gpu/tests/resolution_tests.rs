// Resolution tests — Verifies list walking against the real GPU engine

use stoat_core::{
    inner_product, reorder, ArgId, Attr, DType, Engine, EngineKind, Error, InnerProductDesc,
    InnerProductImplFn, KernelHandle, LayoutTag, MemDesc, PropKind, RecordingStream, ReorderImplFn,
    Result, StorageHandle,
};
use stoat_gpu::GpuEngine;

fn md(dims: &[usize], dtype: DType, tag: LayoutTag) -> MemDesc {
    MemDesc::new(dims.to_vec(), dtype, tag).unwrap()
}

fn ip_desc(prop: PropKind, dtypes: (DType, DType, DType)) -> InnerProductDesc {
    InnerProductDesc::new(
        prop,
        md(&[4, 16], dtypes.0, LayoutTag::Nc),
        md(&[10, 16], dtypes.1, LayoutTag::Oi),
        None,
        md(&[4, 10], dtypes.2, LayoutTag::Nc),
    )
    .unwrap()
}

// Reorder list order: vendor first, generic fallback second

#[test]
fn test_reorder_prefers_vendor() {
    let engine = GpuEngine::new(0);
    let src = md(&[2, 3, 4, 5], DType::F32, LayoutTag::Nchw);
    let dst = md(&[2, 3, 4, 5], DType::F32, LayoutTag::Nhwc);
    let pd = reorder(&engine, &src, &dst, &Attr::new()).unwrap();
    assert_eq!(pd.impl_name(), "gpu:vendor");
}

#[test]
fn test_reorder_falls_back_when_vendor_declines() {
    // bf16 is outside the vendor library's set; only the generic fallback
    // can serve this layout pair.
    let engine = GpuEngine::new(0);
    let src = md(&[2, 3, 4, 5], DType::BF16, LayoutTag::Nchw);
    let dst = md(&[2, 3, 4, 5], DType::BF16, LayoutTag::Nhwc);
    let pd = reorder(&engine, &src, &dst, &Attr::new()).unwrap();
    assert_eq!(pd.impl_name(), "gpu:generic:any");
}

#[test]
fn test_reorder_cross_dtype_goes_generic() {
    let engine = GpuEngine::new(0);
    let src = md(&[8, 8], DType::F32, LayoutTag::Nc);
    let dst = md(&[8, 8], DType::S8, LayoutTag::Nc);
    let pd = reorder(&engine, &src, &dst, &Attr::new()).unwrap();
    assert_eq!(pd.impl_name(), "gpu:generic:any");
}

#[test]
fn test_reorder_any_layout_is_unsupported() {
    let engine = GpuEngine::new(0);
    let src = md(&[2, 3], DType::F32, LayoutTag::Any);
    let dst = md(&[2, 3], DType::F32, LayoutTag::Nc);
    let err = reorder(&engine, &src, &dst, &Attr::new()).unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn test_reorder_rank_mismatch_is_invalid_not_unsupported() {
    let engine = GpuEngine::new(0);
    let src = md(&[2, 30], DType::F32, LayoutTag::Nc);
    let dst = md(&[2, 3, 2, 5], DType::F32, LayoutTag::Nchw);
    let err = reorder(&engine, &src, &dst, &Attr::new()).unwrap_err();
    assert!(matches!(err, Error::RankMismatch { .. }));
}

// Inner product list order: gemm library first, reference second

#[test]
fn test_inner_product_prefers_gemm_for_plain_f32() {
    let engine = GpuEngine::new(0);
    let desc = ip_desc(PropKind::Forward, (DType::F32, DType::F32, DType::F32));
    let pd = inner_product(&engine, &desc, &Attr::new()).unwrap();
    assert_eq!(pd.impl_name(), "gpu:gemm");
}

#[test]
fn test_inner_product_with_post_ops_goes_ref() {
    let engine = GpuEngine::new(0);
    let desc = ip_desc(PropKind::Forward, (DType::F32, DType::F32, DType::F32));
    let attr = Attr::new().with_eltwise(1.0, 0.0);
    let pd = inner_product(&engine, &desc, &attr).unwrap();
    assert_eq!(pd.impl_name(), "gpu:ref:any");
}

#[test]
fn test_inner_product_int8_goes_ref() {
    let engine = GpuEngine::new(0);
    let desc = ip_desc(PropKind::Forward, (DType::U8, DType::S8, DType::S32));
    let pd = inner_product(&engine, &desc, &Attr::new()).unwrap();
    assert_eq!(pd.impl_name(), "gpu:ref:any");
}

#[test]
fn test_inner_product_unknown_combination_is_unsupported() {
    let engine = GpuEngine::new(0);
    let desc = ip_desc(PropKind::Forward, (DType::F32, DType::BF16, DType::F32));
    let err = inner_product(&engine, &desc, &Attr::new()).unwrap_err();
    assert!(err.is_unsupported());
}

// Engine-kind gating: the same lists decline wholesale off-GPU

#[derive(Debug)]
struct CpuStubEngine;

impl Engine for CpuStubEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Cpu
    }
    fn name(&self) -> String {
        "cpu:0".to_string()
    }
    fn kernel(&self, name: &str) -> Result<KernelHandle> {
        Ok(KernelHandle::new(name.to_string(), 0))
    }
    fn reorder_impl_list(&self, _: &MemDesc, _: &MemDesc) -> &[ReorderImplFn] {
        // Host the GPU candidates on purpose: every one must decline.
        &[
            stoat_gpu::VendorReorderPd::create,
            stoat_gpu::GenericReorderPd::create,
        ]
    }
    fn inner_product_impl_list(&self) -> &[InnerProductImplFn] {
        &[
            stoat_gpu::GemmInnerProductPd::create,
            stoat_gpu::RefInnerProductPd::create,
        ]
    }
}

#[test]
fn test_gpu_candidates_decline_on_cpu_engine() {
    let engine = CpuStubEngine;
    let src = md(&[2, 3], DType::F32, LayoutTag::Nc);
    let dst = md(&[2, 3], DType::F32, LayoutTag::Nc);
    let err = reorder(&engine, &src, &dst, &Attr::new()).unwrap_err();
    assert!(err.is_unsupported());

    let desc = ip_desc(PropKind::Forward, (DType::F32, DType::F32, DType::F32));
    let err = inner_product(&engine, &desc, &Attr::new()).unwrap_err();
    assert!(err.is_unsupported());
}

// Idempotent resolution: two resolutions share no mutable state

#[test]
fn test_resolution_is_idempotent() {
    let engine = GpuEngine::new(0);
    let desc = ip_desc(PropKind::Forward, (DType::S8, DType::S8, DType::S8));
    let attr = Attr::new().with_output_scale(0.5);

    let pd_a = inner_product(&engine, &desc, &attr).unwrap();
    let pd_b = inner_product(&engine, &desc, &attr).unwrap();
    assert_eq!(pd_a.impl_name(), pd_b.impl_name());

    // Behavioral equality: both primitives produce identical launch
    // requests from identical contexts.
    let run = |pd: &dyn stoat_core::PrimitiveDesc| {
        let prim = pd.create_primitive(&engine).unwrap();
        let stream = RecordingStream::new();
        let ctx = stoat_core::ExecCtx::new(&stream)
            .with_arg(ArgId::Src, StorageHandle::new(1))
            .with_arg(ArgId::Weights, StorageHandle::new(2))
            .with_arg(ArgId::Dst, StorageHandle::new(3));
        prim.execute(&ctx).unwrap();
        stream.submissions().remove(0)
    };
    assert_eq!(run(pd_a.as_ref()), run(pd_b.as_ref()));
}
