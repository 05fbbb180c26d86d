// Kernel registry — Names of every device kernel this engine hosts
//
// The engine mints one KernelHandle per name at construction time; actual
// compilation and module loading live in the device layer, outside this
// crate. Reference inner-product kernels are specialized per numeric type
// combination and suffixed accordingly, one name per instantiation.

/// Module name the device layer loads these kernels under.
pub const MODULE_NAME: &str = "stoat_gpu";

/// Every kernel name the GPU engine's registry serves.
pub const KERNEL_NAMES: &[&str] = &[
    // ref inner product, forward
    "ref_inner_product_fwd_s8s8s8",
    "ref_inner_product_fwd_s8s8u8",
    "ref_inner_product_fwd_s8s8s32",
    "ref_inner_product_fwd_u8s8s8",
    "ref_inner_product_fwd_u8s8u8",
    "ref_inner_product_fwd_u8s8s32",
    "ref_inner_product_fwd_bf16bf16bf16",
    "ref_inner_product_fwd_f16f16f16",
    "ref_inner_product_fwd_f32f32f32",
    // ref inner product, backward by data
    "ref_inner_product_bwd_data_f32f32f32",
    "ref_inner_product_bwd_data_bf16bf16bf16",
    // ref inner product, backward by weights
    "ref_inner_product_bwd_weights_f32",
    "ref_inner_product_bwd_weights_bf16",
    // gemm-library inner product
    "gemm_inner_product_fwd_f32",
    // reorder
    "vendor_reorder",
    "generic_reorder",
];
