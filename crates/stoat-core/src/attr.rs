// Attr — Post-op attributes attached to a resolution request
//
// Attributes are opaque to the resolution mechanism itself: candidates only
// decide whether they can honor them, and forward executors read them back
// as scalar kernel arguments. The numeric meaning of alpha/beta/scales
// belongs to the kernels, not to this crate.

/// Elementwise post-op parameters (activation alpha/beta).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eltwise {
    pub alpha: f32,
    pub beta: f32,
}

/// Post-op attributes for one primitive: optional elementwise activation,
/// elementwise-sum scale, and output quantization scale.
///
/// Accessors return neutral values when a post-op is unset, so executors
/// can populate the scalar tail of a kernel argument list unconditionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attr {
    eltwise: Option<Eltwise>,
    sum_scale: Option<f32>,
    output_scale: Option<f32>,
}

impl Attr {
    pub fn new() -> Self {
        Attr::default()
    }

    /// Attach an elementwise activation post-op.
    pub fn with_eltwise(mut self, alpha: f32, beta: f32) -> Self {
        self.eltwise = Some(Eltwise { alpha, beta });
        self
    }

    /// Attach an elementwise-sum post-op with the given scale.
    pub fn with_sum_scale(mut self, scale: f32) -> Self {
        self.sum_scale = Some(scale);
        self
    }

    /// Set the output quantization scale.
    pub fn with_output_scale(mut self, scale: f32) -> Self {
        self.output_scale = Some(scale);
        self
    }

    pub fn has_eltwise(&self) -> bool {
        self.eltwise.is_some()
    }

    pub fn has_sum(&self) -> bool {
        self.sum_scale.is_some()
    }

    /// Whether no post-ops and no scaling are attached.
    pub fn is_default(&self) -> bool {
        self.eltwise.is_none() && self.sum_scale.is_none() && self.output_scale.is_none()
    }

    pub fn eltwise_alpha(&self) -> f32 {
        self.eltwise.map_or(0.0, |e| e.alpha)
    }

    pub fn eltwise_beta(&self) -> f32 {
        self.eltwise.map_or(0.0, |e| e.beta)
    }

    pub fn sum_scale(&self) -> f32 {
        self.sum_scale.unwrap_or(0.0)
    }

    pub fn output_scale(&self) -> f32 {
        self.output_scale.unwrap_or(1.0)
    }
}
