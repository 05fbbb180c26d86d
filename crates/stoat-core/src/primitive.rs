use std::fmt;

use crate::attr::Attr;
use crate::desc::MemDesc;
use crate::engine::{Engine, EngineKind};
use crate::error::{Error, Result};
use crate::exec::ExecCtx;
use crate::op::{InnerProductDesc, OpKind, ReorderDesc};

// Primitive resolution — Ordered-candidate-list protocol
//
// For each (operation, engine) pair the engine exposes an ordered list of
// implementation candidates: plain fn pointers that, given the operand
// descriptors, either produce a validated primitive descriptor or decline.
// The list is walked strictly in order and the first acceptance wins; there
// is no scoring. Priority policy lives in the list content and order, which
// each engine owns as data, never in the walking logic here.
//
// Declining is normal control flow. An error return from a candidate means
// caller error (inconsistent descriptors) or a backend fault, and aborts
// the walk immediately instead of falling through to the next candidate.

/// Outcome of probing one implementation candidate.
pub enum Candidacy {
    /// The candidate can serve the request; here is its validated plan.
    Accepted(Box<dyn PrimitiveDesc>),
    /// The candidate cannot serve this combination. Try the next one.
    Declined,
}

impl Candidacy {
    /// Convenience wrapper for the accepting case.
    pub fn accepted(pd: impl PrimitiveDesc + 'static) -> Result<Candidacy> {
        Ok(Candidacy::Accepted(Box::new(pd)))
    }

    /// Convenience wrapper for the declining case.
    pub fn declined() -> Result<Candidacy> {
        Ok(Candidacy::Declined)
    }
}

/// Implementation candidate for reorder.
pub type ReorderImplFn = fn(&dyn Engine, &ReorderDesc, &Attr) -> Result<Candidacy>;

/// Implementation candidate for inner product.
pub type InnerProductImplFn = fn(&dyn Engine, &InnerProductDesc, &Attr) -> Result<Candidacy>;

/// A validated, backend-bound plan for executing one operation instance.
///
/// Created by exactly one successful candidate invocation. Immutable after
/// creation: type, layout, and attribute compatibility are fully checked at
/// acceptance, so execution performs no structural re-validation. Safe to
/// share read-only across concurrent executions.
pub trait PrimitiveDesc: fmt::Debug + Send + Sync {
    fn op_kind(&self) -> OpKind;

    fn engine_kind(&self) -> EngineKind;

    /// Short identifier of the implementation that accepted, e.g.
    /// "gpu:ref:any". Diagnostic only; tests assert on it.
    fn impl_name(&self) -> &'static str;

    /// Instantiate the runtime executor for this plan.
    fn create_primitive(&self, engine: &dyn Engine) -> Result<Box<dyn Primitive>>;
}

/// A resolved, executable instance of one operation.
///
/// Stateless per call: all state lives in the immutable descriptor this
/// primitive was built from and in the execution context supplied per call.
pub trait Primitive: Send + Sync {
    /// Build the kernel argument list and iteration space, submit one
    /// `parallel_for`, and return the stream's status verbatim.
    fn execute(&self, ctx: &ExecCtx<'_>) -> Result<()>;
}

/// Walk an implementation list in order; first acceptance wins.
///
/// `Declined` continues to the next candidate. Any error propagates
/// immediately. Exhausting the list yields [`Error::Unsupported`].
pub fn resolve<D>(
    op: OpKind,
    list: &[fn(&dyn Engine, &D, &Attr) -> Result<Candidacy>],
    engine: &dyn Engine,
    desc: &D,
    attr: &Attr,
) -> Result<Box<dyn PrimitiveDesc>> {
    for create in list {
        match create(engine, desc, attr)? {
            Candidacy::Accepted(pd) => return Ok(pd),
            Candidacy::Declined => continue,
        }
    }
    Err(Error::Unsupported {
        op,
        engine: engine.name(),
    })
}

// Resolution entry points — engine-to-list glue

/// Resolve a reorder between two operand descriptors on `engine`.
pub fn reorder(
    engine: &dyn Engine,
    src: &MemDesc,
    dst: &MemDesc,
    attr: &Attr,
) -> Result<Box<dyn PrimitiveDesc>> {
    let desc = ReorderDesc::new(src.clone(), dst.clone())?;
    resolve(
        OpKind::Reorder,
        engine.reorder_impl_list(src, dst),
        engine,
        &desc,
        attr,
    )
}

/// Resolve an inner product described by `desc` on `engine`.
pub fn inner_product(
    engine: &dyn Engine,
    desc: &InnerProductDesc,
    attr: &Attr,
) -> Result<Box<dyn PrimitiveDesc>> {
    resolve(
        OpKind::InnerProduct,
        engine.inner_product_impl_list(),
        engine,
        desc,
        attr,
    )
}
