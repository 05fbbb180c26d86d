//! # stoat-core
//!
//! Core primitive-resolution and kernel-dispatch mechanism for Stoat.
//!
//! This crate provides:
//! - [`MemDesc`] / [`LayoutTag`] — backend-agnostic operand descriptors
//! - [`DType`] / [`Element`] — the closed numeric type set and its bridge
//!   into Rust's type system
//! - [`Engine`] trait — one compute device hosting per-operation
//!   implementation lists
//! - [`Candidacy`] / [`resolve`] — the ordered-candidate-list protocol:
//!   first candidate that accepts wins, declining is not an error
//! - [`PrimitiveDesc`] / [`Primitive`] — validated execution plans and
//!   their runtime executors
//! - [`KernelArgList`] / [`NdRange`] / [`ComputeStream`] — the uniform
//!   kernel-invocation contract: positional arguments plus an iteration
//!   space submitted to an ordered device queue
//! - [`ExecCtx`] — per-call storage bindings by operand role
//!
//! Backends (e.g. `stoat-gpu`) implement [`Engine`] and contribute the
//! candidates; this crate never names a concrete backend.

pub mod args;
pub mod attr;
pub mod desc;
pub mod dtype;
pub mod engine;
pub mod error;
pub mod exec;
pub mod nd_range;
pub mod op;
pub mod primitive;
pub mod stream;

pub use args::{KernelArg, KernelArgList, StorageHandle};
pub use attr::{Attr, Eltwise};
pub use desc::{LayoutTag, MemDesc, MAX_RANK};
pub use dtype::{DType, Element};
pub use engine::{Engine, EngineKind};
pub use error::{Error, Result};
pub use exec::{ArgId, ExecCtx};
pub use nd_range::NdRange;
pub use op::{InnerProductDesc, OpKind, PropKind, ReorderDesc};
pub use primitive::{
    inner_product, reorder, resolve, Candidacy, InnerProductImplFn, Primitive, PrimitiveDesc,
    ReorderImplFn,
};
pub use stream::{ComputeStream, KernelHandle, RecordingStream, Submission};
