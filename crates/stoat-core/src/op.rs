use std::fmt;

use crate::desc::MemDesc;
use crate::error::{Error, Result};

// Operation descriptors — What the caller asks for
//
// An operation descriptor bundles the operand descriptors of one logical
// operation. Constructors perform the structural validation that is caller
// responsibility: rank and extent consistency between operands. Violations
// are InvalidArguments-class errors and surface immediately; they are never
// something an implementation candidate gets to "decline".
//
// Type-combination and layout support, by contrast, are backend capability
// questions and are left to candidates.

/// Logical operation kinds this core dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Reorder,
    InnerProduct,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpKind::Reorder => "reorder",
            OpKind::InnerProduct => "inner_product",
        };
        write!(f, "{}", s)
    }
}

/// Propagation direction of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKind {
    Forward,
    BackwardData,
    BackwardWeights,
}

// ReorderDesc

/// Descriptor for a memory-layout reorder: copy `src` into `dst`,
/// converting layout (and possibly element type) on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderDesc {
    src: MemDesc,
    dst: MemDesc,
}

impl ReorderDesc {
    pub fn new(src: MemDesc, dst: MemDesc) -> Result<Self> {
        if src.rank() != dst.rank() {
            return Err(Error::RankMismatch {
                expected: src.rank(),
                got: dst.rank(),
            });
        }
        if src.elem_count() != dst.elem_count() {
            return Err(Error::DimMismatch {
                context: "reorder element counts",
                left: src.elem_count(),
                right: dst.elem_count(),
            });
        }
        Ok(ReorderDesc { src, dst })
    }

    pub fn src(&self) -> &MemDesc {
        &self.src
    }

    pub fn dst(&self) -> &MemDesc {
        &self.dst
    }
}

// InnerProductDesc

/// Descriptor for an inner product (fully-connected) operation.
///
/// Operand shapes follow the channels-first convention:
///   src     [mb, ic]            (optionally + spatial: [mb, ic, (id,) ih, iw])
///   weights [oc, ic]            (+ the same spatial extents)
///   bias    [oc]                (optional)
///   dst     [mb, oc]
///
/// For backward directions the same descriptor geometry applies; `src`,
/// `weights` and `dst` then describe diff operands as dictated by `prop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerProductDesc {
    prop: PropKind,
    src: MemDesc,
    weights: MemDesc,
    bias: Option<MemDesc>,
    dst: MemDesc,
}

impl InnerProductDesc {
    pub fn new(
        prop: PropKind,
        src: MemDesc,
        weights: MemDesc,
        bias: Option<MemDesc>,
        dst: MemDesc,
    ) -> Result<Self> {
        if src.rank() < 2 || src.rank() > 5 {
            return Err(Error::invalid_args(format!(
                "inner product src rank must be 2..=5, got {}",
                src.rank()
            )));
        }
        if weights.rank() != src.rank() {
            return Err(Error::RankMismatch {
                expected: src.rank(),
                got: weights.rank(),
            });
        }
        if dst.rank() != 2 {
            return Err(Error::RankMismatch {
                expected: 2,
                got: dst.rank(),
            });
        }
        if src.dims()[0] != dst.dims()[0] {
            return Err(Error::DimMismatch {
                context: "batch (src[0] vs dst[0])",
                left: src.dims()[0],
                right: dst.dims()[0],
            });
        }
        if weights.dims()[0] != dst.dims()[1] {
            return Err(Error::DimMismatch {
                context: "output channels (weights[0] vs dst[1])",
                left: weights.dims()[0],
                right: dst.dims()[1],
            });
        }
        if weights.dims()[1] != src.dims()[1] {
            return Err(Error::DimMismatch {
                context: "input channels (weights[1] vs src[1])",
                left: weights.dims()[1],
                right: src.dims()[1],
            });
        }
        for d in 2..src.rank() {
            if src.dims()[d] != weights.dims()[d] {
                return Err(Error::DimMismatch {
                    context: "spatial extents (src vs weights)",
                    left: src.dims()[d],
                    right: weights.dims()[d],
                });
            }
        }
        if let Some(b) = &bias {
            if b.rank() != 1 {
                return Err(Error::RankMismatch {
                    expected: 1,
                    got: b.rank(),
                });
            }
            if b.dims()[0] != dst.dims()[1] {
                return Err(Error::DimMismatch {
                    context: "bias length (bias[0] vs dst[1])",
                    left: b.dims()[0],
                    right: dst.dims()[1],
                });
            }
        }
        Ok(InnerProductDesc {
            prop,
            src,
            weights,
            bias,
            dst,
        })
    }

    pub fn prop(&self) -> PropKind {
        self.prop
    }

    pub fn src(&self) -> &MemDesc {
        &self.src
    }

    pub fn weights(&self) -> &MemDesc {
        &self.weights
    }

    pub fn bias(&self) -> Option<&MemDesc> {
        self.bias.as_ref()
    }

    pub fn dst(&self) -> &MemDesc {
        &self.dst
    }

    /// Minibatch size.
    pub fn mb(&self) -> usize {
        self.src.dims()[0]
    }

    /// Output channel count.
    pub fn oc(&self) -> usize {
        self.dst.dims()[1]
    }

    /// Input channel count.
    pub fn ic(&self) -> usize {
        self.src.dims()[1]
    }

    // Spatial extents. Missing dims read as 1, so the backward iteration
    // space products are well-defined for rank-2 descriptors too.

    pub fn id(&self) -> usize {
        match self.src.rank() {
            5 => self.src.dims()[2],
            _ => 1,
        }
    }

    pub fn ih(&self) -> usize {
        match self.src.rank() {
            4 => self.src.dims()[2],
            5 => self.src.dims()[3],
            _ => 1,
        }
    }

    pub fn iw(&self) -> usize {
        match self.src.rank() {
            3 => self.src.dims()[2],
            4 => self.src.dims()[3],
            5 => self.src.dims()[4],
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desc::LayoutTag;
    use crate::dtype::DType;

    fn md(dims: &[usize], tag: LayoutTag) -> MemDesc {
        MemDesc::new(dims.to_vec(), DType::F32, tag).unwrap()
    }

    #[test]
    fn test_reorder_desc_validation() {
        let a = md(&[2, 3, 4, 5], LayoutTag::Nchw);
        let b = md(&[2, 3, 4, 5], LayoutTag::Nhwc);
        assert!(ReorderDesc::new(a.clone(), b).is_ok());

        let rank_err = ReorderDesc::new(a.clone(), md(&[2, 60], LayoutTag::Nc)).unwrap_err();
        assert!(matches!(rank_err, Error::RankMismatch { .. }));

        let count_err =
            ReorderDesc::new(a, md(&[2, 3, 4, 6], LayoutTag::Nhwc)).unwrap_err();
        assert!(matches!(count_err, Error::DimMismatch { .. }));
    }

    #[test]
    fn test_ip_desc_2d() {
        let desc = InnerProductDesc::new(
            PropKind::Forward,
            md(&[4, 16], LayoutTag::Nc),
            md(&[10, 16], LayoutTag::Oi),
            Some(md(&[10], LayoutTag::X)),
            md(&[4, 10], LayoutTag::Nc),
        )
        .unwrap();
        assert_eq!(desc.mb(), 4);
        assert_eq!(desc.oc(), 10);
        assert_eq!(desc.ic(), 16);
        assert_eq!((desc.id(), desc.ih(), desc.iw()), (1, 1, 1));
    }

    #[test]
    fn test_ip_desc_spatial_accessors() {
        let desc = InnerProductDesc::new(
            PropKind::Forward,
            md(&[2, 8, 3, 5, 7], LayoutTag::Any),
            md(&[6, 8, 3, 5, 7], LayoutTag::Any),
            None,
            md(&[2, 6], LayoutTag::Nc),
        )
        .unwrap();
        assert_eq!((desc.id(), desc.ih(), desc.iw()), (3, 5, 7));

        let rank4 = InnerProductDesc::new(
            PropKind::Forward,
            md(&[2, 8, 5, 7], LayoutTag::Nchw),
            md(&[6, 8, 5, 7], LayoutTag::Oihw),
            None,
            md(&[2, 6], LayoutTag::Nc),
        )
        .unwrap();
        assert_eq!((rank4.id(), rank4.ih(), rank4.iw()), (1, 5, 7));
    }

    #[test]
    fn test_ip_desc_rejects_inconsistent_shapes() {
        // batch mismatch
        assert!(InnerProductDesc::new(
            PropKind::Forward,
            md(&[4, 16], LayoutTag::Nc),
            md(&[10, 16], LayoutTag::Oi),
            None,
            md(&[5, 10], LayoutTag::Nc),
        )
        .is_err());
        // ic mismatch
        assert!(InnerProductDesc::new(
            PropKind::Forward,
            md(&[4, 16], LayoutTag::Nc),
            md(&[10, 12], LayoutTag::Oi),
            None,
            md(&[4, 10], LayoutTag::Nc),
        )
        .is_err());
        // bias length mismatch
        assert!(InnerProductDesc::new(
            PropKind::Forward,
            md(&[4, 16], LayoutTag::Nc),
            md(&[10, 16], LayoutTag::Oi),
            Some(md(&[11], LayoutTag::X)),
            md(&[4, 10], LayoutTag::Nc),
        )
        .is_err());
        // dst must be rank 2
        assert!(InnerProductDesc::new(
            PropKind::Forward,
            md(&[4, 16], LayoutTag::Nc),
            md(&[10, 16], LayoutTag::Oi),
            None,
            md(&[4, 10, 1], LayoutTag::Any),
        )
        .is_err());
    }
}
