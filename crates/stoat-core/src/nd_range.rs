use std::fmt;

use crate::error::{Error, Result};

// NdRange — Declarative description of the parallel work grid
//
// An NdRange names how many work items a kernel launch covers, as one to
// three extents. It is device-agnostic: how extents map onto hardware
// blocks/threads is the compute stream's concern.
//
// Ranges are derived deterministically from a primitive descriptor's
// launch-shape parameters. The total must exactly match what the kernel
// expects as its work-item count; a mismatch is a contract violation
// between descriptor and kernel, not a recoverable runtime error.

/// One to three non-negative extents describing total parallel work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdRange {
    dims: Vec<usize>,
}

impl NdRange {
    /// Create a range from 1..=3 extents.
    pub fn new(dims: &[usize]) -> Result<Self> {
        if dims.is_empty() || dims.len() > 3 {
            return Err(Error::invalid_args(format!(
                "nd-range must have 1..=3 extents, got {}",
                dims.len()
            )));
        }
        Ok(NdRange {
            dims: dims.to_vec(),
        })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn ndims(&self) -> usize {
        self.dims.len()
    }

    /// Total number of work items (product of all extents).
    pub fn total(&self) -> usize {
        self.dims.iter().product()
    }
}

impl From<usize> for NdRange {
    /// The common 1-D case: a flat range of `n` work items.
    fn from(n: usize) -> Self {
        NdRange { dims: vec![n] }
    }
}

impl fmt::Display for NdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_range() {
        let r = NdRange::from(40);
        assert_eq!(r.ndims(), 1);
        assert_eq!(r.total(), 40);
    }

    #[test]
    fn test_multi_dim_total() {
        let r = NdRange::new(&[4, 10, 3]).unwrap();
        assert_eq!(r.total(), 120);
        assert_eq!(r.dims(), &[4, 10, 3]);
    }

    #[test]
    fn test_extent_bounds() {
        assert!(NdRange::new(&[]).is_err());
        assert!(NdRange::new(&[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_zero_work_items() {
        // A zero extent is a valid, empty launch.
        let r = NdRange::new(&[0, 8]).unwrap();
        assert_eq!(r.total(), 0);
    }
}
