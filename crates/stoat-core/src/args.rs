use crate::error::{Error, Result};

// KernelArgList — Positional argument binding for one kernel launch
//
// A kernel launch is described declaratively: an ordered list of tagged
// values bound to positional slots. The list is built fresh for every
// execution, handed to the compute stream together with the iteration
// space, and never reused across calls except as a cleared container.
//
// Argument order is part of each kernel's contract. Executors document and
// test the order they produce; this container only guarantees positional
// addressing and that no slot is silently left unset at enqueue time.

/// Opaque token standing for a device buffer bound by the external memory
/// layer. Compared by identity only; id 0 is the null storage (an operand
/// slot that is intentionally absent, e.g. a missing bias).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageHandle {
    id: u64,
}

impl StorageHandle {
    pub fn new(id: u64) -> Self {
        StorageHandle { id }
    }

    /// The null storage: bound to operand slots that carry no data.
    pub fn null() -> Self {
        StorageHandle { id: 0 }
    }

    pub fn is_null(&self) -> bool {
        self.id == 0
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// One tagged kernel argument value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelArg {
    Storage(StorageHandle),
    F32(f32),
    I32(i32),
}

impl From<StorageHandle> for KernelArg {
    fn from(h: StorageHandle) -> Self {
        KernelArg::Storage(h)
    }
}

impl From<f32> for KernelArg {
    fn from(v: f32) -> Self {
        KernelArg::F32(v)
    }
}

impl From<i32> for KernelArg {
    fn from(v: i32) -> Self {
        KernelArg::I32(v)
    }
}

/// Mutable, positionally-addressed argument list for one kernel launch.
#[derive(Debug, Clone, Default)]
pub struct KernelArgList {
    slots: Vec<Option<KernelArg>>,
}

impl KernelArgList {
    pub fn new() -> Self {
        KernelArgList::default()
    }

    /// Bind `arg` to position `index`, growing the list as needed.
    /// Re-setting a position overwrites the previous binding.
    pub fn set(&mut self, index: usize, arg: impl Into<KernelArg>) {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(arg.into());
    }

    pub fn get(&self, index: usize) -> Option<&KernelArg> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    /// Number of positions, i.e. the highest set index plus one.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reset to an empty container for reuse.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Check that every position up to `len()` is bound. Streams call this
    /// at enqueue time; a hole is a contract violation by the executor.
    pub fn validate(&self) -> Result<()> {
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.is_none() {
                return Err(Error::invalid_args(format!(
                    "kernel argument {} of {} is unset",
                    i,
                    self.slots.len()
                )));
            }
        }
        Ok(())
    }

    /// Snapshot the bound values in positional order.
    /// Fails like [`KernelArgList::validate`] if any position is unset.
    pub fn snapshot(&self) -> Result<Vec<KernelArg>> {
        let mut out = Vec::with_capacity(self.slots.len());
        for (i, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(arg) => out.push(*arg),
                None => {
                    return Err(Error::invalid_args(format!(
                        "kernel argument {} of {} is unset",
                        i,
                        self.slots.len()
                    )))
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut args = KernelArgList::new();
        args.set(0, StorageHandle::new(7));
        args.set(1, 0.5f32);
        args.set(2, -3i32);
        assert_eq!(args.len(), 3);
        assert_eq!(args.get(0), Some(&KernelArg::Storage(StorageHandle::new(7))));
        assert_eq!(args.get(1), Some(&KernelArg::F32(0.5)));
        assert_eq!(args.get(2), Some(&KernelArg::I32(-3)));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_out_of_order_set_leaves_holes() {
        let mut args = KernelArgList::new();
        args.set(2, 1.0f32);
        assert_eq!(args.len(), 3);
        assert!(args.get(0).is_none());
        assert!(args.validate().is_err());
        assert!(args.snapshot().is_err());
    }

    #[test]
    fn test_overwrite() {
        let mut args = KernelArgList::new();
        args.set(0, 1.0f32);
        args.set(0, 2.0f32);
        assert_eq!(args.get(0), Some(&KernelArg::F32(2.0)));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut args = KernelArgList::new();
        args.set(0, 1.0f32);
        args.clear();
        assert!(args.is_empty());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_null_storage() {
        assert!(StorageHandle::null().is_null());
        assert!(!StorageHandle::new(1).is_null());
    }
}
