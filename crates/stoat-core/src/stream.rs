use std::fmt;
use std::sync::{Arc, Mutex};

use crate::args::{KernelArg, KernelArgList};
use crate::error::{Error, Result};
use crate::nd_range::NdRange;

// ComputeStream — Ordered device work queue
//
// A stream accepts (iteration space, kernel, argument list) triples and
// schedules them for asynchronous execution, FIFO per stream. This crate
// only ever calls one operation on it: parallel_for. Completion, ordering
// across streams, cancellation, and synchronization all belong to the
// stream implementation, not to the dispatch core.

/// Opaque handle to a compiled device kernel.
///
/// Handles are minted by an engine's registry; compilation itself is the
/// backend's concern. Cloning is cheap (shared name).
#[derive(Clone, PartialEq, Eq)]
pub struct KernelHandle {
    name: Arc<str>,
    id: u64,
}

impl KernelHandle {
    pub fn new(name: impl Into<Arc<str>>, id: u64) -> Self {
        KernelHandle {
            name: name.into(),
            id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Debug for KernelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KernelHandle({}#{})", self.name, self.id)
    }
}

/// Ordered queue abstraction accepting asynchronous kernel launches.
///
/// `parallel_for` returns the submission status only: success means the
/// launch was enqueued, not that it completed. Executors propagate this
/// status verbatim.
pub trait ComputeStream: Send + Sync {
    fn parallel_for(
        &self,
        range: &NdRange,
        kernel: &KernelHandle,
        args: &KernelArgList,
    ) -> Result<()>;
}

// RecordingStream — In-process stream that records every submission
//
// Stands in for a device queue in tests and dry runs: it validates the
// argument list the way a real enqueue would, then stores a snapshot of
// the launch request instead of executing anything.

/// One recorded launch request.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub kernel: String,
    pub range: NdRange,
    pub args: Vec<KernelArg>,
}

/// A [`ComputeStream`] that records submissions instead of executing them.
/// Optionally fails every enqueue, to exercise device-failure propagation.
#[derive(Default)]
pub struct RecordingStream {
    submissions: Mutex<Vec<Submission>>,
    fail_with: Option<String>,
}

impl RecordingStream {
    pub fn new() -> Self {
        RecordingStream::default()
    }

    /// A stream whose every enqueue fails with the given message.
    pub fn failing(msg: impl Into<String>) -> Self {
        RecordingStream {
            submissions: Mutex::new(Vec::new()),
            fail_with: Some(msg.into()),
        }
    }

    /// Snapshot of everything submitted so far, in order.
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ComputeStream for RecordingStream {
    fn parallel_for(
        &self,
        range: &NdRange,
        kernel: &KernelHandle,
        args: &KernelArgList,
    ) -> Result<()> {
        let args = args.snapshot()?;
        if let Some(msg) = &self.fail_with {
            return Err(Error::Enqueue(msg.clone()));
        }
        self.submissions.lock().unwrap().push(Submission {
            kernel: kernel.name().to_string(),
            range: range.clone(),
            args,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::StorageHandle;

    #[test]
    fn test_recording_stream_captures_submission() {
        let stream = RecordingStream::new();
        let kernel = KernelHandle::new("k", 1);
        let mut args = KernelArgList::new();
        args.set(0, StorageHandle::new(3));
        args.set(1, 2.0f32);

        stream
            .parallel_for(&NdRange::from(8), &kernel, &args)
            .unwrap();

        let subs = stream.submissions();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].kernel, "k");
        assert_eq!(subs[0].range.total(), 8);
        assert_eq!(subs[0].args.len(), 2);
    }

    #[test]
    fn test_recording_stream_rejects_holes() {
        let stream = RecordingStream::new();
        let kernel = KernelHandle::new("k", 1);
        let mut args = KernelArgList::new();
        args.set(1, 2.0f32); // position 0 unset

        let err = stream
            .parallel_for(&NdRange::from(1), &kernel, &args)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
        assert!(stream.is_empty());
    }

    #[test]
    fn test_failing_stream_reports_enqueue_error() {
        let stream = RecordingStream::failing("device lost");
        let kernel = KernelHandle::new("k", 1);
        let err = stream
            .parallel_for(&NdRange::from(1), &kernel, &KernelArgList::new())
            .unwrap_err();
        assert!(matches!(err, Error::Enqueue(_)));
    }
}
