//! Record sink doubles.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::RecordBatch;
use crate::error::{Result, SinkError};
use crate::port::RecordSink;

/// Keeps a copy of every batch it is given.
pub struct RecordingSink {
    name: &'static str,
    batches: Mutex<Vec<RecordBatch>>,
}

impl RecordingSink {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn batches(&self) -> Vec<RecordBatch> {
        self.batches.lock().clone()
    }

    /// Total rows across all received batches.
    pub fn rows(&self) -> usize {
        self.batches.lock().iter().map(RecordBatch::len).sum()
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn write(&self, batch: &RecordBatch) -> Result<()> {
        self.batches.lock().push(batch.clone());
        Ok(())
    }
}

/// Rejects its first `n` writes, then records like [`RecordingSink`].
pub struct FailingSink {
    name: &'static str,
    remaining_failures: Mutex<usize>,
    written: Mutex<Vec<RecordBatch>>,
}

impl FailingSink {
    pub fn failing_times(name: &'static str, n: usize) -> Self {
        Self {
            name,
            remaining_failures: Mutex::new(n),
            written: Mutex::new(Vec::new()),
        }
    }

    /// A sink that never accepts a batch.
    pub fn always(name: &'static str) -> Self {
        Self::failing_times(name, usize::MAX)
    }

    /// Batches accepted after the failures ran out.
    pub fn written(&self) -> Vec<RecordBatch> {
        self.written.lock().clone()
    }
}

#[async_trait]
impl RecordSink for FailingSink {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn write(&self, batch: &RecordBatch) -> Result<()> {
        {
            let mut remaining = self.remaining_failures.lock();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SinkError::Undelivered {
                    sink: self.name,
                    reason: "scripted failure".into(),
                }
                .into());
            }
        }
        self.written.lock().push(batch.clone());
        Ok(())
    }
}
