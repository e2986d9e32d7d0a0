use serde::Serialize;
use std::sync::Mutex;

/// Counts view synchronizations and rejected events.
pub struct SyncRecorder {
    inner: Mutex<SyncCounters>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncCounters {
    pub syncs: usize,
    pub rejected: usize,
}

impl SyncRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SyncCounters::default()),
        }
    }

    pub fn record_sync(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.syncs += 1;
        }
    }

    pub fn record_rejected(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.rejected += 1;
        }
    }

    pub fn snapshot(&self) -> SyncCounters {
        if let Ok(counters) = self.inner.lock() {
            *counters
        } else {
            SyncCounters::default()
        }
    }
}

impl Default for SyncRecorder {
    fn default() -> Self {
        Self::new()
    }
}
