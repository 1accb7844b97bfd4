use regex::Regex;
use std::sync::RwLock;
use tally_core::log::{LogFilter, RequestLog, RequestRecord};
use tally_core::window::DateWindow;
use tracing::debug;

/// In-memory append-only request log.
///
/// Records are only ever pushed; counting scans the filtered population.
/// Good enough for a single-process sidecar — durable storage is the
/// hosting gateway's concern, written through the ingest endpoint.
pub struct MemoryLog {
    entries: RwLock<Vec<RequestRecord>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of all records, oldest first. Test/debug helper.
    pub fn all(&self) -> Vec<RequestRecord> {
        self.entries.read().expect("log lock poisoned").clone()
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestLog for MemoryLog {
    fn append(&self, record: RequestRecord) {
        debug!(
            user = %record.user,
            method = %record.method,
            path = %record.path,
            "Request recorded"
        );
        self.entries.write().expect("log lock poisoned").push(record);
    }

    fn count(&self, filter: &LogFilter, window: Option<&DateWindow>, path: Option<&Regex>) -> u64 {
        self.entries
            .read()
            .expect("log lock poisoned")
            .iter()
            .filter(|r| filter.matches(r))
            .filter(|r| window.is_none_or(|w| w.contains(r.requested_at.date_naive())))
            .filter(|r| path.is_none_or(|re| re.is_match(&r.path)))
            .count() as u64
    }

    fn len(&self) -> usize {
        self.entries.read().expect("log lock poisoned").len()
    }
}
