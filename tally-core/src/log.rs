use crate::window::DateWindow;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logged API request. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Unique record identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Authenticated user the request was made as
    pub user: String,

    /// Host header the request was served on
    pub host: String,

    /// HTTP method
    pub method: String,

    /// Raw request path as logged
    pub path: String,

    /// When the request was received
    pub requested_at: DateTime<Utc>,
}

/// Equality filters applied before any window or pattern predicate.
///
/// The filtered view is the base population for both billing-window
/// aggregates: a record outside the filter never reaches a count.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Required owner of the records
    pub user: String,

    /// Restrict to this serving host (None = all hosts)
    pub host: Option<String>,

    /// HTTP method allow-list (empty = all methods)
    pub methods: Vec<String>,
}

impl LogFilter {
    pub fn matches(&self, record: &RequestRecord) -> bool {
        if record.user != self.user {
            return false;
        }
        if let Some(ref host) = self.host {
            if &record.host != host {
                return false;
            }
        }
        if !self.methods.is_empty() && !self.methods.iter().any(|m| m == &record.method) {
            return false;
        }
        true
    }
}

/// Queryable append-only request log.
///
/// The store only ever grows; reports are read-only over it. Implementors
/// live in `tally-store`.
pub trait RequestLog: Send + Sync {
    /// Append one record.
    fn append(&self, record: RequestRecord);

    /// Count records passing `filter`, optionally restricted to a billing
    /// window (on the record's UTC date) and a path matcher.
    fn count(&self, filter: &LogFilter, window: Option<&DateWindow>, path: Option<&Regex>) -> u64;

    /// Total number of records ever appended.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
