//! Guard log retention.
//!
//! The store keeps log records bounded three ways, applied in order on every
//! mutation and every read:
//! - Age: records older than `retention_days` expire
//! - Count: the oldest records go while there are more than `max_entries`
//! - Size: the oldest records go while the compact JSON array exceeds `max_bytes`
//!
//! Every pass that removes something reports a [`PruneSummary`] and logs it.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use sm_common::SendTrigger;
//! use sm_telemetry::{GuardLogEntry, LogStore, LogStoreConfig};
//!
//! let mut store = LogStore::new(LogStoreConfig::default());
//! store.add(GuardLogEntry::fallback("claude.ai", SendTrigger::Enter, "offline", Utc::now()));
//! assert_eq!(store.list().len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sm_common::config::{DEFAULT_LOG_RETENTION_DAYS, DEFAULT_MAX_LOG_BYTES, DEFAULT_MAX_LOG_ENTRIES};
use sm_common::GuardSettings;
use tracing::debug;

use crate::entry::GuardLogEntry;

/// Retention limits for the log store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStoreConfig {
    pub retention_days: u32,
    pub max_entries: usize,
    pub max_bytes: usize,
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_LOG_RETENTION_DAYS,
            max_entries: DEFAULT_MAX_LOG_ENTRIES,
            max_bytes: DEFAULT_MAX_LOG_BYTES,
        }
    }
}

impl From<&GuardSettings> for LogStoreConfig {
    fn from(settings: &GuardSettings) -> Self {
        Self {
            retention_days: settings.log_retention_days,
            max_entries: settings.max_log_entries,
            max_bytes: settings.max_log_bytes,
        }
    }
}

/// Records removed by one prune pass, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneSummary {
    pub expired: usize,
    pub over_count: usize,
    pub over_bytes: usize,
}

impl PruneSummary {
    pub fn total(&self) -> usize {
        self.expired + self.over_count + self.over_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Bounded in-memory log of guard records.
///
/// Entries are held oldest first.
pub struct LogStore {
    config: LogStoreConfig,
    entries: Vec<GuardLogEntry>,
    clock: Clock,
}

impl fmt::Debug for LogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStore")
            .field("config", &self.config)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl LogStore {
    pub fn new(config: LogStoreConfig) -> Self {
        Self::with_clock(config, Utc::now)
    }

    /// Store whose notion of "now" comes from `clock`.
    pub fn with_clock<F>(config: LogStoreConfig, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            config,
            entries: Vec::new(),
            clock: Arc::new(clock),
        }
    }

    pub fn config(&self) -> LogStoreConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the contents with previously persisted records.
    pub fn hydrate(&mut self, entries: Vec<GuardLogEntry>) -> PruneSummary {
        self.entries = entries;
        self.prune()
    }

    /// Append a record.
    pub fn add(&mut self, entry: GuardLogEntry) -> PruneSummary {
        self.entries.push(entry);
        self.prune()
    }

    /// Surviving records, newest first.
    pub fn list(&mut self) -> Vec<GuardLogEntry> {
        self.prune();
        let mut listed = self.entries.clone();
        listed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        listed
    }

    /// Surviving records, oldest first, as they are persisted.
    pub fn entries(&self) -> &[GuardLogEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        debug!(dropped, "guard log cleared");
    }

    pub fn update_config(&mut self, config: LogStoreConfig) -> PruneSummary {
        self.config = config;
        self.prune()
    }

    /// Apply the age, count, and size limits.
    pub fn prune(&mut self) -> PruneSummary {
        let now = (self.clock)();
        let mut summary = PruneSummary::default();

        // a window reaching past the calendar's start expires nothing
        if let Some(expires_before) =
            now.checked_sub_signed(Duration::days(i64::from(self.config.retention_days)))
        {
            let before = self.entries.len();
            self.entries.retain(|e| e.timestamp >= expires_before);
            summary.expired = before - self.entries.len();
        }

        // stable, so equal timestamps keep insertion order
        self.entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        if self.entries.len() > self.config.max_entries {
            summary.over_count = self.entries.len() - self.config.max_entries;
            self.entries.drain(..summary.over_count);
        }

        let sizes: Vec<usize> = self.entries.iter().map(serialized_len).collect();
        let mut total = array_len(&sizes);
        let mut cut = 0;
        while cut < sizes.len() && total > self.config.max_bytes {
            total -= sizes[cut];
            if cut + 1 < sizes.len() {
                total -= 1; // separating comma
            }
            cut += 1;
        }
        if cut > 0 {
            self.entries.drain(..cut);
            summary.over_bytes = cut;
        }

        if !summary.is_empty() {
            debug!(
                expired = summary.expired,
                over_count = summary.over_count,
                over_bytes = summary.over_bytes,
                remaining = self.entries.len(),
                "guard log pruned"
            );
        }
        summary
    }

    /// Size in bytes of the compact JSON array of the current records.
    pub fn byte_size(&self) -> usize {
        let sizes: Vec<usize> = self.entries.iter().map(serialized_len).collect();
        array_len(&sizes)
    }
}

fn serialized_len(entry: &GuardLogEntry) -> usize {
    serde_json::to_vec(entry).map(|v| v.len()).unwrap_or(0)
}

/// Length of `[e1,e2,...]` given each element's length.
fn array_len(sizes: &[usize]) -> usize {
    2 + sizes.iter().sum::<usize>() + sizes.len().saturating_sub(1)
}
