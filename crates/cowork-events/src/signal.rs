//! Signal payloads.

use serde::{Deserialize, Serialize};

/// A broadcast record plus its dispatch timestamp.
///
/// On the wire the record's own fields sit next to `timestamp`, so a signal
/// decodes as the record it carries. The timestamp is milliseconds since the
/// Unix epoch and strictly increases per broadcasting context; two signals
/// carrying identical records are still told apart by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal<T> {
    /// The broadcast record.
    #[serde(flatten)]
    pub record: T,

    /// Dispatch time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl<T> Signal<T> {
    /// Wrap `record` with a dispatch timestamp.
    #[must_use]
    pub const fn new(record: T, timestamp: i64) -> Self {
        Self { record, timestamp }
    }

    /// Discard the timestamp.
    #[must_use]
    pub fn into_record(self) -> T {
        self.record
    }
}
