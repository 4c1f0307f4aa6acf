//! Shared database time conversion helpers.

use chrono::{DateTime, Utc};

pub(super) fn to_millis(at: DateTime<Utc>) -> u64 {
    // Pre-epoch timestamps are clamped; nothing we store predates 1970.
    at.timestamp_millis().max(0) as u64
}
