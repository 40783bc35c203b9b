//! Activity classification from recency.

use chrono::{DateTime, Utc};

use crate::types::ActivityStatus;

/// Updated within this many days counts as active
pub const ACTIVE_DAYS: f64 = 30.0;
/// Updated within this many days counts as stable
pub const STABLE_DAYS: f64 = 90.0;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Classify a repository. Archived wins over recency; thresholds are strict.
pub fn classify_activity_status(days_since_update: f64, archived: bool) -> ActivityStatus {
    if archived {
        ActivityStatus::Archived
    } else if days_since_update < ACTIVE_DAYS {
        ActivityStatus::Active
    } else if days_since_update < STABLE_DAYS {
        ActivityStatus::Stable
    } else {
        ActivityStatus::Dormant
    }
}

/// Fractional days elapsed between `timestamp` and `now`.
pub fn days_since(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - timestamp).num_milliseconds() as f64 / MILLIS_PER_DAY
}
