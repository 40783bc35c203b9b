//! Commit velocity from weekly activity.

use crate::types::CommitActivitySample;

/// Trailing weeks considered (~90 days)
pub const VELOCITY_WEEKS: usize = 13;

/// Estimated commits per month: the trailing 13 weekly totals summed, divided
/// by 13, scaled by 30 and rounded. Fewer samples are used as-is.
pub fn commit_velocity(samples: &[CommitActivitySample]) -> u32 {
    let window = &samples[samples.len().saturating_sub(VELOCITY_WEEKS)..];
    let total: u64 = window.iter().map(|s| u64::from(s.total)).sum();
    (total as f64 / VELOCITY_WEEKS as f64 * 30.0).round() as u32
}
