//! Activity graph over the trailing half year of weekly samples.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::types::{ActivityGraph, ActivityWeek, CommitActivitySample, CommitMetrics};

/// Weeks shown in the graph
pub const GRAPH_WEEKS: usize = 26;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Build the graph window and its aggregate metrics.
///
/// `total_commits` covers every sample; the 30/90-day sums count weeks whose
/// start falls inside the period ending at `now`. Streaks and the busiest
/// weekday are computed over the graph window only.
pub fn build_activity_graph(samples: &[CommitActivitySample], now: DateTime<Utc>) -> ActivityGraph {
    let window = &samples[samples.len().saturating_sub(GRAPH_WEEKS)..];

    let weeks = window
        .iter()
        .enumerate()
        .map(|(index, sample)| ActivityWeek {
            week: index,
            date: week_start_date(sample.week),
            commits: sample.total,
            days: sample.days,
        })
        .collect();

    let commits_last_30_days = commits_since(samples, now - Duration::days(30));
    let commits_last_90_days = commits_since(samples, now - Duration::days(90));

    let daily = daily_counts(window, now);

    ActivityGraph {
        weeks,
        metrics: CommitMetrics {
            total_commits: samples.iter().map(|s| u64::from(s.total)).sum(),
            commits_last_30_days,
            commits_last_90_days,
            average_commits_per_month: (commits_last_90_days as f64 / 3.0).round() as u64,
            longest_streak: longest_streak(&daily),
            current_streak: current_streak(&daily),
            most_active_day: most_active_day(window),
        },
    }
}

fn week_start_date(week: i64) -> String {
    DateTime::from_timestamp(week, 0)
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_default()
}

fn commits_since(samples: &[CommitActivitySample], since: DateTime<Utc>) -> u64 {
    let cutoff = since.timestamp();
    samples
        .iter()
        .filter(|s| s.week >= cutoff)
        .map(|s| u64::from(s.total))
        .sum()
}

/// Per-day counts in chronological order, dropping days after today.
fn daily_counts(window: &[CommitActivitySample], now: DateTime<Utc>) -> Vec<u32> {
    let today: NaiveDate = now.date_naive();
    window
        .iter()
        .flat_map(|sample| {
            sample.days.iter().enumerate().map(move |(offset, &count)| {
                let day = sample.week + offset as i64 * SECONDS_PER_DAY;
                (day, count)
            })
        })
        .filter(|&(day, _)| {
            DateTime::from_timestamp(day, 0).is_some_and(|dt| dt.date_naive() <= today)
        })
        .map(|(_, count)| count)
        .collect()
}

fn longest_streak(daily: &[u32]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    for &count in daily {
        if count > 0 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

/// Run of active days ending at the latest day. A quiet "today" is skipped
/// since the day is not over yet.
fn current_streak(daily: &[u32]) -> u32 {
    let mut days = daily.iter().rev().peekable();
    if days.peek() == Some(&&0) {
        days.next();
    }
    days.take_while(|&&count| count > 0).count() as u32
}

fn most_active_day(window: &[CommitActivitySample]) -> Option<String> {
    let mut per_weekday = [0u64; 7];
    for sample in window {
        for (weekday, &count) in sample.days.iter().enumerate() {
            per_weekday[weekday] += u64::from(count);
        }
    }

    let mut best: Option<(usize, u64)> = None;
    for (weekday, &count) in per_weekday.iter().enumerate() {
        if count > 0 && best.is_none_or(|(_, top)| count > top) {
            best = Some((weekday, count));
        }
    }
    best.map(|(weekday, _)| WEEKDAYS[weekday].to_string())
}
