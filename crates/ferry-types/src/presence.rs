//! Driver presence

use chrono::{DateTime, Duration, Utc};

/// How long a heartbeat keeps a driver counted as recently active, in seconds
pub const PRESENCE_WINDOW_SECS: i64 = 5 * 60;

pub fn presence_window() -> Duration {
    Duration::seconds(PRESENCE_WINDOW_SECS)
}

/// Oldest `last_seen` that still counts as active at `now`
pub fn presence_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - presence_window()
}

/// Whether a driver last seen at `last_seen` is active at `now`.
///
/// The window is closed on both ends; a heartbeat stamped after `now` does
/// not count.
pub fn is_recently_active(last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    last_seen.is_some_and(|seen| seen >= presence_cutoff(now) && seen <= now)
}
