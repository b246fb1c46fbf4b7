use crate::filter::BlockingScope;
use crate::interval::TimeInterval;
use chrono::{TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Daily opening window in the namespace's local clock, expressed as
/// minutes from local midnight. The slot generator resolves candidates to
/// local time through the timezone before comparing, so the window stays
/// correct across daylight-saving transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHours {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl OpenHours {
    /// Whether the candidate interval falls entirely within the opening
    /// window of a single local day.
    pub fn contains(&self, interval: &TimeInterval, tz: Tz) -> bool {
        let start = match tz.timestamp_millis_opt(interval.start_ts()).single() {
            Some(dt) => dt,
            None => return false,
        };
        let end = match tz.timestamp_millis_opt(interval.end_ts()).single() {
            Some(dt) => dt,
            None => return false,
        };

        let start_minute = start.hour() * 60 + start.minute();
        let end_minute = if end.date_naive() == start.date_naive() {
            end.hour() * 60 + end.minute()
        } else if end.hour() == 0
            && end.minute() == 0
            && Some(end.date_naive()) == start.date_naive().succ_opt()
        {
            // Ending exactly at next midnight still counts as the same day.
            24 * 60
        } else {
            return false;
        };

        start_minute >= self.start_minute && end_minute <= self.end_minute
    }
}

/// Per booking product configuration. Multiple namespaces share one
/// calendar; each gets its own durations, notice and buffer rules, and
/// blocking policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSettings {
    pub slug: String,
    /// Bookable appointment lengths in minutes.
    pub allowed_durations: Vec<i64>,
    /// Minimum notice in minutes between "now" and the earliest slot.
    #[serde(default)]
    pub lead_time: i64,
    /// Buffer in minutes required before and after a booking.
    #[serde(default)]
    pub padding: i64,
    #[serde(default)]
    pub blocking_scope: BlockingScope,
    #[serde(default)]
    pub open_hours: Option<OpenHours>,
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
}

fn default_timezone() -> Tz {
    chrono_tz::UTC
}
