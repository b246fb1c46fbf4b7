use crate::date;
use crate::event::CalendarEvent;
use crate::interval::{BusyIntervals, TimeInterval};
use crate::namespace::OpenHours;
use chrono::TimeZone;
use chrono_tz::Tz;
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;

const MILLIS_PER_MINUTE: i64 = 1000 * 60;
const MILLIS_PER_DAY: i64 = MILLIS_PER_MINUTE * 60 * 24;

/// A bookable candidate. Computed on every availability request, never
/// persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub start_ts: i64,
    /// Appointment length in millis.
    pub duration: i64,
    /// Inherited from the container event the slot nests inside, if any.
    pub location: Option<String>,
}

impl AvailabilitySlot {
    pub fn end_ts(&self) -> i64 {
        self.start_ts + self.duration
    }
}

pub struct SlotGeneratorOptions {
    /// Candidate slots must fit inside this range.
    pub range: TimeInterval,
    /// Appointment length in millis.
    pub duration: i64,
    /// Step between candidate starts in millis. Standard pages use the
    /// duration itself; "next available" pages use a finer step.
    pub interval: i64,
    /// Minimum notice in millis between `now` and the earliest slot.
    pub lead_time: i64,
    /// Symmetric transit/setup buffer in millis around the candidate.
    pub padding: i64,
    /// Current instant in epoch millis.
    pub now: i64,
    /// Namespace timezone, used to resolve the open-hours policy.
    pub timezone: Tz,
}

/// Walks the range in `interval` steps and emits every candidate that
/// honors lead time, padding against busy time, and the open-hours policy.
/// All comparisons operate on absolute instants.
pub fn generate_slots(
    busy: &BusyIntervals,
    open_hours: Option<&OpenHours>,
    opts: &SlotGeneratorOptions,
) -> Vec<AvailabilitySlot> {
    let mut slots = Vec::new();
    if opts.duration < 1 || opts.interval < 1 {
        return slots;
    }

    let earliest = opts.now + opts.lead_time;

    let mut cursor = opts.range.start_ts();
    while cursor + opts.duration <= opts.range.end_ts() {
        let start_ts = cursor;
        cursor += opts.interval;

        if start_ts < earliest {
            continue;
        }
        // Constructor cannot fail here since duration >= 1.
        let candidate = match TimeInterval::new(start_ts, start_ts + opts.duration) {
            Ok(c) => c,
            Err(_) => continue,
        };
        if busy.blocks(&candidate.padded(opts.padding)) {
            continue;
        }
        if let Some(hours) = open_hours {
            if !hours.contains(&candidate, opts.timezone) {
                continue;
            }
        }

        slots.push(AvailabilitySlot {
            start_ts,
            duration: opts.duration,
            location: None,
        });
    }

    slots
}

/// Per-duration slot sets for one namespace. Keyed by duration in minutes,
/// so a client switching duration sees independently generated, consistent
/// sets instead of one filtered set.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Availability {
    pub slots_by_duration: BTreeMap<i64, Vec<AvailabilitySlot>>,
}

impl Availability {
    pub fn slot_count(&self, duration_minutes: i64) -> usize {
        self.slots_by_duration
            .get(&duration_minutes)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn counts(&self) -> BTreeMap<i64, usize> {
        self.slots_by_duration
            .iter()
            .map(|(duration, slots)| (*duration, slots.len()))
            .collect()
    }
}

/// Runs the slot generator once per allowed duration.
///
/// With containers, each container contributes its own candidate stream
/// restricted to `container ∩ range`, and the streams are merged in start
/// order without deduplication; slots inherit the container's location.
/// Without containers the whole range is one stream.
pub fn build_availability(
    busy: &BusyIntervals,
    containers: &[CalendarEvent],
    open_hours: Option<&OpenHours>,
    base: &SlotGeneratorOptions,
    allowed_durations: &[i64],
) -> Availability {
    let mut availability = Availability::default();

    for &duration_minutes in allowed_durations {
        let duration = duration_minutes * MILLIS_PER_MINUTE;
        let interval = if base.interval > 0 {
            base.interval
        } else {
            duration
        };
        let duration_opts = |range: TimeInterval| SlotGeneratorOptions {
            range,
            duration,
            interval,
            lead_time: base.lead_time,
            padding: base.padding,
            now: base.now,
            timezone: base.timezone,
        };

        let slots = if containers.is_empty() {
            generate_slots(busy, open_hours, &duration_opts(base.range))
        } else {
            let streams = containers
                .iter()
                .filter_map(|container| {
                    let container_interval = container.interval().ok()?;
                    let range = container_interval.intersection(&base.range)?;
                    let mut slots = generate_slots(busy, open_hours, &duration_opts(range));
                    for slot in &mut slots {
                        slot.location = container.location.clone();
                    }
                    Some(slots)
                })
                .collect::<Vec<_>>();

            streams
                .into_iter()
                .kmerge_by(|a, b| a.start_ts < b.start_ts)
                .collect()
        };

        availability.slots_by_duration.insert(duration_minutes, slots);
    }

    availability
}

/// Per-duration slots directly following an anchor appointment. The range
/// is bounded by the anchor's end plus a short lookahead, which caps the
/// computation and matches the product semantics of filling small gaps
/// around an existing appointment.
pub fn build_adjacent_availability(
    busy: &BusyIntervals,
    containers: &[CalendarEvent],
    open_hours: Option<&OpenHours>,
    anchor: &CalendarEvent,
    lookahead: i64,
    base: &SlotGeneratorOptions,
    allowed_durations: &[i64],
) -> Availability {
    let mut availability = Availability::default();

    for &duration_minutes in allowed_durations {
        let duration = duration_minutes * MILLIS_PER_MINUTE;
        // Candidate starts stay within the lookahead window; the slot
        // itself may extend past it.
        let range = match TimeInterval::new(anchor.end_ts, anchor.end_ts + lookahead + duration) {
            Ok(range) => range,
            Err(_) => continue,
        };
        let opts = SlotGeneratorOptions {
            range,
            duration,
            interval: base.interval,
            lead_time: base.lead_time,
            padding: base.padding,
            now: base.now,
            timezone: base.timezone,
        };

        let mut slots = generate_slots(busy, open_hours, &opts);
        for slot in &mut slots {
            slot.location = containers
                .iter()
                .find(|container| match container.interval() {
                    Ok(interval) => {
                        interval.start_ts() <= slot.start_ts && slot.end_ts() <= interval.end_ts()
                    }
                    Err(_) => false,
                })
                .and_then(|container| container.location.clone());
        }

        availability.slots_by_duration.insert(duration_minutes, slots);
    }

    availability
}

pub struct AvailabilityQuery {
    pub start_date: String,
    pub end_date: String,
    pub timezone: Option<Tz>,
    /// Requested durations in minutes.
    pub durations: Vec<i64>,
}

#[derive(Debug, PartialEq)]
pub enum AvailabilityQueryError {
    InvalidDate(String),
    InvalidTimespan,
    InvalidDuration(i64),
}

const MIN_DURATION_MINUTES: i64 = 5;
const MAX_DURATION_MINUTES: i64 = 60 * 8;

/// Resolves the query's date strings to an absolute range covering whole
/// local days in the query timezone.
pub fn validate_availability_query(
    query: &AvailabilityQuery,
) -> Result<TimeInterval, AvailabilityQueryError> {
    for &duration in &query.durations {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
            return Err(AvailabilityQueryError::InvalidDuration(duration));
        }
    }

    let tz = query.timezone.unwrap_or(chrono_tz::UTC);

    let start_date = date::parse_date(&query.start_date)
        .map_err(|_| AvailabilityQueryError::InvalidDate(query.start_date.clone()))?;
    let end_date = date::parse_date(&query.end_date)
        .map_err(|_| AvailabilityQueryError::InvalidDate(query.end_date.clone()))?;

    let start_ts = tz
        .from_local_datetime(&start_date.and_hms_opt(0, 0, 0).unwrap_or_default())
        .earliest()
        .ok_or_else(|| AvailabilityQueryError::InvalidDate(query.start_date.clone()))?
        .timestamp_millis();
    let end_ts = tz
        .from_local_datetime(&end_date.and_hms_opt(0, 0, 0).unwrap_or_default())
        .earliest()
        .ok_or_else(|| AvailabilityQueryError::InvalidDate(query.end_date.clone()))?
        .timestamp_millis()
        + MILLIS_PER_DAY;

    TimeInterval::new(start_ts, end_ts).map_err(|_| AvailabilityQueryError::InvalidTimespan)
}
