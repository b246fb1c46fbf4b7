use plena_booking_domain::{Availability, AvailabilitySlot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlotDTO {
    pub start_ts: i64,
    pub end_ts: i64,
    pub duration_minutes: i64,
    pub location: Option<String>,
}

impl AvailabilitySlotDTO {
    pub fn new(slot: AvailabilitySlot) -> Self {
        Self {
            start_ts: slot.start_ts,
            end_ts: slot.end_ts(),
            duration_minutes: slot.duration / (1000 * 60),
            location: slot.location,
        }
    }
}

/// Slot sets keyed by duration in minutes.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDTO {
    pub slots_by_duration: BTreeMap<i64, Vec<AvailabilitySlotDTO>>,
}

impl AvailabilityDTO {
    pub fn new(availability: Availability) -> Self {
        Self {
            slots_by_duration: availability
                .slots_by_duration
                .into_iter()
                .map(|(duration, slots)| {
                    (
                        duration,
                        slots.into_iter().map(AvailabilitySlotDTO::new).collect(),
                    )
                })
                .collect(),
        }
    }
}
