mod appointment;
pub mod booking_slots;
mod capability;
mod date;
mod event;
mod filter;
mod interval;
mod namespace;
mod shared;
pub mod tag;

pub use appointment::{
    derive_status, AppointmentAction, AppointmentRecord, AppointmentStatus, EventPatch, Transition,
};
pub use booking_slots::{
    build_adjacent_availability, build_availability, generate_slots, validate_availability_query,
    Availability,
    AvailabilityQuery, AvailabilityQueryError, AvailabilitySlot, SlotGeneratorOptions,
};
pub use capability::{CapabilityClaims, CapabilityCodec, CapabilityError, LinkPayload};
pub use event::{CalendarEvent, EventStatus};
pub use filter::{filter_for_namespace, filter_general, BlockingScope, GeneralSchedule, NamespaceSchedule};
pub use interval::{BusyIntervals, InvalidIntervalError, TimeInterval};
pub use namespace::{NamespaceSettings, OpenHours};
pub use shared::entity::{Entity, InvalidIDError, ID};
