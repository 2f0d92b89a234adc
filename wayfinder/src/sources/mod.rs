//! Input sources: viewer position, selected destination and travel mode.
//!
//! Each store owns a `tokio::sync::watch` sender. The engine session only
//! ever holds receivers, so sources stay read-only to it.

mod destination;
mod location;
mod settings;

pub use destination::{
    Destination, DestinationStore, Facility, FacilityLocation, DEFAULT_FACILITY_NAME,
    MISSING_ADDRESS,
};
pub use location::{GeolocationError, LocationStore, PositionReading};
pub use settings::MapSettingsStore;
