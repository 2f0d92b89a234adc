//! Selected destination store.
//!
//! Facilities arrive in the shape the facility API returns them. The store
//! turns them into a [`Destination`] with display defaults filled in, and
//! publishes `None` for a facility that has no usable coordinates.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::coord::Coordinate;

/// Name used when a facility has none.
pub const DEFAULT_FACILITY_NAME: &str = "Selected Destination";

/// Address used when a facility has no address parts.
pub const MISSING_ADDRESS: &str = "Address not available";

/// Facility location as returned by the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FacilityLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Raw facility record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Facility {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub location: Option<FacilityLocation>,
}

impl Facility {
    /// Street, house number and city joined by spaces.
    pub fn address(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.street, &self.house_number, &self.city]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// Valid coordinate of the facility, if it has one.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let location = self.location.as_ref()?;
        Coordinate::try_new(location.latitude?, location.longitude?).ok()
    }
}

/// A selected destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub id: u64,
    pub name: String,
    pub address: String,
    /// A destination without a coordinate is treated as no destination.
    pub coordinate: Option<Coordinate>,
}

impl Destination {
    /// Builds a destination from a facility, or `None` if it has no coordinates.
    pub fn from_facility(facility: &Facility) -> Option<Self> {
        let coordinate = facility.coordinate()?;
        let name = facility
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FACILITY_NAME)
            .to_string();

        Some(Self {
            id: facility.id,
            name,
            address: facility
                .address()
                .unwrap_or_else(|| MISSING_ADDRESS.to_string()),
            coordinate: Some(coordinate),
        })
    }
}

/// Publishes the selected destination.
#[derive(Debug)]
pub struct DestinationStore {
    tx: watch::Sender<Option<Destination>>,
}

impl DestinationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Selects a facility, or clears the selection with `None`.
    pub fn set_facility(&self, facility: Option<Facility>) {
        let destination = match &facility {
            Some(f) => {
                let destination = Destination::from_facility(f);
                if destination.is_none() {
                    warn!(facility_id = f.id, "Selected facility lacks coordinates");
                } else {
                    debug!(facility_id = f.id, "Destination set");
                }
                destination
            }
            None => {
                info!("Destination cleared");
                None
            }
        };
        self.tx.send_replace(destination);
    }

    /// Publishes an already-built destination.
    pub fn set_destination(&self, destination: Option<Destination>) {
        self.tx.send_replace(destination);
    }

    pub fn clear(&self) {
        self.set_facility(None);
    }

    /// Current destination.
    pub fn current(&self) -> Option<Destination> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Destination>> {
        self.tx.subscribe()
    }
}

impl Default for DestinationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clinic() -> Facility {
        Facility {
            id: 3,
            name: Some("City Clinic".to_string()),
            street: Some("Gedimino pr.".to_string()),
            house_number: Some("1".to_string()),
            city: Some("Vilnius".to_string()),
            location: Some(FacilityLocation {
                latitude: Some(54.70),
                longitude: Some(25.30),
            }),
        }
    }

    #[test]
    fn test_from_facility() {
        let dest = Destination::from_facility(&clinic()).unwrap();
        assert_eq!(dest.id, 3);
        assert_eq!(dest.name, "City Clinic");
        assert_eq!(dest.address, "Gedimino pr. 1 Vilnius");
        assert_eq!(dest.coordinate, Some(Coordinate::new(54.70, 25.30)));
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let facility = Facility {
            name: None,
            street: Some(" ".to_string()),
            house_number: None,
            city: None,
            ..clinic()
        };
        let dest = Destination::from_facility(&facility).unwrap();
        assert_eq!(dest.name, DEFAULT_FACILITY_NAME);
        assert_eq!(dest.address, MISSING_ADDRESS);
    }

    #[test]
    fn test_partial_address() {
        let facility = Facility {
            street: None,
            house_number: None,
            ..clinic()
        };
        assert_eq!(facility.address().as_deref(), Some("Vilnius"));
    }

    #[test]
    fn test_without_coordinates_is_none() {
        let mut facility = clinic();
        facility.location = Some(FacilityLocation {
            latitude: Some(54.70),
            longitude: None,
        });
        assert!(Destination::from_facility(&facility).is_none());

        facility.location = None;
        assert!(Destination::from_facility(&facility).is_none());
    }

    #[test]
    fn test_deserialize_api_record() {
        let json = r#"{
            "id": 12,
            "name": "Santaros klinikos",
            "city": "Vilnius",
            "location": { "latitude": 54.6683, "longitude": 25.2016 }
        }"#;
        let facility: Facility = serde_json::from_str(json).unwrap();
        let dest = Destination::from_facility(&facility).unwrap();
        assert_eq!(dest.address, "Vilnius");
        assert_eq!(dest.coordinate, Some(Coordinate::new(54.6683, 25.2016)));
    }

    #[test]
    fn test_store_publishes_none_for_facility_without_coordinates() {
        let store = DestinationStore::new();
        store.set_facility(Some(clinic()));
        assert!(store.current().is_some());

        let mut nowhere = clinic();
        nowhere.location = None;
        store.set_facility(Some(nowhere));
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_clear_notifies_subscribers() {
        let store = DestinationStore::new();
        store.set_facility(Some(clinic()));
        let mut rx = store.subscribe();

        store.clear();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }
}
