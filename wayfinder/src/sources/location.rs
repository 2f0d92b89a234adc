//! Viewer position store.

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::coord::{CoordError, Coordinate};

/// Why a position could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("User denied the request for Geolocation.")]
    PermissionDenied,
    #[error("Location information is unavailable.")]
    PositionUnavailable,
    #[error("The request to get user location timed out.")]
    Timeout,
    #[error("Geolocation is not supported on this device.")]
    NotSupported,
    #[error("An unknown error occurred while fetching location.")]
    Unknown,
}

/// Latest position report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionReading {
    /// `None` until a position has been obtained.
    pub coordinate: Option<Coordinate>,
    /// Accuracy radius in meters, if known.
    pub accuracy: Option<f64>,
    /// Message of the most recent acquisition error.
    pub error: Option<String>,
}

/// Publishes the viewer's position.
#[derive(Debug)]
pub struct LocationStore {
    tx: watch::Sender<PositionReading>,
}

impl LocationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PositionReading::default());
        Self { tx }
    }

    /// Records a new position and clears any previous error.
    pub fn set_position(
        &self,
        latitude: f64,
        longitude: f64,
        accuracy: Option<f64>,
    ) -> Result<(), CoordError> {
        let coordinate = Coordinate::try_new(latitude, longitude).map_err(|e| {
            warn!(latitude, longitude, error = %e, "Ignoring invalid position");
            e
        })?;

        self.tx.send_modify(|reading| {
            reading.coordinate = Some(coordinate);
            reading.accuracy = accuracy;
            reading.error = None;
        });
        debug!(position = %coordinate, ?accuracy, "Position updated");
        Ok(())
    }

    /// Records an acquisition error. The last known position is kept.
    pub fn report_error(&self, error: GeolocationError) {
        warn!(error = %error, "Error getting location");
        self.tx
            .send_modify(|reading| reading.error = Some(error.to_string()));
    }

    /// Forgets the position.
    pub fn clear(&self) {
        self.tx.send_replace(PositionReading::default());
        info!("Position cleared");
    }

    /// Returns true once a position is known.
    pub fn has_location(&self) -> bool {
        self.tx.borrow().coordinate.is_some()
    }

    /// Current reading.
    pub fn reading(&self) -> PositionReading {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PositionReading> {
        self.tx.subscribe()
    }
}

impl Default for LocationStore {
    fn default() -> Self {
        Self::new()
    }
}
