//! Map settings store: the selected travel mode.

use tokio::sync::watch;
use tracing::{info, warn};

use crate::routing::{ParseTravelModeError, TravelMode};

/// Publishes the selected travel mode.
#[derive(Debug)]
pub struct MapSettingsStore {
    tx: watch::Sender<TravelMode>,
}

impl MapSettingsStore {
    pub fn new() -> Self {
        Self::with_mode(TravelMode::default())
    }

    pub fn with_mode(mode: TravelMode) -> Self {
        let (tx, _rx) = watch::channel(mode);
        Self { tx }
    }

    /// Sets the mode from its name (`driving`, `foot` or `walking`).
    ///
    /// Unrecognised names leave the mode unchanged.
    pub fn set_travel_mode(&self, name: &str) -> Result<TravelMode, ParseTravelModeError> {
        let mode = match name.trim().to_ascii_lowercase().as_str() {
            "driving" => TravelMode::Driving,
            "foot" | "walking" => TravelMode::Walking,
            _ => {
                warn!(mode = name, "Invalid travel mode attempted");
                return Err(ParseTravelModeError(name.to_string()));
            }
        };
        self.set_mode(mode);
        Ok(mode)
    }

    /// Sets the mode. Subscribers are only notified when it changes.
    pub fn set_mode(&self, mode: TravelMode) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == mode {
                return false;
            }
            *current = mode;
            true
        });
        if changed {
            info!(mode = %mode, "Travel mode set");
        }
    }

    pub fn mode(&self) -> TravelMode {
        *self.tx.borrow()
    }

    pub fn is_driving(&self) -> bool {
        self.mode() == TravelMode::Driving
    }

    pub fn is_walking(&self) -> bool {
        self.mode() == TravelMode::Walking
    }

    pub fn subscribe(&self) -> watch::Receiver<TravelMode> {
        self.tx.subscribe()
    }
}

impl Default for MapSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}
