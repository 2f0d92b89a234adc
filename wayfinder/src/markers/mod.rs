//! Viewer and destination markers.
//!
//! [`MarkerSync`] owns exactly two marker slots and reconciles each one with
//! the surface through [`MarkerSync::upsert`]:
//!
//! | coordinate | visual exists | effect                          | returns |
//! |------------|---------------|---------------------------------|---------|
//! | present    | no            | create, bind popup/tooltip      | `true`  |
//! | present    | yes           | move / rebind only what changed | `false` |
//! | absent     | yes           | remove, clear slot              | `false` |
//! | absent     | no            | nothing                         | `false` |
//!
//! Slot state is updated in place for the life of the session, so repeating
//! an upsert with the same inputs produces no further surface calls.

use tracing::debug;

use crate::coord::Coordinate;
use crate::sources::Destination;
use crate::surface::{MarkerHandle, MarkerIcon, RenderSurface};

/// Popup text for the viewer marker.
pub const VIEWER_POPUP: &str = "Your Location";

/// Label used when a destination has no name.
pub const DEFAULT_DESTINATION_LABEL: &str = "Destination";

/// Address line used when a destination has no address.
pub const DEFAULT_ADDRESS_LABEL: &str = "Address not available";

/// The two marker slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSlot {
    Viewer,
    Destination,
}

/// What to show for a marker besides its position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayPayload {
    pub icon: MarkerIcon,
    pub popup: Option<String>,
    pub tooltip: Option<String>,
}

impl DisplayPayload {
    /// Payload for the viewer's own position.
    pub fn viewer() -> Self {
        Self {
            icon: MarkerIcon::User,
            popup: Some(VIEWER_POPUP.to_string()),
            tooltip: None,
        }
    }

    /// Payload for a destination: bold name over the address, name as tooltip.
    pub fn destination(destination: Option<&Destination>) -> Self {
        let Some(destination) = destination else {
            return Self::default();
        };

        let name = non_empty(&destination.name).unwrap_or(DEFAULT_DESTINATION_LABEL);
        let address = non_empty(&destination.address).unwrap_or(DEFAULT_ADDRESS_LABEL);

        Self {
            icon: MarkerIcon::Facility,
            popup: Some(format!("<b>{}</b><br>{}", name, address)),
            tooltip: Some(name.to_string()),
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Observable state of one marker slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkerState {
    pub coordinate: Option<Coordinate>,
    pub popup_text: Option<String>,
    pub tooltip_text: Option<String>,
}

impl MarkerState {
    /// Whether the slot currently has a visual on the surface.
    pub fn present(&self) -> bool {
        self.coordinate.is_some()
    }
}

#[derive(Debug, Default)]
struct SlotEntry {
    handle: Option<MarkerHandle>,
    state: MarkerState,
}

/// Keeps the viewer and destination markers in sync with the surface.
#[derive(Debug, Default)]
pub struct MarkerSync {
    viewer: SlotEntry,
    destination: SlotEntry,
}

impl MarkerSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a slot.
    pub fn state(&self, slot: MarkerSlot) -> &MarkerState {
        &self.entry(slot).state
    }

    fn entry(&self, slot: MarkerSlot) -> &SlotEntry {
        match slot {
            MarkerSlot::Viewer => &self.viewer,
            MarkerSlot::Destination => &self.destination,
        }
    }

    fn entry_mut(&mut self, slot: MarkerSlot) -> &mut SlotEntry {
        match slot {
            MarkerSlot::Viewer => &mut self.viewer,
            MarkerSlot::Destination => &mut self.destination,
        }
    }

    /// Reconciles one slot with the surface.
    ///
    /// Returns `true` only when a new visual was created by this call.
    pub fn upsert(
        &mut self,
        surface: &mut dyn RenderSurface,
        slot: MarkerSlot,
        coordinate: Option<Coordinate>,
        payload: &DisplayPayload,
    ) -> bool {
        let entry = self.entry_mut(slot);

        match (coordinate, entry.handle) {
            (Some(at), None) => {
                let handle = surface.create_marker(at, payload.icon);
                if let Some(popup) = &payload.popup {
                    surface.bind_popup(handle, popup);
                }
                if let Some(tooltip) = &payload.tooltip {
                    surface.bind_tooltip(handle, tooltip);
                }
                entry.handle = Some(handle);
                entry.state = MarkerState {
                    coordinate: Some(at),
                    popup_text: payload.popup.clone(),
                    tooltip_text: payload.tooltip.clone(),
                };
                debug!(?slot, %handle, position = %at, "Marker created");
                true
            }
            (Some(at), Some(handle)) => {
                if entry.state.coordinate != Some(at) {
                    surface.update_marker_position(handle, at);
                    entry.state.coordinate = Some(at);
                }
                if payload.popup.is_some() && payload.popup != entry.state.popup_text {
                    if let Some(popup) = &payload.popup {
                        surface.bind_popup(handle, popup);
                    }
                    entry.state.popup_text = payload.popup.clone();
                }
                if payload.tooltip.is_some() && payload.tooltip != entry.state.tooltip_text {
                    if let Some(tooltip) = &payload.tooltip {
                        surface.bind_tooltip(handle, tooltip);
                    }
                    entry.state.tooltip_text = payload.tooltip.clone();
                }
                false
            }
            (None, Some(handle)) => {
                surface.remove_marker(handle);
                entry.handle = None;
                entry.state = MarkerState::default();
                debug!(?slot, %handle, "Marker removed");
                false
            }
            (None, None) => false,
        }
    }

    /// Removes both markers. Returns how many visuals were removed.
    pub fn clear(&mut self, surface: &mut dyn RenderSurface) -> usize {
        let mut removed = 0;
        for slot in [MarkerSlot::Viewer, MarkerSlot::Destination] {
            if self.state(slot).present() {
                self.upsert(surface, slot, None, &DisplayPayload::default());
                removed += 1;
            }
        }
        removed
    }
}
