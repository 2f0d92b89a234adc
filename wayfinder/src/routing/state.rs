//! Routing state published to observers.
//!
//! The engine never reads routing state back; it only publishes sparse
//! [`RoutingUpdate`]s through a [`RoutingStateSink`]. [`SharedRoutingState`]
//! is the stock sink: it folds updates into a [`RoutingState`] snapshot that
//! UI code can poll or subscribe to.

use tokio::sync::watch;
use tracing::debug;

use super::types::RoutingStatus;

/// Sparse routing state notification.
///
/// A `None` field is left unchanged by the receiver. `Some(None)` clears an
/// optional text field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingUpdate {
    pub status: Option<RoutingStatus>,
    pub summary: Option<Option<String>>,
    pub error: Option<Option<String>>,
}

impl RoutingUpdate {
    /// No route: status idle, summary and error cleared.
    pub fn idle() -> Self {
        Self {
            status: Some(RoutingStatus::Idle),
            summary: Some(None),
            error: Some(None),
        }
    }

    /// A request has been issued.
    pub fn computing() -> Self {
        Self {
            status: Some(RoutingStatus::Computing),
            summary: Some(None),
            error: Some(None),
        }
    }

    /// The current request settled with a route.
    pub fn ready(summary: impl Into<String>) -> Self {
        Self {
            status: Some(RoutingStatus::Ready),
            summary: Some(Some(summary.into())),
            error: Some(None),
        }
    }

    /// The current request failed, or routing is unavailable.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(RoutingStatus::Error),
            summary: Some(None),
            error: Some(Some(message.into())),
        }
    }
}

/// Receiver of routing state notifications.
pub trait RoutingStateSink: Send + Sync {
    /// Publishes a sparse update.
    fn publish(&self, update: RoutingUpdate);
}

/// Folded routing state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingState {
    pub status: RoutingStatus,
    pub summary: Option<String>,
    pub error: Option<String>,
}

impl RoutingState {
    /// Applies a sparse update, leaving omitted fields unchanged.
    pub fn apply(&mut self, update: &RoutingUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(summary) = &update.summary {
            self.summary = summary.clone();
        }
        if let Some(error) = &update.error {
            self.error = error.clone();
        }
    }

    /// Returns true while a request is in flight.
    pub fn is_routing(&self) -> bool {
        self.status == RoutingStatus::Computing
    }
}

/// Sink that keeps the latest [`RoutingState`] and notifies subscribers.
///
/// Share it as `Arc<SharedRoutingState>`; the engine receives it as
/// `Arc<dyn RoutingStateSink>`.
#[derive(Debug)]
pub struct SharedRoutingState {
    tx: watch::Sender<RoutingState>,
}

impl SharedRoutingState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RoutingState::default());
        Self { tx }
    }

    /// Current state.
    pub fn snapshot(&self) -> RoutingState {
        self.tx.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<RoutingState> {
        self.tx.subscribe()
    }
}

impl Default for SharedRoutingState {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingStateSink for SharedRoutingState {
    fn publish(&self, update: RoutingUpdate) {
        self.tx.send_modify(|state| state.apply(&update));
        let state = self.tx.borrow();
        debug!(
            status = %state.status,
            summary = ?state.summary,
            error = ?state.error,
            "Routing state updated"
        );
    }
}
