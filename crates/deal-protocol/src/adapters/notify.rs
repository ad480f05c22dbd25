//! Notifier adapters.

use crate::ports::outbound::{DealEvent, DealNotifier, NotifyError};
use shared_types::UserId;
use std::sync::{Arc, Mutex};

/// Notifier that drops every event. Used when no messaging collaborator is
/// wired in.
#[derive(Default)]
pub struct NullNotifier;

impl NullNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl DealNotifier for NullNotifier {
    async fn notify(&self, _user: &UserId, _event: DealEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Notifier that records every delivered event, for test assertions.
/// Clones share the same event log.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<(UserId, DealEvent)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The events delivered so far, in delivery order.
    pub fn events(&self) -> Vec<(UserId, DealEvent)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DealNotifier for RecordingNotifier {
    async fn notify(&self, user: &UserId, event: DealEvent) -> Result<(), NotifyError> {
        self.events
            .lock()
            .map_err(|_| NotifyError::Delivery("recorder lock poisoned".into()))?
            .push((user.clone(), event));
        Ok(())
    }
}
