use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use advisorly_core::{CalendarGateway, EventDraft, EventPatch, GatewayError, GatewayResult};
use advisorly_domain::{CalendarConnectionStatus, RemoteCalendarEvent};

/// Scripted behavior for `list_events`.
#[derive(Clone)]
pub enum ListBehavior {
    Events(Vec<RemoteCalendarEvent>),
    NotConnected,
    Unreachable,
}

/// Scripted mock for `CalendarGateway`.
///
/// Records created and deleted event ids so tests can assert on the exact
/// remote traffic a flow produced.
#[derive(Clone)]
pub struct MockCalendarGateway {
    list_behavior: Arc<Mutex<ListBehavior>>,
    create_result: Arc<Mutex<GatewayResult<String>>>,
    delete_fails: Arc<Mutex<bool>>,
    pub created: Arc<Mutex<Vec<EventDraft>>>,
    pub deleted: Arc<Mutex<Vec<String>>>,
}

impl Default for MockCalendarGateway {
    fn default() -> Self {
        Self {
            list_behavior: Arc::new(Mutex::new(ListBehavior::NotConnected)),
            create_result: Arc::new(Mutex::new(Ok("remote-event-1".to_string()))),
            delete_fails: Arc::new(Mutex::new(false)),
            created: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockCalendarGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(self, events: Vec<RemoteCalendarEvent>) -> Self {
        *self.list_behavior.lock().unwrap() = ListBehavior::Events(events);
        self
    }

    pub fn with_list_behavior(self, behavior: ListBehavior) -> Self {
        *self.list_behavior.lock().unwrap() = behavior;
        self
    }

    pub fn with_create_failure(self) -> Self {
        *self.create_result.lock().unwrap() =
            Err(GatewayError::Transient("connection reset".to_string()));
        self
    }

    pub fn with_delete_failure(self) -> Self {
        self.set_delete_failure(true);
        self
    }

    /// Flip delete behavior mid-test (state is shared across clones).
    pub fn set_delete_failure(&self, fails: bool) {
        *self.delete_fails.lock().unwrap() = fails;
    }
}

fn clone_result(result: &GatewayResult<String>) -> GatewayResult<String> {
    match result {
        Ok(id) => Ok(id.clone()),
        Err(GatewayError::NotConnected) => Err(GatewayError::NotConnected),
        Err(GatewayError::Revoked(msg)) => Err(GatewayError::Revoked(msg.clone())),
        Err(GatewayError::Transient(msg)) => Err(GatewayError::Transient(msg.clone())),
        Err(GatewayError::Rejected(msg)) => Err(GatewayError::Rejected(msg.clone())),
        Err(GatewayError::Storage(msg)) => Err(GatewayError::Storage(msg.clone())),
    }
}

#[async_trait]
impl CalendarGateway for MockCalendarGateway {
    async fn list_events(
        &self,
        _advisor_id: Uuid,
        _time_min: DateTime<Utc>,
        _time_max: DateTime<Utc>,
    ) -> GatewayResult<Vec<RemoteCalendarEvent>> {
        match &*self.list_behavior.lock().unwrap() {
            ListBehavior::Events(events) => Ok(events.clone()),
            ListBehavior::NotConnected => Err(GatewayError::NotConnected),
            ListBehavior::Unreachable => {
                Err(GatewayError::Transient("connection refused".to_string()))
            }
        }
    }

    async fn create_event(&self, _advisor_id: Uuid, draft: EventDraft) -> GatewayResult<String> {
        let result = clone_result(&self.create_result.lock().unwrap());
        if result.is_ok() {
            self.created.lock().unwrap().push(draft);
        }
        result
    }

    async fn update_event(
        &self,
        _advisor_id: Uuid,
        _event_id: &str,
        _patch: EventPatch,
    ) -> GatewayResult<()> {
        Ok(())
    }

    async fn delete_event(&self, _advisor_id: Uuid, event_id: &str) -> GatewayResult<()> {
        if *self.delete_fails.lock().unwrap() {
            return Err(GatewayError::Transient("connection reset".to_string()));
        }
        self.deleted.lock().unwrap().push(event_id.to_string());
        Ok(())
    }

    async fn connection_status(&self, _advisor_id: Uuid) -> CalendarConnectionStatus {
        let connected =
            matches!(&*self.list_behavior.lock().unwrap(), ListBehavior::Events(_));
        CalendarConnectionStatus { connected, email: None, last_synced: None, error: None }
    }
}
