//! In-process implementations of the capability ports.
//!
//! The host shell uses them as simulated devices and the test suites use
//! them to script permission answers and OS failures.

use std::collections::BTreeMap;
use std::thread;

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::{
    authorization::AuthorizationState,
    calendar::{CalendarEventDraft, CalendarStore},
    error::PlatformError,
    feedback::{HapticEngine, HapticStyle, ShareOutcome, ShareSheet},
    notifications::{NotificationCenter, NotificationRequest},
    Completion,
};

/// Where completions run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// On the calling thread before the port method returns.
    #[default]
    Immediate,
    /// On a freshly spawned thread, the way OS callbacks arrive.
    Background,
}

impl Delivery {
    fn complete<T: Send + 'static>(self, done: Completion<T>, value: T) {
        match self {
            Delivery::Immediate => done(value),
            Delivery::Background => {
                thread::spawn(move || done(value));
            }
        }
    }
}

struct NotificationState {
    status: AuthorizationState,
    grant_on_request: bool,
    pending: Vec<NotificationRequest>,
    fail_next_add: Option<String>,
    authorization_requests: usize,
}

pub struct InMemoryNotificationCenter {
    state: Mutex<NotificationState>,
    delivery: Delivery,
}

impl InMemoryNotificationCenter {
    /// Undetermined permission that is granted when requested.
    pub fn new() -> Self {
        Self::with_policy(true)
    }

    pub fn with_policy(grant_on_request: bool) -> Self {
        Self {
            state: Mutex::new(NotificationState {
                status: AuthorizationState::NotDetermined,
                grant_on_request,
                pending: Vec::new(),
                fail_next_add: None,
                authorization_requests: 0,
            }),
            delivery: Delivery::Immediate,
        }
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn set_authorization(&self, status: AuthorizationState) {
        self.state.lock().status = status;
    }

    pub fn fail_next_add(&self, message: impl Into<String>) {
        self.state.lock().fail_next_add = Some(message.into());
    }

    pub fn pending_requests(&self) -> Vec<NotificationRequest> {
        self.state.lock().pending.clone()
    }

    pub fn authorization_requests(&self) -> usize {
        self.state.lock().authorization_requests
    }
}

impl Default for InMemoryNotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter for InMemoryNotificationCenter {
    fn authorization_status(&self, done: Completion<AuthorizationState>) {
        let status = self.state.lock().status;
        self.delivery.complete(done, status);
    }

    fn request_authorization(&self, done: Completion<Result<bool, PlatformError>>) {
        let granted = {
            let mut state = self.state.lock();
            state.authorization_requests += 1;
            if state.status == AuthorizationState::NotDetermined {
                state.status = if state.grant_on_request {
                    AuthorizationState::Authorized
                } else {
                    AuthorizationState::Denied
                };
            }
            state.status.is_authorized()
        };
        self.delivery.complete(done, Ok(granted));
    }

    fn add(&self, request: NotificationRequest, done: Completion<Result<(), PlatformError>>) {
        let result = {
            let mut state = self.state.lock();
            match state.fail_next_add.take() {
                Some(message) => Err(PlatformError::new(message)),
                None => {
                    state
                        .pending
                        .retain(|existing| existing.identifier != request.identifier);
                    debug!(identifier = %request.identifier, "notification registered");
                    state.pending.push(request);
                    Ok(())
                }
            }
        };
        self.delivery.complete(done, result);
    }

    fn remove_pending(&self, identifiers: &[String]) {
        self.state
            .lock()
            .pending
            .retain(|request| !identifiers.contains(&request.identifier));
    }

    fn remove_all_pending(&self) {
        self.state.lock().pending.clear();
    }

    fn pending(&self, done: Completion<Vec<NotificationRequest>>) {
        let pending = self.pending_requests();
        self.delivery.complete(done, pending);
    }
}

struct CalendarState {
    status: AuthorizationState,
    grant_on_request: bool,
    events: BTreeMap<String, CalendarEventDraft>,
    fail_next_save: Option<String>,
    access_requests: usize,
}

pub struct InMemoryCalendarStore {
    state: Mutex<CalendarState>,
    delivery: Delivery,
}

impl InMemoryCalendarStore {
    pub fn authorized() -> Self {
        Self::build(AuthorizationState::Authorized, true)
    }

    /// Undetermined permission; the prompt answers `grant`.
    pub fn prompting(grant: bool) -> Self {
        Self::build(AuthorizationState::NotDetermined, grant)
    }

    fn build(status: AuthorizationState, grant_on_request: bool) -> Self {
        Self {
            state: Mutex::new(CalendarState {
                status,
                grant_on_request,
                events: BTreeMap::new(),
                fail_next_save: None,
                access_requests: 0,
            }),
            delivery: Delivery::Immediate,
        }
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn set_authorization(&self, status: AuthorizationState) {
        self.state.lock().status = status;
    }

    pub fn fail_next_save(&self, message: impl Into<String>) {
        self.state.lock().fail_next_save = Some(message.into());
    }

    pub fn event(&self, identifier: &str) -> Option<CalendarEventDraft> {
        self.state.lock().events.get(identifier).cloned()
    }

    pub fn event_count(&self) -> usize {
        self.state.lock().events.len()
    }

    pub fn access_requests(&self) -> usize {
        self.state.lock().access_requests
    }
}

impl CalendarStore for InMemoryCalendarStore {
    fn authorization_status(&self) -> AuthorizationState {
        self.state.lock().status
    }

    fn request_access(&self, done: Completion<Result<bool, PlatformError>>) {
        let granted = {
            let mut state = self.state.lock();
            state.access_requests += 1;
            if !matches!(
                state.status,
                AuthorizationState::Denied | AuthorizationState::Restricted
            ) {
                state.status = if state.grant_on_request {
                    AuthorizationState::Authorized
                } else {
                    AuthorizationState::Denied
                };
            }
            state.status.is_authorized()
        };
        self.delivery.complete(done, Ok(granted));
    }

    fn save(&self, draft: CalendarEventDraft) -> Result<String, PlatformError> {
        let mut state = self.state.lock();
        if let Some(message) = state.fail_next_save.take() {
            return Err(PlatformError::new(message));
        }
        let identifier = Uuid::new_v4().to_string();
        state.events.insert(identifier.clone(), draft);
        Ok(identifier)
    }

    fn contains(&self, identifier: &str) -> bool {
        self.state.lock().events.contains_key(identifier)
    }

    fn remove(&self, identifier: &str) -> Result<(), PlatformError> {
        self.state
            .lock()
            .events
            .remove(identifier)
            .map(|_| ())
            .ok_or_else(|| PlatformError::new("Event not found"))
    }
}

/// Records every primitive it is asked to play.
#[derive(Default)]
pub struct RecordingHaptics {
    played: Mutex<Vec<HapticStyle>>,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<HapticStyle> {
        self.played.lock().clone()
    }
}

impl HapticEngine for RecordingHaptics {
    fn play(&self, style: HapticStyle) {
        self.played.lock().push(style);
    }
}

/// Share sheet whose outcome is decided up front.
pub struct ScriptedShareSheet {
    outcome: Result<ShareOutcome, PlatformError>,
    shared: Mutex<Vec<String>>,
}

impl ScriptedShareSheet {
    pub fn completing() -> Self {
        Self::with_outcome(Ok(ShareOutcome { completed: true }))
    }

    pub fn dismissed() -> Self {
        Self::with_outcome(Ok(ShareOutcome { completed: false }))
    }

    pub fn with_outcome(outcome: Result<ShareOutcome, PlatformError>) -> Self {
        Self {
            outcome,
            shared: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(&self) -> Vec<String> {
        self.shared.lock().clone()
    }
}

impl ShareSheet for ScriptedShareSheet {
    fn present(&self, text: String, done: Completion<Result<ShareOutcome, PlatformError>>) {
        debug!(len = text.len(), "share sheet presented");
        self.shared.lock().push(text);
        done(self.outcome.clone());
    }
}
