use std::sync::Arc;

use ballot_domain::{
    feedback::{play_custom_impact, play_haptic},
    BallotService,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::{
    main_context::MainContext,
    request::{Action, BridgeRequest, Envelope},
    response::{
        CalendarAdded, CalendarStatus, EventExistence, NotificationStatus, Outcome,
        PendingNotifications, PermissionOutcome, ReminderPreferences, Shared,
    },
    sink::ResponseSink,
};

/// Answers exactly one request. Without a callback id the answer is dropped.
pub struct Responder {
    action: Action,
    callback_id: Option<String>,
    sink: Arc<dyn ResponseSink>,
    main: Arc<dyn MainContext>,
}

impl Responder {
    pub fn send<T: Serialize>(self, payload: &T) {
        let Some(callback_id) = self.callback_id else {
            debug!(action = self.action.name(), "no callback id, response dropped");
            return;
        };
        let json = match serde_json::to_string(payload) {
            Ok(json) => json,
            Err(err) => {
                warn!(%err, action = self.action.name(), %callback_id, "response not serializable, dropped");
                return;
            }
        };
        let sink = self.sink;
        self.main
            .post(Box::new(move || sink.deliver(&callback_id, &json)));
    }
}

/// Routes bridge messages from the web content to the native capabilities.
pub struct BridgeDispatcher {
    service: Arc<BallotService>,
    sink: Arc<dyn ResponseSink>,
    main: Arc<dyn MainContext>,
}

impl BridgeDispatcher {
    pub fn new(
        service: Arc<BallotService>,
        sink: Arc<dyn ResponseSink>,
        main: Arc<dyn MainContext>,
    ) -> Self {
        Self {
            service,
            sink,
            main,
        }
    }

    pub fn service(&self) -> &Arc<BallotService> {
        &self.service
    }

    /// Malformed messages are logged and dropped; nothing is answered.
    pub fn handle_message(&self, raw: &str) {
        match Envelope::parse(raw) {
            Ok(envelope) => self.handle_envelope(envelope),
            Err(err) => warn!("dropping bridge message: {err:#}"),
        }
    }

    pub fn handle_value(&self, value: Value) {
        match Envelope::from_value(value) {
            Ok(envelope) => self.handle_envelope(envelope),
            Err(err) => warn!("dropping bridge message: {err:#}"),
        }
    }

    #[instrument(skip_all, fields(action = %envelope.action))]
    fn handle_envelope(&self, envelope: Envelope) {
        let Some(action) = Action::from_name(&envelope.action) else {
            warn!("unknown bridge action, dropping");
            return;
        };
        let responder = Responder {
            action,
            callback_id: envelope.callback_id,
            sink: Arc::clone(&self.sink),
            main: Arc::clone(&self.main),
        };
        match BridgeRequest::decode(action, &envelope.body, &self.service.timezone()) {
            Ok(request) => self.dispatch(request, responder),
            Err(err) if action.expects_response() => {
                debug!(%err, "request rejected");
                responder.send(&Outcome::failed(&err));
            }
            Err(err) => debug!(%err, "request rejected"),
        }
    }

    fn dispatch(&self, request: BridgeRequest, responder: Responder) {
        let service = &self.service;
        match request {
            BridgeRequest::Haptic { style, intensity } => {
                let service = Arc::clone(service);
                self.main.post(Box::new(move || match intensity {
                    Some(intensity) => play_custom_impact(service.haptics(), intensity),
                    None => play_haptic(service.haptics(), style),
                }));
            }
            BridgeRequest::RequestNotificationPermission => {
                service
                    .reminders()
                    .request_authorization(Box::new(move |result| {
                        responder.send(&PermissionOutcome::from_result(&result))
                    }));
            }
            BridgeRequest::ScheduleElectionReminder(record) => {
                service.reminders().schedule(
                    record,
                    Box::new(move |result| responder.send(&Outcome::from_result(&result))),
                );
            }
            BridgeRequest::CancelReminder(record) => {
                let result = service.reminders().cancel(&record);
                if let Err(err) = &result {
                    error!(%err, id = %record.notification_id(), "cancel failed");
                }
                responder.send(&Outcome::from_result(&result));
            }
            BridgeRequest::CancelAllReminders => {
                let result = service.reminders().cancel_all();
                if let Err(err) = &result {
                    error!(%err, "cancel all failed");
                }
                responder.send(&Outcome::from_result(&result));
            }
            BridgeRequest::GetNotificationStatus => {
                service
                    .reminders()
                    .check_authorization(Box::new(move |state| {
                        responder.send(&NotificationStatus::from(state))
                    }));
            }
            BridgeRequest::GetReminderPreferences => {
                let records = service.reminders().list();
                responder.send(&ReminderPreferences::from_records(&records));
            }
            BridgeRequest::GetPendingNotifications => {
                service.reminders().pending(Box::new(move |requests| {
                    responder.send(&PendingNotifications::from_requests(requests))
                }));
            }
            BridgeRequest::RequestCalendarPermission => {
                let status_source = Arc::clone(service);
                service
                    .calendar()
                    .request_authorization(Box::new(move |result| {
                        let message = status_source.calendar().authorization_message();
                        responder.send(&PermissionOutcome::from_result(&result).with_message(message))
                    }));
            }
            BridgeRequest::AddToCalendar(event) => {
                service.calendar().add_event(
                    event,
                    Box::new(move |result| responder.send(&CalendarAdded::from(result))),
                );
            }
            BridgeRequest::RemoveFromCalendar { event_identifier } => {
                let result = service.calendar().remove_event(&event_identifier);
                responder.send(&Outcome::from_result(&result));
            }
            BridgeRequest::CalendarEventExists { event_identifier } => {
                let exists = service.calendar().event_exists(&event_identifier);
                responder.send(&EventExistence { exists });
            }
            BridgeRequest::GetCalendarStatus => {
                let calendar = service.calendar();
                responder.send(&CalendarStatus {
                    authorized: calendar.check_authorization().is_authorized(),
                    message: calendar.authorization_message().to_string(),
                });
            }
            BridgeRequest::Share { text } => {
                let service = Arc::clone(service);
                self.main.post(Box::new(move || {
                    service.share_sheet().present(
                        text,
                        Box::new(move |result| responder.send(&Shared::from(result))),
                    )
                }));
            }
        }
    }
}
