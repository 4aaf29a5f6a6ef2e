use std::sync::Arc;
use std::time::Duration;

use ballot_bridge::{
    BridgeDispatcher, InlineContext, MainContext, MainQueue, RecordingSink,
};
use ballot_domain::{
    clock::FixedClock,
    memory::{
        Delivery, InMemoryCalendarStore, InMemoryNotificationCenter, RecordingHaptics,
        ScriptedShareSheet,
    },
    BallotService,
};
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::{json, Value};

struct Harness {
    dispatcher: BridgeDispatcher,
    sink: Arc<RecordingSink>,
    center: Arc<InMemoryNotificationCenter>,
    calendar: Arc<InMemoryCalendarStore>,
}

impl Harness {
    fn new(center: InMemoryNotificationCenter, calendar: InMemoryCalendarStore) -> Self {
        Self::with_main(center, calendar, Arc::new(InlineContext))
    }

    fn with_main(
        center: InMemoryNotificationCenter,
        calendar: InMemoryCalendarStore,
        main: Arc<dyn MainContext>,
    ) -> Self {
        let center = Arc::new(center);
        let calendar = Arc::new(calendar);
        let sink = Arc::new(RecordingSink::new());
        let service = BallotService::builder()
            .with_notification_center(center.clone())
            .with_calendar_store(calendar.clone())
            .with_haptics(Arc::new(RecordingHaptics::new()))
            .with_share_sheet(Arc::new(ScriptedShareSheet::completing()))
            .with_clock(Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap(),
            )))
            .build()
            .expect("build ballot service");
        Self {
            dispatcher: BridgeDispatcher::new(Arc::new(service), sink.clone(), main),
            sink,
            center,
            calendar,
        }
    }

    fn send(&self, message: Value) {
        self.dispatcher.handle_message(&message.to_string());
    }

    fn response(&self, callback_id: &str) -> Value {
        self.sink
            .response_for(callback_id)
            .unwrap_or_else(|| panic!("no response for {callback_id}"))
    }
}

fn schedule_message(callback_id: &str, date: &str, reminder_type: &str) -> Value {
    json!({
        "action": "scheduleElectionReminder",
        "electionName": "City Council Runoff",
        "electionDate": date,
        "reminderType": reminder_type,
        "callbackId": callback_id
    })
}

#[test]
fn missing_fields_answer_invalid_parameters() {
    let harness = Harness::new(
        InMemoryNotificationCenter::new(),
        InMemoryCalendarStore::authorized(),
    );
    harness.send(json!({"action": "scheduleElectionReminder", "callbackId": "cb1"}));
    assert_eq!(
        harness.response("cb1"),
        json!({"success": false, "error": "Invalid parameters"})
    );
    assert!(harness.center.pending_requests().is_empty());
}

#[test]
fn schedule_registers_notification_and_preference() {
    let harness = Harness::new(
        InMemoryNotificationCenter::new(),
        InMemoryCalendarStore::authorized(),
    );
    harness.send(schedule_message("cb1", "2025-11-04T00:00:00Z", "one_week"));
    assert_eq!(harness.response("cb1"), json!({"success": true, "error": ""}));

    let pending = harness.center.pending_requests();
    assert_eq!(pending.len(), 1);
    assert_eq!(
        pending[0].identifier,
        "election-City Council Runoff-one_week-1762214400"
    );
    assert_eq!(pending[0].title, "Election Reminder");

    harness.send(json!({"action": "getReminderPreferences", "callbackId": "cb2"}));
    assert_eq!(
        harness.response("cb2"),
        json!({"preferences": [{
            "electionName": "City Council Runoff",
            "electionDate": "2025-11-04T00:00:00Z",
            "reminderType": "one_week"
        }]})
    );

    harness.send(json!({"action": "getPendingNotifications", "callbackId": "cb3"}));
    let notifications = harness.response("cb3")["notifications"].clone();
    assert_eq!(notifications[0]["triggerDate"], json!("2025-10-28T00:00:00Z"));
}

#[test]
fn reminder_in_the_past_is_refused() {
    let harness = Harness::new(
        InMemoryNotificationCenter::new(),
        InMemoryCalendarStore::authorized(),
    );
    harness.send(schedule_message("cb1", "2025-10-03", "one_week"));
    assert_eq!(
        harness.response("cb1"),
        json!({"success": false, "error": "Reminder date is in the past"})
    );
    harness.send(json!({"action": "getReminderPreferences", "callbackId": "cb2"}));
    assert_eq!(harness.response("cb2"), json!({"preferences": []}));
}

#[test]
fn os_rejection_surfaces_verbatim() {
    let harness = Harness::new(
        InMemoryNotificationCenter::new(),
        InMemoryCalendarStore::authorized(),
    );
    harness.center.fail_next_add("Notification limit reached");
    harness.send(schedule_message("cb1", "2025-11-04", "one_day"));
    assert_eq!(
        harness.response("cb1"),
        json!({"success": false, "error": "Notification limit reached"})
    );
}

#[test]
fn cancel_removes_notification_and_record() {
    let harness = Harness::new(
        InMemoryNotificationCenter::new(),
        InMemoryCalendarStore::authorized(),
    );
    harness.send(schedule_message("cb1", "2025-11-04T00:00:00Z", "one_day"));
    harness.send(schedule_message("cb2", "2025-11-04T00:00:00Z", "morning_of"));
    assert_eq!(harness.center.pending_requests().len(), 2);

    let mut cancel = schedule_message("cb3", "2025-11-04T00:00:00Z", "one_day");
    cancel["action"] = json!("cancelReminder");
    harness.send(cancel);
    assert_eq!(harness.response("cb3"), json!({"success": true, "error": ""}));
    assert_eq!(harness.center.pending_requests().len(), 1);

    harness.send(json!({"action": "getReminderPreferences", "callbackId": "cb4"}));
    assert_eq!(
        harness.response("cb4")["preferences"][0]["reminderType"],
        json!("morning_of")
    );
}

#[test]
fn cancel_with_listed_date_clears_fractional_schedule() {
    let harness = Harness::new(
        InMemoryNotificationCenter::new(),
        InMemoryCalendarStore::authorized(),
    );
    harness.send(schedule_message("cb1", "2025-11-04T00:00:00.100Z", "one_day"));
    harness.send(schedule_message("cb2", "2025-11-04T00:00:00.900Z", "one_day"));
    harness.send(schedule_message("cb3", "2025-11-04T00:00:00.250Z", "one_week"));
    assert_eq!(harness.center.pending_requests().len(), 2);

    harness.send(json!({"action": "getReminderPreferences", "callbackId": "cb4"}));
    let preferences = harness.response("cb4")["preferences"].clone();
    assert_eq!(preferences.as_array().map(Vec::len), Some(2));

    for (index, preference) in preferences.as_array().into_iter().flatten().enumerate() {
        assert_eq!(preference["electionDate"], json!("2025-11-04T00:00:00Z"));
        let mut cancel = schedule_message(
            &format!("cancel{index}"),
            preference["electionDate"].as_str().unwrap_or_default(),
            preference["reminderType"].as_str().unwrap_or_default(),
        );
        cancel["action"] = json!("cancelReminder");
        harness.send(cancel);
    }

    harness.send(json!({"action": "getReminderPreferences", "callbackId": "cb5"}));
    assert_eq!(harness.response("cb5"), json!({"preferences": []}));
    assert!(harness.center.pending_requests().is_empty());
}

#[test]
fn add_to_calendar_prompts_then_creates_event() {
    let harness = Harness::new(
        InMemoryNotificationCenter::new(),
        InMemoryCalendarStore::prompting(true),
    );
    harness.send(json!({
        "action": "addToCalendar",
        "electionName": "City Council Runoff",
        "electionDate": "2025-11-04",
        "pollingLocation": "Lincoln Elementary Gym",
        "callbackId": "cal1"
    }));
    let response = harness.response("cal1");
    assert_eq!(response["success"], json!(true));
    assert_eq!(response["error"], json!(""));
    let identifier = response["eventIdentifier"]
        .as_str()
        .expect("event identifier")
        .to_string();
    assert_eq!(harness.calendar.access_requests(), 1);

    let event = harness.calendar.event(&identifier).expect("stored event");
    assert_eq!(event.title, "City Council Runoff");
    assert!(event.all_day);
    assert_eq!(event.location.as_deref(), Some("Lincoln Elementary Gym"));

    harness.send(json!({
        "action": "calendarEventExists",
        "eventIdentifier": identifier,
        "callbackId": "cal2"
    }));
    assert_eq!(harness.response("cal2"), json!({"exists": true}));

    harness.send(json!({
        "action": "removeFromCalendar",
        "eventIdentifier": identifier,
        "callbackId": "cal3"
    }));
    assert_eq!(harness.response("cal3"), json!({"success": true, "error": ""}));
    assert_eq!(harness.calendar.event_count(), 0);
}

#[test]
fn removing_unknown_event_is_not_found() {
    let harness = Harness::new(
        InMemoryNotificationCenter::new(),
        InMemoryCalendarStore::authorized(),
    );
    harness.send(json!({
        "action": "removeFromCalendar",
        "eventIdentifier": "no-such-event",
        "callbackId": "cal1"
    }));
    assert_eq!(
        harness.response("cal1"),
        json!({"success": false, "error": "Event not found"})
    );
}

#[test]
fn denied_calendar_creates_nothing() {
    let harness = Harness::new(
        InMemoryNotificationCenter::new(),
        InMemoryCalendarStore::prompting(false),
    );
    harness.send(json!({
        "action": "addToCalendar",
        "electionName": "City Council Runoff",
        "electionDate": "2025-11-04T00:00:00Z",
        "callbackId": "cal1"
    }));
    assert_eq!(
        harness.response("cal1"),
        json!({"success": false, "error": "Calendar access not granted"})
    );
    assert_eq!(harness.calendar.access_requests(), 1);
    assert_eq!(harness.calendar.event_count(), 0);

    harness.send(json!({"action": "getCalendarStatus", "callbackId": "cal2"}));
    assert_eq!(harness.response("cal2")["authorized"], json!(false));
}

#[test]
fn requests_without_callback_still_run() {
    let harness = Harness::new(
        InMemoryNotificationCenter::new(),
        InMemoryCalendarStore::authorized(),
    );
    let mut message = schedule_message("unused", "2025-11-04T00:00:00Z", "one_week");
    message
        .as_object_mut()
        .expect("object message")
        .remove("callbackId");
    harness.send(message);
    assert_eq!(harness.center.pending_requests().len(), 1);
    assert!(harness.sink.delivered().is_empty());
}

#[test]
fn permission_answers_follow_policy() {
    let harness = Harness::new(
        InMemoryNotificationCenter::with_policy(false),
        InMemoryCalendarStore::prompting(true),
    );
    harness.send(json!({"action": "requestNotificationPermission", "callbackId": "p1"}));
    assert_eq!(
        harness.response("p1"),
        json!({"success": false, "authorized": false, "error": ""})
    );
    harness.send(json!({"action": "getNotificationStatus", "callbackId": "p2"}));
    assert_eq!(
        harness.response("p2"),
        json!({"authorized": false, "status": "denied"})
    );
    harness.send(json!({"action": "requestCalendarPermission", "callbackId": "p3"}));
    assert_eq!(
        harness.response("p3"),
        json!({
            "success": true,
            "authorized": true,
            "error": "",
            "message": "Calendar access granted"
        })
    );
}

#[test]
fn background_completions_wait_for_main_queue() {
    let queue = Arc::new(MainQueue::new());
    let harness = Harness::with_main(
        InMemoryNotificationCenter::new().with_delivery(Delivery::Background),
        InMemoryCalendarStore::prompting(true).with_delivery(Delivery::Background),
        queue.clone(),
    );
    harness.send(schedule_message("cb1", "2025-11-04T00:00:00Z", "one_week"));
    harness.send(json!({
        "action": "addToCalendar",
        "electionName": "City Council Runoff",
        "electionDate": "2025-11-04",
        "callbackId": "cb2"
    }));

    for _ in 0..200 {
        if queue.len() == 2 {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(queue.len(), 2);
    assert!(harness.sink.delivered().is_empty());

    assert_eq!(queue.run_pending(), 2);
    assert_eq!(harness.sink.delivered().len(), 2);
    assert_eq!(harness.response("cb1"), json!({"success": true, "error": ""}));
    assert_eq!(harness.response("cb2")["success"], json!(true));
}

#[test]
fn bare_dates_use_configured_zone() {
    let zone: Tz = "America/New_York".parse().unwrap();
    let center = Arc::new(InMemoryNotificationCenter::new());
    let sink = Arc::new(RecordingSink::new());
    let service = BallotService::builder()
        .with_notification_center(center.clone())
        .with_calendar_store(Arc::new(InMemoryCalendarStore::authorized()))
        .with_haptics(Arc::new(RecordingHaptics::new()))
        .with_share_sheet(Arc::new(ScriptedShareSheet::completing()))
        .with_clock(Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap(),
        )))
        .with_timezone(zone)
        .build()
        .expect("build ballot service");
    let dispatcher = BridgeDispatcher::new(Arc::new(service), sink.clone(), Arc::new(InlineContext));

    dispatcher.handle_value(schedule_message("cb1", "2025-11-04", "morning_of"));
    assert_eq!(sink.response_for("cb1"), Some(json!({"success": true, "error": ""})));
    let pending = center.pending_requests();
    assert_eq!(
        pending[0].trigger_at,
        Utc.with_ymd_and_hms(2025, 11, 4, 13, 0, 0).unwrap()
    );
}
