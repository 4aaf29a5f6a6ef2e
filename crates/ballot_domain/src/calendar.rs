use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    authorization::AuthorizationState,
    clock::{at_local_time, local_date, start_of_local_day},
    error::{BallotError, BallotResult, PlatformError},
    Completion,
};

const NOTES_PREAMBLE: &str = "🗳️ Election Day - Make Your Voice Heard!";
const NOTES_CHECKLIST: [&str; 4] = [
    "Bring valid ID (check your state's requirements)",
    "Check polling hours before you go",
    "Review your sample ballot",
    "Share this important date with friends and family",
];
const NOTES_FOOTER: &str = "Created by Ballot Buddy - Your Election Companion";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventDraft {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub notes: String,
    pub alarms: Vec<DateTime<Utc>>,
}

/// Election the web content asked to put on the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionEvent {
    pub name: String,
    pub date: DateTime<Utc>,
    pub polling_location: Option<String>,
    pub notes: Option<String>,
}

/// Platform calendar database (EventKit, CalendarContract, ...).
pub trait CalendarStore: Send + Sync {
    fn authorization_status(&self) -> AuthorizationState;

    /// Shows the OS permission prompt. Completions may run on any thread.
    fn request_access(&self, done: Completion<Result<bool, PlatformError>>);

    /// Saves the event in one atomic call and returns its identifier.
    fn save(&self, draft: CalendarEventDraft) -> Result<String, PlatformError>;

    fn contains(&self, identifier: &str) -> bool;

    fn remove(&self, identifier: &str) -> Result<(), PlatformError>;
}

pub struct CalendarService {
    store: Arc<dyn CalendarStore>,
    zone: Tz,
}

impl CalendarService {
    pub fn new(store: Arc<dyn CalendarStore>, zone: Tz) -> Self {
        Self { store, zone }
    }

    pub fn check_authorization(&self) -> AuthorizationState {
        self.store.authorization_status()
    }

    pub fn authorization_message(&self) -> &'static str {
        self.check_authorization().calendar_message()
    }

    /// Prompts once per call; an already authorized store answers without prompting.
    pub fn request_authorization(&self, done: Completion<BallotResult<bool>>) {
        if self.check_authorization().is_authorized() {
            debug!("calendar already authorized; skipping prompt");
            done(Ok(true));
            return;
        }
        self.store
            .request_access(Box::new(move |result| done(result.map_err(BallotError::from))));
    }

    /// Creates an all-day event, asking for access first when needed.
    #[instrument(skip(self, done), fields(election = %event.name))]
    pub fn add_event(&self, event: ElectionEvent, done: Completion<BallotResult<String>>) {
        if self.check_authorization().is_authorized() {
            done(save_event(self.store.as_ref(), &self.zone, &event));
            return;
        }

        let store = Arc::clone(&self.store);
        let zone = self.zone;
        info!("calendar not authorized; requesting access before adding event");
        self.store.request_access(Box::new(move |result| match result {
            Ok(true) => done(save_event(store.as_ref(), &zone, &event)),
            Ok(false) => {
                warn!("calendar access not granted");
                done(Err(BallotError::calendar_access_denied()))
            }
            Err(err) => {
                warn!(%err, "calendar access request failed");
                done(Err(err.into()))
            }
        }));
    }

    #[instrument(skip(self))]
    pub fn remove_event(&self, identifier: &str) -> BallotResult<()> {
        if !self.check_authorization().is_authorized() {
            return Err(BallotError::calendar_access_denied());
        }
        if !self.store.contains(identifier) {
            return Err(BallotError::event_not_found());
        }
        self.store.remove(identifier)?;
        info!("calendar event removed");
        Ok(())
    }

    /// `false` whenever unauthorized, since existence cannot be checked then.
    pub fn event_exists(&self, identifier: &str) -> bool {
        self.check_authorization().is_authorized() && self.store.contains(identifier)
    }

    pub fn draft_for(&self, event: &ElectionEvent) -> BallotResult<CalendarEventDraft> {
        build_draft(&self.zone, event)
    }
}

fn save_event(store: &dyn CalendarStore, zone: &Tz, event: &ElectionEvent) -> BallotResult<String> {
    let draft = build_draft(zone, event)?;
    let identifier = store.save(draft)?;
    info!(%identifier, "calendar event saved");
    Ok(identifier)
}

fn build_draft(zone: &Tz, event: &ElectionEvent) -> BallotResult<CalendarEventDraft> {
    let day = local_date(zone, event.date);
    let next_day = day
        .checked_add_days(Days::new(1))
        .ok_or(BallotError::InvalidParameters)?;
    let start = start_of_local_day(zone, day).ok_or(BallotError::InvalidParameters)?;
    let end = start_of_local_day(zone, next_day).ok_or(BallotError::InvalidParameters)?;

    let location = event
        .polling_location
        .as_ref()
        .filter(|location| !location.is_empty())
        .cloned();

    Ok(CalendarEventDraft {
        title: event.name.clone(),
        start,
        end,
        all_day: true,
        location,
        notes: compose_notes(event.notes.as_deref()),
        alarms: election_alarms(zone, day),
    })
}

/// 09:00 a week ahead and 08:00 on the day; either is skipped if it cannot be computed.
fn election_alarms(zone: &Tz, day: NaiveDate) -> Vec<DateTime<Utc>> {
    let week_before = day
        .checked_sub_days(Days::new(7))
        .and_then(|date| at_local_time(zone, date, 9, 0));
    let morning_of = at_local_time(zone, day, 8, 0);
    [week_before, morning_of].into_iter().flatten().collect()
}

fn compose_notes(custom: Option<&str>) -> String {
    let mut notes = format!("{NOTES_PREAMBLE}\n\n");
    if let Some(custom) = custom.filter(|text| !text.is_empty()) {
        notes.push_str(custom);
        notes.push_str("\n\n");
    }
    notes.push_str("Reminders:\n");
    for item in NOTES_CHECKLIST {
        notes.push_str("• ");
        notes.push_str(item);
        notes.push('\n');
    }
    notes.push('\n');
    notes.push_str(NOTES_FOOTER);
    notes
}
