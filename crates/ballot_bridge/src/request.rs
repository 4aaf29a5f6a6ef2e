use anyhow::{anyhow, Context, Result};
use ballot_domain::{
    calendar::ElectionEvent,
    clock::start_of_local_day,
    feedback::HapticStyle,
    reminder::{ReminderRecord, ReminderType},
    BallotError,
};
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Every action name the web content may post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Haptic,
    RequestNotificationPermission,
    ScheduleElectionReminder,
    CancelReminder,
    CancelAllReminders,
    GetNotificationStatus,
    GetReminderPreferences,
    GetPendingNotifications,
    RequestCalendarPermission,
    AddToCalendar,
    RemoveFromCalendar,
    CalendarEventExists,
    GetCalendarStatus,
    Share,
}

impl Action {
    pub const ALL: [Action; 14] = [
        Action::Haptic,
        Action::RequestNotificationPermission,
        Action::ScheduleElectionReminder,
        Action::CancelReminder,
        Action::CancelAllReminders,
        Action::GetNotificationStatus,
        Action::GetReminderPreferences,
        Action::GetPendingNotifications,
        Action::RequestCalendarPermission,
        Action::AddToCalendar,
        Action::RemoveFromCalendar,
        Action::CalendarEventExists,
        Action::GetCalendarStatus,
        Action::Share,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Haptic => "haptic",
            Action::RequestNotificationPermission => "requestNotificationPermission",
            Action::ScheduleElectionReminder => "scheduleElectionReminder",
            Action::CancelReminder => "cancelReminder",
            Action::CancelAllReminders => "cancelAllReminders",
            Action::GetNotificationStatus => "getNotificationStatus",
            Action::GetReminderPreferences => "getReminderPreferences",
            Action::GetPendingNotifications => "getPendingNotifications",
            Action::RequestCalendarPermission => "requestCalendarPermission",
            Action::AddToCalendar => "addToCalendar",
            Action::RemoveFromCalendar => "removeFromCalendar",
            Action::CalendarEventExists => "calendarEventExists",
            Action::GetCalendarStatus => "getCalendarStatus",
            Action::Share => "share",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Action::ALL.into_iter().find(|action| action.name() == name)
    }

    /// Haptics never answer, even when a callback id is supplied.
    pub fn expects_response(self) -> bool {
        !matches!(self, Action::Haptic)
    }
}

/// A bridge message split into its routing fields and the raw body.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub action: String,
    pub callback_id: Option<String>,
    pub body: Value,
}

impl Envelope {
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).context("bridge message is not JSON")?;
        Self::from_value(value)
    }

    pub fn from_value(body: Value) -> Result<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| anyhow!("bridge message is not an object"))?;
        let action = object
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("bridge message has no string `action`"))?
            .to_string();
        let callback_id = object
            .get("callbackId")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self {
            action,
            callback_id,
            body,
        })
    }
}

/// A decoded, validated bridge request.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeRequest {
    Haptic {
        style: HapticStyle,
        intensity: Option<f64>,
    },
    RequestNotificationPermission,
    ScheduleElectionReminder(ReminderRecord),
    CancelReminder(ReminderRecord),
    CancelAllReminders,
    GetNotificationStatus,
    GetReminderPreferences,
    GetPendingNotifications,
    RequestCalendarPermission,
    AddToCalendar(ElectionEvent),
    RemoveFromCalendar { event_identifier: String },
    CalendarEventExists { event_identifier: String },
    GetCalendarStatus,
    Share { text: String },
}

#[derive(Deserialize)]
struct HapticArgs {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    intensity: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReminderArgs {
    election_name: String,
    election_date: String,
    reminder_type: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarArgs {
    election_name: String,
    election_date: String,
    #[serde(default)]
    polling_location: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventIdArgs {
    event_identifier: String,
}

#[derive(Deserialize)]
struct ShareArgs {
    text: String,
}

impl BridgeRequest {
    /// Validates the fields `action` requires. Dates without a time of day
    /// are read as local midnight in `zone`.
    pub fn decode(action: Action, body: &Value, zone: &Tz) -> Result<Self, BallotError> {
        let request = match action {
            Action::Haptic => {
                let args: HapticArgs = fields(body)?;
                BridgeRequest::Haptic {
                    style: HapticStyle::from_name(&args.kind),
                    intensity: args.intensity,
                }
            }
            Action::RequestNotificationPermission => BridgeRequest::RequestNotificationPermission,
            Action::ScheduleElectionReminder => {
                BridgeRequest::ScheduleElectionReminder(reminder(fields(body)?, zone)?)
            }
            Action::CancelReminder => BridgeRequest::CancelReminder(reminder(fields(body)?, zone)?),
            Action::CancelAllReminders => BridgeRequest::CancelAllReminders,
            Action::GetNotificationStatus => BridgeRequest::GetNotificationStatus,
            Action::GetReminderPreferences => BridgeRequest::GetReminderPreferences,
            Action::GetPendingNotifications => BridgeRequest::GetPendingNotifications,
            Action::RequestCalendarPermission => BridgeRequest::RequestCalendarPermission,
            Action::AddToCalendar => {
                let args: CalendarArgs = fields(body)?;
                BridgeRequest::AddToCalendar(ElectionEvent {
                    name: args.election_name,
                    date: parse_timestamp(&args.election_date, zone)
                        .ok_or(BallotError::InvalidParameters)?,
                    polling_location: args.polling_location,
                    notes: args.notes,
                })
            }
            Action::RemoveFromCalendar => {
                let args: EventIdArgs = fields(body)?;
                BridgeRequest::RemoveFromCalendar {
                    event_identifier: args.event_identifier,
                }
            }
            Action::CalendarEventExists => {
                let args: EventIdArgs = fields(body)?;
                BridgeRequest::CalendarEventExists {
                    event_identifier: args.event_identifier,
                }
            }
            Action::GetCalendarStatus => BridgeRequest::GetCalendarStatus,
            Action::Share => {
                let args: ShareArgs = fields(body)?;
                BridgeRequest::Share { text: args.text }
            }
        };
        Ok(request)
    }
}

fn fields<T: DeserializeOwned>(body: &Value) -> Result<T, BallotError> {
    T::deserialize(body).map_err(|err| {
        tracing::debug!(%err, "bridge fields rejected");
        BallotError::InvalidParameters
    })
}

fn reminder(args: ReminderArgs, zone: &Tz) -> Result<ReminderRecord, BallotError> {
    let election_date =
        parse_timestamp(&args.election_date, zone).ok_or(BallotError::InvalidParameters)?;
    let reminder_type = args
        .reminder_type
        .parse::<ReminderType>()
        .map_err(|_| BallotError::InvalidParameters)?;
    Ok(ReminderRecord::new(args.election_name, election_date, reminder_type))
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates. Fractional
/// seconds are dropped so the stored date matches its notification id and
/// its formatted form.
pub fn parse_timestamp(raw: &str, zone: &Tz) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc).trunc_subsecs(0));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    start_of_local_day(zone, date)
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
