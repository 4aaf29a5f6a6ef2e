use ballot_domain::{
    authorization::AuthorizationState,
    feedback::ShareOutcome,
    notifications::NotificationRequest,
    reminder::{ReminderRecord, ReminderType},
    BallotError, BallotResult, PlatformError,
};
use serde::Serialize;

use crate::request::format_timestamp;

fn error_text(err: &BallotError) -> String {
    err.to_string()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub error: String,
}

impl Outcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: String::new(),
        }
    }

    pub fn failed(err: &BallotError) -> Self {
        Self {
            success: false,
            error: error_text(err),
        }
    }

    pub fn from_result<T>(result: &BallotResult<T>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(err) => Self::failed(err),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PermissionOutcome {
    pub success: bool,
    pub authorized: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PermissionOutcome {
    pub fn from_result(result: &BallotResult<bool>) -> Self {
        match result {
            Ok(granted) => Self {
                success: *granted,
                authorized: *granted,
                error: String::new(),
                message: None,
            },
            Err(err) => Self {
                success: false,
                authorized: false,
                error: error_text(err),
                message: None,
            },
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NotificationStatus {
    pub authorized: bool,
    pub status: AuthorizationState,
}

impl From<AuthorizationState> for NotificationStatus {
    fn from(status: AuthorizationState) -> Self {
        Self {
            authorized: status.is_authorized(),
            status,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CalendarStatus {
    pub authorized: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceEntry {
    pub election_name: String,
    pub election_date: String,
    pub reminder_type: ReminderType,
}

impl From<&ReminderRecord> for PreferenceEntry {
    fn from(record: &ReminderRecord) -> Self {
        Self {
            election_name: record.election_name.clone(),
            election_date: format_timestamp(record.election_date),
            reminder_type: record.reminder_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReminderPreferences {
    pub preferences: Vec<PreferenceEntry>,
}

impl ReminderPreferences {
    pub fn from_records(records: &[ReminderRecord]) -> Self {
        Self {
            preferences: records.iter().map(PreferenceEntry::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingEntry {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub trigger_date: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PendingNotifications {
    pub notifications: Vec<PendingEntry>,
}

impl PendingNotifications {
    pub fn from_requests(requests: Vec<NotificationRequest>) -> Self {
        let notifications = requests
            .into_iter()
            .map(|request| PendingEntry {
                trigger_date: format_timestamp(request.trigger_at),
                identifier: request.identifier,
                title: request.title,
                body: request.body,
            })
            .collect();
        Self { notifications }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarAdded {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_identifier: Option<String>,
}

impl From<BallotResult<String>> for CalendarAdded {
    fn from(result: BallotResult<String>) -> Self {
        match result {
            Ok(identifier) => Self {
                success: true,
                error: String::new(),
                event_identifier: Some(identifier),
            },
            Err(err) => Self {
                success: false,
                error: error_text(&err),
                event_identifier: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EventExistence {
    pub exists: bool,
}

/// `success` is false both for a dismissed sheet and for a failure; only the
/// latter carries error text.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Shared {
    pub success: bool,
    pub error: String,
}

impl From<Result<ShareOutcome, PlatformError>> for Shared {
    fn from(result: Result<ShareOutcome, PlatformError>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: outcome.completed,
                error: String::new(),
            },
            Err(err) => Self {
                success: false,
                error: err.message().to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, to_value};

    #[test]
    fn failed_outcome_carries_error_text() {
        let payload = to_value(Outcome::failed(&BallotError::PastDate)).unwrap();
        assert_eq!(
            payload,
            json!({"success": false, "error": "Reminder date is in the past"})
        );
    }

    #[test]
    fn calendar_added_omits_missing_identifier() {
        let failed = to_value(CalendarAdded::from(Err::<String, _>(
            BallotError::calendar_access_denied(),
        )))
        .unwrap();
        assert_eq!(
            failed,
            json!({"success": false, "error": "Calendar access not granted"})
        );

        let added = to_value(CalendarAdded::from(Ok("E-1".to_string()))).unwrap();
        assert_eq!(
            added,
            json!({"success": true, "error": "", "eventIdentifier": "E-1"})
        );
    }

    #[test]
    fn preferences_use_wire_names() {
        let record = ReminderRecord::new(
            "City Council Runoff",
            Utc.with_ymd_and_hms(2025, 11, 4, 0, 0, 0).unwrap(),
            ReminderType::MorningOf,
        );
        let payload = to_value(ReminderPreferences::from_records(&[record])).unwrap();
        assert_eq!(
            payload,
            json!({"preferences": [{
                "electionName": "City Council Runoff",
                "electionDate": "2025-11-04T00:00:00Z",
                "reminderType": "morning_of"
            }]})
        );
    }

    #[test]
    fn notification_status_reports_state_name() {
        let payload = to_value(NotificationStatus::from(AuthorizationState::Denied)).unwrap();
        assert_eq!(payload, json!({"authorized": false, "status": "denied"}));
    }

    #[test]
    fn permission_outcome_with_message() {
        let payload = to_value(
            PermissionOutcome::from_result(&Ok(true)).with_message("Calendar access granted"),
        )
        .unwrap();
        assert_eq!(
            payload,
            json!({
                "success": true,
                "authorized": true,
                "error": "",
                "message": "Calendar access granted"
            })
        );
    }
}
