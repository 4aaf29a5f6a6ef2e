use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::clock::{at_local_time, local_date, resolve_local};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReminderType {
    #[serde(rename = "one_week")]
    OneWeekBefore,
    #[serde(rename = "one_day")]
    OneDayBefore,
    #[serde(rename = "morning_of")]
    MorningOf,
}

impl ReminderType {
    pub const ALL: [ReminderType; 3] = [
        ReminderType::OneWeekBefore,
        ReminderType::OneDayBefore,
        ReminderType::MorningOf,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReminderType::OneWeekBefore => "one_week",
            ReminderType::OneDayBefore => "one_day",
            ReminderType::MorningOf => "morning_of",
        }
    }

    pub fn notification_body(self, election_name: &str) -> String {
        match self {
            ReminderType::OneWeekBefore => format!(
                "{election_name} is coming up in one week. Make sure you're registered and know your polling location!"
            ),
            ReminderType::OneDayBefore => format!(
                "{election_name} is tomorrow! Have you checked your polling location and what's on the ballot?"
            ),
            ReminderType::MorningOf => {
                format!("Today is {election_name}! Don't forget to vote. Polls are open now.")
            }
        }
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReminderType(pub String);

impl fmt::Display for UnknownReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown reminder type `{}`", self.0)
    }
}

impl std::error::Error for UnknownReminderType {}

impl FromStr for ReminderType {
    type Err = UnknownReminderType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        ReminderType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| UnknownReminderType(raw.to_string()))
    }
}

/// One scheduled election reminder. The three fields together are the
/// identity; there is no synthetic id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRecord {
    pub election_name: String,
    pub election_date: DateTime<Utc>,
    pub reminder_type: ReminderType,
}

impl ReminderRecord {
    pub fn new(
        election_name: impl Into<String>,
        election_date: DateTime<Utc>,
        reminder_type: ReminderType,
    ) -> Self {
        Self {
            election_name: election_name.into(),
            election_date,
            reminder_type,
        }
    }

    /// Identifier of the OS-level notification backing this record.
    pub fn notification_id(&self) -> String {
        format!(
            "election-{}-{}-{}",
            self.election_name,
            self.reminder_type.as_str(),
            self.election_date.timestamp()
        )
    }

    /// Instant the notification fires, evaluated in `zone`.
    ///
    /// `None` only when the shifted date leaves chrono's representable range.
    pub fn trigger_at(&self, zone: &Tz) -> Option<DateTime<Utc>> {
        let local = self.election_date.with_timezone(zone).naive_local();
        match self.reminder_type {
            ReminderType::OneWeekBefore => local
                .checked_sub_days(Days::new(7))
                .and_then(|naive| resolve_local(zone, naive)),
            ReminderType::OneDayBefore => local
                .checked_sub_days(Days::new(1))
                .and_then(|naive| resolve_local(zone, naive)),
            ReminderType::MorningOf => {
                at_local_time(zone, local_date(zone, self.election_date), 8, 0)
            }
        }
    }

    pub fn notification_body(&self) -> String {
        self.reminder_type.notification_body(&self.election_name)
    }
}
