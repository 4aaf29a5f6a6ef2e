use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{authorization::AuthorizationState, error::PlatformError, Completion};

pub const REMINDER_TITLE: &str = "Election Reminder";

/// One-shot local notification handed to the OS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub trigger_at: DateTime<Utc>,
    pub badge: u32,
    pub sound: bool,
}

/// Platform-specific notification adapters implement this trait.
///
/// Completions may run on any thread.
pub trait NotificationCenter: Send + Sync {
    fn authorization_status(&self, done: Completion<AuthorizationState>);

    /// Prompts for alert, badge and sound permission.
    fn request_authorization(&self, done: Completion<Result<bool, PlatformError>>);

    /// Registers `request`, replacing any pending request with the same identifier.
    fn add(&self, request: NotificationRequest, done: Completion<Result<(), PlatformError>>);

    /// Removing identifiers that are not pending is not an error.
    fn remove_pending(&self, identifiers: &[String]);

    fn remove_all_pending(&self);

    fn pending(&self, done: Completion<Vec<NotificationRequest>>);
}
