use serde::{Deserialize, Serialize};

/// Permission state of one capability as reported by the OS.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationState {
    #[default]
    NotDetermined,
    Denied,
    Restricted,
    Authorized,
    /// Calendar only.
    WriteOnly,
}

impl AuthorizationState {
    pub fn is_authorized(self) -> bool {
        matches!(self, AuthorizationState::Authorized)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthorizationState::NotDetermined => "notDetermined",
            AuthorizationState::Denied => "denied",
            AuthorizationState::Restricted => "restricted",
            AuthorizationState::Authorized => "authorized",
            AuthorizationState::WriteOnly => "writeOnly",
        }
    }

    pub fn calendar_message(self) -> &'static str {
        match self {
            AuthorizationState::NotDetermined => {
                "Calendar access not yet requested. Tap 'Add to Calendar' to enable this feature."
            }
            AuthorizationState::Restricted => "Calendar access is restricted on this device.",
            AuthorizationState::Denied => {
                "Calendar access was denied. Please enable it in Settings > Ballot Buddy > Calendars to add election dates."
            }
            AuthorizationState::Authorized => "Calendar access granted",
            AuthorizationState::WriteOnly => "Calendar write access granted",
        }
    }
}
