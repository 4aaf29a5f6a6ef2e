use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Result};
use ballot_domain::{
    calendar::CalendarStore,
    feedback::{HapticEngine, HapticStyle, ShareSheet},
    memory::{InMemoryCalendarStore, InMemoryNotificationCenter, ScriptedShareSheet},
    notifications::NotificationCenter,
};
use tracing::info;

/// How the simulated OS answers permission prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionPolicy {
    #[default]
    Grant,
    Deny,
}

impl PermissionPolicy {
    pub fn grants(self) -> bool {
        matches!(self, PermissionPolicy::Grant)
    }
}

impl FromStr for PermissionPolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grant" => Ok(PermissionPolicy::Grant),
            "deny" => Ok(PermissionPolicy::Deny),
            other => bail!("unknown permission policy `{other}` (expected grant or deny)"),
        }
    }
}

/// Haptic engine for hosts without an actuator.
#[derive(Debug, Default)]
pub struct LoggingHaptics;

impl HapticEngine for LoggingHaptics {
    fn play(&self, style: HapticStyle) {
        info!(?style, "haptic");
    }

    fn play_with_intensity(&self, intensity: f32) {
        info!(intensity, "haptic impact");
    }
}

pub struct SimulatedDevices {
    pub notifications: Arc<dyn NotificationCenter>,
    pub calendar: Arc<dyn CalendarStore>,
    pub haptics: Arc<dyn HapticEngine>,
    pub share: Arc<dyn ShareSheet>,
}

impl SimulatedDevices {
    pub fn new(policy: PermissionPolicy) -> Self {
        Self {
            notifications: Arc::new(InMemoryNotificationCenter::with_policy(policy.grants())),
            calendar: Arc::new(InMemoryCalendarStore::prompting(policy.grants())),
            haptics: Arc::new(LoggingHaptics),
            share: Arc::new(ScriptedShareSheet::completing()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!(" Deny ".parse::<PermissionPolicy>().unwrap(), PermissionPolicy::Deny);
        assert_eq!("grant".parse::<PermissionPolicy>().unwrap(), PermissionPolicy::Grant);
        assert!("maybe".parse::<PermissionPolicy>().is_err());
    }

    #[test]
    fn denying_policy_denies_calendar_prompt() {
        let devices = SimulatedDevices::new(PermissionPolicy::Deny);
        let (tx, rx) = std::sync::mpsc::channel();
        devices
            .calendar
            .request_access(Box::new(move |result| tx.send(result).unwrap()));
        assert_eq!(rx.recv().unwrap(), Ok(false));
    }
}
