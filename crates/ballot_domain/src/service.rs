use std::sync::Arc;

use chrono_tz::Tz;
use thiserror::Error;

use crate::{
    calendar::{CalendarService, CalendarStore},
    clock::{Clock, SystemClock},
    feedback::{HapticEngine, ShareSheet},
    notifications::NotificationCenter,
    scheduler::ReminderScheduler,
    store::{KeyValueStorage, MemoryStorage, ReminderStore},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing capability: {0}")]
    MissingCapability(&'static str),
}

/// The native capabilities exposed to web content, constructed once and
/// shared with the bridge.
pub struct BallotService {
    reminders: ReminderScheduler,
    calendar: CalendarService,
    haptics: Arc<dyn HapticEngine>,
    share: Arc<dyn ShareSheet>,
    zone: Tz,
}

pub struct BallotServiceBuilder {
    notification_center: Option<Arc<dyn NotificationCenter>>,
    calendar_store: Option<Arc<dyn CalendarStore>>,
    haptics: Option<Arc<dyn HapticEngine>>,
    share: Option<Arc<dyn ShareSheet>>,
    storage: Option<Arc<dyn KeyValueStorage>>,
    clock: Option<Arc<dyn Clock>>,
    zone: Tz,
}

impl BallotServiceBuilder {
    pub fn new() -> Self {
        Self {
            notification_center: None,
            calendar_store: None,
            haptics: None,
            share: None,
            storage: None,
            clock: None,
            zone: Tz::UTC,
        }
    }

    pub fn with_notification_center(mut self, center: Arc<dyn NotificationCenter>) -> Self {
        self.notification_center = Some(center);
        self
    }

    pub fn with_calendar_store(mut self, store: Arc<dyn CalendarStore>) -> Self {
        self.calendar_store = Some(store);
        self
    }

    pub fn with_haptics(mut self, engine: Arc<dyn HapticEngine>) -> Self {
        self.haptics = Some(engine);
        self
    }

    pub fn with_share_sheet(mut self, share: Arc<dyn ShareSheet>) -> Self {
        self.share = Some(share);
        self
    }

    /// Defaults to in-memory storage.
    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Defaults to the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Zone used for "local time" in trigger and calendar computations.
    pub fn with_timezone(mut self, zone: Tz) -> Self {
        self.zone = zone;
        self
    }

    pub fn build(self) -> Result<BallotService, BuildError> {
        let center = self
            .notification_center
            .ok_or(BuildError::MissingCapability("notification center"))?;
        let calendar_store = self
            .calendar_store
            .ok_or(BuildError::MissingCapability("calendar store"))?;
        let haptics = self
            .haptics
            .ok_or(BuildError::MissingCapability("haptic engine"))?;
        let share = self
            .share
            .ok_or(BuildError::MissingCapability("share sheet"))?;
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let store = Arc::new(ReminderStore::open(storage));
        Ok(BallotService {
            reminders: ReminderScheduler::new(center, store, clock, self.zone),
            calendar: CalendarService::new(calendar_store, self.zone),
            haptics,
            share,
            zone: self.zone,
        })
    }
}

impl Default for BallotServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BallotService {
    pub fn builder() -> BallotServiceBuilder {
        BallotServiceBuilder::new()
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    pub fn calendar(&self) -> &CalendarService {
        &self.calendar
    }

    pub fn haptics(&self) -> &dyn HapticEngine {
        self.haptics.as_ref()
    }

    pub fn share_sheet(&self) -> &dyn ShareSheet {
        self.share.as_ref()
    }

    pub fn timezone(&self) -> Tz {
        self.zone
    }
}
