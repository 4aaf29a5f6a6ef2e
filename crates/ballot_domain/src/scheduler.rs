use std::sync::Arc;

use chrono_tz::Tz;
use tracing::{error, info, instrument, warn};

use crate::{
    authorization::AuthorizationState,
    clock::Clock,
    error::{BallotError, BallotResult},
    notifications::{NotificationCenter, NotificationRequest, REMINDER_TITLE},
    reminder::ReminderRecord,
    store::ReminderStore,
    Completion,
};

/// Keeps OS-level scheduled notifications and the reminder store in step.
pub struct ReminderScheduler {
    center: Arc<dyn NotificationCenter>,
    store: Arc<ReminderStore>,
    clock: Arc<dyn Clock>,
    zone: Tz,
}

impl ReminderScheduler {
    pub fn new(
        center: Arc<dyn NotificationCenter>,
        store: Arc<ReminderStore>,
        clock: Arc<dyn Clock>,
        zone: Tz,
    ) -> Self {
        Self {
            center,
            store,
            clock,
            zone,
        }
    }

    pub fn check_authorization(&self, done: Completion<AuthorizationState>) {
        self.center.authorization_status(done);
    }

    pub fn request_authorization(&self, done: Completion<BallotResult<bool>>) {
        self.center.request_authorization(Box::new(move |result| {
            done(result.map_err(BallotError::from))
        }));
    }

    /// Registers the notification for `record`, then stores the record.
    ///
    /// Nothing is stored when the trigger is not strictly in the future or
    /// when the OS rejects the registration.
    #[instrument(skip(self, done), fields(election = %record.election_name, kind = %record.reminder_type))]
    pub fn schedule(&self, record: ReminderRecord, done: Completion<BallotResult<()>>) {
        let Some(trigger_at) = record.trigger_at(&self.zone) else {
            warn!("trigger time is out of range");
            done(Err(BallotError::InvalidParameters));
            return;
        };
        let now = self.clock.now();
        if trigger_at <= now {
            info!(%trigger_at, %now, "refusing reminder in the past");
            done(Err(BallotError::PastDate));
            return;
        }

        let request = NotificationRequest {
            identifier: record.notification_id(),
            title: REMINDER_TITLE.to_string(),
            body: record.notification_body(),
            trigger_at,
            badge: 1,
            sound: true,
        };
        let store = Arc::clone(&self.store);
        self.center.add(
            request,
            Box::new(move |result| match result {
                Ok(()) => {
                    info!(%trigger_at, "reminder scheduled");
                    if let Err(err) = store.insert(record) {
                        error!(%err, "reminder scheduled but not persisted");
                    }
                    done(Ok(()))
                }
                Err(err) => {
                    warn!(%err, "notification center rejected reminder");
                    done(Err(err.into()))
                }
            }),
        );
    }

    /// Idempotent: cancelling an unknown reminder changes nothing.
    #[instrument(skip(self), fields(election = %record.election_name, kind = %record.reminder_type))]
    pub fn cancel(&self, record: &ReminderRecord) -> BallotResult<()> {
        self.center.remove_pending(&[record.notification_id()]);
        self.store.remove(record)?;
        Ok(())
    }

    /// Drops every pending notification and clears the whole store.
    #[instrument(skip(self))]
    pub fn cancel_all(&self) -> BallotResult<()> {
        self.center.remove_all_pending();
        self.store.clear()?;
        Ok(())
    }

    pub fn list(&self) -> Vec<ReminderRecord> {
        self.store.list()
    }

    pub fn pending(&self, done: Completion<Vec<NotificationRequest>>) {
        self.center.pending(done);
    }
}
