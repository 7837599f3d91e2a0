use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use shared_models::Appointment;

use crate::services::queue::QueueEngine;

/// Polls one appointment on a fixed interval and publishes it whenever it
/// changes. Polling stops when the tracker is dropped or stopped.
pub struct StatusTracker {
    appointment_id: String,
    receiver: watch::Receiver<Option<Appointment>>,
    handle: JoinHandle<()>,
}

impl StatusTracker {
    pub fn spawn(engine: QueueEngine, appointment_id: impl Into<String>, period: Duration) -> Self {
        let appointment_id = appointment_id.into();
        let (sender, receiver) = watch::channel(None);

        let polled_id = appointment_id.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                match engine.get_appointment(&polled_id).await {
                    Ok(Some(latest)) => {
                        sender.send_if_modified(|current| {
                            if current.as_ref() == Some(&latest) {
                                return false;
                            }
                            debug!("Appointment {} is now {}", polled_id, latest.status);
                            *current = Some(latest);
                            true
                        });
                    }
                    Ok(None) => warn!("Tracked appointment {} no longer exists", polled_id),
                    Err(e) => warn!("Status poll for {} failed: {}", polled_id, e),
                }
            }
        });

        Self {
            appointment_id,
            receiver,
            handle,
        }
    }

    pub fn appointment_id(&self) -> &str {
        &self.appointment_id
    }

    /// Most recent record seen, if any poll has completed.
    pub fn latest(&self) -> Option<Appointment> {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Appointment>> {
        self.receiver.clone()
    }

    /// Waits for the next published change. `None` once polling has stopped.
    pub async fn changed(&mut self) -> Option<Appointment> {
        self.receiver.changed().await.ok()?;
        self.receiver.borrow_and_update().clone()
    }

    /// Same as dropping the tracker.
    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for StatusTracker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
