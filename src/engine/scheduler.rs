//! Deferred-event scheduler
//!
//! "Waiting" in the engine is never expressed by blocking: a deferred
//! action is a spawned task that sleeps and then feeds an event back
//! into the engine queue. One-shot, not cancellable, not repeating.

use std::time::Duration;

use tokio::sync::mpsc;

use super::EngineEvent;

/// Feeds delayed events into the engine queue
pub(crate) struct Scheduler {
    event_tx: mpsc::UnboundedSender<EngineEvent>,
}

impl Scheduler {
    pub(crate) fn new(event_tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { event_tx }
    }

    /// Deliver `event` to the engine queue after `delay`
    ///
    /// Fire-and-forget: if the engine is gone by the time the timer
    /// fires, the send failure is ignored.
    pub(crate) fn schedule_once(&self, delay: Duration, event: EngineEvent) {
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = event_tx.send(event);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ChannelId;

    #[tokio::test]
    async fn test_schedule_once_delivers_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);

        scheduler.schedule_once(Duration::from_millis(20), EngineEvent::Unlock(2 as ChannelId));

        // Nothing should arrive immediately
        assert!(rx.try_recv().is_err());

        let event = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timer should fire")
            .expect("channel open");
        assert!(matches!(event, EngineEvent::Unlock(2)));
    }

    #[tokio::test]
    async fn test_schedule_once_survives_dropped_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        drop(rx);

        // Must not panic when the engine is gone
        scheduler.schedule_once(Duration::from_millis(5), EngineEvent::InitElapsed);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
