//! Reconciliation engine - core orchestration of channel state
//!
//! The engine is an actor that owns all mutable reconciliation state
//! (the per-channel lock table and the initialization flag) and drains a
//! single event queue. Status notifications from the host, unlock timer
//! firings, and the startup-grace expiry all arrive as [`EngineEvent`]s
//! on the same queue, so no two handler invocations ever overlap and no
//! lock is needed around engine state.

mod locks;
mod reconcile;
mod scheduler;
mod startup;


pub use locks::LockTable;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::component::{ChannelId, StatusEvent};
use crate::config::TimingConfig;
use crate::hosts::HostRuntime;
use crate::registry::ChannelRegistry;
use scheduler::Scheduler;

/// Events consumed by the engine's dispatch loop
#[derive(Debug)]
pub enum EngineEvent {
    /// Status-change notification published by the host
    Status(StatusEvent),
    /// Settle window elapsed for a channel; clear its lock
    Unlock(ChannelId),
    /// Startup grace window elapsed; begin live event handling
    InitElapsed,
    /// Stop the dispatch loop
    Shutdown,
}

/// Handle for delivering events to a running engine
///
/// This is the status-subscription seam: hosts publish `{component,
/// delta}` notifications through it. Cloning is cheap; all sends are
/// fire-and-forget.
#[derive(Clone)]
pub struct EngineHandle {
    event_tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineHandle {
    /// Publish a status-change notification
    pub fn publish_status(&self, event: StatusEvent) {
        let _ = self.event_tx.send(EngineEvent::Status(event));
    }

    /// Signal the engine to shut down gracefully
    pub fn shutdown(&self) {
        let _ = self.event_tx.send(EngineEvent::Shutdown);
    }

    /// Check if the engine is still alive
    pub fn is_alive(&self) -> bool {
        !self.event_tx.is_closed()
    }
}

/// Per-channel reconciliation engine
pub struct Engine {
    /// Static channel lookup table
    registry: Arc<ChannelRegistry>,
    /// Device seam
    host: Arc<dyn HostRuntime>,
    /// Settle and grace durations
    timing: TimingConfig,
    /// Per-channel echo-suppression latches
    locks: LockTable,
    /// True until the startup grace window elapses; all status events
    /// are discarded while set
    initializing: bool,
    /// Inbound event queue
    event_rx: mpsc::UnboundedReceiver<EngineEvent>,
    /// Deferred-event scheduler feeding the queue
    scheduler: Scheduler,
}

impl Engine {
    /// Create an engine and the handle for feeding it events
    pub fn new(
        registry: Arc<ChannelRegistry>,
        host: Arc<dyn HostRuntime>,
        timing: TimingConfig,
    ) -> (Self, EngineHandle) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let engine = Engine {
            locks: LockTable::for_registry(&registry),
            registry,
            host,
            timing,
            initializing: true,
            event_rx,
            scheduler: Scheduler::new(event_tx.clone()),
        };

        (engine, EngineHandle { event_tx })
    }

    /// Spawn the engine's run loop as a tokio task and return its handle
    pub fn spawn(
        registry: Arc<ChannelRegistry>,
        host: Arc<dyn HostRuntime>,
        timing: TimingConfig,
    ) -> EngineHandle {
        let (engine, handle) = Self::new(registry, host, timing);
        tokio::spawn(engine.run());
        handle
    }

    /// Main run loop
    ///
    /// Primes the virtual toggles, arms the initialization-grace timer,
    /// then processes events until the queue closes or a shutdown event
    /// arrives. Everything that mutates engine state happens here,
    /// sequentially.
    pub async fn run(mut self) {
        self.prime_virtual_toggles().await;

        self.scheduler.schedule_once(
            Duration::from_millis(self.timing.startup_grace_ms),
            EngineEvent::InitElapsed,
        );
        info!(
            "Engine started, discarding events for {} ms grace window",
            self.timing.startup_grace_ms
        );

        while let Some(event) = self.event_rx.recv().await {
            trace!(?event, "Processing event");

            match event {
                EngineEvent::Status(status) => self.on_status(status).await,
                EngineEvent::Unlock(channel_id) => self.on_unlock(channel_id),
                EngineEvent::InitElapsed => {
                    self.initializing = false;
                    info!("Initialization complete, engine active");
                }
                EngineEvent::Shutdown => {
                    info!("Engine shutting down");
                    break;
                }
            }
        }

        debug!("Engine run loop ended");
    }

    /// Arm the one-shot unlock timer for a channel
    ///
    /// Timers are never cancelled: once armed, the unlock always fires
    /// after the full settle duration.
    fn arm_unlock(&self, channel_id: ChannelId) {
        self.scheduler.schedule_once(
            Duration::from_millis(self.timing.settle_ms),
            EngineEvent::Unlock(channel_id),
        );
    }

    /// Clear a channel's lock (no effect if already clear)
    fn on_unlock(&mut self, channel_id: ChannelId) {
        self.locks.release(channel_id);
        if let Some(channel) = self.registry.get(channel_id) {
            debug!("{}: lock released", channel.name);
        }
    }
}
