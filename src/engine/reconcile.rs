//! Status-event reconciliation
//!
//! One invocation per status-change notification. A chain of guards
//! filters out noise (initialization window, unidentifiable or unmanaged
//! components, locked channels), then the event origin picks the branch:
//! a physical input change is mirrored into the virtual toggle, a
//! virtual toggle change fires a relay pulse. Either action latches the
//! channel's lock and arms the unlock timer, so the echoes the action
//! generates are dropped until the relay has settled.

use tracing::{info, trace, warn};

use super::Engine;
use crate::component::{ComponentId, StatusEvent};

impl Engine {
    /// Handle one status-change notification
    ///
    /// Dropping an event is a filtering decision, not an error: dropped
    /// events are logged at trace level only and never retried.
    pub(crate) async fn on_status(&mut self, event: StatusEvent) {
        if self.initializing {
            trace!(?event, "Dropped: still initializing");
            return;
        }

        let Some(component) = event.component_id() else {
            trace!(?event, "Dropped: no identifiable source component");
            return;
        };

        let Some(channel) = self.registry.resolve(component) else {
            trace!(%component, "Dropped: component not managed");
            return;
        };

        if self.locks.is_locked(channel.id) {
            trace!(%component, "Dropped: channel locked");
            return;
        }

        match component {
            ComponentId::Input(_) => {
                let Some(new_state) = event.delta.state else {
                    trace!(%component, "Dropped: input event without state delta");
                    return;
                };

                // An input event whose level already matches the toggle is
                // the reflection of a toggle push this engine issued, not a
                // user-originated change. Drop it silently, no lock needed.
                let current = self.host.read_status(channel.toggle_component()).await;
                if current == Some(new_state) {
                    trace!(%component, "Dropped: toggle already at input level");
                    return;
                }

                info!("{}: physical change detected, syncing virtual toggle", channel.name);
                self.locks.lock(channel.id);
                if let Err(e) = self.host.set_virtual_toggle(channel.toggle_id, new_state).await {
                    warn!("{}: toggle sync failed: {}", channel.name, e);
                }
                self.arm_unlock(channel.id);
            }
            ComponentId::Toggle(_) => {
                if event.delta.value.is_none() {
                    trace!(%component, "Dropped: toggle event without value delta");
                    return;
                }

                // No value comparison here: the relay control is a transient
                // pulse with no steady level to compare against, so every
                // accepted toggle command fires exactly one pulse.
                info!("{}: app command received, sending pulse", channel.name);
                self.locks.lock(channel.id);
                if let Err(e) = self.host.pulse_relay(channel.id).await {
                    warn!("{}: relay pulse failed: {}", channel.name, e);
                }
                self.arm_unlock(channel.id);
            }
            // The registry never resolves relay components
            ComponentId::Relay(_) => {}
        }
    }
}
