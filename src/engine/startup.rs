//! Startup synchronizer
//!
//! Runs exactly once, before the initialization grace window expires:
//! pushes each enabled channel's physical input state into its virtual
//! toggle so the app-facing state starts out truthful. The toggle-set
//! echoes this produces are discarded by the grace window; no lock is
//! taken and no relay is ever pulsed here.

use tracing::{info, warn};

use super::Engine;

impl Engine {
    /// Prime every enabled channel's virtual toggle from its input
    ///
    /// Fails softly: a channel whose input or toggle cannot be read is
    /// logged and skipped, never fatal. The next genuine state change
    /// will resynchronize it.
    pub(crate) async fn prime_virtual_toggles(&self) {
        info!(
            "Priming virtual toggles ({} enabled channels)...",
            self.registry.enabled_channels().count()
        );

        for channel in self.registry.enabled_channels() {
            let input = self.host.read_status(channel.input_component()).await;
            let toggle = self.host.read_status(channel.toggle_component()).await;

            let state = match (input, toggle) {
                (Some(state), Some(_)) => state,
                _ => {
                    warn!("{}: components not readable, skipping startup sync", channel.name);
                    continue;
                }
            };

            if let Err(e) = self.host.set_virtual_toggle(channel.toggle_id, state).await {
                warn!("{}: failed to prime virtual toggle: {}", channel.name, e);
                continue;
            }

            info!("{}: initial state set to {}", channel.name, state);
        }
    }
}
