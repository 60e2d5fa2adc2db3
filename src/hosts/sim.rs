//! Simulated host - in-memory device model for the REPL and tests
//!
//! Models the hardware the engine cares about: boolean input terminals
//! sensing the load wire, virtual toggles, and impulse relay outputs
//! that invert the load on each pulse. Every level change is echoed back
//! to the engine as a status event, exactly the way real firmware
//! reflects its own writes - which is what makes the sim useful for
//! exercising the anti-echo locking end to end.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::component::{ChannelId, ComponentId, StatusDelta, StatusEvent, ToggleId};
use crate::engine::EngineHandle;
use crate::registry::ChannelRegistry;

use super::HostRuntime;

/// In-memory device with event echo
pub struct SimHost {
    /// Sensed load level per physical input
    inputs: RwLock<HashMap<ChannelId, bool>>,
    /// Virtual toggle values
    toggles: RwLock<HashMap<ToggleId, bool>>,
    /// Engine to publish status events to, attached after spawn
    sink: RwLock<Option<EngineHandle>>,
    /// Toggle-set calls observed (engine-originated)
    set_count: RwLock<u64>,
    /// Relay pulses observed
    pulse_count: RwLock<u64>,
}

impl SimHost {
    /// Create a sim with every configured channel present and all levels off
    ///
    /// Disabled channels are seeded too: the device has the components
    /// either way, the engine just ignores them.
    pub fn from_registry(registry: &ChannelRegistry) -> Self {
        let mut inputs = HashMap::new();
        let mut toggles = HashMap::new();
        for channel in registry.all_channels() {
            inputs.insert(channel.id, false);
            toggles.insert(channel.toggle_id, false);
        }

        Self {
            inputs: RwLock::new(inputs),
            toggles: RwLock::new(toggles),
            sink: RwLock::new(None),
            set_count: RwLock::new(0),
            pulse_count: RwLock::new(0),
        }
    }

    /// Attach the engine that receives this device's status events
    pub fn set_event_sink(&self, handle: EngineHandle) {
        *self.sink.write() = Some(handle);
    }

    fn emit(&self, event: StatusEvent) {
        if let Some(sink) = self.sink.read().as_ref() {
            sink.publish_status(event);
        }
    }

    /// Externally actuate a channel's impulse relay (e.g. a wall button
    /// wired straight to it), inverting the sensed load level
    ///
    /// Returns the new level, or `None` for an unknown channel.
    pub fn flip_input(&self, channel_id: ChannelId) -> Option<bool> {
        let new_level = {
            let mut inputs = self.inputs.write();
            let level = inputs.get_mut(&channel_id)?;
            *level = !*level;
            *level
        };
        self.emit(StatusEvent::new(
            ComponentId::Input(channel_id),
            StatusDelta::state(new_level),
        ));
        Some(new_level)
    }

    /// Set a channel's sensed input level directly
    ///
    /// Emits a status event only when the level actually changes, the
    /// way device deltas work.
    pub fn set_input(&self, channel_id: ChannelId, level: bool) -> Option<bool> {
        let changed = {
            let mut inputs = self.inputs.write();
            let current = inputs.get_mut(&channel_id)?;
            let changed = *current != level;
            *current = level;
            changed
        };
        if changed {
            self.emit(StatusEvent::new(
                ComponentId::Input(channel_id),
                StatusDelta::state(level),
            ));
        }
        Some(level)
    }

    /// Simulate an app/user command on a virtual toggle
    pub fn app_set_toggle(&self, toggle_id: ToggleId, value: bool) -> Option<bool> {
        let changed = self.store_toggle(toggle_id, value)?;
        if changed {
            self.emit(StatusEvent::new(
                ComponentId::Toggle(toggle_id),
                StatusDelta::value(value),
            ));
        }
        Some(value)
    }

    /// Current sensed input level
    pub fn input_level(&self, channel_id: ChannelId) -> Option<bool> {
        self.inputs.read().get(&channel_id).copied()
    }

    /// Current virtual toggle value
    pub fn toggle_level(&self, toggle_id: ToggleId) -> Option<bool> {
        self.toggles.read().get(&toggle_id).copied()
    }

    /// Number of engine-originated toggle writes observed
    pub fn set_count(&self) -> u64 {
        *self.set_count.read()
    }

    /// Number of relay pulses observed
    pub fn pulse_count(&self) -> u64 {
        *self.pulse_count.read()
    }

    /// Store a toggle value, returning whether it changed
    fn store_toggle(&self, toggle_id: ToggleId, value: bool) -> Option<bool> {
        let mut toggles = self.toggles.write();
        let current = toggles.get_mut(&toggle_id)?;
        let changed = *current != value;
        *current = value;
        Some(changed)
    }
}

#[async_trait]
impl HostRuntime for SimHost {
    fn name(&self) -> &str {
        "sim"
    }

    async fn read_status(&self, component: ComponentId) -> Option<bool> {
        match component {
            ComponentId::Input(id) => self.input_level(id),
            ComponentId::Toggle(id) => self.toggle_level(id),
            // Momentary output, always at rest when observed
            ComponentId::Relay(id) => self.inputs.read().contains_key(&id).then_some(false),
        }
    }

    async fn set_virtual_toggle(&self, toggle_id: ToggleId, value: bool) -> Result<()> {
        *self.set_count.write() += 1;
        debug!("sim: Boolean.Set {} -> {}", toggle_id, value);

        match self.store_toggle(toggle_id, value) {
            Some(true) => {
                // Firmware reflects its own writes back as a status event
                self.emit(StatusEvent::new(
                    ComponentId::Toggle(toggle_id),
                    StatusDelta::value(value),
                ));
            }
            Some(false) => {}
            None => anyhow::bail!("unknown toggle component: boolean:{}", toggle_id),
        }
        Ok(())
    }

    async fn pulse_relay(&self, channel_id: ChannelId) -> Result<()> {
        *self.pulse_count.write() += 1;
        info!("sim: Switch.Toggle on channel {}", channel_id);

        // An impulse relay inverts the load on each pulse; the input
        // senses the load wire and reports the new level.
        if self.flip_input(channel_id).is_none() {
            anyhow::bail!("unknown relay channel: switch:{}", channel_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, ChannelConfig, TimingConfig};
    use crate::engine::Engine;
    use std::sync::Arc;
    use std::time::Duration;

    fn make_registry() -> Arc<ChannelRegistry> {
        let config = AppConfig {
            channels: vec![
                ChannelConfig {
                    id: 0,
                    toggle_id: 200,
                    name: "Channel 1".to_string(),
                    enabled: true,
                },
                ChannelConfig {
                    id: 3,
                    toggle_id: 203,
                    name: "Channel 4".to_string(),
                    enabled: false,
                },
            ],
            timing: TimingConfig::default(),
        };
        Arc::new(ChannelRegistry::from_config(&config).unwrap())
    }

    /// Sim wired to a live engine with short test timings
    async fn make_live_system() -> (Arc<SimHost>, crate::engine::EngineHandle) {
        let registry = make_registry();
        let host = Arc::new(SimHost::from_registry(&registry));
        let timing = TimingConfig {
            settle_ms: 60,
            startup_grace_ms: 30,
        };
        let handle = Engine::spawn(registry, host.clone(), timing);
        host.set_event_sink(handle.clone());

        // Let priming finish and the grace window expire
        tokio::time::sleep(Duration::from_millis(60)).await;
        (host, handle)
    }

    #[test]
    fn test_flip_input_inverts_level() {
        let sim = SimHost::from_registry(&make_registry());
        assert_eq!(sim.input_level(0), Some(false));
        assert_eq!(sim.flip_input(0), Some(true));
        assert_eq!(sim.flip_input(0), Some(false));
        assert_eq!(sim.flip_input(9), None);
    }

    #[tokio::test]
    async fn test_read_status_per_component_kind() {
        let sim = SimHost::from_registry(&make_registry());
        assert_eq!(sim.read_status(ComponentId::Input(0)).await, Some(false));
        assert_eq!(sim.read_status(ComponentId::Toggle(200)).await, Some(false));
        assert_eq!(sim.read_status(ComponentId::Relay(0)).await, Some(false));
        assert_eq!(sim.read_status(ComponentId::Input(9)).await, None);
        assert_eq!(sim.read_status(ComponentId::Toggle(999)).await, None);
    }

    #[tokio::test]
    async fn test_physical_actuation_syncs_toggle_without_pulse() {
        let (sim, handle) = make_live_system().await;

        // Wall button inverts the load on channel 0
        sim.flip_input(0);
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Engine mirrored it into the toggle; the echo did not pulse
        assert_eq!(sim.toggle_level(200), Some(true));
        assert_eq!(sim.pulse_count(), 0);
        // One priming write plus the sync, nothing more
        assert_eq!(sim.set_count(), 2);

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_app_command_pulses_once_and_settles_consistent() {
        let (sim, handle) = make_live_system().await;

        sim.app_set_toggle(200, true);
        // Wait past the settle window so any echo would have been live
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(sim.pulse_count(), 1);
        assert_eq!(sim.input_level(0), Some(true));
        assert_eq!(sim.toggle_level(200), Some(true));

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_disabled_channel_stays_inert() {
        let (sim, handle) = make_live_system().await;

        sim.app_set_toggle(203, true);
        sim.flip_input(3);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(sim.pulse_count(), 0);
        // The engine never touched the disabled channel's toggle
        assert_eq!(sim.toggle_level(203), Some(true));

        handle.shutdown();
    }
}
