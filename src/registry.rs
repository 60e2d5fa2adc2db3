//! Channel registry - static component-to-channel resolution
//!
//! Built once from configuration and immutable for the process lifetime.
//! Disabled channels are excluded from resolution entirely: the engine
//! behaves as if they do not exist, even though their identifiers are
//! statically known.

use anyhow::Result;
use tracing::info;

use crate::component::{ChannelId, ComponentId, ToggleId};
use crate::config::AppConfig;

/// One managed channel record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub toggle_id: ToggleId,
    pub name: String,
    pub enabled: bool,
}

impl Channel {
    /// Component identity of the physical input terminal
    pub fn input_component(&self) -> ComponentId {
        ComponentId::Input(self.id)
    }

    /// Component identity of the paired virtual toggle
    pub fn toggle_component(&self) -> ComponentId {
        ComponentId::Toggle(self.toggle_id)
    }
}

/// Immutable channel lookup table
pub struct ChannelRegistry {
    channels: Vec<Channel>,
}

impl ChannelRegistry {
    /// Build the registry from a validated configuration
    ///
    /// Logs one line per disabled channel so a deployment can see at a
    /// glance which channels the engine will ignore.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let channels: Vec<Channel> = config
            .channels
            .iter()
            .map(|c| Channel {
                id: c.id,
                toggle_id: c.toggle_id,
                name: c.name.clone(),
                enabled: c.enabled,
            })
            .collect();

        for channel in channels.iter().filter(|c| !c.enabled) {
            info!("{}: skipped (disabled in configuration)", channel.name);
        }

        Ok(Self { channels })
    }

    /// Resolve a component to its managed channel
    ///
    /// Returns `None` for disabled channels, unknown identifiers, and
    /// relay (`switch:n`) components - the relay's own status traffic is
    /// never managed.
    pub fn resolve(&self, component: ComponentId) -> Option<&Channel> {
        let found = match component {
            ComponentId::Input(id) => self.channels.iter().find(|c| c.id == id),
            ComponentId::Toggle(toggle_id) => {
                self.channels.iter().find(|c| c.toggle_id == toggle_id)
            }
            ComponentId::Relay(_) => None,
        };
        found.filter(|c| c.enabled)
    }

    /// Look up a channel by id, enabled or not
    pub fn get(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Iterate over enabled channels in configuration order
    pub fn enabled_channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter().filter(|c| c.enabled)
    }

    /// All channels, enabled or not (for diagnostics output)
    pub fn all_channels(&self) -> &[Channel] {
        &self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelConfig, TimingConfig};

    fn make_registry() -> ChannelRegistry {
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
        ChannelRegistry::from_config(&config).unwrap()
    }

    #[test]
    fn test_resolve_input_and_toggle() {
        let registry = make_registry();

        let by_input = registry.resolve(ComponentId::Input(0)).unwrap();
        assert_eq!(by_input.toggle_id, 200);

        let by_toggle = registry.resolve(ComponentId::Toggle(200)).unwrap();
        assert_eq!(by_toggle.id, 0);
    }

    #[test]
    fn test_disabled_channel_is_invisible() {
        let registry = make_registry();
        assert!(registry.resolve(ComponentId::Input(3)).is_none());
        assert!(registry.resolve(ComponentId::Toggle(203)).is_none());
        // but still present for diagnostics
        assert!(registry.get(3).is_some());
    }

    #[test]
    fn test_unknown_component_is_unmanaged() {
        let registry = make_registry();
        assert!(registry.resolve(ComponentId::Input(7)).is_none());
        assert!(registry.resolve(ComponentId::Toggle(999)).is_none());
    }

    #[test]
    fn test_relay_components_never_resolve() {
        let registry = make_registry();
        assert!(registry.resolve(ComponentId::Relay(0)).is_none());
    }

    #[test]
    fn test_enabled_channels_iteration() {
        let registry = make_registry();
        let names: Vec<&str> = registry.enabled_channels().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Channel 1"]);
    }
}
