//! Component identifier and status event type definitions
//!
//! Hosts name device components with the `kind:index` convention
//! (`input:0`, `boolean:200`, `switch:0`). This module parses those raw
//! identifiers into typed values and defines the notification payloads
//! delivered to the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical channel index (0..N-1)
pub type ChannelId = u8;

/// Virtual toggle (boolean component) identifier
pub type ToggleId = u16;

/// Error produced when a raw component string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentParseError {
    #[error("component identifier has no `kind:index` form: {0:?}")]
    MissingSeparator(String),
    #[error("unknown component kind: {0:?}")]
    UnknownKind(String),
    #[error("invalid component index: {0:?}")]
    InvalidIndex(String),
}

/// Typed identity of a device component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    /// Physical input terminal sensing the load wire (`input:n`)
    Input(ChannelId),
    /// Virtual boolean toggle exposed to the user/app (`boolean:n`)
    Toggle(ToggleId),
    /// Physical relay output (`switch:n`) - never managed, its status
    /// traffic is noise to the reconciliation engine
    Relay(ChannelId),
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentId::Input(n) => write!(f, "input:{}", n),
            ComponentId::Toggle(n) => write!(f, "boolean:{}", n),
            ComponentId::Relay(n) => write!(f, "switch:{}", n),
        }
    }
}

impl FromStr for ComponentId {
    type Err = ComponentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, index) = s
            .split_once(':')
            .ok_or_else(|| ComponentParseError::MissingSeparator(s.to_string()))?;

        match kind {
            "input" => index
                .parse::<ChannelId>()
                .map(ComponentId::Input)
                .map_err(|_| ComponentParseError::InvalidIndex(s.to_string())),
            "boolean" => index
                .parse::<ToggleId>()
                .map(ComponentId::Toggle)
                .map_err(|_| ComponentParseError::InvalidIndex(s.to_string())),
            "switch" => index
                .parse::<ChannelId>()
                .map(ComponentId::Relay)
                .map_err(|_| ComponentParseError::InvalidIndex(s.to_string())),
            other => Err(ComponentParseError::UnknownKind(other.to_string())),
        }
    }
}

/// Changed fields of a status notification
///
/// Hosts deliver only the field(s) that changed: `state` for physical
/// inputs, `value` for virtual toggles. Both absent means the event
/// carries nothing this engine can act on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
}

impl StatusDelta {
    /// Delta for a physical input level change
    pub fn state(state: bool) -> Self {
        Self {
            state: Some(state),
            value: None,
        }
    }

    /// Delta for a virtual toggle value change
    pub fn value(value: bool) -> Self {
        Self {
            state: None,
            value: Some(value),
        }
    }
}

/// A status-change notification as delivered by the host
///
/// Transient: consumed by the engine immediately, never stored. The
/// component is kept in its raw string form at this seam; parsing
/// happens inside the engine so malformed identifiers are dropped there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Raw component identifier (e.g. "input:0"), absent on host noise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Changed field(s)
    #[serde(default)]
    pub delta: StatusDelta,
}

impl StatusEvent {
    /// Build an event for a typed component
    pub fn new(component: ComponentId, delta: StatusDelta) -> Self {
        Self {
            component: Some(component.to_string()),
            delta,
        }
    }

    /// Typed component identity, if the raw string is present and parseable
    pub fn component_id(&self) -> Option<ComponentId> {
        self.component.as_deref().and_then(|raw| raw.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for raw in ["input:0", "boolean:200", "switch:3"] {
            let id: ComponentId = raw.parse().unwrap();
            assert_eq!(id.to_string(), raw);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "input0".parse::<ComponentId>(),
            Err(ComponentParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            "cover:0".parse::<ComponentId>(),
            Err(ComponentParseError::UnknownKind(_))
        ));
        assert!(matches!(
            "input:x".parse::<ComponentId>(),
            Err(ComponentParseError::InvalidIndex(_))
        ));
        assert!(matches!(
            "boolean:99999".parse::<ComponentId>(),
            Err(ComponentParseError::InvalidIndex(_))
        ));
    }

    #[test]
    fn test_event_component_id() {
        let ev = StatusEvent::new(ComponentId::Input(2), StatusDelta::state(true));
        assert_eq!(ev.component_id(), Some(ComponentId::Input(2)));

        let noise = StatusEvent {
            component: None,
            delta: StatusDelta::default(),
        };
        assert_eq!(noise.component_id(), None);

        let unparseable = StatusEvent {
            component: Some("???".to_string()),
            delta: StatusDelta::default(),
        };
        assert_eq!(unparseable.component_id(), None);
    }

    #[test]
    fn test_event_json_shape() {
        let ev: StatusEvent =
            serde_json::from_str(r#"{"component":"boolean:201","delta":{"value":true}}"#).unwrap();
        assert_eq!(ev.component_id(), Some(ComponentId::Toggle(201)));
        assert_eq!(ev.delta.value, Some(true));
        assert_eq!(ev.delta.state, None);
    }
}
