//! Impulse GW library
//!
//! Per-channel reconciliation between physical momentary-input signals
//! and host-side virtual toggles, driving pulse-only relay outputs. The
//! engine suppresses the echo events its own actions generate with a
//! per-channel lock held for the relay's settle window.

pub mod cli;
pub mod component;
pub mod config;
pub mod engine;
pub mod hosts;
pub mod registry;

pub use component::{ChannelId, ComponentId, StatusDelta, StatusEvent, ToggleId};
pub use config::{AppConfig, TimingConfig};
pub use engine::{Engine, EngineHandle};
pub use hosts::{HostRuntime, SimHost};
pub use registry::{Channel, ChannelRegistry};
