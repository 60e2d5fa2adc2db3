//! Host runtime integrations
//!
//! The engine talks to the device firmware through the narrow
//! [`HostRuntime`] trait. A deployment provides the real binding; the
//! bundled [`SimHost`] models the hardware for the REPL and for tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::component::{ChannelId, ComponentId, ToggleId};

/// Host runtime trait - the device seam every deployment implements
///
/// All methods take `&self` to support `Arc<dyn HostRuntime>`; hosts use
/// interior mutability for their own state. Write calls are
/// fire-and-forget from the engine's point of view: a returned error is
/// logged and discarded, never retried.
#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Host name for logs (e.g. "sim", "device-rpc")
    fn name(&self) -> &str;

    /// Read the current boolean level/value of a component
    ///
    /// Returns `None` when the component cannot be read (not present on
    /// the device, or the host cannot reach it).
    async fn read_status(&self, component: ComponentId) -> Option<bool>;

    /// Set a virtual toggle to a value
    ///
    /// The host will usually echo this back as a `boolean:` status event.
    async fn set_virtual_toggle(&self, toggle_id: ToggleId, value: bool) -> Result<()>;

    /// Issue a momentary actuate on a channel's relay output
    ///
    /// Hardware auto-off returns the output to rest after a fixed
    /// interval external to this core.
    async fn pulse_relay(&self, channel_id: ChannelId) -> Result<()>;
}

pub mod sim;

// Re-export commonly used hosts
pub use sim::SimHost;
