//! Hardware sync boundary
//!
//! The scheduler mirrors every applied frame to a [`HardwareLink`]. A link is
//! either a real display bridge reachable over a Unix socket
//! ([`ConnectedLink`]) or a [`VirtualLink`] that discards frames when no
//! hardware is present.

mod connected;
mod protocol;
mod virtual_link;

use std::sync::Arc;

use tracing::{info, warn};

pub use connected::ConnectedLink;
pub use protocol::{methods, FrameParams, FrameRequest};
pub use virtual_link::VirtualLink;

use crate::config::AppConfig;
use crate::grid::Grid;
use crate::Result;

/// Receiver of frame snapshots for physical mirroring.
///
/// `update` is called from inside a scheduler tick and must not block;
/// implementations queue the frame and return.
pub trait HardwareLink: Send + Sync {
    /// Short name for logs and the status bar
    fn name(&self) -> &str;

    /// Whether the device can take frames right now
    fn is_ready(&self) -> bool;

    /// Simulated links accept frames but never reach a device
    fn is_virtual(&self) -> bool {
        false
    }

    /// Queue one frame for the device
    fn update(&self, grid: &Grid) -> Result<()>;
}

/// Pick the link for this configuration: the socket bridge when hardware is
/// enabled and reachable, otherwise virtual mode.
pub async fn detect(config: &AppConfig) -> Arc<dyn HardwareLink> {
    if !config.hardware.enabled {
        info!("Hardware sync disabled, running in virtual mode");
        return Arc::new(VirtualLink::new());
    }

    let socket_path = config.hardware_socket_path();
    match ConnectedLink::connect(socket_path.clone()).await {
        Ok(link) => {
            info!("Hardware display connected at {}", socket_path.display());
            Arc::new(link)
        }
        Err(e) => {
            warn!("Hardware display unavailable, falling back to virtual mode: {}", e);
            Arc::new(VirtualLink::new())
        }
    }
}
