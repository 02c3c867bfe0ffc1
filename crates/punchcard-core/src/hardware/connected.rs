//! Display bridge over a Unix socket

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::protocol::FrameRequest;
use super::HardwareLink;
use crate::grid::Grid;
use crate::{Error, Result};

/// Frames allowed to wait for the writer before new ones are dropped
const FRAME_QUEUE: usize = 8;

/// Link to a real display. `update` only enqueues; a background task owns the
/// socket and writes frames in order.
pub struct ConnectedLink {
    socket_path: PathBuf,
    tx: mpsc::Sender<Grid>,
    ready: Arc<AtomicBool>,
}

impl ConnectedLink {
    /// Connect to the bridge socket and start the writer task
    pub async fn connect(socket_path: PathBuf) -> Result<Self> {
        let stream = UnixStream::connect(&socket_path).await.map_err(|e| {
            Error::Hardware(format!(
                "Failed to connect to display at {}: {}",
                socket_path.display(),
                e
            ))
        })?;
        Ok(Self::from_stream(stream, socket_path))
    }

    fn from_stream(stream: UnixStream, socket_path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel(FRAME_QUEUE);
        let ready = Arc::new(AtomicBool::new(true));
        tokio::spawn(write_frames(stream, rx, ready.clone()));
        Self {
            socket_path,
            tx,
            ready,
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

async fn write_frames(mut stream: UnixStream, mut rx: mpsc::Receiver<Grid>, ready: Arc<AtomicBool>) {
    while let Some(grid) = rx.recv().await {
        if let Err(e) = write_frame(&mut stream, &grid).await {
            warn!("Display write failed, link marked not ready: {}", e);
            ready.store(false, Ordering::SeqCst);
            return;
        }
    }
    debug!("Display writer stopped");
}

async fn write_frame(stream: &mut UnixStream, grid: &Grid) -> Result<()> {
    let request = serde_json::to_string(&FrameRequest::update(grid))?;
    stream.write_all(request.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await?;
    Ok(())
}

impl HardwareLink for ConnectedLink {
    fn name(&self) -> &str {
        "socket"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn update(&self, grid: &Grid) -> Result<()> {
        match self.tx.try_send(grid.clone()) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(Error::Hardware(
                "display is behind, frame dropped".to_string(),
            )),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.ready.store(false, Ordering::SeqCst);
                Err(Error::Hardware("display writer stopped".to_string()))
            }
        }
    }
}
