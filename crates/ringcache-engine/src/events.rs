//! Drive a [`NodeEventHandler`] from a stream of membership events.

use std::sync::Arc;

use ringcache_types::NodeEvent;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::NodeEventHandler;

/// Spawn a task that applies every event received on `events` to `handler`,
/// one at a time and in order, until the channel closes.
pub fn spawn_event_listener<H>(
    handler: Arc<H>,
    mut events: broadcast::Receiver<NodeEvent>,
) -> JoinHandle<()>
where
    H: NodeEventHandler + ?Sized + 'static,
{
    tokio::spawn(async move {
        info!("membership event listener started");
        loop {
            match events.recv().await {
                Ok(event) => {
                    debug!(node_id = %event.node().id, ?event, "membership event");
                    match event {
                        NodeEvent::Joined(node) => handler.join(node).await,
                        NodeEvent::Left(node) => handler.leave(node).await,
                        NodeEvent::ShuttingDown(node) => handler.shutdown(node).await,
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "membership event listener lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        info!("membership event listener stopped");
    })
}
