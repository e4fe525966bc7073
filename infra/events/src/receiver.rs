use crate::bus::Event;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Receiving helpers for bus subscriptions.
pub trait EventReceiverExt<T> {
    /// Waits for the next event, skipping over anything lost to lag.
    ///
    /// Returns `None` once the channel is closed (bus dropped or shut down).
    fn next_event(&mut self) -> impl Future<Output = Option<Arc<T>>> + Send;
}

impl<T: Event> EventReceiverExt<T> for broadcast::Receiver<Arc<T>> {
    async fn next_event(&mut self) -> Option<Arc<T>> {
        let mut lost = 0u64;

        loop {
            match self.recv().await {
                Ok(event) => {
                    if lost > 0 {
                        warn!(
                            event = std::any::type_name::<T>(),
                            lost, "Subscriber fell behind; resuming from the oldest retained event"
                        );
                    }
                    return Some(event);
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    lost = lost.saturating_add(n);
                    debug!(event = std::any::type_name::<T>(), skipped = n, "Subscriber lagged");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
