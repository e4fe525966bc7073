use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Buffer used by [`EventBus::subscribe`] and [`EventBus::publish`] when a
/// channel is created implicitly.
pub const DEFAULT_CAPACITY: usize = 64;

/// Anything that can travel over the bus.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug)]
struct Channel {
    capacity: usize,
    sender: Box<dyn Any + Send + Sync>,
}

impl Channel {
    fn new<T: Event>(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel::<Arc<T>>(capacity);
        Self { capacity, sender: Box::new(sender) }
    }

    fn sender<T: Event>(&self) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        self.sender.downcast_ref::<broadcast::Sender<Arc<T>>>().cloned().ok_or_else(|| {
            EventBusError::TypeMismatch {
                message: std::any::type_name::<T>().into(),
                context: Some("Channel holds a sender of another type".into()),
            }
        })
    }
}

/// Typed broadcast bus. Cloning shares the underlying channels.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, Channel>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `T` with [`DEFAULT_CAPACITY`].
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the channel registry is corrupted.
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Subscribes to `T`, creating its channel with `capacity` if needed.
    ///
    /// An existing channel keeps its original capacity; a differing request is
    /// logged and ignored.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] when `capacity` is zero.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        if capacity == 0 {
            return Err(EventBusError::InvalidCapacity {
                message: "capacity must be at least 1".into(),
                context: Some(std::any::type_name::<T>().into()),
            });
        }
        Ok(self.sender::<T>(capacity)?.subscribe())
    }

    /// Publishes `event` to every current subscriber of `T`.
    ///
    /// Returns the number of subscribers that received it.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the channel registry is corrupted.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Publishes an already shared event.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the channel registry is corrupted.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.sender::<T>(DEFAULT_CAPACITY)?;
        let delivered = sender.send(event).unwrap_or_else(|_| {
            trace!(event = std::any::type_name::<T>(), "No subscribers; event dropped");
            0
        });
        trace!(event = std::any::type_name::<T>(), delivered, "Event published");
        Ok(delivered)
    }

    /// Number of live subscribers for `T`.
    #[must_use]
    pub fn subscriber_count<T: Event>(&self) -> usize {
        let channels = self.channels.read();
        channels
            .get(&TypeId::of::<T>())
            .and_then(|channel| channel.sender::<T>().ok())
            .map_or(0, |sender| sender.receiver_count())
    }

    /// Drops every channel. Subscribers observe the close once the senders
    /// held by other clones of the bus are gone as well.
    ///
    /// Returns the number of channels closed.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let closed = channels.len();
        channels.clear();
        closed
    }

    fn sender<T: Event>(&self, capacity: usize) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        let id = TypeId::of::<T>();

        if let Some(channel) = self.channels.read().get(&id) {
            if channel.capacity != capacity && capacity != DEFAULT_CAPACITY {
                warn!(
                    event = std::any::type_name::<T>(),
                    existing = channel.capacity,
                    requested = capacity,
                    "Channel already exists with a different capacity"
                );
            }
            return channel.sender::<T>();
        }

        let mut channels = self.channels.write();
        let channel = channels.entry(id).or_insert_with(|| {
            trace!(event = std::any::type_name::<T>(), capacity, "Creating channel");
            Channel::new::<T>(capacity)
        });
        channel.sender::<T>()
    }
}
