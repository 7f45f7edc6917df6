use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

/// Trait implemented by payload types that can be carried on the bus.
pub trait Event: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T> Event for T where T: Clone + Send + Sync + std::fmt::Debug + 'static {}

#[async_trait]
pub trait EventBus<E>: Send + Sync
where
    E: Event,
{
    /// Publish to every current subscriber; returns how many received it.
    async fn publish(&self, event: E) -> usize;
    fn subscribe(&self) -> broadcast::Receiver<E>;
}

/// Broadcast bus; publishing with zero subscribers is not an error.
pub struct InMemoryBus<E>
where
    E: Event,
{
    sender: broadcast::Sender<E>,
}

impl<E> InMemoryBus<E>
where
    E: Event,
{
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl<E> EventBus<E> for InMemoryBus<E>
where
    E: Event,
{
    async fn publish(&self, event: E) -> usize {
        // send only fails when nobody is subscribed
        self.sender.send(event).unwrap_or(0)
    }

    fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = InMemoryBus::<u32>::new(4);
        assert_eq!(bus.publish(7).await, 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let bus = InMemoryBus::<u32>::new(4);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(bus.publish(7).await, 1);
        assert_eq!(rx.recv().await.unwrap(), 7);

        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(8).await, 0);
    }
}
