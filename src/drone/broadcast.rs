use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::Mutex;

use crate::lock::lock_or_recover;

/// Fan-out of one producer to any number of bounded subscribers. A subscriber
/// that falls behind misses items; one that hangs up is dropped.
pub(crate) struct Broadcast<T> {
    subscribers: Mutex<Vec<Sender<T>>>,
    capacity: usize,
}

impl<T: Clone> Broadcast<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            capacity,
        }
    }

    pub(crate) fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = bounded(self.capacity);
        lock_or_recover(&self.subscribers, "broadcast subscribe").push(tx);
        rx
    }

    pub(crate) fn has_subscribers(&self) -> bool {
        !lock_or_recover(&self.subscribers, "broadcast has_subscribers").is_empty()
    }

    pub(crate) fn publish(&self, item: &T) {
        let mut subscribers = lock_or_recover(&self.subscribers, "broadcast publish");
        subscribers.retain(|tx| match tx.try_send(item.clone()) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_reaches_every_subscriber() {
        let hub = Broadcast::new(4);
        let a = hub.subscribe();
        let b = hub.subscribe();
        hub.publish(&7u32);
        assert_eq!(a.try_recv(), Ok(7));
        assert_eq!(b.try_recv(), Ok(7));
    }

    #[test]
    fn full_subscriber_skips_items() {
        let hub = Broadcast::new(1);
        let rx = hub.subscribe();
        hub.publish(&1u32);
        hub.publish(&2u32);
        assert_eq!(rx.try_recv(), Ok(1));
        assert!(rx.try_recv().is_err());
        assert!(hub.has_subscribers());
    }

    #[test]
    fn disconnected_subscriber_is_dropped() {
        let hub = Broadcast::new(1);
        drop(hub.subscribe());
        hub.publish(&1u32);
        assert!(!hub.has_subscribers());
    }
}
