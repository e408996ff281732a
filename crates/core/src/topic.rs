//! Invalidation topic abstraction.
//!
//! The cache distributes change notifications over a publish/subscribe
//! channel. The transport is deliberately thin: `publish` is fire-and-forget
//! and returns as soon as delivery is handed off, and subscribers must
//! tolerate at-least-once, possibly out-of-order delivery. Real deployments
//! bind this seam to a cluster transport; `LocalTopic` is the in-process
//! reference implementation used for single-process setups and tests.

use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Change notification published on every successful update or removal.
///
/// Carries the key that changed and the version the change produced (absent
/// for unversioned regions). Wire encoding is an external concern; messages
/// cross this seam as plain values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation<K, Ver> {
    /// Key whose cached value should be discarded or re-validated.
    pub key: K,
    /// Version produced by the write, used for arbitration by the receiver.
    pub version: Option<Ver>,
}

/// Receiver side of a topic.
///
/// Listeners may be invoked concurrently with local reads and writes and
/// must not assume any delivery order.
pub trait MessageListener<M>: Send + Sync {
    /// Handle one delivered message.
    fn on_message(&self, message: &M);

    /// Listener name for debugging.
    fn name(&self) -> &'static str {
        "listener"
    }
}

/// Publisher side of a topic.
pub trait Topic<M>: Send + Sync {
    /// Publish a message to every registered listener. Fire-and-forget:
    /// the caller never waits on any subscriber applying the message.
    fn publish(&self, message: M);

    /// Register a listener for subsequent messages.
    fn add_listener(&self, listener: Arc<dyn MessageListener<M>>);
}

/// In-process topic delivering messages inline on the publishing thread.
pub struct LocalTopic<M> {
    name: String,
    listeners: RwLock<Vec<Arc<dyn MessageListener<M>>>>,
}

impl<M> LocalTopic<M> {
    /// Create a topic with the given channel name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// The channel name this topic was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl<M: Send + Sync> Topic<M> for LocalTopic<M> {
    fn publish(&self, message: M) {
        let listeners = self.listeners.read();
        for listener in listeners.iter() {
            listener.on_message(&message);
        }
    }

    fn add_listener(&self, listener: Arc<dyn MessageListener<M>>) {
        debug!(topic = %self.name, listener = listener.name(), "listener added");
        self.listeners.write().push(listener);
    }
}

/// Name-keyed registry of in-process topics.
///
/// Mirrors a cluster transport's topic lookup: every cache region asking for
/// the same name gets the same topic instance, so regions constructed
/// against one registry exchange invalidations with each other.
pub struct TopicRegistry<M> {
    topics: DashMap<String, Arc<LocalTopic<M>>>,
}

impl<M: Send + Sync> TopicRegistry<M> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
        }
    }

    /// Look up the topic for `name`, creating it on first use.
    pub fn topic(&self, name: &str) -> Arc<LocalTopic<M>> {
        self.topics
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(LocalTopic::new(name)))
            .clone()
    }
}

impl<M: Send + Sync> Default for TopicRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    impl MessageListener<Invalidation<String, i64>> for Counter {
        fn on_message(&self, _message: &Invalidation<String, i64>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counter"
        }
    }

    #[test]
    fn publish_reaches_every_listener() {
        let topic = LocalTopic::new("entities.person");
        let a = Arc::new(Counter(AtomicUsize::new(0)));
        let b = Arc::new(Counter(AtomicUsize::new(0)));
        topic.add_listener(a.clone());
        topic.add_listener(b.clone());
        assert_eq!(topic.listener_count(), 2);

        topic.publish(Invalidation {
            key: "p1".to_string(),
            version: Some(3),
        });

        assert_eq!(a.0.load(Ordering::SeqCst), 1);
        assert_eq!(b.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registry_returns_one_instance_per_name() {
        let registry: TopicRegistry<Invalidation<String, i64>> = TopicRegistry::new();
        let first = registry.topic("entities.person");
        let second = registry.topic("entities.person");
        let other = registry.topic("entities.order");

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn publish_without_listeners_is_a_no_op() {
        let topic: LocalTopic<Invalidation<String, i64>> = LocalTopic::new("empty");
        topic.publish(Invalidation {
            key: "k".to_string(),
            version: None,
        });
    }
}
