//! # Event Manager
//!
//! Registry of per-player listeners, keyed by subject, and the fan-out of
//! published events to them.
//!
//! # Thread Safety
//!
//! Subscriptions live behind a `RwLock`. Subscribe and unsubscribe take the
//! write lock. Notify takes the read lock only long enough to clone the
//! target listeners, then delivers outside the lock, so a slow listener
//! never blocks registry changes.

use crate::event::{Event, Subject};
use gridhunt_core::PlayerName;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Receiver of published events
///
/// `process_event` is called on the publisher's task and must not block;
/// per-player listeners hand the event to their own queue.
pub trait EventListener: Send + Sync {
    fn process_event(&self, event: &Event);
}

type Listeners = HashMap<PlayerName, Arc<dyn EventListener>>;

/// Per-subject listener registry
#[derive(Default)]
pub struct EventManager {
    subscriptions: RwLock<HashMap<Subject, Listeners>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `owner`'s listener for `subject`, replacing any previous one
    pub fn subscribe(&self, subject: Subject, owner: PlayerName, listener: Arc<dyn EventListener>) {
        tracing::debug!("{} subscribed to {}", owner, subject);
        self.subscriptions
            .write()
            .entry(subject)
            .or_default()
            .insert(owner, listener);
    }

    /// Remove `owner`'s listener for `subject`
    pub fn unsubscribe(&self, subject: Subject, owner: &PlayerName) -> bool {
        let mut subscriptions = self.subscriptions.write();
        subscriptions
            .get_mut(&subject)
            .and_then(|listeners| listeners.remove(owner))
            .is_some()
    }

    /// Remove every listener owned by `owner`
    ///
    /// # Returns
    /// The number of subscriptions removed
    pub fn unsubscribe_all(&self, owner: &PlayerName) -> usize {
        let mut subscriptions = self.subscriptions.write();
        let removed = subscriptions
            .values_mut()
            .filter_map(|listeners| listeners.remove(owner))
            .count();

        tracing::debug!("{} unsubscribed from {} subjects", owner, removed);
        removed
    }

    /// Deliver `event` to every listener of its subject
    ///
    /// # Returns
    /// The number of listeners the event was delivered to
    pub fn notify(&self, event: &Event) -> usize {
        let targets: Vec<Arc<dyn EventListener>> = self
            .subscriptions
            .read()
            .get(&event.subject())
            .map(|listeners| listeners.values().cloned().collect())
            .unwrap_or_default();

        for listener in &targets {
            listener.process_event(event);
        }

        tracing::debug!("Broadcast {} to {} listeners", event.subject(), targets.len());
        targets.len()
    }

    /// Deliver `event` to `owner`'s listener for its subject only
    ///
    /// # Returns
    /// `false` if `owner` has no listener for that subject
    pub fn notify_player(&self, owner: &PlayerName, event: &Event) -> bool {
        let target = self
            .subscriptions
            .read()
            .get(&event.subject())
            .and_then(|listeners| listeners.get(owner).cloned());

        match target {
            Some(listener) => {
                listener.process_event(event);
                true
            }
            None => {
                tracing::debug!("{} has no {} listener, dropping event", owner, event.subject());
                false
            }
        }
    }

    pub fn listener_count(&self, subject: Subject) -> usize {
        self.subscriptions
            .read()
            .get(&subject)
            .map_or(0, HashMap::len)
    }

    /// Number of subjects `owner` is subscribed to
    pub fn subscription_count(&self, owner: &PlayerName) -> usize {
        self.subscriptions
            .read()
            .values()
            .filter(|listeners| listeners.contains_key(owner))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingListener;

    fn ann() -> PlayerName {
        PlayerName::from("Ann")
    }

    #[test]
    fn test_broadcast_reaches_subject_listeners_only() {
        let manager = EventManager::new();
        let chat = Arc::new(RecordingListener::default());
        let updates = Arc::new(RecordingListener::default());

        manager.subscribe(Subject::SendMessage, ann(), chat.clone());
        manager.subscribe(Subject::PlayerUpdate, ann(), updates.clone());

        assert_eq!(manager.notify(&Event::SendMessage("hi".into())), 1);
        assert_eq!(chat.len(), 1);
        assert_eq!(updates.len(), 0);
    }

    #[test]
    fn test_broadcast_to_many() {
        let manager = EventManager::new();
        let listeners: Vec<_> = ["Ann", "Bob", "Cid"]
            .iter()
            .map(|name| {
                let listener = Arc::new(RecordingListener::default());
                manager.subscribe(Subject::SendMessage, PlayerName::from(*name), listener.clone());
                listener
            })
            .collect();

        assert_eq!(manager.notify(&Event::SendMessage("hi".into())), 3);
        assert!(listeners.iter().all(|l| l.len() == 1));
    }

    #[test]
    fn test_notify_player_targets_one() {
        let manager = EventManager::new();
        let a = Arc::new(RecordingListener::default());
        let b = Arc::new(RecordingListener::default());
        manager.subscribe(Subject::SendMessage, ann(), a.clone());
        manager.subscribe(Subject::SendMessage, PlayerName::from("Bob"), b.clone());

        assert!(manager.notify_player(&PlayerName::from("ANN"), &Event::SendMessage("psst".into())));
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 0);

        assert!(!manager.notify_player(&PlayerName::from("Cid"), &Event::SendMessage("?".into())));
    }

    #[test]
    fn test_unsubscribe_all() {
        let manager = EventManager::new();
        let listener = Arc::new(RecordingListener::default());
        for subject in Subject::ALL {
            manager.subscribe(subject, ann(), listener.clone());
        }
        assert_eq!(manager.subscription_count(&ann()), Subject::ALL.len());

        assert_eq!(manager.unsubscribe_all(&ann()), Subject::ALL.len());
        assert_eq!(manager.subscription_count(&ann()), 0);
        assert_eq!(manager.notify(&Event::SendMessage("gone".into())), 0);
        assert_eq!(listener.len(), 0);
    }

    #[test]
    fn test_unsubscribe_single() {
        let manager = EventManager::new();
        manager.subscribe(Subject::SendMessage, ann(), Arc::new(RecordingListener::default()));
        assert!(manager.unsubscribe(Subject::SendMessage, &ann()));
        assert!(!manager.unsubscribe(Subject::SendMessage, &ann()));
        assert_eq!(manager.listener_count(Subject::SendMessage), 0);
    }
}
