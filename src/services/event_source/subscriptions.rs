use crate::events::{Feed, FeedHandle};
use std::collections::BTreeMap;

/// Учёт активных подписок источника
#[derive(Debug, Default)]
pub struct SubscriptionTable {
    next_id: u64,
    active: BTreeMap<FeedHandle, Feed>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, feed: Feed) -> FeedHandle {
        self.next_id += 1;
        let handle = FeedHandle(self.next_id);
        self.active.insert(handle, feed);
        handle
    }

    /// true, если подписка действительно была
    pub fn unsubscribe(&mut self, handle: FeedHandle) -> bool {
        self.active.remove(&handle).is_some()
    }

    /// Подписка, которой доставить событие ленты. Потребитель один,
    /// поэтому берётся самая ранняя
    pub fn route(&self, feed: Feed) -> Option<FeedHandle> {
        self.active
            .iter()
            .find(|(_, active)| **active == feed)
            .map(|(handle, _)| *handle)
    }

    #[allow(dead_code)]
    pub fn is_subscribed(&self, feed: Feed) -> bool {
        self.route(feed).is_some()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
