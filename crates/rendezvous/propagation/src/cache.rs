//! Bounded memory of recently seen message ids.

use hashlink::LruCache;
use parking_lot::Mutex;
use rendezvous_primitives::MessageId;

/// LRU set of message ids. Uses Mutex because insertion reorders entries.
#[derive(Debug)]
pub(crate) struct DuplicateCache {
    seen: Mutex<LruCache<MessageId, ()>>,
}

impl DuplicateCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            seen: Mutex::new(LruCache::new(capacity.max(1))),
        }
    }

    /// Remember `id`. Returns `true` the first time an id is seen.
    pub(crate) fn insert(&self, id: MessageId) -> bool {
        self.seen.lock().insert(id, ()).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_insert_is_duplicate() {
        let cache = DuplicateCache::new(8);
        let id = MessageId::random();
        assert!(cache.insert(id));
        assert!(!cache.insert(id));
        assert!(cache.insert(MessageId::random()));
    }

    #[test]
    fn test_oldest_evicted() {
        let cache = DuplicateCache::new(2);
        let (a, b, c) = (MessageId::random(), MessageId::random(), MessageId::random());
        cache.insert(a);
        cache.insert(b);
        cache.insert(c);

        assert!(!cache.insert(c));
        assert!(cache.insert(a));
    }
}
