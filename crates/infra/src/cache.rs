use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// Small TTL cache for computed availability responses. Slot generation
/// reads the whole calendar range on every request; identical queries
/// within the TTL are served from here instead.
///
/// Callers supply `now` so that cache behavior stays testable with a
/// frozen clock.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: i64,
    max_size: usize,
}

struct CacheEntry<V> {
    value: V,
    expires_at: i64,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: i64, max_size: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_size: max_size.max(1),
        }
    }

    pub fn get(&self, key: &K, now: i64) -> Option<V> {
        let entries = self.entries.lock().unwrap();
        let entry = entries.get(key)?;
        if entry.expires_at <= now {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&self, key: K, value: V, now: i64) {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, entry| entry.expires_at > now);
        if entries.len() >= self.max_size {
            // Full of live entries; drop the one closest to expiry.
            if let Some(evict) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone())
            {
                entries.remove(&evict);
            }
        }
        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn entries_live_until_their_ttl() {
        let cache: TtlCache<String, usize> = TtlCache::new(1000, 16);
        cache.insert("a".into(), 1, 0);

        assert_eq!(cache.get(&"a".into(), 500), Some(1));
        assert_eq!(cache.get(&"a".into(), 1000), None);
    }

    #[test]
    fn stale_entries_are_swept_on_insert() {
        let cache: TtlCache<String, usize> = TtlCache::new(1000, 16);
        cache.insert("a".into(), 1, 0);
        cache.insert("b".into(), 2, 2000);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"b".into(), 2500), Some(2));
    }

    #[test]
    fn live_entries_are_evicted_only_at_capacity() {
        let cache: TtlCache<String, usize> = TtlCache::new(10_000, 2);
        cache.insert("a".into(), 1, 0);
        cache.insert("b".into(), 2, 100);
        cache.insert("c".into(), 3, 200);

        assert_eq!(cache.len(), 2);
        // "a" expired first among the live entries.
        assert_eq!(cache.get(&"a".into(), 300), None);
        assert_eq!(cache.get(&"c".into(), 300), Some(3));
    }
}
