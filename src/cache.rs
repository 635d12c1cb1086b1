//! A bounded, time-aware, byte-size-aware key→value store with LRU eviction.
//!
//! The store is a hand-rolled intrusive doubly-linked list (recency order, most-recent first)
//! plus a `HashMap` index from key to slot. A single [`RwLock`] guards the whole structure: a fresh
//! [`Cache::load`] hit only needs a shared lock, while a stale-purge or any [`Cache::store`]
//! takes the exclusive lock for the full critical section.
//!
//! Cache operations never fail — there is no I/O here, only bookkeeping.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// A single cache entry, owned by exactly one slot in the recency list.
#[derive(Debug, Clone)]
struct Entry {
    key: String,
    value: Vec<u8>,
    size: usize,
    timestamp_ms: i64,
}

/// A slot in the intrusive doubly-linked list. `None` entries sit on the free list, threaded
/// through `next`.
struct Slot {
    entry: Option<Entry>,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Inner {
    slots: Vec<Slot>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    current_size_bytes: usize,
}

impl Inner {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            current_size_bytes: 0,
        }
    }

    /// Unlink a slot from the recency list without touching the index or size bookkeeping.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = &self.slots[idx];
            (slot.prev, slot.next)
        };
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[idx].prev = None;
        self.slots[idx].next = None;
    }

    /// Push a slot to the head (most-recently inserted-or-refreshed) of the recency list.
    fn push_front(&mut self, idx: usize) {
        self.slots[idx].prev = None;
        self.slots[idx].next = self.head;
        if let Some(h) = self.head {
            self.slots[h].prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    /// Remove the entry at `idx` entirely: unlink, drop from the index, free the slot, and
    /// subtract its size from the running total.
    fn remove_slot(&mut self, idx: usize) {
        self.unlink(idx);
        if let Some(entry) = self.slots[idx].entry.take() {
            self.index.remove(&entry.key);
            self.current_size_bytes -= entry.size;
        }
        self.free.push(idx);
    }

    fn alloc_slot(&mut self, entry: Entry) -> usize {
        if let Some(idx) = self.free.pop() {
            self.slots[idx].entry = Some(entry);
            idx
        } else {
            self.slots.push(Slot { entry: Some(entry), prev: None, next: None });
            self.slots.len() - 1
        }
    }
}

/// Bounded TTL+LRU cache of opaque byte blobs, safe for concurrent `load`/`store` calls.
pub struct Cache {
    ttl_ms: i64,
    capacity_bytes: usize,
    inner: RwLock<Inner>,
}

impl Cache {
    /// Build a new cache with the given TTL (milliseconds) and byte-size capacity.
    pub fn new(ttl_ms: i64, capacity_bytes: usize) -> Self {
        Self { ttl_ms, capacity_bytes, inner: RwLock::new(Inner::new()) }
    }

    /// Byte-size capacity this cache was constructed with.
    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// Load a value by key. Returns `(value, true)` if a fresh entry exists; `(_, false)`
    /// (with an empty value) otherwise. A stale entry observed here is purged before returning.
    pub fn load(&self, key: &str) -> (Vec<u8>, bool) {
        // Fast path: try the shared lock first, since a fresh hit only needs to read. If the
        // entry turns out to be stale we drop it and re-acquire exclusively.
        {
            let guard = self.inner.read().expect("cache lock poisoned");
            if let Some(&idx) = guard.index.get(key) {
                let entry = guard.slots[idx].entry.as_ref().expect("indexed slot is occupied");
                if now_ms() - entry.timestamp_ms < self.ttl_ms {
                    return (entry.value.clone(), true);
                }
            } else {
                return (Vec::new(), false);
            }
        }

        let mut guard = self.inner.write().expect("cache lock poisoned");
        if let Some(&idx) = guard.index.get(key) {
            let fresh = {
                let entry = guard.slots[idx].entry.as_ref().expect("indexed slot is occupied");
                now_ms() - entry.timestamp_ms < self.ttl_ms
            };
            if fresh {
                let value =
                    guard.slots[idx].entry.as_ref().expect("indexed slot is occupied").value.clone();
                (value, true)
            } else {
                guard.remove_slot(idx);
                (Vec::new(), false)
            }
        } else {
            (Vec::new(), false)
        }
    }

    /// Insert or replace `key` with `value`.
    ///
    /// If `value` is larger than `capacity_bytes`, eviction empties the entire cache and
    /// `current_size_bytes` ends up over capacity — this input is not supported; callers must
    /// pre-check.
    pub fn store(&self, key: &str, value: Vec<u8>) {
        let size = value.len();
        let timestamp_ms = now_ms();
        let mut guard = self.inner.write().expect("cache lock poisoned");

        if let Some(&idx) = guard.index.get(key) {
            guard.unlink(idx);
            let old_size = {
                let entry = guard.slots[idx].entry.as_mut().expect("indexed slot is occupied");
                let old_size = entry.size;
                entry.value = value;
                entry.size = size;
                entry.timestamp_ms = timestamp_ms;
                old_size
            };
            guard.current_size_bytes = guard.current_size_bytes - old_size + size;
            guard.push_front(idx);
            return;
        }

        while guard.current_size_bytes + size > self.capacity_bytes {
            let Some(tail) = guard.tail else { break };
            guard.remove_slot(tail);
        }

        let entry = Entry { key: key.to_string(), value, size, timestamp_ms };
        let idx = guard.alloc_slot(entry);
        guard.index.insert(key.to_string(), idx);
        guard.push_front(idx);
        guard.current_size_bytes += size;
    }

    /// Current total size in bytes of all live entries. Exposed for tests and diagnostics.
    pub fn current_size_bytes(&self) -> usize {
        self.inner.read().expect("cache lock poisoned").current_size_bytes
    }

    /// Number of live entries. Exposed for tests and diagnostics.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.read().expect("cache lock poisoned").index.len()
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn store_then_load_returns_value() {
        let cache = Cache::new(10_000, 1024);
        cache.store("k", b"hello".to_vec());
        let (value, present) = cache.load("k");
        assert!(present);
        assert_eq!(value, b"hello");
    }

    #[test]
    fn load_missing_key_is_absent() {
        let cache = Cache::new(10_000, 1024);
        let (value, present) = cache.load("nope");
        assert!(!present);
        assert!(value.is_empty());
    }

    #[test]
    fn ttl_expiry_purges_and_frees_size() {
        let cache = Cache::new(20, 1024);
        cache.store("k", b"hello".to_vec());
        thread::sleep(Duration::from_millis(40));
        let (_, present) = cache.load("k");
        assert!(!present);
        assert_eq!(cache.current_size_bytes(), 0);
    }

    #[test]
    fn lru_keeps_most_recent_keys_that_fit() {
        let cache = Cache::new(10_000, 80);
        for i in 0..10 {
            let key = format!("{:010}", i);
            cache.store(&key, key.clone().into_bytes());
        }
        for i in 0..2 {
            let key = format!("{:010}", i);
            let (_, present) = cache.load(&key);
            assert!(!present, "key {key} should have been evicted");
        }
        for i in 2..10 {
            let key = format!("{:010}", i);
            let (value, present) = cache.load(&key);
            assert!(present, "key {key} should still be present");
            assert_eq!(value, key.into_bytes());
        }
    }

    #[test]
    fn capacity_never_exceeded_at_quiescence() {
        let cache = Cache::new(10_000, 25);
        for i in 0..20 {
            cache.store(&format!("k{i}"), vec![0u8; 10]);
            assert!(cache.current_size_bytes() <= 25);
        }
    }

    #[test]
    fn index_and_list_stay_consistent() {
        let cache = Cache::new(10_000, 1024);
        for i in 0..5 {
            cache.store(&format!("k{i}"), vec![0u8; 4]);
        }
        assert_eq!(cache.len(), 5);
        for i in 0..5 {
            let (_, present) = cache.load(&format!("k{i}"));
            assert!(present);
        }
    }

    #[test]
    fn replace_updates_value_and_size_without_double_counting() {
        let cache = Cache::new(10_000, 1024);
        cache.store("k", vec![0u8; 3]);
        cache.store("k", vec![1u8; 7]);
        let (value, present) = cache.load("k");
        assert!(present);
        assert_eq!(value, vec![1u8; 7]);
        assert_eq!(cache.current_size_bytes(), 7);
    }

    #[test]
    fn store_on_existing_key_moves_it_to_front() {
        let cache = Cache::new(10_000, 30);
        cache.store("a", vec![0u8; 10]);
        cache.store("b", vec![0u8; 10]);
        // refresh "a" so it is no longer the LRU victim
        cache.store("a", vec![0u8; 10]);
        cache.store("c", vec![0u8; 10]);
        let (_, a_present) = cache.load("a");
        let (_, b_present) = cache.load("b");
        assert!(a_present, "refreshed key should survive eviction");
        assert!(!b_present, "least-recently-refreshed key should be evicted");
    }

    #[test]
    fn load_does_not_reorder_on_hit() {
        // A genuine LRU would promote "a" on read; this store deliberately tracks
        // insertion/replacement order only.
        let cache = Cache::new(10_000, 30);
        cache.store("a", vec![0u8; 10]);
        cache.store("b", vec![0u8; 10]);
        let (_, _) = cache.load("a");
        cache.store("c", vec![0u8; 10]);
        let (_, a_present) = cache.load("a");
        assert!(!a_present, "a read-only hit must not protect a key from eviction");
    }

    #[test]
    fn concurrent_store_and_load_do_not_panic() {
        use std::sync::Arc;
        let cache = Arc::new(Cache::new(10_000, 4096));
        let mut handles = Vec::new();
        for t in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..200 {
                    let key = format!("k{}", i % 20);
                    cache.store(&key, vec![t as u8; 16]);
                    let _ = cache.load(&key);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(cache.current_size_bytes() <= cache.capacity_bytes());
    }
}
