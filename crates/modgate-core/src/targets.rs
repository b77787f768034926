use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Default number of entries kept.
pub const DEFAULT_CAPACITY: usize = 25;

/// Longest identifier accepted (a Minecraft username bound).
pub const MAX_TARGET_LEN: usize = 16;

/// Recently targeted players, most recent first, without duplicates.
///
/// Shared across concurrent requests behind one `Arc`. Every operation takes
/// the lock once and never across an `.await`.
#[derive(Debug)]
pub struct RecentTargets {
    capacity: usize,
    entries: Mutex<VecDeque<String>>,
}

impl Default for RecentTargets {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RecentTargets {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity + 1)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Move `id` to the front, evicting from the tail past capacity.
    ///
    /// Blank ids and ids longer than [`MAX_TARGET_LEN`] are ignored. Returns
    /// whether the id was recorded.
    pub fn record(&self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() || id.chars().count() > MAX_TARGET_LEN {
            return false;
        }

        let mut entries = self.lock();
        if let Some(pos) = entries.iter().position(|e| e == id) {
            entries.remove(pos);
        }
        entries.push_front(id.to_string());
        entries.truncate(self.capacity);
        true
    }

    /// Snapshot of the current entries, most recent first.
    pub fn list(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        // The sequence is always left consistent, so a poisoned lock is still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn dedups_and_orders_most_recent_first() {
        let cache = RecentTargets::default();
        for id in ["A", "B", "A", "C"] {
            cache.record(id);
        }
        assert_eq!(cache.list(), vec!["C", "A", "B"]);
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let cache = RecentTargets::default();
        for i in 0..30 {
            cache.record(&format!("player{i}"));
        }
        let list = cache.list();
        assert_eq!(list.len(), 25);
        assert_eq!(list.first().map(String::as_str), Some("player29"));
        assert_eq!(list.last().map(String::as_str), Some("player5"));
        assert!(!list.contains(&"player4".to_string()));
    }

    #[test]
    fn rejects_empty_and_overlong_ids() {
        let cache = RecentTargets::default();
        assert!(!cache.record(""));
        assert!(!cache.record("   "));
        assert!(!cache.record("abcdefghijklmnopq")); // 17 chars
        assert!(cache.record("abcdefghijklmnop")); // 16 chars
        assert_eq!(cache.list(), vec!["abcdefghijklmnop"]);
    }

    #[test]
    fn list_is_a_copy() {
        let cache = RecentTargets::default();
        cache.record("Steve");
        let mut snapshot = cache.list();
        snapshot.push("Mallory".into());
        snapshot.clear();
        assert_eq!(cache.list(), vec!["Steve"]);
    }

    #[test]
    fn concurrent_records_stay_bounded_and_unique() {
        let cache = Arc::new(RecentTargets::new(10));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        cache.record(&format!("p{}", (t * 7 + i) % 40));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let list = cache.list();
        assert_eq!(list.len(), 10);
        let mut unique = list.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), list.len());
    }
}
