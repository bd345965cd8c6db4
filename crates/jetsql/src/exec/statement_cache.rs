//! Per-connection LRU of prepared statements, keyed by SQL text.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
pub(super) struct StatementCache<S> {
    inner: Mutex<Inner<S>>,
}

#[derive(Debug)]
struct Inner<S> {
    capacity: usize,
    map: HashMap<String, S>,
    // Least recently used first.
    order: VecDeque<String>,
}

impl<S: Clone> StatementCache<S> {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                capacity,
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn get(&self, sql: &str) -> Option<S> {
        let mut inner = self.lock();
        let statement = inner.map.get(sql).cloned()?;
        inner.touch(sql);
        Some(statement)
    }

    /// Cache `statement` unless another task prepared the same SQL first, in
    /// which case the existing entry wins.
    pub(super) fn insert_if_absent(&self, sql: &str, statement: S) -> S {
        let mut inner = self.lock();
        if let Some(existing) = inner.map.get(sql).cloned() {
            inner.touch(sql);
            return existing;
        }
        inner.map.insert(sql.to_string(), statement.clone());
        inner.order.push_back(sql.to_string());
        inner.evict();
        statement
    }

    pub(super) fn remove(&self, sql: &str) -> Option<S> {
        let mut inner = self.lock();
        let removed = inner.map.remove(sql)?;
        inner.forget(sql);
        Some(removed)
    }

    pub(super) fn len(&self) -> usize {
        self.lock().map.len()
    }
}

impl<S> Inner<S> {
    fn touch(&mut self, sql: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == sql) {
            if let Some(key) = self.order.remove(pos) {
                self.order.push_back(key);
            }
        }
    }

    fn forget(&mut self, sql: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == sql) {
            self.order.remove(pos);
        }
    }

    fn evict(&mut self) {
        while self.map.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.map.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let cache = StatementCache::new(2);
        cache.insert_if_absent("a", 1);
        cache.insert_if_absent("b", 2);
        assert_eq!(cache.get("a"), Some(1));

        cache.insert_if_absent("c", 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn first_insert_wins() {
        let cache = StatementCache::new(4);
        assert_eq!(cache.insert_if_absent("a", 1), 1);
        assert_eq!(cache.insert_if_absent("a", 2), 1);
        assert_eq!(cache.get("a"), Some(1));
    }

    #[test]
    fn remove_drops_the_entry() {
        let cache = StatementCache::new(2);
        cache.insert_if_absent("a", 1);
        cache.insert_if_absent("b", 2);
        assert_eq!(cache.remove("a"), Some(1));
        assert_eq!(cache.remove("a"), None);

        // "a" no longer occupies a slot in the eviction order.
        cache.insert_if_absent("c", 3);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }
}
