use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Per-app-instance stale-while-revalidate store, keyed by the query's
/// parameters. Hooks read the last successful value for a key while a
/// refetch is in flight, so a refetch (or a refetch failure) never blanks
/// data already on screen.
///
/// Owned by the application shell and passed down explicitly; there is no
/// process-global cache, so tests get a fresh instance each time.
pub struct QueryCache<T> {
    entries: Rc<RefCell<HashMap<String, T>>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T> PartialEq for QueryCache<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Last successful value for this key, if any.
    pub fn get(&self, key: &str) -> Option<T>
    where
        T: Clone,
    {
        self.entries.borrow().get(key).cloned()
    }

    /// Record a successful fetch for this key.
    pub fn insert(&self, key: String, value: T) {
        self.entries.borrow_mut().insert(key, value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Drop everything, e.g. when the active clinic changes.
    pub fn invalidate_all(&self) {
        self.entries.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn returns_last_successful_value_per_key() {
        let cache = QueryCache::<Vec<u32>>::new();
        assert!(cache.get("cl-1:2026-08-30").is_none());

        cache.insert("cl-1:2026-08-30".to_string(), vec![1, 2]);
        cache.insert("cl-1:2026-08-31".to_string(), vec![3]);
        assert_eq!(cache.get("cl-1:2026-08-30"), Some(vec![1, 2]));
        assert_eq!(cache.get("cl-1:2026-08-31"), Some(vec![3]));

        // a newer success replaces the stale value
        cache.insert("cl-1:2026-08-30".to_string(), vec![9]);
        assert_eq!(cache.get("cl-1:2026-08-30"), Some(vec![9]));
    }

    #[wasm_bindgen_test]
    fn clones_share_one_store() {
        let cache = QueryCache::<u32>::new();
        let clone = cache.clone();
        clone.insert("k".to_string(), 7);
        assert_eq!(cache.get("k"), Some(7));
        assert!(cache == clone);

        cache.invalidate_all();
        assert!(!clone.contains("k"));
    }
}
