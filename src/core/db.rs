use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-memory JSON key-value store shared by all handlers.
///
/// Handlers take the lock once per request through [`Store::open`] and keep
/// it for the whole read-modify-write, so multi-key updates are atomic.
#[derive(Default)]
pub struct Store {
    inner: Mutex<Kv>,
}

#[derive(Default)]
pub struct Kv {
    entries: HashMap<String, Vec<u8>>,
    counters: HashMap<String, u64>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the store. A handler that panicked mid-request does not lock
    /// everyone else out.
    pub fn open(&self) -> anyhow::Result<MutexGuard<'_, Kv>> {
        Ok(self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Kv {
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        match self.entries.get(key) {
            Some(raw) => Ok(Some(serde_json::from_slice(raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), serde_json::to_vec(value)?);
        Ok(())
    }

    pub fn delete(&mut self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    pub fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Next value of an auto-increment sequence, starting at 1.
    pub fn next_id(&mut self, sequence: &str) -> u64 {
        let counter = self.counters.entry(sequence.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Appends `item` to the JSON list stored under `key`.
    pub fn push_to_list<T: Serialize + DeserializeOwned>(
        &mut self,
        key: &str,
        item: T,
    ) -> anyhow::Result<()> {
        let mut list: Vec<T> = self.get_json(key)?.unwrap_or_default();
        list.push(item);
        self.set_json(key, &list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_values_survive_a_store_cycle() {
        let store = Store::new();
        let mut kv = store.open().unwrap();

        kv.set_json("post:1", &serde_json::json!({"content": "hi"})).unwrap();
        let value: serde_json::Value = kv.get_json("post:1").unwrap().unwrap();
        assert_eq!(value["content"], "hi");

        kv.delete("post:1").unwrap();
        assert!(kv.get_json::<serde_json::Value>("post:1").unwrap().is_none());
    }

    #[test]
    fn sequences_are_independent_and_start_at_one() {
        let store = Store::new();
        let mut kv = store.open().unwrap();

        assert_eq!(kv.next_id("posts"), 1);
        assert_eq!(kv.next_id("posts"), 2);
        assert_eq!(kv.next_id("users"), 1);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let store = std::sync::Arc::new(Store::new());
        let shared = store.clone();
        let _ = std::thread::spawn(move || {
            let _kv = shared.open().unwrap();
            panic!("handler died");
        })
        .join();

        let mut kv = store.open().unwrap();
        assert_eq!(kv.next_id("posts"), 1);
    }

    #[test]
    fn push_to_list_creates_missing_list() {
        let store = Store::new();
        let mut kv = store.open().unwrap();

        kv.push_to_list("feed", 3u64).unwrap();
        kv.push_to_list("feed", 7u64).unwrap();
        let feed: Vec<u64> = kv.get_json("feed").unwrap().unwrap();
        assert_eq!(feed, vec![3, 7]);
    }
}
