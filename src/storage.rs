/// Storage utilities for window.localStorage

use crate::error::{Result, XTabError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;
use wasm_bindgen::JsValue;

/// Synchronous string key-value backend
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Shared handle the stores hold on to
pub type StorageHandle = Rc<dyn KeyValueStore>;

/// Browser `localStorage`
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| XTabError::Storage("no window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| XTabError::Storage("localStorage is disabled".to_string()))?;
        Ok(LocalStorage { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

fn js_error(e: JsValue) -> XTabError {
    XTabError::Storage(format!("{:?}", e))
}

/// In-memory backend, used when `localStorage` is unavailable and in tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Memory backend whose writes can be made to fail, as a full quota would
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: std::cell::Cell<bool>,
}

#[cfg(test)]
impl FlakyStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.get() {
            return Err(XTabError::Storage("QuotaExceededError".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
impl KeyValueStore for FlakyStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.inner.remove_item(key)
    }
}

/// Open `localStorage`, falling back to memory so the page still renders
pub fn open_browser_storage() -> StorageHandle {
    match LocalStorage::open() {
        Ok(storage) => Rc::new(storage),
        Err(e) => {
            log::error!("localStorage unavailable, changes will not persist: {}", e);
            Rc::new(MemoryStorage::new())
        }
    }
}

/// A JSON array stored whole under one key
pub struct ListStore<T> {
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> ListStore<T> {
    pub const fn new(key: &'static str) -> Self {
        ListStore {
            key,
            _marker: PhantomData,
        }
    }

    /// `None` when the key is missing or its value does not parse
    pub fn try_load(&self, storage: &dyn KeyValueStore) -> Option<Vec<T>> {
        let raw = match storage.get_item(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read {}: {}", self.key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Some(items),
            Err(e) => {
                log::warn!("Discarding malformed {}: {}", self.key, e);
                None
            }
        }
    }

    pub fn load(&self, storage: &dyn KeyValueStore) -> Vec<T> {
        self.try_load(storage).unwrap_or_default()
    }

    /// Overwrite the stored value with the full sequence
    pub fn save(&self, storage: &dyn KeyValueStore, items: &[T]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        storage.set_item(self.key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{SearchEntry, Site, TodoItem};
    use chrono::{TimeZone, Utc};

    fn create_test_sites() -> Vec<Site> {
        vec![
            Site::new("GitHub".to_string(), "https://github.com".to_string()),
            Site::new("Rust".to_string(), "https://www.rust-lang.org".to_string()),
        ]
    }

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "v").unwrap();

        assert_eq!(storage.get_item("k").unwrap(), Some("v".to_string()));

        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let storage = MemoryStorage::new();
        let store: ListStore<Site> = ListStore::new("sitesArr");

        assert!(store.try_load(&storage).is_none());
        assert!(store.load(&storage).is_empty());
    }

    #[test]
    fn test_load_malformed_value_is_empty() {
        let storage = MemoryStorage::new();
        storage.set_item("sitesArr", "{not json").unwrap();
        let store: ListStore<Site> = ListStore::new("sitesArr");

        assert!(store.try_load(&storage).is_none());
        assert!(store.load(&storage).is_empty());
    }

    #[test]
    fn test_load_wrong_shape_is_empty() {
        let storage = MemoryStorage::new();
        storage.set_item("sitesArr", r#"{"name":"not a list"}"#).unwrap();
        let store: ListStore<Site> = ListStore::new("sitesArr");

        assert!(store.load(&storage).is_empty());
    }

    #[test]
    fn test_save_overwrites_whole_list() {
        let storage = MemoryStorage::new();
        let store: ListStore<Site> = ListStore::new("sitesArr");
        let sites = create_test_sites();

        store.save(&storage, &sites).unwrap();
        store.save(&storage, &sites[..1]).unwrap();

        assert_eq!(store.load(&storage), sites[..1].to_vec());
    }

    #[test]
    fn test_failed_save_keeps_previous_value() {
        let storage = FlakyStorage::new();
        let store: ListStore<Site> = ListStore::new("sitesArr");
        let sites = create_test_sites();
        store.save(&storage, &sites).unwrap();

        storage.fail_writes(true);
        let err = store.save(&storage, &[]).unwrap_err();

        assert!(matches!(err, XTabError::Storage(_)));
        assert_eq!(store.load(&storage), sites);
    }

    #[test]
    fn test_sites_round_trip() {
        let storage = MemoryStorage::new();
        let store: ListStore<Site> = ListStore::new("sitesArr");
        let sites = create_test_sites();

        store.save(&storage, &sites).unwrap();

        assert_eq!(store.load(&storage), sites);
    }

    #[test]
    fn test_todos_round_trip() {
        let storage = MemoryStorage::new();
        let store: ListStore<TodoItem> = ListStore::new("todos");
        let todos = vec![
            TodoItem {
                id: "1".to_string(),
                text: "Renew passport".to_string(),
                completed: false,
                due_date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            },
            TodoItem {
                id: "2".to_string(),
                text: "Call back".to_string(),
                completed: true,
                due_date: Utc.timestamp_millis_opt(1_698_508_200_123).unwrap(),
            },
        ];

        store.save(&storage, &todos).unwrap();

        assert_eq!(store.load(&storage), todos);
    }

    #[test]
    fn test_search_entries_round_trip() {
        let storage = MemoryStorage::new();
        let store: ListStore<SearchEntry> = ListStore::new("searchList");
        let entries = vec![SearchEntry {
            keyword: "rust \"lifetimes\" & traits".to_string(),
            time: Utc.timestamp_opt(1_700_000_000, 987_654_321).unwrap(),
        }];

        store.save(&storage, &entries).unwrap();

        assert_eq!(store.load(&storage), entries);
    }
}
