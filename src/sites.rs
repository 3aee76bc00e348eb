/// Bookmarked sites grid backed by the `sitesArr` key

use crate::config::SITES_KEY;
use crate::error::{Result, XTabError};
use crate::records::Site;
use crate::storage::{ListStore, StorageHandle};

const SITES: ListStore<Site> = ListStore::new(SITES_KEY);

const DEFAULT_CATALOG_JSON: &str = include_str!("../assets/sites.json");

/// The catalog shipped with the extension
pub fn default_catalog() -> Vec<Site> {
    serde_json::from_str(DEFAULT_CATALOG_JSON).unwrap_or_else(|e| {
        log::error!("Bundled site catalog is malformed: {}", e);
        Vec::new()
    })
}

pub struct SiteCatalog {
    storage: StorageHandle,
    sites: Vec<Site>,
}

impl SiteCatalog {
    /// Load the user's catalog, seeding the defaults only when nothing is stored.
    ///
    /// A stored catalog is used as-is even when it is shorter than the
    /// defaults; a malformed value counts as nothing stored.
    pub fn initialize(storage: StorageHandle) -> Result<Self> {
        let sites = match SITES.try_load(&*storage) {
            Some(sites) => sites,
            None => {
                let defaults = default_catalog();
                log::info!("Seeding {} default sites", defaults.len());
                SITES.save(&*storage, &defaults)?;
                defaults
            }
        };

        Ok(SiteCatalog { storage, sites })
    }

    /// Whatever is stored, without seeding
    pub fn load(storage: StorageHandle) -> Self {
        let sites = SITES.load(&*storage);
        SiteCatalog { storage, sites }
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn reload(&mut self) {
        self.sites = SITES.load(&*self.storage);
    }

    /// Append a site; duplicate urls are allowed
    pub fn add(&mut self, name: &str, url: &str) -> Result<&Site> {
        let name = name.trim();
        let url = url.trim();

        if name.is_empty() {
            return Err(XTabError::validation("Site name is required"));
        }
        if url.is_empty() {
            return Err(XTabError::validation("Site URL is required"));
        }

        self.sites.push(Site::new(name.to_string(), url.to_string()));
        if let Err(e) = SITES.save(&*self.storage, &self.sites) {
            self.sites.pop();
            return Err(e);
        }

        Ok(&self.sites[self.sites.len() - 1])
    }

    /// Remove every site with this url; returns whether anything was removed
    pub fn delete(&mut self, url: &str) -> Result<bool> {
        let original_len = self.sites.len();
        let remaining: Vec<Site> = self
            .sites
            .iter()
            .filter(|s| s.url != url)
            .cloned()
            .collect();

        if remaining.len() == original_len {
            return Ok(false);
        }

        SITES.save(&*self.storage, &remaining)?;
        self.sites = remaining;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FlakyStorage, KeyValueStore, MemoryStorage};
    use std::rc::Rc;

    fn empty_storage() -> Rc<MemoryStorage> {
        Rc::new(MemoryStorage::new())
    }

    fn catalog_with(storage: &Rc<MemoryStorage>, sites: &[Site]) -> SiteCatalog {
        SITES.save(&**storage, sites).unwrap();
        SiteCatalog::initialize(storage.clone()).unwrap()
    }

    fn create_test_site(name: &str, url: &str) -> Site {
        Site::new(name.to_string(), url.to_string())
    }

    #[test]
    fn test_default_catalog_parses() {
        let defaults = default_catalog();

        assert!(!defaults.is_empty());
        assert!(defaults.iter().all(|s| !s.name.is_empty() && !s.url.is_empty()));
    }

    #[test]
    fn test_initialize_seeds_when_absent() {
        let storage = empty_storage();

        let catalog = SiteCatalog::initialize(storage.clone()).unwrap();

        assert_eq!(catalog.sites(), default_catalog().as_slice());
        assert_eq!(SITES.load(&*storage), default_catalog());
    }

    #[test]
    fn test_initialize_seeds_when_malformed() {
        let storage = empty_storage();
        storage.set_item(SITES_KEY, "[{broken").unwrap();

        let catalog = SiteCatalog::initialize(storage.clone()).unwrap();

        assert_eq!(catalog.sites().len(), default_catalog().len());
    }

    #[test]
    fn test_initialize_keeps_short_user_catalog() {
        let storage = empty_storage();
        let mine = vec![create_test_site("Mine", "https://mine.example")];

        let catalog = catalog_with(&storage, &mine);

        assert_eq!(catalog.sites(), mine.as_slice());
    }

    #[test]
    fn test_initialize_keeps_empty_user_catalog() {
        let storage = empty_storage();

        let catalog = catalog_with(&storage, &[]);

        assert!(catalog.sites().is_empty());
    }

    #[test]
    fn test_load_does_not_seed() {
        let storage = empty_storage();

        let catalog = SiteCatalog::load(storage.clone());

        assert!(catalog.sites().is_empty());
        assert_eq!(storage.get_item(SITES_KEY).unwrap(), None);
    }

    #[test]
    fn test_add_site() {
        let storage = empty_storage();
        let mut catalog = catalog_with(&storage, &[]);

        let added = catalog.add("Docs", "https://docs.rs").unwrap().clone();

        assert_eq!(added.icon, "https://docs.rs/favicon.ico");
        let reloaded = SITES.load(&*storage);
        assert_eq!(reloaded, vec![added]);
    }

    #[test]
    fn test_add_trims_input() {
        let storage = empty_storage();
        let mut catalog = catalog_with(&storage, &[]);

        catalog.add("  Docs ", " https://docs.rs ").unwrap();

        assert_eq!(catalog.sites()[0].name, "Docs");
        assert_eq!(catalog.sites()[0].url, "https://docs.rs");
    }

    #[test]
    fn test_add_requires_name_and_url() {
        let storage = empty_storage();
        let mut catalog = catalog_with(&storage, &[create_test_site("A", "https://a.io")]);
        let before = storage.get_item(SITES_KEY).unwrap();

        let no_name = catalog.add("", "https://b.io").unwrap_err();
        let no_url = catalog.add("B", "   ").unwrap_err();

        assert!(no_name.is_validation());
        assert!(no_url.is_validation());
        assert_eq!(catalog.sites().len(), 1);
        assert_eq!(storage.get_item(SITES_KEY).unwrap(), before);
    }

    #[test]
    fn test_add_allows_duplicate_urls() {
        let storage = empty_storage();
        let mut catalog = catalog_with(&storage, &[]);

        catalog.add("A", "https://a.io").unwrap();
        catalog.add("A again", "https://a.io").unwrap();

        assert_eq!(SITES.load(&*storage).len(), 2);
    }

    #[test]
    fn test_delete_removes_all_matches() {
        let storage = empty_storage();
        let mut catalog = catalog_with(
            &storage,
            &[
                create_test_site("A", "https://a.io"),
                create_test_site("B", "https://b.io"),
                create_test_site("A2", "https://a.io"),
            ],
        );

        let removed = catalog.delete("https://a.io").unwrap();

        assert!(removed);
        assert_eq!(catalog.sites().len(), 1);
        assert_eq!(SITES.load(&*storage)[0].url, "https://b.io");
    }

    #[test]
    fn test_delete_nonexistent_leaves_storage_untouched() {
        let storage = empty_storage();
        let mut catalog = catalog_with(&storage, &[create_test_site("A", "https://a.io")]);
        let before = storage.get_item(SITES_KEY).unwrap();

        let removed = catalog.delete("https://missing.io").unwrap();

        assert!(!removed);
        assert_eq!(storage.get_item(SITES_KEY).unwrap(), before);
    }

    #[test]
    fn test_reload_picks_up_other_writers() {
        let storage = empty_storage();
        let mut catalog = catalog_with(&storage, &[]);
        SITES
            .save(&*storage, &[create_test_site("Other tab", "https://o.io")])
            .unwrap();

        catalog.reload();

        assert_eq!(catalog.sites()[0].name, "Other tab");
    }

    fn flaky_catalog(sites: &[Site]) -> (SiteCatalog, Rc<FlakyStorage>) {
        let storage = Rc::new(FlakyStorage::new());
        SITES.save(&*storage, sites).unwrap();
        let catalog = SiteCatalog::initialize(storage.clone()).unwrap();
        storage.fail_writes(true);
        (catalog, storage)
    }

    #[test]
    fn test_failed_add_rolls_back() {
        let (mut catalog, storage) = flaky_catalog(&[create_test_site("A", "https://a.io")]);

        let err = catalog.add("B", "https://b.io").unwrap_err();

        assert!(!err.is_validation());
        assert_eq!(catalog.sites().len(), 1);
        assert_eq!(SITES.load(&*storage).len(), 1);
    }

    #[test]
    fn test_failed_delete_keeps_sites() {
        let (mut catalog, storage) = flaky_catalog(&[create_test_site("A", "https://a.io")]);

        assert!(catalog.delete("https://a.io").is_err());

        assert_eq!(catalog.sites().len(), 1);
        assert_eq!(SITES.load(&*storage).len(), 1);
    }

    #[test]
    fn test_delete_without_match_skips_write() {
        let (mut catalog, _) = flaky_catalog(&[create_test_site("A", "https://a.io")]);

        assert!(!catalog.delete("https://missing.io").unwrap());
    }

    #[test]
    fn test_initialize_reports_failed_seed() {
        let storage = Rc::new(FlakyStorage::new());
        storage.fail_writes(true);

        assert!(SiteCatalog::initialize(storage.clone()).is_err());
        assert!(SiteCatalog::load(storage).sites().is_empty());
    }
}
