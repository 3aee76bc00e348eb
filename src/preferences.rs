/// Dashboard layout preference stored under `isSimple`

use crate::config::IS_SIMPLE_KEY;
use crate::error::Result;
use crate::storage::KeyValueStore;

/// Simple layout shows only the clock and search box. Missing or malformed is `false`.
pub fn is_simple(storage: &dyn KeyValueStore) -> bool {
    match storage.get_item(IS_SIMPLE_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed {}: {}", IS_SIMPLE_KEY, e);
            false
        }),
        Ok(None) => false,
        Err(e) => {
            log::warn!("Failed to read {}: {}", IS_SIMPLE_KEY, e);
            false
        }
    }
}

pub fn set_simple(storage: &dyn KeyValueStore, simple: bool) -> Result<()> {
    storage.set_item(IS_SIMPLE_KEY, &serde_json::to_string(&simple)?)
}
