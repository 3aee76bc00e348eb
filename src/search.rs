/// Search box: outbound query URLs and today's search history

use crate::clock::Clock;
use crate::config::{SEARCH_ENDPOINT, SEARCH_LIST_KEY, SEARCH_QUERY_PARAM};
use crate::error::{Result, XTabError};
use crate::records::SearchEntry;
use crate::storage::{KeyValueStore, ListStore, StorageHandle};
use url::Url;

const SEARCH_LIST: ListStore<SearchEntry> = ListStore::new(SEARCH_LIST_KEY);

fn todays_entries(storage: &dyn KeyValueStore, clock: &impl Clock) -> Vec<SearchEntry> {
    let today = clock.today();
    SEARCH_LIST
        .load(storage)
        .into_iter()
        .filter(|entry| clock.local_date(entry.time) == today)
        .collect()
}

/// Web search URL for a query, percent-encoded
pub fn search_url(query: &str) -> Result<Url> {
    Ok(Url::parse_with_params(SEARCH_ENDPOINT, &[(SEARCH_QUERY_PARAM, query)])?)
}

/// Keywords searched today, oldest first
pub struct SearchLog<C: Clock> {
    storage: StorageHandle,
    clock: C,
    entries: Vec<SearchEntry>,
}

impl<C: Clock> SearchLog<C> {
    /// Read the stored history, keeping only entries from today's local date.
    ///
    /// Older entries stay in storage until the next `record` rewrites it.
    pub fn load(storage: StorageHandle, clock: C) -> Self {
        let entries = todays_entries(&*storage, &clock);
        SearchLog {
            storage,
            clock,
            entries,
        }
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    /// Re-read storage; drops entries once the local date has moved on
    pub fn reload(&mut self) {
        self.entries = todays_entries(&*self.storage, &self.clock);
    }

    pub fn record(&mut self, keyword: &str) -> Result<&SearchEntry> {
        if keyword.trim().is_empty() {
            return Err(XTabError::validation("Search keyword is empty"));
        }

        let today = self.clock.today();
        let mut next: Vec<SearchEntry> = self
            .entries
            .iter()
            .filter(|entry| self.clock.local_date(entry.time) == today)
            .cloned()
            .collect();
        next.push(SearchEntry {
            keyword: keyword.to_string(),
            time: self.clock.now(),
        });

        SEARCH_LIST.save(&*self.storage, &next)?;
        self.entries = next;
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn clear(&mut self) -> Result<()> {
        SEARCH_LIST.save(&*self.storage, &[])?;
        self.entries.clear();
        Ok(())
    }
}
