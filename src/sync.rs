/// One-shot reconciliation of the local site catalog with a hosted table
///
/// The url is the only identity key: a local site is "new" when no remote row
/// has its url, and upserts resolve conflicts on url.

use crate::clock::Clock;
use crate::config::RemoteConfig;
use crate::error::{Result, XTabError, check_status};
use crate::records::{RemoteSiteRecord, Site};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use std::collections::{HashMap, HashSet};
use url::Url;

/// The hosted `sites` table
#[async_trait(?Send)]
pub trait RemoteSiteTable {
    async fn fetch_all(&self) -> Result<Vec<RemoteSiteRecord>>;
    async fn insert(&self, records: &[RemoteSiteRecord]) -> Result<()>;
    /// Insert or replace rows, matching existing rows on `url`
    async fn upsert_by_url(&self, records: &[RemoteSiteRecord]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub inserted: usize,
    pub upserted: usize,
}

impl SyncReport {
    pub fn summary(&self) -> String {
        format!(
            "Sync complete: {} added, {} updated",
            self.inserted, self.upserted
        )
    }
}

/// Push the local catalog to the remote table.
///
/// Steps run in order and the first failure aborts the rest; rows already
/// written stay written. Remote rows are never deleted.
pub async fn sync_sites<T, C>(table: &T, local: &[Site], clock: &C) -> Result<SyncReport>
where
    T: RemoteSiteTable + ?Sized,
    C: Clock,
{
    let remote = table.fetch_all().await?;
    let now = clock.now();
    let mut report = SyncReport::default();

    let remote_urls: HashSet<&str> = remote.iter().map(|r| r.url.as_str()).collect();
    let mut seen = HashSet::new();
    let new_records: Vec<RemoteSiteRecord> = local
        .iter()
        .filter(|site| !remote_urls.contains(site.url.as_str()))
        .filter(|site| seen.insert(site.url.as_str()))
        .map(|site| RemoteSiteRecord::from_site(site, now))
        .collect();

    if !new_records.is_empty() {
        table.insert(&new_records).await?;
        report.inserted = new_records.len();
        log::info!("Inserted {} sites remotely", report.inserted);
    }

    if remote.is_empty() {
        return Ok(report);
    }

    // First local site wins when the catalog holds duplicate urls
    let mut local_by_url: HashMap<&str, &Site> = HashMap::new();
    for site in local {
        local_by_url.entry(site.url.as_str()).or_insert(site);
    }

    let refreshed: Vec<RemoteSiteRecord> = remote
        .into_iter()
        .map(|mut record| {
            if let Some(site) = local_by_url.get(record.url.as_str()) {
                record.name = site.name.clone();
                record.icon = site.icon.clone();
            }
            record.updated_at = now;
            record
        })
        .collect();

    table.upsert_by_url(&refreshed).await?;
    report.upserted = refreshed.len();
    log::info!("Upserted {} remote sites", report.upserted);

    Ok(report)
}

/// PostgREST endpoint of a Supabase project
pub struct SupabaseTable {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl SupabaseTable {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Self {
        SupabaseTable {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let base_url = config
            .supabase_url
            .as_deref()
            .ok_or(XTabError::NotConfigured("XTAB_SUPABASE_URL"))?;
        let api_key = config
            .supabase_key
            .as_deref()
            .ok_or(XTabError::NotConfigured("XTAB_SUPABASE_KEY"))?;
        Ok(Self::new(base_url, api_key, &config.sites_table))
    }

    fn table_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("{}/rest/v1/{}", self.base_url, self.table))?)
    }

    fn select_url(&self) -> Result<Url> {
        let mut url = self.table_url()?;
        url.query_pairs_mut().append_pair("select", "*");
        Ok(url)
    }

    fn upsert_url(&self) -> Result<Url> {
        let mut url = self.table_url()?;
        url.query_pairs_mut().append_pair("on_conflict", "url");
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait(?Send)]
impl RemoteSiteTable for SupabaseTable {
    async fn fetch_all(&self) -> Result<Vec<RemoteSiteRecord>> {
        let response = self.request(Method::GET, self.select_url()?).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn insert(&self, records: &[RemoteSiteRecord]) -> Result<()> {
        let response = self
            .request(Method::POST, self.table_url()?)
            .header("Prefer", "return=minimal")
            .json(records)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn upsert_by_url(&self, records: &[RemoteSiteRecord]) -> Result<()> {
        let response = self
            .request(Method::POST, self.upsert_url()?)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(records)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
