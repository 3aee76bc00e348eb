//! Configuration for XTab
//!
//! Storage keys and timer periods are fixed constants. API endpoints and
//! keys are baked in at build time from `XTAB_*` environment variables so
//! the extension bundle carries no runtime config file.

// ===== Storage Keys =====

/// Bookmarked sites grid
pub const SITES_KEY: &str = "sitesArr";
/// Today's search history
pub const SEARCH_LIST_KEY: &str = "searchList";
/// To-do list
pub const TODOS_KEY: &str = "todos";
/// Simple layout flag
pub const IS_SIMPLE_KEY: &str = "isSimple";

// ===== Timers =====

/// Clock text refresh period in milliseconds
pub const CLOCK_TICK_MS: u32 = 1_000;
/// Date rollover check period in milliseconds (60 minutes)
pub const DATE_TICK_MS: u32 = 60 * 60 * 1_000;

// ===== Outbound Search =====

pub const SEARCH_ENDPOINT: &str = "https://www.google.com/search";
pub const SEARCH_QUERY_PARAM: &str = "q";

// ===== Remote Services =====

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SITES_TABLE: &str = "sites";

/// Settings for the optional cloud features.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub sites_table: String,
}

impl RemoteConfig {
    /// Read the values compiled into this build.
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("XTAB_GEMINI_API_KEY"),
            option_env!("XTAB_GEMINI_MODEL"),
            option_env!("XTAB_SUPABASE_URL"),
            option_env!("XTAB_SUPABASE_KEY"),
            option_env!("XTAB_SUPABASE_TABLE"),
        )
    }

    pub fn from_values(
        gemini_api_key: Option<&str>,
        gemini_model: Option<&str>,
        supabase_url: Option<&str>,
        supabase_key: Option<&str>,
        sites_table: Option<&str>,
    ) -> Self {
        RemoteConfig {
            gemini_api_key: non_blank(gemini_api_key),
            gemini_model: non_blank(gemini_model)
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            supabase_url: non_blank(supabase_url)
                .map(|u| u.trim_end_matches('/').to_string()),
            supabase_key: non_blank(supabase_key),
            sites_table: non_blank(sites_table)
                .unwrap_or_else(|| DEFAULT_SITES_TABLE.to_string()),
        }
    }

    pub fn chat_enabled(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    pub fn sync_enabled(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_key.is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
