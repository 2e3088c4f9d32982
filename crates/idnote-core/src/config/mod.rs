//! Remote store configuration.
//!
//! Provides the `StoreConfig` struct used by the CLI profiles and the
//! environment to describe which Supabase table holds the notes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub const ENV_SUPABASE_URL: &str = "IDNOTE_SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "IDNOTE_SUPABASE_ANON_KEY";
pub const ENV_TABLE: &str = "IDNOTE_TABLE";

const DEFAULT_TABLE: &str = "qq_data";
const DEFAULT_KEY_COLUMN: &str = "qq";
const DEFAULT_CONTENT_COLUMN: &str = "content";
const DEFAULT_UPDATED_AT_COLUMN: &str = "updated_at";

/// How `load` treats a cached note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Show cached content without contacting the store
    #[default]
    PreferCache,
    /// Always read from the store and refresh the cache
    Remote,
}

/// Connection and table layout for the remote note store.
///
/// The anon key is a publishable key; secret credentials must never be stored here.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_key_column")]
    pub key_column: String,
    #[serde(default = "default_content_column")]
    pub content_column: String,
    #[serde(default = "default_updated_at_column")]
    pub updated_at_column: Option<String>,
    #[serde(default)]
    pub cache_policy: CachePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            table: default_table(),
            key_column: default_key_column(),
            content_column: default_content_column(),
            updated_at_column: default_updated_at_column(),
            cache_policy: CachePolicy::default(),
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("StoreConfig")
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_anon_key",
                &self.supabase_anon_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("table", &self.table)
            .field("key_column", &self.key_column)
            .field("content_column", &self.content_column)
            .field("updated_at_column", &self.updated_at_column)
            .field("cache_policy", &self.cache_policy)
            .finish()
    }
}

impl StoreConfig {
    /// Read connection settings from `IDNOTE_*` environment variables.
    ///
    /// Returns `Ok(None)` when neither URL nor key is set.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_values(
            std::env::var(ENV_SUPABASE_URL).ok(),
            std::env::var(ENV_SUPABASE_ANON_KEY).ok(),
            std::env::var(ENV_TABLE).ok(),
        )
    }

    /// Build a config from optional raw values; a half-configured pair is an error.
    pub fn from_values(
        url: Option<String>,
        anon_key: Option<String>,
        table: Option<String>,
    ) -> Result<Option<Self>> {
        let Some((url, anon_key)) = resolve_optional_supabase_config(url, anon_key)? else {
            return Ok(None);
        };

        let config = Self {
            supabase_url: Some(url),
            supabase_anon_key: Some(anon_key),
            table: normalize_text_option(table).unwrap_or_else(default_table),
            ..Self::default()
        };
        config.validate()?;
        Ok(Some(config))
    }

    /// Whether both URL and anon key are present
    #[must_use]
    pub fn is_configured(&self) -> bool {
        normalize_text_option(self.supabase_url.clone()).is_some()
            && normalize_text_option(self.supabase_anon_key.clone()).is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(url) = normalize_text_option(self.supabase_url.clone()) {
            if !is_http_url(&url) {
                return Err(Error::Config(
                    "supabase_url must include http:// or https://".to_string(),
                ));
            }
        }
        for (field, value) in [
            ("table", &self.table),
            ("key_column", &self.key_column),
            ("content_column", &self.content_column),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Pair up optional URL and key, rejecting configs that set only one of them.
pub fn resolve_optional_supabase_config(
    url: Option<String>,
    anon_key: Option<String>,
) -> Result<Option<(String, String)>> {
    let url = normalize_text_option(url);
    let anon_key = normalize_text_option(anon_key);

    match (url, anon_key) {
        (None, None) => Ok(None),
        (Some(url), Some(anon_key)) => Ok(Some((url.trim_end_matches('/').to_string(), anon_key))),
        (Some(_), None) => Err(Error::Config(format!("{ENV_SUPABASE_ANON_KEY} is missing"))),
        (None, Some(_)) => Err(Error::Config(format!("{ENV_SUPABASE_URL} is missing"))),
    }
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_key_column() -> String {
    DEFAULT_KEY_COLUMN.to_string()
}

fn default_content_column() -> String {
    DEFAULT_CONTENT_COLUMN.to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_updated_at_column() -> Option<String> {
    Some(DEFAULT_UPDATED_AT_COLUMN.to_string())
}
