use serde::{Deserialize, Serialize};
use std::time::Duration;
use ts_rs::TS;

use crate::constants::DEFAULT_TIMEOUT;

/// Connection settings for the hosted data store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Project base URL, e.g. `https://xyz.supabase.co`. No trailing slash.
    pub url: String,
    /// Anonymous (publishable) API key, sent as `apikey`.
    pub api_key: String,
    /// User session token. Falls back to the API key for `Authorization`.
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl StoreSettings {
    pub fn new(url: &str, api_key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    pub fn bearer_token(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.api_key)
    }
}

/// How the cross-module feed issues its per-module fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub enum FetchMode {
    /// One request at a time, in registry order.
    Sequential,
    /// All modules at once. Output ordering is identical to `Sequential`.
    Concurrent,
}

impl Default for FetchMode {
    fn default() -> Self {
        Self::Sequential
    }
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Concurrent => "concurrent",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "concurrent" => Self::Concurrent,
            _ => Self::Sequential, // Default fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_mode_names_round_trip() {
        for mode in [FetchMode::Sequential, FetchMode::Concurrent] {
            assert_eq!(FetchMode::from_str(mode.as_str()), mode);
        }
        assert_eq!(FetchMode::from_str("parallel"), FetchMode::Sequential);
        assert_eq!(FetchMode::from_str(""), FetchMode::default());
    }
}
