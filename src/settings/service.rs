use std::time::Duration;

use super::types::StoreSettings;
use crate::constants::{
    SUPABASE_ACCESS_TOKEN_VAR, SUPABASE_ANON_KEY_VAR, SUPABASE_URL_VAR, TIMEOUT_SECS_VAR,
};
use crate::error::{DashboardError, DashboardResult};

/// Loads store settings from the process environment, reading `.env` first.
pub fn load_store_settings() -> DashboardResult<StoreSettings> {
    if let Err(e) = dotenv::dotenv() {
        log::warn!("[settings] Could not load .env file: {}", e);
    }
    store_settings_from(|name| std::env::var(name).ok())
}

/// Builds settings from an arbitrary variable lookup.
pub fn store_settings_from<F>(lookup: F) -> DashboardResult<StoreSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let url = non_empty(&lookup, SUPABASE_URL_VAR)
        .ok_or_else(|| DashboardError::Configuration(format!("Missing {}", SUPABASE_URL_VAR)))?;
    let key = non_empty(&lookup, SUPABASE_ANON_KEY_VAR).ok_or_else(|| {
        DashboardError::Configuration(format!("Missing {}", SUPABASE_ANON_KEY_VAR))
    })?;

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(DashboardError::Configuration(format!(
            "{} must be an http(s) URL, got '{}'",
            SUPABASE_URL_VAR, url
        )));
    }

    let mut settings = StoreSettings::new(&url, &key);
    if let Some(token) = non_empty(&lookup, SUPABASE_ACCESS_TOKEN_VAR) {
        settings = settings.with_access_token(&token);
    }
    if let Some(raw) = non_empty(&lookup, TIMEOUT_SECS_VAR) {
        let secs: u64 = raw.parse().map_err(|_| {
            DashboardError::Configuration(format!("{} must be whole seconds, got '{}'", TIMEOUT_SECS_VAR, raw))
        })?;
        settings.timeout = Duration::from_secs(secs);
    }

    Ok(settings)
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
