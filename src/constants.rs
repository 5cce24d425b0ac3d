//! Shared constants used across the dashboard core.
use std::time::Duration;

// Query defaults
pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_ORDER_COLUMN: &str = "id";

// Cross-module activity feed
pub const ACTIVITY_ROWS_PER_MODULE: usize = 5;
pub const ACTIVITY_FEED_LIMIT: usize = 20;
pub const PLACEHOLDER_STATUS: &str = "Completed";

// Columns never written to CSV exports
pub const EXPORT_EXCLUDED_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

// Store settings (read from the environment / .env)
pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const SUPABASE_ACCESS_TOKEN_VAR: &str = "SUPABASE_ACCESS_TOKEN";
pub const TIMEOUT_SECS_VAR: &str = "DASHBOARD_TIMEOUT_SECS";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// PostgREST endpoint prefix
pub const REST_PATH: &str = "/rest/v1";
