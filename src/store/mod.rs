//! External data store seam.
//!
//! The dashboard only ever reads through `DataStore::select`. The hosted
//! PostgREST client is used in production; the in-memory store backs tests and
//! offline demos.

pub mod memory;
pub mod supabase;
pub mod types;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;
pub use types::*;

/// Common interface for relational stores the dashboard can query.
#[async_trait::async_trait]
pub trait DataStore: Send + Sync {
  async fn select(&self, query: &SelectQuery) -> Result<StoreResponse, StoreError>;
}
