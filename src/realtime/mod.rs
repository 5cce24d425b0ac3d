//! Realtime refresh: re-invokes the data fetcher on row change notifications.

pub mod listener;
pub mod types;

pub use listener::*;
pub use types::*;
