pub mod feed;
pub mod types;

pub use feed::*;
pub use types::*;
