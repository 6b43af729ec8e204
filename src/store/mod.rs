//! Persistence for the soundboard catalog, split across logical submodules.

pub mod codec;
mod error;
pub mod pager;
mod paths;
mod records;

pub use error::StoreError;
pub use pager::{page_count, Pager};
pub use paths::StorePaths;
pub use records::RecordStore;
