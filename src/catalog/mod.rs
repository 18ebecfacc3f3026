//! Remote catalog: search pipeline and per-mod file cache

mod debounce;
pub mod files;
pub mod search;

pub use debounce::Debouncer;
pub use files::ModFileCache;
pub use search::{SearchPipeline, SearchState};
