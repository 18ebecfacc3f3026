//! ModShelf - mod catalog and install state engine for a game launcher
//!
//! The host UI opens a [`ModManagerSession`] per game instance and drives it:
//! - Debounced, paginated catalog search with category filters
//! - Per-mod file lists fetched once per session, with a chosen version
//! - Selection and range highlight for the installed and catalog lists
//! - Sequential download/update/delete batches with aggregated failures
//! - Detail panel with screenshots and version choice
//!
//! Network and filesystem access live behind the [`ModBackend`] trait.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod installed;
pub mod logging;
pub mod models;
pub mod queue;
pub mod selection;
pub mod session;

pub use backend::ModBackend;
pub use config::Config;
pub use error::UserError;
pub use session::ModManagerSession;
