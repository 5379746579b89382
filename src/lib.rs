//! # Media Archiver
//!
//! Imports photos and videos into a date-derived directory structure while
//! preventing duplicate storage.
//!
//! ## Core Philosophy
//! - **Content decides identity** - a file is a duplicate iff its content
//!   hash and byte size both match a previously archived file
//! - **Fail soft per file** - one bad file never aborts a batch
//! - **Honest timestamps** - archived names carry whether the capture time
//!   came from embedded metadata (`exif`) or the filesystem (`mod`)
//!
//! ## Architecture
//! The library is split into a core engine (CLI-agnostic) and the
//! command-line layer:
//! - `core` - The import/index engine
//! - `error` - Error types
//! - `cli` (binary only) - Command-line interface

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use error::{ArchiverError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
