//! # media-archive CLI
//!
//! Command-line interface for the media archiver.
//!
//! ## Usage
//! ```bash
//! media-archive import ~/Camera ~/Archive
//! media-archive index ~/Archive
//! media-archive report ~/Archive
//! ```

mod cli;

use media_archiver::Result;

fn main() -> Result<()> {
    media_archiver::init_tracing();
    cli::run()
}
