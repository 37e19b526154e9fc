//! Data-driven content definitions for the simulation kernel.
//!
//! Content lives outside the kernel: this crate reads a RON manifest from a
//! content root and hands the kernel plain numeric [`ContentParams`]. The
//! kernel performs the authoritative validation when the params are loaded.
//!
//! ```text
//! content_root/
//! └── manifest.ron
//! ```

pub mod manifest;

pub use manifest::{ContentManifest, MANIFEST_FILE, ManifestLoader, load_content};

use std::path::Path;

pub use axiom_core::ContentParams;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
