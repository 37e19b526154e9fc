//! Content manifest loader.

use std::path::Path;

use axiom_core::{ContentParams, PlayerSpawn, TargetSpawn, WeaponDef};
use serde::{Deserialize, Serialize};

use crate::{LoadResult, read_file};

/// File name of the manifest inside a content root.
pub const MANIFEST_FILE: &str = "manifest.ron";

/// Manifest structure for RON files.
///
/// Mirrors [`ContentParams`] without the boundary header; the header is
/// filled in when the manifest is converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentManifest {
    pub weapon: WeaponDef,
    #[serde(default)]
    pub player: Option<PlayerSpawn>,
    #[serde(default)]
    pub targets: Vec<TargetSpawn>,
}

impl ContentManifest {
    pub fn into_params(self) -> ContentParams {
        ContentParams::new(self.weapon, self.player, self.targets)
    }
}

impl From<ContentManifest> for ContentParams {
    fn from(manifest: ContentManifest) -> Self {
        manifest.into_params()
    }
}

/// Loader for content manifests from RON files.
pub struct ManifestLoader;

impl ManifestLoader {
    /// Load a manifest from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing a ContentManifest
    pub fn load(path: &Path) -> LoadResult<ContentManifest> {
        let content = read_file(path)?;
        let manifest: ContentManifest = ron::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse content manifest {}: {}", path.display(), e)
        })?;

        tracing::debug!(
            "Loaded manifest {}: weapon={} player={} targets={}",
            path.display(),
            manifest.weapon.weapon_id,
            manifest.player.is_some(),
            manifest.targets.len()
        );

        Ok(manifest)
    }
}

/// Reads `<root>/manifest.ron` and returns the params to hand to the kernel.
pub fn load_content(root: &Path) -> LoadResult<ContentParams> {
    if !root.is_dir() {
        anyhow::bail!("Content directory not found: {}", root.display());
    }

    let manifest = ManifestLoader::load(&root.join(MANIFEST_FILE))?;
    Ok(manifest.into_params())
}
