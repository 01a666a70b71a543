// Asset manifest and resolved bundle. Decoding happens in the host; the engine only needs to
// know what exists, what kind it is and its pixel size. Missing assets fail startup once.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{ContentKind, EngineConfig, END_SLOT, INTRO_SLOT};

/// Everything the host must resolve before a session can start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub fonts: Vec<String>,
    pub groups: Vec<ManifestGroup>,
}

/// Ordered filenames required by one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestGroup {
    pub month: String,
    pub files: Vec<String>,
}

impl AssetManifest {
    pub fn from_config(config: &EngineConfig) -> Self {
        let groups = config
            .months
            .iter()
            .map(|month| {
                let files = match month.id.as_str() {
                    INTRO_SLOT => config.intro_assets.clone(),
                    END_SLOT => config.end_assets.clone(),
                    id => config.asset_order.get(id).cloned().unwrap_or_default(),
                };
                ManifestGroup {
                    month: month.id.clone(),
                    files,
                }
            })
            .collect();

        AssetManifest {
            fonts: config.required_fonts.clone(),
            groups,
        }
    }

    pub fn files_for(&self, month: &str) -> &[String] {
        self.groups
            .iter()
            .find(|g| g.month == month)
            .map(|g| g.files.as_slice())
            .unwrap_or(&[])
    }

    /// Check that `bundle` satisfies every entry. Stops at the first gap.
    pub fn resolve(&self, bundle: &AssetBundle) -> EngineResult<()> {
        if let Some(font) = self.fonts.iter().find(|f| !bundle.has_font(f)) {
            return Err(EngineError::missing_asset("fonts", font.as_str()));
        }
        for group in &self.groups {
            if let Some(file) = group
                .files
                .iter()
                .find(|f| bundle.entry(&group.month, f).is_none())
            {
                return Err(EngineError::missing_asset(
                    group.month.as_str(),
                    file.as_str(),
                ));
            }
        }
        Ok(())
    }
}

/// One decoded texture or video, as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub filename: String,
    pub kind: ContentKind,
    #[serde(default = "default_dimension")]
    pub width: f32,
    #[serde(default = "default_dimension")]
    pub height: f32,
}

fn default_dimension() -> f32 {
    1.0
}

impl ContentEntry {
    /// Height over width. Degenerate sizes count as square.
    pub fn aspect(&self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.height / self.width
        } else {
            1.0
        }
    }
}

/// Resolved assets keyed the same way as the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetBundle {
    #[serde(default)]
    pub fonts: Vec<String>,
    #[serde(default)]
    pub content: HashMap<String, Vec<ContentEntry>>,
}

impl AssetBundle {
    pub fn has_font(&self, name: &str) -> bool {
        self.fonts.iter().any(|f| f == name)
    }

    pub fn entry(&self, month: &str, filename: &str) -> Option<&ContentEntry> {
        self.content
            .get(month)
            .and_then(|entries| entries.iter().find(|e| e.filename == filename))
    }
}

/// Last resolved bundle, kept for warm re-entry into a new session.
#[derive(Debug, Default)]
pub struct AssetCache {
    bundle: Option<AssetBundle>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached bundle, but only if it still satisfies `manifest`.
    pub fn lookup(&self, manifest: &AssetManifest) -> Option<&AssetBundle> {
        let bundle = self.bundle.as_ref()?;
        match manifest.resolve(bundle) {
            Ok(()) => {
                tracing::debug!("asset cache hit");
                Some(bundle)
            }
            Err(err) => {
                tracing::debug!(%err, "asset cache stale");
                None
            }
        }
    }

    pub fn store(&mut self, bundle: AssetBundle) {
        self.bundle = Some(bundle);
    }

    pub fn clear(&mut self) {
        self.bundle = None;
    }
}
