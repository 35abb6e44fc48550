//! Sidecar metadata for image assets
//!
//! An image `crate.png` may ship with `crate.ron` next to it, supplying a
//! display name and/or custom properties:
//!
//! ```text
//! (
//!     name: Some("Wooden crate"),
//!     properties: {
//!         "solid": "yes",
//!     },
//! )
//! ```
//!
//! Loading is best-effort: a missing or unparsable sidecar never blocks the
//! object's creation, it just keeps its filename-derived defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::LevelObject;
use crate::utils::log;

/// Sidecar file extension, shared with the rest of the editor's data files
pub const METADATA_EXTENSION: &str = "ron";

/// What a sidecar file may supply
#[derive(Debug, Default, Deserialize)]
pub struct ObjectMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Sidecar path for an image: same stem, metadata extension
pub fn metadata_path(image_path: &Path) -> PathBuf {
    image_path.with_extension(METADATA_EXTENSION)
}

/// Apply sidecar metadata to `object`, if a sidecar exists and parses
///
/// Returns whether metadata was applied. Absence returns `false` silently;
/// a parse failure is logged and also returns `false`.
pub fn load_metadata(object: &LevelObject, image_path: &Path) -> bool {
    let path = metadata_path(image_path);
    let Ok(text) = fs::read_to_string(&path) else {
        return false;
    };

    let metadata: ObjectMetadata = match ron::from_str(&text) {
        Ok(metadata) => metadata,
        Err(e) => {
            log::err_line(&format!(
                "Failed to parse metadata {}: {}",
                path.display(),
                e
            ));
            return false;
        }
    };

    if let Some(name) = metadata.name {
        object.set_name(name);
    }
    for (key, value) in metadata.properties {
        object.set_custom_property(key, value);
    }
    true
}
