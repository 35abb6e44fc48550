//! Level objects model - the palette of placeable object prototypes
//!
//! Owns the ordered sequence of prototypes discovered in an asset
//! directory, keeps a name index alongside it, and carries the drag state
//! a list view needs to hand a prototype to the map canvas: the pointer
//! offset captured at drag start and one placeholder object previewing an
//! uncommitted placement.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::{imageops, RgbaImage};

use crate::data::{LevelObject, Point};
use crate::utils::log;

use super::metadata::load_metadata;

/// Image extensions the directory scan recognizes
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Error type for model operations
#[derive(Debug)]
pub enum ModelError {
    /// The asset directory itself could not be scanned
    Scan(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Scan(msg) => write!(f, "Scan error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

/// What a drag hands to the drop target: the dragged prototypes plus the
/// pointer-to-origin offset captured at drag start. In-process only; no
/// byte format is mandated or provided.
#[derive(Debug)]
pub struct DragPayload {
    pub objects: Vec<Rc<LevelObject>>,
    pub offset: Point,
}

/// Ordered, name-indexed collection of level object prototypes
pub struct LevelObjectsModel {
    entries: Vec<Rc<LevelObject>>,
    by_name: HashMap<String, Rc<LevelObject>>,
    drag_offset: Point,
    /// Sentinel previewing a pending placement; never part of `entries`
    placeholder: Rc<LevelObject>,
}

impl Default for LevelObjectsModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelObjectsModel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            drag_offset: Point::default(),
            placeholder: LevelObject::new(),
        }
    }

    /// Clear the sequence and the name index
    ///
    /// Synchronizers bound to removed objects detach on their own through
    /// the objects' destruction notifications.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.by_name.clear();
    }

    /// Scan `directory` for image assets and append one prototype per image
    ///
    /// Sidecar metadata is applied best-effort; images that fail to decode
    /// are skipped with a log line. An unreadable directory aborts the
    /// whole scan, keeping whatever was already added. Returns the number
    /// of prototypes added.
    pub fn add_images_from_directory(&mut self, directory: &Path) -> Result<usize, ModelError> {
        let reader = fs::read_dir(directory).map_err(|e| {
            ModelError::Scan(format!(
                "cannot read directory {}: {}",
                directory.display(),
                e
            ))
        })?;

        let mut paths: Vec<PathBuf> = reader
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_image_file(path))
            .collect();
        // Sort by filename for consistent ordering
        paths.sort();

        let mut added = 0;
        for path in paths {
            let image = match image::open(&path) {
                Ok(image) => image.to_rgba8(),
                Err(e) => {
                    log::err_line(&format!("Failed to load image {}: {}", path.display(), e));
                    continue;
                }
            };

            let object = LevelObject::new();
            object.set_filename(path.to_string_lossy());
            object.set_image(image);
            load_metadata(&object, &path);

            self.add(object);
            added += 1;
        }

        Ok(added)
    }

    fn add(&mut self, object: Rc<LevelObject>) {
        self.by_name.insert(object.name(), Rc::clone(&object));
        self.entries.push(object);
    }

    /// O(1) lookup by display name; absence is not an error
    pub fn level_object_by_name(&self, name: &str) -> Option<Rc<LevelObject>> {
        self.by_name.get(name).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.entries.len()
    }

    pub fn level_object_at(&self, row: usize) -> Option<&Rc<LevelObject>> {
        self.entries.get(row)
    }

    /// Display name for a list row
    pub fn row_name(&self, row: usize) -> Option<String> {
        self.entries.get(row).map(|object| object.name())
    }

    /// Thumbnail for a list row, bounded by `max_edge` on the longer side
    ///
    /// Images already small enough are returned as-is.
    pub fn row_thumbnail(&self, row: usize, max_edge: u32) -> Option<RgbaImage> {
        let image = self.entries.get(row)?.image()?;
        let (width, height) = (image.width(), image.height());
        if width <= max_edge && height <= max_edge {
            return Some((*image).clone());
        }

        let scale = f64::from(max_edge) / f64::from(width.max(height));
        let thumb_width = ((f64::from(width) * scale) as u32).max(1);
        let thumb_height = ((f64::from(height) * scale) as u32).max(1);
        Some(imageops::thumbnail(&*image, thumb_width, thumb_height))
    }

    /// Pointer-to-origin offset captured when a drag starts
    pub fn drag_offset(&self) -> Point {
        self.drag_offset
    }

    pub fn set_drag_offset(&mut self, drag_offset: Point) {
        self.drag_offset = drag_offset;
    }

    /// Export the given rows for a drag; `None` when no row is draggable
    ///
    /// The drop target typically instantiates clones at drop position minus
    /// the payload offset.
    pub fn drag_payload(&self, rows: &[usize]) -> Option<DragPayload> {
        let objects: Vec<_> = rows
            .iter()
            .filter_map(|&row| self.entries.get(row).cloned())
            .collect();
        if objects.is_empty() {
            return None;
        }
        Some(DragPayload {
            objects,
            offset: self.drag_offset,
        })
    }

    /// The placement-preview sentinel; distinct from every sequence member
    pub fn placeholder(&self) -> &Rc<LevelObject> {
        &self.placeholder
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| {
            let extension = extension.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == extension)
        })
        .unwrap_or(false)
}
