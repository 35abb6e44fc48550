//! Collection models backing the editor's list views

mod level_objects_model;
mod metadata;

pub use level_objects_model::{DragPayload, LevelObjectsModel, ModelError, IMAGE_EXTENSIONS};
pub use metadata::{load_metadata, metadata_path, ObjectMetadata, METADATA_EXTENSION};
