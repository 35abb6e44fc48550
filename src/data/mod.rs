//! Observable data model for placeable level objects
//!
//! The leaf layer everything else builds on:
//! - `Signal`/`Subscription`: typed publish/subscribe with removable handles
//! - `LevelObject`: the placeable object record with per-attribute change
//!   notifications
//! - small 2D geometry value types

mod geometry;
mod level_object;
mod signal;

pub use geometry::{Point, PointF, SizeF};
pub use level_object::{name_from_filename, LevelObject};
pub use signal::{Signal, Subscription};
