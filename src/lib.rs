//! mapmaker - data model and property-binding core for a 2D level editor
//!
//! Three pieces, leaf first:
//! - [`data::LevelObject`]: an observable record of a placeable object's
//!   attributes, with typed per-attribute change signals and one generic
//!   `modified` channel
//! - [`ui::PropertyBrowser`]: binds to one object at a time and keeps a
//!   generic editable property tree in sync with it, in both directions
//! - [`models::LevelObjectsModel`]: the palette of prototypes loaded from
//!   an asset directory, indexed by name, with drag/placeholder support
//!   for placement
//!
//! Everything is single-threaded and synchronous: a setter notifies its
//! subscribers before it returns. Rendering, dialogs, settings, and map
//! persistence live in collaborating layers that subscribe to this core.

pub mod data;
pub mod models;
pub mod ui;
pub mod utils;
