//! Property-editing UI layer
//!
//! A generic property tree (nodes, values, editor-widget selection) and
//! the browser that synchronizes it with one bound level object.

mod property_browser;
mod property_tree;

pub use property_browser::PropertyBrowser;
pub use property_tree::{
    EditorFactory, EditorWidget, PropertyKind, PropertyNode, PropertyTree, PropertyValue,
    StandardEditorFactory,
};
