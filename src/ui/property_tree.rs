//! Generic editable property tree
//!
//! The surface the property browser projects level objects onto. The tree
//! knows nothing about level objects: it is a hierarchy of named, typed
//! nodes plus one `value_edited` signal.
//!
//! `set_value` is the single entry point for both user edits (committed by
//! an editor widget) and programmatic updates, and it only notifies on an
//! actual change. That equals check is what terminates the echo between
//! tree and bound object when the browser reflects a value back.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::data::Signal;

/// The node kinds the tree supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Non-leaf heading; carries no value
    Group,
    /// Displayed but never editable
    ReadOnlyString,
    String,
    Int,
    Bool,
}

/// A node's current value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// No value assigned yet (fresh nodes, groups)
    Empty,
    String(String),
    Int(i64),
    Bool(bool),
}

impl PropertyValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The value as an editor line would show it
    pub fn to_display_string(&self) -> String {
        match self {
            PropertyValue::Empty => String::new(),
            PropertyValue::String(value) => value.clone(),
            PropertyValue::Int(value) => value.to_string(),
            PropertyValue::Bool(value) => value.to_string(),
        }
    }
}

/// One node in the tree
///
/// Nodes are shared as `Rc<PropertyNode>`; identity comparisons use
/// `Rc::ptr_eq`, names are not required to be unique across groups.
pub struct PropertyNode {
    name: String,
    kind: PropertyKind,
    tooltip: RefCell<String>,
    enabled: Cell<bool>,
    value: RefCell<PropertyValue>,
    children: RefCell<Vec<Rc<PropertyNode>>>,
}

impl PropertyNode {
    fn new(name: impl Into<String>, kind: PropertyKind) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            kind,
            tooltip: RefCell::new(String::new()),
            enabled: Cell::new(true),
            value: RefCell::new(PropertyValue::Empty),
            children: RefCell::new(Vec::new()),
        })
    }

    pub fn group(name: impl Into<String>) -> Rc<Self> {
        Self::new(name, PropertyKind::Group)
    }

    pub fn string(name: impl Into<String>) -> Rc<Self> {
        Self::new(name, PropertyKind::String)
    }

    pub fn read_only_string(name: impl Into<String>) -> Rc<Self> {
        let node = Self::new(name, PropertyKind::ReadOnlyString);
        node.enabled.set(false);
        node
    }

    pub fn int(name: impl Into<String>) -> Rc<Self> {
        Self::new(name, PropertyKind::Int)
    }

    pub fn bool(name: impl Into<String>) -> Rc<Self> {
        Self::new(name, PropertyKind::Bool)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn tooltip(&self) -> String {
        self.tooltip.borrow().clone()
    }

    pub fn set_tooltip(&self, tooltip: impl Into<String>) {
        *self.tooltip.borrow_mut() = tooltip.into();
    }

    pub fn enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn value(&self) -> PropertyValue {
        self.value.borrow().clone()
    }

    pub fn add_child(&self, child: Rc<PropertyNode>) {
        self.children.borrow_mut().push(child);
    }

    pub fn remove_child(&self, child: &Rc<PropertyNode>) {
        self.children
            .borrow_mut()
            .retain(|existing| !Rc::ptr_eq(existing, child));
    }

    pub fn clear_children(&self) {
        self.children.borrow_mut().clear();
    }

    /// Snapshot of current children, in insertion order
    pub fn children(&self) -> Vec<Rc<PropertyNode>> {
        self.children.borrow().clone()
    }

    pub fn child_named(&self, name: &str) -> Option<Rc<PropertyNode>> {
        self.children
            .borrow()
            .iter()
            .find(|child| child.name == name)
            .cloned()
    }
}

impl std::fmt::Debug for PropertyNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyNode")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("value", &*self.value.borrow())
            .field("enabled", &self.enabled.get())
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

/// The tree itself: root nodes plus the edit notification channel
#[derive(Default)]
pub struct PropertyTree {
    roots: RefCell<Vec<Rc<PropertyNode>>>,
    value_edited: Signal<(Rc<PropertyNode>, PropertyValue)>,
}

impl PropertyTree {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn add_root(&self, node: Rc<PropertyNode>) {
        self.roots.borrow_mut().push(node);
    }

    /// Remove every root from the visible tree; the nodes themselves stay
    /// alive for whoever still holds them
    pub fn clear_roots(&self) {
        self.roots.borrow_mut().clear();
    }

    pub fn roots(&self) -> Vec<Rc<PropertyNode>> {
        self.roots.borrow().clone()
    }

    /// Assign a node's value, notifying only on an actual change
    ///
    /// Editor widgets call this to commit user input; the browser calls it
    /// to push object state into the tree. Both directions share the same
    /// equals check.
    pub fn set_value(&self, node: &Rc<PropertyNode>, value: PropertyValue) {
        {
            let mut current = node.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value.clone();
        }
        self.value_edited.emit(&(Rc::clone(node), value));
    }

    /// Fires with (node, new value) whenever a node's value actually changes
    pub fn value_edited(&self) -> &Signal<(Rc<PropertyNode>, PropertyValue)> {
        &self.value_edited
    }
}

/// The editor widgets a presentation layer can instantiate per node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorWidget {
    Label,
    LineEdit,
    SpinBox,
    CheckBox,
}

/// Picks the editor widget for a node; `None` means the node gets no
/// editor at all (groups)
pub trait EditorFactory {
    fn editor_for(&self, node: &PropertyNode) -> Option<EditorWidget>;
}

/// The default kind-to-widget mapping
#[derive(Debug, Default)]
pub struct StandardEditorFactory;

impl EditorFactory for StandardEditorFactory {
    fn editor_for(&self, node: &PropertyNode) -> Option<EditorWidget> {
        match node.kind() {
            PropertyKind::Group => None,
            PropertyKind::ReadOnlyString => Some(EditorWidget::Label),
            PropertyKind::String => Some(EditorWidget::LineEdit),
            PropertyKind::Int => Some(EditorWidget::SpinBox),
            PropertyKind::Bool => Some(EditorWidget::CheckBox),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_notifies_only_on_change() {
        let tree = PropertyTree::new();
        let node = PropertyNode::int("x");
        let edits = Rc::new(RefCell::new(Vec::new()));
        let edits_inner = Rc::clone(&edits);
        let _sub = tree.value_edited().connect(move |(node, value)| {
            edits_inner
                .borrow_mut()
                .push((node.name().to_string(), value.clone()));
        });

        tree.set_value(&node, PropertyValue::Int(5));
        tree.set_value(&node, PropertyValue::Int(5));
        tree.set_value(&node, PropertyValue::Int(6));

        assert_eq!(
            *edits.borrow(),
            vec![
                ("x".to_string(), PropertyValue::Int(5)),
                ("x".to_string(), PropertyValue::Int(6)),
            ]
        );
        assert_eq!(node.value(), PropertyValue::Int(6));
    }

    #[test]
    fn test_group_children_and_lookup() {
        let group = PropertyNode::group("Custom");
        let a = PropertyNode::string("a");
        let b = PropertyNode::string("b");
        group.add_child(Rc::clone(&a));
        group.add_child(Rc::clone(&b));

        assert!(Rc::ptr_eq(&group.child_named("b").unwrap(), &b));
        assert!(group.child_named("c").is_none());

        group.remove_child(&a);
        assert_eq!(group.children().len(), 1);
        group.clear_children();
        assert!(group.children().is_empty());
    }

    #[test]
    fn test_read_only_string_starts_disabled() {
        let node = PropertyNode::read_only_string("name");
        assert!(!node.enabled());
        assert_eq!(node.kind(), PropertyKind::ReadOnlyString);
    }

    #[test]
    fn test_standard_editor_factory_mapping() {
        let factory = StandardEditorFactory;
        assert_eq!(factory.editor_for(&PropertyNode::group("g")), None);
        assert_eq!(
            factory.editor_for(&PropertyNode::read_only_string("name")),
            Some(EditorWidget::Label)
        );
        assert_eq!(
            factory.editor_for(&PropertyNode::string("s")),
            Some(EditorWidget::LineEdit)
        );
        assert_eq!(
            factory.editor_for(&PropertyNode::int("x")),
            Some(EditorWidget::SpinBox)
        );
        assert_eq!(
            factory.editor_for(&PropertyNode::bool("flipX")),
            Some(EditorWidget::CheckBox)
        );
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(PropertyValue::Empty.to_display_string(), "");
        assert_eq!(
            PropertyValue::String("hi".to_string()).to_display_string(),
            "hi"
        );
        assert_eq!(PropertyValue::Int(-3).to_display_string(), "-3");
        assert_eq!(PropertyValue::Bool(true).to_display_string(), "true");
    }
}
