//! Property browser - keeps one level object and the property tree in sync
//!
//! Binds to at most one `LevelObject` at a time. The Standard group with
//! its {name, x, y, flipX, flipY} nodes is permanent; the Custom group's
//! children mirror the bound object's custom properties and are torn down
//! and rebuilt on every rebind (the simple strategy - UI-local state such
//! as focus or scroll position is intentionally lost).
//!
//! Known one-directional gap, kept on purpose: a custom property added to
//! the object programmatically after binding gets no node until the next
//! rebind, so its change notifications are dropped by the name scan.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::data::{LevelObject, PointF, Signal, Subscription};

use super::property_tree::{PropertyNode, PropertyTree, PropertyValue};

/// Mediator between a generic property tree and one bound level object
pub struct PropertyBrowser {
    tree: Rc<PropertyTree>,
    standard_group: Rc<PropertyNode>,
    custom_group: Rc<PropertyNode>,
    name_node: Rc<PropertyNode>,
    x_node: Rc<PropertyNode>,
    y_node: Rc<PropertyNode>,
    flip_x_node: Rc<PropertyNode>,
    flip_y_node: Rc<PropertyNode>,
    /// Non-owning: the object's owner decides its lifetime
    level_object: RefCell<Weak<LevelObject>>,
    /// Everything connected for the current binding; released as a unit on
    /// rebind/unbind, never by wildcard
    subscriptions: RefCell<Vec<Subscription>>,
    has_level_object: Signal<bool>,
    /// Constructor-time tree subscription; outlives every binding
    _edit_subscription: Subscription,
}

impl PropertyBrowser {
    pub fn new(tree: Rc<PropertyTree>) -> Rc<Self> {
        let standard_group = PropertyNode::group("Standard");

        let name_node = PropertyNode::read_only_string("name");
        name_node.set_tooltip("Object name");
        standard_group.add_child(Rc::clone(&name_node));

        let x_node = PropertyNode::int("x");
        x_node.set_tooltip("X coordinate");
        standard_group.add_child(Rc::clone(&x_node));

        let y_node = PropertyNode::int("y");
        y_node.set_tooltip("Y coordinate");
        standard_group.add_child(Rc::clone(&y_node));

        let flip_x_node = PropertyNode::bool("flipX");
        flip_x_node.set_tooltip("Flips the object horizontally");
        standard_group.add_child(Rc::clone(&flip_x_node));

        let flip_y_node = PropertyNode::bool("flipY");
        flip_y_node.set_tooltip("Flips the object vertically");
        standard_group.add_child(Rc::clone(&flip_y_node));

        let custom_group = PropertyNode::group("Custom");

        Rc::new_cyclic(|weak: &Weak<Self>| {
            let edit_subscription = {
                let weak = weak.clone();
                tree.value_edited().connect(move |(node, value)| {
                    if let Some(browser) = weak.upgrade() {
                        browser.apply_edit(node, value);
                    }
                })
            };
            Self {
                tree,
                standard_group,
                custom_group,
                name_node,
                x_node,
                y_node,
                flip_x_node,
                flip_y_node,
                level_object: RefCell::new(Weak::new()),
                subscriptions: RefCell::new(Vec::new()),
                has_level_object: Signal::new(),
                _edit_subscription: edit_subscription,
            }
        })
    }

    pub fn tree(&self) -> &Rc<PropertyTree> {
        &self.tree
    }

    /// The currently bound object, if it is still alive
    pub fn level_object(&self) -> Option<Rc<LevelObject>> {
        self.level_object.borrow().upgrade()
    }

    /// Fires with whether a bind produced an object; the external
    /// "add property" action enables itself on this
    pub fn has_level_object(&self) -> &Signal<bool> {
        &self.has_level_object
    }

    /// Bind to `object`, or to nothing
    ///
    /// Releases the previous binding's subscriptions first, rebuilds the
    /// Custom group from the object's properties (in key order), and for
    /// each node subscribes to the matching object signal before priming
    /// the displayed value, so a notification firing between read and
    /// subscribe cannot be missed. The object's destruction is bound as an
    /// implicit unbind.
    pub fn set_level_object(self: &Rc<Self>, object: Option<&Rc<LevelObject>>) {
        for subscription in self.subscriptions.borrow_mut().drain(..) {
            subscription.disconnect();
        }

        *self.level_object.borrow_mut() = object.map_or_else(Weak::new, Rc::downgrade);

        self.tree.clear_roots();
        // Custom nodes are recreated per object
        self.custom_group.clear_children();

        if let Some(object) = object {
            self.connect_to(object);
        }

        self.has_level_object.emit(&object.is_some());
    }

    /// Equivalent to binding nothing; leaves the tree empty
    pub fn reset_level_object(self: &Rc<Self>) {
        self.set_level_object(None);
    }

    /// Accepted output of the external key/value prompt
    ///
    /// Creates the node first, then pushes the value through the tree,
    /// which dispatches it into the object. The object re-firing the
    /// already-reflected value is idempotent.
    pub fn add_custom_property(&self, key: &str, value: &str) {
        if self.level_object().is_none() {
            return;
        }
        let node = PropertyNode::string(key);
        self.custom_group.add_child(Rc::clone(&node));
        self.tree
            .set_value(&node, PropertyValue::String(value.to_string()));
    }

    fn connect_to(self: &Rc<Self>, object: &Rc<LevelObject>) {
        self.tree.add_root(Rc::clone(&self.standard_group));
        self.tree.add_root(Rc::clone(&self.custom_group));

        let properties = object.custom_properties();
        for key in properties.keys() {
            self.custom_group.add_child(PropertyNode::string(key));
        }

        let mut subscriptions = Vec::new();

        subscriptions.push(object.name_changed().connect({
            let tree = Rc::clone(&self.tree);
            let node = Rc::clone(&self.name_node);
            move |name: &String| tree.set_value(&node, PropertyValue::String(name.clone()))
        }));
        self.tree
            .set_value(&self.name_node, PropertyValue::String(object.name()));

        subscriptions.push(object.position_changed().connect({
            let tree = Rc::clone(&self.tree);
            let x_node = Rc::clone(&self.x_node);
            let y_node = Rc::clone(&self.y_node);
            move |position: &PointF| {
                tree.set_value(&x_node, PropertyValue::Int(position.x as i64));
                tree.set_value(&y_node, PropertyValue::Int(position.y as i64));
            }
        }));
        let position = object.position();
        self.tree
            .set_value(&self.x_node, PropertyValue::Int(position.x as i64));
        self.tree
            .set_value(&self.y_node, PropertyValue::Int(position.y as i64));

        subscriptions.push(object.flip_x_changed().connect({
            let tree = Rc::clone(&self.tree);
            let node = Rc::clone(&self.flip_x_node);
            move |flip: &bool| tree.set_value(&node, PropertyValue::Bool(*flip))
        }));
        self.tree
            .set_value(&self.flip_x_node, PropertyValue::Bool(object.flip_x()));

        subscriptions.push(object.flip_y_changed().connect({
            let tree = Rc::clone(&self.tree);
            let node = Rc::clone(&self.flip_y_node);
            move |flip: &bool| tree.set_value(&node, PropertyValue::Bool(*flip))
        }));
        self.tree
            .set_value(&self.flip_y_node, PropertyValue::Bool(object.flip_y()));

        subscriptions.push(object.custom_property_changed().connect({
            let tree = Rc::clone(&self.tree);
            let custom_group = Rc::clone(&self.custom_group);
            move |change: &(String, String)| {
                let (key, value) = change;
                // Properties added after binding have no node here; their
                // updates are dropped until the next bind
                for node in custom_group.children() {
                    if node.name() == key {
                        tree.set_value(&node, PropertyValue::String(value.clone()));
                    }
                }
            }
        }));
        for (key, value) in &properties {
            if let Some(node) = self.custom_group.child_named(key) {
                self.tree
                    .set_value(&node, PropertyValue::String(value.clone()));
            }
        }

        subscriptions.push(object.destroyed().connect({
            let weak = Rc::downgrade(self);
            move |_| {
                if let Some(browser) = weak.upgrade() {
                    browser.reset_level_object();
                }
            }
        }));

        *self.subscriptions.borrow_mut() = subscriptions;
    }

    fn apply_edit(&self, node: &Rc<PropertyNode>, value: &PropertyValue) {
        let Some(object) = self.level_object() else {
            return;
        };

        if self.is_custom_node(node) {
            // Unconditionally: the object's custom setter has no equals check
            object.set_custom_property(node.name(), value.to_display_string());
            return;
        }

        match node.name() {
            "x" => {
                if let Some(x) = value.as_int() {
                    object.set_x(x as f64);
                }
            }
            "y" => {
                if let Some(y) = value.as_int() {
                    object.set_y(y as f64);
                }
            }
            "flipX" => {
                if let Some(flip) = value.as_bool() {
                    object.set_flip_x(flip);
                }
            }
            "flipY" => {
                if let Some(flip) = value.as_bool() {
                    object.set_flip_y(flip);
                }
            }
            // The read-only name node and anything else outside the table
            _ => {}
        }
    }

    fn is_custom_node(&self, node: &Rc<PropertyNode>) -> bool {
        self.custom_group
            .children()
            .iter()
            .any(|child| Rc::ptr_eq(child, node))
    }
}
