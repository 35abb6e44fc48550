//! Level object - the placeable object record
//!
//! A `LevelObject` is both a palette prototype and a placed instance. It is
//! handled through `Rc<LevelObject>` (identity is reference identity, there
//! is no id field) and uses interior mutability so that setters work through
//! a shared handle.
//!
//! Change discipline:
//! - every built-in setter compares first and notifies only on an actual
//!   change: one attribute-specific signal, then one generic `modified`
//! - `set_image` is the deliberate exception: it always resets the size to
//!   the image's dimensions and always fires `size_changed`/`modified`
//! - custom-property sets always notify, with no equals check
//!
//! `modified` is the single channel dirty-tracking layers subscribe to; it
//! fires exactly once per successful mutating call.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use image::RgbaImage;

use super::geometry::{PointF, SizeF};
use super::signal::Signal;

/// Derive a display name from a filename: the stem, without directory or
/// extension
pub fn name_from_filename(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(filename)
        .to_string()
}

#[derive(Default)]
struct ObjectSignals {
    name_changed: Signal<String>,
    position_changed: Signal<PointF>,
    will_change_size: Signal<SizeF>,
    size_changed: Signal<SizeF>,
    flip_x_changed: Signal<bool>,
    flip_y_changed: Signal<bool>,
    custom_property_changed: Signal<(String, String)>,
    modified: Signal<()>,
    destroyed: Signal<()>,
}

/// A placeable object: visual and positional attributes plus arbitrary
/// string-keyed custom properties
pub struct LevelObject {
    name: RefCell<String>,
    filename: RefCell<String>,
    /// Raster data shared between clones; replaced wholesale, never
    /// mutated in place
    image: RefCell<Option<Rc<RgbaImage>>>,
    position: Cell<PointF>,
    size: Cell<SizeF>,
    flip_x: Cell<bool>,
    flip_y: Cell<bool>,
    /// BTreeMap so iteration order is key order, not insertion order
    custom_properties: RefCell<BTreeMap<String, String>>,
    signals: ObjectSignals,
}

impl LevelObject {
    /// Create an empty object
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            name: RefCell::new(String::new()),
            filename: RefCell::new(String::new()),
            image: RefCell::new(None),
            position: Cell::new(PointF::default()),
            size: Cell::new(SizeF::default()),
            flip_x: Cell::new(false),
            flip_y: Cell::new(false),
            custom_properties: RefCell::new(BTreeMap::new()),
            signals: ObjectSignals::default(),
        })
    }

    /// Value copy of every field into a fresh object with zero subscribers
    ///
    /// The image buffer is shared (it is only ever replaced, never edited
    /// in place), so the copy is cheap. Mutating either object afterward
    /// does not affect the other. The caller owns the returned handle.
    pub fn clone_object(&self) -> Rc<Self> {
        Rc::new(Self {
            name: RefCell::new(self.name.borrow().clone()),
            filename: RefCell::new(self.filename.borrow().clone()),
            image: RefCell::new(self.image.borrow().clone()),
            position: Cell::new(self.position.get()),
            size: Cell::new(self.size.get()),
            flip_x: Cell::new(self.flip_x.get()),
            flip_y: Cell::new(self.flip_y.get()),
            custom_properties: RefCell::new(self.custom_properties.borrow().clone()),
            signals: ObjectSignals::default(),
        })
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        if *self.name.borrow() == name {
            return;
        }
        *self.name.borrow_mut() = name.clone();
        self.signals.name_changed.emit(&name);
        self.notify_modified();
    }

    pub fn filename(&self) -> String {
        self.filename.borrow().clone()
    }

    /// Store the source filename; if no name has been set yet, the name
    /// defaults to the filename stem. Fires no notifications.
    pub fn set_filename(&self, filename: impl Into<String>) {
        let filename = filename.into();
        let default_name = name_from_filename(&filename);
        *self.filename.borrow_mut() = filename;
        if self.name.borrow().is_empty() {
            *self.name.borrow_mut() = default_name;
        }
    }

    /// Current raster data, if any
    pub fn image(&self) -> Option<Rc<RgbaImage>> {
        self.image.borrow().clone()
    }

    /// Replace the image and reset the size to the image's dimensions
    ///
    /// Unlike the other setters, this always notifies: `size_changed` and
    /// `modified` fire even when the new size is numerically identical to
    /// the old one.
    pub fn set_image(&self, image: RgbaImage) {
        let size = SizeF::new(f64::from(image.width()), f64::from(image.height()));
        *self.image.borrow_mut() = Some(Rc::new(image));
        self.size.set(size);
        self.signals.size_changed.emit(&size);
        self.notify_modified();
    }

    pub fn position(&self) -> PointF {
        self.position.get()
    }

    pub fn x(&self) -> f64 {
        self.position.get().x
    }

    pub fn y(&self) -> f64 {
        self.position.get().y
    }

    pub fn set_position(&self, position: PointF) {
        if self.position.get() == position {
            return;
        }
        self.position.set(position);
        self.signals.position_changed.emit(&position);
        self.notify_modified();
    }

    pub fn set_x(&self, x: f64) {
        let mut position = self.position.get();
        if position.x == x {
            return;
        }
        position.x = x;
        self.position.set(position);
        self.signals.position_changed.emit(&position);
        self.notify_modified();
    }

    pub fn set_y(&self, y: f64) {
        let mut position = self.position.get();
        if position.y == y {
            return;
        }
        position.y = y;
        self.position.set(position);
        self.signals.position_changed.emit(&position);
        self.notify_modified();
    }

    pub fn size(&self) -> SizeF {
        self.size.get()
    }

    /// Override the size. `will_change_size` carries the new size and fires
    /// before the value is stored, so dependents can still read the old one.
    pub fn set_size(&self, size: SizeF) {
        if self.size.get() == size {
            return;
        }
        self.signals.will_change_size.emit(&size);
        self.size.set(size);
        self.signals.size_changed.emit(&size);
        self.notify_modified();
    }

    pub fn set_width(&self, width: f64) {
        let size = self.size.get();
        self.set_size(SizeF::new(width, size.height));
    }

    pub fn set_height(&self, height: f64) {
        let size = self.size.get();
        self.set_size(SizeF::new(size.width, height));
    }

    pub fn flip_x(&self) -> bool {
        self.flip_x.get()
    }

    pub fn set_flip_x(&self, flip_x: bool) {
        if self.flip_x.get() == flip_x {
            return;
        }
        self.flip_x.set(flip_x);
        self.signals.flip_x_changed.emit(&flip_x);
        self.notify_modified();
    }

    pub fn flip_y(&self) -> bool {
        self.flip_y.get()
    }

    pub fn set_flip_y(&self, flip_y: bool) {
        if self.flip_y.get() == flip_y {
            return;
        }
        self.flip_y.set(flip_y);
        self.signals.flip_y_changed.emit(&flip_y);
        self.notify_modified();
    }

    /// Look up a custom property; absence is not an error
    pub fn custom_property(&self, key: &str) -> Option<String> {
        self.custom_properties.borrow().get(key).cloned()
    }

    /// Set a custom property
    ///
    /// Always fires `custom_property_changed` and `modified`, even when the
    /// value is unchanged. This deliberately differs from the built-in
    /// setters' compare-then-notify discipline.
    pub fn set_custom_property(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.custom_properties
            .borrow_mut()
            .insert(key.clone(), value.clone());
        self.signals.custom_property_changed.emit(&(key, value));
        self.notify_modified();
    }

    /// Remove a custom property; a silent no-op for absent keys
    pub fn reset_custom_property(&self, key: &str) {
        self.custom_properties.borrow_mut().remove(key);
    }

    /// Snapshot of all custom properties, in key order
    pub fn custom_properties(&self) -> BTreeMap<String, String> {
        self.custom_properties.borrow().clone()
    }

    pub fn name_changed(&self) -> &Signal<String> {
        &self.signals.name_changed
    }

    pub fn position_changed(&self) -> &Signal<PointF> {
        &self.signals.position_changed
    }

    /// Fires with the new size before a `set_size` takes effect
    pub fn will_change_size(&self) -> &Signal<SizeF> {
        &self.signals.will_change_size
    }

    pub fn size_changed(&self) -> &Signal<SizeF> {
        &self.signals.size_changed
    }

    pub fn flip_x_changed(&self) -> &Signal<bool> {
        &self.signals.flip_x_changed
    }

    pub fn flip_y_changed(&self) -> &Signal<bool> {
        &self.signals.flip_y_changed
    }

    /// Fires with (key, value) on every custom-property set
    pub fn custom_property_changed(&self) -> &Signal<(String, String)> {
        &self.signals.custom_property_changed
    }

    /// The one generic channel for dirty tracking: fires once per
    /// successful mutating call
    pub fn modified(&self) -> &Signal<()> {
        &self.signals.modified
    }

    /// Fires when the owner drops the last handle to this object
    pub fn destroyed(&self) -> &Signal<()> {
        &self.signals.destroyed
    }

    fn notify_modified(&self) {
        self.signals.modified.emit(&());
    }
}

impl Drop for LevelObject {
    fn drop(&mut self) {
        self.signals.destroyed.emit(&());
    }
}

impl fmt::Debug for LevelObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelObject")
            .field("name", &*self.name.borrow())
            .field("filename", &*self.filename.borrow())
            .field("position", &self.position.get())
            .field("size", &self.size.get())
            .field("flip_x", &self.flip_x.get())
            .field("flip_y", &self.flip_y.get())
            .field("custom_properties", &*self.custom_properties.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counters {
        specific: Rc<Cell<usize>>,
        modified: Rc<Cell<usize>>,
    }

    fn counted(count: &Rc<Cell<usize>>) -> impl Fn() + 'static {
        let count = Rc::clone(count);
        move || count.set(count.get() + 1)
    }

    fn watch_position(object: &LevelObject) -> (Counters, Vec<crate::data::Subscription>) {
        let counters = Counters {
            specific: Rc::new(Cell::new(0)),
            modified: Rc::new(Cell::new(0)),
        };
        let bump_specific = counted(&counters.specific);
        let bump_modified = counted(&counters.modified);
        let subs = vec![
            object.position_changed().connect(move |_| bump_specific()),
            object.modified().connect(move |_| bump_modified()),
        ];
        (counters, subs)
    }

    #[test]
    fn test_setter_with_unchanged_value_is_silent() {
        let object = LevelObject::new();
        object.set_position(PointF::new(5.0, 6.0));

        let (counters, _subs) = watch_position(&object);
        object.set_position(PointF::new(5.0, 6.0));
        object.set_x(5.0);
        object.set_y(6.0);

        assert_eq!(counters.specific.get(), 0);
        assert_eq!(counters.modified.get(), 0);
    }

    #[test]
    fn test_setter_with_changed_value_fires_once_each() {
        let object = LevelObject::new();
        let (counters, _subs) = watch_position(&object);

        object.set_position(PointF::new(1.0, 2.0));
        assert_eq!(counters.specific.get(), 1);
        assert_eq!(counters.modified.get(), 1);

        object.set_x(9.0);
        assert_eq!(counters.specific.get(), 2);
        assert_eq!(counters.modified.get(), 2);
    }

    #[test]
    fn test_name_and_flip_setters_notify_on_change_only() {
        let object = LevelObject::new();
        let names = Rc::new(RefCell::new(Vec::new()));
        let names_inner = Rc::clone(&names);
        let _sub = object
            .name_changed()
            .connect(move |name| names_inner.borrow_mut().push(name.clone()));
        let flips = Rc::new(Cell::new(0));
        let bump = counted(&flips);
        let _flip_sub = object.flip_x_changed().connect(move |_| bump());

        object.set_name("tree");
        object.set_name("tree");
        object.set_flip_x(true);
        object.set_flip_x(true);

        assert_eq!(*names.borrow(), vec!["tree".to_string()]);
        assert_eq!(flips.get(), 1);
    }

    #[test]
    fn test_will_change_size_carries_new_size_while_old_is_live() {
        let object = LevelObject::new();
        object.set_size(SizeF::new(10.0, 10.0));

        let observed = Rc::new(RefCell::new(None));
        let observed_inner = Rc::clone(&observed);
        let object_inner = Rc::downgrade(&object);
        let _sub = object.will_change_size().connect(move |new_size| {
            let object = object_inner.upgrade().unwrap();
            // Old size still readable while the new one is announced
            *observed_inner.borrow_mut() = Some((object.size(), *new_size));
        });

        object.set_size(SizeF::new(20.0, 30.0));
        assert_eq!(
            *observed.borrow(),
            Some((SizeF::new(10.0, 10.0), SizeF::new(20.0, 30.0)))
        );
    }

    #[test]
    fn test_set_image_resets_size_and_always_notifies() {
        let object = LevelObject::new();
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let sizes_inner = Rc::clone(&sizes);
        let _sub = object
            .size_changed()
            .connect(move |size| sizes_inner.borrow_mut().push(*size));
        let modified = Rc::new(Cell::new(0));
        let bump = counted(&modified);
        let _modified_sub = object.modified().connect(move |_| bump());

        object.set_image(RgbaImage::new(8, 4));
        // Same dimensions again: still notifies
        object.set_image(RgbaImage::new(8, 4));

        assert_eq!(
            *sizes.borrow(),
            vec![SizeF::new(8.0, 4.0), SizeF::new(8.0, 4.0)]
        );
        assert_eq!(modified.get(), 2);
        assert_eq!(object.size(), SizeF::new(8.0, 4.0));
    }

    #[test]
    fn test_custom_property_set_always_notifies() {
        let object = LevelObject::new();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let changes_inner = Rc::clone(&changes);
        let _sub = object
            .custom_property_changed()
            .connect(move |change| changes_inner.borrow_mut().push(change.clone()));
        let modified = Rc::new(Cell::new(0));
        let bump = counted(&modified);
        let _modified_sub = object.modified().connect(move |_| bump());

        object.set_custom_property("hp", "10");
        object.set_custom_property("hp", "10");

        assert_eq!(changes.borrow().len(), 2);
        assert_eq!(modified.get(), 2);
        assert_eq!(object.custom_property("hp").as_deref(), Some("10"));
    }

    #[test]
    fn test_custom_property_absence_is_neutral() {
        let object = LevelObject::new();
        assert_eq!(object.custom_property("missing"), None);

        let modified = Rc::new(Cell::new(0));
        let bump = counted(&modified);
        let _sub = object.modified().connect(move |_| bump());
        object.reset_custom_property("missing");
        assert_eq!(modified.get(), 0);
    }

    #[test]
    fn test_custom_properties_iterate_in_key_order() {
        let object = LevelObject::new();
        object.set_custom_property("zeta", "1");
        object.set_custom_property("alpha", "2");
        object.set_custom_property("mid", "3");

        let keys: Vec<_> = object.custom_properties().into_keys().collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_filename_defaults_name_from_stem() {
        let object = LevelObject::new();
        object.set_filename("assets/images/crate_big.png");
        assert_eq!(object.name(), "crate_big");
        assert_eq!(object.filename(), "assets/images/crate_big.png");

        // An explicit name is never overwritten
        let named = LevelObject::new();
        named.set_name("Barrel");
        named.set_filename("assets/images/barrel.png");
        assert_eq!(named.name(), "Barrel");
    }

    #[test]
    fn test_clone_copies_values_and_has_no_subscribers() {
        let object = LevelObject::new();
        object.set_name("rock");
        object.set_filename("rock.png");
        object.set_image(RgbaImage::new(16, 16));
        object.set_position(PointF::new(3.0, 4.0));
        object.set_flip_x(true);
        object.set_custom_property("solid", "yes");
        let _sub = object.modified().connect(|_| {});

        let copy = object.clone_object();
        assert_eq!(copy.name(), "rock");
        assert_eq!(copy.filename(), "rock.png");
        assert_eq!(copy.position(), PointF::new(3.0, 4.0));
        assert_eq!(copy.size(), SizeF::new(16.0, 16.0));
        assert!(copy.flip_x());
        assert_eq!(copy.custom_property("solid").as_deref(), Some("yes"));
        assert_eq!(copy.modified().subscriber_count(), 0);

        // Post-clone mutations do not leak across
        copy.set_position(PointF::new(9.0, 9.0));
        object.set_custom_property("solid", "no");
        assert_eq!(object.position(), PointF::new(3.0, 4.0));
        assert_eq!(copy.custom_property("solid").as_deref(), Some("yes"));
    }

    #[test]
    fn test_destroyed_fires_when_owner_drops_last_handle() {
        let object = LevelObject::new();
        let dropped = Rc::new(Cell::new(false));
        let dropped_inner = Rc::clone(&dropped);
        let _sub = object.destroyed().connect(move |_| dropped_inner.set(true));

        drop(object);
        assert!(dropped.get());
    }

    #[test]
    fn test_reentrant_subscriber_is_well_defined() {
        let object = LevelObject::new();
        // A subscriber that calls back into the same object mid-notification
        let weak = Rc::downgrade(&object);
        let _sub = object.position_changed().connect(move |position| {
            if let Some(object) = weak.upgrade() {
                if position.x < 0.0 {
                    object.set_x(0.0);
                }
            }
        });

        object.set_position(PointF::new(-5.0, 2.0));
        assert_eq!(object.position(), PointF::new(0.0, 2.0));
    }
}
