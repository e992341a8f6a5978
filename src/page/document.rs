//! The page the doctors live on, seen only through the operations they need.

use bevy::math::{Rect, Vec2};
use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Class carried by every doctor `<img>` element.
pub const SPRITE_CLASS: &str = "plague-doctor-element";
/// Class present on a freshly created doctor element until its fade-in ends.
pub const SPRITE_INIT_CLASS: &str = "plague-doctor-element-init";
/// Class of the control UI (the cleanup button).
pub const CONTROL_CLASS: &str = "plague-doctor-control";
/// Elements with this class (or the [`IGNORE_ATTR`] attribute) are never wandered to.
pub const IGNORE_CLASS: &str = "plague-doctor-ignore";
pub const IGNORE_ATTR: &str = "data-plague-doctor-ignore";

/// Opaque, copyable reference to a page element. Holding one does not keep the
/// element alive; check [`PageDocument::contains`] / [`PageDocument::bounding_box`] before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u32);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Input arriving from the page since the last poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// A doctor element was clicked.
    SpriteClicked(ElementHandle),
    /// The cleanup control was pressed.
    CleanupRequested,
    /// Diagnostics were toggled from outside the app.
    DiagnosticsToggled(bool),
}

/// Geometry, style and attribute access to a document.
///
/// Coordinates are viewport pixels, y growing downward. Every mutating call on
/// a handle that no longer resolves is a silent no-op.
pub trait PageDocument: 'static {
    fn viewport(&self) -> Vec2;

    /// Creates a positioned doctor element of `size`, subscribed to clicks.
    fn create_sprite_element(&mut self, size: Vec2) -> ElementHandle;
    /// Detaches an element (and any listener the page attached for it).
    fn remove_element(&mut self, el: ElementHandle);
    fn contains(&self, el: ElementHandle) -> bool;
    fn is_body(&self, el: ElementHandle) -> bool;

    fn bounding_box(&self, el: ElementHandle) -> Option<Rect>;
    /// Topmost visible element under `point`.
    fn element_from_point(&mut self, point: Vec2) -> Option<ElementHandle>;

    fn style(&self, el: ElementHandle, property: &str) -> Option<String>;
    fn set_style(&mut self, el: ElementHandle, property: &str, value: &str);
    fn remove_style(&mut self, el: ElementHandle, property: &str);

    fn attribute(&self, el: ElementHandle, name: &str) -> Option<String>;
    fn set_attribute(&mut self, el: ElementHandle, name: &str, value: &str);
    fn remove_attribute(&mut self, el: ElementHandle, name: &str);

    fn has_class(&self, el: ElementHandle, class: &str) -> bool;
    fn add_class(&mut self, el: ElementHandle, class: &str);
    fn remove_class(&mut self, el: ElementHandle, class: &str);
    fn class_names(&self, el: ElementHandle) -> Vec<String>;
    fn elements_by_class(&mut self, class: &str) -> Vec<ElementHandle>;

    fn drain_events(&mut self) -> Vec<PageEvent>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Non-send resource wrapping the active page. Web pages hold JS handles, so all
/// page access stays on the main thread.
pub struct Page(Box<dyn PageDocument>);

impl Page {
    pub fn new(document: impl PageDocument) -> Self {
        Self(Box::new(document))
    }

    pub fn document_mut(&mut self) -> &mut dyn PageDocument {
        self.0.as_mut()
    }

    /// Concrete page access, mostly for tests and the native harness.
    pub fn downcast_ref<T: PageDocument>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: PageDocument>(&mut self) -> Option<&mut T> {
        self.0.as_any_mut().downcast_mut::<T>()
    }
}

impl Deref for Page {
    type Target = dyn PageDocument;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl DerefMut for Page {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}
