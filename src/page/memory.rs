//! In-memory page model: a flat list of boxes stacked in creation order.
//! Used by the native harness and by tests.

use bevy::math::{Rect, Vec2};
use serde::Serialize;
use std::any::Any;
use std::collections::{BTreeMap, VecDeque};

use super::document::{ElementHandle, PageDocument, PageEvent, SPRITE_CLASS, SPRITE_INIT_CLASS};

#[derive(Debug, Clone, Default)]
struct MemoryElement {
    name: String,
    rect: Rect,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
}

impl MemoryElement {
    fn hidden(&self) -> bool {
        self.styles.get("display").is_some_and(|d| d == "none")
    }
}

/// Serializable view of one element, for harness output.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ElementSnapshot {
    pub handle: u32,
    pub name: String,
    pub rect: [f32; 4],
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct MemoryPage {
    viewport: Vec2,
    body: ElementHandle,
    // Handles are allocated in increasing order, so key order is paint order.
    elements: BTreeMap<ElementHandle, MemoryElement>,
    next_handle: u32,
    events: VecDeque<PageEvent>,
}

impl MemoryPage {
    /// An empty page: just a body covering the viewport.
    pub fn new(viewport: Vec2) -> Self {
        let body = ElementHandle(0);
        let mut elements = BTreeMap::new();
        elements.insert(
            body,
            MemoryElement {
                name: "body".into(),
                rect: Rect::from_corners(Vec2::ZERO, viewport),
                ..Default::default()
            },
        );
        Self {
            viewport,
            body,
            elements,
            next_handle: 1,
            events: VecDeque::new(),
        }
    }

    pub fn body(&self) -> ElementHandle {
        self.body
    }

    /// Appends a box on top of everything created so far.
    pub fn add_element(&mut self, name: &str, rect: Rect, classes: &[&str]) -> ElementHandle {
        let handle = ElementHandle(self.next_handle);
        self.next_handle += 1;
        self.elements.insert(
            handle,
            MemoryElement {
                name: name.to_string(),
                rect,
                classes: classes.iter().map(|c| c.to_string()).collect(),
                ..Default::default()
            },
        );
        handle
    }

    /// First element with the given layout name.
    pub fn find(&self, name: &str) -> Option<ElementHandle> {
        self.elements
            .iter()
            .find(|(_, e)| e.name == name)
            .map(|(h, _)| *h)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Queues a click on `el`; only doctor elements produce an event.
    pub fn click(&mut self, el: ElementHandle) {
        if self.has_class(el, SPRITE_CLASS) {
            self.events.push_back(PageEvent::SpriteClicked(el));
        }
    }

    pub fn request_cleanup(&mut self) {
        self.events.push_back(PageEvent::CleanupRequested);
    }

    pub fn toggle_diagnostics(&mut self, enabled: bool) {
        self.events
            .push_back(PageEvent::DiagnosticsToggled(enabled));
    }

    /// Elements other than the body and the doctors themselves.
    pub fn snapshot(&self) -> Vec<ElementSnapshot> {
        self.elements
            .iter()
            .filter(|(h, e)| **h != self.body && !e.classes.iter().any(|c| c == SPRITE_CLASS))
            .map(|(h, e)| ElementSnapshot {
                handle: h.0,
                name: e.name.clone(),
                rect: [e.rect.min.x, e.rect.min.y, e.rect.width(), e.rect.height()],
                classes: e.classes.clone(),
                attributes: e.attributes.clone(),
                styles: e.styles.clone(),
            })
            .collect()
    }

    fn parse_px(value: &str) -> Option<f32> {
        value.trim().trim_end_matches("px").trim().parse().ok()
    }
}

impl PageDocument for MemoryPage {
    fn viewport(&self) -> Vec2 {
        self.viewport
    }

    fn create_sprite_element(&mut self, size: Vec2) -> ElementHandle {
        let handle = self.add_element(
            "plague-doctor",
            Rect::from_corners(Vec2::ZERO, size),
            &[SPRITE_CLASS, SPRITE_INIT_CLASS],
        );
        if let Some(e) = self.elements.get_mut(&handle) {
            e.styles.insert("position".into(), "fixed".into());
        }
        handle
    }

    fn remove_element(&mut self, el: ElementHandle) {
        if el != self.body {
            self.elements.remove(&el);
        }
    }

    fn contains(&self, el: ElementHandle) -> bool {
        self.elements.contains_key(&el)
    }

    fn is_body(&self, el: ElementHandle) -> bool {
        el == self.body
    }

    fn bounding_box(&self, el: ElementHandle) -> Option<Rect> {
        let e = self.elements.get(&el)?;
        if e.hidden() {
            // display:none collapses the box, as in a browser.
            return Some(Rect::default());
        }
        Some(e.rect)
    }

    fn element_from_point(&mut self, point: Vec2) -> Option<ElementHandle> {
        self.elements
            .iter()
            .rev()
            .find(|(_, e)| !e.hidden() && e.rect.contains(point))
            .map(|(h, _)| *h)
    }

    fn style(&self, el: ElementHandle, property: &str) -> Option<String> {
        self.elements.get(&el)?.styles.get(property).cloned()
    }

    fn set_style(&mut self, el: ElementHandle, property: &str, value: &str) {
        let Some(e) = self.elements.get_mut(&el) else {
            return;
        };
        // Positioned elements follow their left/top styles.
        match (property, Self::parse_px(value)) {
            ("left", Some(x)) => {
                let w = e.rect.width();
                e.rect.min.x = x;
                e.rect.max.x = x + w;
            }
            ("top", Some(y)) => {
                let h = e.rect.height();
                e.rect.min.y = y;
                e.rect.max.y = y + h;
            }
            _ => {}
        }
        e.styles.insert(property.to_string(), value.to_string());
    }

    fn remove_style(&mut self, el: ElementHandle, property: &str) {
        if let Some(e) = self.elements.get_mut(&el) {
            e.styles.remove(property);
        }
    }

    fn attribute(&self, el: ElementHandle, name: &str) -> Option<String> {
        self.elements.get(&el)?.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, el: ElementHandle, name: &str, value: &str) {
        if let Some(e) = self.elements.get_mut(&el) {
            e.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, el: ElementHandle, name: &str) {
        if let Some(e) = self.elements.get_mut(&el) {
            e.attributes.remove(name);
        }
    }

    fn has_class(&self, el: ElementHandle, class: &str) -> bool {
        self.elements
            .get(&el)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, el: ElementHandle, class: &str) {
        if let Some(e) = self.elements.get_mut(&el) {
            if !e.classes.iter().any(|c| c == class) {
                e.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, el: ElementHandle, class: &str) {
        if let Some(e) = self.elements.get_mut(&el) {
            e.classes.retain(|c| c != class);
        }
    }

    fn class_names(&self, el: ElementHandle) -> Vec<String> {
        self.elements
            .get(&el)
            .map(|e| e.classes.clone())
            .unwrap_or_default()
    }

    fn elements_by_class(&mut self, class: &str) -> Vec<ElementHandle> {
        self.elements
            .iter()
            .filter(|(_, e)| e.classes.iter().any(|c| c == class))
            .map(|(h, _)| *h)
            .collect()
    }

    fn drain_events(&mut self) -> Vec<PageEvent> {
        self.events.drain(..).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (MemoryPage, ElementHandle, ElementHandle) {
        let mut page = MemoryPage::new(Vec2::new(800.0, 600.0));
        let header = page.add_element("header", Rect::new(0.0, 0.0, 800.0, 100.0), &["header"]);
        let button = page.add_element("button", Rect::new(10.0, 10.0, 110.0, 40.0), &["btn"]);
        (page, header, button)
    }

    #[test]
    fn hit_testing_prefers_topmost() {
        let (mut page, header, button) = page();
        assert_eq!(page.element_from_point(Vec2::new(20.0, 20.0)), Some(button));
        assert_eq!(page.element_from_point(Vec2::new(500.0, 50.0)), Some(header));
        assert_eq!(page.element_from_point(Vec2::new(500.0, 500.0)), Some(page.body()));
        assert_eq!(page.element_from_point(Vec2::new(900.0, 900.0)), None);
    }

    #[test]
    fn hidden_elements_are_not_hit_and_collapse() {
        let (mut page, header, button) = page();
        page.set_style(button, "display", "none");
        assert_eq!(page.element_from_point(Vec2::new(20.0, 20.0)), Some(header));
        assert_eq!(page.bounding_box(button), Some(Rect::default()));
    }

    #[test]
    fn sprite_follows_left_top() {
        let mut page = MemoryPage::new(Vec2::new(800.0, 600.0));
        let sprite = page.create_sprite_element(Vec2::new(64.0, 64.0));
        page.set_style(sprite, "left", "100px");
        page.set_style(sprite, "top", "50.5px");
        assert_eq!(
            page.bounding_box(sprite),
            Some(Rect::new(100.0, 50.5, 164.0, 114.5))
        );
        assert!(page.has_class(sprite, SPRITE_CLASS));
    }

    #[test]
    fn clicks_only_register_on_sprites() {
        let (mut page, header, _) = page();
        let sprite = page.create_sprite_element(Vec2::splat(32.0));
        page.click(header);
        page.click(sprite);
        page.request_cleanup();
        assert_eq!(
            page.drain_events(),
            vec![PageEvent::SpriteClicked(sprite), PageEvent::CleanupRequested]
        );
        assert!(page.drain_events().is_empty());
    }

    #[test]
    fn removed_elements_ignore_mutation() {
        let (mut page, header, _) = page();
        page.remove_element(header);
        page.set_attribute(header, "data-x", "1");
        page.add_class(header, "x");
        assert!(!page.contains(header));
        assert_eq!(page.attribute(header, "data-x"), None);
        assert!(page.bounding_box(header).is_none());
        // the body can never be removed
        let body = page.body();
        page.remove_element(body);
        assert!(page.contains(body));
    }

    #[test]
    fn snapshot_skips_body_and_sprites() {
        let (mut page, header, _) = page();
        page.create_sprite_element(Vec2::splat(32.0));
        page.add_class(header, "plague-doctor-whacked");
        let snap = page.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].name, "header");
        assert!(snap[0].classes.contains(&"plague-doctor-whacked".to_string()));
    }
}
