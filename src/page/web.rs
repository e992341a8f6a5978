//! Browser page backed by `web-sys`. Only built for wasm32.

use bevy::math::{Rect, Vec2};
use bevy::prelude::warn;
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use super::document::{
    ElementHandle, PageDocument, PageEvent, CONTROL_CLASS, SPRITE_CLASS, SPRITE_INIT_CLASS,
};
use super::handles::{ForeignNode, HandleRegistry};

impl ForeignNode for Element {
    fn same_node(&self, other: &Self) -> bool {
        self.is_same_node(Some(other.as_ref()))
    }

    fn connected(&self) -> bool {
        self.is_connected()
    }
}

/// Queue shared between DOM listeners (and the exported controls) and the app.
pub type EventQueue = Rc<RefCell<VecDeque<PageEvent>>>;

type Listener = Closure<dyn FnMut(web_sys::Event)>;

pub struct WebPage {
    window: Window,
    document: Document,
    body: ElementHandle,
    elements: HandleRegistry<Element>,
    // Dropped (and unregistered) together with the element they belong to.
    listeners: HashMap<ElementHandle, Listener>,
    events: EventQueue,
}

impl WebPage {
    /// Binds to the current document and adds the cleanup control button.
    pub fn attach(events: EventQueue) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let body: HtmlElement = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        let mut page = Self {
            window,
            document,
            body: ElementHandle(0),
            elements: HandleRegistry::default(),
            listeners: HashMap::new(),
            events,
        };
        page.body = page.adopt(body.into());
        page.elements.pin(page.body);
        page.add_control_button()?;
        Ok(page)
    }

    fn add_control_button(&mut self) -> Result<(), JsValue> {
        let button = self.document.create_element("button")?;
        button.set_text_content(Some("Clean up"));
        button.class_list().add_1(CONTROL_CLASS)?;
        let handle = self.adopt(button.clone());
        self.elements.pin(handle);
        let queue = self.events.clone();
        let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            queue.borrow_mut().push_back(PageEvent::CleanupRequested);
        });
        button.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
        self.listeners.insert(handle, listener);
        self.body_element()?.append_child(&button)?;
        Ok(())
    }

    fn body_element(&self) -> Result<&Element, JsValue> {
        self.elements
            .get(&self.body)
            .ok_or_else(|| JsValue::from_str("body handle lost"))
    }

    /// Returns the handle for `el`, allocating one on first sight. Handles of
    /// elements that left the document are forgotten along with their listeners.
    fn adopt(&mut self, el: Element) -> ElementHandle {
        for gone in self.elements.prune() {
            self.listeners.remove(&gone);
        }
        self.elements.adopt(el)
    }

    fn get(&self, el: ElementHandle) -> Option<&Element> {
        self.elements.get(el).filter(|e| e.is_connected())
    }

    fn html(&self, el: ElementHandle) -> Option<&HtmlElement> {
        self.get(el).and_then(|e| e.dyn_ref::<HtmlElement>())
    }
}

impl PageDocument for WebPage {
    fn viewport(&self) -> Vec2 {
        let w = self.window.inner_width().ok().and_then(|v| v.as_f64());
        let h = self.window.inner_height().ok().and_then(|v| v.as_f64());
        Vec2::new(w.unwrap_or(0.0) as f32, h.unwrap_or(0.0) as f32)
    }

    fn create_sprite_element(&mut self, size: Vec2) -> ElementHandle {
        let img = match self.document.create_element("img") {
            Ok(img) => img,
            Err(e) => {
                warn!(target: "page", "could not create doctor element: {e:?}");
                // An unattached handle: every later call on it no-ops.
                return self.elements.allocate();
            }
        };
        if let Err(e) = img.class_list().add_2(SPRITE_CLASS, SPRITE_INIT_CLASS) {
            warn!(target: "page", "could not class doctor element: {e:?}");
        }
        let handle = self.adopt(img.clone());
        if let Some(html) = img.dyn_ref::<HtmlElement>() {
            let style = html.style();
            for (property, value) in [
                ("position", "fixed".to_string()),
                ("width", format!("{}px", size.x)),
                ("height", format!("{}px", size.y)),
                ("z-index", "2147483000".to_string()),
            ] {
                if let Err(e) = style.set_property(property, &value) {
                    warn!(target: "page", "could not set {property} on doctor {handle}: {e:?}");
                }
            }
        }
        let queue = self.events.clone();
        let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            queue
                .borrow_mut()
                .push_back(PageEvent::SpriteClicked(handle));
        });
        match img.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref()) {
            Ok(()) => {
                self.listeners.insert(handle, listener);
            }
            Err(e) => warn!(target: "page", "doctor {handle} will not respond to clicks: {e:?}"),
        }
        let appended = self
            .body_element()
            .and_then(|body| body.append_child(&img));
        if let Err(e) = appended {
            warn!(target: "page", "could not attach doctor {handle} to the page: {e:?}");
        }
        handle
    }

    fn remove_element(&mut self, el: ElementHandle) {
        if el == self.body {
            return;
        }
        let Some(element) = self.elements.remove(el) else {
            return;
        };
        if let Some(listener) = self.listeners.remove(&el) {
            let _ = element
                .remove_event_listener_with_callback("click", listener.as_ref().unchecked_ref());
        }
        element.remove();
    }

    fn contains(&self, el: ElementHandle) -> bool {
        self.get(el).is_some()
    }

    fn is_body(&self, el: ElementHandle) -> bool {
        el == self.body
    }

    fn bounding_box(&self, el: ElementHandle) -> Option<Rect> {
        let r = self.get(el)?.get_bounding_client_rect();
        Some(Rect::new(
            r.x() as f32,
            r.y() as f32,
            (r.x() + r.width()) as f32,
            (r.y() + r.height()) as f32,
        ))
    }

    fn element_from_point(&mut self, point: Vec2) -> Option<ElementHandle> {
        let el = self.document.element_from_point(point.x, point.y)?;
        Some(self.adopt(el))
    }

    fn style(&self, el: ElementHandle, property: &str) -> Option<String> {
        let value = self.html(el)?.style().get_property_value(property).ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_style(&mut self, el: ElementHandle, property: &str, value: &str) {
        if let Some(html) = self.html(el) {
            let _ = html.style().set_property(property, value);
        }
    }

    fn remove_style(&mut self, el: ElementHandle, property: &str) {
        if let Some(html) = self.html(el) {
            let _ = html.style().remove_property(property);
        }
    }

    fn attribute(&self, el: ElementHandle, name: &str) -> Option<String> {
        self.get(el)?.get_attribute(name)
    }

    fn set_attribute(&mut self, el: ElementHandle, name: &str, value: &str) {
        if let Some(e) = self.get(el) {
            let _ = e.set_attribute(name, value);
        }
    }

    fn remove_attribute(&mut self, el: ElementHandle, name: &str) {
        if let Some(e) = self.get(el) {
            let _ = e.remove_attribute(name);
        }
    }

    fn has_class(&self, el: ElementHandle, class: &str) -> bool {
        self.get(el).is_some_and(|e| e.class_list().contains(class))
    }

    fn add_class(&mut self, el: ElementHandle, class: &str) {
        if let Some(e) = self.get(el) {
            let _ = e.class_list().add_1(class);
        }
    }

    fn remove_class(&mut self, el: ElementHandle, class: &str) {
        if let Some(e) = self.get(el) {
            let _ = e.class_list().remove_1(class);
        }
    }

    fn class_names(&self, el: ElementHandle) -> Vec<String> {
        self.get(el)
            .map(|e| e.class_name().split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn elements_by_class(&mut self, class: &str) -> Vec<ElementHandle> {
        let found = self.document.get_elements_by_class_name(class);
        let mut out = Vec::with_capacity(found.length() as usize);
        for i in 0..found.length() {
            if let Some(el) = found.item(i) {
                out.push(self.adopt(el));
            }
        }
        out
    }

    fn drain_events(&mut self) -> Vec<PageEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
