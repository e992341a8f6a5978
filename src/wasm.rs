//! Browser entry points.

use bevy::log::LogPlugin;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

use crate::app::game::headless_app;
use crate::core::config::DoctorsConfig;
use crate::gameplay::manager::DoctorManagerExt;
use crate::page::document::PageEvent;
use crate::page::web::{EventQueue, WebPage};

thread_local! {
    // Set once by `initialize`; the exported controls feed the running app through it.
    static CONTROLS: RefCell<Option<EventQueue>> = const { RefCell::new(None) };
}

/// Starts the doctors on the current document: `count` doctors ticking at
/// `speed` times the base heartbeat, plus a cleanup button.
#[wasm_bindgen]
pub fn initialize(count: u32, speed: f32) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if CONTROLS.with(|c| c.borrow().is_some()) {
        return Err(JsValue::from_str("plague doctors already initialized"));
    }
    let cfg = DoctorsConfig::embedded().map_err(|e| JsValue::from_str(&e))?;
    let events = EventQueue::default();
    let page = WebPage::attach(events.clone())?;
    CONTROLS.with(|c| *c.borrow_mut() = Some(events));

    let mut app = headless_app(cfg, page);
    app.add_plugins(LogPlugin::default());
    app.world_mut().spawn_doctors(count as usize, speed);
    app.run();
    Ok(())
}

/// Sends every doctor off to undo its work; each dies when nothing is left.
#[wasm_bindgen]
pub fn begin_cleanup() -> Result<(), JsValue> {
    push(PageEvent::CleanupRequested)
}

/// Turns per-doctor status logging on or off.
#[wasm_bindgen]
pub fn set_diagnostics(enabled: bool) -> Result<(), JsValue> {
    push(PageEvent::DiagnosticsToggled(enabled))
}

fn push(event: PageEvent) -> Result<(), JsValue> {
    CONTROLS.with(|c| match c.borrow().as_ref() {
        Some(queue) => {
            queue.borrow_mut().push_back(event);
            Ok(())
        }
        None => Err(JsValue::from_str("plague doctors not initialized")),
    })
}
