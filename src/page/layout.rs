//! RON description of an in-memory page, used by the native harness.
//!
//! ```ron
//! (
//!     viewport: (width: 1280.0, height: 720.0),
//!     elements: [
//!         (name: "header", rect: (x: 0.0, y: 0.0, w: 1280.0, h: 96.0), classes: ["site-header"]),
//!     ],
//! )
//! ```

use bevy::math::{Rect, Vec2};
use serde::Deserialize;
use std::{fs, path::Path};

use super::memory::MemoryPage;
use super::document::PageDocument;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ViewportSpec {
    pub width: f32,
    pub height: f32,
}
impl Default for ViewportSpec {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct RectSpec {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}
impl RectSpec {
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ElementSpec {
    pub name: String,
    pub rect: RectSpec,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub styles: Vec<(String, String)>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PageLayout {
    pub viewport: ViewportSpec,
    pub elements: Vec<ElementSpec>,
}

impl PageLayout {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path)
            .map_err(|e| format!("read page layout {}: {e}", path.as_ref().display()))?;
        Self::from_ron_str(&data)
    }

    pub fn from_ron_str(data: &str) -> Result<Self, String> {
        ron::from_str(data).map_err(|e| format!("parse page layout RON: {e}"))
    }

    /// Compile-time copy of `assets/pages/demo.ron`.
    pub fn embedded_demo() -> Result<Self, String> {
        const DEMO_RON: &str = include_str!("../../assets/pages/demo.ron");
        Self::from_ron_str(DEMO_RON)
    }

    /// Warnings for layouts that would leave doctors with nowhere to go.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            w.push("viewport dimensions must be > 0".into());
        }
        if self.elements.is_empty() {
            w.push("layout has no elements; doctors will idle forever".into());
        }
        for e in &self.elements {
            if e.rect.w <= 0.0 || e.rect.h <= 0.0 {
                w.push(format!("element '{}' has an empty box", e.name));
            }
            let r = e.rect.to_rect();
            if r.max.x <= 0.0
                || r.max.y <= 0.0
                || r.min.x >= self.viewport.width
                || r.min.y >= self.viewport.height
            {
                w.push(format!("element '{}' lies outside the viewport", e.name));
            }
        }
        w
    }

    pub fn build(&self) -> MemoryPage {
        let mut page = MemoryPage::new(Vec2::new(self.viewport.width, self.viewport.height));
        for spec in &self.elements {
            let classes: Vec<&str> = spec.classes.iter().map(String::as_str).collect();
            let el = page.add_element(&spec.name, spec.rect.to_rect(), &classes);
            for (k, v) in &spec.attributes {
                page.set_attribute(el, k, v);
            }
            for (k, v) in &spec.styles {
                page.set_style(el, k, v);
            }
        }
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_demo_builds() {
        let layout = PageLayout::embedded_demo().expect("demo layout");
        assert!(layout.validate().is_empty(), "{:?}", layout.validate());
        let page = layout.build();
        assert_eq!(page.len(), layout.elements.len() + 1);
        assert!(page.find("header").is_some());
    }

    #[test]
    fn attributes_and_styles_are_applied() {
        let layout = PageLayout::from_ron_str(
            r#"(
                viewport: (width: 400.0, height: 300.0),
                elements: [
                    (
                        name: "card",
                        rect: (x: 10.0, y: 20.0, w: 100.0, h: 50.0),
                        classes: ["card"],
                        attributes: [("data-plague-doctor-ignore", "")],
                        styles: [("border", "1px solid black")],
                    ),
                ],
            )"#,
        )
        .expect("parse");
        let page = layout.build();
        let card = page.find("card").expect("card");
        assert_eq!(page.bounding_box(card), Some(Rect::new(10.0, 20.0, 110.0, 70.0)));
        assert_eq!(page.style(card, "border").as_deref(), Some("1px solid black"));
        assert!(page.attribute(card, "data-plague-doctor-ignore").is_some());
        assert!(page.has_class(card, "card"));
    }

    #[test]
    fn validate_flags_degenerate_layouts() {
        let layout = PageLayout::from_ron_str(
            r#"(
                viewport: (width: 100.0, height: 100.0),
                elements: [
                    (name: "flat", rect: (x: 0.0, y: 0.0, w: 0.0, h: 10.0)),
                    (name: "away", rect: (x: 500.0, y: 0.0, w: 10.0, h: 10.0)),
                ],
            )"#,
        )
        .expect("parse");
        let joined = layout.validate().join(" | ");
        assert!(joined.contains("'flat' has an empty box"));
        assert!(joined.contains("'away' lies outside"));
        assert!(PageLayout::default().validate().iter().any(|w| w.contains("no elements")));
    }
}
