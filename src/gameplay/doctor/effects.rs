//! Marks the doctors leave on page elements, and how cleanup takes them back.
//!
//! All state lives on the element itself (attributes + a marker class), so any
//! doctor can find and undo any other doctor's work.

use rand::Rng;

use crate::core::config::DoctorsConfig;
use crate::page::document::{ElementHandle, PageDocument};
use crate::rendering::palette::palette::DoctorColor;

pub const WHACKED_CLASS: &str = "plague-doctor-whacked";
pub const COLORED_CLASS: &str = "plague-doctor-colored";
pub const WHACKS_ATTR: &str = "data-plague-doctor-whacks";
const ORIGINAL_ATTR_PREFIX: &str = "data-plague-doctor-original-";

/// The two element styles a doctor paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyledProperty {
    Border,
    Background,
}

impl StyledProperty {
    pub const ALL: [StyledProperty; 2] = [StyledProperty::Border, StyledProperty::Background];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn key(self) -> &'static str {
        match self {
            StyledProperty::Border => "border",
            StyledProperty::Background => "background",
        }
    }

    /// CSS property written on the element.
    pub fn css_property(self) -> &'static str {
        match self {
            StyledProperty::Border => "border",
            StyledProperty::Background => "background-color",
        }
    }

    pub fn color_attr(self) -> String {
        format!("data-plague-doctor-{}-color", self.key())
    }

    pub fn intensity_attr(self) -> String {
        format!("data-plague-doctor-{}-intensity", self.key())
    }

    fn css_value(self, hex: &str, cfg: &DoctorsConfig) -> String {
        match self {
            StyledProperty::Border => format!("{}px solid {hex}", cfg.coloring.border_width_px),
            StyledProperty::Background => hex.to_string(),
        }
    }
}

/// Whack counter currently stored on `el` (0 when never whacked).
pub fn whacks(page: &dyn PageDocument, el: ElementHandle) -> i32 {
    page.attribute(el, WHACKS_ATTR)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Accumulated intensity for `property` on `el` (0 when never colored).
pub fn intensity(page: &dyn PageDocument, el: ElementHandle, property: StyledProperty) -> u32 {
    page.attribute(el, &property.intensity_attr())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

pub fn is_modified(page: &dyn PageDocument, el: ElementHandle) -> bool {
    page.has_class(el, WHACKED_CLASS) || page.has_class(el, COLORED_CLASS)
}

/// Adds `delta` to the element's whack counter and tilts it accordingly.
/// Returns the new counter.
pub fn apply_whack(
    page: &mut dyn PageDocument,
    el: ElementHandle,
    delta: i32,
    cfg: &DoctorsConfig,
) -> i32 {
    let next = whacks(page, el) + delta;
    remember_original(page, el, "transform");
    write_whacks(page, el, next, cfg);
    page.add_class(el, WHACKED_CLASS);
    next
}

/// Paints `property` with `color`. Reapplying the same color deepens it; a new
/// color starts over at the base increment. Returns the resulting intensity.
pub fn apply_color(
    page: &mut dyn PageDocument,
    el: ElementHandle,
    property: StyledProperty,
    color: DoctorColor,
    cfg: &DoctorsConfig,
) -> u32 {
    let color_attr = property.color_attr();
    let same_color = page.attribute(el, &color_attr).as_deref() == Some(color.name());
    let next = if same_color {
        intensity(page, el, property) + cfg.coloring.base_increment
    } else {
        cfg.coloring.base_increment
    };
    remember_original(page, el, property.css_property());
    page.set_attribute(el, &color_attr, color.name());
    page.set_attribute(el, &property.intensity_attr(), &next.to_string());
    let hex = color.darkened_hex(next, cfg.coloring.darken_step);
    page.set_style(el, property.css_property(), &property.css_value(&hex, cfg));
    page.add_class(el, COLORED_CLASS);
    next
}

/// Outcome of one cleanup step on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStep {
    /// Whack counter moved toward zero; carries the new value (0 = untilted).
    Unwhacked(i32),
    /// All coloring removed.
    Uncolored,
    /// Nothing left to undo.
    Restored,
}

/// Undoes one step of damage on `el`: tilt first, then paint.
pub fn restore_step(page: &mut dyn PageDocument, el: ElementHandle, cfg: &DoctorsConfig) -> RestoreStep {
    let current = whacks(page, el);
    if current != 0 || page.has_class(el, WHACKED_CLASS) {
        let band = cfg.cleanup.zero_band as i32;
        let next = if current.abs() <= band {
            0
        } else {
            current - current.signum()
        };
        if next == 0 {
            page.remove_attribute(el, WHACKS_ATTR);
            page.remove_class(el, WHACKED_CLASS);
            restore_original(page, el, "transform");
        } else {
            write_whacks(page, el, next, cfg);
        }
        return RestoreStep::Unwhacked(next);
    }
    let painted = StyledProperty::ALL
        .iter()
        .any(|p| page.attribute(el, &p.intensity_attr()).is_some());
    if painted || page.has_class(el, COLORED_CLASS) {
        for property in StyledProperty::ALL {
            page.remove_attribute(el, &property.color_attr());
            page.remove_attribute(el, &property.intensity_attr());
            restore_original(page, el, property.css_property());
        }
        page.remove_class(el, COLORED_CLASS);
        return RestoreStep::Uncolored;
    }
    RestoreStep::Restored
}

fn write_whacks(page: &mut dyn PageDocument, el: ElementHandle, value: i32, cfg: &DoctorsConfig) {
    page.set_attribute(el, WHACKS_ATTR, &value.to_string());
    let degrees = value as f32 * cfg.whacking.degrees_per_whack;
    page.set_style(el, "transform", &format!("rotate({degrees}deg)"));
}

/// Stores the element's own inline value of `css` the first time we touch it.
fn remember_original(page: &mut dyn PageDocument, el: ElementHandle, css: &str) {
    let key = format!("{ORIGINAL_ATTR_PREFIX}{css}");
    if page.attribute(el, &key).is_none() {
        let original = page.style(el, css).unwrap_or_default();
        page.set_attribute(el, &key, &original);
    }
}

fn restore_original(page: &mut dyn PageDocument, el: ElementHandle, css: &str) {
    let key = format!("{ORIGINAL_ATTR_PREFIX}{css}");
    match page.attribute(el, &key) {
        Some(original) if !original.is_empty() => page.set_style(el, css, &original),
        _ => page.remove_style(el, css),
    }
    page.remove_attribute(el, &key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::memory::MemoryPage;
    use bevy::math::{Rect, Vec2};

    fn setup() -> (MemoryPage, ElementHandle, DoctorsConfig) {
        let mut page = MemoryPage::new(Vec2::new(800.0, 600.0));
        let el = page.add_element("card", Rect::new(100.0, 100.0, 300.0, 200.0), &["card"]);
        (page, el, DoctorsConfig::default())
    }

    #[test]
    fn whack_writes_counter_rotation_and_tag() {
        let (mut page, el, cfg) = setup();
        assert_eq!(apply_whack(&mut page, el, 1, &cfg), 1);
        assert_eq!(apply_whack(&mut page, el, 1, &cfg), 2);
        assert_eq!(apply_whack(&mut page, el, -1, &cfg), 1);
        assert_eq!(whacks(&page, el), 1);
        assert_eq!(page.style(el, "transform").as_deref(), Some("rotate(5deg)"));
        assert!(page.has_class(el, WHACKED_CLASS));
    }

    #[test]
    fn color_accumulates_then_resets_on_new_color() {
        let (mut page, el, cfg) = setup();
        let p = StyledProperty::Background;
        let mut last = 0;
        for _ in 0..5 {
            let now = apply_color(&mut page, el, p, DoctorColor::Blue, &cfg);
            assert!(now >= last, "intensity went down: {last} -> {now}");
            last = now;
        }
        assert_eq!(last, 5);
        assert_eq!(
            page.style(el, "background-color"),
            Some(DoctorColor::Blue.darkened_hex(5, cfg.coloring.darken_step))
        );
        assert_eq!(apply_color(&mut page, el, p, DoctorColor::Red, &cfg), 1);
        // the other property keeps its own counter
        assert_eq!(apply_color(&mut page, el, StyledProperty::Border, DoctorColor::Red, &cfg), 1);
        assert_eq!(intensity(&page, el, p), 1);
        assert!(page.has_class(el, COLORED_CLASS));
        assert_eq!(page.style(el, "border").as_deref(), Some("3px solid #de0000"));
    }

    #[test]
    fn cleanup_untilts_before_erasing_paint() {
        let (mut page, el, cfg) = setup();
        for _ in 0..3 {
            apply_whack(&mut page, el, 1, &cfg);
        }
        apply_color(&mut page, el, StyledProperty::Border, DoctorColor::Green, &cfg);

        assert_eq!(restore_step(&mut page, el, &cfg), RestoreStep::Unwhacked(2));
        assert!(page.has_class(el, COLORED_CLASS));
        assert_eq!(restore_step(&mut page, el, &cfg), RestoreStep::Unwhacked(1));
        // within the zero band: snapped
        assert_eq!(restore_step(&mut page, el, &cfg), RestoreStep::Unwhacked(0));
        assert!(!page.has_class(el, WHACKED_CLASS));
        assert_eq!(page.style(el, "transform"), None);
        assert_eq!(page.attribute(el, WHACKS_ATTR), None);

        assert_eq!(restore_step(&mut page, el, &cfg), RestoreStep::Uncolored);
        assert_eq!(restore_step(&mut page, el, &cfg), RestoreStep::Restored);
        assert!(!is_modified(&page, el));
        assert_eq!(page.style(el, "border"), None);
        assert_eq!(page.attribute(el, &StyledProperty::Border.intensity_attr()), None);
        assert_eq!(page.attribute(el, &StyledProperty::Border.color_attr()), None);
    }

    #[test]
    fn cleanup_restores_inline_styles_the_page_had() {
        let (mut page, el, cfg) = setup();
        page.set_style(el, "border", "1px dashed gray");
        page.set_style(el, "transform", "scale(1.1)");
        apply_whack(&mut page, el, -1, &cfg);
        apply_color(&mut page, el, StyledProperty::Border, DoctorColor::Purple, &cfg);
        assert_ne!(page.style(el, "border").as_deref(), Some("1px dashed gray"));

        while restore_step(&mut page, el, &cfg) != RestoreStep::Restored {}
        assert_eq!(page.style(el, "border").as_deref(), Some("1px dashed gray"));
        assert_eq!(page.style(el, "transform").as_deref(), Some("scale(1.1)"));
        assert!(page
            .attribute(el, "data-plague-doctor-original-border")
            .is_none());
    }

    #[test]
    fn untouched_element_is_already_restored() {
        let (mut page, el, cfg) = setup();
        assert_eq!(restore_step(&mut page, el, &cfg), RestoreStep::Restored);
    }
}
