//! Choosing where a doctor goes next.

use bevy::math::{Rect, Vec2};
use rand::Rng;

use super::effects::{COLORED_CLASS, WHACKED_CLASS};
use crate::page::document::{
    ElementHandle, PageDocument, CONTROL_CLASS, IGNORE_ATTR, IGNORE_CLASS, SPRITE_CLASS,
};

/// Bounding box of `el` if it is still on the page and has a non-zero area.
pub fn valid_box(page: &dyn PageDocument, el: ElementHandle) -> Option<Rect> {
    if !page.contains(el) {
        return None;
    }
    page.bounding_box(el)
        .filter(|r| r.width() > 0.0 && r.height() > 0.0)
}

/// Whether a doctor (owning `own`) may wander to `el`.
pub fn is_wander_candidate(page: &dyn PageDocument, el: ElementHandle, own: ElementHandle) -> bool {
    el != own
        && !page.is_body(el)
        && !page.has_class(el, SPRITE_CLASS)
        && !page.has_class(el, CONTROL_CLASS)
        && !page.has_class(el, IGNORE_CLASS)
        && page.attribute(el, IGNORE_ATTR).is_none()
        && valid_box(page, el).is_some()
}

/// Samples up to `attempts` random viewport points and returns the first acceptable hit.
pub fn pick_random_element<R: Rng + ?Sized>(
    page: &mut dyn PageDocument,
    own: ElementHandle,
    attempts: u32,
    rng: &mut R,
) -> Option<ElementHandle> {
    let viewport = page.viewport();
    if viewport.x < 1.0 || viewport.y < 1.0 {
        return None;
    }
    for _ in 0..attempts {
        let point = Vec2::new(rng.gen_range(0.0..viewport.x), rng.gen_range(0.0..viewport.y));
        if let Some(el) = page.element_from_point(point) {
            if is_wander_candidate(page, el, own) {
                return Some(el);
            }
        }
    }
    None
}

/// Every element still carrying a whack or color mark, without duplicates.
pub fn modified_elements(page: &mut dyn PageDocument) -> Vec<ElementHandle> {
    let mut found = page.elements_by_class(WHACKED_CLASS);
    for el in page.elements_by_class(COLORED_CLASS) {
        if !found.contains(&el) {
            found.push(el);
        }
    }
    found.retain(|el| valid_box(page, *el).is_some());
    found
}

/// The modified element whose bottom-center anchor is closest to `from`.
pub fn nearest_modified(page: &mut dyn PageDocument, from: Vec2) -> Option<ElementHandle> {
    modified_elements(page)
        .into_iter()
        .filter_map(|el| valid_box(page, el).map(|r| (el, anchor_of(r).distance_squared(from))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(el, _)| el)
}

/// Where a doctor stands to interact with a box: horizontally centered, on its bottom edge.
pub fn anchor_of(rect: Rect) -> Vec2 {
    Vec2::new(rect.center().x, rect.max.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::memory::MemoryPage;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn rejects_degenerate_hits() {
        let mut page = MemoryPage::new(Vec2::new(400.0, 300.0));
        let own = page.create_sprite_element(Vec2::splat(32.0));
        let other = page.create_sprite_element(Vec2::splat(32.0));
        let control = page.add_element("ctl", Rect::new(0.0, 0.0, 10.0, 10.0), &[CONTROL_CLASS]);
        let ignored = page.add_element("ign", Rect::new(0.0, 0.0, 10.0, 10.0), &[IGNORE_CLASS]);
        let marked = page.add_element("attr", Rect::new(0.0, 0.0, 10.0, 10.0), &[]);
        page.set_attribute(marked, IGNORE_ATTR, "");
        let flat = page.add_element("flat", Rect::new(0.0, 0.0, 0.0, 10.0), &[]);
        let fine = page.add_element("fine", Rect::new(0.0, 0.0, 10.0, 10.0), &[]);

        let body = page.body();
        for el in [own, other, control, ignored, marked, flat, body] {
            assert!(!is_wander_candidate(&page, el, own), "{el} accepted");
        }
        assert!(is_wander_candidate(&page, fine, own));
    }

    #[test]
    fn empty_page_yields_nothing() {
        let mut page = MemoryPage::new(Vec2::new(400.0, 300.0));
        let own = page.create_sprite_element(Vec2::splat(32.0));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_random_element(&mut page, own, 50, &mut rng), None);

        let mut zero = MemoryPage::new(Vec2::ZERO);
        assert_eq!(pick_random_element(&mut zero, own, 50, &mut rng), None);
    }

    #[test]
    fn full_cover_element_is_always_found() {
        let mut page = MemoryPage::new(Vec2::new(400.0, 300.0));
        let own = page.create_sprite_element(Vec2::splat(1.0));
        page.set_style(own, "left", "-100px");
        let cover = page.add_element("cover", Rect::new(0.0, 0.0, 400.0, 300.0), &[]);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            assert_eq!(pick_random_element(&mut page, own, 1, &mut rng), Some(cover));
        }
    }

    #[test]
    fn nearest_modified_by_anchor_distance() {
        let mut page = MemoryPage::new(Vec2::new(800.0, 600.0));
        let near = page.add_element("near", Rect::new(0.0, 0.0, 100.0, 100.0), &[WHACKED_CLASS]);
        let far = page.add_element("far", Rect::new(600.0, 400.0, 700.0, 500.0), &[COLORED_CLASS]);
        let both = page.add_element(
            "both",
            Rect::new(300.0, 300.0, 400.0, 400.0),
            &[WHACKED_CLASS, COLORED_CLASS],
        );
        let found = modified_elements(&mut page);
        assert_eq!(found.len(), 3);
        assert!(found.contains(&both));
        assert_eq!(nearest_modified(&mut page, Vec2::new(50.0, 90.0)), Some(near));
        assert_eq!(nearest_modified(&mut page, Vec2::new(640.0, 510.0)), Some(far));
        page.remove_element(near);
        page.remove_element(far);
        page.remove_element(both);
        assert_eq!(nearest_modified(&mut page, Vec2::ZERO), None);
    }
}
