use std::io::Write;
use std::path::PathBuf;

use plague_doctors::core::config::config::DoctorsConfig;
use plague_doctors::page::layout::PageLayout;
use plague_doctors::DoctorColor;

#[test]
fn shipped_config_matches_defaults() {
    let cfg = DoctorsConfig::load_from_file("assets/config/doctors.ron")
        .expect("assets/config/doctors.ron should parse");
    assert!(cfg.validate().is_empty(), "warnings: {:?}", cfg.validate());
    assert_eq!(cfg, DoctorsConfig::default(), "shipped config drifted from code defaults");
    assert_eq!(cfg.sprite.initial_color(), DoctorColor::Green);
}

#[test]
fn local_layer_overrides_single_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let local = dir.path().join("doctors.local.ron");
    let mut f = std::fs::File::create(&local).expect("create");
    writeln!(
        f,
        "(behavior: (wander_chance: 3), sprite: (initial_color: \"purple\"), seed: Some(99))"
    )
    .expect("write");

    let (cfg, used, errors) =
        DoctorsConfig::load_layered([PathBuf::from("assets/config/doctors.ron"), local.clone()]);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(used.len(), 2);
    assert_eq!(cfg.behavior.wander_chance, 3);
    // untouched siblings keep the base value
    assert_eq!(cfg.behavior.stop_looking_chance, 20);
    assert_eq!(cfg.sprite.initial_color(), DoctorColor::Purple);
    assert_eq!(cfg.sprite.width, 64.0);
    assert_eq!(cfg.seed, Some(99));
}

#[test]
fn unknown_initial_color_falls_back_to_green() {
    let cfg = DoctorsConfig::from_ron_str("(sprite: (initial_color: \"teal\"))").expect("parse");
    assert_eq!(cfg.sprite.initial_color(), DoctorColor::Green);
    assert!(cfg.validate().iter().any(|w| w.contains("teal")));
}

#[test]
fn shipped_demo_page_parses() {
    let layout = PageLayout::load_from_file("assets/pages/demo.ron").expect("demo page");
    assert!(layout.validate().is_empty(), "{:?}", layout.validate());
    assert_eq!(layout, PageLayout::embedded_demo().expect("embedded demo"));
    let page = layout.build();
    assert!(page.find("cookie-banner").is_some());
}
