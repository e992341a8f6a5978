pub mod app;
pub mod core;
pub mod debug;
pub mod gameplay;
pub mod interaction;
pub mod page;
pub mod rendering;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Curated re-exports
pub use app::game::{headless_app, PlagueDoctorsPlugin};
pub use core::config::DoctorsConfig;
pub use gameplay::doctor::{Activity, Doctor};
pub use gameplay::manager::{
    BeginCleanup, DoctorManagerExt, DoctorManagerPlugin, DoctorRoster, SetDiagnostics, SpawnDoctors,
};
pub use page::{ElementHandle, MemoryPage, Page, PageDocument, PageLayout};
pub use rendering::palette::DoctorColor;
