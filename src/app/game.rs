use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::time::Duration;

use crate::core::config::DoctorsConfig;
use crate::debug::DebugPlugin;
use crate::gameplay::manager::DoctorManagerPlugin;
use crate::interaction::page_input::PageInputPlugin;
use crate::interaction::session::auto_close::AutoClosePlugin;
use crate::page::document::{Page, PageDocument};

/// Everything the doctors need, minus the page and the runner.
/// Expects a [`Page`] non-send resource and (optionally) a [`DoctorsConfig`].
pub struct PlagueDoctorsPlugin;

impl Plugin for PlagueDoctorsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((DoctorManagerPlugin, PageInputPlugin, AutoClosePlugin, DebugPlugin))
            .add_systems(Startup, log_config_warnings);
    }
}

fn log_config_warnings(cfg: Res<DoctorsConfig>) {
    for w in cfg.validate() {
        warn!(target: "config", "{w}");
    }
}

/// Frame pacing for the runner. Heartbeats are far slower, so this only bounds latency.
const FRAME: Duration = Duration::from_millis(16);

/// A headless app driving `page` with `cfg`: `MinimalPlugins` + [`PlagueDoctorsPlugin`].
pub fn headless_app(cfg: DoctorsConfig, page: impl PageDocument) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(FRAME)))
        .insert_resource(cfg)
        .insert_non_send_resource(Page::new(page))
        .add_plugins(PlagueDoctorsPlugin);
    app
}
