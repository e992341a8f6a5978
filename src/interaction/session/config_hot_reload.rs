use bevy::prelude::*;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::core::components::Heartbeat;
use crate::core::config::DoctorsConfig;
use crate::gameplay::doctor::Doctor;

/// Config layers watched for changes, in merge order.
#[derive(Resource, Debug, Clone)]
pub struct ConfigReloadSettings {
    pub paths: Vec<PathBuf>,
    pub interval_secs: f32,
}
impl Default for ConfigReloadSettings {
    fn default() -> Self {
        Self {
            paths: vec![
                PathBuf::from("assets/config/doctors.ron"),
                PathBuf::from("assets/config/doctors.local.ron"),
            ],
            interval_secs: 0.5,
        }
    }
}

#[derive(Resource, Debug)]
struct ConfigReloadState {
    last_mod: HashMap<PathBuf, SystemTime>,
    timer: Timer,
}
impl FromWorld for ConfigReloadState {
    fn from_world(world: &mut World) -> Self {
        let settings = world
            .get_resource::<ConfigReloadSettings>()
            .cloned()
            .unwrap_or_default();
        // Files as they were at startup are already applied.
        let last_mod = settings
            .paths
            .iter()
            .filter_map(|p| Some((p.clone(), modified(p)?)))
            .collect();
        Self {
            last_mod,
            timer: Timer::from_seconds(settings.interval_secs.max(0.05), TimerMode::Repeating),
        }
    }
}

/// Native only: re-reads the config layers when one of them changes on disk.
/// Doctors read the config every tick, so behavior changes apply immediately;
/// heartbeat timers are re-timed to the new base interval.
pub struct ConfigHotReloadPlugin;
impl Plugin for ConfigHotReloadPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            app.init_resource::<ConfigReloadSettings>()
                .init_resource::<ConfigReloadState>()
                .add_systems(Update, poll_and_reload_config);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = app;
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn poll_and_reload_config(
    time: Res<Time>,
    settings: Res<ConfigReloadSettings>,
    mut state: ResMut<ConfigReloadState>,
    mut cfg_res: ResMut<DoctorsConfig>,
    mut q_heartbeats: Query<(&Doctor, &mut Heartbeat)>,
) {
    if !state.timer.tick(time.delta()).just_finished() {
        return;
    }
    let mut dirty = false;
    for path in &settings.paths {
        let Some(mod_time) = modified(path) else {
            continue;
        };
        let entry = state
            .last_mod
            .entry(path.clone())
            .or_insert(SystemTime::UNIX_EPOCH);
        if mod_time > *entry {
            *entry = mod_time;
            dirty = true;
        }
    }
    if !dirty {
        return;
    }
    let (new_cfg, used, errors) = DoctorsConfig::load_layered(settings.paths.iter());
    for e in errors {
        warn!(target: "config", "CONFIG HOT-RELOAD issue: {e}");
    }
    if used.is_empty() {
        return;
    }
    // Command-line overrides of run-level settings survive a reload.
    let new_cfg = DoctorsConfig {
        seed: cfg_res.seed,
        diagnostics: cfg_res.diagnostics,
        spawn: cfg_res.spawn.clone(),
        session: cfg_res.session.clone(),
        ..new_cfg
    };
    if *cfg_res == new_cfg {
        return;
    }
    *cfg_res = new_cfg;
    for (doctor, mut heartbeat) in q_heartbeats.iter_mut() {
        let interval = cfg_res.heartbeat_interval(doctor.speed);
        if heartbeat.duration() != interval {
            heartbeat.set_duration(interval);
        }
    }
    info!(target: "config", "Config hot-reload applied from {}", used.join(", "));
}
