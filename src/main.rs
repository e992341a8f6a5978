//! Native harness: runs the doctors headless against an in-memory page.
use anyhow::{anyhow, Result};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;

use plague_doctors::interaction::session::config_hot_reload::{
    ConfigHotReloadPlugin, ConfigReloadSettings,
};
use plague_doctors::{headless_app, DoctorManagerExt, DoctorsConfig, MemoryPage, Page, PageLayout};

const DEFAULT_CONFIG: &str = "assets/config/doctors.ron";

#[derive(Parser, Debug)]
#[command(about = "Run plague doctors headless against a RON page layout", version)]
struct Args {
    /// Config layers, merged in order (later wins). Defaults to assets/config/doctors.ron.
    #[arg(long = "config")]
    configs: Vec<PathBuf>,
    /// Page layout RON. Defaults to the embedded demo page.
    #[arg(long)]
    page: Option<PathBuf>,
    #[arg(long)]
    count: Option<usize>,
    #[arg(long)]
    speed: Option<f32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Log one status line per doctor tick.
    #[arg(long)]
    diagnostics: bool,
    /// Broadcast cleanup after this many seconds; the run ends once every doctor is gone.
    #[arg(long)]
    cleanup_after: Option<f32>,
    /// Exit after this many seconds.
    #[arg(long)]
    seconds: Option<f32>,
    /// Print the page elements as JSON on exit.
    #[arg(long)]
    snapshot: bool,
}

fn load_config(args: &Args) -> Result<(DoctorsConfig, Vec<PathBuf>, Vec<String>)> {
    if cfg!(feature = "embedded_assets") && args.configs.is_empty() {
        let cfg = DoctorsConfig::embedded().map_err(|e| anyhow!(e))?;
        return Ok((cfg, Vec::new(), Vec::new()));
    }
    let paths = if args.configs.is_empty() {
        vec![PathBuf::from(DEFAULT_CONFIG)]
    } else {
        args.configs.clone()
    };
    let (cfg, used, errors) = DoctorsConfig::load_layered(paths.iter());
    if used.is_empty() && !args.configs.is_empty() {
        return Err(anyhow!("no readable config among {:?}: {}", paths, errors.join("; ")));
    }
    Ok((cfg, paths, errors))
}

fn print_snapshot_on_exit(mut exits: EventReader<AppExit>, page: NonSend<Page>) {
    if exits.read().next().is_none() {
        return;
    }
    let Some(memory) = page.downcast_ref::<MemoryPage>() else {
        return;
    };
    match serde_json::to_string_pretty(&memory.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(target: "harness", "snapshot failed: {e}"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (mut cfg, watched, load_errors) = load_config(&args)?;

    if let Some(count) = args.count {
        cfg.spawn.count = count;
    }
    if let Some(speed) = args.speed {
        cfg.spawn.speed = speed;
    }
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }
    cfg.diagnostics |= args.diagnostics;
    if let Some(secs) = args.cleanup_after {
        cfg.session.cleanup_after = secs;
    }
    if let Some(secs) = args.seconds {
        cfg.session.auto_close = secs;
    }

    let layout = match &args.page {
        Some(path) => PageLayout::load_from_file(path),
        None => PageLayout::embedded_demo(),
    }
    .map_err(|e| anyhow!(e))?;

    let (count, speed) = (cfg.spawn.count, cfg.spawn.speed);
    let mut app = headless_app(cfg, layout.build());
    app.add_plugins(LogPlugin {
        filter: "info,roster=debug".into(),
        ..default()
    });
    for e in &load_errors {
        warn!(target: "config", "{e}");
    }
    for w in layout.validate() {
        warn!(target: "page", "{w}");
    }
    if !watched.is_empty() {
        app.insert_resource(ConfigReloadSettings {
            paths: watched,
            ..default()
        })
        .add_plugins(ConfigHotReloadPlugin);
    }
    if args.snapshot {
        app.add_systems(Last, print_snapshot_on_exit);
    }

    info!(target: "harness", count, speed, elements = layout.elements.len(), "Starting");
    app.world_mut().spawn_doctors(count, speed);
    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(anyhow!("app exited with code {code}")),
    }
}
