use bevy::prelude::*;
use serde::Deserialize;
use std::{fs, ops::RangeInclusive, path::Path, time::Duration};

use crate::rendering::palette::palette::DoctorColor;

pub const MIN_HEARTBEAT: Duration = Duration::from_millis(1);
pub const MAX_HEARTBEAT: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Milliseconds between ticks at speed 1.0. A doctor spawned at speed `s` ticks every `base_interval_ms / s`.
    pub base_interval_ms: u64,
}
impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MovementConfig {
    /// Pixels per tick while walking to a wander target.
    pub walking_speed: f32,
    /// Pixels per tick while running to an element that needs cleaning.
    pub running_speed: f32,
    /// Arrival band around the anchor point (|dx| < x and |dy| < y).
    pub arrival_tolerance_x: f32,
    pub arrival_tolerance_y: f32,
    /// Horizontal velocity beyond which the facing flips.
    pub facing_threshold: f32,
}
impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walking_speed: 10.0,
            running_speed: 20.0,
            arrival_tolerance_x: 10.0,
            arrival_tolerance_y: 5.0,
            facing_threshold: 0.5,
        }
    }
}

/// Chances are expressed as "1 in N" per tick. 0 disables the transition.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BehaviorConfig {
    pub wander_chance: u32,
    pub abandon_walk_chance: u32,
    pub stop_looking_chance: u32,
    pub whack_min_ticks: u32,
    pub stop_whacking_chance: u32,
    pub whack_beat: u32,
    pub color_min_ticks: u32,
    pub stop_coloring_chance: u32,
    pub color_beat: u32,
    pub dying_ticks: u32,
}
impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            wander_chance: 10,
            abandon_walk_chance: 500,
            stop_looking_chance: 20,
            whack_min_ticks: 10,
            stop_whacking_chance: 20,
            whack_beat: 5,
            color_min_ticks: 20,
            stop_coloring_chance: 80,
            color_beat: 4,
            dying_ticks: 12,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ColoringConfig {
    /// Intensity written when a property is colored with a new color.
    pub base_increment: u32,
    /// Once a property's intensity exceeds this, the doctor loses interest.
    pub ceiling: u32,
    /// Per-channel darkening applied for each intensity unit.
    pub darken_step: u8,
    pub border_width_px: u32,
}
impl Default for ColoringConfig {
    fn default() -> Self {
        Self {
            base_increment: 1,
            ceiling: 10,
            darken_step: 8,
            border_width_px: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WhackingConfig {
    pub degrees_per_whack: f32,
}
impl Default for WhackingConfig {
    fn default() -> Self {
        Self {
            degrees_per_whack: 5.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CleanupConfig {
    /// Restore one step every `beat` ticks while cleaning.
    pub beat: u32,
    /// Whack counters within this distance of zero are snapped to zero.
    pub zero_band: u32,
}
impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            beat: 3,
            zero_band: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpriteConfig {
    /// Asset URL prefix; the frame url is `<image_base_url><action code>_<color>.gif`.
    pub image_base_url: String,
    pub width: f32,
    pub height: f32,
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub initial_color: String,
    /// Ticks before the `plague-doctor-element-init` class is dropped.
    pub init_fade_ticks: u32,
}
impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            image_base_url: "/images/plague-doctor-gif".into(),
            width: 64.0,
            height: 64.0,
            spawn_x: 20.0,
            spawn_y: 20.0,
            initial_color: "green".into(),
            init_fade_ticks: 4,
        }
    }
}
impl SpriteConfig {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn spawn_position(&self) -> Vec2 {
        Vec2::new(self.spawn_x, self.spawn_y)
    }

    /// Parsed `initial_color`, falling back to green with a warning.
    pub fn initial_color(&self) -> DoctorColor {
        match self.initial_color.parse::<DoctorColor>() {
            Ok(c) => c,
            Err(e) => {
                warn!(target: "config", "{e}; using green");
                DoctorColor::Green
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TargetingConfig {
    /// Random viewport points sampled per wander attempt before giving up for this tick.
    pub attempts: u32,
}
impl Default for TargetingConfig {
    fn default() -> Self {
        Self { attempts: 10 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RespawnConfig {
    pub enabled: bool,
    /// Replacements spawned per death.
    pub count: usize,
    pub delay_secs: f32,
}
impl Default for RespawnConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 1,
            delay_secs: 3.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpawnConfig {
    pub count: usize,
    pub speed: f32,
}
impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            count: 1,
            speed: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Automatically exit after this many seconds. 0.0 (or omitted) = run indefinitely.
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
    /// Broadcast cleanup after this many seconds. 0.0 = never.
    #[serde(rename = "cleanupAfter")]
    pub cleanup_after: f32,
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq, Default)]
#[serde(default)]
pub struct DoctorsConfig {
    pub heartbeat: HeartbeatConfig,
    pub movement: MovementConfig,
    pub behavior: BehaviorConfig,
    pub coloring: ColoringConfig,
    pub whacking: WhackingConfig,
    pub cleanup: CleanupConfig,
    pub sprite: SpriteConfig,
    pub targeting: TargetingConfig,
    pub respawn: RespawnConfig,
    pub spawn: SpawnConfig,
    pub session: SessionConfig,
    pub diagnostics: bool,
    pub seed: Option<u64>,
}

impl DoctorsConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        Self::from_ron_str(&data)
    }

    pub fn from_ron_str(data: &str) -> Result<Self, String> {
        ron::from_str(data).map_err(|e| format!("parse RON: {e}"))
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Compile-time copy of `assets/config/doctors.ron` (the only source on wasm).
    pub fn embedded() -> Result<Self, String> {
        const DOCTORS_RON: &str = include_str!("../../../assets/config/doctors.ron");
        Self::from_ron_str(DOCTORS_RON)
    }

    /// Deep-merges each readable file over the previous ones, later files winning per key.
    /// Returns the config, the paths actually used, and any read / parse errors.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();
        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        if let Some((_, ev)) = bm.iter_mut().find(|(ek, _)| **ek == k) {
                            merge_value(ev, v);
                            continue;
                        }
                        bm.insert(k, v);
                    }
                }
                (b, o) => *b = o,
            }
        }
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        match merged {
            Some(val) => match val.into_rust::<DoctorsConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    errors.push(format!(
                        "failed to deserialize merged config; using defaults: {e}"
                    ));
                    (DoctorsConfig::default(), used, errors)
                }
            },
            None => (DoctorsConfig::default(), used, errors),
        }
    }

    /// Speeds a doctor may be spawned at: anything slower than `f32::EPSILON`
    /// or faster than one tick per millisecond is refused.
    pub fn speed_range(&self) -> RangeInclusive<f32> {
        f32::EPSILON..=self.heartbeat.base_interval_ms.max(1) as f32
    }

    /// Heartbeat period for a doctor spawned at `speed`, clamped to
    /// `MIN_HEARTBEAT..=MAX_HEARTBEAT`. A zero period would fire every frame without end.
    pub fn heartbeat_interval(&self, speed: f32) -> Duration {
        let base = self.heartbeat.base_interval_ms.max(1) as f64 / 1000.0;
        let secs = base / f64::from(speed.max(f32::EPSILON));
        Duration::try_from_secs_f64(secs)
            .unwrap_or(MAX_HEARTBEAT)
            .clamp(MIN_HEARTBEAT, MAX_HEARTBEAT)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.heartbeat.base_interval_ms == 0 {
            w.push("heartbeat.base_interval_ms is 0 -> clamped to 1ms".into());
        } else if self.heartbeat.base_interval_ms < 16 {
            w.push(format!(
                "heartbeat.base_interval_ms {} very small; doctors will move faster than the page repaints",
                self.heartbeat.base_interval_ms
            ));
        }
        let mv = &self.movement;
        if mv.walking_speed <= 0.0 {
            w.push("movement.walking_speed must be > 0".into());
        }
        if mv.running_speed <= 0.0 {
            w.push("movement.running_speed must be > 0".into());
        }
        if mv.running_speed < mv.walking_speed {
            w.push(format!(
                "movement.running_speed {} slower than walking_speed {}",
                mv.running_speed, mv.walking_speed
            ));
        }
        if mv.arrival_tolerance_x <= 0.0 || mv.arrival_tolerance_y <= 0.0 {
            w.push("movement.arrival_tolerance must be > 0 on both axes (doctors never arrive)".into());
        }
        if mv.facing_threshold < 0.0 {
            w.push("movement.facing_threshold negative".into());
        }
        let b = &self.behavior;
        for (label, chance) in [
            ("wander_chance", b.wander_chance),
            ("abandon_walk_chance", b.abandon_walk_chance),
            ("stop_looking_chance", b.stop_looking_chance),
            ("stop_whacking_chance", b.stop_whacking_chance),
            ("stop_coloring_chance", b.stop_coloring_chance),
        ] {
            if chance == 0 {
                w.push(format!("behavior.{label} is 0 -> transition disabled"));
            }
        }
        for (label, beat) in [
            ("behavior.whack_beat", b.whack_beat),
            ("behavior.color_beat", b.color_beat),
            ("cleanup.beat", self.cleanup.beat),
        ] {
            if beat == 0 {
                w.push(format!("{label} is 0 -> clamped to 1"));
            }
        }
        if self.coloring.base_increment == 0 {
            w.push("coloring.base_increment is 0; intensity never grows".into());
        }
        if self.coloring.ceiling < self.coloring.base_increment {
            w.push(format!(
                "coloring.ceiling {} below base_increment {}; doctors stop after one stroke",
                self.coloring.ceiling, self.coloring.base_increment
            ));
        }
        if self.whacking.degrees_per_whack == 0.0 {
            w.push("whacking.degrees_per_whack is 0; whacks are invisible".into());
        }
        if self.sprite.width <= 0.0 || self.sprite.height <= 0.0 {
            w.push("sprite dimensions must be > 0".into());
        }
        if self.sprite.initial_color.parse::<DoctorColor>().is_err() {
            w.push(format!(
                "sprite.initial_color '{}' is not a palette color",
                self.sprite.initial_color
            ));
        }
        if self.targeting.attempts == 0 {
            w.push("targeting.attempts is 0; doctors never wander".into());
        }
        if self.respawn.enabled && self.respawn.delay_secs < 0.0 {
            w.push(format!(
                "respawn.delay_secs {} negative -> treated as 0",
                self.respawn.delay_secs
            ));
        }
        if self.spawn.count == 0 {
            w.push("spawn.count is 0; nothing will spawn".into());
        }
        if !self.speed_range().contains(&self.spawn.speed) {
            let range = self.speed_range();
            w.push(format!(
                "spawn.speed {} outside {}..={}; nothing will spawn",
                self.spawn.speed,
                range.start(),
                range.end()
            ));
        }
        if self.session.auto_close < 0.0 {
            w.push(format!(
                "session.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.session.auto_close
            ));
        }
        if self.session.cleanup_after < 0.0 {
            w.push(format!(
                "session.cleanupAfter {} negative -> treated as disabled",
                self.session.cleanup_after
            ));
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_sample_config() {
        let sample = r#"(
            heartbeat: (base_interval_ms: 50),
            movement: (walking_speed: 8.0, running_speed: 16.0),
            behavior: (wander_chance: 4, dying_ticks: 20),
            coloring: (ceiling: 6),
            sprite: (image_base_url: "/static/doc", initial_color: "purple"),
            respawn: (enabled: false),
            spawn: (count: 3, speed: 2.0),
            diagnostics: true,
            seed: Some(7),
        )"#;
        let mut file = tempfile::NamedTempFile::new().expect("tmp file");
        file.write_all(sample.as_bytes()).unwrap();
        let cfg = DoctorsConfig::load_from_file(file.path()).expect("parse config");
        assert_eq!(cfg.heartbeat.base_interval_ms, 50);
        assert_eq!(cfg.movement.walking_speed, 8.0);
        assert_eq!(cfg.behavior.wander_chance, 4);
        assert_eq!(cfg.behavior.dying_ticks, 20);
        // untouched fields keep defaults
        assert_eq!(cfg.behavior.whack_beat, 5);
        assert_eq!(cfg.coloring.ceiling, 6);
        assert_eq!(cfg.sprite.initial_color(), DoctorColor::Purple);
        assert!(!cfg.respawn.enabled);
        assert_eq!(cfg.spawn.count, 3);
        assert!(cfg.diagnostics);
        assert_eq!(cfg.seed, Some(7));
        assert!(
            cfg.validate().is_empty(),
            "expected no validation warnings for sample config: {:?}",
            cfg.validate()
        );
    }

    #[test]
    fn embedded_config_parses_clean() {
        let cfg = DoctorsConfig::embedded().expect("embedded config");
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
    }

    #[test]
    fn validate_detects_warnings() {
        let mut bad = DoctorsConfig::default();
        bad.heartbeat.base_interval_ms = 0;
        bad.movement.walking_speed = 0.0;
        bad.movement.running_speed = -1.0;
        bad.movement.arrival_tolerance_y = 0.0;
        bad.behavior.wander_chance = 0;
        bad.behavior.whack_beat = 0;
        bad.coloring.base_increment = 0;
        bad.sprite.initial_color = "magenta".into();
        bad.targeting.attempts = 0;
        bad.spawn.count = 0;
        bad.spawn.speed = f32::NAN;
        bad.session.auto_close = -1.0;
        let warnings = bad.validate();
        let joined = warnings.join(" | ");
        assert!(joined.contains("heartbeat.base_interval_ms is 0"));
        assert!(joined.contains("movement.walking_speed must be > 0"));
        assert!(joined.contains("arrival_tolerance"));
        assert!(joined.contains("behavior.wander_chance is 0"));
        assert!(joined.contains("behavior.whack_beat is 0"));
        assert!(joined.contains("magenta"));
        assert!(joined.contains("spawn.count is 0"));
        assert!(joined.contains("session.autoClose"));
        assert!(warnings.len() >= 10, "got {}: {joined}", warnings.len());
    }

    #[test]
    fn load_or_default_missing_file() {
        let (cfg, err) = DoctorsConfig::load_or_default("this/file/does/not/exist.ron");
        assert!(err.is_some());
        assert_eq!(cfg, DoctorsConfig::default());
    }

    #[test]
    fn layered_merge_overrides() {
        let base = r"(
            movement: (walking_speed: 12.0, running_speed: 30.0),
            respawn: (count: 2),
        )";
        let override_one = r"(
            movement: (running_speed: 40.0),
            respawn: (delay_secs: 0.5),
        )";
        let mut f1 = tempfile::NamedTempFile::new().unwrap();
        let mut f2 = tempfile::NamedTempFile::new().unwrap();
        f1.write_all(base.as_bytes()).unwrap();
        f2.write_all(override_one.as_bytes()).unwrap();
        let (cfg, used, errors) = DoctorsConfig::load_layered([f1.path(), f2.path()]);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(used.len(), 2);
        assert_eq!(cfg.movement.walking_speed, 12.0);
        assert_eq!(cfg.movement.running_speed, 40.0);
        assert_eq!(cfg.respawn.count, 2);
        assert_eq!(cfg.respawn.delay_secs, 0.5);
        assert!(cfg.respawn.enabled);
    }

    #[test]
    fn layered_reports_unreadable_layers() {
        let mut f1 = tempfile::NamedTempFile::new().unwrap();
        f1.write_all(b"(spawn: (count: 4))").unwrap();
        let (cfg, used, errors) =
            DoctorsConfig::load_layered([f1.path(), Path::new("missing/override.ron")]);
        assert_eq!(used.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("read error"));
        assert_eq!(cfg.spawn.count, 4);
    }

    #[test]
    fn heartbeat_interval_scales_with_speed() {
        let cfg = DoctorsConfig::default();
        assert_eq!(cfg.heartbeat_interval(1.0).as_millis(), 100);
        assert_eq!(cfg.heartbeat_interval(2.0).as_millis(), 50);
        assert_eq!(cfg.heartbeat_interval(0.5).as_millis(), 200);
    }

    #[test]
    fn heartbeat_interval_never_reaches_zero() {
        let cfg = DoctorsConfig::default();
        assert_eq!(cfg.heartbeat_interval(1e12), MIN_HEARTBEAT);
        assert_eq!(cfg.heartbeat_interval(f32::MAX), MIN_HEARTBEAT);
        assert_eq!(cfg.heartbeat_interval(1e-30), MAX_HEARTBEAT);
        assert!(cfg.speed_range().contains(&100.0));
        assert!(!cfg.speed_range().contains(&100.5));
        assert!(!cfg.speed_range().contains(&f32::NAN));
        assert!(!cfg.speed_range().contains(&1e-30));
    }
}
