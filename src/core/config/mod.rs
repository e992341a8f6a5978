pub mod config;

pub use config::{
    BehaviorConfig, CleanupConfig, ColoringConfig, DoctorsConfig, HeartbeatConfig, MovementConfig,
    RespawnConfig, SessionConfig, SpawnConfig, SpriteConfig, TargetingConfig, WhackingConfig,
};
