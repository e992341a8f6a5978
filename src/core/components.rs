use bevy::prelude::*;

/// Per-doctor repeating heartbeat. Lives and dies with the doctor entity.
#[derive(Component, Debug, Deref, DerefMut, Clone)]
pub struct Heartbeat(pub Timer);

impl Heartbeat {
    pub fn every(interval: std::time::Duration) -> Self {
        Self(Timer::new(interval, TimerMode::Repeating))
    }
}
