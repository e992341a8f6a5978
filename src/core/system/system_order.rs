//! Central system ordering labels to make update sequence explicit.
//! Stages (high-level):
//! 1. PageInput (drain clicks / control events from the page)
//! 2. ManagerCommands (spawn, diagnostics and cleanup broadcasts)
//! 3. DoctorTick (heartbeats: behavior + rendering onto the page)
//! 4. Lifecycle (despawn dead doctors, respawns, session timers)
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct PageInputSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct ManagerCommandSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct DoctorTickSet;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct LifecycleSet;
