use bevy::prelude::*;

use crate::gameplay::doctor::targeting::modified_elements;
use crate::gameplay::doctor::{Activity, Doctor};
use crate::gameplay::manager::{ManagerState, PendingRespawns};
use crate::page::document::Page;

#[derive(Resource)]
pub struct DebugState {
    pub log_interval: f32,
    pub time_accum: f32,
    pub frame_counter: u64,
}

impl DebugState {
    /// True once a full `log_interval` has accumulated since the last summary.
    pub fn due(&self) -> bool {
        self.time_accum >= self.log_interval
    }
}

impl Default for DebugState {
    fn default() -> Self {
        Self {
            log_interval: 1.0,
            time_accum: 0.0,
            frame_counter: 0,
        }
    }
}

#[derive(Resource, Debug, Default, Clone)]
pub struct DebugStats {
    pub doctors: usize,
    pub idle: usize,
    pub traveling: usize,
    pub busy: usize,
    pub dying: usize,
    pub modified_elements: usize,
    pub pending_respawns: usize,
    pub cleaning_up: bool,
}

/// Page scans are costly on the web, so stats are gathered only for the frame that logs.
pub fn debug_stats_collect_system(
    time: Res<Time>,
    mut state: ResMut<DebugState>,
    mut stats: ResMut<DebugStats>,
    mut page: NonSendMut<Page>,
    manager: Res<ManagerState>,
    pending: Res<PendingRespawns>,
    q_doctors: Query<&Doctor>,
) {
    state.frame_counter += 1;
    state.time_accum += time.delta_secs();
    if !state.due() {
        return;
    }
    let mut next = DebugStats {
        modified_elements: modified_elements(page.document_mut()).len(),
        pending_respawns: pending.len(),
        cleaning_up: manager.cleaning_up,
        ..Default::default()
    };
    for doctor in q_doctors.iter() {
        next.doctors += 1;
        match doctor.activity {
            Activity::Idle => next.idle += 1,
            Activity::Walking | Activity::Running => next.traveling += 1,
            Activity::Dying => next.dying += 1,
            _ => next.busy += 1,
        }
    }
    *stats = next;
}
