use bevy::prelude::*;

use super::stats::{DebugState, DebugStats};

pub fn debug_logging_system(time: Res<Time>, mut state: ResMut<DebugState>, stats: Res<DebugStats>) {
    if state.due() {
        state.time_accum = 0.0;
        debug!(target: "roster", "ROSTER frame={} t={:.3}s doctors={} idle={} traveling={} busy={} dying={} modified={} respawns={} cleanup={}",
            state.frame_counter,
            time.elapsed_secs(),
            stats.doctors,
            stats.idle,
            stats.traveling,
            stats.busy,
            stats.dying,
            stats.modified_elements,
            stats.pending_respawns,
            stats.cleaning_up);
    }
}
