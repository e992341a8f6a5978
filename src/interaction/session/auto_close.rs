use crate::core::config::DoctorsConfig;
use crate::core::system::system_order::LifecycleSet;
use crate::gameplay::manager::{BeginCleanup, DoctorRoster, ManagerState};
use bevy::prelude::*;

#[derive(Resource, Deref, DerefMut)]
struct AutoCloseTimer(Timer);

/// Fires `BeginCleanup` once; afterwards the session ends when the last doctor is gone.
#[derive(Resource, Deref, DerefMut)]
struct ScheduledCleanup(Timer);

pub struct AutoClosePlugin;

impl Plugin for AutoClosePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_autoclose)
            .add_systems(
                Update,
                (check_scheduled_cleanup, check_autoclose)
                    .chain()
                    .after(LifecycleSet),
            );
    }
}

fn setup_autoclose(mut commands: Commands, cfg: Res<DoctorsConfig>) {
    let secs = cfg.session.auto_close;
    if secs > 0.0 {
        info!(target: "session", seconds = secs, "AutoClose: will exit after {secs} seconds");
        commands.insert_resource(AutoCloseTimer(Timer::from_seconds(secs, TimerMode::Once)));
    }
    let cleanup = cfg.session.cleanup_after;
    if cleanup > 0.0 {
        info!(target: "session", seconds = cleanup, "Cleanup scheduled after {cleanup} seconds");
        commands.insert_resource(ScheduledCleanup(Timer::from_seconds(cleanup, TimerMode::Once)));
    }
}

fn check_scheduled_cleanup(
    time: Res<Time>,
    mut timer: Option<ResMut<ScheduledCleanup>>,
    state: Res<ManagerState>,
    roster: Res<DoctorRoster>,
    mut ev_cleanup: EventWriter<BeginCleanup>,
    mut ev_exit: EventWriter<AppExit>,
) {
    let Some(t) = timer.as_mut() else {
        return;
    };
    if !t.finished() {
        if t.tick(time.delta()).just_finished() {
            info!(target: "session", "Scheduled cleanup: broadcasting");
            ev_cleanup.write(BeginCleanup);
        }
        return;
    }
    if state.cleaning_up && roster.is_empty() {
        info!(target: "session", "Cleanup finished, requesting app exit");
        ev_exit.write(AppExit::Success);
    }
}

fn check_autoclose(
    time: Res<Time>,
    mut timer: Option<ResMut<AutoCloseTimer>>,
    mut ev_exit: EventWriter<AppExit>,
) {
    if let Some(t) = timer.as_mut() {
        t.tick(time.delta());
        if t.finished() {
            info!(target: "session", "AutoClose: timer finished, requesting app exit");
            ev_exit.write(AppExit::Success);
        }
    }
}
