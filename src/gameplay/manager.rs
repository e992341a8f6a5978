//! Sprite manager: owns the roster of live doctors, spawns them, and
//! broadcasts diagnostics / cleanup to all of them.

use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::core::components::Heartbeat;
use crate::core::config::DoctorsConfig;
use crate::core::system::system_order::{DoctorTickSet, LifecycleSet, ManagerCommandSet};
use crate::gameplay::doctor::Doctor;
use crate::page::document::{ElementHandle, Page, PageDocument};

/// Spawn `count` doctors ticking `speed` times faster than the base heartbeat.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SpawnDoctors {
    pub count: usize,
    pub speed: f32,
}

/// Turns per-doctor status logging on or off, now and for later spawns.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetDiagnostics(pub bool);

/// Switches every doctor (and every later one) into cleanup mode.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BeginCleanup;

/// Emitted once per doctor, in the frame it is despawned.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DoctorDied {
    pub entity: Entity,
    pub element: ElementHandle,
    pub speed: f32,
    pub during_cleanup: bool,
}

/// Live doctor entities in spawn order.
#[derive(Resource, Debug, Default)]
pub struct DoctorRoster {
    doctors: Vec<Entity>,
}

impl DoctorRoster {
    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.doctors.contains(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.doctors.iter().copied()
    }

    fn remove(&mut self, entity: Entity) {
        self.doctors.retain(|e| *e != entity);
    }
}

/// Broadcast state that newly spawned doctors inherit.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct ManagerState {
    pub diagnostics: bool,
    pub cleaning_up: bool,
}

#[derive(Debug)]
struct PendingRespawn {
    timer: Timer,
    count: usize,
    speed: f32,
}

#[derive(Resource, Debug, Default)]
pub struct PendingRespawns(Vec<PendingRespawn>);

impl PendingRespawns {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Shared RNG for every doctor decision.
#[derive(Resource, Deref, DerefMut)]
pub struct DoctorRng(pub StdRng);

impl DoctorRng {
    pub fn from_config(cfg: &DoctorsConfig) -> Self {
        match cfg.seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

pub struct DoctorManagerPlugin;

impl Plugin for DoctorManagerPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DoctorsConfig>() {
            app.insert_resource(DoctorsConfig::default());
        }
        let rng = DoctorRng::from_config(app.world().resource::<DoctorsConfig>());
        let diagnostics = app.world().resource::<DoctorsConfig>().diagnostics;
        app.add_event::<SpawnDoctors>()
            .add_event::<SetDiagnostics>()
            .add_event::<BeginCleanup>()
            .add_event::<DoctorDied>()
            .insert_resource(rng)
            .insert_resource(ManagerState {
                diagnostics,
                cleaning_up: false,
            })
            .init_resource::<DoctorRoster>()
            .init_resource::<PendingRespawns>()
            .configure_sets(
                Update,
                (
                    ManagerCommandSet,
                    DoctorTickSet.after(ManagerCommandSet),
                    LifecycleSet.after(DoctorTickSet),
                ),
            )
            .add_systems(
                Update,
                (broadcast_diagnostics, broadcast_cleanup, spawn_requested)
                    .chain()
                    .in_set(ManagerCommandSet),
            )
            .add_systems(Update, tick_doctors.in_set(DoctorTickSet))
            .add_systems(
                Update,
                (despawn_dead, schedule_respawns, tick_respawns)
                    .chain()
                    .in_set(LifecycleSet),
            );
    }
}

/// Creates one doctor element and entity. The doctor starts with the manager's
/// current diagnostics and cleanup state.
pub fn spawn_doctor(
    commands: &mut Commands,
    page: &mut dyn PageDocument,
    cfg: &DoctorsConfig,
    state: &ManagerState,
    speed: f32,
) -> Entity {
    let element = page.create_sprite_element(cfg.sprite.size());
    let mut doctor = Doctor::new(element, cfg, speed);
    doctor.diagnostics = state.diagnostics;
    if state.cleaning_up {
        doctor.begin_cleanup();
    }
    doctor.attach(page, cfg);
    commands
        .spawn((doctor, Heartbeat::every(cfg.heartbeat_interval(speed))))
        .id()
}

fn spawn_requested(
    mut commands: Commands,
    mut requests: EventReader<SpawnDoctors>,
    mut page: NonSendMut<Page>,
    cfg: Res<DoctorsConfig>,
    state: Res<ManagerState>,
    mut roster: ResMut<DoctorRoster>,
) {
    for req in requests.read() {
        let range = cfg.speed_range();
        if !range.contains(&req.speed) {
            warn!(target: "manager", "Ignoring spawn of {} doctors: speed {} outside {}..={}", req.count, req.speed, range.start(), range.end());
            continue;
        }
        for _ in 0..req.count {
            let entity = spawn_doctor(&mut commands, page.document_mut(), &cfg, &state, req.speed);
            roster.doctors.push(entity);
        }
        info!(target: "manager", count = req.count, speed = req.speed, roster = roster.len(), "Spawned doctors");
    }
}

fn broadcast_diagnostics(
    mut events: EventReader<SetDiagnostics>,
    mut state: ResMut<ManagerState>,
    mut q_doctors: Query<&mut Doctor>,
) {
    let Some(SetDiagnostics(enabled)) = events.read().last().copied() else {
        return;
    };
    state.diagnostics = enabled;
    for mut doctor in q_doctors.iter_mut() {
        doctor.diagnostics = enabled;
    }
    info!(target: "manager", "Diagnostics {}", if enabled { "on" } else { "off" });
}

fn broadcast_cleanup(
    mut events: EventReader<BeginCleanup>,
    mut state: ResMut<ManagerState>,
    mut pending: ResMut<PendingRespawns>,
    mut q_doctors: Query<&mut Doctor>,
) {
    if events.read().count() == 0 || state.cleaning_up {
        return;
    }
    state.cleaning_up = true;
    pending.0.clear();
    let mut n = 0;
    for mut doctor in q_doctors.iter_mut() {
        doctor.begin_cleanup();
        n += 1;
    }
    info!(target: "manager", "Cleanup started for {n} doctors");
}

/// Runs as many heartbeats per doctor as elapsed since last frame.
fn tick_doctors(
    time: Res<Time>,
    mut page: NonSendMut<Page>,
    cfg: Res<DoctorsConfig>,
    mut rng: ResMut<DoctorRng>,
    mut q_doctors: Query<(&mut Doctor, &mut Heartbeat)>,
) {
    let page = page.document_mut();
    for (mut doctor, mut heartbeat) in q_doctors.iter_mut() {
        heartbeat.tick(time.delta());
        for _ in 0..heartbeat.times_finished_this_tick() {
            if !doctor.alive {
                break;
            }
            doctor.tick(page, &cfg, &mut rng.0);
        }
    }
}

fn despawn_dead(
    mut commands: Commands,
    mut page: NonSendMut<Page>,
    mut roster: ResMut<DoctorRoster>,
    state: Res<ManagerState>,
    q_doctors: Query<(Entity, &Doctor)>,
    mut died: EventWriter<DoctorDied>,
) {
    for (entity, doctor) in q_doctors.iter() {
        if doctor.alive {
            continue;
        }
        page.remove_element(doctor.element);
        commands.entity(entity).despawn();
        roster.remove(entity);
        debug!(target: "manager", "Doctor {} gone, {} left", doctor.element, roster.len());
        died.write(DoctorDied {
            entity,
            element: doctor.element,
            speed: doctor.speed,
            during_cleanup: doctor.cleaning_up || state.cleaning_up,
        });
    }
}

fn schedule_respawns(
    mut died: EventReader<DoctorDied>,
    cfg: Res<DoctorsConfig>,
    mut pending: ResMut<PendingRespawns>,
) {
    for death in died.read() {
        if death.during_cleanup || !cfg.respawn.enabled || cfg.respawn.count == 0 {
            continue;
        }
        pending.0.push(PendingRespawn {
            timer: Timer::from_seconds(cfg.respawn.delay_secs.max(0.0), TimerMode::Once),
            count: cfg.respawn.count,
            speed: death.speed,
        });
    }
}

fn tick_respawns(
    time: Res<Time>,
    state: Res<ManagerState>,
    mut pending: ResMut<PendingRespawns>,
    mut spawn: EventWriter<SpawnDoctors>,
) {
    if state.cleaning_up {
        pending.0.clear();
        return;
    }
    pending.0.retain_mut(|p| {
        p.timer.tick(time.delta());
        if p.timer.finished() {
            spawn.write(SpawnDoctors {
                count: p.count,
                speed: p.speed,
            });
            false
        } else {
            true
        }
    });
}

/// Manager operations callable from outside the schedule (wasm exports, tests).
pub trait DoctorManagerExt {
    fn spawn_doctors(&mut self, count: usize, speed: f32);
    fn set_doctor_diagnostics(&mut self, enabled: bool);
    fn begin_doctor_cleanup(&mut self);
}

impl DoctorManagerExt for World {
    fn spawn_doctors(&mut self, count: usize, speed: f32) {
        self.send_event(SpawnDoctors { count, speed });
    }

    fn set_doctor_diagnostics(&mut self, enabled: bool) {
        self.send_event(SetDiagnostics(enabled));
    }

    fn begin_doctor_cleanup(&mut self) {
        self.send_event(BeginCleanup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_removal_keeps_order() {
        let mut roster = DoctorRoster::default();
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let c = Entity::from_raw(3);
        roster.doctors.extend([a, b, c]);
        roster.remove(b);
        assert_eq!(roster.iter().collect::<Vec<_>>(), vec![a, c]);
        assert!(!roster.contains(b));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        use rand::Rng;
        let cfg = DoctorsConfig {
            seed: Some(42),
            ..Default::default()
        };
        let mut a = DoctorRng::from_config(&cfg);
        let mut b = DoctorRng::from_config(&cfg);
        let xs: Vec<u32> = (0..8).map(|_| a.gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }
}
