//! A single plague doctor: position, looks, and the behavior state machine
//! advanced once per heartbeat tick.

pub mod activity;
pub mod effects;
pub mod targeting;

use bevy::prelude::*;
use rand::Rng;

use crate::core::config::DoctorsConfig;
use crate::page::document::{ElementHandle, PageDocument, SPRITE_INIT_CLASS};
use crate::rendering::palette::palette::DoctorColor;
use crate::rendering::sprite_frames::SpriteFrame;

pub use activity::Activity;
use effects::{RestoreStep, StyledProperty};

/// `true` with probability 1/`n`; never when `n == 0`.
fn one_in<R: Rng + ?Sized>(rng: &mut R, n: u32) -> bool {
    n > 0 && rng.gen_ratio(1, n)
}

/// `true` on every `beat`-th tick (a beat of 0 counts as 1).
fn on_beat(ticks: u32, beat: u32) -> bool {
    ticks % beat.max(1) == 0
}

/// Symmetric arrival band: both offsets strictly inside the tolerance.
pub fn check_arrived(offset: Vec2, tolerance: Vec2) -> bool {
    offset.x.abs() < tolerance.x && offset.y.abs() < tolerance.y
}

#[derive(Component, Debug, Clone)]
pub struct Doctor {
    /// The doctor's own `<img>` element.
    pub element: ElementHandle,
    /// Top-left corner in viewport pixels.
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub activity: Activity,
    pub color: DoctorColor,
    /// Facing left.
    pub reversed: bool,
    pub target: Option<ElementHandle>,
    /// Ticks spent in the current activity, counting the current tick.
    pub activity_ticks: u32,
    pub alive: bool,
    pub cleaning_up: bool,
    pub diagnostics: bool,
    /// Heartbeat multiplier this doctor was spawned with.
    pub speed: f32,
    age_ticks: u32,
    shown: Option<SpriteFrame>,
}

impl Doctor {
    pub fn new(element: ElementHandle, cfg: &DoctorsConfig, speed: f32) -> Self {
        Self {
            element,
            position: cfg.sprite.spawn_position(),
            velocity: Vec2::ZERO,
            size: cfg.sprite.size(),
            activity: Activity::Idle,
            color: cfg.sprite.initial_color(),
            reversed: false,
            target: None,
            activity_ticks: 0,
            alive: true,
            cleaning_up: false,
            diagnostics: cfg.diagnostics,
            speed,
            age_ticks: 0,
            shown: None,
        }
    }

    /// Puts the doctor on the page in its initial pose.
    pub fn attach(&mut self, page: &mut dyn PageDocument, cfg: &DoctorsConfig) {
        self.render(page, cfg);
    }

    /// Bottom-center of the doctor's box: the point that has to reach a target's anchor.
    pub fn feet(&self) -> Vec2 {
        Vec2::new(self.position.x + self.size.x * 0.5, self.position.y + self.size.y)
    }

    pub fn frame(&self) -> SpriteFrame {
        SpriteFrame::new(self.activity, self.color)
    }

    /// Switches activity; always resets the tick counter.
    pub fn set_activity(&mut self, activity: Activity) {
        self.activity = activity;
        self.activity_ticks = 0;
    }

    /// Halts in place and goes idle, keeping the target.
    pub fn stop(&mut self) {
        self.set_activity(Activity::Idle);
        self.velocity = Vec2::ZERO;
    }

    fn go_idle(&mut self) {
        self.stop();
        self.target = None;
    }

    fn recolor<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.color = self.color.other(rng);
    }

    /// Starts the death animation. A doctor that is already dying or gone is unaffected.
    pub fn die(&mut self) {
        if !self.alive || self.activity == Activity::Dying {
            return;
        }
        self.go_idle();
        self.set_activity(Activity::Dying);
    }

    /// Enters cleanup mode: whatever the doctor was doing is dropped, and from the
    /// next idle tick on it only seeks out modified elements.
    pub fn begin_cleanup(&mut self) {
        self.cleaning_up = true;
        if self.alive && self.activity != Activity::Dying {
            self.go_idle();
        }
    }

    /// Offset from the doctor's feet to the target's anchor, if the target is usable.
    pub fn offset_to(&self, page: &dyn PageDocument, target: ElementHandle) -> Option<Vec2> {
        let rect = targeting::valid_box(page, target)?;
        Some(targeting::anchor_of(rect) - self.feet())
    }

    fn target_valid(&self, page: &dyn PageDocument) -> bool {
        self.target
            .is_some_and(|t| targeting::valid_box(page, t).is_some())
    }

    /// One heartbeat.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        page: &mut dyn PageDocument,
        cfg: &DoctorsConfig,
        rng: &mut R,
    ) {
        if !self.alive {
            return;
        }
        self.activity_ticks += 1;
        self.age_ticks += 1;
        if self.age_ticks == cfg.sprite.init_fade_ticks {
            page.remove_class(self.element, SPRITE_INIT_CLASS);
        }

        if self.activity.is_targeted() && !self.target_valid(page) {
            // Target vanished or collapsed: give up on it and idle this tick.
            self.go_idle();
        }

        match self.activity {
            Activity::Idle => self.idle(page, cfg, rng),
            Activity::Walking | Activity::Running => self.travel(page, cfg, rng),
            Activity::Looking => {
                if one_in(rng, cfg.behavior.stop_looking_chance) {
                    self.go_idle();
                }
            }
            Activity::Whacking => {
                if self.activity_ticks > cfg.behavior.whack_min_ticks
                    && one_in(rng, cfg.behavior.stop_whacking_chance)
                {
                    self.set_activity(Activity::Looking);
                } else {
                    self.whack(page, cfg);
                }
            }
            Activity::Coloring => self.coloring(page, cfg, rng),
            Activity::Cleaning => self.cleaning(page, cfg),
            Activity::Dying => {
                if self.activity_ticks > cfg.behavior.dying_ticks {
                    self.vanish(page);
                    return;
                }
            }
        }

        self.render(page, cfg);
        if self.diagnostics {
            info!(target: "doctor", "❤️ {}", self.status(page));
        }
    }

    fn idle<R: Rng + ?Sized>(&mut self, page: &mut dyn PageDocument, cfg: &DoctorsConfig, rng: &mut R) {
        if self.cleaning_up {
            match targeting::nearest_modified(page, self.feet()) {
                Some(el) => {
                    self.target = Some(el);
                    self.set_activity(Activity::Running);
                    self.travel(page, cfg, rng);
                }
                None => self.die(),
            }
            return;
        }
        if !one_in(rng, cfg.behavior.wander_chance) {
            return;
        }
        if let Some(el) =
            targeting::pick_random_element(page, self.element, cfg.targeting.attempts, rng)
        {
            self.target = Some(el);
            self.set_activity(Activity::Walking);
            self.travel(page, cfg, rng);
        }
    }

    /// Walking / running step toward the target anchor.
    fn travel<R: Rng + ?Sized>(&mut self, page: &mut dyn PageDocument, cfg: &DoctorsConfig, rng: &mut R) {
        let traveling = self.activity;
        let Some(offset) = self.target.and_then(|t| self.offset_to(page, t)) else {
            self.go_idle();
            return;
        };
        let tolerance = Vec2::new(
            cfg.movement.arrival_tolerance_x,
            cfg.movement.arrival_tolerance_y,
        );
        if check_arrived(offset, tolerance) {
            self.stop();
            let next = match traveling {
                Activity::Running => Activity::Cleaning,
                _ => [Activity::Looking, Activity::Whacking, Activity::Coloring]
                    [rng.gen_range(0..3)],
            };
            self.set_activity(next);
            return;
        }
        if traveling == Activity::Walking && one_in(rng, cfg.behavior.abandon_walk_chance) {
            self.go_idle();
            self.recolor(rng);
            return;
        }
        let speed = match traveling {
            Activity::Running => cfg.movement.running_speed,
            _ => cfg.movement.walking_speed,
        };
        self.steer(offset, speed, cfg.movement.facing_threshold);
        self.position += self.velocity;
    }

    /// Points the velocity along `offset`, never overshooting the anchor.
    fn steer(&mut self, offset: Vec2, speed: f32, facing_threshold: f32) {
        self.velocity = if offset.length() <= speed {
            offset
        } else {
            offset.normalize_or_zero() * speed
        };
        if self.velocity.x < -facing_threshold {
            self.reversed = true;
        } else if self.velocity.x > facing_threshold {
            self.reversed = false;
        }
    }

    /// Whacks the target on beat. `None` when no whack happened this tick.
    pub fn whack(&mut self, page: &mut dyn PageDocument, cfg: &DoctorsConfig) -> Option<i32> {
        if !on_beat(self.activity_ticks, cfg.behavior.whack_beat) {
            return None;
        }
        let target = self.target.filter(|_| self.target_valid(page))?;
        let delta = if self.reversed { -1 } else { 1 };
        Some(effects::apply_whack(page, target, delta, cfg))
    }

    fn coloring<R: Rng + ?Sized>(&mut self, page: &mut dyn PageDocument, cfg: &DoctorsConfig, rng: &mut R) {
        if self.activity_ticks > cfg.behavior.color_min_ticks
            && one_in(rng, cfg.behavior.stop_coloring_chance)
        {
            self.set_activity(Activity::Looking);
            self.recolor(rng);
            return;
        }
        if !on_beat(self.activity_ticks, cfg.behavior.color_beat) {
            return;
        }
        let Some(target) = self.target else {
            return;
        };
        let property = StyledProperty::random(rng);
        let intensity = effects::apply_color(page, target, property, self.color, cfg);
        if intensity > cfg.coloring.ceiling {
            self.go_idle();
            self.recolor(rng);
        }
    }

    fn cleaning(&mut self, page: &mut dyn PageDocument, cfg: &DoctorsConfig) {
        if !on_beat(self.activity_ticks, cfg.cleanup.beat) {
            return;
        }
        let Some(target) = self.target else {
            return;
        };
        if effects::restore_step(page, target, cfg) == RestoreStep::Restored {
            self.go_idle();
        }
    }

    fn vanish(&mut self, page: &mut dyn PageDocument) {
        self.alive = false;
        self.velocity = Vec2::ZERO;
        page.set_style(self.element, "display", "none");
    }

    fn render(&mut self, page: &mut dyn PageDocument, cfg: &DoctorsConfig) {
        page.set_style(self.element, "left", &format!("{}px", self.position.x));
        page.set_style(self.element, "top", &format!("{}px", self.position.y));
        if self.reversed {
            page.set_style(self.element, "transform", "scaleX(-1)");
        } else {
            page.remove_style(self.element, "transform");
        }
        let frame = self.frame();
        if self.shown != Some(frame) {
            page.set_attribute(
                self.element,
                "src",
                &frame.image_url(&cfg.sprite.image_base_url),
            );
            self.shown = Some(frame);
        }
    }

    /// One-line description for diagnostics: position, activity and target.
    pub fn status(&self, page: &dyn PageDocument) -> String {
        let mut line = format!(
            "At ({:.0},{:.0}), {} {}",
            self.position.x, self.position.y, self.color, self.activity
        );
        if self.activity.is_targeted() {
            if let Some(t) = self.target {
                let classes = page.class_names(t).join(" ");
                line.push_str(&format!(" {} {t} [{classes}]", self.activity.preposition()));
            }
        }
        if self.cleaning_up {
            line.push_str(" (cleaning up)");
        }
        line
    }
}
