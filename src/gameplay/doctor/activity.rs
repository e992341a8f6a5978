use std::fmt;

/// What a doctor is currently doing. Exactly one at a time; every transition
/// resets the doctor's activity tick counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Activity {
    #[default]
    Idle,
    Walking,
    Running,
    Looking,
    Whacking,
    Coloring,
    Cleaning,
    /// Terminal: after the death animation the doctor vanishes.
    Dying,
}

impl Activity {
    pub fn name(self) -> &'static str {
        match self {
            Activity::Idle => "idle",
            Activity::Walking => "walking",
            Activity::Running => "running",
            Activity::Looking => "looking",
            Activity::Whacking => "whacking",
            Activity::Coloring => "coloring",
            Activity::Cleaning => "cleaning",
            Activity::Dying => "dying",
        }
    }

    /// Activities that act on (or travel to) a target element.
    pub fn is_targeted(self) -> bool {
        !matches!(self, Activity::Idle | Activity::Dying)
    }

    /// Sprite sheet code. Visually identical activities share one.
    pub fn action_code(self) -> u8 {
        match self {
            Activity::Idle => 0,
            Activity::Looking => 1,
            Activity::Walking | Activity::Running => 2,
            Activity::Whacking => 3,
            Activity::Coloring => 4,
            Activity::Cleaning => 5,
            Activity::Dying => 6,
        }
    }

    /// Relation to the target used in status lines ("walking to", "looking at").
    pub(crate) fn preposition(self) -> &'static str {
        match self {
            Activity::Walking | Activity::Running => "to",
            Activity::Looking => "at",
            _ => "on",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
