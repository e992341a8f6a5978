//! Gif frame selection for the doctor's `<img>` element.

use crate::gameplay::doctor::activity::Activity;
use crate::rendering::palette::palette::DoctorColor;

/// The (action, color) pair currently shown by a doctor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteFrame {
    pub action_code: u8,
    pub color: DoctorColor,
}

impl SpriteFrame {
    pub fn new(activity: Activity, color: DoctorColor) -> Self {
        Self {
            action_code: activity.action_code(),
            color,
        }
    }

    /// `<base><action code>_<color>.gif`
    pub fn image_url(&self, base: &str) -> String {
        format!("{base}{}_{}.gif", self.action_code, self.color.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_scheme() {
        let frame = SpriteFrame::new(Activity::Running, DoctorColor::Blue);
        assert_eq!(
            frame.image_url("/images/plague-doctor-gif"),
            "/images/plague-doctor-gif2_blue.gif"
        );
        assert_eq!(
            SpriteFrame::new(Activity::Walking, DoctorColor::Blue),
            frame
        );
    }
}
