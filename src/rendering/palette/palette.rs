//! Doctor color palette: the six sprite colors, their asset names and the
//! base hex values used when a doctor paints an element.

use rand::Rng;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoctorColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl DoctorColor {
    pub const ALL: [DoctorColor; 6] = [
        DoctorColor::Red,
        DoctorColor::Orange,
        DoctorColor::Yellow,
        DoctorColor::Green,
        DoctorColor::Blue,
        DoctorColor::Purple,
    ];

    /// Name used in asset file names and element attributes.
    pub fn name(self) -> &'static str {
        match self {
            DoctorColor::Red => "red",
            DoctorColor::Orange => "orange",
            DoctorColor::Yellow => "yellow",
            DoctorColor::Green => "green",
            DoctorColor::Blue => "blue",
            DoctorColor::Purple => "purple",
        }
    }

    /// Medium tone of the sprite color, the starting point for painted elements.
    pub fn base_rgb(self) -> [u8; 3] {
        match self {
            DoctorColor::Red => [0xe6, 0x00, 0x00],
            DoctorColor::Orange => [0xe6, 0x63, 0x00],
            DoctorColor::Yellow => [0xd9, 0xe6, 0x00],
            DoctorColor::Green => [0x55, 0xa8, 0x3f],
            DoctorColor::Blue => [0x00, 0xa1, 0xe6],
            DoctorColor::Purple => [0xb6, 0x00, 0xe6],
        }
    }

    /// `#rrggbb` of the base tone darkened by `intensity * step` per channel (saturating).
    pub fn darkened_hex(self, intensity: u32, step: u8) -> String {
        let amount = intensity.saturating_mul(step as u32).min(u8::MAX as u32) as u8;
        let [r, g, b] = self.base_rgb().map(|c| c.saturating_sub(amount));
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// A palette color different from `self`.
    pub fn other<R: Rng + ?Sized>(self, rng: &mut R) -> DoctorColor {
        let others: Vec<DoctorColor> = Self::ALL.into_iter().filter(|c| *c != self).collect();
        others[rng.gen_range(0..others.len())]
    }
}

impl fmt::Display for DoctorColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DoctorColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == lowered)
            .ok_or_else(|| format!("non-valid color specified: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn names_round_trip() {
        for c in DoctorColor::ALL {
            assert_eq!(c.name().parse::<DoctorColor>(), Ok(c));
        }
        assert_eq!(" Blue ".parse::<DoctorColor>(), Ok(DoctorColor::Blue));
        assert!("magenta".parse::<DoctorColor>().is_err());
    }

    #[test]
    fn darkening_saturates() {
        assert_eq!(DoctorColor::Green.darkened_hex(0, 8), "#55a83f");
        assert_eq!(DoctorColor::Green.darkened_hex(1, 8), "#4da037");
        assert_eq!(DoctorColor::Red.darkened_hex(2, 8), "#d60000");
        assert_eq!(DoctorColor::Red.darkened_hex(1_000, 8), "#000000");
    }

    #[test]
    fn other_never_repeats() {
        let mut rng = StdRng::seed_from_u64(3);
        for c in DoctorColor::ALL {
            for _ in 0..50 {
                assert_ne!(c.other(&mut rng), c);
            }
        }
    }

    #[test]
    fn all_colors_distinct() {
        for (i, c1) in DoctorColor::ALL.iter().enumerate() {
            for (j, c2) in DoctorColor::ALL.iter().enumerate() {
                if i != j {
                    assert_ne!(c1.base_rgb(), c2.base_rgb(), "duplicate base at {i} and {j}");
                }
            }
        }
    }
}
