//! 8-bit RGB colors and the Chebyshev color metric.

use serde::{Deserialize, Serialize};

/// An RGB color with 8-bit channels. Palette entries are stored as this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert a color with channels in `[0, 1]` to 8-bit channels.
    ///
    /// Each channel is scaled by 255 and rounded half-to-even. Channels that are
    /// not finite or fall outside `[0, 1]` are rejected rather than clamped.
    pub fn try_from_unit(color: [f32; 3]) -> Result<Self, String> {
        let mut channels = [0u8; 3];
        for (i, &c) in color.iter().enumerate() {
            if !c.is_finite() {
                return Err(format!("channel {} is not finite ({})", i, c));
            }
            if !(0.0..=1.0).contains(&c) {
                return Err(format!("channel {} is outside [0, 1] ({})", i, c));
            }
            channels[i] = (c * 255.0).round_ties_even() as u8;
        }
        Ok(Self::from(channels))
    }

    /// Channels as floats in `[0, 1]`.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Chebyshev distance to another color. See [`chebyshev_distance`].
    pub fn distance(self, other: Rgb8) -> u8 {
        chebyshev_distance(self, other)
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(c: Rgb8) -> Self {
        c.to_array()
    }
}

impl std::fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Largest absolute per-channel difference between two colors (L∞ norm).
///
/// A single channel that deviates a lot is enough to keep two colors apart,
/// even when the other channels are identical.
pub fn chebyshev_distance(a: Rgb8, b: Rgb8) -> u8 {
    a.r.abs_diff(b.r)
        .max(a.g.abs_diff(b.g))
        .max(a.b.abs_diff(b.b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_max_channel_difference() {
        let a = Rgb8::new(10, 200, 30);
        let b = Rgb8::new(12, 190, 31);
        assert_eq!(chebyshev_distance(a, b), 10);
        assert_eq!(chebyshev_distance(b, a), 10);
        assert_eq!(a.distance(a), 0);
    }

    #[test]
    fn test_single_channel_dominates() {
        let a = Rgb8::new(0, 0, 0);
        let b = Rgb8::new(0, 255, 0);
        assert_eq!(chebyshev_distance(a, b), 255);
    }

    #[test]
    fn test_from_unit_rounding() {
        assert_eq!(Rgb8::try_from_unit([1.0, 0.0, 0.0]).unwrap(), Rgb8::new(255, 0, 0));
        assert_eq!(
            Rgb8::try_from_unit([0.99, 0.01, 0.0]).unwrap(),
            Rgb8::new(252, 3, 0)
        );
        // 0.5 * 255 = 127.5 rounds to the even neighbour
        assert_eq!(Rgb8::try_from_unit([0.5, 0.5, 0.5]).unwrap(), Rgb8::new(128, 128, 128));
    }

    #[test]
    fn test_from_unit_rejects_out_of_range() {
        assert!(Rgb8::try_from_unit([1.5, 0.0, 0.0]).is_err());
        assert!(Rgb8::try_from_unit([0.0, -0.1, 0.0]).is_err());
        assert!(Rgb8::try_from_unit([0.0, 0.0, f32::NAN]).is_err());
    }

    #[test]
    fn test_display_hex() {
        assert_eq!(Rgb8::new(255, 0, 16).to_string(), "#ff0010");
    }
}
