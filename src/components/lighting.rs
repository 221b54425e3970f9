use serde::{Deserialize, Serialize};

/// RGBA light color, components in 0..1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const CLEAR: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    /// Default light color: warm grey at 75% alpha.
    pub const DEFAULT_LIGHT: Color = Color::new(0.75, 0.75, 0.5, 0.75);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Pack into a single float, ABGR byte order. Bit 24 is masked so the
    /// packed value can never be a NaN pattern.
    pub fn to_float_bits(self) -> f32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u32;
        let packed = (channel(self.a) << 24)
            | (channel(self.b) << 16)
            | (channel(self.g) << 8)
            | channel(self.r);
        f32::from_bits(packed & 0xfeff_ffff)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::DEFAULT_LIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_color_is_never_nan() {
        for c in [Color::WHITE, Color::BLACK, Color::CLEAR, Color::new(1.0, 0.0, 1.0, 1.0)] {
            assert!(!c.to_float_bits().is_nan());
        }
    }

    #[test]
    fn packs_abgr() {
        let bits = Color::new(1.0, 0.0, 0.0, 0.0).to_float_bits().to_bits();
        assert_eq!(bits, 0x0000_00ff);
        let bits = Color::new(0.0, 0.0, 1.0, 0.0).to_float_bits().to_bits();
        assert_eq!(bits, 0x00ff_0000);
    }

    #[test]
    fn clear_packs_to_zero() {
        assert_eq!(Color::CLEAR.to_float_bits().to_bits(), 0);
    }
}
