//! Colors and the fixed 7-color spectrum palette.

/// Straight (non-premultiplied) RGBA with a float alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

pub const BACKGROUND: Color = Color::rgb(0x0b, 0x0d, 0x17);

pub const PALETTE: [Color; 7] = [
    Color::rgb(0xff, 0x6b, 0x6b),
    Color::rgb(0xff, 0xa9, 0x4d),
    Color::rgb(0xfe, 0xca, 0x57),
    Color::rgb(0x1d, 0xd1, 0xa1),
    Color::rgb(0x48, 0xdb, 0xfb),
    Color::rgb(0x54, 0xa0, 0xff),
    Color::rgb(0x9b, 0x59, 0xff),
];

/// Palette entry for bin `index` out of `count`, spread evenly across the
/// spectrum so low bins are warm and high bins are cool.
pub fn bin_color(index: usize, count: usize) -> Color {
    let slot = index * PALETTE.len() / count.max(1);
    PALETTE[slot.min(PALETTE.len() - 1)]
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Component-wise blend toward `other` (`t = 0` is self, `t = 1` is other).
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Scale brightness, keeping alpha.
    pub fn darken(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * f) as u8,
            g: (self.g as f32 * f) as u8,
            b: (self.b as f32 * f) as u8,
            a: self.a,
        }
    }

    /// Build a color from hue (degrees), saturation and lightness in [0, 1].
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(channel(r), channel(g), channel(b))
    }

    /// Hue, saturation and lightness of this color.
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let delta = max - min;
        if delta <= f32::EPSILON {
            return (0.0, 0.0, l);
        }

        let s = delta / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        (h, s, l)
    }

    /// Rotate the hue by `degrees`, keeping saturation, lightness and alpha.
    pub fn rotate_hue(self, degrees: f32) -> Self {
        if degrees.rem_euclid(360.0) == 0.0 {
            return self;
        }
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h + degrees, s, l).with_alpha(self.a)
    }
}
