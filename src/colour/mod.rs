//! Colour types and conversions.
//!
//! Three representations flow through the renderer:
//!
//! - [`Colour8`] — 4 bytes, RGBA order, generic gamma.
//! - [`ColourRGBA`] — floating point, sRGB gamma, 0.0..1.0 nominal range,
//!   straight (not premultiplied) alpha.
//! - [`ColourLinear`] — floating point, light-linear, produced from
//!   [`ColourRGBA`] by gamma removal.
//!
//! All floating types are generic over the lane abstraction, so one value can
//! carry a whole batch of pixels.

use crate::math::simd::SimdFloat;
use crate::math::vector::Vec3;

pub const WHITE_8: f32 = 255.0;

// ─── 8-bit colour ────────────────────────────────────────────

/// 8 bits per channel, RGBA memory order, 4 bytes total.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Colour8 {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Default for Colour8 {
    fn default() -> Self {
        Self { red: 0, green: 0, blue: 0, alpha: 0xff }
    }
}

impl Colour8 {
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Pack into a word in RGBA bit order, independent of memory layout.
    /// Mainly useful for display; not interchangeable with
    /// [`Colour8::to_uint32_keep_memory_layout`].
    pub fn to_uint32(self) -> u32 {
        (u32::from(self.red) << 24)
            | (u32::from(self.green) << 16)
            | (u32::from(self.blue) << 8)
            | u32::from(self.alpha)
    }

    /// The raw in-memory representation as a word (endian dependent).
    pub fn to_uint32_keep_memory_layout(self) -> u32 {
        u32::from_ne_bytes([self.red, self.green, self.blue, self.alpha])
    }
}

/// Map one component from [0, 1] to [0, 255], truncating toward zero.
/// Out-of-range input clamps rather than wraps.
#[inline(always)]
pub fn float_to_8bit(c: f32) -> u8 {
    let a = c * WHITE_8;
    if a <= 0.0 {
        0
    } else if a >= WHITE_8 {
        0xff
    } else {
        a as u8
    }
}

// ─── Floating point sRGB colour ──────────────────────────────

/// Floating point colour in sRGB gamma space, straight alpha.
#[derive(Clone, Copy, Debug)]
pub struct ColourRGBA<S> {
    pub red: S,
    pub green: S,
    pub blue: S,
    pub alpha: S,
}

impl<S: SimdFloat> Default for ColourRGBA<S> {
    fn default() -> Self {
        Self {
            red: S::splat(0.0),
            green: S::splat(0.0),
            blue: S::splat(0.0),
            alpha: S::splat(1.0),
        }
    }
}

impl<S: SimdFloat> ColourRGBA<S> {
    pub fn new(red: S, green: S, blue: S, alpha: S) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Construct with opaque alpha.
    pub fn rgb(red: S, green: S, blue: S) -> Self {
        Self::new(red, green, blue, S::splat(1.0))
    }

    /// Broadcast scalar components into every lane.
    pub fn broadcast(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self::new(S::splat(red), S::splat(green), S::splat(blue), S::splat(alpha))
    }

    /// Construct from HSL values, all in 0..1.
    pub fn from_hsl(alpha: S, hue: S, saturation: S, lightness: S) -> Self {
        hsl_to_rgb(alpha, hue, saturation, lightness)
    }

    /// Convert to linear using the piecewise sRGB transfer function.
    /// Assumes straight alpha; no gamma is applied to the alpha channel.
    pub fn to_linear(&self) -> ColourLinear<S> {
        ColourLinear {
            red: srgb_to_linear(self.red),
            green: srgb_to_linear(self.green),
            blue: srgb_to_linear(self.blue),
            alpha: self.alpha,
        }
    }

    /// Convert to linear with a plain 2.2 power (faster than the piecewise
    /// curve, close to it over the nominal range).
    pub fn to_linear_simple(&self) -> ColourLinear<S> {
        ColourLinear {
            red: self.red.powf(2.2),
            green: self.green.powf(2.2),
            blue: self.blue.powf(2.2),
            alpha: self.alpha,
        }
    }

    /// Narrow one lane to an 8-bit colour.
    pub fn to_colour8(&self, lane: usize) -> Colour8 {
        Colour8::new(
            float_to_8bit(self.red.extract(lane)),
            float_to_8bit(self.green.extract(lane)),
            float_to_8bit(self.blue.extract(lane)),
            float_to_8bit(self.alpha.extract(lane)),
        )
    }

    /// Multiply the alpha channel through the colour, for premultiplied
    /// buffers. Everything else in this crate assumes straight alpha.
    pub fn premultiply_alpha(&self) -> Self {
        Self::new(
            self.red * self.alpha,
            self.green * self.alpha,
            self.blue * self.alpha,
            self.alpha,
        )
    }

    /// Inverse of [`ColourRGBA::premultiply_alpha`]. Division by a zero
    /// alpha propagates IEEE infinities/NaN; callers must guard.
    pub fn un_premultiply_alpha(&self) -> Self {
        Self::new(
            self.red / self.alpha,
            self.green / self.alpha,
            self.blue / self.alpha,
            self.alpha,
        )
    }

    /// Clamp every component to 0.0..1.0.
    pub fn clamp(&self) -> Self {
        Self::new(
            self.red.clamp01(),
            self.green.clamp01(),
            self.blue.clamp01(),
            self.alpha.clamp01(),
        )
    }

    /// Clamp negative components to zero, leaving HDR values above 1 alone.
    pub fn no_negatives(&self) -> Self {
        let zero = S::splat(0.0);
        Self::new(
            self.red.max(zero),
            self.green.max(zero),
            self.blue.max(zero),
            self.alpha.max(zero),
        )
    }
}

// Blend operators accumulate light: they touch R, G, B only and keep the
// left-hand alpha, which tracks coverage separately.

impl<S: SimdFloat> std::ops::AddAssign for ColourRGBA<S> {
    fn add_assign(&mut self, rhs: Self) {
        self.red = self.red + rhs.red;
        self.green = self.green + rhs.green;
        self.blue = self.blue + rhs.blue;
    }
}

impl<S: SimdFloat> std::ops::AddAssign<S> for ColourRGBA<S> {
    fn add_assign(&mut self, rhs: S) {
        self.red = self.red + rhs;
        self.green = self.green + rhs;
        self.blue = self.blue + rhs;
    }
}

impl<S: SimdFloat> std::ops::MulAssign for ColourRGBA<S> {
    fn mul_assign(&mut self, rhs: Self) {
        self.red = self.red * rhs.red;
        self.green = self.green * rhs.green;
        self.blue = self.blue * rhs.blue;
    }
}

impl<S: SimdFloat> std::ops::MulAssign<S> for ColourRGBA<S> {
    fn mul_assign(&mut self, rhs: S) {
        self.red = self.red * rhs;
        self.green = self.green * rhs;
        self.blue = self.blue * rhs;
    }
}

impl<S: SimdFloat> std::ops::Add for ColourRGBA<S> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<S: SimdFloat> std::ops::Mul for ColourRGBA<S> {
    type Output = Self;

    fn mul(mut self, rhs: Self) -> Self {
        self *= rhs;
        self
    }
}

impl<S: SimdFloat> std::ops::Mul<S> for ColourRGBA<S> {
    type Output = Self;

    fn mul(mut self, rhs: S) -> Self {
        self *= rhs;
        self
    }
}

/// Linear interpolation of all four channels; `weight` 0 gives `c1`, 1 gives
/// `c2`.
pub fn mix_colours<S: SimdFloat>(
    c1: &ColourRGBA<S>,
    c2: &ColourRGBA<S>,
    weight: S,
) -> ColourRGBA<S> {
    let inv = S::splat(1.0) - weight;
    ColourRGBA::new(
        c1.red * inv + c2.red * weight,
        c1.green * inv + c2.green * weight,
        c1.blue * inv + c2.blue * weight,
        c1.alpha * inv + c2.alpha * weight,
    )
}

// ─── Linear colour ───────────────────────────────────────────

/// Floating point colour with light-linear components, no gamma.
#[derive(Clone, Copy, Debug)]
pub struct ColourLinear<S> {
    pub red: S,
    pub green: S,
    pub blue: S,
    pub alpha: S,
}

impl<S: SimdFloat> ColourLinear<S> {
    pub fn new(red: S, green: S, blue: S, alpha: S) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Linear RGB as a vector, for lighting arithmetic.
    pub fn to_vec3(&self) -> Vec3<S> {
        Vec3::new(self.red, self.green, self.blue)
    }

    /// Gamma-encode back to sRGB with the piecewise transfer function.
    pub fn to_srgb(&self) -> ColourRGBA<S> {
        ColourRGBA::new(
            linear_to_srgb(self.red),
            linear_to_srgb(self.green),
            linear_to_srgb(self.blue),
            self.alpha,
        )
    }
}

// ─── Transfer functions ──────────────────────────────────────

/// sRGB to linear for one component, lane-wise.
///
/// Piecewise per the sRGB specification inside the nominal range; values at
/// or outside 0..1 fall back to a plain 2.2 power so extrapolated HDR input
/// stays monotonic.
pub fn srgb_to_linear<S: SimdFloat>(c: S) -> S {
    let knee = S::splat(0.04045);
    let curve = ((c + S::splat(0.055)) / S::splat(1.055)).powf(2.4);
    let toe = c / S::splat(12.92);
    let fallback = c.powf(2.2);
    let in_curve = c.cmp_gt(knee) & c.cmp_lt(S::splat(1.0));
    let in_toe = c.cmp_le(knee) & c.cmp_gt(S::splat(0.0));
    S::blend(in_curve, curve, S::blend(in_toe, toe, fallback))
}

/// Linear to sRGB for one component, lane-wise; inverse of
/// [`srgb_to_linear`] including the out-of-range fallback.
pub fn linear_to_srgb<S: SimdFloat>(c: S) -> S {
    let knee = S::splat(0.003_130_8);
    let curve = S::splat(1.055) * c.powf(1.0 / 2.4) - S::splat(0.055);
    let toe = c * S::splat(12.92);
    let fallback = c.powf(1.0 / 2.2);
    let in_curve = c.cmp_gt(knee) & c.cmp_lt(S::splat(1.0));
    let in_toe = c.cmp_le(knee) & c.cmp_gt(S::splat(0.0));
    S::blend(in_curve, curve, S::blend(in_toe, toe, fallback))
}

// ─── HSL ─────────────────────────────────────────────────────

// Helper for hsl_to_rgb; wraps hue into 0..1 before the six-way piecewise
// evaluation.
fn hue_to_rgb<S: SimdFloat>(v1: S, v2: S, h: S) -> S {
    let one = S::splat(1.0);
    let h = S::blend(h.cmp_lt(S::splat(0.0)), h + one, h);
    let h = S::blend(h.cmp_gt(one), h - one, h);

    let six_h = h * S::splat(6.0);
    let rising = v1 + (v2 - v1) * six_h;
    let falling = v1 + (v2 - v1) * (S::splat(2.0 / 3.0) - h) * S::splat(6.0);

    S::blend(
        six_h.cmp_lt(one),
        rising,
        S::blend(
            (h * S::splat(2.0)).cmp_lt(one),
            v2,
            S::blend((h * S::splat(3.0)).cmp_lt(S::splat(2.0)), falling, v1),
        ),
    )
}

/// HSL to RGB, all inputs 0..1. Zero saturation gives the achromatic
/// (l, l, l).
pub fn hsl_to_rgb<S: SimdFloat>(alpha: S, h: S, s: S, l: S) -> ColourRGBA<S> {
    let one = S::splat(1.0);
    let v2 = S::blend(
        l.cmp_lt(S::splat(0.5)),
        l * (one + s),
        (l + s) - (l * s),
    );
    let v1 = S::splat(2.0) * l - v2;
    let third = S::splat(1.0 / 3.0);

    let achromatic = s.cmp_eq(S::splat(0.0));
    ColourRGBA::new(
        S::blend(achromatic, l, hue_to_rgb(v1, v2, h + third)),
        S::blend(achromatic, l, hue_to_rgb(v1, v2, h)),
        S::blend(achromatic, l, hue_to_rgb(v1, v2, h - third)),
        alpha,
    )
}
