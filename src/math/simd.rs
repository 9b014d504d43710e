//! Data-parallel float abstraction.
//!
//! The whole sampling pipeline is written once against `SimdFloat` and runs
//! either per-pixel (`f32`, one lane) or eight pixels at a time
//! (`wide::f32x8`). Branches become mask selects so the two paths stay
//! instruction-for-instruction identical.

use std::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Sub};

use wide::{f32x8, CmpEq, CmpGe, CmpGt, CmpLe, CmpLt};

/// Per-lane boolean produced by the comparison operators.
pub trait SimdMask: Copy + BitAnd<Output = Self> + BitOr<Output = Self> {
    /// True if any lane is set.
    fn any(self) -> bool;
    /// True if every lane is set.
    fn all(self) -> bool;
}

/// A float value that is either a scalar or a fixed-width batch of lanes.
///
/// Comparisons produce a [`SimdMask`]; data-dependent control flow is
/// expressed with [`SimdFloat::blend`] rather than `if`.
pub trait SimdFloat:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    type Mask: SimdMask;

    /// Number of lanes processed per value.
    const LANES: usize;

    /// Broadcast a scalar into every lane.
    fn splat(v: f32) -> Self;

    /// Read one lane back as a scalar. `lane` must be below `LANES`.
    fn extract(self, lane: usize) -> f32;

    /// The first lane (the scalar value in the one-lane case).
    fn first(self) -> f32 {
        self.extract(0)
    }

    fn sqrt(self) -> Self;
    fn abs(self) -> Self;
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;
    fn ln(self) -> Self;
    fn exp(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn acos(self) -> Self;
    fn atan2(self, x: Self) -> Self;

    /// Lane-wise power with a lane exponent.
    fn pow(self, n: Self) -> Self;

    fn cmp_lt(self, other: Self) -> Self::Mask;
    fn cmp_le(self, other: Self) -> Self::Mask;
    fn cmp_gt(self, other: Self) -> Self::Mask;
    fn cmp_ge(self, other: Self) -> Self::Mask;
    fn cmp_eq(self, other: Self) -> Self::Mask;

    /// Per-lane select: `if_true` where the mask is set, `if_false` elsewhere.
    fn blend(mask: Self::Mask, if_true: Self, if_false: Self) -> Self;

    fn powf(self, n: f32) -> Self {
        self.pow(Self::splat(n))
    }

    fn clamp01(self) -> Self {
        self.max(Self::splat(0.0)).min(Self::splat(1.0))
    }

    /// Mask with every lane set.
    fn true_mask() -> Self::Mask {
        Self::splat(0.0).cmp_eq(Self::splat(0.0))
    }

    /// Mask with no lane set.
    fn false_mask() -> Self::Mask {
        Self::splat(0.0).cmp_gt(Self::splat(0.0))
    }
}

// ─── Scalar lane ─────────────────────────────────────────────

impl SimdMask for bool {
    #[inline(always)]
    fn any(self) -> bool {
        self
    }

    #[inline(always)]
    fn all(self) -> bool {
        self
    }
}

impl SimdFloat for f32 {
    type Mask = bool;

    const LANES: usize = 1;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        v
    }

    #[inline(always)]
    fn extract(self, _lane: usize) -> f32 {
        self
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    #[inline(always)]
    fn abs(self) -> Self {
        f32::abs(self)
    }

    #[inline(always)]
    fn min(self, other: Self) -> Self {
        f32::min(self, other)
    }

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        f32::max(self, other)
    }

    #[inline(always)]
    fn ln(self) -> Self {
        f32::ln(self)
    }

    #[inline(always)]
    fn exp(self) -> Self {
        f32::exp(self)
    }

    #[inline(always)]
    fn sin(self) -> Self {
        f32::sin(self)
    }

    #[inline(always)]
    fn cos(self) -> Self {
        f32::cos(self)
    }

    #[inline(always)]
    fn tan(self) -> Self {
        f32::tan(self)
    }

    #[inline(always)]
    fn acos(self) -> Self {
        f32::acos(self)
    }

    #[inline(always)]
    fn atan2(self, x: Self) -> Self {
        f32::atan2(self, x)
    }

    #[inline(always)]
    fn pow(self, n: Self) -> Self {
        f32::powf(self, n)
    }

    #[inline(always)]
    fn cmp_lt(self, other: Self) -> bool {
        self < other
    }

    #[inline(always)]
    fn cmp_le(self, other: Self) -> bool {
        self <= other
    }

    #[inline(always)]
    fn cmp_gt(self, other: Self) -> bool {
        self > other
    }

    #[inline(always)]
    fn cmp_ge(self, other: Self) -> bool {
        self >= other
    }

    #[inline(always)]
    fn cmp_eq(self, other: Self) -> bool {
        self == other
    }

    #[inline(always)]
    fn blend(mask: bool, if_true: Self, if_false: Self) -> Self {
        if mask {
            if_true
        } else {
            if_false
        }
    }
}

// ─── Eight-lane batch ────────────────────────────────────────

// Comparison results carry all-ones lanes for true and zero lanes for
// false; a lane is set exactly when its bits are non-zero.
impl SimdMask for f32x8 {
    #[inline(always)]
    fn any(self) -> bool {
        self.as_array_ref().iter().any(|lane| lane.to_bits() != 0)
    }

    #[inline(always)]
    fn all(self) -> bool {
        self.as_array_ref().iter().all(|lane| lane.to_bits() != 0)
    }
}

impl SimdFloat for f32x8 {
    type Mask = f32x8;

    const LANES: usize = 8;

    #[inline(always)]
    fn splat(v: f32) -> Self {
        f32x8::splat(v)
    }

    #[inline(always)]
    fn extract(self, lane: usize) -> f32 {
        self.as_array_ref()[lane]
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        f32x8::sqrt(self)
    }

    #[inline(always)]
    fn abs(self) -> Self {
        f32x8::abs(self)
    }

    #[inline(always)]
    fn min(self, other: Self) -> Self {
        f32x8::min(self, other)
    }

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        f32x8::max(self, other)
    }

    #[inline(always)]
    fn ln(self) -> Self {
        f32x8::ln(self)
    }

    #[inline(always)]
    fn exp(self) -> Self {
        f32x8::exp(self)
    }

    #[inline(always)]
    fn sin(self) -> Self {
        f32x8::sin(self)
    }

    #[inline(always)]
    fn cos(self) -> Self {
        f32x8::cos(self)
    }

    #[inline(always)]
    fn tan(self) -> Self {
        f32x8::tan(self)
    }

    #[inline(always)]
    fn acos(self) -> Self {
        f32x8::acos(self)
    }

    #[inline(always)]
    fn atan2(self, x: Self) -> Self {
        f32x8::atan2(self, x)
    }

    // exp/ln form so a zero base degrades to zero instead of poisoning the
    // lane; exponents in the pipeline are non-negative.
    #[inline(always)]
    fn pow(self, n: Self) -> Self {
        (f32x8::ln(f32x8::max(self, f32x8::splat(1e-30))) * n).exp()
    }

    #[inline(always)]
    fn cmp_lt(self, other: Self) -> f32x8 {
        <f32x8 as CmpLt>::cmp_lt(self, other)
    }

    #[inline(always)]
    fn cmp_le(self, other: Self) -> f32x8 {
        <f32x8 as CmpLe>::cmp_le(self, other)
    }

    #[inline(always)]
    fn cmp_gt(self, other: Self) -> f32x8 {
        <f32x8 as CmpGt>::cmp_gt(self, other)
    }

    #[inline(always)]
    fn cmp_ge(self, other: Self) -> f32x8 {
        <f32x8 as CmpGe>::cmp_ge(self, other)
    }

    #[inline(always)]
    fn cmp_eq(self, other: Self) -> f32x8 {
        <f32x8 as CmpEq>::cmp_eq(self, other)
    }

    #[inline(always)]
    fn blend(mask: f32x8, if_true: Self, if_false: Self) -> Self {
        mask.blend(if_true, if_false)
    }
}
