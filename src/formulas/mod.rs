//! Fractal shapes and their distance estimators.
//!
//! The selectable set is closed: the triplex-power Mandelbulb at powers 2
//! through 8, each in plain and Julia form. Selection is by the exact UI
//! label; anything unrecognized selects nothing and the scene is left without
//! a root shape.

use crate::engine::scene::Material;
use crate::math::simd::{SimdFloat, SimdMask};
use crate::math::vector::Vec3;

/// Escape radius squared for the iteration loop.
const BAILOUT: f32 = 16.0;

/// The closed set of selectable fractal variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FractalKind {
    MandelbulbPower2,
    MandelbulbJuliaPower2,
    MandelbulbPower3,
    MandelbulbJuliaPower3,
    MandelbulbPower4,
    MandelbulbJuliaPower4,
    MandelbulbPower5,
    MandelbulbJuliaPower5,
    MandelbulbPower6,
    MandelbulbJuliaPower6,
    MandelbulbPower7,
    MandelbulbJuliaPower7,
    MandelbulbPower8,
    MandelbulbJuliaPower8,
}

impl FractalKind {
    /// Match the human-readable selector exactly (case sensitive). Unknown
    /// labels select nothing.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Mandelbulb Power 2" => Some(Self::MandelbulbPower2),
            "Mandelbulb Julia Power 2" => Some(Self::MandelbulbJuliaPower2),
            "Mandelbulb Power 3" => Some(Self::MandelbulbPower3),
            "Mandelbulb Julia Power 3" => Some(Self::MandelbulbJuliaPower3),
            "Mandelbulb Power 4" => Some(Self::MandelbulbPower4),
            "Mandelbulb Julia Power 4" => Some(Self::MandelbulbJuliaPower4),
            "Mandelbulb Power 5" => Some(Self::MandelbulbPower5),
            "Mandelbulb Julia Power 5" => Some(Self::MandelbulbJuliaPower5),
            "Mandelbulb Power 6" => Some(Self::MandelbulbPower6),
            "Mandelbulb Julia Power 6" => Some(Self::MandelbulbJuliaPower6),
            "Mandelbulb Power 7" => Some(Self::MandelbulbPower7),
            "Mandelbulb Julia Power 7" => Some(Self::MandelbulbJuliaPower7),
            "Mandelbulb Power 8" => Some(Self::MandelbulbPower8),
            "Mandelbulb Julia Power 8" => Some(Self::MandelbulbJuliaPower8),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::MandelbulbPower2 => "Mandelbulb Power 2",
            Self::MandelbulbJuliaPower2 => "Mandelbulb Julia Power 2",
            Self::MandelbulbPower3 => "Mandelbulb Power 3",
            Self::MandelbulbJuliaPower3 => "Mandelbulb Julia Power 3",
            Self::MandelbulbPower4 => "Mandelbulb Power 4",
            Self::MandelbulbJuliaPower4 => "Mandelbulb Julia Power 4",
            Self::MandelbulbPower5 => "Mandelbulb Power 5",
            Self::MandelbulbJuliaPower5 => "Mandelbulb Julia Power 5",
            Self::MandelbulbPower6 => "Mandelbulb Power 6",
            Self::MandelbulbJuliaPower6 => "Mandelbulb Julia Power 6",
            Self::MandelbulbPower7 => "Mandelbulb Power 7",
            Self::MandelbulbJuliaPower7 => "Mandelbulb Julia Power 7",
            Self::MandelbulbPower8 => "Mandelbulb Power 8",
            Self::MandelbulbJuliaPower8 => "Mandelbulb Julia Power 8",
        }
    }

    pub fn power(self) -> f32 {
        match self {
            Self::MandelbulbPower2 | Self::MandelbulbJuliaPower2 => 2.0,
            Self::MandelbulbPower3 | Self::MandelbulbJuliaPower3 => 3.0,
            Self::MandelbulbPower4 | Self::MandelbulbJuliaPower4 => 4.0,
            Self::MandelbulbPower5 | Self::MandelbulbJuliaPower5 => 5.0,
            Self::MandelbulbPower6 | Self::MandelbulbJuliaPower6 => 6.0,
            Self::MandelbulbPower7 | Self::MandelbulbJuliaPower7 => 7.0,
            Self::MandelbulbPower8 | Self::MandelbulbJuliaPower8 => 8.0,
        }
    }

    pub fn is_julia(self) -> bool {
        matches!(
            self,
            Self::MandelbulbJuliaPower2
                | Self::MandelbulbJuliaPower3
                | Self::MandelbulbJuliaPower4
                | Self::MandelbulbJuliaPower5
                | Self::MandelbulbJuliaPower6
                | Self::MandelbulbJuliaPower7
                | Self::MandelbulbJuliaPower8
        )
    }
}

/// One configured fractal object: variant, seed point, iteration cap,
/// surface material, and the ray-march step damping it requests.
pub struct Mandelbulb<S> {
    pub kind: FractalKind,
    pub seed: Vec3<S>,
    pub iterations: u32,
    pub material: Material<S>,
    pub step_damping: f32,
}

impl<S: SimdFloat> Mandelbulb<S> {
    pub fn new(
        kind: FractalKind,
        seed_x: f64,
        seed_y: f64,
        seed_z: f64,
        iterations: i32,
        material: Material<S>,
        step_damping: f32,
    ) -> Self {
        Self {
            kind,
            seed: Vec3::broadcast(seed_x as f32, seed_y as f32, seed_z as f32),
            iterations: iterations.max(0) as u32,
            material,
            step_damping,
        }
    }

    /// Lower bound on the distance from `p` to the fractal surface.
    ///
    /// Triplex-power escape-time iteration with derivative tracking; the
    /// estimate is `0.5 * r * ln(r) / |dr|`. Lanes freeze at their escape
    /// iteration so a batch mixes escape times without divergence. Points
    /// that never escape produce a non-positive estimate, which the marcher
    /// reads as an immediate hit.
    pub fn distance_estimate(&self, p: Vec3<S>) -> S {
        let n = self.kind.power();
        let bailout = S::splat(BAILOUT);
        let one = S::splat(1.0);
        let tiny = S::splat(1e-12);

        // Julia variants orbit around a fixed constant; plain variants use
        // the sample point itself, shifted by the seed.
        let c = if self.kind.is_julia() {
            self.seed
        } else {
            p + self.seed
        };

        let mut z = p;
        let mut dr = one;
        let mut escape_r2 = p.length_squared();
        let mut active = S::true_mask();

        for _ in 0..self.iterations {
            let r2 = z.length_squared();
            escape_r2 = S::blend(active, r2, escape_r2);
            active = active & r2.cmp_lt(bailout);
            if !active.any() {
                break;
            }

            let r = r2.sqrt().max(tiny);
            let theta = (z.z / r).acos();
            let phi = z.y.atan2(z.x);

            let dr_next = r.powf(n - 1.0) * S::splat(n) * dr + one;
            let zr = r.powf(n);
            let theta_n = theta * S::splat(n);
            let phi_n = phi * S::splat(n);
            let sin_theta = theta_n.sin();

            let z_next = Vec3::new(
                zr * sin_theta * phi_n.cos(),
                zr * sin_theta * phi_n.sin(),
                zr * theta_n.cos(),
            ) + c;

            z = Vec3::blend(active, z_next, z);
            dr = S::blend(active, dr_next, dr);
        }

        let r = escape_r2.sqrt().max(tiny);
        S::splat(0.5) * r * r.ln() / dr.abs()
    }
}

/// Union root of the scene graph, owning the active fractal objects.
pub struct MultiShape<S> {
    pub shapes: Vec<Mandelbulb<S>>,
}

impl<S: SimdFloat> MultiShape<S> {
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    /// Distance to the nearest child surface.
    pub fn distance(&self, p: Vec3<S>) -> S {
        let mut de = S::splat(f32::MAX);
        for shape in &self.shapes {
            de = de.min(shape.distance_estimate(p));
        }
        de
    }

    /// Material of the owned fractal.
    pub fn material(&self) -> Material<S> {
        match self.shapes.first() {
            Some(shape) => shape.material,
            None => Material::default(),
        }
    }

    /// Step damping requested by the owned fractal (1.0 when empty).
    pub fn step_damping(&self) -> f32 {
        self.shapes.first().map_or(1.0, |s| s.step_damping)
    }
}

impl<S: SimdFloat> Default for MultiShape<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulb(kind: FractalKind) -> Mandelbulb<f32> {
        Mandelbulb::new(kind, 0.0, 0.0, 0.0, 40, Material::default(), 0.9)
    }

    #[test]
    fn test_name_matching_is_exact_and_case_sensitive() {
        assert_eq!(
            FractalKind::from_name("Mandelbulb Power 3"),
            Some(FractalKind::MandelbulbPower3)
        );
        assert_eq!(
            FractalKind::from_name("Mandelbulb Julia Power 8"),
            Some(FractalKind::MandelbulbJuliaPower8)
        );
        assert_eq!(FractalKind::from_name("mandelbulb power 3"), None);
        assert_eq!(FractalKind::from_name("Mandelbulb Power 9"), None);
        assert_eq!(FractalKind::from_name(""), None);
    }

    #[test]
    fn test_names_round_trip() {
        let kinds = [
            FractalKind::MandelbulbPower2,
            FractalKind::MandelbulbJuliaPower5,
            FractalKind::MandelbulbPower8,
        ];
        for kind in kinds {
            assert_eq!(FractalKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_distance_positive_outside() {
        let shape = bulb(FractalKind::MandelbulbPower8);
        let near = shape.distance_estimate(Vec3::new(2.0f32, 0.0, 0.0));
        let far = shape.distance_estimate(Vec3::new(4.0f32, 0.0, 0.0));
        assert!(near > 0.0);
        assert!(far > near);
    }

    #[test]
    fn test_distance_non_positive_inside() {
        let shape = bulb(FractalKind::MandelbulbPower2);
        let de = shape.distance_estimate(Vec3::new(0.0f32, 0.0, 0.0));
        assert!(de <= 1e-3, "origin should read as inside, got {de}");
    }

    #[test]
    fn test_julia_seed_changes_the_surface() {
        let plain = bulb(FractalKind::MandelbulbPower3);
        let julia = Mandelbulb::<f32>::new(
            FractalKind::MandelbulbJuliaPower3,
            0.3,
            0.2,
            0.1,
            40,
            Material::default(),
            0.9,
        );
        let p = Vec3::new(0.9f32, 0.4, 0.2);
        let a = plain.distance_estimate(p);
        let b = julia.distance_estimate(p);
        assert!((a - b).abs() > 1e-6);
    }

    #[test]
    fn test_lane_batch_matches_scalar() {
        use wide::f32x8;
        let scalar = bulb(FractalKind::MandelbulbPower2);
        let batch = Mandelbulb::<f32x8>::new(
            FractalKind::MandelbulbPower2,
            0.0,
            0.0,
            0.0,
            40,
            Material::default(),
            0.9,
        );
        let xs = [1.4f32, 1.6, 1.8, 2.0, 2.4, 2.8, 3.2, 4.0];
        let mut lanes_x = [0.0f32; 8];
        lanes_x.copy_from_slice(&xs);
        let p = Vec3::new(f32x8::new(lanes_x), f32x8::splat(0.3), f32x8::splat(-0.2));
        let de = batch.distance_estimate(p);
        for (i, &x) in xs.iter().enumerate() {
            let expected = scalar.distance_estimate(Vec3::new(x, 0.3, -0.2));
            assert!(
                (de.extract(i) - expected).abs() < 1e-2 * expected.abs().max(1.0),
                "lane {i}: {} vs {}",
                de.extract(i),
                expected
            );
        }
    }

    #[test]
    fn test_multi_shape_union_takes_nearest() {
        let mut multi = MultiShape::<f32>::new();
        multi.shapes.push(bulb(FractalKind::MandelbulbPower2));
        let p = Vec3::new(3.0f32, 0.0, 0.0);
        let direct = multi.shapes[0].distance_estimate(p);
        assert_eq!(multi.distance(p), direct);
        assert_eq!(multi.step_damping(), 0.9);
    }

    #[test]
    fn test_empty_multi_shape_never_hits() {
        let multi = MultiShape::<f32>::new();
        assert_eq!(multi.distance(Vec3::new(0.0f32, 0.0, 0.0)), f32::MAX);
        assert_eq!(multi.step_damping(), 1.0);
    }
}
