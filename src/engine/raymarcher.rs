//! Sphere-tracing ray marcher and surface shading.
//!
//! One call marches a full lane batch of rays. Per-lane hit state lives in
//! masks, so the loop body is branchless across lanes and only exits early
//! once every lane has resolved.

use crate::colour::ColourRGBA;
use crate::engine::scene::{DebugDisplay, RenderConfig, Scene};
use crate::formulas::MultiShape;
use crate::math::random::PixelRng;
use crate::math::simd::{SimdFloat, SimdMask};
use crate::math::vector::Vec3;

/// Step budget per ray; rays that exhaust it count as misses.
pub const MAX_MARCH_STEPS: u32 = 400;

/// Rays travelling past this distance count as misses.
pub const MAX_MARCH_DISTANCE: f32 = 40.0;

/// March a ray batch against the scene.
///
/// Returns the shaded colour and the per-lane hit mask. Miss lanes still
/// carry a fully defined colour; the caller discards it with a mask select.
/// The ray origin gets a sub-epsilon dither from the pixel stream to break
/// up step banding.
pub fn march<S: SimdFloat>(
    scene: &Scene<S>,
    config: &RenderConfig,
    origin: Vec3<S>,
    direction: Vec3<S>,
    rng: &mut PixelRng,
) -> (ColourRGBA<S>, S::Mask) {
    let Some(shape) = scene.base_shape.as_ref() else {
        return (ColourRGBA::default(), S::false_mask());
    };

    let zero = S::splat(0.0);
    let one = S::splat(1.0);
    let threshold = S::splat(config.min_march_distance);
    let step_damping = S::splat(shape.step_damping());
    let horizon = S::splat(MAX_MARCH_DISTANCE);

    let mut t = S::splat(config.min_march_distance * rng.next_f32());
    let mut active = S::true_mask();
    let mut hit = S::false_mask();
    let mut steps = zero;

    for _ in 0..MAX_MARCH_STEPS {
        if !active.any() {
            break;
        }
        let pos = origin + direction * t;
        let de = shape.distance(pos);

        hit = hit | (active & de.cmp_lt(threshold));
        // NaN distances fail both comparisons and resolve the lane to a miss.
        active = active & de.cmp_ge(threshold) & t.cmp_lt(horizon);

        t = t + S::blend(active, de * step_damping, zero);
        steps = steps + S::blend(active, one, zero);
    }

    let hit_pos = origin + direction * t;

    let colour = match config.debug {
        DebugDisplay::Depth => {
            let d = t * S::splat(0.1);
            ColourRGBA::rgb(d, d, d)
        }
        DebugDisplay::StepCount => {
            let c = steps * S::splat(1.0 / 255.0);
            ColourRGBA::rgb(c, c, c)
        }
        DebugDisplay::Normal => {
            let n = estimate_normal(shape, hit_pos, config.min_march_distance);
            let half = S::splat(0.5);
            ColourRGBA::rgb(n.x * half + half, n.y * half + half, n.z * half + half)
        }
        _ => {
            let n = estimate_normal(shape, hit_pos, config.min_march_distance);
            shade(scene, shape, n, -direction, config.debug)
        }
    };

    (colour, hit)
}

/// Surface normal by central differences of the distance estimator.
fn estimate_normal<S: SimdFloat>(
    shape: &MultiShape<S>,
    pos: Vec3<S>,
    min_march_distance: f32,
) -> Vec3<S> {
    let eps = S::splat(min_march_distance * 0.5);
    let zero = S::splat(0.0);
    let dx = Vec3::new(eps, zero, zero);
    let dy = Vec3::new(zero, eps, zero);
    let dz = Vec3::new(zero, zero, eps);

    Vec3::new(
        shape.distance(pos + dx) - shape.distance(pos - dx),
        shape.distance(pos + dy) - shape.distance(pos - dy),
        shape.distance(pos + dz) - shape.distance(pos - dz),
    )
    .normalized()
}

/// Ambient plus per-light diffuse and specular.
///
/// Lambert diffuse is scaled down by metalness; the Blinn-Phong lobe
/// sharpens as roughness falls and takes the base colour as metalness
/// rises. The Diffuse/Specular debug modes return their term alone.
fn shade<S: SimdFloat>(
    scene: &Scene<S>,
    shape: &MultiShape<S>,
    normal: Vec3<S>,
    view: Vec3<S>,
    debug: DebugDisplay,
) -> ColourRGBA<S> {
    let material = shape.material();
    let zero = S::splat(0.0);
    let one = S::splat(1.0);

    let shininess = S::splat(2.0) / (material.roughness * material.roughness + S::splat(1e-4));
    let spec_tint = Vec3::new(
        one + (material.colour.x - one) * material.metalness,
        one + (material.colour.y - one) * material.metalness,
        one + (material.colour.z - one) * material.metalness,
    );

    let mut diffuse_light = Vec3::zero();
    let mut specular_light = Vec3::zero();
    for light in &scene.lights {
        let l = light.direction.normalized();
        let n_dot_l = normal.dot(l).max(zero);
        let diffuse = n_dot_l * light.intensity;

        let half_vec = (l + view).normalized();
        let n_dot_h = normal.dot(half_vec).max(zero);
        let specular = n_dot_h.pow(shininess) * light.intensity;

        let light_rgb = Vec3::new(light.colour.red, light.colour.green, light.colour.blue);
        diffuse_light = diffuse_light + light_rgb * diffuse;
        specular_light = specular_light + light_rgb * specular;
    }

    let keep = one - material.metalness;
    let diffuse_term = Vec3::new(
        diffuse_light.x * material.colour.x * keep,
        diffuse_light.y * material.colour.y * keep,
        diffuse_light.z * material.colour.z * keep,
    );
    let specular_term = Vec3::new(
        specular_light.x * spec_tint.x,
        specular_light.y * spec_tint.y,
        specular_light.z * spec_tint.z,
    );

    match debug {
        DebugDisplay::Diffuse => ColourRGBA::rgb(diffuse_term.x, diffuse_term.y, diffuse_term.z),
        DebugDisplay::Specular => {
            ColourRGBA::rgb(specular_term.x, specular_term.y, specular_term.z)
        }
        _ => {
            let ambient = Vec3::new(
                scene.ambient.red * material.colour.x,
                scene.ambient.green * material.colour.y,
                scene.ambient.blue * material.colour.z,
            );
            ColourRGBA::rgb(
                ambient.x + diffuse_term.x + specular_term.x,
                ambient.y + diffuse_term.y + specular_term.y,
                ambient.z + diffuse_term.z + specular_term.z,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::build_scene;
    use crate::params::ParameterList;

    fn default_setup() -> (Scene<f32>, RenderConfig) {
        let plist = ParameterList::with_defaults();
        (
            build_scene::<f32>(&plist),
            RenderConfig::from_parameters(&plist),
        )
    }

    #[test]
    fn test_center_ray_hits_the_bulb() {
        let (scene, config) = default_setup();
        let mut rng = PixelRng::for_pixel(1, 0.0, 0.0);
        let origin = Vec3::new(0.0f32, 0.0, -5.0);
        let direction = Vec3::new(0.0f32, 0.0, 1.0);
        let (colour, hit) = march(&scene, &config, origin, direction, &mut rng);
        assert!(hit.any());
        assert!(colour.red.is_finite());
        assert!(colour.green.is_finite());
        assert!(colour.blue.is_finite());
    }

    #[test]
    fn test_ray_away_from_the_scene_misses() {
        let (scene, config) = default_setup();
        let mut rng = PixelRng::for_pixel(1, 0.0, 0.0);
        let origin = Vec3::new(0.0f32, 0.0, -5.0);
        let direction = Vec3::new(0.0f32, 0.0, -1.0);
        let (colour, hit) = march(&scene, &config, origin, direction, &mut rng);
        assert!(!hit.any());
        // Miss lanes still carry a defined colour.
        assert!(colour.red.is_finite());
    }

    #[test]
    fn test_empty_scene_never_hits() {
        let scene = Scene::<f32>::default();
        let config = RenderConfig::default();
        let mut rng = PixelRng::for_pixel(1, 0.0, 0.0);
        let (colour, hit) = march(
            &scene,
            &config,
            Vec3::new(0.0f32, 0.0, -5.0),
            Vec3::new(0.0f32, 0.0, 1.0),
            &mut rng,
        );
        assert!(!hit.any());
        assert_eq!(colour.red, 0.0);
    }

    #[test]
    fn test_lane_batch_hit_mask_matches_scalar() {
        use wide::f32x8;
        let plist = ParameterList::with_defaults();
        let scalar_scene = build_scene::<f32>(&plist);
        let batch_scene = build_scene::<f32x8>(&plist);
        let config = RenderConfig::from_parameters(&plist);

        // Four lanes aimed at the bulb, four aimed well away from it.
        let dir_z = [1.0f32, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0];
        let origin = Vec3::<f32x8>::broadcast(0.0, 0.0, -5.0);
        let direction = Vec3::new(f32x8::splat(0.0), f32x8::splat(0.0), f32x8::new(dir_z));
        let mut rng = PixelRng::for_pixel(9, 4.0, 4.0);
        let (_, hit) = march(&batch_scene, &config, origin, direction, &mut rng);

        for (i, &z) in dir_z.iter().enumerate() {
            let mut scalar_rng = PixelRng::for_pixel(9, 4.0, 4.0);
            let (_, scalar_hit) = march(
                &scalar_scene,
                &config,
                Vec3::new(0.0f32, 0.0, -5.0),
                Vec3::new(0.0f32, 0.0, z),
                &mut scalar_rng,
            );
            let lane_hit = hit.extract(i) != 0.0;
            assert_eq!(lane_hit, scalar_hit, "lane {i}");
        }
    }

    #[test]
    fn test_normal_debug_mode_encodes_direction() {
        let plist = ParameterList::with_defaults();
        let scene = build_scene::<f32>(&plist);
        let mut config = RenderConfig::from_parameters(&plist);
        config.debug = DebugDisplay::Normal;
        let mut rng = PixelRng::for_pixel(1, 0.0, 0.0);
        let (colour, hit) = march(
            &scene,
            &config,
            Vec3::new(0.0f32, 0.0, -5.0),
            Vec3::new(0.0f32, 0.0, 1.0),
            &mut rng,
        );
        assert!(hit.any());
        // Encoded components sit in 0..1.
        assert!((-0.001..=1.001).contains(&colour.red));
        assert!((-0.001..=1.001).contains(&colour.green));
        assert!((-0.001..=1.001).contains(&colour.blue));
        // A front-facing surface points back toward the camera.
        assert!(colour.blue < 0.5);
    }

    #[test]
    fn test_depth_debug_mode_scales_distance() {
        let plist = ParameterList::with_defaults();
        let scene = build_scene::<f32>(&plist);
        let mut config = RenderConfig::from_parameters(&plist);
        config.debug = DebugDisplay::Depth;
        let mut rng = PixelRng::for_pixel(1, 0.0, 0.0);
        let (colour, hit) = march(
            &scene,
            &config,
            Vec3::new(0.0f32, 0.0, -5.0),
            Vec3::new(0.0f32, 0.0, 1.0),
            &mut rng,
        );
        assert!(hit.any());
        // Surface is roughly 3.8 units out, so depth * 0.1 lands near 0.38.
        assert!(colour.red > 0.2 && colour.red < 0.6, "depth {}", colour.red);
        assert_eq!(colour.red, colour.green);
        assert_eq!(colour.red, colour.blue);
    }
}
