//! Camera ray generation.

use crate::math::simd::SimdFloat;
use crate::math::vector::{Vec2, Vec3};

/// World-space ray direction for a normalized screen point.
///
/// Builds the orthonormal look-at frame from `eye`, `lookat` and `up`, then
/// spreads rays across `fov_degrees` of view. `p` is the screen point with
/// x spanning ±aspect and y spanning ±1 (positive y up). Pure: identical
/// inputs always produce the identical ray.
pub fn calculate_ray_direction<S: SimdFloat>(
    eye: Vec3<S>,
    lookat: Vec3<S>,
    up: Vec3<S>,
    fov_degrees: S,
    p: Vec2<S>,
) -> Vec3<S> {
    let forward = (lookat - eye).normalized();
    let right = up.cross(forward).normalized();
    let cam_up = forward.cross(right);

    // Half-angle tangent scales the screen point onto the view plane.
    let spread = (fov_degrees * S::splat(core::f32::consts::PI / 360.0)).tan();
    (forward + right * (p.x * spread) + cam_up * (p.y * spread)).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered_camera() -> (Vec3<f32>, Vec3<f32>, Vec3<f32>) {
        (
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_center_ray_points_at_lookat() {
        let (eye, lookat, up) = centered_camera();
        let dir = calculate_ray_direction(eye, lookat, up, 12.5f32, Vec2::new(0.0, 0.0));
        assert!(dir.x.abs() < 1e-6);
        assert!(dir.y.abs() < 1e-6);
        assert!((dir.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rays_are_unit_length() {
        let (eye, lookat, up) = centered_camera();
        for &(x, y) in &[(0.5f32, 0.25f32), (-1.0, 1.0), (0.9, -0.7)] {
            let dir = calculate_ray_direction(eye, lookat, up, 25.0f32, Vec2::new(x, y));
            assert!((dir.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_screen_axes_map_to_world_axes() {
        let (eye, lookat, up) = centered_camera();
        let right = calculate_ray_direction(eye, lookat, up, 25.0f32, Vec2::new(1.0, 0.0));
        let above = calculate_ray_direction(eye, lookat, up, 25.0f32, Vec2::new(0.0, 1.0));
        assert!(right.x > 0.0);
        assert!(right.y.abs() < 1e-6);
        assert!(above.y > 0.0);
        assert!(above.x.abs() < 1e-6);
    }

    #[test]
    fn test_narrower_fov_tightens_the_ray_fan() {
        let (eye, lookat, up) = centered_camera();
        let wide_fov = calculate_ray_direction(eye, lookat, up, 50.0f32, Vec2::new(1.0, 0.0));
        let narrow_fov = calculate_ray_direction(eye, lookat, up, 12.5f32, Vec2::new(1.0, 0.0));
        assert!(narrow_fov.x < wide_fov.x);
    }

    #[test]
    fn test_deterministic() {
        let (eye, lookat, up) = centered_camera();
        let a = calculate_ray_direction(eye, lookat, up, 25.0f32, Vec2::new(0.3, -0.6));
        let b = calculate_ray_direction(eye, lookat, up, 25.0f32, Vec2::new(0.3, -0.6));
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
        assert_eq!(a.z, b.z);
    }
}
