//! The renderer facade.
//!
//! Owns image geometry, the seed, the parameter snapshot and the scene, and
//! exposes `render_pixel`. Configuration changes go through `set_size` /
//! `set_parameters`, which must be serialized against rendering; a frozen
//! renderer may be shared freely across pixel workers.

use wide::f32x8;

use crate::colour::ColourRGBA;
use crate::engine::camera::calculate_ray_direction;
use crate::engine::raymarcher::march;
use crate::engine::scene::{build_scene, DebugDisplay, RenderConfig, Scene};
use crate::math::random::{string_to_seed, PixelRng};
use crate::math::simd::SimdFloat;
use crate::math::vector::{Vec2, Vec3};
use crate::params::{ParameterID, ParameterList};

pub struct Renderer<S: SimdFloat> {
    width: i32,
    height: i32,
    width_f: f32,
    height_f: f32,
    aspect: f32,
    seed_string: String,
    seed: u32,
    params: ParameterList,
    config: RenderConfig,
    scene: Scene<S>,
}

impl<S: SimdFloat> Default for Renderer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SimdFloat> Renderer<S> {
    /// An empty renderer; call `set_size` and `set_parameters` before
    /// rendering.
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            width_f: 0.0,
            height_f: 0.0,
            aspect: 0.0,
            seed_string: String::new(),
            seed: 0,
            params: ParameterList::new(),
            config: RenderConfig::default(),
            scene: Scene::default(),
        }
    }

    /// Set the output image size in pixels.
    pub fn set_size(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.width_f = width as f32;
        self.height_f = height as f32;
        if height != 0 {
            self.aspect = self.width_f / self.height_f;
        }
    }

    pub fn get_width(&self) -> i32 {
        self.width
    }

    pub fn get_height(&self) -> i32 {
        self.height
    }

    /// Set the seed from its string form; the integer stream seed is derived
    /// from it.
    pub fn set_seed(&mut self, s: &str) {
        self.seed = string_to_seed(s);
        self.seed_string = s.to_owned();
    }

    /// Set the integer seed directly (string form is left alone).
    pub fn set_seed_int(&mut self, s: u32) {
        self.seed = s;
    }

    pub fn get_seed(&self) -> &str {
        &self.seed_string
    }

    pub fn get_seed_int(&self) -> u32 {
        self.seed
    }

    /// Adopt a parameter snapshot: derives the render configuration and
    /// rebuilds the scene, swapping both in together. The previous scene is
    /// dropped here.
    pub fn set_parameters(&mut self, plist: ParameterList) {
        let config = RenderConfig::from_parameters(&plist);
        let scene = build_scene::<S>(&plist);
        self.params = plist;
        self.config = config;
        self.scene = scene;
    }

    pub fn scene(&self) -> &Scene<S> {
        &self.scene
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Take one sample of the image at pixel coordinates (x, y).
    ///
    /// Builds the camera ray, marches it, tone-maps and gamma-encodes the
    /// shaded colour (unless a raw debug view is active), and composites the
    /// background into miss lanes. Pure given the frozen configuration and
    /// the stream state.
    pub fn sample_pixel(&self, x: S, y: S, rng: &mut PixelRng) -> ColourRGBA<S> {
        let one = S::splat(1.0);
        let two = S::splat(2.0);

        // Height normalized to -1..1, width proportional, zero centered,
        // screen-down y flipped to world-up.
        let p = Vec2::new(
            S::splat(self.aspect) * (two * x / S::splat(self.width_f) - one),
            -(two * y / S::splat(self.height_f) - one),
        );

        let eye = Vec3::broadcast(
            self.params.get_valuef(ParameterID::CameraPositionX),
            self.params.get_valuef(ParameterID::CameraPositionY),
            self.params.get_valuef(ParameterID::CameraPositionZ),
        );
        let lookat = Vec3::broadcast(
            self.params.get_valuef(ParameterID::CameraLookatX),
            self.params.get_valuef(ParameterID::CameraLookatY),
            self.params.get_valuef(ParameterID::CameraLookatZ),
        );
        let up = Vec3::broadcast(0.0, 1.0, 0.0);

        // Magnification is exponential so zooming feels linear.
        let mag = self.params.get_valuef(ParameterID::CameraMagnification);
        let fov = S::splat(25.0 / 2.0f32.powf(mag));

        let rd = calculate_ray_direction(eye, lookat, up, fov, p);

        let (mut colour, hit_mask) = march(&self.scene, &self.config, eye, rd, rng);

        if !self.config.debug.bypasses_tone_mapping() {
            // Reinhard, then gamma encode.
            colour = ColourRGBA::new(
                colour.red / (one + colour.red),
                colour.green / (one + colour.green),
                colour.blue / (one + colour.blue),
                colour.alpha,
            );
            colour = ColourRGBA::rgb(
                colour.red.powf(1.0 / 2.2),
                colour.green.powf(1.0 / 2.2),
                colour.blue.powf(1.0 / 2.2),
            );
        }

        // Miss lanes take the background instead (a fixed sky blue in the
        // normal debug view).
        let background = if self.config.debug == DebugDisplay::Normal {
            ColourRGBA::broadcast(0.5, 0.5, 1.0, 1.0)
        } else {
            self.scene.background_colour
        };
        colour.red = S::blend(hit_mask, colour.red, background.red);
        colour.green = S::blend(hit_mask, colour.green, background.green);
        colour.blue = S::blend(hit_mask, colour.blue, background.blue);

        colour
    }

    /// Render the pixel (or pixel batch) at (x, y).
    ///
    /// Runs the fixed supersampling pattern for the configured quality level
    /// and averages. The offsets and divisors are part of the output
    /// contract: identical configuration gives identical pixels.
    pub fn render_pixel(&self, x: S, y: S) -> ColourRGBA<S> {
        if self.scene.base_shape.is_none() {
            return ColourRGBA::default();
        }
        if self.width <= 0 || self.height <= 0 {
            return ColourRGBA::default();
        }

        // Fresh stream per pixel, keyed by seed and coordinate, so repeated
        // renders see identical draws whatever the call order.
        let mut rng = PixelRng::for_pixel(self.seed, x.first(), y.first());

        let quality = self.config.quality;
        let mut colour = self.sample_pixel(x, y, &mut rng);

        if quality >= 1 {
            let d = S::splat(0.3);
            colour += self.sample_pixel(x + d, y + d, &mut rng);
            colour += self.sample_pixel(x - d, y + d, &mut rng);
            colour += self.sample_pixel(x + d, y - d, &mut rng);
            colour += self.sample_pixel(x - d, y - d, &mut rng);
        }
        if quality >= 2 {
            let d = S::splat(0.2);
            colour += self.sample_pixel(x + d, y, &mut rng);
            colour += self.sample_pixel(x - d, y, &mut rng);
            colour += self.sample_pixel(x, y + d, &mut rng);
            colour += self.sample_pixel(x, y - d, &mut rng);
        }
        if quality >= 3 {
            let d = S::splat(0.1);
            colour += self.sample_pixel(x + d, y + d, &mut rng);
            colour += self.sample_pixel(x - d, y + d, &mut rng);
            colour += self.sample_pixel(x + d, y - d, &mut rng);
            colour += self.sample_pixel(x - d, y - d, &mut rng);
        }

        let samples = match quality {
            1 => Some(5.0),
            2 => Some(9.0),
            3 => Some(13.0),
            _ => None,
        };
        if let Some(count) = samples {
            let inv = S::splat(1.0 / count);
            colour.red = colour.red * inv;
            colour.green = colour.green * inv;
            colour.blue = colour.blue * inv;
            colour.alpha = S::splat(1.0);
        }

        colour
    }
}

/// Render interleaved scanlines into an RGBA byte buffer.
///
/// Worker `worker_id` of `worker_count` renders rows `worker_id`,
/// `worker_id + worker_count`, and so on. Pixels go eight at a time through
/// the lane batch; the last partial batch of a row repeats its final column
/// so every lane stays in bounds. Returns the number of rows rendered.
pub fn render_scanlines_into(
    renderer: &Renderer<f32x8>,
    rgba_out: &mut [u8],
    worker_id: u32,
    worker_count: u32,
) -> u32 {
    let width = renderer.get_width().max(0) as u32;
    let height = renderer.get_height().max(0) as u32;
    if width == 0 || height == 0 || worker_count == 0 {
        return 0;
    }

    let mut rows_rendered = 0u32;
    let mut y = worker_id;
    while y < height {
        let ys = f32x8::splat(y as f32);
        let mut x = 0u32;
        while x < width {
            let mut lanes = [0.0f32; 8];
            for (i, lane) in lanes.iter_mut().enumerate() {
                *lane = (x + i as u32).min(width - 1) as f32;
            }
            let colour = renderer.render_pixel(f32x8::new(lanes), ys);

            let valid = (width - x).min(8);
            for lane in 0..valid as usize {
                let idx = ((y * width + x + lane as u32) * 4) as usize;
                if idx + 3 >= rgba_out.len() {
                    break;
                }
                let c8 = colour.to_colour8(lane);
                rgba_out[idx] = c8.red;
                rgba_out[idx + 1] = c8.green;
                rgba_out[idx + 2] = c8.blue;
                rgba_out[idx + 3] = c8.alpha;
            }
            x += 8;
        }
        rows_rendered += 1;
        y += worker_count;
    }
    rows_rendered
}
