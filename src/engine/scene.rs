//! Scene model and assembly from a parameter snapshot.

use crate::colour::ColourRGBA;
use crate::formulas::{FractalKind, Mandelbulb, MultiShape};
use crate::math::simd::SimdFloat;
use crate::math::vector::Vec3;
use crate::params::{ParameterID, ParameterList};

/// Lights below this intensity are skipped at assembly time; the threshold
/// sits above floating noise rather than at exactly zero.
pub const LIGHT_INTENSITY_EPSILON: f64 = 0.0009;

/// Infinitely distant light. The stored direction is as configured; the
/// shader normalizes it before use.
#[derive(Clone, Copy, Debug)]
pub struct DirectionalLight<S> {
    pub direction: Vec3<S>,
    pub intensity: S,
    pub colour: ColourRGBA<S>,
}

impl<S: SimdFloat> DirectionalLight<S> {
    pub fn new(x: f64, y: f64, z: f64, intensity: f64, colour: ColourRGBA<S>) -> Self {
        Self {
            direction: Vec3::broadcast(x as f32, y as f32, z as f32),
            intensity: S::splat(intensity as f32),
            colour,
        }
    }
}

/// Surface response of a shape: linear base colour plus roughness and
/// metalness, each in 0..1.
#[derive(Clone, Copy, Debug)]
pub struct Material<S> {
    pub colour: Vec3<S>,
    pub roughness: S,
    pub metalness: S,
}

impl<S: SimdFloat> Default for Material<S> {
    fn default() -> Self {
        Self {
            colour: Vec3::broadcast(1.0, 1.0, 1.0),
            roughness: S::splat(0.5),
            metalness: S::splat(0.0),
        }
    }
}

/// Diagnostic visualizations selectable from the debug parameter group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugDisplay {
    None,
    Depth,
    Normal,
    StepCount,
    Diffuse,
    Specular,
}

impl DebugDisplay {
    /// Parse the UI label; anything unrecognized disables debug display.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Depth * 0.1" => Self::Depth,
            "Normal" => Self::Normal,
            "Step Count - Direct" => Self::StepCount,
            "Diffuse" => Self::Diffuse,
            "Specular" => Self::Specular,
            _ => Self::None,
        }
    }

    /// The raw-value modes skip tone mapping and gamma so the diagnostic
    /// numbers arrive unmodified.
    pub fn bypasses_tone_mapping(self) -> bool {
        matches!(self, Self::Depth | Self::Normal | Self::StepCount)
    }
}

/// Immutable per-configuration render settings, derived once by
/// `set_parameters` and threaded explicitly through sampling and marching.
#[derive(Clone, Copy, Debug)]
pub struct RenderConfig {
    /// Antialiasing level 0..=3.
    pub quality: i32,
    pub debug: DebugDisplay,
    /// Surface-hit threshold for the ray march.
    pub min_march_distance: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quality: 0,
            debug: DebugDisplay::None,
            min_march_distance: 1e-4,
        }
    }
}

impl RenderConfig {
    pub fn from_parameters(plist: &ParameterList) -> Self {
        let quality = match plist.get_string(ParameterID::RenderQuality) {
            "Low" => 1,
            "Medium" => 2,
            "High" => 3,
            _ => 0,
        };
        let debug = DebugDisplay::from_name(plist.get_string(ParameterID::DebugDisplay));
        let epsilon = plist.get_valuef(ParameterID::RenderEpsilon);
        Self {
            quality,
            debug,
            min_march_distance: 0.1 * 10.0f32.powf(-epsilon),
        }
    }
}

/// Everything the marcher needs: background, lighting, and the single owned
/// root shape.
pub struct Scene<S> {
    pub background_colour: ColourRGBA<S>,
    /// Ambient term, already scaled by its intensity.
    pub ambient: ColourRGBA<S>,
    pub lights: Vec<DirectionalLight<S>>,
    pub base_shape: Option<MultiShape<S>>,
}

impl<S: SimdFloat> Default for Scene<S> {
    fn default() -> Self {
        Self {
            background_colour: ColourRGBA::default(),
            ambient: ColourRGBA::default(),
            lights: Vec::new(),
            base_shape: None,
        }
    }
}

/// Assemble the scene from a parameter snapshot.
///
/// Total and idempotent: never fails partway. An unrecognized fractal
/// selector leaves `base_shape` empty and the renderer falls back to the
/// background.
pub fn build_scene<S: SimdFloat>(plist: &ParameterList) -> Scene<S> {
    let mut scene = Scene::default();

    scene.background_colour = plist.get_colour(ParameterID::BackgroundColour);

    scene.ambient = plist.get_colour(ParameterID::LightingAmbientColour)
        * S::splat(plist.get_valuef(ParameterID::LightingAmbientIntensity));

    scene.lights.push(DirectionalLight::new(
        plist.get_value(ParameterID::LightingLight1DirectionX),
        plist.get_value(ParameterID::LightingLight1DirectionY),
        plist.get_value(ParameterID::LightingLight1DirectionZ),
        plist.get_value(ParameterID::LightingLight1Intensity),
        plist.get_colour(ParameterID::LightingLight1Colour),
    ));
    if plist.get_value(ParameterID::LightingLight2Intensity) > LIGHT_INTENSITY_EPSILON {
        scene.lights.push(DirectionalLight::new(
            plist.get_value(ParameterID::LightingLight2DirectionX),
            plist.get_value(ParameterID::LightingLight2DirectionY),
            plist.get_value(ParameterID::LightingLight2DirectionZ),
            plist.get_value(ParameterID::LightingLight2Intensity),
            plist.get_colour(ParameterID::LightingLight2Colour),
        ));
    }
    if plist.get_value(ParameterID::LightingLight3Intensity) > LIGHT_INTENSITY_EPSILON {
        scene.lights.push(DirectionalLight::new(
            plist.get_value(ParameterID::LightingLight3DirectionX),
            plist.get_value(ParameterID::LightingLight3DirectionY),
            plist.get_value(ParameterID::LightingLight3DirectionZ),
            plist.get_value(ParameterID::LightingLight3Intensity),
            plist.get_colour(ParameterID::LightingLight3Colour),
        ));
    }

    let diffuse = plist.get_colour::<S>(ParameterID::MaterialDiffuse);
    let material = Material {
        colour: Vec3::new(diffuse.red, diffuse.green, diffuse.blue),
        roughness: S::splat(plist.get_valuef(ParameterID::MaterialRoughness)),
        metalness: S::splat(plist.get_valuef(ParameterID::MaterialMetallic)),
    };

    if let Some(kind) = FractalKind::from_name(plist.get_string(ParameterID::FractalFractal)) {
        let mut multi = MultiShape::new();
        multi.shapes.push(Mandelbulb::new(
            kind,
            plist.get_value(ParameterID::FractalSeedX),
            plist.get_value(ParameterID::FractalSeedY),
            plist.get_value(ParameterID::FractalSeedZ),
            plist.get_value_integer(ParameterID::FractalIterations),
            material,
            plist.get_valuef(ParameterID::RenderStepLimit),
        ));
        scene.base_shape = Some(multi);
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_and_ambient() {
        let mut p = ParameterList::with_defaults();
        p.set_colour(ParameterID::BackgroundColour, 0.1, 0.2, 0.3);
        p.set_colour(ParameterID::LightingAmbientColour, 1.0, 0.5, 0.25);
        p.set_number(ParameterID::LightingAmbientIntensity, 0.4);
        let scene = build_scene::<f32>(&p);
        assert!((scene.background_colour.red - 0.1).abs() < 1e-6);
        assert!((scene.background_colour.blue - 0.3).abs() < 1e-6);
        assert!((scene.ambient.red - 0.4).abs() < 1e-6);
        assert!((scene.ambient.green - 0.2).abs() < 1e-6);
        assert!((scene.ambient.blue - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_light_intensity_epsilon_policy() {
        let mut p = ParameterList::with_defaults();
        p.set_number(ParameterID::LightingLight2Intensity, 0.0005);
        let scene = build_scene::<f32>(&p);
        assert_eq!(scene.lights.len(), 1);

        p.set_number(ParameterID::LightingLight2Intensity, 0.001);
        let scene = build_scene::<f32>(&p);
        assert_eq!(scene.lights.len(), 2);

        p.set_number(ParameterID::LightingLight3Intensity, 0.5);
        let scene = build_scene::<f32>(&p);
        assert_eq!(scene.lights.len(), 3);
    }

    #[test]
    fn test_light_one_is_always_present() {
        let mut p = ParameterList::with_defaults();
        p.set_number(ParameterID::LightingLight1Intensity, 0.0);
        let scene = build_scene::<f32>(&p);
        assert_eq!(scene.lights.len(), 1);
    }

    #[test]
    fn test_fractal_parameters_copied_verbatim() {
        let mut p = ParameterList::with_defaults();
        p.set_text(ParameterID::FractalFractal, "Mandelbulb Power 3");
        p.set_number(ParameterID::FractalSeedX, 0.25);
        p.set_number(ParameterID::FractalSeedY, -0.5);
        p.set_number(ParameterID::FractalSeedZ, 0.75);
        p.set_number(ParameterID::FractalIterations, 77.0);
        p.set_number(ParameterID::RenderStepLimit, 0.6);
        p.set_colour(ParameterID::MaterialDiffuse, 0.9, 0.8, 0.7);
        p.set_number(ParameterID::MaterialRoughness, 0.3);
        p.set_number(ParameterID::MaterialMetallic, 0.2);

        let scene = build_scene::<f32>(&p);
        let multi = scene.base_shape.expect("shape should be selected");
        assert_eq!(multi.shapes.len(), 1);
        let shape = &multi.shapes[0];
        assert_eq!(shape.kind, FractalKind::MandelbulbPower3);
        assert!((shape.seed.x - 0.25).abs() < 1e-6);
        assert!((shape.seed.y + 0.5).abs() < 1e-6);
        assert!((shape.seed.z - 0.75).abs() < 1e-6);
        assert_eq!(shape.iterations, 77);
        assert!((shape.step_damping - 0.6).abs() < 1e-6);
        assert!((shape.material.colour.x - 0.9).abs() < 1e-6);
        assert!((shape.material.roughness - 0.3).abs() < 1e-6);
        assert!((shape.material.metalness - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_unmatched_fractal_leaves_no_root_shape() {
        let mut p = ParameterList::with_defaults();
        p.set_text(ParameterID::FractalFractal, "Menger Sponge");
        let scene = build_scene::<f32>(&p);
        assert!(scene.base_shape.is_none());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let p = ParameterList::with_defaults();
        let a = build_scene::<f32>(&p);
        let b = build_scene::<f32>(&p);
        assert_eq!(a.lights.len(), b.lights.len());
        assert_eq!(
            a.base_shape.as_ref().map(|m| m.shapes[0].kind),
            b.base_shape.as_ref().map(|m| m.shapes[0].kind)
        );
        assert_eq!(a.background_colour.red, b.background_colour.red);
    }

    #[test]
    fn test_render_config_from_parameters() {
        let mut p = ParameterList::with_defaults();
        p.set_text(ParameterID::RenderQuality, "Medium");
        p.set_text(ParameterID::DebugDisplay, "Normal");
        p.set_number(ParameterID::RenderEpsilon, 4.0);
        let config = RenderConfig::from_parameters(&p);
        assert_eq!(config.quality, 2);
        assert_eq!(config.debug, DebugDisplay::Normal);
        assert!((config.min_march_distance - 1e-5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_quality_and_debug_fall_back() {
        let mut p = ParameterList::with_defaults();
        p.set_text(ParameterID::RenderQuality, "Ultra");
        p.set_text(ParameterID::DebugDisplay, "Wireframe");
        let config = RenderConfig::from_parameters(&p);
        assert_eq!(config.quality, 0);
        assert_eq!(config.debug, DebugDisplay::None);
    }

    #[test]
    fn test_debug_display_tone_mapping_policy() {
        assert!(DebugDisplay::Depth.bypasses_tone_mapping());
        assert!(DebugDisplay::Normal.bypasses_tone_mapping());
        assert!(DebugDisplay::StepCount.bypasses_tone_mapping());
        assert!(!DebugDisplay::None.bypasses_tone_mapping());
        assert!(!DebugDisplay::Diffuse.bypasses_tone_mapping());
        assert!(!DebugDisplay::Specular.bypasses_tone_mapping());
    }
}
