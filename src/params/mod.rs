//! Parameter snapshot consumed by scene assembly and the renderer.
//!
//! The host shell owns parameter UI and persistence; the core only sees this
//! read-only key to typed-value mapping. Getters are permissive: a missing or
//! mistyped entry yields a neutral default, never an error.

use std::collections::HashMap;

use crate::colour::ColourRGBA;
use crate::math::simd::SimdFloat;

/// The closed set of parameter keys the renderer reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterID {
    RenderQuality,
    RenderEpsilon,
    RenderStepLimit,
    DebugDisplay,
    BackgroundColour,
    FractalFractal,
    FractalSeedX,
    FractalSeedY,
    FractalSeedZ,
    FractalIterations,
    CameraPositionX,
    CameraPositionY,
    CameraPositionZ,
    CameraLookatX,
    CameraLookatY,
    CameraLookatZ,
    CameraMagnification,
    MaterialDiffuse,
    MaterialRoughness,
    MaterialMetallic,
    LightingAmbientColour,
    LightingAmbientIntensity,
    LightingLight1DirectionX,
    LightingLight1DirectionY,
    LightingLight1DirectionZ,
    LightingLight1Colour,
    LightingLight1Intensity,
    LightingLight2DirectionX,
    LightingLight2DirectionY,
    LightingLight2DirectionZ,
    LightingLight2Colour,
    LightingLight2Intensity,
    LightingLight3DirectionX,
    LightingLight3DirectionY,
    LightingLight3DirectionZ,
    LightingLight3Colour,
    LightingLight3Intensity,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParameterValue {
    Number(f64),
    Text(String),
    Colour(f32, f32, f32),
}

/// Immutable snapshot of every configured parameter.
#[derive(Clone, Debug, Default)]
pub struct ParameterList {
    entries: HashMap<ParameterID, ParameterValue>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The project's default parameter set: a power-2 Mandelbulb seen from
    /// (0, 0, -5) with one white key light.
    pub fn with_defaults() -> Self {
        let mut p = Self::new();
        p.set_text(ParameterID::RenderQuality, "Draft");
        p.set_number(ParameterID::RenderEpsilon, 3.0);
        p.set_number(ParameterID::RenderStepLimit, 0.9);
        p.set_text(ParameterID::DebugDisplay, "None");
        p.set_colour(ParameterID::BackgroundColour, 1.0, 1.0, 1.0);
        p.set_text(ParameterID::FractalFractal, "Mandelbulb Power 2");
        p.set_number(ParameterID::FractalSeedX, 0.0);
        p.set_number(ParameterID::FractalSeedY, 0.0);
        p.set_number(ParameterID::FractalSeedZ, 0.0);
        p.set_number(ParameterID::FractalIterations, 50.0);
        p.set_number(ParameterID::CameraPositionX, 0.0);
        p.set_number(ParameterID::CameraPositionY, 0.0);
        p.set_number(ParameterID::CameraPositionZ, -5.0);
        p.set_number(ParameterID::CameraLookatX, 0.0);
        p.set_number(ParameterID::CameraLookatY, 0.0);
        p.set_number(ParameterID::CameraLookatZ, 0.0);
        p.set_number(ParameterID::CameraMagnification, 1.0);
        p.set_colour(ParameterID::MaterialDiffuse, 0.4, 0.4, 1.0);
        p.set_number(ParameterID::MaterialRoughness, 0.5);
        p.set_number(ParameterID::MaterialMetallic, 0.0);
        p.set_colour(ParameterID::LightingAmbientColour, 1.0, 1.0, 1.0);
        p.set_number(ParameterID::LightingAmbientIntensity, 0.05);
        p.set_number(ParameterID::LightingLight1DirectionX, 1.0);
        p.set_number(ParameterID::LightingLight1DirectionY, 0.4);
        p.set_number(ParameterID::LightingLight1DirectionZ, -0.4);
        p.set_colour(ParameterID::LightingLight1Colour, 1.0, 1.0, 1.0);
        p.set_number(ParameterID::LightingLight1Intensity, 1.2);
        p.set_number(ParameterID::LightingLight2DirectionX, 1.0);
        p.set_number(ParameterID::LightingLight2DirectionY, 0.4);
        p.set_number(ParameterID::LightingLight2DirectionZ, -0.4);
        p.set_colour(ParameterID::LightingLight2Colour, 1.0, 1.0, 1.0);
        p.set_number(ParameterID::LightingLight2Intensity, 0.0);
        p.set_number(ParameterID::LightingLight3DirectionX, 1.0);
        p.set_number(ParameterID::LightingLight3DirectionY, 0.4);
        p.set_number(ParameterID::LightingLight3DirectionZ, -0.4);
        p.set_colour(ParameterID::LightingLight3Colour, 1.0, 1.0, 1.0);
        p.set_number(ParameterID::LightingLight3Intensity, 0.0);
        p
    }

    pub fn set_number(&mut self, id: ParameterID, value: f64) {
        self.entries.insert(id, ParameterValue::Number(value));
    }

    pub fn set_text(&mut self, id: ParameterID, value: &str) {
        self.entries
            .insert(id, ParameterValue::Text(value.to_owned()));
    }

    pub fn set_colour(&mut self, id: ParameterID, red: f32, green: f32, blue: f32) {
        self.entries
            .insert(id, ParameterValue::Colour(red, green, blue));
    }

    pub fn get_value(&self, id: ParameterID) -> f64 {
        match self.entries.get(&id) {
            Some(ParameterValue::Number(v)) => *v,
            _ => 0.0,
        }
    }

    pub fn get_valuef(&self, id: ParameterID) -> f32 {
        self.get_value(id) as f32
    }

    pub fn get_value_integer(&self, id: ParameterID) -> i32 {
        self.get_value(id) as i32
    }

    pub fn get_string(&self, id: ParameterID) -> &str {
        match self.entries.get(&id) {
            Some(ParameterValue::Text(s)) => s.as_str(),
            _ => "",
        }
    }

    /// Fetch a colour entry broadcast across lanes, opaque alpha. Missing
    /// entries read as black.
    pub fn get_colour<S: SimdFloat>(&self, id: ParameterID) -> ColourRGBA<S> {
        match self.entries.get(&id) {
            Some(ParameterValue::Colour(r, g, b)) => ColourRGBA::broadcast(*r, *g, *b, 1.0),
            _ => ColourRGBA::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_read_as_defaults() {
        let p = ParameterList::new();
        assert_eq!(p.get_value(ParameterID::CameraMagnification), 0.0);
        assert_eq!(p.get_string(ParameterID::FractalFractal), "");
        let c = p.get_colour::<f32>(ParameterID::BackgroundColour);
        assert_eq!(c.red, 0.0);
        assert_eq!(c.alpha, 1.0);
    }

    #[test]
    fn test_typed_round_trip() {
        let mut p = ParameterList::new();
        p.set_number(ParameterID::FractalIterations, 42.7);
        p.set_text(ParameterID::RenderQuality, "High");
        p.set_colour(ParameterID::MaterialDiffuse, 0.1, 0.2, 0.3);

        assert_eq!(p.get_value(ParameterID::FractalIterations), 42.7);
        assert_eq!(p.get_value_integer(ParameterID::FractalIterations), 42);
        assert_eq!(p.get_valuef(ParameterID::FractalIterations), 42.7f32);
        assert_eq!(p.get_string(ParameterID::RenderQuality), "High");
        let c = p.get_colour::<f32>(ParameterID::MaterialDiffuse);
        assert!((c.green - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_mistyped_access_is_permissive() {
        let mut p = ParameterList::new();
        p.set_text(ParameterID::FractalIterations, "not a number");
        assert_eq!(p.get_value(ParameterID::FractalIterations), 0.0);
        p.set_number(ParameterID::RenderQuality, 3.0);
        assert_eq!(p.get_string(ParameterID::RenderQuality), "");
    }

    #[test]
    fn test_defaults_describe_the_standard_scene() {
        let p = ParameterList::with_defaults();
        assert_eq!(p.get_string(ParameterID::FractalFractal), "Mandelbulb Power 2");
        assert_eq!(p.get_value(ParameterID::CameraPositionZ), -5.0);
        assert_eq!(p.get_value(ParameterID::LightingLight1Intensity), 1.2);
        assert_eq!(p.get_value(ParameterID::LightingLight2Intensity), 0.0);
        assert_eq!(p.get_value_integer(ParameterID::FractalIterations), 50);
    }
}
