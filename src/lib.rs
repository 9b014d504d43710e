//! Host-independent Mandelbulb renderer.
//!
//! The core (`engine`, `formulas`, `colour`, `math`, `params`) never touches
//! the host boundary; this file is the thin wasm shell that decodes the
//! host's flat parameter buffer, configures a [`engine::renderer::Renderer`],
//! and drives it across worker-assigned scanlines.

use wasm_bindgen::prelude::*;

pub mod colour;
pub mod engine;
pub mod formulas;
pub mod math;
pub mod params;

use engine::renderer::{render_scanlines_into, Renderer};
use params::{ParameterID, ParameterList};

/// Number of `f64` slots expected in the render parameter buffer.
pub const PARAM_BUFFER_LEN: usize = 48;

/// Initialize the module (call once from JS).
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Decode the host's flat `f64` buffer plus string selectors into a
/// parameter snapshot.
///
/// Buffer layout (all `f64`):
/// ```text
///  0 width           1 height
///  2..5  camera position xyz     5..8  camera look-at xyz
///  8 magnification   9 epsilon   10 step limit
/// 11..14 fractal seed xyz        14 iterations
/// 15..18 material rgb            18 roughness   19 metallic
/// 20..23 ambient rgb             23 ambient intensity
/// 24..27 background rgb
/// 27..34 light 1: direction xyz, colour rgb, intensity
/// 34..41 light 2: same layout
/// 41..48 light 3: same layout
/// ```
/// A short buffer leaves the defaults in place.
pub fn parameter_list_from_buffer(
    data: &[f64],
    fractal: &str,
    quality: &str,
    debug: &str,
) -> ParameterList {
    let mut plist = ParameterList::with_defaults();
    plist.set_text(ParameterID::FractalFractal, fractal);
    plist.set_text(ParameterID::RenderQuality, quality);
    plist.set_text(ParameterID::DebugDisplay, debug);

    if data.len() < PARAM_BUFFER_LEN {
        return plist;
    }

    plist.set_number(ParameterID::CameraPositionX, data[2]);
    plist.set_number(ParameterID::CameraPositionY, data[3]);
    plist.set_number(ParameterID::CameraPositionZ, data[4]);
    plist.set_number(ParameterID::CameraLookatX, data[5]);
    plist.set_number(ParameterID::CameraLookatY, data[6]);
    plist.set_number(ParameterID::CameraLookatZ, data[7]);
    plist.set_number(ParameterID::CameraMagnification, data[8]);
    plist.set_number(ParameterID::RenderEpsilon, data[9]);
    plist.set_number(ParameterID::RenderStepLimit, data[10]);
    plist.set_number(ParameterID::FractalSeedX, data[11]);
    plist.set_number(ParameterID::FractalSeedY, data[12]);
    plist.set_number(ParameterID::FractalSeedZ, data[13]);
    plist.set_number(ParameterID::FractalIterations, data[14]);
    plist.set_colour(
        ParameterID::MaterialDiffuse,
        data[15] as f32,
        data[16] as f32,
        data[17] as f32,
    );
    plist.set_number(ParameterID::MaterialRoughness, data[18]);
    plist.set_number(ParameterID::MaterialMetallic, data[19]);
    plist.set_colour(
        ParameterID::LightingAmbientColour,
        data[20] as f32,
        data[21] as f32,
        data[22] as f32,
    );
    plist.set_number(ParameterID::LightingAmbientIntensity, data[23]);
    plist.set_colour(
        ParameterID::BackgroundColour,
        data[24] as f32,
        data[25] as f32,
        data[26] as f32,
    );

    let light_ids = [
        (
            ParameterID::LightingLight1DirectionX,
            ParameterID::LightingLight1DirectionY,
            ParameterID::LightingLight1DirectionZ,
            ParameterID::LightingLight1Colour,
            ParameterID::LightingLight1Intensity,
        ),
        (
            ParameterID::LightingLight2DirectionX,
            ParameterID::LightingLight2DirectionY,
            ParameterID::LightingLight2DirectionZ,
            ParameterID::LightingLight2Colour,
            ParameterID::LightingLight2Intensity,
        ),
        (
            ParameterID::LightingLight3DirectionX,
            ParameterID::LightingLight3DirectionY,
            ParameterID::LightingLight3DirectionZ,
            ParameterID::LightingLight3Colour,
            ParameterID::LightingLight3Intensity,
        ),
    ];
    for (slot, (dx, dy, dz, colour, intensity)) in light_ids.into_iter().enumerate() {
        let base = 27 + slot * 7;
        plist.set_number(dx, data[base]);
        plist.set_number(dy, data[base + 1]);
        plist.set_number(dz, data[base + 2]);
        plist.set_colour(
            colour,
            data[base + 3] as f32,
            data[base + 4] as f32,
            data[base + 5] as f32,
        );
        plist.set_number(intensity, data[base + 6]);
    }

    plist
}

/// Build a configured renderer from the host buffer.
fn renderer_from_buffer(
    render_params: &[f64],
    fractal: &str,
    quality: &str,
    debug: &str,
    seed: &str,
) -> Renderer<wide::f32x8> {
    let (width, height) = if render_params.len() >= 2 {
        (render_params[0] as i32, render_params[1] as i32)
    } else {
        (0, 0)
    };
    let mut renderer = Renderer::new();
    renderer.set_size(width, height);
    renderer.set_seed(seed);
    renderer.set_parameters(parameter_list_from_buffer(
        render_params,
        fractal,
        quality,
        debug,
    ));
    renderer
}

/// Render interleaved scanlines into a pre-allocated RGBA buffer.
///
/// Called from each Web Worker with its assigned scanline range:
/// `render_params` is the flat `f64` buffer (see
/// [`parameter_list_from_buffer`]), `rgba_out` is `width * height * 4` bytes,
/// and `worker_id` / `worker_count` select the rows this call fills.
/// Returns the number of rows rendered.
#[wasm_bindgen]
pub fn render_scanlines(
    render_params: &[f64],
    fractal: &str,
    quality: &str,
    debug: &str,
    seed: &str,
    rgba_out: &mut [u8],
    worker_id: u32,
    worker_count: u32,
) -> u32 {
    let renderer = renderer_from_buffer(render_params, fractal, quality, debug, seed);
    render_scanlines_into(&renderer, rgba_out, worker_id, worker_count)
}

/// Single-call render of the whole frame, for single-threaded previews.
#[wasm_bindgen]
pub fn render_quick(
    render_params: &[f64],
    fractal: &str,
    quality: &str,
    debug: &str,
    seed: &str,
    rgba_out: &mut [u8],
) {
    let renderer = renderer_from_buffer(render_params, fractal, quality, debug, seed);
    let rows = render_scanlines_into(&renderer, rgba_out, 0, 1);

    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(
        &format!(
            "mandelbulb-render: {}x{} frame, {} rows",
            renderer.get_width(),
            renderer.get_height(),
            rows
        )
        .into(),
    );
    #[cfg(not(target_arch = "wasm32"))]
    let _ = rows;
}
