//! star-donuts
//!
//! A field of iridescent donuts spinning around an extruded "Star Donuts"
//! title, rendered with wgpu on native and WASM.
//!
//! High-level modules
//! - `app`: window, event loop and asynchronous asset loading
//! - `composer`: builds the scene (donuts, lights, camera, title)
//! - `frame_loop`: the per-frame animate, control and draw step
//! - `viewport`: resize handling and the pixel-ratio cap
//! - `render`: the `Renderer` seam and its wgpu implementation
//! - `text`: typeface fonts and extruded text geometry
//! - `data_structures`: scene graph, geometries, materials and GPU buffers
//! - `camera`, `controls`, `clock`: camera uniforms, orbit controls, time
//! - `config`: every tunable of the scene in one place
//!

pub mod app;
pub mod camera;
pub mod clock;
pub mod composer;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod frame_loop;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod text;
pub mod viewport;

pub use app::{run, run_with};
pub use config::SceneConfig;
pub use frame_loop::{FrameLoop, RunFlag, TickOutcome};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run().map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
