//! jersey-viewer
//!
//! An interactive 3D jersey viewer for native windows and the web. A glTF
//! model of a jersey is shown on a ground grid, lit by a point light that
//! follows the camera. The camera orbits the model with damping and slow
//! automatic rotation, the kit texture can be swapped between named variants
//! and a double click toggles full screen.
//!
//! High-level modules
//! - `app`: winit event loop, asset loading and the render loop
//! - `camera`: perspective camera, projection and its uniform
//! - `config`: presets and environment configuration
//! - `context`: window, device and GPU resources
//! - `controls`: orbit camera controller
//! - `data_structures`: scene graph, transforms, meshes, materials, textures, grid
//! - `input`: pointer and keyboard gestures
//! - `pipelines`: render pipelines for the model and the grid, the point light
//! - `render`: per-frame draw calls
//! - `resources`: glTF and texture loading
//! - `viewer`: GPU independent scene state
//!

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewer;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{ViewerEvent, run};
pub use config::ViewerConfig;
pub use viewer::Viewer;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point of the web build.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run(ViewerConfig::default()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
