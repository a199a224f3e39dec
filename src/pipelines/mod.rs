//! Render pipelines and their per-pipeline GPU resources.
//!
//! - `basic` builds the textured model pipeline and the shared pipeline factory
//! - `grid` draws the ground grid as a line list
//! - `light` holds the point light and its uniform

pub mod basic;
pub mod grid;
pub mod light;

/// All pipelines the viewer draws with, created once per surface format.
#[derive(Debug)]
pub struct Pipelines {
    pub model: wgpu::RenderPipeline,
    pub grid: wgpu::RenderPipeline,
}
