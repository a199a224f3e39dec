use wgpu::util::DeviceExt;

use crate::data_structures::{
    grid::{Grid, GridVertex},
    model::Vertex,
    texture::Texture,
};

/// Line list pipeline for the ground grid; only needs the camera.
pub fn mk_grid_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Grid Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout],
        ..Default::default()
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Grid Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("grid.wgsl").into()),
    };
    crate::pipelines::basic::mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(wgpu::BlendState::REPLACE),
        Some(Texture::DEPTH_FORMAT),
        &[GridVertex::desc()],
        wgpu::PrimitiveTopology::LineList,
        shader,
    )
}

#[derive(Debug)]
pub struct GridResources {
    pub vertex_buffer: wgpu::Buffer,
    pub num_vertices: u32,
}

impl GridResources {
    pub fn new(device: &wgpu::Device, grid: &Grid) -> Self {
        let vertices = grid.vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            num_vertices: vertices.len() as u32,
        }
    }
}
