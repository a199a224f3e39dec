//! Ground grid drawn underneath the jersey.

use crate::data_structures::model::Vertex;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex for GridVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<GridVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Layout of a square grid on the XZ plane.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub size: f32,
    pub divisions: u32,
    /// sRGB colour of the two lines crossing the origin.
    pub center_colour: [f32; 3],
    /// sRGB colour of all other lines.
    pub line_colour: [f32; 3],
    pub elevation: f32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            size: 20.0,
            divisions: 20,
            // teal
            center_colour: [0.0, 128.0 / 255.0, 128.0 / 255.0],
            // darkgray
            line_colour: [169.0 / 255.0; 3],
            elevation: -0.01,
        }
    }
}

impl Grid {
    /// Line list vertices: for every division one line along X and one
    /// along Z. Colours are converted to linear space for the sRGB surface.
    pub fn vertices(&self) -> Vec<GridVertex> {
        let divisions = self.divisions.max(1);
        let step = self.size / divisions as f32;
        let half = self.size / 2.0;
        let center = srgb_to_linear(self.center_colour);
        let line = srgb_to_linear(self.line_colour);
        let y = self.elevation;

        let mut vertices = Vec::with_capacity((divisions as usize + 1) * 4);
        for i in 0..=divisions {
            let k = -half + i as f32 * step;
            let color = if i == divisions / 2 { center } else { line };
            vertices.push(GridVertex {
                position: [-half, y, k],
                color,
            });
            vertices.push(GridVertex {
                position: [half, y, k],
                color,
            });
            vertices.push(GridVertex {
                position: [k, y, -half],
                color,
            });
            vertices.push(GridVertex {
                position: [k, y, half],
                color,
            });
        }
        vertices
    }
}

pub fn srgb_to_linear(colour: [f32; 3]) -> [f32; 3] {
    colour.map(|c| {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    })
}
