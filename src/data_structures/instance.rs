//! Node transforms and their GPU representation.
//!
//! Every mesh slot of the jersey owns one entry in an instance buffer; the
//! entry holds the slot's world matrix so the same vertex layout serves
//! meshes that are reused by several glTF nodes.

use std::ops::Mul;

use cgmath::One;

use crate::data_structures::model;

/// Transformation made of position, rotation (as quaternion), and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Create a new instance with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn uniform_scale(factor: f32) -> Self {
        Self {
            scale: cgmath::Vector3::new(factor, factor, factor),
            ..Self::new()
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: cgmath::Matrix3::from(self.rotation).into(),
        }
    }
}

impl<'a, 'b> Mul<&'b Instance> for &'a Instance {
    type Output = Instance;

    /// Composes `self` (parent) with `rhs` (child) into the child's world transform.
    fn mul(self, rhs: &'b Instance) -> Self::Output {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = cgmath::Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Instance {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
        }
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

/**
 * Stride layout: the world matrix as four vec4 columns followed by the
 * rotation part as three vec3 columns for transforming normals.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Advance once per instance, not once per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Rotation3};

    use super::*;

    #[test]
    fn parent_scale_applies_to_child_offset() {
        let parent = Instance::uniform_scale(0.05);
        let child = Instance::from(cgmath::Vector3::new(0.0, 10.0, 0.0));

        let world = &parent * &child;

        assert!((world.position - cgmath::Vector3::new(0.0, 0.5, 0.0)).magnitude() < 1e-6);
        assert!((world.scale - cgmath::Vector3::new(0.05, 0.05, 0.05)).magnitude() < 1e-6);
    }

    #[test]
    fn parent_rotation_turns_child_offset() {
        let parent = Instance {
            rotation: cgmath::Quaternion::from_angle_y(cgmath::Deg(90.0)),
            ..Instance::new()
        };
        let child = Instance::from(cgmath::Vector3::new(1.0, 0.0, 0.0));

        let world = &parent * &child;

        assert!((world.position - cgmath::Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);
    }

    #[test]
    fn raw_instance_matches_vertex_layout() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 25 * 4);
    }
}
