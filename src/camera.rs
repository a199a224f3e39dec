//! Perspective camera, its projection and the uniform fed to the shaders.
//!
//! The camera always looks at a target point; [`crate::controls::OrbitControls`]
//! moves both around. [`Projection`] owns the aspect ratio so that a surface
//! resize only touches the projection.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use wgpu::util::DeviceExt;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new(position: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            position,
            target,
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn distance_to_target(&self) -> f32 {
        (self.position - self.target).magnitude()
    }

    /// Unit vectors of the camera's screen axes in world space: (right, up).
    pub fn screen_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward);
        (right, up)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Zero sized surfaces keep a square aspect instead of dividing by zero.
fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU half of the camera: the uniform buffer and its bind group.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: &Camera, projection: &Projection) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, camera: &Camera, projection: &Projection) {
        self.uniform.update_view_proj(camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, EuclideanSpace, Transform};

    use super::*;

    #[test]
    fn aspect_follows_resize() {
        let mut projection = Projection::new(800, 600, Deg(50.0), 0.1, 100.0);
        assert!((projection.aspect() - 800.0 / 600.0).abs() < 1e-6);

        projection.resize(1920, 1080);
        assert!((projection.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn zero_sized_surface_keeps_a_valid_aspect() {
        let mut projection = Projection::new(0, 0, Deg(50.0), 0.1, 100.0);
        assert_eq!(projection.aspect(), 1.0);
        projection.resize(640, 0);
        assert_eq!(projection.aspect(), 1.0);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let camera = Camera::new(Point3::new(1.0, 1.0, 2.0), Point3::new(0.0, 0.65, 0.0));
        let projection = Projection::new(800, 600, Deg(50.0), 0.1, 100.0);
        let view_proj = projection.calc_matrix() * camera.calc_matrix();

        let clip = view_proj.transform_point(camera.target);
        assert!(clip.x.abs() < 1e-5);
        assert!(clip.y.abs() < 1e-5);
        // wgpu depth range is [0, 1]
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn screen_axes_are_orthonormal() {
        let camera = Camera::new(Point3::new(1.0, 1.0, 2.0), Point3::origin());
        let (right, up) = camera.screen_axes();
        assert!((right.magnitude() - 1.0).abs() < 1e-5);
        assert!((up.magnitude() - 1.0).abs() < 1e-5);
        assert!(right.dot(up).abs() < 1e-5);
        assert!(right.y.abs() < 1e-5);
    }
}
