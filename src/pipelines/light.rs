use cgmath::Point3;
use wgpu::util::DeviceExt;

/// A point light with inverse-square falloff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub color: [f32; 3],
    pub intensity: f32,
}

impl PointLight {
    pub fn new(color: [f32; 3], intensity: f32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            color,
            intensity,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    position: [f32; 3],
    // Fills the vec3 up to 16 bytes, so it doubles as the intensity
    intensity: f32,
    color: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
}

impl From<&PointLight> for LightUniform {
    fn from(light: &PointLight) -> Self {
        Self {
            position: light.position.into(),
            intensity: light.intensity,
            color: light.color,
            _padding: 0,
        }
    }
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, light: &PointLight) -> Self {
        let uniform = LightUniform::from(light);
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, light: &PointLight) {
        self.uniform = LightUniform::from(light);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_two_vec4_slots() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 32);
    }

    #[test]
    fn uniform_mirrors_light() {
        let mut light = PointLight::new([1.0, 1.0, 1.0], 10.0);
        light.position = Point3::new(1.0, 2.0, 3.0);
        let uniform = LightUniform::from(&light);
        assert_eq!(uniform.position, [1.0, 2.0, 3.0]);
        assert_eq!(uniform.intensity, 10.0);
    }
}
