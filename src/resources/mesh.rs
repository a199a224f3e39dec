use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        model,
        scene_graph::{SceneNode, collect_mesh_slots},
    },
    resources::{MeshData, ModelData},
};

/// GPU buffers of the loaded model: one vertex/index buffer pair per mesh and
/// a shared instance buffer indexed by [`crate::data_structures::scene_graph::MeshSlot::instance`].
#[derive(Debug)]
pub struct GpuModel {
    pub meshes: Vec<model::Mesh>,
    pub instance_buffer: wgpu::Buffer,
    instance_count: u32,
}

impl GpuModel {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, model: &ModelData) -> Self {
        let meshes = model
            .meshes
            .iter()
            .map(|mesh| upload_mesh(device, mesh))
            .collect();
        // Never empty, so the buffer can always be bound.
        let capacity = model.instance_count.max(1);
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Instance Buffer"),
            size: capacity as u64 * std::mem::size_of::<InstanceRaw>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let gpu_model = Self {
            meshes,
            instance_buffer,
            instance_count: model.instance_count,
        };
        gpu_model.write_instances(queue, model.root.as_ref());
        gpu_model
    }

    /// Uploads the world matrix of every mesh slot below `root`.
    pub fn write_instances(&self, queue: &wgpu::Queue, root: &dyn SceneNode) {
        let instances = instance_data(root, self.instance_count);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
    }
}

/// Raw instances ordered by slot ordinal. Ordinals outside `count` are dropped.
pub fn instance_data(root: &dyn SceneNode, count: u32) -> Vec<InstanceRaw> {
    let mut instances = vec![<InstanceRaw as bytemuck::Zeroable>::zeroed(); count as usize];
    for (slot, world) in collect_mesh_slots(root) {
        match instances.get_mut(slot.instance as usize) {
            Some(raw) => *raw = world.to_raw(),
            None => log::warn!("Mesh slot {} has no instance entry", slot.instance),
        }
    }
    instances
}

pub fn upload_mesh(device: &wgpu::Device, mesh: &MeshData) -> model::Mesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Index Buffer", mesh.name)),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    model::Mesh {
        name: mesh.name.clone(),
        vertex_buffer,
        index_buffer,
        num_elements: mesh.indices.len() as u32,
    }
}
