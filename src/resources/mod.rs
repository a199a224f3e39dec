use std::collections::HashMap;

use anyhow::*;

use crate::data_structures::{
    instance::Instance,
    model::ModelVertex,
    scene_graph::{ContainerNode, MeshNode, MeshSlot, SceneNode},
};

/**
 * This module contains all logic for loading the model and kit textures from external files.
 */
pub mod mesh;
pub mod texture;

pub use texture::{load_binary, load_image};

/// CPU side geometry of one glTF primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

/// A parsed model: its node tree and the geometry the mesh slots refer to.
pub struct ModelData {
    pub root: Box<dyn SceneNode>,
    pub meshes: Vec<MeshData>,
    /// Number of mesh slots, i.e. entries needed in the instance buffer.
    pub instance_count: u32,
}

impl std::fmt::Debug for ModelData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelData")
            .field("root", &self.root.name())
            .field("meshes", &self.meshes.len())
            .field("instance_count", &self.instance_count)
            .finish()
    }
}

/// Fetches a binary or JSON glTF file and converts its default scene.
///
/// External buffers are resolved relative to the model file.
pub async fn load_model_gltf(path: String) -> Result<ModelData> {
    let bytes = load_binary(&path).await?;
    let gltf = gltf::Gltf::from_slice(&bytes).with_context(|| format!("Could not parse {}", path))?;

    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .clone()
                    .ok_or_else(|| anyhow!("{} references a missing binary chunk", path))?;
                buffer_data.push(blob);
            }
            gltf::buffer::Source::Uri(uri) => {
                if uri.starts_with("data:") {
                    bail!("Embedded data URIs are not supported ({}).", path);
                }
                let bin = load_binary(&sibling_path(&path, uri)).await?;
                buffer_data.push(bin);
            }
        }
    }

    let model = model_from_gltf(&gltf, &buffer_data)?;
    log::info!(
        "Loaded {} with {} meshes in {} slots",
        path,
        model.meshes.len(),
        model.instance_count
    );
    Ok(model)
}

fn sibling_path(path: &str, file_name: &str) -> String {
    match path.rfind('/') {
        Some(idx) => format!("{}/{}", &path[..idx], file_name),
        None => file_name.to_string(),
    }
}

/// Converts the default scene (or the first one) into a [`ModelData`].
///
/// The scene's root nodes are wrapped in a container so the model always has
/// a single root that can be scaled. Meshes used by several nodes are parsed
/// once; every use gets its own instance slot.
pub fn model_from_gltf(document: &gltf::Document, buffers: &[Vec<u8>]) -> Result<ModelData> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());

    let mut converter = Converter {
        buffers,
        meshes: Vec::new(),
        parsed: HashMap::new(),
        next_instance: 0,
    };

    let mut root = ContainerNode::new(
        Some(
            scene
                .as_ref()
                .and_then(|s| s.name())
                .unwrap_or("Scene")
                .to_string(),
        ),
        Instance::new(),
    );
    match &scene {
        Some(scene) => {
            for node in scene.nodes() {
                root.add_child(converter.node(&node));
            }
        }
        None => log::warn!("glTF document contains no scene"),
    }
    let mut root: Box<dyn SceneNode> = Box::new(root);
    root.update_world_transforms(&Instance::new());

    Ok(ModelData {
        root,
        meshes: converter.meshes,
        instance_count: converter.next_instance,
    })
}

struct Converter<'a> {
    buffers: &'a [Vec<u8>],
    meshes: Vec<MeshData>,
    /// (mesh, primitive) to the index in `meshes`, `None` if it was skipped.
    parsed: HashMap<(usize, usize), Option<usize>>,
    next_instance: u32,
}

impl Converter<'_> {
    fn node(&mut self, node: &gltf::Node) -> Box<dyn SceneNode> {
        let local = local_transform(node);
        let name = node.name().map(str::to_string);
        let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
            Some(mesh) => {
                let slots = self.mesh_slots(&mesh);
                Box::new(MeshNode::new(name, local, slots))
            }
            None => Box::new(ContainerNode::new(name, local)),
        };
        for child in node.children() {
            scene_node.add_child(self.node(&child));
        }
        scene_node
    }

    fn mesh_slots(&mut self, mesh: &gltf::Mesh) -> Vec<MeshSlot> {
        let mut slots = Vec::new();
        for primitive in mesh.primitives() {
            let key = (mesh.index(), primitive.index());
            let parsed = match self.parsed.get(&key) {
                Some(parsed) => *parsed,
                None => {
                    let parsed = self.read_primitive(mesh, &primitive).map(|data| {
                        self.meshes.push(data);
                        self.meshes.len() - 1
                    });
                    self.parsed.insert(key, parsed);
                    parsed
                }
            };
            if let Some(mesh) = parsed {
                slots.push(MeshSlot {
                    mesh,
                    instance: self.next_instance,
                    material: None,
                });
                self.next_instance += 1;
            }
        }
        slots
    }

    fn read_primitive(&self, mesh: &gltf::Mesh, primitive: &gltf::Primitive) -> Option<MeshData> {
        let label = match mesh.name() {
            Some(name) => format!("{}#{}", name, primitive.index()),
            None => format!("mesh{}#{}", mesh.index(), primitive.index()),
        };
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping {}: {:?} primitives are not drawn", label, primitive.mode());
            return None;
        }

        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let positions: Vec<[f32; 3]> = match reader.read_positions() {
            Some(positions) => positions.collect(),
            None => {
                log::warn!("Skipping {}: no positions", label);
                return None;
            }
        };
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|normals| normals.collect())
            .unwrap_or_default();
        let tex_coords: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|uv| uv.into_f32().collect())
            .unwrap_or_default();

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, position)| ModelVertex {
                position: *position,
                tex_coords: tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect::<Vec<_>>();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..vertices.len() as u32).collect(),
        };
        if indices.iter().any(|&i| i as usize >= vertices.len()) {
            log::warn!("Skipping {}: index out of range", label);
            return None;
        }

        Some(MeshData {
            name: label,
            vertices,
            indices,
        })
    }
}

fn local_transform(node: &gltf::Node) -> Instance {
    let (translation, rotation, scale) = node.transform().decomposed();
    Instance {
        position: translation.into(),
        // glTF stores quaternions as [x, y, z, w]
        rotation: cgmath::Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
        scale: scale.into(),
    }
}
