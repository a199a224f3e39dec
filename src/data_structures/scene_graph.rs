//! Scene graph of the loaded model.
//!
//! The glTF node hierarchy is mirrored as a tree of boxed [`SceneNode`]s.
//! Container nodes only carry a transform; mesh nodes additionally own one
//! [`MeshSlot`] per glTF primitive. A slot names the uploaded mesh it draws,
//! the instance buffer entry holding its world matrix and the material it is
//! currently shaded with.

use crate::data_structures::{instance::Instance, material::MaterialId};

/// A drawable primitive attached to a mesh node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshSlot {
    /// Index into the uploaded meshes of the model.
    pub mesh: usize,
    /// Index into the model's instance buffer.
    pub instance: u32,
    pub material: Option<MaterialId>,
}

pub trait SceneNode {
    fn name(&self) -> Option<&str>;

    fn get_local_transform(&self) -> &Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn get_world_transform(&self) -> &Instance;

    /// Recomputes this node's world transform from `parent` and recurses.
    fn update_world_transforms(&mut self, parent: &Instance);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    fn meshes(&self) -> &[MeshSlot] {
        &[]
    }

    fn meshes_mut(&mut self) -> &mut [MeshSlot] {
        &mut []
    }
}

/// State shared by all node kinds.
#[derive(Default)]
struct NodeCore {
    name: Option<String>,
    local: Instance,
    world: Instance,
    children: Vec<Box<dyn SceneNode>>,
}

impl NodeCore {
    fn new(name: Option<String>, local: Instance) -> Self {
        Self {
            name,
            local,
            world: local,
            children: Vec::new(),
        }
    }

    fn update_world_transforms(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        let world = self.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }
}

/// A node without geometry, e.g. the glTF scene root or an empty pivot.
#[derive(Default)]
pub struct ContainerNode {
    core: NodeCore,
}

impl ContainerNode {
    pub fn new(name: Option<String>, local: Instance) -> Self {
        Self {
            core: NodeCore::new(name, local),
        }
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> Option<&str> {
        self.core.name.as_deref()
    }

    fn get_local_transform(&self) -> &Instance {
        &self.core.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.core.local = instance;
    }

    fn get_world_transform(&self) -> &Instance {
        &self.core.world
    }

    fn update_world_transforms(&mut self, parent: &Instance) {
        self.core.update_world_transforms(parent);
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.core.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.core.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.core.children.push(child);
    }
}

/// A node drawing one or more primitives.
pub struct MeshNode {
    core: NodeCore,
    slots: Vec<MeshSlot>,
}

impl MeshNode {
    pub fn new(name: Option<String>, local: Instance, slots: Vec<MeshSlot>) -> Self {
        Self {
            core: NodeCore::new(name, local),
            slots,
        }
    }
}

impl SceneNode for MeshNode {
    fn name(&self) -> Option<&str> {
        self.core.name.as_deref()
    }

    fn get_local_transform(&self) -> &Instance {
        &self.core.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.core.local = instance;
    }

    fn get_world_transform(&self) -> &Instance {
        &self.core.world
    }

    fn update_world_transforms(&mut self, parent: &Instance) {
        self.core.update_world_transforms(parent);
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.core.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.core.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.core.children.push(child);
    }

    fn meshes(&self) -> &[MeshSlot] {
        &self.slots
    }

    fn meshes_mut(&mut self) -> &mut [MeshSlot] {
        &mut self.slots
    }
}

/// Depth-first, parent before children.
pub fn traverse(node: &dyn SceneNode, visit: &mut dyn FnMut(&dyn SceneNode)) {
    visit(node);
    for child in node.get_children() {
        traverse(child.as_ref(), visit);
    }
}

pub fn traverse_mut(node: &mut dyn SceneNode, visit: &mut dyn FnMut(&mut dyn SceneNode)) {
    visit(&mut *node);
    for child in node.get_children_mut().iter_mut() {
        traverse_mut(child.as_mut(), visit);
    }
}

/// Assigns `material` to every mesh slot below `root` and returns how many
/// slots were touched.
pub fn apply_material(root: &mut dyn SceneNode, material: MaterialId) -> usize {
    let mut assigned = 0;
    traverse_mut(root, &mut |node| {
        for slot in node.meshes_mut() {
            slot.material = Some(material);
            assigned += 1;
        }
    });
    assigned
}

/// Every mesh slot below `root` together with the world transform of the
/// node owning it, in traversal order.
pub fn collect_mesh_slots(root: &dyn SceneNode) -> Vec<(MeshSlot, Instance)> {
    let mut slots = Vec::new();
    traverse(root, &mut |node| {
        let world = *node.get_world_transform();
        slots.extend(node.meshes().iter().map(|slot| (*slot, world)));
    });
    slots
}

pub fn count_nodes(root: &dyn SceneNode) -> usize {
    let mut count = 0;
    traverse(root, &mut |_| count += 1);
    count
}
