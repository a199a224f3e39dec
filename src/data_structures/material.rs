//! Named kit materials.
//!
//! A [`MaterialLibrary`] is built once from the configured variants and never
//! changes afterwards; meshes refer to its entries by [`MaterialId`]. The GPU
//! half of each material lives in the render context and is filled in when
//! its texture arrives.

use crate::data_structures::texture::ColorSpace;

/// Index of a material inside its [`MaterialLibrary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

impl MaterialId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a kit variant is shaded: which texture, and how to sample it.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDescriptor {
    pub name: String,
    pub texture_file: String,
    pub color_space: ColorSpace,
    pub flip_y: bool,
}

impl MaterialDescriptor {
    /// An sRGB colour map that is not flipped, as glTF UVs expect.
    pub fn new(name: &str, texture_file: &str) -> Self {
        Self {
            name: name.to_string(),
            texture_file: texture_file.to_string(),
            color_space: ColorSpace::Srgb,
            flip_y: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MaterialLibrary {
    materials: Vec<MaterialDescriptor>,
}

impl MaterialLibrary {
    /// Later entries with a name already seen are ignored.
    pub fn new(descriptors: &[MaterialDescriptor]) -> Self {
        let mut materials: Vec<MaterialDescriptor> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if materials.iter().any(|m| m.name == descriptor.name) {
                log::warn!(
                    "Material '{}' is defined more than once, keeping the first definition.",
                    descriptor.name
                );
                continue;
            }
            materials.push(descriptor.clone());
        }
        Self { materials }
    }

    pub fn id(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|m| m.name == name)
            .map(MaterialId)
    }

    pub fn get(&self, id: MaterialId) -> Option<&MaterialDescriptor> {
        self.materials.get(id.0)
    }

    pub fn by_position(&self, position: usize) -> Option<MaterialId> {
        (position < self.materials.len()).then_some(MaterialId(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &MaterialDescriptor)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(idx, m)| (MaterialId(idx), m))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> MaterialLibrary {
        MaterialLibrary::new(&[
            MaterialDescriptor::new("regular", "regular.png"),
            MaterialDescriptor::new("libero", "libero.png"),
        ])
    }

    #[test]
    fn looks_up_variants_by_name() {
        let library = library();
        let libero = library.id("libero").unwrap();
        assert_eq!(libero.index(), 1);
        assert_eq!(library.get(libero).unwrap().texture_file, "libero.png");
        assert_eq!(library.id("goalkeeper"), None);
    }

    #[test]
    fn keeps_first_definition_of_a_name() {
        let library = MaterialLibrary::new(&[
            MaterialDescriptor::new("regular", "regular.png"),
            MaterialDescriptor::new("regular", "other.png"),
        ]);
        assert_eq!(library.len(), 1);
        let id = library.id("regular").unwrap();
        assert_eq!(library.get(id).unwrap().texture_file, "regular.png");
    }

    #[test]
    fn positions_map_to_ids_in_order() {
        let library = library();
        assert_eq!(library.by_position(0), library.id("regular"));
        assert_eq!(library.by_position(2), None);
        let names: Vec<_> = library.iter().map(|(_, m)| m.name.as_str()).collect();
        assert_eq!(names, ["regular", "libero"]);
    }

    #[test]
    fn colour_maps_default_to_srgb_without_flip() {
        let descriptor = MaterialDescriptor::new("regular", "regular.png");
        assert_eq!(descriptor.color_space, ColorSpace::Srgb);
        assert!(!descriptor.flip_y);
    }
}
