//! Viewer data structures: meshes, materials, textures and the scene graph.
//!
//! - `grid` is the ground grid helper
//! - `instance` holds node transforms and their GPU layout
//! - `material` names the kit variants a mesh can be shaded with
//! - `model` contains GPU meshes and materials
//! - `scene_graph` mirrors the glTF node hierarchy
//! - `texture` wraps GPU textures

pub mod grid;
pub mod instance;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod texture;
