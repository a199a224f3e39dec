//! Scene state of the jersey viewer, independent of the GPU.
//!
//! [`Viewer`] owns the camera, the orbit controls, the point light, the
//! material library and (once loaded) the jersey model. The render loop calls
//! [`Viewer::frame`] once per redraw. Material swaps, full-screen toggling and
//! model attachment all go through here, so they can be exercised without a
//! window or a device.

use anyhow::Result;
use cgmath::{EuclideanSpace, Point3, Vector3};
use instant::Duration;

use crate::{
    camera::{Camera, Projection},
    config::ViewerConfig,
    controls::OrbitControls,
    data_structures::{
        instance::Instance,
        material::{MaterialId, MaterialLibrary},
        scene_graph::{self, SceneNode},
    },
    resources::ModelData,
};

pub use crate::pipelines::light::PointLight;

/// The loaded model together with the geometry its mesh slots refer to.
#[derive(Debug)]
pub struct Jersey {
    model: ModelData,
}

impl Jersey {
    pub fn root(&self) -> &dyn SceneNode {
        self.model.root.as_ref()
    }

    pub fn model(&self) -> &ModelData {
        &self.model
    }

    /// Scale of the model root.
    pub fn scale(&self) -> f32 {
        self.model.root.get_local_transform().scale.x
    }

    pub fn position(&self) -> Point3<f32> {
        Point3::from_vec(self.model.root.get_local_transform().position)
    }
}

/// What changed during a [`Viewer::frame`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameUpdate {
    /// New surface size if it differs from the previous frame.
    pub resized: Option<(u32, u32)>,
}

pub struct Viewer {
    pub camera: Camera,
    pub projection: Projection,
    pub controls: OrbitControls,
    pub light: PointLight,
    materials: MaterialLibrary,
    default_material: Option<MaterialId>,
    model_scale: f32,
    target_offset: f32,
    max_pixel_ratio: f64,
    jersey: Option<Jersey>,
    surface_size: (u32, u32),
    fullscreen: bool,
}

impl Viewer {
    pub fn new(config: &ViewerConfig) -> Self {
        let camera = Camera::new(config.camera.position, Point3::origin());
        let projection = Projection::new(
            1,
            1,
            config.camera.fovy,
            config.camera.znear,
            config.camera.zfar,
        );
        let materials = MaterialLibrary::new(&config.variants);
        let default_material = materials.id(&config.default_variant);
        if default_material.is_none() {
            log::warn!("Default variant '{}' is not configured", config.default_variant);
        }
        let mut light = PointLight::new(config.light.color, config.light.intensity);
        light.position = camera.position;

        Self {
            camera,
            projection,
            controls: OrbitControls::new(config.controls.clone()),
            light,
            materials,
            default_material,
            model_scale: config.model_scale,
            target_offset: config.target_offset,
            max_pixel_ratio: config.max_pixel_ratio,
            jersey: None,
            surface_size: (0, 0),
            fullscreen: false,
        }
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn jersey(&self) -> Option<&Jersey> {
        self.jersey.as_ref()
    }

    /// Number of model instances in the scene, either 0 or 1.
    pub fn model_count(&self) -> usize {
        self.jersey.iter().count()
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    pub fn max_pixel_ratio(&self) -> f64 {
        self.max_pixel_ratio
    }

    /// Handles the outcome of the asynchronous model load. Failures are
    /// logged and leave the scene without a model.
    pub fn on_model_loaded(&mut self, result: Result<ModelData>) -> Option<&Jersey> {
        match result {
            Ok(model) => Some(self.attach_model(model)),
            Err(e) => {
                log::error!("Failed to load the jersey model: {:#}", e);
                None
            }
        }
    }

    /// Puts `model` into the scene, replacing any previous one.
    ///
    /// The root is scaled, the default variant applied and the orbit target
    /// raised above the model origin.
    pub fn attach_model(&mut self, mut model: ModelData) -> &Jersey {
        if self.jersey.is_some() {
            log::warn!("Replacing the loaded model");
        }

        let local = *model.root.get_local_transform();
        model.root.set_local_transform(Instance {
            scale: Vector3::new(self.model_scale, self.model_scale, self.model_scale),
            ..local
        });
        model.root.update_world_transforms(&Instance::new());
        if let Some(material) = self.default_material {
            scene_graph::apply_material(model.root.as_mut(), material);
        }

        let jersey = Jersey { model };
        self.controls.target = jersey.position() + Vector3::unit_y() * self.target_offset;
        self.jersey.insert(jersey)
    }

    /// Swaps the material of every mesh to the variant called `name`.
    pub fn select_variant(&mut self, name: &str) -> bool {
        match self.materials.id(name) {
            Some(id) => self.apply_material(id),
            None => {
                log::warn!("Unknown kit variant '{}'", name);
                false
            }
        }
    }

    /// Selects the variant at `position` in configuration order.
    pub fn select_variant_at(&mut self, position: usize) -> bool {
        match self.materials.by_position(position) {
            Some(id) => self.apply_material(id),
            None => {
                log::debug!("No kit variant at position {}", position);
                false
            }
        }
    }

    /// Assigns `material` to every mesh of the model. Does nothing before the
    /// model has loaded.
    pub fn apply_material(&mut self, material: MaterialId) -> bool {
        let Some(jersey) = self.jersey.as_mut() else {
            log::debug!("Ignoring material change, no model loaded yet");
            return false;
        };
        let assigned = scene_graph::apply_material(jersey.model.root.as_mut(), material);
        log::debug!("Applied material {} to {} meshes", material.index(), assigned);
        true
    }

    /// Material of every mesh slot in traversal order.
    pub fn mesh_materials(&self) -> Vec<Option<MaterialId>> {
        self.jersey
            .as_ref()
            .map(|jersey| {
                scene_graph::collect_mesh_slots(jersey.root())
                    .into_iter()
                    .map(|(slot, _)| slot.material)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Advances the scene by one frame.
    ///
    /// `surface_size` is the size the drawing surface should have now; a
    /// change updates the projection's aspect ratio. Afterwards the orbit
    /// controls are stepped and the light is moved onto the camera.
    pub fn frame(&mut self, surface_size: (u32, u32), dt: Option<Duration>) -> FrameUpdate {
        let mut update = FrameUpdate::default();
        if surface_size != self.surface_size {
            self.surface_size = surface_size;
            self.projection.resize(surface_size.0, surface_size.1);
            update.resized = Some(surface_size);
        }
        self.controls.update(&mut self.camera, dt);
        self.light.position = self.camera.position;
        update
    }

    /// Records a full-screen toggle. `window_is_fullscreen` is the state the
    /// window reports right now; the returned value is the requested state.
    pub fn toggle_fullscreen(&mut self, window_is_fullscreen: bool) -> bool {
        self.fullscreen = !window_is_fullscreen;
        self.fullscreen
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
}

/// Surface size for a window of `physical` pixels at `scale_factor`, with the
/// pixel ratio capped at `max_ratio`.
pub fn display_size(physical: (u32, u32), scale_factor: f64, max_ratio: f64) -> (u32, u32) {
    if scale_factor <= max_ratio || scale_factor <= 0.0 {
        return physical;
    }
    let ratio = max_ratio / scale_factor;
    (
        (physical.0 as f64 * ratio).round() as u32,
        (physical.1 as f64 * ratio).round() as u32,
    )
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use crate::{controls::OrbitSettings, resources::tests::triangle_model};

    use super::*;

    fn viewer() -> Viewer {
        let config = ViewerConfig {
            controls: OrbitSettings {
                auto_rotate: false,
                enable_damping: false,
                ..Default::default()
            },
            ..Default::default()
        };
        Viewer::new(&config)
    }

    #[test]
    fn attaching_applies_scale_default_variant_and_target() {
        let mut viewer = viewer();
        let regular = viewer.materials().id("regular");
        let jersey = viewer.attach_model(triangle_model());
        assert_eq!(jersey.scale(), 0.05);

        assert_eq!(viewer.model_count(), 1);
        assert_eq!(viewer.mesh_materials(), vec![regular; 2]);
        assert_eq!(viewer.controls.target, Point3::new(0.0, 0.65, 0.0));
    }

    #[test]
    fn second_model_replaces_the_first() {
        let mut viewer = viewer();
        viewer.attach_model(triangle_model());
        viewer.attach_model(triangle_model());
        assert_eq!(viewer.model_count(), 1);
    }

    #[test]
    fn failed_load_leaves_scene_empty() {
        let mut viewer = viewer();
        assert!(viewer.on_model_loaded(Err(anyhow!("404"))).is_none());
        assert_eq!(viewer.model_count(), 0);
    }

    #[test]
    fn unknown_variant_changes_nothing() {
        let mut viewer = viewer();
        viewer.attach_model(triangle_model());
        let before = viewer.mesh_materials();
        assert!(!viewer.select_variant("goalkeeper"));
        assert_eq!(viewer.mesh_materials(), before);
    }

    #[test]
    fn variants_by_position() {
        let mut viewer = viewer();
        viewer.attach_model(triangle_model());
        assert!(viewer.select_variant_at(1));
        let libero = viewer.materials().id("libero");
        assert_eq!(viewer.mesh_materials(), vec![libero; 2]);
        assert!(!viewer.select_variant_at(7));
    }

    #[test]
    fn fullscreen_toggle_follows_window_state() {
        let mut viewer = viewer();
        assert!(viewer.toggle_fullscreen(false));
        assert!(viewer.is_fullscreen());
        // The browser left full screen on its own
        assert!(viewer.toggle_fullscreen(false));
        assert!(!viewer.toggle_fullscreen(true));
    }

    #[test]
    fn resize_is_reported_once() {
        let mut viewer = viewer();
        assert_eq!(viewer.frame((800, 600), None).resized, Some((800, 600)));
        assert_eq!(viewer.frame((800, 600), None).resized, None);
    }

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(display_size((1000, 500), 1.0, 2.0), (1000, 500));
        assert_eq!(display_size((1000, 500), 2.0, 2.0), (1000, 500));
        assert_eq!(display_size((1500, 900), 3.0, 2.0), (1000, 600));
    }
}
