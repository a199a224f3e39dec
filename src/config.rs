//! Viewer configuration.
//!
//! Everything the scene needs to know up front: where the assets live, which
//! kit variants exist, and how the camera, light and grid are set up. Two
//! presets exist: the default one with a variant picker, and
//! [`ViewerConfig::showcase`] with a single kit and a slightly higher
//! camera target.

use anyhow::*;
use cgmath::{Deg, Point3};

use crate::{
    controls::OrbitSettings,
    data_structures::{grid::Grid, material::MaterialDescriptor},
};

pub const DEFAULT_ASSET_BASE: &str = "assets";
pub const DEFAULT_MODEL_FILE: &str = "jersey.glb";
pub const DEFAULT_CANVAS_ID: &str = "scene";

#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub position: Point3<f32>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fovy: Deg(50.0),
            znear: 0.1,
            zfar: 100.0,
            position: Point3::new(1.0, 1.0, 2.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightSettings {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    /// Directory (native) or URL path below the page origin (web) holding the assets.
    pub asset_base: String,
    pub model_file: String,
    /// Uniform scale applied to the model root once it is loaded.
    pub model_scale: f32,
    /// Height of the orbit target above the model origin.
    pub target_offset: f32,
    /// Id of the canvas element the viewer draws into on the web.
    pub canvas_id: String,
    pub variants: Vec<MaterialDescriptor>,
    /// Variant applied right after the model is loaded.
    pub default_variant: String,
    /// Whether page elements named after the variants switch the material.
    pub variant_picker: bool,
    pub camera: CameraSettings,
    pub controls: OrbitSettings,
    pub light: LightSettings,
    pub grid: Grid,
    /// Upper bound for the device pixel ratio used for the surface size.
    pub max_pixel_ratio: f64,
    pub clear_colour: wgpu::Color,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_base: DEFAULT_ASSET_BASE.to_string(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            model_scale: 0.05,
            target_offset: 0.65,
            canvas_id: DEFAULT_CANVAS_ID.to_string(),
            variants: vec![
                MaterialDescriptor::new("regular", "regular.png"),
                MaterialDescriptor::new("libero", "libero.png"),
            ],
            default_variant: "regular".to_string(),
            variant_picker: true,
            camera: CameraSettings::default(),
            controls: OrbitSettings::default(),
            light: LightSettings::default(),
            grid: Grid::default(),
            max_pixel_ratio: 2.0,
            clear_colour: wgpu::Color::TRANSPARENT,
        }
    }
}

impl ViewerConfig {
    /// Single kit, no picker, target raised to 0.75.
    pub fn showcase() -> Self {
        Self {
            target_offset: 0.75,
            variants: vec![MaterialDescriptor::new("jersey", "jersey_texture.png")],
            default_variant: "jersey".to_string(),
            variant_picker: false,
            ..Self::default()
        }
    }

    /// Builds a config from `JERSEY_PRESET`, `JERSEY_ASSETS` and `JERSEY_MODEL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup("JERSEY_PRESET").as_deref() {
            None | Some("") | Some("picker") => Self::default(),
            Some("showcase") => Self::showcase(),
            Some(other) => bail!(
                "Unknown JERSEY_PRESET '{}', expected 'picker' or 'showcase'.",
                other
            ),
        };
        if let Some(base) = lookup("JERSEY_ASSETS").filter(|b| !b.is_empty()) {
            config.asset_base = base;
        } else if let Some(bundled) = option_env!("JERSEY_BUNDLED_ASSETS") {
            if !std::path::Path::new(&config.asset_base).exists() {
                config.asset_base = bundled.to_string();
            }
        }
        if let Some(model) = lookup("JERSEY_MODEL").filter(|m| !m.is_empty()) {
            config.model_file = model;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.model_scale.is_finite() && self.model_scale > 0.0) {
            bail!("Model scale must be positive, got {}.", self.model_scale);
        }
        if self.variants.is_empty() {
            bail!("At least one material variant is required.");
        }
        if !self.variants.iter().any(|v| v.name == self.default_variant) {
            bail!(
                "Default variant '{}' is not one of the configured variants.",
                self.default_variant
            );
        }
        if self.max_pixel_ratio <= 0.0 {
            bail!("Maximum pixel ratio must be positive.");
        }
        Ok(())
    }

    /// Location of an asset below [`Self::asset_base`].
    pub fn asset_path(&self, file_name: &str) -> String {
        let base = self.asset_base.trim_end_matches('/');
        if base.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", base, file_name)
        }
    }
}
