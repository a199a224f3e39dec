use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use cgmath::EuclideanSpace;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraResources, Projection},
    config::ViewerConfig,
    data_structures::{
        material::{MaterialDescriptor, MaterialId},
        model::Material,
        texture,
    },
    pipelines::{
        Pipelines,
        basic::mk_model_pipeline,
        grid::{GridResources, mk_grid_pipeline},
        light::{LightResources, PointLight},
    },
    resources::{ModelData, mesh::GpuModel, texture::diffuse_layout},
    viewer::Viewer,
};

/// Window, device and every GPU resource the viewer draws with.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub light: LightResources,
    pub pipelines: Pipelines,
    pub grid: GridResources,
    pub model: Option<GpuModel>,
    texture_layout: wgpu::BindGroupLayout,
    /// Indexed by [`MaterialId`]; `None` until the texture has arrived.
    materials: Vec<Option<Material>>,
    fallback_material: Material,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, viewer_config: &ViewerConfig) -> Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Could not create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;
        log::debug!("Adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await
            .context("Could not open the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders output linear colour and rely on an sRGB surface
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no texture formats"))?;
        // A transparent clear colour only shows the page behind the canvas
        // with a blending alpha mode.
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| surface_caps.alpha_modes.contains(mode))
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = CameraResources::new(
            &device,
            &Camera::new(viewer_config.camera.position, cgmath::Point3::origin()),
            &Projection::new(
                config.width,
                config.height,
                viewer_config.camera.fovy,
                viewer_config.camera.znear,
                viewer_config.camera.zfar,
            ),
        );
        let light = LightResources::new(
            &device,
            &PointLight::new(viewer_config.light.color, viewer_config.light.intensity),
        );

        let texture_layout = diffuse_layout(&device);
        let pipelines = Pipelines {
            model: mk_model_pipeline(
                &device,
                &config,
                &texture_layout,
                &camera.bind_group_layout,
                &light.bind_group_layout,
            ),
            grid: mk_grid_pipeline(&device, &config, &camera.bind_group_layout),
        };
        let grid = GridResources::new(&device, &viewer_config.grid);

        let fallback_texture =
            texture::Texture::create_solid([255, 255, 255, 255], "fallback", &device, &queue);
        let fallback_material =
            Material::new(&device, "fallback", fallback_texture, &texture_layout);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            light,
            pipelines,
            grid,
            model: None,
            texture_layout,
            materials: viewer_config.variants.iter().map(|_| None).collect(),
            fallback_material,
            clear_colour: viewer_config.clear_colour,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Reconfigures the surface and depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = texture::Texture::create_depth_texture(
            &self.device,
            [self.config.width, self.config.height],
            "depth_texture",
        );
    }

    /// Uploads the model's geometry and instance transforms, replacing any
    /// previous model.
    pub fn set_model(&mut self, model: &ModelData) {
        self.model = Some(GpuModel::new(&self.device, &self.queue, model));
    }

    /// Creates the GPU material for a decoded kit texture.
    pub fn set_material_texture(
        &mut self,
        id: MaterialId,
        descriptor: &MaterialDescriptor,
        image: &image::DynamicImage,
    ) -> Result<()> {
        let slot = self
            .materials
            .get_mut(id.index())
            .ok_or_else(|| anyhow!("No material slot for '{}'", descriptor.name))?;
        let texture = texture::Texture::from_image(
            &self.device,
            &self.queue,
            image,
            Some(descriptor.texture_file.as_str()),
            descriptor.color_space,
            descriptor.flip_y,
        )?;
        *slot = Some(Material::new(
            &self.device,
            &descriptor.name,
            texture,
            &self.texture_layout,
        ));
        Ok(())
    }

    /// The material to draw with; white until the texture has loaded.
    pub fn material(&self, id: Option<MaterialId>) -> &Material {
        id.and_then(|id| self.materials.get(id.index()))
            .and_then(Option::as_ref)
            .unwrap_or(&self.fallback_material)
    }

    /// Copies the viewer's camera and light into their uniform buffers.
    pub fn write_uniforms(&mut self, viewer: &Viewer) {
        self.camera
            .write(&self.queue, &viewer.camera, &viewer.projection);
        self.light.write(&self.queue, &viewer.light);
    }
}
