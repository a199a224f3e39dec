//! Application event loop.
//!
//! [`App`] implements winit's `ApplicationHandler`. It creates the window and
//! GPU context on `resumed`, starts the model and texture loads, feeds input
//! into the [`Viewer`] and renders one frame per redraw request. Every
//! asynchronous result comes back as a [`ViewerEvent`] through the event
//! loop proxy, so all scene mutation happens on the event loop.
//!
//! Natively the loads are driven on a tokio runtime owned by the app; on the
//! web they run with `spawn_local`.

use std::{fmt::Debug, pin::Pin, sync::Arc};

use futures::{StreamExt, stream::FuturesUnordered};
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Fullscreen, Window, WindowId},
};

use crate::{
    config::ViewerConfig,
    context::Context,
    data_structures::material::MaterialId,
    input::{Action, InputState},
    resources::{ModelData, load_image, load_model_gltf},
    viewer::{Viewer, display_size},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Results and page events delivered to the event loop.
pub enum ViewerEvent {
    /// The GPU context finished initialising (web only).
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    Initialized(Box<Context>),
    ModelLoaded(anyhow::Result<ModelData>),
    TextureLoaded {
        material: MaterialId,
        image: anyhow::Result<image::DynamicImage>,
    },
    SelectVariant(String),
    ToggleFullscreen,
}

impl Debug for ViewerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::ModelLoaded(result) => f
                .debug_tuple("ModelLoaded")
                .field(&result.as_ref().map(|_| ()).map_err(|e| e.to_string()))
                .finish(),
            Self::TextureLoaded { material, image } => f
                .debug_struct("TextureLoaded")
                .field("material", material)
                .field("ok", &image.is_ok())
                .finish(),
            Self::SelectVariant(name) => f.debug_tuple("SelectVariant").field(name).finish(),
            Self::ToggleFullscreen => f.write_str("ToggleFullscreen"),
        }
    }
}

type LoadFuture = Pin<Box<dyn Future<Output = ViewerEvent>>>;

/// GPU context plus whether the surface has been configured yet.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    is_surface_configured: bool,
}

impl AppState {
    fn new(ctx: Context) -> Self {
        Self {
            ctx,
            is_surface_configured: false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);
            self.is_surface_configured = true;
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    config: ViewerConfig,
    viewer: Viewer,
    input: InputState,
    state: Option<AppState>,
    initializing: bool,
    last_time: Option<Instant>,
}

impl App {
    pub fn new(event_loop: &EventLoop<ViewerEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            viewer: Viewer::new(&config),
            config,
            input: InputState::for_platform(),
            state: None,
            initializing: false,
            last_time: None,
        })
    }

    fn on_initialized(&mut self, ctx: Context) {
        let mut state = AppState::new(ctx);
        let window = state.ctx.window.clone();
        let size = window.inner_size();
        let (width, height) = display_size(
            (size.width, size.height),
            window.scale_factor(),
            self.viewer.max_pixel_ratio(),
        );
        state.resize(width, height);
        if let Some(jersey) = self.viewer.jersey() {
            state.ctx.set_model(jersey.model());
        }
        self.state = Some(state);
        self.initializing = false;

        #[cfg(target_arch = "wasm32")]
        self.bind_page();

        self.start_loading();
        window.request_redraw();
    }

    #[cfg(target_arch = "wasm32")]
    fn bind_page(&self) {
        if self.config.variant_picker {
            let names = self.viewer.materials().iter().map(|(_, d)| d.name.as_str());
            if let Err(e) = crate::web::bind_variant_buttons(names, &self.proxy) {
                log::warn!("Variant buttons unavailable: {:#}", e);
            }
        }
        let bound = crate::web::find_canvas(&self.config.canvas_id)
            .and_then(|canvas| crate::web::bind_fullscreen_toggle(canvas, &self.proxy));
        if let Err(e) = bound {
            log::warn!("Full screen toggle unavailable: {:#}", e);
        }
    }

    /// Starts the model load and one texture load per variant.
    fn start_loading(&self) {
        let mut loads: Vec<LoadFuture> = Vec::new();

        let model_path = self.config.asset_path(&self.config.model_file);
        loads.push(Box::pin(async move {
            ViewerEvent::ModelLoaded(load_model_gltf(model_path).await)
        }));

        for (material, descriptor) in self.viewer.materials().iter() {
            let path = self.config.asset_path(&descriptor.texture_file);
            loads.push(Box::pin(async move {
                ViewerEvent::TextureLoaded {
                    material,
                    image: load_image(&path).await,
                }
            }));
        }

        self.spawn_loads(loads);
    }

    fn spawn_loads(&self, loads: Vec<LoadFuture>) {
        let proxy = self.proxy.clone();
        let fut = deliver_each(loads, move |event| send(&proxy, event));

        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.block_on(fut);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(fut);
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::ToggleFullscreen => self.toggle_fullscreen(),
            Action::SelectVariant(position) => {
                self.viewer.select_variant_at(position);
            }
        }
    }

    fn toggle_fullscreen(&mut self) {
        let Some(state) = &self.state else {
            return;
        };
        let window = state.ctx.window();
        let fullscreen = self
            .viewer
            .toggle_fullscreen(window.fullscreen().is_some());
        log::debug!("Full screen: {}", fullscreen);
        window.set_fullscreen(fullscreen.then_some(Fullscreen::Borderless(None)));
    }

    fn redraw(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        // Keep the render loop going
        state.ctx.window.request_redraw();

        let now = Instant::now();
        let dt = self.last_time.map(|last| now.duration_since(last));
        self.last_time = Some(now);

        let size = state.ctx.window.inner_size();
        let surface_size = display_size(
            (size.width, size.height),
            state.ctx.window.scale_factor(),
            self.viewer.max_pixel_ratio(),
        );
        let update = self.viewer.frame(surface_size, dt);
        if let Some((width, height)) = update.resized {
            state.resize(width, height);
        }

        // Rendering requires the surface to be configured
        if !state.is_surface_configured {
            return;
        }

        match state.ctx.render(&self.viewer) {
            Ok(_) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = self.viewer.surface_size();
                state.resize(width, height);
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
            }
        }
    }
}

/// Drives all loads together and hands over each event as soon as its own
/// load finishes. A slow texture never holds back the model.
async fn deliver_each(loads: Vec<LoadFuture>, mut deliver: impl FnMut(ViewerEvent)) {
    let mut pending: FuturesUnordered<LoadFuture> = loads.into_iter().collect();
    while let Some(event) = pending.next().await {
        deliver(event);
    }
}

fn send(proxy: &EventLoopProxy<ViewerEvent>, event: ViewerEvent) {
    if let Err(e) = proxy.send_event(event) {
        log::debug!("Event loop closed before a load finished: {}", e);
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.initializing {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Jersey Viewer");

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            match crate::web::find_canvas(&self.config.canvas_id) {
                Ok(canvas) => window_attributes = window_attributes.with_canvas(Some(canvas)),
                Err(e) => log::warn!("{:#}, creating a new canvas", e),
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.initializing = true;

        let config = self.config.clone();
        let init_future = async move {
            match Context::new(window, &config).await {
                Ok(ctx) => ctx,
                Err(e) => panic!(
                    "App initialization failed. Cannot create the main context: {:#}",
                    e
                ),
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = self.async_runtime.block_on(init_future);
            self.on_initialized(ctx);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = init_future.await;
                send(&proxy, ViewerEvent::Initialized(Box::new(ctx)));
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        log::trace!("{:?}", event);
        match event {
            ViewerEvent::Initialized(ctx) => self.on_initialized(*ctx),
            ViewerEvent::ModelLoaded(result) => {
                if let Some(jersey) = self.viewer.on_model_loaded(result) {
                    if let Some(state) = &mut self.state {
                        state.ctx.set_model(jersey.model());
                    }
                }
            }
            ViewerEvent::TextureLoaded { material, image } => {
                let Some(descriptor) = self.viewer.materials().get(material) else {
                    return;
                };
                match (image, &mut self.state) {
                    (Ok(image), Some(state)) => {
                        if let Err(e) =
                            state
                                .ctx
                                .set_material_texture(material, descriptor, &image)
                        {
                            log::warn!("Texture for '{}' unusable: {:#}", descriptor.name, e);
                        }
                    }
                    (Ok(_), None) => {
                        log::debug!("Dropping texture '{}', no GPU context", descriptor.name)
                    }
                    (Err(e), _) => {
                        log::warn!("Failed to load texture for '{}': {:#}", descriptor.name, e)
                    }
                }
            }
            ViewerEvent::SelectVariant(name) => {
                self.viewer.select_variant(&name);
            }
            ViewerEvent::ToggleFullscreen => self.toggle_fullscreen(),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &self.state else {
            return;
        };
        let viewport_height = state.ctx.window.inner_size().height as f32;

        let action = self
            .input
            .handle_window_event(&event, &mut self.viewer, viewport_height);
        self.handle_action(action);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                // The next frame picks up the new size
                if let Some(state) = &self.state {
                    state.ctx.window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

/// Opens the viewer and runs until the window is closed.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    config.validate()?;
    log::info!(
        "Starting viewer for {} with {} variants",
        config.asset_path(&config.model_file),
        config.variants.len()
    );

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
