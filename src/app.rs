//! Window, event loop and asset loading.
//!
//! The application is a winit [`ApplicationHandler`]. Startup goes like this:
//! 1. `resumed` creates the window (the `canvas.webgl` element on the web),
//!    starts the font and texture loads and sets up the GPU context
//! 2. once the context exists the scene is composed, the resize handler runs
//!    for the initial size and the first redraw is requested
//! 3. every `RedrawRequested` runs one frame-loop tick and requests the next
//!    redraw, which the host delivers on its next display frame
//!
//! Asset loads never block the loop. Their results come back as user events
//! and are applied whenever they arrive, or held until the scene exists.

use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use crate::{
    clock::SystemClock,
    config::SceneConfig,
    context::{Context, SceneContext},
    controls::{InputController, OrbitControls},
    frame_loop::{FrameLoop, RunFlag},
    render::GpuRenderer,
    resources::AssetLoader,
    text::Font,
    viewport::{Viewport, handle_resize},
};

pub enum AppEvent {
    Initialized(anyhow::Result<Context>),
    FontLoaded(anyhow::Result<Font>),
    TextureLoaded {
        path: String,
        image: anyhow::Result<image::DynamicImage>,
    },
}

impl std::fmt::Debug for AppEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(ctx) => f.debug_tuple("Initialized").field(&ctx.is_ok()).finish(),
            Self::FontLoaded(font) => f.debug_tuple("FontLoaded").field(&font.is_ok()).finish(),
            Self::TextureLoaded { path, image } => f
                .debug_struct("TextureLoaded")
                .field("path", path)
                .field("ok", &image.is_ok())
                .finish(),
        }
    }
}

/// Everything that exists once the GPU context is up.
struct Running {
    renderer: GpuRenderer,
    scene: SceneContext,
    controls: OrbitControls,
    frame_loop: FrameLoop<SystemClock>,
}

impl Running {
    fn window(&self) -> &Window {
        &self.renderer.context().window
    }

    fn viewport(&self) -> Viewport {
        viewport_of(self.window())
    }

    fn resize(&mut self, max_pixel_ratio: f64) {
        let viewport = self.viewport();
        if let Err(e) = handle_resize(&mut self.scene, &mut self.renderer, viewport, max_pixel_ratio) {
            log::error!("resize failed: {:#}", e);
        }
        self.controls.set_viewport_height(viewport.physical_height());
    }
}

fn post(proxy: &EventLoopProxy<AppEvent>, event: AppEvent) {
    if proxy.send_event(event).is_err() {
        log::warn!("event loop closed before an asset finished loading");
    }
}

fn viewport_of(window: &Window) -> Viewport {
    let scale_factor = window.scale_factor();
    let logical = window.inner_size().to_logical::<f64>(scale_factor);
    Viewport::new(
        logical.width.round() as u32,
        logical.height.round() as u32,
        scale_factor,
    )
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<AppEvent>,
    config: SceneConfig,
    loader: AssetLoader,
    run_flag: RunFlag,
    started: bool,
    state: Option<Running>,
    // asset results that arrived before the scene existed
    pending: Vec<AppEvent>,
}

impl App {
    fn new(
        event_loop: &EventLoop<AppEvent>,
        config: SceneConfig,
        run_flag: RunFlag,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        let loader = AssetLoader::new(&config.asset_root);
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            loader,
            run_flag,
            started: false,
            state: None,
            pending: Vec::new(),
        })
    }

    /// Run `fut` without blocking the event loop and post its result.
    #[cfg(not(target_arch = "wasm32"))]
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let proxy = self.proxy.clone();
        self.async_runtime.spawn(async move { post(&proxy, fut.await) });
    }

    #[cfg(target_arch = "wasm32")]
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = AppEvent> + 'static,
    {
        let proxy = self.proxy.clone();
        wasm_bindgen_futures::spawn_local(async move { post(&proxy, fut.await) });
    }

    fn start_asset_loads(&self) {
        let font = self.config.text.font.clone();
        let loader = self.loader.clone();
        log::info!("loading font {}", font);
        self.spawn(async move { AppEvent::FontLoaded(loader.load_font(&font).await) });

        for path in self.config.texture_paths() {
            let loader = self.loader.clone();
            log::info!("loading texture {}", path);
            self.spawn(async move {
                let image = loader.load_image(&path).await;
                AppEvent::TextureLoaded { path, image }
            });
        }
    }

    fn on_initialized(&mut self, event_loop: &ActiveEventLoop, ctx: anyhow::Result<Context>) {
        let ctx = match ctx {
            Ok(ctx) => ctx,
            Err(e) => {
                log::error!("App initialization failed. Cannot create the main context: {:#}", e);
                event_loop.exit();
                return;
            }
        };
        let viewport = viewport_of(&ctx.window);
        let seed = instant::now().to_bits();
        let scene = SceneContext::new(&self.config, viewport, &mut StdRng::seed_from_u64(seed));
        let camera = &self.config.camera;
        let mut controls = OrbitControls::new(camera.enable_damping, camera.damping_factor);
        controls.set_viewport_height(viewport.physical_height());

        let running = Running {
            renderer: GpuRenderer::new(ctx),
            scene,
            controls,
            frame_loop: FrameLoop::new(SystemClock::start(), self.run_flag.clone()),
        };
        let running = self.state.insert(running);
        running.resize(self.config.max_pixel_ratio);
        running.window().request_redraw();

        for event in std::mem::take(&mut self.pending) {
            self.user_event(event_loop, event);
        }
    }

}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Star Donuts");

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            let window = web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document
                .query_selector(&self.config.canvas_selector)
                .unwrap_throw()
                .unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        self.start_asset_loads();

        let clear_colour = self.config.clear_colour;
        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = self.async_runtime.block_on(Context::new(window, clear_colour));
            self.on_initialized(event_loop, ctx);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = Context::new(window, clear_colour).await;
                if proxy.send_event(AppEvent::Initialized(ctx)).is_err() {
                    log::error!("event loop closed during initialization");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::Initialized(ctx) => self.on_initialized(event_loop, ctx),
            event => {
                let Some(running) = &mut self.state else {
                    self.pending.push(event);
                    return;
                };
                match event {
                    AppEvent::FontLoaded(font) => {
                        running.scene.attach_text(font, &self.config.text);
                    }
                    AppEvent::TextureLoaded { path, image } => {
                        let applied =
                            image.and_then(|image| running.renderer.set_texture(&path, &image));
                        if let Err(e) = applied {
                            log::error!("Texture {} could not be loaded, keeping the fallback: {:#}", path, e);
                        }
                    }
                    AppEvent::Initialized(_) => (),
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(running) = &mut self.state else {
            return;
        };
        running.controls.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                self.run_flag.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                running.resize(self.config.max_pixel_ratio)
            }
            WindowEvent::RedrawRequested => {
                let outcome = running.frame_loop.tick(
                    &mut running.scene,
                    &mut running.controls,
                    &mut running.renderer,
                );
                if outcome.reschedule() {
                    running.window().request_redraw();
                } else {
                    log::info!(
                        "frame loop stopped after {} ticks ({} failed)",
                        running.frame_loop.ticks(),
                        running.frame_loop.failed_ticks()
                    );
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }
}

/// Run the demo with its default configuration until the window closes.
pub fn run() -> anyhow::Result<()> {
    run_with(SceneConfig::default(), RunFlag::new())
}

/// Run with `config`. Clearing `run_flag` from anywhere ends the loop before
/// its next tick.
pub fn run_with(config: SceneConfig, run_flag: RunFlag) -> anyhow::Result<()> {
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

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<AppEvent> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::with_user_event().with_any_thread(true).build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<AppEvent> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::with_user_event().with_any_thread(true).build()?
    };

    #[cfg(not(all(
        feature = "integration-tests",
        any(target_os = "linux", target_os = "windows")
    )))]
    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, config, run_flag)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
