//! The two contexts the application is built around.
//!
//! [`Context`] owns everything GPU-side: surface, device, queue and the
//! resources shared by every draw. [`SceneContext`] owns the scene and the
//! handles the frame loop and resize handler work on. It needs no GPU, so
//! tests build it directly.

use std::sync::Arc;

use anyhow::Context as _;
use rand::Rng;
use winit::window::Window;

use crate::{
    camera::CameraResources,
    composer::{self, AnimatedMeshSet},
    config::{SceneConfig, TextConfig},
    data_structures::{
        material::material_layout,
        scene_graph::{MaterialId, NodeId, Scene},
        texture::Texture,
    },
    pipelines::{light::LightResources, physical::mk_physical_pipeline},
    text::Font,
    viewport::Viewport,
};

#[derive(Debug)]
pub struct Context {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub depth_texture: Texture,
    pub camera: CameraResources,
    pub light: LightResources,
    pub material_layout: wgpu::BindGroupLayout,
    pub pipeline: wgpu::RenderPipeline,
    /// Bound to materials whose map is not available (yet).
    pub fallback_texture: Texture,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, clear_colour: wgpu::Color) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;

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
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colour and relies on an sRGB surface
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface supports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");
        let camera = CameraResources::new(&device);
        let light = LightResources::new(&device);
        let material_layout = material_layout(&device);
        let pipeline = mk_physical_pipeline(
            &device,
            config.format,
            &material_layout,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );
        let fallback_texture = Texture::create_fallback(&device, &queue);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_texture,
            camera,
            light,
            material_layout,
            pipeline,
            fallback_texture,
            clear_colour,
        })
    }

    /// Apply a new drawing-buffer size to the surface and the depth buffer.
    pub fn configure_surface(&mut self, width: u32, height: u32) {
        let max = self.device.limits().max_texture_dimension_2d;
        self.config.width = width.clamp(1, max);
        self.config.height = height.clamp(1, max);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = Texture::create_depth_texture(
            &self.device,
            [self.config.width, self.config.height],
            "depth_texture",
        );
    }
}

/// Application state shared by the composer, the frame loop and the resize
/// handler.
#[derive(Debug)]
pub struct SceneContext {
    pub scene: Scene,
    pub camera: NodeId,
    pub animated: AnimatedMeshSet,
    pub text_material: MaterialId,
    /// Set once the title has been attached.
    pub text: Option<NodeId>,
    pub viewport: Viewport,
}

impl SceneContext {
    /// Compose a fresh scene for `viewport`.
    pub fn new(config: &SceneConfig, viewport: Viewport, rng: &mut impl Rng) -> Self {
        let mut scene = Scene::new();
        let composition = composer::compose(&mut scene, config, viewport.aspect(), rng);
        Self {
            scene,
            camera: composition.camera,
            animated: composition.animated,
            text_material: composition.text_material,
            text: None,
            viewport,
        }
    }

    /// Hand the settled font load to the composer. Only the first successful
    /// call adds a title.
    pub fn attach_text(&mut self, font: anyhow::Result<Font>, config: &TextConfig) -> Option<NodeId> {
        if let Some(existing) = self.text {
            log::warn!("text already attached as {:?}", existing);
            return Some(existing);
        }
        self.text = composer::attach_text(&mut self.scene, font, config, self.text_material);
        self.text
    }
}
