#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::bail;
use rand::{SeedableRng, rngs::StdRng};
use star_donuts::{
    camera::PerspectiveCamera,
    config::{SceneConfig, TextConfig},
    context::SceneContext,
    controls::InputController,
    data_structures::{
        instance::Transform,
        scene_graph::{NodeId, Scene},
    },
    render::Renderer,
    resources::AssetLoader,
    text::Font,
    viewport::Viewport,
};
use winit::event::WindowEvent;

pub const FIXTURE_FONT: &str = "font/mini.typeface.json";
pub const BROKEN_FONT: &str = "font/broken.typeface.json";

pub fn fixtures() -> AssetLoader {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    AssetLoader::new(&root.to_string_lossy())
}

pub async fn fixture_font() -> Font {
    fixtures().load_font(FIXTURE_FONT).await.unwrap()
}

pub fn text_config() -> TextConfig {
    TextConfig {
        font: FIXTURE_FONT.to_string(),
        ..TextConfig::default()
    }
}

pub fn scene_context(seed: u64) -> SceneContext {
    SceneContext::new(
        &SceneConfig::default(),
        Viewport::new(800, 600, 1.0),
        &mut StdRng::seed_from_u64(seed),
    )
}

/// Renderer double that remembers what it was asked to do.
#[derive(Debug)]
pub struct RecordingRenderer {
    renders: u32,
    size: (u32, u32),
    pixel_ratio: f64,
    pub size_calls: Vec<(u32, u32)>,
    /// Camera aspect seen by each render call.
    pub aspects: Vec<f32>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            renders: 0,
            size: (1, 1),
            pixel_ratio: 1.0,
            size_calls: Vec::new(),
            aspects: Vec::new(),
        }
    }

    pub fn renders(&self) -> u32 {
        self.renders
    }
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, scene: &Scene, camera: NodeId) -> anyhow::Result<()> {
        let (_, camera) = scene.camera(camera)?;
        self.aspects.push(camera.aspect);
        self.renders += 1;
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.size_calls.push((width, height));
    }

    fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.pixel_ratio = pixel_ratio;
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}

/// Fails every render call after the first `ok_renders`.
#[derive(Debug, Default)]
pub struct FailingRenderer {
    pub ok_renders: u32,
    pub attempts: u32,
}

impl Renderer for FailingRenderer {
    fn render(&mut self, _: &Scene, _: NodeId) -> anyhow::Result<()> {
        self.attempts += 1;
        if self.attempts > self.ok_renders {
            bail!("device lost");
        }
        Ok(())
    }

    fn set_size(&mut self, _: u32, _: u32) {}

    fn set_pixel_ratio(&mut self, _: f64) {}

    fn size(&self) -> (u32, u32) {
        (1, 1)
    }

    fn pixel_ratio(&self) -> f64 {
        1.0
    }
}

/// Controls that never move the camera but count their updates.
#[derive(Debug, Default)]
pub struct CountingControls {
    pub updates: u32,
    pub events: u32,
}

impl InputController for CountingControls {
    fn handle_window_event(&mut self, _: &WindowEvent) {
        self.events += 1;
    }

    fn update(&mut self, _: &mut Transform, _: &mut PerspectiveCamera) -> bool {
        self.updates += 1;
        false
    }
}
