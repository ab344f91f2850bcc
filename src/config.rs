//! Scene configuration.
//!
//! Everything the demo hard-codes lives here as the `Default` of
//! [`SceneConfig`]. Nothing is read from the environment or from files; a
//! caller that wants a different scene builds a config and passes it to
//! [`crate::app::run_with`].

use cgmath::{Deg, Point3, Vector3};

use crate::{
    data_structures::{
        geometry::TorusConfig,
        light::{AmbientLight, PointLight},
        material::MaterialDesc,
    },
    text::TextGeometryParams,
};

#[derive(Clone, Debug, PartialEq)]
pub struct DonutConfig {
    pub count: usize,
    pub torus: TorusConfig,
    /// Edge length of the cube, centred on the origin, that donuts are
    /// scattered in.
    pub spread: f32,
}

impl Default for DonutConfig {
    fn default() -> Self {
        Self {
            count: 100,
            torus: TorusConfig::default(),
            spread: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextConfig {
    pub content: String,
    /// Typeface JSON, relative to the asset root.
    pub font: String,
    pub params: TextGeometryParams,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content: "Star Donuts".to_string(),
            font: "font/helvetiker_regular.typeface.json".to_string(),
            params: TextGeometryParams::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightConfig {
    pub ambient: AmbientLight,
    pub point: PointLight,
    pub point_position: Vector3<f32>,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight::new(0xffffff, 1.0),
            point: PointLight::new(0xffffff, 30.0),
            point_position: Vector3::new(0.0, 3.0, 4.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub fov: Deg<f32>,
    pub near: f32,
    pub far: f32,
    pub position: Vector3<f32>,
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: Deg(75.0),
            near: 0.1,
            far: 100.0,
            position: Vector3::new(1.0, 1.0, 2.0),
            target: Point3::new(0.0, 0.0, 0.0),
            enable_damping: true,
            damping_factor: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Directory that asset paths are resolved against on native targets.
    /// The web build always fetches from `<origin>/assets`.
    pub asset_root: String,
    pub donuts: DonutConfig,
    pub text: TextConfig,
    pub lights: LightConfig,
    pub camera: CameraConfig,
    pub donut_material: MaterialDesc,
    pub text_material: MaterialDesc,
    /// Upper bound for the device pixel ratio used by the renderer.
    pub max_pixel_ratio: f64,
    pub canvas_selector: String,
    pub clear_colour: wgpu::Color,
}

fn iridescent(name: &str, map: &str, metalness: f32, roughness: f32) -> MaterialDesc {
    MaterialDesc {
        name: name.to_string(),
        map: Some(map.to_string()),
        metalness,
        roughness,
        iridescence: 1.0,
        iridescence_ior: 1.0,
        iridescence_thickness_range: [100.0, 800.0],
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_root: "assets".to_string(),
            donuts: DonutConfig::default(),
            text: TextConfig::default(),
            lights: LightConfig::default(),
            camera: CameraConfig::default(),
            donut_material: iridescent("donut", "textures/matcaps/5.png", 0.6, 0.2),
            text_material: iridescent("text", "textures/matcaps/2.png", 0.4, 0.5),
            max_pixel_ratio: 2.0,
            canvas_selector: "canvas.webgl".to_string(),
            clear_colour: wgpu::Color::BLACK,
        }
    }
}

impl SceneConfig {
    /// Every distinct texture path referenced by the materials.
    pub fn texture_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = [&self.donut_material, &self.text_material]
            .iter()
            .filter_map(|m| m.map.clone())
            .collect();
        paths.dedup();
        paths
    }
}
