//! Scene data: nodes, transforms, geometries, materials and GPU wrappers.
//!
//! - `scene_graph` holds the flat scene root and the shared registries
//! - `instance` is the per-node transform and its packed GPU form
//! - `geometry` contains CPU vertex/index data and the torus builder
//! - `material` describes physically based materials and their bind groups
//! - `light` holds the ambient and point light descriptions
//! - `model` defines the vertex layout and uploaded meshes
//! - `texture` wraps GPU textures (depth, colour maps, fallback)

pub mod geometry;
pub mod instance;
pub mod light;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod texture;
