//! Render pipelines and their shared uniforms.
//!
//! - `physical` is the single opaque pipeline every mesh is drawn with
//! - `light` packs the scene lights into the uniform the shader reads

pub mod light;
pub mod physical;
