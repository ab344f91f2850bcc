//! CPU-side geometry: vertices and triangle indices before upload.
//!
//! A [`Geometry`] is registered once with the scene and referenced by id from
//! any number of mesh nodes. The GPU copy is created lazily by the renderer.

use std::f32::consts::TAU;

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::model::ModelVertex;

#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

/// Shape parameters of a torus lying in the XY plane, centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TorusConfig {
    /// Distance from the centre of the torus to the centre of the tube.
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
    /// Central angle in radians, `TAU` for a closed ring.
    pub arc: f32,
}

impl Default for TorusConfig {
    fn default() -> Self {
        Self {
            radius: 0.3,
            tube: 0.2,
            radial_segments: 20,
            tubular_segments: 45,
            arc: TAU,
        }
    }
}

impl Geometry {
    pub fn torus(config: &TorusConfig) -> Self {
        let radial = config.radial_segments.max(2);
        let tubular = config.tubular_segments.max(3);
        let mut vertices = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            for i in 0..=tubular {
                let u = i as f32 / tubular as f32 * config.arc;
                let ring = config.radius + config.tube * v.cos();
                let position = Vector3::new(ring * u.cos(), ring * u.sin(), config.tube * v.sin());
                // The normal points away from the centre line of the tube
                let centre = Vector3::new(config.radius * u.cos(), config.radius * u.sin(), 0.0);
                let normal = (position - centre).normalize();
                vertices.push(ModelVertex {
                    position: position.into(),
                    tex_coords: [i as f32 / tubular as f32, j as f32 / radial as f32],
                    normal: normal.into(),
                });
            }
        }

        let stride = tubular + 1;
        let mut indices = Vec::with_capacity((radial * tubular * 6) as usize);
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = stride * j + i - 1;
                let b = stride * (j - 1) + i - 1;
                let c = stride * (j - 1) + i;
                let d = stride * j + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self {
            name: "torus".to_string(),
            vertices,
            indices,
        }
    }

    /// Build an unindexed triangle soup with one flat normal per triangle.
    pub fn from_triangles(name: &str, triangles: &[[([f32; 3], [f32; 2]); 3]]) -> Self {
        let mut vertices = Vec::with_capacity(triangles.len() * 3);
        for triangle in triangles {
            let a: Vector3<f32> = triangle[0].0.into();
            let b: Vector3<f32> = triangle[1].0.into();
            let c: Vector3<f32> = triangle[2].0.into();
            let cross = (b - a).cross(c - a);
            let normal = if cross.magnitude2() > f32::EPSILON * f32::EPSILON {
                cross.normalize()
            } else {
                Vector3::unit_z()
            };
            for (position, tex_coords) in triangle {
                vertices.push(ModelVertex {
                    position: *position,
                    tex_coords: *tex_coords,
                    normal: normal.into(),
                });
            }
        }
        let indices = (0..vertices.len() as u32).collect();
        Self {
            name: name.to_string(),
            vertices,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as `(min, max)`, `None` for an empty geometry.
    pub fn bounding_box(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let first: Vector3<f32> = self.vertices.first()?.position.into();
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            let p: Vector3<f32> = v.position.into();
            (
                Vector3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Vector3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        }))
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.vertices.iter_mut().for_each(|v| {
            v.position = (Vector3::from(v.position) + offset).into();
        });
    }

    /// Move the geometry so that its bounding box is centred on the local
    /// origin. Returns the applied offset.
    pub fn center(&mut self) -> Vector3<f32> {
        let Some((min, max)) = self.bounding_box() else {
            return Vector3::new(0.0, 0.0, 0.0);
        };
        let offset = -(min + max) * 0.5;
        self.translate(offset);
        offset
    }
}
