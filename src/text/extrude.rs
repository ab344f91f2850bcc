//! Extrusion of flat shapes into bevelled solids.
//!
//! Every shape is swept along +z through a stack of layers. With bevels
//! enabled the stack starts with `bevel_segments` rings at negative z that
//! grow outwards along a quarter circle, then the body front and back, then
//! the mirrored rings past `depth`. Lids cap the first and last layer.

use std::f32::consts::{FRAC_PI_2, SQRT_2};

use cgmath::{InnerSpace, Vector2};

use crate::{
    data_structures::geometry::Geometry,
    text::{
        path::{Shape, signed_area},
        triangulate::triangulate,
        typeface::Font,
    },
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextGeometryParams {
    /// Font size in world units per em.
    pub size: f32,
    /// Extrusion depth of the body.
    pub depth: f32,
    /// Points per curve when flattening glyph outlines.
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    /// How far the bevel reaches past the body along z.
    pub bevel_thickness: f32,
    /// How far the bevel grows the outline.
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextGeometryParams {
    fn default() -> Self {
        Self {
            size: 0.5,
            depth: 0.2,
            curve_segments: 5,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 4,
        }
    }
}

pub type Triangle = [([f32; 3], [f32; 2]); 3];

/// Build the extruded geometry of `text`. The result is not centred.
pub fn text_geometry(font: &Font, text: &str, params: &TextGeometryParams) -> Geometry {
    let shapes = font.generate_shapes(text, params.size, params.curve_segments);
    let triangles: Vec<Triangle> = shapes
        .iter()
        .flat_map(|shape| extrude_shape(shape, params))
        .collect();
    log::debug!(
        "text {:?}: {} shapes, {} triangles",
        text,
        shapes.len(),
        triangles.len()
    );
    Geometry::from_triangles("text", &triangles)
}

/// Outward offset direction per ring vertex, scaled so that moving every
/// vertex by `miter * d` moves each edge by `d`.
fn miters(ring: &[Vector2<f32>]) -> Vec<Vector2<f32>> {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let cur = ring[i];
            let next = ring[(i + 1) % n];
            let e1 = normalize_or_zero(cur - prev);
            let e2 = normalize_or_zero(next - cur);
            // right-hand normals face away from the filled side
            let n1 = Vector2::new(e1.y, -e1.x);
            let n2 = Vector2::new(e2.y, -e2.x);
            let denom = 1.0 + n1.dot(n2);
            let miter = if denom <= 1e-6 {
                // the outline turns back on itself
                e1 * SQRT_2
            } else {
                (n1 + n2) / denom
            };
            if miter.magnitude2() > 2.0 {
                miter.normalize() * SQRT_2
            } else {
                miter
            }
        })
        .collect()
}

fn normalize_or_zero(v: Vector2<f32>) -> Vector2<f32> {
    let len = v.magnitude();
    if len > f32::EPSILON { v / len } else { v }
}

/// `(z, outline growth)` for every layer, bottom to top.
fn layers(params: &TextGeometryParams) -> Vec<(f32, f32)> {
    let segments = if params.bevel_enabled {
        params.bevel_segments
    } else {
        0
    };
    let body_growth = if params.bevel_enabled {
        params.bevel_size + params.bevel_offset
    } else {
        0.0
    };
    let ring = |b: u32| {
        let t = b as f32 / segments as f32;
        let z = params.bevel_thickness * (t * FRAC_PI_2).cos();
        let growth = params.bevel_size * (t * FRAC_PI_2).sin() + params.bevel_offset;
        (z, growth)
    };

    let mut layers = Vec::with_capacity(2 + 2 * segments as usize);
    layers.extend((0..segments).map(|b| {
        let (z, growth) = ring(b);
        (-z, growth)
    }));
    layers.push((0.0, body_growth));
    layers.push((params.depth, body_growth));
    layers.extend((0..segments).rev().map(|b| {
        let (z, growth) = ring(b);
        (params.depth + z, growth)
    }));
    layers
}

/// Extrude one shape into a triangle soup with world-space UVs.
pub fn extrude_shape(shape: &Shape, params: &TextGeometryParams) -> Vec<Triangle> {
    if shape.contour.len() < 3 {
        return Vec::new();
    }

    // outer ring counter-clockwise, holes clockwise
    let mut contour = shape.contour.clone();
    if signed_area(&contour) < 0.0 {
        contour.reverse();
    }
    let holes: Vec<Vec<Vector2<f32>>> = shape
        .holes
        .iter()
        .filter(|hole| hole.len() >= 3)
        .map(|hole| {
            let mut hole = hole.clone();
            if signed_area(&hole) > 0.0 {
                hole.reverse();
            }
            hole
        })
        .collect();

    let faces = triangulate(&contour, &holes);

    let mut rings: Vec<std::ops::Range<usize>> = Vec::with_capacity(holes.len() + 1);
    let mut vertices = contour.clone();
    let mut offsets = miters(&contour);
    rings.push(0..contour.len());
    for hole in &holes {
        let start = vertices.len();
        vertices.extend_from_slice(hole);
        offsets.extend(miters(hole));
        rings.push(start..vertices.len());
    }

    let layers = layers(params);
    let position = |layer: usize, idx: usize| -> [f32; 3] {
        let (z, growth) = layers[layer];
        let p = vertices[idx] + offsets[idx] * growth;
        [p.x, p.y, z]
    };

    let mut triangles = Vec::with_capacity(faces.len() * 2 + vertices.len() * (layers.len() - 1) * 2);

    let top = layers.len() - 1;
    for &face in &faces {
        let [a, b, c] = face.map(|idx| position(0, idx));
        triangles.push([(c, [c[0], c[1]]), (b, [b[0], b[1]]), (a, [a[0], a[1]])]);
    }
    for &face in &faces {
        let [a, b, c] = face.map(|idx| position(top, idx));
        triangles.push([(a, [a[0], a[1]]), (b, [b[0], b[1]]), (c, [c[0], c[1]])]);
    }

    for ring in rings {
        let (start, len) = (ring.start, ring.len());
        for k in 0..len {
            let i = start + k;
            let j = start + (k + 1) % len;
            for layer in 0..top {
                let a = position(layer, i);
                let b = position(layer, j);
                let c = position(layer + 1, j);
                let d = position(layer + 1, i);
                let [ua, ub, uc, ud] = side_wall_uvs(a, b, c, d);
                triangles.push([(a, ua), (b, ub), (d, ud)]);
                triangles.push([(b, ub), (c, uc), (d, ud)]);
            }
        }
    }

    triangles
}

/// Project a side quad onto whichever of x or y it runs along more.
fn side_wall_uvs(a: [f32; 3], b: [f32; 3], c: [f32; 3], d: [f32; 3]) -> [[f32; 2]; 4] {
    let along_x = (a[1] - b[1]).abs() < (a[0] - b[0]).abs();
    let axis = if along_x { 0 } else { 1 };
    [a, b, c, d].map(|p| [p[axis], 1.0 - p[2]])
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;

    fn unit_square() -> Shape {
        Shape {
            contour: vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 0.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(0.0, 1.0),
            ],
            holes: Vec::new(),
        }
    }

    fn flat(depth: f32) -> TextGeometryParams {
        TextGeometryParams {
            depth,
            bevel_enabled: false,
            ..Default::default()
        }
    }

    #[test]
    fn flat_square_is_a_box() {
        let triangles = extrude_shape(&unit_square(), &flat(0.5));
        // 2 per lid, 2 per side
        assert_eq!(triangles.len(), 4 + 8);

        let geometry = Geometry::from_triangles("box", &triangles);
        let (min, max) = geometry.bounding_box().unwrap();
        assert_eq!(min, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Vector3::new(1.0, 1.0, 0.5));
    }

    #[test]
    fn box_normals_point_outwards() {
        let geometry = Geometry::from_triangles("box", &extrude_shape(&unit_square(), &flat(1.0)));
        let centre = Vector3::new(0.5, 0.5, 0.5);
        for triangle in geometry.vertices.chunks(3) {
            let mid = triangle
                .iter()
                .map(|v| Vector3::from(v.position))
                .fold(Vector3::new(0.0, 0.0, 0.0), |acc, p| acc + p / 3.0);
            let normal = Vector3::from(triangle[0].normal);
            assert!(normal.dot(mid - centre) > 0.0, "inward face at {:?}", mid);
        }
    }

    #[test]
    fn bevel_grows_outline_and_depth() {
        let params = TextGeometryParams {
            depth: 0.2,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_segments: 4,
            ..Default::default()
        };
        let geometry = Geometry::from_triangles("bevel", &extrude_shape(&unit_square(), &params));
        let (min, max) = geometry.bounding_box().unwrap();

        assert!((min.x + 0.02).abs() < 1e-4);
        assert!((max.x - 1.02).abs() < 1e-4);
        assert!((min.z + 0.03).abs() < 1e-5);
        assert!((max.z - 0.23).abs() < 1e-5);
    }

    #[test]
    fn layer_stack_is_monotonic() {
        let stack = layers(&TextGeometryParams::default());
        assert_eq!(stack.len(), 2 + 2 * 4);
        assert!(stack.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn shape_with_hole_has_inner_walls() {
        let mut shape = unit_square();
        shape.contour.iter_mut().for_each(|p| *p *= 4.0);
        shape.holes.push(vec![
            Vector2::new(1.0, 1.0),
            Vector2::new(3.0, 1.0),
            Vector2::new(3.0, 3.0),
            Vector2::new(1.0, 3.0),
        ]);
        let triangles = extrude_shape(&shape, &flat(1.0));
        // 8 lid triangles each side, 2 per side quad on 8 edges
        assert_eq!(triangles.len(), 16 + 16);
    }
}
