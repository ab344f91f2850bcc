//! Outline paths and their conversion to filled shapes.

use cgmath::Vector2;

/// A closed polygon with zero or more holes, ready for triangulation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    pub contour: Vec<Vector2<f32>>,
    pub holes: Vec<Vec<Vector2<f32>>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Segment {
    Line(Vector2<f32>),
    Quad(Vector2<f32>, Vector2<f32>),
    Cubic(Vector2<f32>, Vector2<f32>, Vector2<f32>),
}

#[derive(Clone, Debug, PartialEq)]
struct SubPath {
    start: Vector2<f32>,
    segments: Vec<Segment>,
}

impl SubPath {
    /// Flatten into a ring without a repeated closing point.
    fn points(&self, divisions: u32) -> Vec<Vector2<f32>> {
        let divisions = divisions.max(1);
        let mut points = vec![self.start];
        let mut current = self.start;
        let push = |points: &mut Vec<Vector2<f32>>, p: Vector2<f32>| {
            if points.last() != Some(&p) {
                points.push(p);
            }
        };
        for segment in &self.segments {
            match *segment {
                Segment::Line(to) => {
                    push(&mut points, to);
                    current = to;
                }
                Segment::Quad(ctrl, to) => {
                    for i in 1..=divisions {
                        let t = i as f32 / divisions as f32;
                        push(&mut points, quadratic_bezier(t, current, ctrl, to));
                    }
                    current = to;
                }
                Segment::Cubic(c1, c2, to) => {
                    for i in 1..=divisions {
                        let t = i as f32 / divisions as f32;
                        push(&mut points, cubic_bezier(t, current, c1, c2, to));
                    }
                    current = to;
                }
            }
        }
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }
}

fn quadratic_bezier(t: f32, p0: Vector2<f32>, p1: Vector2<f32>, p2: Vector2<f32>) -> Vector2<f32> {
    let k = 1.0 - t;
    p0 * (k * k) + p1 * (2.0 * k * t) + p2 * (t * t)
}

fn cubic_bezier(
    t: f32,
    p0: Vector2<f32>,
    p1: Vector2<f32>,
    p2: Vector2<f32>,
    p3: Vector2<f32>,
) -> Vector2<f32> {
    let k = 1.0 - t;
    p0 * (k * k * k) + p1 * (3.0 * k * k * t) + p2 * (3.0 * k * t * t) + p3 * (t * t * t)
}

/// Signed area of a ring, positive when it runs counter-clockwise.
pub fn signed_area(ring: &[Vector2<f32>]) -> f32 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    let mut p = n - 1;
    for q in 0..n {
        area += ring[p].x * ring[q].y - ring[q].x * ring[p].y;
        p = q;
    }
    area * 0.5
}

/// Even-odd point-in-polygon test.
pub fn contains_point(ring: &[Vector2<f32>], point: Vector2<f32>) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A list of sub-paths built from move/line/curve commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapePath {
    subpaths: Vec<SubPath>,
}

impl ShapePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Vector2<f32>) {
        self.subpaths.push(SubPath {
            start: p,
            segments: Vec::new(),
        });
    }

    pub fn line_to(&mut self, to: Vector2<f32>) {
        self.push(to, Segment::Line(to));
    }

    pub fn quad_to(&mut self, ctrl: Vector2<f32>, to: Vector2<f32>) {
        self.push(to, Segment::Quad(ctrl, to));
    }

    pub fn cubic_to(&mut self, ctrl1: Vector2<f32>, ctrl2: Vector2<f32>, to: Vector2<f32>) {
        self.push(to, Segment::Cubic(ctrl1, ctrl2, to));
    }

    fn push(&mut self, to: Vector2<f32>, segment: Segment) {
        match self.subpaths.last_mut() {
            Some(subpath) => subpath.segments.push(segment),
            // drawing without a move starts at the end point
            None => self.move_to(to),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    /// Split the sub-paths into solid outlines and the holes cut into them.
    ///
    /// Solid outlines share the winding of the largest ring, which is
    /// clockwise in TrueType-derived fonts. Each hole goes to the smallest solid containing its
    /// first point, or to the solid drawn before it when none does.
    pub fn to_shapes(&self, divisions: u32) -> Vec<Shape> {
        let rings: Vec<(Vec<Vector2<f32>>, f32)> = self
            .subpaths
            .iter()
            .map(|subpath| subpath.points(divisions))
            .filter(|ring| ring.len() >= 3)
            .map(|ring| {
                let area = signed_area(&ring);
                (ring, area)
            })
            .filter(|(_, area)| area.abs() > f32::EPSILON)
            .collect();
        if rings.is_empty() {
            return Vec::new();
        }

        // the largest ring is always solid and sets the convention
        let clockwise_solids = rings
            .iter()
            .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
            .is_some_and(|(_, area)| *area < 0.0);
        let is_solid = |area: f32| if clockwise_solids { area < 0.0 } else { area > 0.0 };

        let mut shapes: Vec<(Shape, f32)> = Vec::new();
        // solid index each ring would fall back to
        let mut preceding = Vec::with_capacity(rings.len());
        for (ring, area) in &rings {
            if is_solid(*area) {
                shapes.push((
                    Shape {
                        contour: ring.clone(),
                        holes: Vec::new(),
                    },
                    area.abs(),
                ));
            }
            preceding.push(shapes.len().checked_sub(1));
        }

        for ((ring, area), fallback) in rings.iter().zip(preceding) {
            if is_solid(*area) {
                continue;
            }
            let first = ring[0];
            let owner = shapes
                .iter()
                .enumerate()
                .filter(|(_, (shape, _))| contains_point(&shape.contour, first))
                .min_by(|(_, (_, a)), (_, (_, b))| a.total_cmp(b))
                .map(|(idx, _)| idx)
                .or(fallback)
                .unwrap_or(0);
            if let Some((shape, _)) = shapes.get_mut(owner) {
                shape.holes.push(ring.clone());
            }
        }

        shapes.into_iter().map(|(shape, _)| shape).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32, clockwise: bool) -> ShapePath {
        let mut path = ShapePath::new();
        let mut corners = vec![
            Vector2::new(x, y),
            Vector2::new(x + size, y),
            Vector2::new(x + size, y + size),
            Vector2::new(x, y + size),
        ];
        if clockwise {
            corners.reverse();
        }
        path.move_to(corners[0]);
        for c in &corners[1..] {
            path.line_to(*c);
        }
        path.line_to(corners[0]);
        path
    }

    #[test]
    fn closing_point_is_dropped() {
        let shapes = square(0.0, 0.0, 1.0, true).to_shapes(5);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].contour.len(), 4);
    }

    #[test]
    fn curves_are_flattened_into_divisions() {
        let mut path = ShapePath::new();
        path.move_to(Vector2::new(0.0, 0.0));
        path.quad_to(Vector2::new(1.0, 2.0), Vector2::new(2.0, 0.0));
        path.line_to(Vector2::new(0.0, 0.0));
        let shapes = path.to_shapes(5);
        // start + 5 curve points, closing line ends on the start
        assert_eq!(shapes[0].contour.len(), 6);
    }

    #[test]
    fn inner_ring_becomes_a_hole() {
        let mut path = square(0.0, 0.0, 4.0, true);
        let inner = square(1.0, 1.0, 2.0, false);
        path.subpaths.extend(inner.subpaths);

        let shapes = path.to_shapes(5);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
    }

    #[test]
    fn counter_clockwise_only_paths_are_still_solid() {
        let shapes = square(0.0, 0.0, 1.0, false).to_shapes(5);
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].holes.is_empty());
    }

    #[test]
    fn area_sign_follows_winding() {
        let ccw = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        assert!((signed_area(&ccw) - 0.5).abs() < 1e-6);
        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert!((signed_area(&cw) + 0.5).abs() < 1e-6);
    }
}
