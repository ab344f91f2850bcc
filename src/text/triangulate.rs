//! Ear-clipping triangulation of polygons with holes.
//!
//! Holes are first merged into the outer ring through zero-width bridges, the
//! rightmost hole first, and the resulting simple ring is then clipped ear by
//! ear. Indices refer to the contour points followed by the points of every
//! hole, in order.

use cgmath::{InnerSpace, Vector2};

use crate::text::path::signed_area;

fn cross(a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn in_triangle(p: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

fn oriented(points: &[Vector2<f32>], range: std::ops::Range<usize>, ccw: bool) -> Vec<usize> {
    let mut ring: Vec<usize> = range.collect();
    let ring_points: Vec<_> = ring.iter().map(|&i| points[i]).collect();
    if (signed_area(&ring_points) > 0.0) != ccw {
        ring.reverse();
    }
    ring
}

/// Triangulate `contour` minus `holes`.
///
/// The returned triangles wind counter-clockwise whatever the input winding.
pub fn triangulate(contour: &[Vector2<f32>], holes: &[Vec<Vector2<f32>>]) -> Vec<[usize; 3]> {
    if contour.len() < 3 {
        return Vec::new();
    }
    let points: Vec<Vector2<f32>> = contour
        .iter()
        .chain(holes.iter().flatten())
        .copied()
        .collect();

    let mut ring = oriented(&points, 0..contour.len(), true);

    let mut start = contour.len();
    let mut hole_rings = Vec::with_capacity(holes.len());
    for hole in holes {
        let end = start + hole.len();
        if hole.len() >= 3 {
            hole_rings.push(oriented(&points, start..end, false));
        }
        start = end;
    }
    let rightmost = |ring: &Vec<usize>| {
        ring.iter()
            .map(|&i| points[i].x)
            .fold(f32::NEG_INFINITY, f32::max)
    };
    hole_rings.sort_by(|a, b| rightmost(b).total_cmp(&rightmost(a)));

    for hole in &hole_rings {
        ring = bridge(&points, ring, hole);
    }

    clip_ears(&points, ring)
}

/// Splice `hole` into `ring` through a bridge from its rightmost vertex to a
/// ring vertex visible from it.
fn bridge(points: &[Vector2<f32>], ring: Vec<usize>, hole: &[usize]) -> Vec<usize> {
    let Some((m_pos, &m_idx)) = hole
        .iter()
        .enumerate()
        .max_by(|&(_, &a), &(_, &b)| points[a].x.total_cmp(&points[b].x))
    else {
        return ring;
    };
    let m = points[m_idx];

    // cast a ray towards +x and find the closest ring edge it hits
    let n = ring.len();
    let mut hit: Option<(f32, usize)> = None;
    for i in 0..n {
        let (ia, ib) = (ring[i], ring[(i + 1) % n]);
        let (a, b) = (points[ia], points[ib]);
        if (a.y - m.y) * (b.y - m.y) > 0.0 || a.y == b.y {
            continue;
        }
        let x = a.x + (m.y - a.y) * (b.x - a.x) / (b.y - a.y);
        if x >= m.x && hit.is_none_or(|(best, _)| x < best) {
            let candidate = if a.x >= b.x { i } else { (i + 1) % n };
            hit = Some((x, candidate));
        }
    }

    let connect = match hit {
        Some((hit_x, candidate)) => {
            let p = points[ring[candidate]];
            let i = Vector2::new(hit_x, m.y);
            // a reflex vertex inside (m, i, p) would block the bridge; take
            // the one with the smallest angle to the ray instead
            let mut best = candidate;
            let mut best_tan = f32::INFINITY;
            if p != i {
                let (ta, tb, tc) = if p.y < m.y { (m, p, i) } else { (m, i, p) };
                for (pos, &idx) in ring.iter().enumerate() {
                    let q = points[idx];
                    if pos == candidate || q.x <= m.x || !in_triangle(q, ta, tb, tc) {
                        continue;
                    }
                    let tan = (q.y - m.y).abs() / (q.x - m.x);
                    if tan < best_tan {
                        best_tan = tan;
                        best = pos;
                    }
                }
            }
            best
        }
        None => {
            log::debug!("no edge to the right of hole vertex {:?}, bridging to nearest", m);
            ring.iter()
                .enumerate()
                .min_by(|&(_, &a), &(_, &b)| {
                    (points[a] - m)
                        .magnitude2()
                        .total_cmp(&(points[b] - m).magnitude2())
                })
                .map(|(pos, _)| pos)
                .unwrap_or(0)
        }
    };

    let mut merged = Vec::with_capacity(ring.len() + hole.len() + 2);
    merged.extend_from_slice(&ring[..=connect]);
    merged.extend(hole[m_pos..].iter().chain(&hole[..m_pos]));
    merged.push(m_idx);
    merged.push(ring[connect]);
    merged.extend_from_slice(&ring[connect + 1..]);
    merged
}

fn is_ear(points: &[Vector2<f32>], ring: &[usize], pos: usize) -> bool {
    let n = ring.len();
    let (ia, ib, ic) = (ring[(pos + n - 1) % n], ring[pos], ring[(pos + 1) % n]);
    let (a, b, c) = (points[ia], points[ib], points[ic]);
    if cross(a, b, c) <= 0.0 {
        return false;
    }
    ring.iter().all(|&idx| {
        let p = points[idx];
        p == a || p == b || p == c || !in_triangle(p, a, b, c)
    })
}

fn clip_ears(points: &[Vector2<f32>], mut ring: Vec<usize>) -> Vec<[usize; 3]> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));
    let mut pos = 0;
    let mut misses = 0;

    while ring.len() > 3 {
        let n = ring.len();
        pos %= n;
        let (ia, ib, ic) = (ring[(pos + n - 1) % n], ring[pos], ring[(pos + 1) % n]);
        let area = cross(points[ia], points[ib], points[ic]);

        if area.abs() <= f32::EPSILON * f32::EPSILON {
            // collinear or duplicate point, nothing to fill
            ring.remove(pos);
            misses = 0;
        } else if is_ear(points, &ring, pos) {
            triangles.push([ia, ib, ic]);
            ring.remove(pos);
            misses = 0;
        } else {
            pos += 1;
            misses += 1;
        }

        if misses >= n {
            // self-touching input can leave no clean ear; cut the most convex corner
            let forced = (0..n)
                .max_by(|&x, &y| {
                    let corner = |p: usize| {
                        cross(points[ring[(p + n - 1) % n]], points[ring[p]], points[ring[(p + 1) % n]])
                    };
                    corner(x).total_cmp(&corner(y))
                })
                .unwrap_or(0);
            log::debug!("no ear among {} vertices, forcing one", n);
            triangles.push([ring[(forced + n - 1) % n], ring[forced], ring[(forced + 1) % n]]);
            ring.remove(forced);
            pos = forced;
            misses = 0;
        }
    }

    if let [a, b, c] = ring[..] {
        if cross(points[a], points[b], points[c]) > 0.0 {
            triangles.push([a, b, c]);
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_of(points: &[Vector2<f32>], triangles: &[[usize; 3]]) -> f32 {
        triangles
            .iter()
            .map(|t| cross(points[t[0]], points[t[1]], points[t[2]]) * 0.5)
            .sum()
    }

    fn square(x: f32, y: f32, size: f32) -> Vec<Vector2<f32>> {
        vec![
            Vector2::new(x, y),
            Vector2::new(x + size, y),
            Vector2::new(x + size, y + size),
            Vector2::new(x, y + size),
        ]
    }

    #[test]
    fn square_makes_two_triangles() {
        let contour = square(0.0, 0.0, 1.0);
        let triangles = triangulate(&contour, &[]);
        assert_eq!(triangles.len(), 2);
        assert!((area_of(&contour, &triangles) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn clockwise_input_still_gives_ccw_triangles() {
        let mut contour = square(0.0, 0.0, 2.0);
        contour.reverse();
        let triangles = triangulate(&contour, &[]);
        for t in &triangles {
            assert!(cross(contour[t[0]], contour[t[1]], contour[t[2]]) > 0.0);
        }
    }

    #[test]
    fn concave_polygon_keeps_its_area() {
        // an L shape
        let contour = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            Vector2::new(2.0, 1.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 2.0),
            Vector2::new(0.0, 2.0),
        ];
        let triangles = triangulate(&contour, &[]);
        assert_eq!(triangles.len(), 4);
        assert!((area_of(&contour, &triangles) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn hole_area_is_left_out() {
        let contour = square(0.0, 0.0, 4.0);
        let hole = square(1.0, 1.0, 2.0);
        let triangles = triangulate(&contour, &[hole.clone()]);

        let points: Vec<_> = contour.iter().chain(hole.iter()).copied().collect();
        assert!((area_of(&points, &triangles) - 12.0).abs() < 1e-4);
        // 8 ring vertices plus two bridge duplicates
        assert_eq!(triangles.len(), 8);
    }

    #[test]
    fn hole_with_several_rightmost_vertices_is_bridged_once() {
        let contour = square(0.0, 0.0, 6.0);
        // two vertices share the largest x
        let hole = square(2.0, 2.0, 2.0);
        let triangles = triangulate(&contour, &[hole.clone()]);
        let points: Vec<_> = contour.iter().chain(hole.iter()).copied().collect();
        assert!((area_of(&points, &triangles) - 32.0).abs() < 1e-4);
    }

    #[test]
    fn stray_hole_outside_the_contour_does_not_panic() {
        // no contour edge lies to the right of this hole, so it is bridged to
        // the nearest contour vertex
        let contour = square(0.0, 0.0, 4.0);
        let hole = square(0.0, 5.0, 1.0);
        let triangles = triangulate(&contour, &[hole]);
        assert!(!triangles.is_empty());
        assert!(triangles.iter().flatten().all(|&i| i < 8));
    }

    #[test]
    fn degenerate_input_is_empty() {
        let line = vec![Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)];
        assert!(triangulate(&line, &[]).is_empty());
    }
}
