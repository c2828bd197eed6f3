// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face triangulation.
//!
//! The exporter does not tessellate faces itself: it asks a [`Triangulator`]
//! for polygons. [`EarcutTriangulator`] is the built-in implementation (earcutr
//! on the face's plane); a host binding can supply its own.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{Error, Result};
use crate::geometry::Face;

/// One polygon produced by triangulating a face.
///
/// `indices` are 1-based positions into `points`. A negative index marks the
/// edge that starts at that vertex as an interior (hidden) edge; consumers that
/// only need topology use the absolute value.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangulatedPolygon {
    pub points: Vec<Point3<f64>>,
    pub indices: Vec<i32>,
}

/// Capability that splits a planar face into polygons.
pub trait Triangulator {
    /// Triangulates `face`. Degenerate faces may yield no polygons.
    fn triangulate(&self, face: &Face) -> Result<Vec<TriangulatedPolygon>>;
}

impl<T: Triangulator + ?Sized> Triangulator for &T {
    fn triangulate(&self, face: &Face) -> Result<Vec<TriangulatedPolygon>> {
        (**self).triangulate(face)
    }
}

/// Ear-clipping triangulator projecting each face onto its own plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarcutTriangulator;

impl Triangulator for EarcutTriangulator {
    fn triangulate(&self, face: &Face) -> Result<Vec<TriangulatedPolygon>> {
        if face.outer.len() < 3 {
            tracing::debug!(points = face.outer.len(), "Skipping face with fewer than 3 points");
            return Ok(Vec::new());
        }
        let Some(normal) = face.normal() else {
            tracing::debug!("Skipping degenerate face without a normal");
            return Ok(Vec::new());
        };

        // Combined vertex array: outer loop first, then every usable hole.
        let mut combined: Vec<Point3<f64>> = face.outer.clone();
        let mut loops = vec![(0usize, face.outer.len())];
        for hole in face.holes.iter().filter(|h| h.len() >= 3) {
            loops.push((combined.len(), hole.len()));
            combined.extend(hole.iter().copied());
        }

        let flat = flatten_onto_plane(&combined, &normal);
        let triangles = if loops.len() == 1 && is_convex(&flat) {
            fan(flat.len())
        } else {
            let hole_starts: Vec<usize> = loops[1..].iter().map(|&(start, _)| start).collect();
            earcut(&flat, &hole_starts)?
        };

        let polygons = triangles
            .chunks_exact(3)
            .map(|tri| {
                let points = tri.iter().map(|&i| combined[i]).collect();
                let indices = (0..3)
                    .map(|k| {
                        let local = (k + 1) as i32;
                        if is_boundary_edge(&loops, tri[k], tri[(k + 1) % 3]) {
                            local
                        } else {
                            -local
                        }
                    })
                    .collect();
                TriangulatedPolygon { points, indices }
            })
            .collect();

        Ok(polygons)
    }
}

/// Returns `true` if `a` and `b` are neighbours on the same loop.
fn is_boundary_edge(loops: &[(usize, usize)], a: usize, b: usize) -> bool {
    loops.iter().any(|&(start, len)| {
        let range = start..start + len;
        if !range.contains(&a) || !range.contains(&b) {
            return false;
        }
        let (pa, pb) = (a - start, b - start);
        (pa + 1) % len == pb || (pb + 1) % len == pa
    })
}

/// `true` if every turn along the loop has the same orientation and the
/// loop winds exactly once. Collinear runs are ignored.
fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    let mut orientation = None;
    let mut turning = 0.0;
    for i in 0..n {
        let (a, b, c) = (points[i], points[(i + 1) % n], points[(i + 2) % n]);
        let (incoming, outgoing) = (b - a, c - b);
        let cross = incoming.perp(&outgoing);
        if cross.abs() <= 1e-10 {
            continue;
        }
        match orientation {
            None => orientation = Some(cross > 0.0),
            Some(ccw) if ccw != (cross > 0.0) => return false,
            Some(_) => {}
        }
        turning += cross.atan2(incoming.dot(&outgoing));
    }
    // A star keeps one orientation but winds more than once.
    orientation.is_some() && (turning.abs() - std::f64::consts::TAU).abs() < 1e-6
}

/// Triangles fanning out from the first vertex.
fn fan(n: usize) -> Vec<usize> {
    (1..n.saturating_sub(1)).flat_map(|i| [0, i, i + 1]).collect()
}

/// Ear clipping over the combined vertex array; `hole_starts` index into `points`.
fn earcut(points: &[Point2<f64>], hole_starts: &[usize]) -> Result<Vec<usize>> {
    let coords: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    earcutr::earcut(&coords, hole_starts, 2).map_err(|e| Error::Triangulation(format!("{:?}", e)))
}

/// Expresses `points` in 2D coordinates of the plane through the first point
/// with the given unit `normal`.
fn flatten_onto_plane(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(&origin) = points.first() else {
        return Vec::new();
    };

    // Build the basis from whichever world axis is furthest from the normal.
    let axis = normal.iamin();
    let helper = Vector3::ith(axis, 1.0);
    let u = normal.cross(&helper).normalize();
    let v = normal.cross(&u);

    points
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u), d.dot(&v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Face {
        Face::from_coords(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ])
    }

    #[test]
    fn triangle_yields_one_polygon_with_boundary_edges() {
        let face = Face::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let polygons = EarcutTriangulator.triangulate(&face).unwrap();

        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].points, face.outer);
        assert_eq!(polygons[0].indices, vec![1, 2, 3]);
    }

    #[test]
    fn square_yields_two_triangles_with_one_hidden_diagonal_each() {
        let polygons = EarcutTriangulator.triangulate(&square()).unwrap();

        assert_eq!(polygons.len(), 2);
        for polygon in &polygons {
            assert_eq!(polygon.points.len(), 3);
            let hidden = polygon.indices.iter().filter(|&&i| i < 0).count();
            assert_eq!(hidden, 1);
            let mut abs: Vec<i32> = polygon.indices.iter().map(|i| i.abs()).collect();
            abs.sort_unstable();
            assert_eq!(abs, vec![1, 2, 3]);
        }
    }

    #[test]
    fn face_with_hole_covers_ring() {
        let outer = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ];
        let hole = vec![
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 3.0, 0.0),
            Point3::new(3.0, 3.0, 0.0),
            Point3::new(3.0, 1.0, 0.0),
        ];
        let face = Face::with_holes(outer, vec![hole]);

        let polygons = EarcutTriangulator.triangulate(&face).unwrap();

        // A square ring needs 8 triangles.
        assert_eq!(polygons.len(), 8);
    }

    #[test]
    fn degenerate_face_yields_nothing() {
        let line = Face::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        assert!(EarcutTriangulator.triangulate(&line).unwrap().is_empty());

        let point = Face::from_coords(&[[0.0, 0.0, 0.0]]);
        assert!(EarcutTriangulator.triangulate(&point).unwrap().is_empty());
    }

    #[test]
    fn vertical_face_projects() {
        let face = Face::from_coords(&[
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
        ]);
        assert_eq!(EarcutTriangulator.triangulate(&face).unwrap().len(), 2);
    }

    #[test]
    fn convex_pentagon_fans_from_first_vertex() {
        assert_eq!(fan(5), vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
        let pentagon = Face::from_coords(&[
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [3.0, 1.0, 0.0],
            [1.0, 2.0, 0.0],
            [-1.0, 1.0, 0.0],
        ]);
        let polygons = EarcutTriangulator.triangulate(&pentagon).unwrap();
        assert_eq!(polygons.len(), 3);
        assert!(polygons.iter().all(|p| p.points[0] == pentagon.outer[0]));
    }

    #[test]
    fn concave_outline_is_ear_clipped() {
        let l_shape = Face::from_coords(&[
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 2.0, 0.0],
            [0.0, 2.0, 0.0],
        ]);
        let flat = flatten_onto_plane(&l_shape.outer, &l_shape.normal().unwrap());
        assert!(!is_convex(&flat));
        assert_eq!(EarcutTriangulator.triangulate(&l_shape).unwrap().len(), 4);
    }

    #[test]
    fn pentagram_is_not_convex() {
        // Every second vertex of a regular pentagon: all turns agree but the loop winds twice.
        let star: Vec<Point2<f64>> = (0..5)
            .map(|i| {
                let angle = std::f64::consts::TAU * (2 * i) as f64 / 5.0;
                Point2::new(angle.cos(), angle.sin())
            })
            .collect();
        assert!(!is_convex(&star));

        let pentagon: Vec<Point2<f64>> = (0..5)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / 5.0;
                Point2::new(angle.cos(), angle.sin())
            })
            .collect();
        assert!(is_convex(&pentagon));
        let clockwise: Vec<_> = pentagon.iter().rev().copied().collect();
        assert!(is_convex(&clockwise));
    }
}
