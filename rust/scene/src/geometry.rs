// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar faces and the geometric queries the exporter needs on them.

use nalgebra::{Point3, Vector3};

/// A planar polygon bounded by one outer loop and zero or more hole loops.
///
/// Points are expressed in the local frame of the definition owning the face.
/// Loops are implicitly closed (the last point connects back to the first).
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub outer: Vec<Point3<f64>>,
    pub holes: Vec<Vec<Point3<f64>>>,
}

impl Face {
    /// Creates a face without holes.
    pub fn new(outer: Vec<Point3<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Creates a face with holes.
    pub fn with_holes(outer: Vec<Point3<f64>>, holes: Vec<Vec<Point3<f64>>>) -> Self {
        Self { outer, holes }
    }

    /// Convenience constructor from coordinate triples.
    pub fn from_coords(coords: &[[f64; 3]]) -> Self {
        Self::new(coords.iter().map(|c| Point3::new(c[0], c[1], c[2])).collect())
    }

    /// Unit normal of the outer loop (Newell's method), following the
    /// right-hand rule over the winding order. `None` for degenerate loops.
    pub fn normal(&self) -> Option<Vector3<f64>> {
        if self.outer.len() < 3 {
            return None;
        }

        let next = self.outer.iter().cycle().skip(1);
        let sum = self
            .outer
            .iter()
            .zip(next)
            .fold(Vector3::zeros(), |acc, (a, b)| {
                acc + Vector3::new(
                    (a.y - b.y) * (a.z + b.z),
                    (a.z - b.z) * (a.x + b.x),
                    (a.x - b.x) * (a.y + b.y),
                )
            });

        sum.try_normalize(1e-15)
    }

    /// Total number of loop points (outer and holes).
    pub fn point_count(&self) -> usize {
        self.outer.len() + self.holes.iter().map(Vec::len).sum::<usize>()
    }
}
