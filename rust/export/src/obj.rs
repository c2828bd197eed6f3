// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ text encoding of triangulated faces.
//!
//! ```text
//! v x y z        # one line per polygon point, in emission order
//! f i j k        # 1-based indices into all preceding v lines
//! ```
//!
//! Every vertex line precedes every face line. Indices keep counting across
//! faces and polygons, so the text is one mesh, not a list of meshes.

use std::fmt;

use ifcjson_scene::{Face, Point3, Transformation, Triangulator};

use crate::error::Result;

/// An OBJ mesh under construction.
#[derive(Debug, Clone, Default)]
pub struct ObjMesh {
    vertices: Vec<String>,
    polygons: Vec<String>,
    vertex_count: usize,
}

impl ObjMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangulates `faces` and appends them under `transform`.
    pub fn encode<'f, T>(
        faces: impl IntoIterator<Item = &'f Face>,
        transform: &Transformation,
        triangulator: &T,
    ) -> Result<Self>
    where
        T: Triangulator + ?Sized,
    {
        let mut mesh = Self::new();
        for face in faces {
            mesh.push_face(face, transform, triangulator)?;
        }
        Ok(mesh)
    }

    /// Appends one face.
    pub fn push_face<T>(&mut self, face: &Face, transform: &Transformation, triangulator: &T) -> Result<()>
    where
        T: Triangulator + ?Sized,
    {
        for polygon in triangulator.triangulate(face)? {
            let offset = self.vertex_count;
            for point in &polygon.points {
                self.push_vertex(&transform.transform_point(point));
            }
            let indices: Vec<String> = polygon
                .indices
                .iter()
                .map(|&i| (i.unsigned_abs() as usize + offset).to_string())
                .collect();
            self.polygons.push(format!("f {}", indices.join(" ")));
        }
        Ok(())
    }

    fn push_vertex(&mut self, p: &Point3<f64>) {
        self.vertices
            .push(format!("v {} {} {}", coord(p.x), coord(p.y), coord(p.z)));
        self.vertex_count += 1;
    }

    /// Number of vertex lines.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of face lines.
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Returns `true` if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.polygons.is_empty()
    }
}

// -0.0 + 0.0 == +0.0, so no "-0" in the output.
fn coord(v: f64) -> f64 {
    v + 0.0
}

impl fmt::Display for ObjMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.vertices.iter().chain(&self.polygons) {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
