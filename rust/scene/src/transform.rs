// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Affine transformations of scene instances.
//!
//! Points are column vectors, so a transform `m` maps `p` to `m * p`. Nested
//! instances compose as `parent * child`: the child's own transform is applied
//! first, then every ancestor's, outermost last.

use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};

use crate::error::{Error, Result};

/// A 4x4 affine transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    matrix: Matrix4<f64>,
}

impl Transformation {
    /// The identity transformation.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Wraps an existing matrix.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// A pure translation.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vector3::new(dx, dy, dz)),
        }
    }

    /// A rotation of `angle` radians around `axis` through the origin.
    ///
    /// A zero-length axis yields the identity.
    pub fn rotation(axis: &Vector3<f64>, angle: f64) -> Self {
        match Unit::try_new(*axis, 1e-15) {
            Some(unit_axis) => Self {
                matrix: Rotation3::from_axis_angle(&unit_axis, angle).to_homogeneous(),
            },
            None => Self::identity(), // degenerate axis
        }
    }

    /// A non-uniform scale about the origin.
    pub fn scaling(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)),
        }
    }

    /// Builds a transformation from 16 column-major components, the layout the
    /// host uses when it flattens a transformation to an array.
    pub fn from_column_major(values: &[f64]) -> Result<Self> {
        if values.len() != 16 {
            return Err(Error::InvalidTransform(values.len()));
        }
        Ok(Self {
            matrix: Matrix4::from_column_slice(values),
        })
    }

    /// Returns the 16 components in column-major order.
    pub fn to_column_major(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.matrix.as_slice());
        out
    }

    /// Returns the underlying matrix.
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Composes this (parent) transformation with a child's local one.
    ///
    /// The result maps child-local points into this transformation's target
    /// frame: `child` is applied first.
    pub fn compose(&self, child: &Transformation) -> Transformation {
        Self {
            matrix: self.matrix * child.matrix,
        }
    }

    /// Transforms a point.
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }

    /// Returns `true` if this is exactly the identity.
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4::identity()
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transformation {
    type Output = Transformation;

    fn mul(self, rhs: Transformation) -> Transformation {
        self.compose(&rhs)
    }
}
