// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # ifcJSON Scene
//!
//! Read-only snapshot of a modeling tool's scene graph, as consumed by the
//! ifcJSON exporter.
//!
//! The scene is an arena: component [`Definition`]s and [`Entity`] nodes live
//! in slot maps with stable, typed keys. An instance entity references a
//! definition, so one definition placed many times is stored once. Faces are
//! leaf polygons in the local frame of the definition that owns them.
//!
//! Attribute data follows the host's nested dictionary layout, modelled as a
//! tagged [`AttributeNode`] (leaf value or ordered branch), and polygon
//! triangulation is exposed through the [`Triangulator`] capability so that
//! consumers can swap in the host's own tessellator.

pub mod arena;
pub mod dictionary;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod serialization;
pub mod transform;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use arena::{Definition, Entity, Instance, Scene};
pub use dictionary::{AttributeDictionary, AttributeNode, AttributeStorage, AttributeValue};
pub use error::{Error, Result};
pub use geometry::Face;
pub use keys::{DefinitionKey, EntityKey, EntityKind};
pub use transform::Transformation;
pub use triangulation::{EarcutTriangulator, TriangulatedPolygon, Triangulator};
