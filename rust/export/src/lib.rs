// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # ifcJSON Export
//!
//! Turns a [`Scene`](ifcjson_scene::Scene) snapshot into an ifcJSON document:
//! a header plus one flat list of entity records, child summaries and
//! geometry records.
//!
//! ## Overview
//!
//! - **Attribute resolution**: nested schema dictionaries flattened to
//!   `name → value` fields and a normalized entity type
//! - **Identifiers**: IFC compressed GUIDs, seeded from the host's own ids and
//!   chained to the enclosing instance
//! - **Mesh encoding**: triangulated faces written as OBJ text
//! - **Traversal**: depth-first walk that composes transforms, deduplicates
//!   repeated instances and skips untyped groups
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifcjson_export::{ExportConfig, ExportScope, Exporter, FileSink};
//! use ifcjson_scene::Scene;
//! use std::path::{Path, PathBuf};
//!
//! let scene = Scene::from_json(&std::fs::read_to_string("scene.json")?)?;
//! let chooser = |suggested: &Path| Some(suggested.to_path_buf());
//!
//! let outcome = Exporter::new(ExportConfig::from_env())
//!     .pretty(true)
//!     .export(&scene, &ExportScope::Model, &chooser, &mut FileSink)?;
//! ```

pub mod attributes;
pub mod config;
pub mod document;
pub mod error;
pub mod guid;
pub mod obj;
pub mod records;
pub mod session;
pub mod walker;

pub use attributes::{AttributeResolver, ResolvedAttributes};
pub use config::{ExportConfig, HeaderConfig};
pub use document::{Document, DocumentAssembler, ExportScope};
pub use error::{Error, Result};
pub use guid::{GlobalId, IdentifierService, IfcGuidService};
pub use obj::ObjMesh;
pub use records::{ChildSummary, DataRecord, EntityRecord, GeometryRecord, RepresentationRef};
pub use session::{suggested_path, DocumentSink, ExportOutcome, Exporter, FileSink, PathChooser};
pub use walker::{SceneWalker, WalkContext, WalkOutput};
