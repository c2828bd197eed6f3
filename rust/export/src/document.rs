// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document assembly
//!
//! The output document is a header followed by one flat `data` list:
//!
//! 1. every full entity record, in traversal pre-order,
//! 2. every geometry record, in creation order.
//!
//! Root-level typed groups need no separate summary: the walker lists the
//! full record of every typed group it reaches, roots included.

use ifcjson_scene::{EntityKey, Scene, Triangulator};
use serde::Serialize;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::config::{ExportConfig, HeaderConfig};
use crate::error::Result;
use crate::guid::IdentifierService;
use crate::records::DataRecord;
use crate::walker::{SceneWalker, WalkContext};

/// A complete ifcJSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "type")]
    pub document_type: String,
    pub schema: String,
    pub description: String,
    pub time_stamp: String,
    pub preprocessor_version: String,
    pub originating_system: String,
    pub data: Vec<DataRecord>,
}

impl Document {
    /// Compact JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON text.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of full entity records.
    pub fn entity_count(&self) -> usize {
        self.data
            .iter()
            .filter(|r| matches!(r, DataRecord::Entity(_)))
            .count()
    }

    /// Number of geometry records.
    pub fn geometry_count(&self) -> usize {
        self.data
            .iter()
            .filter(|r| matches!(r, DataRecord::Geometry(_)))
            .count()
    }
}

/// Which part of the scene to export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExportScope {
    /// Every root entity of the scene.
    #[default]
    Model,
    /// Only the given entities, in the given order, treated as roots.
    Selection(Vec<EntityKey>),
}

/// Builds [`Document`]s from scenes.
#[derive(Debug, Clone)]
pub struct DocumentAssembler<'a> {
    config: &'a ExportConfig,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    /// Runs one traversal of `scope` and assembles the result.
    pub fn assemble<I, T>(&self, scene: &Scene, scope: &ExportScope, ids: I, triangulator: T) -> Result<Document>
    where
        I: IdentifierService,
        T: Triangulator,
    {
        let mut document = header(&self.config.header)?;

        let roots = match scope {
            ExportScope::Model => scene.root_entities(),
            ExportScope::Selection(keys) => keys.as_slice(),
        };

        let mut walker = SceneWalker::new(scene, self.config, ids, triangulator);
        let level = walker.walk(roots, &WalkContext::root())?;

        if !level.faces.is_empty() {
            tracing::debug!(
                faces = level.faces.len(),
                "Skipping faces without an owning group"
            );
        }

        if !level.representations.is_empty() {
            tracing::debug!(
                geometry = level.representations.len(),
                "Geometry of untyped root groups has no owning entity"
            );
        }

        // Every root-level summary points at a record the walker already listed.
        debug_assert!(level.children.iter().all(|s| walker.contains(&s.global_id)));
        let output = walker.finish();

        document.data.reserve(output.entities.len() + output.geometry.len());
        document.data.extend(output.entities.into_iter().map(DataRecord::Entity));
        document.data.extend(output.geometry.into_iter().map(DataRecord::Geometry));

        tracing::info!(
            entities = document.entity_count(),
            geometry = document.geometry_count(),
            records = document.data.len(),
            "Assembled ifcJSON document"
        );

        Ok(document)
    }
}

fn header(config: &HeaderConfig) -> Result<Document> {
    let time_stamp = match &config.time_stamp {
        Some(fixed) => fixed.clone(),
        None => OffsetDateTime::now_utc()
            .format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))?,
    };

    Ok(Document {
        document_type: config.document_type.clone(),
        schema: config.schema.clone(),
        description: config.description.clone(),
        time_stamp,
        preprocessor_version: config.preprocessor_version.clone(),
        originating_system: config.originating_system.clone(),
        data: Vec::new(),
    })
}
