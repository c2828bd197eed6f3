// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export session
//!
//! Ties one export together: ask for a destination, assemble the document,
//! serialize it and hand the bytes to a sink. The destination is asked for
//! before anything else, so a cancelled prompt costs no traversal.

use std::fs;
use std::path::{Path, PathBuf};

use ifcjson_scene::{EarcutTriangulator, Scene, Triangulator};

use crate::config::ExportConfig;
use crate::document::{DocumentAssembler, ExportScope};
use crate::error::{Error, Result};
use crate::guid::{IdentifierService, IfcGuidService};

/// File name offered when the model has never been saved.
pub const UNTITLED: &str = "Untitled.json";

/// Asks where to write the document. `None` cancels the export.
pub trait PathChooser {
    fn choose(&self, suggested: &Path) -> Option<PathBuf>;
}

impl<F> PathChooser for F
where
    F: Fn(&Path) -> Option<PathBuf>,
{
    fn choose(&self, suggested: &Path) -> Option<PathBuf> {
        self(suggested)
    }
}

/// Receives the serialized document.
pub trait DocumentSink {
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// Writes documents to the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl DocumentSink for FileSink {
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(path, bytes).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Default destination: the model's file name with a `.json` extension, next to the model.
pub fn suggested_path(model_path: Option<&str>) -> PathBuf {
    let Some(model) = model_path.map(Path::new) else {
        return PathBuf::from(UNTITLED);
    };
    match model.file_stem().and_then(|s| s.to_str()) {
        Some(stem) if !stem.is_empty() => model.with_file_name(format!("{stem}.json")),
        _ => PathBuf::from(UNTITLED),
    }
}

/// How an export ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No destination was chosen; nothing was traversed or written.
    Cancelled,
    Written {
        path: PathBuf,
        entity_count: usize,
        geometry_count: usize,
        bytes: usize,
    },
}

/// Runs exports with a fixed configuration and set of services.
#[derive(Debug)]
pub struct Exporter<I = IfcGuidService, T = EarcutTriangulator> {
    config: ExportConfig,
    ids: I,
    triangulator: T,
    pretty: bool,
}

impl Exporter {
    /// Creates an exporter with the default identifier and triangulation services.
    pub fn new(config: ExportConfig) -> Self {
        Self::with_services(config, IfcGuidService, EarcutTriangulator)
    }
}

impl<I, T> Exporter<I, T>
where
    I: IdentifierService,
    T: Triangulator,
{
    pub fn with_services(config: ExportConfig, ids: I, triangulator: T) -> Self {
        Self {
            config,
            ids,
            triangulator,
            pretty: false,
        }
    }

    /// Indent the written JSON.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Exports `scope` of `scene` to wherever `chooser` says.
    pub fn export<C, S>(
        &mut self,
        scene: &Scene,
        scope: &ExportScope,
        chooser: &C,
        sink: &mut S,
    ) -> Result<ExportOutcome>
    where
        C: PathChooser + ?Sized,
        S: DocumentSink + ?Sized,
    {
        let suggested = suggested_path(scene.model_path());
        let Some(path) = chooser.choose(&suggested) else {
            tracing::info!("Export cancelled");
            return Ok(ExportOutcome::Cancelled);
        };

        let document = DocumentAssembler::new(&self.config).assemble(
            scene,
            scope,
            &mut self.ids,
            &self.triangulator,
        )?;
        let text = if self.pretty {
            document.to_json_pretty()?
        } else {
            document.to_json()?
        };

        sink.write(&path, text.as_bytes())?;

        tracing::info!(
            path = %path.display(),
            bytes = text.len(),
            "Wrote ifcJSON document"
        );

        Ok(ExportOutcome::Written {
            path,
            entity_count: document.entity_count(),
            geometry_count: document.geometry_count(),
            bytes: text.len(),
        })
    }
}
