// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the export pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an export. Nothing is written when one is returned.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Scene error: {0}")]
    Scene(#[from] ifcjson_scene::Error),

    #[error("Definition '{0}' contains an instance of itself")]
    CyclicDefinition(String),

    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to format time stamp: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
