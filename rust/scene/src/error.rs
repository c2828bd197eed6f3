// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scene operations.

use crate::keys::{DefinitionKey, EntityKey};

/// Result type alias for scene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, loading or tessellating a scene.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced entity was not found in the arena.
    #[error("entity not found: {0:?}")]
    EntityNotFound(EntityKey),

    /// A referenced definition was not found in the arena.
    #[error("definition not found: {0:?}")]
    DefinitionNotFound(DefinitionKey),

    /// A snapshot instance points at a definition id that does not exist.
    #[error("snapshot references unknown definition id {0}")]
    UnknownDefinitionId(usize),

    /// A snapshot defines the same definition id twice.
    #[error("duplicate definition id {0} in snapshot")]
    DuplicateDefinitionId(usize),

    /// A transformation matrix did not have 16 components.
    #[error("transformation needs 16 components, got {0}")]
    InvalidTransform(usize),

    /// The polygon triangulator rejected a face.
    #[error("triangulation failed: {0}")]
    Triangulation(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
