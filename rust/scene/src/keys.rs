// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based scene storage.
//!
//! Keys are created by `slotmap::SlotMap` and stay valid for the lifetime of
//! the scene (generational indices), so the exporter can address nodes without
//! holding references into the host's graph.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a component definition (shared by all of its instances).
    pub struct DefinitionKey;

    /// Key for a scene entity (instance, face or any other host node).
    pub struct EntityKey;
}

/// Discriminant for scene entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Instance = 0,
    Face = 1,
    Other = 2,
}

impl EntityKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Instance => "Instance",
            EntityKind::Face => "Face",
            EntityKind::Other => "Other",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_names() {
        assert_eq!(EntityKind::Instance.as_str(), "Instance");
        assert_eq!(EntityKind::Face.as_str(), "Face");
        assert_eq!(EntityKind::Other.to_string(), "Other");
    }
}
