// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for a scene snapshot.
//!
//! The [`Scene`] owns every definition and entity in slot maps with stable,
//! generational keys. Nesting is expressed through keys only: an instance
//! names its definition, a definition lists the entities it contains, and the
//! scene lists its root entities. Nothing here is mutated by the exporter.
//!
//! ## Shared definitions
//!
//! A definition placed several times is stored once and referenced by each
//! instance, matching how modeling tools share component definitions. The
//! exporter relies on this to recognise repeated instances.

use slotmap::SlotMap;

use crate::dictionary::AttributeStorage;
use crate::error::{Error, Result};
use crate::geometry::Face;
use crate::keys::*;
use crate::transform::Transformation;

/// A component definition: named, attributed, containing entities.
#[derive(Debug, Clone, Default)]
pub struct Definition {
    pub name: String,
    pub attributes: AttributeStorage,
    pub entities: Vec<EntityKey>,
}

impl Definition {
    /// Creates an empty definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an empty definition carrying the given attributes.
    pub fn with_attributes(name: impl Into<String>, attributes: AttributeStorage) -> Self {
        Self {
            name: name.into(),
            attributes,
            entities: Vec::new(),
        }
    }
}

/// Placement of a definition (a group or component instance).
#[derive(Debug, Clone)]
pub struct Instance {
    pub definition: DefinitionKey,
    pub transform: Transformation,
    /// Enclosed volume as reported by the host, `None` for non-manifold solids.
    pub volume: Option<f64>,
}

impl Instance {
    /// Creates an instance with the given local transformation.
    pub fn new(definition: DefinitionKey, transform: Transformation) -> Self {
        Self {
            definition,
            transform,
            volume: None,
        }
    }

    /// Sets the reported volume.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone)]
pub enum Entity {
    Instance(Instance),
    Face(Face),
    /// Any other host node (edges, guides, text); carries only its kind name.
    Other(String),
}

impl Entity {
    /// Returns the kind discriminant.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Instance(_) => EntityKind::Instance,
            Entity::Face(_) => EntityKind::Face,
            Entity::Other(_) => EntityKind::Other,
        }
    }
}

/// The central arena that owns a scene snapshot.
///
/// # Example
///
/// ```
/// use ifcjson_scene::{Definition, Entity, Face, Instance, Scene, Transformation};
///
/// let mut scene = Scene::new();
/// let wall = scene.add_definition(Definition::new("Wall"));
/// scene
///     .add_entity(Some(wall), Entity::Face(Face::from_coords(&[
///         [0.0, 0.0, 0.0],
///         [1.0, 0.0, 0.0],
///         [0.0, 1.0, 0.0],
///     ])))
///     .unwrap();
/// scene.add_instance(None, Instance::new(wall, Transformation::identity())).unwrap();
///
/// assert_eq!(scene.root_entities().len(), 1);
/// assert_eq!(scene.entity_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Scene {
    pub(crate) definitions: SlotMap<DefinitionKey, Definition>,
    pub(crate) entities: SlotMap<EntityKey, Entity>,
    pub(crate) root: Vec<EntityKey>,
    pub(crate) model_path: Option<String>,
}

impl Scene {
    /// Creates a new, empty scene.
    pub fn new() -> Self {
        Self {
            definitions: SlotMap::with_key(),
            entities: SlotMap::with_key(),
            root: Vec::new(),
            model_path: None,
        }
    }

    /// Path of the model file the snapshot was taken from, if saved.
    pub fn model_path(&self) -> Option<&str> {
        self.model_path.as_deref()
    }

    /// Records the model file path.
    pub fn set_model_path(&mut self, path: impl Into<String>) {
        self.model_path = Some(path.into());
    }

    // --- Definition operations ---

    /// Adds a definition. Its entity list is appended to via [`Self::add_entity`].
    pub fn add_definition(&mut self, definition: Definition) -> DefinitionKey {
        self.definitions.insert(definition)
    }

    /// Returns the definition for the given key, or `None` if not found.
    pub fn definition(&self, key: DefinitionKey) -> Option<&Definition> {
        self.definitions.get(key)
    }

    /// Returns a mutable definition, e.g. to edit attributes while building.
    pub fn definition_mut(&mut self, key: DefinitionKey) -> Option<&mut Definition> {
        self.definitions.get_mut(key)
    }

    /// Returns the number of definitions in the scene.
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    // --- Entity operations ---

    /// Adds an entity to `parent` (a definition) or to the scene root.
    pub fn add_entity(&mut self, parent: Option<DefinitionKey>, entity: Entity) -> Result<EntityKey> {
        if let Entity::Instance(instance) = &entity {
            if !self.definitions.contains_key(instance.definition) {
                return Err(Error::DefinitionNotFound(instance.definition));
            }
        }
        if let Some(parent) = parent {
            if !self.definitions.contains_key(parent) {
                return Err(Error::DefinitionNotFound(parent));
            }
        }

        let key = self.entities.insert(entity);
        match parent {
            Some(parent) => self.definitions[parent].entities.push(key),
            None => self.root.push(key),
        }
        Ok(key)
    }

    /// Adds an instance entity.
    pub fn add_instance(&mut self, parent: Option<DefinitionKey>, instance: Instance) -> Result<EntityKey> {
        self.add_entity(parent, Entity::Instance(instance))
    }

    /// Adds a face entity.
    pub fn add_face(&mut self, parent: Option<DefinitionKey>, face: Face) -> Result<EntityKey> {
        self.add_entity(parent, Entity::Face(face))
    }

    /// Returns the entity for the given key, or `None` if not found.
    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Returns the number of entities in the scene.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns the entities placed directly in the model (not inside any definition).
    pub fn root_entities(&self) -> &[EntityKey] {
        &self.root
    }

    /// Returns the entities contained in a definition.
    pub fn definition_entities(&self, key: DefinitionKey) -> Result<&[EntityKey]> {
        self.definitions
            .get(key)
            .map(|d| d.entities.as_slice())
            .ok_or(Error::DefinitionNotFound(key))
    }

    /// Returns `true` if the given key references a valid entity.
    pub fn contains(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key)
    }
}
