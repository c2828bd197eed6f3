// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON snapshots of a scene.
//!
//! A host plugin dumps its scene graph in this format and the exporter loads
//! it back into a [`Scene`]. Definitions are referenced by integer id; entity
//! nodes are nested inside the definition (or the root list) that owns them.

use std::collections::BTreeMap;

use nalgebra::Point3;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::arena::*;
use crate::dictionary::{AttributeDictionary, AttributeNode, AttributeStorage, AttributeValue};
use crate::error::{Error, Result};
use crate::geometry::Face;
use crate::keys::DefinitionKey;
use crate::transform::Transformation;

/// Serializable representation of a full scene.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    #[serde(default)]
    pub definitions: Vec<DefinitionSnapshot>,
    #[serde(default)]
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DefinitionSnapshot {
    pub id: usize,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: AttributesSnapshot,
    #[serde(default)]
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributesSnapshot {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schema_types: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dictionaries: Vec<DictionarySnapshot>,
}

/// A dictionary is a leaf when the `value` key is present (even if `null`).
#[derive(Debug, Serialize, Deserialize)]
pub struct DictionarySnapshot {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Option<AttributeValue>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dictionaries: Vec<DictionarySnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntitySnapshot {
    Instance {
        definition: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transform: Option<Vec<f64>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        volume: Option<f64>,
    },
    Face {
        outer: Vec<[f64; 3]>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        holes: Vec<Vec<[f64; 3]>>,
    },
    Other {
        #[serde(default)]
        name: String,
    },
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<AttributeValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<AttributeValue>::deserialize(deserializer).map(Some)
}

impl From<&DictionarySnapshot> for AttributeDictionary {
    fn from(snap: &DictionarySnapshot) -> Self {
        let node = match &snap.value {
            Some(value) => AttributeNode::Leaf {
                value: value.clone(),
                hidden: snap.hidden,
            },
            None => AttributeNode::Branch(snap.dictionaries.iter().map(Into::into).collect()),
        };
        AttributeDictionary {
            name: snap.name.clone(),
            node,
        }
    }
}

impl From<&AttributeDictionary> for DictionarySnapshot {
    fn from(dict: &AttributeDictionary) -> Self {
        match &dict.node {
            AttributeNode::Leaf { value, hidden } => DictionarySnapshot {
                name: dict.name.clone(),
                value: Some(value.clone()),
                hidden: *hidden,
                dictionaries: Vec::new(),
            },
            AttributeNode::Branch(children) => DictionarySnapshot {
                name: dict.name.clone(),
                value: None,
                hidden: false,
                dictionaries: children.iter().map(Into::into).collect(),
            },
        }
    }
}

fn to_points(coords: &[[f64; 3]]) -> Vec<Point3<f64>> {
    coords.iter().map(|c| Point3::new(c[0], c[1], c[2])).collect()
}

fn to_coords(points: &[Point3<f64>]) -> Vec<[f64; 3]> {
    points.iter().map(|p| [p.x, p.y, p.z]).collect()
}

impl Scene {
    /// Serializes the scene to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = self.to_snapshot();
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserializes a scene from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: SceneSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    /// Creates a serializable snapshot of the scene.
    ///
    /// Slot-map keys are mapped to sequential definition ids for portability.
    pub fn to_snapshot(&self) -> SceneSnapshot {
        let definition_ids: FxHashMap<DefinitionKey, usize> = self
            .definitions
            .keys()
            .enumerate()
            .map(|(i, k)| (k, i))
            .collect();

        let definitions = self
            .definitions
            .iter()
            .map(|(k, d)| DefinitionSnapshot {
                id: definition_ids[&k],
                name: d.name.clone(),
                attributes: AttributesSnapshot {
                    schema_types: d
                        .attributes
                        .schema_types
                        .iter()
                        .map(|(ns, ty)| (ns.clone(), ty.clone()))
                        .collect(),
                    dictionaries: d.attributes.dictionaries.iter().map(Into::into).collect(),
                },
                entities: self.entity_snapshots(&d.entities, &definition_ids),
            })
            .collect();

        SceneSnapshot {
            model_path: self.model_path.clone(),
            definitions,
            entities: self.entity_snapshots(&self.root, &definition_ids),
        }
    }

    fn entity_snapshots(
        &self,
        keys: &[crate::keys::EntityKey],
        definition_ids: &FxHashMap<DefinitionKey, usize>,
    ) -> Vec<EntitySnapshot> {
        keys.iter()
            .filter_map(|&k| self.entities.get(k))
            .map(|entity| match entity {
                Entity::Instance(inst) => EntitySnapshot::Instance {
                    definition: definition_ids[&inst.definition],
                    transform: (!inst.transform.is_identity())
                        .then(|| inst.transform.to_column_major().to_vec()),
                    volume: inst.volume,
                },
                Entity::Face(face) => EntitySnapshot::Face {
                    outer: to_coords(&face.outer),
                    holes: face.holes.iter().map(|h| to_coords(h)).collect(),
                },
                Entity::Other(name) => EntitySnapshot::Other { name: name.clone() },
            })
            .collect()
    }

    /// Reconstructs a scene from a snapshot.
    pub fn from_snapshot(snap: &SceneSnapshot) -> Result<Self> {
        let mut scene = Scene::new();
        scene.model_path = snap.model_path.clone();

        // Definitions first, so instances can reference any of them.
        let mut definition_keys: FxHashMap<usize, DefinitionKey> = FxHashMap::default();
        for ds in &snap.definitions {
            let attributes = AttributeStorage {
                schema_types: ds
                    .attributes
                    .schema_types
                    .iter()
                    .map(|(ns, ty)| (ns.clone(), ty.clone()))
                    .collect(),
                dictionaries: ds.attributes.dictionaries.iter().map(Into::into).collect(),
            };
            let key = scene.add_definition(Definition::with_attributes(ds.name.clone(), attributes));
            if definition_keys.insert(ds.id, key).is_some() {
                return Err(Error::DuplicateDefinitionId(ds.id));
            }
        }

        for ds in &snap.definitions {
            let parent = definition_keys[&ds.id];
            for es in &ds.entities {
                scene.add_snapshot_entity(Some(parent), es, &definition_keys)?;
            }
        }

        for es in &snap.entities {
            scene.add_snapshot_entity(None, es, &definition_keys)?;
        }

        Ok(scene)
    }

    fn add_snapshot_entity(
        &mut self,
        parent: Option<DefinitionKey>,
        snap: &EntitySnapshot,
        definition_keys: &FxHashMap<usize, DefinitionKey>,
    ) -> Result<()> {
        let entity = match snap {
            EntitySnapshot::Instance {
                definition,
                transform,
                volume,
            } => {
                let definition = *definition_keys
                    .get(definition)
                    .ok_or(Error::UnknownDefinitionId(*definition))?;
                let transform = match transform {
                    Some(values) => Transformation::from_column_major(values)?,
                    None => Transformation::identity(),
                };
                Entity::Instance(Instance {
                    definition,
                    transform,
                    volume: *volume,
                })
            }
            EntitySnapshot::Face { outer, holes } => Entity::Face(Face::with_holes(
                to_points(outer),
                holes.iter().map(|h| to_points(h)).collect(),
            )),
            EntitySnapshot::Other { name } => Entity::Other(name.clone()),
        };
        self.add_entity(parent, entity)?;
        Ok(())
    }
}
