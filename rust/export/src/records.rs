// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Records written to the `data` list of an ifcJSON document.

use serde::Serialize;
use serde_json::{Map, Value};

/// Class name of geometry records and of the references pointing at them.
pub const SHAPE_REPRESENTATION: &str = "ShapeRepresentation";

/// Full representation of one typed group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub global_id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub is_decomposed_by: Vec<ChildSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub representations: Vec<RepresentationRef>,
}

impl EntityRecord {
    /// Creates a record without decomposition or representation.
    pub fn new(entity_type: impl Into<String>, global_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            global_id: global_id.into(),
            attributes: Map::new(),
            volume: None,
            is_decomposed_by: Vec::new(),
            representations: Vec::new(),
        }
    }

    /// The `{type, globalId}` reference standing in for this record.
    pub fn summary(&self) -> ChildSummary {
        ChildSummary::new(self.entity_type.clone(), self.global_id.clone())
    }
}

/// Lightweight reference to an [`EntityRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildSummary {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub global_id: String,
}

impl ChildSummary {
    pub fn new(entity_type: impl Into<String>, global_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            global_id: global_id.into(),
        }
    }
}

/// Reference from an entity to one of its geometry records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepresentationRef {
    #[serde(rename = "type")]
    pub ref_type: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

impl RepresentationRef {
    /// A reference to the shape representation with the given id.
    pub fn shape(global_id: impl Into<String>) -> Self {
        Self {
            ref_type: SHAPE_REPRESENTATION.to_string(),
            reference: global_id.into(),
        }
    }
}

/// OBJ mesh payload for one group's direct faces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub global_id: String,
    pub representation_identifier: String,
    pub representation_type: String,
    pub items: Vec<String>,
}

impl GeometryRecord {
    /// A `Body` representation holding one OBJ text item.
    pub fn obj(global_id: impl Into<String>, mesh: impl Into<String>) -> Self {
        Self {
            record_type: SHAPE_REPRESENTATION.to_string(),
            global_id: global_id.into(),
            representation_identifier: "Body".to_string(),
            representation_type: "OBJ".to_string(),
            items: vec![mesh.into()],
        }
    }
}

/// Any record that can appear in the document's `data` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataRecord {
    Entity(EntityRecord),
    Geometry(GeometryRecord),
}

impl DataRecord {
    /// The record's `globalId`.
    pub fn global_id(&self) -> &str {
        match self {
            DataRecord::Entity(e) => &e.global_id,
            DataRecord::Geometry(g) => &g.global_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_record_field_order_and_skips() {
        let mut record = EntityRecord::new("Wall", "0000000000000000000001");
        record.attributes.insert("name".into(), json!("Wall 1"));
        record.volume = Some(1.5);

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(
            text,
            r#"{"type":"Wall","globalId":"0000000000000000000001","name":"Wall 1","volume":1.5}"#
        );
    }

    #[test]
    fn decomposition_and_representation() {
        let mut record = EntityRecord::new("Building", "B");
        record.is_decomposed_by.push(ChildSummary::new("BuildingStorey", "S"));
        record.representations.push(RepresentationRef::shape("G"));

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "type": "Building",
                "globalId": "B",
                "isDecomposedBy": [{ "type": "BuildingStorey", "globalId": "S" }],
                "representations": [{ "type": "ShapeRepresentation", "ref": "G" }]
            })
        );
    }

    #[test]
    fn geometry_record_shape() {
        let record = GeometryRecord::obj("G", "v 0 0 0\n");
        assert_eq!(
            serde_json::to_value(DataRecord::Geometry(record)).unwrap(),
            json!({
                "type": "ShapeRepresentation",
                "globalId": "G",
                "representationIdentifier": "Body",
                "representationType": "OBJ",
                "items": ["v 0 0 0\n"]
            })
        );
    }

    #[test]
    fn summary_of_record() {
        let record = EntityRecord::new("Door", "D");
        assert_eq!(record.summary(), ChildSummary::new("Door", "D"));
        assert_eq!(DataRecord::Entity(record).global_id(), "D");
    }
}
