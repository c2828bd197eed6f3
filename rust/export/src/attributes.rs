// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute resolution
//!
//! Flattens a definition's nested schema dictionaries into a simple
//! `name → value` map and works out the exported entity type.
//!
//! Each property dictionary is followed down a single path: a leaf ends the
//! search, otherwise the first child that is not the skipped dictionary is
//! taken. A branch with nowhere to go resolves to nothing and the property is
//! left out. Resolution is a pure read of the storage.

use ifcjson_scene::{AttributeDictionary, AttributeNode, AttributeStorage, AttributeValue};
use serde_json::{Map, Number, Value};

use crate::config::ExportConfig;

/// Field names owned by the record itself; attributes may not shadow them.
pub const RESERVED_FIELDS: [&str; 5] = [
    "type",
    "globalId",
    "volume",
    "isDecomposedBy",
    "representations",
];

/// Flattened attributes of one definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedAttributes {
    /// Normalized type name, `None` when no schema type is applied.
    pub entity_type: Option<String>,
    /// Raw value of the seed property (the definition's own identifier).
    pub seed: Option<String>,
    /// Remaining fields, keyed by normalized name, in stored order.
    pub fields: Map<String, Value>,
}

impl ResolvedAttributes {
    /// Returns `true` if a schema type was recognized.
    pub fn is_typed(&self) -> bool {
        self.entity_type.is_some()
    }
}

/// Resolves attribute storage according to an [`ExportConfig`].
#[derive(Debug, Clone, Copy)]
pub struct AttributeResolver<'a> {
    config: &'a ExportConfig,
}

impl<'a> AttributeResolver<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    /// Flattens `storage`.
    pub fn resolve(&self, storage: &AttributeStorage) -> ResolvedAttributes {
        let namespace = &self.config.schema_namespace;
        let mut resolved = ResolvedAttributes {
            entity_type: storage.schema_type(namespace).map(|t| self.normalize_type(t)),
            ..ResolvedAttributes::default()
        };

        let Some(properties) = storage.dictionary(namespace) else {
            return resolved;
        };

        for property in properties.children() {
            let Some(value) = resolve_leaf(property, &self.config.skipped_dictionary)
                .and_then(exportable_value)
            else {
                continue;
            };

            if property.name == self.config.seed_attribute {
                resolved.seed = Some(match value {
                    AttributeValue::String(s) => s.clone(),
                    other => to_json_value(other).to_string(),
                });
                continue;
            }

            let name = normalize_field_name(&property.name);
            if RESERVED_FIELDS.contains(&name.as_str()) {
                tracing::debug!(field = %name, "Dropping attribute that shadows a record field");
                continue;
            }
            resolved.fields.insert(name, to_json_value(value));
        }

        resolved
    }

    /// Collapses deprecated aliases, then strips the configured prefix.
    pub fn normalize_type(&self, raw: &str) -> String {
        let canonical = self
            .config
            .type_aliases
            .iter()
            .find(|(from, _)| from == raw)
            .map(|(_, to)| to.as_str())
            .unwrap_or(raw);

        canonical
            .strip_prefix(self.config.type_prefix.as_str())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(canonical)
            .to_string()
    }
}

/// Finds the leaf dictionary for a property by first-match descent.
///
/// Returns `None` when a branch has no eligible child.
pub fn resolve_leaf<'d>(dict: &'d AttributeDictionary, skipped: &str) -> Option<&'d AttributeNode> {
    match &dict.node {
        AttributeNode::Leaf { .. } => Some(&dict.node),
        AttributeNode::Branch(children) => children
            .iter()
            .find(|child| child.name != skipped)
            .and_then(|child| resolve_leaf(child, skipped)),
    }
}

/// A leaf contributes only a present, visible, non-empty value.
fn exportable_value(node: &AttributeNode) -> Option<&AttributeValue> {
    match node {
        AttributeNode::Leaf {
            value: Some(value),
            hidden: false,
        } if !value.is_empty_string() => Some(value),
        _ => None,
    }
}

/// Lowercases the first character, leaving the rest unchanged.
pub fn normalize_field_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts an attribute value to JSON. Non-finite doubles become `null`.
pub fn to_json_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Int(i) => Value::Number((*i).into()),
        AttributeValue::Double(d) => Number::from_f64(*d).map(Value::Number).unwrap_or(Value::Null),
        AttributeValue::String(s) => Value::String(s.clone()),
        AttributeValue::List(items) => Value::Array(items.iter().map(to_json_value).collect()),
    }
}
