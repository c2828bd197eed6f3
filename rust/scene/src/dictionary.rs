// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed, nested attribute dictionaries attached to component definitions.
//!
//! The host stores schema data as dictionaries nested to arbitrary depth, for
//! example `IFC 2x3 / Name / IfcLabel / value`. A dictionary either holds a
//! value (a leaf) or an ordered list of named sub-dictionaries (a branch).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A typed value stored in a leaf dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// `true` for the empty string, which the host uses for "unset".
    pub fn is_empty_string(&self) -> bool {
        matches!(self, AttributeValue::String(s) if s.is_empty())
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Double(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

/// Content of a dictionary: a value-bearing leaf or an ordered branch.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeNode {
    /// A dictionary that exposes a `value` field. The value itself may be
    /// absent (the key exists but holds nothing).
    Leaf {
        value: Option<AttributeValue>,
        hidden: bool,
    },
    /// A dictionary without a value; children keep their stored order.
    Branch(Vec<AttributeDictionary>),
}

/// A named attribute dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDictionary {
    pub name: String,
    pub node: AttributeNode,
}

impl AttributeDictionary {
    /// Creates a visible leaf holding `value`.
    pub fn leaf(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            node: AttributeNode::Leaf {
                value: Some(value.into()),
                hidden: false,
            },
        }
    }

    /// Creates a leaf that the host marks as hidden from the user.
    pub fn hidden_leaf(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            node: AttributeNode::Leaf {
                value: Some(value.into()),
                hidden: true,
            },
        }
    }

    /// Creates a leaf whose `value` key exists but is unset.
    pub fn unset_leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node: AttributeNode::Leaf {
                value: None,
                hidden: false,
            },
        }
    }

    /// Creates a branch with the given ordered children.
    pub fn branch(name: impl Into<String>, children: Vec<AttributeDictionary>) -> Self {
        Self {
            name: name.into(),
            node: AttributeNode::Branch(children),
        }
    }

    /// Returns `true` if this dictionary exposes a `value` field.
    pub fn is_leaf(&self) -> bool {
        matches!(self.node, AttributeNode::Leaf { .. })
    }

    /// Returns the ordered sub-dictionaries (empty for leaves).
    pub fn children(&self) -> &[AttributeDictionary] {
        match &self.node {
            AttributeNode::Branch(children) => children,
            AttributeNode::Leaf { .. } => &[],
        }
    }

    /// Returns the direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&AttributeDictionary> {
        self.children().iter().find(|d| d.name == name)
    }
}

/// All attribute data attached to one definition.
///
/// `schema_types` mirrors the host's `AppliedSchemaTypes` dictionary: it maps a
/// schema namespace (e.g. `"IFC 2x3"`) to the type name applied to the
/// definition in that schema (e.g. `"IfcWall"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStorage {
    pub schema_types: FxHashMap<String, String>,
    pub dictionaries: Vec<AttributeDictionary>,
}

impl AttributeStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the type name applied under `namespace`, if any.
    pub fn schema_type(&self, namespace: &str) -> Option<&str> {
        self.schema_types.get(namespace).map(String::as_str)
    }

    /// Applies a schema type under `namespace`, replacing any existing one.
    pub fn set_schema_type(&mut self, namespace: impl Into<String>, type_name: impl Into<String>) {
        self.schema_types.insert(namespace.into(), type_name.into());
    }

    /// Returns the top-level dictionary with the given name.
    pub fn dictionary(&self, name: &str) -> Option<&AttributeDictionary> {
        self.dictionaries.iter().find(|d| d.name == name)
    }

    /// Appends a top-level dictionary.
    pub fn push_dictionary(&mut self, dict: AttributeDictionary) {
        self.dictionaries.push(dict);
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.schema_types.is_empty() && self.dictionaries.is_empty()
    }
}
