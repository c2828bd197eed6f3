// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export configuration, with optional overrides from environment variables.

/// Document header values written verbatim into the ifcJSON output.
#[derive(Debug, Clone)]
pub struct HeaderConfig {
    /// Document `type` field.
    pub document_type: String,
    /// Target schema name (e.g. `IFC2X3`).
    pub schema: String,
    /// Free-form description (view definition).
    pub description: String,
    /// Fixed time stamp. `None` stamps the document with the current UTC time.
    pub time_stamp: Option<String>,
    /// Name and version of the exporter.
    pub preprocessor_version: String,
    /// Name of the modeling tool the scene came from.
    pub originating_system: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            document_type: "ifcJSON".into(),
            schema: "IFC2X3".into(),
            description: "ViewDefinition [CoordinationView]".into(),
            time_stamp: None,
            preprocessor_version: concat!("ifcjson-export ", env!("CARGO_PKG_VERSION")).into(),
            originating_system: "ifcjson-export".into(),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Schema namespace under which types and property dictionaries are stored.
    pub schema_namespace: String,
    /// Prefix stripped from type names (`IfcWall` → `Wall`).
    pub type_prefix: String,
    /// Deprecated type names collapsed onto their canonical type before stripping.
    pub type_aliases: Vec<(String, String)>,
    /// Dictionary name never descended into while resolving a property value.
    pub skipped_dictionary: String,
    /// Property holding the definition's own identifier, used as identifier seed.
    pub seed_attribute: String,
    /// Header values.
    pub header: HeaderConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            schema_namespace: "IFC 2x3".into(),
            type_prefix: "Ifc".into(),
            type_aliases: vec![("IfcWallStandardCase".into(), "IfcWall".into())],
            skipped_dictionary: "instanceAttributes".into(),
            seed_attribute: "GlobalId".into(),
            header: HeaderConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// `IFCJSON_TYPE_ALIASES` takes comma-separated `Deprecated=Canonical` pairs.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let header = defaults.header;

        Self {
            schema_namespace: lookup("IFCJSON_SCHEMA_NAMESPACE").unwrap_or(defaults.schema_namespace),
            type_prefix: lookup("IFCJSON_TYPE_PREFIX").unwrap_or(defaults.type_prefix),
            type_aliases: lookup("IFCJSON_TYPE_ALIASES")
                .map(|s| parse_aliases(&s))
                .unwrap_or(defaults.type_aliases),
            skipped_dictionary: defaults.skipped_dictionary,
            seed_attribute: defaults.seed_attribute,
            header: HeaderConfig {
                document_type: header.document_type,
                schema: lookup("IFCJSON_SCHEMA").unwrap_or(header.schema),
                description: lookup("IFCJSON_DESCRIPTION").unwrap_or(header.description),
                time_stamp: lookup("IFCJSON_TIMESTAMP").or(header.time_stamp),
                preprocessor_version: header.preprocessor_version,
                originating_system: lookup("IFCJSON_ORIGINATING_SYSTEM")
                    .unwrap_or(header.originating_system),
            },
        }
    }
}

fn parse_aliases(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (from, to) = pair.split_once('=')?;
            let (from, to) = (from.trim(), to.trim());
            (!from.is_empty() && !to.is_empty()).then(|| (from.to_string(), to.to_string()))
        })
        .collect()
}
