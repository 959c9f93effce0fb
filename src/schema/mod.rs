//! Canonical schema (KM) consumed by the checker and the result validator
//!
//! The schema is produced by an external compiler; this crate only reads it.
//! It can be built programmatically or loaded from a JSON or YAML document:
//!
//! ```json
//! {
//!   "classes": {
//!     "Ns.Person": {
//!       "structure": false,
//!       "superClass": null,
//!       "attributes": {
//!         "Name": { "typeKind": "TEXT", "mandatory": true }
//!       }
//!     }
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error loading a canonical schema document
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read schema file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON schema document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML schema document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported schema file extension: {0}")]
    UnsupportedFormat(String),
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// One attribute of a schema class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeInfo {
    /// Filled from the map key when loaded from a document
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub type_kind: String,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl AttributeInfo {
    pub fn new(name: impl Into<String>, type_kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_kind: type_kind.into(),
            mandatory: false,
            reference_target: None,
            enum_values: Vec::new(),
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn with_reference(mut self, target: impl Into<String>) -> Self {
        self.reference_target = Some(target.into());
        self
    }

    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// One schema class (or structure)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub structure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_class: Option<String>,
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            structure: false,
            super_class: None,
            attributes: IndexMap::new(),
        }
    }

    pub fn structure(mut self) -> Self {
        self.structure = true;
        self
    }

    pub fn with_super_class(mut self, name: impl Into<String>) -> Self {
        self.super_class = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeInfo) -> Self {
        self.attributes.insert(attribute.name.clone(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.get(name)
    }

    pub fn mandatory_attributes(&self) -> impl Iterator<Item = &AttributeInfo> {
        self.attributes.values().filter(|a| a.mandatory)
    }
}

/// Read-only view of the compiled domain model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSchema {
    #[serde(default)]
    pub classes: IndexMap<String, ClassInfo>,
}

impl CanonicalSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class, chaining. The class is keyed by its qualified name.
    pub fn with_class(mut self, class: ClassInfo) -> Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn has_attribute(&self, class_name: &str, attribute: &str) -> bool {
        self.attribute(class_name, attribute).is_some()
    }

    pub fn attribute(&self, class_name: &str, attribute: &str) -> Option<&AttributeInfo> {
        self.classes.get(class_name)?.attributes.get(attribute)
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Classes whose single superclass is `class_name` (direct children only)
    pub fn subclasses_of<'a>(&'a self, class_name: &'a str) -> impl Iterator<Item = &'a ClassInfo> {
        self.classes
            .values()
            .filter(move |c| c.super_class.as_deref() == Some(class_name))
    }

    pub fn from_json_str(text: &str) -> SchemaResult<Self> {
        let schema: Self = serde_json::from_str(text)?;
        Ok(schema.with_names_from_keys())
    }

    pub fn from_yaml_str(text: &str) -> SchemaResult<Self> {
        let schema: Self = serde_yaml::from_str(text)?;
        Ok(schema.with_names_from_keys())
    }

    /// Load from `.json`, `.yaml` or `.yml`
    pub fn from_path(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let schema = match extension.as_str() {
            "json" => Self::from_json_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            other => return Err(SchemaError::UnsupportedFormat(other.to_string())),
        };
        debug!(path = %path.display(), classes = schema.classes.len(), "Loaded canonical schema");
        Ok(schema)
    }

    /// Documents key classes and attributes by name; copy the keys into the
    /// `name` fields so lookups and messages agree.
    fn with_names_from_keys(mut self) -> Self {
        for (class_name, class) in self.classes.iter_mut() {
            class.name = class_name.clone();
            for (attr_name, attr) in class.attributes.iter_mut() {
                attr.name = attr_name.clone();
            }
        }
        self
    }
}
