//! Canonical records produced by the READ phase

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::lm::{CLASS_MARKER, IDENT_MARKER, PARENT_MARKER, STRUCT_ATTR_MARKER};

/// Backend-agnostic record keyed by schema class and target paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub class_name: String,
    pub ident: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struct_attr: Option<String>,
    /// Target path to value. Absent source values have no entry.
    #[serde(default)]
    pub values: IndexMap<String, String>,
}

impl CanonicalRecord {
    pub fn new(class_name: impl Into<String>, ident: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ident: ident.into(),
            parent: None,
            struct_attr: None,
            values: IndexMap::new(),
        }
    }

    pub fn with_value(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(path.into(), value.into());
        self
    }

    /// Value addressed by a target path, resolving `$` markers to metadata
    pub fn field(&self, path: &str) -> Option<&str> {
        match path {
            PARENT_MARKER => self.parent.as_deref(),
            STRUCT_ATTR_MARKER => self.struct_attr.as_deref(),
            CLASS_MARKER => Some(&self.class_name),
            IDENT_MARKER => Some(&self.ident),
            _ => self.values.get(path).map(String::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_resolves_markers() {
        let mut record = CanonicalRecord::new("Ns.Node", "7").with_value("Name", "Root");
        record.parent = Some("1".to_string());

        assert_eq!(record.field("Name"), Some("Root"));
        assert_eq!(record.field("$PARENT"), Some("1"));
        assert_eq!(record.field("$STRUCTATTR"), None);
        assert_eq!(record.field("$CLASS"), Some("Ns.Node"));
        assert_eq!(record.field("$IDENT"), Some("7"));
        assert_eq!(record.field("Other"), None);
    }
}
