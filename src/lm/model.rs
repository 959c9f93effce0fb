//! Logical model (LM) types
//!
//! A parsed LM document is immutable: the parser builds every declaration in
//! one pass and hands out a [`LogicalModel`] that is only ever read afterwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reserved target-path markers that address record metadata instead of a
/// schema attribute.
pub const PARENT_MARKER: &str = "$PARENT";
pub const STRUCT_ATTR_MARKER: &str = "$STRUCTATTR";
pub const CLASS_MARKER: &str = "$CLASS";
pub const IDENT_MARKER: &str = "$IDENT";

/// Literal sentinel that bypasses value-map resolution in both directions.
pub const PASS_THROUGH_SENTINEL: &str = "@";

/// Bidirectional lookup between integer codes and qualified path strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueMap {
    pub name: String,
    pub entries: IndexMap<i64, String>,
}

impl ValueMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Add a code, chaining. A repeated code replaces the earlier entry.
    pub fn with_entry(mut self, code: i64, path: impl Into<String>) -> Self {
        self.entries.insert(code, path.into());
        self
    }

    pub fn get(&self, code: i64) -> Option<&str> {
        self.entries.get(&code).map(String::as_str)
    }

    /// All codes whose mapped path equals `value`
    pub fn codes_for(&self, value: &str) -> Vec<i64> {
        self.entries
            .iter()
            .filter(|(_, path)| path.as_str() == value)
            .map(|(code, _)| *code)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Data flow direction declared for a mapping block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingDirection {
    /// `<->`
    #[default]
    Bidirectional,
    /// `<-`
    InputOnly,
    /// `->`
    OutputOnly,
}

impl MappingDirection {
    pub fn from_arrow(token: &str) -> Option<Self> {
        match token {
            "<->" => Some(Self::Bidirectional),
            "<-" => Some(Self::InputOnly),
            "->" => Some(Self::OutputOnly),
            _ => None,
        }
    }
}

impl std::fmt::Display for MappingDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingDirection::Bidirectional => write!(f, "BIDIRECTIONAL"),
            MappingDirection::InputOnly => write!(f, "INPUT_ONLY"),
            MappingDirection::OutputOnly => write!(f, "OUTPUT_ONLY"),
        }
    }
}

/// One `COLUMN col -> path[, map]` clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source_column: String,
    pub target_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_map: Option<String>,
}

impl ColumnMapping {
    pub fn new(source_column: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            source_column: source_column.into(),
            target_path: target_path.into(),
            value_map: None,
        }
    }

    pub fn with_value_map(mut self, name: impl Into<String>) -> Self {
        self.value_map = Some(name.into());
        self
    }

    /// Whether the target path addresses record metadata (`$PARENT`, ...)
    pub fn is_synthetic(&self) -> bool {
        self.target_path.starts_with('$')
    }

    /// Last dot-separated segment of the target path
    pub fn attribute_name(&self) -> &str {
        self.target_path
            .rsplit_once('.')
            .map(|(_, attr)| attr)
            .unwrap_or(&self.target_path)
    }
}

/// `CONVERSION map(col -- alias)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionCall {
    pub value_map: String,
    pub source_column: String,
    pub target_alias: String,
}

/// `ALIAS name ~ Qualified.Class`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDeclaration {
    pub alias: String,
    pub class_name: String,
}

/// `WITH alias { COLUMN ...; }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithBlock {
    pub alias: String,
    pub columns: Vec<ColumnMapping>,
}

/// `JOIN type source ON left = right`. Parsed, not executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinDeclaration {
    pub join_type: String,
    pub source: String,
    pub left_column: String,
    pub right_column: String,
}

/// `NESTING child BY column`. Parsed, not executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestingDeclaration {
    pub child: String,
    pub by_column: String,
}

/// `DATA name FROM object CLASS Qualified.Class { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataDeclaration {
    pub name: String,
    pub source_object: String,
    pub class_name: String,
    pub direction: MappingDirection,
    pub ident_column: Option<String>,
    /// Equality filter, column -> literal
    pub filter: IndexMap<String, String>,
    pub conversions: Vec<ConversionCall>,
    pub aliases: Vec<AliasDeclaration>,
    pub with_blocks: Vec<WithBlock>,
    pub annexe_targets: Vec<String>,
    pub annexed_sources: Vec<String>,
    pub joins: Vec<JoinDeclaration>,
    pub nestings: Vec<NestingDeclaration>,
    pub columns: Vec<ColumnMapping>,
}

impl DataDeclaration {
    pub fn new(
        name: impl Into<String>,
        source_object: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_object: source_object.into(),
            class_name: class_name.into(),
            ..Default::default()
        }
    }
}

/// `INSPECTION name FROM object CLASS Qualified.Class { ... }`
///
/// Rows of one physical object may stand for several schema classes or
/// structural roles; the per-row choice comes from `CLASSCOL` / `STRUCTATTR`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InspectionDeclaration {
    pub name: String,
    pub source_object: String,
    pub class_name: String,
    pub direction: MappingDirection,
    pub ident_column: Option<String>,
    pub parent_column: Option<String>,
    pub struct_attr_column: Option<String>,
    pub struct_attr_map: Option<String>,
    pub class_column: Option<String>,
    pub class_map: Option<String>,
    pub conversions: Vec<ConversionCall>,
    pub aliases: Vec<AliasDeclaration>,
    pub with_blocks: Vec<WithBlock>,
    pub columns: Vec<ColumnMapping>,
}

impl InspectionDeclaration {
    pub fn new(
        name: impl Into<String>,
        source_object: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_object: source_object.into(),
            class_name: class_name.into(),
            ..Default::default()
        }
    }
}

/// A parsed LM document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogicalModel {
    pub name: String,
    pub value_maps: IndexMap<String, ValueMap>,
    pub data_declarations: Vec<DataDeclaration>,
    pub inspections: Vec<InspectionDeclaration>,
}

impl LogicalModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn value_map(&self, name: &str) -> Option<&ValueMap> {
        self.value_maps.get(name)
    }

    pub fn has_value_map(&self, name: &str) -> bool {
        self.value_maps.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_name_takes_last_segment() {
        let mapping = ColumnMapping::new("NAME", "Ns.Person.Name");
        assert_eq!(mapping.attribute_name(), "Name");

        let mapping = ColumnMapping::new("NAME", "Name");
        assert_eq!(mapping.attribute_name(), "Name");
    }

    #[test]
    fn test_synthetic_markers() {
        assert!(ColumnMapping::new("P", PARENT_MARKER).is_synthetic());
        assert!(ColumnMapping::new("C", CLASS_MARKER).is_synthetic());
        assert!(!ColumnMapping::new("N", "Name").is_synthetic());
    }

    #[test]
    fn test_value_map_codes_for() {
        let vm = ValueMap::new("VM")
            .with_entry(1, "Active")
            .with_entry(2, "Inactive")
            .with_entry(3, "Active");
        assert_eq!(vm.codes_for("Active"), vec![1, 3]);
        assert_eq!(vm.codes_for("Inactive"), vec![2]);
        assert!(vm.codes_for("Gone").is_empty());
        assert_eq!(vm.get(2), Some("Inactive"));
    }

    #[test]
    fn test_direction_display_and_arrow() {
        assert_eq!(MappingDirection::default(), MappingDirection::Bidirectional);
        assert_eq!(MappingDirection::from_arrow("<-"), Some(MappingDirection::InputOnly));
        assert_eq!(MappingDirection::from_arrow("->"), Some(MappingDirection::OutputOnly));
        assert_eq!(MappingDirection::from_arrow("=>"), None);
        assert_eq!(MappingDirection::OutputOnly.to_string(), "OUTPUT_ONLY");
    }
}
