//! Post-run check of canonical records against schema constraints

use tracing::debug;

use crate::runtime::CanonicalRecord;
use crate::schema::CanonicalSchema;

pub struct ResultValidator;

impl ResultValidator {
    /// Unknown classes and blank mandatory attributes, in record order
    pub fn validate(schema: &CanonicalSchema, records: &[CanonicalRecord]) -> Vec<String> {
        let mut errors = Vec::new();
        for record in records {
            let Some(class) = schema.class(&record.class_name) else {
                errors.push(format!("Result contains unknown class {}", record.class_name));
                continue;
            };
            for attribute in class.mandatory_attributes() {
                let populated = attribute_value(record, &attribute.name)
                    .is_some_and(|value| !value.trim().is_empty());
                if !populated {
                    errors.push(format!(
                        "Mandatory attribute {}.{} is empty for ident {}",
                        record.class_name, attribute.name, record.ident
                    ));
                }
            }
        }
        debug!(records = records.len(), errors = errors.len(), "Validated result records");
        errors
    }
}

/// Value stored under the attribute name, or under a qualified path ending in it
fn attribute_value<'a>(record: &'a CanonicalRecord, attribute: &str) -> Option<&'a str> {
    record.values.get(attribute).map(String::as_str).or_else(|| {
        record
            .values
            .iter()
            .find(|(path, _)| {
                path.rsplit_once('.')
                    .is_some_and(|(_, last)| last == attribute)
            })
            .map(|(_, value)| value.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeInfo, ClassInfo};
    use pretty_assertions::assert_eq;

    fn schema() -> CanonicalSchema {
        CanonicalSchema::new().with_class(
            ClassInfo::new("Ns.Person")
                .with_attribute(AttributeInfo::new("Name", "TEXT").mandatory())
                .with_attribute(AttributeInfo::new("Note", "TEXT")),
        )
    }

    #[test]
    fn test_mandatory_and_unknown_class() {
        let records = vec![
            CanonicalRecord::new("Ns.Person", "1").with_value("Name", "Ann"),
            CanonicalRecord::new("Ns.Person", "2").with_value("Name", "   "),
            CanonicalRecord::new("Ns.Person", "3").with_value("Note", "x"),
            CanonicalRecord::new("Ns.Ghost", "4"),
        ];
        assert_eq!(
            ResultValidator::validate(&schema(), &records),
            vec![
                "Mandatory attribute Ns.Person.Name is empty for ident 2",
                "Mandatory attribute Ns.Person.Name is empty for ident 3",
                "Result contains unknown class Ns.Ghost",
            ]
        );
    }

    #[test]
    fn test_qualified_path_satisfies_attribute() {
        let records = vec![CanonicalRecord::new("Ns.Person", "1").with_value("Ns.Person.Name", "Ann")];
        assert!(ResultValidator::validate(&schema(), &records).is_empty());
    }
}
