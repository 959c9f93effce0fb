//! Semantic checks of an LM against the canonical schema
//!
//! Every declaration is checked and all findings are collected. A declaration
//! naming an unknown class reports only that.

use crate::lm::{ColumnMapping, ConversionCall, LogicalModel, WithBlock};
use crate::schema::CanonicalSchema;

/// LM semantic checker
pub struct SemanticChecker;

impl SemanticChecker {
    /// Check `lm` against `schema`, returning human-readable errors in
    /// declaration order
    pub fn check(lm: &LogicalModel, schema: &CanonicalSchema) -> Vec<String> {
        let mut errors = Vec::new();

        for decl in &lm.data_declarations {
            if !schema.has_class(&decl.class_name) {
                errors.push(format!("Unknown class: {}", decl.class_name));
                continue;
            }
            check_block(
                &mut errors,
                lm,
                schema,
                &decl.class_name,
                &decl.columns,
                &decl.with_blocks,
            );
            check_conversions(&mut errors, lm, &decl.conversions, "DATA", &decl.name);
        }

        for decl in &lm.inspections {
            if !schema.has_class(&decl.class_name) {
                errors.push(format!("Unknown inspection class: {}", decl.class_name));
                continue;
            }
            check_block(
                &mut errors,
                lm,
                schema,
                &decl.class_name,
                &decl.columns,
                &decl.with_blocks,
            );
            check_conversions(&mut errors, lm, &decl.conversions, "INSPECTION", &decl.name);
        }

        errors
    }

    /// Attribute lookup on the class itself or on any class declaring it as
    /// direct superclass. Deeper ancestry is not searched.
    pub fn attribute_exists(schema: &CanonicalSchema, class_name: &str, attribute: &str) -> bool {
        schema.has_attribute(class_name, attribute)
            || schema
                .subclasses_of(class_name)
                .any(|sub| sub.attributes.contains_key(attribute))
    }
}

fn check_block(
    errors: &mut Vec<String>,
    lm: &LogicalModel,
    schema: &CanonicalSchema,
    class_name: &str,
    columns: &[ColumnMapping],
    with_blocks: &[WithBlock],
) {
    let nested = with_blocks.iter().flat_map(|w| w.columns.iter());
    for mapping in columns.iter().chain(nested) {
        if mapping.is_synthetic() {
            continue;
        }
        let attribute = mapping.attribute_name();
        if !SemanticChecker::attribute_exists(schema, class_name, attribute) {
            errors.push(format!("Unknown attribute {attribute} on {class_name}"));
            continue;
        }
        if let Some(map) = &mapping.value_map
            && !lm.has_value_map(map)
        {
            errors.push(format!("Unknown VALUEMAP {map} for {class_name}.{attribute}"));
        }
    }
}

fn check_conversions(
    errors: &mut Vec<String>,
    lm: &LogicalModel,
    conversions: &[ConversionCall],
    kind: &str,
    decl_name: &str,
) {
    for call in conversions {
        if !lm.has_value_map(&call.value_map) {
            errors.push(format!(
                "Unknown conversion map {} in {kind} {decl_name}",
                call.value_map
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lm::LmParser;
    use crate::schema::{AttributeInfo, ClassInfo};
    use pretty_assertions::assert_eq;

    fn schema() -> CanonicalSchema {
        CanonicalSchema::new()
            .with_class(
                ClassInfo::new("Ns.Base").with_attribute(AttributeInfo::new("Name", "TEXT")),
            )
            .with_class(
                ClassInfo::new("Ns.Person")
                    .with_super_class("Ns.Base")
                    .with_attribute(AttributeInfo::new("State", "ENUM")),
            )
            .with_class(
                ClassInfo::new("Ns.Member")
                    .with_super_class("Ns.Person")
                    .with_attribute(AttributeInfo::new("Since", "DATE")),
            )
    }

    fn check(source: &str) -> Vec<String> {
        let lm = LmParser::parse_str("T", source).unwrap();
        SemanticChecker::check(&lm, &schema())
    }

    #[test]
    fn test_valid_model_has_no_errors() {
        let errors = check(
            "VALUEMAP VM { 1 -> A; }\n\
             DATA P FROM T CLASS Ns.Person { IDENT ID; COLUMN S -> State, VM; COLUMN X -> $PARENT; \
             CONVERSION VM(S -- st); }",
        );
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_unknown_classes_stop_that_declaration() {
        let errors = check(
            "DATA P FROM T CLASS Ns.Nope { COLUMN A -> Bogus; }\n\
             INSPECTION I FROM T CLASS Ns.Gone { IDENT ID; COLUMN A -> Bogus; }",
        );
        assert_eq!(
            errors,
            vec!["Unknown class: Ns.Nope", "Unknown inspection class: Ns.Gone"]
        );
    }

    #[test]
    fn test_attribute_lookup_goes_one_level_down_only() {
        // Since lives on Ns.Member, a direct subclass of Ns.Person
        assert!(check("DATA P FROM T CLASS Ns.Person { COLUMN A -> Since; }").is_empty());
        // but Ns.Member is two levels below Ns.Base
        assert_eq!(
            check("DATA P FROM T CLASS Ns.Base { COLUMN A -> Since; }"),
            vec!["Unknown attribute Since on Ns.Base"]
        );
        // and superclass attributes are not inherited downward
        assert_eq!(
            check("DATA P FROM T CLASS Ns.Member { COLUMN A -> Name; }"),
            vec!["Unknown attribute Name on Ns.Member"]
        );
    }

    #[test]
    fn test_qualified_target_path_uses_last_segment() {
        assert!(check("DATA P FROM T CLASS Ns.Person { COLUMN S -> Ns.Person.State; }").is_empty());
    }

    #[test]
    fn test_errors_accumulate_across_blocks() {
        let errors = check(
            "DATA P FROM T CLASS Ns.Person { \
               COLUMN A -> Missing; \
               COLUMN S -> State, NOVM; \
               WITH w { COLUMN B -> AlsoMissing; } \
               CONVERSION NOCONV(S -- x); }\n\
             INSPECTION I FROM T CLASS Ns.Person { IDENT ID; CONVERSION GONE(S -- y); }",
        );
        assert_eq!(
            errors,
            vec![
                "Unknown attribute Missing on Ns.Person",
                "Unknown VALUEMAP NOVM for Ns.Person.State",
                "Unknown attribute AlsoMissing on Ns.Person",
                "Unknown conversion map NOCONV in DATA P",
                "Unknown conversion map GONE in INSPECTION I",
            ]
        );
    }
}
