//! Value-map resolution in both directions
//!
//! Absent values and the `@` sentinel pass through untouched, as do values of
//! columns without a value map.

use serde_json::Value;

use crate::lm::{LogicalModel, PASS_THROUGH_SENTINEL, ValueMap};

use super::error::{ResolutionError, ResolutionResult};

fn lookup<'a>(model: &'a LogicalModel, name: &str) -> ResolutionResult<&'a ValueMap> {
    model
        .value_map(name)
        .ok_or_else(|| ResolutionError::UnknownValueMap(name.to_string()))
}

/// Source code to canonical path.
///
/// A well-formed code missing from the map resolves to absent.
pub fn forward_resolve(
    model: &LogicalModel,
    map_name: Option<&str>,
    value: Option<&str>,
) -> ResolutionResult<Option<String>> {
    let (Some(map_name), Some(value)) = (map_name, value) else {
        return Ok(value.map(str::to_string));
    };
    if value == PASS_THROUGH_SENTINEL {
        return Ok(Some(value.to_string()));
    }
    let map = lookup(model, map_name)?;
    let code: i64 = value
        .trim()
        .parse()
        .map_err(|_| ResolutionError::InvalidCode {
            map: map_name.to_string(),
            value: value.to_string(),
        })?;
    Ok(map.get(code).map(str::to_string))
}

/// Canonical path back to its unique integer code.
///
/// Returns the cell to write: `Null` for absent, the text itself when passed
/// through, otherwise the code as a number.
pub fn reverse_resolve(
    model: &LogicalModel,
    map_name: Option<&str>,
    value: Option<&str>,
) -> ResolutionResult<Value> {
    let Some(value) = value else {
        return Ok(Value::Null);
    };
    let Some(map_name) = map_name else {
        return Ok(Value::String(value.to_string()));
    };
    if value == PASS_THROUGH_SENTINEL {
        return Ok(Value::String(value.to_string()));
    }
    let map = lookup(model, map_name)?;
    match map.codes_for(value).as_slice() {
        [code] => Ok(Value::from(*code)),
        [] => Err(ResolutionError::UnresolvableValue {
            map: map_name.to_string(),
            value: value.to_string(),
        }),
        codes => Err(ResolutionError::AmbiguousValue {
            map: map_name.to_string(),
            value: value.to_string(),
            codes: codes.to_vec(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LogicalModel {
        let mut lm = LogicalModel::new("LM");
        let vm = ValueMap::new("VM")
            .with_entry(1, "Active")
            .with_entry(2, "Inactive")
            .with_entry(-1, "Ns.Unknown");
        lm.value_maps.insert(vm.name.clone(), vm);
        let dup = ValueMap::new("DUP").with_entry(1, "X").with_entry(2, "X");
        lm.value_maps.insert(dup.name.clone(), dup);
        lm
    }

    #[test]
    fn test_reverse_of_forward_is_identity_for_every_code() {
        let lm = model();
        let vm = lm.value_map("VM").unwrap();
        for code in vm.entries.keys() {
            let forward = forward_resolve(&lm, Some("VM"), Some(&code.to_string())).unwrap();
            let back = reverse_resolve(&lm, Some("VM"), forward.as_deref()).unwrap();
            assert_eq!(back, Value::from(*code), "code {code}");
        }
    }

    #[test]
    fn test_absent_and_sentinel_pass_through_for_any_map() {
        let lm = model();
        for map in [None, Some("VM"), Some("DUP"), Some("NOT_DECLARED")] {
            assert_eq!(forward_resolve(&lm, map, None).unwrap(), None);
            assert_eq!(
                forward_resolve(&lm, map, Some("@")).unwrap(),
                Some("@".to_string())
            );
            assert_eq!(reverse_resolve(&lm, map, None).unwrap(), Value::Null);
            assert_eq!(
                reverse_resolve(&lm, map, Some("@")).unwrap(),
                Value::from("@")
            );
        }
    }

    #[test]
    fn test_without_map_values_pass_through() {
        let lm = model();
        assert_eq!(
            forward_resolve(&lm, None, Some("17")).unwrap(),
            Some("17".to_string())
        );
        assert_eq!(reverse_resolve(&lm, None, Some("Ann")).unwrap(), Value::from("Ann"));
    }

    #[test]
    fn test_forward_errors_and_missing_code() {
        let lm = model();
        assert_eq!(
            forward_resolve(&lm, Some("NOPE"), Some("1")),
            Err(ResolutionError::UnknownValueMap("NOPE".to_string()))
        );
        assert!(matches!(
            forward_resolve(&lm, Some("VM"), Some("one")),
            Err(ResolutionError::InvalidCode { .. })
        ));
        assert_eq!(forward_resolve(&lm, Some("VM"), Some("99")).unwrap(), None);
        assert_eq!(
            forward_resolve(&lm, Some("VM"), Some(" 2")).unwrap(),
            Some("Inactive".to_string())
        );
    }

    #[test]
    fn test_reverse_errors() {
        let lm = model();
        assert_eq!(
            reverse_resolve(&lm, Some("NOPE"), Some("Active")),
            Err(ResolutionError::UnknownValueMap("NOPE".to_string()))
        );
        assert!(matches!(
            reverse_resolve(&lm, Some("VM"), Some("Gone")),
            Err(ResolutionError::UnresolvableValue { .. })
        ));
        assert_eq!(
            reverse_resolve(&lm, Some("DUP"), Some("X")),
            Err(ResolutionError::AmbiguousValue {
                map: "DUP".to_string(),
                value: "X".to_string(),
                codes: vec![1, 2],
            })
        );
    }
}
