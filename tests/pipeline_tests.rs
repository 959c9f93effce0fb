//! File-based pipeline tests: schema and LM documents on disk, CSV in and out

use std::fs;
use std::path::Path;

use convconf::{
    CanonicalSchema, ConvConfService, ConversionConfig, CsvDirectoryBackend, LmParser,
    ServiceError,
};

const SCHEMA: &str = r#"{
  "classes": {
    "Shop.Customer": {
      "attributes": {
        "Name": { "typeKind": "TEXT", "mandatory": true },
        "Tier": { "typeKind": "ENUM", "enumValues": ["Shop.Tier.Gold", "Shop.Tier.Basic"] }
      }
    }
  }
}"#;

const SOURCE_LM: &str = r#"LM LegacyShop;
!! codes used by the legacy system
VALUEMAP TIER { 1 -> Shop.Tier.Gold; 2 -> Shop.Tier.Basic; }
DATA Customers FROM KUNDE CLASS Shop.Customer {
  DIRECTION <-;
  IDENT KNR;
  WHERE AKTIV = "J";
  COLUMN NAME -> Name;
  COLUMN STUFE -> Tier, TIER;
}
"#;

const TARGET_LM: &str = r#"LM NewShop;
VALUEMAP TIER { 10 -> Shop.Tier.Gold; 20 -> Shop.Tier.Basic; }
DATA Customers FROM customer CLASS Shop.Customer {
  DIRECTION ->;
  IDENT id;
  COLUMN full_name -> Name;
  COLUMN tier_code -> Tier, TIER;
}
"#;

fn write_inputs(dir: &Path, customers: &str) {
    fs::write(dir.join("km.json"), SCHEMA).unwrap();
    fs::write(dir.join("source.lm"), SOURCE_LM).unwrap();
    fs::write(dir.join("target.lm"), TARGET_LM).unwrap();
    fs::create_dir_all(dir.join("in")).unwrap();
    fs::write(dir.join("in/KUNDE.csv"), customers).unwrap();
}

mod csv_pipeline_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_csv_to_csv_with_recoding_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(
            dir.path(),
            "KNR,NAME,STUFE,AKTIV\n100,Ann,1,J\n101,Bob,2,N\n102,Cid,2,J\n",
        );

        let schema = CanonicalSchema::from_path(dir.path().join("km.json")).unwrap();
        let source_lm = LmParser::parse_path(dir.path().join("source.lm")).unwrap();
        let target_lm = LmParser::parse_path(dir.path().join("target.lm")).unwrap();
        assert_eq!(source_lm.name, "LegacyShop");

        let service = ConvConfService::new(ConversionConfig::new().with_trace(true)).unwrap();
        let plan = service
            .plan("km.json", &schema, &source_lm, &target_lm)
            .unwrap();
        let plan_json: serde_json::Value = serde_json::from_str(&plan.to_json().unwrap()).unwrap();
        assert_eq!(plan_json["steps"][0]["detail"], "direction=INPUT_ONLY");
        assert_eq!(plan_json["steps"][1]["detail"], "direction=OUTPUT_ONLY");

        let source = CsvDirectoryBackend::new(dir.path().join("in"));
        let mut target = CsvDirectoryBackend::new(dir.path().join("out"));
        let output = service
            .execute_plan(&schema, &plan, &source, &mut target)
            .unwrap();

        assert_eq!(output.records.len(), 2);
        assert_eq!(output.rows_written["customer"], 2);
        assert_eq!(output.trace.len(), 8);
        assert_eq!(
            output.trace[1].to_line(),
            "READ|Shop.Customer|100|STUFE->Tier|Shop.Tier.Gold|source=KUNDE"
        );

        let written = fs::read_to_string(dir.path().join("out/customer.csv")).unwrap();
        assert_eq!(written, "id,full_name,tier_code\n100,Ann,10\n102,Cid,20\n");
    }

    #[test]
    fn test_missing_source_column_stops_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path(), "KNR,NAME,AKTIV\n100,Ann,J\n");

        let service = ConvConfService::default();
        let schema = CanonicalSchema::from_path(dir.path().join("km.json")).unwrap();
        let source_lm = LmParser::parse_path(dir.path().join("source.lm")).unwrap();
        let target_lm = LmParser::parse_path(dir.path().join("target.lm")).unwrap();
        let source = CsvDirectoryBackend::new(dir.path().join("in"));
        let mut target = CsvDirectoryBackend::new(dir.path().join("out"));

        let err = service
            .convert("km.json", &schema, &source_lm, &target_lm, &source, &mut target)
            .unwrap_err();
        assert!(matches!(err, ServiceError::SourceValidation(_)));
        assert_eq!(err.messages(), &["Missing column STUFE in source KUNDE".to_string()]);
        assert!(!dir.path().join("out/customer.csv").exists());
    }

    #[test]
    fn test_check_path_reports_semantic_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("km.yaml"), "classes:\n  Shop.Customer:\n    attributes:\n      Name:\n        typeKind: TEXT\n").unwrap();
        fs::write(
            dir.path().join("bad.lm"),
            "DATA C FROM K CLASS Shop.Customer { COLUMN X -> Shop.Customer.Email; COLUMN Y -> Name, NOPE; }",
        )
        .unwrap();

        let errors = ConvConfService::default()
            .check_path(dir.path().join("km.yaml"), dir.path().join("bad.lm"))
            .unwrap();
        assert_eq!(
            errors,
            vec![
                "Unknown attribute Email on Shop.Customer",
                "Unknown VALUEMAP NOPE for Shop.Customer.Name",
            ]
        );
    }

    #[test]
    fn test_parse_error_surfaces_location() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("km.json"), SCHEMA).unwrap();
        fs::write(dir.path().join("broken.lm"), "DATA C FROM K CLASS Shop.Customer {\n  IDENT KNR\n}\n").unwrap();

        let err = ConvConfService::default()
            .check_path(dir.path().join("km.json"), dir.path().join("broken.lm"))
            .unwrap_err();
        match err {
            ServiceError::Parse(parse) => assert_eq!(parse.location().map(|l| l.line), Some(3)),
            other => panic!("expected parse error, got {other}"),
        }
    }
}
