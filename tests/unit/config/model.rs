use super::*;

const FULL: &str = r#"{
  "shared": { "thread": { "kind": "thread_name" } },
  "layout": {
    "kind": "composite",
    "header": { "kind": "literal", "text": "-- begin --" },
    "body": {
      "kind": "sequence",
      "separator": " ",
      "parts": [
        { "kind": "field", "field": "level" },
        { "kind": "ref", "name": "thread" },
        { "kind": "field", "field": { "property": "user" } },
        { "kind": "field", "field": "message" }
      ]
    },
    "footer": { "kind": "literal", "text": "-- end --" }
  }
}"#;

#[test]
fn parses_and_validates_full_config() {
    let cfg = LayoutConfig::from_json_str(FULL).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.def.shared.len(), 1);
    assert!(matches!(cfg.def.layout, LayoutDef::Composite { .. }));
}

#[test]
fn composite_without_body_is_rejected() {
    let cfg = LayoutConfig::from_json_str(
        r#"{"layout": {"kind": "composite", "header": {"kind": "literal", "text": "h"}}}"#,
    )
    .unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, LayoutError::Configuration(_)));
    assert!(err.to_string().contains("layout: composite layout requires a body"));
}

#[test]
fn unknown_ref_is_rejected_with_path() {
    let cfg = LayoutConfig::from_json_str(
        r#"{"layout": {"kind": "sequence", "parts": [{"kind": "ref", "name": "nope"}]}}"#,
    )
    .unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("layout.parts[0]"));
    assert!(err.to_string().contains("'nope'"));
}

#[test]
fn shared_entries_may_not_reference_each_other() {
    let cfg = LayoutConfig::from_json_str(
        r#"{
          "shared": {
            "a": { "kind": "literal", "text": "a" },
            "b": { "kind": "ref", "name": "a" }
          },
          "layout": { "kind": "ref", "name": "b" }
        }"#,
    )
    .unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("shared.b"));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = LayoutConfig::from_json_str(r#"{"layout": {"kind": "sparkles"}}"#).unwrap_err();
    assert!(matches!(err, LayoutError::Serde(_)));

    let err = LayoutConfig::from_json_str(r#"{"layout": {"kind": "literal", "text": "x"}, "extra": 1}"#)
        .unwrap_err();
    assert!(matches!(err, LayoutError::Serde(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = LayoutConfig::from_path("definitely/not/here.json").unwrap_err();
    assert!(matches!(err, LayoutError::Io(_)));
}
