// integration tests for the check command

use crate::common::*;

#[test]
fn test_check_reports_shape() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&cars_table());

    let output = env.run(&["check", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let result = &json_output(&output)["result"];
    assert_eq!(result["combinations"], 8);

    let properties = result["properties"].as_array().unwrap();
    assert_eq!(properties.len(), 4);
    assert_eq!(properties[0]["name"], "Q1-Color");
    assert_eq!(properties[0]["values"], 2);
    assert!(properties[0].get("condition").is_none());
    assert_eq!(properties[1]["condition"], "Q1-Color == 'Red'");
    assert_eq!(properties[3]["values"], 2);

    assert_eq!(result["unknown_references"], serde_json::json!([]));
}

#[test]
fn test_check_suggests_unknown_reference() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&[
        ["Color", "Red;Blue", ""],
        ["Discount", "5;10", "Colour == 'Red'"],
    ]);

    let output = env.run(&["check", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let unknown = &json_output(&output)["result"]["unknown_references"];
    assert_eq!(unknown[0]["target"], "Discount");
    assert_eq!(unknown[0]["field"], "Colour");
    assert_eq!(unknown[0]["suggestion"], "Color");
}

#[test]
fn test_check_text_output() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&[
        ["Color", "Red;Blue", ""],
        ["Discount", "5;10", "Colour == 'Red'"],
    ]);

    let output = env.run(&["check", "--no-json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Properties (2):"));
    assert!(out.contains("Combinations: 4"));
    assert!(out.contains("did you mean 'Color'?"));
}

#[test]
fn test_check_respects_fuzzy_threshold() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({ "settings": { "fuzzy_threshold": 0 } }));
    env.write_properties(&[
        ["Color", "Red;Blue", ""],
        ["Discount", "5;10", "Colour == 'Red'"],
    ]);

    let output = env.run(&["check", "--json"]);
    assert!(output.status.success());

    let unknown = &json_output(&output)["result"]["unknown_references"];
    assert!(unknown[0]["suggestion"].is_null());
}

#[test]
fn test_check_duplicate_property_is_format_error() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&[["Color", "Red", ""], ["Color", "Blue", ""]]);

    let output = env.run(&["check", "--json"]);
    assert_eq!(output.status.code(), Some(2));
    let message = json_output(&output)["error"]["message"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("row 3"), "message: {}", message);
}

#[test]
fn test_check_missing_sheet_is_format_error() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({ "workbook": {
        "path": env.workbook_path(),
        "source_sheet": "Properties"
    }}));
    env.write_properties(&cars_table());

    let output = env.run(&["check", "--json"]);
    assert_eq!(output.status.code(), Some(2));
}
