// integration tests for the preview command

use crate::common::*;

#[test]
fn test_preview_json_lists_combinations() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&cars_table());

    let output = env.run(&[
        "preview", "--rate", "2", "--today", "2024-01-01", "--limit", "3", "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json = json_output(&output);
    let result = &json["result"];
    assert_eq!(result["total"], 8);
    assert_eq!(
        result["columns"],
        serde_json::json!(["Q1-Color", "Q3-Discount", "Q2-KM", "Q5-ModelData", "Price"])
    );

    let combos = result["combinations"].as_array().unwrap();
    assert_eq!(combos.len(), 3);
    assert_eq!(combos[0]["Q1-Color"], "Red");
    assert!(combos[0]["Q3-Discount"].is_null());
    assert_eq!(combos[0]["Q5-ModelData"]["year"], 2020);
    assert_eq!(combos[0]["Price"], 100000.0 * 1461.0 * 2.0);
}

#[test]
fn test_preview_does_not_write() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&cars_table());

    let output = env.run(&["preview", "--rate", "2", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert_eq!(sheet_names(&env.workbook_path()), vec!["Sheet1"]);
    assert!(!env.results_dir().exists());
}

#[test]
fn test_preview_text_table() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&cars_table());

    let output = env.run(&[
        "preview", "--rate", "1", "--today", "2024-01-01", "-n", "2", "--no-json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("Q1-Color"));
    assert!(lines[0].ends_with("Price"));
    assert!(lines[1].starts_with("Red"));
    assert!(out.contains("2 of 8 combinations shown"));
}

#[test]
fn test_preview_empty_table_is_no_data() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&[]);

    let output = env.run(&["preview", "--json"]);
    assert_eq!(output.status.code(), Some(6));
}
