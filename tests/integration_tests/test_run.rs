// integration tests for the run command

use crate::common::*;
use calamine::Data;

fn text(s: &str) -> Data {
    Data::String(s.to_string())
}

fn run_fixed(env: &TestEnv, extra: &[&str]) -> std::process::Output {
    let mut args = vec!["run", "--rate", "2", "--today", "2024-01-01"];
    args.extend(extra);
    env.run(&args)
}

#[test]
fn test_run_writes_both_sheets_in_place() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&cars_table());

    let output = run_fixed(&env, &["--no-copy", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert_eq!(
        sheet_names(&env.workbook_path()),
        vec!["Sheet1", "calculated_perms"]
    );

    // source sheet is passed through unmodified
    let source = read_sheet(&env.workbook_path(), "Sheet1");
    assert_eq!(source.len(), 5);
    assert_eq!(source[1][0], text("Q1-Color"));
    assert_eq!(source[2][2], text("Q1-Color == 'Red'"));

    let result = read_sheet(&env.workbook_path(), "calculated_perms");
    assert_eq!(
        result[0],
        vec![
            text("Q1-Color"),
            text("Q3-Discount"),
            text("Q2-KM"),
            text("Q5-ModelData"),
            text("Price"),
        ]
    );
    // 2 colors * 2 discounts * 1 distance * 2 models
    assert_eq!(result.len(), 1 + 8);
}

#[test]
fn test_run_nulls_and_prices() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&cars_table());

    let output = run_fixed(&env, &["--no-copy", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let result = read_sheet(&env.workbook_path(), "calculated_perms");
    let rows = &result[1..];

    for row in rows {
        let color = &row[0];
        let discount = &row[1];
        if *color == text("Red") {
            assert_eq!(*discount, Data::Empty, "discount must be blank for Red");
        } else {
            assert!(matches!(discount, Data::String(_)));
        }
    }

    // first model was built in 2020: 1461 days before 2024-01-01
    assert_eq!(rows[0][4], Data::Float(100000.0 * 1461.0 * 2.0));
    // second model was built in 2022: 730 days
    assert_eq!(rows[1][4], Data::Float(100000.0 * 730.0 * 2.0));

    match &rows[0][3] {
        Data::String(s) => assert!(s.contains("\"year\":2020"), "record cell: {}", s),
        other => panic!("expected record text, got {:?}", other),
    }

    // Blue rows keep their discount in declaration order
    assert_eq!(rows[4][0], text("Blue"));
    assert_eq!(rows[4][1], text("5"));
    assert_eq!(rows[6][1], text("10"));
}

#[test]
fn test_run_json_summary() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&cars_table());

    let output = run_fixed(&env, &["--no-copy", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json = json_output(&output);
    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["result"]["combinations"], 8);
    assert_eq!(json["result"]["properties"], 4);
    assert_eq!(json["result"]["conditions"], 1);
    assert_eq!(json["result"]["rate"], 2.0);
    assert_eq!(json["result"]["to"], "CLP");
    assert_eq!(json["result"]["today"], "2024-01-01");
    assert!(json["result"].get("copied_to").is_none());
}

#[test]
fn test_run_copies_to_results_dir() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&cars_table());

    let output = run_fixed(&env, &["--no-json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let copied = env.results_dir().join("CarsData.xlsx");
    assert!(copied.exists(), "copy missing at {}", copied.display());
    assert_eq!(read_sheet(&copied, "calculated_perms").len(), 9);

    let out = stdout(&output);
    assert!(out.contains("Wrote 8 combinations"));
    assert!(out.contains("Copied to"));
}

#[test]
fn test_run_separate_output_and_results_dir_flag() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&cars_table());

    let out_path = env.path().join("out.xlsx");
    let results = env.path().join("elsewhere");
    let output = run_fixed(
        &env,
        &[
            "--output",
            out_path.to_str().unwrap(),
            "--results-dir",
            results.to_str().unwrap(),
            "--json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    // input keeps only its source sheet
    assert_eq!(sheet_names(&env.workbook_path()), vec!["Sheet1"]);
    assert_eq!(read_sheet(&out_path, "calculated_perms").len(), 9);
    assert!(results.join("out.xlsx").exists());
}

#[test]
fn test_run_empty_table_is_no_data() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&[]);

    // no --rate: the rate lookup must never be reached
    let output = env.run(&["run", "--no-copy", "--json"]);
    assert_eq!(output.status.code(), Some(6), "stderr: {}", stderr(&output));

    let json = json_output(&output);
    assert_eq!(json["error"]["code"], -32006);
    assert_eq!(
        json["error"]["message"],
        "no property data in the source table"
    );
}

#[test]
fn test_run_unreachable_rate_api() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&cars_table());

    let output = env.run(&["run", "--no-copy", "--json", "--today", "2024-01-01"]);
    assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));
    assert_eq!(json_output(&output)["error"]["code"], -32003);

    // nothing was written
    assert_eq!(sheet_names(&env.workbook_path()), vec!["Sheet1"]);
}

#[test]
fn test_run_missing_column_is_format_error() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1").unwrap();
    sheet.write_string(0, 0, "Property Name").unwrap();
    sheet.write_string(0, 1, "Possible Values").unwrap();
    sheet.write_string(1, 0, "Q1-Color").unwrap();
    workbook.save(env.workbook_path()).unwrap();

    let output = run_fixed(&env, &["--no-copy", "--json"]);
    assert_eq!(output.status.code(), Some(2));
    let message = json_output(&output)["error"]["message"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("Condition"), "message: {}", message);
}

#[test]
fn test_run_missing_workbook_is_format_error() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));

    let output = run_fixed(&env, &["--no-copy", "--json"]);
    assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));
}

#[test]
fn test_run_invalid_condition_is_format_error() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&[
        ["Q1-Color", "Red;Blue", ""],
        ["Q3-Discount", "5", "Q1-Color == == 'Red'"],
    ]);

    let output = run_fixed(&env, &["--no-copy", "--json"]);
    assert_eq!(output.status.code(), Some(2));
    let message = json_output(&output)["error"]["message"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("row 3"), "message: {}", message);
}

#[test]
fn test_run_nulled_distance_is_computation_error() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&[
        ["Q1-Color", "Red;Blue", ""],
        ["Q2-KM", "100", "Q1-Color == 'Blue'"],
        ["Q5-ModelData", r#"{"year": 2020}"#, ""],
    ]);

    let output = run_fixed(&env, &["--no-copy", "--json"]);
    assert_eq!(output.status.code(), Some(4), "stderr: {}", stderr(&output));
    assert_eq!(sheet_names(&env.workbook_path()), vec!["Sheet1"]);
}

#[test]
fn test_run_invalid_rate_is_invalid_args() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));
    env.write_properties(&cars_table());

    let output = env.run(&["run", "--rate", "0", "--no-copy", "--json"]);
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_run_bad_flag_is_invalid_args() {
    let env = TestEnv::new();
    let output = env.run(&["run", "--today", "tomorrow"]);
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_run_custom_fields_and_sheets() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({
        "workbook": {
            "path": env.path().join("props.xlsx"),
            "source_sheet": "Props",
            "result_sheet": "Out"
        },
        "fields": { "distance": "Miles", "model_year": "Model" }
    }));
    write_property_sheet(
        &env.path().join("props.xlsx"),
        "Props",
        &[
            ["Trim", "Base;Sport;Luxury", ""],
            ["Miles", "10", "Trim == 'Luxury' and Model.year >= 2023"],
            ["Model", r#"{"year": 2023}"#, ""],
        ],
    );

    let output = env.run(&[
        "run",
        "--rate",
        "1",
        "--today",
        "2023-01-11",
        "--no-copy",
        "--json",
    ]);
    // Luxury nulls the distance, which pricing cannot use
    assert_eq!(output.status.code(), Some(4), "stderr: {}", stderr(&output));

    write_property_sheet(
        &env.path().join("props.xlsx"),
        "Props",
        &[
            ["Trim", "Base;Sport", ""],
            ["Miles", "10", ""],
            ["Model", r#"{"year": 2023}"#, ""],
        ],
    );
    let output = env.run(&[
        "run",
        "--rate",
        "1",
        "--today",
        "2023-01-11",
        "--no-copy",
        "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let result = read_sheet(&env.path().join("props.xlsx"), "Out");
    assert_eq!(result.len(), 3);
    assert_eq!(result[1][3], Data::Float(100.0));
}
