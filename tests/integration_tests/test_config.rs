// integration tests for the config command

use crate::common::*;
use std::fs;

// ============================================================================
// config show / path
// ============================================================================

#[test]
fn test_config_show_defaults_without_file() {
    let env = TestEnv::new();

    let output = env.run(&["--no-json", "config", "show"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let config: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(config["workbook"]["path"], "CarsData.xlsx");
    assert_eq!(config["workbook"]["result_sheet"], "calculated_perms");
    assert_eq!(config["exchange"]["to"], "CLP");
    // the env override replaces the configured api url
    assert_eq!(config["exchange"]["api_url"], UNREACHABLE_API);

    // showing never creates the file
    assert!(!env.config_path().exists());
}

#[test]
fn test_config_show_json_envelope() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));

    let output = env.run(&["--json", "config", "show"]);
    assert!(output.status.success());

    let json = json_output(&output);
    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["result"]["fields"]["distance"], "Q2-KM");
}

#[test]
fn test_config_path_uses_override() {
    let env = TestEnv::new();

    let output = env.run(&["config", "path"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), env.config_path().to_str().unwrap());
}

// ============================================================================
// config set / reset
// ============================================================================

#[test]
fn test_config_set_persists() {
    let env = TestEnv::new();

    let output = env.run(&["--no-json", "config", "set", "exchange.to", "eur"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Set exchange.to = eur"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(env.config_path()).unwrap()).unwrap();
    assert_eq!(saved["exchange"]["to"], "EUR");
    assert_eq!(saved["exchange"]["from"], "USD");
}

#[test]
fn test_config_set_unknown_key_is_config_error() {
    let env = TestEnv::new();

    let output = env.run(&["--no-json", "config", "set", "exchange.bank", "x"]);
    assert_eq!(output.status.code(), Some(8));
    assert!(stderr(&output).contains("Unknown config key"));
}

#[test]
fn test_config_reset_overwrites() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({ "exchange": { "to": "EUR" } }));

    let output = env.run(&["--no-json", "config", "reset"]);
    assert!(output.status.success());

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(env.config_path()).unwrap()).unwrap();
    assert_eq!(saved["exchange"]["to"], "CLP");
}

#[test]
fn test_invalid_config_json_is_config_error() {
    let env = TestEnv::new();
    fs::write(env.config_path(), "{ not json").unwrap();

    let output = env.run(&["--json", "check"]);
    assert_eq!(output.status.code(), Some(8));
    assert_eq!(json_output(&output)["error"]["code"], -32008);
}

// ============================================================================
// config verify
// ============================================================================

#[test]
fn test_config_verify_valid() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({}));

    let output = env.run(&["--no-json", "config", "verify"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Configuration is valid"));
}

#[test]
fn test_config_verify_reports_problems() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({
        "workbook": { "source_sheet": "Same", "result_sheet": "Same" },
        "exchange": { "to": "PESOS", "timeout_secs": 0 }
    }));

    let output = env.run(&["--no-json", "config", "verify"]);
    assert_eq!(output.status.code(), Some(8));

    let out = stdout(&output);
    assert!(out.contains("3 error(s)"), "stdout: {}", out);
    assert!(out.contains("exchange.to"));
    assert!(out.contains("timeout_secs"));
}

#[test]
fn test_config_verify_missing_file() {
    let env = TestEnv::new();

    let output = env.run(&["--json", "config", "verify"]);
    assert_eq!(output.status.code(), Some(8));
    let message = json_output(&output)["error"]["message"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("not found"), "message: {}", message);
}

#[test]
fn test_run_rejects_invalid_config() {
    let env = TestEnv::new();
    env.write_config(serde_json::json!({ "fields": { "distance": "KM", "model_year": "KM" } }));
    env.write_properties(&cars_table());

    let output = env.run(&["run", "--rate", "1", "--no-copy", "--json"]);
    assert_eq!(output.status.code(), Some(8));
    assert_eq!(sheet_names(&env.workbook_path()), vec!["Sheet1"]);
}
