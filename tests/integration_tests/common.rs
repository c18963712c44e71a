// shared utilities for integration tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// nothing listens here, so an accidental live rate lookup fails fast
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";

/// isolated working area: its own config file, workbook and results dir
pub struct TestEnv {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create test directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.json")
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.path().join("CarsData.xlsx")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.path().join("results")
    }

    /// write a config pointing the default workbook and results dir into this env
    pub fn write_config(&self, extra: serde_json::Value) {
        let mut config = serde_json::json!({
            "workbook": { "path": self.workbook_path() },
            "output": { "results_dir": self.results_dir() }
        });
        if let (Some(base), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }
        std::fs::write(
            self.config_path(),
            serde_json::to_string_pretty(&config).unwrap(),
        )
        .expect("Failed to write test config");
    }

    /// write the property sheet as the default workbook
    pub fn write_properties(&self, rows: &[[&str; 3]]) {
        write_property_sheet(&self.workbook_path(), "Sheet1", rows);
    }

    /// run permcalc against this env's config
    pub fn run(&self, args: &[&str]) -> Output {
        let config = self.config_path();
        let mut cmd_args = vec!["--config", config.to_str().unwrap()];
        cmd_args.extend(args);

        Command::new(env!("CARGO_BIN_EXE_permcalc"))
            .args(&cmd_args)
            .current_dir(self.path())
            .env("PERMCALC_RATES_API_URL", UNREACHABLE_API)
            .env_remove("PERMCALC_CONFIG")
            .env_remove("PERMCALC_LOG")
            .output()
            .expect("Failed to run permcalc")
    }
}

/// write a property table with the standard header into `sheet`
pub fn write_property_sheet(path: &Path, sheet: &str, rows: &[[&str; 3]]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).unwrap();

    for (c, header) in ["Property Name", "Possible Values", "Condition"]
        .iter()
        .enumerate()
    {
        worksheet.write_string(0, c as u16, *header).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                worksheet
                    .write_string(r as u32 + 1, c as u16, *cell)
                    .unwrap();
            }
        }
    }

    workbook.save(path).expect("Failed to write test workbook");
}

/// read a worksheet back as a cell grid
pub fn read_sheet(path: &Path, sheet: &str) -> Vec<Vec<Data>> {
    let mut workbook = open_workbook_auto(path).expect("Failed to open workbook");
    let range = workbook
        .worksheet_range(sheet)
        .expect("Failed to read worksheet");
    range.rows().map(|r| r.to_vec()).collect()
}

#[allow(dead_code)]
pub fn sheet_names(path: &Path) -> Vec<String> {
    open_workbook_auto(path)
        .expect("Failed to open workbook")
        .sheet_names()
}

/// parse the single JSON-RPC line on stdout
#[allow(dead_code)]
pub fn json_output(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): {}\nstderr: {}",
            e,
            stdout,
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

#[allow(dead_code)]
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[allow(dead_code)]
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// the four-row table most tests start from
#[allow(dead_code)]
pub fn cars_table() -> Vec<[&'static str; 3]> {
    vec![
        ["Q1-Color", "Red;Blue", ""],
        ["Q3-Discount", "5;10", "Q1-Color == 'Red'"],
        ["Q2-KM", "100000", ""],
        [
            "Q5-ModelData",
            r#"{"model": "Yaris", "year": 2020};{"model": "Corolla", "year": 2022}"#,
            "",
        ],
    ]
}
