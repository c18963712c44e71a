use serde::{Deserialize, Serialize};

use crate::engine::FieldRoles;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workbook: WorkbookSettings,
    #[serde(default)]
    pub fields: FieldRoles,
    #[serde(default)]
    pub exchange: ExchangeSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub settings: Settings,
}

pub const DEFAULT_WORKBOOK_PATH: &str = "CarsData.xlsx";
pub const DEFAULT_SOURCE_SHEET: &str = "Sheet1";
pub const DEFAULT_RESULT_SHEET: &str = "calculated_perms";
pub const DEFAULT_FROM_CURRENCY: &str = "USD";
pub const DEFAULT_TO_CURRENCY: &str = "CLP";
pub const DEFAULT_API_URL: &str = "https://api.coinbase.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RESULTS_DIR: &str = "../results";

/// where the property table lives and where results go inside the workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookSettings {
    #[serde(default = "default_workbook_path")]
    pub path: String,
    #[serde(default = "default_source_sheet")]
    pub source_sheet: String,
    #[serde(default = "default_result_sheet")]
    pub result_sheet: String,
}

fn default_workbook_path() -> String {
    DEFAULT_WORKBOOK_PATH.to_string()
}

fn default_source_sheet() -> String {
    DEFAULT_SOURCE_SHEET.to_string()
}

fn default_result_sheet() -> String {
    DEFAULT_RESULT_SHEET.to_string()
}

impl Default for WorkbookSettings {
    fn default() -> Self {
        Self {
            path: default_workbook_path(),
            source_sheet: default_source_sheet(),
            result_sheet: default_result_sheet(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeSettings {
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_to")]
    pub to: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// request timeout for the rate lookup
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_from() -> String {
    DEFAULT_FROM_CURRENCY.to_string()
}

fn default_to() -> String {
    DEFAULT_TO_CURRENCY.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
            api_url: default_api_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// directory that receives a copy of every written workbook
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
}

fn default_results_dir() -> String {
    DEFAULT_RESULTS_DIR.to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// max edit distance when suggesting a property for an unknown condition reference
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: usize,
}

fn default_fuzzy_threshold() -> usize {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self { fuzzy_threshold: 2 }
    }
}
