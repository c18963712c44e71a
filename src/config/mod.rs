mod schema;

pub use schema::{
    Config, ExchangeSettings, OutputSettings, Settings, WorkbookSettings, DEFAULT_API_URL,
    DEFAULT_RESULT_SHEET, DEFAULT_SOURCE_SHEET,
};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "PERMCALC_CONFIG";
const API_URL_ENV_VAR: &str = "PERMCALC_RATES_API_URL";

/// longest worksheet name xlsx accepts
const MAX_SHEET_NAME_LEN: usize = 31;

pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(expand_path(&path));
    }

    // default location: ~/.permcalc/config.json
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".permcalc")
        .join("config.json"))
}

/// `--config` wins over the environment and the default location
pub fn get_config_path_with_override(config_override: Option<&Path>) -> Result<PathBuf> {
    match config_override {
        Some(path) => Ok(expand_path(&path.to_string_lossy())),
        None => get_config_path(),
    }
}

/// expand a leading `~` in a configured path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

pub fn load_with_override(config_override: Option<&Path>) -> Result<Config> {
    let path = get_config_path_with_override(config_override)?;

    // a missing file means defaults; nothing is written until `config set`
    let mut config = if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?
    } else {
        Config::default()
    };

    if let Ok(url) = env::var(API_URL_ENV_VAR) {
        config.exchange.api_url = url;
    }

    Ok(config)
}

pub fn save_with_override(config: &Config, config_override: Option<&Path>) -> Result<PathBuf> {
    let path = get_config_path_with_override(config_override)?;

    // ensure directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
    }

    let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(&path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(path)
}

/// Verify configuration file and return a list of problems
pub fn verify(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            return Err(anyhow!("invalid JSON: {}", e));
        }
    };

    Ok(validate(&config))
}

/// problems in an already parsed config
pub fn validate(config: &Config) -> Vec<String> {
    let mut errors = Vec::new();

    for (key, name) in [
        ("workbook.source_sheet", &config.workbook.source_sheet),
        ("workbook.result_sheet", &config.workbook.result_sheet),
    ] {
        if let Err(e) = validate_sheet_name(name) {
            errors.push(format!("{}: {}", key, e));
        }
    }

    if config.workbook.source_sheet == config.workbook.result_sheet {
        errors.push(format!(
            "workbook: source_sheet and result_sheet are both '{}'",
            config.workbook.source_sheet
        ));
    }

    if config.workbook.path.trim().is_empty() {
        errors.push("workbook.path: must not be empty".to_string());
    }

    for (key, code) in [
        ("exchange.from", &config.exchange.from),
        ("exchange.to", &config.exchange.to),
    ] {
        if !is_currency_code(code) {
            errors.push(format!(
                "{}: invalid currency code '{}': use three ASCII letters",
                key, code
            ));
        }
    }

    if config.exchange.timeout_secs == 0 {
        errors.push("exchange.timeout_secs: must be greater than 0".to_string());
    }

    if config.fields.distance == config.fields.model_year {
        errors.push(format!(
            "fields: distance and model_year are both '{}'",
            config.fields.distance
        ));
    }

    errors
}

fn validate_sheet_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("sheet name must not be empty".to_string());
    }
    let len = name.chars().count();
    if len > MAX_SHEET_NAME_LEN {
        return Err(format!(
            "sheet name '{}' is {} characters, max is {}",
            name, len, MAX_SHEET_NAME_LEN
        ));
    }
    Ok(())
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["workbook", "path"] => {
            config.workbook.path = value.to_string();
        }
        ["workbook", "source_sheet"] => {
            config.workbook.source_sheet = value.to_string();
        }
        ["workbook", "result_sheet"] => {
            config.workbook.result_sheet = value.to_string();
        }
        ["fields", "distance"] => {
            config.fields.distance = value.to_string();
        }
        ["fields", "model_year"] => {
            config.fields.model_year = value.to_string();
        }
        ["exchange", "from"] => {
            config.exchange.from = parse_currency(value)?;
        }
        ["exchange", "to"] => {
            config.exchange.to = parse_currency(value)?;
        }
        ["exchange", "api_url"] => {
            config.exchange.api_url = value.trim_end_matches('/').to_string();
        }
        ["exchange", "timeout_secs"] => {
            config.exchange.timeout_secs = value
                .parse()
                .with_context(|| format!("Invalid number: {}", value))?;
        }
        ["output", "results_dir"] => {
            config.output.results_dir = value.to_string();
        }
        ["settings", "fuzzy_threshold"] => {
            config.settings.fuzzy_threshold = value
                .parse()
                .with_context(|| format!("Invalid number: {}", value))?;
        }
        _ => {
            return Err(anyhow!(
                "Unknown config key: {}. Valid keys include: workbook.path, workbook.source_sheet, exchange.to, fields.distance, output.results_dir, etc.",
                key
            ));
        }
    }

    Ok(())
}

fn parse_currency(value: &str) -> Result<String> {
    let code = value.trim();
    if !is_currency_code(code) {
        return Err(anyhow!(
            "Invalid currency code: {}. Use three letters such as USD or CLP",
            value
        ));
    }
    Ok(code.to_ascii_uppercase())
}
