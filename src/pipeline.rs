//! end-to-end run: read the property sheet, fetch a rate, generate, persist
//!
//! every stage fails fast; nothing is written unless all combinations priced

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{self, Config};
use crate::engine::{generate, Combination, FieldRoles, PropertyTable, ResultTable, UnknownReference};
use crate::error::{ComputationError, Error, Result};
use crate::rates::RateProvider;
use crate::sheet::{self, SourceSheet};

/// everything a run needs, resolved from config and flags
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub input: PathBuf,
    /// rewritten in place when it equals `input`
    pub output: PathBuf,
    pub source_sheet: String,
    pub result_sheet: String,
    pub roles: FieldRoles,
    pub from: String,
    pub to: String,
    pub today: NaiveDate,
    /// `None` skips the results copy
    pub results_dir: Option<PathBuf>,
}

impl RunOptions {
    pub fn from_config(config: &Config, today: NaiveDate) -> Self {
        let input = config::expand_path(&config.workbook.path);
        Self {
            output: input.clone(),
            input,
            source_sheet: config.workbook.source_sheet.clone(),
            result_sheet: config.workbook.result_sheet.clone(),
            roles: config.fields.clone(),
            from: config.exchange.from.clone(),
            to: config.exchange.to.clone(),
            today,
            results_dir: Some(config::expand_path(&config.output.results_dir)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copied_to: Option<PathBuf>,
    pub properties: usize,
    pub conditions: usize,
    pub combinations: usize,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub today: NaiveDate,
}

/// today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// read the property worksheet and parse it into a generation-ready table
pub fn load_table(
    path: &Path,
    sheet_name: &str,
    roles: &FieldRoles,
) -> Result<(SourceSheet, PropertyTable)> {
    let source = sheet::read_source(path, sheet_name)?;
    let rows = source.rows()?;
    tracing::info!(path = %path.display(), rows = rows.len(), "read property sheet");

    let table = PropertyTable::from_rows(&rows, roles)?;
    Ok((source, table))
}

/// run the whole pipeline
pub fn run(options: &RunOptions, rates: &dyn RateProvider) -> Result<RunSummary> {
    tracing::info!(input = %options.input.display(), "starting run");

    let (source, table) = load_table(&options.input, &options.source_sheet, &options.roles)?;
    if table.is_empty() {
        return Err(Error::NoData);
    }
    tracing::info!(
        properties = table.domain.len(),
        conditions = table.conditions.len(),
        "parsed property table"
    );
    sheet::ensure_fits(table.combination_count(), table.columns().len())?;

    let rate = rates.rate(&options.from, &options.to)?;
    tracing::info!(from = %options.from, to = %options.to, rate, "exchange rate");

    let combinations = generate(&table, rate, options.today, &options.roles);
    let result = ResultTable::assemble(combinations, table.columns())?;
    tracing::info!(combinations = result.row_count(), "generated combinations");

    sheet::write_workbook(&options.output, &source, &options.result_sheet, &result)?;
    tracing::info!(output = %options.output.display(), "wrote workbook");

    let copied_to = match &options.results_dir {
        Some(dir) => {
            let copied = sheet::copy_to_dir(&options.output, dir)?;
            tracing::info!(path = %copied.display(), "copied results");
            Some(copied)
        }
        None => None,
    };

    let summary = RunSummary {
        input: options.input.clone(),
        output: options.output.clone(),
        copied_to,
        properties: table.domain.len(),
        conditions: table.conditions.len(),
        combinations: result.row_count(),
        from: options.from.clone(),
        to: options.to.clone(),
        rate,
        today: options.today,
    };
    tracing::info!(combinations = summary.combinations, "run finished");

    Ok(summary)
}

/// the first `limit` combinations, or all of them, without persisting
pub fn preview(
    table: &PropertyTable,
    rate: f64,
    today: NaiveDate,
    roles: &FieldRoles,
    limit: Option<usize>,
) -> std::result::Result<Vec<Combination>, ComputationError> {
    let combinations = generate(table, rate, today, roles);
    match limit {
        Some(n) => combinations.take(n).collect(),
        None => combinations.collect(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyReport {
    pub name: String,
    pub values: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// what `check` reports about a property table
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub properties: Vec<PropertyReport>,
    /// `None` when the count overflows
    pub combinations: Option<usize>,
    pub unknown_references: Vec<UnknownReference>,
}

impl TableReport {
    pub fn new(table: &PropertyTable, fuzzy_threshold: usize) -> Self {
        let properties = table
            .domain
            .properties()
            .iter()
            .map(|p| PropertyReport {
                name: p.name.clone(),
                values: p.values.len(),
                condition: table.conditions.get(&p.name).map(|r| r.source.clone()),
            })
            .collect();

        Self {
            properties,
            combinations: table.combination_count(),
            unknown_references: table.unknown_references(fuzzy_threshold),
        }
    }
}
