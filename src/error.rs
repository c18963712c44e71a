//! error taxonomy for a permcalc run
//!
//! every variant is fatal for the run; the exit code tells scripts which
//! stage failed

use std::path::PathBuf;

use crate::cli::exit_codes;
use crate::conditions::ParseError;

/// malformed or incomplete source table
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("failed to open workbook {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("worksheet '{sheet}' not found in {path}")]
    SheetNotFound { path: PathBuf, sheet: String },

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: missing '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: property '{property}' is declared more than once")]
    DuplicateProperty { row: usize, property: String },

    #[error("row {row}: '{property}' is a reserved column name")]
    ReservedProperty { row: usize, property: String },

    #[error("row {row}: invalid record {token:?} for '{property}': {reason}")]
    InvalidRecord {
        row: usize,
        property: String,
        token: String,
        reason: String,
    },

    #[error("row {row}: invalid condition for '{property}': {source}")]
    InvalidCondition {
        row: usize,
        property: String,
        #[source]
        source: ParseError,
    },
}

/// the exchange rate could not be obtained
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("failed to reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },

    #[error("malformed rate response: {0}")]
    Malformed(String),

    #[error("no {to} rate in the {from} rate table")]
    MissingCurrency { from: String, to: String },

    #[error("rate {rate} for {from}->{to} is not usable")]
    Unusable { from: String, to: String, rate: f64 },
}

/// price arithmetic failed for one combination
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("combination {index}: cannot compute price from '{field}': {reason}")]
pub struct ComputationError {
    /// zero-based position of the combination in generation order
    pub index: usize,
    pub field: String,
    pub reason: String,
}

/// the output artifact could not be written or copied
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to write workbook {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("result table has {rows} rows, more than a worksheet holds ({limit})")]
    TooManyRows { rows: usize, limit: usize },

    #[error("combination count overflows, a worksheet holds {limit} rows")]
    UncountableRows { limit: usize },

    #[error("result table has {columns} columns, more than a worksheet holds ({limit})")]
    TooManyColumns { columns: usize, limit: usize },

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// any failure of a run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("no exchange rate available: {0}")]
    RateUnavailable(#[from] RateError),

    #[error(transparent)]
    Computation(#[from] ComputationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("no property data in the source table")]
    NoData,
}

impl Error {
    /// process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Format(_) => exit_codes::FORMAT_ERROR,
            Error::RateUnavailable(_) => exit_codes::RATE_UNAVAILABLE,
            Error::Computation(_) => exit_codes::COMPUTATION_ERROR,
            Error::Persistence(_) => exit_codes::PERSISTENCE_ERROR,
            Error::NoData => exit_codes::NO_DATA,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
