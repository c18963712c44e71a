//! exit codes for permcalc commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes tell scripts which stage of a run failed

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// source workbook or property table is malformed
pub const FORMAT_ERROR: i32 = 2;

/// no usable exchange rate could be obtained
pub const RATE_UNAVAILABLE: i32 = 3;

/// a combination could not be priced
pub const COMPUTATION_ERROR: i32 = 4;

/// the result workbook could not be written or copied
pub const PERSISTENCE_ERROR: i32 = 5;

/// the property table has no data
pub const NO_DATA: i32 = 6;

/// invalid command-line arguments
pub const INVALID_ARGS: i32 = 7;

/// configuration file error
pub const CONFIG_ERROR: i32 = 8;
