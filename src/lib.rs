// library crate for permcalc
// exposes modules needed by the binaries (permcalc, generate-man) and tests

pub mod cli;
pub mod conditions;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod rates;
pub mod sheet;
