//! combination engine
//!
//! turns a property table into priced combinations:
//! - `model`: property domains and exclusion conditions parsed from source rows
//! - `generator`: lazy cartesian product, nulling and pricing per combination
//! - `pricing`: distance * elapsed days * exchange rate
//! - `result`: column-oriented accumulation for tabular export

mod combination;
mod generator;
mod model;
mod pricing;
mod result;

use serde::{Deserialize, Serialize};

pub use combination::Combination;
pub use generator::{generate, Combinations, IndexProduct};
pub use model::{
    ConditionRule, ConditionSet, Property, PropertyDomain, PropertyTable, SourceRow,
    UnknownReference, CONDITION_COLUMN, POSSIBLE_VALUES_COLUMN, PRICE_COLUMN,
    PROPERTY_NAME_COLUMN,
};
pub use pricing::{compute_price, elapsed_days};
pub use result::{ResultTable, MAX_RESULT_ROWS};

pub const DEFAULT_DISTANCE_FIELD: &str = "Q2-KM";
pub const DEFAULT_MODEL_YEAR_FIELD: &str = "Q5-ModelData";

/// which properties play a part in pricing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRoles {
    /// odometer-style reading, parsed as an integer
    #[serde(default = "default_distance")]
    pub distance: String,
    /// property whose tokens are JSON records carrying a `year`
    #[serde(default = "default_model_year")]
    pub model_year: String,
}

fn default_distance() -> String {
    DEFAULT_DISTANCE_FIELD.to_string()
}

fn default_model_year() -> String {
    DEFAULT_MODEL_YEAR_FIELD.to_string()
}

impl Default for FieldRoles {
    fn default() -> Self {
        Self {
            distance: default_distance(),
            model_year: default_model_year(),
        }
    }
}

impl FieldRoles {
    pub fn new(distance: impl Into<String>, model_year: impl Into<String>) -> Self {
        Self {
            distance: distance.into(),
            model_year: model_year.into(),
        }
    }
}
