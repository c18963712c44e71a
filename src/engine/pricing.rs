//! price calculation: distance * elapsed days * exchange rate

use chrono::NaiveDate;

use super::combination::Combination;
use super::FieldRoles;
use crate::conditions::Value;
use crate::error::ComputationError;

/// whole calendar days from January 1st of `year` to `today`
///
/// negative when the year lies in the future; `None` for years chrono
/// cannot represent
pub fn elapsed_days(today: NaiveDate, year: i32) -> Option<i64> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    Some((today - start).num_days())
}

/// price of one combination
///
/// runs after nulling, on whatever values the combination holds; a nulled
/// or unparsable input is an error for this combination
pub fn compute_price(
    combination: &Combination,
    rate: f64,
    today: NaiveDate,
    roles: &FieldRoles,
) -> Result<f64, ComputationError> {
    let fail = |field: &str, reason: String| ComputationError {
        index: combination.index(),
        field: field.to_string(),
        reason,
    };

    let distance = distance_value(combination.get(&roles.distance))
        .map_err(|reason| fail(&roles.distance, reason))?;

    let year = model_year(combination.get(&roles.model_year))
        .map_err(|reason| fail(&roles.model_year, reason))?;

    let days = elapsed_days(today, year)
        .ok_or_else(|| fail(&roles.model_year, format!("year {} is out of range", year)))?;

    let units = distance
        .checked_mul(days)
        .ok_or_else(|| fail(&roles.distance, format!("{} * {} days overflows", distance, days)))?;

    let price = units as f64 * rate;
    if !price.is_finite() {
        return Err(fail(
            &roles.distance,
            format!("price {} is not a finite number", price),
        ));
    }

    Ok(price)
}

fn distance_value(value: Option<&Value>) -> Result<i64, String> {
    match value {
        None => Err("field is missing".to_string()),
        Some(Value::Null) => Err("field is null".to_string()),
        Some(Value::Number(n)) => Ok(*n),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("{:?} is not an integer", s)),
        Some(other) => Err(format!("{} is not an integer", other)),
    }
}

fn model_year(value: Option<&Value>) -> Result<i32, String> {
    let record = match value {
        None => return Err("field is missing".to_string()),
        Some(Value::Null) => return Err("field is null".to_string()),
        Some(v @ Value::Record(_)) => v,
        Some(other) => return Err(format!("{} is not a model/year record", other)),
    };

    let year = record
        .get("year")
        .and_then(|y| match y {
            Value::Number(n) => Some(n),
            _ => None,
        })
        .ok_or_else(|| "record has no integer 'year'".to_string())?;

    i32::try_from(year).map_err(|_| format!("year {} is out of range", year))
}
