//! property table model
//!
//! parses source rows into ordered value domains and exclusion conditions

use serde::Serialize;
use serde_json::Value as JsonValue;
use strsim::levenshtein;

use super::combination::Combination;
use super::FieldRoles;
use crate::conditions::{evaluate, parse_condition, Condition, Value};
use crate::error::FormatError;

pub const PROPERTY_NAME_COLUMN: &str = "Property Name";
pub const POSSIBLE_VALUES_COLUMN: &str = "Possible Values";
pub const CONDITION_COLUMN: &str = "Condition";

/// derived column appended to every combination
pub const PRICE_COLUMN: &str = "Price";

const VALUE_SEPARATOR: char = ';';

/// one row of the property sheet, missing cells already normalized to ""
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceRow {
    pub property_name: String,
    pub possible_values: String,
    pub condition: String,
}

impl SourceRow {
    pub fn new(
        property_name: impl Into<String>,
        possible_values: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            possible_values: possible_values.into(),
            condition: condition.into(),
        }
    }

    fn is_blank(&self) -> bool {
        self.property_name.trim().is_empty()
            && self.possible_values.trim().is_empty()
            && self.condition.trim().is_empty()
    }
}

/// a property and its ordered possible values
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub values: Vec<Value>,
}

/// all properties in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDomain {
    properties: Vec<Property>,
}

impl PropertyDomain {
    pub fn new(properties: Vec<Property>) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.properties.iter().map(|p| p.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// product of the domain sizes; `None` on overflow, zero when empty
    pub fn combination_count(&self) -> Option<usize> {
        if self.properties.is_empty() {
            return Some(0);
        }
        self.properties
            .iter()
            .try_fold(1usize, |acc, p| acc.checked_mul(p.values.len()))
    }
}

/// a condition that nulls `target` when it holds
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionRule {
    pub target: String,
    /// condition text as written in the sheet
    pub source: String,
    pub condition: Condition,
}

/// exclusion conditions in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSet {
    rules: Vec<ConditionRule>,
}

impl ConditionSet {
    pub fn new(rules: Vec<ConditionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ConditionRule] {
        &self.rules
    }

    pub fn get(&self, target: &str) -> Option<&ConditionRule> {
        self.rules.iter().find(|r| r.target == target)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// null every target whose condition holds for the combination
    ///
    /// rules run in order against the current state, so a later rule sees
    /// fields nulled by an earlier one. rules without a decision leave their
    /// target untouched. returns the nulled field names.
    pub fn apply(&self, combination: &mut Combination) -> Vec<String> {
        let mut nulled = Vec::new();

        for rule in &self.rules {
            match evaluate(&rule.condition, &*combination) {
                Some(true) => {
                    if combination.set_null(&rule.target) {
                        tracing::trace!(
                            combination = combination.index(),
                            field = %rule.target,
                            condition = %rule.source,
                            "nulled field"
                        );
                        nulled.push(rule.target.clone());
                    }
                }
                Some(false) => {}
                None => {
                    tracing::trace!(
                        combination = combination.index(),
                        field = %rule.target,
                        "condition made no decision"
                    );
                }
            }
        }

        nulled
    }
}

/// condition identifier that matches no property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownReference {
    /// property the condition belongs to
    pub target: String,
    pub field: String,
    /// closest property name, if any is near enough
    pub suggestion: Option<String>,
}

/// the generation-ready model parsed from the property sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyTable {
    pub domain: PropertyDomain,
    pub conditions: ConditionSet,
}

impl PropertyTable {
    pub fn new(domain: PropertyDomain, conditions: ConditionSet) -> Self {
        Self { domain, conditions }
    }

    /// parse source rows into domains and conditions
    ///
    /// rows are numbered as in the worksheet: the header is row 1, so the
    /// first data row is row 2. fully blank rows are skipped. any malformed
    /// row fails the whole table.
    pub fn from_rows(rows: &[SourceRow], roles: &FieldRoles) -> Result<Self, FormatError> {
        let mut properties: Vec<Property> = Vec::new();
        let mut pending_conditions: Vec<(usize, &SourceRow)> = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let row_number = i + 2;

            if row.is_blank() {
                continue;
            }

            let name = row.property_name.trim();
            if name.is_empty() {
                return Err(FormatError::MissingField {
                    row: row_number,
                    field: PROPERTY_NAME_COLUMN,
                });
            }
            if name == PRICE_COLUMN {
                return Err(FormatError::ReservedProperty {
                    row: row_number,
                    property: name.to_string(),
                });
            }
            if properties.iter().any(|p| p.name == name) {
                return Err(FormatError::DuplicateProperty {
                    row: row_number,
                    property: name.to_string(),
                });
            }

            let values = if name == roles.model_year {
                parse_records(&row.possible_values, name, row_number)?
            } else {
                split_values(&row.possible_values)
            };

            properties.push(Property {
                name: name.to_string(),
                values,
            });

            if !row.condition.trim().is_empty() {
                pending_conditions.push((row_number, row));
            }
        }

        // conditions are parsed once every property name is known, so quoted
        // field names can be bound regardless of row order
        let names: Vec<String> = properties.iter().map(|p| p.name.clone()).collect();
        let mut rules = Vec::with_capacity(pending_conditions.len());

        for (row_number, row) in pending_conditions {
            let target = row.property_name.trim().to_string();
            let source = row.condition.trim().to_string();
            let condition = parse_condition(&source)
                .map_err(|e| FormatError::InvalidCondition {
                    row: row_number,
                    property: target.clone(),
                    source: e,
                })?
                .bind_quoted_fields(&names);

            tracing::debug!(field = %target, parsed = %condition, "registered condition");
            rules.push(ConditionRule {
                target,
                source,
                condition,
            });
        }

        let table = Self::new(PropertyDomain::new(properties), ConditionSet::new(rules));

        for unknown in table.unknown_references(0) {
            tracing::warn!(
                target_field = %unknown.target,
                field = %unknown.field,
                "condition references an unknown property; it will never decide"
            );
        }

        Ok(table)
    }

    /// output columns: property names in order, then `Price`
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.domain.names();
        columns.push(PRICE_COLUMN.to_string());
        columns
    }

    pub fn combination_count(&self) -> Option<usize> {
        self.domain.combination_count()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// condition identifiers that resolve to no property
    ///
    /// dotted identifiers resolve through their longest property prefix.
    /// suggestions are property names within `fuzzy_threshold` edits.
    pub fn unknown_references(&self, fuzzy_threshold: usize) -> Vec<UnknownReference> {
        let names = self.domain.names();
        let mut unknown = Vec::new();

        for rule in self.conditions.rules() {
            for field in rule.condition.fields() {
                if resolves_to_property(field, &names) {
                    continue;
                }

                let field_lower = field.to_lowercase();
                let suggestion = names
                    .iter()
                    .map(|n| (n, levenshtein(&field_lower, &n.to_lowercase())))
                    .filter(|(_, distance)| *distance <= fuzzy_threshold)
                    .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
                    .map(|(n, _)| n.clone());

                unknown.push(UnknownReference {
                    target: rule.target.clone(),
                    field: field.to_string(),
                    suggestion,
                });
            }
        }

        unknown
    }
}

fn resolves_to_property(field: &str, names: &[String]) -> bool {
    if names.iter().any(|n| n == field) {
        return true;
    }
    let mut split = field.len();
    while let Some(dot) = field[..split].rfind('.') {
        if names.iter().any(|n| *n == field[..dot]) {
            return true;
        }
        split = dot;
    }
    false
}

fn split_values(spec: &str) -> Vec<Value> {
    spec.split(VALUE_SEPARATOR)
        .map(|token| Value::String(token.trim().to_string()))
        .collect()
}

fn parse_records(spec: &str, property: &str, row: usize) -> Result<Vec<Value>, FormatError> {
    spec.split(VALUE_SEPARATOR)
        .map(|token| {
            let token = token.trim();
            let invalid = |reason: String| FormatError::InvalidRecord {
                row,
                property: property.to_string(),
                token: token.to_string(),
                reason,
            };

            let json: JsonValue = serde_json::from_str(token).map_err(|e| invalid(e.to_string()))?;
            let JsonValue::Object(map) = json else {
                return Err(invalid("expected a JSON object".to_string()));
            };
            if !map.get("year").is_some_and(JsonValue::is_i64) {
                return Err(invalid("missing integer 'year'".to_string()));
            }

            Ok(Value::Record(map))
        })
        .collect()
}
