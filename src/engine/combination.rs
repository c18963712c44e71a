use serde_json::{Map, Value as JsonValue};

use super::model::PRICE_COLUMN;
use crate::conditions::{FieldLookup, Value};

/// one fully-bound assignment of a value to every property, plus its price
///
/// only the engine mutates a combination (nulling, then pricing); consumers
/// see it read-only
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    index: usize,
    fields: Vec<(String, Value)>,
    price: Option<f64>,
}

impl Combination {
    pub fn new(index: usize, fields: Vec<(String, Value)>) -> Self {
        Self {
            index,
            fields,
            price: None,
        }
    }

    /// zero-based position in generation order
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.lookup(name)
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    /// value of an output column, `Price` included
    pub fn column_value(&self, column: &str) -> Option<Value> {
        if let Some(v) = self.get(column) {
            return Some(v.clone());
        }
        if column == PRICE_COLUMN {
            return Some(self.price.map(Value::Float).unwrap_or(Value::Null));
        }
        None
    }

    /// set a field to null; false if the field does not exist
    pub(crate) fn set_null(&mut self, name: &str) -> bool {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => {
                *v = Value::Null;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_price(&mut self, price: f64) {
        self.price = Some(price);
    }

    /// JSON object of all fields in order, followed by `Price`
    pub fn to_json(&self) -> JsonValue {
        let mut obj = Map::with_capacity(self.fields.len() + 1);
        for (name, value) in &self.fields {
            obj.insert(name.clone(), value_to_json(value));
        }
        obj.insert(
            PRICE_COLUMN.to_string(),
            self.price.map(JsonValue::from).unwrap_or(JsonValue::Null),
        );
        JsonValue::Object(obj)
    }
}

impl FieldLookup for Combination {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

pub(crate) fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Number(n) => JsonValue::from(*n),
        Value::Float(f) => JsonValue::from(*f),
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::List(l) => JsonValue::Array(l.iter().map(value_to_json).collect()),
        Value::Record(map) => JsonValue::Object(map.clone()),
        Value::Null => JsonValue::Null,
    }
}
