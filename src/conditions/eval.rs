//! condition evaluator
//!
//! evaluates parsed conditions against the field values of one combination

use std::cmp::Ordering;
use std::collections::HashMap;

use super::types::{CompareOp, Comparison, Condition, Operand, Value};

/// source of named field values for condition evaluation
pub trait FieldLookup {
    /// value bound to `name`, if the field exists
    fn lookup(&self, name: &str) -> Option<&Value>;
}

impl FieldLookup for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl FieldLookup for [(String, Value)] {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// resolve a field reference, following dotted record paths
///
/// an exact field name always wins; otherwise the longest bound prefix is
/// taken as the field and the remaining segments index into its record
pub fn resolve(path: &str, ctx: &(impl FieldLookup + ?Sized)) -> Option<Value> {
    if let Some(v) = ctx.lookup(path) {
        return Some(v.clone());
    }

    let mut split = path.len();
    while let Some(dot) = path[..split].rfind('.') {
        if let Some(root) = ctx.lookup(&path[..dot]) {
            let mut current = root.clone();
            for key in path[dot + 1..].split('.') {
                current = current.get(key)?;
            }
            return Some(current);
        }
        split = dot;
    }

    None
}

/// evaluate a condition against the given fields
///
/// returns `None` ("no decision") when the condition references no fields or
/// when any referenced field cannot be resolved; the caller must then leave
/// its target untouched
pub fn evaluate(condition: &Condition, ctx: &(impl FieldLookup + ?Sized)) -> Option<bool> {
    let fields = condition.fields();
    if fields.is_empty() {
        return None;
    }

    let mut bound = HashMap::with_capacity(fields.len());
    for field in fields {
        let value = resolve(field, ctx)?;
        bound.insert(field, value);
    }

    Some(eval_bound(condition, &bound))
}

fn eval_bound(condition: &Condition, bound: &HashMap<&str, Value>) -> bool {
    match condition {
        // empty All = true (vacuous truth)
        Condition::All(conditions) => conditions.iter().all(|c| eval_bound(c, bound)),
        // empty Any = false
        Condition::Any(conditions) => conditions.iter().any(|c| eval_bound(c, bound)),
        Condition::Not(inner) => !eval_bound(inner, bound),
        Condition::Compare(c) => eval_comparison(c, bound),
        Condition::Truthy(o) => operand_value(o, bound).is_truthy(),
    }
}

fn operand_value<'a>(operand: &'a Operand, bound: &'a HashMap<&str, Value>) -> &'a Value {
    static NULL: Value = Value::Null;
    match operand {
        Operand::Literal(v) => v,
        Operand::Field(name) => bound.get(name.as_str()).unwrap_or(&NULL),
    }
}

fn eval_comparison(c: &Comparison, bound: &HashMap<&str, Value>) -> bool {
    let left = operand_value(&c.left, bound);
    let right = operand_value(&c.right, bound);
    compare(c.op, left, right)
}

// ============================================================================
// Comparison Helpers
// ============================================================================

/// apply a comparison operator to two values
///
/// null equals only null and is unordered; strings compared with numbers are
/// parsed as numbers; two strings compare lexicographically
pub fn compare(op: CompareOp, left: &Value, right: &Value) -> bool {
    match op {
        CompareOp::Eq => values_equal(left, right),
        CompareOp::Ne => !values_equal(left, right),
        CompareOp::Gt => order(left, right) == Some(Ordering::Greater),
        CompareOp::Gte => matches!(order(left, right), Some(Ordering::Greater | Ordering::Equal)),
        CompareOp::Lt => order(left, right) == Some(Ordering::Less),
        CompareOp::Lte => matches!(order(left, right), Some(Ordering::Less | Ordering::Equal)),
        CompareOp::In => contains(right, left),
    }
}

fn is_numeric(v: &Value) -> bool {
    matches!(v, Value::Number(_) | Value::Float(_))
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(a), Value::Number(b)) => a == b,
        _ if is_numeric(left) || is_numeric(right) => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        _ => left == right,
    }
}

fn order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Number(a), Value::Number(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ if is_numeric(left) || is_numeric(right) => left.as_f64()?.partial_cmp(&right.as_f64()?),
        _ => None,
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::List(items) => items.iter().any(|item| values_equal(needle, item)),
        Value::String(s) => needle.as_str().is_some_and(|n| s.contains(n)),
        Value::Record(map) => needle.as_str().is_some_and(|k| map.contains_key(k)),
        _ => false,
    }
}
