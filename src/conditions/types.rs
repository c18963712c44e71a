//! values and the expression tree that conditions parse into

use std::fmt;

use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// membership in a list, substring of a string, or key of a record
    In,
}

impl CompareOp {
    /// symbol or word form of an operator (`>=`, `gte`, `greater_than_or_equal`)
    pub fn parse(s: &str) -> Option<Self> {
        let op = match s {
            "==" | "eq" | "equals" => CompareOp::Eq,
            "!=" | "ne" | "not_equals" => CompareOp::Ne,
            ">" | "gt" | "greater_than" => CompareOp::Gt,
            ">=" | "gte" | "greater_than_or_equal" => CompareOp::Gte,
            "<" | "lt" | "less_than" => CompareOp::Lt,
            "<=" | "lte" | "less_than_or_equal" => CompareOp::Lte,
            "in" => CompareOp::In,
            _ => return None,
        };
        Some(op)
    }

    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::In => "in",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// a field value of a combination, or a literal in a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    /// model/year token decoded from JSON
    Record(serde_json::Map<String, JsonValue>),
    /// field nulled by a condition
    Null,
}

impl Value {
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => n
                .as_i64()
                .map(Value::Number)
                .unwrap_or_else(|| Value::Float(n.as_f64().unwrap_or(f64::NAN))),
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            JsonValue::Object(map) => Value::Record(map.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// numeric view; strings holding a number count, sheet cells are text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// key of a record value
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Record(map) => map.get(key).map(Value::from_json),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Record(map) => !map.is_empty(),
        }
    }

    /// plain worksheet text: strings unquoted, records as compact JSON, null empty
    pub fn to_cell_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Record(map) => JsonValue::Object(map.clone()).to_string(),
            Value::Null => String::new(),
            Value::List(items) => items
                .iter()
                .map(Value::to_cell_text)
                .collect::<Vec<_>>()
                .join(";"),
            other => other.to_string(),
        }
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(items) => {
                f.write_str("[")?;
                write_joined(f, items, ", ")?;
                f.write_str("]")
            }
            Value::Record(map) => write!(f, "{}", JsonValue::Object(map.clone())),
            Value::Null => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// field of the combination; dots descend into record values
    Field(String),
    Literal(Value),
}

impl Operand {
    pub fn field(name: impl Into<String>) -> Self {
        Operand::Field(name.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Operand::Literal(Value::String(s.into()))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(name) => f.write_str(name),
            Operand::Literal(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub left: Operand,
    pub op: CompareOp,
    pub right: Operand,
}

impl Comparison {
    pub fn new(left: Operand, op: CompareOp, right: Operand) -> Self {
        Self { left, op, right }
    }

    /// `field == "value"`
    pub fn field_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(Operand::field(field), CompareOp::Eq, Operand::string(value))
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// parsed condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// conjunction; empty is true
    All(Vec<Condition>),
    /// disjunction; empty is false
    Any(Vec<Condition>),
    Not(Box<Condition>),
    Compare(Comparison),
    /// bare operand such as `Sunroof`
    Truthy(Operand),
}

impl Condition {
    /// field names referenced anywhere in the tree, in first-seen order
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        fn push<'a>(operand: &'a Operand, out: &mut Vec<&'a str>) {
            if let Operand::Field(name) = operand {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
        }
        match self {
            Condition::All(v) | Condition::Any(v) => {
                for c in v {
                    c.collect_fields(out);
                }
            }
            Condition::Not(inner) => inner.collect_fields(out),
            Condition::Compare(c) => {
                push(&c.left, out);
                push(&c.right, out);
            }
            Condition::Truthy(o) => push(o, out),
        }
    }

    /// rewrite string literals that spell a known field name into field references
    ///
    /// sheets written for textual substitution quote the field name, as in
    /// `'Q1-Color' == 'Red'`
    pub fn bind_quoted_fields(self, names: &[String]) -> Self {
        let bind = |operand: Operand| match operand {
            Operand::Literal(Value::String(s)) if names.iter().any(|n| *n == s) => {
                Operand::Field(s)
            }
            other => other,
        };
        match self {
            Condition::All(v) => Condition::All(
                v.into_iter()
                    .map(|c| c.bind_quoted_fields(names))
                    .collect(),
            ),
            Condition::Any(v) => Condition::Any(
                v.into_iter()
                    .map(|c| c.bind_quoted_fields(names))
                    .collect(),
            ),
            Condition::Not(inner) => Condition::Not(Box::new(inner.bind_quoted_fields(names))),
            Condition::Compare(c) => Condition::Compare(Comparison {
                left: bind(c.left),
                op: c.op,
                right: bind(c.right),
            }),
            Condition::Truthy(o) => Condition::Truthy(bind(o)),
        }
    }
}

/// infix rendering with explicit parentheses around every group
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::All(v) => {
                f.write_str("(")?;
                write_joined(f, v, " and ")?;
                f.write_str(")")
            }
            Condition::Any(v) => {
                f.write_str("(")?;
                write_joined(f, v, " or ")?;
                f.write_str(")")
            }
            Condition::Not(inner) => write!(f, "not {}", inner),
            Condition::Compare(c) => write!(f, "{}", c),
            Condition::Truthy(o) => write!(f, "{}", o),
        }
    }
}
