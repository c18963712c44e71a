//! condition evaluation system for property exclusion rules
//!
//! provides a small, safe expression language supporting:
//! - logical operators: and / && (AND), or / || (OR), not / ! (NOT)
//! - comparison operators: ==, !=, >, >=, <, <= (multiple forms)
//! - set operators: in, not in
//! - field references bound to the values of the current combination
//!
//! conditions are parsed once into an AST and evaluated per combination;
//! nothing is ever executed as code.

mod eval;
mod parser;
mod types;

pub use eval::{compare, evaluate, resolve, FieldLookup};
pub use parser::{parse_condition, ParseError, MAX_NESTING};
pub use types::{CompareOp, Comparison, Condition, Operand, Value};
