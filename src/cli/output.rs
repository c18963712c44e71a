//! command output: text for terminals, JSON-RPC 2.0 envelopes for scripts
//!
//! ```text
//! {"jsonrpc":"2.0","result":{...},"id":null}
//! {"jsonrpc":"2.0","error":{"code":-32003,"message":"...","data":{"causes":[...]}},"id":null}
//! ```

use serde::Serialize;
use std::io::IsTerminal;

use crate::conditions::Value;
use crate::engine::Combination;

const JSONRPC_VERSION: &str = "2.0";

/// application errors live in -32000..-32099; the exit code is the offset
const APPLICATION_ERROR_BASE: i32 = -32000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
    /// nothing on stdout unless something fails
    Quiet,
}

impl OutputMode {
    /// quiet beats json beats no-json; without flags a piped stdout gets JSON
    pub fn from_flags(json: bool, no_json: bool, quiet: bool) -> Self {
        match (quiet, json, no_json) {
            (true, _, _) => Self::Quiet,
            (_, true, _) => Self::Json,
            (_, _, true) => Self::Text,
            _ if std::io::stdout().is_terminal() => Self::Text,
            _ => Self::Json,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }
}

#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// always null, the CLI answers no request
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

#[derive(Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub error: RpcError,
    pub id: Option<String>,
}

#[derive(Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

#[derive(Serialize)]
pub struct ErrorData {
    /// underlying errors, outermost first
    pub causes: Vec<String>,
}

impl JsonRpcError {
    pub fn new(exit_code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(exit_code),
                message: message.into(),
                data: None,
            },
            id: None,
        }
    }

    pub fn with_causes(exit_code: i32, message: impl Into<String>, causes: Vec<String>) -> Self {
        let mut error = Self::new(exit_code, message);
        if !causes.is_empty() {
            error.error.data = Some(ErrorData { causes });
        }
        error
    }
}

fn to_jsonrpc_code(exit_code: i32) -> i32 {
    APPLICATION_ERROR_BASE - exit_code
}

pub fn print_json<T: Serialize>(data: &T) {
    if let Ok(json) = serde_json::to_string(&JsonRpcResponse::new(data)) {
        println!("{}", json);
    }
}

pub fn print_json_error(exit_code: i32, message: &str, causes: Vec<String>) {
    if let Ok(json) = serde_json::to_string(&JsonRpcError::with_causes(exit_code, message, causes)) {
        println!("{}", json);
    }
}

/// render combinations as an aligned text table, one line per combination
pub fn format_table(columns: &[String], combinations: &[Combination]) -> String {
    let rows: Vec<Vec<String>> = combinations
        .iter()
        .map(|c| {
            columns
                .iter()
                .map(|col| cell(c.column_value(col).as_ref()))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(col.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, columns.iter().map(String::as_str), &widths);
    for row in &rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::Float(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Some(v) => v.to_cell_text(),
    }
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
