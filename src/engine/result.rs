//! column-oriented accumulation of generated combinations

use super::combination::Combination;
use crate::conditions::Value;
use crate::error::ComputationError;

/// data rows a single xlsx worksheet holds below its header
pub const MAX_RESULT_ROWS: usize = 1_048_575;

/// one value sequence per column; index `i` across all columns is the
/// `i`-th combination. columns always have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    values: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self::with_capacity(columns, 0)
    }

    /// pre-size every column for `rows` combinations
    pub fn with_capacity(columns: Vec<String>, rows: usize) -> Self {
        let values = columns.iter().map(|_| Vec::with_capacity(rows)).collect();
        Self { columns, values }
    }

    /// transpose combinations into columns, preserving generation order
    ///
    /// stops at the first failed combination so no column is ever left
    /// partially filled
    pub fn assemble<I>(combinations: I, columns: Vec<String>) -> Result<Self, ComputationError>
    where
        I: IntoIterator<Item = Result<Combination, ComputationError>>,
    {
        let combinations = combinations.into_iter();
        let capacity = combinations
            .size_hint()
            .1
            .unwrap_or(0)
            .min(MAX_RESULT_ROWS);

        let mut table = Self::with_capacity(columns, capacity);
        for combination in combinations {
            table.push(&combination?);
        }

        Ok(table)
    }

    /// append one combination; absent columns are recorded as null
    pub fn push(&mut self, combination: &Combination) {
        for (column, values) in self.columns.iter().zip(self.values.iter_mut()) {
            values.push(combination.column_value(column).unwrap_or(Value::Null));
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.values.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// values of row `index` in column order
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.values.iter().map(|column| &column[index]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count()).filter_map(move |i| self.row(i))
    }
}
