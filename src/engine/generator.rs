//! lazy cartesian product over property domains

use chrono::NaiveDate;

use super::combination::Combination;
use super::model::PropertyTable;
use super::pricing::compute_price;
use super::FieldRoles;
use crate::error::ComputationError;

/// odometer over index tuples; the last position advances fastest
#[derive(Debug, Clone)]
pub struct IndexProduct {
    sizes: Vec<usize>,
    next: Option<Vec<usize>>,
    remaining: Option<usize>,
}

impl IndexProduct {
    /// empty when there are no positions or any position has size zero
    pub fn new(sizes: Vec<usize>) -> Self {
        let degenerate = sizes.is_empty() || sizes.contains(&0);
        let remaining = if degenerate {
            Some(0)
        } else {
            sizes.iter().try_fold(1usize, |acc, s| acc.checked_mul(*s))
        };
        let next = (!degenerate).then(|| vec![0; sizes.len()]);

        Self {
            sizes,
            next,
            remaining,
        }
    }

    fn advance(&self, current: &[usize]) -> Option<Vec<usize>> {
        let mut following = current.to_vec();
        for pos in (0..following.len()).rev() {
            following[pos] += 1;
            if following[pos] < self.sizes[pos] {
                return Some(following);
            }
            following[pos] = 0;
        }
        None
    }
}

impl Iterator for IndexProduct {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.advance(&current);
        if let Some(r) = self.remaining.as_mut() {
            *r = r.saturating_sub(1);
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(r) => (r, Some(r)),
            None => (usize::MAX, None),
        }
    }
}

/// priced combinations of a property table, produced one at a time
///
/// each item is bound, nulled by the condition set, then priced. iteration
/// stops after the first pricing failure.
pub struct Combinations<'a> {
    table: &'a PropertyTable,
    roles: &'a FieldRoles,
    cursor: IndexProduct,
    rate: f64,
    today: NaiveDate,
    index: usize,
    failed: bool,
}

impl Iterator for Combinations<'_> {
    type Item = Result<Combination, ComputationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let tuple = self.cursor.next()?;
        let fields = self
            .table
            .domain
            .properties()
            .iter()
            .zip(tuple)
            .map(|(property, i)| (property.name.clone(), property.values[i].clone()))
            .collect();

        let mut combination = Combination::new(self.index, fields);
        self.index += 1;

        self.table.conditions.apply(&mut combination);

        match compute_price(&combination, self.rate, self.today, self.roles) {
            Ok(price) => {
                combination.set_price(price);
                Some(Ok(combination))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        // a failure can end iteration early, so only the upper bound is exact
        let (_, upper) = self.cursor.size_hint();
        (0, upper)
    }
}

/// generate every combination of the table's domains
///
/// properties nest in declaration order: the first property is the outermost
/// loop and the last varies fastest
pub fn generate<'a>(
    table: &'a PropertyTable,
    rate: f64,
    today: NaiveDate,
    roles: &'a FieldRoles,
) -> Combinations<'a> {
    let sizes = table
        .domain
        .properties()
        .iter()
        .map(|p| p.values.len())
        .collect();

    Combinations {
        table,
        roles,
        cursor: IndexProduct::new(sizes),
        rate,
        today,
        index: 0,
        failed: false,
    }
}
