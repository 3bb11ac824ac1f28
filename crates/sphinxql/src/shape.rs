//! Reshaping returned rows into the form the field declaration asked for.

use crate::error::{QlError, QlResult};
use crate::row::Row;
use crate::statement::ShapeHint;
use crate::value::Value;
use indexmap::IndexMap;

/// Key to value mapping produced by pairs shaping.
///
/// Keys are in first-seen row order; a repeated key keeps its position and takes
/// the later value.
pub type Pairs = IndexMap<String, Value>;

/// The shaped result of running a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Full records, one per row.
    Records(Vec<Row>),
    /// One scalar per row.
    Column(Vec<Value>),
    /// Key to value mapping.
    Pairs(Pairs),
    /// Affected-row count of a mutation.
    Affected(u64),
}

impl Output {
    /// Number of rows (or affected rows) represented.
    pub fn len(&self) -> usize {
        match self {
            Output::Records(rows) => rows.len(),
            Output::Column(values) => values.len(),
            Output::Pairs(pairs) => pairs.len(),
            Output::Affected(n) => usize::try_from(*n).unwrap_or(usize::MAX),
        }
    }

    /// Check if nothing came back.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the records, if this output holds records.
    pub fn into_records(self) -> Option<Vec<Row>> {
        match self {
            Output::Records(rows) => Some(rows),
            _ => None,
        }
    }

    /// Take the scalar column, if this output holds one.
    pub fn into_column(self) -> Option<Vec<Value>> {
        match self {
            Output::Column(values) => Some(values),
            _ => None,
        }
    }

    /// Take the key to value mapping, if this output holds one.
    pub fn into_pairs(self) -> Option<Pairs> {
        match self {
            Output::Pairs(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// The affected-row count, if this output came from a mutation.
    pub fn affected(&self) -> Option<u64> {
        match self {
            Output::Affected(n) => Some(*n),
            _ => None,
        }
    }
}

/// Shape rows in a single forward pass.
///
/// [`ShapeHint::Affected`] has no rows to shape and yields a count of zero.
pub fn shape_rows<I>(hint: &ShapeHint, rows: I) -> QlResult<Output>
where
    I: IntoIterator<Item = Row>,
{
    let rows = rows.into_iter();
    match hint {
        ShapeHint::Records => Ok(Output::Records(rows.collect())),
        ShapeHint::Column(column) => {
            let mut values = Vec::with_capacity(rows.size_hint().0);
            for mut row in rows {
                values.push(take_column(&mut row, column)?);
            }
            Ok(Output::Column(values))
        }
        ShapeHint::Pairs { key, value } => {
            let mut pairs = Pairs::with_capacity(rows.size_hint().0);
            for mut row in rows {
                let k = row.try_get(key)?.to_string();
                let v = take_column(&mut row, value)?;
                pairs.insert(k, v);
            }
            Ok(Output::Pairs(pairs))
        }
        ShapeHint::Affected => Ok(Output::Affected(0)),
    }
}

fn take_column(row: &mut Row, column: &str) -> QlResult<Value> {
    row.take(column).ok_or_else(|| QlError::MissingColumn {
        column: column.to_string(),
    })
}
