//! Compiled statements and the declarations they are compiled from.

use crate::error::{QlError, QlResult};
use crate::row::Row;
use crate::shape::{Output, shape_rows};
use crate::transport::Transport;
use std::fmt;

/// The kind of statement a builder is assembling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Replace,
    Delete,
}

impl StatementKind {
    /// The leading keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Replace => "REPLACE",
            StatementKind::Delete => "DELETE",
        }
    }

    /// INSERT, REPLACE and DELETE report an affected-row count instead of rows.
    pub fn is_mutation(self) -> bool {
        !matches!(self, StatementKind::Select)
    }

    /// Detect the kind from statement text by its leading keyword.
    pub fn from_sql(sql: &str) -> Option<Self> {
        let trimmed = sql.trim_start();
        let word_end = trimmed
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let word = &trimmed[..word_end];
        [
            StatementKind::Select,
            StatementKind::Insert,
            StatementKind::Replace,
            StatementKind::Delete,
        ]
        .into_iter()
        .find(|kind| word.eq_ignore_ascii_case(kind.keyword()))
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// What a statement projects (SELECT) or writes (INSERT/REPLACE).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// A literal projection: `*` or a single raw expression.
    Projection(String),
    /// An ordered list of column names or expressions.
    Columns(Vec<String>),
}

impl FieldSpec {
    /// Parse a projection string.
    ///
    /// `*` and single expressions stay literal; a comma-separated list (commas
    /// inside parentheses do not count) becomes [`FieldSpec::Columns`].
    pub fn parse(fields: &str) -> Self {
        let fields = fields.trim();
        if fields == "*" {
            return FieldSpec::Projection(fields.to_string());
        }
        let parts = split_top_level(fields);
        if parts.len() > 1 {
            FieldSpec::Columns(parts)
        } else {
            FieldSpec::Projection(fields.to_string())
        }
    }

    /// Build a column list.
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        FieldSpec::Columns(
            columns
                .into_iter()
                .map(|c| c.as_ref().trim().to_string())
                .collect(),
        )
    }

    /// Check if nothing is projected, or any listed column is blank.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldSpec::Projection(p) => p.trim().is_empty(),
            FieldSpec::Columns(c) => c.is_empty() || c.iter().any(|s| s.trim().is_empty()),
        }
    }

    /// Number of declared columns (a literal projection counts as one).
    pub fn arity(&self) -> usize {
        match self {
            FieldSpec::Projection(_) => 1,
            FieldSpec::Columns(c) => c.len(),
        }
    }

    /// The declared names in order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            FieldSpec::Projection(p) => vec![p.as_str()],
            FieldSpec::Columns(c) => c.iter().map(String::as_str).collect(),
        }
    }

    /// Render the field list.
    pub fn to_sql(&self) -> String {
        match self {
            FieldSpec::Projection(p) => p.clone(),
            FieldSpec::Columns(c) => c.join(", "),
        }
    }
}

impl Default for FieldSpec {
    fn default() -> Self {
        FieldSpec::Columns(Vec::new())
    }
}

impl From<&str> for FieldSpec {
    fn from(fields: &str) -> Self {
        FieldSpec::parse(fields)
    }
}

impl From<String> for FieldSpec {
    fn from(fields: String) -> Self {
        FieldSpec::parse(&fields)
    }
}

impl From<Vec<&str>> for FieldSpec {
    fn from(columns: Vec<&str>) -> Self {
        FieldSpec::columns(columns)
    }
}

impl From<Vec<String>> for FieldSpec {
    fn from(columns: Vec<String>) -> Self {
        FieldSpec::columns(columns)
    }
}

impl From<&[&str]> for FieldSpec {
    fn from(columns: &[&str]) -> Self {
        FieldSpec::columns(columns)
    }
}

impl<const N: usize> From<[&str; N]> for FieldSpec {
    fn from(columns: [&str; N]) -> Self {
        FieldSpec::columns(columns)
    }
}

/// Split on commas that are not nested in parentheses.
fn split_top_level(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(s[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim().to_string());
    parts
}

/// The name a projected expression appears under in result rows.
///
/// `expr AS alias` (any case) yields `alias`; anything else is used verbatim.
pub(crate) fn output_name(expr: &str) -> String {
    let expr = expr.trim();
    let lower = expr.to_ascii_lowercase();
    match lower.rfind(" as ") {
        Some(pos) => expr[pos + 4..].trim().to_string(),
        None => expr.to_string(),
    }
}

/// How result rows are reshaped, decided when the statement is compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeHint {
    /// Full records, one per row.
    Records,
    /// One scalar per row, taken from the named column.
    Column(String),
    /// A key to value mapping built from two named columns.
    Pairs { key: String, value: String },
    /// An affected-row count (INSERT/REPLACE/DELETE).
    Affected,
}

impl ShapeHint {
    /// Derive the shape for a SELECT from its field declaration.
    pub fn for_select(fields: &FieldSpec, pairs: bool) -> Self {
        match fields {
            FieldSpec::Projection(p) if p.trim() == "*" => ShapeHint::Records,
            FieldSpec::Projection(p) => ShapeHint::Column(output_name(p)),
            FieldSpec::Columns(c) if c.len() == 1 && c[0].trim() == "*" => ShapeHint::Records,
            FieldSpec::Columns(c) if c.len() == 1 => ShapeHint::Column(output_name(&c[0])),
            FieldSpec::Columns(c) if c.len() == 2 && pairs => ShapeHint::Pairs {
                key: output_name(&c[0]),
                value: output_name(&c[1]),
            },
            FieldSpec::Columns(_) => ShapeHint::Records,
        }
    }
}

/// A compiled statement: final text plus the shape its result takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    kind: StatementKind,
    index: String,
    sql: String,
    shape: ShapeHint,
}

impl Statement {
    pub(crate) fn new(kind: StatementKind, index: String, sql: String, shape: ShapeHint) -> Self {
        Self {
            kind,
            index,
            sql,
            shape,
        }
    }

    /// The statement kind.
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// The target index.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// The statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The shape the result will take.
    pub fn shape(&self) -> &ShapeHint {
        &self.shape
    }

    /// Consume the statement, returning its text.
    pub fn into_sql(self) -> String {
        self.sql
    }

    /// Send the statement once and shape what comes back.
    ///
    /// Transport failures carry the statement text.
    pub fn run<T: Transport + ?Sized>(&self, transport: &T) -> QlResult<Output> {
        if self.kind.is_mutation() {
            let affected = transport
                .execute(&self.sql)
                .map_err(|e| QlError::transport(e.to_string(), &self.sql))?;
            return Ok(Output::Affected(affected));
        }

        let rows: Vec<Row> = transport
            .query(&self.sql)
            .map_err(|e| QlError::transport(e.to_string(), &self.sql))?;
        shape_rows(&self.shape, rows)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
