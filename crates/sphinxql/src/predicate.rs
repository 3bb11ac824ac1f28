//! Filter and full-text predicates.
//!
//! Predicates are appended in declaration order. On render, full-text
//! predicates are pulled out into one `MATCH('...')` clause that leads the
//! `WHERE` clause; the remaining predicates follow it, joined by `AND` in the
//! order they were declared.

use crate::error::{QlError, QlResult};
use crate::escape::{MatchMode, escape_literal, escape_match_term, sanitize_field};
use crate::value::{FilterValue, Value};
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator of a filter predicate.
///
/// # Example
/// ```ignore
/// use sphinxql::CmpOp;
///
/// qb.filter("price", CmpOp::Gte, 100)?;
/// qb.filter("category_id", CmpOp::In, vec![1, 2, 3])?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// Equal: column = value (column IN (...) for a list)
    Eq,
    /// Not equal: column != value (column NOT IN (...) for a list)
    Ne,
    /// Greater than: column > value
    Gt,
    /// Less than: column < value
    Lt,
    /// Greater than or equal: column >= value
    Gte,
    /// Less than or equal: column <= value
    Lte,
    /// Set membership: column IN (values...)
    In,
}

impl CmpOp {
    /// The operator symbol.
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Gte => ">=",
            CmpOp::Lte => "<=",
            CmpOp::In => "IN",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single accumulated predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// field op value
    Comparison {
        field: String,
        op: CmpOp,
        value: Value,
    },
    /// field BETWEEN min AND max
    Between {
        field: String,
        min: Value,
        max: Value,
    },
    /// field IN (values...) or field NOT IN (values...)
    SetMembership {
        field: String,
        values: Vec<Value>,
        negated: bool,
    },
    /// Full-text terms; `field` is `None` to search every full-text field.
    Match {
        field: Option<String>,
        terms: Vec<String>,
        mode: MatchMode,
    },
}

impl Predicate {
    /// Check if this is a full-text predicate.
    pub fn is_match(&self) -> bool {
        matches!(self, Predicate::Match { .. })
    }

    /// Render this predicate's fragment (without any `AND` prefix).
    pub fn to_sql(&self) -> String {
        match self {
            Predicate::Comparison { field, op, value } => {
                format!("{field} {op} {}", escape_literal(value))
            }
            Predicate::Between { field, min, max } => format!(
                "{field} BETWEEN {} AND {}",
                escape_literal(min),
                escape_literal(max)
            ),
            Predicate::SetMembership {
                field,
                values,
                negated,
            } => {
                let list = values
                    .iter()
                    .map(escape_literal)
                    .collect::<Vec<_>>()
                    .join(", ");
                let op = if *negated { "NOT IN" } else { "IN" };
                format!("{field} {op} ({list})")
            }
            Predicate::Match { field, terms, mode } => {
                let terms = terms
                    .iter()
                    .map(|t| escape_match_term(t, *mode))
                    .collect::<Vec<_>>()
                    .join(" | ");
                match field {
                    Some(field) => format!("{field} {terms}"),
                    None => terms,
                }
            }
        }
    }
}

/// Append-only, ordered list of predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateList {
    items: Vec<Predicate>,
}

impl PredicateList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `field op value`.
    ///
    /// A list value turns the predicate into set membership: `IN` for `Eq`/`In`,
    /// `NOT IN` for `Ne`. Ordering operators cannot take a list.
    pub fn add_comparison(
        &mut self,
        field: &str,
        op: CmpOp,
        value: impl Into<FilterValue>,
    ) -> QlResult<()> {
        let field = sanitize_field(field)?;
        let predicate = match (op, value.into()) {
            (CmpOp::In, FilterValue::Scalar(v)) => Predicate::SetMembership {
                field,
                values: vec![v],
                negated: false,
            },
            (_, FilterValue::Scalar(value)) => Predicate::Comparison { field, op, value },
            (CmpOp::Eq | CmpOp::In | CmpOp::Ne, FilterValue::List(values)) => {
                if values.is_empty() {
                    return Err(QlError::empty_values(format!(
                        "{op} list for '{field}' is empty"
                    )));
                }
                Predicate::SetMembership {
                    field,
                    values,
                    negated: op == CmpOp::Ne,
                }
            }
            (_, FilterValue::List(_)) => {
                return Err(QlError::InvalidOperator {
                    field,
                    op: op.as_str(),
                });
            }
        };
        self.items.push(predicate);
        Ok(())
    }

    /// Add `field BETWEEN min AND max`; `min` must be strictly smaller than `max`.
    pub fn add_between(
        &mut self,
        field: &str,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> QlResult<()> {
        let field = sanitize_field(field)?;
        let (min, max) = (min.into(), max.into());
        if min.compare(&max) != Some(Ordering::Less) {
            return Err(QlError::InvalidRange {
                field,
                min: escape_literal(&min),
                max: escape_literal(&max),
            });
        }
        self.items.push(Predicate::Between { field, min, max });
        Ok(())
    }

    /// Add `field IN (values...)`; the list must not be empty.
    pub fn add_set_membership<I, V>(&mut self, field: &str, values: I) -> QlResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add_set(field, values, false)
    }

    /// Add `field NOT IN (values...)`; the list must not be empty.
    pub fn add_set_exclusion<I, V>(&mut self, field: &str, values: I) -> QlResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.add_set(field, values, true)
    }

    fn add_set<I, V>(&mut self, field: &str, values: I, negated: bool) -> QlResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let field = sanitize_field(field)?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(QlError::empty_values(format!(
                "IN list for '{field}' is empty"
            )));
        }
        self.items.push(Predicate::SetMembership {
            field,
            values,
            negated,
        });
        Ok(())
    }

    /// Add full-text terms on a field expression (`@title`, `@(title,body)`).
    ///
    /// Terms are OR-ed together.
    pub fn add_match<I, S>(&mut self, field: &str, terms: I, mode: MatchMode) -> QlResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let field = sanitize_field(field)?;
        self.push_match(Some(field), terms, mode)
    }

    /// Add full-text terms matched against every full-text field.
    pub fn add_match_all<I, S>(&mut self, terms: I, mode: MatchMode) -> QlResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_match(None, terms, mode)
    }

    fn push_match<I, S>(&mut self, field: Option<String>, terms: I, mode: MatchMode) -> QlResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        if terms.is_empty() {
            return Err(QlError::empty_values(format!(
                "no full-text terms for '{}'",
                field.as_deref().unwrap_or("*")
            )));
        }
        self.items.push(Predicate::Match { field, terms, mode });
        Ok(())
    }

    /// Number of predicates.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no predicates have been added.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.items.iter()
    }

    /// Remove every predicate.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Render the filter clause and the `MATCH(...)` clause separately.
    ///
    /// Returns `(where_clause, match_clause)`; either may be empty.
    pub fn render_parts(&self) -> (String, String) {
        let mut filters = String::new();
        let mut matches = String::new();

        for predicate in &self.items {
            let fragment = predicate.to_sql();
            if predicate.is_match() {
                if !matches.is_empty() {
                    matches.push(' ');
                }
                matches.push_str(&fragment);
            } else {
                if !filters.is_empty() {
                    filters.push_str(" AND ");
                }
                filters.push_str(&fragment);
            }
        }

        let match_clause = if matches.is_empty() {
            matches
        } else {
            format!("MATCH('{matches}')")
        };
        (filters, match_clause)
    }

    /// Render the full condition text that follows `WHERE`.
    ///
    /// The `MATCH(...)` clause comes first; filters follow it joined by `AND`.
    /// Returns an empty string when there are no predicates.
    pub fn render(&self) -> String {
        match self.render_parts() {
            (filters, m) if m.is_empty() => filters,
            (filters, m) if filters.is_empty() => m,
            (filters, m) => format!("{m} AND {filters}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_renders_escaped_literal() {
        let mut list = PredicateList::new();
        list.add_comparison("price", CmpOp::Gte, 100).unwrap();
        list.add_comparison("brand", CmpOp::Eq, "o'reilly").unwrap();
        assert_eq!(list.render(), r"price >= 100 AND brand = 'o\'reilly'");
    }

    #[test]
    fn between_renders_bounds() {
        let mut list = PredicateList::new();
        list.add_between("f", 10, 90).unwrap();
        assert_eq!(list.render(), "f BETWEEN 10 AND 90");
    }

    #[test]
    fn between_rejects_inverted_and_equal_bounds() {
        let mut list = PredicateList::new();
        let err = list.add_between("f", 90, 10).unwrap_err();
        assert!(matches!(
            err,
            QlError::InvalidRange { ref field, ref min, ref max }
                if field == "f" && min == "90" && max == "10"
        ));
        assert!(list.add_between("f", 5, 5).is_err());
        assert!(list.is_empty());
    }

    #[test]
    fn between_rejects_null_bound() {
        let mut list = PredicateList::new();
        assert!(list.add_between("f", Value::Null, 3).is_err());
    }

    #[test]
    fn list_value_becomes_set_membership() {
        let mut list = PredicateList::new();
        list.add_comparison("cat", CmpOp::Eq, vec![1, 2, 3]).unwrap();
        list.add_comparison("tag", CmpOp::Ne, vec!["a", "b"]).unwrap();
        list.add_comparison("id", CmpOp::In, 7).unwrap();
        assert_eq!(
            list.render(),
            "cat IN (1, 2, 3) AND tag NOT IN ('a', 'b') AND id IN (7)"
        );
    }

    #[test]
    fn list_value_with_ordering_operator_is_rejected() {
        let mut list = PredicateList::new();
        let err = list.add_comparison("price", CmpOp::Gt, vec![1, 2]).unwrap_err();
        assert!(matches!(err, QlError::InvalidOperator { op: ">", .. }));
    }

    #[test]
    fn empty_set_is_rejected() {
        let mut list = PredicateList::new();
        assert!(matches!(
            list.add_set_membership("id", Vec::<i64>::new()),
            Err(QlError::EmptyValues(_))
        ));
        assert!(matches!(
            list.add_comparison("id", CmpOp::In, Vec::<i64>::new()),
            Err(QlError::EmptyValues(_))
        ));
    }

    #[test]
    fn match_terms_are_or_joined_inside_one_clause() {
        let mut list = PredicateList::new();
        list.add_match("@title", ["foo", "bar"], MatchMode::Loose)
            .unwrap();
        assert_eq!(list.render(), r#"MATCH('@title "foo" | "bar"')"#);
    }

    #[test]
    fn multiple_matches_share_one_clause_and_lead_filters() {
        let mut list = PredicateList::new();
        list.add_comparison("price", CmpOp::Lt, 50).unwrap();
        list.add_match("@title", ["phone"], MatchMode::Exact).unwrap();
        list.add_set_membership("cat", [3, 4]).unwrap();
        list.add_match("@brand", ["acme"], MatchMode::Prefix).unwrap();

        let (filters, matches) = list.render_parts();
        assert_eq!(filters, "price < 50 AND cat IN (3, 4)");
        assert_eq!(matches, r#"MATCH('@title "^phone$" @brand "^acme"')"#);
        assert_eq!(
            list.render(),
            r#"MATCH('@title "^phone$" @brand "^acme"') AND price < 50 AND cat IN (3, 4)"#
        );
    }

    #[test]
    fn match_without_field() {
        let mut list = PredicateList::new();
        list.add_match_all(["hello world"], MatchMode::Loose).unwrap();
        assert_eq!(list.render(), r#"MATCH('"hello world"')"#);
    }

    #[test]
    fn match_requires_terms() {
        let mut list = PredicateList::new();
        let terms: Vec<String> = Vec::new();
        assert!(matches!(
            list.add_match("@title", terms, MatchMode::Loose),
            Err(QlError::EmptyValues(_))
        ));
    }

    #[test]
    fn field_names_are_sanitized() {
        let mut list = PredicateList::new();
        list.add_comparison("price; DROP", CmpOp::Eq, 1).unwrap();
        assert_eq!(list.render(), "priceDROP = 1");
        assert!(matches!(
            list.add_comparison("42", CmpOp::Eq, 1),
            Err(QlError::InvalidField(_))
        ));
    }

    #[test]
    fn empty_list_renders_nothing() {
        let list = PredicateList::new();
        assert_eq!(list.render_parts(), (String::new(), String::new()));
        assert_eq!(list.render(), "");
    }
}
