//! Grouping, ordering and pagination options of a SELECT.

use crate::config::BuilderDefaults;
use std::fmt;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parse `asc`/`desc` in any case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            d if d.eq_ignore_ascii_case("asc") => Some(Direction::Asc),
            d if d.eq_ignore_ascii_case("desc") => Some(Direction::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-statement options. Reset to the builder defaults after every compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// GROUP BY column
    pub group_by: Option<String>,
    /// ORDER BY column and direction
    pub order_by: Option<(String, Direction)>,
    /// LIMIT offset
    pub offset: u64,
    /// LIMIT row count
    pub limit: u64,
    /// OPTION max_matches
    pub max_matches: u64,
    /// Shape a two-column result as key to value pairs
    pub pairs: bool,
}

impl QueryOptions {
    /// Options holding the given defaults and nothing else.
    pub fn from_defaults(defaults: &BuilderDefaults) -> Self {
        Self {
            group_by: None,
            order_by: None,
            offset: defaults.offset,
            limit: defaults.limit,
            max_matches: defaults.max_matches,
            pairs: false,
        }
    }

    /// Render the optional ` GROUP BY ...` and ` ORDER BY ...` fragments.
    ///
    /// Unset options render nothing; the result has a leading space when non-empty.
    pub fn group_order_sql(&self) -> String {
        let mut sql = String::new();
        if let Some(group) = &self.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(group);
        }
        if let Some((column, direction)) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(column);
            sql.push(' ');
            sql.push_str(direction.as_str());
        }
        sql
    }

    /// Render ` LIMIT offset, limit OPTION max_matches=n`.
    pub fn limit_sql(&self) -> String {
        format!(
            " LIMIT {}, {} OPTION max_matches={}",
            self.offset, self.limit, self.max_matches
        )
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::from_defaults(&BuilderDefaults::default())
    }
}
