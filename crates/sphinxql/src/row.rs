//! Result rows.

use crate::error::{QlError, QlResult};
use crate::value::Value;
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One result row: column names and values in the order the daemon sent them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column (builder style).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Append a column.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a column by name.
    ///
    /// Names are matched exactly first, then case-insensitively.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.position(column).map(|i| &self.columns[i].1)
    }

    /// Remove a column and return its value.
    pub fn take(&mut self, column: &str) -> Option<Value> {
        self.position(column)
            .map(|i| std::mem::replace(&mut self.columns[i].1, Value::Null))
    }

    /// Look up a column, failing with [`QlError::MissingColumn`].
    pub fn try_get(&self, column: &str) -> QlResult<&Value> {
        self.get(column).ok_or_else(|| QlError::MissingColumn {
            column: column.to_string(),
        })
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Map this row onto a deserializable type.
    ///
    /// Columns become struct fields by name.
    pub fn deserialize<T: DeserializeOwned>(&self) -> QlResult<T> {
        let json = serde_json::to_value(self)?;
        Ok(serde_json::from_value(json)?)
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|(name, _)| name == column)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|(name, _)| name.eq_ignore_ascii_case(column))
            })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn get_is_exact_then_case_insensitive() {
        let row = Row::new().with("id", 1).with("Title", "x");
        assert_eq!(row.get("id"), Some(&Value::Int(1)));
        assert_eq!(row.get("title"), Some(&Value::from("x")));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn take_leaves_null_behind() {
        let mut row = Row::new().with("id", 7);
        assert_eq!(row.take("id"), Some(Value::Int(7)));
        assert_eq!(row.get("id"), Some(&Value::Null));
    }

    #[test]
    fn try_get_reports_missing_column() {
        let row = Row::new();
        let err = row.try_get("weight").unwrap_err();
        assert!(matches!(err, QlError::MissingColumn { ref column } if column == "weight"));
    }

    #[test]
    fn serializes_as_ordered_map() {
        let row: Row = [("id", Value::Int(3)), ("title", Value::from("doc"))]
            .into_iter()
            .collect();
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"id":3,"title":"doc"}"#
        );
    }

    #[test]
    fn deserialize_into_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Doc {
            id: i64,
            title: String,
            weight: Option<i64>,
        }

        let row = Row::new().with("id", 3).with("title", "doc").with("weight", 1500);
        let doc: Doc = row.deserialize().unwrap();
        assert_eq!(
            doc,
            Doc {
                id: 3,
                title: "doc".into(),
                weight: Some(1500)
            }
        );
    }

    #[test]
    fn deserialize_type_mismatch_is_decode_error() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Doc {
            id: i64,
        }

        let row = Row::new().with("id", "not a number");
        assert!(matches!(row.deserialize::<Doc>(), Err(QlError::Decode(_))));
    }
}
