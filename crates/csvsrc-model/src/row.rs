//! Decoded rows and field accessor escaping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Escapes a column name for use as a field accessor key.
///
/// Accessor paths treat `.` as a separator, so literal dots (and the escape
/// character itself) are backslash-escaped.
pub fn escape_property_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch == '\\' || ch == '.' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Reverses [`escape_property_name`].
pub fn unescape_property_name(accessor: &str) -> String {
    let mut name = String::with_capacity(accessor.len());
    let mut chars = accessor.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                name.push(next);
                continue;
            }
        }
        name.push(ch);
    }
    name
}

/// One decoded record, keyed by column name.
///
/// Every value is text. A column missing from the map had no value in the
/// record (ragged row); it is never padded with an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: BTreeMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    /// Value for a column by its exposed name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Value for a column by its escaped accessor key.
    pub fn field(&self, accessor: &str) -> Option<&str> {
        self.get(&unescape_property_name(accessor))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.values
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_dots_and_backslashes() {
        assert_eq!(escape_property_name("plain"), "plain");
        assert_eq!(escape_property_name("a.b"), "a\\.b");
        assert_eq!(escape_property_name("c:\\tmp"), "c:\\\\tmp");
    }

    #[test]
    fn unescape_inverts_escape() {
        for name in ["a.b.c", "x\\y", "trailing.", ""] {
            assert_eq!(unescape_property_name(&escape_property_name(name)), name);
        }
    }

    #[test]
    fn field_resolves_escaped_accessor() {
        let row: Row = [("price.usd", "10"), ("name", "widget")]
            .into_iter()
            .collect();
        assert_eq!(row.field("price\\.usd"), Some("10"));
        assert_eq!(row.field("name"), Some("widget"));
        assert_eq!(row.get("price.usd"), Some("10"));
        assert_eq!(row.field("missing"), None);
    }
}
