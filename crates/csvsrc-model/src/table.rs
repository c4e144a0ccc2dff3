//! Table and column descriptors produced by discovery.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::row::escape_property_name;

/// Declared column type. Values are never type-inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
}

impl ColumnType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text encoding announced by a file's byte-order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceEncoding {
    /// No byte-order mark; treated as UTF-8.
    #[default]
    Unknown,
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

impl SourceEncoding {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Utf8 => "UTF-8",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf32Le => "UTF-32LE",
            Self::Utf32Be => "UTF-32BE",
        }
    }

    /// Length of the byte-order mark for this encoding.
    pub const fn bom_len(&self) -> usize {
        match self {
            Self::Unknown => 0,
            Self::Utf8 => 3,
            Self::Utf16Le | Self::Utf16Be => 2,
            Self::Utf32Le | Self::Utf32Be => 4,
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a discovered table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name as exposed to consumers.
    pub name: String,
    /// Escaped form of `name` used as a row field accessor.
    pub accessor: String,
    pub column_type: ColumnType,
    /// 0-based position in the record.
    pub index: usize,
    pub description: String,
}

impl ColumnDescriptor {
    /// Creates a text column at the given 0-based position.
    pub fn text(name: impl Into<String>, index: usize) -> Self {
        let name = name.into();
        Self {
            accessor: escape_property_name(&name),
            name,
            column_type: ColumnType::Text,
            index,
            description: format!("Field {index}."),
        }
    }
}

/// A table discovered from one source file.
///
/// Immutable once built; recomputed on every discovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Unique within one discovery pass.
    pub name: String,
    pub path: PathBuf,
    pub description: String,
    pub columns: Vec<ColumnDescriptor>,
    /// Whether the first record holds column names (and is skipped when streaming).
    pub header_row: bool,
    pub encoding: SourceEncoding,
}

impl TableDescriptor {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        columns: Vec<ColumnDescriptor>,
        header_row: bool,
    ) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            description: format!("CSV file at {}", path.display()),
            path,
            columns,
            header_row,
            encoding: SourceEncoding::Unknown,
        }
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: SourceEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Column names in positional order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Looks up a column by its exposed name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_column_describes_its_position() {
        let column = ColumnDescriptor::text("first.name", 2);
        assert_eq!(column.description, "Field 2.");
        assert_eq!(column.column_type, ColumnType::Text);
        assert_eq!(column.accessor, "first\\.name");
    }

    #[test]
    fn table_description_names_the_file() {
        let table = TableDescriptor::new("data", "/tmp/data.csv", vec![], true);
        assert_eq!(table.description, "CSV file at /tmp/data.csv");
        assert_eq!(table.encoding, SourceEncoding::Unknown);
    }

    #[test]
    fn bom_lengths() {
        assert_eq!(SourceEncoding::Utf8.bom_len(), 3);
        assert_eq!(SourceEncoding::Utf16Be.bom_len(), 2);
        assert_eq!(SourceEncoding::Utf32Le.bom_len(), 4);
        assert_eq!(SourceEncoding::Unknown.bom_len(), 0);
    }
}
