//! Schema inference from the first record of a source file.

use std::collections::HashSet;
use std::fmt;

use csv::StringRecord;
use csvsrc_model::{ColumnDescriptor, HeaderPolicy};
use tracing::debug;

use crate::decoder::SourceReader;
use crate::error::{IngestError, Result};

/// Why a record cannot serve as a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderViolation {
    /// The field at this 0-based index is empty.
    EmptyField { index: usize },
    /// The field at this 0-based index repeats an earlier field.
    DuplicateField { index: usize, name: String },
}

impl HeaderViolation {
    pub fn index(&self) -> usize {
        match self {
            Self::EmptyField { index } | Self::DuplicateField { index, .. } => *index,
        }
    }
}

impl fmt::Display for HeaderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField { index } => write!(f, "empty value in field {index}"),
            Self::DuplicateField { index, .. } => {
                write!(f, "duplicated value in field {index}")
            }
        }
    }
}

/// Outcome of applying a [`HeaderPolicy`] to a first record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDecision {
    /// The record supplies the column names.
    UseHeader,
    /// The record is data; column names are synthesized.
    SynthesizeNames,
}

/// Checks that no field is empty and no field repeats (exact, case-sensitive).
pub fn validate_header<S: AsRef<str>>(fields: &[S]) -> std::result::Result<(), HeaderViolation> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let field = field.as_ref();
        if field.is_empty() {
            return Err(HeaderViolation::EmptyField { index });
        }
        if !seen.insert(field) {
            return Err(HeaderViolation::DuplicateField {
                index,
                name: field.to_string(),
            });
        }
    }
    Ok(())
}

/// Decides how the first record is used under `policy`.
///
/// Only [`HeaderPolicy::On`] can fail.
pub fn resolve_header<S: AsRef<str>>(
    policy: HeaderPolicy,
    fields: &[S],
) -> std::result::Result<HeaderDecision, HeaderViolation> {
    match policy {
        HeaderPolicy::Off => Ok(HeaderDecision::SynthesizeNames),
        HeaderPolicy::On => validate_header(fields).map(|()| HeaderDecision::UseHeader),
        HeaderPolicy::Auto => Ok(match validate_header(fields) {
            Ok(()) => HeaderDecision::UseHeader,
            Err(_) => HeaderDecision::SynthesizeNames,
        }),
    }
}

/// Spreadsheet-style lower-case label for a 1-based column position.
///
/// 1 → `a`, 26 → `z`, 27 → `aa`, 55 → `bc`. Position 0 yields an empty string.
pub fn column_letters(position: usize) -> String {
    let mut letters = Vec::new();
    let mut n = position;
    while n > 0 {
        n -= 1;
        letters.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Columns and header usage inferred for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredSchema {
    pub columns: Vec<ColumnDescriptor>,
    /// True when the first record is a header and must be skipped on streaming.
    pub header_row: bool,
}

/// Builds column descriptors from a first record and a header decision.
pub fn build_columns<S: AsRef<str>>(
    fields: &[S],
    decision: HeaderDecision,
) -> Vec<ColumnDescriptor> {
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let name = match decision {
                HeaderDecision::UseHeader => field.as_ref().to_string(),
                HeaderDecision::SynthesizeNames => column_letters(index + 1),
            };
            ColumnDescriptor::text(name, index)
        })
        .collect()
}

/// Reads the first record of a freshly opened source and infers its schema.
///
/// Returns `Ok(None)` for an empty source: no table should be created.
pub fn infer_schema(
    reader: &mut SourceReader,
    policy: HeaderPolicy,
) -> Result<Option<InferredSchema>> {
    let mut record = StringRecord::new();
    let has_record = reader
        .read_record(&mut record)
        .map_err(|e| IngestError::HeaderParse {
            path: reader.path().to_path_buf(),
            source: e,
        })?;
    if !has_record {
        return Ok(None);
    }

    let fields: Vec<&str> = record.iter().collect();
    let decision =
        resolve_header(policy, &fields).map_err(|violation| IngestError::InvalidHeader {
            path: reader.path().to_path_buf(),
            violation,
        })?;
    debug!(
        path = %reader.path().display(),
        policy = %policy,
        ?decision,
        fields = fields.len(),
        "resolved header"
    );

    Ok(Some(InferredSchema {
        columns: build_columns(&fields, decision),
        header_row: decision == HeaderDecision::UseHeader,
    }))
}
