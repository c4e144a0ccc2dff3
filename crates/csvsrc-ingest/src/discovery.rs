//! Table discovery: configuration → named, schema-typed tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use csvsrc_model::{FailurePolicy, HeaderPolicy, SourceConfig, TableDescriptor};
use tracing::{error, info, info_span, warn};

use crate::decoder::{DecoderOptions, open_source};
use crate::error::{IngestError, Result};
use crate::naming::assign_table_names;
use crate::paths::{ResolvedFile, resolve_paths};
use crate::schema::infer_schema;
use crate::stream::{CancelFlag, RowSink, RowStream, StreamSummary, stream_rows};

/// A file that could not be turned into a table.
#[derive(Debug)]
pub struct TableFailure {
    /// Name the table would have had.
    pub name: String,
    pub path: PathBuf,
    pub error: IngestError,
}

/// The published result of one discovery pass.
///
/// Read-only once built; safe to share across concurrent streaming calls.
#[derive(Debug)]
pub struct Catalog {
    options: DecoderOptions,
    tables: BTreeMap<String, TableDescriptor>,
    /// Files omitted because they contain no records.
    pub skipped_empty: Vec<PathBuf>,
    /// Files omitted because discovery failed (only under [`FailurePolicy::Skip`]).
    pub failures: Vec<TableFailure>,
}

impl Catalog {
    pub fn tables(&self) -> &BTreeMap<String, TableDescriptor> {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Parser settings every stream of this catalog uses.
    pub fn options(&self) -> DecoderOptions {
        self.options
    }

    fn require(&self, name: &str) -> Result<&TableDescriptor> {
        self.table(name).ok_or_else(|| IngestError::UnknownTable {
            name: name.to_string(),
        })
    }

    /// Opens a lazy row iterator over one table.
    pub fn rows(&self, name: &str) -> Result<RowStream> {
        RowStream::open(self.require(name)?, self.options)
    }

    /// Streams one table into `sink`; see [`stream_rows`].
    pub fn stream<S>(&self, name: &str, cancel: &CancelFlag, sink: &mut S) -> Result<StreamSummary>
    where
        S: RowSink + ?Sized,
    {
        stream_rows(self.require(name)?, self.options, cancel, sink)
    }
}

/// Builds the descriptor for one named file, or `None` if the file is empty.
pub fn load_table(
    name: &str,
    path: &Path,
    policy: HeaderPolicy,
    options: DecoderOptions,
) -> Result<Option<TableDescriptor>> {
    let mut reader = open_source(path, options)?;
    let Some(schema) = infer_schema(&mut reader, policy)? else {
        return Ok(None);
    };
    Ok(Some(
        TableDescriptor::new(name, path, schema.columns, schema.header_row)
            .with_encoding(reader.encoding()),
    ))
}

/// Runs a full discovery pass for a connection.
///
/// Configuration errors fail the whole pass. Per-file errors either omit the
/// table or abort, depending on `config.on_error`. Empty files are omitted.
pub fn discover_tables(config: &SourceConfig) -> Result<Catalog> {
    let span = info_span!("discover", patterns = config.paths.len());
    let _guard = span.enter();

    let options = DecoderOptions::from_config(config)?;
    let files = resolve_paths(&config.paths)?;
    let names = assign_table_names(files.iter().map(|f| f.path.as_path()));

    let mut catalog = Catalog {
        options,
        tables: BTreeMap::new(),
        skipped_empty: Vec::new(),
        failures: Vec::new(),
    };

    for (name, ResolvedFile { path, exact }) in names.into_iter().zip(files) {
        match load_table(&name, &path, config.header, options) {
            Ok(Some(table)) => {
                catalog.tables.insert(name, table);
            }
            Ok(None) => {
                info!(path = %path.display(), table = %name, "empty file; no table created");
                catalog.skipped_empty.push(path);
            }
            Err(e) => match config.on_error {
                FailurePolicy::Abort => {
                    error!(
                        path = %path.display(),
                        table = %name,
                        exact,
                        error = %e,
                        "create table error"
                    );
                    return Err(e);
                }
                FailurePolicy::Skip => {
                    warn!(
                        path = %path.display(),
                        table = %name,
                        exact,
                        error = %e,
                        "create table error; table skipped"
                    );
                    catalog.failures.push(TableFailure {
                        name,
                        path,
                        error: e,
                    });
                }
            },
        }
    }

    if !catalog.failures.is_empty() {
        warn!(failed = catalog.failures.len(), "some files were not loaded");
    }
    info!(
        tables = catalog.tables.len(),
        empty = catalog.skipped_empty.len(),
        failed = catalog.failures.len(),
        "discovery complete"
    );
    Ok(catalog)
}
