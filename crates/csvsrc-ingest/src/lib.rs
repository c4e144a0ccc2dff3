//! Table discovery and row streaming for delimited text files.
//!
//! This crate turns configured path globs into uniquely named tables whose
//! columns are inferred from each file's first record, and streams rows from
//! those tables on demand.
//!
//! # Features
//!
//! - **Path Resolution**: `~` expansion, recursive globs, deduplication
//! - **Table Naming**: collision-free names derived from file names
//! - **Decoding**: gzip, byte-order marks, configurable separator and comment
//! - **Schema Inference**: `auto`, `on` and `off` header policies
//! - **Row Streaming**: lazy, cancellable, skips malformed rows
//!
//! # Example
//!
//! ```ignore
//! use std::ops::ControlFlow;
//! use csvsrc_ingest::{CancelFlag, discover_tables};
//! use csvsrc_model::SourceConfig;
//!
//! let config = SourceConfig::with_paths(["~/data/**/*.csv"]);
//! let catalog = discover_tables(&config)?;
//!
//! let mut sink = |row| {
//!     println!("{row:?}");
//!     ControlFlow::Continue(())
//! };
//! catalog.stream("orders", &CancelFlag::new(), &mut sink)?;
//! ```

mod decoder;
mod discovery;
mod error;
mod naming;
mod paths;
mod schema;
mod stream;

// === Error Types ===
pub use error::{IngestError, Result};

// === Discovery ===
pub use discovery::{Catalog, TableFailure, discover_tables, load_table};
pub use naming::{assign_table_names, base_table_name};
pub use paths::{ResolvedFile, expand_home, is_glob_pattern, resolve_paths};

// === Decoding ===
pub use decoder::{
    ByteSource, DEFAULT_DELIMITER, DecoderOptions, GZIP_SUFFIX, SourceReader, detect_bom,
    is_gzip_path, open_source, skip_bom,
};

// === Schema ===
pub use schema::{
    HeaderDecision, HeaderViolation, InferredSchema, build_columns, column_letters,
    infer_schema, resolve_header, validate_header,
};

// === Streaming ===
pub use stream::{CancelFlag, RowSink, RowStream, StreamSummary, stream_rows};
