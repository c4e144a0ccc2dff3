//! Data model for delimited-file table sources.
//!
//! These types are shared between the discovery/decoding engine
//! (`csvsrc-ingest`) and whatever host drives it. Nothing here performs I/O.
//!
//! - [`SourceConfig`]: the resolved connection configuration
//! - [`TableDescriptor`] / [`ColumnDescriptor`]: one discovered table and its columns
//! - [`Row`]: one decoded record keyed by column name

pub mod config;
pub mod error;
pub mod row;
pub mod table;

pub use config::{FailurePolicy, HeaderPolicy, SourceConfig};
pub use error::{ModelError, Result};
pub use row::{Row, escape_property_name, unescape_property_name};
pub use table::{ColumnDescriptor, ColumnType, SourceEncoding, TableDescriptor};
