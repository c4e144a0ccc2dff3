//! Lazy row streaming for one query execution.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use csv::StringRecord;
use csvsrc_model::{Row, TableDescriptor};
use tracing::{debug, debug_span, warn};

use crate::decoder::{DecoderOptions, SourceReader, open_source};
use crate::error::{IngestError, Result};

/// Shared cancellation signal, checked between records.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Consumer of streamed rows.
///
/// Returning [`ControlFlow::Break`] stops the stream after the current row.
pub trait RowSink {
    fn emit(&mut self, row: Row) -> ControlFlow<()>;
}

impl<F> RowSink for F
where
    F: FnMut(Row) -> ControlFlow<()>,
{
    fn emit(&mut self, row: Row) -> ControlFlow<()> {
        self(row)
    }
}

/// Counters reported at the end of one streaming call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Rows handed to the sink.
    pub emitted: usize,
    /// Malformed records that were skipped.
    pub skipped: usize,
    /// The cancel flag was observed before the source was exhausted.
    pub cancelled: bool,
    /// The sink asked to stop.
    pub stopped: bool,
}

/// Iterator over the rows of one table, backed by a freshly opened source.
///
/// Malformed records are logged and skipped. An I/O failure of the
/// underlying stream is yielded once as an error, after which the iterator
/// is exhausted.
pub struct RowStream {
    reader: SourceReader,
    columns: Vec<String>,
    record: StringRecord,
    skipped: usize,
    done: bool,
}

impl RowStream {
    /// Re-opens the table's source and consumes its header row if it has one.
    pub fn open(table: &TableDescriptor, options: DecoderOptions) -> Result<Self> {
        let mut reader = open_source(&table.path, options)?;
        let mut record = StringRecord::new();

        if table.header_row {
            let message = match reader.read_record(&mut record) {
                Ok(true) => None,
                Ok(false) => Some("unexpected end of file".to_string()),
                Err(e) => Some(e.to_string()),
            };
            if let Some(message) = message {
                warn!(
                    path = %table.path.display(),
                    error = %message,
                    "header parse error"
                );
                return Err(IngestError::HeaderReRead {
                    path: table.path.clone(),
                    message,
                });
            }
        }

        Ok(Self {
            reader,
            columns: table.columns.iter().map(|c| c.name.clone()).collect(),
            record,
            skipped: 0,
            done: false,
        })
    }

    /// Number of malformed records skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn build_row(&self) -> Row {
        // Shorter records leave trailing columns absent; extra fields are dropped.
        self.columns
            .iter()
            .zip(self.record.iter())
            .map(|(column, value)| (column.as_str(), value))
            .collect()
    }
}

impl Iterator for RowStream {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(true) => return Some(Ok(self.build_row())),
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) if e.is_io_error() => {
                    self.done = true;
                    return Some(Err(IngestError::StreamRead {
                        path: self.reader.path().to_path_buf(),
                        source: e,
                    }));
                }
                Err(e) => {
                    self.skipped += 1;
                    warn!(
                        path = %self.reader.path().display(),
                        line = e.position().map(csv::Position::line),
                        error = %e,
                        "record parse error; skipping row"
                    );
                }
            }
        }
    }
}

/// Streams every row of `table` into `sink`.
///
/// Cancellation is checked before each record; rows already delivered stay
/// delivered. Only opening the source and re-reading the header are fatal.
pub fn stream_rows<S>(
    table: &TableDescriptor,
    options: DecoderOptions,
    cancel: &CancelFlag,
    sink: &mut S,
) -> Result<StreamSummary>
where
    S: RowSink + ?Sized,
{
    let span = debug_span!("stream", table = %table.name);
    let _guard = span.enter();

    let mut rows = RowStream::open(table, options)?;
    let mut summary = StreamSummary::default();

    loop {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }
        let Some(row) = rows.next() else {
            break;
        };
        let row = row?;
        summary.emitted += 1;
        if sink.emit(row).is_break() {
            summary.stopped = true;
            break;
        }
    }

    summary.skipped = rows.skipped();
    debug!(
        emitted = summary.emitted,
        skipped = summary.skipped,
        cancelled = summary.cancelled,
        stopped = summary.stopped,
        "stream finished"
    );
    Ok(summary)
}
