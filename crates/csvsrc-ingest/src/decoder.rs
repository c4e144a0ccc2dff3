//! Decoder pipeline: file → optional gzip → byte-order mark → delimited records.
//!
//! Every call to [`open_source`] builds its own reader from a `Copy`
//! [`DecoderOptions`] value, so concurrent discovery and streaming share no
//! parser state.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use csvsrc_model::{SourceConfig, SourceEncoding};
use encoding_rs::{Decoder, Encoding, UTF_8, UTF_16BE, UTF_16LE};
use flate2::read::MultiGzDecoder;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// File suffix that triggers gzip decompression.
pub const GZIP_SUFFIX: &str = ".gz";

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Boxed byte source handed to the record parser.
pub type ByteSource = Box<dyn Read + Send>;

/// Returns true if the path names a gzip-compressed file.
pub fn is_gzip_path(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(GZIP_SUFFIX))
        .unwrap_or(false)
}

/// Per-invocation record parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    pub delimiter: u8,
    /// Lines starting with this byte are skipped; `None` disables comments.
    pub comment: Option<u8>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            comment: None,
        }
    }
}

impl DecoderOptions {
    /// Derives parser settings from the connection configuration.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let delimiter = match config.separator_char() {
            Some(ch) => single_byte("separator", ch)?,
            None => DEFAULT_DELIMITER,
        };
        let comment = config
            .comment_char()
            .map(|ch| single_byte("comment", ch))
            .transpose()?;
        Ok(Self { delimiter, comment })
    }
}

fn single_byte(option: &'static str, ch: char) -> Result<u8> {
    u8::try_from(ch)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| IngestError::UnsupportedDelimiter {
            option,
            value: ch.to_string(),
        })
}

/// Detects a byte-order mark at the start of `prefix`.
pub fn detect_bom(prefix: &[u8]) -> SourceEncoding {
    // UTF-32LE shares its first two bytes with UTF-16LE, so check it first.
    match prefix {
        [0xFF, 0xFE, 0x00, 0x00, ..] => return SourceEncoding::Utf32Le,
        [0x00, 0x00, 0xFE, 0xFF, ..] => return SourceEncoding::Utf32Be,
        _ => {}
    }
    match Encoding::for_bom(prefix) {
        Some((enc, _)) if enc == UTF_8 => SourceEncoding::Utf8,
        Some((enc, _)) if enc == UTF_16LE => SourceEncoding::Utf16Le,
        Some((enc, _)) if enc == UTF_16BE => SourceEncoding::Utf16Be,
        _ => SourceEncoding::Unknown,
    }
}

/// Reads up to `buf.len()` bytes, stopping early only at end of stream.
fn read_prefix<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Strips a leading byte-order mark and returns the remaining stream as UTF-8.
///
/// UTF-16 content is transcoded. UTF-32 content only loses its mark.
pub fn skip_bom<R>(mut reader: R) -> io::Result<(SourceEncoding, ByteSource)>
where
    R: Read + Send + 'static,
{
    let mut prefix = [0u8; 4];
    let n = read_prefix(&mut reader, &mut prefix)?;
    let encoding = detect_bom(&prefix[..n]);
    let rest = Cursor::new(prefix[encoding.bom_len()..n].to_vec()).chain(reader);

    let source: ByteSource = match encoding {
        SourceEncoding::Utf16Le => Box::new(Utf8Transcoder::new(rest, UTF_16LE)),
        SourceEncoding::Utf16Be => Box::new(Utf8Transcoder::new(rest, UTF_16BE)),
        _ => Box::new(rest),
    };
    Ok((encoding, source))
}

/// Streams bytes of a non-UTF-8 encoding out as UTF-8.
struct Utf8Transcoder<R> {
    inner: R,
    decoder: Decoder,
    input: Vec<u8>,
    in_start: usize,
    in_end: usize,
    output: Vec<u8>,
    out_start: usize,
    out_end: usize,
    eof: bool,
    finished: bool,
}

impl<R: Read> Utf8Transcoder<R> {
    const BUF_SIZE: usize = 8 * 1024;

    fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            decoder: encoding.new_decoder_without_bom_handling(),
            input: vec![0; Self::BUF_SIZE],
            in_start: 0,
            in_end: 0,
            // Worst case UTF-16 → UTF-8 expansion is 3 bytes per 2.
            output: vec![0; Self::BUF_SIZE * 2],
            out_start: 0,
            out_end: 0,
            eof: false,
            finished: false,
        }
    }
}

impl<R: Read> Read for Utf8Transcoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.out_start < self.out_end {
                let n = buf.len().min(self.out_end - self.out_start);
                buf[..n].copy_from_slice(&self.output[self.out_start..self.out_start + n]);
                self.out_start += n;
                return Ok(n);
            }
            if self.finished {
                return Ok(0);
            }
            if self.in_start == self.in_end && !self.eof {
                let n = self.inner.read(&mut self.input)?;
                self.in_start = 0;
                self.in_end = n;
                self.eof = n == 0;
            }

            let (result, read, written, _) = self.decoder.decode_to_utf8(
                &self.input[self.in_start..self.in_end],
                &mut self.output,
                self.eof,
            );
            self.in_start += read;
            self.out_start = 0;
            self.out_end = written;
            if self.eof
                && self.in_start == self.in_end
                && result == encoding_rs::CoderResult::InputEmpty
            {
                self.finished = true;
            }
        }
    }
}

/// A ready-to-read delimited record source for one file.
pub struct SourceReader {
    path: PathBuf,
    encoding: SourceEncoding,
    records: csv::Reader<ByteSource>,
}

impl std::fmt::Debug for SourceReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceReader")
            .field("path", &self.path)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl SourceReader {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encoding announced by the byte-order mark.
    pub fn encoding(&self) -> SourceEncoding {
        self.encoding
    }

    /// Reads the next record into `record`. Returns `Ok(false)` at end of stream.
    pub fn read_record(&mut self, record: &mut StringRecord) -> csv::Result<bool> {
        self.records.read_record(record)
    }
}

/// Opens a file as a delimited record source.
///
/// Gzip files (by suffix) are decompressed; a leading byte-order mark is
/// removed before any field is parsed. Ragged records are accepted.
pub fn open_source(path: &Path, options: DecoderOptions) -> Result<SourceReader> {
    let file = File::open(path).map_err(|e| IngestError::file_open(path, e))?;

    let read_error = |e: io::Error| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    };

    let (encoding, bytes) = if is_gzip_path(path) {
        // A zero-byte file has no gzip header; treat it like any empty file.
        if file.metadata().map_err(read_error)?.len() == 0 {
            skip_bom(io::empty()).map_err(read_error)?
        } else {
            skip_bom(MultiGzDecoder::new(file)).map_err(|e| IngestError::Decompression {
                path: path.to_path_buf(),
                source: e,
            })?
        }
    } else {
        skip_bom(file).map_err(read_error)?
    };

    debug!(path = %path.display(), detected_encoding = %encoding, "opened source");
    if matches!(encoding, SourceEncoding::Utf32Le | SourceEncoding::Utf32Be) {
        warn!(
            path = %path.display(),
            encoding = %encoding,
            "UTF-32 content is not transcoded; non-ASCII fields may fail to decode"
        );
    }

    let records = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .comment(options.comment)
        .from_reader(bytes);

    Ok(SourceReader {
        path: path.to_path_buf(),
        encoding,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn read_all(mut reader: SourceReader) -> Vec<Vec<String>> {
        let mut record = StringRecord::new();
        let mut rows = Vec::new();
        while reader.read_record(&mut record).unwrap() {
            rows.push(record.iter().map(str::to_string).collect());
        }
        rows
    }

    fn temp_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_detect_bom() {
        assert_eq!(detect_bom(b"\xEF\xBB\xBFa,b"), SourceEncoding::Utf8);
        assert_eq!(detect_bom(b"\xFF\xFEa\x00"), SourceEncoding::Utf16Le);
        assert_eq!(detect_bom(b"\xFE\xFF\x00a"), SourceEncoding::Utf16Be);
        assert_eq!(detect_bom(b"\xFF\xFE\x00\x00"), SourceEncoding::Utf32Le);
        assert_eq!(detect_bom(b"\x00\x00\xFE\xFF"), SourceEncoding::Utf32Be);
        assert_eq!(detect_bom(b"a,b"), SourceEncoding::Unknown);
        assert_eq!(detect_bom(b""), SourceEncoding::Unknown);
    }

    #[test]
    fn test_options_from_config() {
        let config = SourceConfig::with_paths(["*.csv"]);
        assert_eq!(
            DecoderOptions::from_config(&config).unwrap(),
            DecoderOptions::default()
        );

        let config = SourceConfig::with_paths(["*.csv"])
            .with_separator("|")
            .with_comment("#");
        let options = DecoderOptions::from_config(&config).unwrap();
        assert_eq!(options.delimiter, b'|');
        assert_eq!(options.comment, Some(b'#'));

        let config = SourceConfig::with_paths(["*.csv"]).with_separator("§");
        assert!(matches!(
            DecoderOptions::from_config(&config),
            Err(IngestError::UnsupportedDelimiter {
                option: "separator",
                ..
            })
        ));
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let file = temp_file(b"\xEF\xBB\xBFname,value\nx,1\n");
        let reader = open_source(file.path(), DecoderOptions::default()).unwrap();
        assert_eq!(reader.encoding(), SourceEncoding::Utf8);
        let rows = read_all(reader);
        assert_eq!(rows[0], vec!["name", "value"]);
    }

    #[test]
    fn test_utf16_is_transcoded() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "naïve,b\n1,2\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let file = temp_file(&bytes);
        let reader = open_source(file.path(), DecoderOptions::default()).unwrap();
        assert_eq!(reader.encoding(), SourceEncoding::Utf16Le);
        let rows = read_all(reader);
        assert_eq!(rows, vec![vec!["naïve", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_utf16be_is_transcoded() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "größe,b\n1,2\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        let file = temp_file(&bytes);
        let reader = open_source(file.path(), DecoderOptions::default()).unwrap();
        assert_eq!(reader.encoding(), SourceEncoding::Utf16Be);
        let rows = read_all(reader);
        assert_eq!(rows[0][0].as_bytes(), "größe".as_bytes());
        assert_eq!(rows, vec![vec!["größe", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_utf32_mark_is_stripped() {
        let file = temp_file(b"\xFF\xFE\x00\x00a,b\n");
        let reader = open_source(file.path(), DecoderOptions::default()).unwrap();
        assert_eq!(reader.encoding(), SourceEncoding::Utf32Le);
        let rows = read_all(reader);
        assert_eq!(rows[0][0].as_bytes(), b"a");

        let file = temp_file(b"\x00\x00\xFE\xFFx,y\n");
        let reader = open_source(file.path(), DecoderOptions::default()).unwrap();
        assert_eq!(reader.encoding(), SourceEncoding::Utf32Be);
        let rows = read_all(reader);
        assert_eq!(rows[0][0].as_bytes(), b"x");
    }

    #[test]
    fn test_zero_byte_gzip_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zero.csv.gz");
        std::fs::write(&path, b"").unwrap();

        let reader = open_source(&path, DecoderOptions::default()).unwrap();
        assert_eq!(reader.encoding(), SourceEncoding::Unknown);
        assert!(read_all(reader).is_empty());
    }

    #[test]
    fn test_separator_and_comment() {
        let file = temp_file(b"# generated\na;b\n1;2\n");
        let options = DecoderOptions {
            delimiter: b';',
            comment: Some(b'#'),
        };
        let rows = read_all(open_source(file.path(), options).unwrap());
        assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_comments_disabled_by_default() {
        let file = temp_file(b"#a,b\n1,2\n");
        let rows = read_all(open_source(file.path(), DecoderOptions::default()).unwrap());
        assert_eq!(rows[0], vec!["#a", "b"]);
    }

    #[test]
    fn test_ragged_records_are_accepted() {
        let file = temp_file(b"a,b,c\n1,2\n3,4,5,6\n");
        let rows = read_all(open_source(file.path(), DecoderOptions::default()).unwrap());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].len(), 2);
        assert_eq!(rows[2].len(), 4);
    }

    #[test]
    fn test_gzip_is_decompressed() {
        use flate2::Compression;
        use flate2::write::GzEncoder;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"\xEF\xBB\xBFa,b\n1,2\n").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let reader = open_source(&path, DecoderOptions::default()).unwrap();
        assert_eq!(reader.encoding(), SourceEncoding::Utf8);
        assert_eq!(read_all(reader), vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_invalid_gzip_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.csv.gz");
        std::fs::write(&path, b"this is not gzip data").unwrap();

        let result = open_source(&path, DecoderOptions::default());
        assert!(matches!(result, Err(IngestError::Decompression { .. })));
    }

    #[test]
    fn test_missing_file_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let result = open_source(&dir.path().join("missing.csv"), DecoderOptions::default());
        assert!(matches!(result, Err(IngestError::FileOpen { .. })));
    }
}
