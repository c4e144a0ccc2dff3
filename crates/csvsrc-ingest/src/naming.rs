//! Table naming for resolved source files.

use std::collections::HashSet;
use std::path::Path;

use crate::decoder::GZIP_SUFFIX;

/// Join character between a parent-directory prefix and a base name.
const NAME_JOIN: char = '_';

/// Base table name: the file name without a gzip suffix and without its extension.
pub fn base_table_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let without_gz = file_name.strip_suffix(GZIP_SUFFIX).unwrap_or(&file_name);
    Path::new(without_gz)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Collapses runs of non-alphanumeric characters into a single join character.
fn sanitize_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut pending_join = false;
    for ch in segment.chars() {
        if ch.is_alphanumeric() {
            if pending_join && !out.is_empty() {
                out.push(NAME_JOIN);
            }
            pending_join = false;
            out.push(ch);
        } else {
            pending_join = true;
        }
    }
    out
}

fn parent_prefix(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|n| sanitize_segment(&n.to_string_lossy()))
        .unwrap_or_default()
}

/// Assigns a unique table name to each path, in order.
///
/// The first file with a given base name keeps it. Later files with the same
/// base name are prefixed with their sanitized parent directory name; if that
/// is still taken a numeric suffix is appended.
pub fn assign_table_names<I, P>(paths: I) -> Vec<String>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let base = base_table_name(path);

        let name = if taken.contains(&base) {
            let prefix = parent_prefix(path);
            let candidate = if prefix.is_empty() {
                base
            } else {
                format!("{prefix}{NAME_JOIN}{base}")
            };
            let mut name = candidate.clone();
            let mut n = 2;
            while taken.contains(&name) {
                name = format!("{candidate}{NAME_JOIN}{n}");
                n += 1;
            }
            name
        } else {
            base
        };

        taken.insert(name.clone());
        names.push(name);
    }

    names
}
