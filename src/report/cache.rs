//! Downloadable CSV snapshots of viewed reports

use std::path::Path;

use tracing::debug;
use xxhash_rust::xxh64::xxh64;

use crate::errors::Result;
use crate::model::CourseRow;
use crate::utils::csv_handler;

/// File name for a view: the request path segments, a hash of the raw path
/// and the mean update time, e.g. `/phys/20263` ->
/// `phys-20263-<16 hex digits>-1756700000.csv`.
///
/// Characters outside `[A-Za-z0-9_.-]` become `_` so the name is always a
/// single path component. Dot runs are collapsed so downloads accept it.
/// The hash keeps paths that sanitize alike (`/a b` and `/a_b`) apart.
pub fn cache_file_name(path: &str, mean_timestamp: i64) -> String {
    let rel = path.strip_prefix('/').unwrap_or(path);
    let mut parts: Vec<String> = rel
        .split('/')
        .map(|p| {
            p.chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect()
        })
        .collect();
    parts.push(format!("{:016x}", xxh64(path.as_bytes(), 0)));
    parts.push(mean_timestamp.to_string());
    let mut stem = parts.join("-");
    while stem.contains("..") {
        stem = stem.replace("..", ".");
    }
    if stem.starts_with('.') {
        stem.replace_range(..1, "_");
    }
    format!("{}.csv", stem)
}

/// Write the view unless a file with the same name already exists.
pub fn write_cached_view<P: AsRef<Path>>(
    cache_dir: P,
    path: &str,
    mean_timestamp: i64,
    rows: &[&CourseRow],
) -> Result<String> {
    let name = cache_file_name(path, mean_timestamp);
    let file = cache_dir.as_ref().join(&name);
    if file.is_file() {
        debug!("Cached view {} already exists", name);
    } else {
        csv_handler::write_csv(&file, rows)?;
        debug!("Cached view written to {}", file.display());
    }
    Ok(name)
}
