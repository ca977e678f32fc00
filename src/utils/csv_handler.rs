//! CSV 读写共享逻辑
//!
//! 提供统一的 CSV 读写功能，供抓取、数据表更新和 Web 下载使用

use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::errors::HeadcountError;

/// Read every row of a CSV file.
///
/// Unlike a lenient import, a bad row fails the whole read: these files are
/// the system of record and silently dropping rows would lose enrollments.
pub fn read_csv<T, P>(path: P) -> Result<Vec<T>, HeadcountError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        HeadcountError::file_operation(format!("Failed to open {}: {}", path.display(), e))
    })?;
    read_csv_from(BufReader::new(file)).map_err(|e| match e {
        HeadcountError::Csv(msg) => HeadcountError::csv(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Read rows from any reader.
pub fn read_csv_from<T, R>(reader: R) -> Result<Vec<T>, HeadcountError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (row_idx, result) in csv_reader.deserialize::<T>().enumerate() {
        // CSV 行号（1-based，跳过 header）
        let row_num = row_idx + 2;
        let row = result
            .map_err(|e| HeadcountError::csv(format!("Row {}: CSV parse error: {}", row_num, e)))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write rows to a CSV file, replacing it.
pub fn write_csv<T, P>(path: P, rows: &[T]) -> Result<(), HeadcountError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).map_err(|e| {
        HeadcountError::file_operation(format!("Failed to create {}: {}", path.display(), e))
    })?;
    write_csv_to(BufWriter::new(file), rows)
}

/// Write rows to any writer.
pub fn write_csv_to<T, W>(writer: W, rows: &[T]) -> Result<(), HeadcountError>
where
    T: Serialize,
    W: Write,
{
    let mut csv_writer = WriterBuilder::new().from_writer(writer);

    for row in rows {
        csv_writer.serialize(row).map_err(|e| {
            HeadcountError::serialization(format!("Failed to write CSV row: {}", e))
        })?;
    }

    csv_writer
        .flush()
        .map_err(|e| HeadcountError::file_operation(format!("Failed to flush CSV: {}", e)))?;

    Ok(())
}

/// Count data rows without deserializing them.
pub fn count_rows<P: AsRef<Path>>(path: P) -> Result<usize, HeadcountError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path.as_ref())?;
    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}
