//! In-memory, read-only record tables loaded from CSV files.
//!
//! Loading is forgiving about data and strict about schema: a missing file
//! yields an empty table with a warning, malformed rows are skipped, and
//! unparseable values become `None`. A file that exists but lacks one of the
//! required columns is an error.

use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{DashboardError, Result};

/// Immutable table of typed records.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    rows: Vec<T>,
}

impl<T> Table<T> {
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<T>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> FromIterator<T> for Table<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_rows(iter.into_iter().collect())
    }
}

/// Source column name → canonical column name.
pub type RenameMap = &'static [(&'static str, &'static str)];

/// Trims header whitespace and applies the rename map.
pub fn normalize_headers(headers: &StringRecord, renames: RenameMap) -> StringRecord {
    headers
        .iter()
        .map(|h| {
            let trimmed = h.trim();
            renames
                .iter()
                .find(|(from, _)| *from == trimmed)
                .map(|(_, to)| *to)
                .unwrap_or(trimmed)
        })
        .collect()
}

/// Reads raw rows of type `R` from `path`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_rows<R: DeserializeOwned>(
    path: &Path,
    renames: RenameMap,
    required: &[&str],
) -> Result<Option<Vec<R>>> {
    if !path.exists() {
        warn!(path = %path.display(), "Dataset file not found, using an empty table");
        return Ok(None);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = normalize_headers(reader.headers()?, renames);
    if headers.is_empty() {
        warn!(path = %path.display(), "Dataset file has no header, using an empty table");
        return Ok(None);
    }
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(DashboardError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let parsed = result.and_then(|mut record| {
            // Short rows keep their leading fields; the missing tail reads as empty.
            while record.len() < headers.len() {
                record.push_field("");
            }
            record.deserialize::<R>(Some(&headers))
        });
        match parsed {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                debug!(path = %path.display(), error = %e, "Skipping malformed row");
            }
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "Skipped malformed rows");
    }

    Ok(Some(rows))
}

/// Loads a table, converting each raw row into its typed record.
///
/// `convert` may drop a row by returning `None`.
pub fn load_table<R, T, F>(
    path: &Path,
    renames: RenameMap,
    required: &[&str],
    convert: F,
) -> Result<Table<T>>
where
    R: DeserializeOwned,
    F: Fn(R) -> Option<T>,
{
    let Some(raw) = read_rows::<R>(path, renames, required)? else {
        return Ok(Table::empty());
    };

    let total = raw.len();
    let table: Table<T> = raw.into_iter().filter_map(convert).collect();
    let dropped = total - table.len();
    if dropped > 0 {
        warn!(path = %path.display(), dropped, "Dropped rows without usable values");
    }

    info!(path = %path.display(), rows = table.len(), "Loaded table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AqiRecord, CityDayRow};
    use std::io::Write;

    const RENAMES: RenameMap = &[("City", "city"), ("Date", "date"), ("AQI", "aqi")];

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn load_city_day(path: &Path) -> Result<Table<AqiRecord>> {
        load_table(path, RENAMES, &["city", "date", "aqi"], |r: CityDayRow| {
            Some(AqiRecord::from(r))
        })
    }

    #[test]
    fn test_normalize_headers_trims_and_renames() {
        let headers = StringRecord::from(vec![" City ", "Date", "PM2.5", "AQI "]);
        let normalized = normalize_headers(&headers, RENAMES);
        let names: Vec<&str> = normalized.iter().collect();
        assert_eq!(names, vec!["city", "date", "PM2.5", "aqi"]);
    }

    #[test]
    fn test_missing_file_gives_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_city_day(&dir.path().join("nope.csv")).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_load_with_rename_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "city_day.csv",
            "City , Date,PM2.5, AQI\n\
             Delhi,2020-01-01,120.5,400\n\
             Delhi,2020-01-02,,\n\
             Mumbai,garbage,33,NA\n",
        );

        let table = load_city_day(&path).unwrap();
        assert_eq!(table.len(), 3);

        let rows = table.rows();
        assert_eq!(rows[0].city, "Delhi");
        assert_eq!(rows[0].aqi, Some(400.0));
        assert_eq!(rows[1].aqi, None);
        assert!(rows[1].date.is_some());
        assert_eq!(rows[2].date, None);
        assert_eq!(rows[2].aqi, None);
    }

    #[test]
    fn test_missing_required_column_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "city_day.csv", "Town,Date,AQI\nDelhi,2020-01-01,1\n");

        let err = load_city_day(&path).unwrap_err();
        match err {
            DashboardError::MissingColumn { column, .. } => assert_eq!(column, "city"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_convert_can_drop_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "city_day.csv",
            "City,Date,AQI\nDelhi,2020-01-01,1\nPune,2020-01-01,\n",
        );

        let table: Table<AqiRecord> =
            load_table(&path, RENAMES, &["city"], |r: CityDayRow| {
                let record = AqiRecord::from(r);
                record.aqi.map(|_| record)
            })
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].city, "Delhi");
    }

    #[test]
    fn test_short_and_long_rows_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "city_day.csv",
            "City,Date,AQI,AQI_Bucket\n\
             Delhi,2020-01-01,300,Poor\n\
             Delhi,2020-01-02,250\n\
             Delhi,2020-01-03,200,Poor,extra\n",
        );

        let table = load_city_day(&path).unwrap();
        let values: Vec<Option<f64>> = table.iter().map(|r| r.aqi).collect();
        assert_eq!(values, vec![Some(300.0), Some(250.0), Some(200.0)]);
    }

    #[test]
    fn test_row_missing_required_field_reads_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "city_day.csv", "City,Date,AQI\nDelhi,2020-01-01\n");

        let table = load_city_day(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].aqi, None);
    }

    #[test]
    fn test_empty_file_gives_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "city_day.csv", "");

        assert!(load_city_day(&path).unwrap().is_empty());
    }

    #[test]
    fn test_table_from_iter() {
        let table: Table<u32> = (1..=3).collect();
        assert_eq!(table.rows(), &[1, 2, 3]);
        assert_eq!(table.iter().sum::<u32>(), 6);
    }
}
