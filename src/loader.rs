//! Raw sample loading.
//!
//! The ingestion store is an external collaborator; this module only needs an
//! "all samples for a device" read. [`SampleSource`] abstracts over that read
//! and [`load_samples`] enforces the ordering contract the rest of the
//! pipeline relies on.
//!
//! # Sources
//!
//! - `Vec<Sample>` / `[Sample]`: in-memory samples (tests, embedding)
//! - [`CsvSampleSource`]: CSV export of the accelerometer table with columns
//!   `x, y, z, timestamp` (or the store's `x_value, y_value, z_value, timestamp`)
//! - [`SqliteSampleSource`]: the ingestion store itself (`accelerometer` table)

use crate::error::{DatasetError, Result};
use chrono::{DateTime, NaiveDateTime};
use rusqlite::{params, Connection, OpenFlags};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A single triaxial accelerometer reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Reading time (naive, as recorded by the device)
    pub timestamp: NaiveDateTime,
    /// X-axis acceleration (m/s²)
    pub x: f64,
    /// Y-axis acceleration (m/s²)
    pub y: f64,
    /// Z-axis acceleration (m/s²)
    pub z: f64,
}

impl Sample {
    /// Create a new sample.
    pub fn new(timestamp: NaiveDateTime, x: f64, y: f64, z: f64) -> Self {
        Self { timestamp, x, y, z }
    }

    /// Timestamp as nanoseconds since the Unix epoch.
    ///
    /// Saturates outside the representable range (roughly 1677..2262);
    /// [`load_samples`] rejects such samples up front.
    #[inline]
    pub fn epoch_nanos(&self) -> i64 {
        to_epoch_nanos(&self.timestamp)
    }

    /// Axis values as an `[x, y, z]` row.
    #[inline]
    pub fn xyz(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Convert a naive timestamp to nanoseconds since the Unix epoch (saturating).
#[inline]
pub fn to_epoch_nanos(ts: &NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Convert nanoseconds since the Unix epoch back to a naive timestamp.
#[inline]
pub fn from_epoch_nanos(nanos: i64) -> NaiveDateTime {
    DateTime::from_timestamp_nanos(nanos).naive_utc()
}

/// Parse a timestamp in any of the formats the ingestion store produces.
///
/// Accepts `2025-08-04 17:45:00[.fff]`, `2025-08-04T17:45:00[.fff]` and
/// RFC 3339 (converted to UTC).
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(ts);
        }
    }
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_utc())
        .map_err(|e| DatasetError::data(format!("invalid timestamp '{text}': {e}")))
}

/// Anything that can produce the raw samples of one recording session.
///
/// Implementations do not need to return samples in order; [`load_samples`]
/// sorts them.
pub trait SampleSource {
    /// Read every available sample.
    fn read_samples(&self) -> Result<Vec<Sample>>;
}

impl SampleSource for [Sample] {
    fn read_samples(&self) -> Result<Vec<Sample>> {
        Ok(self.to_vec())
    }
}

impl SampleSource for Vec<Sample> {
    fn read_samples(&self) -> Result<Vec<Sample>> {
        Ok(self.clone())
    }
}

/// CSV-backed sample source.
#[derive(Debug, Clone)]
pub struct CsvSampleSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "x_value")]
    x: f64,
    #[serde(alias = "y_value")]
    y: f64,
    #[serde(alias = "z_value")]
    z: f64,
    timestamp: String,
}

impl CsvSampleSource {
    /// Create a source reading from `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path this source reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleSource for CsvSampleSource {
    fn read_samples(&self) -> Result<Vec<Sample>> {
        if !self.path.exists() {
            return Err(DatasetError::data(format!(
                "sample source not found: {}",
                self.path.display()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut samples = Vec::new();
        for (row_idx, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row?;
            let timestamp = parse_timestamp(&row.timestamp).map_err(|e| {
                DatasetError::data(format!("{} row {}: {e}", self.path.display(), row_idx + 1))
            })?;
            samples.push(Sample::new(timestamp, row.x, row.y, row.z));
        }
        Ok(samples)
    }
}

/// SQLite ingestion store source.
///
/// Reads `x_value, y_value, z_value, timestamp` from the `accelerometer`
/// table. Timestamps are stored as `TEXT` (the watch writes
/// `yyyy-MM-ddTHH:mm:ss.SSS`) and go through [`parse_timestamp`]. The
/// database is opened read-only.
#[derive(Debug, Clone)]
pub struct SqliteSampleSource {
    path: PathBuf,
    device_id: Option<String>,
}

impl SqliteSampleSource {
    /// Create a source reading every device's samples from `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            device_id: None,
        }
    }

    /// Only read samples recorded by `device_id`.
    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleSource for SqliteSampleSource {
    fn read_samples(&self) -> Result<Vec<Sample>> {
        if !self.path.exists() {
            return Err(DatasetError::data(format!(
                "sample database not found: {}",
                self.path.display()
            )));
        }

        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut stmt = conn.prepare(
            "
            SELECT x_value, y_value, z_value, timestamp
            FROM accelerometer
            WHERE ?1 IS NULL OR device_id = ?1
            ORDER BY timestamp
            ",
        )?;

        let mut rows = stmt.query(params![self.device_id])?;
        let mut samples = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(3)?;
            let timestamp = parse_timestamp(&text)?;
            samples.push(Sample::new(timestamp, row.get(0)?, row.get(1)?, row.get(2)?));
        }

        log::debug!(
            "Read {} rows from {} (device: {})",
            samples.len(),
            self.path.display(),
            self.device_id.as_deref().unwrap_or("all")
        );
        Ok(samples)
    }
}

/// Load every sample from `source`, sorted ascending by timestamp.
///
/// The sort is stable, so samples sharing a timestamp keep their source order.
///
/// # Errors
///
/// `DatasetError::Data` if the source is absent, yields zero samples, or
/// contains timestamps outside the nanosecond-representable range.
pub fn load_samples<S: SampleSource + ?Sized>(source: &S) -> Result<Vec<Sample>> {
    let mut samples = source.read_samples()?;

    if samples.is_empty() {
        return Err(DatasetError::data("sample source yielded zero samples"));
    }

    if let Some(bad) = samples
        .iter()
        .find(|s| s.timestamp.and_utc().timestamp_nanos_opt().is_none())
    {
        return Err(DatasetError::data(format!(
            "timestamp {} is outside the supported range",
            bad.timestamp
        )));
    }

    if !samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
        log::debug!("Samples not in timestamp order, sorting {} samples", samples.len());
        samples.sort_by_key(|s| s.timestamp);
    }

    // Non-empty checked above
    let first = samples[0].timestamp;
    let last = samples[samples.len() - 1].timestamp;
    log::info!("Loaded {} accelerometer samples", samples.len());
    log::info!("Time range: {first} to {last}");

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let a = ts("2025-08-04 17:45:00");
        let b = ts("2025-08-04T17:45:00");
        let c = ts("2025-08-04T17:45:00Z");
        assert_eq!(a, b);
        assert_eq!(a, c);

        let frac = ts("2025-08-04 17:45:00.250");
        assert_eq!(to_epoch_nanos(&frac) - to_epoch_nanos(&a), 250_000_000);

        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_epoch_nanos_roundtrip() {
        let t = ts("2025-08-04 17:45:00.123456789");
        assert_eq!(from_epoch_nanos(to_epoch_nanos(&t)), t);
    }

    #[test]
    fn test_load_sorts_stably() {
        let t0 = ts("2025-08-04 10:00:00");
        let t1 = ts("2025-08-04 10:00:01");
        let samples = vec![
            Sample::new(t1, 1.0, 0.0, 0.0),
            Sample::new(t0, 2.0, 0.0, 0.0),
            Sample::new(t0, 3.0, 0.0, 0.0),
        ];
        let loaded = load_samples(&samples).unwrap();
        let xs: Vec<f64> = loaded.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_empty_source_is_data_error() {
        let samples: Vec<Sample> = Vec::new();
        let err = load_samples(&samples).unwrap_err();
        assert!(matches!(err, DatasetError::Data(_)));
    }

    #[test]
    fn test_missing_csv_is_data_error() {
        let source = CsvSampleSource::new("/definitely/not/here.csv");
        let err = load_samples(&source).unwrap_err();
        assert!(matches!(err, DatasetError::Data(_)));
    }

    #[test]
    fn test_csv_source_with_store_column_names() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("accelerometer.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "id,x_value,y_value,z_value,timestamp").unwrap();
        writeln!(file, "2,0.5,-0.25,9.81,2025-08-04 17:45:00.033").unwrap();
        writeln!(file, "1,0.1,0.2,9.7,2025-08-04 17:45:00").unwrap();
        drop(file);

        let samples = load_samples(&CsvSampleSource::new(&path)).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].xyz(), [0.1, 0.2, 9.7]);
        assert_eq!(samples[1].xyz(), [0.5, -0.25, 9.81]);
    }

    #[test]
    fn test_csv_bad_timestamp_reports_row() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.csv");
        std::fs::write(&path, "x,y,z,timestamp\n1,2,3,not-a-time\n").unwrap();

        let err = load_samples(&CsvSampleSource::new(&path)).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    fn create_store(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE accelerometer (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id TEXT NOT NULL,
                x_value REAL NOT NULL,
                y_value REAL NOT NULL,
                z_value REAL NOT NULL,
                timestamp TEXT NOT NULL
            )",
        )
        .unwrap();

        let rows = [
            ("watch-1", 3.0, "2025-08-04T17:45:00.066"),
            ("watch-2", 9.0, "2025-08-04T17:44:59.000"),
            ("watch-1", 1.0, "2025-08-04T17:45:00.000"),
            ("watch-1", 2.0, "2025-08-04T17:45:00.033"),
        ];
        for (device, x, ts) in rows {
            conn.execute(
                "INSERT INTO accelerometer (device_id, x_value, y_value, z_value, timestamp)
                 VALUES (?1, ?2, 0.0, 9.81, ?3)",
                params![device, x, ts],
            )
            .unwrap();
        }
    }

    #[test]
    fn test_sqlite_source_sorted_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("health_data.db");
        create_store(&path);

        let samples = load_samples(&SqliteSampleSource::new(&path)).unwrap();
        let xs: Vec<f64> = samples.iter().map(|s| s.x).collect();
        assert_eq!(xs, vec![9.0, 1.0, 2.0, 3.0]);
        assert_eq!(samples[1].timestamp, ts("2025-08-04 17:45:00"));
        assert_eq!(samples[3].timestamp, ts("2025-08-04 17:45:00.066"));
    }

    #[test]
    fn test_sqlite_source_device_filter() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("health_data.db");
        create_store(&path);

        let source = SqliteSampleSource::new(&path).with_device("watch-1");
        let samples = load_samples(&source).unwrap();
        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|s| s.x < 5.0));
    }

    #[test]
    fn test_missing_sqlite_is_data_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.db");
        let err = load_samples(&SqliteSampleSource::new(&path)).unwrap_err();
        assert!(matches!(err, DatasetError::Data(_)));
        assert!(!path.exists());
    }
}
