//! Workout history persistence.
//!
//! Finished workouts are appended to a JSONL (JSON Lines) file with file
//! locking so several players can share one history. The log can be
//! exported to CSV for spreadsheets.

use crate::{Result, WorkoutRecord};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Destination for finished workouts
pub trait HistorySink {
    fn append(&mut self, record: &WorkoutRecord) -> Result<()>;
}

/// In-memory sink, handy for dry runs
impl HistorySink for Vec<WorkoutRecord> {
    fn append(&mut self, record: &WorkoutRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// JSONL-backed history with file locking
pub struct JsonlHistory {
    path: PathBuf,
}

impl JsonlHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl HistorySink for JsonlHistory {
    fn append(&mut self, record: &WorkoutRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!(
            "Appended workout {} ({}) to history",
            record.id,
            record.workout_name
        );
        Ok(())
    }
}

/// Read the whole history, newest first
///
/// A missing file is an empty history. Lines that fail to parse are
/// skipped with a warning.
pub fn read_history(path: &Path) -> Result<Vec<WorkoutRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse workout at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;

    // Stable sort keeps file order for records sharing a timestamp
    records.sort_by(|a, b| b.date.cmp(&a.date));
    tracing::debug!("Read {} workouts from history", records.len());
    Ok(records)
}

// ============================================================================
// CSV Export
// ============================================================================

#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    date: String,
    workout_name: String,
    duration_seconds: u32,
}

impl From<&WorkoutRecord> for CsvRow {
    fn from(record: &WorkoutRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            date: record.date.to_rfc3339(),
            workout_name: record.workout_name.clone(),
            duration_seconds: record.duration_seconds,
        }
    }
}

/// Append records to a CSV file, writing headers when the file is new
///
/// Returns the number of rows written. The file is synced before returning.
pub fn export_csv(records: &[WorkoutRecord], csv_path: &Path) -> Result<usize> {
    if records.is_empty() {
        tracing::info!("No workouts to export");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} workouts to {:?}", records.len(), csv_path);
    Ok(records.len())
}
