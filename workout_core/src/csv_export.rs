//! CSV export of committed session history.
//!
//! Flattens a workout's history to one row per logged set so it can be
//! inspected in a spreadsheet. The export is a full rewrite of the target
//! file; history itself is never modified.

use crate::{Result, SetMetrics, Workout};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    session_id: String,
    performed_at: String,
    exercise: String,
    set_number: usize,
    kind: &'static str,
    reps: Option<u32>,
    weight: Option<f64>,
    duration_minutes: Option<f64>,
    speed: Option<f64>,
    level: Option<f64>,
    rpe: Option<f64>,
    notes: Option<String>,
    doms: u8,
    sleep_quality: u8,
    stress_level: u8,
}

/// Write the full history of `workout` to `csv_path`
///
/// Returns the number of rows written. Creates parent directories as
/// needed; the file is flushed and synced before returning.
pub fn export_history(workout: &Workout, csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(csv_path)?;
    let mut writer = csv::Writer::from_writer(file);
    let mut rows = 0;

    for session in &workout.history {
        for exercise in &session.exercises {
            for (set_index, record) in exercise.performance.iter().enumerate() {
                let (kind, reps, weight, duration_minutes, speed, level) = match record.metrics {
                    SetMetrics::Strength { reps, weight } => {
                        ("strength", Some(reps), Some(weight), None, None, None)
                    }
                    SetMetrics::Cardio {
                        duration_minutes,
                        speed,
                        level,
                    } => (
                        "cardio",
                        None,
                        None,
                        Some(duration_minutes),
                        Some(speed),
                        Some(level),
                    ),
                };

                writer.serialize(CsvRow {
                    session_id: session.id.to_string(),
                    performed_at: session.performed_at.to_rfc3339(),
                    exercise: exercise.name.clone(),
                    set_number: set_index + 1,
                    kind,
                    reps,
                    weight,
                    duration_minutes,
                    speed,
                    level,
                    rpe: record.rpe.map(|r| r.value()),
                    notes: record.notes.clone(),
                    doms: session.feedback.doms,
                    sleep_quality: session.feedback.sleep_quality,
                    stress_level: session.feedback.stress_level,
                })?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!(
        "Exported {} rows of history for '{}' to {:?}",
        rows,
        workout.name,
        csv_path
    );
    Ok(rows)
}
