//! Workout persistence with file locking.
//!
//! Each workout is one JSON document under `<data_dir>/workouts/`; the
//! currently active workout id lives in `<data_dir>/active.json`. Writes
//! go to a temp file, are synced, then renamed over the original, so a
//! workout document (exercises, in-progress performance, and history) is
//! always replaced in a single atomic step. `fs2` locks serialize
//! concurrent readers and writers from other processes; between
//! processes the last write wins.

use crate::{Error, Result, Workout};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Pointer to the workout designated for live logging
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
struct ActiveState {
    active_workout_id: Option<Uuid>,
}

/// Document store rooted at a data directory
#[derive(Clone, Debug)]
pub struct WorkoutStore {
    data_dir: PathBuf,
}

impl WorkoutStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn workouts_dir(&self) -> PathBuf {
        self.data_dir.join("workouts")
    }

    fn workout_path(&self, id: Uuid) -> PathBuf {
        self.workouts_dir().join(format!("{}.json", id))
    }

    fn active_path(&self) -> PathBuf {
        self.data_dir.join("active.json")
    }

    /// Durably write a workout document
    ///
    /// Any failure here means the caller's in-memory copy is not
    /// committed and must not be treated as such.
    pub fn save_workout(&self, workout: &Workout) -> Result<()> {
        let path = self.workout_path(workout.id);
        write_json_atomic(&path, workout).map_err(|e| {
            Error::Persistence(format!("failed to save workout '{}': {}", workout.name, e))
        })?;
        tracing::debug!("Saved workout {} to {:?}", workout.id, path);
        Ok(())
    }

    /// Load a workout document; `None` if it does not exist
    pub fn load_workout(&self, id: Uuid) -> Result<Option<Workout>> {
        let path = self.workout_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let contents = read_locked(&path)?;
        let workout: Workout = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded workout {} from {:?}", id, path);
        Ok(Some(workout))
    }

    /// Load every stored workout, sorted by name
    ///
    /// Unparseable documents are skipped with a warning rather than
    /// failing the whole listing.
    pub fn list_workouts(&self) -> Result<Vec<Workout>> {
        let dir = self.workouts_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut workouts = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json") != Some(true) {
                continue;
            }
            let contents = read_locked(&path)?;
            match serde_json::from_str::<Workout>(&contents) {
                Ok(workout) => workouts.push(workout),
                Err(e) => {
                    tracing::warn!("Skipping unparseable workout {:?}: {}", path, e);
                }
            }
        }

        workouts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(workouts)
    }

    /// Record which workout is active (or clear it with `None`)
    ///
    /// Switching away from a workout with in-progress performance is
    /// allowed; its logged sets stay in its document until the next
    /// commit ("resume later", not data loss).
    pub fn set_active(&self, id: Option<Uuid>) -> Result<()> {
        let state = ActiveState {
            active_workout_id: id,
        };
        write_json_atomic(&self.active_path(), &state)
            .map_err(|e| Error::Persistence(format!("failed to record active workout: {}", e)))?;
        tracing::debug!("Active workout set to {:?}", id);
        Ok(())
    }

    /// Id of the active workout, if one is designated
    pub fn active_workout_id(&self) -> Result<Option<Uuid>> {
        let path = self.active_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = read_locked(&path)?;
        match serde_json::from_str::<ActiveState>(&contents) {
            Ok(state) => Ok(state.active_workout_id),
            Err(e) => {
                tracing::warn!("Unparseable active state {:?}: {}. Treating as none.", path, e);
                Ok(None)
            }
        }
    }

    /// Load the active workout, if one is designated and still stored
    pub fn load_active_workout(&self) -> Result<Option<Workout>> {
        match self.active_workout_id()? {
            Some(id) => self.load_workout(id),
            None => Ok(None),
        }
    }
}

/// Read a whole file under a shared lock
fn read_locked(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    let read_result = reader.read_to_string(&mut contents);
    file.unlock()?;
    read_result?;

    Ok(contents)
}

/// Atomically replace `path` with the JSON serialization of `value`
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Unique temp file in the same directory for atomic rename
    let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "document path missing parent")
    })?)?;

    // Exclusive lock on the temp file serializes concurrent writers
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string(value)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{progression, Exercise, SetPerformance};

    fn sample_workout(name: &str) -> Workout {
        Workout::new(
            name,
            vec![
                Exercise::strength("Deadlift", 3, "5", 120.0),
                Exercise::cardio("Rower", 10.0, 0.0, 5.0),
            ],
        )
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = WorkoutStore::new(temp_dir.path());

        let workout = sample_workout("Pull Day");
        store.save_workout(&workout).unwrap();

        let loaded = store.load_workout(workout.id).unwrap().unwrap();
        assert_eq!(loaded, workout);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = WorkoutStore::new(temp_dir.path());

        assert!(store.load_workout(Uuid::new_v4()).unwrap().is_none());
        assert!(store.load_active_workout().unwrap().is_none());
    }

    #[test]
    fn test_active_workout_pointer() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = WorkoutStore::new(temp_dir.path());

        let workout = sample_workout("Pull Day");
        store.save_workout(&workout).unwrap();
        store.set_active(Some(workout.id)).unwrap();

        let active = store.load_active_workout().unwrap().unwrap();
        assert_eq!(active.id, workout.id);

        store.set_active(None).unwrap();
        assert!(store.load_active_workout().unwrap().is_none());
    }

    #[test]
    fn test_list_workouts_sorted_by_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = WorkoutStore::new(temp_dir.path());

        store.save_workout(&sample_workout("Upper")).unwrap();
        store.save_workout(&sample_workout("Lower")).unwrap();

        let listed = store.list_workouts().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Lower");
        assert_eq!(listed[1].name, "Upper");
    }

    #[test]
    fn test_switching_active_preserves_in_progress_performance() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = WorkoutStore::new(temp_dir.path());

        let abandoned = sample_workout("Abandoned");
        let abandoned =
            progression::log_set(&abandoned, 0, 0, SetPerformance::strength(5, 120.0)).unwrap();
        store.save_workout(&abandoned).unwrap();
        store.set_active(Some(abandoned.id)).unwrap();

        // Switch to another workout without committing
        let other = sample_workout("Other");
        store.save_workout(&other).unwrap();
        store.set_active(Some(other.id)).unwrap();

        // The abandoned workout keeps its logged set for later resume
        let resumed = store.load_workout(abandoned.id).unwrap().unwrap();
        assert_eq!(resumed.exercises[0].performance.len(), 1);
    }

    #[test]
    fn test_atomic_save_leaves_no_stray_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = WorkoutStore::new(temp_dir.path());

        let workout = sample_workout("Pull Day");
        store.save_workout(&workout).unwrap();
        store.save_workout(&workout).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path().join("workouts"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_name().to_string_lossy().ends_with(".json"))
            .collect();
        assert!(extras.is_empty(), "found stray files: {:?}", extras);
    }

    #[test]
    fn test_corrupted_workout_document_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = WorkoutStore::new(temp_dir.path());

        let id = Uuid::new_v4();
        std::fs::create_dir_all(temp_dir.path().join("workouts")).unwrap();
        std::fs::write(
            temp_dir.path().join("workouts").join(format!("{}.json", id)),
            "{ not json",
        )
        .unwrap();

        assert!(store.load_workout(id).is_err());
    }
}
