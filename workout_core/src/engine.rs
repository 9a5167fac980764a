//! Workout session engine.
//!
//! Ties the rest timer, progression tracking, and session commit together
//! around the active workout. The engine owns the in-memory workout copy
//! for the duration of a session; every mutation is computed as a new
//! value, written through the store, and only adopted in memory once the
//! durable write succeeds. The rest timer is owned here too, scoped to
//! the session rather than the process.

use chrono::{DateTime, Utc};

use crate::{
    progression, session, AlarmSink, CentralAction, Exercise, Error, RestConfig, RestTimer,
    RestTimerKind, Result, SessionPhase, SetPerformance, SubjectiveFeedback, Workout,
    WorkoutSession, WorkoutStore,
};

/// Live session state for one active workout
#[derive(Debug)]
pub struct SessionEngine {
    workout: Workout,
    store: WorkoutStore,
    rest: RestConfig,
    timer: RestTimer,
    /// Current scroll/selection position, clamped to the exercise list
    position: usize,
}

impl SessionEngine {
    pub fn new(workout: Workout, store: WorkoutStore, rest: RestConfig) -> Self {
        Self {
            workout,
            store,
            rest,
            timer: RestTimer::new(),
            position: 0,
        }
    }

    pub fn workout(&self) -> &Workout {
        &self.workout
    }

    pub fn timer(&self) -> &RestTimer {
        &self.timer
    }

    pub fn session_phase(&self) -> SessionPhase {
        session::session_phase(&self.workout)
    }

    /// Move the selection; out-of-range positions are clamped
    pub fn select_exercise(&mut self, index: usize) {
        self.position = progression::clamp_exercise_index(&self.workout, index);
    }

    pub fn current_exercise_index(&self) -> usize {
        self.position
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.workout.exercises.get(self.position)
    }

    /// What the central action offers for the selected exercise
    pub fn central_action(&self) -> Option<CentralAction> {
        self.current_exercise().map(progression::central_action)
    }

    /// Log a set for the selected exercise
    ///
    /// Validates against the progression rules, persists the new workout
    /// value, and adopts it in memory only after the write succeeds - a
    /// failed write leaves the engine exactly as it was. Returns the rest
    /// duration if the auto-start preference kicked the timer off.
    pub fn log_set(&mut self, set_index: usize, record: SetPerformance) -> Result<Option<u32>> {
        let next = progression::log_set(&self.workout, self.position, set_index, record)?;
        self.store.save_workout(&next)?;
        self.workout = next;

        let auto_start = self
            .current_exercise()
            .and_then(|e| progression::should_auto_start(e, &self.rest));
        if let Some(duration) = auto_start {
            self.timer.start(duration)?;
        }
        Ok(auto_start)
    }

    /// Log the next unlogged set for the selected exercise
    pub fn log_next_set(&mut self, record: SetPerformance) -> Result<Option<u32>> {
        match self.central_action() {
            Some(CentralAction::LogSet { set_index }) => self.log_set(set_index, record),
            Some(CentralAction::Complete) => Err(Error::Validation(format!(
                "'{}' is already complete",
                self.current_exercise().map(|e| e.name.as_str()).unwrap_or("?")
            ))),
            None => Err(Error::Validation("workout has no exercises".into())),
        }
    }

    /// Remove the last logged set for the selected exercise
    ///
    /// Persists before adopting, like `log_set`. Leaves the rest timer
    /// alone.
    pub fn undo_last_set(&mut self) -> Result<()> {
        let next = progression::undo_last_set(&self.workout, self.position)?;
        if next == self.workout {
            return Ok(());
        }
        self.store.save_workout(&next)?;
        self.workout = next;
        Ok(())
    }

    /// Commit the session: history append plus performance reset in one
    /// durable write
    ///
    /// On persistence failure the in-memory workout keeps its logged
    /// sets, so nothing is lost and the caller can retry.
    pub fn finish_session(
        &mut self,
        feedback: SubjectiveFeedback,
        now: DateTime<Utc>,
    ) -> Result<WorkoutSession> {
        let committed = session::commit_session(&self.workout, feedback, now)?;
        self.store.save_workout(&committed.workout)?;

        self.workout = committed.workout;
        self.timer.stop();
        Ok(committed.entry)
    }

    /// Manually start the rest timer for the given kind
    pub fn start_rest(&mut self, kind: RestTimerKind) -> Result<u32> {
        let duration = self.rest.duration_seconds(kind);
        self.timer.start(duration)?;
        Ok(duration)
    }

    /// Extend a running rest countdown
    pub fn add_rest_time(&mut self, seconds: u32) {
        self.timer.add_time(seconds);
    }

    /// Skip the rest / dismiss the alarm
    pub fn skip_rest(&mut self) {
        self.timer.stop();
    }

    /// Advance the rest timer by one elapsed second
    pub fn tick(&mut self, alarm: &mut dyn AlarmSink) {
        self.timer.tick(alarm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SilentAlarm;
    use tempfile::TempDir;

    fn engine_with(rest: RestConfig) -> (SessionEngine, TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = WorkoutStore::new(temp_dir.path());
        let workout = Workout::new(
            "Full Body",
            vec![
                Exercise::strength("Squat", 3, "8-12", 80.0),
                Exercise::cardio("Treadmill", 15.0, 8.0, 1.5),
            ],
        );
        store.save_workout(&workout).unwrap();
        (SessionEngine::new(workout, store, rest), temp_dir)
    }

    fn engine() -> (SessionEngine, TempDir) {
        engine_with(RestConfig::default())
    }

    fn feedback() -> SubjectiveFeedback {
        SubjectiveFeedback {
            doms: 2,
            sleep_quality: 4,
            stress_level: 2,
            session_notes: None,
        }
    }

    #[test]
    fn test_log_set_persists_and_auto_starts_timer() {
        let (mut engine, temp_dir) = engine();

        let started = engine.log_next_set(SetPerformance::strength(10, 80.0)).unwrap();
        assert_eq!(started, Some(180));
        assert!(engine.timer().is_active());

        // The write is already durable
        let store = WorkoutStore::new(temp_dir.path());
        let reloaded = store.load_workout(engine.workout().id).unwrap().unwrap();
        assert_eq!(reloaded.exercises[0].performance.len(), 1);
    }

    #[test]
    fn test_auto_start_respects_preference_and_cardio() {
        let rest = RestConfig {
            auto_start: false,
            ..RestConfig::default()
        };
        let (mut engine_off, _dir) = engine_with(rest);

        engine_off.log_next_set(SetPerformance::strength(10, 80.0)).unwrap();
        assert!(!engine_off.timer().is_active());

        // Cardio never triggers the timer even with auto-start on
        let (mut engine, _dir) = engine();
        engine.select_exercise(1);
        engine
            .log_next_set(SetPerformance::cardio(15.0, 8.0, 1.5))
            .unwrap();
        assert!(!engine.timer().is_active());
    }

    #[test]
    fn test_zero_rest_duration_logs_without_timer() {
        let rest = RestConfig {
            primary_seconds: 0,
            ..RestConfig::default()
        };
        let (mut engine, _dir) = engine_with(rest);

        // The set still lands even though no countdown can start
        let started = engine.log_next_set(SetPerformance::strength(10, 80.0)).unwrap();
        assert_eq!(started, None);
        assert!(!engine.timer().is_active());
        assert_eq!(engine.workout().exercises[0].performance.len(), 1);
    }

    #[test]
    fn test_log_set_restarts_superseded_countdown() {
        let (mut engine, _dir) = engine();
        let mut alarm = SilentAlarm;

        engine.log_next_set(SetPerformance::strength(10, 80.0)).unwrap();
        for _ in 0..30 {
            engine.tick(&mut alarm);
        }
        assert_eq!(engine.timer().time_left(), 150);

        // Logging the next set replaces the countdown wholesale
        engine.log_next_set(SetPerformance::strength(9, 80.0)).unwrap();
        assert_eq!(engine.timer().time_left(), 180);
    }

    #[test]
    fn test_undo_does_not_touch_timer() {
        let (mut engine, _dir) = engine();

        engine.log_next_set(SetPerformance::strength(10, 80.0)).unwrap();
        assert!(engine.timer().is_active());

        engine.undo_last_set().unwrap();
        assert!(engine.timer().is_active());
        assert_eq!(engine.workout().exercises[0].performance.len(), 0);
    }

    #[test]
    fn test_finish_session_end_to_end() {
        let (mut engine, temp_dir) = engine();

        for _ in 0..3 {
            engine.log_next_set(SetPerformance::strength(10, 80.0)).unwrap();
        }
        assert_eq!(engine.central_action(), Some(CentralAction::Complete));

        let entry = engine.finish_session(feedback(), Utc::now()).unwrap();
        assert_eq!(entry.exercises.len(), 1);
        assert_eq!(entry.exercises[0].performance.len(), 3);

        // Live exercise reset, targets intact, history grown, timer off
        let squat = &engine.workout().exercises[0];
        assert!(squat.performance.is_empty());
        assert_eq!(squat.target, Exercise::strength("Squat", 3, "8-12", 80.0).target);
        assert_eq!(engine.workout().history.len(), 1);
        assert!(!engine.timer().is_active());

        // And the store agrees
        let store = WorkoutStore::new(temp_dir.path());
        let reloaded = store.load_workout(engine.workout().id).unwrap().unwrap();
        assert_eq!(reloaded.history.len(), 1);
        assert!(reloaded.exercises[0].performance.is_empty());
    }

    #[test]
    fn test_finish_refused_with_no_progress() {
        let (mut engine, _dir) = engine();

        let err = engine.finish_session(feedback(), Utc::now());
        assert!(matches!(err, Err(Error::NoProgressRecorded)));
        assert!(engine.workout().history.is_empty());
    }

    #[test]
    fn test_failed_write_leaves_engine_unchanged() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A file where the workouts directory should be makes every save fail
        std::fs::write(temp_dir.path().join("workouts"), b"not a dir").unwrap();

        let store = WorkoutStore::new(temp_dir.path());
        let workout = Workout::new("Doomed", vec![Exercise::strength("Squat", 3, "5", 80.0)]);
        let mut engine = SessionEngine::new(workout, store, RestConfig::default());

        let err = engine.log_next_set(SetPerformance::strength(5, 80.0));
        assert!(matches!(err, Err(Error::Persistence(_))));
        assert!(engine.workout().exercises[0].performance.is_empty());
        assert!(!engine.timer().is_active());
    }

    #[test]
    fn test_selection_is_clamped() {
        let (mut engine, _dir) = engine();
        engine.select_exercise(99);
        assert_eq!(engine.current_exercise_index(), 1);
    }
}
