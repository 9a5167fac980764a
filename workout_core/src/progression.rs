//! Exercise progression tracking.
//!
//! Derives "where am I" answers from workout data: which set comes next,
//! whether an exercise is finished, and what the central action button
//! should do. Mutations (`log_set`, `undo_last_set`) take a workout by
//! reference and return a new value; persisting the result is a separate,
//! explicit step.

use crate::{
    Error, Exercise, ExerciseTarget, Result, RestConfig, SetMetrics, SetPerformance, Workout,
};

/// Number of loggable sets for an exercise (cardio counts as one)
pub fn target_sets(exercise: &Exercise) -> u32 {
    match exercise.target {
        ExerciseTarget::Strength { sets, .. } => sets,
        ExerciseTarget::Cardio { .. } => 1,
    }
}

/// Index of the next unlogged set: the length of the performance array
pub fn next_set_index(exercise: &Exercise) -> usize {
    exercise.performance.len()
}

/// Whether every prescribed set has been logged
///
/// A strength exercise prescribed with zero sets has nothing to log and
/// is complete immediately.
pub fn is_complete(exercise: &Exercise) -> bool {
    next_set_index(exercise) >= target_sets(exercise) as usize
}

/// What the central action button should offer for an exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CentralAction {
    /// Log the set at this index
    LogSet { set_index: usize },
    /// Exercise finished; the action is disabled
    Complete,
}

/// Derive the central action for the given exercise
///
/// Recompute whenever the selected exercise or any performance array
/// changes.
pub fn central_action(exercise: &Exercise) -> CentralAction {
    if is_complete(exercise) {
        CentralAction::Complete
    } else {
        CentralAction::LogSet {
            set_index: next_set_index(exercise),
        }
    }
}

/// Clamp a scroll/selection position to a valid exercise index
pub fn clamp_exercise_index(workout: &Workout, requested: usize) -> usize {
    if workout.exercises.is_empty() {
        0
    } else {
        requested.min(workout.exercises.len() - 1)
    }
}

/// Append a performance record to an exercise, returning the new workout
///
/// Rejects, mutating nothing:
/// - an exercise index out of bounds
/// - a record whose metrics kind does not match the exercise kind
/// - an already-complete exercise (including a second cardio log, which
///   is treated as a rejected duplicate)
/// - a `set_index` other than the next unlogged one, so sets can never
///   be logged out of order or twice
pub fn log_set(
    workout: &Workout,
    exercise_index: usize,
    set_index: usize,
    record: SetPerformance,
) -> Result<Workout> {
    let exercise = workout.exercises.get(exercise_index).ok_or_else(|| {
        Error::Validation(format!("No exercise at index {}", exercise_index))
    })?;

    let kind_matches = matches!(
        (&exercise.target, &record.metrics),
        (ExerciseTarget::Strength { .. }, SetMetrics::Strength { .. })
            | (ExerciseTarget::Cardio { .. }, SetMetrics::Cardio { .. })
    );
    if !kind_matches {
        return Err(Error::Validation(format!(
            "Performance record kind does not match exercise '{}'",
            exercise.name
        )));
    }

    if is_complete(exercise) {
        return Err(Error::Validation(format!(
            "'{}' is already complete ({} of {} sets logged)",
            exercise.name,
            next_set_index(exercise),
            target_sets(exercise)
        )));
    }

    let expected = next_set_index(exercise);
    if set_index != expected {
        return Err(Error::Validation(format!(
            "Out-of-order set for '{}': expected set {}, got {}",
            exercise.name, expected, set_index
        )));
    }

    let mut next = workout.clone();
    next.exercises[exercise_index].performance.push(record);

    tracing::info!(
        "Logged set {} of {} for '{}'",
        set_index + 1,
        target_sets(exercise),
        exercise.name
    );

    Ok(next)
}

/// Remove the most recent performance record, returning the new workout
///
/// A no-op (the workout is returned unchanged) when nothing has been
/// logged. Never touches the rest timer.
pub fn undo_last_set(workout: &Workout, exercise_index: usize) -> Result<Workout> {
    let exercise = workout.exercises.get(exercise_index).ok_or_else(|| {
        Error::Validation(format!("No exercise at index {}", exercise_index))
    })?;

    if exercise.performance.is_empty() {
        tracing::debug!("undo ignored for '{}': nothing logged", exercise.name);
        return Ok(workout.clone());
    }

    let mut next = workout.clone();
    next.exercises[exercise_index].performance.pop();

    tracing::info!(
        "Undid last set for '{}' ({} remaining)",
        exercise.name,
        next.exercises[exercise_index].performance.len()
    );

    Ok(next)
}

/// Decide whether logging a set should start the rest timer
///
/// Pure decision function: the rest timer itself knows nothing about
/// exercises. Returns the rest duration when the auto-start preference is
/// on and the exercise carries a rest kind (strength only). A duration
/// configured as zero means no timed rest, so it never starts the timer.
pub fn should_auto_start(exercise: &Exercise, rest: &RestConfig) -> Option<u32> {
    if !rest.auto_start {
        return None;
    }
    exercise
        .rest_timer_kind()
        .map(|kind| rest.duration_seconds(kind))
        .filter(|&seconds| seconds > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squat() -> Exercise {
        Exercise::strength("Squat", 3, "8-12", 80.0)
    }

    fn test_workout() -> Workout {
        Workout::new(
            "Leg Day",
            vec![squat(), Exercise::cardio("Treadmill", 15.0, 8.0, 1.5)],
        )
    }

    #[test]
    fn test_next_set_index_tracks_performance_length() {
        let workout = test_workout();
        assert_eq!(next_set_index(&workout.exercises[0]), 0);

        let workout = log_set(&workout, 0, 0, SetPerformance::strength(10, 80.0)).unwrap();
        assert_eq!(next_set_index(&workout.exercises[0]), 1);
    }

    #[test]
    fn test_out_of_order_log_rejected_without_mutation() {
        let workout = test_workout();

        // Skipping ahead
        let err = log_set(&workout, 0, 1, SetPerformance::strength(10, 80.0));
        assert!(matches!(err, Err(Error::Validation(_))));

        // Replaying set 0 after it was logged
        let logged = log_set(&workout, 0, 0, SetPerformance::strength(10, 80.0)).unwrap();
        let err = log_set(&logged, 0, 0, SetPerformance::strength(10, 80.0));
        assert!(matches!(err, Err(Error::Validation(_))));
        assert_eq!(logged.exercises[0].performance.len(), 1);
    }

    #[test]
    fn test_complete_exercise_rejects_further_sets() {
        let mut workout = test_workout();
        for i in 0..3 {
            workout = log_set(&workout, 0, i, SetPerformance::strength(10, 80.0)).unwrap();
        }
        assert!(is_complete(&workout.exercises[0]));

        let err = log_set(&workout, 0, 3, SetPerformance::strength(10, 80.0));
        assert!(matches!(err, Err(Error::Validation(_))));
    }

    #[test]
    fn test_cardio_is_single_set() {
        let workout = test_workout();
        assert_eq!(target_sets(&workout.exercises[1]), 1);

        let workout =
            log_set(&workout, 1, 0, SetPerformance::cardio(15.0, 8.0, 1.5)).unwrap();
        assert!(is_complete(&workout.exercises[1]));

        // Second cardio log is a rejected duplicate
        let err = log_set(&workout, 1, 1, SetPerformance::cardio(15.0, 8.0, 1.5));
        assert!(matches!(err, Err(Error::Validation(_))));
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let workout = test_workout();
        let err = log_set(&workout, 0, 0, SetPerformance::cardio(10.0, 5.0, 1.0));
        assert!(matches!(err, Err(Error::Validation(_))));
    }

    #[test]
    fn test_zero_set_exercise_complete_immediately() {
        let workout = Workout::new("Odd", vec![Exercise::strength("Plank", 0, "-", 0.0)]);
        assert!(is_complete(&workout.exercises[0]));
        assert_eq!(central_action(&workout.exercises[0]), CentralAction::Complete);

        let err = log_set(&workout, 0, 0, SetPerformance::strength(1, 0.0));
        assert!(matches!(err, Err(Error::Validation(_))));
    }

    #[test]
    fn test_central_action_transitions() {
        let mut workout = test_workout();
        assert_eq!(
            central_action(&workout.exercises[0]),
            CentralAction::LogSet { set_index: 0 }
        );

        for i in 0..3 {
            workout = log_set(&workout, 0, i, SetPerformance::strength(10, 80.0)).unwrap();
        }
        assert_eq!(central_action(&workout.exercises[0]), CentralAction::Complete);
    }

    #[test]
    fn test_undo_is_inverse_of_log() {
        let workout = test_workout();
        let record = SetPerformance::strength(9, 82.5).with_notes("belt on");

        let logged = log_set(&workout, 0, 0, record.clone()).unwrap();
        let logged = log_set(&logged, 0, 1, record.clone()).unwrap();

        let undone = undo_last_set(&logged, 0).unwrap();
        assert_eq!(undone.exercises[0].performance.len(), 1);

        // Re-logging the identical record at the same index restores the state
        let relogged = log_set(&undone, 0, 1, record).unwrap();
        assert_eq!(relogged, logged);
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let workout = test_workout();
        let undone = undo_last_set(&workout, 0).unwrap();
        assert_eq!(undone, workout);
    }

    #[test]
    fn test_clamp_exercise_index() {
        let workout = test_workout();
        assert_eq!(clamp_exercise_index(&workout, 0), 0);
        assert_eq!(clamp_exercise_index(&workout, 5), 1);

        let empty = Workout::new("Empty", vec![]);
        assert_eq!(clamp_exercise_index(&empty, 3), 0);
    }

    #[test]
    fn test_should_auto_start() {
        let rest = RestConfig::default();
        assert_eq!(should_auto_start(&squat(), &rest), Some(180));

        // Cardio never starts a rest timer
        let cardio = Exercise::cardio("Bike", 20.0, 14.0, 3.0);
        assert_eq!(should_auto_start(&cardio, &rest), None);

        // Preference off
        let rest_off = RestConfig {
            auto_start: false,
            ..RestConfig::default()
        };
        assert_eq!(should_auto_start(&squat(), &rest_off), None);

        // A zero duration means no timed rest
        let rest_zero = RestConfig {
            primary_seconds: 0,
            ..RestConfig::default()
        };
        assert_eq!(should_auto_start(&squat(), &rest_zero), None);
    }

    #[test]
    fn test_secondary_rest_kind_uses_secondary_duration() {
        let mut curl = Exercise::strength("Curl", 3, "12", 15.0);
        if let ExerciseTarget::Strength { ref mut rest_timer, .. } = curl.target {
            *rest_timer = crate::RestTimerKind::Secondary;
        }
        let rest = RestConfig::default();
        assert_eq!(should_auto_start(&curl, &rest), Some(90));
    }
}
