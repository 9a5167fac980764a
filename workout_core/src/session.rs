//! Session finalization.
//!
//! Turns transient per-exercise performance into an immutable history
//! entry and resets the working state for the next session. The commit is
//! computed as a pure value transformation; the caller persists the
//! resulting workout in a single durable write and must not treat the
//! in-memory copy as committed until that write succeeds.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result, SubjectiveFeedback, Workout, WorkoutSession};

/// Lifecycle of one session against the active workout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No set logged on any exercise
    NotStarted,
    /// At least one set logged somewhere
    InProgress,
}

/// Whether any exercise has a logged set
pub fn session_phase(workout: &Workout) -> SessionPhase {
    if workout
        .exercises
        .iter()
        .any(|e| !e.performance.is_empty())
    {
        SessionPhase::InProgress
    } else {
        SessionPhase::NotStarted
    }
}

/// Outcome of a successful commit: the cleared workout plus the entry
/// that was appended to its history
#[derive(Clone, Debug)]
pub struct CommittedSession {
    pub workout: Workout,
    pub entry: WorkoutSession,
}

/// Finalize a session
///
/// 1. Validates the subjective feedback (ratings in 1..=5, notes trimmed).
/// 2. Filters to exercises with at least one logged set; if none,
///    fails with [`Error::NoProgressRecorded`] and nothing changes.
/// 3. Builds the history entry (timestamp, filtered exercises with their
///    performance preserved verbatim) and returns a new workout with the
///    entry appended and every exercise's performance cleared. Targets
///    (sets, reps, weight, ...) are untouched.
///
/// The returned workout is a value; history append and performance reset
/// land together in whatever single write the caller performs.
pub fn commit_session(
    workout: &Workout,
    feedback: SubjectiveFeedback,
    now: DateTime<Utc>,
) -> Result<CommittedSession> {
    let feedback = feedback.validated()?;

    let performed: Vec<_> = workout
        .exercises
        .iter()
        .filter(|e| !e.performance.is_empty())
        .cloned()
        .collect();

    if performed.is_empty() {
        return Err(Error::NoProgressRecorded);
    }

    let entry = WorkoutSession {
        id: Uuid::new_v4(),
        performed_at: now,
        exercises: performed,
        feedback,
    };

    let mut next = workout.clone();
    next.history.push(entry.clone());
    for exercise in &mut next.exercises {
        exercise.performance.clear();
    }

    tracing::info!(
        "Committed session {} for '{}': {} exercises, history now {} entries",
        entry.id,
        workout.name,
        entry.exercises.len(),
        next.history.len()
    );

    Ok(CommittedSession {
        workout: next,
        entry,
    })
}
