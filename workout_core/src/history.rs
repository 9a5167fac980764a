//! Queries over committed session history.
//!
//! History entries live embedded in the workout document; these helpers
//! provide the windowed and summarized views the UI renders. Nothing
//! here mutates history.

use chrono::{DateTime, Duration, Utc};

use crate::{SetMetrics, Workout, WorkoutSession};

/// Sessions within the last `days` days, newest first
pub fn recent_sessions<'a>(
    workout: &'a Workout,
    now: DateTime<Utc>,
    days: i64,
) -> Vec<&'a WorkoutSession> {
    let cutoff = now - Duration::days(days);
    let mut sessions: Vec<_> = workout
        .history
        .iter()
        .filter(|s| s.performed_at >= cutoff)
        .collect();
    sessions.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));

    tracing::debug!(
        "{} of {} sessions for '{}' within {} days",
        sessions.len(),
        workout.history.len(),
        workout.name,
        days
    );
    sessions
}

/// The most recent committed session, if any
pub fn last_session(workout: &Workout) -> Option<&WorkoutSession> {
    workout.history.iter().max_by_key(|s| s.performed_at)
}

/// Aggregate volume numbers for one committed session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub performed_at: DateTime<Utc>,
    pub exercise_count: usize,
    pub set_count: usize,
    /// Sum of reps x weight across strength sets
    pub tonnage: f64,
    /// Total logged cardio minutes
    pub cardio_minutes: f64,
}

/// Compute the volume summary for a session
pub fn summarize(session: &WorkoutSession) -> SessionSummary {
    let mut set_count = 0;
    let mut tonnage = 0.0;
    let mut cardio_minutes = 0.0;

    for exercise in &session.exercises {
        for record in &exercise.performance {
            set_count += 1;
            match record.metrics {
                SetMetrics::Strength { reps, weight } => {
                    tonnage += f64::from(reps) * weight;
                }
                SetMetrics::Cardio {
                    duration_minutes, ..
                } => {
                    cardio_minutes += duration_minutes;
                }
            }
        }
    }

    SessionSummary {
        performed_at: session.performed_at,
        exercise_count: session.exercises.len(),
        set_count,
        tonnage,
        cardio_minutes,
    }
}
