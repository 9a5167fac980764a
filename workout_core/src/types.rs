//! Core domain types for the workout session engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises (strength and cardio) and their prescribed targets
//! - Per-set performance records
//! - Workouts and their immutable session history
//! - Subjective post-session feedback

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ============================================================================
// Exercise Types
// ============================================================================

/// Which configured rest duration applies after a strength set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestTimerKind {
    #[default]
    Primary,
    Secondary,
}

/// Prescribed targets for an exercise, discriminated by kind
///
/// Strength and cardio carry mutually exclusive attribute sets; the
/// `reps` target is a free-form string (e.g. `"8-12"`) and is never
/// parsed by this crate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExerciseTarget {
    Strength {
        sets: u32,
        reps: String,
        weight: f64,
        #[serde(default)]
        rest_timer: RestTimerKind,
    },
    Cardio {
        duration_minutes: f64,
        speed: f64,
        level: f64,
    },
}

/// One prescribed movement within a workout plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub name: String,
    pub target: ExerciseTarget,
    /// Ordered, append-only within a session; cleared on commit.
    #[serde(default)]
    pub performance: Vec<SetPerformance>,
    pub image_url: Option<String>,
}

impl Exercise {
    /// Create a strength exercise with empty performance
    pub fn strength(name: impl Into<String>, sets: u32, reps: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            target: ExerciseTarget::Strength {
                sets,
                reps: reps.into(),
                weight,
                rest_timer: RestTimerKind::Primary,
            },
            performance: Vec::new(),
            image_url: None,
        }
    }

    /// Create a cardio exercise with empty performance
    pub fn cardio(name: impl Into<String>, duration_minutes: f64, speed: f64, level: f64) -> Self {
        Self {
            name: name.into(),
            target: ExerciseTarget::Cardio {
                duration_minutes,
                speed,
                level,
            },
            performance: Vec::new(),
            image_url: None,
        }
    }

    pub fn is_strength(&self) -> bool {
        matches!(self.target, ExerciseTarget::Strength { .. })
    }

    pub fn is_cardio(&self) -> bool {
        matches!(self.target, ExerciseTarget::Cardio { .. })
    }

    /// Rest kind for this exercise (strength only; cardio has no rest timer)
    pub fn rest_timer_kind(&self) -> Option<RestTimerKind> {
        match self.target {
            ExerciseTarget::Strength { rest_timer, .. } => Some(rest_timer),
            ExerciseTarget::Cardio { .. } => None,
        }
    }
}

// ============================================================================
// Performance Types
// ============================================================================

/// Rate of perceived exertion: 1.0 to 10.0 in half-point steps
///
/// Deserialization goes through the same validation as [`Rpe::new`], so
/// a hand-edited document cannot load an out-of-range value.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "f64")]
pub struct Rpe(f64);

impl TryFrom<f64> for Rpe {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl Rpe {
    pub fn new(value: f64) -> Result<Self> {
        if !(1.0..=10.0).contains(&value) {
            return Err(Error::Validation(format!(
                "RPE must be between 1 and 10, got {}",
                value
            )));
        }
        if (value * 2.0).fract() != 0.0 {
            return Err(Error::Validation(format!(
                "RPE must be a half-point step, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Measured work for one completed set, discriminated by kind
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SetMetrics {
    Strength { reps: u32, weight: f64 },
    Cardio { duration_minutes: f64, speed: f64, level: f64 },
}

/// One completed unit of work
///
/// Immutable once created: records may only be removed by popping the
/// most recent entry, never edited in place or removed from the middle.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetPerformance {
    #[serde(flatten)]
    pub metrics: SetMetrics,
    pub rpe: Option<Rpe>,
    pub notes: Option<String>,
}

impl SetPerformance {
    pub fn strength(reps: u32, weight: f64) -> Self {
        Self {
            metrics: SetMetrics::Strength { reps, weight },
            rpe: None,
            notes: None,
        }
    }

    pub fn cardio(duration_minutes: f64, speed: f64, level: f64) -> Self {
        Self {
            metrics: SetMetrics::Cardio {
                duration_minutes,
                speed,
                level,
            },
            rpe: None,
            notes: None,
        }
    }

    pub fn with_rpe(mut self, rpe: Rpe) -> Self {
        self.rpe = Some(rpe);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

// ============================================================================
// Workout and Session Types
// ============================================================================

/// Subjective feedback captured when a session is committed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SubjectiveFeedback {
    /// Delayed-onset muscle soreness, 1-5
    pub doms: u8,
    /// 1-5
    pub sleep_quality: u8,
    /// 1-5
    pub stress_level: u8,
    pub session_notes: Option<String>,
}

impl SubjectiveFeedback {
    /// Validate ratings and trim the optional notes
    ///
    /// All three ratings must be integers in 1..=5. Empty notes (after
    /// trimming) collapse to `None`.
    pub fn validated(self) -> Result<Self> {
        for (label, value) in [
            ("doms", self.doms),
            ("sleep_quality", self.sleep_quality),
            ("stress_level", self.stress_level),
        ] {
            if !(1..=5).contains(&value) {
                return Err(Error::Validation(format!(
                    "{} must be between 1 and 5, got {}",
                    label, value
                )));
            }
        }

        let session_notes = self
            .session_notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Self {
            session_notes,
            ..self
        })
    }
}

/// An immutable snapshot of one completed session
///
/// Appended to a workout's history on commit; never mutated or deleted
/// afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub performed_at: DateTime<Utc>,
    /// Only the exercises that had at least one completed set, with
    /// their performance arrays preserved verbatim.
    pub exercises: Vec<Exercise>,
    pub feedback: SubjectiveFeedback,
}

/// A named, ordered sequence of exercises plus past session history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub name: String,
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub history: Vec<WorkoutSession>,
}

impl Workout {
    pub fn new(name: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            exercises,
            history: Vec::new(),
        }
    }
}
