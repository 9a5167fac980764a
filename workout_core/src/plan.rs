//! Workout plan definitions.
//!
//! A plan is a TOML document naming an ordered list of exercises with
//! their prescribed targets. Parsing validates the definition before any
//! workout is created from it; a built-in starter plan covers first-run
//! use.

use crate::{Error, Exercise, ExerciseTarget, Result, RestTimerKind, Workout};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::Path;

/// Cached starter plan - parsed once and reused
static STARTER_PLAN: Lazy<WorkoutPlan> = Lazy::new(|| {
    parse_plan(STARTER_PLAN_TOML).expect("built-in starter plan must parse")
});

const STARTER_PLAN_TOML: &str = r#"
name = "Starter Full Body"

[[exercise]]
name = "Squat"
kind = "strength"
sets = 3
reps = "8-12"
weight = 40.0

[[exercise]]
name = "Bench Press"
kind = "strength"
sets = 3
reps = "8-12"
weight = 30.0

[[exercise]]
name = "Lat Pulldown"
kind = "strength"
sets = 3
reps = "10-15"
weight = 35.0
rest_timer = "secondary"

[[exercise]]
name = "Treadmill"
kind = "cardio"
duration_minutes = 10.0
speed = 7.5
level = 1.0
"#;

/// A validated plan, ready to be instantiated as a workout
#[derive(Clone, Debug)]
pub struct WorkoutPlan {
    pub name: String,
    pub exercises: Vec<Exercise>,
}

impl WorkoutPlan {
    /// Create a fresh workout (new id, empty performance and history)
    pub fn instantiate(&self) -> Workout {
        Workout::new(self.name.clone(), self.exercises.clone())
    }
}

/// Get the built-in starter plan
pub fn starter_plan() -> &'static WorkoutPlan {
    &STARTER_PLAN
}

// Raw TOML shapes, validated into domain types below

#[derive(Debug, Deserialize)]
struct RawPlan {
    name: String,
    #[serde(default, rename = "exercise")]
    exercises: Vec<RawExercise>,
}

#[derive(Debug, Deserialize)]
struct RawExercise {
    name: String,
    kind: String,
    sets: Option<u32>,
    reps: Option<String>,
    weight: Option<f64>,
    rest_timer: Option<String>,
    duration_minutes: Option<f64>,
    speed: Option<f64>,
    level: Option<f64>,
    image_url: Option<String>,
}

/// Load and validate a plan from a TOML file
pub fn load_plan(path: &Path) -> Result<WorkoutPlan> {
    let contents = std::fs::read_to_string(path)?;
    let plan = parse_plan(&contents)?;
    tracing::info!(
        "Loaded plan '{}' ({} exercises) from {:?}",
        plan.name,
        plan.exercises.len(),
        path
    );
    Ok(plan)
}

/// Parse and validate a plan from TOML text
pub fn parse_plan(contents: &str) -> Result<WorkoutPlan> {
    let raw: RawPlan = toml::from_str(contents)?;

    if raw.name.trim().is_empty() {
        return Err(Error::Plan("plan name must not be empty".into()));
    }
    if raw.exercises.is_empty() {
        return Err(Error::Plan(format!(
            "plan '{}' defines no exercises",
            raw.name
        )));
    }

    let mut exercises = Vec::with_capacity(raw.exercises.len());
    for raw_ex in raw.exercises {
        exercises.push(validate_exercise(raw_ex)?);
    }

    Ok(WorkoutPlan {
        name: raw.name.trim().to_string(),
        exercises,
    })
}

fn validate_exercise(raw: RawExercise) -> Result<Exercise> {
    if raw.name.trim().is_empty() {
        return Err(Error::Plan("exercise name must not be empty".into()));
    }
    let name = raw.name.trim().to_string();

    let target = match raw.kind.as_str() {
        "strength" => {
            if raw.duration_minutes.is_some() || raw.speed.is_some() || raw.level.is_some() {
                return Err(Error::Plan(format!(
                    "strength exercise '{}' must not carry cardio attributes",
                    name
                )));
            }
            let sets = raw
                .sets
                .ok_or_else(|| Error::Plan(format!("'{}' is missing 'sets'", name)))?;
            if sets == 0 {
                return Err(Error::Plan(format!(
                    "'{}' must prescribe at least one set",
                    name
                )));
            }
            let reps = raw
                .reps
                .ok_or_else(|| Error::Plan(format!("'{}' is missing 'reps'", name)))?;
            let weight = raw.weight.unwrap_or(0.0);
            if weight < 0.0 {
                return Err(Error::Plan(format!("'{}' has a negative weight", name)));
            }

            let rest_timer = match raw.rest_timer.as_deref() {
                None | Some("primary") => RestTimerKind::Primary,
                Some("secondary") => RestTimerKind::Secondary,
                Some(other) => {
                    return Err(Error::Plan(format!(
                        "'{}' has unknown rest_timer '{}' (expected primary or secondary)",
                        name, other
                    )))
                }
            };

            ExerciseTarget::Strength {
                sets,
                reps,
                weight,
                rest_timer,
            }
        }
        "cardio" => {
            if raw.sets.is_some() || raw.reps.is_some() || raw.weight.is_some() {
                return Err(Error::Plan(format!(
                    "cardio exercise '{}' must not carry strength attributes",
                    name
                )));
            }
            if raw.rest_timer.is_some() {
                return Err(Error::Plan(format!(
                    "cardio exercise '{}' has no rest timer",
                    name
                )));
            }
            let duration_minutes = raw.duration_minutes.unwrap_or(0.0);
            let speed = raw.speed.unwrap_or(0.0);
            let level = raw.level.unwrap_or(0.0);
            if duration_minutes < 0.0 || speed < 0.0 || level < 0.0 {
                return Err(Error::Plan(format!(
                    "cardio exercise '{}' has negative attributes",
                    name
                )));
            }

            ExerciseTarget::Cardio {
                duration_minutes,
                speed,
                level,
            }
        }
        other => {
            return Err(Error::Plan(format!(
                "'{}' has unknown kind '{}' (expected strength or cardio)",
                name, other
            )))
        }
    };

    Ok(Exercise {
        name,
        target,
        performance: Vec::new(),
        image_url: raw.image_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_plan_parses() {
        let plan = starter_plan();
        assert_eq!(plan.name, "Starter Full Body");
        assert_eq!(plan.exercises.len(), 4);
        assert!(plan.exercises[0].is_strength());
        assert!(plan.exercises[3].is_cardio());
    }

    #[test]
    fn test_instantiate_gives_fresh_workouts() {
        let a = starter_plan().instantiate();
        let b = starter_plan().instantiate();
        assert_ne!(a.id, b.id);
        assert!(a.history.is_empty());
        assert!(a.exercises.iter().all(|e| e.performance.is_empty()));
    }

    #[test]
    fn test_parse_rejects_empty_plan() {
        assert!(parse_plan("name = \"Empty\"\n").is_err());
        assert!(parse_plan("name = \"  \"\n[[exercise]]\nname = \"X\"\nkind = \"strength\"\nsets = 1\nreps = \"5\"\n").is_err());
    }

    #[test]
    fn test_parse_rejects_mixed_attributes() {
        let toml_str = r#"
name = "Bad"

[[exercise]]
name = "Squat"
kind = "strength"
sets = 3
reps = "5"
speed = 8.0
"#;
        assert!(matches!(parse_plan(toml_str), Err(Error::Plan(_))));
    }

    #[test]
    fn test_parse_rejects_zero_sets() {
        // A zero-set prescription would be complete before it starts
        let toml_str = r#"
name = "Bad"

[[exercise]]
name = "Squat"
kind = "strength"
sets = 0
reps = "5"
"#;
        assert!(matches!(parse_plan(toml_str), Err(Error::Plan(_))));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let toml_str = r#"
name = "Bad"

[[exercise]]
name = "Yoga"
kind = "flexibility"
"#;
        assert!(matches!(parse_plan(toml_str), Err(Error::Plan(_))));
    }

    #[test]
    fn test_parse_secondary_rest_timer() {
        let toml_str = r#"
name = "Accessories"

[[exercise]]
name = "Curl"
kind = "strength"
sets = 3
reps = "12"
weight = 15.0
rest_timer = "secondary"
"#;
        let plan = parse_plan(toml_str).unwrap();
        assert_eq!(
            plan.exercises[0].rest_timer_kind(),
            Some(RestTimerKind::Secondary)
        );
    }

    #[test]
    fn test_load_plan_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plan.toml");
        std::fs::write(&path, STARTER_PLAN_TOML).unwrap();

        let plan = load_plan(&path).unwrap();
        assert_eq!(plan.exercises.len(), 4);
    }
}
