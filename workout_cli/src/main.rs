use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use workout_core::*;

#[derive(Parser)]
#[command(name = "replog")]
#[command(about = "Workout session tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a workout from a plan file (or the built-in starter plan)
    /// and make it active
    Init {
        /// TOML plan file; omit to use the starter plan
        plan: Option<PathBuf>,
    },

    /// Show the active workout, per-exercise progress, and the next action
    Status,

    /// Log the next set of an exercise
    Log {
        /// Exercise position (1-based); defaults to the first unfinished one
        #[arg(long)]
        exercise: Option<usize>,

        /// Reps performed (strength)
        #[arg(long)]
        reps: Option<u32>,

        /// Weight used (strength)
        #[arg(long)]
        weight: Option<f64>,

        /// Minutes performed (cardio)
        #[arg(long)]
        duration: Option<f64>,

        /// Speed (cardio)
        #[arg(long)]
        speed: Option<f64>,

        /// Level/incline (cardio)
        #[arg(long)]
        level: Option<f64>,

        /// Perceived exertion, 1-10 in half steps
        #[arg(long)]
        rpe: Option<f64>,

        /// Free-text note for this set
        #[arg(long)]
        notes: Option<String>,

        /// Do not run the rest countdown in the terminal
        #[arg(long)]
        skip_rest: bool,
    },

    /// Remove the most recently logged set of an exercise
    Undo {
        /// Exercise position (1-based)
        #[arg(long)]
        exercise: usize,
    },

    /// Run a rest countdown in the terminal
    Rest {
        /// Use the secondary (accessory) rest duration
        #[arg(long)]
        secondary: bool,

        /// Explicit duration in seconds, overriding the configured one
        #[arg(long)]
        seconds: Option<u32>,
    },

    /// Finish the session: snapshot performance into history
    Finish {
        /// Muscle soreness, 1-5
        #[arg(long)]
        doms: u8,

        /// Sleep quality, 1-5
        #[arg(long)]
        sleep: u8,

        /// Stress level, 1-5
        #[arg(long)]
        stress: u8,

        /// Session notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List stored workouts
    Workouts,

    /// Switch the active workout by name or id
    Switch { workout: String },

    /// Export the active workout's history to CSV
    Export {
        /// Output path (defaults to <data-dir>/history.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    workout_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = WorkoutStore::new(&data_dir);

    match cli.command {
        Commands::Init { plan } => cmd_init(&store, plan),
        Commands::Status => cmd_status(&store),
        Commands::Log {
            exercise,
            reps,
            weight,
            duration,
            speed,
            level,
            rpe,
            notes,
            skip_rest,
        } => cmd_log(
            &store, &config, exercise, reps, weight, duration, speed, level, rpe, notes, skip_rest,
        ),
        Commands::Undo { exercise } => cmd_undo(&store, &config, exercise),
        Commands::Rest { secondary, seconds } => cmd_rest(&config, secondary, seconds),
        Commands::Finish {
            doms,
            sleep,
            stress,
            notes,
        } => cmd_finish(&store, &config, doms, sleep, stress, notes),
        Commands::Workouts => cmd_workouts(&store),
        Commands::Switch { workout } => cmd_switch(&store, &workout),
        Commands::Export { out } => cmd_export(&store, out.unwrap_or_else(|| data_dir.join("history.csv"))),
    }
}

fn cmd_init(store: &WorkoutStore, plan_path: Option<PathBuf>) -> Result<()> {
    let plan = match plan_path {
        Some(path) => load_plan(&path)?,
        None => starter_plan().clone(),
    };

    let workout = plan.instantiate();
    store.save_workout(&workout)?;
    store.set_active(Some(workout.id))?;

    println!("✓ Created workout '{}' ({} exercises)", workout.name, workout.exercises.len());
    println!("  Now active: {}", workout.id);
    Ok(())
}

fn cmd_status(store: &WorkoutStore) -> Result<()> {
    let workout = load_active(store)?;

    println!("\n{}", workout.name);
    println!("─────────────────────────────────────────");

    for (i, exercise) in workout.exercises.iter().enumerate() {
        let done = progression::next_set_index(exercise);
        let total = progression::target_sets(exercise);
        let marker = if progression::is_complete(exercise) {
            "✓"
        } else {
            " "
        };
        println!(
            "{} {}. {} - {}/{} sets  [{}]",
            marker,
            i + 1,
            exercise.name,
            done,
            total,
            describe_target(exercise)
        );
    }

    match next_unfinished(&workout) {
        Some(i) => {
            let exercise = &workout.exercises[i];
            println!(
                "\nNext: set {} of '{}'",
                progression::next_set_index(exercise) + 1,
                exercise.name
            );
        }
        None => println!("\nAll exercises complete - run `replog finish` to commit the session."),
    }

    if let Some(last) = last_session(&workout) {
        let summary = summarize(last);
        println!(
            "Last session: {} ({} sets, {:.0} kg total, {:.0} cardio min)",
            summary.performed_at.format("%Y-%m-%d"),
            summary.set_count,
            summary.tonnage,
            summary.cardio_minutes
        );
    }
    println!();
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_log(
    store: &WorkoutStore,
    config: &Config,
    exercise: Option<usize>,
    reps: Option<u32>,
    weight: Option<f64>,
    duration: Option<f64>,
    speed: Option<f64>,
    level: Option<f64>,
    rpe: Option<f64>,
    notes: Option<String>,
    skip_rest: bool,
) -> Result<()> {
    let workout = load_active(store)?;
    let mut engine = SessionEngine::new(workout, store.clone(), config.rest.clone());

    let index = match exercise {
        Some(n) if n >= 1 => n - 1,
        Some(_) => return Err(Error::Validation("exercise positions are 1-based".into())),
        None => next_unfinished(engine.workout()).ok_or_else(|| {
            Error::Validation("every exercise is complete; run `replog finish`".into())
        })?,
    };
    engine.select_exercise(index);

    let current = engine
        .current_exercise()
        .ok_or_else(|| Error::Validation("workout has no exercises".into()))?;

    // Build the record from whichever attribute set fits the exercise
    let mut record = if current.is_strength() {
        let target_weight = match current.target {
            ExerciseTarget::Strength { weight, .. } => weight,
            _ => 0.0,
        };
        let reps =
            reps.ok_or_else(|| Error::Validation("--reps is required for strength".into()))?;
        SetPerformance::strength(reps, weight.unwrap_or(target_weight))
    } else {
        SetPerformance::cardio(
            duration.unwrap_or(0.0),
            speed.unwrap_or(0.0),
            level.unwrap_or(0.0),
        )
    };
    if let Some(rpe) = rpe {
        record = record.with_rpe(Rpe::new(rpe)?);
    }
    if let Some(notes) = notes {
        record = record.with_notes(notes);
    }

    let name = current.name.clone();
    let started = engine.log_next_set(record)?;

    let exercise = engine.current_exercise().ok_or_else(|| {
        Error::Validation("workout has no exercises".into())
    })?;
    println!(
        "✓ Logged set {}/{} for '{}'",
        progression::next_set_index(exercise),
        progression::target_sets(exercise),
        name
    );

    if let Some(seconds) = started {
        if skip_rest {
            println!("  Rest timer skipped ({}s configured)", seconds);
            engine.skip_rest();
        } else {
            run_countdown(seconds)?;
        }
    }

    Ok(())
}

fn cmd_undo(store: &WorkoutStore, config: &Config, exercise: usize) -> Result<()> {
    if exercise < 1 {
        return Err(Error::Validation("exercise positions are 1-based".into()));
    }

    let workout = load_active(store)?;
    let mut engine = SessionEngine::new(workout, store.clone(), config.rest.clone());
    engine.select_exercise(exercise - 1);

    let name = engine
        .current_exercise()
        .map(|e| e.name.clone())
        .unwrap_or_default();
    engine.undo_last_set()?;

    println!(
        "✓ Undid last set for '{}' ({} logged)",
        name,
        engine
            .current_exercise()
            .map(progression::next_set_index)
            .unwrap_or(0)
    );
    Ok(())
}

fn cmd_rest(config: &Config, secondary: bool, seconds: Option<u32>) -> Result<()> {
    let kind = if secondary {
        RestTimerKind::Secondary
    } else {
        RestTimerKind::Primary
    };
    let seconds = seconds.unwrap_or_else(|| config.rest.duration_seconds(kind));
    run_countdown(seconds)
}

fn cmd_finish(
    store: &WorkoutStore,
    config: &Config,
    doms: u8,
    sleep: u8,
    stress: u8,
    notes: Option<String>,
) -> Result<()> {
    let workout = load_active(store)?;
    let mut engine = SessionEngine::new(workout, store.clone(), config.rest.clone());

    let feedback = SubjectiveFeedback {
        doms,
        sleep_quality: sleep,
        stress_level: stress,
        session_notes: notes,
    };

    match engine.finish_session(feedback, chrono::Utc::now()) {
        Ok(entry) => {
            let summary = summarize(&entry);
            println!("✓ Session committed: {} exercises, {} sets", summary.exercise_count, summary.set_count);
            println!("  History now has {} entries", engine.workout().history.len());
            Ok(())
        }
        Err(Error::NoProgressRecorded) => {
            println!("Nothing to commit: no sets were logged this session.");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn cmd_workouts(store: &WorkoutStore) -> Result<()> {
    let workouts = store.list_workouts()?;
    if workouts.is_empty() {
        println!("No workouts yet - run `replog init` to create one.");
        return Ok(());
    }

    let active = store.active_workout_id()?;
    for workout in workouts {
        let marker = if Some(workout.id) == active { "*" } else { " " };
        println!(
            "{} {}  ({} exercises, {} sessions)  {}",
            marker,
            workout.name,
            workout.exercises.len(),
            workout.history.len(),
            workout.id
        );
    }
    Ok(())
}

fn cmd_switch(store: &WorkoutStore, query: &str) -> Result<()> {
    let workouts = store.list_workouts()?;

    let found = workouts
        .iter()
        .find(|w| w.name.eq_ignore_ascii_case(query))
        .or_else(|| {
            Uuid::parse_str(query)
                .ok()
                .and_then(|id| workouts.iter().find(|w| w.id == id))
        });

    match found {
        Some(workout) => {
            store.set_active(Some(workout.id))?;
            println!("✓ Active workout: {}", workout.name);
            Ok(())
        }
        None => Err(Error::Validation(format!("no workout matches '{}'", query))),
    }
}

fn cmd_export(store: &WorkoutStore, out: PathBuf) -> Result<()> {
    let workout = load_active(store)?;
    let rows = export_history(&workout, &out)?;
    println!("✓ Exported {} rows to {}", rows, out.display());
    Ok(())
}

fn load_active(store: &WorkoutStore) -> Result<Workout> {
    store.load_active_workout()?.ok_or_else(|| {
        Error::Validation("no active workout - run `replog init` or `replog switch`".into())
    })
}

/// First exercise with unlogged sets, in plan order
fn next_unfinished(workout: &Workout) -> Option<usize> {
    workout
        .exercises
        .iter()
        .position(|e| !progression::is_complete(e))
}

fn describe_target(exercise: &Exercise) -> String {
    match &exercise.target {
        ExerciseTarget::Strength { sets, reps, weight, .. } => {
            format!("{}x{} @ {}", sets, reps, weight)
        }
        ExerciseTarget::Cardio {
            duration_minutes,
            speed,
            level,
        } => format!("{}min, speed {}, level {}", duration_minutes, speed, level),
    }
}

/// Terminal bell as the alarm cue
struct TerminalBell;

impl AlarmSink for TerminalBell {
    fn play_cue(&mut self) -> Result<()> {
        print!("\x07");
        io::stdout().flush()?;
        Ok(())
    }
}

/// Drive a rest countdown in the foreground
///
/// Prints the remaining time once per second; on expiry the bell repeats
/// until Enter dismisses it. Cue failures never stop the countdown.
fn run_countdown(seconds: u32) -> Result<()> {
    let mut timer = RestTimer::new();
    let mut bell = TerminalBell;
    timer.start(seconds)?;

    println!("  Resting {}s (Ctrl-C to abandon)", seconds);
    while timer.phase() == TimerPhase::Running {
        print!("\r  {:>4}s remaining ", timer.time_left());
        io::stdout().flush()?;
        std::thread::sleep(Duration::from_secs(1));
        timer.tick(&mut bell);
    }

    if timer.is_alarming() {
        println!("\r  Rest over - press Enter to dismiss");

        // Repeat the cue in the background until dismissed
        let dismissed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dismissed);
        let ringer = std::thread::spawn(move || {
            let mut bell = TerminalBell;
            while !flag.load(Ordering::Relaxed) {
                if let Err(e) = bell.play_cue() {
                    tracing::warn!("Alarm cue unavailable: {}", e);
                }
                std::thread::sleep(Duration::from_millis(1200));
            }
        });

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        dismissed.store(true, Ordering::Relaxed);
        let _ = ringer.join();

        timer.stop();
    }

    Ok(())
}
