#![forbid(unsafe_code)]

//! Core domain model and business logic for the Replog workout tracker.
//!
//! This crate provides:
//! - Domain types (exercises, set performance, workouts, sessions)
//! - Rest timer state machine
//! - Exercise progression tracking
//! - Session commit (history snapshot + working-state reset)
//! - Persistence (workout documents, config), history queries, CSV export
//! - Workout plan definitions

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod timer;
pub mod progression;
pub mod session;
pub mod store;
pub mod history;
pub mod csv_export;
pub mod plan;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, RestConfig};
pub use timer::{AlarmSink, RestTimer, SilentAlarm, TimerPhase};
pub use progression::{central_action, should_auto_start, CentralAction};
pub use session::{commit_session, CommittedSession, SessionPhase};
pub use store::WorkoutStore;
pub use history::{last_session, recent_sessions, summarize, SessionSummary};
pub use csv_export::export_history;
pub use plan::{load_plan, parse_plan, starter_plan, WorkoutPlan};
pub use engine::SessionEngine;
