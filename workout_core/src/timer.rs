//! Rest timer state machine.
//!
//! A single countdown with three phases:
//!
//! ```text
//! Idle --start--> Running --timeLeft==0--> Alarming --stop--> Idle
//!                    |                                  ^
//!                    +-----------stop------------------>+
//! ```
//!
//! The timer is a plain owned value with no ambient state and no knowledge
//! of exercises. It does not schedule anything itself: the driver (CLI
//! loop, UI tick, test) calls [`RestTimer::tick`] once per elapsed second.
//! Because `start` replaces the whole countdown state, a superseded
//! countdown can never fire its alarm.

use crate::{Error, Result};

/// Phase of the rest timer state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Alarming,
}

/// Best-effort audible cue for the alarm phase
///
/// Implementations may fail (no audio device, autoplay policy, detached
/// terminal); the timer swallows those failures and keeps transitioning
/// states normally.
pub trait AlarmSink {
    fn play_cue(&mut self) -> Result<()>;
}

/// Alarm sink that produces no sound (headless/test use)
#[derive(Debug, Default)]
pub struct SilentAlarm;

impl AlarmSink for SilentAlarm {
    fn play_cue(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Countdown timer for the rest between sets
#[derive(Clone, Debug)]
pub struct RestTimer {
    phase: TimerPhase,
    /// Remaining seconds, clamped >= 0
    time_left: u32,
    /// Denominator for progress rendering; grows with `add_time`
    initial_duration: u32,
}

impl Default for RestTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl RestTimer {
    pub fn new() -> Self {
        Self {
            phase: TimerPhase::Idle,
            time_left: 0,
            initial_duration: 0,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Active from `start` until it is stopped or the alarm is dismissed
    pub fn is_active(&self) -> bool {
        self.phase != TimerPhase::Idle
    }

    pub fn is_alarming(&self) -> bool {
        self.phase == TimerPhase::Alarming
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn initial_duration(&self) -> u32 {
        self.initial_duration
    }

    /// Remaining fraction of the countdown, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.initial_duration == 0 {
            return 0.0;
        }
        f64::from(self.time_left) / f64::from(self.initial_duration)
    }

    /// Begin a countdown of `duration_seconds`
    ///
    /// Re-entrant: any countdown already in flight (running or alarming)
    /// is discarded without firing its alarm.
    pub fn start(&mut self, duration_seconds: u32) -> Result<()> {
        if duration_seconds == 0 {
            return Err(Error::Validation(
                "rest duration must be a positive number of seconds".into(),
            ));
        }

        if self.phase != TimerPhase::Idle {
            tracing::debug!("Superseding countdown with {}s left", self.time_left);
        }

        self.phase = TimerPhase::Running;
        self.time_left = duration_seconds;
        self.initial_duration = duration_seconds;
        tracing::debug!("Rest timer started: {}s", duration_seconds);
        Ok(())
    }

    /// Extend the running countdown by `seconds`
    ///
    /// Both the remaining time and the initial duration grow, so a
    /// progress bar computed as `time_left / initial_duration` stays
    /// monotonically consistent. No-op while idle or already alarming.
    pub fn add_time(&mut self, seconds: u32) {
        if self.phase != TimerPhase::Running || self.time_left == 0 {
            tracing::debug!("add_time ignored in phase {:?}", self.phase);
            return;
        }
        self.time_left += seconds;
        self.initial_duration += seconds;
        tracing::debug!("Rest timer extended by {}s to {}s", seconds, self.time_left);
    }

    /// Cancel the countdown and silence any alarm (a.k.a. "skip")
    ///
    /// Valid from any phase; dismissing the alarm and skipping the rest
    /// are the same transition.
    pub fn stop(&mut self) {
        if self.phase != TimerPhase::Idle {
            tracing::debug!("Rest timer stopped from {:?}", self.phase);
        }
        self.phase = TimerPhase::Idle;
        self.time_left = 0;
        self.initial_duration = 0;
    }

    /// Advance the timer by one second of elapsed time
    ///
    /// While running, decrements the remaining time; on reaching zero the
    /// timer enters the alarm phase and cues the sink. While alarming, the
    /// cue repeats every tick until dismissed. Cue failures are logged and
    /// swallowed: the state machine never depends on audio working.
    pub fn tick(&mut self, alarm: &mut dyn AlarmSink) {
        match self.phase {
            TimerPhase::Idle => {}
            TimerPhase::Running => {
                self.time_left = self.time_left.saturating_sub(1);
                if self.time_left == 0 {
                    self.phase = TimerPhase::Alarming;
                    tracing::info!("Rest timer expired, alarming");
                    self.cue(alarm);
                }
            }
            TimerPhase::Alarming => {
                self.cue(alarm);
            }
        }
    }

    fn cue(&self, alarm: &mut dyn AlarmSink) {
        if let Err(e) = alarm.play_cue() {
            tracing::warn!("Alarm cue unavailable: {}", e);
        }
    }
}
