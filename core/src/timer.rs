use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, info};

pub const DEFAULT_DURATION_MINUTES: u32 = 25;
pub const MAX_MINUTES: u32 = 99;
pub const MAX_SECONDS: u32 = 59;

/// Source of wall-clock instants for the timer
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Expired,
}

impl TimerState {
    pub fn label(&self) -> &'static str {
        match self {
            TimerState::Idle => "paused",
            TimerState::Running => "running",
            TimerState::Expired => "done",
        }
    }
}

/// Seconds counted down by one tick, owed to the line the run was started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accrual {
    pub line_id: String,
    pub seconds: u64,
}

/// Handle of a running countdown. Dropping it stops all further ticks.
#[derive(Debug)]
struct Run {
    line_id: String,
    last_tick: Instant,
}

/// Countdown clock for one focus session.
///
/// Ticks measure wall-clock time since the previous tick, so a late tick
/// still counts every elapsed second. Only whole seconds are counted; the
/// fractional remainder carries over to the next tick.
#[derive(Debug)]
pub struct FocusTimer {
    duration_secs: u64,
    remaining_secs: u64,
    state: TimerState,
    run: Option<Run>,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_MINUTES)
    }
}

impl FocusTimer {
    pub fn new(minutes: u32) -> Self {
        let duration_secs = u64::from(minutes.min(MAX_MINUTES)) * 60;
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            state: TimerState::Idle,
            run: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Id of the line the current run accrues to
    pub fn bound_line(&self) -> Option<&str> {
        self.run.as_ref().map(|r| r.line_id.as_str())
    }

    /// Remaining time as `MM:SS`
    pub fn format_remaining(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    /// Start counting down for `line_id`. Returns whether the timer started.
    pub fn start(&mut self, now: Instant, line_id: &str) -> bool {
        if self.state == TimerState::Running {
            return false;
        }
        if self.remaining_secs == 0 {
            debug!("timer: nothing left to count down");
            return false;
        }
        self.state = TimerState::Running;
        self.run = Some(Run {
            line_id: line_id.to_string(),
            last_tick: now,
        });
        debug!("timer: started with {}s for line {}", self.remaining_secs, line_id);
        true
    }

    pub fn pause(&mut self) {
        if self.state != TimerState::Running {
            return;
        }
        self.state = TimerState::Idle;
        self.run = None;
        debug!("timer: paused at {}s", self.remaining_secs);
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.run = None;
        self.remaining_secs = self.duration_secs;
    }

    /// Advance the countdown to `now`.
    ///
    /// Returns the whole seconds elapsed since the last tick, if any. The
    /// remaining time floors at zero but the full elapsed time is credited.
    pub fn tick(&mut self, now: Instant) -> Option<Accrual> {
        if self.state != TimerState::Running {
            return None;
        }
        let run = self.run.as_mut()?;

        let elapsed = now.saturating_duration_since(run.last_tick).as_secs();
        if elapsed == 0 {
            return None;
        }
        run.last_tick += Duration::from_secs(elapsed);

        self.remaining_secs = self.remaining_secs.saturating_sub(elapsed);
        let line_id = run.line_id.clone();

        if self.remaining_secs == 0 {
            self.state = TimerState::Expired;
            self.run = None;
            info!("focus timer expired");
        }

        Some(Accrual {
            line_id,
            seconds: elapsed,
        })
    }

    /// Change the configured duration and reset to it
    pub fn set_duration(&mut self, minutes: u32) {
        self.duration_secs = u64::from(minutes.min(MAX_MINUTES)) * 60;
        self.reset();
    }

    /// Manually set the time. Rejected while running.
    ///
    /// Minutes clamp to 0..=99 and seconds to 0..=59; the value becomes both
    /// the configured duration and the remaining time.
    pub fn set_remaining(&mut self, minutes: u32, seconds: u32) -> bool {
        if self.state == TimerState::Running {
            debug!("timer: ignoring manual edit while running");
            return false;
        }
        let total = u64::from(minutes.min(MAX_MINUTES)) * 60 + u64::from(seconds.min(MAX_SECONDS));
        self.duration_secs = total;
        self.remaining_secs = total;
        self.state = TimerState::Idle;
        self.run = None;
        true
    }
}
