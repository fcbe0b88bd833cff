use serde::{Deserialize, Serialize};

use crate::models::StudyTime;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
const MIN_INTERVAL_MINUTES: u32 = 1;
const SECS_PER_MINUTE: u32 = 60;

/// Clamp a user-entered duration to at least one minute.
pub fn clamp_minutes(raw: i64) -> u32 {
    u32::try_from(raw.max(i64::from(MIN_INTERVAL_MINUTES))).unwrap_or(u32::MAX / SECS_PER_MINUTE)
}

/// Parse a duration field the way the settings form does: an optional sign
/// followed by the leading digits, so "30.5" and "45min" read as 30 and 45.
/// Text without a leading number counts as zero, then the one-minute floor
/// applies.
pub fn parse_minutes(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = unsigned
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
        });

    clamp_minutes(if negative { -magnitude } else { magnitude })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    #[default]
    Work,
    Break,
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::Break => "break",
        }
    }
}

/// What a single `tick` did to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer was not running; nothing changed.
    Ignored,
    Counted,
    /// The countdown hit zero on this tick and the timer moved to the other
    /// mode. `finished` is the mode that just ended.
    IntervalCompleted { finished: TimerMode },
}

/// Focus/break interval timer owned by a single entry form.
///
/// `total_secs_elapsed` only grows while running in work mode and is never
/// reset; it and `pomodoros_completed` are the totals that end up in the
/// saved study entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub mode: TimerMode,
    pub time_left_secs: u32,
    pub total_secs_elapsed: u64,
    pub pomodoros_completed: u32,
    /// Configured durations. Changing them does not touch a countdown that is
    /// already loaded; the next `reset` or `switch_mode` picks them up.
    pub work_minutes: u32,
    pub break_minutes: u32,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_MINUTES, DEFAULT_BREAK_MINUTES)
    }
}

impl TimerState {
    pub fn new(work_minutes: u32, break_minutes: u32) -> Self {
        let work_minutes = work_minutes.max(MIN_INTERVAL_MINUTES);
        let break_minutes = break_minutes.max(MIN_INTERVAL_MINUTES);
        Self {
            status: TimerStatus::Idle,
            mode: TimerMode::Work,
            time_left_secs: work_minutes.saturating_mul(SECS_PER_MINUTE),
            total_secs_elapsed: 0,
            pomodoros_completed: 0,
            work_minutes,
            break_minutes,
        }
    }

    /// Resume counting from an existing pomodoro total.
    pub fn with_pomodoros(mut self, pomodoros_completed: u32) -> Self {
        self.pomodoros_completed = pomodoros_completed;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn configure(&mut self, work_minutes: u32, break_minutes: u32) {
        self.work_minutes = work_minutes.max(MIN_INTERVAL_MINUTES);
        self.break_minutes = break_minutes.max(MIN_INTERVAL_MINUTES);
    }

    pub fn duration_secs(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Work => self.work_minutes.saturating_mul(SECS_PER_MINUTE),
            TimerMode::Break => self.break_minutes.saturating_mul(SECS_PER_MINUTE),
        }
    }

    /// Returns `true` when the timer went from idle to running, which is the
    /// moment the start cue should play.
    pub fn start(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.status = TimerStatus::Running;
        true
    }

    pub fn pause(&mut self) {
        self.status = TimerStatus::Idle;
    }

    /// Start/pause button. Returns `true` if the timer was started.
    pub fn toggle(&mut self) -> bool {
        if self.is_active() {
            self.pause();
            false
        } else {
            self.start()
        }
    }

    /// Reload the countdown for the current mode. Totals are kept.
    pub fn reset(&mut self) {
        self.time_left_secs = self.duration_secs(self.mode);
    }

    pub fn switch_mode(&mut self, mode: TimerMode) {
        self.status = TimerStatus::Idle;
        self.mode = mode;
        self.time_left_secs = self.duration_secs(mode);
    }

    /// Advance the timer by one second of wall time.
    ///
    /// The transition to the other mode happens within the tick that reaches
    /// zero, so a running timer never sits at `time_left_secs == 0`.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_active() || self.time_left_secs == 0 {
            return TickOutcome::Ignored;
        }

        self.time_left_secs -= 1;
        if self.mode == TimerMode::Work {
            self.total_secs_elapsed += 1;
        }

        if self.time_left_secs == 0 {
            let finished = self.complete_interval();
            return TickOutcome::IntervalCompleted { finished };
        }

        TickOutcome::Counted
    }

    fn complete_interval(&mut self) -> TimerMode {
        let finished = self.mode;
        self.status = TimerStatus::Idle;
        match finished {
            TimerMode::Work => {
                self.pomodoros_completed += 1;
                self.mode = TimerMode::Break;
            }
            TimerMode::Break => {
                self.mode = TimerMode::Work;
            }
        }
        self.time_left_secs = self.duration_secs(self.mode);
        finished
    }

    pub fn elapsed_breakdown(&self) -> StudyTime {
        StudyTime::from_seconds(self.total_secs_elapsed)
    }

    /// Countdown as `MM:SS`; minutes are not wrapped into hours.
    pub fn countdown_label(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.time_left_secs / SECS_PER_MINUTE,
            self.time_left_secs % SECS_PER_MINUTE
        )
    }

    /// Share of the current interval already used, in `0.0..=1.0`.
    pub fn interval_fraction(&self) -> f64 {
        let duration = self.duration_secs(self.mode);
        let fraction = 1.0 - f64::from(self.time_left_secs) / f64::from(duration);
        fraction.clamp(0.0, 1.0)
    }
}
