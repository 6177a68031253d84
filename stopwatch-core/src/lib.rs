//! Pure timekeeping logic with no platform dependencies.
//! Every operation takes the current monotonic time in milliseconds, so the
//! engine is testable on host with a simulated clock.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerState {
    /// Zero and never started since creation or the last reset.
    Stopped,
    Running,
    /// Stopped with accumulated time from earlier running segments.
    Paused,
}

/// Label of the primary start/pause control for a given state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PrimaryLabel {
    Start,
    Resume,
    Pause,
}

impl PrimaryLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryLabel::Start => "Start",
            PrimaryLabel::Resume => "Resume",
            PrimaryLabel::Pause => "Pause",
        }
    }

    /// The control is visually emphasised only while the timer runs.
    pub fn is_emphasized(&self) -> bool {
        *self == PrimaryLabel::Pause
    }
}

impl fmt::Display for PrimaryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded lap split.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Lap {
    /// 1-based position in recording order.
    pub number: usize,
    pub elapsed_ms: u64,
}

impl fmt::Display for Lap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lap {}: {}", self.number, format_duration(self.elapsed_ms))
    }
}

/// The three zero-padded fields of the time display.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Readout {
    pub minutes: String,
    pub seconds: String,
    pub hundredths: String,
}

impl Readout {
    pub fn from_ms(ms: u64) -> Self {
        let (m, s, cs) = split_duration(ms);
        Self {
            minutes: format!("{:02}", m),
            seconds: format!("{:02}", s),
            hundredths: format!("{:02}", cs),
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.minutes, self.seconds, self.hundredths)
    }
}

pub struct TimerEngine {
    state: TimerState,
    elapsed_ms: u64,
    // Clock reading when the current running segment began. Together with
    // the accumulator this is the `now - accumulated` start instant.
    segment_start_ms: u64,
    paused_accumulator_ms: u64,
    laps: Vec<u64>,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            elapsed_ms: 0,
            segment_start_ms: 0,
            paused_accumulator_ms: 0,
            laps: Vec::new(),
        }
    }

    /// Returns false when the timer was already running.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.state == TimerState::Running {
            return false;
        }
        self.segment_start_ms = now_ms;
        self.state = TimerState::Running;
        log::debug!("started at {}ms with {}ms carried over", now_ms, self.paused_accumulator_ms);
        true
    }

    /// Returns false when the timer was not running.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.refresh(now_ms);
        self.paused_accumulator_ms = self.elapsed_ms;
        self.state = TimerState::Paused;
        log::debug!("paused at {}ms elapsed", self.elapsed_ms);
        true
    }

    /// Pauses when running, starts otherwise. Returns true if now running.
    pub fn toggle(&mut self, now_ms: u64) -> bool {
        if self.is_running() {
            self.pause(now_ms);
        } else {
            self.start(now_ms);
        }
        self.is_running()
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.pause(now_ms);
        self.elapsed_ms = 0;
        self.segment_start_ms = 0;
        self.paused_accumulator_ms = 0;
        self.laps.clear();
        self.state = TimerState::Stopped;
        log::debug!("reset");
    }

    /// Appends the current elapsed time as a lap. Ignored (None) on a timer
    /// that is stopped at zero.
    pub fn record_lap(&mut self, now_ms: u64) -> Option<Lap> {
        if self.is_running() {
            self.refresh(now_ms);
        }
        if !self.lap_available() {
            return None;
        }
        self.laps.push(self.elapsed_ms);
        let lap = Lap {
            number: self.laps.len(),
            elapsed_ms: self.elapsed_ms,
        };
        log::debug!("recorded {}", lap);
        Some(lap)
    }

    /// Recomputes elapsed time while running. Touches nothing else and
    /// returns None when stopped.
    pub fn tick(&mut self, now_ms: u64) -> Option<u64> {
        if !self.is_running() {
            return None;
        }
        self.refresh(now_ms);
        Some(self.elapsed_ms)
    }

    fn refresh(&mut self, now_ms: u64) {
        let running =
            self.paused_accumulator_ms + now_ms.saturating_sub(self.segment_start_ms);
        // Never step backwards if the caller's clock does.
        self.elapsed_ms = self.elapsed_ms.max(running);
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Elapsed time as of the last operation or tick.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn lap_available(&self) -> bool {
        self.is_running() || self.elapsed_ms > 0
    }

    /// Lap durations in recording order.
    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    /// Laps as display entries, most recent first.
    pub fn laps_newest_first(&self) -> impl Iterator<Item = Lap> + '_ {
        self.laps
            .iter()
            .enumerate()
            .rev()
            .map(|(i, &elapsed_ms)| Lap { number: i + 1, elapsed_ms })
    }

    pub fn primary_label(&self) -> PrimaryLabel {
        match self.state {
            TimerState::Stopped => PrimaryLabel::Start,
            TimerState::Paused => PrimaryLabel::Resume,
            TimerState::Running => PrimaryLabel::Pause,
        }
    }

    pub fn readout(&self) -> Readout {
        Readout::from_ms(self.elapsed_ms)
    }
}

/// Split milliseconds into (minutes, seconds, hundredths). Minutes are not
/// wrapped into hours.
pub fn split_duration(ms: u64) -> (u64, u64, u64) {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let hundredths = (ms % 1000) / 10;
    (minutes, seconds, hundredths)
}

/// Format milliseconds as "MM:SS:CC" (centiseconds)
pub fn format_duration(ms: u64) -> String {
    let (m, s, cs) = split_duration(ms);
    format!("{:02}:{:02}:{:02}", m, s, cs)
}
