use stopwatch_core::{Lap, TimerEngine};

use crate::cli::Config;
use crate::clock::Clock;
use crate::pump::Refresh;
use crate::ui::Display;

pub const HELP_TEXT: &str = "STOPWATCH HELP\n\n\
     ENTER  Start/Pause/Resume\n\
     s      Start/Pause/Resume\n\
     l      Lap\n\
     r      Reset\n\
     h      This help\n\
     q      Quit";

/// Discrete input signals the stopwatch reacts to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Toggle,
    Lap,
    Reset,
    Help,
}

/// Owns the engine and binds it to a clock, a display and a refresh source.
pub struct StopwatchApp<C: Clock, D: Display, R: Refresh> {
    engine: TimerEngine,
    clock: C,
    display: D,
    refresh: R,
    // At most one live refresh signal, held only while running
    pump: Option<R::Handle>,
    tick_ms: u64,
    help_visible: bool,
}

impl<C: Clock, D: Display, R: Refresh> StopwatchApp<C, D, R> {
    pub fn new(config: &Config, clock: C, display: D, refresh: R) -> Self {
        Self {
            engine: TimerEngine::new(),
            clock,
            display,
            refresh,
            pump: None,
            tick_ms: config.tick_ms,
            help_visible: false,
        }
    }

    /// Pushes the complete state to the display.
    pub fn redraw(&mut self) {
        self.display.clear_laps();
        let laps: Vec<Lap> = self.engine.laps_newest_first().collect();
        // Oldest first so the newest ends up on top
        for lap in laps.into_iter().rev() {
            self.display.push_lap(lap);
        }
        self.show_state();
    }

    pub fn handle_action(&mut self, action: Action) {
        if self.help_visible {
            self.help_visible = false;
            self.display.show_help(None);
        }
        match action {
            Action::Toggle => self.toggle(),
            Action::Lap => self.record_lap(),
            Action::Reset => self.reset(),
            Action::Help => {
                self.help_visible = true;
                self.display.show_help(Some(HELP_TEXT));
            }
        }
    }

    pub fn toggle(&mut self) {
        if self.engine.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn start(&mut self) {
        let now = self.clock.now_ms();
        if self.engine.start(now) {
            self.start_pump();
            self.show_state();
        }
    }

    pub fn pause(&mut self) {
        let now = self.clock.now_ms();
        if self.engine.pause(now) {
            self.stop_pump();
            self.show_state();
        }
    }

    pub fn reset(&mut self) {
        let now = self.clock.now_ms();
        self.engine.reset(now);
        self.stop_pump();
        self.display.clear_laps();
        self.show_state();
        log::info!("stopwatch reset");
    }

    pub fn record_lap(&mut self) {
        let now = self.clock.now_ms();
        if let Some(lap) = self.engine.record_lap(now) {
            self.display.push_lap(lap);
            self.display.show_time(&self.engine.readout());
        }
    }

    /// Called for every refresh signal.
    pub fn handle_pump(&mut self) {
        let now = self.clock.now_ms();
        match self.engine.tick(now) {
            Some(elapsed) => {
                log::trace!("tick {}ms", elapsed);
                if !self.help_visible {
                    self.display.show_time(&self.engine.readout());
                }
            }
            // Signal queued before the pause landed
            None => self.stop_pump(),
        }
    }

    /// Releases the refresh signal and hands back its source.
    pub fn into_refresh(mut self) -> R {
        self.stop_pump();
        self.refresh
    }

    #[cfg(test)]
    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    #[cfg(test)]
    pub fn display(&self) -> &D {
        &self.display
    }

    #[cfg(test)]
    pub fn is_pumping(&self) -> bool {
        self.pump.is_some()
    }

    fn show_state(&mut self) {
        self.display
            .show_controls(self.engine.primary_label(), self.engine.lap_available());
        self.display.show_time(&self.engine.readout());
    }

    fn start_pump(&mut self) {
        if self.pump.is_none() {
            log::info!("refresh started every {}ms", self.tick_ms);
            self.pump = Some(self.refresh.begin(self.tick_ms));
        }
    }

    fn stop_pump(&mut self) {
        if self.pump.take().is_some() {
            log::info!("refresh stopped");
        }
    }
}
