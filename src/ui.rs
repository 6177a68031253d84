use std::io::Write;

use stopwatch_core::{Lap, PrimaryLabel, Readout};

const CLEAR_HOME: &str = "\x1b[2J\x1b[H";
const REVERSE: &str = "\x1b[7m";
const PLAIN: &str = "\x1b[0m";
const NO_LAPS: &str = "No lap times yet";

/// Sink for everything the stopwatch shows. Each call reflects one change;
/// implementations decide how and when to repaint.
pub trait Display {
    fn show_time(&mut self, readout: &Readout);
    fn show_controls(&mut self, label: PrimaryLabel, lap_enabled: bool);
    /// Adds the newest lap; it is shown above the older ones.
    fn push_lap(&mut self, lap: Lap);
    /// Empties the lap list and restores its placeholder.
    fn clear_laps(&mut self);
    fn show_help(&mut self, _text: Option<&str>) {}
}

/// Full-screen text rendering onto any writer (stdout in the app).
pub struct TerminalDisplay<W: Write> {
    out: W,
    readout: Readout,
    label: PrimaryLabel,
    lap_enabled: bool,
    laps: Vec<Lap>,
    help: Option<String>,
    max_visible_laps: usize,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, max_visible_laps: usize) -> Self {
        Self {
            out,
            readout: Readout::from_ms(0),
            label: PrimaryLabel::Start,
            lap_enabled: false,
            laps: Vec::new(),
            help: None,
            max_visible_laps,
        }
    }

    #[cfg(test)]
    pub fn writer(&self) -> &W {
        &self.out
    }

    fn redraw(&mut self) {
        let screen = match &self.help {
            Some(text) => render_help(text),
            None => self.render_stopwatch(),
        };
        let result = self
            .out
            .write_all(screen.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            log::error!("can't draw stopwatch: {}", e);
        }
    }

    fn render_stopwatch(&self) -> String {
        let mut screen = String::from(CLEAR_HOME);
        screen.push_str("STOPWATCH\n\n");
        screen.push_str(&format!("  {}\n\n", self.readout));

        let primary = if self.label.is_emphasized() {
            format!("{}[ {} ]{}", REVERSE, self.label, PLAIN)
        } else {
            format!("[ {} ]", self.label)
        };
        let lap = if self.lap_enabled { "[ Lap ]" } else { "( Lap )" };
        screen.push_str(&format!("  {}  {}  [ Reset ]\n\n", primary, lap));

        if self.laps.is_empty() {
            screen.push_str(&format!("  {}\n", NO_LAPS));
        } else {
            // Most recent first
            for lap in self.laps.iter().rev().take(self.max_visible_laps) {
                screen.push_str(&format!("  {}\n", lap));
            }
            let hidden = self.laps.len().saturating_sub(self.max_visible_laps);
            if hidden > 0 {
                screen.push_str(&format!("  +{} more\n", hidden));
            }
        }

        screen.push_str("\nENTER=start/pause  l=lap  r=reset  h=help  q=quit\n");
        screen
    }
}

fn render_help(text: &str) -> String {
    let mut screen = String::from(CLEAR_HOME);
    for line in text.lines() {
        screen.push_str(line);
        screen.push('\n');
    }
    screen.push_str("\nAny command closes this screen\n");
    screen
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn show_time(&mut self, readout: &Readout) {
        self.readout = readout.clone();
        self.redraw();
    }

    fn show_controls(&mut self, label: PrimaryLabel, lap_enabled: bool) {
        self.label = label;
        self.lap_enabled = lap_enabled;
        self.redraw();
    }

    fn push_lap(&mut self, lap: Lap) {
        self.laps.push(lap);
        self.redraw();
    }

    fn clear_laps(&mut self) {
        self.laps.clear();
        self.redraw();
    }

    fn show_help(&mut self, text: Option<&str>) {
        self.help = text.map(str::to_owned);
        self.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_screen(display: &TerminalDisplay<Vec<u8>>) -> String {
        let text = String::from_utf8(display.writer().clone()).unwrap();
        let start = text.rfind(CLEAR_HOME).unwrap();
        text[start..].to_string()
    }

    #[test]
    fn test_initial_screen_shows_placeholder() {
        let mut display = TerminalDisplay::new(Vec::new(), 5);
        display.show_time(&Readout::from_ms(0));
        let screen = last_screen(&display);
        assert!(screen.contains("00:00:00"));
        assert!(screen.contains(NO_LAPS));
        assert!(screen.contains("[ Start ]"));
        assert!(screen.contains("( Lap )"));
    }

    #[test]
    fn test_laps_newest_first_replace_placeholder() {
        let mut display = TerminalDisplay::new(Vec::new(), 5);
        display.push_lap(Lap { number: 1, elapsed_ms: 1500 });
        display.push_lap(Lap { number: 2, elapsed_ms: 3000 });
        let screen = last_screen(&display);
        assert!(!screen.contains(NO_LAPS));
        let first = screen.find("Lap 2: 00:03:00").unwrap();
        let second = screen.find("Lap 1: 00:01:50").unwrap();
        assert!(first < second);

        display.clear_laps();
        assert!(last_screen(&display).contains(NO_LAPS));
    }

    #[test]
    fn test_lap_list_is_capped() {
        let mut display = TerminalDisplay::new(Vec::new(), 2);
        for number in 1..=5 {
            display.push_lap(Lap { number, elapsed_ms: number as u64 * 1000 });
        }
        let screen = last_screen(&display);
        assert!(screen.contains("Lap 5:"));
        assert!(screen.contains("Lap 4:"));
        assert!(!screen.contains("Lap 3:"));
        assert!(screen.contains("+3 more"));
    }

    #[test]
    fn test_running_label_is_emphasized() {
        let mut display = TerminalDisplay::new(Vec::new(), 5);
        display.show_controls(PrimaryLabel::Pause, true);
        let screen = last_screen(&display);
        assert!(screen.contains(&format!("{}[ Pause ]{}", REVERSE, PLAIN)));
        assert!(screen.contains("[ Lap ]"));

        display.show_controls(PrimaryLabel::Resume, true);
        assert!(!last_screen(&display).contains(REVERSE));
    }

    #[test]
    fn test_help_overlay() {
        let mut display = TerminalDisplay::new(Vec::new(), 5);
        display.show_help(Some("STOPWATCH HELP\nl  Lap"));
        let screen = last_screen(&display);
        assert!(screen.contains("STOPWATCH HELP"));
        assert!(!screen.contains(NO_LAPS));

        display.show_help(None);
        assert!(last_screen(&display).contains(NO_LAPS));
    }
}
