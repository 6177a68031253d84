mod cli;
mod clock;
mod pump;
mod stopwatch;
mod ui;

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Sender};
use std::thread;

use anyhow::Context;
use clap::Parser;

use crate::cli::{Arguments, Config};
use crate::clock::MonotonicClock;
use crate::pump::Pump;
use crate::stopwatch::{Action, StopwatchApp};
use crate::ui::TerminalDisplay;

#[derive(Debug, PartialEq)]
enum AppEvent {
    Redraw,
    Action(Action),
    Pump,
    Quit,
}

fn main() -> anyhow::Result<()> {
    let arguments = Arguments::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(arguments.log_filter()))
        .try_init()
        .context("can't install logger")?;
    log::info!("stopwatch starting: {:?}", arguments);

    let config = Config::from(&arguments);
    let (sender, events) = mpsc::channel();

    let pump_sender = sender.clone();
    let pump = Pump::spawn(move || pump_sender.send(AppEvent::Pump).is_ok())
        .context("can't start pump thread")?;

    let input_sender = sender.clone();
    thread::Builder::new()
        .name("input".into())
        .spawn(move || {
            if let Err(e) = read_loop(io::stdin().lock(), &input_sender) {
                log::error!("input failed: {:#}", e);
                input_sender.send(AppEvent::Quit).ok();
            }
        })
        .context("can't start input thread")?;

    let display = TerminalDisplay::new(io::stdout(), config.max_visible_laps);
    let mut app = StopwatchApp::new(&config, MonotonicClock::new(), display, pump);
    sender.send(AppEvent::Redraw)?;

    while let Ok(event) = events.recv() {
        match event {
            AppEvent::Redraw => app.redraw(),
            AppEvent::Action(action) => app.handle_action(action),
            AppEvent::Pump => app.handle_pump(),
            AppEvent::Quit => break,
        }
    }

    app.into_refresh().shutdown();
    log::info!("stopwatch exiting");
    Ok(())
}

/// Posts one event per input line. End of input quits.
fn read_loop<B: BufRead>(input: B, sender: &Sender<AppEvent>) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line.context("can't read input")?;
        match parse_command(&line) {
            Some(event) => {
                let quit = event == AppEvent::Quit;
                sender.send(event)?;
                if quit {
                    return Ok(());
                }
            }
            None => log::debug!("ignoring input {:?}", line),
        }
    }
    sender.send(AppEvent::Quit)?;
    Ok(())
}

fn parse_command(line: &str) -> Option<AppEvent> {
    // A bare ENTER is the primary action, so only trim the line ending
    let command = line.trim_end_matches(['\r', '\n']);
    let command = if command.trim().is_empty() { command } else { command.trim() };
    match command {
        "" | " " | "s" => Some(AppEvent::Action(Action::Toggle)),
        "l" => Some(AppEvent::Action(Action::Lap)),
        "r" => Some(AppEvent::Action(Action::Reset)),
        "h" | "?" => Some(AppEvent::Action(Action::Help)),
        "q" => Some(AppEvent::Quit),
        _ => None,
    }
}
