use clap::Parser;

pub const DEFAULT_TICK_MS: u64 = 10;
pub const DEFAULT_MAX_VISIBLE_LAPS: usize = 10;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about)]
pub struct Arguments {
    #[arg(short = 'v', long = None, action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Display refresh interval while running
    #[arg(
        long,
        env = "STOPWATCH_TICK_MS",
        default_value_t = DEFAULT_TICK_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_ms: u64,

    /// How many of the newest laps to list
    #[arg(long, env = "STOPWATCH_MAX_VISIBLE_LAPS", default_value_t = DEFAULT_MAX_VISIBLE_LAPS)]
    pub max_visible_laps: usize,
}

impl Arguments {
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub tick_ms: u64,
    pub max_visible_laps: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            max_visible_laps: DEFAULT_MAX_VISIBLE_LAPS,
        }
    }
}

impl From<&Arguments> for Config {
    fn from(arguments: &Arguments) -> Self {
        Self {
            tick_ms: arguments.tick_ms,
            max_visible_laps: arguments.max_visible_laps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let arguments = Arguments::try_parse_from(["stopwatch"]).unwrap();
        assert_eq!(Config::from(&arguments), Config::default());
        assert_eq!(arguments.log_filter(), "warn");
    }

    #[test]
    fn test_flags() {
        let arguments =
            Arguments::try_parse_from(["stopwatch", "-vv", "--tick-ms", "50", "--max-visible-laps", "3"])
                .unwrap();
        assert_eq!(arguments.log_filter(), "debug");
        let config = Config::from(&arguments);
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.max_visible_laps, 3);
    }

    #[test]
    fn test_zero_tick_rejected() {
        assert!(Arguments::try_parse_from(["stopwatch", "--tick-ms", "0"]).is_err());
    }
}
