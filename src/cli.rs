// Ricochet: command-line interface
//
// Flags for the headless runner. Anything given here overrides the config
// file.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use ricochet_utils::InitialDirection;

/// Width and height given as `WIDTHxHEIGHT`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once(|c| c == 'x' || c == 'X')
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width: f64 = width
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{}'", width))?;
        let height: f64 = height
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{}'", height))?;
        if !(width > 0.0 && height > 0.0) {
            return Err(format!("size must be positive, got '{}'", s));
        }
        Ok(Size { width, height })
    }
}

fn parse_size(s: &str) -> Result<Size, String> {
    s.parse()
}

fn parse_direction(s: &str) -> Result<InitialDirection, String> {
    s.parse().map_err(|e| format!("{}", e))
}

#[derive(Parser, Debug, Clone)]
#[clap(
    name = "ricochet",
    version,
    about = "Bounce an element around a simulated container and report edge hits"
)]
pub struct CliArgs {
    /// KDL file with a `ricochet { .. }` block
    #[clap(long, short, value_parser, env = "RICOCHET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Horizontal speed in units per second [default: 370]
    #[clap(long, value_parser)]
    pub horizontal_speed: Option<f64>,

    /// Vertical speed in units per second [default: 200]
    #[clap(long, value_parser)]
    pub vertical_speed: Option<f64>,

    /// Starting corner: bottom-right, bottom-left, top-right or top-left
    #[clap(long, short, value_parser = parse_direction)]
    pub direction: Option<InitialDirection>,

    /// Container size
    #[clap(long, default_value = "500x300", value_parser = parse_size)]
    pub container: Size,

    /// Animated element size
    #[clap(long, default_value = "50x50", value_parser = parse_size)]
    pub item: Size,

    /// Simulated frames per second
    #[clap(long, default_value_t = 60.0, value_parser)]
    pub fps: f64,

    /// How long to run, e.g. `10s` or `1m 30s`
    #[clap(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub duration: Duration,

    /// Hide the simulated surface at this offset into the run
    #[clap(long, value_parser = humantime::parse_duration)]
    pub hide_at: Option<Duration>,

    /// Show the simulated surface again at this offset into the run
    #[clap(long, value_parser = humantime::parse_duration)]
    pub show_at: Option<Duration>,

    /// Print each hit as a JSON line on stdout
    #[clap(long)]
    pub json: bool,
}
