// Ricochet: session options
//
// Speeds and starting corner for one ricochet session, with KDL loading:
//
// ricochet {
//     horizontal-speed 370
//     vertical-speed 200
//     initial-direction "bottom-right"
// }

use kdl::{KdlDocument, KdlValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::errors::{ConfigError, ConfigResult};
use crate::geometry::Direction;

pub const DEFAULT_HORIZONTAL_SPEED: f64 = 370.0;
pub const DEFAULT_VERTICAL_SPEED: f64 = 200.0;

/// The corner the element initially heads toward
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitialDirection {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl InitialDirection {
    pub const ALL: [InitialDirection; 4] = [
        InitialDirection::BottomRight,
        InitialDirection::BottomLeft,
        InitialDirection::TopRight,
        InitialDirection::TopLeft,
    ];

    /// Starting (horizontal, vertical) travel directions
    pub fn directions(self) -> (Direction, Direction) {
        match self {
            InitialDirection::BottomRight => (Direction::Positive, Direction::Positive),
            InitialDirection::BottomLeft => (Direction::Negative, Direction::Positive),
            InitialDirection::TopRight => (Direction::Positive, Direction::Negative),
            InitialDirection::TopLeft => (Direction::Negative, Direction::Negative),
        }
    }
}

impl fmt::Display for InitialDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialDirection::BottomRight => write!(f, "bottom-right"),
            InitialDirection::BottomLeft => write!(f, "bottom-left"),
            InitialDirection::TopRight => write!(f, "top-right"),
            InitialDirection::TopLeft => write!(f, "top-left"),
        }
    }
}

impl FromStr for InitialDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bottom-right" => Ok(InitialDirection::BottomRight),
            "bottom-left" => Ok(InitialDirection::BottomLeft),
            "top-right" => Ok(InitialDirection::TopRight),
            "top-left" => Ok(InitialDirection::TopLeft),
            _ => Err(ConfigError::UnknownDirection(s.to_string())),
        }
    }
}

/// Tunables for a ricochet session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RicochetOptions {
    /// Horizontal speed in units per second
    pub horizontal_speed: f64,
    /// Vertical speed in units per second
    pub vertical_speed: f64,
    pub initial_direction: InitialDirection,
}

impl Default for RicochetOptions {
    fn default() -> Self {
        Self {
            horizontal_speed: DEFAULT_HORIZONTAL_SPEED,
            vertical_speed: DEFAULT_VERTICAL_SPEED,
            initial_direction: InitialDirection::default(),
        }
    }
}

impl RicochetOptions {
    pub fn with_speeds(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_speed = horizontal;
        self.vertical_speed = vertical;
        self
    }

    pub fn with_initial_direction(mut self, direction: InitialDirection) -> Self {
        self.initial_direction = direction;
        self
    }

    /// Reject speeds the engine cannot integrate (negative, NaN, infinite).
    /// Zero is allowed and freezes the axis.
    pub fn validate(&self) -> ConfigResult<()> {
        check_speed("horizontal-speed", self.horizontal_speed)?;
        check_speed("vertical-speed", self.vertical_speed)
    }

    /// Parse options from a KDL document.
    ///
    /// Keys are read from a top-level `ricochet { .. }` block when present,
    /// otherwise from the top level of the document. Missing keys keep their
    /// defaults.
    pub fn from_kdl(text: &str) -> ConfigResult<Self> {
        let document: KdlDocument = text.parse()?;
        let section = document
            .get("ricochet")
            .and_then(|node| node.children())
            .unwrap_or(&document);

        let mut options = Self::default();
        if let Some(value) = section.get_arg("horizontal-speed") {
            options.horizontal_speed = number("horizontal-speed", value)?;
        }
        if let Some(value) = section.get_arg("vertical-speed") {
            options.vertical_speed = number("vertical-speed", value)?;
        }
        if let Some(value) = section.get_arg("initial-direction") {
            let name = value.as_string().ok_or_else(|| ConfigError::InvalidValue {
                key: "initial-direction".to_string(),
                reason: format!("expected a string, found {}", value),
            })?;
            options.initial_direction = name.parse()?;
        }

        options.validate()?;
        log::debug!("Ricochet: loaded options {:?}", options);
        Ok(options)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_kdl(&text)
    }
}

fn number(key: &str, value: &KdlValue) -> ConfigResult<f64> {
    value
        .as_f64()
        .or_else(|| value.as_i64().map(|n| n as f64))
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("expected a number, found {}", value),
        })
}

fn check_speed(key: &str, speed: f64) -> ConfigResult<()> {
    if !speed.is_finite() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    if speed < 0.0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("must not be negative (got {})", speed),
        });
    }
    Ok(())
}
