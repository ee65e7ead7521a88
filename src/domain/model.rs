use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// A serial port as reported by the host, before it is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    pub system_name: String,
    pub descriptive_name: String,
}

impl PortDescriptor {
    pub fn new(system_name: impl Into<String>, descriptive_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            descriptive_name: descriptive_name.into(),
        }
    }
}

/// Which port to use and how fast to talk to it.
///
/// `port_identifier` is matched exactly against a port's system name, or as a
/// substring of its descriptive name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    pub port_identifier: String,
    pub baud_rate: u32,
}

impl PortConfig {
    pub fn new(port_identifier: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_identifier: port_identifier.into(),
            baud_rate,
        }
    }
}

impl Default for PortConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, DEFAULT_BAUD_RATE)
    }
}

/// Line settings applied when a port is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSettings {
    pub baud_rate: u32,
    /// Semi-blocking read: returns as soon as any byte is available, or fails
    /// with `TimedOut` after this long.
    pub read_timeout: Duration,
    /// `None` means writes never time out.
    pub write_timeout: Option<Duration>,
}

/// Literal a response line must equal (ignoring ASCII case) for success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseToken {
    Ok,
    Ready,
}

impl ResponseToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseToken::Ok => "ok",
            ResponseToken::Ready => "ready",
        }
    }
}

impl fmt::Display for ResponseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoMovement {
    /// Start to end and back again.
    Sweep,
    /// Start to end only, clockwise.
    HalfSweep,
    /// Start to end only, counter-clockwise.
    ReverseHalfSweep,
    /// Full back-and-forth in the reverse direction.
    ReverseSweep,
}

impl ServoMovement {
    pub fn keyword(&self) -> &'static str {
        match self {
            ServoMovement::Sweep => "sweep",
            ServoMovement::HalfSweep => "half-sweep",
            ServoMovement::ReverseHalfSweep => "reverse-half-sweep",
            ServoMovement::ReverseSweep => "reverse-sweep",
        }
    }
}

/// One outbound protocol line, without its trailing newline.
///
/// Names and numbers are formatted as given; range checking is left to the firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Led {
        name: String,
        on: bool,
    },
    ServoAngle {
        name: String,
        angle: i32,
    },
    ServoMovement {
        name: String,
        movement: ServoMovement,
        start_angle: i32,
        end_angle: i32,
        speed: i32,
    },
    Status,
    Shutdown,
}

impl Command {
    pub fn expected_response(&self) -> ResponseToken {
        match self {
            Command::Status => ResponseToken::Ready,
            _ => ResponseToken::Ok,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Led { name, on } => {
                write!(f, "led({}, {})", name, if *on { "on" } else { "off" })
            }
            Command::ServoAngle { name, angle } => write!(f, "servo({}, angle {})", name, angle),
            Command::ServoMovement {
                name,
                movement,
                start_angle,
                end_angle,
                speed,
            } => write!(
                f,
                "servo({}, {} {} {} {})",
                name,
                movement.keyword(),
                start_angle,
                end_angle,
                speed
            ),
            Command::Status => f.write_str("status(arduino, ok)"),
            Command::Shutdown => f.write_str("shutdown()"),
        }
    }
}
