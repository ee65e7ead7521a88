use crate::domain::model::ServoMovement;
use crate::domain::ports::ActuatorController;
use crate::utils::error::{DriverError, Result};
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  arduino-status                                        Check if Arduino is ready
  led-control <name> <true|false>                       Control an LED
  servo-position <name> <angle>                         Position a servomotor
  servo-sweep <name> <start> <end> <speed>              Sweep start -> end -> start
  servo-half-sweep <name> <start> <end> <speed>         Move start -> end
  servo-reverse-half-sweep <name> <start> <end> <speed> Move start -> end, counter-clockwise
  servo-reverse-sweep <name> <start> <end> <speed>      Sweep in reverse direction
  arduino-shutdown                                      Shut down the Arduino controller
  help                                                  Show this help
  exit                                                  Leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Status,
    Led {
        name: String,
        on: bool,
    },
    Position {
        name: String,
        angle: i32,
    },
    Move {
        name: String,
        movement: ServoMovement,
        start_angle: i32,
        end_angle: i32,
        speed: i32,
    },
    Shutdown,
    Help,
    Exit,
}

impl ShellCommand {
    /// Whether the shell should stop reading input after this command.
    pub fn ends_session(&self) -> bool {
        matches!(self, ShellCommand::Shutdown | ShellCommand::Exit)
    }

    /// Runs the command and renders the outcome as a status line.
    pub fn execute<A: ActuatorController + ?Sized>(&self, controller: &mut A) -> String {
        match self {
            ShellCommand::Status => {
                if controller.is_ready() {
                    "Arduino is ready".to_string()
                } else {
                    "Arduino is not ready".to_string()
                }
            }
            ShellCommand::Led { name, on } => {
                if controller.set_led(name, *on) {
                    format!("LED {} {}", name, if *on { "turned on" } else { "turned off" })
                } else {
                    format!("Failed to control LED {}", name)
                }
            }
            ShellCommand::Position { name, angle } => {
                if controller.position_servo(name, *angle) {
                    format!("Servo {} positioned at {} degrees", name, angle)
                } else {
                    format!("Failed to position servo {}", name)
                }
            }
            ShellCommand::Move {
                name,
                movement,
                start_angle,
                end_angle,
                speed,
            } => {
                let (start, end, speed) = (*start_angle, *end_angle, *speed);
                let done = match movement {
                    ServoMovement::Sweep => controller.sweep(name, start, end, speed),
                    ServoMovement::HalfSweep => controller.half_sweep(name, start, end, speed),
                    ServoMovement::ReverseHalfSweep => {
                        controller.reverse_half_sweep(name, start, end, speed)
                    }
                    ServoMovement::ReverseSweep => {
                        controller.reverse_sweep(name, start, end, speed)
                    }
                };
                if done {
                    format!(
                        "Servo {} {}ing from {} to {}",
                        name,
                        movement.keyword(),
                        start,
                        end
                    )
                } else {
                    format!("Failed to {} servo {}", movement.keyword(), name)
                }
            }
            ShellCommand::Shutdown => {
                controller.shutdown();
                "Arduino controller shut down".to_string()
            }
            ShellCommand::Help => HELP.to_string(),
            ShellCommand::Exit => "Goodbye!".to_string(),
        }
    }
}

impl FromStr for ShellCommand {
    type Err = DriverError;

    fn from_str(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some((&keyword, args)) = parts.split_first() else {
            return Err(invalid(input, "empty command"));
        };

        let expect_args = |count: usize| -> Result<()> {
            if args.len() == count {
                Ok(())
            } else {
                Err(invalid(
                    input,
                    &format!("expected {} argument(s), got {}", count, args.len()),
                ))
            }
        };

        let movement = match keyword {
            "servo-sweep" => Some(ServoMovement::Sweep),
            "servo-half-sweep" => Some(ServoMovement::HalfSweep),
            "servo-reverse-half-sweep" => Some(ServoMovement::ReverseHalfSweep),
            "servo-reverse-sweep" => Some(ServoMovement::ReverseSweep),
            _ => None,
        };
        if let Some(movement) = movement {
            expect_args(4)?;
            return Ok(ShellCommand::Move {
                name: args[0].to_string(),
                movement,
                start_angle: parse_int(input, "start angle", args[1])?,
                end_angle: parse_int(input, "end angle", args[2])?,
                speed: parse_int(input, "speed", args[3])?,
            });
        }

        match keyword {
            "arduino-status" => {
                expect_args(0)?;
                Ok(ShellCommand::Status)
            }
            "led-control" => {
                expect_args(2)?;
                Ok(ShellCommand::Led {
                    name: args[0].to_string(),
                    on: parse_state(input, args[1])?,
                })
            }
            "servo-position" => {
                expect_args(2)?;
                Ok(ShellCommand::Position {
                    name: args[0].to_string(),
                    angle: parse_int(input, "angle", args[1])?,
                })
            }
            "arduino-shutdown" => {
                expect_args(0)?;
                Ok(ShellCommand::Shutdown)
            }
            "help" => Ok(ShellCommand::Help),
            "exit" | "quit" => Ok(ShellCommand::Exit),
            other => Err(invalid(input, &format!("unknown command '{}'", other))),
        }
    }
}

fn invalid(input: &str, reason: &str) -> DriverError {
    DriverError::InvalidCommandError {
        input: input.trim().to_string(),
        reason: reason.to_string(),
    }
}

fn parse_int(input: &str, what: &str, value: &str) -> Result<i32> {
    value
        .parse()
        .map_err(|_| invalid(input, &format!("{} must be an integer, got '{}'", what, value)))
}

fn parse_state(input: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(
            input,
            &format!("LED state must be true or false, got '{}'", value),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_led_control() {
        assert_eq!(
            "led-control red true".parse::<ShellCommand>().unwrap(),
            ShellCommand::Led {
                name: "red".to_string(),
                on: true
            }
        );
        assert_eq!(
            "  led-control  red  FALSE ".parse::<ShellCommand>().unwrap(),
            ShellCommand::Led {
                name: "red".to_string(),
                on: false
            }
        );
    }

    #[test]
    fn test_parse_servo_commands() {
        assert_eq!(
            "servo-position head -15".parse::<ShellCommand>().unwrap(),
            ShellCommand::Position {
                name: "head".to_string(),
                angle: -15
            }
        );
        assert_eq!(
            "servo-reverse-half-sweep base 45 120 7"
                .parse::<ShellCommand>()
                .unwrap(),
            ShellCommand::Move {
                name: "base".to_string(),
                movement: ServoMovement::ReverseHalfSweep,
                start_angle: 45,
                end_angle: 120,
                speed: 7
            }
        );
    }

    #[test]
    fn test_parse_lifecycle_commands() {
        assert_eq!(
            "arduino-status".parse::<ShellCommand>().unwrap(),
            ShellCommand::Status
        );
        let shutdown = "arduino-shutdown".parse::<ShellCommand>().unwrap();
        assert!(shutdown.ends_session());
        assert!("quit".parse::<ShellCommand>().unwrap().ends_session());
        assert!(!"help".parse::<ShellCommand>().unwrap().ends_session());
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "",
            "dance",
            "led-control red",
            "led-control red maybe",
            "servo-position head ninety",
            "servo-sweep arm 0 180",
            "arduino-status now",
        ] {
            match bad.parse::<ShellCommand>() {
                Err(DriverError::InvalidCommandError { .. }) => {}
                other => panic!("expected parse error for {:?}, got {:?}", bad, other),
            }
        }
    }
}
