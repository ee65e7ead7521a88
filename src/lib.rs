//! Line-oriented serial protocol for driving LEDs and servos on an Arduino.
//!
//! ```text
//! caller ──► ArduinoController ──► SerialCommunicator ──► PortHandle ──► board
//!            (encode / decode)     (timing, one line       (serialport or
//!                                   out, one line in)       in-memory double)
//! ```

pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{MemoryPort, MemoryPorts, RecordedDelay, SystemPorts};
pub use crate::core::{communicator::SerialCommunicator, controller::ArduinoController};
pub use crate::domain::model::{Command, PortConfig, PortDescriptor, ServoMovement};
pub use crate::domain::ports::{ActuatorController, Communicator, PortEnumerator, PortHandle};
pub use crate::utils::error::{DriverError, Result};
