use crate::domain::model::{PortDescriptor, PortSettings};
use crate::utils::error::Result;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Host serial subsystem: lists ports and opens them.
pub trait PortEnumerator {
    /// Ports in the order the host reports them. Never fails; an unreadable
    /// host yields an empty list.
    fn list_ports(&self) -> Vec<PortDescriptor>;

    fn open_port(&self, port: &PortDescriptor, settings: &PortSettings)
        -> Result<Box<dyn PortHandle>>;
}

/// An opened, configured serial connection.
pub trait PortHandle: Read + Write + Send {
    fn is_open(&self) -> bool;

    /// Releases the underlying device. Safe to call more than once.
    fn close(&mut self) -> io::Result<()>;
}

/// Blocks the calling thread for a fixed settle time.
pub trait Delay: Send {
    fn delay(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Delay for ThreadSleep {
    fn delay(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Synchronous line transport to the board.
pub trait Communicator {
    /// Sends `command` followed by a newline and reports whether the single
    /// response line equals `expected_response`, ignoring case. Every failure
    /// resolves to `false`.
    fn send(&mut self, command: &str, expected_response: &str) -> bool;

    fn is_open(&self) -> bool;

    fn close(&mut self);
}

/// Everything a caller can ask of the board.
///
/// Each operation blocks until the board answers or the read times out, and
/// returns `false` on any failure. Callers sharing one controller across
/// threads must serialize access themselves.
pub trait ActuatorController {
    // LEDs

    fn set_led(&mut self, name: &str, on: bool) -> bool;

    // Servo positioning

    fn position_servo(&mut self, name: &str, angle: i32) -> bool;

    // Servo movements

    fn sweep(&mut self, name: &str, start_angle: i32, end_angle: i32, speed: i32) -> bool;

    fn half_sweep(&mut self, name: &str, start_angle: i32, end_angle: i32, speed: i32) -> bool;

    fn reverse_half_sweep(
        &mut self,
        name: &str,
        start_angle: i32,
        end_angle: i32,
        speed: i32,
    ) -> bool;

    fn reverse_sweep(&mut self, name: &str, start_angle: i32, end_angle: i32, speed: i32)
        -> bool;

    // Lifecycle

    /// `false` without touching the wire when the connection is not open.
    fn is_ready(&mut self) -> bool;

    /// Asks the board to shut down, then always closes the connection.
    fn shutdown(&mut self);
}
