use crate::domain::model::{PortConfig, PortDescriptor, PortSettings};
use crate::domain::ports::{Communicator, Delay, PortEnumerator, PortHandle, ThreadSleep};
use crate::utils::error::{DriverError, Result};
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

/// How long a read waits for the first byte of a response.
pub const READ_TIMEOUT: Duration = Duration::from_millis(5000);

/// The board resets when the port opens and ignores input until it has booted.
/// There is no ready handshake, so this is a fixed wait.
pub const OPEN_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Time the firmware needs between receiving a line and answering it.
pub const COMMAND_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Picks the port an identifier refers to.
///
/// An exact system name match wins. Otherwise the first port whose
/// descriptive name contains the identifier is taken, in enumeration order.
/// Keep the two passes separate: a single combined scan would let an earlier
/// substring match beat a later exact match.
pub fn resolve_port<'a>(ports: &'a [PortDescriptor], identifier: &str) -> Option<&'a PortDescriptor> {
    ports
        .iter()
        .find(|port| port.system_name == identifier)
        .or_else(|| {
            ports
                .iter()
                .find(|port| port.descriptive_name.contains(identifier))
        })
}

struct OpenConnection {
    port_name: String,
    // Reads go through the buffer, writes through `get_mut()`.
    stream: BufReader<Box<dyn PortHandle>>,
}

enum State {
    Uninitialized,
    Open(OpenConnection),
    Closed,
}

/// Owns the single connection to the board and speaks the line protocol over it.
///
/// `send` blocks the calling thread for the post-write settle delay and then
/// for up to [`READ_TIMEOUT`] while waiting for the answer. Nothing here is
/// synchronized; one command may be in flight at a time.
pub struct SerialCommunicator {
    config: PortConfig,
    delay: Box<dyn Delay>,
    state: State,
}

impl SerialCommunicator {
    pub fn new(config: PortConfig) -> Self {
        Self::with_delay(config, Box::new(ThreadSleep))
    }

    pub fn with_delay(config: PortConfig, delay: Box<dyn Delay>) -> Self {
        Self {
            config,
            delay,
            state: State::Uninitialized,
        }
    }

    /// Creates and initializes a communicator in one step.
    pub fn open<E: PortEnumerator + ?Sized>(config: PortConfig, enumerator: &E) -> Result<Self> {
        let mut communicator = Self::new(config);
        communicator.initialize(enumerator)?;
        Ok(communicator)
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    /// System name of the port in use, while open.
    pub fn port_name(&self) -> Option<&str> {
        match &self.state {
            State::Open(connection) => Some(&connection.port_name),
            _ => None,
        }
    }

    /// Finds, opens and configures the port, then waits [`OPEN_SETTLE_DELAY`]
    /// for the board to boot.
    pub fn initialize<E: PortEnumerator + ?Sized>(&mut self, enumerator: &E) -> Result<()> {
        if !matches!(self.state, State::Uninitialized) {
            return Err(DriverError::InvalidState {
                message: "serial communicator can only be initialized once".to_string(),
            });
        }

        let identifier = self.config.port_identifier.as_str();
        tracing::info!(
            "Initializing serial communication on port {} with baud rate {}",
            identifier,
            self.config.baud_rate
        );

        let ports = enumerator.list_ports();
        for port in &ports {
            tracing::debug!(
                "Found serial port: {} ({})",
                port.system_name,
                port.descriptive_name
            );
        }

        let port = resolve_port(&ports, identifier).ok_or_else(|| {
            tracing::error!("Serial port {} not found", identifier);
            DriverError::PortNotFound {
                port: identifier.to_string(),
            }
        })?;

        let settings = PortSettings {
            baud_rate: self.config.baud_rate,
            read_timeout: READ_TIMEOUT,
            write_timeout: None,
        };

        let handle = enumerator.open_port(port, &settings).map_err(|e| {
            tracing::error!("Failed to open serial port {}: {}", port.system_name, e);
            match e {
                DriverError::PortOpen { .. } => e,
                other => DriverError::PortOpen {
                    port: port.system_name.clone(),
                    reason: other.to_string(),
                },
            }
        })?;

        // A handle that is dropped here releases the device.
        if !handle.is_open() {
            tracing::error!("Failed to open serial port {}", port.system_name);
            return Err(DriverError::PortOpen {
                port: port.system_name.clone(),
                reason: "port reported closed after opening".to_string(),
            });
        }

        self.state = State::Open(OpenConnection {
            port_name: port.system_name.clone(),
            stream: BufReader::new(handle),
        });

        self.delay.delay(OPEN_SETTLE_DELAY);

        tracing::info!("Serial communication initialized successfully");
        Ok(())
    }
}

impl Communicator for SerialCommunicator {
    fn send(&mut self, command: &str, expected_response: &str) -> bool {
        let connection = match &mut self.state {
            State::Open(connection) if connection.stream.get_ref().is_open() => connection,
            _ => {
                tracing::error!("Serial port is not open");
                return false;
            }
        };

        tracing::debug!("Sending command: {}", command);

        let line = format!("{}\n", command);
        let port = connection.stream.get_mut();
        if let Err(e) = port.write_all(line.as_bytes()).and_then(|_| port.flush()) {
            tracing::error!("Error sending command {}: {}", command, e);
            return false;
        }

        self.delay.delay(COMMAND_SETTLE_DELAY);

        let mut response = String::new();
        if let Err(e) = connection.stream.read_line(&mut response) {
            tracing::error!("Error reading response to {}: {}", command, e);
            return false;
        }

        let response = strip_line_ending(&response);
        tracing::debug!("Received response: {}", response);

        response.eq_ignore_ascii_case(expected_response)
    }

    fn is_open(&self) -> bool {
        match &self.state {
            State::Open(connection) => connection.stream.get_ref().is_open(),
            _ => false,
        }
    }

    fn close(&mut self) {
        let connection = match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(connection) => connection,
            other => {
                self.state = other;
                return;
            }
        };

        tracing::info!("Closing serial communication on {}", connection.port_name);

        let unread = connection.stream.buffer().len();
        if unread > 0 {
            tracing::debug!("Discarding {} unread bytes", unread);
        }
        let mut port = connection.stream.into_inner();

        if let Err(e) = port.flush() {
            tracing::error!("Error flushing serial output: {}", e);
        }
        if let Err(e) = port.close() {
            tracing::error!("Error closing serial port: {}", e);
        }

        tracing::info!("Serial communication closed");
    }
}

impl Drop for SerialCommunicator {
    fn drop(&mut self) {
        self.close();
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports() -> Vec<PortDescriptor> {
        vec![
            PortDescriptor::new("COM3", "USB Serial Device (COM7 adapter)"),
            PortDescriptor::new("COM7", "Arduino Uno"),
            PortDescriptor::new("COM9", "Arduino Mega"),
        ]
    }

    #[test]
    fn test_exact_system_name_wins_over_earlier_substring() {
        let ports = ports();
        let port = resolve_port(&ports, "COM7").unwrap();
        assert_eq!(port.system_name, "COM7");
    }

    #[test]
    fn test_first_descriptive_substring_match() {
        let ports = ports();
        let port = resolve_port(&ports, "Arduino").unwrap();
        assert_eq!(port.system_name, "COM7");

        let port = resolve_port(&ports, "Mega").unwrap();
        assert_eq!(port.system_name, "COM9");
    }

    #[test]
    fn test_no_match() {
        assert!(resolve_port(&ports(), "/dev/ttyACM0").is_none());
        assert!(resolve_port(&[], "COM7").is_none());
    }

    #[test]
    fn test_system_name_is_case_sensitive() {
        assert!(resolve_port(&ports(), "com7").is_none());
    }

    #[test]
    fn test_strip_line_ending() {
        assert_eq!(strip_line_ending("ok\r\n"), "ok");
        assert_eq!(strip_line_ending("ok\n"), "ok");
        assert_eq!(strip_line_ending("ok"), "ok");
        assert_eq!(strip_line_ending(" ok \n"), " ok ");
    }

    #[test]
    fn test_uninitialized_communicator() {
        let mut communicator = SerialCommunicator::new(PortConfig::default());
        assert!(!communicator.is_open());
        assert!(communicator.port_name().is_none());
        assert!(!communicator.send("led(red, on)", "ok"));
        communicator.close();
        assert!(!communicator.is_open());
    }
}
