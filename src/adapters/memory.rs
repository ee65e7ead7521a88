//! In-memory serial doubles for exercising the protocol without hardware.
//!
//! A [`MemoryPort`] records every byte written to it. Each time a complete
//! line has been written, the next scripted reply (if any) becomes readable.
//! Reading with nothing pending fails with `TimedOut`, the way a real port
//! behaves once its read timeout elapses.

use crate::domain::model::{PortDescriptor, PortSettings};
use crate::domain::ports::{Delay, PortEnumerator, PortHandle};
use crate::utils::error::{DriverError, Result};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct MemoryPortState {
    open: bool,
    settings: Option<PortSettings>,
    written: Vec<u8>,
    replies: VecDeque<String>,
    rx: VecDeque<u8>,
    fail_writes: bool,
    fail_flush: bool,
    fail_close: bool,
    close_calls: usize,
}

/// Shared handle to one simulated port. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryPort {
    state: Arc<Mutex<MemoryPortState>>,
}

impl MemoryPort {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryPortState> {
        // A panicking test thread must not hide the recorded traffic.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queues a reply line, sent back after the next complete command line.
    /// The line terminator is added here.
    pub fn reply(&self, line: &str) -> &Self {
        self.state().replies.push_back(format!("{}\n", line));
        self
    }

    /// Queues raw reply bytes, terminator included.
    pub fn reply_raw(&self, raw: &str) -> &Self {
        self.state().replies.push_back(raw.to_string());
        self
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Writes are accepted but flushing them fails.
    pub fn fail_flush(&self, fail: bool) {
        self.state().fail_flush = fail;
    }

    pub fn fail_close(&self, fail: bool) {
        self.state().fail_close = fail;
    }

    /// Simulates the device disappearing underneath an open handle.
    pub fn disconnect(&self) {
        self.state().open = false;
    }

    pub fn settings(&self) -> Option<PortSettings> {
        self.state().settings
    }

    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.state().written).into_owned()
    }

    /// Complete command lines written so far, without terminators.
    pub fn written_lines(&self) -> Vec<String> {
        self.written()
            .split_terminator('\n')
            .map(str::to_string)
            .collect()
    }

    pub fn close_calls(&self) -> usize {
        self.state().close_calls
    }

    pub fn is_open(&self) -> bool {
        self.state().open
    }
}

impl Read for MemoryPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        if !state.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "port closed"));
        }
        if state.rx.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
        }
        let n = buf.len().min(state.rx.len());
        for (slot, byte) in buf.iter_mut().zip(state.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MemoryPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state();
        if !state.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "port closed"));
        }
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "write failed"));
        }
        state.written.extend_from_slice(buf);
        for _ in buf.iter().filter(|&&b| b == b'\n') {
            if let Some(reply) = state.replies.pop_front() {
                state.rx.extend(reply.into_bytes());
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.state().fail_flush {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "flush failed"));
        }
        Ok(())
    }
}

impl PortHandle for MemoryPort {
    fn is_open(&self) -> bool {
        MemoryPort::is_open(self)
    }

    fn close(&mut self) -> io::Result<()> {
        let mut state = self.state();
        state.close_calls += 1;
        state.open = false;
        if state.fail_close {
            return Err(io::Error::other("close failed"));
        }
        Ok(())
    }
}

/// A fixed list of simulated ports.
#[derive(Debug, Clone, Default)]
pub struct MemoryPorts {
    ports: Vec<(PortDescriptor, MemoryPort)>,
    refuse_open: bool,
}

impl MemoryPorts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a port and returns the handle the test keeps for inspection.
    pub fn add(&mut self, system_name: &str, descriptive_name: &str) -> MemoryPort {
        let port = MemoryPort::new();
        self.ports.push((
            PortDescriptor::new(system_name, descriptive_name),
            port.clone(),
        ));
        port
    }

    /// Makes every open attempt fail, as if the device were busy.
    pub fn refuse_open(&mut self, refuse: bool) {
        self.refuse_open = refuse;
    }
}

impl PortEnumerator for MemoryPorts {
    fn list_ports(&self) -> Vec<PortDescriptor> {
        self.ports.iter().map(|(d, _)| d.clone()).collect()
    }

    fn open_port(
        &self,
        port: &PortDescriptor,
        settings: &PortSettings,
    ) -> Result<Box<dyn PortHandle>> {
        if self.refuse_open {
            return Err(DriverError::PortOpen {
                port: port.system_name.clone(),
                reason: "device busy".to_string(),
            });
        }
        let (_, handle) = self
            .ports
            .iter()
            .find(|(d, _)| d == port)
            .ok_or_else(|| DriverError::PortNotFound {
                port: port.system_name.clone(),
            })?;

        {
            let mut state = handle.state();
            state.open = true;
            state.settings = Some(*settings);
        }
        Ok(Box::new(handle.clone()))
    }
}

/// Records requested settle delays instead of sleeping.
#[derive(Debug, Clone, Default)]
pub struct RecordedDelay {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordedDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl Delay for RecordedDelay {
    fn delay(&self, duration: Duration) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PortSettings {
        PortSettings {
            baud_rate: 9600,
            read_timeout: Duration::from_millis(5000),
            write_timeout: None,
        }
    }

    #[test]
    fn test_reply_released_after_full_line() {
        let mut ports = MemoryPorts::new();
        let port = ports.add("COM7", "Arduino Uno");
        port.reply("ok");

        let mut handle = ports.open_port(&ports.list_ports()[0], &settings()).unwrap();
        let mut buf = [0u8; 8];

        handle.write_all(b"led(red").unwrap();
        assert_eq!(
            handle.read(&mut buf).unwrap_err().kind(),
            io::ErrorKind::TimedOut
        );

        handle.write_all(b", on)\n").unwrap();
        let n = handle.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ok\n");
        assert_eq!(port.written_lines(), vec!["led(red, on)"]);
    }

    #[test]
    fn test_closed_port_rejects_io() {
        let mut ports = MemoryPorts::new();
        let port = ports.add("COM7", "Arduino Uno");
        let mut handle = ports.open_port(&ports.list_ports()[0], &settings()).unwrap();

        handle.close().unwrap();
        assert!(!port.is_open());
        assert_eq!(port.close_calls(), 1);
        assert_eq!(
            handle.write(b"x\n").unwrap_err().kind(),
            io::ErrorKind::NotConnected
        );
    }

    #[test]
    fn test_refused_open() {
        let mut ports = MemoryPorts::new();
        ports.add("COM7", "Arduino Uno");
        ports.refuse_open(true);

        let result = ports.open_port(&ports.list_ports()[0], &settings());
        assert!(matches!(result, Err(DriverError::PortOpen { .. })));
    }

    #[test]
    fn test_recorded_delay() {
        let delay = RecordedDelay::new();
        delay.delay(Duration::from_millis(200));
        assert_eq!(delay.recorded(), vec![Duration::from_millis(200)]);
    }
}
