use crate::domain::model::{PortDescriptor, PortSettings};
use crate::domain::ports::{PortEnumerator, PortHandle};
use crate::utils::error::{DriverError, Result};
use serialport::{FlowControl, SerialPort, SerialPortInfo, SerialPortType};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Ports of the host's serial subsystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

impl PortEnumerator for SystemPorts {
    fn list_ports(&self) -> Vec<PortDescriptor> {
        match serialport::available_ports() {
            Ok(ports) => ports
                .into_iter()
                .map(|info| {
                    let descriptive_name = descriptive_name(&info);
                    PortDescriptor::new(info.port_name, descriptive_name)
                })
                .collect(),
            Err(e) => {
                tracing::warn!("Unable to enumerate serial ports: {}", e);
                Vec::new()
            }
        }
    }

    fn open_port(
        &self,
        port: &PortDescriptor,
        settings: &PortSettings,
    ) -> Result<Box<dyn PortHandle>> {
        let open_error = |e: serialport::Error| DriverError::PortOpen {
            port: port.system_name.clone(),
            reason: e.to_string(),
        };

        let mut inner = serialport::new(platform_port_name(&port.system_name), settings.baud_rate)
            .timeout(port_timeout(settings))
            .flow_control(FlowControl::None)
            .open()
            .map_err(open_error)?;

        if let Err(e) = inner.write_data_terminal_ready(true) {
            tracing::warn!("Could not assert DTR on {}: {}", port.system_name, e);
        }

        Ok(Box::new(SystemPort { inner: Some(inner) }))
    }
}

/// serialport has a single timeout for both directions. Writes to a USB CDC
/// device complete immediately, so the read timeout is the one applied.
fn port_timeout(settings: &PortSettings) -> Duration {
    match settings.write_timeout {
        Some(write_timeout) if write_timeout != settings.read_timeout => tracing::debug!(
            "Write timeout of {:?} cannot be applied separately; writes use the {:?} read timeout",
            write_timeout,
            settings.read_timeout
        ),
        None => tracing::debug!(
            "Unbounded writes are not supported; writes use the {:?} read timeout",
            settings.read_timeout
        ),
        Some(_) => {}
    }
    settings.read_timeout
}

fn descriptive_name(info: &SerialPortInfo) -> String {
    match &info.port_type {
        SerialPortType::UsbPort(usb) => usb
            .product
            .clone()
            .or_else(|| usb.manufacturer.clone())
            .unwrap_or_else(|| format!("USB Serial Device ({:04x}:{:04x})", usb.vid, usb.pid)),
        SerialPortType::PciPort => "PCI Serial Port".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth Serial Port".to_string(),
        SerialPortType::Unknown => info.port_name.clone(),
    }
}

// On Windows, COM ports >= 10 need the \\.\COMxx format
#[cfg(target_os = "windows")]
fn platform_port_name(name: &str) -> String {
    if name.starts_with("COM") && !name.starts_with(r"\\") {
        format!(r"\\.\{}", name)
    } else {
        name.to_string()
    }
}

#[cfg(not(target_os = "windows"))]
fn platform_port_name(name: &str) -> String {
    name.to_string()
}

/// An open host serial port. Closing drops the device handle.
pub struct SystemPort {
    inner: Option<Box<dyn SerialPort>>,
}

impl SystemPort {
    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port is closed"))
    }
}

impl Read for SystemPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port()?.read(buf)
    }
}

impl Write for SystemPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port()?.flush()
    }
}

impl PortHandle for SystemPort {
    fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(port) = self.inner.take() {
            tracing::debug!("Releasing {}", port.name().unwrap_or_default());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptive_name_prefers_usb_product() {
        let info = SerialPortInfo {
            port_name: "/dev/ttyACM0".to_string(),
            port_type: SerialPortType::UsbPort(serialport::UsbPortInfo {
                vid: 0x2341,
                pid: 0x0043,
                serial_number: None,
                manufacturer: Some("Arduino (www.arduino.cc)".to_string()),
                product: Some("Arduino Uno".to_string()),
            }),
        };
        assert_eq!(descriptive_name(&info), "Arduino Uno");
    }

    #[test]
    fn test_descriptive_name_fallbacks() {
        let unknown = SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: SerialPortType::Unknown,
        };
        assert_eq!(descriptive_name(&unknown), "/dev/ttyS0");

        let anonymous_usb = SerialPortInfo {
            port_name: "/dev/ttyUSB0".to_string(),
            port_type: SerialPortType::UsbPort(serialport::UsbPortInfo {
                vid: 0x1a86,
                pid: 0x7523,
                serial_number: None,
                manufacturer: None,
                product: None,
            }),
        };
        assert_eq!(
            descriptive_name(&anonymous_usb),
            "USB Serial Device (1a86:7523)"
        );
    }

    #[test]
    fn test_port_timeout_follows_read_timeout() {
        let unbounded_writes = PortSettings {
            baud_rate: 9600,
            read_timeout: Duration::from_millis(5000),
            write_timeout: None,
        };
        assert_eq!(port_timeout(&unbounded_writes), Duration::from_millis(5000));

        let short_writes = PortSettings {
            write_timeout: Some(Duration::from_millis(100)),
            ..unbounded_writes
        };
        assert_eq!(port_timeout(&short_writes), Duration::from_millis(5000));
    }

    #[test]
    fn test_closed_system_port_rejects_io() {
        let mut port = SystemPort { inner: None };
        assert!(!port.is_open());
        assert!(port.close().is_ok());

        let err = port.write(b"led(red, on)\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }
}
