use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Serial port not found: {port}")]
    PortNotFound { port: String },

    #[error("Failed to open serial port {port}: {reason}")]
    PortOpen { port: String, reason: String },

    #[error("Invalid communicator state: {message}")]
    InvalidState { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid command '{input}': {reason}")]
    InvalidCommandError { input: String, reason: String },
}

impl DriverError {
    /// Whether the error prevents the communicator from ever reaching the open state.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DriverError::PortNotFound { .. } | DriverError::PortOpen { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DriverError::PortNotFound { port } => {
                format!("No serial port matches '{}'", port)
            }
            DriverError::PortOpen { port, .. } => {
                format!("Serial port '{}' exists but could not be opened", port)
            }
            DriverError::InvalidState { message } => message.clone(),
            DriverError::IoError(e) => format!("I/O failure: {}", e),
            DriverError::TomlError(_)
            | DriverError::MissingConfigError { .. }
            | DriverError::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            DriverError::InvalidCommandError { input, reason } => {
                format!("Cannot run '{}': {}", input, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DriverError::PortNotFound { .. } => {
                "Check the board is plugged in and run with --list-ports to see available ports"
            }
            DriverError::PortOpen { .. } => {
                "Make sure no other program holds the port and that you have permission to use it"
            }
            DriverError::InvalidState { .. } => "Create a new communicator for each connection",
            DriverError::IoError(_) => "Reconnect the board and try again",
            DriverError::TomlError(_) => {
                "Check the configuration file is valid TOML with a [serial] table"
            }
            DriverError::MissingConfigError { .. }
            | DriverError::InvalidConfigValueError { .. } => {
                "Fix the reported field in the configuration file or on the command line"
            }
            DriverError::InvalidCommandError { .. } => "Type 'help' to list the available commands",
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;
