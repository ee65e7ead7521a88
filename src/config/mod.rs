pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::PortConfig;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "arduino-driver")]
#[command(about = "Drive LEDs and servos on an Arduino over a serial line")]
pub struct CliConfig {
    /// Path to a TOML file with a [serial] table
    #[arg(short, long)]
    pub config: Option<String>,

    /// Port system name, or part of its descriptive name
    #[arg(short, long)]
    pub port: Option<String>,

    #[arg(short, long)]
    pub baud_rate: Option<u32>,

    /// List available serial ports and exit
    #[arg(long)]
    pub list_ports: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Command-line flags override the file, which overrides the defaults.
    pub fn resolve(&self) -> Result<PortConfig> {
        let file = match &self.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                file
            }
            None => TomlConfig::default(),
        };

        let config = PortConfig::new(
            self.port.clone().unwrap_or_else(|| file.port().to_string()),
            self.baud_rate.unwrap_or_else(|| file.baud_rate()),
        );
        validate_port_config(&config)?;
        Ok(config)
    }
}

#[cfg(feature = "cli")]
fn validate_port_config(config: &PortConfig) -> Result<()> {
    validate_non_empty_string("port", &config.port_identifier)?;
    validate_positive_number("baud_rate", config.baud_rate, 1)?;
    Ok(())
}
