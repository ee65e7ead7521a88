use crate::domain::model::{PortConfig, DEFAULT_BAUD_RATE, DEFAULT_PORT};
use crate::utils::error::{DriverError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_required_field, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// File form of the connection settings:
///
/// ```toml
/// [serial]
/// port = "${ARDUINO_PORT}"
/// baud_rate = 9600
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub serial: Option<SerialConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerialConfig {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DriverError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${ARDUINO_PORT})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn port(&self) -> &str {
        self.serial
            .as_ref()
            .and_then(|s| s.port.as_deref())
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn baud_rate(&self) -> u32 {
        self.serial
            .as_ref()
            .and_then(|s| s.baud_rate)
            .unwrap_or(DEFAULT_BAUD_RATE)
    }

    pub fn port_config(&self) -> PortConfig {
        PortConfig::new(self.port(), self.baud_rate())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_required_field("serial", &self.serial)?;
        validate_non_empty_string("serial.port", self.port())?;
        validate_positive_number("serial.baud_rate", self.baud_rate(), 1)?;
        Ok(())
    }
}
