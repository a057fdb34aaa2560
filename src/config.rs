//! Configuration management for the surface emulator
//!
//! Handles loading, parsing, and validation of the YAML configuration file.
//! Every section is optional; missing values fall back to defaults.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::surface::identity::{
    DeviceIdentity, CHALLENGE_LEN, MODEL_MACKIE_CONTROL, SERIAL_LEN, VERSION_LEN,
};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

/// MIDI port configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MidiConfig {
    /// Input port name, or a case-insensitive substring of it
    #[serde(default = "default_input_port")]
    pub input_port: String,
    /// Output port name, or a case-insensitive substring of it
    #[serde(default = "default_output_port")]
    pub output_port: String,
    /// Create virtual ports with the names above instead of opening existing ones
    #[serde(default)]
    pub virtual_ports: bool,
    /// MIDI client name shown by the OS
    #[serde(default = "default_client_name")]
    pub client_name: String,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            input_port: default_input_port(),
            output_port: default_output_port(),
            virtual_ports: false,
            client_name: default_client_name(),
        }
    }
}

/// Identity the emulated surface reports during the handshake
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    #[serde(default = "default_model_id")]
    pub model_id: u8,
    /// Exactly 7 ASCII characters
    #[serde(default = "default_serial")]
    pub serial: String,
    /// Exactly 4 ASCII characters
    #[serde(default = "default_challenge")]
    pub challenge: String,
    /// Exactly 5 ASCII characters
    #[serde(default = "default_firmware_version")]
    pub firmware_version: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            serial: default_serial(),
            challenge: default_challenge(),
            firmware_version: default_firmware_version(),
        }
    }
}

impl DeviceConfig {
    /// Convert to the fixed-size identity used by the codec
    pub fn identity(&self) -> Result<DeviceIdentity> {
        if self.model_id > 0x7F {
            bail!("device model_id must be 0x00-0x7F, got 0x{:02X}", self.model_id);
        }

        Ok(DeviceIdentity {
            model_id: self.model_id,
            serial: ascii_field::<SERIAL_LEN>("serial", &self.serial)?,
            challenge: ascii_field::<CHALLENGE_LEN>("challenge", &self.challenge)?,
            firmware_version: ascii_field::<VERSION_LEN>(
                "firmware_version",
                &self.firmware_version,
            )?,
        })
    }
}

fn ascii_field<const N: usize>(name: &str, value: &str) -> Result<[u8; N]> {
    if !value.is_ascii() {
        bail!("device {} must be ASCII: {:?}", name, value);
    }
    <[u8; N]>::try_from(value.as_bytes())
        .with_context(|| format!("device {} must be exactly {} characters: {:?}", name, N, value))
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::from_yaml(&contents).with_context(|| format!("Invalid config file: {}", path))
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;

        // Validate the loaded configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.midi.input_port.is_empty() {
            bail!("MIDI input_port cannot be empty");
        }
        if self.midi.output_port.is_empty() {
            bail!("MIDI output_port cannot be empty");
        }
        if self.midi.client_name.is_empty() {
            bail!("MIDI client_name cannot be empty");
        }

        self.device.identity()?;
        Ok(())
    }
}

fn default_input_port() -> String { "MCU Surface In".to_string() }
fn default_output_port() -> String { "MCU Surface Out".to_string() }
fn default_client_name() -> String { "mcu-surface".to_string() }
fn default_model_id() -> u8 { MODEL_MACKIE_CONTROL }
fn default_serial() -> String { "MCS0001".to_string() }
fn default_challenge() -> String { "a1b2".to_string() }
fn default_firmware_version() -> String { "1.0.0".to_string() }
