//! Configuration for a plugin process.
//!
//! Two sources:
//! - command-line registration arguments passed by the host
//!   (`-port`, `-pluginUUID`, `-registerEvent`, `-info`)
//! - `DECK_*` environment variables for runtime behavior

use std::str::FromStr;

use clap::Parser;
use deck_id::PluginUuid;
use serde_json::Value;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("argument -{0} is empty")]
    EmptyArgument(&'static str),

    #[error("argument -info is not valid JSON: {0}")]
    InvalidInfo(String),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

// =============================================================================
// Registration Arguments
// =============================================================================

const REGISTRATION_FLAGS: [&str; 4] = ["port", "pluginUUID", "registerEvent", "info"];

/// Arguments the host passes when launching the plugin.
#[derive(Debug, Clone, Parser)]
#[command(name = "deck-plugin", about = "Stream Deck plugin process")]
pub struct PluginArgs {
    /// Port of the host's websocket server.
    #[arg(long = "port")]
    pub port: u16,

    /// UUID of this plugin.
    #[arg(long = "pluginUUID")]
    pub plugin_uuid: String,

    /// Event name to register the connection with.
    #[arg(long = "registerEvent")]
    pub register_event: String,

    /// JSON description of the host and its devices.
    #[arg(long = "info")]
    pub info: String,
}

impl PluginArgs {
    /// Parses the process arguments.
    pub fn from_env_args() -> Result<Self, clap::Error> {
        Self::try_parse_from(normalize_args(std::env::args()))
    }

    /// Validates the arguments into a [`Registration`].
    pub fn into_registration(self) -> Result<Registration, ConfigError> {
        let plugin_uuid =
            PluginUuid::parse(&self.plugin_uuid).map_err(|_| ConfigError::EmptyArgument("pluginUUID"))?;
        if self.register_event.trim().is_empty() {
            return Err(ConfigError::EmptyArgument("registerEvent"));
        }
        if self.info.trim().is_empty() {
            return Err(ConfigError::EmptyArgument("info"));
        }
        let info: Value =
            serde_json::from_str(&self.info).map_err(|e| ConfigError::InvalidInfo(e.to_string()))?;

        Ok(Registration {
            port: self.port,
            plugin_uuid,
            register_event: self.register_event,
            info: RegistrationInfo(info),
        })
    }
}

/// Rewrites the host's single-dash long flags (`-port 1234`) into the
/// double-dash form clap expects. The first item is the program name.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            let Some(rest) = arg.strip_prefix('-') else {
                return arg;
            };
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if REGISTRATION_FLAGS.contains(&name) {
                format!("-{arg}")
            } else {
                arg
            }
        })
        .collect()
}

/// Validated registration parameters.
#[derive(Debug, Clone)]
pub struct Registration {
    pub port: u16,
    pub plugin_uuid: PluginUuid,
    pub register_event: String,
    pub info: RegistrationInfo,
}

/// The `-info` object describing the host application.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationInfo(Value);

impl RegistrationInfo {
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Host application version, e.g. `"4.1.0.12345"`.
    pub fn application_version(&self) -> Option<&str> {
        self.0.pointer("/application/version")?.as_str()
    }

    /// Host platform, `"mac"` or `"windows"`.
    pub fn platform(&self) -> Option<&str> {
        self.0.pointer("/application/platform")?.as_str()
    }

    /// Version of this plugin as installed.
    pub fn plugin_version(&self) -> Option<&str> {
        self.0.pointer("/plugin/version")?.as_str()
    }

    /// Number of devices attached at launch.
    pub fn device_count(&self) -> usize {
        self.0
            .get("devices")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// What the dispatch loop does with a message that fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Report a diagnostic and continue with the next message.
    #[default]
    Skip,
    /// Stop the loop with the decode error.
    Abort,
}

impl FromStr for DecodePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            _ => Err(ConfigError::InvalidValue {
                key: "DECK_DECODE_POLICY",
                value: s.to_string(),
            }),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(ConfigError::InvalidValue {
                key: "DECK_LOG_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub decode_policy: DecodePolicy,

    /// Filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` expression).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            decode_policy: DecodePolicy::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let decode_policy = lookup("DECK_DECODE_POLICY")
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or_default();

        let log_level = lookup("DECK_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_format = lookup("DECK_LOG_FORMAT")
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            decode_policy,
            log_level,
            log_format,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
