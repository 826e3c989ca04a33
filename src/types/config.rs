//! Configuration structures for the RFID tag simulator
//!
//! This module contains the simulator configuration, the partial configuration
//! file format, command line arguments, and the validation logic that runs
//! before the simulation engine is ever constructed.

use super::{Epc, ThresholdDescriptor};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Timing limits and defaults shared by configuration and validation
pub mod limits {
    /// Smallest accepted heartbeat duration and reporting interval, in milliseconds
    pub const MIN_PERIOD_MS: u64 = 1000;

    /// Default tag heartbeat duration in milliseconds
    pub const DEFAULT_HEARTBEAT_MS: u64 = 1000;

    /// Default reporting interval in milliseconds
    pub const DEFAULT_REPORTING_INTERVAL_MS: u64 = 1000;

    /// Default broker connection timeout in milliseconds
    pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 5000;

    /// Default MQTT broker port
    pub const DEFAULT_MQTT_PORT: u16 = 1883;

    /// Largest accepted tag population
    pub const MAX_EPCS: usize = 1_000_000;
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rfid-tag-simulator",
    version = "0.1.0",
    about = "RFID Tag Simulator - Publishes synthetic item and threshold events to an MQTT broker",
    long_about = "Simulates an RFID item-tracking deployment: a population of tags periodically reports item movements and threshold crossings, which are published to an MQTT broker for downstream testing.

EXAMPLES:
    # Run with default settings against a local broker
    rfid-tag-simulator

    # Use a configuration file
    rfid-tag-simulator --config config.json

    # Simulate 500 tags, reporting every 2 seconds
    rfid-tag-simulator --total-epcs 500 --interval 2000

    # Print events to stdout instead of publishing
    rfid-tag-simulator --config config.json --stdout

    # Generate configuration template
    rfid-tag-simulator --print-config > my-config.json

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// MQTT broker host
    #[arg(long, help = "MQTT broker host")]
    pub host: Option<String>,

    /// MQTT broker port
    #[arg(long, help = "MQTT broker port")]
    pub port: Option<u16>,

    /// Topic prefix
    #[arg(long, help = "Topic prefix placed before the event type")]
    pub prefix: Option<String>,

    /// Topic suffix
    #[arg(long, help = "Topic suffix placed after the event type")]
    pub suffix: Option<String>,

    /// Broker username; enables authentication
    #[arg(long, help = "Broker username (enables authentication)")]
    pub username: Option<String>,

    /// Broker password
    #[arg(long, help = "Broker password")]
    pub password: Option<String>,

    /// MQTT client identifier
    #[arg(long, help = "MQTT client identifier")]
    pub client_id: Option<String>,

    /// Explicit EPCs to simulate
    #[arg(
        long = "epc",
        value_name = "EPC",
        help = "Explicit EPC to simulate (repeatable)",
        long_help = "Hexadecimal EPC to simulate. May be given several times; replaces the EPC list from the configuration file."
    )]
    pub epcs: Vec<Epc>,

    /// Target total number of simulated tags
    #[arg(
        long,
        help = "Target total number of tags",
        long_help = "Total number of simulated tags. Random EPCs are generated when the explicit list is shorter."
    )]
    pub total_epcs: Option<usize>,

    /// Tag heartbeat duration in milliseconds
    #[arg(long, value_name = "MS", help = "Minimum time between reports of one tag (ms, >= 1000)")]
    pub heartbeat: Option<u64>,

    /// Reporting interval in milliseconds
    #[arg(long, value_name = "MS", help = "Scheduler tick period (ms, >= 1000)")]
    pub interval: Option<u64>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Save the final EPC list
    #[arg(long, help = "Save the final EPC list to a file")]
    pub save_epcs: bool,

    /// Output path for the EPC list
    #[arg(long, help = "Output path for the saved EPC list")]
    pub epcs_output: Option<String>,

    /// Print events to stdout instead of publishing to the broker
    #[arg(long, help = "Print events to stdout instead of publishing to the broker")]
    pub stdout: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Directory for rolling log files
    #[arg(long, help = "Also write logs to daily rolling files in this directory")]
    pub log_dir: Option<String>,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// EPC population settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EpcConfig {
    /// Explicitly configured EPCs, kept unmodified and first in the pool
    #[serde(rename = "use")]
    pub explicit: Vec<Epc>,

    /// Target total population; random EPCs fill the gap
    pub total: usize,

    /// Whether to write the final EPC list to `output`
    pub save: bool,

    /// Path the EPC list is written to when `save` is set
    pub output: String,
}

impl Default for EpcConfig {
    fn default() -> Self {
        Self { explicit: Vec::new(), total: 0, save: false, output: "epcs.txt".to_string() }
    }
}

/// MQTT broker connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MqttConfig {
    /// Broker host name
    pub host: String,

    /// Broker port
    pub port: u16,

    /// Optional topic prefix
    pub prefix: String,

    /// Optional topic suffix
    pub suffix: String,

    /// Whether to authenticate with `username`/`password`
    #[serde(alias = "secured")]
    pub auth: bool,

    /// Broker username
    pub username: String,

    /// Broker password
    pub password: String,

    /// Client identifier; generated when absent
    pub client_id: Option<String>,

    /// Bound on a single connection attempt, in milliseconds
    pub connection_timeout: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: limits::DEFAULT_MQTT_PORT,
            prefix: String::new(),
            suffix: String::new(),
            auth: false,
            username: String::new(),
            password: String::new(),
            client_id: None,
            connection_timeout: limits::DEFAULT_CONNECTION_TIMEOUT_MS,
        }
    }
}

impl MqttConfig {
    /// Connection timeout as a [`Duration`]
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout)
    }
}

/// The `epcs` section accepts either a bare list or the full object form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EpcsSection {
    /// `"epcs": ["AA11", ...]`
    List(Vec<Epc>),
    /// `"epcs": {"use": [...], "total": 10, "save": true}`
    Full(EpcConfig),
}

impl From<EpcsSection> for EpcConfig {
    fn from(section: EpcsSection) -> Self {
        match section {
            EpcsSection::List(explicit) => EpcConfig { explicit, ..EpcConfig::default() },
            EpcsSection::Full(config) => config,
        }
    }
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Zone labels used as movement destinations
    pub zones: Option<Vec<String>>,

    /// Threshold descriptors used for crossing events
    pub thresholds: Option<Vec<ThresholdDescriptor>>,

    /// EPC population settings
    pub epcs: Option<EpcsSection>,

    /// Tag heartbeat duration in milliseconds
    pub tag_heartbeat_duration: Option<u64>,

    /// Reporting interval in milliseconds
    pub reporting_interval: Option<u64>,

    /// Broker connection settings
    #[serde(alias = "mqttConnection")]
    pub mqtt: Option<MqttConfig>,

    /// Random seed for reproducible results
    pub seed: Option<u64>,
}

/// Resolved configuration for the tag simulator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorConfig {
    /// Zone labels used as movement destinations
    pub zones: Vec<String>,

    /// Threshold descriptors used for crossing events
    pub thresholds: Vec<ThresholdDescriptor>,

    /// EPC population settings
    pub epcs: EpcConfig,

    /// Minimum time between two reports of the same tag, in milliseconds
    pub tag_heartbeat_duration: u64,

    /// Scheduler tick period, in milliseconds
    pub reporting_interval: u64,

    /// Broker connection settings
    pub mqtt: MqttConfig,

    /// Random seed for reproducible results
    pub seed: Option<u64>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for simulator configuration
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigValidationError {
    /// Heartbeat duration below the minimum
    #[error("Tag heartbeat duration must be at least {min} ms, got {value}")]
    InvalidHeartbeatDuration {
        /// The configured value
        value: u64,
        /// The minimum accepted value
        min: u64,
    },

    /// Reporting interval below the minimum
    #[error("Reporting interval must be at least {min} ms, got {value}")]
    InvalidReportingInterval {
        /// The configured value
        value: u64,
        /// The minimum accepted value
        min: u64,
    },

    /// The same EPC is configured more than once
    #[error("EPC {0} is configured more than once")]
    DuplicateEpc(String),

    /// The tag population exceeds the supported maximum
    #[error("EPC population of {value} exceeds the maximum of {max}")]
    TooManyEpcs {
        /// The requested population size
        value: usize,
        /// The maximum accepted population size
        max: usize,
    },

    /// A zone label is empty
    #[error("Zone at index {0} has an empty label")]
    EmptyZone(usize),

    /// A threshold descriptor has an empty label
    #[error("Threshold at index {0} has an empty label")]
    InvalidThreshold(usize),

    /// The EPC output path is empty while saving is enabled
    #[error("EPC output path must not be empty when saving is enabled")]
    EmptyEpcOutput,

    /// Broker host is empty
    #[error("MQTT host must not be empty")]
    EmptyHost,

    /// Broker port is zero
    #[error("MQTT port must be between 1 and 65535, got {0}")]
    InvalidPort(u16),

    /// Authentication enabled without a username
    #[error("MQTT authentication is enabled but no username is configured")]
    MissingUsername,

    /// Connection timeout is zero
    #[error("MQTT connection timeout must be greater than 0 ms")]
    InvalidConnectionTimeout,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            thresholds: Vec::new(),
            epcs: EpcConfig::default(),
            tag_heartbeat_duration: limits::DEFAULT_HEARTBEAT_MS,
            reporting_interval: limits::DEFAULT_REPORTING_INTERVAL_MS,
            mqtt: MqttConfig::default(),
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration from command line arguments and optional config file
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::from_cli_args(&args)
    }

    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                Self::from_json(&content)
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Parse configuration from JSON text, merging with defaults
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config_file: ConfigFile = serde_json::from_str(content)?;
        Ok(Self::from_config_file(config_file))
    }

    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            zones: config_file.zones.unwrap_or(defaults.zones),
            thresholds: config_file.thresholds.unwrap_or(defaults.thresholds),
            epcs: config_file.epcs.map(EpcConfig::from).unwrap_or(defaults.epcs),
            tag_heartbeat_duration: config_file
                .tag_heartbeat_duration
                .unwrap_or(defaults.tag_heartbeat_duration),
            reporting_interval: config_file
                .reporting_interval
                .unwrap_or(defaults.reporting_interval),
            mqtt: config_file.mqtt.unwrap_or(defaults.mqtt),
            seed: config_file.seed.or(defaults.seed),
        }
    }

    fn apply_cli_overrides(config: &mut Self, args: &CliArgs) {
        if let Some(value) = &args.host {
            config.mqtt.host = value.clone();
        }
        if let Some(value) = args.port {
            config.mqtt.port = value;
        }
        if let Some(value) = &args.prefix {
            config.mqtt.prefix = value.clone();
        }
        if let Some(value) = &args.suffix {
            config.mqtt.suffix = value.clone();
        }
        if let Some(value) = &args.username {
            config.mqtt.username = value.clone();
            config.mqtt.auth = true;
        }
        if let Some(value) = &args.password {
            config.mqtt.password = value.clone();
        }
        if let Some(value) = &args.client_id {
            config.mqtt.client_id = Some(value.clone());
        }

        if !args.epcs.is_empty() {
            config.epcs.explicit = args.epcs.clone();
        }
        if let Some(value) = args.total_epcs {
            config.epcs.total = value;
        }
        if args.save_epcs {
            config.epcs.save = true;
        }
        if let Some(value) = &args.epcs_output {
            config.epcs.output = value.clone();
        }

        if let Some(value) = args.heartbeat {
            config.tag_heartbeat_duration = value;
        }
        if let Some(value) = args.interval {
            config.reporting_interval = value;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.tag_heartbeat_duration < limits::MIN_PERIOD_MS {
            return Err(ConfigValidationError::InvalidHeartbeatDuration {
                value: self.tag_heartbeat_duration,
                min: limits::MIN_PERIOD_MS,
            });
        }

        if self.reporting_interval < limits::MIN_PERIOD_MS {
            return Err(ConfigValidationError::InvalidReportingInterval {
                value: self.reporting_interval,
                min: limits::MIN_PERIOD_MS,
            });
        }

        if self.population_size() > limits::MAX_EPCS {
            return Err(ConfigValidationError::TooManyEpcs {
                value: self.population_size(),
                max: limits::MAX_EPCS,
            });
        }

        let mut seen = HashSet::new();
        for epc in &self.epcs.explicit {
            if !seen.insert(epc) {
                return Err(ConfigValidationError::DuplicateEpc(epc.to_string()));
            }
        }

        if self.epcs.save && self.epcs.output.trim().is_empty() {
            return Err(ConfigValidationError::EmptyEpcOutput);
        }

        if let Some(index) = self.zones.iter().position(|zone| zone.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyZone(index));
        }

        if let Some(index) = self.thresholds.iter().position(|t| !t.is_well_formed()) {
            return Err(ConfigValidationError::InvalidThreshold(index));
        }

        self.validate_mqtt()
    }

    fn validate_mqtt(&self) -> Result<(), ConfigValidationError> {
        let mqtt = &self.mqtt;

        if mqtt.host.trim().is_empty() {
            return Err(ConfigValidationError::EmptyHost);
        }
        if mqtt.port == 0 {
            return Err(ConfigValidationError::InvalidPort(mqtt.port));
        }
        if mqtt.auth && mqtt.username.is_empty() {
            return Err(ConfigValidationError::MissingUsername);
        }
        if mqtt.connection_timeout == 0 {
            return Err(ConfigValidationError::InvalidConnectionTimeout);
        }

        Ok(())
    }

    /// Tag heartbeat duration as a [`Duration`]
    pub fn heartbeat_duration(&self) -> Duration {
        Duration::from_millis(self.tag_heartbeat_duration)
    }

    /// Reporting interval as a [`Duration`]
    pub fn reporting_interval_duration(&self) -> Duration {
        Duration::from_millis(self.reporting_interval)
    }

    /// Final population size: the target total, or the explicit list size if larger
    pub fn population_size(&self) -> usize {
        self.epcs.total.max(self.epcs.explicit.len())
    }
}
