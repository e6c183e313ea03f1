//! Configuration for aether-daemon

use aether_core::{PermissionOutcome, Profile, SessionConfig};
use serde::{Deserialize, Serialize};

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Session tuning handed to the core
    #[serde(default)]
    pub session: SessionConfig,

    /// Simulated sensor configuration
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Simulated sensors and run length
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed for the scoring draws and the synthetic sensors; unseeded when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// What the simulated compass answers to the consent prompt
    #[serde(default = "default_orientation_permission")]
    pub orientation_permission: PermissionOutcome,

    /// Mean delay between compass readings
    #[serde(default = "default_compass_interval")]
    pub compass_interval_ms: u64,

    /// Whether the console motor accepts pulses
    #[serde(default = "default_true")]
    pub haptics: bool,

    /// Stop after this many seconds; 0 runs until interrupted
    #[serde(default)]
    pub duration_secs: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            orientation_permission: default_orientation_permission(),
            compass_interval_ms: default_compass_interval(),
            haptics: true,
            duration_secs: 0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_orientation_permission() -> PermissionOutcome {
    PermissionOutcome::Granted
}

fn default_compass_interval() -> u64 {
    250
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration: defaults, then the file if given, then `AETHER_*`
    /// environment variables (`AETHER_SESSION__GLITCH__THRESHOLD=55`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("AETHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Replace the session tuning with a named preset.
    pub fn apply_profile(&mut self, profile: Profile) {
        self.session = SessionConfig::for_profile(profile);
    }
}
