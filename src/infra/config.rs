//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// Acquisition window in milliseconds before best-effort resolution
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: default_timeout_ms() }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcceptanceConfig {
    /// Horizontal accuracy (meters) at or below which a fix resolves immediately
    #[serde(default = "default_accuracy_threshold_m")]
    pub accuracy_threshold_m: f64,
    /// Maximum fix age (milliseconds) for immediate acceptance; older
    /// fixes are cached readings and only count as best-effort fallbacks
    #[serde(default = "default_staleness_bound_ms")]
    pub staleness_bound_ms: u64,
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self {
            accuracy_threshold_m: default_accuracy_threshold_m(),
            staleness_bound_ms: default_staleness_bound_ms(),
        }
    }
}

fn default_accuracy_threshold_m() -> f64 {
    100.0
}

fn default_staleness_bound_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Bound on the provider event channel (backpressure on bursty sensors)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { event_buffer: default_event_buffer() }
    }
}

fn default_event_buffer() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub acceptance: AcceptanceConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    timeout_ms: u64,
    accuracy_threshold_m: f64,
    staleness_bound_ms: u64,
    event_buffer: usize,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            accuracy_threshold_m: default_accuracy_threshold_m(),
            staleness_bound_ms: default_staleness_bound_ms(),
            event_buffer: default_event_buffer(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Determine config file path from args or environment
    pub fn resolve_config_path(args: &[String]) -> String {
        for (i, arg) in args.iter().enumerate() {
            if arg == "--config" {
                if let Some(path) = args.get(i + 1) {
                    return path.clone();
                }
            }
            if let Some(path) = arg.strip_prefix("--config=") {
                return path.to_string();
            }
        }

        if let Ok(path) = env::var("CONFIG_FILE") {
            return path;
        }

        "config/dev.toml".to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        anyhow::ensure!(
            toml_config.acceptance.accuracy_threshold_m > 0.0,
            "acceptance.accuracy_threshold_m must be positive in {}",
            path.display()
        );
        anyhow::ensure!(
            toml_config.request.timeout_ms > 0,
            "request.timeout_ms must be positive in {}",
            path.display()
        );

        Ok(Self {
            timeout_ms: toml_config.request.timeout_ms,
            accuracy_threshold_m: toml_config.acceptance.accuracy_threshold_m,
            staleness_bound_ms: toml_config.acceptance.staleness_bound_ms,
            event_buffer: toml_config.provider.event_buffer,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - tries TOML file first, falls back to defaults
    pub fn load(args: &[String]) -> Self {
        let config_path = Self::resolve_config_path(args);

        match Self::from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific path, falling back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn accuracy_threshold_m(&self) -> f64 {
        self.accuracy_threshold_m
    }

    pub fn staleness_bound(&self) -> Duration {
        Duration::from_millis(self.staleness_bound_ms)
    }

    pub fn staleness_bound_ms(&self) -> u64 {
        self.staleness_bound_ms
    }

    pub fn event_buffer(&self) -> usize {
        self.event_buffer
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Override the acquisition window (used by tests and embedders)
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Override the immediate-acceptance accuracy threshold
    pub fn with_accuracy_threshold_m(mut self, threshold_m: f64) -> Self {
        self.accuracy_threshold_m = threshold_m;
        self
    }

    /// Override the staleness bound for immediate acceptance
    pub fn with_staleness_bound_ms(mut self, staleness_ms: u64) -> Self {
        self.staleness_bound_ms = staleness_ms;
        self
    }
}
