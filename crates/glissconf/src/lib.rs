//! Configuration loading for the gliss chord analysis tools.
//!
//! Every tunable of the analysis core lives here: grid resolution and
//! range, overtone/FM search limits, and the roughness model coefficients.
//! The core crate takes these structs by reference; nothing reads global
//! state.
//!
//! # Usage
//!
//! ```rust,no_run
//! use glissconf::GlissConfig;
//!
//! let config = GlissConfig::load().expect("Failed to load config");
//! println!("divisions: {}", config.grid.divisions);
//! println!("sidebands: {}", config.search.max_sidebands);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/gliss/config.toml` (system)
//! 2. `~/.config/gliss/config.toml` (user)
//! 3. `./gliss.toml` (local override, or an explicit path)
//! 4. Environment variables (`GLISS_*`)
//!
//! # Example Config
//!
//! ```toml
//! [grid]
//! divisions = 24
//! low_hz = 16.3515978313
//! high_hz = 4300.0
//!
//! [search]
//! max_subharmonics = 10
//! max_sidebands = 20
//! tiebreak = "highest"
//!
//! [roughness]
//! b1 = 3.5
//! b2 = 5.75
//!
//! [telemetry]
//! log_level = "info"
//! ```

pub mod loader;
pub mod tuning;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use tuning::{GridConfig, RoughnessConfig, SearchConfig, Tiebreak};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Logging setup for binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    /// Default: "info"
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

/// Complete gliss configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GlissConfig {
    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub roughness: RoughnessConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl GlissConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/gliss/config.toml`
    /// 3. `~/.config/gliss/config.toml`
    /// 4. `./gliss.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./gliss.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and return information about sources.
    pub fn load_with_sources() -> Result<(Self, ConfigSources), ConfigError> {
        Self::load_with_sources_from(None)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = GlissConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::apply_file(&mut config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# gliss configuration\n\n");

        output.push_str("[grid]\n");
        output.push_str(&format!("divisions = {}\n", self.grid.divisions));
        output.push_str(&format!("reference_hz = {:?}\n", self.grid.reference_hz));
        output.push_str(&format!("low_hz = {:?}\n", self.grid.low_hz));
        output.push_str(&format!("high_hz = {:?}\n", self.grid.high_hz));

        output.push_str("\n[search]\n");
        output.push_str(&format!(
            "max_subharmonics = {}\n",
            self.search.max_subharmonics
        ));
        output.push_str(&format!("max_sidebands = {}\n", self.search.max_sidebands));
        output.push_str(&format!("tiebreak = \"{}\"\n", self.search.tiebreak));

        output.push_str("\n[roughness]\n");
        output.push_str(&format!("b1 = {:?}\n", self.roughness.b1));
        output.push_str(&format!("b2 = {:?}\n", self.roughness.b2));
        output.push_str(&format!("s1 = {:?}\n", self.roughness.s1));
        output.push_str(&format!("s2 = {:?}\n", self.roughness.s2));
        output.push_str(&format!("d_max = {:?}\n", self.roughness.d_max));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));

        output
    }
}
