//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, GlissConfig, Tiebreak};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/gliss/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("gliss/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    // CLI override takes precedence over local
    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("gliss.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file on top of the compiled defaults.
pub fn load_from_file(path: &Path) -> Result<GlissConfig, ConfigError> {
    let mut config = GlissConfig::default();
    apply_file(&mut config, path)?;
    Ok(config)
}

/// Overlay the keys present in a TOML file onto `config`.
pub fn apply_file(config: &mut GlissConfig, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(config, &contents, path)
}

/// Parse config from TOML string.
pub fn parse_toml(contents: &str, path: &Path) -> Result<GlissConfig, ConfigError> {
    let mut config = GlissConfig::default();
    apply_toml(&mut config, contents, path)?;
    Ok(config)
}

/// Overlay only the keys that appear in `contents`; absent keys keep
/// whatever an earlier file (or the defaults) set.
fn apply_toml(config: &mut GlissConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    // Parse as raw TOML table first so missing keys don't reset earlier layers
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let bad = |key: &str, expected: &str| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("{} must be {}", key, expected),
    };

    if let Some(grid) = table.get("grid").and_then(|v| v.as_table()) {
        if let Some(v) = grid.get("divisions") {
            let n = v.as_integer().ok_or_else(|| bad("grid.divisions", "an integer"))?;
            config.grid.divisions =
                u32::try_from(n).map_err(|_| bad("grid.divisions", "a positive integer"))?;
        }
        if let Some(v) = grid.get("reference_hz") {
            config.grid.reference_hz = as_float(v).ok_or_else(|| bad("grid.reference_hz", "a number"))?;
        }
        if let Some(v) = grid.get("low_hz") {
            config.grid.low_hz = as_float(v).ok_or_else(|| bad("grid.low_hz", "a number"))?;
        }
        if let Some(v) = grid.get("high_hz") {
            config.grid.high_hz = as_float(v).ok_or_else(|| bad("grid.high_hz", "a number"))?;
        }
    }

    if let Some(search) = table.get("search").and_then(|v| v.as_table()) {
        if let Some(v) = search.get("max_subharmonics") {
            let n = v
                .as_integer()
                .ok_or_else(|| bad("search.max_subharmonics", "an integer"))?;
            config.search.max_subharmonics = u32::try_from(n)
                .map_err(|_| bad("search.max_subharmonics", "a positive integer"))?;
        }
        if let Some(v) = search.get("max_sidebands") {
            let n = v
                .as_integer()
                .ok_or_else(|| bad("search.max_sidebands", "an integer"))?;
            config.search.max_sidebands = usize::try_from(n)
                .map_err(|_| bad("search.max_sidebands", "a positive integer"))?;
        }
        if let Some(v) = search.get("tiebreak") {
            let s = v
                .as_str()
                .ok_or_else(|| bad("search.tiebreak", "\"highest\" or \"lowest\""))?;
            config.search.tiebreak = s.parse::<Tiebreak>().map_err(|message| ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            })?;
        }
    }

    if let Some(roughness) = table.get("roughness").and_then(|v| v.as_table()) {
        let fields: [(&str, &mut f64); 5] = [
            ("b1", &mut config.roughness.b1),
            ("b2", &mut config.roughness.b2),
            ("s1", &mut config.roughness.s1),
            ("s2", &mut config.roughness.s2),
            ("d_max", &mut config.roughness.d_max),
        ];
        for (key, slot) in fields {
            if let Some(v) = roughness.get(key) {
                *slot = as_float(v).ok_or_else(|| bad(&format!("roughness.{}", key), "a number"))?;
            }
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
    }

    Ok(())
}

/// TOML distinguishes `24` from `24.0`; accept either for float fields.
fn as_float(value: &toml::Value) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
}

/// Apply environment variable overrides to config.
///
/// Unparseable values are ignored and leave the file/default value in place.
pub fn apply_env_overrides(config: &mut GlissConfig, sources: &mut ConfigSources) {
    if let Some(v) = env_parse::<u32>("GLISS_DIVISIONS") {
        config.grid.divisions = v;
        sources.env_overrides.push("GLISS_DIVISIONS".to_string());
    }
    if let Some(v) = env_parse::<f64>("GLISS_LOW_HZ") {
        config.grid.low_hz = v;
        sources.env_overrides.push("GLISS_LOW_HZ".to_string());
    }
    if let Some(v) = env_parse::<f64>("GLISS_HIGH_HZ") {
        config.grid.high_hz = v;
        sources.env_overrides.push("GLISS_HIGH_HZ".to_string());
    }

    if let Some(v) = env_parse::<u32>("GLISS_MAX_SUBHARMONICS") {
        config.search.max_subharmonics = v;
        sources.env_overrides.push("GLISS_MAX_SUBHARMONICS".to_string());
    }
    if let Some(v) = env_parse::<usize>("GLISS_MAX_SIDEBANDS") {
        config.search.max_sidebands = v;
        sources.env_overrides.push("GLISS_MAX_SIDEBANDS".to_string());
    }
    if let Some(v) = env_parse::<Tiebreak>("GLISS_TIEBREAK") {
        config.search.tiebreak = v;
        sources.env_overrides.push("GLISS_TIEBREAK".to_string());
    }

    if let Ok(v) = env::var("GLISS_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("GLISS_LOG_LEVEL".to_string());
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_discover_config_files() {
        // Just verify it doesn't panic
        let _files = discover_config_files();
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
[grid]
divisions = 12
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();
        assert_eq!(config.grid.divisions, 12);
        // Other values should be defaults
        assert_eq!(config.grid.reference_hz, 440.0);
        assert_eq!(config.search.max_sidebands, 20);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
[grid]
divisions = 48
reference_hz = 442
low_hz = 20.0
high_hz = 4000.0

[search]
max_subharmonics = 16
max_sidebands = 12
tiebreak = "lowest"

[roughness]
b1 = 3.51
d_max = 0.25

[telemetry]
log_level = "debug"
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();

        assert_eq!(config.grid.divisions, 48);
        assert_eq!(config.grid.reference_hz, 442.0);
        assert_eq!(config.grid.low_hz, 20.0);
        assert_eq!(config.grid.high_hz, 4000.0);
        assert_eq!(config.search.max_subharmonics, 16);
        assert_eq!(config.search.max_sidebands, 12);
        assert_eq!(config.search.tiebreak, Tiebreak::Lowest);
        assert_eq!(config.roughness.b1, 3.51);
        assert_eq!(config.roughness.b2, 5.75);
        assert_eq!(config.roughness.d_max, 0.25);
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let toml = r#"
[grid]
divisions = "many"
"#;
        let err = parse_toml(toml, Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("grid.divisions"));

        let toml = r#"
[search]
tiebreak = "middle"
"#;
        assert!(parse_toml(toml, Path::new("bad.toml")).is_err());
    }

    #[test]
    fn test_later_file_keeps_earlier_keys() {
        let mut first = tempfile::NamedTempFile::new().unwrap();
        writeln!(first, "[grid]\ndivisions = 12\n[search]\nmax_sidebands = 8").unwrap();
        let mut second = tempfile::NamedTempFile::new().unwrap();
        writeln!(second, "[search]\nmax_sidebands = 10").unwrap();

        let mut config = GlissConfig::default();
        apply_file(&mut config, first.path()).unwrap();
        apply_file(&mut config, second.path()).unwrap();

        assert_eq!(config.grid.divisions, 12);
        assert_eq!(config.search.max_sidebands, 10);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_from_file(Path::new("/nonexistent/gliss.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        env::set_var("GLISS_DIVISIONS", "12");
        env::set_var("GLISS_TIEBREAK", "lowest");
        env::set_var("GLISS_MAX_SIDEBANDS", "not a number");

        let mut config = GlissConfig::default();
        let mut sources = ConfigSources::default();
        apply_env_overrides(&mut config, &mut sources);

        env::remove_var("GLISS_DIVISIONS");
        env::remove_var("GLISS_TIEBREAK");
        env::remove_var("GLISS_MAX_SIDEBANDS");

        assert_eq!(config.grid.divisions, 12);
        assert_eq!(config.search.tiebreak, Tiebreak::Lowest);
        assert_eq!(config.search.max_sidebands, 20);
        assert!(sources.env_overrides.contains(&"GLISS_DIVISIONS".to_string()));
        assert!(!sources.env_overrides.contains(&"GLISS_MAX_SIDEBANDS".to_string()));
    }

    #[test]
    #[serial]
    fn test_load_with_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nmax_subharmonics = 7").unwrap();

        let (config, sources) = GlissConfig::load_with_sources_from(Some(file.path())).unwrap();
        assert_eq!(config.search.max_subharmonics, 7);
        assert!(sources.files.contains(&file.path().to_path_buf()));
    }
}
