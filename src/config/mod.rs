mod schema;

pub use schema::{Config, ConfigFile, DEFAULT_ENDPOINT};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/stemfit/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Could not determine home directory");
    home.join(".config").join("stemfit")
}

/// Get the default config file path (~/.config/stemfit/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> Result<()> {
    let config_dir = get_config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory at {}",
                config_dir.display()
            )
        })?;
    }
    Ok(())
}

/// Load configuration from a YAML file.
///
/// A missing file at the default path means defaults (the service endpoint
/// ships with a sensible local default); an explicitly requested path that
/// does not exist is an error.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path(), false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let file: ConfigFile = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    resolve(file)
}

fn resolve(file: ConfigFile) -> Result<Config> {
    let defaults = Config::default();

    let timeout = match file.timeout {
        Some(ref s) => humantime::parse_duration(s)
            .with_context(|| format!("config: invalid timeout '{}'", s))?,
        None => defaults.timeout,
    };

    let score_animation = match file.score_animation {
        Some(ref s) => humantime::parse_duration(s)
            .with_context(|| format!("config: invalid score_animation '{}'", s))?,
        None => defaults.score_animation,
    };

    Ok(Config {
        endpoint: file.endpoint.unwrap_or(defaults.endpoint),
        timeout,
        score_animation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults_when_file_absent() {
        let config = Config::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.score_animation, Duration::from_millis(900));
    }

    #[test]
    fn test_resolve_full_file() {
        let file: ConfigFile = serde_saphyr::from_str(
            "endpoint: https://scores.example.org/api/evaluate\ntimeout: 5s\nscore_animation: 1200ms\n",
        )
        .unwrap();
        let config = resolve(file).unwrap();
        assert_eq!(config.endpoint, "https://scores.example.org/api/evaluate");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.score_animation, Duration::from_millis(1200));
    }

    #[test]
    fn test_resolve_partial_file_keeps_defaults() {
        let file: ConfigFile = serde_saphyr::from_str("timeout: 10s\n").unwrap();
        let config = resolve(file).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.score_animation, Duration::from_millis(900));
    }

    #[test]
    fn test_resolve_rejects_bad_duration() {
        let file: ConfigFile = serde_saphyr::from_str("timeout: soonish\n").unwrap();
        let err = resolve(file).unwrap_err().to_string();
        assert!(err.contains("invalid timeout"));
    }

    #[test]
    fn test_explicit_missing_path_errors() {
        let path = std::env::temp_dir().join("stemfit_test_missing_config.yaml");
        let _ = std::fs::remove_file(&path);
        assert!(load_config(Some(path)).is_err());
    }
}
