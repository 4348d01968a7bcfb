use serde::{Deserialize, Serialize};
use shared::wire::{MAX_UPLOAD_BYTES, PROCESS_VIDEO_PATH, VIDEO_FIELD};
use std::path::{Path, PathBuf};
use url::Url;

const DEFAULT_CONFIG_PATH: &str = "config/gateway.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },
    #[error("Invalid detector URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub frontend_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_upload_bytes: u64,
    pub max_frame_bytes: u64,
    pub max_concurrent_jobs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorMode {
    Remote,
    Fixture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub mode: DetectorMode,
    pub base_url: String,
    pub video_path: String,
    pub video_field: String,
    pub frame_path: String,
    pub frame_field: String,
    pub timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8081,
            frontend_dir: None,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            max_frame_bytes: 5 * 1024 * 1024,
            max_concurrent_jobs: 2,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            mode: DetectorMode::Remote,
            base_url: "http://localhost:5000".to_string(),
            video_path: PROCESS_VIDEO_PATH.to_string(),
            video_field: VIDEO_FIELD.to_string(),
            frame_path: "/frame".to_string(),
            frame_field: "frame".to_string(),
            timeout_secs: 300,
            retry_attempts: 1,
            retry_backoff_ms: 500,
        }
    }
}

impl GatewayConfig {
    /// Reads `CONFIG_PATH` (or `config/gateway.yaml` when present), then
    /// applies environment overrides and validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::from_path(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_path(Path::new(DEFAULT_CONFIG_PATH))?
            }
            Err(_) => {
                log::info!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("BIND_ADDR") {
            self.server.bind_address = value;
        }
        if let Some(value) = lookup("PORT") {
            self.server.port = parse_env("PORT", value)?;
        }
        if let Some(value) = lookup("FRONTEND_DIR") {
            self.server.frontend_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("MAX_UPLOAD_BYTES") {
            self.limits.max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", value)?;
        }
        if let Some(value) = lookup("DETECTOR_MODE") {
            self.detector.mode = match value.to_ascii_lowercase().as_str() {
                "remote" => DetectorMode::Remote,
                "fixture" => DetectorMode::Fixture,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: "DETECTOR_MODE".into(),
                        value,
                    });
                }
            };
        }
        if let Some(value) = lookup("DETECTOR_URL") {
            self.detector.base_url = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_upload_bytes == 0 || self.limits.max_frame_bytes == 0 {
            return Err(ConfigError::Invalid("size limits must be non-zero".into()));
        }
        if self.limits.max_concurrent_jobs == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_jobs must be at least 1".into(),
            ));
        }
        if self.detector.mode == DetectorMode::Remote {
            self.detector.base_url()?;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    pub fn frontend_dir(&self) -> PathBuf {
        if let Some(dir) = &self.server.frontend_dir {
            return dir.clone();
        }
        match std::env::var("CARGO_MANIFEST_DIR") {
            Ok(manifest_dir) => PathBuf::from(format!("{}/../frontend/dist", manifest_dir)),
            Err(_) => PathBuf::from("/usr/src/app/frontend/dist"),
        }
    }
}

impl DetectorConfig {
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "detector URL must be http(s), got {}",
                url.scheme()
            )));
        }
        Ok(url)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_upload_contract() {
        let config = GatewayConfig::default();
        assert_eq!(config.limits.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.detector.mode, DetectorMode::Remote);
        assert_eq!(config.bind_address(), "0.0.0.0:8081");
        config.validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = GatewayConfig::from_yaml_str(
            "server:\n  port: 9000\ndetector:\n  mode: fixture\n",
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.detector.mode, DetectorMode::Fixture);
        assert_eq!(config.detector.video_field, "video");
    }

    #[test]
    fn reads_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "limits:\n  max_concurrent_jobs: 4").unwrap();
        let config = GatewayConfig::from_path(file.path()).unwrap();
        assert_eq!(config.limits.max_concurrent_jobs, 4);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GatewayConfig::from_path(Path::new("/nonexistent/gateway.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = GatewayConfig::default();
        config
            .apply_env_overrides(env(&[
                ("PORT", "9090"),
                ("DETECTOR_MODE", "FIXTURE"),
                ("DETECTOR_URL", "https://detector.internal:7000"),
                ("MAX_UPLOAD_BYTES", "1024"),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.detector.mode, DetectorMode::Fixture);
        assert_eq!(config.detector.base_url, "https://detector.internal:7000");
        assert_eq!(config.limits.max_upload_bytes, 1024);
    }

    #[test]
    fn bad_environment_values_are_reported() {
        let mut config = GatewayConfig::default();
        let err = config
            .apply_env_overrides(env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref key, .. } if key == "PORT"));

        let err = config
            .apply_env_overrides(env(&[("DETECTOR_MODE", "magic")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn remote_mode_requires_a_valid_url() {
        let mut config = GatewayConfig::default();
        config.detector.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(ConfigError::Url(_))));

        config.detector.base_url = "ftp://detector".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.detector.mode = DetectorMode::Fixture;
        config.validate().unwrap();
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut config = GatewayConfig::default();
        config.limits.max_concurrent_jobs = 0;
        assert!(config.validate().is_err());
    }
}
