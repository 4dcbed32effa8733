use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, TanzuError};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:30001";
pub const DEFAULT_APPLICATION: &str = "defaultApp";
pub const DEFAULT_SERVICE: &str = "defaultService";
const DEFAULT_METRICS_PORT: u16 = 2878;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub traces: TracesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TracesConfig {
    /// Address of the Wavefront proxy's tracing listener, e.g. `http://localhost:30001`.
    pub endpoint: String,
    /// Used for the `application` tag when neither resource nor span carries one.
    pub default_application: String,
    /// Used for the `service` tag when neither resource nor span carries one.
    pub default_service: String,
    pub flush_interval: Duration,
}

impl Default for TracesConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_application: DEFAULT_APPLICATION.to_string(),
            default_service: DEFAULT_SERVICE.to_string(),
            flush_interval: Duration::from_secs(1),
        }
    }
}

/// Connection settings a proxy span sender is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub host: String,
    pub tracing_port: u16,
    pub metrics_port: u16,
    pub flush_interval: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        apply_overrides(&mut cfg, load_env_overrides(), "environment")?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        apply_overrides(&mut cfg, load_env_overrides(), "environment")?;
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let parsed: FileOverrides = toml::from_str(raw)
            .map_err(|e| TanzuError::Config(format!("failed parsing config: {e}")))?;
        let mut cfg = Self::default();
        apply_overrides(&mut cfg, parsed.traces, "config file")?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let traces = &self.traces;
        if traces.endpoint.is_empty() {
            return Err(TanzuError::Config(
                "a non-empty traces.endpoint is required".to_string(),
            ));
        }
        if traces.default_application.is_empty() {
            return Err(TanzuError::Config(
                "a non-empty traces.default_application is required".to_string(),
            ));
        }
        if traces.default_service.is_empty() {
            return Err(TanzuError::Config(
                "a non-empty traces.default_service is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn proxy_endpoint(&self) -> Result<ProxyEndpoint> {
        let endpoint = &self.traces.endpoint;
        let url = Url::parse(endpoint)
            .map_err(|e| TanzuError::Parse(format!("invalid traces endpoint {endpoint}: {e}")))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TanzuError::Parse(format!("traces endpoint {endpoint} has no host")))?;
        let tracing_port = url
            .port()
            .ok_or_else(|| TanzuError::Parse(format!("traces endpoint {endpoint} has no port")))?;

        Ok(ProxyEndpoint {
            host: host.to_string(),
            tracing_port,
            metrics_port: DEFAULT_METRICS_PORT,
            flush_interval: self.traces.flush_interval,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    #[serde(default)]
    traces: ConfigOverrides,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    endpoint: Option<String>,
    default_application: Option<String>,
    default_service: Option<String>,
    flush_interval: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("TANZU_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("tanzu-exporter/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| TanzuError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: FileOverrides = toml::from_str(&raw)
        .map_err(|e| TanzuError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed.traces))
}

fn load_env_overrides() -> ConfigOverrides {
    ConfigOverrides {
        endpoint: env::var("TANZU_TRACES_ENDPOINT").ok(),
        default_application: env::var("TANZU_DEFAULT_APPLICATION").ok(),
        default_service: env::var("TANZU_DEFAULT_SERVICE").ok(),
        flush_interval: env::var("TANZU_FLUSH_INTERVAL").ok(),
    }
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.endpoint {
        cfg.traces.endpoint = v;
    }
    if let Some(v) = overrides.default_application {
        cfg.traces.default_application = v;
    }
    if let Some(v) = overrides.default_service {
        cfg.traces.default_service = v;
    }
    if let Some(v) = overrides.flush_interval {
        cfg.traces.flush_interval = humantime::parse_duration(&v).map_err(|e| {
            TanzuError::Config(format!("bad flush_interval in {source}: {e} (value={v})"))
        })?;
    }
    Ok(())
}
