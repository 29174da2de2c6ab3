//! Configuration management for dotrelay.
//!
//! Parses `dotrelay.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Embedding applications can override loaded values via [`Settings`].
//!
//! ## Example
//!
//! ```toml
//! [render]
//! timeout_secs = 30
//! format = "png"
//!
//! [[render.backends]]
//! name = "QuickChart Graphviz"
//! endpoint = "https://quickchart.io/graphviz"
//! method = "get"
//! document_param = "graph"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "dotrelay.toml";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default output format for rendered images.
const DEFAULT_FORMAT: &str = "png";

/// Programmatic settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct Settings {
    /// Override HTTP timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Override default output format.
    pub format: Option<String>,
    /// Replace the backend list.
    pub backends: Option<Vec<BackendEntry>>,
}

/// HTTP method used to transmit a document to a rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Document sent as a query parameter.
    #[default]
    Get,
    /// Document sent as a form field in the request body.
    Post,
}

/// One remote rendering backend as configured in `dotrelay.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendEntry {
    /// Human-readable identifier, used only for diagnostics.
    pub name: String,
    /// URL of the remote rendering API.
    pub endpoint: String,
    /// How the document is transmitted.
    #[serde(default)]
    pub method: Method,
    /// Parameter or field name under which the document text is sent.
    #[serde(default = "default_document_param")]
    pub document_param: String,
}

fn default_document_param() -> String {
    "graph".to_owned()
}

impl BackendEntry {
    /// The built-in QuickChart Graphviz backend.
    #[must_use]
    pub fn quickchart() -> Self {
        Self {
            name: "QuickChart Graphviz".to_owned(),
            endpoint: "https://quickchart.io/graphviz".to_owned(),
            method: Method::Get,
            document_param: "graph".to_owned(),
        }
    }
}

/// Raw render configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RenderConfigRaw {
    timeout_secs: Option<u64>,
    format: Option<String>,
    backends: Option<Vec<BackendEntry>>,
}

/// Resolved render configuration with defaults applied.
#[derive(Debug)]
pub struct RenderConfig {
    /// Network timeout applied to every backend request.
    pub timeout: Duration,
    /// Default output format for rendered images.
    pub format: String,
    /// Rendering backends, tried in list order.
    pub backends: Vec<BackendEntry>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            format: DEFAULT_FORMAT.to_owned(),
            backends: vec![BackendEntry::quickchart()],
        }
    }
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Render configuration (raw, as parsed from TOML).
    render: RenderConfigRaw,

    /// Resolved render configuration (set after loading).
    #[serde(skip)]
    pub render_resolved: RenderConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional override settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `dotrelay.toml` in current directory and
    /// parents, falling back to built-in defaults when none is found.
    ///
    /// Settings are applied after loading and resolution, then the result
    /// is validated, so overrides take precedence over config file values
    /// but cannot produce an invalid configuration.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing
    /// fails, or the resolved configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        settings: Option<&Settings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            let mut config = Self::default();
            config.resolve();
            config
        };

        if let Some(settings) = settings {
            config.apply_settings(settings);
        }

        config.validate()?;

        Ok(config)
    }

    /// Apply override settings to the resolved configuration.
    fn apply_settings(&mut self, settings: &Settings) {
        if let Some(timeout_secs) = settings.timeout_secs {
            self.render_resolved.timeout = Duration::from_secs(timeout_secs);
        }
        if let Some(format) = &settings.format {
            self.render_resolved.format.clone_from(format);
        }
        if let Some(backends) = &settings.backends {
            self.render_resolved.backends.clone_from(backends);
        }
    }

    /// Validate configuration values.
    ///
    /// Called automatically at the end of [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_resolved.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "render.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        require_non_empty(&self.render_resolved.format, "render.format")?;

        if self.render_resolved.backends.is_empty() {
            return Err(ConfigError::Validation(
                "render.backends cannot be empty".to_owned(),
            ));
        }

        for (i, backend) in self.render_resolved.backends.iter().enumerate() {
            require_non_empty(&backend.name, &format!("render.backends[{i}].name"))?;
            require_non_empty(&backend.endpoint, &format!("render.backends[{i}].endpoint"))?;
            require_http_url(&backend.endpoint, &format!("render.backends[{i}].endpoint"))?;
            require_non_empty(
                &backend.document_param,
                &format!("render.backends[{i}].document_param"),
            )?;
        }

        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.resolve();
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Resolve raw TOML values into the effective render configuration.
    fn resolve(&mut self) {
        let defaults = RenderConfig::default();
        self.render_resolved = RenderConfig {
            timeout: self
                .render
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            format: self.render.format.clone().unwrap_or(defaults.format),
            backends: self.render.backends.clone().unwrap_or(defaults.backends),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_minimal_config() {
        let toml = "";
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve();

        assert_eq!(
            config.render_resolved.timeout,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
        assert_eq!(config.render_resolved.format, "png");
        assert_eq!(config.render_resolved.backends.len(), 1);
        assert_eq!(
            config.render_resolved.backends[0].endpoint,
            "https://quickchart.io/graphviz"
        );
    }

    #[test]
    fn test_parse_render_config() {
        let toml = r#"
[render]
timeout_secs = 10
format = "svg"

[[render.backends]]
name = "Primary"
endpoint = "https://render.example.com/dot"
method = "post"
document_param = "source"

[[render.backends]]
name = "Fallback"
endpoint = "https://backup.example.com/graphviz"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve();

        assert_eq!(config.render_resolved.timeout, Duration::from_secs(10));
        assert_eq!(config.render_resolved.format, "svg");

        let backends = &config.render_resolved.backends;
        assert_eq!(backends.len(), 2);
        assert_eq!(backends[0].name, "Primary");
        assert_eq!(backends[0].method, Method::Post);
        assert_eq!(backends[0].document_param, "source");
        // Omitted method and document_param fall back to defaults
        assert_eq!(backends[1].method, Method::Get);
        assert_eq!(backends[1].document_param, "graph");
    }

    #[test]
    fn test_parse_invalid_method() {
        let toml = r#"
[[render.backends]]
name = "Broken"
endpoint = "https://render.example.com"
method = "put"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_settings_timeout() {
        let mut config = Config::default();
        config.resolve();
        let settings = Settings {
            timeout_secs: Some(5),
            ..Default::default()
        };

        config.apply_settings(&settings);

        assert_eq!(config.render_resolved.timeout, Duration::from_secs(5));
        assert_eq!(config.render_resolved.format, "png"); // Unchanged
    }

    #[test]
    fn test_apply_settings_backends() {
        let mut config = Config::default();
        config.resolve();
        let replacement = BackendEntry {
            name: "Local".to_owned(),
            endpoint: "http://localhost:8000/render".to_owned(),
            method: Method::Post,
            document_param: "dot".to_owned(),
        };
        let settings = Settings {
            backends: Some(vec![replacement]),
            ..Default::default()
        };

        config.apply_settings(&settings);

        assert_eq!(config.render_resolved.backends.len(), 1);
        assert_eq!(config.render_resolved.backends[0].name, "Local");
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.resolve();
        config.render_resolved.timeout = Duration::ZERO;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_empty_backends() {
        let mut config = Config::default();
        config.resolve();
        config.render_resolved.backends.clear();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("render.backends"));
    }

    #[test]
    fn test_validate_rejects_empty_endpoint() {
        let mut config = Config::default();
        config.resolve();
        config.render_resolved.backends[0].endpoint = String::new();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("render.backends[0].endpoint"));
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let mut config = Config::default();
        config.resolve();
        config.render_resolved.backends[0].endpoint = "ftp://render.example.com".to_owned();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dotrelay.toml");
        std::fs::write(
            &path,
            r#"
[render]
timeout_secs = 15
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.render_resolved.timeout, Duration::from_secs(15));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = Config::load(Some(Path::new("/nonexistent/dotrelay.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_applies_settings_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dotrelay.toml");
        std::fs::write(
            &path,
            r#"
[render]
format = "svg"
"#,
        )
        .unwrap();

        let settings = Settings {
            format: Some("png".to_owned()),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.render_resolved.format, "png");
    }

    #[test]
    fn test_load_rejects_invalid_override() {
        let settings = Settings {
            timeout_secs: Some(0),
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dotrelay.toml");
        std::fs::write(&path, "").unwrap();

        let result = Config::load(Some(&path), Some(&settings));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_quickchart_entry() {
        let entry = BackendEntry::quickchart();
        assert_eq!(entry.endpoint, "https://quickchart.io/graphviz");
        assert_eq!(entry.method, Method::Get);
        assert_eq!(entry.document_param, "graph");
    }
}
