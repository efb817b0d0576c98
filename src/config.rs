use crate::logging::{self, LogConfig, LogFormat, LogOutput};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File name searched for by `Config::discover`
pub const CONFIG_FILE: &str = ".gimarshal.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub marshal: MarshalConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarshalConfig {
    /// Validate with `check_representable` before every conversion
    #[serde(default = "default_false")]
    pub strict: bool,
}

impl MarshalConfig {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: FormatName,

    #[serde(default = "default_false")]
    pub span_events: bool,

    /// Rolling log files go here when set
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatName {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: FormatName::default(),
            span_events: false,
            directory: None,
        }
    }
}

fn default_false() -> bool { false }
fn default_level() -> String { "info".to_string() }

impl LoggingConfig {
    /// Subscriber settings; unknown level names fall back to info
    pub fn to_log_config(&self) -> LogConfig {
        let format = match self.format {
            FormatName::Compact => LogFormat::Compact,
            FormatName::Pretty => LogFormat::Pretty,
            FormatName::Json => LogFormat::Json,
        };
        let output = match &self.directory {
            Some(directory) => LogOutput::File {
                directory: directory.clone(),
                prefix: "gimarshal.log".to_string(),
            },
            None => LogOutput::Stderr,
        };

        LogConfig::default()
            .with_level(logging::parse_level(&self.level).unwrap_or(tracing::Level::INFO))
            .with_format(format)
            .with_output(output)
            .with_span_events(self.span_events)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Find and load `.gimarshal.toml` from the current directory or parents
    pub fn discover() -> Self {
        match std::env::current_dir() {
            Ok(dir) => Self::discover_from(&dir),
            Err(_) => Self::default(),
        }
    }

    pub fn discover_from(start: &Path) -> Self {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                if let Ok(config) = Self::load(&config_path) {
                    return config;
                }
            }
            current = dir.parent().map(|p| p.to_path_buf());
        }

        Self::default()
    }

    /// Generate default configuration file content
    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate config"))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.marshal.strict);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, FormatName::Compact);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[marshal]
strict = true

[logging]
level = "debug"
format = "json"
span_events = true
"#;

        let config = Config::parse(toml).unwrap();
        assert!(config.marshal.strict);

        let log = config.logging.to_log_config();
        assert_eq!(log.level, Level::DEBUG);
        assert_eq!(log.format, LogFormat::Json);
        assert!(log.span_events);
        assert_eq!(log.output, LogOutput::Stderr);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::parse("[logging]\ndirectory = \"logs\"\n").unwrap();
        assert!(!config.marshal.strict);
        assert!(matches!(
            config.logging.to_log_config().output,
            LogOutput::File { ref directory, .. } if directory == "logs"
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[marshal]\nstrict = \"yes\"\n").unwrap_err();
        assert!(err.starts_with("Failed to parse config"));
    }

    #[test]
    fn test_save_and_discover() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let mut config = Config::default();
        config.marshal.strict = true;
        config.save(&root.path().join(CONFIG_FILE)).unwrap();

        assert_eq!(Config::discover_from(&nested), config);
        assert_eq!(Config::load(&root.path().join(CONFIG_FILE)).unwrap(), config);
    }

    #[test]
    fn test_generate_default_parses() {
        let content = Config::generate_default();
        assert_eq!(Config::parse(&content).unwrap(), Config::default());
    }
}
