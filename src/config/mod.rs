use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::core::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "settings.toml";
pub const EXAMPLE_CONFIG_NAME: &str = "settings_example.toml";
pub const DEFAULT_INTERVAL_MINUTES: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            // `log` has nothing above error
            LogLevel::Error | LogLevel::Critical => log::LevelFilter::Error,
        }
    }

    /// Directive string for `env_logger`'s default filter.
    pub fn filter_directive(self) -> &'static str {
        match self.to_level_filter() {
            log::LevelFilter::Debug => "debug",
            log::LevelFilter::Warn => "warn",
            log::LevelFilter::Error => "error",
            _ => "info",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(format!(
                "unknown log level '{}' (expected DEBUG, INFO, WARNING, ERROR or CRITICAL)",
                other
            )),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, <LogLevel as TryFrom<String>>::Error> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Minutes between the end of one cycle and the start of the next.
    pub interval_minutes: f64,
    pub input_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: LogLevel,
    pub log_file: PathBuf,
    pub console: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(rename = "Settings", default)]
    pub settings: Settings,
    #[serde(rename = "Logging", default)]
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            input_dir: PathBuf::from("input"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_file: PathBuf::from("app.log"),
            console: true,
        }
    }
}

/// Where the running configuration came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Example(PathBuf),
    Defaults,
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
    /// Set when the settings file had to be created and writing it failed.
    /// The loaded values are still usable.
    pub persist_error: Option<ConfigError>,
}

impl Config {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Loads `path`, creating it first from `settings_example.toml` next to
    /// it or from the built-in defaults when it does not exist.
    pub fn load_or_init(path: &Path) -> Result<LoadedConfig, ConfigError> {
        if path.exists() {
            return Ok(LoadedConfig {
                config: Self::load(path)?,
                source: ConfigSource::File(path.to_path_buf()),
                persist_error: None,
            });
        }

        let example = path.with_file_name(EXAMPLE_CONFIG_NAME);
        let (config, source) = if example.is_file() {
            (Self::load(&example)?, ConfigSource::Example(example))
        } else {
            (Self::default(), ConfigSource::Defaults)
        };

        let persist_error = config.save(path).err();

        Ok(LoadedConfig {
            config,
            source,
            persist_error,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let minutes = self.settings.interval_minutes;
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(ConfigError::invalid(
                "Settings.interval_minutes",
                format!("must be a positive number of minutes, got {}", minutes),
            ));
        }
        match Duration::try_from_secs_f64(minutes * 60.0) {
            Ok(d) if !d.is_zero() => {}
            _ => {
                return Err(ConfigError::invalid(
                    "Settings.interval_minutes",
                    format!("{} minutes is out of range", minutes),
                ));
            }
        }

        if self.settings.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid(
                "Settings.input_dir",
                "must not be empty",
            ));
        }

        if self.logging.log_file.as_os_str().is_empty() {
            return Err(ConfigError::invalid("Logging.log_file", "must not be empty"));
        }

        Ok(())
    }

    /// Sleep between cycles. Falls back to the default for values that
    /// never went through `validate`.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.settings.interval_minutes * 60.0)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs(DEFAULT_INTERVAL_MINUTES as u64 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Config, ConfigError> {
        Config::parse(content, Path::new("settings.toml"))
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.interval(), Duration::from_secs(300));
        assert_eq!(config.logging.log_level, LogLevel::Info);
        assert_eq!(config.logging.log_file, PathBuf::from("app.log"));
        assert_eq!(config.settings.input_dir, PathBuf::from("input"));
        assert!(config.logging.console);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_missing_keys_fall_back() {
        let config = parse("[Settings]\ninterval_minutes = 2\n").unwrap();

        assert_eq!(config.interval(), Duration::from_secs(120));
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r#"
[Settings]
interval_minutes = 0.5
input_dir = "sounds"

[Logging]
log_level = "warning"
log_file = "logs/keep.log"
console = false
"#,
        )
        .unwrap();

        assert_eq!(config.interval(), Duration::from_secs(30));
        assert_eq!(config.settings.input_dir, PathBuf::from("sounds"));
        assert_eq!(config.logging.log_level, LogLevel::Warning);
        assert_eq!(config.logging.log_file, PathBuf::from("logs/keep.log"));
        assert!(!config.logging.console);
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        for raw in ["0", "-3", "-0.5", "1e-12", "1e300"] {
            let err = parse(&format!("[Settings]\ninterval_minutes = {}\n", raw)).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "Settings.interval_minutes", .. }));
        }
    }

    #[test]
    fn test_rejects_unknown_level() {
        let err = parse("[Logging]\nlog_level = \"LOUD\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = parse("[Settings\ninterval_minutes = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_rejects_non_numeric_interval() {
        let err = parse("[Settings]\ninterval_minutes = \"soon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_log_level_round_trips_through_file() {
        let mut config = Config::default();
        config.logging.log_level = LogLevel::Critical;

        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("log_level = \"CRITICAL\""));
        assert_eq!(parse(&text).unwrap().logging.log_level, LogLevel::Critical);
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!(LogLevel::Critical.to_level_filter(), log::LevelFilter::Error);
        assert_eq!(LogLevel::Warning.filter_directive(), "warn");
        assert_eq!(LogLevel::Info.filter_directive(), "info");
    }

    #[test]
    fn test_load_or_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let loaded = Config::load_or_init(&path).unwrap();

        assert_eq!(loaded.source, ConfigSource::Defaults);
        assert!(loaded.persist_error.is_none());
        assert_eq!(loaded.config, Config::default());
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_or_init_copies_example() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let example = dir.path().join(EXAMPLE_CONFIG_NAME);
        fs::write(&example, "[Settings]\ninterval_minutes = 1\n").unwrap();

        let loaded = Config::load_or_init(&path).unwrap();

        assert_eq!(loaded.source, ConfigSource::Example(example));
        assert_eq!(loaded.config.interval(), Duration::from_secs(60));
        assert_eq!(Config::load(&path).unwrap().interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_load_or_init_keeps_defaults_when_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("settings.toml");

        let loaded = Config::load_or_init(&path).unwrap();

        assert_eq!(loaded.config, Config::default());
        assert!(matches!(loaded.persist_error, Some(ConfigError::Write { .. })));
    }
}
