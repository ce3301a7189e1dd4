use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingest::InvalidRecordPolicy;
use crate::optimizer::DiscountRange;
use crate::predictor::history::HistoryPredictor;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub sweep: SweepConfig,
    pub ingest: IngestConfig,
    pub predictor: PredictorConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Copy, Debug)]
pub struct SweepConfig {
    pub low: f64,
    pub high: f64,
    pub step: f64,
}

impl SweepConfig {
    pub fn range(&self) -> Result<DiscountRange, ConfigError> {
        DiscountRange::new(self.low, self.high, self.step)
            .map_err(|error| ConfigError::Validation(error.to_string()))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct IngestConfig {
    pub on_invalid: InvalidRecordPolicy,
}

#[derive(Clone, Copy, Debug)]
pub struct PredictorConfig {
    /// Discount window half-width for the history predictor.
    pub bandwidth: f64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub sweep_low: Option<f64>,
    pub sweep_high: Option<f64>,
    pub sweep_step: Option<f64>,
    pub on_invalid: Option<InvalidRecordPolicy>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sweep: SweepConfig { low: 0.0, high: 30.0, step: 0.5 },
            ingest: IngestConfig { on_invalid: InvalidRecordPolicy::Skip },
            predictor: PredictorConfig { bandwidth: HistoryPredictor::DEFAULT_BANDWIDTH },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("lanewise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(sweep) = patch.sweep {
            if let Some(low) = sweep.low {
                self.sweep.low = low;
            }
            if let Some(high) = sweep.high {
                self.sweep.high = high;
            }
            if let Some(step) = sweep.step {
                self.sweep.step = step;
            }
        }

        if let Some(ingest) = patch.ingest {
            if let Some(on_invalid) = ingest.on_invalid {
                self.ingest.on_invalid = on_invalid;
            }
        }

        if let Some(predictor) = patch.predictor {
            if let Some(bandwidth) = predictor.bandwidth {
                self.predictor.bandwidth = bandwidth;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LANEWISE_SWEEP_LOW") {
            self.sweep.low = parse_f64("LANEWISE_SWEEP_LOW", &value)?;
        }
        if let Some(value) = read_env("LANEWISE_SWEEP_HIGH") {
            self.sweep.high = parse_f64("LANEWISE_SWEEP_HIGH", &value)?;
        }
        if let Some(value) = read_env("LANEWISE_SWEEP_STEP") {
            self.sweep.step = parse_f64("LANEWISE_SWEEP_STEP", &value)?;
        }

        if let Some(value) = read_env("LANEWISE_INGEST_ON_INVALID") {
            self.ingest.on_invalid = value.parse().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "LANEWISE_INGEST_ON_INVALID".to_string(),
                    value,
                }
            })?;
        }

        if let Some(value) = read_env("LANEWISE_PREDICTOR_BANDWIDTH") {
            self.predictor.bandwidth = parse_f64("LANEWISE_PREDICTOR_BANDWIDTH", &value)?;
        }

        let log_level =
            read_env("LANEWISE_LOGGING_LEVEL").or_else(|| read_env("LANEWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LANEWISE_LOGGING_FORMAT").or_else(|| read_env("LANEWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(low) = overrides.sweep_low {
            self.sweep.low = low;
        }
        if let Some(high) = overrides.sweep_high {
            self.sweep.high = high;
        }
        if let Some(step) = overrides.sweep_step {
            self.sweep.step = step;
        }
        if let Some(on_invalid) = overrides.on_invalid {
            self.ingest.on_invalid = on_invalid;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sweep.range().map(|_| ())?;

        if !self.predictor.bandwidth.is_finite() || self.predictor.bandwidth <= 0.0 {
            return Err(ConfigError::Validation(
                "predictor.bandwidth must be a positive number".to_string(),
            ));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Validation(
                "logging.level must be one of trace|debug|info|warn|error".to_string(),
            )),
        }
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("lanewise.toml"), PathBuf::from("config/lanewise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    sweep: Option<SweepPatch>,
    ingest: Option<IngestPatch>,
    predictor: Option<PredictorPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SweepPatch {
    low: Option<f64>,
    high: Option<f64>,
    step: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct IngestPatch {
    on_invalid: Option<InvalidRecordPolicy>,
}

#[derive(Debug, Default, Deserialize)]
struct PredictorPatch {
    bandwidth: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::ingest::InvalidRecordPolicy;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    const ALL_VARS: [&str; 8] = [
        "LANEWISE_SWEEP_LOW",
        "LANEWISE_SWEEP_HIGH",
        "LANEWISE_SWEEP_STEP",
        "LANEWISE_INGEST_ON_INVALID",
        "LANEWISE_PREDICTOR_BANDWIDTH",
        "LANEWISE_LOGGING_LEVEL",
        "LANEWISE_LOG_LEVEL",
        "LANEWISE_LOG_FORMAT",
    ];

    fn clear_vars() {
        for var in ALL_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn defaults_cover_the_standard_sweep() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();

        let config = AppConfig::load(LoadOptions::default()).expect("defaults load");
        assert_eq!(config.sweep.low, 0.0);
        assert_eq!(config.sweep.high, 30.0);
        assert_eq!(config.sweep.step, 0.5);
        assert_eq!(config.ingest.on_invalid, InvalidRecordPolicy::Skip);
        assert_eq!(config.predictor.bandwidth, 2.5);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn precedence_is_defaults_file_env_overrides() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();

        env::set_var("LANEWISE_SWEEP_HIGH", "25");

        let result = (|| {
            let dir = TempDir::new().expect("temp dir");
            let path = dir.path().join("lanewise.toml");
            fs::write(
                &path,
                r#"
[sweep]
low = 5.0
high = 20.0

[ingest]
on_invalid = "abort"

[logging]
level = "warn"
format = "json"
"#,
            )
            .expect("write config");

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .expect("config load");

            assert_eq!(config.sweep.low, 5.0, "file should override the default");
            assert_eq!(config.sweep.high, 25.0, "env should override the file");
            assert_eq!(config.logging.level, "debug", "override should win over file");
            assert_eq!(config.logging.format, LogFormat::Json);
            assert_eq!(config.ingest.on_invalid, InvalidRecordPolicy::Abort);
        })();

        clear_vars();
        result
    }

    #[test]
    fn invalid_sweep_bounds_fail_validation() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();

        env::set_var("LANEWISE_SWEEP_LOW", "40");
        env::set_var("LANEWISE_SWEEP_HIGH", "10");

        let error = AppConfig::load(LoadOptions::default()).expect_err("inverted bounds");
        clear_vars();

        assert!(
            matches!(error, ConfigError::Validation(ref message) if message.contains("exceeds")),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn unparseable_env_override_is_reported_with_key_and_value() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();

        env::set_var("LANEWISE_SWEEP_STEP", "half");

        let error = AppConfig::load(LoadOptions::default()).expect_err("bad env value");
        clear_vars();

        assert!(matches!(
            error,
            ConfigError::InvalidEnvOverride { ref key, ref value }
                if key == "LANEWISE_SWEEP_STEP" && value == "half"
        ));
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();

        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("absent.toml");

        let error = AppConfig::load(LoadOptions {
            config_path: Some(path.clone()),
            require_file: true,
            ..LoadOptions::default()
        })
        .expect_err("missing file");

        assert!(matches!(error, ConfigError::MissingConfigFile(ref missing) if *missing == path));
    }
}
