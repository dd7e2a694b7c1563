//! Loader for TruthGuard configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are added, with `TRUTHGUARD__`
//! environment variables applied last (`TRUTHGUARD__CLIENT__BASE_URL` sets
//! `client.base_url`). String values may reference other environment
//! variables as `${VAR}`; expansion is recursive up to a fixed depth.
//!
//! Every section has defaults, so an empty configuration is valid:
//!
//! ```yaml
//! client:
//!   mode: remote            # or "simulated"
//!   base_url: http://127.0.0.1:8000/analyze
//!   timeout_secs: 30
//! simulation:
//!   text_manipulated: { min: 78, max: 93 }
//!   video_manipulated_probability: 0.4
//! limits:
//!   image_max_bytes: 10485760
//! logging:
//!   level: info
//!   format: text
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use truthguard_common::observability::LogFormat;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "TRUTHGUARD";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/analyze";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TruthGuardConfig {
    pub version: Option<String>,
    pub client: ClientSettings,
    pub simulation: SimulationSettings,
    pub limits: UploadLimits,
    pub logging: LoggingSettings,
}

/// Which analysis backend serves submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientMode {
    #[default]
    Remote,
    Simulated,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub mode: ClientMode,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Artificial delay applied by the simulated backend.
    pub simulated_latency_ms: u64,
    /// Fixed RNG seed for the simulated backend; random when unset.
    pub seed: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            mode: ClientMode::Remote,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            simulated_latency_ms: 0,
            seed: None,
        }
    }
}

/// Inclusive range on the 0–100 percentage scale.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PercentRange {
    pub min: f64,
    pub max: f64,
}

impl PercentRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let in_scale = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_scale(self.min) || !in_scale(self.max) || self.min > self.max {
            return Err(ConfigError::Message(format!(
                "simulation.{name} must satisfy 0 <= min <= max <= 100 (got {}..{})",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Parameters of the simulated analyzer. These are simulation knobs, not
/// measured facts, which is why they are configurable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub text_manipulated: PercentRange,
    pub text_authentic: PercentRange,
    pub text_suspicious: PercentRange,
    pub image_confidence: PercentRange,
    pub image_ai_manipulated: PercentRange,
    pub image_ai_authentic: PercentRange,
    pub image_manipulated_probability: f64,
    pub video_confidence: PercentRange,
    pub video_manipulated_probability: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            text_manipulated: PercentRange::new(78.0, 93.0),
            text_authentic: PercentRange::new(72.0, 90.0),
            text_suspicious: PercentRange::new(55.0, 75.0),
            image_confidence: PercentRange::new(70.0, 95.0),
            image_ai_manipulated: PercentRange::new(75.0, 95.0),
            image_ai_authentic: PercentRange::new(15.0, 30.0),
            image_manipulated_probability: 0.5,
            video_confidence: PercentRange::new(65.0, 90.0),
            video_manipulated_probability: 0.4,
        }
    }
}

impl SimulationSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, range) in [
            ("text_manipulated", &self.text_manipulated),
            ("text_authentic", &self.text_authentic),
            ("text_suspicious", &self.text_suspicious),
            ("image_confidence", &self.image_confidence),
            ("image_ai_manipulated", &self.image_ai_manipulated),
            ("image_ai_authentic", &self.image_ai_authentic),
            ("video_confidence", &self.video_confidence),
        ] {
            range.validate(name)?;
        }
        for (name, p) in [
            ("image_manipulated_probability", self.image_manipulated_probability),
            ("video_manipulated_probability", self.video_manipulated_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Message(format!(
                    "simulation.{name} must be within [0, 1] (got {p})"
                )));
            }
        }
        Ok(())
    }
}

/// Size caps for uploaded media.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    pub image_max_bytes: u64,
    pub video_max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            image_max_bytes: 10 * MIB,
            video_max_bytes: 50 * MIB,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            dir: None,
            stderr: false,
        }
    }
}

impl TruthGuardConfig {
    /// Reject settings that would produce an unusable client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client.mode == ClientMode::Remote {
            let url = url::Url::parse(&self.client.base_url).map_err(|e| {
                ConfigError::Message(format!(
                    "client.base_url {:?} is not a valid URL: {e}",
                    self.client.base_url
                ))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Message(format!(
                    "client.base_url must be http(s), got {}",
                    url.scheme()
                )));
            }
        }
        if self.client.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "client.timeout_secs must be greater than zero".into(),
            ));
        }
        self.simulation.validate()
    }
}

/// `~/.config/truthguard/truthguard.yaml` (platform equivalent), if a config dir exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("truthguard").join("truthguard.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct TruthGuardConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    use_env: bool,
}

impl Default for TruthGuardConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TruthGuardConfigLoader {
    /// Start with no files; `TRUTHGUARD__` env overrides are applied on load.
    ///
    /// ```
    /// use truthguard_config::{ClientMode, TruthGuardConfigLoader};
    ///
    /// let config = TruthGuardConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str("version: '1'\nclient:\n  mode: simulated")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.client.mode, ClientMode::Simulated);
    /// assert_eq!(config.client.timeout_secs, 30);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            use_env: true,
        }
    }

    /// Skip environment overrides (tests and doc examples).
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Attach a required YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use truthguard_config::TruthGuardConfigLoader;
    ///
    /// unsafe { std::env::set_var("TG_DOC_BACKEND", "http://analysis.internal:9000/analyze"); }
    ///
    /// let config = TruthGuardConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str(r#"
    /// client:
    ///   base_url: "${TG_DOC_BACKEND}"
    ///   timeout_secs: 5
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.client.base_url, "http://analysis.internal:9000/analyze");
    /// assert_eq!(config.client.timeout_secs, 5);
    ///
    /// unsafe { std::env::remove_var("TG_DOC_BACKEND"); }
    /// ```
    pub fn load(self) -> Result<TruthGuardConfig, ConfigError> {
        let mut builder = self.builder;
        if self.use_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        }
        let cfg = builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: TruthGuardConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("HOST", Some("analysis")), ("PORT", Some("8000"))], || {
            let mut v = json!(["http://$HOST", { "url": "${HOST}:${PORT}" }, 42, true, null]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["http://analysis", { "url": "analysis:8000" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST_TG}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST_TG}"));
    }

    #[test]
    fn defaults_match_upstream_simulation_ranges() {
        let sim = SimulationSettings::default();
        assert_eq!(sim.text_manipulated, PercentRange::new(78.0, 93.0));
        assert_eq!(sim.text_authentic, PercentRange::new(72.0, 90.0));
        assert_eq!(sim.text_suspicious, PercentRange::new(55.0, 75.0));
        assert_eq!(sim.video_manipulated_probability, 0.4);
        assert!(TruthGuardConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = TruthGuardConfigLoader::new()
            .without_env()
            .with_yaml_str("simulation:\n  text_suspicious: { min: 80, max: 60 }")
            .load()
            .expect_err("min > max");
        assert!(err.to_string().contains("text_suspicious"));
    }

    #[test]
    fn remote_mode_requires_http_url() {
        let err = TruthGuardConfigLoader::new()
            .without_env()
            .with_yaml_str("client:\n  base_url: ftp://example.com/analyze")
            .load()
            .expect_err("ftp is not http");
        assert!(err.to_string().contains("http"));

        // Simulated mode never touches the URL.
        let cfg = TruthGuardConfigLoader::new()
            .without_env()
            .with_yaml_str("client:\n  mode: simulated\n  base_url: ''")
            .load()
            .expect("simulated mode ignores base_url");
        assert_eq!(cfg.client.mode, ClientMode::Simulated);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(
            TruthGuardConfigLoader::new()
                .without_env()
                .with_yaml_str("client:\n  timeout_secs: 0")
                .load()
                .is_err()
        );
    }
}
