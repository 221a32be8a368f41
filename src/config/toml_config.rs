use crate::config::INPUT_EXTENSIONS;
use crate::core::pacing::PacingConfig;
use crate::core::resolver::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::core::ConfigProvider;
use crate::domain::table::{HeaderMode, OutputFormat};
use crate::utils::error::{FinderError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

const DEFAULT_FORMATS: &[OutputFormat] = &[OutputFormat::Csv];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    #[serde(default)]
    pub source: SourceConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub include_network: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    pub header: Option<HeaderMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Option<Vec<OutputFormat>>,
    pub compress: Option<bool>,
    pub preview_rows: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern is valid"))
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FinderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    pub fn preview_rows(&self) -> usize {
        self.load.preview_rows.unwrap_or(20)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn base_url(&self) -> &str {
        self.source.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn header_mode(&self) -> HeaderMode {
        self.input.header.unwrap_or_default()
    }

    fn include_network(&self) -> bool {
        self.source.include_network.unwrap_or(false)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    fn pacing(&self) -> PacingConfig {
        self.pacing.clone()
    }

    fn output_formats(&self) -> &[OutputFormat] {
        self.load.output_formats.as_deref().unwrap_or(DEFAULT_FORMATS)
    }

    fn compress(&self) -> bool {
        self.load.compress.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("job.name", &self.job.name)?;
        validate_url("source.base_url", self.base_url())?;
        if let Some(timeout) = self.source.timeout_seconds {
            validate_range("source.timeout_seconds", timeout, 1, 300)?;
        }

        validate_non_empty_string("input.path", &self.input.path)?;
        validate_file_extension("input.path", &self.input.path, INPUT_EXTENSIONS)?;
        validate_path("load.output_path", &self.load.output_path)?;

        if let PacingConfig::TokenBucket {
            requests_per_minute,
            burst,
        } = self.pacing
        {
            validate_positive_number("pacing.requests_per_minute", u64::from(requests_per_minute), 1)?;
            validate_positive_number("pacing.burst", u64::from(burst), 1)?;
        }

        if matches!(&self.load.output_formats, Some(formats) if formats.is_empty()) {
            return Err(FinderError::InvalidConfigValueError {
                field: "load.output_formats".to_string(),
                value: "[]".to_string(),
                reason: "At least one output format is required".to_string(),
            });
        }

        Ok(())
    }
}
