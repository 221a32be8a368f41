pub mod cli;
pub mod toml_config;

/// Input extensions the table reader understands.
pub const INPUT_EXTENSIONS: &[&str] = &["csv", "tsv", "tab", "txt", "xlsx", "xlsm", "xls", "ods"];

#[cfg(feature = "cli")]
mod args {
    use super::INPUT_EXTENSIONS;
    use crate::core::pacing::{PacingConfig, DEFAULT_DELAY_MS};
    use crate::core::resolver::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
    use crate::core::ConfigProvider;
    use crate::domain::table::{HeaderMode, OutputFormat};
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_file_extension, validate_non_empty_string, validate_path,
        validate_positive_number, validate_range, validate_url, Validate,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "token-address-finder")]
    #[command(about = "Look up token contract addresses for a table of ticker symbols")]
    pub struct CliConfig {
        /// CSV or TSV file whose first column holds tickers
        #[arg(short, long)]
        pub input: String,

        /// Service root; each ticker is requested as {base_url}/{ticker}
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        pub base_url: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        /// Whether row 1 is data or names the columns
        #[arg(long, value_enum, default_value_t = HeaderMode::None)]
        pub header: HeaderMode,

        /// Also extract networkId into a Blockchain column
        #[arg(long)]
        pub with_network: bool,

        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        pub timeout_secs: u64,

        /// Fixed pause after each request; 0 disables pacing
        #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
        pub delay_ms: u64,

        /// Use a token bucket at this rate instead of the fixed delay
        #[arg(long)]
        pub requests_per_minute: Option<u32>,

        #[arg(long, default_value_t = 1)]
        pub burst: u32,

        #[arg(long, value_enum, value_delimiter = ',', default_value = "csv")]
        pub formats: Vec<OutputFormat>,

        /// Bundle all outputs into one zip archive
        #[arg(long)]
        pub zip: bool,

        /// Result rows printed to stdout; 0 disables the preview
        #[arg(long, default_value_t = 20)]
        pub preview_rows: usize,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub log_json: bool,
    }

    impl ConfigProvider for CliConfig {
        fn input_path(&self) -> &str {
            &self.input
        }

        fn base_url(&self) -> &str {
            &self.base_url
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn header_mode(&self) -> HeaderMode {
            self.header
        }

        fn include_network(&self) -> bool {
            self.with_network
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(self.timeout_secs)
        }

        fn pacing(&self) -> PacingConfig {
            match self.requests_per_minute {
                Some(requests_per_minute) => PacingConfig::TokenBucket {
                    requests_per_minute,
                    burst: self.burst,
                },
                None if self.delay_ms == 0 => PacingConfig::None,
                None => PacingConfig::Fixed {
                    delay_ms: self.delay_ms,
                },
            }
        }

        fn output_formats(&self) -> &[OutputFormat] {
            &self.formats
        }

        fn compress(&self) -> bool {
            self.zip
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_non_empty_string("input", &self.input)?;
            validate_file_extension("input", &self.input, INPUT_EXTENSIONS)?;
            validate_url("base_url", &self.base_url)?;
            validate_path("output_path", &self.output_path)?;
            validate_range("timeout_secs", self.timeout_secs, 1, 300)?;
            if let Some(rpm) = self.requests_per_minute {
                validate_positive_number("requests_per_minute", u64::from(rpm), 1)?;
                validate_positive_number("burst", u64::from(self.burst), 1)?;
            }
            Ok(())
        }
    }

}

#[cfg(feature = "cli")]
pub use args::CliConfig;
