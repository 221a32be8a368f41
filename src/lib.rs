pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};

pub use crate::core::{
    etl::EtlEngine,
    pacing::{Pacer, PacingConfig, PacingPolicy},
    pipeline::AddressPipeline,
    resolver::{resolve, AddressResolver},
};
pub use crate::domain::model::{Progress, Resolution, ResolutionSummary, Sentinel, Ticker};
pub use crate::domain::table::{HeaderMode, InputTable, OutputFormat, ResultTable};
pub use crate::utils::error::{FinderError, Result};
