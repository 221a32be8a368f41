use crate::core::pacing::PacingConfig;
use crate::domain::model::ResolutionSummary;
use crate::domain::table::{HeaderMode, InputTable, OutputFormat, ResultTable};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn base_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn header_mode(&self) -> HeaderMode;
    fn include_network(&self) -> bool;
    fn request_timeout(&self) -> Duration;
    fn pacing(&self) -> PacingConfig;
    fn output_formats(&self) -> &[OutputFormat];
    fn compress(&self) -> bool;
}

/// Output of the transform phase.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub table: ResultTable,
    pub summary: ResolutionSummary,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<InputTable>;
    async fn transform(&self, input: InputTable) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
