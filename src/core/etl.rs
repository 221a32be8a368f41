use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

/// Drives extract, transform and load in order. Any phase error aborts the
/// run before results are written.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting token address lookup");
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("Extracting tickers...");
        let input = self.pipeline.extract().await?;
        tracing::info!("Found {} rows to process from the first column", input.len());
        self.monitor.log_stats("Extract");

        // Transform
        let transform_start = Instant::now();
        let rows = input.len();
        let result = self.pipeline.transform(input).await?;
        let summary = &result.summary;
        tracing::info!(
            "Resolved {} of {} rows (invalid: {}, not found: {}, api errors: {}, processing errors: {})",
            summary.resolved,
            summary.total,
            summary.invalid_ticker,
            summary.not_found,
            summary.api_error,
            summary.processing_error
        );
        self.monitor.log_throughput(rows, transform_start.elapsed());
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("Writing results...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
