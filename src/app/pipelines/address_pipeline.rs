use crate::core::pacing::Pacer;
use crate::core::resolver::AddressResolver;
use crate::core::{ConfigProvider, InputTable, Pipeline, ResultTable, Storage, TransformResult};
use crate::domain::model::ResolutionSummary;
use crate::domain::table::{OutputFormat, OUTPUT_STEM};
use crate::utils::error::{FinderError, Result};
use std::collections::HashSet;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Reads a ticker table, resolves the first column and writes the augmented
/// table in the configured formats.
pub struct AddressPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) preview_rows: usize,
}

impl<S: Storage, C: ConfigProvider> AddressPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            preview_rows: 0,
        }
    }

    /// Print the first `rows` result rows to stdout during load.
    pub fn with_preview(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    fn resolver(&self) -> Result<AddressResolver<Pacer>> {
        Ok(
            AddressResolver::new(self.config.base_url(), Pacer::from_config(&self.config.pacing()))?
                .with_timeout(self.config.request_timeout())
                .with_network_id(self.config.include_network()),
        )
    }

    fn encode_outputs(&self, result: &TransformResult) -> Result<Vec<(String, Vec<u8>)>> {
        let generated_at = chrono::Utc::now();
        let mut formats = self.config.output_formats().to_vec();
        if formats.is_empty() {
            formats.push(OutputFormat::Csv);
        }
        let mut seen = HashSet::new();
        formats.retain(|format| seen.insert(*format));

        formats
            .into_iter()
            .map(|format| {
                let data = result.table.encode(format, &result.summary, generated_at)?;
                Ok((format.file_name(), data))
            })
            .collect()
    }

    fn bundle_zip(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, data) in files {
            zip.start_file(name.as_str(), SimpleFileOptions::default())?;
            zip.write_all(data)?;
        }
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AddressPipeline<S, C> {
    async fn extract(&self) -> Result<InputTable> {
        let path = self.config.input_path();
        tracing::debug!("Reading input table from: {}", path);

        let data = self.storage.read_file(path).await?;
        let table = InputTable::parse(path, &data, self.config.header_mode())?;

        if table.is_empty() {
            return Err(FinderError::EmptyInput {
                path: path.to_string(),
            });
        }

        tracing::debug!(
            "Parsed {} rows, {} columns (headers: {:?})",
            table.len(),
            table.width(),
            table.headers
        );
        Ok(table)
    }

    async fn transform(&self, input: InputTable) -> Result<TransformResult> {
        let resolver = self.resolver()?;
        let tickers = input.ticker_cells();

        tracing::info!(
            "Starting lookups against {} for {} rows",
            self.config.base_url(),
            tickers.len()
        );

        let mut last_reported = 0;
        let resolutions = resolver
            .resolve_all(&tickers, |progress| {
                let percent = (progress.fraction() * 100.0) as usize;
                if percent / 10 > last_reported / 10 {
                    last_reported = percent;
                    tracing::info!(
                        "Progress: {}/{} ({}%)",
                        progress.completed,
                        progress.total,
                        percent
                    );
                }
            })
            .await;

        let summary = ResolutionSummary::from_resolutions(&resolutions);
        let table = ResultTable::assemble(&input, &resolutions, resolver.includes_network())?;

        Ok(TransformResult { table, summary })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let files = self.encode_outputs(&result)?;

        let written = if self.config.compress() {
            let name = format!("{}.zip", OUTPUT_STEM);
            tracing::debug!("Creating ZIP file with {} files", files.len());
            let zip_data = Self::bundle_zip(&files)?;

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&name, &zip_data).await?;
            name
        } else {
            for (name, data) in &files {
                tracing::debug!("Writing {} ({} bytes) to storage", name, data.len());
                self.storage.write_file(name, data).await?;
            }
            files
                .first()
                .map(|(name, _)| name.clone())
                .unwrap_or_else(|| OutputFormat::Csv.file_name())
        };

        // Results are only shown once they are safely on disk.
        if self.preview_rows > 0 {
            println!("{}", result.table.render_preview(self.preview_rows));
        }

        Ok(format!("{}/{}", self.config.output_path(), written))
    }
}
