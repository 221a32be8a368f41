pub use crate::app::pipelines::address_pipeline::AddressPipeline;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pacing::PacingConfig;
    use crate::core::{ConfigProvider, Pipeline, Storage};
    use crate::domain::table::{HeaderMode, OutputFormat};
    use crate::utils::error::{FinderError, Result};
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_input(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                FinderError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_path: String,
        base_url: String,
        header_mode: HeaderMode,
        include_network: bool,
        output_formats: Vec<OutputFormat>,
        compress: bool,
    }

    impl MockConfig {
        fn new(input_path: &str, base_url: String) -> Self {
            Self {
                input_path: input_path.to_string(),
                base_url,
                header_mode: HeaderMode::None,
                include_network: false,
                output_formats: vec![OutputFormat::Csv],
                compress: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn base_url(&self) -> &str {
            &self.base_url
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn header_mode(&self) -> HeaderMode {
            self.header_mode
        }

        fn include_network(&self) -> bool {
            self.include_network
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(2)
        }

        fn pacing(&self) -> PacingConfig {
            PacingConfig::None
        }

        fn output_formats(&self) -> &[OutputFormat] {
            &self.output_formats
        }

        fn compress(&self) -> bool {
            self.compress
        }
    }

    #[tokio::test]
    async fn test_extract_reads_all_rows() {
        let storage = MockStorage::with_input("tickers.csv", b"BTC,Bitcoin\nETH,Ether\n,blank\n");
        let config = MockConfig::new("tickers.csv", "http://localhost/symbols".to_string());
        let pipeline = AddressPipeline::new(storage, config);

        let table = pipeline.extract().await.unwrap();

        assert!(table.headers.is_none());
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[2], vec!["", "blank"]);
    }

    #[tokio::test]
    async fn test_extract_tsv_with_header() {
        let storage = MockStorage::with_input("tickers.tsv", b"symbol\tname\nBTC\tBitcoin\n");
        let mut config = MockConfig::new("tickers.tsv", "http://localhost/symbols".to_string());
        config.header_mode = HeaderMode::FirstRow;
        let pipeline = AddressPipeline::new(storage, config);

        let table = pipeline.extract().await.unwrap();

        assert_eq!(table.headers, Some(vec!["symbol".to_string(), "name".to_string()]));
        assert_eq!(table.rows, vec![vec!["BTC", "Bitcoin"]]);
    }

    #[tokio::test]
    async fn test_extract_empty_input_fails() {
        let storage = MockStorage::with_input("empty.csv", b"symbol\n");
        let mut config = MockConfig::new("empty.csv", "http://localhost/symbols".to_string());
        config.header_mode = HeaderMode::FirstRow;
        let pipeline = AddressPipeline::new(storage, config);

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, FinderError::EmptyInput { .. }));
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let storage = MockStorage::with_input("other.csv", b"BTC\n");
        let config = MockConfig::new("tickers.csv", "http://localhost/symbols".to_string());
        let pipeline = AddressPipeline::new(storage, config);

        assert!(matches!(
            pipeline.extract().await,
            Err(FinderError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_transform_appends_address_and_network_columns() {
        let server = MockServer::start();
        let btc = server.mock(|when, then| {
            when.method(GET).path("/symbols/BTC");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"address": "0xabc", "networkId": "bitcoin"}));
        });
        let unknown = server.mock(|when, then| {
            when.method(GET).path("/symbols/ZZZUNKNOWN");
            then.status(404);
        });

        let storage = MockStorage::with_input("t.csv", b"BTC,1\n,2\nZZZUNKNOWN,3\n");
        let mut config = MockConfig::new("t.csv", server.url("/symbols"));
        config.include_network = true;
        let pipeline = AddressPipeline::new(storage, config);

        let input = pipeline.extract().await.unwrap();
        let result = pipeline.transform(input).await.unwrap();

        btc.assert();
        unknown.assert();
        assert_eq!(
            result.table.headers,
            vec!["Column A", "Column B", "token address", "Blockchain"]
        );
        assert_eq!(
            result.table.column("token address").unwrap(),
            vec!["0xabc", "Invalid Ticker", "Not Found"]
        );
        assert_eq!(
            result.table.column("Blockchain").unwrap(),
            vec!["bitcoin", "Invalid Ticker", "Not Found"]
        );
        assert_eq!(result.summary.resolved, 1);
        assert_eq!(result.summary.invalid_ticker, 1);
        assert_eq!(result.summary.not_found, 1);
    }

    #[tokio::test]
    async fn test_load_writes_csv_named_for_download() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/symbols/ETH");
            then.status(200).json_body(serde_json::json!({"address": "0xeth"}));
        });

        let storage = MockStorage::with_input("t.csv", b"ETH\n");
        let config = MockConfig::new("t.csv", server.url("/symbols"));
        let pipeline = AddressPipeline::new(storage.clone(), config);

        let input = pipeline.extract().await.unwrap();
        let result = pipeline.transform(input).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/token_addresses_output.csv");
        let csv = storage.get_file("token_addresses_output.csv").await.unwrap();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "Column A,token address\nETH,0xeth\n"
        );
    }

    #[tokio::test]
    async fn test_load_with_compression_bundles_all_formats() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(serde_json::json!({"address": "0x1"}));
        });

        let storage = MockStorage::with_input("t.csv", b"A\nB\n");
        let mut config = MockConfig::new("t.csv", server.url("/symbols"));
        config.output_formats = vec![OutputFormat::Csv, OutputFormat::Tsv, OutputFormat::Json];
        config.compress = true;
        let pipeline = AddressPipeline::new(storage.clone(), config);

        let input = pipeline.extract().await.unwrap();
        let result = pipeline.transform(input).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/token_addresses_output.zip");
        assert!(storage.get_file("token_addresses_output.csv").await.is_none());

        let zip_bytes = storage.get_file("token_addresses_output.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();

        assert_eq!(
            file_names,
            vec![
                "token_addresses_output.csv",
                "token_addresses_output.json",
                "token_addresses_output.tsv"
            ]
        );
    }

    #[tokio::test]
    async fn test_load_writes_each_format_separately() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(serde_json::json!({"address": "0x1"}));
        });

        let storage = MockStorage::with_input("t.csv", b"A\n");
        let mut config = MockConfig::new("t.csv", server.url("/symbols"));
        config.output_formats = vec![OutputFormat::Tsv, OutputFormat::Json];
        let pipeline = AddressPipeline::new(storage.clone(), config);

        let input = pipeline.extract().await.unwrap();
        let result = pipeline.transform(input).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/token_addresses_output.tsv");
        let tsv = storage.get_file("token_addresses_output.tsv").await.unwrap();
        assert_eq!(String::from_utf8(tsv).unwrap(), "Column A\ttoken address\nA\t0x1\n");
        assert!(storage.get_file("token_addresses_output.json").await.is_some());
    }

    #[tokio::test]
    async fn test_load_writes_repeated_formats_once() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(serde_json::json!({"address": "0x1"}));
        });

        let storage = MockStorage::with_input("t.csv", b"A\n");
        let mut config = MockConfig::new("t.csv", server.url("/symbols"));
        config.output_formats = vec![OutputFormat::Csv, OutputFormat::Json, OutputFormat::Csv];
        config.compress = true;
        let pipeline = AddressPipeline::new(storage.clone(), config);

        let input = pipeline.extract().await.unwrap();
        let result = pipeline.transform(input).await.unwrap();
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/token_addresses_output.zip");
        let zip_bytes = storage.get_file("token_addresses_output.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        let file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();

        assert_eq!(
            file_names,
            vec!["token_addresses_output.csv", "token_addresses_output.json"]
        );
    }

    struct ReadOnlyStorage(MockStorage);

    impl Storage for ReadOnlyStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.0.read_file(path).await
        }

        async fn write_file(&self, path: &str, _data: &[u8]) -> Result<()> {
            Err(FinderError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("read-only: {}", path),
            )))
        }
    }

    #[tokio::test]
    async fn test_load_surfaces_write_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(serde_json::json!({"address": "0x1"}));
        });

        let storage = ReadOnlyStorage(MockStorage::with_input("t.csv", b"A\n"));
        let config = MockConfig::new("t.csv", server.url("/symbols"));
        let pipeline = AddressPipeline::new(storage, config).with_preview(5);

        let input = pipeline.extract().await.unwrap();
        let result = pipeline.transform(input).await.unwrap();
        let err = pipeline.load(result).await.unwrap_err();

        assert!(matches!(err, FinderError::IoError(_)));
    }

    #[tokio::test]
    async fn test_blank_line_resolves_as_invalid_ticker() {
        let server = MockServer::start();
        let btc = server.mock(|when, then| {
            when.method(GET).path("/symbols/BTC");
            then.status(200).json_body(serde_json::json!({"address": "0xabc"}));
        });
        let unknown = server.mock(|when, then| {
            when.method(GET).path("/symbols/ZZZUNKNOWN");
            then.status(404);
        });

        let storage = MockStorage::with_input("t.csv", b"BTC\n\nZZZUNKNOWN\n");
        let config = MockConfig::new("t.csv", server.url("/symbols"));
        let pipeline = AddressPipeline::new(storage, config);

        let input = pipeline.extract().await.unwrap();
        assert_eq!(input.len(), 3);
        let result = pipeline.transform(input).await.unwrap();

        btc.assert_hits(1);
        unknown.assert_hits(1);
        assert_eq!(
            result.table.column("token address").unwrap(),
            vec!["0xabc", "Invalid Ticker", "Not Found"]
        );
    }

    #[tokio::test]
    async fn test_extract_reads_workbook_input() {
        let data = include_bytes!("../../tests/fixtures/tickers.xlsx");
        let storage = MockStorage::with_input("tickers.xlsx", data);
        let config = MockConfig::new("tickers.xlsx", "http://localhost/symbols".to_string());
        let pipeline = AddressPipeline::new(storage, config);

        let table = pipeline.extract().await.unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(
            table.ticker_cells(),
            vec![
                serde_json::json!("BTC"),
                serde_json::json!(""),
                serde_json::json!("ZZZUNKNOWN"),
                serde_json::json!("42")
            ]
        );
    }
}
