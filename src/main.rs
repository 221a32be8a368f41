use clap::Parser;
use token_address_finder::utils::{logger, validation::Validate};
use token_address_finder::{AddressPipeline, CliConfig, EtlEngine, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // Initialize logging
    logger::init(config.verbose, config.log_json);

    tracing::info!("Starting token-address-finder");
    tracing::debug!("CLI config: {:?}", config);

    // Validate configuration
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // Create storage and pipeline
    let storage = LocalStorage::new(config.output_path.clone());
    let preview_rows = config.preview_rows;
    let pipeline = AddressPipeline::new(storage, config).with_preview(preview_rows);
    // Create the engine and run
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Processing complete!");
            println!("📁 Results saved to: {}", output_path);
        }
        Err(e) => {
            // Detailed error for the logs
            tracing::error!(
                "❌ Lookup failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // User-facing message
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            // Exit code follows severity
            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
