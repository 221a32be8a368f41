use clap::Parser;
use token_address_finder::core::pacing::NoDelay;
use token_address_finder::core::{ConfigProvider, Pipeline};
use token_address_finder::utils::{logger, validation::Validate};
use token_address_finder::{
    AddressPipeline, AddressResolver, EtlEngine, LocalStorage, PacingConfig, Ticker, TomlConfig,
};

#[derive(Parser)]
#[command(name = "toml-finder")]
#[command(about = "Token address lookup driven by a TOML job file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "finder.toml")]
    config: String,

    /// Override the input file from the config
    #[arg(short, long)]
    input: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be processed without making any requests
    #[arg(long)]
    dry_run: bool,
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Job: {}", config.job.name);
    if let Some(description) = &config.job.description {
        tracing::info!("   {}", description);
    }
    tracing::info!("🌐 Base URL: {}", config.base_url());
    tracing::info!(
        "📄 Input: {} (header: {:?})",
        config.input_path(),
        config.header_mode()
    );
    tracing::info!(
        "⏱️ Timeout: {:?}, pacing: {}",
        config.request_timeout(),
        describe_pacing(&config.pacing())
    );
    tracing::info!(
        "📦 Output: {} as {:?}{}",
        config.output_path(),
        config.output_formats(),
        if config.compress() { " (zipped)" } else { "" }
    );
}

fn describe_pacing(pacing: &PacingConfig) -> String {
    match pacing {
        PacingConfig::None => "none".to_string(),
        PacingConfig::Fixed { delay_ms } => format!("fixed {}ms", delay_ms),
        PacingConfig::TokenBucket {
            requests_per_minute,
            burst,
        } => format!("{} req/min (burst {})", requests_per_minute, burst),
    }
}

async fn perform_dry_run(config: &TomlConfig) -> token_address_finder::Result<()> {
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = AddressPipeline::new(storage, config.clone());
    let input = pipeline.extract().await?;

    let resolver = AddressResolver::new(config.base_url(), NoDelay)?;
    let mut invalid = 0;
    for (row, raw) in input.ticker_cells().iter().enumerate() {
        match Ticker::normalize(raw) {
            Some(ticker) => println!("{:>5}  GET {}", row + 1, resolver.lookup_url(&ticker)),
            None => {
                invalid += 1;
                println!("{:>5}  (invalid ticker, no request)", row + 1);
            }
        }
    }
    tracing::info!(
        "🔍 {} rows, {} requests would be made",
        input.len(),
        input.len() - invalid
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load the job file
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // Initialize logging
    logger::init(args.verbose, config.json_logs());
    tracing::info!("🚀 Starting toml-finder");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // Command line overrides
    if let Some(input) = args.input {
        tracing::info!("🔧 Input overridden to: {}", input);
        config.input.path = input;
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be made");
        if let Err(e) = perform_dry_run(&config).await {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.severity().exit_code());
        }
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // Create storage and pipeline
    let storage = LocalStorage::new(config.output_path().to_string());
    let preview_rows = config.preview_rows();
    let pipeline = AddressPipeline::new(storage, config).with_preview(preview_rows);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Processing complete!");
            println!("📁 Results saved to: {}", output_path);
        }
        Err(e) => {
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
            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
