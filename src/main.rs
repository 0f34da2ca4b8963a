use clap::Parser;
use hazard_risk::utils::{logger, validation::Validate};
use hazard_risk::{AssessmentEngine, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting hazard-risk CLI");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    // 驗證輸入
    if let Err(e) = cli.validate() {
        tracing::error!("Input validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let engine = AssessmentEngine::from_config(&config)?;
    let assessment = engine.assess(cli.to_address()).await;
    engine.close();

    println!("{}", serde_json::to_string_pretty(&assessment)?);
    Ok(())
}
