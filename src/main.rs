use clap::Parser;
use racecards_dash::adapters::tui;
use racecards_dash::utils::{logger, validation::Validate};
use racecards_dash::{CliConfig, Dashboard, RacecardError};

fn exit_with(context: &str, e: &RacecardError) -> ! {
    tracing::error!("❌ {}: {}", context, e);
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // .env 只補上尚未設定的環境變數
    let _ = dotenvy::dotenv();
    let config = CliConfig::parse();

    // 初始化日誌
    if config.once {
        logger::init_cli_logger(config.verbose);
    } else if let Err(e) =
        logger::init_tui_logger(config.verbose, config.log_file.as_deref(), config.log_json)
    {
        exit_with("Logger initialization failed", &e);
    }

    tracing::info!("Starting racecards");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = match config.settings().and_then(|settings| {
        settings.validate()?;
        Ok(settings)
    }) {
        Ok(settings) => settings,
        Err(e) => exit_with("Configuration validation failed", &e),
    };

    let dashboard = Dashboard::new(settings.client());

    if config.once {
        let panel = dashboard.refresh(&settings.query()).await;
        if panel.is_ready() {
            print!("{}", panel.to_text());
        } else {
            eprint!("{}", panel.to_text());
            std::process::exit(panel.exit_code());
        }
    } else {
        if let Err(e) = tui::run(&dashboard, &settings).await {
            exit_with("Dashboard terminated", &e);
        }
        tracing::info!("Racecards closed");
    }
}
