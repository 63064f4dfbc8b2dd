pub mod settings;
pub mod toml_config;

pub use settings::Settings;
pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::domain::model::Day;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "racecards")]
#[command(about = "Racecards for Britain & Ireland in your terminal")]
pub struct CliConfig {
    #[arg(long, value_enum, help = "Day to fetch")]
    pub day: Option<Day>,

    #[arg(long = "region", value_delimiter = ',', help = "Region codes (repeatable, e.g. gb,ire)")]
    pub regions: Vec<String>,

    #[arg(long, help = "Racecards endpoint URL")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Request timeout in seconds")]
    pub timeout_secs: Option<u64>,

    #[arg(long, help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Only fetch when the fetch key is pressed")]
    pub no_auto_refresh: bool,

    #[arg(long, help = "Fetch once, print as text and exit")]
    pub once: bool,

    #[arg(long, help = "Write logs to this file (interactive mode)")]
    pub log_file: Option<PathBuf>,

    #[arg(long, help = "Write log file entries as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 預設值 <- 設定檔 <- 命令列
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_toml(&TomlConfig::from_file(path)?),
            None => Settings::default(),
        };

        if let Some(day) = self.day {
            settings.day = day;
        }
        if !self.regions.is_empty() {
            settings.regions = self.regions.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            settings.timeout_seconds = timeout;
        }
        if self.no_auto_refresh {
            settings.auto_refresh = false;
        }

        settings.include_selected_regions();
        Ok(settings)
    }
}
