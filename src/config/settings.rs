use crate::adapters::http::{RacingApiClient, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use crate::config::toml_config::TomlConfig;
use crate::domain::model::{CredentialVars, Day, RaceQuery};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use std::time::Duration;

pub const KNOWN_REGIONS: [&str; 2] = ["gb", "ire"];

/// 合併預設值、設定檔與命令列後的最終設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub credential_vars: CredentialVars,
    pub day: Day,
    pub regions: Vec<String>,
    pub region_options: Vec<String>,
    pub auto_refresh: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let known: Vec<String> = KNOWN_REGIONS.iter().map(|r| r.to_string()).collect();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            credential_vars: CredentialVars::default(),
            day: Day::Today,
            regions: known.clone(),
            region_options: known,
            auto_refresh: true,
        }
    }
}

impl Settings {
    pub fn from_toml(config: &TomlConfig) -> Self {
        let mut settings = Self::default();

        if let Some(api) = &config.api {
            if let Some(endpoint) = &api.endpoint {
                settings.endpoint = endpoint.clone();
            }
            if let Some(timeout) = api.timeout_seconds {
                settings.timeout_seconds = timeout;
            }
            if let Some(var) = &api.username_env {
                settings.credential_vars.username = var.clone();
            }
            if let Some(var) = &api.password_env {
                settings.credential_vars.password = var.clone();
            }
        }

        if let Some(filters) = &config.filters {
            if let Some(day) = filters.day {
                settings.day = day;
            }
            if let Some(options) = &filters.region_options {
                settings.region_options = options.clone();
            }
            if let Some(regions) = &filters.regions {
                settings.regions = regions.clone();
            }
            if let Some(auto_refresh) = filters.auto_refresh {
                settings.auto_refresh = auto_refresh;
            }
        }

        settings.include_selected_regions();
        settings
    }

    /// 已選的地區一定要出現在選項裡，否則介面上無法取消
    pub fn include_selected_regions(&mut self) {
        for region in &self.regions {
            if !self.region_options.contains(region) {
                self.region_options.push(region.clone());
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn query(&self) -> RaceQuery {
        RaceQuery::new(self.day, self.regions.clone())
    }

    pub fn client(&self) -> RacingApiClient {
        RacingApiClient::new(
            self.endpoint.clone(),
            self.timeout(),
            self.credential_vars.clone(),
        )
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("api.endpoint", &self.endpoint)?;
        validate_range("api.timeout_seconds", self.timeout_seconds, 1, 300)?;
        validate_non_empty_string("api.username_env", &self.credential_vars.username)?;
        validate_non_empty_string("api.password_env", &self.credential_vars.password)?;
        for region in self.region_options.iter().chain(&self.regions) {
            validate_non_empty_string("filters.regions", region)?;
        }
        Ok(())
    }
}
