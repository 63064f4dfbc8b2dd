use crate::domain::model::{CredentialVars, Credentials, RaceQuery};
use crate::domain::ports::RacecardSource;
use crate::utils::error::{RacecardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.theracingapi.com/v1/racecards/free";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// 從環境變數讀取帳密，任何一個缺少或為空都是設定錯誤
pub fn load_credentials(vars: &CredentialVars) -> Result<Credentials> {
    credentials_from_lookup(vars, |name| std::env::var(name).ok())
}

pub fn credentials_from_lookup<F>(vars: &CredentialVars, lookup: F) -> Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let username = lookup(&vars.username).filter(|v| !v.is_empty());
    let password = lookup(&vars.password).filter(|v| !v.is_empty());

    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials { username, password }),
        _ => Err(RacecardError::MissingCredentials {
            username_var: vars.username.clone(),
            password_var: vars.password.clone(),
        }),
    }
}

/// The Racing API racecards client. One GET per call, no retries.
#[derive(Debug, Clone)]
pub struct RacingApiClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
    credential_vars: CredentialVars,
}

impl RacingApiClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, credential_vars: CredentialVars) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout,
            credential_vars,
        }
    }
}

#[async_trait]
impl RacecardSource for RacingApiClient {
    async fn fetch(&self, query: &RaceQuery) -> Result<Value> {
        // 帳密在每次請求時才讀取，缺少時不發出任何網路請求
        let credentials = load_credentials(&self.credential_vars)?;

        tracing::debug!(
            "Making API request to: {} (day={}, regions={:?})",
            self.endpoint,
            query.day,
            query.regions
        );

        let response = self
            .client
            .get(&self.endpoint)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .query(&query.params())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        // 先判斷狀態碼；錯誤回應的內容只是盡量讀取，讀不到就留空
        if !status.is_success() {
            tracing::warn!("Racecards request rejected with status {}", status);
            let body = response.text().await.unwrap_or_default();
            return Err(RacecardError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_credentials_present() {
        let vars = CredentialVars::default();
        let creds = credentials_from_lookup(
            &vars,
            lookup_from(&[("RACING_API_USERNAME", "racer"), ("RACING_API_PASSWORD", "s3cret")]),
        )
        .unwrap();
        assert_eq!(creds.username, "racer");
        assert_eq!(creds.password, "s3cret");
    }

    #[test]
    fn test_missing_password_is_config_error() {
        let vars = CredentialVars::default();
        let err = credentials_from_lookup(&vars, lookup_from(&[("RACING_API_USERNAME", "racer")]))
            .unwrap_err();
        assert!(matches!(err, RacecardError::MissingCredentials { .. }));
    }

    #[test]
    fn test_empty_username_is_config_error() {
        let vars = CredentialVars::default();
        let err = credentials_from_lookup(
            &vars,
            lookup_from(&[("RACING_API_USERNAME", ""), ("RACING_API_PASSWORD", "s3cret")]),
        )
        .unwrap_err();
        assert!(matches!(err, RacecardError::MissingCredentials { .. }));
    }

    #[test]
    fn test_custom_variable_names() {
        let vars = CredentialVars {
            username: "MY_USER".to_string(),
            password: "MY_PASS".to_string(),
        };
        let creds =
            credentials_from_lookup(&vars, lookup_from(&[("MY_USER", "u"), ("MY_PASS", "p")]))
                .unwrap();
        assert_eq!(creds.username, "u");
    }

    #[test]
    fn test_fetch_without_credentials_never_sends() {
        let client = RacingApiClient::new(
            // 無法連線的位址：若真的送出請求會得到 Network 錯誤
            "http://127.0.0.1:9/racecards",
            Duration::from_secs(1),
            CredentialVars {
                username: "RACECARDS_UNIT_UNSET_USER".to_string(),
                password: "RACECARDS_UNIT_UNSET_PASS".to_string(),
            },
        );
        let query = RaceQuery::new(crate::domain::model::Day::Today, vec!["gb".to_string()]);
        let err = tokio_test::block_on(client.fetch(&query)).unwrap_err();
        assert!(matches!(err, RacecardError::MissingCredentials { .. }));
    }
}
