use crate::core::render::{self, pretty_json};
use crate::domain::model::{RaceQuery, RacecardsView};
use crate::domain::ports::RacecardSource;
use crate::utils::error::{ErrorCategory, RacecardError};
use chrono::{DateTime, Local};
use serde_json::Value;

pub const BUSY_MESSAGE: &str = "Fetching racecards...";
pub const SUCCESS_MESSAGE: &str = "Fetched successfully";

/// 錯誤回應的內容，能解析成 JSON 就以 JSON 呈現
#[derive(Debug, Clone, PartialEq)]
pub enum BodyDump {
    Json(Value),
    Text(String),
}

impl BodyDump {
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(value) => BodyDump::Json(value),
            Err(_) => BodyDump::Text(body.to_string()),
        }
    }

    pub fn to_display(&self) -> String {
        match self {
            BodyDump::Json(value) => pretty_json(value),
            BodyDump::Text(text) => text.clone(),
        }
    }
}

/// 結果區塊目前的狀態
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Idle,
    Busy,
    Ready {
        view: RacecardsView,
        fetched_at: DateTime<Local>,
    },
    Warning(String),
    HttpFailure { message: String, body: BodyDump },
    NetworkFailure(String),
    Failure(String),
}

impl Panel {
    /// 將錯誤分類成對應的畫面；這條路徑不會產生 view
    pub fn from_error(err: &RacecardError) -> Self {
        match err.category() {
            ErrorCategory::Configuration => Panel::Warning(err.user_friendly_message()),
            ErrorCategory::Http => {
                let body = match err {
                    RacecardError::HttpStatus { body, .. } => BodyDump::from_body(body),
                    _ => BodyDump::Text(String::new()),
                };
                Panel::HttpFailure {
                    message: err.user_friendly_message(),
                    body,
                }
            }
            ErrorCategory::Network => Panel::NetworkFailure(err.user_friendly_message()),
            ErrorCategory::Unexpected => Panel::Failure(err.user_friendly_message()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Panel::Ready { .. })
    }

    /// 與 RacecardError::exit_code 相同的對應
    pub fn exit_code(&self) -> i32 {
        match self {
            Panel::Idle | Panel::Busy | Panel::Ready { .. } => 0,
            Panel::Warning(_) => 2,
            Panel::HttpFailure { .. } => 3,
            Panel::NetworkFailure(_) => 4,
            Panel::Failure(_) => 1,
        }
    }

    /// 單次模式的文字輸出
    pub fn to_text(&self) -> String {
        match self {
            Panel::Idle => "Press fetch to load racecards.\n".to_string(),
            Panel::Busy => format!("{}\n", BUSY_MESSAGE),
            Panel::Ready { view, .. } => {
                format!("{}\n\n{}", SUCCESS_MESSAGE, render::render_text(view))
            }
            Panel::Warning(message) => format!("warning: {}\n", message),
            Panel::HttpFailure { message, body } => {
                format!("error: {}\n{}\n", message, body.to_display())
            }
            Panel::NetworkFailure(message) | Panel::Failure(message) => {
                format!("error: {}\n", message)
            }
        }
    }
}

/// 抓取與呈現的協調者：一次觸發只發一個請求，完成後才回到介面
pub struct Dashboard<S: RacecardSource> {
    source: S,
}

impl<S: RacecardSource> Dashboard<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn refresh(&self, query: &RaceQuery) -> Panel {
        tracing::info!(
            "🏇 Fetching racecards for {} ({})",
            query.day,
            query.regions.join(",")
        );

        match self.source.fetch(query).await {
            Ok(value) => {
                let view = RacecardsView::from_json(&value);
                if let RacecardsView::Cards(meetings) = &view {
                    tracing::info!("✅ Received {} meetings", meetings.len());
                } else {
                    tracing::info!("✅ Response did not contain racecards, showing raw view");
                }
                Panel::Ready {
                    view,
                    fetched_at: Local::now(),
                }
            }
            Err(e) => {
                tracing::error!(
                    "❌ Fetch failed: {} (Category: {:?})",
                    e,
                    e.category()
                );
                tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                Panel::from_error(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Day;
    use crate::utils::error::Result;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct MockSource {
        response: Mutex<Option<Result<Value>>>,
        seen: Mutex<Vec<RaceQuery>>,
    }

    impl MockSource {
        fn new(response: Result<Value>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RacecardSource for MockSource {
        async fn fetch(&self, query: &RaceQuery) -> Result<Value> {
            self.seen.lock().unwrap().push(query.clone());
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("fetch called more than once")
        }
    }

    fn query() -> RaceQuery {
        RaceQuery::new(Day::Today, vec!["gb".to_string(), "ire".to_string()])
    }

    #[tokio::test]
    async fn test_refresh_success_builds_cards() {
        let source = MockSource::new(Ok(json!({"racecards": [{"course": "Ascot"}]})));
        let dashboard = Dashboard::new(source);

        let panel = dashboard.refresh(&query()).await;
        match panel {
            Panel::Ready { view: RacecardsView::Cards(meetings), .. } => {
                assert_eq!(meetings.len(), 1);
                assert_eq!(meetings[0].course.as_deref(), Some("Ascot"));
            }
            other => panic!("unexpected panel: {:?}", other),
        }
        assert_eq!(dashboard.source.seen.lock().unwrap().as_slice(), &[query()]);
    }

    #[tokio::test]
    async fn test_refresh_missing_credentials_is_warning() {
        let source = MockSource::new(Err(RacecardError::MissingCredentials {
            username_var: "RACING_API_USERNAME".to_string(),
            password_var: "RACING_API_PASSWORD".to_string(),
        }));
        let panel = Dashboard::new(source).refresh(&query()).await;
        assert!(matches!(panel, Panel::Warning(ref m) if m.contains("RACING_API_PASSWORD")));
    }

    #[tokio::test]
    async fn test_refresh_http_error_dumps_json_body() {
        let source = MockSource::new(Err(RacecardError::HttpStatus {
            status: 401,
            body: r#"{"detail":"Invalid credentials"}"#.to_string(),
        }));
        let panel = Dashboard::new(source).refresh(&query()).await;
        assert!(!panel.is_ready());
        assert_eq!(panel.exit_code(), 3);
        assert_eq!(
            panel,
            Panel::HttpFailure {
                message: "HTTP error: 401".to_string(),
                body: BodyDump::Json(json!({"detail": "Invalid credentials"})),
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_decode_error_is_generic_failure() {
        let decode = serde_json::from_str::<Value>("<html>").unwrap_err();
        let source = MockSource::new(Err(RacecardError::Decode(decode)));
        let panel = Dashboard::new(source).refresh(&query()).await;
        assert!(matches!(panel, Panel::Failure(ref m) if m.starts_with("Unexpected error:")));
    }

    #[test]
    fn test_body_dump_falls_back_to_text() {
        assert_eq!(
            BodyDump::from_body("Bad Gateway"),
            BodyDump::Text("Bad Gateway".to_string())
        );
        assert_eq!(BodyDump::from_body("").to_display(), "");
    }

    #[test]
    fn test_panel_text_for_http_failure() {
        let panel = Panel::HttpFailure {
            message: "HTTP error: 500".to_string(),
            body: BodyDump::Text("boom".to_string()),
        };
        assert_eq!(panel.to_text(), "error: HTTP error: 500\nboom\n");
    }

    #[test]
    fn test_panel_text_for_ready_view() {
        let panel = Panel::Ready {
            view: RacecardsView::from_json(&Value::Null),
            fetched_at: Local::now(),
        };
        assert_eq!(
            panel.to_text(),
            "Fetched successfully\n\nNo results returned.\n"
        );
    }
}
