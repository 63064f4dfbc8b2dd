use crate::domain::model::RaceQuery;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 賽事資料來源。正式環境是 HTTP API，測試時可換成假資料
#[async_trait]
pub trait RacecardSource: Send + Sync {
    async fn fetch(&self, query: &RaceQuery) -> Result<serde_json::Value>;
}
