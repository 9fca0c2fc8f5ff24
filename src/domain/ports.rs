use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Anything that can POST a JSON document to a path and hand back the parsed answer.
#[async_trait]
pub trait JsonPoster: Send + Sync {
    async fn post_json(&self, path: &str, payload: &serde_json::Value)
        -> Result<serde_json::Value>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn endpoint(&self) -> &str;
    fn timeout(&self) -> Option<Duration>;
    fn headers(&self) -> Vec<(String, String)>;
}
