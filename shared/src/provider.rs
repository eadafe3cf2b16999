//! Joke retrieval from the upstream joke service.

use async_trait::async_trait;
use encoding_rs::WINDOWS_1251;
use tracing::debug;

use crate::error::Result;
use crate::models::ContentCategory;

/// Query parameter naming the requested category.
const CATEGORY_PARAM: &str = "CType";

/// Fetches one raw joke text for a category.
#[async_trait]
pub trait JokeProvider: Send + Sync {
    async fn fetch_joke(&self, category: ContentCategory) -> Result<String>;
}

/// Provider backed by the public joke HTTP API.
///
/// The service answers in windows-1251 no matter what Accept header it gets,
/// so the body is decoded by hand instead of through `Response::text`.
pub struct HttpJokeProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpJokeProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl JokeProvider for HttpJokeProvider {
    async fn fetch_joke(&self, category: ContentCategory) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[(CATEGORY_PARAM, category.id())])
            .header("Accept", "application/json; charset=utf-8")
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        let text = decode_windows_1251(&bytes);
        debug!(category = %category, length = text.len(), "Fetched joke text");

        Ok(text)
    }
}

/// Decode a windows-1251 body, replacing invalid sequences.
fn decode_windows_1251(bytes: &[u8]) -> String {
    let (decoded, _, _) = WINDOWS_1251.decode(bytes);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_cyrillic_windows_1251_bytes() {
        let bytes = [0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
        assert_eq!(decode_windows_1251(&bytes), "Привет");
    }

    #[test]
    fn test_ascii_passes_through_unchanged() {
        assert_eq!(decode_windows_1251(b"{\"content\":\"ok\"}"), "{\"content\":\"ok\"}");
    }
}
