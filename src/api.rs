use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::debug;

use crate::error::{LottoError, Result};
use crate::types::{Draw, DrawSummary, SourceEnvelope};

/// Where draws come from. The listing is newest first.
pub trait DrawSource {
    fn list(&self, page: u32) -> impl Future<Output = Result<Vec<DrawSummary>>> + Send;

    fn fetch(&self, draw_id: &str) -> impl Future<Output = Result<Draw>> + Send;
}

/// JSON draw source speaking the `{status, response}` envelope.
#[derive(Debug, Clone)]
pub struct HttpDrawSource {
    client: Client,
    base_url: String,
}

impl HttpDrawSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_envelope<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "requesting draw source");

        let envelope: SourceEnvelope<T> = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        unwrap_envelope(envelope, path)
    }
}

impl DrawSource for HttpDrawSource {
    async fn list(&self, page: u32) -> Result<Vec<DrawSummary>> {
        self.get_envelope(&format!("list/{}", page)).await
    }

    async fn fetch(&self, draw_id: &str) -> Result<Draw> {
        self.get_envelope(&format!("lotto/{}", draw_id)).await
    }
}

fn unwrap_envelope<T>(envelope: SourceEnvelope<T>, what: &str) -> Result<T> {
    match envelope {
        SourceEnvelope {
            status,
            response: Some(response),
        } if status == "success" => Ok(response),
        SourceEnvelope { status, .. } => Err(LottoError::Source {
            status,
            what: what.to_string(),
        }),
    }
}
