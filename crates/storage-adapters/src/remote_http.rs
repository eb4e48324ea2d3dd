//! # HTTP Remote Store
//!
//! `RemoteStore` implementation over the uniform JSON-over-HTTP backend
//! contract. One configured base URL, one request per operation, no retries;
//! retry decisions belong to the caller. Carries an explicit request timeout
//! so a hung backend degrades into a `Transport` failure instead of a stuck
//! operation.

use std::time::Duration;

use async_trait::async_trait;
use domains::error::{DataError, Result};
use domains::models::{Post, PostPatch, Settings, Snapshot};
use domains::traits::RemoteStore;
use serde::Deserialize;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Structured error body the backend answers with on rejection.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a non-success response into `Status`, pulling the message out
    /// of the structured `{error}` body when the backend sent one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.text().await {
            Ok(body) => match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) => parsed.error,
                Err(_) => format!("request failed ({})", status.as_u16()),
            },
            Err(_) => format!("request failed ({})", status.as_u16()),
        };

        Err(DataError::Status { code: status.as_u16(), message })
    }

    /// Decodes a success body, keeping decode failures in the `Serde` arm of
    /// the taxonomy rather than lumping them in with transport errors.
    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let body = response.text().await.map_err(transport)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// 404 on a post point operation is a definitive answer, not a backend
    /// fault: remap it so callers can distinguish the two.
    fn post_not_found(err: DataError, id: &str) -> DataError {
        match err {
            DataError::Status { code: 404, .. } => DataError::NotFound("post".into(), id.into()),
            other => other,
        }
    }
}

fn transport(err: reqwest::Error) -> DataError {
    DataError::Transport(err.to_string())
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_all(&self) -> Result<Snapshot> {
        let response = self.client.get(self.url("/data")).send().await.map_err(transport)?;
        Self::decode(Self::check(response).await?).await
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let response = self.client.get(self.url("/posts")).send().await.map_err(transport)?;
        Self::decode(Self::check(response).await?).await
    }

    async fn get_post(&self, id: &str) -> Result<Post> {
        let response = self
            .client
            .get(self.url(&format!("/posts/{id}")))
            .send()
            .await
            .map_err(transport)?;
        Self::decode(Self::check(response).await.map_err(|e| Self::post_not_found(e, id))?).await
    }

    async fn create_post(&self, post: &Post) -> Result<Post> {
        let response = self
            .client
            .post(self.url("/posts"))
            .json(post)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(Self::check(response).await?).await
    }

    async fn update_post(&self, id: &str, patch: &PostPatch) -> Result<Post> {
        let response = self
            .client
            .put(self.url(&format!("/posts/{id}")))
            .json(patch)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(Self::check(response).await.map_err(|e| Self::post_not_found(e, id))?).await
    }

    async fn delete_post(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/posts/{id}")))
            .send()
            .await
            .map_err(transport)?;
        // Success bodies vary across backends ({success:true} or 204/empty);
        // the acknowledgement is the status code.
        Self::check(response).await.map_err(|e| Self::post_not_found(e, id))?;
        Ok(())
    }

    async fn fetch_settings(&self) -> Result<Settings> {
        let response = self.client.get(self.url("/settings")).send().await.map_err(transport)?;
        Self::decode(Self::check(response).await?).await
    }

    async fn put_settings(&self, settings: &Settings) -> Result<Settings> {
        let response = self
            .client
            .put(self.url("/settings"))
            .json(settings)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(Self::check(response).await?).await
    }

    async fn reset(&self) -> Result<()> {
        let response = self.client.post(self.url("/reset")).send().await.map_err(transport)?;
        Self::check(response).await?;
        Ok(())
    }
}
