use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::backoff::{calculate_backoff, RetryPolicy};
use crate::types::{PublishOutcome, Report, ResolvedConfig, ScopeSummary, Version, VersionPage};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine answered with an error body.
    #[error("engine returned {status} ({kind}): {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::Decode(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

/// Typed client for the engine's admin and public API.
pub struct ConfigClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    actor: Option<String>,
    retry: RetryPolicy,
}

impl ConfigClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            actor: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Sent as `X-Actor` on mutating calls.
    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = Some(actor.to_string());
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn save_draft(
        &self,
        scope_type: &str,
        qualifier: Option<&str>,
        payload: &Value,
    ) -> Result<Version, ClientError> {
        let url = format!("{}/api/v1/scopes/{scope_type}/versions", self.base_url);
        let body = json!({ "payload": payload });
        let res = self
            .send(|| {
                self.admin(self.client.post(&url))
                    .query(&qualifier_query(qualifier))
                    .json(&body)
            })
            .await?;
        decode(res).await
    }

    pub async fn get_version(&self, id: &str) -> Result<Version, ClientError> {
        let url = format!("{}/api/v1/versions/{id}", self.base_url);
        let res = self.send(|| self.admin(self.client.get(&url))).await?;
        decode(res).await
    }

    pub async fn list_versions(
        &self,
        scope_type: &str,
        qualifier: Option<&str>,
        cursor: Option<u64>,
        limit: Option<usize>,
    ) -> Result<VersionPage, ClientError> {
        let url = format!("{}/api/v1/scopes/{scope_type}/versions", self.base_url);
        let mut query = qualifier_query(qualifier);
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        let res = self
            .send(|| self.admin(self.client.get(&url)).query(&query))
            .await?;
        decode(res).await
    }

    /// Publish a version. A validation failure is an `Ok` outcome with
    /// `success == false`.
    pub async fn publish(&self, id: &str) -> Result<PublishOutcome, ClientError> {
        let url = format!("{}/api/v1/versions/{id}/publish", self.base_url);
        let res = self.send(|| self.admin(self.client.post(&url))).await?;
        if res.status() == StatusCode::UNPROCESSABLE_ENTITY {
            return Ok(res.json().await?);
        }
        decode(res).await
    }

    pub async fn validate_version(&self, id: &str) -> Result<Report, ClientError> {
        let url = format!("{}/api/v1/versions/{id}/validate", self.base_url);
        let res = self.send(|| self.admin(self.client.post(&url))).await?;
        decode(res).await
    }

    pub async fn validate_payload(
        &self,
        scope_type: &str,
        qualifier: Option<&str>,
        payload: &Value,
    ) -> Result<Report, ClientError> {
        let url = format!("{}/api/v1/scopes/{scope_type}/validate", self.base_url);
        let body = json!({ "payload": payload });
        let res = self
            .send(|| {
                self.admin(self.client.post(&url))
                    .query(&qualifier_query(qualifier))
                    .json(&body)
            })
            .await?;
        decode(res).await
    }

    pub async fn list_scopes(&self) -> Result<Vec<ScopeSummary>, ClientError> {
        let url = format!("{}/api/v1/scopes", self.base_url);
        let res = self.send(|| self.admin(self.client.get(&url))).await?;
        decode(res).await
    }

    /// Public lookup; needs no API key.
    pub async fn resolve_current(
        &self,
        scope_type: &str,
        qualifier: Option<&str>,
    ) -> Result<ResolvedConfig, ClientError> {
        let url = format!("{}/api/v1/scopes/{scope_type}/current", self.base_url);
        let res = self
            .send(|| self.client.get(&url).query(&qualifier_query(qualifier)))
            .await?;
        decode(res).await
    }

    fn admin(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        };
        match &self.actor {
            Some(actor) => builder.header("x-actor", actor),
            None => builder,
        }
    }

    /// Send, retrying 503 responses with exponential backoff.
    async fn send<F>(&self, build: F) -> Result<Response, ClientError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let res = build().send().await?;
            if res.status() != StatusCode::SERVICE_UNAVAILABLE || attempt >= self.retry.max_attempts {
                return Ok(res);
            }
            let delay = calculate_backoff(attempt, self.retry.base_delay_ms, self.retry.max_delay_ms);
            tokio::time::sleep(delay).await;
        }
    }
}

fn qualifier_query(qualifier: Option<&str>) -> Vec<(&'static str, String)> {
    qualifier
        .map(|q| vec![("qualifier", q.to_string())])
        .unwrap_or_default()
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    let text = res.text().await?;
    if status.is_success() {
        return Ok(serde_json::from_str(&text)?);
    }
    let (kind, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.error, body.message),
        Err(_) => ("unknown".to_string(), text),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        kind,
        message,
    })
}
