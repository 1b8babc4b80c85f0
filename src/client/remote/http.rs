//! HTTP Remote Store
//!
//! Talks to a PostgREST-style endpoint exposing the `customers` and
//! `user_profiles` tables.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::client::config::Config;
use crate::client::remote::{RemoteResult, RemoteStore};
use crate::shared::customer::{Customer, CustomerPayload};
use crate::shared::error::RemoteError;
use crate::shared::profile::AuthorProfile;

const CUSTOMERS_PATH: &str = "/rest/v1/customers";
const PROFILES_PATH: &str = "/rest/v1/user_profiles";

/// PostgREST remote store client
#[derive(Debug, Clone)]
pub struct HttpRemote {
    config: Config,
    client: Client,
}

impl HttpRemote {
    pub fn new(config: Config) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match self.config.api_key() {
            Some(key) => request.header("apikey", key),
            None => request,
        };
        match self.config.bearer() {
            Some(bearer) => request.header("Authorization", format!("Bearer {}", bearer)),
            None => request,
        }
    }

    /// Fail on any non-2xx answer, keeping the body as the message
    async fn check(response: Response) -> RemoteResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| status.to_string());
        Err(RemoteError::rejected(status.as_u16(), error_text))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| RemoteError::decode(format!("Failed to parse response: {}", e)))
    }

    /// First row of a `return=representation` answer
    async fn single_row(response: Response) -> RemoteResult<Customer> {
        let rows: Vec<Customer> = Self::decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::rejected(404, "no row returned"))
    }
}

/// PostgREST `in.(...)` filter with every value quoted
fn in_filter(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn insert(&self, payload: &CustomerPayload) -> RemoteResult<Customer> {
        let url = self.config.api_url(CUSTOMERS_PATH);
        let response = self
            .authorize(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(payload)
            .send()
            .await?;
        Self::single_row(Self::check(response).await?).await
    }

    async fn update(&self, id: &str, payload: &CustomerPayload) -> RemoteResult<Customer> {
        let url = self.config.api_url(CUSTOMERS_PATH);
        let response = self
            .authorize(self.client.patch(&url))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(payload)
            .send()
            .await?;
        Self::single_row(Self::check(response).await?).await
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        let url = self.config.api_url(CUSTOMERS_PATH);
        let response = self
            .authorize(self.client.delete(&url))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn select_all(&self) -> RemoteResult<Vec<Customer>> {
        let url = self.config.api_url(CUSTOMERS_PATH);
        let response = self
            .authorize(self.client.get(&url))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;
        Self::decode(Self::check(response).await?).await
    }

    async fn select_profiles_by_ids(&self, ids: &[String]) -> RemoteResult<Vec<AuthorProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.config.api_url(PROFILES_PATH);
        let response = self
            .authorize(self.client.get(&url))
            .query(&[("select", "id,name".to_string()), ("id", in_filter(ids))])
            .send()
            .await?;
        Self::decode(Self::check(response).await?).await
    }
}
