//! A2A client: fetches agent cards and sends messages to remote agents over HTTP

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tracing::debug;

use crate::protocol::{
    AGENT_CARD_PATH, AgentCard, JsonRpcRequest, JsonRpcResponse, MessageSendParams, RPC_PATH,
    methods,
};

/// A live handle able to deliver messages to one remote agent
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Send one message and wait for the JSON-RPC reply
    async fn send_message(&self, params: MessageSendParams) -> Result<JsonRpcResponse>;
}

/// Resolves agent addresses into cards and client handles
#[async_trait]
pub trait AgentConnector: Send + Sync {
    async fn fetch_card(&self, address: &str) -> Result<AgentCard>;

    fn connect(&self, address: &str) -> Arc<dyn AgentClient>;
}

/// Connector backed by a shared `reqwest::Client`
pub struct HttpConnector {
    http: reqwest::Client,
}

impl HttpConnector {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl AgentConnector for HttpConnector {
    async fn fetch_card(&self, address: &str) -> Result<AgentCard> {
        let url = format!("{}{}", address.trim_end_matches('/'), AGENT_CARD_PATH);
        debug!("Fetching agent card from {}", url);

        let resp = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("Agent card request to {} failed: HTTP {}", url, status);
        }

        resp.json::<AgentCard>()
            .await
            .with_context(|| format!("Invalid agent card at {}", url))
    }

    fn connect(&self, address: &str) -> Arc<dyn AgentClient> {
        Arc::new(A2aClient::new(self.http.clone(), address))
    }
}

/// JSON-RPC client bound to a single agent endpoint
pub struct A2aClient {
    http: reqwest::Client,
    endpoint: String,
}

impl A2aClient {
    pub fn new(http: reqwest::Client, address: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", address.trim_end_matches('/'), RPC_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AgentClient for A2aClient {
    async fn send_message(&self, params: MessageSendParams) -> Result<JsonRpcResponse> {
        let request = JsonRpcRequest::new(methods::MESSAGE_SEND, params);
        debug!("Sending A2A message {} to {}", request.id, self.endpoint);

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.endpoint))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("A2A message/send to {} failed: HTTP {} {}", self.endpoint, status, body);
        }

        resp.json::<JsonRpcResponse>()
            .await
            .with_context(|| format!("Invalid JSON-RPC reply from {}", self.endpoint))
    }
}
