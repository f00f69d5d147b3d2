//! Outbound HTTP clients for the gateway/LLM push contracts.
//! These remote processes are out of scope for this repo; this module
//! only implements the client side of the contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use coup_domain::DomainError;
use coup_protocol::gateway::{GatewayBroadcastPayload, LlmEventPayload};

use crate::application::ports::{GatewayPushPort, LlmPushPort};

#[derive(Clone)]
pub struct ReqwestGatewayClient {
    client: Client,
}

impl ReqwestGatewayClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

impl Default for ReqwestGatewayClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GatewayPushPort for ReqwestGatewayClient {
    async fn push_broadcast(&self, endpoint_url: &str, payload: GatewayBroadcastPayload) -> Result<(), DomainError> {
        let response = self
            .client
            .post(endpoint_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DomainError::transient(format!("gateway push failed: {e}")))?;
        if !response.status().is_success() {
            return Err(DomainError::transient(format!(
                "gateway endpoint returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct ReqwestLlmClient {
    client: Client,
}

impl ReqwestLlmClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

impl Default for ReqwestLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmPushPort for ReqwestLlmClient {
    async fn push_event(&self, reasoning_url: &str, payload: LlmEventPayload) -> Result<(), DomainError> {
        let response = self
            .client
            .post(reasoning_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DomainError::transient(format!("llm push failed: {e}")))?;
        if !response.status().is_success() {
            return Err(DomainError::transient(format!(
                "reasoning server returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
