//! Chat Fan-out: queueing inbound chat for a session and broadcasting
//! it to every registered gateway endpoint, both at the per-session
//! broadcast phase boundary and on the standing cross-session tick in
//! `run.rs`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use coup_domain::{ChatMessage, ChatMessageId, DomainError, Platform, SessionId};
use coup_protocol::gateway::{GatewayBroadcastPayload, GatewayMessage, LlmEventPayload};

use crate::application::ports::{ChatQueuePort, GatewayPushPort, LlmPushPort};

const GATEWAY_PUSH_TIMEOUT: Duration = Duration::from_secs(10);
const LLM_PUSH_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ChatFanoutUseCases {
    pub queue: Arc<dyn ChatQueuePort>,
    pub gateway: Arc<dyn GatewayPushPort>,
    pub llm: Arc<dyn LlmPushPort>,
    pub reasoning_url: Option<String>,
}

impl ChatFanoutUseCases {
    pub fn new(
        queue: Arc<dyn ChatQueuePort>,
        gateway: Arc<dyn GatewayPushPort>,
        llm: Arc<dyn LlmPushPort>,
        reasoning_url: Option<String>,
    ) -> Self {
        Self { queue, gateway, llm, reasoning_url }
    }

    /// Enqueues `message` (truncated to `MESSAGE_MAX_CHARS`) and, if a
    /// reasoning server URL is configured, best-effort pushes it there
    /// as a detached background task — the caller never waits on the
    /// LLM push and its failure never fails the enqueue.
    pub async fn queue_message(&self, mut message: ChatMessage) -> Result<ChatMessage, DomainError> {
        message.content = ChatMessage::truncate_content(&message.content);
        let saved = self.queue.enqueue(message).await?;

        if let Some(url) = self.reasoning_url.clone() {
            let llm = self.llm.clone();
            let payload = LlmEventPayload {
                event_type: "chat_message".to_string(),
                source_platform: saved.platform.to_string(),
                sender_id: saved.sender_display_name.clone(),
                sender_is_llm: saved.platform == Platform::Llm,
                game_id: saved.session_id.to_string(),
                broadcast_to_all_agents: true,
                payload: json!({ "content": saved.content }),
            };
            tokio::spawn(async move {
                let push = llm.push_event(&url, payload);
                if tokio::time::timeout(LLM_PUSH_TIMEOUT, push).await.is_err() {
                    tracing::warn!("llm push timed out");
                }
            });
        }

        Ok(saved)
    }

    /// Snapshots the queue and the registered endpoints for `session_id`,
    /// POSTs the batch to every endpoint concurrently with a 10s budget
    /// each, and clears the snapshot regardless of delivery outcome —
    /// the "clear after attempt" policy avoids unbounded queue growth
    /// when an endpoint is permanently unreachable.
    pub async fn broadcast(&self, session_id: SessionId) -> Result<(), DomainError> {
        let messages = self.queue.peek(session_id).await?;
        if messages.is_empty() {
            return Ok(());
        }
        let endpoints = self.queue.endpoints_for_session(session_id).await?;
        if endpoints.is_empty() {
            tracing::info!(session_id = %session_id, "no registered endpoints, dropping queued messages");
            let ids: Vec<ChatMessageId> = messages.iter().map(|m| m.id).collect();
            return self.queue.delete_snapshot(&ids).await;
        }

        let wire_messages: Vec<GatewayMessage> = messages
            .iter()
            .map(|m| GatewayMessage {
                id: m.id.0,
                sender: m.sender_display_name.clone(),
                platform: m.platform,
                content: m.content.clone(),
                timestamp: m.created_at,
            })
            .collect();
        let broadcast_time = Utc::now();
        let payload = GatewayBroadcastPayload {
            session_id: session_id.to_string(),
            broadcast_time,
            message_count: wire_messages.len(),
            messages: wire_messages,
        };

        let mut tasks = Vec::new();
        for endpoint in endpoints {
            let gateway = self.gateway.clone();
            let payload = payload.clone();
            tasks.push(async move {
                let push = gateway.push_broadcast(&endpoint.endpoint_url, payload);
                match tokio::time::timeout(GATEWAY_PUSH_TIMEOUT, push).await {
                    Ok(Ok(())) => Ok(endpoint.platform),
                    Ok(Err(err)) => {
                        tracing::warn!(endpoint = %endpoint.endpoint_url, error = %err, "broadcast push failed");
                        Err(())
                    }
                    Err(_) => {
                        tracing::warn!(endpoint = %endpoint.endpoint_url, "broadcast push timed out");
                        Err(())
                    }
                }
            });
        }
        let results = futures_util::future::join_all(tasks).await;
        for platform in results.into_iter().flatten() {
            self.queue.touch_last_broadcast(session_id, platform, broadcast_time).await.ok();
        }

        let ids: Vec<ChatMessageId> = messages.iter().map(|m| m.id).collect();
        self.queue.delete_snapshot(&ids).await
    }

    pub async fn register_endpoint(
        &self,
        endpoint: coup_domain::ChatBotEndpoint,
    ) -> Result<coup_domain::ChatBotEndpoint, DomainError> {
        self.queue.upsert_endpoint(endpoint).await
    }

    /// Read-only snapshot of the not-yet-broadcast queue, for the
    /// `GET .../chat/{session_id}/messages` peek endpoint.
    pub async fn peek(&self, session_id: SessionId) -> Result<Vec<ChatMessage>, DomainError> {
        self.queue.peek(session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    use crate::application::ports::{MockChatQueuePort, MockGatewayPushPort, MockLlmPushPort};

    fn message(session_id: SessionId) -> ChatMessage {
        ChatMessage {
            id: ChatMessageId(0),
            session_id,
            sender_display_name: "alice".to_string(),
            platform: Platform::Discord,
            content: "gg".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn peek_delegates_to_the_queue_port() {
        let session_id = SessionId::new();
        let mut queue = MockChatQueuePort::new();
        let msg = message(session_id);
        let msg_clone = msg.clone();
        queue.expect_peek().with(eq(session_id)).returning(move |_| Ok(vec![msg_clone.clone()]));

        let uc = ChatFanoutUseCases::new(
            Arc::new(queue),
            Arc::new(MockGatewayPushPort::new()),
            Arc::new(MockLlmPushPort::new()),
            None,
        );

        let peeked = uc.peek(session_id).await.unwrap();
        assert_eq!(peeked, vec![msg]);
    }

    #[tokio::test]
    async fn broadcast_with_no_registered_endpoints_still_clears_the_queue() {
        let session_id = SessionId::new();
        let msg = message(session_id);

        let mut queue = MockChatQueuePort::new();
        queue.expect_peek().returning(move |_| Ok(vec![message(session_id)]));
        queue.expect_endpoints_for_session().returning(|_| Ok(Vec::new()));
        let expected_id = msg.id;
        queue
            .expect_delete_snapshot()
            .withf(move |ids| ids.len() == 1 && ids[0] == expected_id)
            .returning(|_| Ok(()));

        let uc = ChatFanoutUseCases::new(
            Arc::new(queue),
            Arc::new(MockGatewayPushPort::new()),
            Arc::new(MockLlmPushPort::new()),
            None,
        );

        uc.broadcast(session_id).await.unwrap();
    }

    #[tokio::test]
    async fn broadcast_with_an_empty_queue_is_a_no_op() {
        let session_id = SessionId::new();
        let mut queue = MockChatQueuePort::new();
        queue.expect_peek().returning(|_| Ok(Vec::new()));

        let uc = ChatFanoutUseCases::new(
            Arc::new(queue),
            Arc::new(MockGatewayPushPort::new()),
            Arc::new(MockLlmPushPort::new()),
            None,
        );

        uc.broadcast(session_id).await.unwrap();
    }

    #[tokio::test]
    async fn broadcast_clears_the_queue_even_when_every_push_fails() {
        let session_id = SessionId::new();
        let endpoint = coup_domain::ChatBotEndpoint {
            session_id,
            platform: Platform::Discord,
            endpoint_url: "https://example.invalid/webhook".to_string(),
            is_active: true,
            last_broadcast_at: None,
        };

        let mut queue = MockChatQueuePort::new();
        queue.expect_peek().returning(move |_| Ok(vec![message(session_id)]));
        let endpoint_clone = endpoint.clone();
        queue.expect_endpoints_for_session().returning(move |_| Ok(vec![endpoint_clone.clone()]));
        queue.expect_delete_snapshot().returning(|_| Ok(()));
        queue.expect_touch_last_broadcast().times(0);

        let mut gateway = MockGatewayPushPort::new();
        gateway.expect_push_broadcast().returning(|_, _| Err(DomainError::transient("connection refused")));

        let uc = ChatFanoutUseCases::new(
            Arc::new(queue),
            Arc::new(gateway),
            Arc::new(MockLlmPushPort::new()),
            None,
        );

        uc.broadcast(session_id).await.unwrap();
    }

    #[tokio::test]
    async fn queue_message_truncates_oversized_content() {
        let session_id = SessionId::new();
        let mut msg = message(session_id);
        msg.content = "a".repeat(3000);

        let mut queue = MockChatQueuePort::new();
        queue.expect_enqueue().returning(|m| Ok(m));

        let uc = ChatFanoutUseCases::new(
            Arc::new(queue),
            Arc::new(MockGatewayPushPort::new()),
            Arc::new(MockLlmPushPort::new()),
            None,
        );

        let saved = uc.queue_message(msg).await.unwrap();
        assert_eq!(saved.content.chars().count(), coup_domain::chat::MESSAGE_MAX_CHARS);
    }
}
