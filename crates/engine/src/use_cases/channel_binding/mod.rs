//! Channel Binding Registry: which Discord/Slack channel a session's
//! chat is bound to, used by gateways to route inbound messages to
//! `POST /sessions/{id}/chat`.

use std::sync::Arc;

use coup_domain::{DomainError, SessionId};

use crate::application::ports::ChannelBindingPort;

pub struct ChannelBindingUseCases {
    pub bindings: Arc<dyn ChannelBindingPort>,
}

impl ChannelBindingUseCases {
    pub fn new(bindings: Arc<dyn ChannelBindingPort>) -> Self {
        Self { bindings }
    }

    pub async fn bind_discord(&self, session_id: SessionId, channel_id: String) -> Result<(), DomainError> {
        if channel_id.trim().is_empty() {
            return Err(DomainError::precondition("channel_id must not be empty"));
        }
        self.bindings.bind_discord(session_id, &channel_id).await
    }

    pub async fn unbind_discord(&self, session_id: SessionId) -> Result<(), DomainError> {
        self.bindings.unbind_discord(session_id).await
    }

    pub async fn bind_slack(&self, session_id: SessionId, channel_id: String) -> Result<(), DomainError> {
        if channel_id.trim().is_empty() {
            return Err(DomainError::precondition("channel_id must not be empty"));
        }
        self.bindings.bind_slack(session_id, &channel_id).await
    }

    pub async fn unbind_slack(&self, session_id: SessionId) -> Result<(), DomainError> {
        self.bindings.unbind_slack(session_id).await
    }

    pub async fn list_discord_bindings(&self) -> Result<Vec<(SessionId, String)>, DomainError> {
        self.bindings.list_discord_bindings().await
    }

    pub async fn list_slack_bindings(&self) -> Result<Vec<(SessionId, String)>, DomainError> {
        self.bindings.list_slack_bindings().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockChannelBindingPort;

    #[tokio::test]
    async fn bind_discord_rejects_a_blank_channel_id() {
        let uc = ChannelBindingUseCases::new(Arc::new(MockChannelBindingPort::new()));
        let err = uc.bind_discord(SessionId::new(), "   ".to_string()).await.unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn bind_discord_delegates_a_trimmed_nonempty_id_to_the_port() {
        let session_id = SessionId::new();
        let mut bindings = MockChannelBindingPort::new();
        bindings
            .expect_bind_discord()
            .withf(move |sid, channel| *sid == session_id && channel == "general")
            .returning(|_, _| Ok(()));

        let uc = ChannelBindingUseCases::new(Arc::new(bindings));
        uc.bind_discord(session_id, "general".to_string()).await.unwrap();
    }

    #[tokio::test]
    async fn bind_slack_rejects_a_blank_channel_id() {
        let uc = ChannelBindingUseCases::new(Arc::new(MockChannelBindingPort::new()));
        let err = uc.bind_slack(SessionId::new(), "".to_string()).await.unwrap_err();
        assert!(matches!(err, DomainError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn unbind_discord_delegates_to_the_port() {
        let session_id = SessionId::new();
        let mut bindings = MockChannelBindingPort::new();
        bindings.expect_unbind_discord().with(mockall::predicate::eq(session_id)).returning(|_| Ok(()));

        let uc = ChannelBindingUseCases::new(Arc::new(bindings));
        uc.unbind_discord(session_id).await.unwrap();
    }
}
