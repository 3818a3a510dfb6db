//! AI study assistant
//!
//! Each question is sent with the system prompt and the user's most recent
//! turns. Both the question and the answer are stored once the endpoint
//! has replied, so a failed call leaves the history untouched.

use edu_core::entities::{ChatMessage, ChatRole};
use edu_core::Snowflake;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{ChatMessageResponse, ChatReplyResponse, ChatRequest, MessageResponse};
use crate::integrations::{PromptMessage, SYSTEM_PROMPT};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const HISTORY_PAGE: i64 = 100;

pub struct ChatService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChatService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request))]
    pub async fn send(&self, user_id: Snowflake, request: ChatRequest) -> ServiceResult<ChatReplyResponse> {
        request.validate()?;
        let question = request.message.trim().to_string();
        if question.is_empty() {
            return Err(ServiceError::validation("Message cannot be blank"));
        }

        let history = self
            .ctx
            .chat_repo()
            .recent(user_id, self.ctx.settings().chat_history_window)
            .await?;

        let mut prompt = Vec::with_capacity(history.len() + 2);
        prompt.push(PromptMessage::new("system", SYSTEM_PROMPT));
        prompt.extend(
            history
                .iter()
                .map(|m| PromptMessage::new(m.role.as_str(), m.content.clone())),
        );
        prompt.push(PromptMessage::new("user", question.clone()));

        let reply = self.ctx.ai_client().complete(&prompt).await.map_err(|e| {
            warn!(user_id = %user_id, error = %e, "AI completion failed");
            ServiceError::external(e.to_string())
        })?;

        let asked = ChatMessage::new(self.ctx.generate_id(), user_id, ChatRole::User, question);
        self.ctx.chat_repo().create(&asked).await?;
        let answered = ChatMessage::new(self.ctx.generate_id(), user_id, ChatRole::Assistant, reply.clone());
        self.ctx.chat_repo().create(&answered).await?;

        info!(user_id = %user_id, history = history.len(), "AI chat answered");
        Ok(ChatReplyResponse {
            reply,
            message: ChatMessageResponse::from(answered),
        })
    }

    /// Oldest first
    #[instrument(skip(self))]
    pub async fn history(&self, user_id: Snowflake) -> ServiceResult<Vec<ChatMessageResponse>> {
        let messages = self.ctx.chat_repo().recent(user_id, HISTORY_PAGE).await?;
        Ok(messages.into_iter().map(ChatMessageResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: Snowflake) -> ServiceResult<MessageResponse> {
        let removed = self.ctx.chat_repo().clear(user_id).await?;

        info!(user_id = %user_id, removed, "Chat history cleared");
        Ok(MessageResponse::new(format!("Removed {removed} messages")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::TestHarness;
    use crate::services::ServiceSettings;

    fn ask(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_history_window_bounds_the_prompt() {
        let h = TestHarness::with_settings(ServiceSettings {
            chat_history_window: 2,
            ..ServiceSettings::default()
        });
        let asha = h.verified_user("Asha", "asha@college.edu").await;
        let chat = ChatService::new(&h.ctx);

        let first = chat.send(asha, ask("What is normalization?")).await.unwrap();
        assert_eq!(first.reply, "received 2 messages");
        assert_eq!(first.message.role, "assistant");

        chat.send(asha, ask("And BCNF?")).await.unwrap();
        let third = chat.send(asha, ask("  Give an example  ")).await.unwrap();
        assert_eq!(third.reply, "received 4 messages");

        let prompts = h.ai.prompts.lock().clone();
        let last = &prompts[2];
        assert_eq!(last[0].role, "system");
        assert_eq!(last[1].content, "And BCNF?");
        assert_eq!(last[3].content, "Give an example");

        let history = chat.history(asha).await.unwrap();
        assert_eq!(history.len(), 6);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[0].content, "What is normalization?");
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let h = TestHarness::new();
        let asha = h.verified_user("Asha", "asha@college.edu").await;

        let err = ChatService::new(&h.ctx).send(asha, ask("   ")).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(h.ai.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_clear_is_per_user() {
        let h = TestHarness::new();
        let asha = h.verified_user("Asha", "asha@college.edu").await;
        let ravi = h.verified_user("Ravi", "ravi@college.edu").await;
        let chat = ChatService::new(&h.ctx);

        chat.send(asha, ask("Explain paging")).await.unwrap();
        chat.send(ravi, ask("Explain segmentation")).await.unwrap();

        let cleared = chat.clear(asha).await.unwrap();
        assert_eq!(cleared.message, "Removed 2 messages");
        assert!(chat.history(asha).await.unwrap().is_empty());
        assert_eq!(chat.history(ravi).await.unwrap().len(), 2);
    }
}
