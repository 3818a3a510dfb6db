//! Outbound integrations: transactional email, the AI chat backend and
//! on-disk file storage.

mod ai;
mod mailer;
mod storage;

pub use ai::{ai_client_from_config, AiClient, AiError, DisabledAiClient, OpenAiClient, PromptMessage, SYSTEM_PROMPT};
pub use mailer::{
    mailer_from_config, reset_email, verification_email, EmailMessage, HttpMailer, LogMailer,
    MailError, Mailer,
};
pub use storage::{FileStorage, StorageError, StoredFile};
