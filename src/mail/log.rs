//! Mailers that do not talk to an SMTP relay.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{InviteEmail, InviteMailer, MailError};

/// Writes every invite to the log instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl InviteMailer for LogMailer {
    async fn send_invite(&self, email: InviteEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            template = email.template.as_str(),
            organization = %email.organization_name,
            expire_date = %email.expire_date,
            "Invite mail queued"
        );
        Ok(())
    }
}

/// Keeps sent invites in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<InviteEmail>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<InviteEmail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InviteMailer for MemoryMailer {
    async fn send_invite(&self, email: InviteEmail) -> Result<(), MailError> {
        self.sent
            .lock()
            .map_err(|_| MailError::Delivery("mailbox lock poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}
