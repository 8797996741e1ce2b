//! Invite mail dispatch
//!
//! Services hand a rendered [`InviteEmail`] to an [`InviteMailer`]. Delivery is
//! best-effort: callers log failures and carry on.

pub mod log;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::models::enums::InvitationType;

pub use log::{LogMailer, MemoryMailer};

/// Template used to render an invite mail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTemplate {
    InviteUser,
    InviteEmployee,
}

impl MailTemplate {
    pub fn for_invitation(invitation_type: InvitationType) -> Self {
        match invitation_type {
            InvitationType::User => MailTemplate::InviteUser,
            InvitationType::Employee | InvitationType::Candidate => MailTemplate::InviteEmployee,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MailTemplate::InviteUser => "invite-user",
            MailTemplate::InviteEmployee => "invite-employee",
        }
    }
}

/// One invite mail, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteEmail {
    pub from: String,
    pub to: String,
    pub template: MailTemplate,
    pub organization_name: String,
    pub invited_by: String,
    pub accept_url: String,
    pub expire_date: DateTime<Utc>,
    /// Employment start date shown in employee invites
    pub start_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid client base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait InviteMailer: Send + Sync {
    async fn send_invite(&self, email: InviteEmail) -> Result<(), MailError>;
}

/// Link the invitee follows to accept. Carries the email and token the
/// validation endpoint expects.
pub fn accept_url(client_base_url: &str, email: &str, token: &str) -> Result<String, MailError> {
    let mut url = Url::parse(client_base_url)?.join("auth/accept-invite")?;
    url.query_pairs_mut()
        .append_pair("email", email)
        .append_pair("token", token);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_follows_invitation_type() {
        assert_eq!(
            MailTemplate::for_invitation(InvitationType::User).as_str(),
            "invite-user"
        );
        assert_eq!(
            MailTemplate::for_invitation(InvitationType::Employee).as_str(),
            "invite-employee"
        );
        assert_eq!(
            MailTemplate::for_invitation(InvitationType::Candidate).as_str(),
            "invite-employee"
        );
    }

    #[test]
    fn accept_url_encodes_query() {
        let url = accept_url("http://localhost:4200/", "a+b@acme.test", "t.o.k").unwrap();
        assert_eq!(
            url,
            "http://localhost:4200/auth/accept-invite?email=a%2Bb%40acme.test&token=t.o.k"
        );
    }

    #[test]
    fn accept_url_rejects_bad_base() {
        assert!(accept_url("not a url", "a@acme.test", "t").is_err());
    }
}
