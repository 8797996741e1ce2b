//! # Services
//!
//! Orchestration over the repositories. Every operation that acts on behalf of
//! a user takes the caller's [`crate::context::RequestContext`] explicitly.

pub mod hubstaff;
pub mod integration;
pub mod invite;
pub mod invite_accept;
pub mod organization;
pub mod role_permissions;
pub mod tenant;
pub mod users;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ServiceError, ServiceResult};

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Trim and lower-case an email address, rejecting malformed ones.
pub fn normalize_email(raw: &str) -> ServiceResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = EMAIL_RE
        .as_ref()
        .is_some_and(|re| re.is_match(&email) && email.len() <= 254);

    if valid {
        Ok(email)
    } else {
        Err(ServiceError::bad_request(format!(
            "Invalid email address: {}",
            raw.trim()
        )))
    }
}
