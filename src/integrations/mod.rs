//! HTTP clients for third-party time-tracking integrations.

pub mod hubstaff;

pub use hubstaff::{HubstaffClient, HubstaffError};
