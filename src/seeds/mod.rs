//! Database seeding functionality
//!
//! Brings existing tenants up to the built-in role and permission set. Safe
//! to run repeatedly.

pub mod roles;

pub use roles::bootstrap_roles;
