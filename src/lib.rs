//! # Workforce API Library
//!
//! Multi-tenant workforce service: tenant onboarding, role and permission
//! bootstrap, organization invites and the per-tenant integration tree.

pub mod auth;
pub mod config;
pub mod context;
pub mod crypto;
pub mod db;
pub mod error;
pub mod handlers;
pub mod integrations;
pub mod mail;
pub mod models;
pub mod permissions;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod services;
pub mod telemetry;
pub use migration;
