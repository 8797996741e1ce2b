//! # Repository Layer
//!
//! Repositories wrap SeaORM operations for the entities. Every repository is
//! generic over [`sea_orm::ConnectionTrait`] so the same calls run against the
//! pool or inside a transaction.

pub mod crud;
pub mod integration;
pub mod invite;
pub mod organization;
pub mod organization_contact;
pub mod role;
pub mod role_permission;
pub mod tenant;
pub mod user;

pub use crud::{TenantScoped, TenantScopedRepository};
pub use integration::IntegrationRepository;
pub use invite::InviteRepository;
pub use organization::OrganizationRepository;
pub use organization_contact::OrganizationContactRepository;
pub use role::RoleRepository;
pub use role_permission::RolePermissionRepository;
pub use tenant::TenantRepository;
pub use user::UserRepository;
