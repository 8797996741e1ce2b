//! Database migrations for the workforce API.

pub use sea_orm_migration::prelude::*;

mod columns;
mod m2025_01_01_000001_create_tenants;
mod m2025_01_01_000002_create_organizations;
mod m2025_01_01_000003_create_roles_and_permissions;
mod m2025_01_01_000004_create_users;
mod m2025_01_01_000005_create_organization_contacts_and_clients;
mod m2025_01_01_000006_create_invites;
mod m2025_01_01_000007_create_integrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_01_000001_create_tenants::Migration),
            Box::new(m2025_01_01_000002_create_organizations::Migration),
            Box::new(m2025_01_01_000003_create_roles_and_permissions::Migration),
            Box::new(m2025_01_01_000004_create_users::Migration),
            Box::new(m2025_01_01_000005_create_organization_contacts_and_clients::Migration),
            Box::new(m2025_01_01_000006_create_invites::Migration),
            Box::new(m2025_01_01_000007_create_integrations::Migration),
        ]
    }
}
