//! Role and permission bootstrap for existing tenants.

use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::repositories::{RolePermissionRepository, RoleRepository, TenantRepository};
use crate::services::role_permissions;

/// Counts of what a bootstrap run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub tenants: usize,
    pub roles_created: usize,
    pub permissions_created: usize,
}

/// Give every tenant its built-in roles and seed default permissions for
/// roles that have none yet. Roles that already carry permission rows are
/// left untouched so manual changes survive.
pub async fn bootstrap_roles(db: &DatabaseConnection) -> Result<BootstrapReport> {
    let txn = db.begin().await.context("Failed to open transaction")?;

    let tenants = TenantRepository::new(&txn).list_tenants().await?;
    let mut report = BootstrapReport {
        tenants: tenants.len(),
        ..BootstrapReport::default()
    };

    for tenant in &tenants {
        let mut roles = RoleRepository::new(&txn)
            .find_for_tenants(std::slice::from_ref(&tenant.id))
            .await?;

        if roles.is_empty() {
            log::info!("Creating built-in roles for tenant {}", tenant.id);
            roles = role_permissions::create_roles_for_tenant(&txn, tenant).await?;
            report.roles_created += roles.len();
        }

        for role in &roles {
            let existing = RolePermissionRepository::new(&txn)
                .find_for_role(role.id)
                .await?;
            if !existing.is_empty() {
                log::debug!("Role {} of tenant {} already seeded, skipping", role.name.as_str(), tenant.id);
                continue;
            }

            let created = role_permissions::update_roles(&txn, tenant, role).await?;
            report.permissions_created += created.len();
        }
    }

    txn.commit().await.context("Failed to commit role bootstrap")?;

    log::info!(
        "Role bootstrap finished: {} tenants, {} roles and {} permissions created",
        report.tenants,
        report.roles_created,
        report.permissions_created
    );
    Ok(report)
}
