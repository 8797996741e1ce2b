//! Organizations and their contacts and clients.

use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::ServiceResult;
use crate::models::organization::Model as OrganizationModel;
use crate::models::organization_client::Model as OrganizationClientModel;
use crate::models::organization_contact::Model as OrganizationContactModel;
use crate::models::{Organization, OrganizationClient, OrganizationContact};
use crate::permissions::PermissionsEnum;
use crate::repositories::organization::NewOrganization;
use crate::repositories::organization_contact::NewCounterparty;
use crate::repositories::{
    OrganizationContactRepository, OrganizationRepository, TenantScopedRepository,
};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateOrganizationInput {
    pub name: String,
    pub currency: Option<String>,
    pub invites_allowed: Option<bool>,
    /// Days an invite stays open; defaults to the service setting
    pub invite_expiry_period: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateCounterpartyInput {
    pub organization_id: Uuid,
    pub name: String,
    pub primary_email: Option<String>,
}

pub async fn create_organization<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
    input: CreateOrganizationInput,
) -> ServiceResult<OrganizationModel> {
    ctx.require_permission(PermissionsEnum::AllOrgEdit)?;
    let tenant_id = ctx.tenant_id()?;

    Ok(OrganizationRepository::new(db)
        .create(
            tenant_id,
            NewOrganization {
                name: input.name,
                currency: input.currency,
                invites_allowed: input.invites_allowed,
                invite_expiry_period: input.invite_expiry_period,
            },
        )
        .await?)
}

pub async fn list_organizations<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
) -> ServiceResult<Vec<OrganizationModel>> {
    ctx.require_permission(PermissionsEnum::AllOrgView)?;
    let tenant_id = ctx.tenant_id()?;
    Ok(TenantScopedRepository::<_, Organization>::new(db, tenant_id)
        .find_all()
        .await?)
}

pub async fn create_contact<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
    input: CreateCounterpartyInput,
) -> ServiceResult<OrganizationContactModel> {
    ctx.require_permission(PermissionsEnum::OrgContactEdit)?;
    let tenant_id = ctx.tenant_id()?;
    ensure_organization(db, tenant_id, input.organization_id).await?;

    Ok(OrganizationContactRepository::new(db)
        .create_contact(tenant_id, counterparty(input))
        .await?)
}

pub async fn list_contacts<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
) -> ServiceResult<Vec<OrganizationContactModel>> {
    ctx.require_permission(PermissionsEnum::OrgContactView)?;
    let tenant_id = ctx.tenant_id()?;
    Ok(TenantScopedRepository::<_, OrganizationContact>::new(db, tenant_id)
        .find_all()
        .await?)
}

pub async fn create_client<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
    input: CreateCounterpartyInput,
) -> ServiceResult<OrganizationClientModel> {
    ctx.require_permission(PermissionsEnum::OrgContactEdit)?;
    let tenant_id = ctx.tenant_id()?;
    ensure_organization(db, tenant_id, input.organization_id).await?;

    Ok(OrganizationContactRepository::new(db)
        .create_client(tenant_id, counterparty(input))
        .await?)
}

pub async fn list_clients<C: ConnectionTrait>(
    db: &C,
    ctx: &RequestContext,
) -> ServiceResult<Vec<OrganizationClientModel>> {
    ctx.require_permission(PermissionsEnum::OrgContactView)?;
    let tenant_id = ctx.tenant_id()?;
    Ok(TenantScopedRepository::<_, OrganizationClient>::new(db, tenant_id)
        .find_all()
        .await?)
}

async fn ensure_organization<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    organization_id: Uuid,
) -> ServiceResult<()> {
    TenantScopedRepository::<_, Organization>::new(db, tenant_id)
        .get(organization_id, "Organization")
        .await?;
    Ok(())
}

fn counterparty(input: CreateCounterpartyInput) -> NewCounterparty {
    NewCounterparty {
        organization_id: input.organization_id,
        name: input.name,
        primary_email: input.primary_email,
    }
}
