//! Hubstaff integration: connect a tenant and browse the remote account.

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::crypto::CryptoKey;
use crate::error::{ServiceError, ServiceResult};
use crate::integrations::hubstaff::{
    HubstaffClient, HubstaffError, HubstaffOrganization, HubstaffProject, HubstaffTokens, PROVIDER,
};
use crate::models::enums::IntegrationEntity;
use crate::services::integration::{
    AddIntegrationInput, EntitySettingInput, IntegrationService, IntegrationTree, SettingInput,
    TiedEntityInput,
};

pub const INTEGRATION_NAME: &str = "Hubstaff";

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ConnectHubstaffInput {
    pub client_id: String,
    pub client_secret: String,
    pub code: String,
    pub redirect_uri: String,
    pub organization_id: Uuid,
}

impl From<HubstaffError> for ServiceError {
    fn from(err: HubstaffError) -> Self {
        match err {
            HubstaffError::Api { status, body } => ServiceError::Upstream {
                provider: PROVIDER.to_string(),
                status,
                body: Some(body),
            },
            other => ServiceError::Upstream {
                provider: PROVIDER.to_string(),
                status: 502,
                body: Some(other.to_string()),
            },
        }
    }
}

/// Entities synchronized by default, with the entities tied to them.
pub fn default_entity_settings() -> Vec<EntitySettingInput> {
    use IntegrationEntity::*;

    let entry = |entity, tied: &[IntegrationEntity]| EntitySettingInput {
        entity,
        sync: true,
        tied_entities: tied
            .iter()
            .map(|entity| TiedEntityInput {
                entity: *entity,
                sync: true,
            })
            .collect(),
    };

    vec![
        entry(Organization, &[]),
        entry(Client, &[]),
        entry(Project, &[Task]),
        entry(Activity, &[TimeLog, TimeSlot, Screenshot]),
        entry(Employee, &[]),
        entry(Note, &[]),
    ]
}

pub struct HubstaffService<'a> {
    integrations: IntegrationService<'a>,
    client: &'a HubstaffClient,
}

impl<'a> HubstaffService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        crypto_key: &'a CryptoKey,
        client: &'a HubstaffClient,
    ) -> Self {
        Self {
            integrations: IntegrationService::new(db, crypto_key),
            client,
        }
    }

    /// Consent URL plus the `state` value the callback must echo.
    pub fn authorize_url(&self, client_id: &str, redirect_uri: &str) -> ServiceResult<(Url, String)> {
        let state = Uuid::new_v4().simple().to_string();
        let url = self.client.authorize_url(client_id, redirect_uri, &state)?;
        Ok((url, state))
    }

    /// Exchange the authorization code and register the integration.
    #[instrument(skip(self, ctx, input), fields(user_id = %ctx.user_id()))]
    pub async fn connect(
        &self,
        ctx: &RequestContext,
        input: ConnectHubstaffInput,
    ) -> ServiceResult<IntegrationTree> {
        let tokens = self
            .client
            .exchange_code(
                &input.client_id,
                &input.client_secret,
                &input.code,
                &input.redirect_uri,
            )
            .await?;

        let mut settings = vec![
            setting("client_id", input.client_id),
            setting("client_secret", input.client_secret),
            setting("access_token", tokens.access_token),
        ];
        if let Some(refresh_token) = tokens.refresh_token {
            settings.push(setting("refresh_token", refresh_token));
        }

        let tree = self
            .integrations
            .add_integration(
                ctx,
                AddIntegrationInput {
                    name: INTEGRATION_NAME.to_string(),
                    organization_id: input.organization_id,
                    settings,
                    entity_settings: default_entity_settings(),
                },
            )
            .await?;

        info!(integration_id = %tree.integration.id, "Connected Hubstaff");
        Ok(tree)
    }

    pub async fn organizations(
        &self,
        ctx: &RequestContext,
        integration_id: Uuid,
    ) -> ServiceResult<Vec<HubstaffOrganization>> {
        let token = self.access_token(ctx, integration_id).await?;
        match self.client.list_organizations(&token).await {
            Err(HubstaffError::Api { status: 401, .. }) => {
                let token = self.refresh(ctx, integration_id).await?;
                Ok(self.client.list_organizations(&token).await?)
            }
            other => Ok(other?),
        }
    }

    pub async fn projects(
        &self,
        ctx: &RequestContext,
        integration_id: Uuid,
        organization_id: i64,
    ) -> ServiceResult<Vec<HubstaffProject>> {
        let token = self.access_token(ctx, integration_id).await?;
        match self.client.list_projects(&token, organization_id).await {
            Err(HubstaffError::Api { status: 401, .. }) => {
                let token = self.refresh(ctx, integration_id).await?;
                Ok(self.client.list_projects(&token, organization_id).await?)
            }
            other => Ok(other?),
        }
    }

    async fn access_token(&self, ctx: &RequestContext, integration_id: Uuid) -> ServiceResult<String> {
        self.integrations
            .setting_value(ctx, integration_id, "access_token")
            .await
    }

    /// Rotate the stored tokens and return the new access token.
    async fn refresh(&self, ctx: &RequestContext, integration_id: Uuid) -> ServiceResult<String> {
        warn!(%integration_id, "Hubstaff access token rejected, refreshing");

        let client_id = self
            .integrations
            .setting_value(ctx, integration_id, "client_id")
            .await?;
        let client_secret = self
            .integrations
            .setting_value(ctx, integration_id, "client_secret")
            .await?;
        let refresh_token = self
            .integrations
            .setting_value(ctx, integration_id, "refresh_token")
            .await?;

        let HubstaffTokens {
            access_token,
            refresh_token: rotated,
            ..
        } = self
            .client
            .refresh_token(&client_id, &client_secret, &refresh_token)
            .await?;

        self.integrations
            .write_setting(ctx, integration_id, "access_token", &access_token)
            .await?;
        if let Some(rotated) = rotated {
            self.integrations
                .write_setting(ctx, integration_id, "refresh_token", &rotated)
                .await?;
        }

        Ok(access_token)
    }
}

fn setting(name: &str, value: String) -> SettingInput {
    SettingInput {
        setting_name: name.to_string(),
        setting_value: value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tree_ties_tasks_to_projects() {
        let tree = default_entity_settings();
        let project = tree
            .iter()
            .find(|s| s.entity == IntegrationEntity::Project)
            .unwrap();
        assert_eq!(project.tied_entities.len(), 1);
        assert_eq!(project.tied_entities[0].entity, IntegrationEntity::Task);
        assert!(tree.iter().all(|s| s.sync));
    }

    #[test]
    fn api_errors_become_upstream_errors() {
        let err: ServiceError = HubstaffError::Api {
            status: 403,
            body: "forbidden".to_string(),
        }
        .into();
        match err {
            ServiceError::Upstream {
                provider, status, ..
            } => {
                assert_eq!(provider, "hubstaff");
                assert_eq!(status, 403);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
