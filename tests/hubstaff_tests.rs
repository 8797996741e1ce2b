//! Hubstaff connect and token refresh against a mocked Hubstaff.

#[path = "test_utils/mod.rs"]
mod test_utils;

use std::time::Duration;

use serde_json::json;
use test_utils::{onboarded_tenant, setup_test_db, test_crypto_key};
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use workforce::crypto::SEALED_PREFIX;
use workforce::error::ServiceError;
use workforce::integrations::HubstaffClient;
use workforce::models::enums::IntegrationEntity;
use workforce::repositories::IntegrationRepository;
use workforce::services::hubstaff::{ConnectHubstaffInput, HubstaffService, INTEGRATION_NAME};
use workforce::services::integration::IntegrationService;

fn client(server: &MockServer) -> HubstaffClient {
    HubstaffClient::new(server.uri(), server.uri(), Duration::from_secs(5))
        .expect("hubstaff client")
}

fn connect_input(organization_id: Uuid) -> ConnectHubstaffInput {
    ConnectHubstaffInput {
        client_id: "hs-client".to_string(),
        client_secret: "hs-secret".to_string(),
        code: "the-code".to_string(),
        redirect_uri: "https://app.workforce.test/hubstaff/callback".to_string(),
        organization_id,
    }
}

async fn mount_token_exchange(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/access_tokens"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "token_type": "bearer",
            "expires_in": 86400
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn connect_registers_a_sealed_integration_tree() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;

    let db = setup_test_db().await?;
    let key = test_crypto_key();
    let fixture = onboarded_tenant(&db, "Acme").await?;
    let ctx = fixture.owner_context(&db).await?;
    let hubstaff = client(&server);

    let tree = HubstaffService::new(&db, &key, &hubstaff)
        .connect(&ctx, connect_input(fixture.organization.id))
        .await?;

    assert_eq!(tree.integration.name, INTEGRATION_NAME);
    let names: Vec<&str> = tree.settings.iter().map(|s| s.setting_name.as_str()).collect();
    for expected in ["client_id", "client_secret", "access_token", "refresh_token"] {
        assert!(names.contains(&expected), "missing setting {expected}");
    }
    assert!(
        tree.entity_settings
            .iter()
            .any(|(setting, tied)| setting.entity == IntegrationEntity::Activity && tied.len() == 3)
    );

    let stored = IntegrationRepository::new(&db)
        .settings(tree.integration.id)
        .await?;
    for secret in ["client_secret", "access_token", "refresh_token"] {
        let row = stored
            .iter()
            .find(|s| s.setting_name == secret)
            .expect("secret stored");
        assert!(row.setting_value.starts_with(SEALED_PREFIX), "{secret} is not sealed");
    }

    let access = IntegrationService::new(&db, &key)
        .setting_value(&ctx, tree.integration.id, "access_token")
        .await?;
    assert_eq!(access, "access-1");
    Ok(())
}

#[tokio::test]
async fn rejected_code_is_an_upstream_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/access_tokens"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let db = setup_test_db().await?;
    let key = test_crypto_key();
    let fixture = onboarded_tenant(&db, "Acme").await?;
    let ctx = fixture.owner_context(&db).await?;
    let hubstaff = client(&server);

    let result = HubstaffService::new(&db, &key, &hubstaff)
        .connect(&ctx, connect_input(fixture.organization.id))
        .await;
    match result {
        Err(ServiceError::Upstream { provider, status, body }) => {
            assert_eq!(provider, "hubstaff");
            assert_eq!(status, 400);
            assert_eq!(body.as_deref(), Some("invalid_grant"));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let integrations = IntegrationService::new(&db, &key).list(&ctx).await?;
    assert!(integrations.is_empty());
    Ok(())
}

#[tokio::test]
async fn expired_access_token_is_refreshed_and_retried() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/organizations"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/access_tokens"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/organizations"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organizations": [{"id": 42, "name": "Acme on Hubstaff", "status": "active"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let db = setup_test_db().await?;
    let key = test_crypto_key();
    let fixture = onboarded_tenant(&db, "Acme").await?;
    let ctx = fixture.owner_context(&db).await?;
    let hubstaff = client(&server);
    let service = HubstaffService::new(&db, &key, &hubstaff);

    let tree = service
        .connect(&ctx, connect_input(fixture.organization.id))
        .await?;
    let organizations = service.organizations(&ctx, tree.integration.id).await?;
    assert_eq!(organizations.len(), 1);
    assert_eq!(organizations[0].id, 42);

    let integrations = IntegrationService::new(&db, &key);
    assert_eq!(
        integrations
            .setting_value(&ctx, tree.integration.id, "access_token")
            .await?,
        "access-2"
    );
    assert_eq!(
        integrations
            .setting_value(&ctx, tree.integration.id, "refresh_token")
            .await?,
        "refresh-2"
    );
    Ok(())
}

#[tokio::test]
async fn projects_use_the_stored_access_token() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_token_exchange(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/organizations/42/projects"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projects": [
                {"id": 1, "name": "Website", "status": "active"},
                {"id": 2, "name": "Mobile", "billable": false}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let db = setup_test_db().await?;
    let key = test_crypto_key();
    let fixture = onboarded_tenant(&db, "Acme").await?;
    let ctx = fixture.owner_context(&db).await?;
    let hubstaff = client(&server);
    let service = HubstaffService::new(&db, &key, &hubstaff);

    let tree = service
        .connect(&ctx, connect_input(fixture.organization.id))
        .await?;
    let projects = service.projects(&ctx, tree.integration.id, 42).await?;
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[1].billable, Some(false));
    Ok(())
}
