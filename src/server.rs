//! # Server Configuration
//!
//! Router assembly, shared state and the OpenAPI document for the workforce API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::config::AppConfig;
use crate::crypto::CryptoKey;
use crate::handlers;
use crate::integrations::HubstaffClient;
use crate::mail::InviteMailer;
use crate::mail::log::LogMailer;
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub crypto_key: Arc<CryptoKey>,
    pub mailer: Arc<dyn InviteMailer>,
    pub hubstaff: HubstaffClient,
}

impl AppState {
    /// Build the state the binary runs with: log-only mail delivery and a
    /// Hubstaff client pointed at the configured endpoints.
    pub fn from_config(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        let key_bytes = config
            .crypto_key
            .clone()
            .context("WORKFORCE_CRYPTO_KEY is required")?;
        let crypto_key = CryptoKey::new(key_bytes).context("Invalid crypto key")?;
        let hubstaff = HubstaffClient::from_config(&config).context("Invalid Hubstaff endpoints")?;

        Ok(Self {
            config: Arc::new(config),
            db,
            crypto_key: Arc::new(crypto_key),
            mailer: Arc::new(LogMailer),
            hubstaff,
        })
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/invite/validate", get(handlers::invites::validate_invite))
        .route(
            "/api/invite/contact/accept",
            post(handlers::invites::accept_contact_invite),
        )
        .route(
            "/api/invite/client/accept",
            post(handlers::invites::accept_client_invite),
        );

    let protected = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/tenant",
            post(handlers::tenants::create_tenant).get(handlers::tenants::get_tenant),
        )
        .route("/api/roles", get(handlers::roles::list_roles))
        .route(
            "/api/roles/{id}/permissions",
            get(handlers::roles::role_permissions),
        )
        .route(
            "/api/role-permissions",
            get(handlers::roles::list_role_permissions),
        )
        .route(
            "/api/role-permissions/{id}",
            put(handlers::roles::update_role_permission),
        )
        .route(
            "/api/organization",
            post(handlers::organizations::create_organization)
                .get(handlers::organizations::list_organizations),
        )
        .route(
            "/api/organization-contact",
            post(handlers::organizations::create_contact)
                .get(handlers::organizations::list_contacts),
        )
        .route(
            "/api/organization-contact/{id}/invite",
            post(handlers::organizations::invite_contact),
        )
        .route(
            "/api/organization-clients",
            post(handlers::organizations::create_client)
                .get(handlers::organizations::list_clients),
        )
        .route(
            "/api/organization-clients/{id}/invite",
            post(handlers::organizations::invite_client),
        )
        .route("/api/invite", get(handlers::invites::list_invites))
        .route("/api/invite/emails", post(handlers::invites::create_invites))
        .route("/api/invite/{id}", delete(handlers::invites::delete_invite))
        .route(
            "/api/integration-tenant",
            post(handlers::integrations::add_integration)
                .get(handlers::integrations::list_integrations),
        )
        .route(
            "/api/integration-tenant/{id}",
            get(handlers::integrations::get_integration)
                .delete(handlers::integrations::delete_integration),
        )
        .route(
            "/api/integration-tenant/{id}/settings",
            get(handlers::integrations::list_settings)
                .put(handlers::integrations::upsert_setting),
        )
        .route(
            "/api/integration-tenant/{id}/entity-settings",
            get(handlers::integrations::list_entity_settings)
                .put(handlers::integrations::update_entity_settings),
        )
        .route(
            "/api/integrations/hubstaff/authorize-url",
            get(handlers::hubstaff::authorize_url),
        )
        .route(
            "/api/integrations/hubstaff/token",
            post(handlers::hubstaff::connect),
        )
        .route(
            "/api/integrations/hubstaff/{integration_id}/organizations",
            get(handlers::hubstaff::organizations),
        )
        .route(
            "/api/integrations/hubstaff/{integration_id}/organizations/{organization_id}/projects",
            get(handlers::hubstaff::projects),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.config),
            auth_middleware,
        ));

    public
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config.bind_addr().context("Invalid server address")?;
    let profile = config.profile.clone();
    let app = create_app(AppState::from_config(config, db)?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "Server listening");

    serve(listener, app, shutdown_signal()).await
}

/// Serves `app` on `listener` until `shutdown` resolves, then drains
/// in-flight requests.
pub async fn serve<F>(listener: tokio::net::TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

/// Registers the bearer session token scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token returned by /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::tenants::create_tenant,
        crate::handlers::tenants::get_tenant,
        crate::handlers::roles::list_roles,
        crate::handlers::roles::role_permissions,
        crate::handlers::roles::list_role_permissions,
        crate::handlers::roles::update_role_permission,
        crate::handlers::organizations::create_organization,
        crate::handlers::organizations::list_organizations,
        crate::handlers::organizations::create_contact,
        crate::handlers::organizations::list_contacts,
        crate::handlers::organizations::invite_contact,
        crate::handlers::organizations::create_client,
        crate::handlers::organizations::list_clients,
        crate::handlers::organizations::invite_client,
        crate::handlers::invites::create_invites,
        crate::handlers::invites::list_invites,
        crate::handlers::invites::delete_invite,
        crate::handlers::invites::validate_invite,
        crate::handlers::invites::accept_contact_invite,
        crate::handlers::invites::accept_client_invite,
        crate::handlers::integrations::add_integration,
        crate::handlers::integrations::list_integrations,
        crate::handlers::integrations::get_integration,
        crate::handlers::integrations::delete_integration,
        crate::handlers::integrations::list_settings,
        crate::handlers::integrations::upsert_setting,
        crate::handlers::integrations::list_entity_settings,
        crate::handlers::integrations::update_entity_settings,
        crate::handlers::hubstaff::authorize_url,
        crate::handlers::hubstaff::connect,
        crate::handlers::hubstaff::organizations,
        crate::handlers::hubstaff::projects,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthResponse,
            crate::error::ApiError,
            crate::handlers::auth::SessionResponse,
            crate::handlers::types::TenantResponse,
            crate::handlers::types::UserResponse,
            crate::handlers::types::RoleResponse,
            crate::handlers::types::RolePermissionResponse,
            crate::handlers::types::OrganizationResponse,
            crate::handlers::types::CounterpartyResponse,
            crate::handlers::types::InviteResponse,
            crate::handlers::types::IntegrationResponse,
            crate::handlers::types::IntegrationSettingResponse,
            crate::handlers::types::EntitySettingResponse,
            crate::handlers::types::TiedEntityResponse,
            crate::handlers::types::IntegrationTreeResponse,
            crate::handlers::invites::CreateInvitesResponse,
            crate::handlers::invites::AcceptedInviteResponse,
            crate::handlers::hubstaff::AuthorizeUrlResponse,
            crate::services::users::RegisterInput,
            crate::services::users::LoginInput,
            crate::services::tenant::CreateTenantInput,
            crate::services::role_permissions::UpdateRolePermissionInput,
            crate::services::organization::CreateOrganizationInput,
            crate::services::organization::CreateCounterpartyInput,
            crate::services::invite::CreateInvitesInput,
            crate::services::invite::InviteCounterpartyInput,
            crate::services::invite_accept::AcceptInviteInput,
            crate::services::invite_accept::AcceptedOrganizationInput,
            crate::services::integration::AddIntegrationInput,
            crate::services::integration::SettingInput,
            crate::services::integration::EntitySettingInput,
            crate::services::integration::TiedEntityInput,
            crate::services::integration::EntitySettingUpdate,
            crate::services::integration::TiedEntityUpdate,
            crate::services::hubstaff::ConnectHubstaffInput,
            crate::integrations::hubstaff::HubstaffOrganization,
            crate::integrations::hubstaff::HubstaffProject,
            crate::models::enums::RolesEnum,
            crate::models::enums::InviteStatus,
            crate::models::enums::InvitationType,
            crate::models::enums::ContactInviteStatus,
            crate::models::enums::IntegrationEntity,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "root", description = "Service information"),
        (name = "auth", description = "Registration and sessions"),
        (name = "tenants", description = "Tenant onboarding"),
        (name = "roles", description = "Roles and role permissions"),
        (name = "organizations", description = "Organizations, contacts and clients"),
        (name = "invites", description = "Invite issuance and acceptance"),
        (name = "integrations", description = "Integration configuration tree"),
        (name = "hubstaff", description = "Hubstaff integration"),
    ),
    info(
        title = "Workforce API",
        description = "Multi-tenant workforce invites, roles and integrations",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(doc.paths.paths.contains_key("/api/invite/emails"));
    }

    #[tokio::test]
    async fn serve_stops_when_shutdown_resolves() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let app = Router::new().route("/", axum::routing::get(|| async { "ok" }));
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve(listener, app, async {
            let _ = stopped.await;
        }));
        stop.send(()).expect("server is waiting");

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .expect("server shut down in time")
            .expect("server task joined");
        assert!(result.is_ok());
    }
}
