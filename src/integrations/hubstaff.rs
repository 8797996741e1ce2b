//! Hubstaff OAuth and v2 API client.
//!
//! Covers the authorization-code flow against the Hubstaff account service and
//! the two listing calls needed to map Hubstaff organizations and projects
//! onto a tenant.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use utoipa::ToSchema;

use crate::config::AppConfig;

pub const PROVIDER: &str = "hubstaff";

const SCOPE: &str = "hubstaff:read";

#[derive(Debug, Error)]
pub enum HubstaffError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Hubstaff returned status {status}")]
    Api { status: u16, body: String },
}

/// Token response of `POST /access_tokens`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct HubstaffTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct HubstaffOrganization {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct HubstaffProject {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub billable: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OrganizationsPage {
    #[serde(default)]
    organizations: Vec<HubstaffOrganization>,
}

#[derive(Debug, Deserialize)]
struct ProjectsPage {
    #[serde(default)]
    projects: Vec<HubstaffProject>,
}

#[derive(Clone)]
pub struct HubstaffClient {
    http: reqwest::Client,
    oauth_base: String,
    api_base: String,
}

impl HubstaffClient {
    pub fn new(
        oauth_base: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HubstaffError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("workforce/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            oauth_base: oauth_base.into().trim_end_matches('/').to_string(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, HubstaffError> {
        Self::new(
            config.hubstaff_oauth_base.clone(),
            config.hubstaff_api_base.clone(),
            Duration::from_secs(config.http_timeout_seconds),
        )
    }

    /// Consent page the user is sent to.
    pub fn authorize_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        state: &str,
    ) -> Result<Url, HubstaffError> {
        let mut url = Url::parse(&format!("{}/authorizations/new", self.oauth_base))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("realm", "hubstaff")
            .append_pair("client_id", client_id)
            .append_pair("scope", SCOPE)
            .append_pair("state", state)
            .append_pair("nonce", &uuid::Uuid::new_v4().simple().to_string());

        Ok(url)
    }

    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<HubstaffTokens, HubstaffError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .await
    }

    pub async fn refresh_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<HubstaffTokens, HubstaffError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .await
    }

    pub async fn list_organizations(
        &self,
        access_token: &str,
    ) -> Result<Vec<HubstaffOrganization>, HubstaffError> {
        let page: OrganizationsPage = self
            .get_json(&format!("{}/v2/organizations", self.api_base), access_token)
            .await?;
        Ok(page.organizations)
    }

    pub async fn list_projects(
        &self,
        access_token: &str,
        organization_id: i64,
    ) -> Result<Vec<HubstaffProject>, HubstaffError> {
        let page: ProjectsPage = self
            .get_json(
                &format!("{}/v2/organizations/{organization_id}/projects", self.api_base),
                access_token,
            )
            .await?;
        Ok(page.projects)
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<HubstaffTokens, HubstaffError> {
        let response = self
            .http
            .post(format!("{}/access_tokens", self.oauth_base))
            .header("Accept", "application/json")
            .form(params)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(HubstaffError::Api { status, body })
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, HubstaffError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(HubstaffError::Api { status, body })
        }
    }
}
