//! HTTP surface: authentication, onboarding, invites and `data` filters.

#[path = "test_utils/mod.rs"]
mod test_utils;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use test_utils::{TEST_PASSWORD, setup_test_db, test_state};
use tower::ServiceExt;
use workforce::mail::log::MemoryMailer;
use workforce::server::create_app;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).expect("request"))
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

fn data_param(filter: &Value) -> String {
    url::form_urlencoded::byte_serialize(filter.to_string().as_bytes()).collect()
}

/// Register, log in and onboard a tenant with one organization. Returns the
/// session token and the organization id.
async fn onboard(app: &Router) -> (String, String) {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "owner@acme.test",
            "password": TEST_PASSWORD,
            "first_name": "Ada",
            "last_name": "Owner"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, session) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "owner@acme.test", "password": TEST_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = session["token"].as_str().expect("session token").to_string();

    let (status, tenant) = send(
        app,
        Method::POST,
        "/api/tenant",
        Some(&token),
        Some(json!({"name": "Acme"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tenant["name"], "Acme");

    let (status, organization) = send(
        app,
        Method::POST,
        "/api/organization",
        Some(&token),
        Some(json!({"name": "Acme HQ", "currency": "USD"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let organization_id = organization["id"].as_str().expect("organization id").to_string();

    (token, organization_id)
}

async fn role_id(app: &Router, token: &str, name: &str) -> String {
    let (status, roles) = send(app, Method::GET, "/api/roles", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    roles["items"]
        .as_array()
        .expect("role list")
        .iter()
        .find(|role| role["name"] == name)
        .and_then(|role| role["id"].as_str())
        .expect("role present")
        .to_string()
}

async fn app_with_mailer() -> (Router, MemoryMailer) {
    let db = setup_test_db().await.expect("database");
    let (state, mailer) = test_state(db, None);
    (create_app(state), mailer)
}

#[tokio::test]
async fn onboarded_owner_sees_their_tenant_and_roles() {
    let (app, _) = app_with_mailer().await;
    let (token, _) = onboard(&app).await;

    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "owner@acme.test");
    assert!(me.get("hash").is_none());

    let (status, tenant) = send(&app, Method::GET, "/api/tenant", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tenant["name"], "Acme");

    let (status, roles) = send(&app, Method::GET, "/api/roles", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roles["total"], 7);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tenant",
        Some(&token),
        Some(json!({"name": "Second"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invites_flow_through_the_api() {
    let (app, mailer) = app_with_mailer().await;
    let (token, organization_id) = onboard(&app).await;
    let employee_role = role_id(&app, &token, "EMPLOYEE").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/invite/emails",
        Some(&token),
        Some(json!({
            "emails": ["a@acme.test", "b@acme.test", "A@acme.test"],
            "role_id": employee_role,
            "organization_id": organization_id,
            "invitation_type": "EMPLOYEE"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["total"], 2);
    assert_eq!(created["ignored"], 1);
    assert!(created["items"][0].get("token").is_none());
    assert_eq!(mailer.sent().len(), 2);

    let filter = data_param(&json!({"status": "INVITED", "organization_id": organization_id}));
    let (status, listed) = send(
        &app,
        Method::GET,
        &format!("/api/invite?data={filter}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 2);

    let filter = data_param(&json!({"status": "ACCEPTED"}));
    let (status, listed) = send(
        &app,
        Method::GET,
        &format!("/api/invite?data={filter}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 0);

    let invite_id = created["items"][0]["id"].as_str().expect("invite id");
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/invite/{invite_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app, Method::GET, "/api/invite", Some(&token), None).await;
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn malformed_data_filter_is_rejected() {
    let (app, _) = app_with_mailer().await;
    let (token, _) = onboard(&app).await;

    let malformed = vec![
        "%7Bnot-json".to_string(),
        data_param(&json!({"status": "SOMETIMES"})),
    ];
    for raw in &malformed {
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/invite?data={raw}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "data={raw}");
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    let filter = data_param(&json!({"enabled": "yes"}));
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/role-permissions?data={filter}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn contact_invites_are_accepted_publicly() {
    let (app, mailer) = app_with_mailer().await;
    let (token, organization_id) = onboard(&app).await;
    let viewer_role = role_id(&app, &token, "VIEWER").await;

    let (status, contact) = send(
        &app,
        Method::POST,
        "/api/organization-contact",
        Some(&token),
        Some(json!({
            "organization_id": organization_id,
            "name": "Globex",
            "primary_email": "hank@globex.test"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let contact_id = contact["id"].as_str().expect("contact id");

    let (status, invite) = send(
        &app,
        Method::POST,
        &format!("/api/organization-contact/{contact_id}/invite"),
        Some(&token),
        Some(json!({"role_id": viewer_role})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invite["status"], "INVITED");

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    let accept_url = url::Url::parse(&sent[0].accept_url).expect("accept url");
    let invite_token = accept_url
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .expect("token in link");

    let (status, validated) = send(
        &app,
        Method::GET,
        &format!("/api/invite/validate?email=hank%40globex.test&token={invite_token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(validated["email"], "hank@globex.test");

    let (status, accepted) = send(
        &app,
        Method::POST,
        "/api/invite/contact/accept",
        None,
        Some(json!({
            "email": "hank@globex.test",
            "token": invite_token,
            "password": "globex-secret",
            "organization": {"name": "Globex Corp"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(accepted["tenant"]["name"], "Globex Corp");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "hank@globex.test", "password": "globex-secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, contacts) = send(&app, Method::GET, "/api/organization-contact", Some(&token), None).await;
    assert_eq!(contacts["items"][0]["invite_status"], "ACCEPTED");
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() {
    let (app, _) = app_with_mailer().await;
    onboard(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "owner@acme.test", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, Method::GET, "/api/tenant", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
