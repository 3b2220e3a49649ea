//! In-process stand-in for the parts of the Keycloak admin API the
//! provisioning runs touch. State is kept so re-runs can be observed.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use afm_keycloak::KeycloakConfig;
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::{Value, json};

pub const ADMIN_TOKEN: &str = "fake-admin-token";
pub const REALM: &str = "afromarket";

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub enabled: bool,
    pub email_verified: bool,
    pub password: Option<String>,
    pub temporary_password: bool,
}

#[derive(Debug, Clone)]
pub struct FakeRole {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub composite: bool,
    pub client_role: bool,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub users: Vec<FakeUser>,
    pub roles: Vec<FakeRole>,
    /// (user id, role id)
    pub mappings: Vec<(String, String)>,
    /// Answer a repeated role mapping with 409 instead of a silent 204.
    pub conflict_on_existing_mapping: bool,
    /// Ignore `exact=true` and match emails by substring.
    pub loose_email_search: bool,
    pub token_requests: usize,
    pub user_creations: usize,
    pub password_resets: usize,
}

impl FakeState {
    pub fn users_with_email(&self, email: &str) -> Vec<&FakeUser> {
        self.users.iter().filter(|u| u.email == email).collect()
    }

    pub fn roles_named(&self, name: &str) -> Vec<&FakeRole> {
        self.roles.iter().filter(|r| r.name == name).collect()
    }

    pub fn user_role_names(&self, user_id: &str) -> Vec<String> {
        self.mappings
            .iter()
            .filter(|(u, _)| u == user_id)
            .filter_map(|(_, r)| self.roles.iter().find(|role| &role.id == r))
            .map(|role| role.name.clone())
            .collect()
    }

    pub fn add_user(&mut self, email: &str, password: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.users.push(FakeUser {
            id: id.clone(),
            username: email.to_string(),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            enabled: true,
            email_verified: true,
            password: Some(password.to_string()),
            temporary_password: false,
        });
        id
    }

    pub fn add_role(&mut self, name: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.roles.push(FakeRole {
            id: id.clone(),
            name: name.to_string(),
            description: None,
            composite: false,
            client_role: false,
        });
        id
    }
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeKeycloak {
    pub address: String,
    state: Shared,
}

impl FakeKeycloak {
    pub async fn start() -> anyhow::Result<Self> {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route("/realms/{realm}/protocol/openid-connect/token", post(token))
            .route("/admin/realms/{realm}/users", get(find_users).post(create_user))
            .route(
                "/admin/realms/{realm}/users/{id}/reset-password",
                put(reset_password),
            )
            .route(
                "/admin/realms/{realm}/users/{id}/role-mappings/realm",
                post(add_role_mappings),
            )
            .route("/admin/realms/{realm}/roles", post(create_role))
            .route("/admin/realms/{realm}/roles/{name}", get(role_by_name))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let address = format!("http://{}", listener.local_addr()?);
        tokio::spawn(async move { axum::serve(listener, app).await });
        Ok(Self { address, state })
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn config(&self) -> anyhow::Result<KeycloakConfig> {
        Ok(KeycloakConfig::compiled_in().with_address(&self.address))
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {ADMIN_TOKEN}"))
}

fn guard(headers: &HeaderMap, realm: &str) -> Option<Response> {
    if !authorized(headers) {
        return Some(StatusCode::UNAUTHORIZED.into_response());
    }
    if realm != REALM {
        return Some(
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Realm not found." })),
            )
                .into_response(),
        );
    }
    None
}

fn user_json(user: &FakeUser) -> Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "firstName": user.first_name,
        "lastName": user.last_name,
        "enabled": user.enabled,
        "emailVerified": user.email_verified,
    })
}

fn role_json(role: &FakeRole) -> Value {
    json!({
        "id": role.id,
        "name": role.name,
        "description": role.description,
        "composite": role.composite,
        "clientRole": role.client_role,
        "containerId": REALM,
    })
}

async fn token(
    State(state): State<Shared>,
    Path(realm): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let field = |k: &str| form.get(k).map(String::as_str);
    let valid = realm == "master"
        && field("grant_type") == Some("password")
        && field("client_id") == Some("admin-cli")
        && field("username") == Some("admin")
        && field("password") == Some("admin123");
    if !valid {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid user credentials"
            })),
        )
            .into_response();
    }
    state.lock().unwrap().token_requests += 1;
    Json(json!({
        "access_token": ADMIN_TOKEN,
        "expires_in": 60,
        "refresh_expires_in": 1800,
        "refresh_token": "fake-refresh-token",
        "token_type": "Bearer",
        "not-before-policy": 0,
        "scope": "profile email",
    }))
    .into_response()
}

async fn find_users(
    State(state): State<Shared>,
    Path(realm): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = guard(&headers, &realm) {
        return rejection;
    }
    let state = state.lock().unwrap();
    let exact = query.get("exact").is_some_and(|v| v == "true") && !state.loose_email_search;
    let users: Vec<Value> = state
        .users
        .iter()
        .filter(|user| match query.get("email") {
            Some(email) if exact => user.email.eq_ignore_ascii_case(email),
            Some(email) => user.email.contains(email.as_str()),
            None => true,
        })
        .map(user_json)
        .collect();
    Json(users).into_response()
}

async fn create_user(
    State(state): State<Shared>,
    Path(realm): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = guard(&headers, &realm) {
        return rejection;
    }
    let text = |k: &str| body.get(k).and_then(Value::as_str).map(String::from);
    let flag = |k: &str| body.get(k).and_then(Value::as_bool).unwrap_or(false);
    let (Some(username), Some(email)) = (text("username"), text("email")) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let mut state = state.lock().unwrap();
    if state
        .users
        .iter()
        .any(|u| u.username == username || u.email == email)
    {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "errorMessage": "User exists with same username or email" })),
        )
            .into_response();
    }
    let credential = body
        .get("credentials")
        .and_then(Value::as_array)
        .and_then(|c| c.first());
    let id = uuid::Uuid::new_v4().to_string();
    state.users.push(FakeUser {
        id: id.clone(),
        username,
        email,
        first_name: text("firstName"),
        last_name: text("lastName"),
        enabled: flag("enabled"),
        email_verified: flag("emailVerified"),
        password: credential
            .and_then(|c| c.get("value"))
            .and_then(Value::as_str)
            .map(String::from),
        temporary_password: credential
            .and_then(|c| c.get("temporary"))
            .and_then(Value::as_bool)
            .unwrap_or(true),
    });
    state.user_creations += 1;
    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("/admin/realms/{realm}/users/{id}"))],
    )
        .into_response()
}

async fn reset_password(
    State(state): State<Shared>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = guard(&headers, &realm) {
        return rejection;
    }
    if body.get("type").and_then(Value::as_str) != Some("password") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let mut state = state.lock().unwrap();
    let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    user.password = body.get("value").and_then(Value::as_str).map(String::from);
    user.temporary_password = body
        .get("temporary")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    state.password_resets += 1;
    StatusCode::NO_CONTENT.into_response()
}

async fn create_role(
    State(state): State<Shared>,
    Path(realm): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = guard(&headers, &realm) {
        return rejection;
    }
    let Some(name) = body.get("name").and_then(Value::as_str) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let mut state = state.lock().unwrap();
    if state.roles.iter().any(|r| r.name == name) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "errorMessage": format!("Role with name {name} already exists") })),
        )
            .into_response();
    }
    let id = uuid::Uuid::new_v4().to_string();
    state.roles.push(FakeRole {
        id,
        name: name.to_string(),
        description: body
            .get("description")
            .and_then(Value::as_str)
            .map(String::from),
        composite: body
            .get("composite")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        client_role: body
            .get("clientRole")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    });
    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("/admin/realms/{realm}/roles/{name}"))],
    )
        .into_response()
}

async fn role_by_name(
    State(state): State<Shared>,
    Path((realm, name)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = guard(&headers, &realm) {
        return rejection;
    }
    let state = state.lock().unwrap();
    match state.roles.iter().find(|r| r.name == name) {
        Some(role) => Json(role_json(role)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Could not find role" })),
        )
            .into_response(),
    }
}

async fn add_role_mappings(
    State(state): State<Shared>,
    Path((realm, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(roles): Json<Vec<Value>>,
) -> Response {
    if let Some(rejection) = guard(&headers, &realm) {
        return rejection;
    }
    let mut state = state.lock().unwrap();
    if !state.users.iter().any(|u| u.id == id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let mut role_ids = Vec::with_capacity(roles.len());
    for role in &roles {
        let role_id = role.get("id").and_then(Value::as_str);
        let role_name = role.get("name").and_then(Value::as_str);
        match state
            .roles
            .iter()
            .find(|r| Some(r.id.as_str()) == role_id && Some(r.name.as_str()) == role_name)
        {
            Some(found) => role_ids.push(found.id.clone()),
            None => return StatusCode::NOT_FOUND.into_response(),
        }
    }
    for role_id in role_ids {
        let mapping = (id.clone(), role_id);
        if state.mappings.contains(&mapping) {
            if state.conflict_on_existing_mapping {
                return StatusCode::CONFLICT.into_response();
            }
            continue;
        }
        state.mappings.push(mapping);
    }
    StatusCode::NO_CONTENT.into_response()
}
