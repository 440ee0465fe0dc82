//! auth.rs
//!
//! The shared-login flow: one set of credentials opens a session, after
//! which the user picks a role and then a profile of that role. Every other
//! endpoint in the service sits behind the extractors fed by this state.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::SessionHandle;
use crate::models::catalog;
use crate::session::{CustomerProfile, ManagerProfile, Role, Session};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session_status))
        .route("/choose-role", post(choose_role))
        .route("/managers", get(list_managers))
        .route("/select-manager", post(select_manager))
        .route("/customers", get(list_customers))
        .route("/select-customer", post(select_customer))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

// POST /api/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = &state.config.auth;
    if req.username != auth.username || req.password != auth.password {
        return Err(AppError::InvalidCredentials);
    }

    let session = Session::login(&req.username);
    let token = state.sessions.create(&session).await?;
    tracing::info!("User {} logged in", req.username);

    Ok(Json(json!({
        "message": "Login successful!",
        "token": token,
        "redirect_to": "/choose-role"
    })))
}

// POST /api/logout
async fn logout(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
) -> Result<impl IntoResponse, AppError> {
    state.sessions.delete(&handle.token).await?;
    Ok(Json(json!({
        "message": "You have been logged out.",
        "redirect_to": "/login"
    })))
}

// GET /api/session
//
// Where the client should land given the current role/profile state.
async fn session_status(handle: SessionHandle) -> impl IntoResponse {
    let session = &handle.session;
    let (role_complete, next) = match session.role {
        None => (false, "/choose-role"),
        Some(Role::Manager) => match session.manager {
            Some(_) => (true, "/manager/shows"),
            None => (false, "/select-manager"),
        },
        Some(Role::Customer) => match session.customer {
            Some(_) => (true, "/customer/movies"),
            None => (false, "/select-customer"),
        },
    };

    Json(json!({
        "username": session.username,
        "role": session.role,
        "manager": session.manager,
        "customer": session.customer,
        "role_complete": role_complete,
        "redirect_to": next
    }))
}

#[derive(Debug, Deserialize)]
struct ChooseRoleRequest {
    role: String,
}

// POST /api/choose-role
async fn choose_role(
    State(state): State<Arc<AppState>>,
    mut handle: SessionHandle,
    Json(req): Json<ChooseRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = handle.session.choose_role(&req.role)?;
    state.sessions.save(&handle.token, &handle.session).await?;

    let next = match role {
        Role::Manager => "/select-manager",
        Role::Customer => "/select-customer",
    };
    Ok(Json(json!({ "role": role, "redirect_to": next })))
}

// GET /api/managers
async fn list_managers(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
) -> Result<impl IntoResponse, AppError> {
    if handle.session.role != Some(Role::Manager) {
        return Err(AppError::RoleRequired(Role::Manager));
    }
    let managers = catalog::list_managers(&state.db.pool).await?;
    Ok(Json(managers))
}

#[derive(Debug, Deserialize)]
struct SelectManagerRequest {
    manager_id: i32,
}

// POST /api/select-manager
async fn select_manager(
    State(state): State<Arc<AppState>>,
    mut handle: SessionHandle,
    Json(req): Json<SelectManagerRequest>,
) -> Result<impl IntoResponse, AppError> {
    // The cinema binding comes from the catalog, never from the client.
    let listing = catalog::find_manager(&state.db.pool, req.manager_id)
        .await?
        .ok_or(AppError::ProfileNotFound)?;

    handle.session.select_manager_profile(ManagerProfile {
        manager_id: listing.manager_id,
        cinema_id: listing.cinema_id,
        username: listing.username,
    })?;
    state.sessions.save(&handle.token, &handle.session).await?;

    Ok(Json(json!({
        "message": "Manager selected successfully!",
        "redirect_to": "/manager/shows"
    })))
}

// GET /api/customers
async fn list_customers(
    State(state): State<Arc<AppState>>,
    handle: SessionHandle,
) -> Result<impl IntoResponse, AppError> {
    if handle.session.role != Some(Role::Customer) {
        return Err(AppError::RoleRequired(Role::Customer));
    }
    let customers = catalog::list_customers(&state.db.pool).await?;
    Ok(Json(customers))
}

#[derive(Debug, Deserialize)]
struct SelectCustomerRequest {
    customer_id: i32,
}

// POST /api/select-customer
async fn select_customer(
    State(state): State<Arc<AppState>>,
    mut handle: SessionHandle,
    Json(req): Json<SelectCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let listing = catalog::find_customer(&state.db.pool, req.customer_id)
        .await?
        .ok_or(AppError::ProfileNotFound)?;

    handle.session.select_customer_profile(CustomerProfile {
        customer_id: listing.customer_id,
        username: listing.username,
    })?;
    state.sessions.save(&handle.token, &handle.session).await?;

    Ok(Json(json!({
        "message": "Customer selected successfully!",
        "redirect_to": "/customer/movies"
    })))
}
