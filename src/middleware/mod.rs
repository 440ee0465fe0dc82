//! middleware.rs
//!
//! Access-control extractors guarding every workflow entry point.
//!
//! Guards compose by sequential evaluation: authentication first, then role,
//! then profile. The first failing check determines the redirect target
//! carried by the resulting [`AppError`]. Extractors have no side effects
//! beyond the failure signal.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::error::AppError;
use crate::session::{Role, Session};

/// An authenticated session plus the token it was loaded under.
///
/// Handlers that mutate the session (role/profile selection, logout) use the
/// token to write the updated state back to the store.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub token: String,
    pub session: Session,
}

/// The acting manager, with their cinema resolved from the session profile.
///
/// Core operations receive `cinema_id` from here as an explicit parameter
/// rather than reading ambient session state.
#[derive(Debug, Clone)]
pub struct ManagerContext {
    pub manager_id: i32,
    pub cinema_id: i32,
}

/// The acting customer.
#[derive(Debug, Clone)]
pub struct CustomerContext {
    pub customer_id: i32,
}

fn bearer_token(parts: &Parts) -> Result<String, AppError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
        .ok_or(AppError::Unauthenticated)
}

async fn load_session(
    parts: &Parts,
    state: &Arc<crate::AppState>,
) -> Result<SessionHandle, AppError> {
    let token = bearer_token(parts)?;
    let session = state
        .sessions
        .load(&token)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    if !session.authenticated {
        return Err(AppError::Unauthenticated);
    }
    Ok(SessionHandle { token, session })
}

impl FromRequestParts<Arc<crate::AppState>> for SessionHandle {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        load_session(parts, state).await
    }
}

impl FromRequestParts<Arc<crate::AppState>> for ManagerContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let handle = load_session(parts, state).await?;
        match handle.session.role {
            None => Err(AppError::NoRoleSelected),
            Some(Role::Customer) => Err(AppError::RoleRequired(Role::Manager)),
            Some(Role::Manager) => {
                let profile = handle
                    .session
                    .manager
                    .ok_or(AppError::ProfileNotSelected(Role::Manager))?;
                Ok(ManagerContext {
                    manager_id: profile.manager_id,
                    cinema_id: profile.cinema_id,
                })
            }
        }
    }
}

impl FromRequestParts<Arc<crate::AppState>> for CustomerContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let handle = load_session(parts, state).await?;
        match handle.session.role {
            None => Err(AppError::NoRoleSelected),
            Some(Role::Manager) => Err(AppError::RoleRequired(Role::Customer)),
            Some(Role::Customer) => {
                let profile = handle
                    .session
                    .customer
                    .ok_or(AppError::ProfileNotSelected(Role::Customer))?;
                Ok(CustomerContext {
                    customer_id: profile.customer_id,
                })
            }
        }
    }
}
