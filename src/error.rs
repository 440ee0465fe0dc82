//! error.rs
//!
//! Domain error taxonomy for the whole service.
//!
//! Four families of failures, each mapped to a distinct HTTP shape:
//! - Guard failures (not logged in, no role, no profile) carry a redirect
//!   target so the client can resume at the right step of the login flow.
//! - Validation failures name the specific rule the input violated.
//! - Conflict failures depend on concurrent state (sold tickets, missing
//!   screenings), not on the shape of the caller's input.
//! - Storage failures are logged in full and surfaced as a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::session::Role;

#[derive(Debug, Error)]
pub enum AppError {
    // --- Guard failures ---
    #[error("Please log in first.")]
    Unauthenticated,
    #[error("Please select a role first.")]
    NoRoleSelected,
    #[error("{0} role required.")]
    RoleRequired(Role),
    #[error("Please select a {0} profile first.")]
    ProfileNotSelected(Role),

    // --- Validation failures ---
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    #[error("Date or time format is incorrect: {0}")]
    InvalidDateTime(String),
    #[error("The showtime cannot be in the past.")]
    InPast,
    #[error("The showtime must be at least 1 hour from now.")]
    TooSoon,
    #[error("The original showtime has already passed.")]
    LockedPast,
    #[error("The showtime starts within 2 hours and can no longer be changed.")]
    LockedImminent,
    #[error("Please select at least one seat.")]
    NoSeatsSelected,
    #[error("Seat selection could not be parsed.")]
    InvalidSeatSelection,

    // --- Conflict failures ---
    #[error("Tickets have already been purchased for this showtime.")]
    AlreadyBooked,
    #[error("One or more selected seats have just been booked.")]
    SeatTaken,
    #[error("Showtime not found.")]
    ShowNotFound,
    #[error("Ticket not found.")]
    TicketNotFound,
    #[error("Movie not found.")]
    MovieNotFound,
    #[error("Profile not found.")]
    ProfileNotFound,

    // --- Storage failures ---
    #[error("A database error occurred. Please try again.")]
    Database(#[from] sqlx::Error),
    #[error("Session storage is unavailable. Please try again.")]
    SessionStore(#[from] redis::RedisError),
}

impl AppError {
    /// Where the client should resume after a guard failure, if anywhere.
    pub fn redirect_to(&self) -> Option<&'static str> {
        match self {
            AppError::Unauthenticated => Some("/login"),
            AppError::NoRoleSelected | AppError::RoleRequired(_) => Some("/choose-role"),
            AppError::ProfileNotSelected(Role::Manager) => Some("/select-manager"),
            AppError::ProfileNotSelected(Role::Customer) => Some("/select-customer"),
            _ => None,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NoRoleSelected
            | AppError::RoleRequired(_)
            | AppError::ProfileNotSelected(_) => StatusCode::FORBIDDEN,

            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::InvalidRole(_)
            | AppError::InvalidDateTime(_)
            | AppError::InPast
            | AppError::TooSoon
            | AppError::LockedPast
            | AppError::LockedImminent
            | AppError::NoSeatsSelected
            | AppError::InvalidSeatSelection => StatusCode::UNPROCESSABLE_ENTITY,

            AppError::AlreadyBooked | AppError::SeatTaken => StatusCode::CONFLICT,
            AppError::ShowNotFound
            | AppError::TicketNotFound
            | AppError::MovieNotFound
            | AppError::ProfileNotFound => StatusCode::NOT_FOUND,

            AppError::Database(_) | AppError::SessionStore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Storage details go to the log, never to the client.
        match &self {
            AppError::Database(e) => tracing::error!("database error: {:?}", e),
            AppError::SessionStore(e) => tracing::error!("session store error: {:?}", e),
            _ => {}
        }

        let mut body = json!({ "error": self.to_string() });
        if let Some(target) = self.redirect_to() {
            body["redirect_to"] = json!(target);
        }
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_failures_carry_redirect_targets() {
        assert_eq!(AppError::Unauthenticated.redirect_to(), Some("/login"));
        assert_eq!(AppError::NoRoleSelected.redirect_to(), Some("/choose-role"));
        assert_eq!(
            AppError::ProfileNotSelected(Role::Manager).redirect_to(),
            Some("/select-manager")
        );
        assert_eq!(
            AppError::ProfileNotSelected(Role::Customer).redirect_to(),
            Some("/select-customer")
        );
    }

    #[test]
    fn validation_and_conflict_failures_do_not_redirect() {
        assert_eq!(AppError::TooSoon.redirect_to(), None);
        assert_eq!(AppError::AlreadyBooked.redirect_to(), None);
    }

    #[test]
    fn conflict_is_distinct_from_validation() {
        assert_eq!(AppError::AlreadyBooked.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::LockedImminent.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
