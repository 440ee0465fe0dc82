//! customer.rs
//!
//! Customer-facing endpoints: the movie catalog, the four-stage booking
//! pipeline (seats → discounts → review → confirm), and ticket history.
//! Each stage re-derives the booking from request parameters; nothing is
//! staged server-side between stages.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::CustomerContext;
use crate::models::booking::{self, ConfirmBooking};
use crate::models::{show, Movie};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customer/movies", get(list_movies))
        .route("/customer/movies/{movie_id}", get(movie_showtimes))
        .route("/customer/seats", get(seat_map))
        .route("/customer/discounts", get(list_discounts))
        .route("/customer/booking/review", post(review_booking))
        .route("/customer/booking/confirm", post(confirm_booking))
        .route("/customer/tickets", get(my_tickets))
        .route("/customer/tickets/{ticket_id}", get(booking_confirmation))
}

// GET /api/customer/movies
async fn list_movies(
    State(state): State<Arc<AppState>>,
    _customer: CustomerContext,
) -> Result<impl IntoResponse, AppError> {
    let movies = Movie::list_all(&state.db.pool).await?;
    Ok(Json(movies))
}

// GET /api/customer/movies/{movie_id}
//
// One movie plus its future screenings across all cinemas.
async fn movie_showtimes(
    State(state): State<Arc<AppState>>,
    _customer: CustomerContext,
    Path(movie_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let movie = Movie::find(&state.db.pool, movie_id)
        .await?
        .ok_or(AppError::MovieNotFound)?;
    let showtimes = show::upcoming_for_movie(&state.db.pool, movie_id).await?;

    Ok(Json(json!({ "movie": movie, "showtimes": showtimes })))
}

#[derive(Debug, Deserialize)]
struct SeatMapQuery {
    cinema_id: i32,
    auditorium_id: i32,
    show_date: String,
    start_time: String,
}

// GET /api/customer/seats?cinema_id=&auditorium_id=&show_date=&start_time=
//
// Stage 1: the auditorium layout plus the seats already taken for this
// screening. An unknown screening yields an empty booked list, not an error.
async fn seat_map(
    State(state): State<Arc<AppState>>,
    _customer: CustomerContext,
    Query(params): Query<SeatMapQuery>,
) -> Result<impl IntoResponse, AppError> {
    let seats =
        booking::list_seats(&state.db.pool, params.cinema_id, params.auditorium_id).await?;
    let booked = booking::list_booked_seats(
        &state.db.pool,
        params.cinema_id,
        params.auditorium_id,
        &params.show_date,
        &params.start_time,
    )
    .await?;

    Ok(Json(json!({ "seats": seats, "booked": booked })))
}

// GET /api/customer/discounts
//
// Stage 2: every allocation the customer owns, exhausted ones included.
async fn list_discounts(
    State(state): State<Arc<AppState>>,
    customer: CustomerContext,
) -> Result<impl IntoResponse, AppError> {
    let discounts = booking::list_discounts(&state.db.pool, customer.customer_id).await?;
    Ok(Json(discounts))
}

#[derive(Debug, Deserialize)]
struct ReviewRequest {
    cinema_id: i32,
    auditorium_id: i32,
    selected_seats: Vec<String>,
    #[serde(default)]
    discount_ids: Vec<i32>,
}

// POST /api/customer/booking/review
//
// Stage 3: itemized pricing for display. Performs no mutation.
async fn review_booking(
    State(state): State<Arc<AppState>>,
    customer: CustomerContext,
    Json(req): Json<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let seat_numbers = booking::normalize_seat_selection(&req.selected_seats)?;
    let quote = booking::quote(
        &state.db.pool,
        customer.customer_id,
        req.cinema_id,
        req.auditorium_id,
        &seat_numbers,
        &req.discount_ids,
    )
    .await?;
    Ok(Json(quote))
}

// POST /api/customer/booking/confirm
//
// Stage 4: recompute everything and commit atomically.
async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    customer: CustomerContext,
    Json(req): Json<ConfirmBooking>,
) -> Result<impl IntoResponse, AppError> {
    let ticket_id = booking::confirm(&state.db.pool, customer.customer_id, &req).await?;
    tracing::info!(
        "Customer {} confirmed booking, ticket {}",
        customer.customer_id,
        ticket_id
    );

    Ok(Json(json!({
        "message": "Booking confirmed!",
        "ticket_id": ticket_id,
        "redirect_to": format!("/customer/tickets/{}", ticket_id)
    })))
}

// GET /api/customer/tickets
async fn my_tickets(
    State(state): State<Arc<AppState>>,
    customer: CustomerContext,
) -> Result<impl IntoResponse, AppError> {
    let tickets = booking::my_tickets(&state.db.pool, customer.customer_id).await?;
    Ok(Json(tickets))
}

// GET /api/customer/tickets/{ticket_id}
async fn booking_confirmation(
    State(state): State<Arc<AppState>>,
    customer: CustomerContext,
    Path(ticket_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let confirmation =
        booking::booking_confirmation(&state.db.pool, ticket_id, customer.customer_id).await?;
    Ok(Json(confirmation))
}
