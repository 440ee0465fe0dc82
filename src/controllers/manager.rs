//! manager.rs
//!
//! Manager-facing endpoints: showtime scheduling for the manager's own
//! cinema, the reference data the scheduling forms need, and the monthly
//! revenue report. The acting cinema always comes from [`ManagerContext`].

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::ManagerContext;
use crate::models::show::{self, NewShow, ShowFilters, ShowKey, ShowUpdate};
use crate::models::{report, Movie};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/manager/shows",
            get(list_shows).post(create_show).put(update_show).delete(delete_show),
        )
        .route("/manager/shows/detail", get(show_detail))
        .route("/manager/movies", get(list_movies))
        .route("/manager/auditoriums", get(list_auditoriums))
        .route("/manager/report/monthly", get(monthly_report))
}

// GET /api/manager/shows?movie_id=&show_date=
async fn list_shows(
    State(state): State<Arc<AppState>>,
    manager: ManagerContext,
    Query(filters): Query<ShowFilters>,
) -> Result<impl IntoResponse, AppError> {
    let shows = show::list(&state.db.pool, manager.cinema_id, &filters).await?;
    Ok(Json(shows))
}

// GET /api/manager/shows/detail?movie_id=&auditorium_id=&show_date=&start_time=
async fn show_detail(
    State(state): State<Arc<AppState>>,
    manager: ManagerContext,
    Query(key): Query<ShowKey>,
) -> Result<impl IntoResponse, AppError> {
    let detail = show::find(&state.db.pool, manager.cinema_id, &key).await?;
    Ok(Json(detail))
}

// POST /api/manager/shows
async fn create_show(
    State(state): State<Arc<AppState>>,
    manager: ManagerContext,
    Json(new): Json<NewShow>,
) -> Result<impl IntoResponse, AppError> {
    show::create(&state.db.pool, manager.cinema_id, &new).await?;
    tracing::info!(
        "Manager {} scheduled movie {} in auditorium {} on {} {}",
        manager.manager_id,
        new.movie_id,
        new.auditorium_id,
        new.show_date,
        new.start_time
    );
    Ok(Json(json!({ "message": "Show created successfully!" })))
}

#[derive(Debug, Deserialize)]
struct UpdateShowRequest {
    movie_id: i32,
    auditorium_id: i32,
    show_date: String,
    start_time: String,
    new_auditorium_id: i32,
    new_show_date: String,
    new_start_time: String,
}

// PUT /api/manager/shows
async fn update_show(
    State(state): State<Arc<AppState>>,
    manager: ManagerContext,
    Json(req): Json<UpdateShowRequest>,
) -> Result<impl IntoResponse, AppError> {
    let old_key = ShowKey {
        movie_id: req.movie_id,
        auditorium_id: req.auditorium_id,
        show_date: req.show_date,
        start_time: req.start_time,
    };
    let update = ShowUpdate {
        auditorium_id: req.new_auditorium_id,
        show_date: req.new_show_date,
        start_time: req.new_start_time,
    };
    show::update(&state.db.pool, manager.cinema_id, &old_key, &update).await?;
    Ok(Json(json!({ "message": "Show updated successfully!" })))
}

// DELETE /api/manager/shows?movie_id=&auditorium_id=&show_date=&start_time=
async fn delete_show(
    State(state): State<Arc<AppState>>,
    manager: ManagerContext,
    Query(key): Query<ShowKey>,
) -> Result<impl IntoResponse, AppError> {
    show::delete(&state.db.pool, manager.cinema_id, &key).await?;
    Ok(Json(json!({ "message": "Show deleted successfully!" })))
}

// GET /api/manager/movies
async fn list_movies(
    State(state): State<Arc<AppState>>,
    _manager: ManagerContext,
) -> Result<impl IntoResponse, AppError> {
    let movies = Movie::list_all(&state.db.pool).await?;
    Ok(Json(movies))
}

// GET /api/manager/auditoriums
async fn list_auditoriums(
    State(state): State<Arc<AppState>>,
    manager: ManagerContext,
) -> Result<impl IntoResponse, AppError> {
    let auditoriums = show::auditoriums(&state.db.pool, manager.cinema_id).await?;
    Ok(Json(auditoriums))
}

#[derive(Debug, Deserialize)]
struct MonthlyReportQuery {
    month: Option<u32>,
    year: Option<i32>,
    min_revenue: Option<i64>,
}

// GET /api/manager/report/monthly?month=&year=&min_revenue=
async fn monthly_report(
    State(state): State<Arc<AppState>>,
    manager: ManagerContext,
    Query(params): Query<MonthlyReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (month, year, min_revenue) = report::resolve_report_window(
        params.month,
        params.year,
        params.min_revenue,
        Local::now().date_naive(),
    );
    let rows =
        report::monthly_revenue(&state.db.pool, manager.cinema_id, year, month, min_revenue)
            .await?;

    Ok(Json(json!({
        "cinema_id": manager.cinema_id,
        "month": month,
        "year": year,
        "min_revenue": min_revenue,
        "rows": rows
    })))
}
