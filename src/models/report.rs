//! report.rs
//!
//! Monthly revenue reporting. The aggregation itself lives in the database
//! (`monthly_cinema_revenue`, migration-provided); the core only validates
//! and defaults the parameters and passes the result set through.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RevenueRow {
    pub movie_id: i32,
    pub title: String,
    pub tickets_sold: i64,
    pub seats_sold: i64,
    pub revenue: i64,
}

/// Fill in current month, current year, and zero for absent parameters.
pub fn resolve_report_window(
    month: Option<u32>,
    year: Option<i32>,
    min_revenue: Option<i64>,
    today: NaiveDate,
) -> (u32, i32, i64) {
    (
        month.unwrap_or_else(|| today.month()),
        year.unwrap_or_else(|| today.year()),
        min_revenue.unwrap_or(0),
    )
}

pub async fn monthly_revenue(
    pool: &PgPool,
    cinema_id: i32,
    year: i32,
    month: u32,
    min_revenue: i64,
) -> sqlx::Result<Vec<RevenueRow>> {
    sqlx::query_as::<_, RevenueRow>(
        "SELECT movie_id, title, tickets_sold, seats_sold, revenue
         FROM monthly_cinema_revenue($1, $2, $3, $4)",
    )
    .bind(cinema_id)
    .bind(year)
    .bind(month as i32)
    .bind(min_revenue)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_parameters_default_to_current_month() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(resolve_report_window(None, None, None, today), (8, 2026, 0));
    }

    #[test]
    fn explicit_parameters_win() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(
            resolve_report_window(Some(2), Some(2025), Some(50_000), today),
            (2, 2025, 50_000)
        );
    }
}
