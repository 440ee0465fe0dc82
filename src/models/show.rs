//! show.rs
//!
//! Showtime scheduling engine.
//!
//! A show is addressed externally by its natural key (movie, cinema,
//! auditorium, date, time) but carries a surrogate `screening_id` internally.
//! Edits relocate the natural-key columns with a single UPDATE against the
//! surrogate, inside one transaction, so there is no window where the show
//! has been deleted but not yet re-inserted.
//!
//! Temporal rules:
//! - creation requires the start instant to be at least 1 hour ahead
//!   (exactly 3600 seconds is allowed);
//! - modification and deletion are locked once the existing start instant is
//!   less than 2 hours away, or already in the past;
//! - both are refused outright once any ticket has been sold.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::AppError;

/// Minimum lead time for scheduling a new show.
pub const CREATE_LEAD_SECONDS: i64 = 3600;
/// Lockout window before the start of an existing show.
pub const MODIFY_LOCKOUT_SECONDS: i64 = 7200;

/// Natural key of a show, as carried by requests. Date and time arrive as
/// strings so normalization and parsing happen in exactly one place.
#[derive(Debug, Clone, Deserialize)]
pub struct ShowKey {
    pub movie_id: i32,
    pub auditorium_id: i32,
    pub show_date: String,
    pub start_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewShow {
    pub movie_id: i32,
    pub auditorium_id: i32,
    pub show_date: String,
    pub start_time: String,
}

/// Replacement fields for an edit. Movie and cinema are never editable.
#[derive(Debug, Clone, Deserialize)]
pub struct ShowUpdate {
    pub auditorium_id: i32,
    pub show_date: String,
    pub start_time: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShowSummary {
    pub screening_id: i64,
    pub movie_id: i32,
    pub cinema_id: i32,
    pub auditorium_id: i32,
    pub show_date: NaiveDate,
    pub start_time: NaiveTime,
    pub movie_title: String,
    pub cinema_name: String,
    pub auditorium_name: String,
    pub auditorium_type: Option<String>,
    pub capacity: i32,
    pub booked_seats: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShowDetail {
    pub screening_id: i64,
    pub movie_id: i32,
    pub cinema_id: i32,
    pub auditorium_id: i32,
    pub show_date: NaiveDate,
    pub start_time: NaiveTime,
    pub movie_title: String,
    pub duration_min: i32,
    pub cinema_name: String,
    pub auditorium_name: String,
    pub address: Option<String>,
    pub capacity: i32,
    pub booked_seats: i64,
}

/// A future screening of one movie, for the customer-facing picker.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UpcomingShowtime {
    pub show_date: NaiveDate,
    pub start_time: NaiveTime,
    pub cinema_id: i32,
    pub cinema_name: String,
    pub city: Option<String>,
    pub district: Option<String>,
    pub auditorium_id: i32,
    pub auditorium_name: String,
    pub auditorium_type: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Auditorium {
    pub auditorium_id: i32,
    pub auditorium_name: String,
    pub auditorium_type: Option<String>,
    pub capacity: i32,
}

/// Optional equality filters for the manager's show list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowFilters {
    pub movie_id: Option<i32>,
    pub show_date: Option<NaiveDate>,
}

// --- Temporal validation (pure) ---

/// Pad a `HH:MM` time-of-day with seconds; `HH:MM:SS` passes through.
pub fn normalize_time(raw: &str) -> String {
    if raw.len() == 5 {
        format!("{}:00", raw)
    } else {
        raw.to_string()
    }
}

/// Compose and parse a show's start instant from its date and time parts.
pub fn parse_show_instant(show_date: &str, start_time: &str) -> Result<NaiveDateTime, AppError> {
    let composed = format!("{} {}", show_date, normalize_time(start_time));
    NaiveDateTime::parse_from_str(&composed, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| AppError::InvalidDateTime(format!("{}: {}", composed, e)))
}

/// Creation rule: strictly in the future, and at least 1 hour ahead.
pub fn check_creation_lead(instant: NaiveDateTime, now: NaiveDateTime) -> Result<(), AppError> {
    if instant <= now {
        return Err(AppError::InPast);
    }
    if (instant - now).num_seconds() < CREATE_LEAD_SECONDS {
        return Err(AppError::TooSoon);
    }
    Ok(())
}

/// Modification rule for an existing show: not already started, and not
/// within the 2-hour lockout window.
pub fn check_modification_lock(instant: NaiveDateTime, now: NaiveDateTime) -> Result<(), AppError> {
    if instant < now {
        return Err(AppError::LockedPast);
    }
    if (instant - now).num_seconds() < MODIFY_LOCKOUT_SECONDS {
        return Err(AppError::LockedImminent);
    }
    Ok(())
}

fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

fn parse_key_parts(
    show_date: &str,
    start_time: &str,
) -> Result<(NaiveDate, NaiveTime), AppError> {
    let instant = parse_show_instant(show_date, start_time)?;
    Ok((instant.date(), instant.time()))
}

// --- Engine operations ---

/// Shows scoped to one cinema, with derived booked-seat counts and optional
/// movie/date filters.
pub async fn list(
    pool: &PgPool,
    cinema_id: i32,
    filters: &ShowFilters,
) -> sqlx::Result<Vec<ShowSummary>> {
    let mut query = String::from(
        r#"
        SELECT
            s.screening_id,
            s.movie_id,
            s.cinema_id,
            s.auditorium_id,
            s.show_date,
            s.start_time,
            m.title AS movie_title,
            c.cinema_name,
            a.auditorium_name,
            a.auditorium_type,
            a.capacity,
            COALESCE((
                SELECT SUM(t.seat_count)
                FROM ticket t
                WHERE t.screening_id = s.screening_id
            ), 0)::BIGINT AS booked_seats
        FROM showtime s
        INNER JOIN movie m ON s.movie_id = m.movie_id
        INNER JOIN cinema c ON s.cinema_id = c.cinema_id
        INNER JOIN auditorium a
            ON s.cinema_id = a.cinema_id
            AND s.auditorium_id = a.auditorium_id
        WHERE s.cinema_id = $1
        "#,
    );

    let mut bind_idx = 2;
    if filters.movie_id.is_some() {
        query.push_str(&format!(" AND s.movie_id = ${}", bind_idx));
        bind_idx += 1;
    }
    if filters.show_date.is_some() {
        query.push_str(&format!(" AND s.show_date = ${}", bind_idx));
    }
    query.push_str(" ORDER BY s.show_date, s.start_time");

    let mut q = sqlx::query_as::<_, ShowSummary>(&query).bind(cinema_id);
    if let Some(movie_id) = filters.movie_id {
        q = q.bind(movie_id);
    }
    if let Some(show_date) = filters.show_date {
        q = q.bind(show_date);
    }
    q.fetch_all(pool).await
}

/// Show detail by natural key, scoped to the caller's cinema.
pub async fn find(pool: &PgPool, cinema_id: i32, key: &ShowKey) -> Result<ShowDetail, AppError> {
    let (show_date, start_time) = parse_key_parts(&key.show_date, &key.start_time)?;

    sqlx::query_as::<_, ShowDetail>(
        r#"
        SELECT
            s.screening_id,
            s.movie_id,
            s.cinema_id,
            s.auditorium_id,
            s.show_date,
            s.start_time,
            m.title AS movie_title,
            m.duration_min,
            c.cinema_name,
            a.auditorium_name,
            c.address,
            a.capacity,
            COALESCE((
                SELECT SUM(t.seat_count)
                FROM ticket t
                WHERE t.screening_id = s.screening_id
            ), 0)::BIGINT AS booked_seats
        FROM showtime s
        INNER JOIN movie m ON s.movie_id = m.movie_id
        INNER JOIN cinema c ON s.cinema_id = c.cinema_id
        INNER JOIN auditorium a
            ON s.cinema_id = a.cinema_id
            AND s.auditorium_id = a.auditorium_id
        WHERE s.movie_id = $1
          AND s.cinema_id = $2
          AND s.auditorium_id = $3
          AND s.show_date = $4
          AND s.start_time = $5
        "#,
    )
    .bind(key.movie_id)
    .bind(cinema_id)
    .bind(key.auditorium_id)
    .bind(show_date)
    .bind(start_time)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::ShowNotFound)
}

/// Schedule a new show for the acting manager's own cinema.
pub async fn create(pool: &PgPool, cinema_id: i32, new: &NewShow) -> Result<(), AppError> {
    let instant = parse_show_instant(&new.show_date, &new.start_time)?;
    check_creation_lead(instant, now_local())?;

    sqlx::query(
        r#"
        INSERT INTO showtime (movie_id, cinema_id, auditorium_id, show_date, start_time)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(new.movie_id)
    .bind(cinema_id)
    .bind(new.auditorium_id)
    .bind(instant.date())
    .bind(instant.time())
    .execute(pool)
    .await?;
    Ok(())
}

/// Relocate an existing show to a new auditorium/date/time.
///
/// The ticket-existence check and the key relocation happen in the same
/// transaction, with the showtime row locked, so a booking racing this edit
/// either lands before (edit refused) or after (booking sees the new key).
pub async fn update(
    pool: &PgPool,
    cinema_id: i32,
    old_key: &ShowKey,
    new: &ShowUpdate,
) -> Result<(), AppError> {
    let old_instant = parse_show_instant(&old_key.show_date, &old_key.start_time)?;
    let new_instant = parse_show_instant(&new.show_date, &new.start_time)?;

    let now = now_local();
    check_modification_lock(old_instant, now)?;
    check_creation_lead(new_instant, now)?;

    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    let screening_id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT screening_id FROM showtime
        WHERE movie_id = $1 AND cinema_id = $2 AND auditorium_id = $3
          AND show_date = $4 AND start_time = $5
        FOR UPDATE
        "#,
    )
    .bind(old_key.movie_id)
    .bind(cinema_id)
    .bind(old_key.auditorium_id)
    .bind(old_instant.date())
    .bind(old_instant.time())
    .fetch_optional(&mut *tx)
    .await?;

    let screening_id = screening_id.ok_or(AppError::ShowNotFound)?;

    let ticket_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM ticket WHERE screening_id = $1")
            .bind(screening_id)
            .fetch_one(&mut *tx)
            .await?;
    if ticket_count > 0 {
        return Err(AppError::AlreadyBooked);
    }

    sqlx::query(
        r#"
        UPDATE showtime
        SET auditorium_id = $1, show_date = $2, start_time = $3
        WHERE screening_id = $4
        "#,
    )
    .bind(new.auditorium_id)
    .bind(new_instant.date())
    .bind(new_instant.time())
    .bind(screening_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await.map_err(AppError::Database)?;
    Ok(())
}

/// Remove a show, subject to the same lockout and ticket checks as `update`.
pub async fn delete(pool: &PgPool, cinema_id: i32, key: &ShowKey) -> Result<(), AppError> {
    let instant = parse_show_instant(&key.show_date, &key.start_time)?;
    check_modification_lock(instant, now_local())?;

    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    let screening_id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT screening_id FROM showtime
        WHERE movie_id = $1 AND cinema_id = $2 AND auditorium_id = $3
          AND show_date = $4 AND start_time = $5
        FOR UPDATE
        "#,
    )
    .bind(key.movie_id)
    .bind(cinema_id)
    .bind(key.auditorium_id)
    .bind(instant.date())
    .bind(instant.time())
    .fetch_optional(&mut *tx)
    .await?;

    let screening_id = screening_id.ok_or(AppError::ShowNotFound)?;

    let ticket_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM ticket WHERE screening_id = $1")
            .bind(screening_id)
            .fetch_one(&mut *tx)
            .await?;
    if ticket_count > 0 {
        return Err(AppError::AlreadyBooked);
    }

    sqlx::query("DELETE FROM showtime WHERE screening_id = $1")
        .bind(screening_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await.map_err(AppError::Database)?;
    Ok(())
}

/// Future screenings of one movie across all cinemas.
pub async fn upcoming_for_movie(pool: &PgPool, movie_id: i32) -> sqlx::Result<Vec<UpcomingShowtime>> {
    sqlx::query_as::<_, UpcomingShowtime>(
        r#"
        SELECT
            s.show_date,
            s.start_time,
            c.cinema_id,
            c.cinema_name,
            c.city,
            c.district,
            a.auditorium_id,
            a.auditorium_name,
            a.auditorium_type
        FROM showtime s
        JOIN cinema c ON s.cinema_id = c.cinema_id
        JOIN auditorium a
            ON s.cinema_id = a.cinema_id
            AND s.auditorium_id = a.auditorium_id
        WHERE s.movie_id = $1
          AND (s.show_date + s.start_time) > LOCALTIMESTAMP
        ORDER BY s.show_date, c.city, c.cinema_name, s.start_time
        "#,
    )
    .bind(movie_id)
    .fetch_all(pool)
    .await
}

/// Auditoriums of one cinema, for the scheduling forms.
pub async fn auditoriums(pool: &PgPool, cinema_id: i32) -> sqlx::Result<Vec<Auditorium>> {
    sqlx::query_as::<_, Auditorium>(
        r#"
        SELECT auditorium_id, auditorium_name, auditorium_type, capacity
        FROM auditorium
        WHERE cinema_id = $1
        ORDER BY auditorium_id
        "#,
    )
    .bind(cinema_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn normalize_time_pads_missing_seconds() {
        assert_eq!(normalize_time("14:30"), "14:30:00");
        assert_eq!(normalize_time("14:30:15"), "14:30:15");
    }

    #[test]
    fn parse_show_instant_accepts_both_time_forms() {
        assert_eq!(
            parse_show_instant("2026-05-01", "14:30").unwrap(),
            dt("2026-05-01 14:30:00")
        );
        assert_eq!(
            parse_show_instant("2026-05-01", "14:30:15").unwrap(),
            dt("2026-05-01 14:30:15")
        );
    }

    #[test]
    fn parse_show_instant_rejects_garbage() {
        assert!(matches!(
            parse_show_instant("2026-13-01", "14:30"),
            Err(AppError::InvalidDateTime(_))
        ));
        assert!(matches!(
            parse_show_instant("tomorrow", "noon"),
            Err(AppError::InvalidDateTime(_))
        ));
    }

    #[test]
    fn creation_rejects_past_and_present() {
        let now = dt("2026-05-01 12:00:00");
        assert!(matches!(
            check_creation_lead(now - Duration::seconds(1), now),
            Err(AppError::InPast)
        ));
        // Not strictly after now counts as past.
        assert!(matches!(check_creation_lead(now, now), Err(AppError::InPast)));
    }

    #[test]
    fn creation_requires_one_hour_lead() {
        let now = dt("2026-05-01 12:00:00");
        assert!(matches!(
            check_creation_lead(now + Duration::seconds(CREATE_LEAD_SECONDS - 1), now),
            Err(AppError::TooSoon)
        ));
        // Exactly 3600 seconds ahead is allowed.
        assert!(check_creation_lead(now + Duration::seconds(CREATE_LEAD_SECONDS), now).is_ok());
        assert!(check_creation_lead(now + Duration::hours(5), now).is_ok());
    }

    #[test]
    fn modification_locks_past_shows() {
        let now = dt("2026-05-01 12:00:00");
        assert!(matches!(
            check_modification_lock(now - Duration::minutes(1), now),
            Err(AppError::LockedPast)
        ));
    }

    #[test]
    fn modification_locks_imminent_shows() {
        let now = dt("2026-05-01 12:00:00");
        assert!(matches!(
            check_modification_lock(now + Duration::seconds(MODIFY_LOCKOUT_SECONDS - 1), now),
            Err(AppError::LockedImminent)
        ));
        assert!(
            check_modification_lock(now + Duration::seconds(MODIFY_LOCKOUT_SECONDS), now).is_ok()
        );
    }

    #[test]
    fn edit_lockout_is_stricter_than_creation_lead() {
        let now = dt("2026-05-01 12:00:00");
        let ninety_min_out = now + Duration::minutes(90);
        // A slot 90 minutes out can be created into but not edited.
        assert!(check_creation_lead(ninety_min_out, now).is_ok());
        assert!(matches!(
            check_modification_lock(ninety_min_out, now),
            Err(AppError::LockedImminent)
        ));
    }
}
