//! booking.rs
//!
//! The seat-selection → discount-selection → price-review → confirmation
//! pipeline. No stage stores draft state server-side: every stage rebuilds
//! the booking from request-carried parameters and revalidates from scratch,
//! and the review total shown to the client is never trusted — confirmation
//! recomputes everything independently.
//!
//! The durable commit is one transaction: ticket row, one seat_booking row
//! per seat, one apply_discount row per valid discount. A unique
//! (screening_id, seat_number) constraint makes the seat race lose at commit
//! time rather than at the pre-check.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::show;

/// Flat two-tier tariff.
pub const STANDARD_SEAT_PRICE: i64 = 80_000;
pub const VIP_SEAT_PRICE: i64 = 100_000;

pub fn seat_price(seat_type: &str) -> i64 {
    if seat_type == "VIP" {
        VIP_SEAT_PRICE
    } else {
        STANDARD_SEAT_PRICE
    }
}

// --- Selection normalization (pure) ---

/// Collapse a seat selection into a sorted, de-duplicated set of seat
/// numbers. Accepts both repeated form fields and comma-joined values.
pub fn normalize_seat_selection(raw: &[String]) -> Result<Vec<i32>, AppError> {
    let mut set = BTreeSet::new();
    for field in raw {
        for part in field.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let number: i32 = part.parse().map_err(|_| AppError::InvalidSeatSelection)?;
            set.insert(number);
        }
    }
    Ok(set.into_iter().collect())
}

pub fn normalize_discount_selection(raw: &[i32]) -> Vec<i32> {
    let set: BTreeSet<i32> = raw.iter().copied().collect();
    set.into_iter().collect()
}

/// A booking with no seats is refused at pricing and at confirmation alike.
pub fn ensure_seats_selected(seat_numbers: &[i32]) -> Result<(), AppError> {
    if seat_numbers.is_empty() {
        return Err(AppError::NoSeatsSelected);
    }
    Ok(())
}

/// Every requested seat number must exist in the auditorium's layout.
/// Without this, a selection of only unknown seats would price to zero and
/// commit as a seatless ticket.
pub fn ensure_seats_known(
    requested: &[i32],
    seat_rows: &[(i32, String)],
) -> Result<(), AppError> {
    if seat_rows.len() != requested.len() {
        return Err(AppError::InvalidSeatSelection);
    }
    Ok(())
}

// --- Pricing (pure) ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatCharge {
    pub seat_number: i32,
    pub seat_type: String,
    pub price: i64,
}

/// A discount allocation as read from storage, before the quantity gate.
#[derive(Debug, Clone)]
pub struct DiscountCandidate {
    pub discount_id: i32,
    pub code: String,
    pub discount_type: String,
    pub value: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountCredit {
    pub discount_id: i32,
    pub code: String,
    pub discount_type: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub seats: Vec<SeatCharge>,
    pub discounts: Vec<DiscountCredit>,
    pub subtotal: i64,
    pub discount_total: i64,
    pub final_price: i64,
}

pub fn final_price(subtotal: i64, discount_total: i64) -> i64 {
    (subtotal - discount_total).max(0)
}

/// Price a seat set against a discount selection. Allocations with zero
/// remaining quantity are listed to the customer but excluded here.
pub fn build_quote(seat_rows: &[(i32, String)], candidates: &[DiscountCandidate]) -> PriceQuote {
    let seats: Vec<SeatCharge> = seat_rows
        .iter()
        .map(|(number, seat_type)| SeatCharge {
            seat_number: *number,
            seat_type: seat_type.clone(),
            price: seat_price(seat_type),
        })
        .collect();
    let subtotal: i64 = seats.iter().map(|s| s.price).sum();

    let discounts: Vec<DiscountCredit> = candidates
        .iter()
        .filter(|c| c.quantity > 0)
        .map(|c| DiscountCredit {
            discount_id: c.discount_id,
            code: c.code.clone(),
            discount_type: c.discount_type.clone(),
            value: c.value,
        })
        .collect();
    let discount_total: i64 = discounts.iter().map(|d| d.value).sum();

    PriceQuote {
        seats,
        discounts,
        subtotal,
        discount_total,
        final_price: final_price(subtotal, discount_total),
    }
}

// --- Stage 1: seat layout and availability ---

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeatInfo {
    pub seat_number: i32,
    pub seat_type: String,
}

/// Full seat layout of one auditorium. Immutable reference data.
pub async fn list_seats(
    pool: &PgPool,
    cinema_id: i32,
    auditorium_id: i32,
) -> sqlx::Result<Vec<SeatInfo>> {
    sqlx::query_as::<_, SeatInfo>(
        r#"
        SELECT seat_number, seat_type
        FROM seat
        WHERE cinema_id = $1 AND auditorium_id = $2
        ORDER BY seat_number
        "#,
    )
    .bind(cinema_id)
    .bind(auditorium_id)
    .fetch_all(pool)
    .await
}

async fn resolve_screening<'e, E: PgExecutor<'e>>(
    exec: E,
    cinema_id: i32,
    auditorium_id: i32,
    show_date: NaiveDate,
    start_time: NaiveTime,
    lock: bool,
) -> sqlx::Result<Option<i64>> {
    let sql = if lock {
        // Share lock keeps a concurrent delete/edit of the show out while
        // still allowing parallel bookings of different seats.
        "SELECT screening_id FROM showtime
         WHERE cinema_id = $1 AND auditorium_id = $2 AND show_date = $3 AND start_time = $4
         FOR SHARE"
    } else {
        "SELECT screening_id FROM showtime
         WHERE cinema_id = $1 AND auditorium_id = $2 AND show_date = $3 AND start_time = $4"
    };
    sqlx::query_scalar(sql)
        .bind(cinema_id)
        .bind(auditorium_id)
        .bind(show_date)
        .bind(start_time)
        .fetch_optional(exec)
        .await
}

/// Seats already booked for one screening, empty if the screening does not
/// exist (a missing show is not an error at this stage).
pub async fn list_booked_seats(
    pool: &PgPool,
    cinema_id: i32,
    auditorium_id: i32,
    show_date: &str,
    start_time: &str,
) -> Result<Vec<i32>, AppError> {
    let instant = show::parse_show_instant(show_date, start_time)?;
    let screening_id = resolve_screening(
        pool,
        cinema_id,
        auditorium_id,
        instant.date(),
        instant.time(),
        false,
    )
    .await?;

    let Some(screening_id) = screening_id else {
        return Ok(Vec::new());
    };

    let seats = sqlx::query_scalar::<_, i32>(
        "SELECT seat_number FROM seat_booking WHERE screening_id = $1 ORDER BY seat_number",
    )
    .bind(screening_id)
    .fetch_all(pool)
    .await?;
    Ok(seats)
}

// --- Stage 2: discount offer ---

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OwnedDiscount {
    pub discount_id: i32,
    pub discount_code: String,
    pub discount_type: String,
    pub discount_value: i64,
    pub expiry_date: Option<NaiveDate>,
    pub quantity: i32,
}

/// All discount allocations the customer owns. Zero-quantity allocations are
/// listed too; the quantity gate applies at pricing time, not here.
pub async fn list_discounts(pool: &PgPool, customer_id: i32) -> sqlx::Result<Vec<OwnedDiscount>> {
    sqlx::query_as::<_, OwnedDiscount>(
        r#"
        SELECT d.discount_id, d.discount_code, d.discount_type, d.discount_value,
               d.expiry_date, od.quantity
        FROM own_discount od
        JOIN discount d ON d.discount_id = od.discount_id
        WHERE od.customer_id = $1
        ORDER BY d.discount_code
        "#,
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await
}

// --- Stage 3/4 shared fetches ---

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}

async fn fetch_selected_seats<'e, E: PgExecutor<'e>>(
    exec: E,
    cinema_id: i32,
    auditorium_id: i32,
    seat_numbers: &[i32],
) -> sqlx::Result<Vec<(i32, String)>> {
    // One placeholder per element, never interpolated literals.
    let placeholders: Vec<String> = (0..seat_numbers.len())
        .map(|i| format!("${}", i + 3))
        .collect();
    let sql = format!(
        "SELECT seat_number, seat_type FROM seat
         WHERE cinema_id = $1 AND auditorium_id = $2 AND seat_number IN ({})
         ORDER BY seat_number",
        placeholders.join(",")
    );

    let mut query = sqlx::query_as::<_, (i32, String)>(&sql)
        .bind(cinema_id)
        .bind(auditorium_id);
    for seat in seat_numbers {
        query = query.bind(seat);
    }
    query.fetch_all(exec).await
}

async fn fetch_discount_candidate<'e, E: PgExecutor<'e>>(
    exec: E,
    customer_id: i32,
    discount_id: i32,
) -> sqlx::Result<Option<DiscountCandidate>> {
    let row: Option<(String, String, i64, i32)> = sqlx::query_as(
        r#"
        SELECT d.discount_code, d.discount_type, d.discount_value, od.quantity
        FROM own_discount od
        JOIN discount d ON d.discount_id = od.discount_id
        WHERE od.customer_id = $1 AND od.discount_id = $2
        "#,
    )
    .bind(customer_id)
    .bind(discount_id)
    .fetch_optional(exec)
    .await?;

    Ok(row.map(|(code, discount_type, value, quantity)| DiscountCandidate {
        discount_id,
        code,
        discount_type,
        value,
        quantity,
    }))
}

// --- Stage 3: price review (no mutation) ---

pub async fn quote(
    pool: &PgPool,
    customer_id: i32,
    cinema_id: i32,
    auditorium_id: i32,
    seat_numbers: &[i32],
    discount_ids: &[i32],
) -> Result<PriceQuote, AppError> {
    ensure_seats_selected(seat_numbers)?;

    let seat_rows = fetch_selected_seats(pool, cinema_id, auditorium_id, seat_numbers).await?;
    ensure_seats_known(seat_numbers, &seat_rows)?;

    let mut candidates = Vec::new();
    for discount_id in normalize_discount_selection(discount_ids) {
        if let Some(candidate) = fetch_discount_candidate(pool, customer_id, discount_id).await? {
            candidates.push(candidate);
        }
    }

    Ok(build_quote(&seat_rows, &candidates))
}

// --- Stage 4: confirmation / commit ---

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmBooking {
    pub cinema_id: i32,
    pub auditorium_id: i32,
    pub show_date: String,
    pub start_time: String,
    pub selected_seats: Vec<String>,
    #[serde(default)]
    pub discount_ids: Vec<i32>,
    /// Client-supplied token making re-submission of the same confirmation
    /// return the already-created ticket instead of booking twice.
    pub idempotency_key: Option<Uuid>,
}

/// The single atomic-intent operation of the pipeline. Recomputes seat and
/// discount pricing from scratch, resolves the screening, and commits the
/// ticket, its seat bookings, and its discount applications in one
/// transaction.
pub async fn confirm(pool: &PgPool, customer_id: i32, req: &ConfirmBooking) -> Result<i64, AppError> {
    let seat_numbers = normalize_seat_selection(&req.selected_seats)?;
    ensure_seats_selected(&seat_numbers)?;
    let instant = show::parse_show_instant(&req.show_date, &req.start_time)?;

    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    if let Some(key) = req.idempotency_key {
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT ticket_id FROM ticket WHERE idempotency_key = $1 AND customer_id = $2",
        )
        .bind(key)
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(ticket_id) = existing {
            return Ok(ticket_id);
        }
    }

    let screening_id = resolve_screening(
        &mut *tx,
        req.cinema_id,
        req.auditorium_id,
        instant.date(),
        instant.time(),
        true,
    )
    .await?
    .ok_or(AppError::ShowNotFound)?;

    let seat_rows =
        fetch_selected_seats(&mut *tx, req.cinema_id, req.auditorium_id, &seat_numbers).await?;
    ensure_seats_known(&seat_numbers, &seat_rows)?;

    let mut candidates = Vec::new();
    for discount_id in normalize_discount_selection(&req.discount_ids) {
        if let Some(candidate) =
            fetch_discount_candidate(&mut *tx, customer_id, discount_id).await?
        {
            candidates.push(candidate);
        }
    }

    let quote = build_quote(&seat_rows, &candidates);

    let inserted: Result<i64, sqlx::Error> = sqlx::query_scalar(
        r#"
        INSERT INTO ticket (customer_id, screening_id, price_total, seat_count, idempotency_key)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING ticket_id
        "#,
    )
    .bind(customer_id)
    .bind(screening_id)
    .bind(quote.final_price)
    .bind(quote.seats.len() as i32)
    .bind(req.idempotency_key)
    .fetch_one(&mut *tx)
    .await;

    let ticket_id: i64 = match inserted {
        Ok(id) => id,
        // Two concurrent submissions with the same key can both miss the
        // pre-read; the loser hits the unique index on idempotency_key and
        // returns the winner's ticket instead of a storage error.
        Err(e) if req.idempotency_key.is_some() && is_unique_violation(&e) => {
            let _ = tx.rollback().await;
            return sqlx::query_scalar(
                "SELECT ticket_id FROM ticket WHERE idempotency_key = $1 AND customer_id = $2",
            )
            .bind(req.idempotency_key)
            .bind(customer_id)
            .fetch_optional(pool)
            .await?
            .ok_or(AppError::TicketNotFound);
        }
        Err(e) => return Err(AppError::Database(e)),
    };

    for seat in &quote.seats {
        sqlx::query(
            r#"
            INSERT INTO seat_booking (ticket_id, screening_id, seat_number, cinema_id, auditorium_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(ticket_id)
        .bind(screening_id)
        .bind(seat.seat_number)
        .bind(req.cinema_id)
        .bind(req.auditorium_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // The (screening, seat) unique constraint is the authoritative
            // double-booking check; the availability screen is advisory.
            if is_unique_violation(&e) {
                AppError::SeatTaken
            } else {
                AppError::Database(e)
            }
        })?;
    }

    // The allocation quantity is deliberately left unchanged when a discount
    // is applied; only the application record is written.
    for credit in &quote.discounts {
        sqlx::query("INSERT INTO apply_discount (discount_id, ticket_id) VALUES ($1, $2)")
            .bind(credit.discount_id)
            .bind(ticket_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await.map_err(AppError::Database)?;
    Ok(ticket_id)
}

// --- Post-commit reads ---

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketHeader {
    pub ticket_id: i64,
    pub price_total: i64,
    pub seat_count: i32,
    pub show_date: NaiveDate,
    pub start_time: NaiveTime,
    pub cinema_name: String,
    pub auditorium_name: String,
    pub movie_title: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppliedDiscount {
    pub discount_code: String,
    pub discount_value: i64,
    pub discount_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub ticket: TicketHeader,
    pub seats: Vec<i32>,
    pub discounts: Vec<AppliedDiscount>,
    pub discount_total: i64,
}

/// Owner-scoped ticket fetch. A ticket belonging to a different customer is
/// indistinguishable from a missing one.
pub async fn booking_confirmation(
    pool: &PgPool,
    ticket_id: i64,
    customer_id: i32,
) -> Result<BookingConfirmation, AppError> {
    let ticket = sqlx::query_as::<_, TicketHeader>(
        r#"
        SELECT
            t.ticket_id,
            t.price_total,
            t.seat_count,
            s.show_date,
            s.start_time,
            c.cinema_name,
            a.auditorium_name,
            m.title AS movie_title
        FROM ticket t
        JOIN showtime s ON t.screening_id = s.screening_id
        JOIN cinema c ON s.cinema_id = c.cinema_id
        JOIN auditorium a ON s.cinema_id = a.cinema_id AND s.auditorium_id = a.auditorium_id
        JOIN movie m ON s.movie_id = m.movie_id
        WHERE t.ticket_id = $1 AND t.customer_id = $2
        "#,
    )
    .bind(ticket_id)
    .bind(customer_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::TicketNotFound)?;

    let seats = sqlx::query_scalar::<_, i32>(
        "SELECT seat_number FROM seat_booking WHERE ticket_id = $1 ORDER BY seat_number",
    )
    .bind(ticket_id)
    .fetch_all(pool)
    .await?;

    let discounts = sqlx::query_as::<_, AppliedDiscount>(
        r#"
        SELECT d.discount_code, d.discount_value, d.discount_type
        FROM apply_discount ad
        JOIN discount d ON ad.discount_id = d.discount_id
        WHERE ad.ticket_id = $1
        ORDER BY d.discount_code
        "#,
    )
    .bind(ticket_id)
    .fetch_all(pool)
    .await?;

    let discount_total = discounts.iter().map(|d| d.discount_value).sum();

    Ok(BookingConfirmation {
        ticket,
        seats,
        discounts,
        discount_total,
    })
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketSummary {
    pub ticket_id: i64,
    pub movie_title: String,
    pub cinema_name: String,
    pub auditorium_name: String,
    pub auditorium_type: Option<String>,
    pub auditorium_id: i32,
    pub show_date: NaiveDate,
    pub start_time: NaiveTime,
    pub price_total: i64,
    pub seats: String,
}

/// The customer's purchase history, newest first.
pub async fn my_tickets(pool: &PgPool, customer_id: i32) -> sqlx::Result<Vec<TicketSummary>> {
    sqlx::query_as::<_, TicketSummary>(
        r#"
        SELECT
            t.ticket_id,
            m.title AS movie_title,
            c.cinema_name,
            a.auditorium_name,
            a.auditorium_type,
            s.auditorium_id,
            s.show_date,
            s.start_time,
            t.price_total,
            COALESCE(STRING_AGG(sb.seat_number::TEXT, ', ' ORDER BY sb.seat_number), '') AS seats
        FROM ticket t
        JOIN showtime s ON t.screening_id = s.screening_id
        JOIN movie m ON s.movie_id = m.movie_id
        JOIN cinema c ON s.cinema_id = c.cinema_id
        JOIN auditorium a
            ON a.cinema_id = s.cinema_id
            AND a.auditorium_id = s.auditorium_id
        LEFT JOIN seat_booking sb ON t.ticket_id = sb.ticket_id
        WHERE t.customer_id = $1
        GROUP BY
            t.ticket_id, m.title, c.cinema_name, a.auditorium_name, a.auditorium_type,
            s.auditorium_id, s.show_date, s.start_time, t.price_total
        ORDER BY t.ticket_id DESC
        "#,
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candidate(id: i32, value: i64, quantity: i32) -> DiscountCandidate {
        DiscountCandidate {
            discount_id: id,
            code: format!("CODE{}", id),
            discount_type: "Fixed".to_string(),
            value,
            quantity,
        }
    }

    #[test]
    fn seat_selection_accepts_comma_joined_form() {
        let raw = vec!["1,2,3".to_string()];
        assert_eq!(normalize_seat_selection(&raw).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn seat_selection_accepts_repeated_fields_and_dedupes() {
        let raw = vec!["2".to_string(), "1".to_string(), "2".to_string()];
        assert_eq!(normalize_seat_selection(&raw).unwrap(), vec![1, 2]);
    }

    #[test]
    fn seat_selection_handles_mixed_encodings() {
        let raw = vec!["3, 1".to_string(), "2".to_string(), "".to_string()];
        assert_eq!(normalize_seat_selection(&raw).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn seat_selection_rejects_non_numeric_parts() {
        let raw = vec!["1,A2".to_string()];
        assert!(matches!(
            normalize_seat_selection(&raw),
            Err(AppError::InvalidSeatSelection)
        ));
    }

    #[test]
    fn empty_selection_normalizes_to_empty_set() {
        assert!(normalize_seat_selection(&[]).unwrap().is_empty());
        assert!(normalize_seat_selection(&["".to_string()]).unwrap().is_empty());
    }

    #[test]
    fn empty_seat_set_is_refused() {
        assert!(matches!(
            ensure_seats_selected(&[]),
            Err(AppError::NoSeatsSelected)
        ));
        assert!(ensure_seats_selected(&[1]).is_ok());
    }

    #[test]
    fn blank_form_submission_is_refused_end_to_end() {
        // An all-blank selection survives normalization as an empty set and
        // must then fail the selection gate, at review and at confirmation.
        let seats = normalize_seat_selection(&["".to_string(), " , ".to_string()]).unwrap();
        assert!(matches!(
            ensure_seats_selected(&seats),
            Err(AppError::NoSeatsSelected)
        ));
    }

    #[test]
    fn selection_of_only_unknown_seats_is_refused() {
        // Seat 999 is not in the layout, so nothing comes back from the seat
        // table; booking must fail rather than commit a zero-seat ticket.
        let requested = vec![999];
        let seat_rows: Vec<(i32, String)> = vec![];
        assert!(matches!(
            ensure_seats_known(&requested, &seat_rows),
            Err(AppError::InvalidSeatSelection)
        ));
    }

    #[test]
    fn selection_with_any_unknown_seat_is_refused() {
        let requested = vec![1, 999];
        let seat_rows = vec![(1, "Standard".to_string())];
        assert!(matches!(
            ensure_seats_known(&requested, &seat_rows),
            Err(AppError::InvalidSeatSelection)
        ));
        let all_known = vec![(1, "Standard".to_string()), (999, "VIP".to_string())];
        assert!(ensure_seats_known(&requested, &all_known).is_ok());
    }

    #[test]
    fn only_storage_level_unique_violations_are_remapped() {
        // Non-constraint errors must keep propagating as storage failures.
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
    }

    #[test]
    fn tariff_is_two_tier() {
        assert_eq!(seat_price("VIP"), 100_000);
        assert_eq!(seat_price("Standard"), 80_000);
    }

    #[test]
    fn quote_prices_standard_plus_vip() {
        let seats = vec![(1, "Standard".to_string()), (2, "VIP".to_string())];
        let q = build_quote(&seats, &[]);
        assert_eq!(q.subtotal, 180_000);
        assert_eq!(q.discount_total, 0);
        assert_eq!(q.final_price, 180_000);
    }

    #[test]
    fn quote_applies_discount_with_positive_quantity() {
        let seats = vec![(1, "Standard".to_string()), (2, "VIP".to_string())];
        let q = build_quote(&seats, &[candidate(5, 20_000, 1)]);
        assert_eq!(q.discount_total, 20_000);
        assert_eq!(q.final_price, 160_000);
    }

    #[test]
    fn quote_excludes_exhausted_allocations() {
        let seats = vec![(1, "Standard".to_string()), (2, "VIP".to_string())];
        let q = build_quote(&seats, &[candidate(5, 20_000, 0)]);
        assert!(q.discounts.is_empty());
        assert_eq!(q.discount_total, 0);
        assert_eq!(q.final_price, 180_000);
    }

    #[test]
    fn quote_never_goes_negative() {
        let seats = vec![(1, "Standard".to_string())];
        let q = build_quote(&seats, &[candidate(5, 500_000, 3)]);
        assert_eq!(q.final_price, 0);
    }

    #[test]
    fn quoting_twice_is_idempotent() {
        let seats = vec![(4, "VIP".to_string()), (7, "Standard".to_string())];
        let discounts = vec![candidate(1, 10_000, 2), candidate(2, 5_000, 0)];
        assert_eq!(build_quote(&seats, &discounts), build_quote(&seats, &discounts));
    }

    proptest! {
        #[test]
        fn final_price_is_clamped_difference(subtotal in 0i64..10_000_000, discount in 0i64..10_000_000) {
            let p = final_price(subtotal, discount);
            prop_assert!(p >= 0);
            prop_assert_eq!(p, std::cmp::max(subtotal - discount, 0));
        }
    }
}
