//! catalog.rs
//!
//! Read-only listings backing the profile-selection screens: which manager
//! identities exist (and which cinema each one runs), and which customers
//! exist (with their membership, if any).

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// One selectable manager identity with the cinema they manage.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ManagerListing {
    pub manager_id: i32,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cinema_id: i32,
    pub cinema_name: String,
    pub city: Option<String>,
    pub district: Option<String>,
    pub address: Option<String>,
}

/// One selectable customer identity with membership details.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomerListing {
    pub customer_id: i32,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub membership_status: String,
    pub card_no: Option<String>,
    pub register_date: Option<NaiveDate>,
}

pub async fn list_managers(pool: &PgPool) -> sqlx::Result<Vec<ManagerListing>> {
    sqlx::query_as::<_, ManagerListing>(
        r#"
        SELECT DISTINCT
            m.manager_id,
            u.username,
            u.email,
            u.phone,
            c.cinema_id,
            c.cinema_name,
            c.city,
            c.district,
            c.address
        FROM manage m
        INNER JOIN staff s ON m.manager_id = s.staff_id
        INNER JOIN user_account u ON s.staff_id = u.user_id
        INNER JOIN cinema c ON s.cinema_id = c.cinema_id
        ORDER BY c.cinema_name, u.username
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Resolve one manager row by id. Used when a manager profile is selected so
/// the cinema binding comes from the catalog, not from the client.
pub async fn find_manager(pool: &PgPool, manager_id: i32) -> sqlx::Result<Option<ManagerListing>> {
    sqlx::query_as::<_, ManagerListing>(
        r#"
        SELECT DISTINCT
            m.manager_id,
            u.username,
            u.email,
            u.phone,
            c.cinema_id,
            c.cinema_name,
            c.city,
            c.district,
            c.address
        FROM manage m
        INNER JOIN staff s ON m.manager_id = s.staff_id
        INNER JOIN user_account u ON s.staff_id = u.user_id
        INNER JOIN cinema c ON s.cinema_id = c.cinema_id
        WHERE m.manager_id = $1
        "#,
    )
    .bind(manager_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_customers(pool: &PgPool) -> sqlx::Result<Vec<CustomerListing>> {
    sqlx::query_as::<_, CustomerListing>(
        r#"
        SELECT
            c.customer_id,
            u.username,
            u.email,
            u.phone,
            u.city,
            u.district,
            COALESCE(m.status, 'No Membership') AS membership_status,
            m.card_no,
            m.register_date
        FROM customer c
        INNER JOIN user_account u ON c.customer_id = u.user_id
        LEFT JOIN membership m ON c.customer_id = m.customer_id
        ORDER BY u.username
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn find_customer(pool: &PgPool, customer_id: i32) -> sqlx::Result<Option<CustomerListing>> {
    sqlx::query_as::<_, CustomerListing>(
        r#"
        SELECT
            c.customer_id,
            u.username,
            u.email,
            u.phone,
            u.city,
            u.district,
            COALESCE(m.status, 'No Membership') AS membership_status,
            m.card_no,
            m.register_date
        FROM customer c
        INNER JOIN user_account u ON c.customer_id = u.user_id
        LEFT JOIN membership m ON c.customer_id = m.customer_id
        WHERE c.customer_id = $1
        "#,
    )
    .bind(customer_id)
    .fetch_optional(pool)
    .await
}
