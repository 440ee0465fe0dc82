pub mod auth;
pub mod customer;
pub mod manager;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(manager::routes())
        .merge(customer::routes())
}
