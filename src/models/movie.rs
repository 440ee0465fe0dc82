use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// A movie in the catalog, with its genres comma-joined for display.
/// Read-only reference data from the booking core's point of view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Movie {
    pub movie_id: i32,
    pub title: String,
    pub classification: Option<String>,
    pub duration_min: i32,
    pub rating: Option<f64>,
    pub status: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub language: Option<String>,
    pub image_file: Option<String>,
    pub genres: Option<String>,
}

impl Movie {
    pub async fn list_all(pool: &PgPool) -> sqlx::Result<Vec<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT
                m.movie_id,
                m.title,
                m.classification,
                m.duration_min,
                m.rating,
                m.status,
                m.release_date,
                m.language,
                m.image_file,
                STRING_AGG(mg.genre, ', ' ORDER BY mg.genre) AS genres
            FROM movie m
            LEFT JOIN movie_genre mg ON m.movie_id = mg.movie_id
            GROUP BY
                m.movie_id, m.title, m.classification, m.duration_min, m.rating,
                m.status, m.release_date, m.language, m.image_file
            ORDER BY m.title
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &PgPool, movie_id: i32) -> sqlx::Result<Option<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT
                m.movie_id,
                m.title,
                m.classification,
                m.duration_min,
                m.rating,
                m.status,
                m.release_date,
                m.language,
                m.image_file,
                STRING_AGG(mg.genre, ', ' ORDER BY mg.genre) AS genres
            FROM movie m
            LEFT JOIN movie_genre mg ON m.movie_id = mg.movie_id
            WHERE m.movie_id = $1
            GROUP BY
                m.movie_id, m.title, m.classification, m.duration_min, m.rating,
                m.status, m.release_date, m.language, m.image_file
            "#,
        )
        .bind(movie_id)
        .fetch_optional(pool)
        .await
    }
}
