use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::{NewReview, Review, ReviewId};

pub async fn insert_review(review: NewReview, conn: &mut SqliteConnection) -> Result<Review, sqlx::Error> {
    let review = sqlx::query_as(
        r#"
            INSERT INTO reviews (id, catalog_item_id, author, text, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(ReviewId::random())
    .bind(review.catalog_item_id)
    .bind(review.author)
    .bind(review.text)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(review)
}

pub async fn fetch_reviews(catalog_item_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Review>, sqlx::Error> {
    let reviews = sqlx::query_as("SELECT * FROM reviews WHERE catalog_item_id = $1 ORDER BY created_at, rowid")
        .bind(catalog_item_id)
        .fetch_all(conn)
        .await?;
    Ok(reviews)
}
