use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::ReviewManagement,
    db_types::{NewReview, Review},
    feast_api::{errors::FeastApiError, session::Session},
};

pub struct ReviewsApi<B> {
    db: B,
    session: Session,
}

impl<B> Debug for ReviewsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReviewsApi ({})", self.session.user_id)
    }
}

impl<B> ReviewsApi<B> {
    pub fn new(db: B, session: Session) -> Self {
        Self { db, session }
    }
}

impl<B> ReviewsApi<B>
where B: ReviewManagement
{
    /// Publishes a review under the session's display name ("Anonymous" without one) and returns the item's reviews,
    /// including the new one.
    pub async fn submit(&self, catalog_item_id: &str, text: &str) -> Result<Vec<Review>, FeastApiError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FeastApiError::InvalidInput("A review needs some text".to_string()));
        }
        let review = NewReview {
            catalog_item_id: catalog_item_id.to_string(),
            author: self.session.author_name(),
            text: text.to_string(),
        };
        let review = self.db.insert_review(review).await?;
        debug!("📝️ {} reviewed {catalog_item_id}", review.author);
        self.list(catalog_item_id).await
    }

    pub async fn list(&self, catalog_item_id: &str) -> Result<Vec<Review>, FeastApiError> {
        Ok(self.db.fetch_reviews(catalog_item_id).await?)
    }
}
