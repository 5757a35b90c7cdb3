use crate::{
    db::traits::StoreError,
    db_types::{NewReview, Review},
};

#[allow(async_fn_in_trait)]
pub trait ReviewManagement {
    async fn insert_review(&self, review: NewReview) -> Result<Review, StoreError>;

    /// Reviews for a catalog item, oldest first.
    async fn fetch_reviews(&self, catalog_item_id: &str) -> Result<Vec<Review>, StoreError>;
}
