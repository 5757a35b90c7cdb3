use std::fmt::Display;

use crate::db_types::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Carts,
    Orders,
    Favorites,
    Reviews,
    Users,
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Carts => write!(f, "carts"),
            Collection::Orders => write!(f, "orders"),
            Collection::Favorites => write!(f, "favorites"),
            Collection::Reviews => write!(f, "reviews"),
            Collection::Users => write!(f, "users"),
        }
    }
}

/// Notification that a document was written. Backends publish one of these after every committed write, and live
/// queries use them to decide whether they need to re-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub collection: Collection,
    /// The user whose data changed, if the collection is partitioned by user
    pub owner: Option<UserId>,
    pub document_id: String,
}

impl StoreChange {
    pub fn new<S: Into<String>>(collection: Collection, owner: Option<UserId>, document_id: S) -> Self {
        Self { collection, owner, document_id: document_id.into() }
    }

    /// True if this change can affect the result of a query over `collection` restricted to `owner`.
    pub fn affects(&self, collection: Collection, owner: &UserId) -> bool {
        self.collection == collection && self.owner.as_ref().map(|o| o == owner).unwrap_or(true)
    }

    pub fn affects_document(&self, collection: Collection, document_id: &str) -> bool {
        self.collection == collection && self.document_id == document_id
    }
}
