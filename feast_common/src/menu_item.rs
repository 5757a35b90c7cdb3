use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A reference to an entry in the external catalog. Line items, order copies and favorites all carry one of these;
/// it is never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MenuItemRef {
    pub id: String,
    pub name: String,
}

impl MenuItemRef {
    pub fn new<S1: Into<String>, S2: Into<String>>(id: S1, name: S2) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

impl Display for MenuItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}
