mod geo;
mod menu_item;
mod secret;

pub mod helpers;

pub use geo::{Coordinate, CoordinateError};
pub use menu_item::MenuItemRef;
pub use secret::Secret;
