mod category;
pub mod document;
mod drone;
mod kind;
mod menu_item;
mod order;
mod restaurant;
mod user;

pub use category::Category;
pub use document::{Document, DocumentError, Fields, Translations};
pub use drone::Drone;
pub use kind::{Entity, EntityKind};
pub use menu_item::MenuItem;
pub use order::{Order, OrderLine};
pub use restaurant::Restaurant;
pub use user::User;
