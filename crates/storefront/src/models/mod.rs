//! Domain models persisted in the document store.
//!
//! Field names serialize in the camelCase form the store documents use.
//! Entities created locally carry `id: None` until the store assigns one.

pub mod catalog;
pub mod order;
pub mod user;

pub use catalog::{Brand, CartItem, Category, Feedback, Product};
pub use order::{AddressDelivery, Order};
pub use user::User;
