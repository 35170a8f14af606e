//! Clementine Core - Shared types library.
//!
//! This crate provides common types used across all Clementine components:
//! - `storefront` - catalog, cart, and order workflow core
//! - `integration-tests` - cross-service scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no access
//! to the document store. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
