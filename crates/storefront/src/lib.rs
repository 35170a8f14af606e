//! Clementine Storefront - catalog, cart, and order workflow core.
//!
//! This crate is the headless core a storefront UI drives:
//!
//! - [`cart`] - durable per-session shopping cart with eager persistence
//! - [`services::catalog`] - product/category/brand reads (cached) and mutations
//! - [`services::orders`] - order placement and status lifecycle
//! - [`services::auth`] - thin client for the external authentication service
//! - [`docstore`] - hosted document store client (REST and in-memory)
//! - [`storage`] - local key-value persistence for the cart and session token
//! - [`pricing`] - fixed shipping and tax policy for checkout quotes
//!
//! # Architecture
//!
//! The remote document store is the source of truth for catalog and orders;
//! the cart lives on the device and is persisted after every mutation. All
//! state holders are explicitly constructed and injected via [`state::AppState`],
//! never ambient singletons.
//!
//! Remote calls are async and fallible. Service methods return
//! `Result<T, AppError>`; [`error::Outcome`] converts that into the uniform
//! `{success, message, data}` shape the UI branches on.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod docstore;
pub mod error;
pub mod models;
pub mod pricing;
pub mod services;
pub mod state;
pub mod storage;
pub mod telemetry;

pub use cart::Cart;
pub use config::StoreConfig;
pub use error::{AppError, Outcome, Result};
pub use state::AppState;
