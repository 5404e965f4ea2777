//! Tiffin Core - Shared types library.
//!
//! This crate provides common types used across all Tiffin components:
//! - `storefront` - User-facing ordering site (menu, cart, checkout)
//! - `admin` - Staff panel for order fulfillment
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The
//! canteen backend and the payment gateway are external services; the
//! types here model what crosses those boundaries plus the order status
//! state machine both binaries must agree on.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices in rupees/paise, order status, roles,
//!   carts, orders, and the ephemeral payment handshake types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
