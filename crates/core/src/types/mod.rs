//! Core types for Tiffin.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod order;
pub mod payment;
pub mod price;
pub mod status;

pub use cart::{Cart, CartError, CartItem};
pub use id::*;
pub use order::{Order, OrderItem};
pub use payment::{PaymentCaptureResult, PaymentIntent};
pub use price::{Price, PriceError};
pub use status::*;
