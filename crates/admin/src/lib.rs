//! Tiffin Admin library.
//!
//! This crate provides the staff panel functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Security
//!
//! Admin sessions hold staff bearer tokens for the backend's `/admin`
//! endpoints. Only deploy behind the staff network; there is no public
//! surface here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod canteen;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
