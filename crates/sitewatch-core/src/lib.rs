//! Core types and trait definitions for the sitewatch health-check engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The probe executor, the store backends and the server all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod check;
pub mod classify;
pub mod error;
pub mod site;
pub mod store;

pub use error::{Error, Result};
