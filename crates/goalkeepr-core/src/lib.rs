//! Core types and trait definitions for Goalkeepr.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store backend and the web layer both depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod branding;
pub mod criterion;
pub mod error;
pub mod goal;
pub mod sanitize;
pub mod share;
pub mod store;
pub mod user;
pub mod validate;

pub use error::{Error, Result};
