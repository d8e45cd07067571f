//! Core types and utilities shared by the portcullis crates.
//!
//! This crate provides the `Result` alias used across the workspace and the
//! identifier types that more than one layer needs to agree on.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::LoginState;
