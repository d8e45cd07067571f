//! Policy service client for portcullis.
//!
//! The policy service is a black box: it receives a bearer token plus the
//! permissions a handler needs and answers with an access decision and the
//! full set of permissions granted to that token. This crate owns the wire
//! contract and the gRPC client; everything above it talks to the
//! [`PolicyService`] trait so tests can substitute a fake.

mod client;
mod error;
mod types;

pub use client::{PolicyClient, PolicyService};
pub use error::PolicyError;
pub use types::{CheckReply, CheckRequest};
