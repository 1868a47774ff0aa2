//! `studiodesk-core` — shared primitives for the studiodesk workspace.
//!
//! This crate holds the error model and identifiers that every other crate
//! agrees on. No infrastructure concerns live here.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
