//! Domain layer for EventEase.
//!
//! This crate contains:
//! - Event, registration, identity and organizer models
//! - The catalog, ledger and access policy rules
//! - Storage and collaborator traits implemented by the outer crates

pub mod error;
pub mod models;
pub mod services;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::DomainError;
