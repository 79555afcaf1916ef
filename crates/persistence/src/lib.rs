//! Persistence layer for EventEase.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Postgres and in-memory implementations of the domain stores

pub mod db;
pub mod entities;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod repositories;

pub use memory::{MemoryAccountStore, MemoryEventStore, MemoryProfileStore};
pub use repositories::{AccountRepository, EventRepository, ProfileRepository};
