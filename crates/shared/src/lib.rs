//! Shared utilities for the EventEase backend.
//!
//! - Session token hashing
//! - Password hashing and strength rules (Argon2id)
//! - JWT issue and validation
//! - Field validators used by request models

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
