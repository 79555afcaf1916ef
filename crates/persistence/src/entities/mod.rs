//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod account;
pub mod event;
pub mod organizer_profile;
pub mod registration;

pub use account::{AccountEntity, SessionEntity};
pub use event::EventEntity;
pub use organizer_profile::OrganizerProfileEntity;
pub use registration::RegistrationEntity;
