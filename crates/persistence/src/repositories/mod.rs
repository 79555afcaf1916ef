//! Postgres implementations of the domain store traits.

pub mod account;
pub mod event;
pub mod organizer_profile;

pub use account::AccountRepository;
pub use event::EventRepository;
pub use organizer_profile::ProfileRepository;
