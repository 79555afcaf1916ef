//! Domain models for EventEase.

pub mod account;
pub mod event;
pub mod identity;
pub mod organizer;
pub mod registration;

pub use account::{Account, NewAccount, Session};
pub use event::{Event, EventDetails, RegistrationStatus, StatusChange};
pub use identity::{Identity, Role};
pub use organizer::{CreateOrganizerRequest, OrganizerProfile, RenameOutcome, UpdateOrganizerRequest};
pub use registration::{RegistrantDetails, Registration, RegistrationEdit};
