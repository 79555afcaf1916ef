//! Rules and workflows over the event models.

pub mod access_policy;
pub mod assistant;
pub mod catalog;
pub mod export;
pub mod ledger;
pub mod projections;
pub mod provisioning;
pub mod registry;

pub use access_policy::{
    allows, authorize, edit_affordance, is_full, registration_affordance, Action, EditAffordance,
    Ownership, RegistrationAffordance,
};
pub use assistant::{
    AssistantService, GenerationOptions, MockTextGenerator, TextGenerationError, TextGenerator,
};
pub use catalog::EventCatalog;
pub use export::{export_file_name, registrations_to_csv};
pub use ledger::RegistrationLedger;
pub use projections::{group_by_club, split_mine_and_others, summarize, ClubEvents, EventSummary};
pub use provisioning::{IdentityProvider, OrganizerAdministration};
pub use registry::EventRegistry;
