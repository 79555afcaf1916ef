//! HTTP route handlers.

pub mod admin_organizers;
pub mod assistant;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod health;
pub mod registrations;
