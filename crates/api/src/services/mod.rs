//! Application services and external integrations.

pub mod admin_bootstrap;
pub mod auth;
pub mod gemini;

pub use auth::AuthService;
pub use gemini::GeminiClient;
