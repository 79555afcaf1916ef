//! Translation of database failures into domain errors.

use domain::error::CLUB_NAME_TAKEN;
use domain::DomainError;

pub(crate) const EMAIL_TAKEN: &str = "An account with this email already exists.";

/// Maps a sqlx error onto the domain taxonomy.
///
/// Unique violations become `Conflict` with a message chosen by constraint,
/// foreign key violations become `NotFound`, everything else is `Storage`.
pub fn storage_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            Some("23505") => {
                let message = match db_err.constraint() {
                    Some("organizer_profiles_club_name_key") => CLUB_NAME_TAKEN,
                    Some("accounts_email_key") => EMAIL_TAKEN,
                    _ => "Resource already exists",
                };
                return DomainError::Conflict(message.to_string());
            }
            Some("23503") => return DomainError::not_found("Referenced resource"),
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    DomainError::Storage(err.to_string())
}
