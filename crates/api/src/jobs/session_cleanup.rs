//! Removes expired sessions.

use std::time::Duration;

use crate::services::AuthService;

use super::scheduler::Job;

pub struct SessionCleanupJob {
    auth: AuthService,
}

impl SessionCleanupJob {
    pub fn new(auth: AuthService) -> Self {
        Self { auth }
    }
}

#[async_trait::async_trait]
impl Job for SessionCleanupJob {
    fn name(&self) -> &'static str {
        "session_cleanup"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(3600)
    }

    async fn execute(&self) -> Result<(), String> {
        let removed = self
            .auth
            .purge_expired_sessions()
            .await
            .map_err(|e| e.to_string())?;
        if removed > 0 {
            tracing::info!(removed = removed, "Expired sessions removed");
        }
        Ok(())
    }
}
