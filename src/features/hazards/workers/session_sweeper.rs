use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::features::hazards::services::HazardSessionService;
use crate::shared::constants::SESSION_SWEEP_INTERVAL_SECS;

/// Background worker that tears down hazard sessions left idle, such as those
/// of users whose tokens expired without signing out
pub struct SessionSweeper {
    sessions: Arc<HazardSessionService>,
    idle_timeout: Duration,
}

impl SessionSweeper {
    pub fn new(sessions: Arc<HazardSessionService>, idle_timeout: Duration) -> Self {
        Self {
            sessions,
            idle_timeout,
        }
    }

    /// Run the sweeper in a background loop
    pub async fn run(&self) {
        tracing::info!(
            "Starting hazard session sweeper (idle timeout {}s)",
            self.idle_timeout.as_secs()
        );

        let mut interval = interval(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS));

        loop {
            interval.tick().await;
            self.sweep().await;
        }
    }

    async fn sweep(&self) -> usize {
        let evicted = self.sessions.evict_idle(self.idle_timeout).await;
        if evicted > 0 {
            tracing::info!("Evicted {} idle hazard session(s)", evicted);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::{Role, SessionUser};
    use crate::features::hazards::services::orchestrator::testing::RecordingFeatureStore;
    use crate::features::map::services::layer_catalog::testing::sample_catalog;

    fn user(id: &str) -> SessionUser {
        SessionUser {
            id: id.to_string(),
            username: format!("user_{}", id),
            email: None,
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_sweep_removes_only_idle_sessions() {
        let sessions = Arc::new(HazardSessionService::new(
            sample_catalog().await,
            Arc::new(RecordingFeatureStore::default()),
        ));
        sessions.session_for(&user("a"));

        let patient = SessionSweeper::new(Arc::clone(&sessions), Duration::from_secs(3600));
        assert_eq!(patient.sweep().await, 0);
        assert!(sessions.get("a").is_some());

        let eager = SessionSweeper::new(Arc::clone(&sessions), Duration::ZERO);
        assert_eq!(eager.sweep().await, 1);
        assert!(sessions.get("a").is_none());
    }
}
