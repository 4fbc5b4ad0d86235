use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::SessionStore;
use crate::log_info;

const ENABLE_LOGS: bool = true;

/// How often idle sessions are looked for. Never longer than the TTL itself.
pub fn sweep_interval(idle_ttl: Duration) -> Duration {
    idle_ttl.min(Duration::from_secs(60)).max(Duration::from_secs(1))
}

/// Evicts idle sessions on a fixed tick until the runtime shuts down.
pub async fn sweep_loop(sessions: SessionStore) {
    let Some(ttl) = sessions.idle_ttl() else {
        return;
    };
    let mut ticker = tokio::time::interval(sweep_interval(ttl));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let evicted = sessions.evict_idle();
        if evicted > 0 {
            log_info!(
                "Dropped {evicted} idle sessions, {} remain",
                sessions.session_count()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_follows_short_ttls() {
        assert_eq!(sweep_interval(Duration::from_secs(10)), Duration::from_secs(10));
        assert_eq!(sweep_interval(Duration::from_secs(1440)), Duration::from_secs(60));
        assert_eq!(sweep_interval(Duration::ZERO), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn store_without_ttl_needs_no_sweeper() {
        // returns immediately instead of looping forever
        sweep_loop(SessionStore::new()).await;
    }
}
