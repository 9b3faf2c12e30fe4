use std::sync::Arc;
use std::time::Duration;

use aurabot_db::Database;
use aurabot_engine::Engine;
use chrono::Utc;
use tracing::{debug, warn};

/// Background task that expires pending duels past their TTL.
pub async fn run_sweep_loop(engine: Arc<Engine<Database>>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let engine = engine.clone();
        match tokio::task::spawn_blocking(move || engine.expire_stale(Utc::now())).await {
            Ok(Ok(count)) => debug!("Sweep: {} duels expired", count),
            Ok(Err(e)) => warn!("Sweep error: {}", e),
            Err(e) => warn!("Sweep task failed: {}", e),
        }
    }
}
