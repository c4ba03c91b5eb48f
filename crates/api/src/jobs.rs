use std::time::{Duration, Instant};

use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use hubs_domain::likes::LikeKind;

use crate::observability;
use crate::state::AppState;

const MIN_BACKUP_INTERVAL_MS: u64 = 1_000;

/// Restores both counter stores from the CMS before the server starts
/// serving. The two passes run concurrently and are best effort.
pub async fn run_initial_restore(state: &AppState) {
    let started = Instant::now();
    let (events, rooms) = tokio::join!(
        state.reconciler.restore(LikeKind::Event),
        state.reconciler.restore(LikeKind::Room),
    );

    for (kind, summary) in [(LikeKind::Event, &events), (LikeKind::Room, &rooms)] {
        info!(
            kind = kind.as_str(),
            items = summary.created,
            likes = summary.total_likes,
            pages = summary.pages,
            "like counts restored"
        );
        observability::register_like_restore(kind, summary.total_likes);
    }
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "like count restore finished"
    );
}

pub fn spawn_backup(state: AppState) -> tokio::task::JoinHandle<()> {
    let period =
        Duration::from_millis(state.config.backup_interval_ms.max(MIN_BACKUP_INTERVAL_MS));
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // An interval's first tick fires immediately; skip it so the
        // first flush happens one full period after startup.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let started = Instant::now();
            match state.backup.flush().await {
                Ok(summary) => {
                    info!(
                        items = summary.items,
                        likes = summary.likes,
                        failed = summary.failed,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "like counts backed up"
                    );
                    observability::register_like_backup(
                        summary.items,
                        summary.failed,
                        started.elapsed(),
                    );
                }
                Err(err) => {
                    error!(error = %err, "like count backup cycle failed");
                }
            }
        }
    })
}
