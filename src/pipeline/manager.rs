//! Feed lifecycle management.
//!
//! Runs one periodic task per enabled feed plus a slower watchdog. Feeds
//! never overlap themselves: a tick still running when the next interval
//! fires is skipped, not queued. The watchdog looks at each feed's stamped
//! next-run time and force-restarts any schedule that has fallen more than a
//! full tick behind, which recovers from runtime scheduler stalls without a
//! process restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::error::Result;

use super::delivery::FeedWorker;
use super::flags::FeedStatusStore;

/// Next-run stamp shared between a feed's task and the watchdog.
pub struct FeedSchedule {
    next_run_millis: AtomicI64,
}

impl FeedSchedule {
    fn new() -> Self {
        Self {
            next_run_millis: AtomicI64::new(i64::MAX),
        }
    }

    fn stamp(&self, next_run: DateTime<Utc>) {
        self.next_run_millis
            .store(next_run.timestamp_millis(), Ordering::SeqCst);
    }

    fn next_run(&self) -> Option<DateTime<Utc>> {
        match self.next_run_millis.load(Ordering::SeqCst) {
            i64::MAX => None,
            millis => DateTime::from_timestamp_millis(millis),
        }
    }
}

/// A schedule is stalled once its promised next run is more than one tick in
/// the past.
fn is_stalled(next_run: DateTime<Utc>, now: DateTime<Utc>, tick: Duration) -> bool {
    match chrono::Duration::from_std(tick) {
        Ok(tick) => now - next_run > tick,
        Err(_) => false,
    }
}

struct RunningFeed {
    worker: Arc<FeedWorker>,
    schedule: Arc<FeedSchedule>,
    handle: JoinHandle<()>,
    started_at: DateTime<Utc>,
}

/// Status snapshot for one feed.
#[derive(Debug, Clone)]
pub struct FeedStatus {
    pub name: String,
    pub enabled: bool,
    pub running: bool,
    pub next_run: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
}

/// Owns every feed task and the persisted enabled flags.
pub struct DeliveryManager {
    feeds: Arc<RwLock<HashMap<String, RunningFeed>>>,
    status: FeedStatusStore,
    tick_interval: Duration,
    watchdog_interval: Duration,
}

impl DeliveryManager {
    pub fn new(status: FeedStatusStore, tick_interval: Duration, watchdog_interval: Duration) -> Self {
        Self {
            feeds: Arc::new(RwLock::new(HashMap::new())),
            status,
            tick_interval,
            watchdog_interval,
        }
    }

    /// Enable a feed: persist the flag, then start its schedule.
    pub async fn enable_feed(&self, worker: Arc<FeedWorker>) -> Result<()> {
        self.status.set_enabled(&worker.name, true)?;
        self.spawn_feed(worker).await;
        Ok(())
    }

    /// Disable a feed. The flag is persisted *before* the schedule is
    /// cancelled: if the write fails the task keeps running and the caller
    /// gets the error, because a cancelled-but-unpersisted stop would
    /// silently resurrect on the next process start.
    pub async fn disable_feed(&self, name: &str) -> Result<()> {
        self.status.set_enabled(name, false)?;

        if let Some(running) = self.feeds.write().await.remove(name) {
            running.handle.abort();
            info!(feed = name, "feed stopped");
        }

        Ok(())
    }

    /// Start schedules for every worker whose persisted flag is enabled.
    /// Called once at process start.
    pub async fn resume_enabled_feeds(&self, workers: Vec<Arc<FeedWorker>>) {
        for worker in workers {
            if self.status.is_enabled(&worker.name) {
                info!(feed = %worker.name, "resuming feed enabled at last shutdown");
                self.spawn_feed(worker).await;
            }
        }
    }

    pub async fn is_running(&self, name: &str) -> bool {
        self.feeds.read().await.contains_key(name)
    }

    pub async fn feed_status(&self, name: &str) -> FeedStatus {
        let feeds = self.feeds.read().await;
        match feeds.get(name) {
            Some(running) => FeedStatus {
                name: name.to_string(),
                enabled: self.status.is_enabled(name),
                running: true,
                next_run: running.schedule.next_run(),
                started_at: Some(running.started_at),
            },
            None => FeedStatus {
                name: name.to_string(),
                enabled: self.status.is_enabled(name),
                running: false,
                next_run: None,
                started_at: None,
            },
        }
    }

    /// Abort every feed task without touching the persisted flags, so a
    /// restart resumes the same set. This is shutdown, not disable.
    pub async fn shutdown(&self) {
        let mut feeds = self.feeds.write().await;
        for (name, running) in feeds.drain() {
            running.handle.abort();
            info!(feed = %name, "feed task cancelled for shutdown");
        }
    }

    async fn spawn_feed(&self, worker: Arc<FeedWorker>) {
        let name = worker.name.clone();
        let schedule = Arc::new(FeedSchedule::new());
        let handle = spawn_feed_loop(
            Arc::clone(&worker),
            Arc::clone(&schedule),
            self.tick_interval,
        );

        let mut feeds = self.feeds.write().await;
        if let Some(previous) = feeds.insert(
            name.clone(),
            RunningFeed {
                worker,
                schedule,
                handle,
                started_at: Utc::now(),
            },
        ) {
            previous.handle.abort();
        }

        info!(feed = %name, interval_secs = self.tick_interval.as_secs(), "feed started");
    }

    /// Run the watchdog until cancelled. Must be spawned alongside the feed
    /// tasks by the daemon entry point.
    pub async fn run_watchdog(&self) {
        let mut ticker = tokio::time::interval(self.watchdog_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let now = Utc::now();
            let stalled: Vec<(String, Arc<FeedWorker>)> = {
                let feeds = self.feeds.read().await;
                feeds
                    .iter()
                    .filter(|(_, running)| {
                        running
                            .schedule
                            .next_run()
                            .map(|next| is_stalled(next, now, self.tick_interval))
                            .unwrap_or(false)
                    })
                    .map(|(name, running)| (name.clone(), Arc::clone(&running.worker)))
                    .collect()
            };

            for (name, worker) in stalled {
                // If this keeps happening, the tick interval is too short
                // for what the feed actually does.
                warn!(feed = %name, "feed schedule is stalled, restarting");
                if let Some(running) = self.feeds.write().await.remove(&name) {
                    running.handle.abort();
                }
                self.spawn_feed(worker).await;
            }
        }
    }
}

fn spawn_feed_loop(
    worker: Arc<FeedWorker>,
    schedule: Arc<FeedSchedule>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // A tick that is still running when the next fires is skipped, never
        // queued behind itself.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            schedule.stamp(Utc::now() + chrono::Duration::seconds(interval.as_secs() as i64));

            match worker.run_tick().await {
                Ok(report) => {
                    info!(feed = %worker.name, fetched = report.fetched,
                        delivered = report.delivered, "tick complete");
                }
                Err(e) => {
                    // Intermittent failures ride out here; the next tick
                    // starts from the ledger state of the last good one.
                    error!(feed = %worker.name, tick_time = %Utc::now(), error = %e,
                        "tick failed, waiting for next interval");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::notify::MockNotifier;
    use crate::pipeline::TradeLedger;
    use crate::platform::{LeagueFilter, MockFantasyPlatform};
    use chrono::TimeZone;

    fn idle_worker(name: &str, dir: &std::path::Path) -> Arc<FeedWorker> {
        let mut platform = MockFantasyPlatform::new();
        platform
            .expect_resolve_user()
            .returning(|_| Ok(User::new("u0", "Commish")));
        platform
            .expect_leagues_for_user()
            .returning(|_, _, _, _| Ok(Vec::new()));

        Arc::new(FeedWorker::new(
            name,
            Arc::new(platform),
            Arc::new(MockNotifier::new()),
            TradeLedger::new(dir.join(format!("{}_posted_trades", name))),
            "account",
            LeagueFilter::default(),
            2024,
            (
                Utc.with_ymd_and_hms(1999, 12, 31, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2099, 12, 31, 0, 0, 0).unwrap(),
            ),
            true,
        ))
    }

    fn manager(dir: &std::path::Path) -> DeliveryManager {
        DeliveryManager::new(
            FeedStatusStore::new(dir),
            Duration::from_secs(600),
            Duration::from_secs(900),
        )
    }

    #[test]
    fn stall_detection_allows_one_tick_of_slack() {
        let tick = Duration::from_secs(600);
        let now = Utc.with_ymd_and_hms(2024, 10, 3, 12, 0, 0).unwrap();

        // Next run in the future: healthy.
        assert!(!is_stalled(now + chrono::Duration::seconds(60), now, tick));
        // A little late: still healthy.
        assert!(!is_stalled(now - chrono::Duration::seconds(300), now, tick));
        // More than a full tick late: stalled.
        assert!(is_stalled(now - chrono::Duration::seconds(601), now, tick));
    }

    #[tokio::test]
    async fn enable_persists_the_flag_and_starts_the_task() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = manager(dir.path());

        manager
            .enable_feed(idle_worker("fta", dir.path()))
            .await
            .expect("enable");

        assert!(manager.is_running("fta").await);
        let status = manager.feed_status("fta").await;
        assert!(status.enabled);
        assert!(status.running);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn disable_persists_before_cancelling() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = manager(dir.path());

        manager
            .enable_feed(idle_worker("fta", dir.path()))
            .await
            .expect("enable");
        manager.disable_feed("fta").await.expect("disable");

        assert!(!manager.is_running("fta").await);
        let status = manager.feed_status("fta").await;
        assert!(!status.enabled);
        assert!(!status.running);
    }

    #[tokio::test]
    async fn resume_starts_only_feeds_enabled_at_shutdown() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FeedStatusStore::new(dir.path());
        store.set_enabled("on", true).expect("flag");
        store.set_enabled("off", false).expect("flag");

        let manager = manager(dir.path());
        manager
            .resume_enabled_feeds(vec![
                idle_worker("on", dir.path()),
                idle_worker("off", dir.path()),
                idle_worker("never_flagged", dir.path()),
            ])
            .await;

        assert!(manager.is_running("on").await);
        assert!(!manager.is_running("off").await);
        assert!(!manager.is_running("never_flagged").await);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_leaves_flags_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = manager(dir.path());

        manager
            .enable_feed(idle_worker("fta", dir.path()))
            .await
            .expect("enable");
        manager.shutdown().await;

        assert!(!manager.is_running("fta").await);
        // Still enabled on disk, so the next process start resumes it.
        assert!(manager.feed_status("fta").await.enabled);
    }
}
