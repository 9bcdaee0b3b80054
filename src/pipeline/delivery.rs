//! One feed's delivery tick.
//!
//! A tick fetches every trade across the feed's matching leagues, keeps the
//! ones inside the configured date window, and hands each not-yet-delivered
//! trade to the notifier exactly once, ledgering it after the hand-off. The
//! append-after-delivery ordering means a crash between the two can repost a
//! trade on the next tick; the reverse ordering would silently drop one,
//! which is the worse failure.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::{DeliveryConfig, FeedConfig};
use crate::error::{HuddleError, Result};
use crate::notify::{format_trade, reactions_for_trade_size, Notifier};
use crate::platform::{FantasyPlatform, LeagueFilter};

use super::ledger::TradeLedger;

/// Counts for one completed tick, for the log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub fetched: usize,
    pub delivered: usize,
}

pub struct FeedWorker {
    pub name: String,
    platform: Arc<dyn FantasyPlatform>,
    notifier: Arc<dyn Notifier>,
    ledger: TradeLedger,
    account: String,
    league_filter: LeagueFilter,
    season: u16,
    window: (DateTime<Utc>, DateTime<Utc>),
    reactions: bool,
}

impl FeedWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        platform: Arc<dyn FantasyPlatform>,
        notifier: Arc<dyn Notifier>,
        ledger: TradeLedger,
        account: impl Into<String>,
        league_filter: LeagueFilter,
        season: u16,
        window: (DateTime<Utc>, DateTime<Utc>),
        reactions: bool,
    ) -> Self {
        Self {
            name: name.into(),
            platform,
            notifier,
            ledger,
            account: account.into(),
            league_filter,
            season,
            window,
            reactions,
        }
    }

    /// Wire a worker from its feed config plus the shared delivery settings.
    pub fn from_config(
        feed: &FeedConfig,
        delivery: &DeliveryConfig,
        platform: Arc<dyn FantasyPlatform>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let window = delivery.date_window().map_err(HuddleError::Validation)?;
        let ledger = TradeLedger::new(
            std::path::Path::new(&delivery.state_dir).join(format!("{}_posted_trades", feed.name)),
        );

        Ok(Self::new(
            feed.name.clone(),
            platform,
            notifier,
            ledger,
            feed.account.clone(),
            feed.compiled_league_filter()?,
            delivery.season,
            window,
            feed.reactions,
        ))
    }

    /// Run one delivery tick. Errors abort this tick only; the schedule and
    /// the ledger state from prior ticks are untouched.
    pub async fn run_tick(&self) -> Result<TickReport> {
        let user = self.platform.resolve_user(&self.account).await?;
        let leagues = self
            .platform
            .leagues_for_user(&user, self.season, &self.league_filter, false)
            .await?;

        let mut trades = Vec::new();
        for league in &leagues {
            trades.extend(self.platform.trades(league, self.season).await?);
        }

        let (start, end) = self.window;
        trades.retain(|trade| trade.time > start && trade.time < end);
        trades.sort_by_key(|trade| trade.time);

        debug!(feed = %self.name, leagues = leagues.len(), trades = trades.len(),
            "tick fetched");

        self.ledger.refresh().await;

        let mut delivered = 0;
        for trade in &trades {
            let identity = trade.identity();
            if self.ledger.contains(&identity).await {
                continue;
            }

            let reactions = if self.reactions {
                reactions_for_trade_size(trade.details.len())
            } else {
                &[]
            };

            self.notifier
                .deliver(&format_trade(trade), reactions)
                .await?;
            self.ledger.record(trade).await;
            delivered += 1;
        }

        if delivered > 0 {
            info!(feed = %self.name, delivered, "posted new trades");
        }

        Ok(TickReport {
            fetched: trades.len(),
            delivered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{League, Team, Trade, TradeDetail, User};
    use crate::notify::MockNotifier;
    use crate::platform::MockFantasyPlatform;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn league() -> League {
        League::new("l1", "FTA Premier", 14, "d1")
    }

    fn trade(id: &str, day: u32) -> Trade {
        let detail_a = TradeDetail::new(Team::new("1", User::new("u1", "Alice"), "link-a"));
        let detail_b = TradeDetail::new(Team::new("2", User::new("u2", "Bob"), "link-b"));
        Trade::new(
            id,
            league(),
            Utc.with_ymd_and_hms(2024, 10, day, 12, 0, 0).unwrap(),
            vec![detail_a, detail_b],
        )
    }

    fn wide_window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(1999, 12, 31, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2099, 12, 31, 0, 0, 0).unwrap(),
        )
    }

    fn platform_with_trades(trades: Vec<Trade>) -> MockFantasyPlatform {
        let mut platform = MockFantasyPlatform::new();
        platform
            .expect_resolve_user()
            .returning(|_| Ok(User::new("u0", "Commish")));
        platform
            .expect_leagues_for_user()
            .returning(|_, _, _, _| Ok(vec![league()]));
        platform
            .expect_trades()
            .returning(move |_, _| Ok(trades.clone()));
        platform
    }

    fn counting_notifier(counter: Arc<AtomicUsize>) -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_deliver().returning(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        notifier
    }

    fn worker(
        platform: MockFantasyPlatform,
        notifier: MockNotifier,
        ledger_path: &std::path::Path,
    ) -> FeedWorker {
        FeedWorker::new(
            "fta",
            Arc::new(platform),
            Arc::new(notifier),
            TradeLedger::new(ledger_path),
            "ftaffl",
            LeagueFilter::default(),
            2024,
            wide_window(),
            true,
        )
    }

    #[tokio::test]
    async fn second_tick_over_unchanged_upstream_delivers_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fta_posted_trades");
        let sent = Arc::new(AtomicUsize::new(0));

        let trades = vec![trade("a", 1), trade("b", 2)];
        let worker = worker(
            platform_with_trades(trades),
            counting_notifier(Arc::clone(&sent)),
            &path,
        );

        let first = worker.run_tick().await.expect("first tick");
        assert_eq!(first.delivered, 2);

        let second = worker.run_tick().await.expect("second tick");
        assert_eq!(second.delivered, 0);
        assert_eq!(second.fetched, 2);
        assert_eq!(sent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn interrupted_tick_resumes_without_reposting() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fta_posted_trades");
        let sent = Arc::new(AtomicUsize::new(0));

        // First instance posts trade "a" and is then torn down, as if the
        // process died mid-tick before seeing trade "b".
        {
            let worker = worker(
                platform_with_trades(vec![trade("a", 1)]),
                counting_notifier(Arc::clone(&sent)),
                &path,
            );
            worker.run_tick().await.expect("partial tick");
        }

        // The resumed instance sees both trades; only "b" goes out.
        let worker = worker(
            platform_with_trades(vec![trade("a", 1), trade("b", 2)]),
            counting_notifier(Arc::clone(&sent)),
            &path,
        );
        let report = worker.run_tick().await.expect("resumed tick");
        assert_eq!(report.delivered, 1);
        assert_eq!(sent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn trades_outside_the_window_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fta_posted_trades");
        let sent = Arc::new(AtomicUsize::new(0));

        let platform = platform_with_trades(vec![trade("old", 1), trade("new", 20)]);
        let notifier = counting_notifier(Arc::clone(&sent));

        let worker = FeedWorker::new(
            "fta",
            Arc::new(platform),
            Arc::new(notifier),
            TradeLedger::new(&path),
            "ftaffl",
            LeagueFilter::default(),
            2024,
            (
                Utc.with_ymd_and_hms(2024, 10, 10, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 10, 30, 0, 0, 0).unwrap(),
            ),
            true,
        );

        let report = worker.run_tick().await.expect("tick");
        assert_eq!(report.fetched, 1);
        assert_eq!(report.delivered, 1);
    }

    #[tokio::test]
    async fn delivery_failure_aborts_the_tick_without_ledgering() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fta_posted_trades");

        let mut notifier = MockNotifier::new();
        notifier
            .expect_deliver()
            .returning(|_, _| Err(HuddleError::UpstreamUnavailable("webhook down".to_string())));

        let worker = worker(platform_with_trades(vec![trade("a", 1)]), notifier, &path);
        assert!(worker.run_tick().await.is_err());

        // Nothing was ledgered, so the next tick retries the delivery.
        let sent = Arc::new(AtomicUsize::new(0));
        let worker = worker_ok_retry(&path, Arc::clone(&sent));
        let report = worker.run_tick().await.expect("retry tick");
        assert_eq!(report.delivered, 1);
        assert_eq!(sent.load(Ordering::SeqCst), 1);
    }

    fn worker_ok_retry(path: &std::path::Path, sent: Arc<AtomicUsize>) -> FeedWorker {
        worker(
            platform_with_trades(vec![trade("a", 1)]),
            counting_notifier(sent),
            path,
        )
    }

    #[tokio::test]
    async fn delivery_is_ordered_by_timestamp() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fta_posted_trades");

        let order: Arc<std::sync::Mutex<Vec<String>>> = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = Arc::clone(&order);

        let mut notifier = MockNotifier::new();
        notifier.expect_deliver().returning(move |text, _| {
            seen.lock()
                .expect("order lock")
                .push(text.lines().nth(2).unwrap_or("").to_string());
            Ok(())
        });

        // Fetched newest-first; must be delivered oldest-first.
        let worker = worker(
            platform_with_trades(vec![trade("newer", 9), trade("older", 3)]),
            notifier,
            &path,
        );
        worker.run_tick().await.expect("tick");

        let order = order.lock().expect("order lock");
        assert_eq!(order.len(), 2);
        assert!(order[0].contains("10-03-2024"));
        assert!(order[1].contains("10-09-2024"));
    }
}
