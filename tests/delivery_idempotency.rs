//! End-to-end idempotency checks for the trade delivery pipeline, driven
//! through the public API with stub collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use huddle::notify::Notifier;
use huddle::pipeline::{FeedWorker, TradeLedger};
use huddle::platform::{FantasyPlatform, LeagueFilter, PlatformKind};
use huddle::stats::RosterFilters;
use huddle::{
    DraftedPlayer, InactiveRoster, League, Result, SeasonScore, Team, Trade, TradeDetail,
    Transaction, User, WeeklyScore,
};

struct StubPlatform {
    trades: Mutex<Vec<Trade>>,
}

impl StubPlatform {
    fn new(trades: Vec<Trade>) -> Self {
        Self {
            trades: Mutex::new(trades),
        }
    }
}

#[async_trait]
impl FantasyPlatform for StubPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Sleeper
    }

    async fn resolve_user(&self, identifier: &str) -> Result<User> {
        Ok(User::new("u0", identifier))
    }

    async fn leagues_for_user(
        &self,
        _user: &User,
        _year: u16,
        filter: &LeagueFilter,
        _include_pre_draft: bool,
    ) -> Result<Vec<League>> {
        let league = league();
        Ok(if filter.matches(&league.name) {
            vec![league]
        } else {
            Vec::new()
        })
    }

    async fn drafted_players(&self, _league: &League, _year: u16) -> Result<Vec<DraftedPlayer>> {
        Ok(Vec::new())
    }

    async fn trades(&self, _league: &League, _year: u16) -> Result<Vec<Trade>> {
        Ok(self.trades.lock().expect("trades lock").clone())
    }

    async fn weekly_scores(
        &self,
        _league: &League,
        _week: u8,
        _year: u16,
    ) -> Result<Vec<WeeklyScore>> {
        Ok(Vec::new())
    }

    async fn season_scores(&self, _league: &League, _year: u16) -> Result<Vec<SeasonScore>> {
        Ok(Vec::new())
    }

    async fn last_transaction_per_team(
        &self,
        _league: &League,
        _year: u16,
    ) -> Result<HashMap<Team, Transaction>> {
        Ok(HashMap::new())
    }

    async fn inactive_rosters(
        &self,
        _league: &League,
        _week: u8,
        _year: u16,
        _filters: &RosterFilters,
    ) -> Result<Vec<InactiveRoster>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, text: &str, _reactions: &[&'static str]) -> Result<()> {
        self.messages
            .lock()
            .expect("messages lock")
            .push(text.to_string());
        Ok(())
    }
}

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

fn worker(
    platform: Arc<StubPlatform>,
    notifier: Arc<RecordingNotifier>,
    ledger_path: &std::path::Path,
) -> FeedWorker {
    FeedWorker::new(
        "fta",
        platform,
        notifier,
        TradeLedger::new(ledger_path),
        "ftaffl",
        LeagueFilter::default(),
        2024,
        wide_window(),
        true,
    )
}

#[tokio::test]
async fn repeated_ticks_deliver_each_trade_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fta_posted_trades");

    let platform = Arc::new(StubPlatform::new(vec![trade("a", 1), trade("b", 2)]));
    let notifier = Arc::new(RecordingNotifier::default());
    let worker = worker(Arc::clone(&platform), Arc::clone(&notifier), &path);

    let first = worker.run_tick().await.expect("first tick");
    assert_eq!(first.delivered, 2);

    // Unchanged upstream: the second pass is a no-op.
    let second = worker.run_tick().await.expect("second tick");
    assert_eq!(second.delivered, 0);
    assert_eq!(notifier.messages.lock().expect("lock").len(), 2);
}

#[tokio::test]
async fn new_trade_after_restart_is_the_only_delivery() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fta_posted_trades");

    // First process lifetime posts one trade.
    {
        let platform = Arc::new(StubPlatform::new(vec![trade("a", 1)]));
        let notifier = Arc::new(RecordingNotifier::default());
        let worker = worker(platform, Arc::clone(&notifier), &path);
        worker.run_tick().await.expect("first lifetime tick");
        assert_eq!(notifier.messages.lock().expect("lock").len(), 1);
    }

    // Second lifetime sees the old trade plus a new one; only the new one
    // goes out because the ledger survived the restart.
    let platform = Arc::new(StubPlatform::new(vec![trade("a", 1), trade("c", 5)]));
    let notifier = Arc::new(RecordingNotifier::default());
    let worker = worker(platform, Arc::clone(&notifier), &path);

    let report = worker.run_tick().await.expect("second lifetime tick");
    assert_eq!(report.fetched, 2);
    assert_eq!(report.delivered, 1);

    let messages = notifier.messages.lock().expect("lock");
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("10-05-2024"));
}
