//! Sleeper platform adapter.
//!
//! Sleeper exposes a flat, unauthenticated JSON API keyed by opaque ids. The
//! one expensive call is the full NFL player catalog (~5MB), which Sleeper
//! asks clients to fetch at most daily; it is cached on disk and refreshed
//! when stale.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::http::{build_client, get_json};
use super::{FantasyPlatform, LeagueFilter, PlatformKind};
use crate::domain::{
    Draft, DraftType, DraftedPlayer, InactiveRoster, League, Player, SeasonScore, Team, Trade,
    TradeDetail, Transaction, TransactionKind, User, WeeklyScore,
};
use crate::error::{HuddleError, Result};
use crate::stats::{classify_starters, last_transaction_per_team, RosterFilters};

const DEFAULT_BASE_URL: &str = "https://api.sleeper.app/v1";
const PLAYER_DATA_FILE: &str = "sleeper_player_data.json";

// Transactions are fetched per week; a couple past the regular season covers
// leagues that keep trading through the playoffs.
const LAST_TRANSACTION_WEEK: u8 = 18;

pub struct Sleeper {
    http: Client,
    base_url: String,
    player_data_path: PathBuf,
    player_refresh: Duration,
    players: RwLock<Option<Arc<HashMap<String, Player>>>>,
    users: RwLock<HashMap<String, User>>,
    league_rosters: RwLock<HashMap<String, Arc<HashMap<u32, User>>>>,
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawUser {
    user_id: String,
    username: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLeague {
    league_id: String,
    name: String,
    total_rosters: u32,
    status: String,
    #[serde(default)]
    roster_positions: Vec<String>,
    #[serde(default)]
    scoring_settings: HashMap<String, f64>,
    #[serde(default)]
    draft_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRoster {
    roster_id: u32,
    owner_id: Option<String>,
    #[serde(default)]
    settings: RawRosterSettings,
}

#[derive(Debug, Default, Deserialize)]
struct RawRosterSettings {
    #[serde(default)]
    fpts: f64,
    #[serde(default)]
    fpts_decimal: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawDraft {
    draft_id: String,
    season: String,
    #[serde(rename = "type")]
    draft_type: String,
    settings: RawDraftSettings,
    #[serde(default)]
    slot_to_roster_id: HashMap<String, u32>,
}

#[derive(Debug, Deserialize)]
struct RawDraftSettings {
    teams: u32,
    #[serde(default)]
    reversal_round: u32,
}

#[derive(Debug, Deserialize)]
struct RawDraftPick {
    player_id: String,
    pick_no: u32,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    transaction_id: String,
    #[serde(rename = "type")]
    kind: String,
    status_updated: i64,
    #[serde(default)]
    roster_ids: Vec<u32>,
    #[serde(default)]
    adds: Option<HashMap<String, u32>>,
    #[serde(default)]
    drops: Option<HashMap<String, u32>>,
    #[serde(default)]
    draft_picks: Vec<RawTradedPick>,
    #[serde(default)]
    waiver_budget: Vec<RawFaabMove>,
}

#[derive(Debug, Deserialize)]
struct RawTradedPick {
    season: String,
    round: u32,
    // Original slot owner; decides which slot the pick occupies.
    roster_id: u32,
    owner_id: u32,
    previous_owner_id: u32,
}

#[derive(Debug, Deserialize)]
struct RawFaabMove {
    sender: u32,
    receiver: u32,
    amount: u32,
}

#[derive(Debug, Deserialize)]
struct RawMatchup {
    roster_id: u32,
    #[serde(default)]
    points: Option<f64>,
    #[serde(default)]
    starters: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    first_name: String,
    last_name: String,
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    injury_status: Option<String>,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

impl Sleeper {
    pub fn new(base_url: Option<&str>, data_dir: &Path, player_refresh_secs: u64) -> Result<Self> {
        Ok(Self {
            http: build_client("huddle-sleeper-adapter/0.1")?,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            player_data_path: data_dir.join(PLAYER_DATA_FILE),
            player_refresh: Duration::from_secs(player_refresh_secs),
            players: RwLock::new(None),
            users: RwLock::new(HashMap::new()),
            league_rosters: RwLock::new(HashMap::new()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn roster_link(&self, league_id: &str, roster_id: u32) -> String {
        format!("https://sleeper.app/roster/{}/{}", league_id, roster_id)
    }

    fn team(&self, league_id: &str, roster_id: u32, rosters: &HashMap<u32, User>) -> Team {
        let manager = rosters
            .get(&roster_id)
            .cloned()
            .unwrap_or_else(|| User::new("0", "No user"));
        Team::new(
            roster_id.to_string(),
            manager,
            self.roster_link(league_id, roster_id),
        )
    }

    // --- player catalog -----------------------------------------------------

    async fn player_catalog(&self) -> Result<Arc<HashMap<String, Player>>> {
        if let Some(catalog) = self.players.read().await.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        let mut slot = self.players.write().await;
        if let Some(catalog) = slot.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        let catalog = Arc::new(self.load_player_catalog().await?);
        *slot = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    async fn load_player_catalog(&self) -> Result<HashMap<String, Player>> {
        if self.player_file_is_fresh() {
            match self.read_players_from_file() {
                Ok(players) => return Ok(players),
                Err(e) => warn!(error = %e, "stored player data unreadable, refetching"),
            }
        }

        // Infrequent by design; seeing this log often means the refresh
        // interval or the data dir is misconfigured.
        info!("retrieving player data from the Sleeper API");
        let raw: HashMap<String, RawPlayer> =
            get_json(&self.http, &self.url("players/nfl")).await?;

        let players: HashMap<String, Player> = raw
            .into_iter()
            .map(|(id, raw)| {
                let player = Player::new(
                    id.clone(),
                    format!("{} {}", raw.first_name, raw.last_name),
                    raw.team.unwrap_or_else(|| "None".to_string()),
                    raw.position.unwrap_or_else(|| "None".to_string()),
                    raw.injury_status.unwrap_or_default(),
                );
                (id, player)
            })
            .collect();

        if let Err(e) = self.write_players_to_file(&players) {
            warn!(error = %e, "failed to persist player data, continuing in memory");
        }

        Ok(players)
    }

    fn player_file_is_fresh(&self) -> bool {
        let modified = match std::fs::metadata(&self.player_data_path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return false,
        };

        SystemTime::now()
            .duration_since(modified)
            .map(|age| age < self.player_refresh)
            .unwrap_or(false)
    }

    fn read_players_from_file(&self) -> Result<HashMap<String, Player>> {
        let raw = std::fs::read_to_string(&self.player_data_path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_players_to_file(&self, players: &HashMap<String, Player>) -> Result<()> {
        if let Some(parent) = self.player_data_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.player_data_path, serde_json::to_string(players)?)?;
        Ok(())
    }

    fn lookup_player(catalog: &HashMap<String, Player>, player_id: &str) -> Player {
        catalog
            .get(player_id)
            .cloned()
            .unwrap_or_else(|| Player::new(player_id, "Missing", "None", "None", ""))
    }

    // --- user / roster caches ----------------------------------------------

    async fn user_by_id(&self, owner_id: &str) -> Result<User> {
        if let Some(user) = self.users.read().await.get(owner_id) {
            return Ok(user.clone());
        }

        let user = self.fetch_user(owner_id).await?;
        self.users
            .write()
            .await
            .insert(owner_id.to_string(), user.clone());
        Ok(user)
    }

    async fn fetch_user(&self, identifier: &str) -> Result<User> {
        let raw: RawUser = get_json(&self.http, &self.url(&format!("user/{}", identifier)))
            .await
            .map_err(|e| match e {
                HuddleError::NotFound(_) => {
                    HuddleError::NotFound(format!("no Sleeper user for '{}'", identifier))
                }
                other => other,
            })?;

        let name = raw
            .username
            .or(raw.display_name)
            .unwrap_or_else(|| raw.user_id.clone());
        Ok(User::new(raw.user_id, name))
    }

    /// Resolve every roster's owner and remember the mapping for later calls.
    async fn store_league_users(&self, league_id: &str) -> Result<Arc<HashMap<u32, User>>> {
        let rosters: Vec<RawRoster> =
            get_json(&self.http, &self.url(&format!("league/{}/rosters", league_id))).await?;

        let mut roster_users = HashMap::with_capacity(rosters.len());
        for roster in rosters {
            let user = match roster.owner_id.as_deref() {
                Some(owner_id) => self.user_by_id(owner_id).await?,
                None => User::new("0", "No user"),
            };
            roster_users.insert(roster.roster_id, user);
        }

        let roster_users = Arc::new(roster_users);
        self.league_rosters
            .write()
            .await
            .insert(league_id.to_string(), Arc::clone(&roster_users));
        Ok(roster_users)
    }

    async fn roster_users(&self, league_id: &str) -> Result<Arc<HashMap<u32, User>>> {
        if let Some(map) = self.league_rosters.read().await.get(league_id) {
            return Ok(Arc::clone(map));
        }
        self.store_league_users(league_id).await
    }

    // --- drafts -------------------------------------------------------------

    async fn fetch_draft(&self, draft_id: &str) -> Result<Draft> {
        let raw: RawDraft = get_json(&self.http, &self.url(&format!("draft/{}", draft_id))).await?;

        let draft_type: DraftType = raw.draft_type.parse().map_err(|e: &str| {
            HuddleError::DataInconsistency(format!("draft {}: {}", raw.draft_id, e))
        })?;

        // Invert slot->roster into roster->slot for the slot calculator.
        let mut team_to_slot = HashMap::with_capacity(raw.slot_to_roster_id.len());
        for slot in 1..=raw.settings.teams {
            if let Some(roster_id) = raw.slot_to_roster_id.get(&slot.to_string()) {
                team_to_slot.insert(roster_id.to_string(), slot);
            }
        }

        Ok(Draft {
            year: raw.season,
            draft_id: raw.draft_id,
            draft_type,
            reversal_round: raw.settings.reversal_round,
            league_size: raw.settings.teams,
            team_to_slot,
        })
    }

    async fn league_transactions(&self, league_id: &str, week: u8) -> Result<Vec<RawTransaction>> {
        get_json(
            &self.http,
            &self.url(&format!("league/{}/transactions/{}", league_id, week)),
        )
        .await
    }

    fn trade_from_transaction(
        &self,
        raw: &RawTransaction,
        league: &League,
        draft: &Draft,
        rosters: &HashMap<u32, User>,
        catalog: &HashMap<String, Player>,
    ) -> Result<Trade> {
        let mut details: HashMap<u32, TradeDetail> = raw
            .roster_ids
            .iter()
            .map(|&roster_id| {
                let team = self.team(&league.league_id, roster_id, rosters);
                (roster_id, TradeDetail::new(team))
            })
            .collect();

        let missing_side = |roster_id: u32| {
            HuddleError::DataInconsistency(format!(
                "trade {} references roster {} outside its participant list",
                raw.transaction_id, roster_id
            ))
        };

        if let Some(adds) = &raw.adds {
            for (player_id, roster_id) in adds {
                let detail = details.get_mut(roster_id).ok_or_else(|| missing_side(*roster_id))?;
                detail.add_player(Self::lookup_player(catalog, player_id));
            }
        }

        if let Some(drops) = &raw.drops {
            for (player_id, roster_id) in drops {
                let detail = details.get_mut(roster_id).ok_or_else(|| missing_side(*roster_id))?;
                detail.lose_player(Self::lookup_player(catalog, player_id));
            }
        }

        for faab in &raw.waiver_budget {
            details
                .get_mut(&faab.sender)
                .ok_or_else(|| missing_side(faab.sender))?
                .lose_faab(faab.amount);
            details
                .get_mut(&faab.receiver)
                .ok_or_else(|| missing_side(faab.receiver))?
                .add_faab(faab.amount);
        }

        for pick in &raw.draft_picks {
            // Picks for the season being drafted carry their computed slot;
            // future-year picks are only known by round.
            if pick.season == draft.year {
                let slot = draft.pick_slot(&pick.roster_id.to_string(), pick.round)?;
                details
                    .get_mut(&pick.owner_id)
                    .ok_or_else(|| missing_side(pick.owner_id))?
                    .add_pick_with_slot(&pick.season, pick.round, slot);
                details
                    .get_mut(&pick.previous_owner_id)
                    .ok_or_else(|| missing_side(pick.previous_owner_id))?
                    .lose_pick_with_slot(&pick.season, pick.round, slot);
            } else {
                details
                    .get_mut(&pick.owner_id)
                    .ok_or_else(|| missing_side(pick.owner_id))?
                    .add_pick(&pick.season, pick.round);
                details
                    .get_mut(&pick.previous_owner_id)
                    .ok_or_else(|| missing_side(pick.previous_owner_id))?
                    .lose_pick(&pick.season, pick.round);
            }
        }

        let mut ordered: Vec<(u32, TradeDetail)> = details.into_iter().collect();
        ordered.sort_by_key(|(roster_id, _)| *roster_id);

        Ok(Trade::new(
            raw.transaction_id.clone(),
            league.clone(),
            millis_to_datetime(raw.status_updated),
            ordered.into_iter().map(|(_, detail)| detail).collect(),
        ))
    }
}

fn millis_to_datetime(millis: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

fn roster_position_bucket(position: &str) -> String {
    // Collapse Sleeper's flex zoo to SF, IDP_FLEX, and FLEX.
    if position == "SUPER_FLEX" {
        "SF".to_string()
    } else if position == "IDP_FLEX" {
        "IDP_FLEX".to_string()
    } else if position.contains("FLEX") {
        "FLEX".to_string()
    } else {
        position.to_string()
    }
}

#[async_trait]
impl FantasyPlatform for Sleeper {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Sleeper
    }

    async fn resolve_user(&self, identifier: &str) -> Result<User> {
        self.fetch_user(identifier).await
    }

    async fn leagues_for_user(
        &self,
        user: &User,
        year: u16,
        filter: &LeagueFilter,
        include_pre_draft: bool,
    ) -> Result<Vec<League>> {
        let raw_leagues: Vec<RawLeague> = get_json(
            &self.http,
            &self.url(&format!("user/{}/leagues/nfl/{}", user.user_id, year)),
        )
        .await?;

        let mut leagues = Vec::new();
        for raw in raw_leagues {
            if raw.status == "pre_draft" && !include_pre_draft {
                continue;
            }
            if !filter.matches(&raw.name) {
                continue;
            }

            let mut roster_counts: HashMap<String, u32> = HashMap::new();
            for position in &raw.roster_positions {
                if position == "BN" {
                    continue;
                }
                *roster_counts
                    .entry(roster_position_bucket(position))
                    .or_insert(0) += 1;
            }

            let mut league = League::new(
                raw.league_id,
                raw.name,
                raw.total_rosters,
                raw.draft_id.unwrap_or_else(|| "0".to_string()),
            );
            league.roster_counts = roster_counts;
            league.ppr = raw.scoring_settings.get("rec").copied().unwrap_or(0.0);
            league.tep = raw
                .scoring_settings
                .get("bonus_rec_te")
                .copied()
                .unwrap_or(0.0);

            self.store_league_users(&league.league_id).await?;
            leagues.push(league);
        }

        Ok(leagues)
    }

    async fn drafted_players(&self, league: &League, _year: u16) -> Result<Vec<DraftedPlayer>> {
        let catalog = self.player_catalog().await?;
        let picks: Vec<RawDraftPick> = get_json(
            &self.http,
            &self.url(&format!("draft/{}/picks", league.draft_id)),
        )
        .await?;

        Ok(picks
            .into_iter()
            .map(|pick| DraftedPlayer {
                player: Self::lookup_player(&catalog, &pick.player_id),
                pick_number: pick.pick_no,
            })
            .collect())
    }

    async fn trades(&self, league: &League, _year: u16) -> Result<Vec<Trade>> {
        let catalog = self.player_catalog().await?;
        let rosters = self.roster_users(&league.league_id).await?;
        let draft = self.fetch_draft(&league.draft_id).await?;

        let mut trades = Vec::new();
        for week in 1..=LAST_TRANSACTION_WEEK {
            let transactions = self.league_transactions(&league.league_id, week).await?;
            for raw in transactions.iter().filter(|t| t.kind == "trade") {
                trades.push(self.trade_from_transaction(raw, league, &draft, &rosters, &catalog)?);
            }
        }

        Ok(trades)
    }

    async fn weekly_scores(
        &self,
        league: &League,
        week: u8,
        _year: u16,
    ) -> Result<Vec<WeeklyScore>> {
        let rosters = self.roster_users(&league.league_id).await?;
        let matchups: Vec<RawMatchup> = get_json(
            &self.http,
            &self.url(&format!("league/{}/matchups/{}", league.league_id, week)),
        )
        .await?;

        // Each matchup entry is a single team's performance.
        Ok(matchups
            .into_iter()
            .map(|matchup| {
                let team = self.team(&league.league_id, matchup.roster_id, &rosters);
                WeeklyScore::new(league.clone(), team, week, matchup.points.unwrap_or(0.0))
            })
            .collect())
    }

    async fn season_scores(&self, league: &League, _year: u16) -> Result<Vec<SeasonScore>> {
        let roster_users = self.roster_users(&league.league_id).await?;
        let rosters: Vec<RawRoster> = get_json(
            &self.http,
            &self.url(&format!("league/{}/rosters", league.league_id)),
        )
        .await?;

        Ok(rosters
            .into_iter()
            .map(|roster| {
                let team = self.team(&league.league_id, roster.roster_id, &roster_users);
                // Sleeper splits points into whole and centi-point fields.
                let points =
                    roster.settings.fpts + roster.settings.fpts_decimal.unwrap_or(0.0) / 100.0;
                SeasonScore::new(league.clone(), team, points)
            })
            .collect())
    }

    async fn last_transaction_per_team(
        &self,
        league: &League,
        _year: u16,
    ) -> Result<HashMap<Team, Transaction>> {
        let rosters = self.roster_users(&league.league_id).await?;

        let mut all_transactions = Vec::new();
        for week in 1..=LAST_TRANSACTION_WEEK {
            for raw in self.league_transactions(&league.league_id, week).await? {
                let time = millis_to_datetime(raw.status_updated);
                let kind = TransactionKind::parse(&raw.kind);

                // One entry per involved team keeps the reconciliation a
                // plain scan.
                for roster_id in &raw.roster_ids {
                    let team = self.team(&league.league_id, *roster_id, &rosters);
                    all_transactions.push(Transaction::new(time, kind, team));
                }
            }
        }

        let teams: Vec<Team> = rosters
            .keys()
            .map(|&roster_id| self.team(&league.league_id, roster_id, &rosters))
            .collect();

        Ok(last_transaction_per_team(&teams, all_transactions))
    }

    async fn inactive_rosters(
        &self,
        league: &League,
        week: u8,
        _year: u16,
        filters: &RosterFilters,
    ) -> Result<Vec<InactiveRoster>> {
        let catalog = self.player_catalog().await?;
        let rosters = self.roster_users(&league.league_id).await?;
        let matchups: Vec<RawMatchup> = get_json(
            &self.http,
            &self.url(&format!("league/{}/matchups/{}", league.league_id, week)),
        )
        .await?;

        let mut inactive_rosters = Vec::new();
        for matchup in matchups {
            let team = self.team(&league.league_id, matchup.roster_id, &rosters);

            let starter_ids = match &matchup.starters {
                Some(ids) => ids,
                None => {
                    // Seen in the wild: a roster whose starters come back
                    // null. Skip the team, keep the league.
                    warn!(
                        league = %league.name,
                        manager = %team.manager.name,
                        "starters list is missing, skipping team"
                    );
                    continue;
                }
            };

            let starters: Vec<Player> = starter_ids
                .iter()
                .map(|id| Self::lookup_player(&catalog, id))
                .collect();

            let flagged = classify_starters(&starters, week, filters);
            if !flagged.is_empty() {
                inactive_rosters.push(InactiveRoster::new(team, flagged));
            }
        }

        Ok(inactive_rosters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn roster_positions_collapse_to_buckets() {
        assert_eq!(roster_position_bucket("SUPER_FLEX"), "SF");
        assert_eq!(roster_position_bucket("IDP_FLEX"), "IDP_FLEX");
        assert_eq!(roster_position_bucket("REC_FLEX"), "FLEX");
        assert_eq!(roster_position_bucket("FLEX"), "FLEX");
        assert_eq!(roster_position_bucket("QB"), "QB");
    }

    #[test]
    fn millis_conversion_preserves_the_date() {
        let time = millis_to_datetime(1_696_161_600_000);
        assert_eq!(time.year(), 2023);
        assert_eq!(time.month(), 10);
    }

    #[test]
    fn transaction_payload_decodes_with_nullable_sides() {
        let raw: RawTransaction = serde_json::from_str(
            r#"{
                "transaction_id": "998877",
                "type": "trade",
                "status_updated": 1696161600000,
                "roster_ids": [1, 4],
                "adds": {"6794": 1, "4034": 4},
                "drops": null,
                "draft_picks": [
                    {"season": "2024", "round": 2, "roster_id": 4,
                     "owner_id": 1, "previous_owner_id": 4}
                ],
                "waiver_budget": [{"sender": 1, "receiver": 4, "amount": 12}]
            }"#,
        )
        .expect("payload should decode");

        assert_eq!(raw.kind, "trade");
        assert_eq!(raw.roster_ids, vec![1, 4]);
        assert!(raw.drops.is_none());
        assert_eq!(raw.waiver_budget[0].amount, 12);
        assert_eq!(raw.draft_picks[0].round, 2);
    }

    #[test]
    fn missing_players_resolve_to_placeholder() {
        let catalog = HashMap::new();
        let player = Sleeper::lookup_player(&catalog, "31415");
        assert_eq!(player.name, "Missing");
        assert!(!player.is_inactive());
    }

    #[tokio::test]
    async fn trade_attribution_covers_all_sides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sleeper = Sleeper::new(None, dir.path(), 86_400).expect("adapter");

        let league = League::new("league-1", "Test League", 10, "draft-1");
        let draft = Draft {
            year: "2024".to_string(),
            draft_id: "draft-1".to_string(),
            draft_type: DraftType::Snake,
            reversal_round: 0,
            league_size: 10,
            team_to_slot: (1..=10u32).map(|n| (n.to_string(), n)).collect(),
        };
        let rosters: HashMap<u32, User> = [
            (1, User::new("u1", "Alice")),
            (4, User::new("u4", "Bob")),
        ]
        .into_iter()
        .collect();
        let catalog: HashMap<String, Player> = [
            ("6794".to_string(), Player::new("6794", "Justin Jefferson", "MIN", "WR", "")),
            ("4034".to_string(), Player::new("4034", "Patrick Mahomes", "KC", "QB", "")),
        ]
        .into_iter()
        .collect();

        let raw = RawTransaction {
            transaction_id: "998877".to_string(),
            kind: "trade".to_string(),
            status_updated: 1_696_161_600_000,
            roster_ids: vec![1, 4],
            adds: Some(
                [("6794".to_string(), 1u32), ("4034".to_string(), 4u32)]
                    .into_iter()
                    .collect(),
            ),
            drops: Some(
                [("6794".to_string(), 4u32), ("4034".to_string(), 1u32)]
                    .into_iter()
                    .collect(),
            ),
            draft_picks: vec![RawTradedPick {
                season: "2024".to_string(),
                round: 2,
                roster_id: 4,
                owner_id: 1,
                previous_owner_id: 4,
            }],
            waiver_budget: vec![RawFaabMove {
                sender: 1,
                receiver: 4,
                amount: 12,
            }],
        };

        let trade = sleeper
            .trade_from_transaction(&raw, &league, &draft, &rosters, &catalog)
            .expect("trade should build");

        assert_eq!(trade.trade_id, "998877");
        assert_eq!(trade.details.len(), 2);

        let side_one = &trade.details[0];
        assert_eq!(side_one.team.team_id, "1");
        assert_eq!(side_one.added_players[0].name, "Justin Jefferson");
        assert_eq!(side_one.lost_players[0].name, "Patrick Mahomes");
        assert_eq!(side_one.faab_lost, 12);
        // Roster 4's base slot in round 2 of a 10-team snake is 10-4+1 = 7.
        assert_eq!(side_one.added_picks, vec!["2024 2.7"]);

        let side_four = &trade.details[1];
        assert_eq!(side_four.faab_added, 12);
        assert_eq!(side_four.lost_picks, vec!["2024 2.7"]);
    }

    #[tokio::test]
    async fn player_catalog_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sleeper = Sleeper::new(None, dir.path(), 86_400).expect("adapter");

        let players: HashMap<String, Player> = [(
            "42".to_string(),
            Player::new("42", "Someone Fast", "DET", "RB", "Questionable"),
        )]
        .into_iter()
        .collect();

        sleeper.write_players_to_file(&players).expect("write");
        assert!(sleeper.player_file_is_fresh());

        let restored = sleeper.read_players_from_file().expect("read");
        assert_eq!(restored["42"].name, "Someone Fast");
        assert_eq!(restored["42"].status, "Questionable");
    }
}
