//! Fleaflicker platform adapter.
//!
//! Fleaflicker's API differs from Sleeper's in every inconvenient way: users
//! are addressed by email rather than id, league lists only exist for the
//! current season, trades are reported for all time and only list what each
//! team *obtained*, and scores arrive as formatted strings. The adapter
//! absorbs all of that; nothing upstream-shaped escapes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::warn;

use super::http::{build_client, get_json};
use super::{FantasyPlatform, LeagueFilter, PlatformKind};
use crate::domain::{
    DraftedPlayer, InactiveRoster, League, Player, SeasonScore, Team, Trade, TradeDetail,
    Transaction, TransactionKind, User, WeeklyScore,
};
use crate::error::{HuddleError, Result};
use crate::stats::{reconcile, RosterFilters};

const DEFAULT_BASE_URL: &str = "https://www.fleaflicker.com/api";

pub struct Fleaflicker {
    http: Client,
    base_url: String,
    league_teams: RwLock<HashMap<String, Arc<HashMap<String, User>>>>,
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UserLeaguesResponse {
    #[serde(default)]
    leagues: Vec<RawLeague>,
}

#[derive(Debug, Deserialize)]
struct RawLeague {
    id: u64,
    name: String,
    capacity: u32,
}

#[derive(Debug, Deserialize)]
struct StandingsResponse {
    #[serde(default)]
    divisions: Vec<RawDivision>,
}

#[derive(Debug, Deserialize)]
struct RawDivision {
    #[serde(default)]
    teams: Vec<RawTeam>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    id: u64,
    #[serde(default)]
    owners: Vec<RawOwner>,
    #[serde(default, rename = "pointsFor")]
    points_for: Option<RawFormattedNumber>,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    id: u64,
    #[serde(rename = "displayName")]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct RawFormattedNumber {
    #[serde(default)]
    formatted: String,
}

#[derive(Debug, Deserialize)]
struct DraftBoardResponse {
    #[serde(default)]
    rosters: Vec<RawDraftRoster>,
}

#[derive(Debug, Deserialize)]
struct RawDraftRoster {
    #[serde(default)]
    lineup: Vec<RawLineupEntry>,
}

#[derive(Debug, Deserialize)]
struct RawLineupEntry {
    player: Option<RawLineupPlayer>,
    #[serde(rename = "draftedAt")]
    drafted_at: Option<RawDraftedAt>,
}

#[derive(Debug, Deserialize)]
struct RawLineupPlayer {
    #[serde(rename = "proPlayer")]
    pro_player: RawProPlayer,
}

#[derive(Debug, Deserialize)]
struct RawDraftedAt {
    overall: u32,
}

#[derive(Debug, Deserialize)]
struct RawProPlayer {
    id: u64,
    #[serde(rename = "nameFull")]
    name_full: String,
    position: String,
    #[serde(rename = "proTeamAbbreviation")]
    pro_team_abbreviation: String,
    injury: Option<RawInjury>,
}

#[derive(Debug, Deserialize)]
struct RawInjury {
    #[serde(default)]
    severity: String,
}

#[derive(Debug, Deserialize)]
struct TradesResponse {
    #[serde(default)]
    trades: Vec<RawTrade>,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    #[serde(default)]
    id: Option<u64>,
    #[serde(rename = "approvedOn")]
    approved_on: String,
    #[serde(default)]
    teams: Vec<RawTradeTeam>,
}

#[derive(Debug, Deserialize)]
struct RawTradeTeam {
    team: RawTradeTeamRef,
    #[serde(default, rename = "playersObtained")]
    players_obtained: Vec<RawLineupPlayer>,
    #[serde(default, rename = "picksObtained")]
    picks_obtained: Vec<RawTradedPick>,
}

#[derive(Debug, Deserialize)]
struct RawTradeTeamRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RawTradedPick {
    season: u32,
    slot: RawPickSlot,
}

#[derive(Debug, Deserialize)]
struct RawPickSlot {
    round: u32,
    #[serde(default)]
    slot: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    #[serde(default)]
    items: Vec<RawTransactionItem>,
}

#[derive(Debug, Deserialize)]
struct RawTransactionItem {
    #[serde(rename = "timeEpochMilli")]
    time_epoch_milli: String,
    #[serde(default)]
    transaction: RawTransactionBody,
}

#[derive(Debug, Default, Deserialize)]
struct RawTransactionBody {
    // Absent type means an add; Fleaflicker omits its default enum value.
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScoreboardResponse {
    #[serde(default)]
    games: Vec<RawGame>,
}

#[derive(Debug, Deserialize)]
struct RawGame {
    home: RawTeam,
    away: RawTeam,
    #[serde(rename = "homeScore")]
    home_score: RawGameScore,
    #[serde(rename = "awayScore")]
    away_score: RawGameScore,
}

#[derive(Debug, Deserialize)]
struct RawGameScore {
    score: RawFormattedNumber,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

impl Fleaflicker {
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        Ok(Self {
            http: build_client("huddle-fleaflicker-adapter/0.1")?,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            league_teams: RwLock::new(HashMap::new()),
        })
    }

    fn url(&self, call: &str, query: &str) -> String {
        format!("{}/{}?sport=NFL&{}", self.base_url, call, query)
    }

    fn roster_link(&self, league_id: &str, team_id: &str) -> String {
        format!(
            "https://www.fleaflicker.com/nfl/leagues/{}/teams/{}",
            league_id, team_id
        )
    }

    fn team(&self, league_id: &str, team_id: &str, users: &HashMap<String, User>) -> Team {
        let manager = users
            .get(team_id)
            .cloned()
            .unwrap_or_else(|| User::new("0", "No user"));
        Team::new(team_id, manager, self.roster_link(league_id, team_id))
    }

    fn player_from_pro(raw: &RawProPlayer) -> Player {
        let status = raw
            .injury
            .as_ref()
            .map(|injury| injury.severity.clone())
            .unwrap_or_default();
        Player::new(
            raw.id.to_string(),
            raw.name_full.clone(),
            raw.pro_team_abbreviation.clone(),
            raw.position.clone(),
            status,
        )
    }

    /// Resolve every team's owner from the standings and remember the
    /// mapping for later calls.
    async fn store_league_users(
        &self,
        league_id: &str,
        year: u16,
    ) -> Result<Arc<HashMap<String, User>>> {
        let standings: StandingsResponse = get_json(
            &self.http,
            &self.url(
                "FetchLeagueStandings",
                &format!("league_id={}&season={}", league_id, year),
            ),
        )
        .await?;

        let mut users = HashMap::new();
        for division in standings.divisions {
            for team in division.teams {
                let user = match team.owners.first() {
                    Some(owner) => User::new(owner.id.to_string(), owner.display_name.clone()),
                    None => User::new("0", "No user"),
                };
                users.insert(team.id.to_string(), user);
            }
        }

        let users = Arc::new(users);
        self.league_teams
            .write()
            .await
            .insert(league_id.to_string(), Arc::clone(&users));
        Ok(users)
    }

    async fn team_users(&self, league_id: &str, year: u16) -> Result<Arc<HashMap<String, User>>> {
        if let Some(map) = self.league_teams.read().await.get(league_id) {
            return Ok(Arc::clone(map));
        }
        self.store_league_users(league_id, year).await
    }

    fn trade_from_raw(
        &self,
        raw: &RawTrade,
        league: &League,
        users: &HashMap<String, User>,
    ) -> Result<Trade> {
        let millis: i64 = raw.approved_on.parse().map_err(|_| {
            HuddleError::DataInconsistency(format!(
                "trade in {} has unparsable approval time '{}'",
                league.name, raw.approved_on
            ))
        })?;
        let time = chrono::DateTime::from_timestamp_millis(millis).unwrap_or_default();

        let mut details = Vec::with_capacity(raw.teams.len());
        for side in &raw.teams {
            let team_id = side.team.id.to_string();
            let mut detail = TradeDetail::new(self.team(&league.league_id, &team_id, users));

            // Fleaflicker only reports what each side obtained, never what it
            // gave up, so the loss lists stay empty.
            for player in &side.players_obtained {
                detail.add_player(Self::player_from_pro(&player.pro_player));
            }
            for pick in &side.picks_obtained {
                let season = pick.season.to_string();
                match pick.slot.slot {
                    Some(slot) => detail.add_pick_with_slot(&season, pick.slot.round, slot),
                    None => detail.add_pick(&season, pick.slot.round),
                }
            }

            details.push(detail);
        }

        let trade_id = raw.id.map(|id| id.to_string()).unwrap_or_default();
        Ok(Trade::new(trade_id, league.clone(), time, details))
    }
}

#[async_trait]
impl FantasyPlatform for Fleaflicker {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Fleaflicker
    }

    async fn resolve_user(&self, identifier: &str) -> Result<User> {
        // Fleaflicker addresses accounts by email; a placeholder user
        // carrying just the email is enough for the league lookup.
        if identifier.contains('@') {
            return Ok(User::with_email("", "Admin User", identifier));
        }
        Ok(User::new(identifier, "Admin User"))
    }

    async fn leagues_for_user(
        &self,
        user: &User,
        year: u16,
        filter: &LeagueFilter,
        _include_pre_draft: bool,
    ) -> Result<Vec<League>> {
        let query = if !user.user_id.is_empty() {
            format!("season={}&user_id={}", year, user.user_id)
        } else if !user.email.is_empty() {
            format!("season={}&email={}", year, user.email)
        } else {
            return Err(HuddleError::Validation(format!(
                "user {} must have either an id or an email",
                user.name
            )));
        };

        let response: UserLeaguesResponse = get_json(
            &self.http,
            &self.url("FetchUserLeagues", &query),
        )
        .await?;

        let mut leagues = Vec::new();
        for raw in response.leagues {
            if !filter.matches(&raw.name) {
                continue;
            }

            let league = League::new(raw.id.to_string(), raw.name, raw.capacity, "0");
            self.store_league_users(&league.league_id, year).await?;
            leagues.push(league);
        }

        Ok(leagues)
    }

    async fn drafted_players(&self, league: &League, year: u16) -> Result<Vec<DraftedPlayer>> {
        let board: DraftBoardResponse = get_json(
            &self.http,
            &self.url(
                "FetchLeagueDraftBoard",
                &format!("league_id={}&season={}", league.league_id, year),
            ),
        )
        .await?;

        let mut drafted = Vec::new();
        for roster in board.rosters {
            for entry in roster.lineup {
                if let (Some(player), Some(drafted_at)) = (entry.player, entry.drafted_at) {
                    drafted.push(DraftedPlayer {
                        player: Self::player_from_pro(&player.pro_player),
                        pick_number: drafted_at.overall,
                    });
                }
            }
        }

        Ok(drafted)
    }

    async fn trades(&self, league: &League, year: u16) -> Result<Vec<Trade>> {
        let users = self.team_users(&league.league_id, year).await?;
        let response: TradesResponse = get_json(
            &self.http,
            &self.url(
                "FetchTrades",
                &format!("league_id={}&filter=TRADES_COMPLETED", league.league_id),
            ),
        )
        .await?;

        let mut trades = Vec::new();
        for raw in &response.trades {
            let trade = self.trade_from_raw(raw, league, &users)?;

            // The API returns every trade the league has ever made; keep the
            // requested season only.
            if trade.time.year() != i32::from(year) {
                continue;
            }

            trades.push(trade);
        }

        Ok(trades)
    }

    async fn weekly_scores(
        &self,
        league: &League,
        week: u8,
        year: u16,
    ) -> Result<Vec<WeeklyScore>> {
        let users = self.team_users(&league.league_id, year).await?;
        let scoreboard: ScoreboardResponse = get_json(
            &self.http,
            &self.url(
                "FetchLeagueScoreboard",
                &format!(
                    "league_id={}&scoring_period={}&season={}",
                    league.league_id, week, year
                ),
            ),
        )
        .await?;

        let mut scores = Vec::new();
        for game in scoreboard.games {
            for (side, score) in [
                (&game.home, &game.home_score),
                (&game.away, &game.away_score),
            ] {
                let team = self.team(&league.league_id, &side.id.to_string(), &users);
                scores.push(WeeklyScore::new(
                    league.clone(),
                    team,
                    week,
                    parse_formatted_points(&score.score.formatted),
                ));
            }
        }

        Ok(scores)
    }

    async fn season_scores(&self, league: &League, year: u16) -> Result<Vec<SeasonScore>> {
        let users = self.team_users(&league.league_id, year).await?;

        // The scoreboard carries season-long points regardless of the week
        // asked for.
        let scoreboard: ScoreboardResponse = get_json(
            &self.http,
            &self.url(
                "FetchLeagueScoreboard",
                &format!(
                    "league_id={}&scoring_period=1&season={}",
                    league.league_id, year
                ),
            ),
        )
        .await?;

        let mut scores = Vec::new();
        for game in scoreboard.games {
            for side in [&game.home, &game.away] {
                let team = self.team(&league.league_id, &side.id.to_string(), &users);
                let points = side
                    .points_for
                    .as_ref()
                    .map(|p| parse_formatted_points(&p.formatted))
                    .unwrap_or(0.0);
                scores.push(SeasonScore::new(league.clone(), team, points));
            }
        }

        Ok(scores)
    }

    async fn last_transaction_per_team(
        &self,
        league: &League,
        year: u16,
    ) -> Result<HashMap<Team, Transaction>> {
        let users = self.team_users(&league.league_id, year).await?;

        let mut latest = HashMap::new();
        for team_id in users.keys() {
            let team = self.team(&league.league_id, team_id, &users);

            let response: TransactionsResponse = get_json(
                &self.http,
                &format!(
                    "{}/FetchLeagueTransactions?league_id={}&team_id={}",
                    self.base_url, league.league_id, team_id
                ),
            )
            .await?;

            let transaction = match response.items.first() {
                Some(item) => {
                    let millis: i64 = item.time_epoch_milli.parse().unwrap_or(0);
                    let time = chrono::DateTime::from_timestamp_millis(millis).unwrap_or_default();

                    // A most-recent entry from a prior season means the team
                    // has done nothing this year.
                    if time.year() != i32::from(year) {
                        Transaction::new(reconcile::sentinel_time(), TransactionKind::None, team.clone())
                    } else {
                        let kind = item
                            .transaction
                            .kind
                            .as_deref()
                            .map(TransactionKind::parse)
                            .unwrap_or(TransactionKind::Add);
                        Transaction::new(time, kind, team.clone())
                    }
                }
                None => Transaction::new(
                    reconcile::sentinel_time(),
                    TransactionKind::None,
                    team.clone(),
                ),
            };

            latest.insert(team, transaction);
        }

        Ok(latest)
    }

    async fn inactive_rosters(
        &self,
        _league: &League,
        _week: u8,
        _year: u16,
        _filters: &RosterFilters,
    ) -> Result<Vec<InactiveRoster>> {
        // Fleaflicker's lineup API does not expose enough to classify
        // starters; callers get an empty result rather than an error so
        // mixed-platform sweeps keep working.
        warn!("inactive roster detection is not implemented for fleaflicker");
        Ok(Vec::new())
    }
}

fn parse_formatted_points(formatted: &str) -> f64 {
    formatted.replace(',', "").parse().unwrap_or(0.0)
}
