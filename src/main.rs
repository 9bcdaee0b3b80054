use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use huddle::config::{AppConfig, LoggingConfig};
use huddle::notify::WebhookNotifier;
use huddle::pipeline::{DeliveryManager, FeedStatusStore, FeedWorker};
use huddle::platform::{build_platform, FantasyPlatform, LeagueFilter, PlatformKind};
use huddle::stats::{format_round_pick, AdpAggregator, RosterFilters};
use huddle::{HuddleError, Result};

#[derive(Parser)]
#[command(name = "huddle", about = "Fantasy football league aggregator and trade digest bot")]
struct Cli {
    /// Configuration directory
    #[arg(long, default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the trade delivery daemon until interrupted
    Run,
    /// Control the persisted feed flags
    Feed {
        #[command(subcommand)]
        action: FeedAction,
    },
    /// List trades across an account's leagues
    Trades {
        #[command(flatten)]
        target: Target,
    },
    /// Aggregate draft positions across an account's leagues
    Adp {
        #[command(flatten)]
        target: Target,
        /// Render positions as round.pick for this league size
        #[arg(long, default_value_t = 0)]
        league_size: u32,
        /// Minimum number of drafts a player must appear in
        #[arg(long, default_value_t = 1)]
        min_drafted: u32,
    },
    /// Weekly or season scores across an account's leagues
    Scores {
        #[command(flatten)]
        target: Target,
        /// Week to report; season totals when omitted
        #[arg(long)]
        week: Option<u8>,
    },
    /// Report starting lineups with inactive players
    Inactives {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        week: u8,
    },
    /// Each team's most recent roster transaction
    LastTransactions {
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Subcommand)]
enum FeedAction {
    /// Mark a feed enabled so the daemon schedules it
    Enable { name: String },
    /// Mark a feed disabled
    Disable { name: String },
    /// Show each configured feed's persisted flag
    Status,
}

#[derive(clap::Args)]
struct Target {
    /// Platform to query
    #[arg(long, default_value = "sleeper")]
    platform: String,
    /// Account identifier the leagues hang off of
    #[arg(long)]
    account: String,
    /// Season to query; defaults to the configured one
    #[arg(long)]
    year: Option<u16>,
    /// Regular expression the league name must match
    #[arg(long)]
    league_filter: Option<String>,
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},huddle=debug", logging.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    // Startup validation failures are fatal; the process must not limp along
    // on a partial configuration.
    if let Err(errors) = config.validate() {
        for message in &errors {
            error!("configuration: {}", message);
        }
        std::process::exit(1);
    }

    if let Err(e) = dispatch(cli.command, config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn dispatch(command: Command, config: AppConfig) -> Result<()> {
    match command {
        Command::Run => run_daemon(config).await,
        Command::Feed { action } => feed_control(action, &config),
        Command::Trades { target } => list_trades(&config, &target).await,
        Command::Adp {
            target,
            league_size,
            min_drafted,
        } => list_adp(&config, &target, league_size, min_drafted).await,
        Command::Scores { target, week } => list_scores(&config, &target, week).await,
        Command::Inactives { target, week } => list_inactives(&config, &target, week).await,
        Command::LastTransactions { target } => list_last_transactions(&config, &target).await,
    }
}

async fn run_daemon(config: AppConfig) -> Result<()> {
    let status = FeedStatusStore::new(&config.delivery.state_dir);
    let manager = Arc::new(DeliveryManager::new(
        status,
        Duration::from_secs(config.delivery.tick_secs),
        Duration::from_secs(config.delivery.watchdog_secs),
    ));

    // One adapter per platform kind, shared by that platform's feeds so the
    // caches amortize across them.
    let mut adapters: HashMap<PlatformKind, Arc<dyn FantasyPlatform>> = HashMap::new();
    let mut workers = Vec::with_capacity(config.feeds.len());
    for feed in &config.feeds {
        let platform = match adapters.get(&feed.platform) {
            Some(platform) => Arc::clone(platform),
            None => {
                let platform = build_platform(feed.platform, &config.platform)?;
                adapters.insert(feed.platform, Arc::clone(&platform));
                platform
            }
        };

        let notifier = Arc::new(WebhookNotifier::new(feed.webhook_url.clone()));
        workers.push(Arc::new(FeedWorker::from_config(
            feed,
            &config.delivery,
            platform,
            notifier,
        )?));
    }

    manager.resume_enabled_feeds(workers).await;
    info!(feeds = config.feeds.len(), "delivery daemon started");

    tokio::select! {
        _ = manager.run_watchdog() => {}
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }

    manager.shutdown().await;
    Ok(())
}

fn feed_control(action: FeedAction, config: &AppConfig) -> Result<()> {
    let status = FeedStatusStore::new(&config.delivery.state_dir);

    let known = |name: &str| config.feeds.iter().any(|f| f.name == name);

    match action {
        FeedAction::Enable { name } => {
            if !known(&name) {
                return Err(HuddleError::NotFound(format!("no feed named '{}'", name)));
            }
            status.set_enabled(&name, true)?;
            println!("feed '{}' enabled", name);
        }
        FeedAction::Disable { name } => {
            if !known(&name) {
                return Err(HuddleError::NotFound(format!("no feed named '{}'", name)));
            }
            status.set_enabled(&name, false)?;
            println!("feed '{}' disabled", name);
        }
        FeedAction::Status => {
            for feed in &config.feeds {
                let state = if status.is_enabled(&feed.name) {
                    "enabled"
                } else {
                    "disabled"
                };
                println!("{:<24}{} ({})", feed.name, state, feed.platform);
            }
        }
    }

    Ok(())
}

struct Query {
    platform: Arc<dyn FantasyPlatform>,
    user: huddle::User,
    leagues: Vec<huddle::League>,
    year: u16,
}

async fn resolve_target(config: &AppConfig, target: &Target) -> Result<Query> {
    let kind = huddle::parse_platform_kind(&target.platform)?;
    let platform = build_platform(kind, &config.platform)?;
    let year = target.year.unwrap_or(config.delivery.season);
    let filter = LeagueFilter::new(String::new(), target.league_filter.as_deref())?;

    let user = platform.resolve_user(&target.account).await?;
    let leagues = platform.leagues_for_user(&user, year, &filter, false).await?;

    Ok(Query {
        platform,
        user,
        leagues,
        year,
    })
}

async fn list_trades(config: &AppConfig, target: &Target) -> Result<()> {
    let query = resolve_target(config, target).await?;

    for league in &query.leagues {
        let mut trades = query.platform.trades(league, query.year).await?;
        trades.sort_by_key(|trade| trade.time);

        for trade in &trades {
            println!("{}", huddle::notify::format_trade(trade));
        }
    }

    Ok(())
}

async fn list_adp(
    config: &AppConfig,
    target: &Target,
    league_size: u32,
    min_drafted: u32,
) -> Result<()> {
    let query = resolve_target(config, target).await?;

    let mut aggregator = AdpAggregator::new();
    for league in &query.leagues {
        for drafted in query.platform.drafted_players(league, query.year).await? {
            aggregator.add_pick(&drafted.player, drafted.pick_number);
        }
    }

    for record in aggregator.ranked() {
        if record.times_drafted() < min_drafted {
            continue;
        }

        if league_size == 0 {
            println!(
                "{:<30}ADP: {:5.1}   Min: {:<3}   Max: {:<3}   N= {}",
                record.player.name,
                record.mean(),
                record.min_pick(),
                record.max_pick(),
                record.times_drafted()
            );
        } else {
            println!(
                "{:<30}ADP: {:<5}   Min: {:<5}   Max: {:<5}   N= {}",
                record.player.name,
                format_round_pick(record.mean(), league_size),
                format_round_pick(f64::from(record.min_pick()), league_size),
                format_round_pick(f64::from(record.max_pick()), league_size),
                record.times_drafted()
            );
        }
    }

    Ok(())
}

async fn list_scores(config: &AppConfig, target: &Target, week: Option<u8>) -> Result<()> {
    let query = resolve_target(config, target).await?;

    match week {
        Some(week) => {
            let mut scores = Vec::new();
            for league in &query.leagues {
                scores.extend(query.platform.weekly_scores(league, week, query.year).await?);
            }
            scores.sort_by(|a, b| b.points.partial_cmp(&a.points).unwrap_or(std::cmp::Ordering::Equal));

            for score in &scores {
                println!(
                    "{:.<20}{:06.2}, Week {:<2} ({})",
                    score.team.manager.name, score.points, score.week, score.league.name
                );
            }
        }
        None => {
            let mut scores = Vec::new();
            for league in &query.leagues {
                scores.extend(query.platform.season_scores(league, query.year).await?);
            }
            scores.sort_by(|a, b| b.points.partial_cmp(&a.points).unwrap_or(std::cmp::Ordering::Equal));

            for score in &scores {
                println!(
                    "{:.<20}{:06.2} ({})",
                    score.team.manager.name, score.points, score.league.name
                );
            }
        }
    }

    Ok(())
}

async fn list_inactives(config: &AppConfig, target: &Target, week: u8) -> Result<()> {
    let query = resolve_target(config, target).await?;
    let filters = RosterFilters::default();

    for league in &query.leagues {
        let rosters = query
            .platform
            .inactive_rosters(league, week, query.year, &filters)
            .await?;
        if rosters.is_empty() {
            continue;
        }

        let last_transactions = query
            .platform
            .last_transaction_per_team(league, query.year)
            .await?;

        println!("__**{}**__", league.name);
        for roster in rosters {
            println!("{} - {}", roster.team.manager.name, roster.team.roster_link);
            for player in &roster.inactive_players {
                println!("    {} ({}) - {}", player.name, player.position, player.status);
            }
            if let Some(transaction) = last_transactions.get(&roster.team) {
                println!(
                    "    last transaction: {} on {}",
                    transaction.kind,
                    transaction.time.format("%m-%d-%Y")
                );
            }
        }
        println!();
    }

    Ok(())
}

async fn list_last_transactions(config: &AppConfig, target: &Target) -> Result<()> {
    let query = resolve_target(config, target).await?;
    info!(user = %query.user.name, leagues = query.leagues.len(), "reporting last transactions");

    for league in &query.leagues {
        let latest = query
            .platform
            .last_transaction_per_team(league, query.year)
            .await?;

        let mut entries: Vec<_> = latest.into_iter().collect();
        entries.sort_by(|a, b| a.1.time.cmp(&b.1.time));

        println!("__**{}**__", league.name);
        for (team, transaction) in entries {
            println!(
                "{:.<20}{} on {}",
                team.manager.name,
                transaction.kind,
                transaction.time.format("%m-%d-%Y")
            );
        }
        println!();
    }

    Ok(())
}
