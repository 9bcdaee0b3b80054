//! Trade digest rendering.
//!
//! Two-team trades get a side-by-side monospace table; anything bigger falls
//! back to per-team gained/lost blocks, which is the only layout that stays
//! readable at three or more teams.

use crate::domain::{Player, Trade, TradeDetail};

// Wide enough for the longest player name plus a couple.
const OUTPUT_COLUMN_WIDTH: usize = 30;

const TWO_TEAM_TRADE_REACTIONS: [&str; 3] = ["🅰️", "🅱️", "🤷"];
const THREE_TEAM_TRADE_REACTIONS: [&str; 4] = ["1️⃣", "2️⃣", "3️⃣", "🤷"];
const FOUR_TEAM_TRADE_REACTIONS: [&str; 5] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "🤷"];

/// Reaction tokens for a trade involving `team_count` teams; empty when the
/// destination has nothing sensible to offer.
pub fn reactions_for_trade_size(team_count: usize) -> &'static [&'static str] {
    match team_count {
        2 => &TWO_TEAM_TRADE_REACTIONS,
        3 => &THREE_TEAM_TRADE_REACTIONS,
        4 => &FOUR_TEAM_TRADE_REACTIONS,
        _ => &[],
    }
}

/// Render one trade as chat markdown.
pub fn format_trade(trade: &Trade) -> String {
    let mut out = String::new();
    out.push_str(&format!("__**{}**__\n\n", trade.league.name));
    out.push_str(&format!("Trade on {}\n", trade.time.format("%m-%d-%Y")));

    if trade.details.len() == 2 {
        format_two_team_trade(&mut out, trade);
    } else {
        format_larger_trade(&mut out, trade);
    }

    out
}

fn format_player_line(player: &Player) -> String {
    format!("{} ({})", player.name, player.position)
}

fn format_faab(amount: u32) -> String {
    format!("${} FAAB", amount)
}

fn gained_lines(detail: &TradeDetail) -> Vec<String> {
    let mut lines: Vec<String> = detail.added_players.iter().map(format_player_line).collect();
    lines.extend(detail.added_picks.iter().cloned());
    if detail.faab_added > 0 {
        lines.push(format_faab(detail.faab_added));
    }
    lines
}

fn lost_lines(detail: &TradeDetail) -> Vec<String> {
    let mut lines: Vec<String> = detail.lost_players.iter().map(format_player_line).collect();
    lines.extend(detail.lost_picks.iter().cloned());
    if detail.faab_lost > 0 {
        lines.push(format_faab(detail.faab_lost));
    }
    lines
}

fn format_two_team_trade(out: &mut String, trade: &Trade) {
    let side_a = &trade.details[0];
    let side_b = &trade.details[1];

    out.push_str(&format!(
        "**Team A: {}** - {}\n",
        side_a.team.manager.name, side_a.team.roster_link
    ));
    out.push_str(&format!(
        "**Team B: {}** - {}\n",
        side_b.team.manager.name, side_b.team.roster_link
    ));

    // When the platform reports both sides, each team's own gains are the
    // canonical view; when losses are the only mirror we have, team A's
    // losses stand in for team B's gains.
    let a_gained = gained_lines(side_a);
    let b_gained = {
        let own = gained_lines(side_b);
        if own.is_empty() {
            lost_lines(side_a)
        } else {
            own
        }
    };

    let width = OUTPUT_COLUMN_WIDTH;
    out.push_str("```\n");
    out.push_str(&"=".repeat(width * 2 + 3));
    out.push('\n');
    out.push_str(&format!(
        "|{:^width$}|{:^width$}|\n",
        "Team A Gained",
        "Team B Gained",
        width = width
    ));
    out.push_str(&format!("|{}|\n", "=".repeat(width * 2 + 1)));

    for i in 0..a_gained.len().max(b_gained.len()) {
        let left = a_gained.get(i).map(String::as_str).unwrap_or("");
        let right = b_gained.get(i).map(String::as_str).unwrap_or("");
        out.push_str(&format!("|{:^width$}|{:^width$}|\n", left, right, width = width));
    }

    out.push_str(&"=".repeat(width * 2 + 3));
    out.push_str("\n```\n");
}

fn format_larger_trade(out: &mut String, trade: &Trade) {
    for detail in &trade.details {
        out.push_str(&format!("**Team Manager: {}**\n", detail.team.manager.name));
        out.push_str(&format!("Roster link: {}\n", detail.team.roster_link));

        out.push_str("*Traded For*\n");
        for line in gained_lines(detail) {
            out.push_str(&format!("    {}\n", line));
        }
        out.push_str("*Traded Away*\n");
        for line in lost_lines(detail) {
            out.push_str(&format!("    {}\n", line));
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{League, Team, User};
    use chrono::{TimeZone, Utc};

    fn trade_with_details(details: Vec<TradeDetail>) -> Trade {
        Trade::new(
            "t1",
            League::new("l1", "FTA Premier", 14, "d1"),
            Utc.with_ymd_and_hms(2024, 10, 3, 18, 30, 0).unwrap(),
            details,
        )
    }

    fn detail(team_id: &str, manager: &str) -> TradeDetail {
        TradeDetail::new(Team::new(
            team_id,
            User::new(team_id, manager),
            format!("https://sleeper.app/roster/l1/{}", team_id),
        ))
    }

    #[test]
    fn reaction_sets_match_trade_size() {
        assert_eq!(reactions_for_trade_size(2).len(), 3);
        assert_eq!(reactions_for_trade_size(3).len(), 4);
        assert_eq!(reactions_for_trade_size(4).len(), 5);
        assert!(reactions_for_trade_size(5).is_empty());
    }

    #[test]
    fn two_team_trade_renders_side_by_side() {
        let mut a = detail("1", "Alice");
        a.add_player(Player::new("p1", "Justin Jefferson", "MIN", "WR", ""));
        a.add_faab(10);
        let mut b = detail("2", "Bob");
        b.add_player(Player::new("p2", "Jahmyr Gibbs", "DET", "RB", ""));

        let text = format_trade(&trade_with_details(vec![a, b]));
        assert!(text.contains("FTA Premier"));
        assert!(text.contains("Trade on 10-03-2024"));
        assert!(text.contains("Team A Gained"));
        assert!(text.contains("Justin Jefferson (WR)"));
        assert!(text.contains("$10 FAAB"));
        assert!(text.contains("```"));
    }

    #[test]
    fn additions_only_trade_mirrors_the_other_side() {
        // Fleaflicker-shaped input: only gains are reported.
        let mut a = detail("1", "Alice");
        a.add_player(Player::new("p1", "Justin Jefferson", "MIN", "WR", ""));
        let mut b = detail("2", "Bob");
        b.add_pick("2025", 1);

        let text = format_trade(&trade_with_details(vec![a, b]));
        assert!(text.contains("Justin Jefferson"));
        assert!(text.contains("2025 1"));
    }

    #[test]
    fn three_team_trade_uses_per_team_blocks() {
        let mut a = detail("1", "Alice");
        a.add_player(Player::new("p1", "CeeDee Lamb", "DAL", "WR", ""));
        let b = detail("2", "Bob");
        let c = detail("3", "Carol");

        let text = format_trade(&trade_with_details(vec![a, b, c]));
        assert!(text.contains("Team Manager: Alice"));
        assert!(text.contains("*Traded For*"));
        assert!(!text.contains("Team A Gained"));
    }
}
