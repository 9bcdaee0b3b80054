//! NFL bye-week schedule, keyed by week number.
//!
//! Updated once per season. Weeks outside 1..=18 have no byes.

pub fn teams_on_bye(week: u8) -> &'static [&'static str] {
    match week {
        6 => &["DET", "LV", "TEN", "HOU"],
        7 => &["BUF", "LAR", "MIN", "PHI"],
        8 => &["KC", "LAC"],
        9 => &["CLE", "DAL", "DEN", "NYG", "PIT", "SF"],
        10 => &["BAL", "CIN", "NE", "NYJ"],
        11 => &["JAX", "MIA", "SEA", "TB"],
        13 => &["ARI", "CAR"],
        14 => &["ATL", "CHI", "GB", "IND", "NO", "WAS"],
        _ => &[],
    }
}
