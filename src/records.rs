use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One stat row as shown on the match page, e.g. "Possession": 61% / 39%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub home: String,
    pub away: String,
}

/// Stat name -> home/away values for one match.
pub type StatSheet = BTreeMap<String, StatLine>;

/// One persisted match, keyed by the ESPN game id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "gameId")]
    pub game_id: String,
    pub date: String,
    pub team1: String,
    pub team2: String,
    pub score: String,
    pub title: String,
    pub match_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatSheet>,
}

impl MatchRecord {
    /// A present-but-empty sheet counts as missing; the match page
    /// sometimes renders without its stats card.
    pub fn has_stats(&self) -> bool {
        self.stats.as_ref().map_or(false, |s| !s.is_empty())
    }
}

/// One row scraped from a schedule page, before key derivation.
/// Turned into a `MatchRecord` only once its game id resolves.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub date_text: String,
    pub time: String,
    pub team1: String,
    pub team1_url: String,
    pub team2: String,
    pub team2_url: String,
    pub score: String,
    pub match_url: String,
    pub stats: Option<StatSheet>,
}

impl MatchCandidate {
    pub fn game_id(&self) -> Option<String> {
        game_id_from_url(&self.match_url)
    }

    /// A score cell of "v" marks a fixture that has not been played yet.
    pub fn played(&self) -> bool {
        !self.score.eq_ignore_ascii_case("v")
    }

    pub fn record(&self, game_id: String) -> MatchRecord {
        MatchRecord {
            game_id,
            date: self.date_text.clone(),
            team1: self.team1.clone(),
            team2: self.team2.clone(),
            score: self.score.clone(),
            title: format!("{} VS {}", self.team1, self.team2),
            match_url: self.match_url.clone(),
            stats: self.stats.clone(),
        }
    }
}

/// One row of a league table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub position: u32,
    pub name: String,
    pub stats: StandingStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct StandingStats {
    pub GP: i32,
    pub W: i32,
    pub D: i32,
    pub L: i32,
    pub F: i32,
    pub A: i32,
    pub GD: i32,
    pub P: i32,
}

/// One entry of a league's team registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub team: String,
    pub team_id: String,
    pub logo: String,
}

/// One upcoming match in the games-of-day file. Carries its league name so
/// the enrich and predict steps can run without the collection files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayGame {
    pub league: String,
    pub date: String,
    pub time: String,
    pub team1: String,
    pub team1_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1_logo: Option<String>,
    pub team2: String,
    pub team2_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2_logo: Option<String>,
    pub title: String,
    pub match_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league_standings: Option<Vec<StandingRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

/// Pull the numeric game id out of a match URL
/// (`.../football/match/_/gameId/724047/...`). `None` means the candidate
/// carries no usable key and must be dropped, never stored half-built.
pub fn game_id_from_url(url: &str) -> Option<String> {
    let re = Regex::new(r"gameId/(\d+)").unwrap();
    re.captures(url).map(|c| c[1].to_string())
}

/// Pull the numeric team id out of a team URL (`/soccer/team/_/id/360/...`).
pub fn team_id_from_url(url: &str) -> Option<String> {
    let re = Regex::new(r"/id/(\d+)").unwrap();
    re.captures(url).map(|c| c[1].to_string())
}
