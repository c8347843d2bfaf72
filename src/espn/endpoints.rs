use std::thread;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::espn::params::*;

pub const ESPN_BASE_URL: &str = "https://www.espn.com";
const MATCH_BASE_URL: &str = "https://africa.espn.com";
const LOGO_URL: &str = "https://a.espncdn.com/i/teamlogos/soccer/500";

pub struct SchedulePage {
    pub league: LeagueCode,
    pub date: SchedDate,
}

pub struct MatchPage {
    pub game_id: GameId,
}

pub struct StandingsPage {
    pub league: LeagueCode,
}

pub struct TeamsPage {
    pub league: LeagueCode,
}

pub trait EspnPage {
    fn url(&self) -> String;

    fn fetch(&self, cfg: &Config) -> Result<String> {
        fetch_espn_html(cfg, &self.url())
    }
}

impl EspnPage for SchedulePage {
    fn url(&self) -> String {
        format!("{}/soccer/schedule/_/date/{}/league/{}", ESPN_BASE_URL, self.date, self.league)
    }
}

impl EspnPage for MatchPage {
    fn url(&self) -> String {
        format!("{}/football/match/_/gameId/{}", MATCH_BASE_URL, self.game_id)
    }
}

impl EspnPage for StandingsPage {
    fn url(&self) -> String {
        format!("{}/soccer/standings/_/league/{}", ESPN_BASE_URL, self.league)
    }
}

impl EspnPage for TeamsPage {
    fn url(&self) -> String {
        format!("{}/soccer/teams/_/league/{}", ESPN_BASE_URL, self.league)
    }
}

pub fn logo_url(team_id: &str) -> String {
    format!("{}/{}.png", LOGO_URL, team_id)
}

/// Turn a scraped href into a full URL. Schedule rows link relatively.
pub fn absolute_url(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", ESPN_BASE_URL, href)
    }
}

/// Blocking GET with browser-like headers, followed by the politeness delay.
/// ESPN serves an interstitial to clients without them.
fn fetch_espn_html(cfg: &Config, url: &str) -> Result<String> {
    log::debug!("GET {}", url);
    let body = ureq::get(url)
        .timeout(cfg.http_timeout)
        .set("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0")
        .set("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .set("Accept-Language", "en-US,en;q=0.9")
        .set("Referer", "https://www.espn.com/")
        .call()
        .with_context(|| format!("fetching {}", url))?
        .into_string()
        .with_context(|| format!("reading {}", url))?;
    thread::sleep(cfg.fetch_delay);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn page_urls() {
        let sched = SchedulePage {
            league: LeagueCode::Code("eng.1".to_string()),
            date: SchedDate::D(NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()),
        };
        assert_eq!(
            sched.url(),
            "https://www.espn.com/soccer/schedule/_/date/20260828/league/eng.1"
        );

        let m = MatchPage { game_id: GameId::Id("724047".to_string()) };
        assert_eq!(m.url(), "https://africa.espn.com/football/match/_/gameId/724047");

        let s = StandingsPage { league: LeagueCode::Code("esp.1".to_string()) };
        assert_eq!(s.url(), "https://www.espn.com/soccer/standings/_/league/esp.1");
    }

    #[test]
    fn hrefs_are_absolutized_once() {
        assert_eq!(
            absolute_url("/football/match/_/gameId/1"),
            "https://www.espn.com/football/match/_/gameId/1"
        );
        assert_eq!(absolute_url("https://x.example/y"), "https://x.example/y");
    }

    #[test]
    fn logo_url_from_team_id() {
        assert_eq!(logo_url("360"), "https://a.espncdn.com/i/teamlogos/soccer/500/360.png");
    }
}
