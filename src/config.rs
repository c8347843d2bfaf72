use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

pub const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const MODEL_ID: &str = "openai/gpt-oss-120b";

/// One configured league: display name, ESPN league code, collection file.
pub struct League {
    pub name: &'static str,
    pub code: &'static str,
    pub file: &'static str,
}

pub const LEAGUES: &[League] = &[
    League { name: "Premier League", code: "eng.1", file: "England_Premier_League.json" },
    League { name: "LaLiga", code: "esp.1", file: "Spain_Laliga.json" },
    League { name: "Bundesliga", code: "ger.1", file: "Germany_Bundesliga.json" },
    League { name: "Argentina - Primera Nacional", code: "arg.2", file: "Argentina_Primera_Nacional.json" },
    League { name: "Austria - Bundesliga", code: "aut.1", file: "Austria_Bundesliga.json" },
    League { name: "Belgium - Jupiler Pro League", code: "bel.1", file: "Belgium_Jupiler_Pro_League.json" },
];

pub fn league_by_name(name: &str) -> Option<&'static League> {
    LEAGUES.iter().find(|l| l.name.eq_ignore_ascii_case(name) || l.code == name)
}

/// Read-only process configuration, built once in main and passed by
/// reference into every component.
pub struct Config {
    pub data_dir: PathBuf,
    pub fetch_delay: Duration,
    pub http_timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub groq_key: Option<String>,
    pub model_id: String,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Config {
        Config {
            data_dir,
            fetch_delay: Duration::from_millis(800),
            http_timeout: Duration::from_secs(15),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(5),
            groq_key: env::var("GROQ_API_KEY").ok(),
            model_id: MODEL_ID.to_string(),
        }
    }

    pub fn league_file(&self, league: &League) -> PathBuf {
        self.data_dir.join("football").join("leagues").join(league.file)
    }

    pub fn teams_file(&self) -> PathBuf {
        self.data_dir.join("football").join("teams").join("football_teams.json")
    }

    pub fn standings_file(&self) -> PathBuf {
        self.data_dir.join("football").join("standings").join("Standings.json")
    }

    pub fn games_of_day_file(&self) -> PathBuf {
        self.data_dir.join("football").join("games_of_day.json")
    }

    pub fn stats_file(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join("football")
            .join("predictions")
            .join(format!("stats_football-{}.json", date.format("%Y-%m-%d")))
    }

    pub fn predictions_file(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join("football")
            .join("predictions")
            .join(format!("predictions-{}.json", date.format("%Y-%m-%d")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_lookup_by_name_or_code() {
        assert!(league_by_name("Premier League").is_some());
        assert!(league_by_name("premier league").is_some());
        assert_eq!(league_by_name("esp.1").unwrap().name, "LaLiga");
        assert!(league_by_name("nope").is_none());
    }

    #[test]
    fn dated_output_paths() {
        let cfg = Config::new(PathBuf::from("data"));
        let d = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert!(cfg
            .stats_file(d)
            .ends_with("football/predictions/stats_football-2026-08-30.json"));
        assert!(cfg
            .predictions_file(d)
            .ends_with("football/predictions/predictions-2026-08-30.json"));
    }
}
