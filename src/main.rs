mod config;
mod espn;
mod predict;
mod records;
mod store;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use config::{league_by_name, Config, League, LEAGUES};
use espn::endpoints::{logo_url, EspnPage, MatchPage, SchedulePage, StandingsPage, TeamsPage};
use espn::params::{GameId, LeagueCode, SchedDate};
use espn::scrape;
use records::{team_id_from_url, DayGame, StandingRow, StatSheet, TeamEntry};
use store::{load_json_or_default, save_json, MatchSet, MergeOutcome};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct SirenCli {
    /// Root directory for scraped datasets
    #[clap(long, default_value = "data")]
    data_dir: PathBuf,

    #[clap(subcommand)]
    cmd: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Merge the last two days of results into the league collections
    Update,

    /// Scrape a full date range of results for one league
    History {
        /// League name or ESPN code, e.g. "Premier League" or "eng.1"
        league: String,

        /// First date, YYYY-MM-DD
        #[clap(long)]
        from: String,

        /// Last date, YYYY-MM-DD
        #[clap(long)]
        to: String,
    },

    /// Collect today's unplayed fixtures across all leagues
    Today,

    /// Scrape the league tables into one standings file
    Standings,

    /// Scrape the team registries into one teams file
    Teams,

    /// Join the games-of-day file with the standings file
    Enrich,

    /// Ask the model for an analysis of each enriched match
    Predict,
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = SirenCli::parse();
    let cfg = Config::new(args.data_dir);
    match args.cmd {
        Commands::Update => run_update(&cfg),
        Commands::History { league, from, to } => run_history(&cfg, &league, &from, &to),
        Commands::Today => run_today(&cfg),
        Commands::Standings => run_standings(&cfg),
        Commands::Teams => run_teams(&cfg),
        Commands::Enrich => run_enrich(&cfg),
        Commands::Predict => run_predict(&cfg),
    }
}

fn run_update(cfg: &Config) -> Result<()> {
    let today = Utc::now().date_naive();
    let dates = [today - chrono::Duration::days(2), today - chrono::Duration::days(1)];
    for league in LEAGUES {
        harvest_league(cfg, league, &dates)?;
    }
    Ok(())
}

fn run_history(cfg: &Config, league: &str, from: &str, to: &str) -> Result<()> {
    let league = match league_by_name(league) {
        Some(league) => league,
        None => bail!("unknown league: {}", league),
    };
    let from = NaiveDate::parse_from_str(from, "%Y-%m-%d").context("parsing --from")?;
    let to = NaiveDate::parse_from_str(to, "%Y-%m-%d").context("parsing --to")?;
    if from > to {
        bail!("--from is after --to");
    }
    harvest_league(cfg, league, &date_range(from, to))
}

/// Scrape the schedule pages for the given dates and merge the results into
/// the league's collection file. Per-date and per-match fetch errors degrade
/// to missing data; only the final save can fail the run.
fn harvest_league(cfg: &Config, league: &League, dates: &[NaiveDate]) -> Result<()> {
    log::info!("{}", league.name);
    let path = cfg.league_file(league);
    let mut set = MatchSet::load(&path);
    let mut total = MergeOutcome::default();

    for date in dates {
        log::info!("  {}", date.format("%Y%m%d"));
        let page = SchedulePage {
            league: LeagueCode::Code(league.code.to_string()),
            date: SchedDate::D(*date),
        };
        let html = match page.fetch(cfg) {
            Ok(html) => html,
            Err(e) => {
                log::warn!("schedule fetch failed for {} {}: {:#}", league.name, date, e);
                continue;
            }
        };

        let mut batch = Vec::new();
        for mut cand in scrape::parse_schedule(&html, &date.format("%Y%m%d").to_string()) {
            if !cand.played() {
                continue;
            }
            // Fetch the match page only when the collection still lacks
            // stats for this game; the merge never replaces populated ones.
            if let Some(id) = cand.game_id() {
                if set.get(&id).map_or(true, |rec| !rec.has_stats()) {
                    cand.stats = Some(fetch_stats(cfg, &id));
                }
            }
            batch.push(cand);
        }
        let outcome = set.merge(batch);
        total.inserted += outcome.inserted;
        total.backfilled += outcome.backfilled;
        total.skipped += outcome.skipped;
    }

    set.save(&path)?;
    log::info!(
        "{}: {} matches | +{} new | {} stats backfilled | {} skipped",
        league.name,
        set.len(),
        total.inserted,
        total.backfilled,
        total.skipped
    );
    Ok(())
}

fn fetch_stats(cfg: &Config, game_id: &str) -> StatSheet {
    let page = MatchPage { game_id: GameId::Id(game_id.to_string()) };
    match page.fetch(cfg) {
        Ok(html) => scrape::parse_match_stats(&html),
        Err(e) => {
            log::warn!("stats fetch failed for {}: {:#}", game_id, e);
            StatSheet::new()
        }
    }
}

fn run_today(cfg: &Config) -> Result<()> {
    let today = Utc::now().date_naive();
    let date_str = today.format("%Y%m%d").to_string();
    let mut games: Vec<DayGame> = Vec::new();

    for league in LEAGUES {
        let page = SchedulePage {
            league: LeagueCode::Code(league.code.to_string()),
            date: SchedDate::D(today),
        };
        let html = match page.fetch(cfg) {
            Ok(html) => html,
            Err(e) => {
                log::warn!("schedule fetch failed for {}: {:#}", league.name, e);
                continue;
            }
        };
        for cand in scrape::parse_schedule(&html, &date_str) {
            if cand.played() {
                continue;
            }
            games.push(DayGame {
                league: league.name.to_string(),
                date: date_str.clone(),
                time: cand.time.clone(),
                team1: cand.team1.clone(),
                team1_url: cand.team1_url.clone(),
                team1_logo: team_id_from_url(&cand.team1_url).map(|id| logo_url(&id)),
                team2: cand.team2.clone(),
                team2_url: cand.team2_url.clone(),
                team2_logo: team_id_from_url(&cand.team2_url).map(|id| logo_url(&id)),
                title: format!("{} VS {}", cand.team1, cand.team2),
                match_url: cand.match_url.clone(),
                league_standings: None,
                analysis: None,
            });
        }
    }

    save_json(&cfg.games_of_day_file(), &games)?;
    log::info!("{} fixtures saved for {}", games.len(), date_str);
    Ok(())
}

fn run_standings(cfg: &Config) -> Result<()> {
    let mut all: BTreeMap<String, Vec<StandingRow>> = BTreeMap::new();
    for league in LEAGUES {
        let page = StandingsPage { league: LeagueCode::Code(league.code.to_string()) };
        match page.fetch(cfg) {
            Ok(html) => {
                let rows = scrape::parse_standings(&html);
                log::info!("{}: {} teams", league.name, rows.len());
                all.insert(league.name.to_string(), rows);
            }
            Err(e) => {
                log::warn!("standings fetch failed for {}: {:#}", league.name, e);
            }
        }
    }
    save_json(&cfg.standings_file(), &all)
}

fn run_teams(cfg: &Config) -> Result<()> {
    let mut all: BTreeMap<String, Vec<TeamEntry>> = BTreeMap::new();
    for league in LEAGUES {
        let page = TeamsPage { league: LeagueCode::Code(league.code.to_string()) };
        let teams = match page.fetch(cfg) {
            Ok(html) => scrape::parse_teams(&html),
            Err(e) => {
                log::warn!("teams fetch failed for {}: {:#}", league.name, e);
                Vec::new()
            }
        };
        log::info!("{}: {} teams", league.name, teams.len());
        all.insert(league.name.to_string(), teams);
    }
    save_json(&cfg.teams_file(), &all)
}

fn run_enrich(cfg: &Config) -> Result<()> {
    let mut games: Vec<DayGame> = load_json_or_default(&cfg.games_of_day_file());
    if games.is_empty() {
        log::warn!("no games of day; run `today` first");
    }
    let standings: BTreeMap<String, Vec<StandingRow>> =
        load_json_or_default(&cfg.standings_file());

    for game in &mut games {
        let rows = standings.get(&game.league).cloned().unwrap_or_default();
        if rows.is_empty() {
            log::warn!("no standings found for league: {}", game.league);
        }
        game.league_standings = Some(rows);
    }

    let out = cfg.stats_file(Utc::now().date_naive());
    save_json(&out, &games)?;
    log::info!("{} matches enriched", games.len());
    Ok(())
}

fn run_predict(cfg: &Config) -> Result<()> {
    let today = Utc::now().date_naive();
    let input = cfg.stats_file(today);
    let raw = fs::read_to_string(&input)
        .with_context(|| format!("missing {}; run `enrich` first", input.display()))?;
    let mut games: Vec<DayGame> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", input.display()))?;
    log::info!("{} matches to analyse", games.len());

    predict::predict_all(cfg, &mut games)?;

    save_json(&cfg.predictions_file(today), &games)
}

fn date_range(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut d = from;
    while d <= to {
        dates.push(d);
        d = match d.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_is_inclusive() {
        let from = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let dates = date_range(from, to);
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0], from);
        assert_eq!(dates[2], to);
        assert_eq!(date_range(to, to).len(), 1);
    }
}
