//! Groq chat-completions client for per-match analysis.
//!
//! Replaces the retry-forever behaviour of the original pipeline with a
//! bounded retry: a fixed number of attempts with a fixed delay, then a
//! placeholder string so the run always completes.

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};

use crate::config::{Config, GROQ_URL};
use crate::records::DayGame;

pub const ANALYSIS_UNAVAILABLE: &str = "analysis unavailable (api error)";

const GROQ_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.4;

const SYSTEM_PROMPT: &str = "You are a professional football analyst focused on \
data-driven match predictions. Your answers must be professional, detailed, \
structured and actionable.";

/// Build the user prompt for one match. The match JSON is embedded verbatim
/// so the model sees the standings block alongside the fixture.
pub fn build_prompt(game: &DayGame) -> Result<String> {
    let match_json = serde_json::to_string_pretty(game)?;
    Ok(format!(
        "You are a professional football analyst specialised in sports predictions. \
Analyse this match in depth from all available data: recent form, head-to-head, \
key statistics and trends, key players, implied probabilities, detailed standings.\n\
\n\
Tasks:\n\
\n\
1. Give a single human-readable prediction, one of:\n\
- {team1} win\n\
- {team2} win\n\
- {team1} win or draw\n\
- {team2} win or draw\n\
- Over 1.5 goals\n\
- Under 3.5 goals\n\
- Both teams to score: Yes\n\
- Both teams to score: No\n\
- Over 7.5 corners\n\
- Under 10.5 corners\n\
\n\
2. You may combine markets when the data justifies it (main result plus a \
total, or double chance plus a total).\n\
\n\
3. Justify the prediction in detail: tactics, recent form, head-to-head, key \
players.\n\
\n\
4. Finish with a strict JSON part containing only two fields:\n\
- \"prediction\": the full human-readable prediction\n\
- \"confidence\": an integer 0-100\n\
\n\
Match data:\n{match_json}\n",
        team1 = game.team1,
        team2 = game.team2,
        match_json = match_json,
    ))
}

/// One chat-completions call; the caller owns retry.
fn request_analysis(cfg: &Config, key: &str, game: &DayGame) -> Result<String> {
    let payload = json!({
        "model": cfg.model_id,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": build_prompt(game)? },
        ],
        "temperature": TEMPERATURE,
        "max_tokens": MAX_TOKENS,
    });
    let response: Value = ureq::post(GROQ_URL)
        .timeout(GROQ_TIMEOUT)
        .set("Authorization", &format!("Bearer {}", key))
        .send_json(payload)
        .context("groq request failed")?
        .into_json()
        .context("reading groq response")?;
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("empty completion from groq"))
}

/// Run `op` up to `attempts` times with a fixed delay between attempts,
/// returning the last error once they are exhausted.
pub fn with_retry<T, F>(attempts: u32, delay: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let attempts = attempts.max(1);
    let mut last_err = anyhow!("no attempts made");
    for attempt in 1..=attempts {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) => {
                log::warn!("attempt {}/{} failed: {:#}", attempt, attempts, e);
                last_err = e;
                if attempt < attempts {
                    thread::sleep(delay);
                }
            }
        }
    }
    Err(last_err)
}

/// Fill the `analysis` field of every game that does not have one yet.
/// A populated field is never replaced. API failures degrade to the
/// placeholder string; only a missing API key fails the run.
pub fn predict_all(cfg: &Config, games: &mut [DayGame]) -> Result<()> {
    let key = cfg
        .groq_key
        .as_deref()
        .ok_or_else(|| anyhow!("GROQ_API_KEY is not set"))?;
    let total = games.len();
    for (i, game) in games.iter_mut().enumerate() {
        if game.analysis.is_some() {
            log::debug!("analysis already present for {}", game.title);
            continue;
        }
        log::info!("analysing match {}/{}: {}", i + 1, total, game.title);
        let analysis = with_retry(cfg.retry_attempts, cfg.retry_delay, || {
            request_analysis(cfg, key, game)
        })
        .unwrap_or_else(|e| {
            log::error!("giving up on {}: {:#}", game.title, e);
            ANALYSIS_UNAVAILABLE.to_string()
        });
        game.analysis = Some(analysis);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> DayGame {
        DayGame {
            league: "Premier League".to_string(),
            date: "20260830".to_string(),
            time: "10:00 AM".to_string(),
            team1: "Arsenal".to_string(),
            team1_url: "https://www.espn.com/soccer/team/_/id/359/arsenal".to_string(),
            team1_logo: None,
            team2: "Liverpool".to_string(),
            team2_url: "https://www.espn.com/soccer/team/_/id/364/liverpool".to_string(),
            team2_logo: None,
            title: "Arsenal VS Liverpool".to_string(),
            match_url: "https://www.espn.com/football/match/_/gameId/724050".to_string(),
            league_standings: None,
            analysis: None,
        }
    }

    #[test]
    fn prompt_embeds_teams_and_match_json() {
        let prompt = build_prompt(&game()).unwrap();
        assert!(prompt.contains("- Arsenal win\n"));
        assert!(prompt.contains("- Liverpool win or draw\n"));
        assert!(prompt.contains("\"league\": \"Premier League\""));
        assert!(prompt.contains("\"confidence\""));
    }

    #[test]
    fn retry_stops_after_configured_attempts() {
        let mut calls = 0;
        let result: Result<()> = with_retry(3, Duration::from_millis(0), || {
            calls += 1;
            Err(anyhow!("boom"))
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn retry_returns_first_success() {
        let mut calls = 0;
        let result = with_retry(5, Duration::from_millis(0), || {
            calls += 1;
            if calls < 2 {
                Err(anyhow!("boom"))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        let mut calls = 0;
        let _: Result<()> = with_retry(0, Duration::from_millis(0), || {
            calls += 1;
            Err(anyhow!("boom"))
        });
        assert_eq!(calls, 1);
    }
}
