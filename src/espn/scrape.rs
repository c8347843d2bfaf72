//! Pure HTML-to-record parsers. Selectors track the current ESPN markup and
//! are expected to break when the site changes; every parser degrades to
//! "fewer rows", never to an error.

use scraper::{ElementRef, Html, Selector};

use crate::espn::endpoints::absolute_url;
use crate::records::{
    team_id_from_url, MatchCandidate, StandingRow, StandingStats, StatLine, StatSheet, TeamEntry,
};

fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse one schedule page into match candidates. Rows without two team
/// anchors or a score anchor are ignored. `fallback_date` stands in when a
/// table carries no title.
pub fn parse_schedule(html: &str, fallback_date: &str) -> Vec<MatchCandidate> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("div.ResponsiveTable").unwrap();
    let title_sel = Selector::parse("div.Table__Title").unwrap();
    let row_sel = Selector::parse("tbody > tr.Table__TR").unwrap();
    let team_sel = Selector::parse("span.Table__Team").unwrap();
    let anchor_sel = Selector::parse("a.AnchorLink").unwrap();
    let score_sel = Selector::parse("a.AnchorLink.at").unwrap();
    let time_sel = Selector::parse("td.date__col a").unwrap();

    let mut candidates = Vec::new();
    for table in document.select(&table_sel) {
        let date_text = table
            .select(&title_sel)
            .next()
            .map(text_of)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| fallback_date.to_string());

        for row in table.select(&row_sel) {
            // The team cell holds a logo anchor and a name anchor; the name
            // is always the last one.
            let teams: Vec<(String, String)> = row
                .select(&team_sel)
                .filter_map(|span| {
                    let a = span.select(&anchor_sel).last()?;
                    let name = text_of(a);
                    if name.is_empty() {
                        return None;
                    }
                    let href = a.value().attr("href").unwrap_or("").to_string();
                    Some((name, absolute_url(&href)))
                })
                .collect();
            if teams.len() != 2 {
                continue;
            }

            let score_tag = match row.select(&score_sel).next() {
                Some(tag) => tag,
                None => continue,
            };
            let href = match score_tag.value().attr("href") {
                Some(href) => href,
                None => continue,
            };
            let time = row.select(&time_sel).next().map(text_of).unwrap_or_default();

            candidates.push(MatchCandidate {
                date_text: date_text.clone(),
                time,
                team1: teams[0].0.clone(),
                team1_url: teams[0].1.clone(),
                team2: teams[1].0.clone(),
                team2_url: teams[1].1.clone(),
                score: text_of(score_tag),
                match_url: absolute_url(href),
                stats: None,
            });
        }
    }
    candidates
}

/// Parse the stats card of a match page. An absent card or malformed rows
/// yield an empty sheet, treated upstream as "no new information".
pub fn parse_match_stats(html: &str) -> StatSheet {
    let document = Html::parse_document(html);
    let card_sel = Selector::parse(r#"section[data-testid="prism-LayoutCard"]"#).unwrap();
    let row_sel = Selector::parse("div.LOSQp").unwrap();
    let name_sel = Selector::parse("span.OkRBU").unwrap();
    let value_sel = Selector::parse("span.bLeWt").unwrap();

    let mut sheet = StatSheet::new();
    let card = match document.select(&card_sel).next() {
        Some(card) => card,
        None => return sheet,
    };
    for row in card.select(&row_sel) {
        let name = match row.select(&name_sel).next() {
            Some(name) => text_of(name),
            None => continue,
        };
        let values: Vec<String> = row.select(&value_sel).map(text_of).collect();
        if values.len() >= 2 {
            sheet.insert(name, StatLine { home: values[0].clone(), away: values[1].clone() });
        }
    }
    sheet
}

/// Parse a standings page. ESPN splits the table in two: a fixed left table
/// with positions and names, and a scrolling table with the numbers; rows
/// are zipped by index.
pub fn parse_standings(html: &str) -> Vec<StandingRow> {
    let document = Html::parse_document(html);
    let team_rows_sel = Selector::parse("table.Table--fixed-left tbody tr").unwrap();
    let stat_rows_sel = Selector::parse(".Table__Scroller table tbody tr").unwrap();
    let team_link_sel = Selector::parse("div.team-link").unwrap();
    let pos_sel = Selector::parse(".team-position").unwrap();
    let name_sel = Selector::parse(".hide-mobile a").unwrap();
    let td_sel = Selector::parse("td").unwrap();

    let team_rows: Vec<_> = document.select(&team_rows_sel).collect();
    let stat_rows: Vec<_> = document.select(&stat_rows_sel).collect();

    let mut standings = Vec::new();
    for (i, (team_row, stat_row)) in team_rows.iter().zip(stat_rows.iter()).enumerate() {
        let team_link = match team_row.select(&team_link_sel).next() {
            Some(link) => link,
            None => continue,
        };
        let position = team_link
            .select(&pos_sel)
            .next()
            .and_then(|p| text_of(p).parse().ok())
            .unwrap_or(i as u32 + 1);
        let name = match team_link.select(&name_sel).next() {
            Some(name) => text_of(name),
            None => continue,
        };

        let cells: Vec<String> = stat_row.select(&td_sel).map(text_of).collect();
        if cells.len() < 8 {
            continue;
        }
        let numbers: Option<Vec<i32>> = cells[..8]
            .iter()
            .map(|c| c.replace('+', "").parse::<i32>().ok())
            .collect();
        let n = match numbers {
            Some(n) => n,
            None => continue,
        };

        standings.push(StandingRow {
            position,
            name,
            stats: StandingStats {
                GP: n[0],
                W: n[1],
                D: n[2],
                L: n[3],
                F: n[4],
                A: n[5],
                GD: n[6],
                P: n[7],
            },
        });
    }
    standings
}

/// Parse a league's team directory page.
pub fn parse_teams(html: &str) -> Vec<TeamEntry> {
    let document = Html::parse_document(html);
    let section_sel = Selector::parse("section.TeamLinks").unwrap();
    let name_sel = Selector::parse("h2").unwrap();
    let link_sel = Selector::parse(r#"a[href*="/soccer/team/_/id/"]"#).unwrap();

    let mut teams = Vec::new();
    for section in document.select(&section_sel) {
        let name = match section.select(&name_sel).next() {
            Some(name) => text_of(name),
            None => continue,
        };
        let href = match section.select(&link_sel).next().and_then(|a| a.value().attr("href")) {
            Some(href) => href,
            None => continue,
        };
        let team_id = match team_id_from_url(href) {
            Some(id) => id,
            None => continue,
        };
        let logo = crate::espn::endpoints::logo_url(&team_id);
        teams.push(TeamEntry { team: name, team_id, logo });
    }
    teams
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEDULE_HTML: &str = r#"
    <div class="ResponsiveTable">
      <div class="Table__Title">Saturday, August 29</div>
      <table><tbody>
        <tr class="Table__TR">
          <td><span class="Table__Team">
            <a class="AnchorLink" href="/soccer/team/_/id/357/leeds-united"><img src="x.png"></a>
            <a class="AnchorLink" href="/soccer/team/_/id/357/leeds-united">Leeds United</a>
          </span></td>
          <td><span class="Table__Team">
            <a class="AnchorLink" href="/soccer/team/_/id/368/everton">Everton</a>
          </span></td>
          <td><a class="AnchorLink at" href="/football/match/_/gameId/724047">2 - 1</a></td>
        </tr>
        <tr class="Table__TR">
          <td><span class="Table__Team">
            <a class="AnchorLink" href="/soccer/team/_/id/359/arsenal">Arsenal</a>
          </span></td>
          <td><span class="Table__Team">
            <a class="AnchorLink" href="/soccer/team/_/id/364/liverpool">Liverpool</a>
          </span></td>
          <td class="date__col"><a href="/football/match/_/gameId/724050">10:00 AM</a></td>
          <td><a class="AnchorLink at" href="/football/match/_/gameId/724050">v</a></td>
        </tr>
        <tr class="Table__TR">
          <td>Postponed</td>
        </tr>
      </tbody></table>
    </div>
    "#;

    #[test]
    fn schedule_rows_become_candidates() {
        let candidates = parse_schedule(SCHEDULE_HTML, "20260829");
        assert_eq!(candidates.len(), 2);

        let played = &candidates[0];
        assert_eq!(played.date_text, "Saturday, August 29");
        assert_eq!(played.team1, "Leeds United");
        assert_eq!(played.team2, "Everton");
        assert_eq!(played.score, "2 - 1");
        assert_eq!(played.match_url, "https://www.espn.com/football/match/_/gameId/724047");
        assert_eq!(played.game_id(), Some("724047".to_string()));
        assert!(played.played());

        let fixture = &candidates[1];
        assert!(!fixture.played());
        assert_eq!(fixture.time, "10:00 AM");
        assert_eq!(fixture.team1_url, "https://www.espn.com/soccer/team/_/id/359/arsenal");
    }

    #[test]
    fn schedule_without_title_uses_fallback_date() {
        let html = SCHEDULE_HTML.replace("Saturday, August 29", "");
        let candidates = parse_schedule(&html, "20260829");
        assert_eq!(candidates[0].date_text, "20260829");
    }

    const STATS_HTML: &str = r#"
    <section data-testid="prism-LayoutCard">
      <div class="LOSQp">
        <span class="OkRBU">Possession</span>
        <span class="bLeWt">61%</span><span class="bLeWt">39%</span>
      </div>
      <div class="LOSQp">
        <span class="OkRBU">Shots on Goal</span>
        <span class="bLeWt">7</span><span class="bLeWt">3</span>
      </div>
      <div class="LOSQp">
        <span class="OkRBU">Broken Row</span>
        <span class="bLeWt">1</span>
      </div>
    </section>
    "#;

    #[test]
    fn stats_card_becomes_sheet() {
        let sheet = parse_match_stats(STATS_HTML);
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet["Possession"].home, "61%");
        assert_eq!(sheet["Possession"].away, "39%");
        assert_eq!(sheet["Shots on Goal"].away, "3");
    }

    #[test]
    fn missing_stats_card_yields_empty_sheet() {
        assert!(parse_match_stats("<html><body></body></html>").is_empty());
    }

    const STANDINGS_HTML: &str = r#"
    <div>
      <table class="Table--fixed-left"><tbody>
        <tr><td><div class="team-link">
          <span class="team-position">1</span>
          <span class="hide-mobile"><a>Arsenal</a></span>
        </div></td></tr>
        <tr><td><div class="team-link">
          <span class="team-position">2</span>
          <span class="hide-mobile"><a>Liverpool</a></span>
        </div></td></tr>
      </tbody></table>
      <div class="Table__Scroller"><table><tbody>
        <tr><td>3</td><td>3</td><td>0</td><td>0</td><td>9</td><td>2</td><td>+7</td><td>9</td></tr>
        <tr><td>3</td><td>2</td><td>1</td><td>0</td><td>7</td><td>3</td><td>+4</td><td>7</td></tr>
      </tbody></table></div>
    </div>
    "#;

    #[test]
    fn standings_tables_are_zipped() {
        let rows = parse_standings(STANDINGS_HTML);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[0].name, "Arsenal");
        assert_eq!(rows[0].stats.GD, 7);
        assert_eq!(rows[0].stats.P, 9);
        assert_eq!(rows[1].name, "Liverpool");
        assert_eq!(rows[1].stats.W, 2);
    }

    const TEAMS_HTML: &str = r#"
    <section class="TeamLinks">
      <h2>Arsenal</h2>
      <a href="/soccer/team/_/id/359/arsenal">Squad</a>
    </section>
    <section class="TeamLinks">
      <h2>No Link Team</h2>
    </section>
    "#;

    #[test]
    fn team_directory_rows() {
        let teams = parse_teams(TEAMS_HTML);
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team, "Arsenal");
        assert_eq!(teams[0].team_id, "359");
        assert_eq!(teams[0].logo, "https://a.espncdn.com/i/teamlogos/soccer/500/359.png");
    }
}
