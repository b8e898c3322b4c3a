use std::env;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::http_client::{fetch_json, http_client};
use crate::state::{Fixture, TableEntry, Team, TeamStats};

const DEFAULT_PL_API_BASE: &str = "https://footballapi.pulselive.com/football";

fn api_base() -> String {
    env::var("PL_API_BASE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PL_API_BASE.to_string())
}

#[derive(Debug, Clone)]
pub struct MatchweekBundle {
    pub matchweek: u32,
    pub fixtures: Vec<Fixture>,
    pub table: Vec<TableEntry>,
}

/// Resolves the current matchweek, then fetches its fixtures and the
/// standings table in parallel. One attempt per dependency, no retries.
pub fn fetch_matchweek_bundle() -> Result<MatchweekBundle> {
    let client = http_client()?;
    let base = api_base();

    let body = fetch_json(client, &format!("{base}/matchweek"))
        .context("could not load matchweek schedule")?;
    let matchweek = parse_matchweek_json(&body)?;

    let fixtures_url = format!("{base}/fixtures?matchweek={matchweek}");
    let standings_url = format!("{base}/standings?matchweek={matchweek}");
    assemble_bundle(
        matchweek,
        || {
            let body =
                fetch_json(client, &fixtures_url).context("could not load fixtures")?;
            parse_fixtures_json(&body)
        },
        || {
            let body =
                fetch_json(client, &standings_url).context("could not load standings")?;
            parse_standings_json(&body)
        },
    )
}

/// Joins the two matchweek halves; if either half fails the whole bundle
/// fails, so no fixtures-without-table state ever reaches the UI.
pub fn assemble_bundle<F, G>(
    matchweek: u32,
    fetch_fixtures: F,
    fetch_standings: G,
) -> Result<MatchweekBundle>
where
    F: FnOnce() -> Result<Vec<Fixture>> + Send,
    G: FnOnce() -> Result<Vec<TableEntry>> + Send,
{
    let (fixtures, table) = rayon::join(fetch_fixtures, fetch_standings);
    Ok(MatchweekBundle {
        matchweek,
        fixtures: fixtures?,
        table: table?,
    })
}

pub fn parse_matchweek_json(raw: &str) -> Result<u32> {
    let root = parse_body(raw, "matchweek")?;
    match pick_u32(&root, &["matchweek"]) {
        Some(n) => Ok(n),
        None => bail!("could not determine matchweek"),
    }
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Fixture>> {
    let root = parse_body(raw, "fixtures")?;
    let entries = root
        .get("data")
        .and_then(|v| v.as_array())
        .context("could not determine fixture list")?;
    entries.iter().map(parse_fixture).collect()
}

fn parse_fixture(v: &Value) -> Result<Fixture> {
    let match_id = pick_id(v, &["matchId", "id"]).context("fixture missing match id")?;
    let home = parse_team(v.get("homeTeam").context("fixture missing home team")?)?;
    let away = parse_team(v.get("awayTeam").context("fixture missing away team")?)?;
    Ok(Fixture {
        match_id,
        kickoff: pick_string(v, &["kickoff"]).unwrap_or_default(),
        kickoff_tz: pick_string(v, &["kickoffTimezone"]).unwrap_or_default(),
        period: pick_string(v, &["period"]).unwrap_or_default(),
        competition: pick_string(v, &["competition"]).unwrap_or_default(),
        ground: pick_string(v, &["ground"]).unwrap_or_default(),
        home,
        away,
    })
}

pub fn parse_standings_json(raw: &str) -> Result<Vec<TableEntry>> {
    let root = parse_body(raw, "standings")?;
    let entries = root
        .get("tables")
        .and_then(|t| t.get(0))
        .and_then(|t| t.get("entries"))
        .and_then(|v| v.as_array())
        .context("could not determine standings table")?;
    let mut out = entries
        .iter()
        .map(parse_table_entry)
        .collect::<Result<Vec<_>>>()?;
    out.sort_by_key(|entry| entry.overall.position);
    Ok(out)
}

fn parse_table_entry(v: &Value) -> Result<TableEntry> {
    let team = parse_team(v.get("team").context("table entry missing team")?)?;
    let overall = parse_stats(v.get("overall").context("table entry missing overall stats")?)?;
    Ok(TableEntry {
        team,
        overall,
        home: parse_split(v, "home")?,
        away: parse_split(v, "away")?,
    })
}

// The home/away split is explicitly optional upstream; a missing or null
// split becomes the zero-value record, never an error.
fn parse_split(v: &Value, key: &str) -> Result<TeamStats> {
    match v.get(key) {
        None | Some(Value::Null) => Ok(TeamStats::default()),
        Some(split) => parse_stats(split),
    }
}

fn parse_stats(v: &Value) -> Result<TeamStats> {
    Ok(TeamStats {
        played: pick_u32(v, &["played"]).context("stats missing played")?,
        won: pick_u32(v, &["won"]).context("stats missing won")?,
        drawn: pick_u32(v, &["drawn"]).context("stats missing drawn")?,
        lost: pick_u32(v, &["lost"]).context("stats missing lost")?,
        goals_for: pick_u32(v, &["goalsFor"]).context("stats missing goalsFor")?,
        goals_against: pick_u32(v, &["goalsAgainst"]).context("stats missing goalsAgainst")?,
        points: pick_u32(v, &["points"]).context("stats missing points")?,
        position: pick_u32(v, &["position"]).context("stats missing position")?,
        starting_position: pick_u32(v, &["startingPosition"]),
    })
}

// Team objects arrive either flat ({id, name, shortName, abbr}) or with
// the club naming nested ({name, club: {id, shortName, abbr}}).
fn parse_team(v: &Value) -> Result<Team> {
    let club = v.get("club");
    let id = pick_id(v, &["id"])
        .or_else(|| club.and_then(|c| pick_id(c, &["id"])))
        .context("team missing id")?;
    let name = pick_string(v, &["name"])
        .or_else(|| club.and_then(|c| pick_string(c, &["name"])))
        .context("team missing name")?;
    let short_name = pick_string(v, &["shortName"])
        .or_else(|| club.and_then(|c| pick_string(c, &["shortName"])))
        .unwrap_or_else(|| name.clone());
    let abbr =
        pick_string(v, &["abbr"]).or_else(|| club.and_then(|c| pick_string(c, &["abbr"])));
    Ok(Team {
        id,
        name,
        short_name,
        abbr,
    })
}

fn parse_body(raw: &str, what: &str) -> Result<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        bail!("invalid {what} response");
    }
    serde_json::from_str(trimmed).with_context(|| format!("invalid {what} response"))
}

// Identity fields are number-or-string upstream; both coerce to string.
fn pick_id(v: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match v.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn pick_string(v: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = v.get(*key).and_then(|x| x.as_str()) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn pick_u32(v: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(x) = v.get(*key) {
            if let Some(num) = x.as_u64() {
                return Some(num as u32);
            }
            if let Some(s) = x.as_str() {
                if let Ok(num) = s.trim().parse::<u32>() {
                    return Some(num);
                }
            }
        }
    }
    None
}
