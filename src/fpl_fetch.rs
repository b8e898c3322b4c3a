use std::env;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::http_client::{fetch_json, http_client};
use crate::state::{FplPlayer, FplTeam};

const DEFAULT_FPL_API_BASE: &str = "https://fantasy.premierleague.com/api";

fn api_base() -> String {
    env::var("FPL_API_BASE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FPL_API_BASE.to_string())
}

#[derive(Debug, Clone)]
pub struct FplBundle {
    pub players: Vec<FplPlayer>,
    pub teams: Vec<FplTeam>,
}

#[derive(Debug, Deserialize)]
struct BootstrapResponse {
    elements: Vec<FplPlayer>,
    teams: Vec<FplTeam>,
}

/// One bulk call covering every player and team; re-fetched from scratch
/// on each activation.
pub fn fetch_fpl_bundle() -> Result<FplBundle> {
    let client = http_client()?;
    let url = format!("{}/bootstrap-static/", api_base());
    let body = fetch_json(client, &url).context("could not load FPL data")?;
    parse_bootstrap_json(&body)
}

pub fn parse_bootstrap_json(raw: &str) -> Result<FplBundle> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        bail!("invalid FPL response");
    }
    let parsed: BootstrapResponse =
        serde_json::from_str(trimmed).context("invalid FPL response")?;
    Ok(FplBundle {
        players: parsed.elements,
        teams: parsed.teams,
    })
}
