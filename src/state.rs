use std::collections::VecDeque;

use serde::Deserialize;

use crate::players::{self, PlayerQuery};

pub const PLAYERS_PER_PAGE: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Fixtures,
    FplStats,
}

/// Per-pipeline lifecycle. A pipeline leaves `Idle` at most once per
/// activation and never returns to `Loading` without a fresh activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub abbr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub match_id: String,
    pub kickoff: String,
    pub kickoff_tz: String,
    pub period: String,
    pub competition: String,
    pub ground: String,
    pub home: Team,
    pub away: Team,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamStats {
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    pub position: u32,
    pub starting_position: Option<u32>,
}

impl TeamStats {
    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub team: Team,
    pub overall: TeamStats,
    pub home: TeamStats,
    pub away: TeamStats,
}

/// One element of the FPL bulk payload. Prices arrive in tenths of a
/// million; ownership and form arrive as decimal strings and stay that
/// way until a sort needs them numeric.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FplPlayer {
    pub id: u32,
    #[serde(rename = "web_name")]
    pub name: String,
    #[serde(rename = "team")]
    pub team_id: u32,
    #[serde(rename = "element_type")]
    pub position: u8,
    #[serde(rename = "now_cost")]
    pub price_tenths: u32,
    #[serde(rename = "selected_by_percent")]
    pub ownership: String,
    pub form: String,
    pub total_points: i32,
    #[serde(default)]
    pub ep_next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FplTeam {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,

    pub fixtures_phase: LoadPhase,
    pub fixtures: Vec<Fixture>,
    pub table: Vec<TableEntry>,
    pub matchweek: Option<u32>,
    pub fixtures_error: Option<String>,

    pub fpl_phase: LoadPhase,
    pub players: Vec<FplPlayer>,
    pub teams: Vec<FplTeam>,
    pub fpl_error: Option<String>,

    pub query: PlayerQuery,
    pub page: usize,

    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Fixtures,
            fixtures_phase: LoadPhase::Idle,
            fixtures: Vec::new(),
            table: Vec::new(),
            matchweek: None,
            fixtures_error: None,
            fpl_phase: LoadPhase::Idle,
            players: Vec::new(),
            teams: Vec::new(),
            fpl_error: None,
            query: PlayerQuery::default(),
            page: 1,
            help_overlay: false,
            logs: VecDeque::with_capacity(200),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn team_name(&self, team_id: u32) -> Option<&str> {
        self.teams
            .iter()
            .find(|t| t.id == team_id)
            .map(|t| t.name.as_str())
    }

    /// The full filtered+sorted list under the current query.
    pub fn filtered_players(&self) -> Vec<&FplPlayer> {
        players::filter_sorted(&self.players, &self.teams, &self.query)
    }

    pub fn total_pages(&self) -> usize {
        players::total_pages(self.filtered_players().len())
    }

    pub fn cycle_position(&mut self) {
        self.query.position = self.query.position.next();
        self.page = 1;
    }

    /// Steps the team filter through None (All) and every fetched team
    /// name, wrapping at either end.
    pub fn cycle_team(&mut self, forward: bool) {
        let current = self
            .query
            .team
            .as_deref()
            .and_then(|name| self.teams.iter().position(|t| t.name == name));
        let next = match (current, forward) {
            (None, true) => self.teams.first().map(|t| t.name.clone()),
            (None, false) => self.teams.last().map(|t| t.name.clone()),
            (Some(idx), true) => self.teams.get(idx + 1).map(|t| t.name.clone()),
            (Some(0), false) => None,
            (Some(idx), false) => self.teams.get(idx - 1).map(|t| t.name.clone()),
        };
        self.query.team = next;
        self.page = 1;
    }

    pub fn adjust_max_price(&mut self, delta_tenths: i32) {
        let current = self.query.max_price_tenths as i64;
        let next = (current + delta_tenths as i64)
            .clamp(players::MIN_PRICE_TENTHS as i64, players::MAX_PRICE_TENTHS as i64);
        self.query.max_price_tenths = next as u32;
        self.page = 1;
    }

    pub fn cycle_sort(&mut self) {
        self.query.sort = self.query.sort.next();
        self.page = 1;
    }

    /// Out-of-range requests leave the current page untouched.
    pub fn set_page(&mut self, page: usize) {
        if page >= 1 && page <= self.total_pages() {
            self.page = page;
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    FixturesLoaded {
        matchweek: u32,
        fixtures: Vec<Fixture>,
        table: Vec<TableEntry>,
    },
    FixturesFailed(String),
    FplLoaded {
        players: Vec<FplPlayer>,
        teams: Vec<FplTeam>,
    },
    FplFailed(String),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchFixtures,
    FetchFplData,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::FixturesLoaded {
            matchweek,
            fixtures,
            table,
        } => {
            state.push_log(format!(
                "[INFO] Matchweek {matchweek}: {} fixtures, {} table rows",
                fixtures.len(),
                table.len()
            ));
            state.fixtures = fixtures;
            state.table = table;
            state.matchweek = Some(matchweek);
            state.fixtures_error = None;
            state.fixtures_phase = LoadPhase::Ready;
        }
        Delta::FixturesFailed(msg) => {
            // No partial rendering: a failed join leaves both halves empty.
            state.push_log(format!("[WARN] {msg}"));
            state.fixtures.clear();
            state.table.clear();
            state.matchweek = None;
            state.fixtures_error = Some(msg);
            state.fixtures_phase = LoadPhase::Failed;
        }
        Delta::FplLoaded { players, teams } => {
            state.push_log(format!(
                "[INFO] FPL data: {} players, {} teams",
                players.len(),
                teams.len()
            ));
            state.players = players;
            state.teams = teams;
            state.fpl_error = None;
            state.page = 1;
            state.fpl_phase = LoadPhase::Ready;
        }
        Delta::FplFailed(msg) => {
            state.push_log(format!("[WARN] {msg}"));
            state.players.clear();
            state.teams.clear();
            state.fpl_error = Some(msg);
            state.fpl_phase = LoadPhase::Failed;
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
