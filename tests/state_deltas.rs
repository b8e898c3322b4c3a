use anyhow::bail;

use pl_terminal::fixtures_fetch::assemble_bundle;
use pl_terminal::state::{
    AppState, Delta, Fixture, FplPlayer, FplTeam, LoadPhase, Team, TeamStats, TableEntry,
    apply_delta,
};

fn team(id: &str, name: &str) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
        short_name: name.to_string(),
        abbr: None,
    }
}

fn fixture(match_id: &str) -> Fixture {
    Fixture {
        match_id: match_id.to_string(),
        kickoff: "2025-11-22 15:00:00".to_string(),
        kickoff_tz: "GMT".to_string(),
        period: "PreMatch".to_string(),
        competition: "Premier League".to_string(),
        ground: "Somewhere".to_string(),
        home: team("1", "Home"),
        away: team("2", "Away"),
    }
}

fn table_entry(id: &str, name: &str, position: u32) -> TableEntry {
    TableEntry {
        team: team(id, name),
        overall: TeamStats {
            position,
            played: 3,
            won: 1,
            drawn: 1,
            lost: 1,
            goals_for: 4,
            goals_against: 3,
            points: 4,
            starting_position: None,
        },
        home: TeamStats::default(),
        away: TeamStats::default(),
    }
}

fn fpl_player(id: u32, points: i32) -> FplPlayer {
    FplPlayer {
        id,
        name: format!("P{id}"),
        team_id: 1,
        position: 3,
        price_tenths: 50,
        ownership: "5.0".to_string(),
        form: "3.0".to_string(),
        total_points: points,
        ep_next: None,
    }
}

#[test]
fn fixtures_loaded_reaches_ready_and_clears_error() {
    let mut state = AppState::new();
    state.fixtures_phase = LoadPhase::Loading;
    state.fixtures_error = Some("stale".to_string());

    apply_delta(
        &mut state,
        Delta::FixturesLoaded {
            matchweek: 11,
            fixtures: vec![fixture("m1")],
            table: vec![table_entry("1", "Home", 1)],
        },
    );

    assert_eq!(state.fixtures_phase, LoadPhase::Ready);
    assert_eq!(state.matchweek, Some(11));
    assert_eq!(state.fixtures.len(), 1);
    assert_eq!(state.table.len(), 1);
    assert!(state.fixtures_error.is_none());
}

#[test]
fn fixtures_failure_leaves_no_partial_data() {
    let mut state = AppState::new();
    state.fixtures_phase = LoadPhase::Loading;
    // Even if earlier data had landed, a failed activation clears it.
    state.fixtures = vec![fixture("m1")];
    state.table = vec![table_entry("1", "Home", 1)];
    state.matchweek = Some(10);

    apply_delta(
        &mut state,
        Delta::FixturesFailed("could not load standings".to_string()),
    );

    assert_eq!(state.fixtures_phase, LoadPhase::Failed);
    assert!(state.fixtures.is_empty());
    assert!(state.table.is_empty());
    assert_eq!(state.matchweek, None);
    assert_eq!(
        state.fixtures_error.as_deref(),
        Some("could not load standings")
    );
}

#[test]
fn both_terminal_states_clear_loading() {
    let mut ready = AppState::new();
    ready.fixtures_phase = LoadPhase::Loading;
    apply_delta(
        &mut ready,
        Delta::FixturesLoaded {
            matchweek: 1,
            fixtures: Vec::new(),
            table: Vec::new(),
        },
    );
    assert_ne!(ready.fixtures_phase, LoadPhase::Loading);

    let mut failed = AppState::new();
    failed.fixtures_phase = LoadPhase::Loading;
    apply_delta(&mut failed, Delta::FixturesFailed("boom".to_string()));
    assert_ne!(failed.fixtures_phase, LoadPhase::Loading);
}

#[test]
fn standings_failure_fails_the_whole_join() {
    // Fixtures half succeeds, standings half fails: the bundle as a whole
    // must fail so nothing partial is rendered.
    let result = assemble_bundle(
        11,
        || Ok(vec![fixture("m1")]),
        || bail!("could not load standings"),
    );
    let err = result.expect_err("join should fail as a whole");
    assert!(err.to_string().contains("could not load standings"));
}

#[test]
fn fixtures_failure_fails_the_whole_join() {
    let result = assemble_bundle(
        11,
        || bail!("could not load fixtures"),
        || Ok(vec![table_entry("1", "Home", 1)]),
    );
    assert!(result.is_err());
}

#[test]
fn join_succeeds_when_both_halves_succeed() {
    let bundle = assemble_bundle(
        7,
        || Ok(vec![fixture("m1"), fixture("m2")]),
        || Ok(vec![table_entry("1", "Home", 1)]),
    )
    .expect("both halves ok");
    assert_eq!(bundle.matchweek, 7);
    assert_eq!(bundle.fixtures.len(), 2);
    assert_eq!(bundle.table.len(), 1);
}

#[test]
fn fpl_loaded_resets_page_and_clears_error() {
    let mut state = AppState::new();
    state.fpl_phase = LoadPhase::Loading;
    state.fpl_error = Some("stale".to_string());
    state.page = 3;

    apply_delta(
        &mut state,
        Delta::FplLoaded {
            players: (1..=23).map(|id| fpl_player(id, id as i32)).collect(),
            teams: vec![FplTeam {
                id: 1,
                name: "Arsenal".to_string(),
            }],
        },
    );

    assert_eq!(state.fpl_phase, LoadPhase::Ready);
    assert_eq!(state.page, 1);
    assert!(state.fpl_error.is_none());
    assert_eq!(state.players.len(), 23);
}

#[test]
fn fpl_failure_clears_data_and_loading() {
    let mut state = AppState::new();
    state.fpl_phase = LoadPhase::Loading;
    apply_delta(&mut state, Delta::FplFailed("could not load FPL data".to_string()));
    assert_eq!(state.fpl_phase, LoadPhase::Failed);
    assert!(state.players.is_empty());
    assert!(state.teams.is_empty());
    assert_eq!(state.fpl_error.as_deref(), Some("could not load FPL data"));
}

#[test]
fn changing_any_filter_parameter_resets_page() {
    let mut state = AppState::new();
    state.players = (1..=23).map(|id| fpl_player(id, id as i32)).collect();
    state.teams = vec![FplTeam {
        id: 1,
        name: "Arsenal".to_string(),
    }];

    state.set_page(2);
    assert_eq!(state.page, 2);
    state.cycle_sort();
    assert_eq!(state.page, 1);

    state.set_page(3);
    state.cycle_position();
    assert_eq!(state.page, 1);
    // Back to the All position so later pages exist again.
    for _ in 0..4 {
        state.cycle_position();
    }

    state.set_page(2);
    state.cycle_team(true);
    assert_eq!(state.page, 1);

    state.set_page(2);
    state.adjust_max_price(-5);
    assert_eq!(state.page, 1);
}

#[test]
fn out_of_range_page_requests_are_ignored() {
    let mut state = AppState::new();
    state.players = (1..=23).map(|id| fpl_player(id, id as i32)).collect();
    assert_eq!(state.total_pages(), 3);

    state.set_page(2);
    state.set_page(0);
    assert_eq!(state.page, 2);
    state.set_page(4);
    assert_eq!(state.page, 2);
    state.set_page(3);
    assert_eq!(state.page, 3);
}

#[test]
fn team_cycle_wraps_through_all_and_back() {
    let mut state = AppState::new();
    state.teams = vec![
        FplTeam {
            id: 1,
            name: "Arsenal".to_string(),
        },
        FplTeam {
            id: 2,
            name: "Man City".to_string(),
        },
    ];

    assert_eq!(state.query.team, None);
    state.cycle_team(true);
    assert_eq!(state.query.team.as_deref(), Some("Arsenal"));
    state.cycle_team(true);
    assert_eq!(state.query.team.as_deref(), Some("Man City"));
    state.cycle_team(true);
    assert_eq!(state.query.team, None);
    state.cycle_team(false);
    assert_eq!(state.query.team.as_deref(), Some("Man City"));
}

#[test]
fn log_delta_lands_in_console_ring() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::Log("[INFO] hello".to_string()));
    assert_eq!(state.logs.back().map(String::as_str), Some("[INFO] hello"));
}
