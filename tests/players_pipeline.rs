use pl_terminal::players::{
    self, PlayerQuery, PositionFilter, SortKey, filter_sorted, page_slice, total_pages,
};
use pl_terminal::state::{FplPlayer, FplTeam, PLAYERS_PER_PAGE};

fn player(id: u32, name: &str, team_id: u32, position: u8, price_tenths: u32) -> FplPlayer {
    FplPlayer {
        id,
        name: name.to_string(),
        team_id,
        position,
        price_tenths,
        ownership: "10.0".to_string(),
        form: "5.0".to_string(),
        total_points: id as i32,
        ep_next: None,
    }
}

fn teams() -> Vec<FplTeam> {
    vec![
        FplTeam {
            id: 1,
            name: "Arsenal".to_string(),
        },
        FplTeam {
            id: 2,
            name: "Man City".to_string(),
        },
    ]
}

#[test]
fn twenty_three_players_paginate_into_three_pages() {
    // total_points == id, so ids 23..13 are the top page in descending order.
    let players: Vec<FplPlayer> = (1..=23)
        .map(|id| player(id, &format!("P{id}"), 1, 3, 50))
        .collect();
    let query = PlayerQuery::default();

    let filtered = filter_sorted(&players, &teams(), &query);
    assert_eq!(filtered.len(), 23);
    assert_eq!(total_pages(filtered.len()), 3);

    let page1 = page_slice(&filtered, 1);
    assert_eq!(page1.len(), PLAYERS_PER_PAGE);
    let points: Vec<i32> = page1.iter().map(|p| p.total_points).collect();
    assert_eq!(points, (13..=23).rev().collect::<Vec<i32>>());

    let page3 = page_slice(&filtered, 3);
    assert_eq!(page3.len(), 1);
    assert_eq!(page3[0].total_points, 1);
}

#[test]
fn max_price_bound_is_inclusive() {
    let players = vec![
        player(1, "Cheap", 1, 3, 45),
        player(2, "Exact", 1, 3, 80),
        player(3, "Dear", 1, 3, 81),
    ];
    let query = PlayerQuery {
        max_price_tenths: 80,
        ..PlayerQuery::default()
    };

    let filtered = filter_sorted(&players, &teams(), &query);
    assert!(filtered.iter().all(|p| p.price_tenths <= 80));
    assert!(filtered.iter().any(|p| p.name == "Exact"));
    assert!(!filtered.iter().any(|p| p.name == "Dear"));
}

#[test]
fn team_and_position_filters_are_anded() {
    let players = vec![
        player(1, "Arsenal Mid", 1, 3, 50),
        player(2, "Arsenal Fwd", 1, 4, 50),
        player(3, "City Mid", 2, 3, 50),
    ];
    let query = PlayerQuery {
        position: PositionFilter::Midfielder,
        team: Some("Arsenal".to_string()),
        ..PlayerQuery::default()
    };

    let filtered = filter_sorted(&players, &teams(), &query);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "Arsenal Mid");
    assert_eq!(filtered[0].team_id, 1);
    assert_eq!(filtered[0].position, 3);
}

#[test]
fn unknown_team_name_applies_no_team_filter() {
    let players = vec![player(1, "A", 1, 3, 50), player(2, "B", 2, 3, 50)];
    let query = PlayerQuery {
        team: Some("Wimbledon".to_string()),
        ..PlayerQuery::default()
    };
    assert_eq!(filter_sorted(&players, &teams(), &query).len(), 2);
}

#[test]
fn pipeline_is_idempotent_and_does_not_mutate_source() {
    let players: Vec<FplPlayer> = (1..=23)
        .map(|id| player(id, &format!("P{id}"), 1 + id % 2, 2 + (id % 3) as u8, 40 + id))
        .collect();
    let snapshot = players.clone();
    let query = PlayerQuery {
        sort: SortKey::Price,
        max_price_tenths: 60,
        ..PlayerQuery::default()
    };

    let first: Vec<u32> = filter_sorted(&players, &teams(), &query)
        .iter()
        .map(|p| p.id)
        .collect();
    let second: Vec<u32> = filter_sorted(&players, &teams(), &query)
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(first, second);
    assert_eq!(players, snapshot);
}

#[test]
fn sorts_descending_on_decimal_string_keys() {
    let mut a = player(1, "A", 1, 3, 50);
    a.form = "2.5".to_string();
    a.ownership = "60.1".to_string();
    let mut b = player(2, "B", 1, 3, 50);
    b.form = "8.0".to_string();
    b.ownership = "4.9".to_string();
    let mut c = player(3, "C", 1, 3, 50);
    c.form = "not-a-number".to_string();
    c.ownership = "30.0".to_string();
    let players = vec![a, b, c];

    let form_query = PlayerQuery {
        sort: SortKey::Form,
        ..PlayerQuery::default()
    };
    let by_form: Vec<&str> = filter_sorted(&players, &teams(), &form_query)
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    // Unparseable form sorts as zero, landing last.
    assert_eq!(by_form, ["B", "A", "C"]);

    let own_query = PlayerQuery {
        sort: SortKey::Ownership,
        ..PlayerQuery::default()
    };
    let by_ownership: Vec<&str> = filter_sorted(&players, &teams(), &own_query)
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(by_ownership, ["A", "C", "B"]);
}

#[test]
fn page_slice_outside_range_is_empty() {
    let players: Vec<FplPlayer> = (1..=5).map(|id| player(id, "P", 1, 3, 50)).collect();
    let filtered = filter_sorted(&players, &teams(), &PlayerQuery::default());
    assert!(page_slice(&filtered, 0).is_empty());
    assert_eq!(page_slice(&filtered, 1).len(), 5);
    assert!(page_slice(&filtered, 2).is_empty());
}

#[test]
fn total_pages_of_empty_list_is_zero() {
    assert_eq!(total_pages(0), 0);
    assert_eq!(total_pages(1), 1);
    assert_eq!(total_pages(11), 1);
    assert_eq!(total_pages(12), 2);
}

#[test]
fn default_query_sorts_by_total_points() {
    let query = PlayerQuery::default();
    assert_eq!(query.sort, SortKey::TotalPoints);
    assert_eq!(query.position, PositionFilter::All);
    assert_eq!(query.team, None);
    assert_eq!(query.max_price_tenths, players::MAX_PRICE_TENTHS);
}
