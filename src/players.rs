use std::cmp::Ordering;

use crate::state::{FplPlayer, FplTeam, PLAYERS_PER_PAGE};

// Price slider bounds from the FPL game itself: cheapest assets sit at
// £3.5m, the ceiling comfortably above the priciest player.
pub const MIN_PRICE_TENTHS: u32 = 35;
pub const MAX_PRICE_TENTHS: u32 = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFilter {
    All,
    Goalkeeper,
    Defender,
    Midfielder,
    Attacker,
}

impl PositionFilter {
    /// Upstream element_type this filter matches, `None` for All.
    pub fn code(self) -> Option<u8> {
        match self {
            PositionFilter::All => None,
            PositionFilter::Goalkeeper => Some(1),
            PositionFilter::Defender => Some(2),
            PositionFilter::Midfielder => Some(3),
            PositionFilter::Attacker => Some(4),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PositionFilter::All => "All",
            PositionFilter::Goalkeeper => "GK",
            PositionFilter::Defender => "DEF",
            PositionFilter::Midfielder => "MID",
            PositionFilter::Attacker => "ATT",
        }
    }

    pub fn next(self) -> Self {
        match self {
            PositionFilter::All => PositionFilter::Goalkeeper,
            PositionFilter::Goalkeeper => PositionFilter::Defender,
            PositionFilter::Defender => PositionFilter::Midfielder,
            PositionFilter::Midfielder => PositionFilter::Attacker,
            PositionFilter::Attacker => PositionFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TotalPoints,
    Price,
    Form,
    Ownership,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::TotalPoints => "Total Points",
            SortKey::Price => "Price",
            SortKey::Form => "Form",
            SortKey::Ownership => "Owned (%)",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortKey::TotalPoints => SortKey::Price,
            SortKey::Price => SortKey::Form,
            SortKey::Form => SortKey::Ownership,
            SortKey::Ownership => SortKey::TotalPoints,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerQuery {
    pub position: PositionFilter,
    /// `None` means All. A name with no matching team applies no team
    /// filter at all rather than emptying the list.
    pub team: Option<String>,
    pub max_price_tenths: u32,
    pub sort: SortKey,
}

impl Default for PlayerQuery {
    fn default() -> Self {
        Self {
            position: PositionFilter::All,
            team: None,
            max_price_tenths: MAX_PRICE_TENTHS,
            sort: SortKey::TotalPoints,
        }
    }
}

/// Filters are AND-ed across position, team and price; the price bound is
/// inclusive. Sorting is always descending on the chosen key; ties keep
/// the source order (stable sort over the fetched list). The source slice
/// is never reordered.
pub fn filter_sorted<'a>(
    players: &'a [FplPlayer],
    teams: &[FplTeam],
    query: &PlayerQuery,
) -> Vec<&'a FplPlayer> {
    let team_id = query
        .team
        .as_deref()
        .and_then(|name| teams.iter().find(|t| t.name == name))
        .map(|t| t.id);

    let mut out: Vec<&FplPlayer> = players
        .iter()
        .filter(|p| query.position.code().is_none_or(|code| p.position == code))
        .filter(|p| team_id.is_none_or(|id| p.team_id == id))
        .filter(|p| p.price_tenths <= query.max_price_tenths)
        .collect();

    match query.sort {
        SortKey::TotalPoints => out.sort_by(|a, b| b.total_points.cmp(&a.total_points)),
        SortKey::Price => out.sort_by(|a, b| b.price_tenths.cmp(&a.price_tenths)),
        SortKey::Form => out.sort_by(|a, b| {
            decimal(&b.form)
                .partial_cmp(&decimal(&a.form))
                .unwrap_or(Ordering::Equal)
        }),
        SortKey::Ownership => out.sort_by(|a, b| {
            decimal(&b.ownership)
                .partial_cmp(&decimal(&a.ownership))
                .unwrap_or(Ordering::Equal)
        }),
    }

    out
}

pub fn total_pages(filtered_len: usize) -> usize {
    filtered_len.div_ceil(PLAYERS_PER_PAGE)
}

/// One page of the filtered list, 1-based. Pages outside the valid range
/// come back empty; callers guard page changes via `AppState::set_page`.
pub fn page_slice<'a, 'b>(filtered: &'b [&'a FplPlayer], page: usize) -> &'b [&'a FplPlayer] {
    if page == 0 {
        return &[];
    }
    let start = (page - 1) * PLAYERS_PER_PAGE;
    if start >= filtered.len() {
        return &[];
    }
    let end = (start + PLAYERS_PER_PAGE).min(filtered.len());
    &filtered[start..end]
}

pub fn position_label(code: u8) -> &'static str {
    match code {
        1 => "GK",
        2 => "DEF",
        3 => "MID",
        4 => "ATT",
        _ => "?",
    }
}

pub fn price_label(tenths: u32) -> String {
    format!("£{:.1}", tenths as f32 / 10.0)
}

// Upstream sends form/ownership as decimal strings; anything unparseable
// sorts as zero rather than erroring.
fn decimal(raw: &str) -> f32 {
    raw.trim().parse::<f32>().unwrap_or(0.0)
}
