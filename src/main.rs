use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use pl_terminal::feed;
use pl_terminal::players::{self, SortKey};
use pl_terminal::state::{
    AppState, Delta, FplPlayer, LoadPhase, ProviderCommand, Screen, apply_delta,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('1') => self.state.screen = Screen::Fixtures,
            KeyCode::Char('2') => {
                self.state.screen = Screen::FplStats;
                self.activate_fpl();
            }
            _ if self.state.screen == Screen::FplStats => self.on_fpl_key(key),
            _ => {}
        }
    }

    fn on_fpl_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('p') => self.state.cycle_position(),
            KeyCode::Char('t') => self.state.cycle_team(true),
            KeyCode::Char('T') => self.state.cycle_team(false),
            KeyCode::Char('s') => self.state.cycle_sort(),
            KeyCode::Char('[') => self.state.adjust_max_price(-5),
            KeyCode::Char(']') => self.state.adjust_max_price(5),
            KeyCode::Left | KeyCode::Char('h') => {
                let page = self.state.page.saturating_sub(1);
                self.state.set_page(page);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.state.set_page(self.state.page + 1);
            }
            _ => {}
        }
    }

    // One fetch per activation; re-entering a screen never re-fetches.
    fn activate_fixtures(&mut self) {
        if self.state.fixtures_phase != LoadPhase::Idle {
            return;
        }
        self.state.fixtures_phase = LoadPhase::Loading;
        if self.cmd_tx.send(ProviderCommand::FetchFixtures).is_err() {
            apply_delta(
                &mut self.state,
                Delta::FixturesFailed("could not load fixtures".to_string()),
            );
        }
    }

    fn activate_fpl(&mut self) {
        if self.state.fpl_phase != LoadPhase::Idle {
            return;
        }
        self.state.fpl_phase = LoadPhase::Loading;
        if self.cmd_tx.send(ProviderCommand::FetchFplData).is_err() {
            apply_delta(
                &mut self.state,
                Delta::FplFailed("could not load FPL data".to_string()),
            );
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(tx, cmd_rx);

    let mut app = App::new(cmd_tx);
    app.activate_fixtures();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Fixtures => render_fixtures(frame, chunks[1], &app.state),
        Screen::FplStats => render_fpl(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Fixtures => match state.matchweek {
            Some(n) => format!("PL TERMINAL | Matchweek {n}"),
            None => "PL TERMINAL | Fixtures".to_string(),
        },
        Screen::FplStats => format!(
            "PL TERMINAL | FPL Stats | Sort: {}",
            state.query.sort.label()
        ),
    };
    format!("  _  {title}\n (_) Premier League hub\n")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Fixtures => "1 Fixtures | 2 FPL Stats | ? Help | q Quit".to_string(),
        Screen::FplStats => {
            "1 Fixtures | 2 FPL Stats | p Position | t/T Team | [/] Price | s Sort | ←/→ Page | ? Help | q Quit"
                .to_string()
        }
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(1)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_fixtures(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let fixtures_block = Block::default().title("Fixtures").borders(Borders::ALL);
    let fixtures = Paragraph::new(fixtures_text(state)).block(fixtures_block);
    frame.render_widget(fixtures, columns[0]);

    let table_block = Block::default().title("Table").borders(Borders::ALL);
    let table = Paragraph::new(table_text(state)).block(table_block);
    frame.render_widget(table, columns[1]);
}

fn fixtures_text(state: &AppState) -> Text<'static> {
    match state.fixtures_phase {
        LoadPhase::Idle | LoadPhase::Loading => {
            Text::styled("Loading fixtures...", Style::default().fg(Color::DarkGray))
        }
        LoadPhase::Failed => {
            let msg = state
                .fixtures_error
                .as_deref()
                .unwrap_or("could not load fixtures");
            Text::styled(msg.to_string(), Style::default().fg(Color::Red))
        }
        LoadPhase::Ready => {
            if state.fixtures.is_empty() {
                return Text::styled(
                    "No fixtures this matchweek",
                    Style::default().fg(Color::DarkGray),
                );
            }
            let mut lines = Vec::with_capacity(state.fixtures.len());
            for fixture in &state.fixtures {
                lines.push(Line::from(format!(
                    "{:<16} {:>14} vs {:<14}",
                    format_kickoff(&fixture.kickoff, &fixture.kickoff_tz),
                    fixture.home.short_name,
                    fixture.away.short_name,
                )));
            }
            Text::from(lines)
        }
    }
}

fn table_text(state: &AppState) -> Text<'static> {
    match state.fixtures_phase {
        LoadPhase::Idle | LoadPhase::Loading => {
            Text::styled("Loading table...", Style::default().fg(Color::DarkGray))
        }
        LoadPhase::Failed => Text::styled(
            "Table unavailable",
            Style::default().fg(Color::Red),
        ),
        LoadPhase::Ready => {
            let mut lines = vec![Line::styled(
                format!(
                    "{:>2}  {:<16} {:>3} {:>3} {:>3} {:>3} {:>4}",
                    "#", "Team", "Pts", "W", "L", "D", "GD"
                ),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            for entry in state.table.iter().take(10) {
                lines.push(Line::from(format!(
                    "{:>2}  {:<16} {:>3} {:>3} {:>3} {:>3} {:>4}",
                    entry.overall.position,
                    entry.team.short_name,
                    entry.overall.points,
                    entry.overall.won,
                    entry.overall.lost,
                    entry.overall.drawn,
                    entry.overall.goal_difference(),
                )));
            }
            Text::from(lines)
        }
    }
}

fn render_fpl(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let filters = Paragraph::new(filter_bar_text(state));
    frame.render_widget(filters, sections[0]);

    match state.fpl_phase {
        LoadPhase::Idle | LoadPhase::Loading => {
            let loading = Paragraph::new("Loading FPL data...")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(loading, sections[1]);
        }
        LoadPhase::Failed => {
            let msg = state
                .fpl_error
                .as_deref()
                .unwrap_or("could not load FPL data");
            let error = Paragraph::new(format!("Could not load FPL data\n{msg}"))
                .style(Style::default().fg(Color::Red));
            frame.render_widget(error, sections[1]);
        }
        LoadPhase::Ready => {
            // Recomputed on every draw from current parameters; the fetched
            // list itself is never reordered.
            let filtered = state.filtered_players();
            let total_pages = players::total_pages(filtered.len());
            let rows = players::page_slice(&filtered, state.page);
            render_player_rows(frame, sections[1], state, rows);

            let pager = if total_pages > 1 {
                format!("Page {} of {}", state.page, total_pages)
            } else {
                String::new()
            };
            frame.render_widget(Paragraph::new(pager), sections[2]);
        }
    }
}

fn filter_bar_text(state: &AppState) -> String {
    format!(
        "Position: {} | Team: {} | Price ≤ {} | Sort: {}",
        state.query.position.label(),
        state.query.team.as_deref().unwrap_or("All"),
        players::price_label(state.query.max_price_tenths),
        state.query.sort.label(),
    )
}

fn render_player_rows(frame: &mut Frame, area: Rect, state: &AppState, rows: &[&FplPlayer]) {
    if rows.is_empty() {
        let empty = Paragraph::new("No players match the current filters.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let show_extra = state.query.sort != SortKey::TotalPoints;
    let mut header = format!(
        "{:<22} {:<18} {:>6} {:>7} {:>5} {:>6}",
        "Player", "Team - Pos", "Price", "Owned", "Form", "Points"
    );
    if show_extra {
        header.push_str(&format!(" {:>10}", state.query.sort.label()));
    }
    let mut lines = vec![Line::styled(
        header,
        Style::default().add_modifier(Modifier::BOLD),
    )];

    for player in rows {
        let team = state.team_name(player.team_id).unwrap_or("-");
        let mut line = format!(
            "{:<22} {:<18} {:>6} {:>6}% {:>5} {:>6}",
            clip(&player.name, 22),
            clip(
                &format!("{} - {}", team, players::position_label(player.position)),
                18
            ),
            players::price_label(player.price_tenths),
            player.ownership,
            player.form,
            player.total_points,
        );
        if show_extra {
            line.push_str(&format!(" {:>10}", extra_stat(state.query.sort, player)));
        }
        lines.push(Line::from(line));
    }

    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn extra_stat(sort: SortKey, player: &FplPlayer) -> String {
    match sort {
        SortKey::Price => players::price_label(player.price_tenths),
        SortKey::Form => player.form.clone(),
        SortKey::Ownership => format!("{}%", player.ownership),
        SortKey::TotalPoints => String::new(),
    }
}

fn clip(raw: &str, max_chars: usize) -> String {
    if raw.chars().count() <= max_chars {
        return raw.to_string();
    }
    raw.chars().take(max_chars.saturating_sub(1)).collect::<String>() + "…"
}

fn format_kickoff(raw: &str, tz: &str) -> String {
    if raw.trim().is_empty() {
        return "TBD".to_string();
    }
    let cleaned = raw.trim();
    if let Some(dt) = parse_kickoff(cleaned) {
        let stamp = dt.format("%a %d %b %H:%M");
        if tz.is_empty() {
            return stamp.to_string();
        }
        return format!("{stamp} {tz}");
    }
    cleaned.replace('T', " ")
}

fn parse_kickoff(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    None
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "PL Terminal - Help",
        "",
        "Global:",
        "  1            Fixtures & table",
        "  2            FPL stats",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "FPL stats:",
        "  p            Cycle position filter",
        "  t / T        Cycle team filter",
        "  [ / ]        Max price -/+ 0.5",
        "  s            Cycle sort key",
        "  ← / →        Previous / next page",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
