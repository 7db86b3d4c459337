//! Play command implementation - interactive TUI.

// Board coordinates are small and non-negative inside the widget
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use super::{CliError, SessionArgs, open_leaderboard, open_saves};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gridcity::game::{Category, Coord, GameSession, Tile};
use gridcity::leaderboard::Leaderboard;
use gridcity::snapshot::SaveStore;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::stdout;
use std::time::Duration;
use tracing::{info, warn};

/// Save slot written by the `s` key.
const QUICKSAVE: &str = "quicksave";

/// Longest name accepted on the high-score prompt.
const MAX_NAME_LEN: usize = 20;

/// Execute the play command.
///
/// # Errors
///
/// Returns an error if the session cannot be created or the TUI fails.
pub(crate) fn execute(session_args: &SessionArgs, load: Option<String>) -> Result<(), CliError> {
    let saves = open_saves(None)?;
    let session = match load {
        Some(name) => saves.restore(&name)?,
        None => session_args.new_session()?,
    };
    info!(mode = %session.config().mode, seed = session.seed(), "play started");

    run_tui(App::new(session, saves))
}

/// What the key handler wants the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// App state for the TUI.
#[derive(Debug)]
struct App {
    session: GameSession,
    saves: SaveStore,
    cursor: Coord,
    message: String,
    /// Name being typed for the high-score board, once the game is over.
    name_entry: Option<String>,
    /// Set once the game-over prompt has been handled.
    score_recorded: bool,
}

impl App {
    fn new(session: GameSession, saves: SaveStore) -> Self {
        let board = session.board();
        let cursor = Coord::new(i32::from(board.width() / 2), i32::from(board.height() / 2));
        let mut app = Self {
            session,
            saves,
            cursor,
            message: String::from("Pick a building and place it."),
            name_entry: None,
            score_recorded: false,
        };
        app.check_game_over();
        app
    }

    fn move_cursor(&mut self, dx: i32, dy: i32) {
        let board = self.session.board();
        let max_x = i32::from(board.width()) - 1;
        let max_y = i32::from(board.height()) - 1;
        self.cursor = Coord::new(
            (self.cursor.x + dx).clamp(0, max_x),
            (self.cursor.y + dy).clamp(0, max_y),
        );
    }

    fn select_index(&mut self, index: usize) {
        match self.session.offers().get(index).copied() {
            Some(category) => self.select(category),
            None => self.message = format!("No offer #{}", index + 1),
        }
    }

    fn select(&mut self, category: Category) {
        self.message = match self.session.select(category) {
            Ok(()) => format!("Selected {category}"),
            Err(e) => e.to_string(),
        };
    }

    fn place(&mut self) {
        let Some(category) = self.session.selected() else {
            self.message = String::from("Select a building first");
            return;
        };
        match self.session.place(category, self.cursor) {
            Ok(outcome) => {
                if let Some(growth) = outcome.growth {
                    let (dx, dy) = growth.offset();
                    self.cursor = self.cursor.offset(i32::from(dx), i32::from(dy));
                    self.message = format!(
                        "Placed {category}; the city grew to {}x{}",
                        growth.new_size.0, growth.new_size.1
                    );
                } else {
                    self.message = format!(
                        "Placed {category}: score {}, coins {:+}/turn",
                        outcome.report.score,
                        outcome.report.coin_delta()
                    );
                }
            }
            Err(e) => self.message = e.to_string(),
        }
        self.check_game_over();
    }

    fn demolish(&mut self) {
        self.message = match self.session.demolish(self.cursor) {
            Ok(Tile { category }) => format!("Demolished {category}"),
            Err(e) => e.to_string(),
        };
        self.check_game_over();
    }

    fn save(&mut self) {
        self.message = match self.saves.save(QUICKSAVE, &self.session) {
            Ok(path) => format!("Saved to {}", path.display()),
            Err(e) => format!("Save failed: {e}"),
        };
    }

    /// Open the name prompt when the game just ended on a ranked mode.
    fn check_game_over(&mut self) {
        if self.score_recorded || self.name_entry.is_some() {
            return;
        }
        let Some(score) = self.session.final_score() else {
            return;
        };
        let Some(board) = self.session.config().mode.leaderboard() else {
            self.score_recorded = true;
            return;
        };
        match open_leaderboard(None).and_then(|lb| lb.qualifies(board, score).map_err(CliError::from)) {
            Ok(true) => {
                self.message = format!("New high score {score}! Enter your name:");
                self.name_entry = Some(String::new());
            }
            Ok(false) => self.score_recorded = true,
            Err(e) => {
                warn!(error = %e, "leaderboard unavailable");
                self.score_recorded = true;
            }
        }
    }

    fn submit_score(&mut self, name: &str) {
        self.score_recorded = true;
        let (Some(score), Some(board)) = (
            self.session.final_score(),
            self.session.config().mode.leaderboard(),
        ) else {
            return;
        };
        let name = if name.trim().is_empty() { "anonymous" } else { name.trim() };
        let result = open_leaderboard(None)
            .and_then(|mut lb| lb.submit(board, name, score).map_err(CliError::from));
        self.message = match result {
            Ok(Some(rank)) => format!("{name} ranked #{} on the {board} board", rank + 1),
            Ok(None) => String::from("Score did not make the board"),
            Err(e) => {
                warn!(error = %e, "failed to record score");
                format!("Could not record score: {e}")
            }
        };
    }

    fn handle_name_key(&mut self, code: KeyCode) {
        let Some(name) = self.name_entry.as_mut() else {
            return;
        };
        match code {
            KeyCode::Enter => {
                let name = std::mem::take(name);
                self.name_entry = None;
                self.submit_score(&name);
            }
            KeyCode::Esc => {
                self.name_entry = None;
                self.score_recorded = true;
                self.message = String::from("Score not recorded");
            }
            KeyCode::Backspace => {
                name.pop();
            }
            KeyCode::Char(c) if !c.is_control() && name.chars().count() < MAX_NAME_LEN => {
                name.push(c);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> Flow {
        if self.name_entry.is_some() {
            self.handle_name_key(code);
            return Flow::Continue;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(0, 1),
            KeyCode::Char(c @ '1'..='5') => {
                self.select_index(usize::from(c as u8 - b'1'));
            }
            KeyCode::Char(c @ ('r' | 'i' | 'c' | 'p' | '*')) => {
                if let Some(category) = Category::from_symbol(c) {
                    self.select(category);
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.place(),
            KeyCode::Char('d' | 'x') => self.demolish(),
            KeyCode::Char('s') => self.save(),
            _ => {}
        }
        Flow::Continue
    }
}

fn run_tui(mut app: App) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if let Some(score) = app.session.final_score() {
        println!("Final score: {score}");
    }
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<(), CliError> {
    loop {
        terminal.draw(|f| ui(f, app)).map_err(|e| CliError::new(e.to_string()))?;

        if !event::poll(Duration::from_millis(50)).map_err(|e| CliError::new(e.to_string()))? {
            continue;
        }
        match event::read().map_err(|e| CliError::new(e.to_string()))? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if app.handle_key(key.code) == Flow::Quit {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Board and sidebar
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    render_board(f, main_chunks[0], app);
    render_sidebar(f, main_chunks[1], app);
    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let economy = app.session.economy();
    let status = match app.session.terminal_reason() {
        Some(reason) => format!("GAME OVER: {reason}"),
        None => String::from("PLAYING"),
    };

    let title = format!(
        " GridCity {} | Turn {} | Score {} | Coins {} | {status} ",
        app.session.config().mode,
        economy.turn_number,
        economy.score,
        economy.coins
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Residential => Color::Green,
        Category::Industry => Color::Yellow,
        Category::Commercial => Color::Blue,
        Category::Park => Color::LightGreen,
        Category::Road => Color::White,
    }
}

fn render_board(f: &mut Frame, area: Rect, app: &App) {
    let board = app.session.board();
    let legal = app.session.legal_cells();

    // Two columns per cell; keep the cursor in view on boards larger than the widget
    let visible_width = (usize::from(area.width).saturating_sub(2) / 2).min(usize::from(board.width()));
    let visible_height = usize::from(area.height).saturating_sub(2).min(usize::from(board.height()));
    let first_x = (app.cursor.x as usize + 1).saturating_sub(visible_width);
    let first_y = (app.cursor.y as usize + 1).saturating_sub(visible_height);

    let mut lines: Vec<Line> = Vec::with_capacity(visible_height);
    for y in first_y..first_y + visible_height {
        let mut spans = Vec::with_capacity(visible_width);
        for x in first_x..first_x + visible_width {
            let coord = Coord::new(x as i32, y as i32);
            let (symbol, mut style) = match board.category_at(coord) {
                Some(category) => (
                    category.symbol(),
                    Style::default().fg(category_color(category)),
                ),
                None if legal.contains(&coord) => ('.', Style::default().fg(Color::Gray)),
                None => ('·', Style::default().fg(Color::DarkGray)),
            };
            if coord == app.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(format!("{symbol} "), style));
        }
        lines.push(Line::from(spans));
    }

    let title = format!(" Board {}x{} ", board.width(), board.height());
    let board_widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(board_widget, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let economy = app.session.economy();
    let mut lines = vec![Line::from("")];

    lines.push(Line::from(Span::styled(
        "Offers",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for (i, category) in app.session.offers().iter().enumerate() {
        let marker = if app.session.selected() == Some(*category) { ">" } else { " " };
        lines.push(Line::from(vec![
            Span::raw(format!("{marker} [{}] ", i + 1)),
            Span::styled(
                format!("{} {category}", category.symbol()),
                Style::default().fg(category_color(*category)),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(format!("Profit: {:+}/turn", economy.profit)));
    lines.push(Line::from(format!("Upkeep: {}/turn", economy.upkeep)));
    if app.session.config().track_upkeep {
        lines.push(Line::from(format!("Loss streak: {}", economy.consecutive_loss_turns)));
    }
    lines.push(Line::from(format!("Cursor: {}", app.cursor)));

    lines.push(Line::from(""));
    lines.push(Line::from(app.message.as_str()));
    if let Some(name) = &app.name_entry {
        lines.push(Line::from(Span::styled(
            format!("> {name}_"),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }

    let sidebar = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" City "))
        .wrap(Wrap { trim: false });

    f.render_widget(sidebar, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.name_entry.is_some() {
        " [Enter] Submit  [Esc] Skip "
    } else if app.session.is_game_over() {
        " [q] Quit  [arrows] Look around "
    } else {
        " [q] Quit  [arrows/hjkl] Move  [1-5] Offer  [Enter] Place  [d] Demolish  [s] Save "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcity::game::SessionConfig;

    fn sandbox_app(dir: &tempfile::TempDir) -> App {
        let session = GameSession::with_seed(SessionConfig::sandbox(5), 1).unwrap();
        App::new(session, SaveStore::open(dir.path()).unwrap())
    }

    #[test]
    fn test_cursor_stays_on_board() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = sandbox_app(&dir);
        assert_eq!(app.cursor, Coord::new(2, 2));
        for _ in 0..10 {
            app.handle_key(KeyCode::Left);
            app.handle_key(KeyCode::Char('j'));
        }
        assert_eq!(app.cursor, Coord::new(0, 4));
    }

    #[test]
    fn test_select_and_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = sandbox_app(&dir);

        app.handle_key(KeyCode::Enter);
        assert_eq!(app.session.economy().turn_number, 0);

        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.session.selected(), Some(Category::Residential));
        app.handle_key(KeyCode::Char(' '));
        assert_eq!(app.session.board().category_at(Coord::new(2, 2)), Some(Category::Residential));
        assert_eq!(app.session.selected(), None);

        app.handle_key(KeyCode::Char('5'));
        assert_eq!(app.session.selected(), Some(Category::Road));
    }

    #[test]
    fn test_demolish_and_quicksave() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = sandbox_app(&dir);
        app.handle_key(KeyCode::Char('p'));
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('d'));
        assert!(app.session.board().is_empty());

        app.handle_key(KeyCode::Char('s'));
        assert_eq!(app.saves.list().unwrap(), vec![QUICKSAVE.to_string()]);
        assert_eq!(app.handle_key(KeyCode::Char('q')), Flow::Quit);
    }

    #[test]
    fn test_name_entry_swallows_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = sandbox_app(&dir);
        app.name_entry = Some(String::new());
        for c in "qa".chars() {
            assert_eq!(app.handle_key(KeyCode::Char(c)), Flow::Continue);
        }
        assert_eq!(app.name_entry.as_deref(), Some("qa"));
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Esc);
        assert!(app.name_entry.is_none());
        assert!(app.score_recorded);
    }
}
