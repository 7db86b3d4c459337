//! Game session: one board, one economy, one configuration.
//!
//! A session is `Active` until its termination policy fires, then `Terminal`
//! for good. Every mutation is validated before anything changes, so a
//! rejected call leaves the session exactly as it was.

use std::fmt;
use std::sync::mpsc::Sender;

use tracing::{debug, info};

use crate::error::{GameError, GameResult};
use crate::game::offer::draw_offers;
use crate::game::{
    Board, Category, Coins, Coord, Growth, GrowthPolicy, PlacementRule, ScoreReport,
    SessionConfig, Tile, recompute,
};
use crate::snapshot::Snapshot;

/// Economy counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EconomyState {
    /// Treasury.
    pub coins: Coins,
    /// Score from the last recomputation.
    pub score: i64,
    /// Successful placements so far.
    pub turn_number: u32,
    /// Profit from the last recomputation.
    pub profit: i64,
    /// Upkeep from the last recomputation.
    pub upkeep: i64,
    /// Consecutive turns where upkeep exceeded profit.
    pub consecutive_loss_turns: u32,
}

impl EconomyState {
    /// Fresh counters with the given treasury.
    #[must_use]
    pub const fn new(coins: Coins) -> Self {
        Self {
            coins,
            score: 0,
            turn_number: 0,
            profit: 0,
            upkeep: 0,
            consecutive_loss_turns: 0,
        }
    }

    fn apply(&mut self, report: &ScoreReport) {
        self.score = report.score;
        self.profit = report.profit;
        self.upkeep = report.upkeep;
        self.coins.credit(report.coin_delta());
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalReason {
    /// A finite treasury reached zero or below.
    OutOfCoins,
    /// Every cell of a coin-limited board is occupied.
    BoardFull,
    /// Upkeep exceeded profit for too many turns in a row.
    LossStreak,
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TerminalReason::OutOfCoins => "out of coins",
            TerminalReason::BoardFull => "board full",
            TerminalReason::LossStreak => "too many loss-making turns",
        })
    }
}

/// Decides when a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminationPolicy {
    /// Loss streak that ends the game.
    pub loss_streak_limit: Option<u32>,
}

impl TerminationPolicy {
    /// Policy for a configuration.
    #[must_use]
    pub const fn from_config(config: &SessionConfig) -> Self {
        Self {
            loss_streak_limit: config.loss_streak_limit,
        }
    }

    /// Evaluate the predicate on the current state.
    ///
    /// Coin and board-full checks apply only to a finite treasury, so an
    /// unbounded session without a loss limit never ends.
    #[must_use]
    pub fn evaluate(&self, board: &Board, economy: &EconomyState) -> Option<TerminalReason> {
        if economy.coins.is_exhausted() {
            return Some(TerminalReason::OutOfCoins);
        }
        if economy.coins.is_bounded() && board.is_full() {
            return Some(TerminalReason::BoardFull);
        }
        match self.loss_streak_limit {
            Some(limit) if economy.consecutive_loss_turns >= limit => {
                Some(TerminalReason::LossStreak)
            }
            _ => None,
        }
    }
}

/// Read-only picture of a session handed to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    /// Board contents.
    pub board: Board,
    /// Economy counters.
    pub economy: EconomyState,
    /// Categories that may be placed this turn.
    pub offers: Vec<Category>,
    /// Building the player has picked, if any.
    pub selected: Option<Category>,
    /// Why the game ended, if it has.
    pub terminal: Option<TerminalReason>,
}

impl SessionView {
    /// True once the session is terminal.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.terminal.is_some()
    }
}

/// Receives a view after every successful mutation.
pub trait SessionObserver {
    /// Called after the session state changed.
    fn on_state_changed(&mut self, view: &SessionView);
}

impl<F: FnMut(&SessionView)> SessionObserver for F {
    fn on_state_changed(&mut self, view: &SessionView) {
        self(view);
    }
}

/// Forwards views over a channel. A closed receiver is ignored.
#[derive(Debug)]
pub struct ChannelObserver(pub Sender<SessionView>);

impl SessionObserver for ChannelObserver {
    fn on_state_changed(&mut self, view: &SessionView) {
        let _ = self.0.send(view.clone());
    }
}

/// Result of a successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementOutcome {
    /// Scores after the placement.
    pub report: ScoreReport,
    /// Board growth triggered by the placement.
    pub growth: Option<Growth>,
    /// Set if the placement ended the game.
    pub terminal: Option<TerminalReason>,
}

/// A single game.
pub struct GameSession {
    config: SessionConfig,
    board: Board,
    economy: EconomyState,
    seed: u64,
    offers: Vec<Category>,
    selected: Option<Category>,
    terminal: Option<TerminalReason>,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("board", &self.board)
            .field("economy", &self.economy)
            .field("seed", &self.seed)
            .field("offers", &self.offers)
            .field("selected", &self.selected)
            .field("terminal", &self.terminal)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl GameSession {
    /// Start a new game with a random offer seed.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: SessionConfig) -> GameResult<Self> {
        Self::with_seed(config, rand::random())
    }

    /// Start a new game with a fixed offer seed.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the configuration is invalid.
    pub fn with_seed(config: SessionConfig, seed: u64) -> GameResult<Self> {
        config.validate()?;
        let board = Board::square(config.initial_size)
            .ok_or_else(|| GameError::InvalidConfig("board size must be at least 1".into()))?;
        let economy = EconomyState::new(config.initial_coins);
        let terminal = TerminationPolicy::from_config(&config).evaluate(&board, &economy);

        debug!(mode = %config.mode, size = config.initial_size, seed, "session started");
        Ok(Self {
            offers: draw_offers(seed, 0, config.offer_size),
            config,
            board,
            economy,
            seed,
            selected: None,
            terminal,
            observers: Vec::new(),
        })
    }

    /// Restore a session using the preset for the snapshot's mode.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::MalformedSnapshot`] if the snapshot is inconsistent.
    pub fn from_snapshot(snapshot: &Snapshot) -> GameResult<Self> {
        let config = SessionConfig::for_mode(snapshot.mode, Some(snapshot.size));
        config.validate().map_err(|err| {
            GameError::MalformedSnapshot(format!(
                "{} board of size {}: {err}",
                snapshot.mode, snapshot.size
            ))
        })?;
        Self::from_snapshot_with_config(snapshot, config)
    }

    /// Restore a session under an explicit configuration.
    ///
    /// Coins, counters and offers come from the snapshot; the configuration
    /// only supplies the rules from here on.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::MalformedSnapshot`] if the snapshot is inconsistent
    /// and [`GameError::InvalidConfig`] if the configuration is.
    pub fn from_snapshot_with_config(snapshot: &Snapshot, config: SessionConfig) -> GameResult<Self> {
        config.validate()?;
        let board = snapshot.to_board()?;
        let economy = EconomyState {
            coins: snapshot.coins,
            score: snapshot.score,
            turn_number: snapshot.turn_number,
            profit: snapshot.profit,
            upkeep: snapshot.upkeep,
            consecutive_loss_turns: snapshot.consecutive_loss_turns,
        };

        let offers = if snapshot.available_buildings.is_empty() {
            draw_offers(snapshot.seed, economy.turn_number, config.offer_size)
        } else {
            snapshot.available_buildings.clone()
        };
        if let Some(expected) = config.offer_size.filter(|&n| n != offers.len()) {
            return Err(GameError::MalformedSnapshot(format!(
                "{} buildings offered, expected {expected}",
                offers.len()
            )));
        }
        for (i, category) in offers.iter().enumerate() {
            if offers[..i].contains(category) {
                return Err(GameError::MalformedSnapshot(format!(
                    "{category} offered twice"
                )));
            }
        }
        if let Some(selected) = snapshot
            .selected_building
            .filter(|selected| !offers.contains(selected))
        {
            return Err(GameError::MalformedSnapshot(format!(
                "selected building {selected} is not offered"
            )));
        }

        let terminal = TerminationPolicy::from_config(&config).evaluate(&board, &economy);
        info!(mode = %snapshot.mode, size = snapshot.size, turn = economy.turn_number, "session restored");
        Ok(Self {
            config,
            board,
            economy,
            seed: snapshot.seed,
            offers,
            selected: snapshot.selected_building,
            terminal,
            observers: Vec::new(),
        })
    }

    /// Capture the session for persistence.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_session(self)
    }

    /// Register an observer notified after every successful mutation.
    pub fn add_observer(&mut self, observer: impl SessionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// The rules this session runs under.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Economy counters.
    #[must_use]
    pub const fn economy(&self) -> &EconomyState {
        &self.economy
    }

    /// Offer seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Categories that may be placed this turn.
    #[must_use]
    pub fn offers(&self) -> &[Category] {
        &self.offers
    }

    /// Building the player has picked, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<Category> {
        self.selected
    }

    /// True once the session is terminal.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.terminal.is_some()
    }

    /// Why the game ended, if it has.
    #[must_use]
    pub const fn terminal_reason(&self) -> Option<TerminalReason> {
        self.terminal
    }

    /// Final score once terminal.
    #[must_use]
    pub const fn final_score(&self) -> Option<i64> {
        match self.terminal {
            Some(_) => Some(self.economy.score),
            None => None,
        }
    }

    /// Placement rule in force.
    #[must_use]
    pub const fn placement_rule(&self) -> PlacementRule {
        PlacementRule::from_flag(self.config.require_adjacency)
    }

    /// Cells where a building may be placed this turn.
    #[must_use]
    pub fn legal_cells(&self) -> Vec<Coord> {
        if self.is_game_over() {
            return Vec::new();
        }
        self.placement_rule()
            .legal_cells(&self.board, self.economy.turn_number)
            .collect()
    }

    /// Current state as an owned view.
    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            board: self.board.clone(),
            economy: self.economy,
            offers: self.offers.clone(),
            selected: self.selected,
            terminal: self.terminal,
        }
    }

    fn ensure_active(&self) -> GameResult<()> {
        if self.is_game_over() {
            Err(GameError::SessionTerminal)
        } else {
            Ok(())
        }
    }

    fn ensure_offered(&self, category: Category) -> GameResult<()> {
        if self.config.offer_size.is_some() && !self.offers.contains(&category) {
            Err(GameError::CategoryNotOffered(category))
        } else {
            Ok(())
        }
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let view = self.view();
        for observer in &mut self.observers {
            observer.on_state_changed(&view);
        }
    }

    fn evaluate_termination(&mut self) {
        let policy = TerminationPolicy::from_config(&self.config);
        self.terminal = policy.evaluate(&self.board, &self.economy);
        if let Some(reason) = self.terminal {
            info!(
                %reason,
                score = self.economy.score,
                turn = self.economy.turn_number,
                "game over"
            );
        }
    }

    /// Remember which building the player intends to place.
    ///
    /// # Errors
    ///
    /// [`GameError::SessionTerminal`] after the game ended and
    /// [`GameError::CategoryNotOffered`] for a category not on offer.
    pub fn select(&mut self, category: Category) -> GameResult<()> {
        self.ensure_active()?;
        self.ensure_offered(category)?;
        self.selected = Some(category);
        self.notify();
        Ok(())
    }

    /// Place a building.
    ///
    /// On success the tile is written, the action cost debited, the turn
    /// advanced, the board rescored, the board grown if the placement touched
    /// its border, offers re-rolled and termination evaluated.
    ///
    /// # Errors
    ///
    /// [`GameError::SessionTerminal`], [`GameError::CategoryNotOffered`],
    /// [`GameError::OutOfBounds`], [`GameError::CellOccupied`] or
    /// [`GameError::InvalidPlacement`]. The session is unchanged on error.
    pub fn place(&mut self, category: Category, coord: Coord) -> GameResult<PlacementOutcome> {
        self.ensure_active()
            .and_then(|()| self.ensure_offered(category))
            .and_then(|()| {
                self.placement_rule()
                    .check(&self.board, self.economy.turn_number, coord)
            })
            .inspect_err(|err| debug!(%category, %coord, %err, "placement rejected"))?;

        self.board.set(coord, Tile::new(category))?;
        self.economy.coins.spend(self.config.cost_per_action);
        self.economy.turn_number += 1;

        let report = recompute(&self.board, &self.config);
        self.economy.apply(&report);
        if self.config.track_upkeep {
            if report.is_loss() {
                self.economy.consecutive_loss_turns += 1;
            } else {
                self.economy.consecutive_loss_turns = 0;
            }
        }

        let growth = GrowthPolicy::from_config(&self.config)
            .and_then(|policy| policy.maybe_grow(&mut self.board, coord));

        self.offers = draw_offers(self.seed, self.economy.turn_number, self.config.offer_size);
        self.selected = None;
        self.evaluate_termination();

        debug!(
            %category,
            %coord,
            score = report.score,
            coins = %self.economy.coins,
            turn = self.economy.turn_number,
            "placed"
        );
        self.notify();

        Ok(PlacementOutcome {
            report,
            growth,
            terminal: self.terminal,
        })
    }

    /// Demolish the building at `coord`, paying the demolition cost.
    ///
    /// Scores are not recomputed.
    ///
    /// # Errors
    ///
    /// [`GameError::SessionTerminal`], [`GameError::OutOfBounds`],
    /// [`GameError::NothingToDemolish`] or [`GameError::InsufficientFunds`].
    pub fn demolish(&mut self, coord: Coord) -> GameResult<Tile> {
        self.ensure_active()
            .and_then(|()| self.check_demolish(coord))
            .inspect_err(|err| debug!(%coord, %err, "demolition rejected"))?;

        let tile = self.board.clear(coord)?;
        self.economy.coins.spend(self.config.demolish_cost);
        self.evaluate_termination();

        debug!(%coord, category = %tile.category, coins = %self.economy.coins, "demolished");
        self.notify();
        Ok(tile)
    }

    fn check_demolish(&self, coord: Coord) -> GameResult<()> {
        if self.board.get(coord)?.is_none() {
            return Err(GameError::NothingToDemolish {
                x: coord.x,
                y: coord.y,
            });
        }
        match self.economy.coins {
            Coins::Finite(coins) if coins <= 0 => Err(GameError::InsufficientFunds { coins }),
            _ => Ok(()),
        }
    }
}
