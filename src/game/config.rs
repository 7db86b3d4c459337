//! Session configuration, game modes and the coin treasury.
//!
//! A [`SessionConfig`] captures everything that differs between the arcade,
//! freeplay and sandbox variants. The algorithms read its fields; none of
//! them look at the [`Mode`] tag itself.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::error::{GameError, GameResult};
use crate::game::Category;
use crate::leaderboard::BoardName;

/// Serialized form of [`Coins::Unbounded`].
pub const UNBOUNDED_SENTINEL: &str = "unbounded";

/// Coin treasury: a finite balance or unlimited funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coins {
    /// A finite balance. May go negative through upkeep.
    Finite(i64),
    /// Unlimited funds. Spending and crediting are no-ops.
    Unbounded,
}

impl Coins {
    /// True for a finite balance.
    #[must_use]
    pub const fn is_bounded(self) -> bool {
        matches!(self, Coins::Finite(_))
    }

    /// True when a finite balance has run out. Never true when unbounded.
    #[must_use]
    pub const fn is_exhausted(self) -> bool {
        matches!(self, Coins::Finite(balance) if balance <= 0)
    }

    /// The finite balance, if any.
    #[must_use]
    pub const fn balance(self) -> Option<i64> {
        match self {
            Coins::Finite(balance) => Some(balance),
            Coins::Unbounded => None,
        }
    }

    /// Remove coins from a finite balance.
    pub fn spend(&mut self, amount: i64) {
        if let Coins::Finite(balance) = self {
            *balance = balance.saturating_sub(amount);
        }
    }

    /// Add coins to a finite balance. Negative amounts subtract.
    pub fn credit(&mut self, amount: i64) {
        if let Coins::Finite(balance) = self {
            *balance = balance.saturating_add(amount);
        }
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coins::Finite(balance) => write!(f, "{balance}"),
            Coins::Unbounded => f.write_str("∞"),
        }
    }
}

impl Serialize for Coins {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Coins::Finite(balance) => serializer.serialize_i64(*balance),
            Coins::Unbounded => serializer.serialize_str(UNBOUNDED_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for Coins {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CoinsVisitor)
    }
}

/// Accepts an integer, the sentinel string, or `null` (which is what a
/// browser writes for an infinite number).
struct CoinsVisitor;

impl<'de> Visitor<'de> for CoinsVisitor {
    type Value = Coins;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an integer coin balance or \"{UNBOUNDED_SENTINEL}\"")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Coins, E> {
        Ok(Coins::Finite(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Coins, E> {
        i64::try_from(value)
            .map(Coins::Finite)
            .map_err(|_| E::custom(format!("coin balance {value} out of range")))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Coins, E> {
        match value.to_ascii_lowercase().as_str() {
            UNBOUNDED_SENTINEL | "infinity" | "inf" => Ok(Coins::Unbounded),
            _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
        }
    }

    fn visit_unit<E: de::Error>(self) -> Result<Coins, E> {
        Ok(Coins::Unbounded)
    }

    fn visit_none<E: de::Error>(self) -> Result<Coins, E> {
        Ok(Coins::Unbounded)
    }
}

/// Game variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Coin-limited game with two random buildings offered per turn.
    Arcade,
    /// Unlimited coins, profit/upkeep economy, growing board.
    Freeplay,
    /// Unlimited coins, never ends.
    Sandbox,
}

impl Mode {
    /// Every mode.
    pub const ALL: [Mode; 3] = [Mode::Arcade, Mode::Freeplay, Mode::Sandbox];

    /// Lowercase name used in saves and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Mode::Arcade => "arcade",
            Mode::Freeplay => "freeplay",
            Mode::Sandbox => "sandbox",
        }
    }

    /// The high-score board this mode reports to, if any.
    #[must_use]
    pub const fn leaderboard(self) -> Option<BoardName> {
        match self {
            Mode::Arcade => Some(BoardName::Arcade),
            Mode::Freeplay => Some(BoardName::Freeplay),
            Mode::Sandbox => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown mode '{s}' (expected arcade, freeplay or sandbox)"))
    }
}

/// Default arcade board size.
pub const ARCADE_DEFAULT_SIZE: u16 = 20;
/// Starting board size in freeplay.
pub const FREEPLAY_INITIAL_SIZE: u16 = 5;
/// Largest board freeplay grows to.
pub const FREEPLAY_MAX_SIZE: u16 = 25;
/// Cells added per axis each time freeplay grows.
pub const FREEPLAY_GROWTH_INCREMENT: u16 = 10;
/// Consecutive loss-making turns that end a freeplay game.
pub const FREEPLAY_LOSS_STREAK_LIMIT: u32 = 20;
/// Default sandbox board size.
pub const SANDBOX_DEFAULT_SIZE: u16 = 10;
/// Buildings offered per arcade turn.
pub const ARCADE_OFFER_SIZE: usize = 2;

/// Starting arcade coins for a board size.
#[must_use]
pub const fn arcade_starting_coins(size: u16) -> i64 {
    match size {
        5 => 8,
        7 => 12,
        20 => 20,
        _ => 16,
    }
}

/// Configuration for a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Game variant, used for saves and leaderboard routing.
    pub mode: Mode,
    /// Side length of the starting square board.
    pub initial_size: u16,
    /// Starting treasury.
    pub initial_coins: Coins,
    /// Largest side length the board may grow to.
    pub max_size: Option<u16>,
    /// Grow the board when a placement touches its border.
    pub growth_enabled: bool,
    /// Cells added per axis on each growth step.
    pub growth_increment: u16,
    /// Require new buildings to touch existing ones.
    pub require_adjacency: bool,
    /// Coins debited per placement.
    pub cost_per_action: i64,
    /// Coins debited per demolition.
    pub demolish_cost: i64,
    /// Consecutive loss-making turns that end the game.
    pub loss_streak_limit: Option<u32>,
    /// Compute profit and upkeep and charge upkeep against coins.
    pub track_upkeep: bool,
    /// Number of random categories offered per turn (`None` = all).
    pub offer_size: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::arcade(ARCADE_DEFAULT_SIZE)
    }
}

impl SessionConfig {
    /// Arcade: finite coins, adjacency required, two offers per turn.
    #[must_use]
    pub const fn arcade(size: u16) -> Self {
        Self {
            mode: Mode::Arcade,
            initial_size: size,
            initial_coins: Coins::Finite(arcade_starting_coins(size)),
            max_size: None,
            growth_enabled: false,
            growth_increment: 0,
            require_adjacency: true,
            cost_per_action: 1,
            demolish_cost: 1,
            loss_streak_limit: None,
            track_upkeep: false,
            offer_size: Some(ARCADE_OFFER_SIZE),
        }
    }

    /// Freeplay: unbounded coins, upkeep economy, growing board.
    #[must_use]
    pub const fn freeplay() -> Self {
        Self {
            mode: Mode::Freeplay,
            initial_size: FREEPLAY_INITIAL_SIZE,
            initial_coins: Coins::Unbounded,
            max_size: Some(FREEPLAY_MAX_SIZE),
            growth_enabled: true,
            growth_increment: FREEPLAY_GROWTH_INCREMENT,
            require_adjacency: false,
            cost_per_action: 1,
            demolish_cost: 1,
            loss_streak_limit: Some(FREEPLAY_LOSS_STREAK_LIMIT),
            track_upkeep: true,
            offer_size: None,
        }
    }

    /// Sandbox: unbounded coins, adjacency required, never ends.
    #[must_use]
    pub const fn sandbox(size: u16) -> Self {
        Self {
            mode: Mode::Sandbox,
            initial_size: size,
            initial_coins: Coins::Unbounded,
            max_size: None,
            growth_enabled: false,
            growth_increment: 0,
            require_adjacency: true,
            cost_per_action: 1,
            demolish_cost: 1,
            loss_streak_limit: None,
            track_upkeep: false,
            offer_size: None,
        }
    }

    /// Preset for a mode, optionally overriding the starting size.
    ///
    /// For arcade the starting coins follow the size.
    #[must_use]
    pub fn for_mode(mode: Mode, size: Option<u16>) -> Self {
        match mode {
            Mode::Arcade => Self::arcade(size.unwrap_or(ARCADE_DEFAULT_SIZE)),
            Mode::Freeplay => Self {
                initial_size: size.unwrap_or(FREEPLAY_INITIAL_SIZE),
                ..Self::freeplay()
            },
            Mode::Sandbox => Self::sandbox(size.unwrap_or(SANDBOX_DEFAULT_SIZE)),
        }
    }

    /// Check the configuration for contradictions.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> GameResult<()> {
        let invalid = |msg: String| -> GameResult<()> { Err(GameError::InvalidConfig(msg)) };

        if self.initial_size == 0 {
            return invalid("initial size must be at least 1".into());
        }
        if let Some(max) = self.max_size.filter(|&max| max < self.initial_size) {
            return invalid(format!(
                "max size {max} is smaller than initial size {}",
                self.initial_size
            ));
        }
        if self.growth_enabled && self.growth_increment == 0 {
            return invalid("growth is enabled but the growth increment is 0".into());
        }
        if self.cost_per_action < 0 || self.demolish_cost < 0 {
            return invalid("action costs cannot be negative".into());
        }
        if self.loss_streak_limit == Some(0) {
            return invalid("loss streak limit must be at least 1".into());
        }
        if let Some(offers) = self
            .offer_size
            .filter(|offers| !(1..=Category::ALL.len()).contains(offers))
        {
            return invalid(format!("offer size {offers} must be between 1 and 5"));
        }
        Ok(())
    }

    /// Parse a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or the result is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        ConfigFile::from_toml_str(content)?.into_config()
    }

    /// Load a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        ConfigFile::load(path)?.into_config()
    }
}

/// On-disk configuration: a mode preset plus optional overrides.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Preset to start from (default arcade).
    pub mode: Option<Mode>,
    /// Starting board size.
    pub initial_size: Option<u16>,
    /// Starting treasury.
    pub initial_coins: Option<Coins>,
    /// Largest board size (0 = no limit).
    pub max_size: Option<u16>,
    /// Grow on border placements.
    pub growth_enabled: Option<bool>,
    /// Cells added per growth step.
    pub growth_increment: Option<u16>,
    /// Require adjacency.
    pub require_adjacency: Option<bool>,
    /// Coins per placement.
    pub cost_per_action: Option<i64>,
    /// Coins per demolition.
    pub demolish_cost: Option<i64>,
    /// Loss streak limit (0 = never end on losses).
    pub loss_streak_limit: Option<u32>,
    /// Track profit and upkeep.
    pub track_upkeep: Option<bool>,
    /// Offered categories per turn (0 = all).
    pub offer_size: Option<usize>,
}

impl ConfigFile {
    /// Parse overrides from TOML without applying them.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has unknown keys.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read overrides from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Apply the overrides on top of the mode preset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the merged configuration is invalid.
    pub fn into_config(self) -> Result<SessionConfig, ConfigError> {
        let mut config = SessionConfig::for_mode(self.mode.unwrap_or(Mode::Arcade), self.initial_size);

        if let Some(coins) = self.initial_coins {
            config.initial_coins = coins;
        }
        if let Some(max) = self.max_size {
            config.max_size = (max > 0).then_some(max);
        }
        if let Some(enabled) = self.growth_enabled {
            config.growth_enabled = enabled;
        }
        if let Some(increment) = self.growth_increment {
            config.growth_increment = increment;
        }
        if let Some(required) = self.require_adjacency {
            config.require_adjacency = required;
        }
        if let Some(cost) = self.cost_per_action {
            config.cost_per_action = cost;
        }
        if let Some(cost) = self.demolish_cost {
            config.demolish_cost = cost;
        }
        if let Some(limit) = self.loss_streak_limit {
            config.loss_streak_limit = (limit > 0).then_some(limit);
        }
        if let Some(track) = self.track_upkeep {
            config.track_upkeep = track;
        }
        if let Some(offers) = self.offer_size {
            config.offer_size = (offers > 0).then_some(offers);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The TOML could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// The merged configuration is contradictory.
    #[error("{0}")]
    Invalid(#[from] GameError),
}
