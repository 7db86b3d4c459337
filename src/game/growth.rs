//! Board growth for freeplay.

use tracing::info;

use crate::game::{Board, Coord, SessionConfig};

/// When and how far the board grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Cells added per axis on each growth step.
    pub increment: u16,
    /// Largest side length (`None` = no cap).
    pub max_size: Option<u16>,
}

/// A completed growth step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Growth {
    /// Dimensions before growing.
    pub old_size: (u16, u16),
    /// Dimensions after growing.
    pub new_size: (u16, u16),
}

impl Growth {
    /// Where the old content now starts on the new board.
    #[must_use]
    pub const fn offset(&self) -> (u16, u16) {
        (
            (self.new_size.0 - self.old_size.0) / 2,
            (self.new_size.1 - self.old_size.1) / 2,
        )
    }
}

impl GrowthPolicy {
    /// Policy for a session, or `None` if growth is disabled.
    #[must_use]
    pub const fn from_config(config: &SessionConfig) -> Option<Self> {
        if config.growth_enabled {
            Some(Self {
                increment: config.growth_increment,
                max_size: config.max_size,
            })
        } else {
            None
        }
    }

    fn grown(self, size: u16) -> u16 {
        let target = size.saturating_add(self.increment);
        self.max_size.map_or(target, |max| target.min(max)).max(size)
    }

    /// Grow the board if `placed` lies on its border and there is room left.
    ///
    /// `placed` is in pre-growth coordinates. Each axis grows independently up
    /// to the cap; a board already at the cap is left alone.
    pub fn maybe_grow(self, board: &mut Board, placed: Coord) -> Option<Growth> {
        if !board.is_border(placed) {
            return None;
        }

        let old_size = (board.width(), board.height());
        let new_size = (self.grown(old_size.0), self.grown(old_size.1));
        if new_size == old_size {
            return None;
        }

        *board = board.resize_centered(new_size.0, new_size.1);
        info!(
            from_w = old_size.0,
            from_h = old_size.1,
            to_w = new_size.0,
            to_h = new_size.1,
            "board grew"
        );
        Some(Growth { old_size, new_size })
    }
}
