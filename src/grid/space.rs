//! A single space on the grid and its occupancy state.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::turn::PlayerId;

/// Row/column label identifying a space, displayed as e.g. `A1` or `D4`.
///
/// Rows are lettered from `'A'` downward, columns numbered from `'1'`
/// rightward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display("{row}{column}")]
pub struct SpaceLabel {
    /// Row letter.
    pub row: char,
    /// Column digit.
    pub column: char,
}

impl SpaceLabel {
    /// Creates a label from a row letter and a column digit.
    pub fn new(row: char, column: char) -> Self {
        Self { row, column }
    }
}

/// Occupancy state of a space.
///
/// The owner is only representable when the space is filled, so an owner
/// on an empty space cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceState {
    /// Nobody has played here.
    Empty,
    /// Filled by the given player.
    Filled(PlayerId),
}

/// Outcome of attempting to fill a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The space was empty and is now filled.
    Filled,
    /// The space was already filled; nothing changed.
    AlreadyTaken,
}

/// One playable position on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpace {
    label: SpaceLabel,
    state: SpaceState,
}

impl GridSpace {
    /// Creates an empty space with the given label.
    pub fn new(label: SpaceLabel) -> Self {
        Self {
            label,
            state: SpaceState::Empty,
        }
    }

    /// The space's row/column label.
    pub fn label(&self) -> SpaceLabel {
        self.label
    }

    /// Current occupancy state.
    pub fn state(&self) -> SpaceState {
        self.state
    }

    /// Whether the space has been played this game.
    pub fn is_filled(&self) -> bool {
        matches!(self.state, SpaceState::Filled(_))
    }

    /// The player occupying this space, if any.
    pub fn owner(&self) -> Option<PlayerId> {
        match self.state {
            SpaceState::Empty => None,
            SpaceState::Filled(player) => Some(player),
        }
    }

    /// Fills the space for `player`.
    ///
    /// A space is filled at most once per game. Filling an already-taken
    /// space is a recoverable no-op: it logs a warning and reports
    /// [`FillOutcome::AlreadyTaken`] without touching the existing owner.
    pub fn fill(&mut self, player: PlayerId) -> FillOutcome {
        if self.is_filled() {
            warn!(label = %self.label, "space is already taken");
            return FillOutcome::AlreadyTaken;
        }
        self.state = SpaceState::Filled(player);
        FillOutcome::Filled
    }

    /// Empties the space for the next game.
    pub fn reset(&mut self) {
        self.state = SpaceState::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_space_is_empty() {
        let space = GridSpace::new(SpaceLabel::new('A', '1'));
        assert!(!space.is_filled());
        assert_eq!(space.owner(), None);
        assert_eq!(space.label().to_string(), "A1");
    }

    #[test]
    fn test_fill_once() {
        let mut space = GridSpace::new(SpaceLabel::new('B', '2'));
        assert_eq!(space.fill(PlayerId::One), FillOutcome::Filled);
        assert_eq!(space.owner(), Some(PlayerId::One));
    }

    #[test]
    fn test_refill_is_a_no_op() {
        let mut space = GridSpace::new(SpaceLabel::new('B', '2'));
        space.fill(PlayerId::One);
        assert_eq!(space.fill(PlayerId::Two), FillOutcome::AlreadyTaken);
        // The original owner survives.
        assert_eq!(space.owner(), Some(PlayerId::One));
    }

    #[test]
    fn test_reset_empties_the_space() {
        let mut space = GridSpace::new(SpaceLabel::new('C', '3'));
        space.fill(PlayerId::Two);
        space.reset();
        assert_eq!(space.state(), SpaceState::Empty);
    }
}
