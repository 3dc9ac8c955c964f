//! Append-only ledger of the moves played in a session.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::grid::SpaceLabel;
use crate::turn::{PlayerId, SymbolId};

/// An immutable record of one played move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Move {
    /// The space that was filled.
    label: SpaceLabel,
    /// The player who filled it.
    player: PlayerId,
    /// The round the move was made in.
    round: u32,
    /// The symbol the player stamped on the space.
    symbol: SymbolId,
}

/// Ordered log of every move in the current game.
///
/// Records are never mutated or removed except by [`MoveLedger::clear`] on a
/// full game reset. There is no deduplication and no capacity bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLedger {
    moves: Vec<Move>,
}

impl MoveLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a move to the ledger.
    #[instrument(skip(self, record), fields(label = %record.label(), round = *record.round()))]
    pub fn record(&mut self, record: Move) {
        debug!("move recorded");
        self.moves.push(record);
    }

    /// The first move matching `round` and `player` in insertion order.
    pub fn lookup(&self, round: u32, player: PlayerId) -> Option<&Move> {
        self.moves
            .iter()
            .find(|m| *m.round() == round && *m.player() == player)
    }

    /// The full history in insertion order.
    pub fn all(&self) -> &[Move] {
        &self.moves
    }

    /// Number of recorded moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Whether the ledger has no moves.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Discards the history for a full game reset.
    pub fn clear(&mut self) {
        self.moves.clear();
    }
}
