//! Turn sequencing: player alternation, round tracking, symbol selection.

use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::events::{EventBus, GameEvent};

/// One of the two players in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, strum::EnumIter)]
pub enum PlayerId {
    /// Player one (moves first).
    #[display("One")]
    One,
    /// Player two.
    #[display("Two")]
    Two,
}

impl PlayerId {
    /// Returns the other player.
    pub fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// One-based index used in move records and display.
    pub fn index(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }
}

/// Handle for a player symbol drawn from the candidate pool.
pub type SymbolId = String;

/// Errors from symbol selection.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SymbolError {
    /// The candidate pool has fewer than two distinct symbols.
    #[display("symbol pool needs at least two distinct entries, found {}", _0)]
    EmptyPool(usize),
}

impl std::error::Error for SymbolError {}

/// Symbols assigned to the two players for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SelectedSymbols {
    player_one: SymbolId,
    player_two: SymbolId,
}

/// Alternates players and tracks the round count.
///
/// A round is one complete pass where both players have moved once, so the
/// round only increments when the turn wraps from player two back to
/// player one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSequencer {
    current_player: PlayerId,
    current_round: u32,
    symbols: Option<SelectedSymbols>,
}

impl TurnSequencer {
    /// Creates a sequencer at player one, round one, with no symbols drawn.
    pub fn new() -> Self {
        Self {
            current_player: PlayerId::One,
            current_round: 1,
            symbols: None,
        }
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    /// The current round, starting at one.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// The symbol drawn for `player`, if a selection has been made.
    pub fn symbol_for(&self, player: PlayerId) -> Option<&SymbolId> {
        self.symbols.as_ref().map(|s| match player {
            PlayerId::One => &s.player_one,
            PlayerId::Two => &s.player_two,
        })
    }

    /// Moves to the next turn, notifying subscribers.
    ///
    /// Emits [`GameEvent::TurnChanged`] after every transition and
    /// [`GameEvent::RoundChanged`] only when the round incremented.
    #[instrument(skip(self, bus))]
    pub fn advance(&mut self, bus: &EventBus) {
        let wrapped = self.current_player == PlayerId::Two;
        self.current_player = self.current_player.opponent();
        if wrapped {
            self.current_round += 1;
            debug!(round = self.current_round, "round advanced");
            bus.emit(GameEvent::RoundChanged {
                round: self.current_round,
            });
        }
        bus.emit(GameEvent::TurnChanged {
            player: self.current_player,
            round: self.current_round,
        });
    }

    /// Draws two distinct symbols from `pool` and assigns one to each player.
    ///
    /// Draws are uniform with resampling on collision, expressed as a
    /// bounded loop: after a fixed number of collisions the second symbol
    /// falls back to a scan for any entry differing from the first.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError::EmptyPool`] when the pool holds fewer than two
    /// entries, or when every entry is identical.
    #[instrument(skip(self, pool), fields(pool_len = pool.len()))]
    pub fn select_symbols(&mut self, pool: &[SymbolId]) -> Result<(), SymbolError> {
        if pool.len() < 2 {
            return Err(SymbolError::EmptyPool(pool.len()));
        }

        let mut rng = rand::rng();
        let first = pool[rng.random_range(0..pool.len())].clone();

        const MAX_RESAMPLES: usize = 32;
        let mut second = None;
        for _ in 0..MAX_RESAMPLES {
            let candidate = &pool[rng.random_range(0..pool.len())];
            if *candidate != first {
                second = Some(candidate.clone());
                break;
            }
        }
        // A pool of duplicates can defeat resampling no matter how many
        // draws we allow, so fall back to a scan before giving up.
        let second = match second.or_else(|| pool.iter().find(|s| **s != first).cloned()) {
            Some(symbol) => symbol,
            None => return Err(SymbolError::EmptyPool(1)),
        };

        info!(player_one = %first, player_two = %second, "player symbols selected");
        self.symbols = Some(SelectedSymbols {
            player_one: first,
            player_two: second,
        });
        Ok(())
    }

    /// Returns to player one, round one. Symbol assignments are kept until
    /// the next selection.
    pub fn reset(&mut self) {
        self.current_player = PlayerId::One;
        self.current_round = 1;
    }
}

impl Default for TurnSequencer {
    fn default() -> Self {
        Self::new()
    }
}
