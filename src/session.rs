//! Game session controller: composes the grid engine, turn sequencer,
//! move ledger, event bus, and audio director into one session lifecycle.

use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};

use crate::audio::{AudioDirector, ClipId, Mixer};
use crate::events::{EventBus, GameEvent};
use crate::grid::{FillOutcome, Grid, GridError, GridKind, SpaceLabel};
use crate::ledger::{Move, MoveLedger};
use crate::turn::{PlayerId, SymbolError, SymbolId, TurnSequencer};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No grids built yet.
    Idle,
    /// Grids built, nothing active.
    Loaded,
    /// A game is being played.
    InProgress,
    /// The game ended with a winner.
    Ended,
}

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SessionError {
    /// The operation is not valid in the current phase.
    #[display("operation not valid in phase {:?}", _0)]
    Phase(SessionPhase),
    /// No grid has been activated for play.
    #[display("no active grid")]
    NoActiveGrid,
    /// A grid operation failed.
    #[display("{}", _0)]
    Grid(GridError),
    /// Symbol selection failed.
    #[display("{}", _0)]
    Symbols(SymbolError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Grid(err) => Some(err),
            SessionError::Symbols(err) => Some(err),
            SessionError::Phase(_) | SessionError::NoActiveGrid => None,
        }
    }
}

impl From<GridError> for SessionError {
    fn from(err: GridError) -> Self {
        SessionError::Grid(err)
    }
}

impl From<SymbolError> for SessionError {
    fn from(err: SymbolError) -> Self {
        SessionError::Symbols(err)
    }
}

/// The sound effects a session triggers on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct SessionClips {
    /// One-shot played when a symbol lands on a space.
    pub symbol_placed: ClipId,
    /// One-shot fanfare played when a player wins.
    pub end_game_fanfare: ClipId,
}

/// Result of a play on the active grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The move was placed and won the game.
    Won(PlayerId),
    /// The move was placed; play passed to the next turn.
    NextTurn,
    /// The space was already taken; nothing changed.
    AlreadyTaken,
}

/// Orchestrates one game session.
///
/// Collaborators are injected at construction: the audio director wraps the
/// backend mixer, and UI notifications go through the event bus. There is
/// no global instance registry.
pub struct GameSession<M> {
    phase: SessionPhase,
    grids: Vec<Grid>,
    active: Option<GridKind>,
    sequencer: TurnSequencer,
    ledger: MoveLedger,
    bus: EventBus,
    audio: AudioDirector<M>,
    symbol_pool: Vec<SymbolId>,
    clips: SessionClips,
}

impl<M: Mixer + Send + 'static> GameSession<M> {
    /// Creates an idle session with its collaborators wired in.
    pub fn new(audio: AudioDirector<M>, symbol_pool: Vec<SymbolId>, clips: SessionClips) -> Self {
        Self {
            phase: SessionPhase::Idle,
            grids: Vec::new(),
            active: None,
            sequencer: TurnSequencer::new(),
            ledger: MoveLedger::new(),
            bus: EventBus::new(),
            audio,
            symbol_pool,
            clips,
        }
    }

    /// Registers a subscriber for turn/round/game-over notifications.
    pub fn subscribe(&mut self, subscriber: impl Fn(&GameEvent) + Send + 'static) {
        self.bus.subscribe(subscriber);
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The grid currently being played on, if any.
    pub fn active_grid(&self) -> Option<&Grid> {
        let kind = self.active?;
        self.grids.iter().find(|grid| grid.kind() == kind)
    }

    fn active_grid_mut(&mut self) -> Result<&mut Grid, SessionError> {
        let kind = self.active.ok_or(SessionError::NoActiveGrid)?;
        self.grids
            .iter_mut()
            .find(|grid| grid.kind() == kind)
            .ok_or(SessionError::NoActiveGrid)
    }

    /// The move history of the current game.
    pub fn ledger(&self) -> &MoveLedger {
        &self.ledger
    }

    /// The turn sequencer.
    pub fn sequencer(&self) -> &TurnSequencer {
        &self.sequencer
    }

    /// The audio director.
    pub fn audio(&self) -> &AudioDirector<M> {
        &self.audio
    }

    /// Builds both grid variants and leaves them inactive.
    ///
    /// Transitions `Idle -> Loaded`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Phase`] outside `Idle`; build failures
    /// propagate as [`SessionError::Grid`].
    #[instrument(skip(self))]
    pub fn load_grids(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::Phase(self.phase));
        }

        self.grids.clear();
        for kind in GridKind::iter() {
            let spaces = kind
                .labels()
                .into_iter()
                .map(crate::grid::GridSpace::new)
                .collect();
            self.grids.push(Grid::build(kind, spaces)?);
        }
        self.phase = SessionPhase::Loaded;
        info!("grids loaded");
        Ok(())
    }

    /// Starts a game on the grid of the given kind.
    ///
    /// Selects player symbols, resets the sequencer to player one / round
    /// one, fires the initial turn and round notifications, and activates
    /// a freshly cleared grid. Transitions `Loaded | Ended -> InProgress`,
    /// so a rematch can start straight from `Ended`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Phase`] outside `Loaded`/`Ended`;
    /// [`SessionError::Symbols`] when the pool cannot yield two distinct
    /// symbols.
    #[instrument(skip(self))]
    pub fn start_game(&mut self, kind: GridKind) -> Result<(), SessionError> {
        if !matches!(self.phase, SessionPhase::Loaded | SessionPhase::Ended) {
            return Err(SessionError::Phase(self.phase));
        }

        self.sequencer.select_symbols(&self.symbol_pool)?;
        self.sequencer.reset();
        self.bus.emit(GameEvent::TurnChanged {
            player: self.sequencer.current_player(),
            round: self.sequencer.current_round(),
        });
        self.bus.emit(GameEvent::RoundChanged {
            round: self.sequencer.current_round(),
        });

        // A restart from Ended begins on a clean board.
        self.ledger.clear();
        for grid in &mut self.grids {
            grid.reset();
            if grid.kind() == kind {
                grid.activate();
            }
        }
        self.active = Some(kind);
        self.phase = SessionPhase::InProgress;
        info!(%kind, "game started");
        Ok(())
    }

    /// Handles a space being played: fills it, plays the placement sound,
    /// records the move, and checks for victory.
    ///
    /// An already-taken space is the documented no-op: the turn does not
    /// advance and nothing is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Phase`] outside `InProgress`; an unknown
    /// label propagates as [`SessionError::Grid`].
    #[instrument(skip(self))]
    pub fn play(&mut self, label: SpaceLabel) -> Result<PlayOutcome, SessionError> {
        if self.phase != SessionPhase::InProgress {
            return Err(SessionError::Phase(self.phase));
        }

        let player = self.sequencer.current_player();
        let round = self.sequencer.current_round();
        if self.active_grid_mut()?.fill(label, player)? == FillOutcome::AlreadyTaken {
            warn!(%label, "ignored play on a taken space");
            return Ok(PlayOutcome::AlreadyTaken);
        }

        self.audio.play_sound(self.clips.symbol_placed.clone());
        let symbol = self
            .sequencer
            .symbol_for(player)
            .cloned()
            .expect("symbols are selected before a game is in progress");
        self.ledger.record(Move::new(label, player, round, symbol));

        if self.check_victory(label)? {
            Ok(PlayOutcome::Won(player))
        } else {
            Ok(PlayOutcome::NextTurn)
        }
    }

    /// Delegates to the grid's combined win check; a win ends the game,
    /// anything else advances the turn.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveGrid`] when nothing is active; an
    /// unknown label propagates as [`SessionError::Grid`].
    #[instrument(skip(self))]
    pub fn check_victory(&mut self, last_played: SpaceLabel) -> Result<bool, SessionError> {
        let won = {
            let kind = self.active.ok_or(SessionError::NoActiveGrid)?;
            let grid = self
                .grids
                .iter()
                .find(|grid| grid.kind() == kind)
                .ok_or(SessionError::NoActiveGrid)?;
            grid.is_winning_move(last_played)?
        };

        if won {
            self.end_game(self.sequencer.current_player())?;
        } else {
            self.sequencer.advance(&self.bus);
        }
        Ok(won)
    }

    /// Ends the game: notifies subscribers, silences the music, and plays
    /// the fanfare. Transitions `InProgress -> Ended`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Phase`] outside `InProgress`.
    #[instrument(skip(self))]
    pub fn end_game(&mut self, winner: PlayerId) -> Result<(), SessionError> {
        if self.phase != SessionPhase::InProgress {
            return Err(SessionError::Phase(self.phase));
        }

        self.phase = SessionPhase::Ended;
        let message = format!("Player {winner} Won!");
        info!(%winner, "game over");
        self.bus.emit(GameEvent::GameOver { winner, message });
        self.audio.halt_all();
        self.audio.play_sound(self.clips.end_game_fanfare.clone());
        Ok(())
    }

    /// Resets for the next game: clears and deactivates the active grid,
    /// empties the ledger, and resets the sequencer.
    /// Transitions `Ended -> Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Phase`] outside `Ended`.
    #[instrument(skip(self))]
    pub fn reset_game(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Ended {
            return Err(SessionError::Phase(self.phase));
        }

        self.active_grid_mut()?.reset();
        self.active = None;
        self.ledger.clear();
        self.sequencer.reset();
        self.phase = SessionPhase::Idle;
        info!("session reset");
        Ok(())
    }
}

impl<M> std::fmt::Debug for GameSession<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.phase)
            .field("active", &self.active)
            .field("moves", &self.ledger.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoftwareMixer;
    use std::time::Duration;

    fn session() -> GameSession<SoftwareMixer> {
        let audio = AudioDirector::new(SoftwareMixer::new(), Duration::from_secs(1));
        let pool = vec!["cross".to_string(), "ring".to_string(), "star".to_string()];
        let clips = SessionClips::new("place".to_string(), "fanfare".to_string());
        GameSession::new(audio, pool, clips)
    }

    fn label(row: char, column: char) -> SpaceLabel {
        SpaceLabel::new(row, column)
    }

    #[test]
    fn test_lifecycle_phases() {
        let mut session = session();
        assert_eq!(session.phase(), SessionPhase::Idle);

        session.load_grids().expect("idle session loads");
        assert_eq!(session.phase(), SessionPhase::Loaded);
        assert!(session.active_grid().is_none());

        session
            .start_game(GridKind::ThreeByThree)
            .expect("loaded session starts");
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert!(session.active_grid().expect("grid active").is_active());
    }

    #[test]
    fn test_operations_reject_wrong_phase() {
        let mut session = session();
        assert!(matches!(
            session.start_game(GridKind::ThreeByThree),
            Err(SessionError::Phase(SessionPhase::Idle))
        ));
        assert!(matches!(
            session.play(label('A', '1')),
            Err(SessionError::Phase(SessionPhase::Idle))
        ));
        assert!(matches!(
            session.reset_game(),
            Err(SessionError::Phase(SessionPhase::Idle))
        ));

        session.load_grids().expect("idle session loads");
        assert!(matches!(
            session.load_grids(),
            Err(SessionError::Phase(SessionPhase::Loaded))
        ));
    }

    #[test]
    fn test_taken_space_does_not_advance_the_turn() {
        let mut session = session();
        session.load_grids().expect("idle session loads");
        session
            .start_game(GridKind::ThreeByThree)
            .expect("loaded session starts");

        assert_eq!(
            session.play(label('B', '2')).expect("legal move"),
            PlayOutcome::NextTurn
        );
        assert_eq!(session.sequencer().current_player(), PlayerId::Two);

        // Player two tries the same space: nothing moves.
        assert_eq!(
            session.play(label('B', '2')).expect("no-op"),
            PlayOutcome::AlreadyTaken
        );
        assert_eq!(session.sequencer().current_player(), PlayerId::Two);
        assert_eq!(session.ledger().len(), 1);
    }

    #[test]
    fn test_row_scenario_ends_with_player_one_win() {
        let mut session = session();
        session.load_grids().expect("idle session loads");
        session
            .start_game(GridKind::ThreeByThree)
            .expect("loaded session starts");

        // Player one fills row A across rounds 1-3, player two elsewhere.
        for (one, two) in [(('A', '1'), ('B', '1')), (('A', '2'), ('B', '2'))] {
            assert_eq!(
                session.play(label(one.0, one.1)).expect("legal move"),
                PlayOutcome::NextTurn
            );
            assert_eq!(
                session.play(label(two.0, two.1)).expect("legal move"),
                PlayOutcome::NextTurn
            );
        }
        assert_eq!(
            session.play(label('A', '3')).expect("legal move"),
            PlayOutcome::Won(PlayerId::One)
        );
        assert_eq!(session.phase(), SessionPhase::Ended);

        // Rounds 1-3 all belong to player one in the ledger.
        for round in 1..=3 {
            let recorded = session
                .ledger()
                .lookup(round, PlayerId::One)
                .expect("recorded");
            assert_eq!(*recorded.round(), round);
        }
    }

    #[test]
    fn test_end_game_notifies_and_plays_fanfare() {
        use std::sync::{Arc, Mutex};

        let mut session = session();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        session.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        session.load_grids().expect("idle session loads");
        session
            .start_game(GridKind::ThreeByThree)
            .expect("loaded session starts");
        for play in [('A', '1'), ('B', '1'), ('A', '2'), ('B', '2'), ('A', '3')] {
            session.play(label(play.0, play.1)).expect("legal move");
        }

        let events = events.lock().unwrap();
        let game_over = events
            .iter()
            .find_map(|event| match event {
                GameEvent::GameOver { winner, message } => Some((*winner, message.clone())),
                _ => None,
            })
            .expect("game over emitted");
        assert_eq!(game_over.0, PlayerId::One);
        assert_eq!(game_over.1, "Player One Won!");

        let mixer = session.audio().mixer();
        let mixer = mixer.lock().unwrap();
        assert_eq!(mixer.one_shots().last().map(String::as_str), Some("fanfare"));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut session = session();
        session.load_grids().expect("idle session loads");
        session
            .start_game(GridKind::FourByFour)
            .expect("loaded session starts");
        for play in [('A', '1'), ('B', '1'), ('A', '2'), ('B', '2'), ('A', '3'), ('B', '3'), ('A', '4')] {
            session.play(label(play.0, play.1)).expect("legal move");
        }
        assert_eq!(session.phase(), SessionPhase::Ended);

        session.reset_game().expect("ended session resets");
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.active_grid().is_none());
        assert!(session.ledger().is_empty());
        assert_eq!(session.sequencer().current_round(), 1);
    }
}
