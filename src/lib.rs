//! Gridfade - a variable-size tic-tac-toe engine with a time-based audio
//! crossfade director.
//!
//! # Architecture
//!
//! - **Grid**: square matrices of labeled spaces with last-played win
//!   detection over rows, columns, and variable-length diagonals
//! - **Turn**: player alternation, round tracking, and symbol selection
//! - **Ledger**: append-only move history
//! - **Session**: lifecycle controller composing the above
//! - **Audio**: mixer boundary plus tick-driven crossfade/fade-out tasks
//!
//! UI and audio backends are collaborators: they subscribe to the event
//! bus and implement the [`Mixer`] trait, and the core never reaches for a
//! global instance.
//!
//! # Example
//!
//! ```
//! use gridfade::{
//!     AudioDirector, GameSession, GridKind, SessionClips, SoftwareMixer, SpaceLabel,
//! };
//! use std::time::Duration;
//!
//! let audio = AudioDirector::new(SoftwareMixer::new(), Duration::from_secs(1));
//! let pool = vec!["cross".to_string(), "ring".to_string()];
//! let clips = SessionClips::new("place".to_string(), "fanfare".to_string());
//!
//! let mut session = GameSession::new(audio, pool, clips);
//! session.load_grids()?;
//! session.start_game(GridKind::ThreeByThree)?;
//! session.play(SpaceLabel::new('B', '2'))?;
//! # Ok::<(), gridfade::SessionError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod audio;
mod events;
mod grid;
mod ledger;
mod session;
mod turn;

// Crate-level exports - audio subsystem
pub use audio::{
    AudioDirector, ClipId, FADE_TICK, FULL_DB, FadeChannel, Mixer, SILENT_DB, SoftwareMixer,
};

// Crate-level exports - event bus
pub use events::{EventBus, GameEvent};

// Crate-level exports - grid engine
pub use grid::{FillOutcome, Grid, GridError, GridKind, GridSpace, SpaceLabel, SpaceState};

// Crate-level exports - move ledger
pub use ledger::{Move, MoveLedger};

// Crate-level exports - session controller
pub use session::{GameSession, PlayOutcome, SessionClips, SessionError, SessionPhase};

// Crate-level exports - turn sequencing
pub use turn::{PlayerId, SymbolError, SymbolId, TurnSequencer};
