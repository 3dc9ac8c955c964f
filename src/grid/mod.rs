//! Grid engine: owns the square arrangement of spaces, normalizes arbitrary
//! input ordering at build time, and hosts the win checks in [`win`].

mod space;
mod win;

pub use space::{FillOutcome, GridSpace, SpaceLabel, SpaceState};

use std::collections::HashSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::turn::PlayerId;

/// Supported grid variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, strum::EnumIter)]
pub enum GridKind {
    /// Classic 3x3 board.
    #[display("3x3")]
    ThreeByThree,
    /// Extended 4x4 board.
    #[display("4x4")]
    FourByFour,
}

impl GridKind {
    /// Side length of the square grid.
    pub fn dimension(self) -> usize {
        match self {
            GridKind::ThreeByThree => 3,
            GridKind::FourByFour => 4,
        }
    }

    /// Row letters for this variant, top to bottom.
    pub fn row_labels(self) -> impl Iterator<Item = char> {
        ('A'..).take(self.dimension())
    }

    /// Column digits for this variant, left to right.
    pub fn column_labels(self) -> impl Iterator<Item = char> {
        ('1'..).take(self.dimension())
    }

    /// The full label set for this variant, in row-major order.
    pub fn labels(self) -> Vec<SpaceLabel> {
        self.row_labels()
            .flat_map(|row| self.column_labels().map(move |column| SpaceLabel::new(row, column)))
            .collect()
    }
}

/// Errors from grid construction and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GridError {
    /// The input spaces cannot be normalized into a square grid.
    #[display("malformed grid input: {}", _0)]
    Structure(String),
    /// The label does not belong to this grid.
    #[display("space {} is not part of this grid", _0)]
    NotFound(SpaceLabel),
}

impl std::error::Error for GridError {}

/// A square matrix of [`GridSpace`]s in row-major order.
///
/// Built once per instance from an unordered collection of spaces; every
/// lookup and win check afterwards works on the normalized matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    kind: GridKind,
    rows: Vec<Vec<GridSpace>>,
    active: bool,
}

impl Grid {
    /// Normalizes an unordered collection of spaces into a grid.
    ///
    /// Spaces are grouped by row letter and sorted by column digit, which
    /// makes the build deterministic regardless of input order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Structure`] when the total count is wrong, a
    /// (row, column) label pair is duplicated, a label falls outside the
    /// variant's range, or any row ends up with fewer than `dimension`
    /// distinct columns.
    #[instrument(skip(spaces), fields(count = spaces.len()))]
    pub fn build(kind: GridKind, spaces: Vec<GridSpace>) -> Result<Self, GridError> {
        let dimension = kind.dimension();
        let expected = dimension * dimension;
        if spaces.len() != expected {
            return Err(GridError::Structure(format!(
                "expected {expected} spaces for a {kind} grid, got {}",
                spaces.len()
            )));
        }

        let valid: HashSet<SpaceLabel> = kind.labels().into_iter().collect();
        let mut seen = HashSet::new();
        for space in &spaces {
            let label = space.label();
            if !valid.contains(&label) {
                return Err(GridError::Structure(format!(
                    "label {label} is outside the {kind} grid"
                )));
            }
            if !seen.insert(label) {
                return Err(GridError::Structure(format!("duplicate label {label}")));
            }
        }

        let mut rows = Vec::with_capacity(dimension);
        for row_label in kind.row_labels() {
            let mut row: Vec<GridSpace> = spaces
                .iter()
                .filter(|space| space.label().row == row_label)
                .cloned()
                .collect();
            if row.len() != dimension {
                return Err(GridError::Structure(format!(
                    "row {row_label} has {} distinct columns, expected {dimension}",
                    row.len()
                )));
            }
            row.sort_by_key(|space| space.label().column);
            debug!(row = %row_label, "normalized row");
            rows.push(row);
        }

        info!(%kind, "grid built");
        Ok(Self {
            kind,
            rows,
            active: false,
        })
    }

    /// Builds a fresh grid from the variant's full label set.
    pub fn standard(kind: GridKind) -> Self {
        let spaces = kind.labels().into_iter().map(GridSpace::new).collect();
        // The generated label set is well formed for its own kind.
        match Self::build(kind, spaces) {
            Ok(grid) => grid,
            Err(_) => unreachable!("standard label set always normalizes"),
        }
    }

    /// The variant this grid was built for.
    pub fn kind(&self) -> GridKind {
        self.kind
    }

    /// Side length of the grid.
    pub fn dimension(&self) -> usize {
        self.kind.dimension()
    }

    /// Whether this grid is the active session grid.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Marks this grid as the active session grid.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Removes this grid from active duty without clearing its spaces.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Finds the (row, column) matrix indices of the labeled space.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotFound`] when the label is not in this grid.
    pub fn locate(&self, label: SpaceLabel) -> Result<(usize, usize), GridError> {
        for (row_index, row) in self.rows.iter().enumerate() {
            if row[0].label().row != label.row {
                continue;
            }
            for (column_index, space) in row.iter().enumerate() {
                if space.label().column == label.column {
                    return Ok((row_index, column_index));
                }
            }
        }
        Err(GridError::NotFound(label))
    }

    /// The space with the given label.
    pub fn space(&self, label: SpaceLabel) -> Result<&GridSpace, GridError> {
        let (row, column) = self.locate(label)?;
        Ok(&self.rows[row][column])
    }

    /// The space at matrix position (row, column), if in bounds.
    pub fn space_at(&self, row: usize, column: usize) -> Option<&GridSpace> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Fills the labeled space for `player`.
    ///
    /// An already-taken space reports [`FillOutcome::AlreadyTaken`] and is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotFound`] when the label is not in this grid.
    #[instrument(skip(self))]
    pub fn fill(&mut self, label: SpaceLabel, player: PlayerId) -> Result<FillOutcome, GridError> {
        let (row, column) = self.locate(label)?;
        Ok(self.rows[row][column].fill(player))
    }

    /// Whether every space on the grid has been played.
    pub fn is_full(&self) -> bool {
        self.rows.iter().flatten().all(GridSpace::is_filled)
    }

    /// Empties every space and deactivates the grid for the next game.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        for row in &mut self.rows {
            for space in row {
                space.reset();
            }
        }
        self.active = false;
        info!(kind = %self.kind, "grid reset");
    }

    /// Renders the grid as text, one lettered row per line, with `.`, `1`
    /// or `2` per space.
    pub fn display(&self) -> String {
        let mut out = String::new();
        out.push_str("  ");
        for column in self.kind.column_labels() {
            out.push(column);
            out.push(' ');
        }
        out.push('\n');
        for row in &self.rows {
            out.push(row[0].label().row);
            out.push(' ');
            for space in row {
                let mark = match space.owner() {
                    None => '.',
                    Some(player) => char::from(b'0' + player.index()),
                };
                out.push(mark);
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }

    pub(crate) fn rows(&self) -> &[Vec<GridSpace>] {
        &self.rows
    }
}
