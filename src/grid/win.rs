//! Win detection over the last-played space.
//!
//! All three checks key off the space that was just filled rather than
//! scanning the whole board: the only lines that can have become winning
//! are the ones passing through it.

use tracing::{debug, instrument};

use super::{Grid, GridError, SpaceLabel};
use crate::turn::PlayerId;

impl Grid {
    /// Whether the last-played space completed its row.
    ///
    /// True iff every space in the row is filled by the last-played owner.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotFound`] when the label is not in this grid.
    #[instrument(skip(self))]
    pub fn check_row(&self, last_played: SpaceLabel) -> Result<bool, GridError> {
        let (row, column) = self.locate(last_played)?;
        let Some(owner) = self.rows[row][column].owner() else {
            return Ok(false);
        };
        Ok(self.rows[row].iter().all(|space| space.owner() == Some(owner)))
    }

    /// Whether the last-played space completed its column.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotFound`] when the label is not in this grid.
    #[instrument(skip(self))]
    pub fn check_column(&self, last_played: SpaceLabel) -> Result<bool, GridError> {
        let (row, column) = self.locate(last_played)?;
        let Some(owner) = self.rows[row][column].owner() else {
            return Ok(false);
        };
        Ok(self
            .rows
            .iter()
            .all(|grid_row| grid_row[column].owner() == Some(owner)))
    }

    /// Whether the last-played space completed a full-length diagonal.
    ///
    /// Both diagonal axes through the space are evaluated independently:
    /// the ↖/↘ axis and the ↗/↙ axis. For each axis the walk starts at the
    /// last-played space and moves outward in both directions, counting
    /// contiguous spaces filled by the same owner and aborting the axis the
    /// moment a space is empty or foreign. An axis wins only when the count
    /// equals the grid dimension, so off-center diagonals, which are
    /// geometrically shorter than the dimension, can never win.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotFound`] when the label is not in this grid.
    #[instrument(skip(self))]
    pub fn check_diagonal(&self, last_played: SpaceLabel) -> Result<bool, GridError> {
        let (row, column) = self.locate(last_played)?;
        let Some(owner) = self.rows[row][column].owner() else {
            return Ok(false);
        };

        let dimension = self.dimension();
        // Downward axis (↖ then ↘), then upward axis (↗ then ↙).
        for (delta_row, delta_column) in [(1isize, 1isize), (-1isize, 1isize)] {
            let run = self.diagonal_run(row, column, owner, delta_row, delta_column);
            debug!(delta_row, delta_column, run, "diagonal run counted");
            if run == dimension {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Counts the contiguous same-owner run along one diagonal axis,
    /// including the starting space. Returns 0 when the axis aborted on an
    /// empty or foreign space.
    fn diagonal_run(
        &self,
        row: usize,
        column: usize,
        owner: PlayerId,
        delta_row: isize,
        delta_column: isize,
    ) -> usize {
        let dimension = self.dimension() as isize;
        let mut count = 1usize;
        for (step_row, step_column) in [(delta_row, delta_column), (-delta_row, -delta_column)] {
            let mut r = row as isize + step_row;
            let mut c = column as isize + step_column;
            while (0..dimension).contains(&r) && (0..dimension).contains(&c) {
                match self.rows[r as usize][c as usize].owner() {
                    Some(player) if player == owner => count += 1,
                    _ => return 0,
                }
                r += step_row;
                c += step_column;
            }
        }
        count
    }

    /// Combined win determination for the session controller:
    /// row, then column, then diagonal, short-circuited in that order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotFound`] when the label is not in this grid.
    #[instrument(skip(self))]
    pub fn is_winning_move(&self, last_played: SpaceLabel) -> Result<bool, GridError> {
        Ok(self.check_row(last_played)?
            || self.check_column(last_played)?
            || self.check_diagonal(last_played)?)
    }
}
