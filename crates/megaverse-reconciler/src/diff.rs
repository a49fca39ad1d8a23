//! Edit planner — diffs the current grid against the goal and emits the
//! minimal ordered edit set.
//!
//! The planner is stateless and pure: it compares two grids and returns the
//! edits needed to converge them, in row-major order so a pass is
//! reproducible and auditable. It never executes anything itself.

use std::fmt;

use thiserror::Error;

use crate::grid::{Cell, Grid};

/// The two grids being compared do not have the same dimensions.
#[derive(Debug, Error)]
#[error(
    "grid dimensions differ: current is {current_rows}x{current_columns}, goal is {goal_rows}x{goal_columns}"
)]
pub struct DimensionMismatch {
    pub current_rows: usize,
    pub current_columns: usize,
    pub goal_rows: usize,
    pub goal_columns: usize,
}

/// What to do at one position.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    /// Put the given cell at the position.
    Create(Cell),
    /// Remove the given (current) cell. The cell is carried only so the
    /// actuator can route the delete to the right endpoint.
    Delete(Cell),
}

/// A single create-or-delete instruction for one position.
///
/// Edits are derived once per pass, consumed exactly once by the actuator,
/// and discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub row: usize,
    pub column: usize,
    pub action: EditAction,
}

impl EditAction {
    /// Short human-readable form, e.g. "create BLUE_SOLOON".
    pub fn describe(&self) -> String {
        match self {
            Self::Create(cell) => format!("create {}", cell),
            Self::Delete(cell) => format!("delete {}", cell),
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at ({}, {})",
            self.action.describe(),
            self.row,
            self.column
        )
    }
}

/// Compute the minimal edit set that converges `current` onto `goal`.
///
/// Positions are visited row-major (row ascending, then column ascending).
/// Equal cells and both-space positions produce nothing; a space goal over a
/// non-space current cell produces a delete; every other difference produces
/// a create of the goal cell, which the remote service applies over whatever
/// is there.
pub fn plan(current: &Grid, goal: &Grid) -> Result<Vec<Edit>, DimensionMismatch> {
    if current.rows() != goal.rows() || current.columns() != goal.columns() {
        return Err(DimensionMismatch {
            current_rows: current.rows(),
            current_columns: current.columns(),
            goal_rows: goal.rows(),
            goal_columns: goal.columns(),
        });
    }

    let mut edits = Vec::new();
    for row in 0..current.rows() {
        for column in 0..current.columns() {
            let have = current.get(row, column);
            let want = goal.get(row, column);

            if have.is_space() && want.is_space() {
                continue;
            }
            if have.satisfies(want) {
                continue;
            }

            let action = if want.is_space() {
                EditAction::Delete(have.clone())
            } else {
                EditAction::Create(want.clone())
            };
            edits.push(Edit { row, column, action });
        }
    }

    Ok(edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Color, Direction};

    fn grid_of(cells: Vec<Vec<Cell>>) -> Grid {
        Grid::from_rows(cells).unwrap()
    }

    #[test]
    fn test_identical_grids_produce_no_edits() {
        let grid = grid_of(vec![
            vec![Cell::Polyanet, Cell::Space],
            vec![Cell::Soloon { color: Color::Blue }, Cell::Space],
        ]);
        let edits = plan(&grid, &grid.clone()).unwrap();
        assert!(edits.is_empty());
    }

    #[test]
    fn test_both_space_is_a_noop_not_a_delete() {
        let grid = grid_of(vec![vec![Cell::Space, Cell::Space]]);
        assert!(plan(&grid, &grid.clone()).unwrap().is_empty());
    }

    #[test]
    fn test_single_create() {
        let mut current = vec![vec![Cell::Space; 5]; 5];
        let mut goal = current.clone();
        goal[3][3] = Cell::Polyanet;
        let edits = plan(&grid_of(current.clone()), &grid_of(goal.clone())).unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].row, 3);
        assert_eq!(edits[0].column, 3);
        assert_eq!(edits[0].action, EditAction::Create(Cell::Polyanet));

        // Reversed, the same position yields exactly one delete.
        std::mem::swap(&mut current, &mut goal);
        let edits = plan(&grid_of(current), &grid_of(goal)).unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].action, EditAction::Delete(Cell::Polyanet));
    }

    #[test]
    fn test_row_major_ordering() {
        let current = grid_of(vec![vec![Cell::Space; 3]; 3]);
        let goal = grid_of(vec![
            vec![Cell::Space, Cell::Polyanet, Cell::Space],
            vec![Cell::Polyanet, Cell::Space, Cell::Polyanet],
            vec![Cell::Space, Cell::Polyanet, Cell::Space],
        ]);
        let edits = plan(&current, &goal).unwrap();
        let positions: Vec<(usize, usize)> = edits.iter().map(|e| (e.row, e.column)).collect();
        assert_eq!(positions, vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
        // Strictly increasing in row-major order.
        for pair in positions.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_differing_occupants_produce_a_create_of_the_goal() {
        let current = grid_of(vec![vec![Cell::Polyanet]]);
        let goal = grid_of(vec![vec![Cell::Soloon { color: Color::Red }]]);
        let edits = plan(&current, &goal).unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(
            edits[0].action,
            EditAction::Create(Cell::Soloon { color: Color::Red })
        );
    }

    #[test]
    fn test_attribute_mismatch_is_an_edit() {
        let current = grid_of(vec![vec![Cell::Cometh {
            direction: Direction::Up,
        }]]);
        let goal = grid_of(vec![vec![Cell::Cometh {
            direction: Direction::Down,
        }]]);
        let edits = plan(&current, &goal).unwrap();
        assert_eq!(edits.len(), 1);
    }

    #[test]
    fn test_unknown_current_cell_forces_an_edit() {
        let unknown = Cell::Unknown {
            token: "TYPE_7".to_string(),
        };
        let current = grid_of(vec![vec![unknown.clone()]]);

        // Against a space goal: a delete of the unknown occupant.
        let goal = grid_of(vec![vec![Cell::Space]]);
        let edits = plan(&current, &goal).unwrap();
        assert_eq!(edits[0].action, EditAction::Delete(unknown));

        // Against a concrete goal: a create of the goal cell.
        let goal = grid_of(vec![vec![Cell::Polyanet]]);
        let edits = plan(&current, &goal).unwrap();
        assert_eq!(edits[0].action, EditAction::Create(Cell::Polyanet));
    }

    #[test]
    fn test_dimension_mismatch_fails_fast() {
        let current = Grid::empty(2, 2);
        let goal = Grid::empty(3, 2);
        let err = plan(&current, &goal).unwrap_err();
        assert_eq!(err.current_rows, 2);
        assert_eq!(err.goal_rows, 3);
    }
}
