//! Canonical grid model: cells, their attributes, and the board itself.
//!
//! Everything here is pure data. The two wire representations the remote
//! service speaks (structured records for the current map, token strings for
//! the goal map) are folded into [`Cell`] by the `normalize` module; every
//! component downstream of normalization works against this one closed type.

use std::fmt;

use thiserror::Error;

/// Soloon color palette accepted by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Blue,
    Red,
    Purple,
    White,
}

impl Color {
    /// Parse a color, trimming whitespace and ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BLUE" => Some(Self::Blue),
            "RED" => Some(Self::Red),
            "PURPLE" => Some(Self::Purple),
            "WHITE" => Some(Self::White),
            _ => None,
        }
    }

    /// Lowercase form used in request payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Purple => "purple",
            Self::White => "white",
        }
    }

    /// Uppercase form used in goal-map tokens.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Blue => "BLUE",
            Self::Red => "RED",
            Self::Purple => "PURPLE",
            Self::White => "WHITE",
        }
    }
}

/// Cometh travel directions accepted by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Parse a direction, trimming whitespace and ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" => Some(Self::Up),
            "DOWN" => Some(Self::Down),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            _ => None,
        }
    }

    /// Lowercase form used in request payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Uppercase form used in goal-map tokens.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

/// One position on the board.
///
/// Attributes are validated at construction: a soloon always carries a legal
/// color and a cometh a legal direction, so equality is exact and
/// locale-independent. Anything the normalizer cannot express as one of the
/// closed variants lands in `Unknown`, carrying the offending token for
/// reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Space,
    Polyanet,
    Soloon { color: Color },
    Cometh { direction: Direction },
    Unknown { token: String },
}

impl Cell {
    pub fn is_space(&self) -> bool {
        matches!(self, Self::Space)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }

    /// Whether this (current) cell already satisfies the given goal cell.
    ///
    /// Unknown cells never satisfy anything and are never satisfied: a
    /// corrective edit is always planned for them, and the actuator decides
    /// separately whether it can act on it.
    pub fn satisfies(&self, goal: &Cell) -> bool {
        if self.is_unknown() || goal.is_unknown() {
            return false;
        }
        self == goal
    }

    /// Short glyph used when rendering a whole board.
    fn glyph(&self) -> String {
        match self {
            Self::Space => "   ".to_string(),
            Self::Polyanet => " P ".to_string(),
            Self::Soloon { color } => format!("S{} ", &color.token()[..1]),
            Self::Cometh { direction } => format!("C{} ", &direction.token()[..1]),
            Self::Unknown { .. } => " ? ".to_string(),
        }
    }
}

/// Displays as the canonical goal-map token ("SPACE", "BLUE_SOLOON", ...).
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space => write!(f, "SPACE"),
            Self::Polyanet => write!(f, "POLYANET"),
            Self::Soloon { color } => write!(f, "{}_SOLOON", color.token()),
            Self::Cometh { direction } => write!(f, "{}_COMETH", direction.token()),
            Self::Unknown { token } => write!(f, "UNKNOWN({})", token),
        }
    }
}

/// The board is not rectangular.
#[derive(Debug, Error)]
#[error("row {row} has {found} columns, expected {expected}")]
pub struct ShapeError {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

/// A rectangular board of cells, indexed by 0-based (row, column).
///
/// Grids are immutable snapshots: one is fetched (or synthesized) per
/// reconciliation pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    columns: usize,
}

impl Grid {
    /// Build a grid from rows, validating that every row has the same width.
    ///
    /// An empty grid (zero rows) is allowed and has zero columns.
    pub fn from_rows(cells: Vec<Vec<Cell>>) -> Result<Self, ShapeError> {
        let columns = cells.first().map(Vec::len).unwrap_or(0);
        for (row, r) in cells.iter().enumerate() {
            if r.len() != columns {
                return Err(ShapeError {
                    row,
                    expected: columns,
                    found: r.len(),
                });
            }
        }
        Ok(Self { cells, columns })
    }

    /// An all-space grid of the given dimensions.
    pub fn empty(rows: usize, columns: usize) -> Self {
        Self {
            cells: vec![vec![Cell::Space; columns]; rows],
            columns,
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> &Cell {
        &self.cells[row][column]
    }

    /// Count of non-space cells.
    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| !cell.is_space())
            .count()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, "{}", cell.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse_normalizes() {
        assert_eq!(Color::parse("blue"), Some(Color::Blue));
        assert_eq!(Color::parse("  PURPLE "), Some(Color::Purple));
        assert_eq!(Color::parse("White"), Some(Color::White));
        assert_eq!(Color::parse("lime"), None);
    }

    #[test]
    fn test_direction_parse_normalizes() {
        assert_eq!(Direction::parse("up"), Some(Direction::Up));
        assert_eq!(Direction::parse(" Right "), Some(Direction::Right));
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn test_cell_equality_requires_attribute() {
        let blue = Cell::Soloon { color: Color::Blue };
        let red = Cell::Soloon { color: Color::Red };
        assert_ne!(blue, red);
        assert_eq!(blue, Cell::Soloon { color: Color::Blue });
    }

    #[test]
    fn test_unknown_never_satisfies() {
        let unknown = Cell::Unknown {
            token: "TYPE_7".to_string(),
        };
        assert!(!unknown.satisfies(&Cell::Space));
        assert!(!Cell::Space.satisfies(&unknown));
        assert!(!unknown.satisfies(&unknown.clone()));
    }

    #[test]
    fn test_space_satisfies_space() {
        assert!(Cell::Space.satisfies(&Cell::Space));
    }

    #[test]
    fn test_cell_display_tokens() {
        assert_eq!(Cell::Polyanet.to_string(), "POLYANET");
        assert_eq!(
            Cell::Soloon { color: Color::Blue }.to_string(),
            "BLUE_SOLOON"
        );
        assert_eq!(
            Cell::Cometh {
                direction: Direction::Left
            }
            .to_string(),
            "LEFT_COMETH"
        );
    }

    #[test]
    fn test_grid_rejects_ragged_rows() {
        let err = Grid::from_rows(vec![
            vec![Cell::Space, Cell::Space],
            vec![Cell::Space],
        ])
        .unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.expected, 2);
        assert_eq!(err.found, 1);
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = Grid::empty(3, 5);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.columns(), 5);
        assert_eq!(grid.occupied(), 0);
    }

    #[test]
    fn test_grid_occupied_counts_non_space() {
        let grid = Grid::from_rows(vec![
            vec![Cell::Space, Cell::Polyanet],
            vec![Cell::Soloon { color: Color::Red }, Cell::Space],
        ])
        .unwrap();
        assert_eq!(grid.occupied(), 2);
    }
}
