//! Normalization of the two wire forms into the canonical [`Grid`].
//!
//! Per-cell normalization is total: every input maps to exactly one [`Cell`],
//! with anything unrecognizable folded into `Cell::Unknown`. The only way a
//! whole-map conversion can fail is a ragged body, which is a malformed fetch
//! rather than a normalization problem.

use crate::api::{CurrentRows, GoalRows, RawCell};
use crate::grid::{Cell, Color, Direction, Grid, ShapeError};

/// Type codes the current-map endpoint uses.
const TYPE_POLYANET: i64 = 0;
const TYPE_SOLOON: i64 = 1;
const TYPE_COMETH: i64 = 2;

/// Normalize one current-map position.
pub fn current_cell(raw: Option<&RawCell>) -> Cell {
    let Some(raw) = raw else {
        return Cell::Space;
    };

    match raw.type_code {
        TYPE_POLYANET => Cell::Polyanet,
        TYPE_SOLOON => match raw.color.as_deref().and_then(Color::parse) {
            Some(color) => Cell::Soloon { color },
            None => Cell::Unknown {
                token: format!(
                    "{}_SOLOON",
                    raw.color.as_deref().unwrap_or("?").trim().to_ascii_uppercase()
                ),
            },
        },
        TYPE_COMETH => match raw.direction.as_deref().and_then(Direction::parse) {
            Some(direction) => Cell::Cometh { direction },
            None => Cell::Unknown {
                token: format!(
                    "{}_COMETH",
                    raw.direction
                        .as_deref()
                        .unwrap_or("?")
                        .trim()
                        .to_ascii_uppercase()
                ),
            },
        },
        code => Cell::Unknown {
            token: format!("TYPE_{}", code),
        },
    }
}

/// Normalize one goal-map token.
pub fn goal_cell(token: Option<&str>) -> Cell {
    let Some(token) = token else {
        return Cell::Space;
    };

    let token = token.trim().to_ascii_uppercase();
    if token.is_empty() || token == "SPACE" {
        return Cell::Space;
    }
    if token == "POLYANET" {
        return Cell::Polyanet;
    }

    // Attributed tokens are "<ATTRIBUTE>_<KIND>", split on the first separator.
    if let Some((attribute, kind)) = token.split_once('_') {
        match kind {
            "SOLOON" => {
                if let Some(color) = Color::parse(attribute) {
                    return Cell::Soloon { color };
                }
            }
            "COMETH" => {
                if let Some(direction) = Direction::parse(attribute) {
                    return Cell::Cometh { direction };
                }
            }
            _ => {}
        }
    }

    Cell::Unknown { token }
}

/// Normalize the whole current map.
pub fn current_grid(rows: &CurrentRows) -> Result<Grid, ShapeError> {
    Grid::from_rows(
        rows.iter()
            .map(|row| row.iter().map(|cell| current_cell(cell.as_ref())).collect())
            .collect(),
    )
}

/// Normalize the whole goal map.
pub fn goal_grid(rows: &GoalRows) -> Result<Grid, ShapeError> {
    Grid::from_rows(
        rows.iter()
            .map(|row| row.iter().map(|cell| goal_cell(cell.as_deref())).collect())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(type_code: i64, color: Option<&str>, direction: Option<&str>) -> RawCell {
        RawCell {
            type_code,
            color: color.map(String::from),
            direction: direction.map(String::from),
        }
    }

    #[test]
    fn test_current_absent_is_space() {
        assert_eq!(current_cell(None), Cell::Space);
    }

    #[test]
    fn test_current_type_codes() {
        assert_eq!(current_cell(Some(&raw(0, None, None))), Cell::Polyanet);
        assert_eq!(
            current_cell(Some(&raw(1, Some("blue"), None))),
            Cell::Soloon { color: Color::Blue }
        );
        assert_eq!(
            current_cell(Some(&raw(2, None, Some("up")))),
            Cell::Cometh {
                direction: Direction::Up
            }
        );
    }

    #[test]
    fn test_current_unknown_type_code() {
        let cell = current_cell(Some(&raw(7, None, None)));
        assert_eq!(
            cell,
            Cell::Unknown {
                token: "TYPE_7".to_string()
            }
        );
    }

    #[test]
    fn test_current_soloon_with_bad_color_degrades() {
        let cell = current_cell(Some(&raw(1, Some("lime"), None)));
        assert!(cell.is_unknown());

        let cell = current_cell(Some(&raw(1, None, None)));
        assert!(cell.is_unknown());
    }

    #[test]
    fn test_goal_absence_markers() {
        assert_eq!(goal_cell(None), Cell::Space);
        assert_eq!(goal_cell(Some("SPACE")), Cell::Space);
        assert_eq!(goal_cell(Some("  space ")), Cell::Space);
    }

    #[test]
    fn test_goal_tokens() {
        assert_eq!(goal_cell(Some("POLYANET")), Cell::Polyanet);
        assert_eq!(
            goal_cell(Some("RED_SOLOON")),
            Cell::Soloon { color: Color::Red }
        );
        assert_eq!(
            goal_cell(Some("left_cometh")),
            Cell::Cometh {
                direction: Direction::Left
            }
        );
    }

    #[test]
    fn test_goal_unrecognized_token_is_unknown() {
        assert_eq!(
            goal_cell(Some("BANANA")),
            Cell::Unknown {
                token: "BANANA".to_string()
            }
        );
        assert!(goal_cell(Some("GREEN_SOLOON")).is_unknown());
    }

    #[test]
    fn test_normalization_is_total_over_supported_inputs() {
        // Every type code in a wide range maps to exactly one cell, no panics.
        for code in -3..10 {
            let _ = current_cell(Some(&raw(code, Some("blue"), Some("up"))));
        }
    }

    #[test]
    fn test_current_grid_shapes() {
        let rows = vec![
            vec![None, Some(raw(0, None, None))],
            vec![Some(raw(1, Some("white"), None)), None],
        ];
        let grid = current_grid(&rows).unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.get(0, 1), &Cell::Polyanet);
    }

    #[test]
    fn test_ragged_body_is_rejected() {
        let rows: GoalRows = vec![
            vec![Some("SPACE".to_string()), Some("POLYANET".to_string())],
            vec![Some("SPACE".to_string())],
        ];
        assert!(goal_grid(&rows).is_err());
    }
}
