//! Tetromino definitions and shapes
//!
//! The seven piece kinds with their catalog shapes. Shapes are square
//! matrices so the rotation transform can treat them uniformly.

use ratatui::style::Color;

/// The 7 tetromino kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

/// A shape matrix: each cell is empty or tagged with the kind that owns it
pub type Shape = Vec<Vec<Option<PieceKind>>>;

/// The 1×1 empty shape standing in for "no active piece" before the
/// first spawn
pub fn empty_shape() -> Shape {
    vec![vec![None]]
}

fn build(kind: PieceKind, rows: &[&str]) -> Shape {
    rows.iter()
        .map(|row| row.bytes().map(|b| (b != b'.').then_some(kind)).collect())
        .collect()
}

impl PieceKind {
    /// Get the display color for this kind
    pub fn color(&self) -> Color {
        match self {
            PieceKind::I => Color::Rgb(59, 130, 246),  // Blue
            PieceKind::J => Color::Rgb(99, 102, 241),  // Indigo
            PieceKind::L => Color::Rgb(245, 158, 11),  // Amber
            PieceKind::O => Color::Rgb(252, 211, 77),  // Yellow
            PieceKind::S => Color::Rgb(16, 185, 129),  // Green
            PieceKind::T => Color::Rgb(236, 72, 153),  // Pink
            PieceKind::Z => Color::Rgb(239, 68, 68),   // Red
        }
    }

    /// Get all kinds, for random selection
    pub fn all() -> [PieceKind; 7] {
        [
            PieceKind::I,
            PieceKind::J,
            PieceKind::L,
            PieceKind::O,
            PieceKind::S,
            PieceKind::T,
            PieceKind::Z,
        ]
    }

    /// Catalog shape at spawn orientation.
    /// Bounding box is 4×4 for I, 2×2 for O, 3×3 for the rest.
    pub fn shape(&self) -> Shape {
        match self {
            PieceKind::I => build(*self, &[".X..", ".X..", ".X..", ".X.."]),
            PieceKind::J => build(*self, &[".X.", ".X.", "XX."]),
            PieceKind::L => build(*self, &[".X.", ".X.", ".XX"]),
            PieceKind::O => build(*self, &["XX", "XX"]),
            PieceKind::S => build(*self, &[".XX", "XX.", "..."]),
            PieceKind::T => build(*self, &["...", "XXX", ".X."]),
            PieceKind::Z => build(*self, &["XX.", ".XX", "..."]),
        }
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes_are_square() {
        for kind in PieceKind::all() {
            let shape = kind.shape();
            for row in &shape {
                assert_eq!(row.len(), shape.len(), "{:?} shape must be square", kind);
            }
        }
    }

    #[test]
    fn test_bounding_boxes() {
        assert_eq!(PieceKind::I.shape().len(), 4);
        assert_eq!(PieceKind::O.shape().len(), 2);
        for kind in [PieceKind::J, PieceKind::L, PieceKind::S, PieceKind::T, PieceKind::Z] {
            assert_eq!(kind.shape().len(), 3, "{:?} shape must be 3×3", kind);
        }
    }

    #[test]
    fn test_cells_tagged_with_own_kind() {
        for kind in PieceKind::all() {
            for row in kind.shape() {
                for cell in row.into_iter().flatten() {
                    assert_eq!(cell, kind);
                }
            }
        }
    }

    #[test]
    fn test_empty_shape_is_sentinel() {
        let shape = empty_shape();
        assert_eq!(shape.len(), 1);
        assert_eq!(shape[0], vec![None]);
    }
}
