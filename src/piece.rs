//! Active falling piece logic

use crate::stage::{STAGE_WIDTH, Stage};
use crate::tetromino::{PieceKind, RotationDirection, Shape, empty_shape};

/// The active falling piece
#[derive(Debug, Clone)]
pub struct Piece {
    /// Current (possibly rotated) shape matrix
    pub shape: Shape,
    /// Stage coordinate of the shape matrix's origin
    pub x: i32,
    pub y: i32,
    /// Set when the last downward attempt made contact; the engine merges
    /// the piece into the stage on the following update
    pub collided: bool,
}

impl Piece {
    /// The placeholder piece used before the first spawn
    pub fn sentinel() -> Self {
        Self {
            shape: empty_shape(),
            x: 0,
            y: 0,
            collided: false,
        }
    }

    /// Create a piece of the given kind at the spawn position
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            shape: kind.shape(),
            x: STAGE_WIDTH as i32 / 2 - 2,
            y: 0,
            collided: false,
        }
    }

    /// The kind of this piece, derived by scanning the shape for the first
    /// non-empty symbol. None for the sentinel.
    pub fn kind(&self) -> Option<PieceKind> {
        self.shape.iter().flatten().find_map(|cell| *cell)
    }

    /// Try to move one column left or right, returns true if successful
    pub fn move_horizontal(&mut self, stage: &Stage, dx: i32) -> bool {
        if stage.collides(&self.shape, (self.x, self.y), (dx, 0)) {
            return false;
        }
        self.x += dx;
        true
    }

    /// Try to move down one row, returns true if successful.
    /// Clears the collided flag on success; the caller decides what a
    /// blocked attempt means (lock or game over).
    pub fn move_down(&mut self, stage: &Stage) -> bool {
        if stage.collides(&self.shape, (self.x, self.y), (0, 1)) {
            return false;
        }
        self.y += 1;
        self.collided = false;
        true
    }

    /// Try to rotate, searching a widening, alternating-sign sequence of
    /// horizontal corrections for a free position.
    ///
    /// The whole attempt runs against a copy; on failure nothing is
    /// committed and false is returned. `y` is never changed.
    pub fn rotate(&mut self, direction: RotationDirection, stage: &Stage) -> bool {
        let mut trial = self.clone();
        trial.shape = rotated(&trial.shape, direction);

        let columns = trial.shape[0].len() as i32;
        let mut offset = 1;
        while stage.collides(&trial.shape, (trial.x, trial.y), (0, 0)) {
            trial.x += offset;
            offset = -(offset + offset.signum());
            if offset > columns {
                return false;
            }
        }

        self.shape = trial.shape;
        self.x = trial.x;
        true
    }

    /// The row this piece would come to rest on if dropped straight down.
    /// Display-only helper for the ghost marker.
    pub fn landing_y(&self, stage: &Stage) -> i32 {
        if self.kind().is_none() {
            return self.y;
        }
        let mut dy = 0;
        while !stage.collides(&self.shape, (self.x, self.y), (0, dy + 1)) {
            dy += 1;
        }
        self.y + dy
    }
}

/// Rotate a square shape matrix one quarter turn.
/// Clockwise is transpose-then-reverse-each-row; counter-clockwise is the
/// inverse (transpose, then reverse the row order).
fn rotated(shape: &Shape, direction: RotationDirection) -> Shape {
    let size = shape.len();
    let mut out: Shape = (0..size)
        .map(|i| shape.iter().map(|row| row[i]).collect())
        .collect();
    match direction {
        RotationDirection::Clockwise => {
            for row in &mut out {
                row.reverse();
            }
        }
        RotationDirection::CounterClockwise => out.reverse(),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Cell;

    #[test]
    fn test_spawn_position() {
        let piece = Piece::spawn(PieceKind::T);
        assert_eq!((piece.x, piece.y), (4, 0));
        assert!(!piece.collided);
    }

    #[test]
    fn test_kind_scans_whole_shape() {
        // T's first shape row is empty; the scan must keep going
        assert_eq!(Piece::spawn(PieceKind::T).kind(), Some(PieceKind::T));
        assert_eq!(Piece::sentinel().kind(), None);
    }

    #[test]
    fn test_move_horizontal_blocked_at_wall() {
        let stage = Stage::new();
        let mut piece = Piece::spawn(PieceKind::O);
        piece.x = 0;
        assert!(!piece.move_horizontal(&stage, -1));
        assert_eq!(piece.x, 0);
        assert!(piece.move_horizontal(&stage, 1));
        assert_eq!(piece.x, 1);
    }

    #[test]
    fn test_move_down_stops_at_floor() {
        let stage = Stage::new();
        let mut piece = Piece::spawn(PieceKind::O);
        let mut steps = 0;
        while piece.move_down(&stage) {
            steps += 1;
        }
        // O is 2 rows tall: from y=0 it can descend to y=18
        assert_eq!(steps, 18);
        assert_eq!(piece.y, 18);
    }

    #[test]
    fn test_four_rotations_restore_shape() {
        let stage = Stage::new();
        for kind in PieceKind::all() {
            let mut piece = Piece::spawn(kind);
            piece.y = 5;
            let original = piece.shape.clone();
            for _ in 0..4 {
                assert!(piece.rotate(RotationDirection::Clockwise, &stage));
            }
            assert_eq!(piece.shape, original, "{:?} must be 4-cyclic", kind);
        }
    }

    #[test]
    fn test_o_rotation_is_fixed_point() {
        let stage = Stage::new();
        let mut piece = Piece::spawn(PieceKind::O);
        let original = piece.shape.clone();
        assert!(piece.rotate(RotationDirection::Clockwise, &stage));
        assert_eq!(piece.shape, original);
    }

    #[test]
    fn test_counter_clockwise_inverts_clockwise() {
        let stage = Stage::new();
        let mut piece = Piece::spawn(PieceKind::J);
        piece.y = 5;
        let original = piece.shape.clone();
        assert!(piece.rotate(RotationDirection::Clockwise, &stage));
        assert_ne!(piece.shape, original);
        assert!(piece.rotate(RotationDirection::CounterClockwise, &stage));
        assert_eq!(piece.shape, original);
    }

    #[test]
    fn test_rotation_kicks_off_right_wall() {
        let stage = Stage::new();
        // Vertical I hugging the right wall: occupies column x+1
        let mut piece = Piece::spawn(PieceKind::I);
        piece.x = 9;
        piece.y = 5;
        assert!(piece.rotate(RotationDirection::Clockwise, &stage));
        // The horizontal bar spans 4 columns; the kick walked it to x=8
        assert_eq!(piece.x, 8);
        assert_eq!(piece.y, 5);
    }

    #[test]
    fn test_rotation_rolls_back_when_no_kick_fits() {
        let mut stage = Stage::new();
        let mut piece = Piece::spawn(PieceKind::I);
        piece.x = 0;
        piece.y = 5;
        // The rotated bar would land in row 6; lock every cell there
        // except the piece's own column
        for x in 0..STAGE_WIDTH as i32 {
            if x != 1 {
                stage.set(x, 6, Cell::locked(PieceKind::Z));
            }
        }
        let before = piece.clone();
        assert!(!piece.rotate(RotationDirection::Clockwise, &stage));
        assert_eq!(piece.shape, before.shape);
        assert_eq!((piece.x, piece.y), (before.x, before.y));
    }

    #[test]
    fn test_landing_y_on_empty_stage() {
        let stage = Stage::new();
        let piece = Piece::spawn(PieceKind::O);
        assert_eq!(piece.landing_y(&stage), 18);
        assert_eq!(piece.y, 0);
    }
}
