//! Next-piece lookahead and the hold buffer
//!
//! Selection is a uniform, independent draw over the seven kinds on every
//! spawn; there is no bag.

use crate::piece::Piece;
use crate::tetromino::PieceKind;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The piece queue: one lookahead slot, one hold slot
#[derive(Debug, Clone)]
pub struct PieceQueue {
    next: PieceKind,
    held: Option<PieceKind>,
    can_hold: bool,
    rng: ChaCha8Rng,
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceQueue {
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    /// Create a queue with a fixed seed, for deterministic sequences
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: ChaCha8Rng) -> Self {
        let next = draw(&mut rng);
        Self {
            next,
            held: None,
            can_hold: true,
            rng,
        }
    }

    /// The kind waiting in the lookahead slot
    pub fn next_kind(&self) -> PieceKind {
        self.next
    }

    /// The kind set aside in the hold slot, if any
    pub fn held(&self) -> Option<PieceKind> {
        self.held
    }

    /// Whether a hold is still available for the current piece
    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    /// Clear the hold slot and redraw the lookahead, for a fresh game
    pub fn reset(&mut self) {
        self.held = None;
        self.can_hold = true;
        self.next = draw(&mut self.rng);
    }

    /// Take the lookahead piece as the new active piece, refill the
    /// lookahead, and re-enable holding.
    pub fn spawn(&mut self) -> Piece {
        let piece = Piece::spawn(self.next);
        self.next = draw(&mut self.rng);
        self.can_hold = true;
        piece
    }

    /// Stash the current piece's kind and hand back its replacement,
    /// respawned at the default position.
    ///
    /// Returns None (leaving everything untouched) when holding is spent
    /// or the piece is the sentinel. An empty hold slot takes the
    /// replacement from the lookahead; a full one swaps and leaves the
    /// lookahead alone.
    pub fn hold(&mut self, current: &Piece) -> Option<Piece> {
        if !self.can_hold {
            return None;
        }
        let kind = current.kind()?;

        let replacement = match self.held.take() {
            Some(held) => {
                self.held = Some(kind);
                Piece::spawn(held)
            }
            None => {
                self.held = Some(kind);
                let piece = Piece::spawn(self.next);
                self.next = draw(&mut self.rng);
                piece
            }
        };
        self.can_hold = false;
        Some(replacement)
    }
}

fn draw(rng: &mut ChaCha8Rng) -> PieceKind {
    let kinds = PieceKind::all();
    kinds[rng.gen_range(0..kinds.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seeded_queues_agree() {
        let mut a = PieceQueue::with_seed(7);
        let mut b = PieceQueue::with_seed(7);
        for _ in 0..20 {
            assert_eq!(a.spawn().kind(), b.spawn().kind());
        }
    }

    #[test]
    fn test_spawn_takes_the_lookahead() {
        let mut queue = PieceQueue::with_seed(1);
        let expected = queue.next_kind();
        let piece = queue.spawn();
        assert_eq!(piece.kind(), Some(expected));
        assert!(queue.can_hold());
    }

    #[test]
    fn test_draws_cover_all_kinds() {
        let mut queue = PieceQueue::with_seed(3);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(queue.spawn().kind().unwrap());
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn test_hold_into_empty_slot() {
        let mut queue = PieceQueue::with_seed(11);
        let active = queue.spawn();
        let lookahead = queue.next_kind();

        let replacement = queue.hold(&active).unwrap();
        assert_eq!(replacement.kind(), Some(lookahead));
        assert_eq!(queue.held(), active.kind());
        assert!(!queue.can_hold());

        // Hold is spent until the next spawn
        assert!(queue.hold(&replacement).is_none());
        queue.spawn();
        assert!(queue.can_hold());
    }

    #[test]
    fn test_hold_swaps_without_touching_lookahead() {
        let mut queue = PieceQueue::with_seed(11);
        let first = queue.spawn();
        queue.hold(&first).unwrap();

        let active = queue.spawn();
        let lookahead = queue.next_kind();
        let swapped = queue.hold(&active).unwrap();

        assert_eq!(swapped.kind(), first.kind());
        assert_eq!(queue.held(), active.kind());
        assert_eq!(queue.next_kind(), lookahead);
    }

    #[test]
    fn test_hold_respawns_at_default_position() {
        let mut queue = PieceQueue::with_seed(2);
        let mut active = queue.spawn();
        active.x = 0;
        active.y = 10;
        active.collided = true;

        let replacement = queue.hold(&active).unwrap();
        assert_eq!((replacement.x, replacement.y), (4, 0));
        assert!(!replacement.collided);
    }

    #[test]
    fn test_hold_ignores_sentinel() {
        let mut queue = PieceQueue::with_seed(5);
        assert!(queue.hold(&Piece::sentinel()).is_none());
        assert_eq!(queue.held(), None);
        assert!(queue.can_hold());
    }

    #[test]
    fn test_reset_clears_hold_state() {
        let mut queue = PieceQueue::with_seed(9);
        let active = queue.spawn();
        queue.hold(&active);
        queue.reset();
        assert_eq!(queue.held(), None);
        assert!(queue.can_hold());
    }
}
