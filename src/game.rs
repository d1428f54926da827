//! Game engine: state machine, drop timer, and command handling
//!
//! All mutation goes through [`Engine::handle`] and [`Engine::tick`]; the
//! caller processes commands one at a time, so the engine needs no locking.

use std::time::{Duration, Instant};

use crate::piece::Piece;
use crate::queue::PieceQueue;
use crate::score::Score;
use crate::stage::{Cell, CellStatus, Stage};
use crate::tetromino::{PieceKind, RotationDirection};

/// Overall game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    #[default]
    Idle,
    Running,
    GameOver,
}

/// Commands accepted from the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate(RotationDirection),
    Hold,
}

/// The recurring drop timer, owned by the engine.
///
/// Re-armed (old deadline discarded, new one scheduled) whenever the
/// interval changes; disarmed on game over.
#[derive(Debug, Clone)]
struct DropTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl DropTimer {
    fn idle() -> Self {
        Self {
            interval: Duration::from_secs(1),
            deadline: None,
        }
    }

    fn arm(&mut self, interval: Duration) {
        self.interval = interval;
        self.deadline = Some(Instant::now() + interval);
    }

    fn rearm_if_changed(&mut self, interval: Duration) {
        if self.deadline.is_some() && interval != self.interval {
            self.arm(interval);
        }
    }

    fn disarm(&mut self) {
        self.deadline = None;
    }

    /// True when the deadline has passed; schedules the next firing
    fn fired(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = Some(Instant::now() + self.interval);
                true
            }
            _ => false,
        }
    }
}

/// Read-only view of the engine handed to the rendering layer
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Stage grid with the active piece overlaid as transient cells
    pub cells: Vec<Vec<Cell>>,
    pub score: u32,
    pub drop_interval: Duration,
    pub state: GameState,
    pub next: PieceKind,
    pub held: Option<PieceKind>,
    pub can_hold: bool,
    /// Stage coordinates the active piece would occupy if dropped straight
    /// down; empty unless running
    pub ghost_cells: Vec<(i32, i32)>,
}

/// The game engine
pub struct Engine {
    stage: Stage,
    player: Piece,
    queue: PieceQueue,
    score: Score,
    state: GameState,
    timer: DropTimer,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_queue(PieceQueue::new())
    }

    /// Engine with a deterministic piece sequence
    pub fn with_seed(seed: u64) -> Self {
        Self::with_queue(PieceQueue::with_seed(seed))
    }

    fn with_queue(queue: PieceQueue) -> Self {
        Self {
            stage: Stage::new(),
            player: Piece::sentinel(),
            queue,
            score: Score::new(),
            state: GameState::Idle,
            timer: DropTimer::idle(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Process one command to completion. Never fails: commands that don't
    /// apply in the current state are absorbed as no-ops.
    pub fn handle(&mut self, command: Command) {
        match (self.state, command) {
            (_, Command::Start) => self.start(),
            (GameState::Running, Command::MoveLeft) => {
                self.player.move_horizontal(&self.stage, -1);
            }
            (GameState::Running, Command::MoveRight) => {
                self.player.move_horizontal(&self.stage, 1);
            }
            (GameState::Running, Command::SoftDrop) => self.drop(),
            (GameState::Running, Command::Rotate(direction)) => {
                // A rotation with no valid kick silently leaves the piece alone
                self.player.rotate(direction, &self.stage);
            }
            (GameState::Running, Command::Hold) => {
                if let Some(piece) = self.queue.hold(&self.player) {
                    self.player = piece;
                }
            }
            // Gameplay commands outside Running are no-ops
            _ => {}
        }
        self.settle_if_collided();
    }

    /// Advance time: issue the automatic drop when the timer fires
    pub fn tick(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        if self.timer.fired() {
            self.drop();
            self.settle_if_collided();
        }
    }

    /// Full reset into Running; also serves as restart from GameOver
    fn start(&mut self) {
        self.stage = Stage::new();
        self.score = Score::new();
        self.queue.reset();
        self.player = self.queue.spawn();
        self.state = GameState::Running;
        self.timer.arm(self.score.drop_interval());
        tracing::info!("game started");
    }

    /// One downward step. A blocked step either ends the game (piece never
    /// cleared the spawn area) or flags the piece for locking.
    fn drop(&mut self) {
        if self.player.move_down(&self.stage) {
            return;
        }
        if self.player.y < 1 {
            self.state = GameState::GameOver;
            self.timer.disarm();
            tracing::info!(score = self.score.points(), "game over");
            return;
        }
        self.player.collided = true;
    }

    /// Board-update pass: merge a collided piece into the stage, sweep,
    /// score, and spawn the replacement.
    fn settle_if_collided(&mut self) {
        if self.state != GameState::Running || !self.player.collided {
            return;
        }
        self.stage
            .merge(&self.player.shape, (self.player.x, self.player.y));
        let cleared = self.stage.sweep();
        if cleared > 0 {
            self.score.add_rows(cleared);
            self.timer.rearm_if_changed(self.score.drop_interval());
            tracing::debug!(
                rows = cleared,
                score = self.score.points(),
                interval_ms = self.score.drop_interval().as_millis() as u64,
                "rows cleared"
            );
        }
        self.player = self.queue.spawn();
    }

    /// Build the read-only view for rendering
    pub fn snapshot(&self) -> Snapshot {
        let mut cells: Vec<Vec<Cell>> = self.stage.rows().map(<[Cell]>::to_vec).collect();
        for (dy, row) in self.player.shape.iter().enumerate() {
            for (dx, cell) in row.iter().enumerate() {
                let Some(kind) = cell else { continue };
                let x = self.player.x + dx as i32;
                let y = self.player.y + dy as i32;
                if y >= 0 && (y as usize) < cells.len() && x >= 0 && (x as usize) < cells[0].len() {
                    cells[y as usize][x as usize] = Cell {
                        symbol: Some(*kind),
                        status: CellStatus::Transient,
                    };
                }
            }
        }

        let ghost_cells = if self.state == GameState::Running {
            let landing = self.player.landing_y(&self.stage);
            let px = self.player.x;
            self.player
                .shape
                .iter()
                .enumerate()
                .flat_map(|(dy, row)| {
                    row.iter().enumerate().filter_map(move |(dx, cell)| {
                        cell.map(|_| (px + dx as i32, landing + dy as i32))
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        Snapshot {
            cells,
            score: self.score.points(),
            drop_interval: self.score.drop_interval(),
            state: self.state,
            next: self.queue.next_kind(),
            held: self.queue.held(),
            can_hold: self.queue.can_hold(),
            ghost_cells,
        }
    }
}
