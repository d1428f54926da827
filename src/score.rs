//! Score and drop-speed progression
//!
//! Scoring is strictly linear in cleared rows; the drop interval decays
//! with cumulative score toward a fixed floor.

use std::time::Duration;

/// Points awarded per cleared row
pub const POINTS_PER_ROW: u32 = 10;
/// Starting drop interval in milliseconds
pub const INITIAL_DROP_TIME: f64 = 1000.0;
/// Floor the drop interval never goes below, in milliseconds
pub const MINIMUM_DROP_TIME: f64 = 100.0;
/// Drop-time multiplier applied per point scored
const SPEED_INCREASE_FACTOR: f64 = 0.995;

/// Score and the drop interval derived from it.
/// Written only on the sweep-completion path.
#[derive(Debug, Clone)]
pub struct Score {
    points: u32,
    drop_interval: Duration,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            drop_interval: drop_interval_for(0),
        }
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    /// Milliseconds between automatic downward steps
    pub fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    /// Award points for cleared rows and recompute the drop interval
    pub fn add_rows(&mut self, rows: usize) {
        if rows == 0 {
            return;
        }
        self.points += rows as u32 * POINTS_PER_ROW;
        self.drop_interval = drop_interval_for(self.points);
    }
}

/// Drop interval for a given score: `max(1000 × 0.995^score, 100)` ms
pub fn drop_interval_for(points: u32) -> Duration {
    let ms = (INITIAL_DROP_TIME * SPEED_INCREASE_FACTOR.powi(points as i32))
        .max(MINIMUM_DROP_TIME);
    Duration::from_secs_f64(ms / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_is_linear() {
        let mut score = Score::new();
        score.add_rows(1);
        assert_eq!(score.points(), 10);
        score.add_rows(3);
        assert_eq!(score.points(), 40);
        score.add_rows(4);
        assert_eq!(score.points(), 80);
    }

    #[test]
    fn test_zero_rows_changes_nothing() {
        let mut score = Score::new();
        score.add_rows(0);
        assert_eq!(score.points(), 0);
        assert_eq!(score.drop_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_initial_interval() {
        assert_eq!(Score::new().drop_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_interval_at_score_140() {
        // 1000 × 0.995^140 ≈ 496 ms, well above the floor
        let interval = drop_interval_for(140);
        assert!(interval > Duration::from_millis(490));
        assert!(interval < Duration::from_millis(500));
    }

    #[test]
    fn test_interval_clamps_at_floor() {
        assert_eq!(drop_interval_for(10_000), Duration::from_millis(100));
    }

    #[test]
    fn test_interval_never_increases() {
        let mut previous = drop_interval_for(0);
        for points in (10..600).step_by(10) {
            let interval = drop_interval_for(points);
            assert!(interval <= previous);
            assert!(interval >= Duration::from_millis(100));
            previous = interval;
        }
    }
}
