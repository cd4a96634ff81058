//! Attract-mode autoplay. The pilot only produces [`InputFrame`]s, so the
//! engine runs exactly as it would for a human player.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::field::Field;
use crate::game::{GameEngine, GameplayState};
use crate::input::InputFrame;
use crate::piece::{Piece, Point};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct PilotConfig {
    /// Pieces per second.
    pub pps: f32,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self { pps: 2.0 }
    }
}

#[derive(Clone, Debug)]
pub struct DemoPilot {
    config: PilotConfig,
    think_timer: f32,
    /// A direction was held last frame; release it so the next press is a
    /// fresh one-column tap.
    shifting: bool,
}

impl DemoPilot {
    pub fn new(config: PilotConfig) -> Self {
        Self {
            config,
            think_timer: 0.0,
            shifting: false,
        }
    }

    pub fn update(&mut self, engine: &GameEngine, dt_ms: f32) -> InputFrame {
        let mut frame = InputFrame::default();
        if engine.state() != GameplayState::TetrominoFalling {
            return frame;
        }
        self.think_timer += dt_ms;
        let piece_time = 1000.0 / self.config.pps.max(0.1);
        if self.think_timer < piece_time {
            return frame;
        }
        let Some(piece) = engine.current_piece() else {
            return frame;
        };
        if self.shifting {
            self.shifting = false;
            return frame;
        }

        let cursor = engine.cursor();
        match find_target_column(engine.field(), piece, cursor) {
            Some(x) if x < cursor.x => {
                frame.left = true;
                self.shifting = true;
            }
            Some(x) if x > cursor.x => {
                frame.right = true;
                self.shifting = true;
            }
            _ => {
                trace!(piece = %piece.kind(), x = cursor.x, "pilot drop");
                frame.hard_drop = true;
                self.think_timer = 0.0;
            }
        }
        frame
    }
}

/// Column the pilot steers `piece` to: the reachable one that lands deepest,
/// then the one over the lowest stack, then the leftmost.
pub fn find_target_column(field: &Field, piece: &Piece, cursor: Point) -> Option<i32> {
    let fits = |x: i32| field.is_tetromino_insertable_at(piece, Point::new(x, cursor.y));
    if !fits(cursor.x) {
        return None;
    }
    let mut left = cursor.x;
    while fits(left - 1) {
        left -= 1;
    }
    let mut right = cursor.x;
    while fits(right + 1) {
        right += 1;
    }

    let heights = field.surface_heights();
    (left..=right).min_by_key(|&x| {
        let landing = field.drop_position(piece, Point::new(x, cursor.y));
        let mut columns: Vec<usize> = piece
            .cells_at(landing)
            .iter()
            .map(|c| c.x as usize)
            .collect();
        columns.sort_unstable();
        columns.dedup();
        let stack: usize = columns.iter().map(|&c| heights[c]).sum();
        (Reverse(landing.y), stack, x)
    })
}
