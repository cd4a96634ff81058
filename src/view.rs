use serde::Serialize;

use crate::game::{FrameEvents, GameEngine, GameplayState};
use crate::piece::{Piece, PieceType, Point};

/// Everything a renderer needs for one frame.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct FrameView {
    pub width: usize,
    pub height: usize,
    /// Row-major, top row first, `-1` for empty.
    pub field: Vec<i8>,
    pub active: Vec<Point>,
    pub active_piece: Option<PieceType>,
    /// 0 spawn, 1 right, 2 reverse, 3 left.
    pub active_rotation: Option<usize>,
    pub cursor: Point,
    pub ghost: Vec<Point>,
    pub ghost_cursor: Option<Point>,
    pub hold: Option<PieceType>,
    pub hold_blocks: Option<Vec<Point>>,
    pub can_hold: bool,
    pub next: Vec<PieceType>,
    pub next_blocks: Vec<Vec<Point>>,
    pub state: GameplayState,
    pub topped_out: bool,
    pub stats: StatsView,
    pub events: FrameEvents,
}

#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub struct StatsView {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub lines_until_level_up: i32,
    pub fall_speed_ms: f32,
}

impl FrameView {
    pub fn capture(engine: &GameEngine) -> Self {
        let field = engine.field();
        let active = engine
            .active_cells()
            .map(|cells| cells.to_vec())
            .unwrap_or_default();
        let ghost_cursor = engine
            .ghost_position()
            .filter(|_| engine.settings().ghost_enabled);
        let ghost = match (ghost_cursor, engine.current_piece()) {
            (Some(pos), Some(piece)) => piece.cells_at(pos).to_vec(),
            _ => Vec::new(),
        };
        let held = engine.held_piece();

        FrameView {
            width: field.width(),
            height: field.height(),
            field: field.cell_values(),
            active,
            active_piece: engine.current_piece().map(Piece::kind),
            active_rotation: engine.current_piece().map(|p| p.rotation().index()),
            cursor: engine.cursor(),
            ghost,
            ghost_cursor,
            hold: held.map(Piece::kind),
            hold_blocks: held.map(|p| preview_blocks(p.kind())),
            can_hold: !engine.used_hold(),
            next: engine.next_queue().map(Piece::kind).collect(),
            next_blocks: engine.next_queue().map(|p| preview_blocks(p.kind())).collect(),
            state: engine.state(),
            topped_out: engine.is_game_over(),
            stats: StatsView {
                score: engine.score(),
                level: engine.level(),
                lines: engine.total_lines(),
                lines_until_level_up: engine.lines_until_level_up(),
                fall_speed_ms: engine.fall_speed(),
            },
            events: engine.last_events(),
        }
    }
}

/// Spawn-orientation cells relative to the pivot, for queue and hold boxes.
pub fn preview_blocks(kind: PieceType) -> Vec<Point> {
    kind.rotation_table()[0].to_vec()
}
