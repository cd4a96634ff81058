use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::factory::PieceFactory;
use crate::field::Field;
use crate::input::{Controller, InputFrame};
use crate::piece::{Piece, Point};
use crate::settings::{GameSettings, MAX_LEVEL};
use crate::view::FrameView;

/// Lines cleared by a single lock that count as a "tetris".
pub const TETRIS_LINES: usize = 4;
/// Level quota credit for a tetris, in place of four.
const TETRIS_QUOTA_CREDIT: i32 = 8;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum GameplayState {
    PlayerStart,
    DemoStart,
    InitializeTetromino,
    TetrominoFalling,
    LockDown,
    LinesClearing,
    GameOver,
    Paused,
}

/// Things that happened during one `update`, for audio and effects.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct FrameEvents {
    pub locked: bool,
    pub lines_cleared: u8,
    pub level_up: bool,
    pub held: bool,
    pub game_over: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationOutcome {
    Rotated,
    /// Rotated after shifting by the `index`-th candidate of the kick table.
    Kicked { index: usize, offset: Point },
    Blocked,
}

impl RotationOutcome {
    pub fn succeeded(self) -> bool {
        !matches!(self, RotationOutcome::Blocked)
    }
}

/// Rotate, then try kicks in table order, else undo the rotation.
pub fn rotate_with_kicks(
    field: &Field,
    piece: &mut Piece,
    cursor: &mut Point,
    clockwise: bool,
) -> RotationOutcome {
    if clockwise {
        piece.rotate_clockwise();
    } else {
        piece.rotate_counter_clockwise();
    }
    if field.is_tetromino_insertable_at(piece, *cursor) {
        return RotationOutcome::Rotated;
    }
    for (index, &offset) in piece.wall_kicks().iter().enumerate() {
        let candidate = *cursor + offset;
        if field.is_tetromino_insertable_at(piece, candidate) {
            *cursor = candidate;
            return RotationOutcome::Kicked { index, offset };
        }
    }
    if clockwise {
        piece.rotate_counter_clockwise();
    } else {
        piece.rotate_clockwise();
    }
    RotationOutcome::Blocked
}

pub struct GameEngine {
    settings: GameSettings,
    field: Field,
    factory: PieceFactory,
    current: Option<Piece>,
    hold: Option<Piece>,
    next_queue: VecDeque<Piece>,
    script: VecDeque<Piece>,
    used_hold: bool,
    cursor: Point,
    state: GameplayState,
    paused_from: Option<GameplayState>,
    level: u32,
    score: u32,
    lines_until_level_up: i32,
    total_lines: u32,
    fall_speed: f32,
    fall_timer: f32,
    lock_timer: f32,
    input_from_update: bool,
    controller: Controller,
    events: FrameEvents,
}

impl GameEngine {
    pub fn new(settings: GameSettings, seed: Option<u64>) -> Result<Self, EngineError> {
        settings.validate()?;
        let field = Field::new(settings.field_width, settings.field_height);
        let factory = PieceFactory::new(seed)?;
        let mut engine = Self {
            field,
            factory,
            current: None,
            hold: None,
            next_queue: VecDeque::with_capacity(settings.next_queue_len),
            script: VecDeque::new(),
            used_hold: false,
            cursor: settings.spawn,
            state: GameplayState::PlayerStart,
            paused_from: None,
            level: 0,
            score: 0,
            lines_until_level_up: settings.level_goal(0),
            total_lines: 0,
            fall_speed: settings.fall_speed(0),
            fall_timer: settings.fall_speed(0),
            lock_timer: settings.lock_delay_ms,
            input_from_update: false,
            controller: Controller::new(),
            events: FrameEvents::default(),
            settings,
        };
        engine.setup_game();
        Ok(engine)
    }

    /// Re-arms the session: empty field, fresh bag, score and level zero.
    pub fn setup_game(&mut self) {
        self.reset_session(VecDeque::new());
        self.state = GameplayState::PlayerStart;
        info!(
            width = self.field.width(),
            height = self.field.height(),
            "session ready"
        );
    }

    /// Like [`GameEngine::setup_game`], but the first pieces follow `names`
    /// before the bag takes over.
    pub fn setup_demo<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), EngineError> {
        let script = names
            .iter()
            .map(|name| self.factory.generate_tetromino(name.as_ref()))
            .collect::<Result<VecDeque<_>, _>>()?;
        let scripted = script.len();
        self.reset_session(script);
        self.state = GameplayState::DemoStart;
        info!(scripted, "demo session ready");
        Ok(())
    }

    fn reset_session(&mut self, script: VecDeque<Piece>) {
        self.score = 0;
        self.level = 0;
        self.total_lines = 0;
        self.lines_until_level_up = self.settings.level_goal(0);
        self.fall_speed = self.settings.fall_speed(0);
        self.fall_timer = self.fall_speed;
        self.lock_timer = self.settings.lock_delay_ms;

        self.factory.flush();
        self.field.reset_field();

        self.script = script;
        self.current = None;
        self.hold = None;
        self.used_hold = false;
        self.next_queue.clear();
        while self.next_queue.len() < self.settings.next_queue_len {
            let piece = self.next_generated();
            self.next_queue.push_back(piece);
        }

        self.cursor = self.settings.spawn;
        self.paused_from = None;
        self.input_from_update = false;
        self.controller = Controller::new();
        self.events = FrameEvents::default();
    }

    fn next_generated(&mut self) -> Piece {
        match self.script.pop_front() {
            Some(piece) => piece,
            None => self.factory.generate_random_tetromino(),
        }
    }

    /// Replaces the field contents, e.g. with a puzzle layout. The
    /// dimensions must match the configured field.
    pub fn load_field(&mut self, field: Field) -> Result<(), EngineError> {
        if field.width() != self.field.width() || field.height() != self.field.height() {
            return Err(EngineError::InvalidSettings(format!(
                "field is {}x{}, expected {}x{}",
                field.width(),
                field.height(),
                self.field.width(),
                self.field.height()
            )));
        }
        self.field = field;
        Ok(())
    }

    /// Advances the state machine by one step.
    pub fn update(&mut self, dt_ms: f32, input: InputFrame) -> FrameEvents {
        self.events = FrameEvents::default();
        self.controller.update_inputs(input);

        match self.state {
            GameplayState::PlayerStart | GameplayState::DemoStart => {
                self.controller.discard_edges();
                self.state = GameplayState::InitializeTetromino;
            }
            GameplayState::InitializeTetromino => {
                self.controller.discard_edges();
                self.initialize_new_tetromino();
            }
            GameplayState::TetrominoFalling => {
                self.apply_input(dt_ms);
                if self.state == GameplayState::TetrominoFalling {
                    self.handle_falling(dt_ms);
                }
            }
            GameplayState::LockDown => {
                self.apply_input(dt_ms);
                if self.state == GameplayState::LockDown {
                    self.handle_lock_down(dt_ms);
                }
            }
            GameplayState::LinesClearing => {
                self.controller.discard_edges();
                self.handle_lines_clearing();
            }
            GameplayState::GameOver | GameplayState::Paused => {
                self.controller.discard_edges();
            }
        }

        self.input_from_update = false;
        self.events
    }

    fn apply_input(&mut self, dt_ms: f32) {
        let hard_drop = self.controller.take_hard_drop();
        let hold = self.controller.take_hold();
        let rotate_cw = self.controller.take_rotate_cw();
        let rotate_ccw = self.controller.take_rotate_ccw();
        let (dir, steps) = self
            .controller
            .take_shifts(dt_ms, self.settings.das, self.settings.arr);

        if hard_drop {
            self.hard_drop();
            return;
        }
        if hold && self.hold_piece() {
            return;
        }
        if rotate_cw {
            self.rotate_clockwise();
        }
        if rotate_ccw {
            self.rotate_counter_clockwise();
        }
        for _ in 0..steps {
            if !self.move_piece(dir, 0) {
                break;
            }
        }
    }

    fn initialize_new_tetromino(&mut self) {
        let piece = match self.next_queue.pop_front() {
            Some(piece) => piece,
            None => self.next_generated(),
        };
        let refill = self.next_generated();
        self.next_queue.push_back(refill);

        self.cursor = self.settings.spawn;
        self.fall_timer = self.fall_speed;
        self.lock_timer = self.settings.lock_delay_ms;

        let fits = self.field.is_tetromino_insertable_at(&piece, self.cursor);
        debug!(piece = %piece.kind(), fits, "spawn");
        self.current = Some(piece);
        if !fits || self.field.is_game_over() {
            self.enter_game_over();
        } else {
            self.state = GameplayState::TetrominoFalling;
        }
    }

    fn handle_falling(&mut self, dt_ms: f32) {
        let factor = if self.controller.inputs().soft_drop {
            self.settings.soft_drop.factor()
        } else {
            1.0
        };
        self.fall_timer -= dt_ms * factor;
        if self.fall_timer > 0.0 {
            return;
        }
        self.fall_timer = self.fall_speed;
        if !self.try_fall() {
            self.state = GameplayState::LockDown;
        }
    }

    fn try_fall(&mut self) -> bool {
        let Some(piece) = self.current.as_ref() else {
            return false;
        };
        let below = self.cursor + Point::new(0, 1);
        if self.field.is_tetromino_insertable_at(piece, below) {
            self.cursor = below;
            true
        } else {
            false
        }
    }

    fn can_fall(&self) -> bool {
        self.current.as_ref().is_some_and(|piece| {
            self.field
                .is_tetromino_insertable_at(piece, self.cursor + Point::new(0, 1))
        })
    }

    fn handle_lock_down(&mut self, dt_ms: f32) {
        if self.input_from_update || self.can_fall() {
            self.lock_timer = self.settings.lock_delay_ms;
            self.fall_timer = self.fall_speed;
            self.state = GameplayState::TetrominoFalling;
            return;
        }
        self.lock_timer -= dt_ms;
        if self.lock_timer > 0.0 {
            return;
        }
        self.lock_timer = self.settings.lock_delay_ms;
        self.lock_current_piece();
    }

    fn lock_current_piece(&mut self) {
        let Some(piece) = self.current.take() else {
            self.state = GameplayState::InitializeTetromino;
            return;
        };
        if !self.field.insert_tetromino_at(&piece, self.cursor) {
            warn!(piece = %piece.kind(), x = self.cursor.x, y = self.cursor.y, "lock rejected");
            self.current = Some(piece);
            self.enter_game_over();
            return;
        }
        self.score = self.score.saturating_add(3 + (self.level + 1) * 3);
        self.events.locked = true;
        self.state = GameplayState::LinesClearing;
    }

    fn handle_lines_clearing(&mut self) {
        let cleared = self.field.clear_lines();
        self.events.lines_cleared = cleared as u8;
        if cleared > 0 {
            self.score = self
                .score
                .saturating_add(cleared as u32 * (self.level + 1) * 100);
            self.total_lines += cleared as u32;
            self.lines_until_level_up -= if cleared == TETRIS_LINES {
                TETRIS_QUOTA_CREDIT
            } else {
                cleared as i32
            };
            debug!(cleared, level = self.level, "lines cleared");
        }
        if self.lines_until_level_up <= 0 {
            self.level_up();
        }
        self.used_hold = false;
        self.state = GameplayState::InitializeTetromino;
    }

    fn level_up(&mut self) {
        if self.level < MAX_LEVEL {
            self.level += 1;
            self.events.level_up = true;
            debug!(level = self.level, "level up");
        }
        self.fall_speed = self.settings.fall_speed(self.level);
        self.lines_until_level_up = self.settings.level_goal(self.level);
    }

    fn enter_game_over(&mut self) {
        self.state = GameplayState::GameOver;
        self.events.game_over = true;
        info!(score = self.score, level = self.level, lines = self.total_lines, "game over");
    }

    fn accepts_commands(&self) -> bool {
        matches!(
            self.state,
            GameplayState::TetrominoFalling | GameplayState::LockDown
        )
    }

    /// Shifts the active piece if the target is legal.
    pub fn move_piece(&mut self, dx: i32, dy: i32) -> bool {
        if !self.accepts_commands() {
            return false;
        }
        let Some(piece) = self.current.as_ref() else {
            return false;
        };
        let target = self.cursor + Point::new(dx, dy);
        if !self.field.is_tetromino_insertable_at(piece, target) {
            return false;
        }
        self.cursor = target;
        self.input_from_update = true;
        true
    }

    pub fn rotate_clockwise(&mut self) -> RotationOutcome {
        self.rotate(true)
    }

    pub fn rotate_counter_clockwise(&mut self) -> RotationOutcome {
        self.rotate(false)
    }

    fn rotate(&mut self, clockwise: bool) -> RotationOutcome {
        if !self.accepts_commands() {
            return RotationOutcome::Blocked;
        }
        let Some(piece) = self.current.as_mut() else {
            return RotationOutcome::Blocked;
        };
        let outcome = rotate_with_kicks(&self.field, piece, &mut self.cursor, clockwise);
        if outcome.succeeded() {
            self.input_from_update = true;
        }
        outcome
    }

    /// Swaps the active piece into hold, at most once per locked piece.
    pub fn hold_piece(&mut self) -> bool {
        if !self.accepts_commands() || self.used_hold {
            return false;
        }
        let Some(mut active) = self.current.take() else {
            return false;
        };
        match self.hold.take() {
            Some(held) => {
                if !self.field.is_tetromino_insertable_at(&held, self.settings.spawn) {
                    self.hold = Some(held);
                    self.current = Some(active);
                    return false;
                }
                active.reset_rotation();
                self.hold = Some(active);
                self.current = Some(held);
                self.cursor = self.settings.spawn;
                self.fall_timer = self.fall_speed;
                self.lock_timer = self.settings.lock_delay_ms;
                self.state = GameplayState::TetrominoFalling;
            }
            None => {
                active.reset_rotation();
                self.hold = Some(active);
                self.state = GameplayState::InitializeTetromino;
            }
        }
        self.used_hold = true;
        self.events.held = true;
        true
    }

    /// Drops and locks the active piece at once. Returns the rows dropped.
    pub fn hard_drop(&mut self) -> Option<u32> {
        if !self.accepts_commands() {
            return None;
        }
        let piece = self.current.take()?;
        let landing = self.field.drop_position(&piece, self.cursor);
        if !self.field.insert_tetromino_at(&piece, landing) {
            warn!(piece = %piece.kind(), "hard drop rejected");
            self.current = Some(piece);
            return None;
        }
        let dropped = (landing.y - self.cursor.y).max(0) as u32;
        self.cursor = landing;
        self.score = self.score.saturating_add(dropped);
        self.events.locked = true;
        self.state = GameplayState::LinesClearing;
        Some(dropped)
    }

    pub fn pause(&mut self) -> bool {
        if matches!(self.state, GameplayState::Paused | GameplayState::GameOver) {
            return false;
        }
        self.paused_from = Some(self.state);
        self.state = GameplayState::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != GameplayState::Paused {
            return false;
        }
        self.state = self
            .paused_from
            .take()
            .unwrap_or(GameplayState::InitializeTetromino);
        true
    }

    /// Cursor of the hard-drop landing spot.
    pub fn ghost_position(&self) -> Option<Point> {
        let piece = self.current.as_ref()?;
        Some(self.field.drop_position(piece, self.cursor))
    }

    pub fn active_cells(&self) -> Option<[Point; 4]> {
        self.current.as_ref().map(|p| p.cells_at(self.cursor))
    }

    pub fn snapshot(&self) -> FrameView {
        FrameView::capture(self)
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn state(&self) -> GameplayState {
        self.state
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn current_piece(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn held_piece(&self) -> Option<&Piece> {
        self.hold.as_ref()
    }

    pub fn next_queue(&self) -> impl Iterator<Item = &Piece> {
        self.next_queue.iter()
    }

    pub fn used_hold(&self) -> bool {
        self.used_hold
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines_until_level_up(&self) -> i32 {
        self.lines_until_level_up
    }

    pub fn total_lines(&self) -> u32 {
        self.total_lines
    }

    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameplayState::GameOver
    }

    /// Events raised by the most recent `update`.
    pub fn last_events(&self) -> FrameEvents {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{PieceType, Rotation};

    const IDLE: InputFrame = InputFrame {
        left: false,
        right: false,
        soft_drop: false,
        hard_drop: false,
        rotate_ccw: false,
        rotate_cw: false,
        hold: false,
    };

    fn demo_engine(names: &[&str]) -> GameEngine {
        let mut engine = GameEngine::new(GameSettings::default(), Some(1)).unwrap();
        engine.setup_demo(names).unwrap();
        engine
    }

    /// Runs frames until the active piece is falling.
    fn spawn(engine: &mut GameEngine) {
        for _ in 0..4 {
            if engine.state() == GameplayState::TetrominoFalling {
                return;
            }
            engine.update(0.0, IDLE);
        }
        assert_eq!(engine.state(), GameplayState::TetrominoFalling);
    }

    fn blocked_t_field(block_top: bool) -> Field {
        let top = if block_top { "...O......" } else { ".........." };
        Field::from_rows(&[
            top,
            "..........",
            "..........",
            "...OO.....",
            "..........",
            "..........",
        ])
        .unwrap()
    }

    #[test]
    fn kicks_exhausted_in_order_then_rotation_reverts() {
        let field = blocked_t_field(true);
        let mut piece = Piece::new(PieceType::T);
        let mut cursor = Point::new(4, 2);
        assert!(field.is_tetromino_insertable_at(&piece, cursor));

        let outcome = rotate_with_kicks(&field, &mut piece, &mut cursor, true);
        assert_eq!(outcome, RotationOutcome::Blocked);
        assert_eq!(piece.rotation(), Rotation::Spawn);
        assert_eq!(cursor, Point::new(4, 2));
    }

    #[test]
    fn first_legal_kick_in_table_order_wins() {
        let field = blocked_t_field(false);
        let mut piece = Piece::new(PieceType::T);
        let mut cursor = Point::new(4, 2);

        let outcome = rotate_with_kicks(&field, &mut piece, &mut cursor, true);
        assert_eq!(
            outcome,
            RotationOutcome::Kicked {
                index: 1,
                offset: Point::new(-1, -1)
            }
        );
        assert_eq!(piece.rotation(), Rotation::Right);
        assert_eq!(cursor, Point::new(3, 1));
    }

    #[test]
    fn unobstructed_rotation_needs_no_kick() {
        let field = Field::new(10, 20);
        let mut piece = Piece::new(PieceType::L);
        let mut cursor = Point::new(5, 5);
        assert_eq!(
            rotate_with_kicks(&field, &mut piece, &mut cursor, false),
            RotationOutcome::Rotated
        );
        assert_eq!(piece.rotation(), Rotation::Left);
        assert_eq!(cursor, Point::new(5, 5));
    }

    #[test]
    fn start_states_lead_to_falling_piece() {
        let mut engine = demo_engine(&["t"]);
        assert_eq!(engine.state(), GameplayState::DemoStart);
        engine.update(16.0, IDLE);
        assert_eq!(engine.state(), GameplayState::InitializeTetromino);
        engine.update(16.0, IDLE);
        assert_eq!(engine.state(), GameplayState::TetrominoFalling);
        assert_eq!(engine.current_piece().map(Piece::kind), Some(PieceType::T));
        assert_eq!(engine.cursor(), engine.settings().spawn);
        assert_eq!(engine.next_queue().count(), engine.settings().next_queue_len);
    }

    #[test]
    fn setup_demo_rejects_unknown_names() {
        let mut engine = GameEngine::new(GameSettings::default(), Some(1)).unwrap();
        assert_eq!(
            engine.setup_demo(&["t", "w"]),
            Err(EngineError::UnknownPieceType("w".to_string()))
        );
    }

    #[test]
    fn gravity_moves_one_cell_per_expired_timer() {
        let mut engine = demo_engine(&["o"]);
        spawn(&mut engine);
        let start = engine.cursor();
        let speed = engine.fall_speed();
        engine.update(speed / 2.0, IDLE);
        assert_eq!(engine.cursor(), start);
        engine.update(speed / 2.0, IDLE);
        assert_eq!(engine.cursor(), start + Point::new(0, 1));
    }

    #[test]
    fn soft_drop_speeds_up_gravity() {
        let mut engine = demo_engine(&["o"]);
        spawn(&mut engine);
        let start = engine.cursor();
        let speed = engine.fall_speed();
        let soft = InputFrame {
            soft_drop: true,
            ..IDLE
        };
        engine.update(speed / 2.0, soft);
        assert_eq!(engine.cursor(), start + Point::new(0, 1));
    }

    #[test]
    fn lock_down_locks_after_delay_and_scores() {
        let mut engine = demo_engine(&["o", "t"]);
        spawn(&mut engine);
        let speed = engine.fall_speed();
        while engine.state() == GameplayState::TetrominoFalling {
            engine.update(speed, IDLE);
        }
        assert_eq!(engine.state(), GameplayState::LockDown);

        let delay = engine.settings().lock_delay_ms;
        engine.update(delay / 2.0, IDLE);
        assert_eq!(engine.state(), GameplayState::LockDown);
        let events = engine.update(delay / 2.0, IDLE);
        assert!(events.locked);
        assert_eq!(engine.state(), GameplayState::LinesClearing);
        assert_eq!(engine.score(), 3 + 3);

        let events = engine.update(16.0, IDLE);
        assert_eq!(events.lines_cleared, 0);
        assert_eq!(engine.state(), GameplayState::InitializeTetromino);
        assert_eq!(engine.field().surface_heights()[5], 2);
    }

    #[test]
    fn lateral_move_during_lock_down_reverts_to_falling() {
        let mut engine = demo_engine(&["o"]);
        spawn(&mut engine);
        let speed = engine.fall_speed();
        while engine.state() == GameplayState::TetrominoFalling {
            engine.update(speed, IDLE);
        }
        assert_eq!(engine.state(), GameplayState::LockDown);
        assert!(engine.move_piece(-1, 0));
        engine.update(1.0, IDLE);
        assert_eq!(engine.state(), GameplayState::TetrominoFalling);
    }

    #[test]
    fn hold_stashes_then_swaps_once_per_piece() {
        let mut engine = demo_engine(&["t", "s", "z"]);
        spawn(&mut engine);
        assert!(engine.hold_piece());
        assert_eq!(engine.held_piece().map(Piece::kind), Some(PieceType::T));
        assert_eq!(engine.state(), GameplayState::InitializeTetromino);

        spawn(&mut engine);
        assert_eq!(engine.current_piece().map(Piece::kind), Some(PieceType::S));
        assert!(engine.used_hold());
        assert!(!engine.hold_piece());

        engine.hard_drop();
        engine.update(16.0, IDLE);
        assert!(!engine.used_hold());
        spawn(&mut engine);
        assert_eq!(engine.current_piece().map(Piece::kind), Some(PieceType::Z));
        engine.move_piece(2, 0);
        assert!(engine.hold_piece());
        assert_eq!(engine.current_piece().map(Piece::kind), Some(PieceType::T));
        assert_eq!(engine.held_piece().map(Piece::kind), Some(PieceType::Z));
        assert_eq!(engine.cursor(), engine.settings().spawn);
        assert_eq!(engine.state(), GameplayState::TetrominoFalling);
    }

    #[test]
    fn swap_is_rejected_when_held_piece_is_blocked_at_spawn() {
        let mut engine = demo_engine(&["t", "s", "z"]);
        spawn(&mut engine);
        assert!(engine.hold_piece());
        spawn(&mut engine);
        engine.hard_drop();
        engine.update(16.0, IDLE);
        spawn(&mut engine);
        assert_eq!(engine.current_piece().map(Piece::kind), Some(PieceType::Z));

        // Blocks the left arm of a spawned T but not the Z.
        let mut rows = vec![".........."; 20];
        rows[1] = "....L.....";
        engine.load_field(Field::from_rows(&rows).unwrap()).unwrap();
        let cursor = engine.cursor();

        assert!(!engine.hold_piece());
        assert_eq!(engine.current_piece().map(Piece::kind), Some(PieceType::Z));
        assert_eq!(engine.held_piece().map(Piece::kind), Some(PieceType::T));
        assert_eq!(engine.cursor(), cursor);
        assert!(!engine.used_hold());
        assert_eq!(engine.state(), GameplayState::TetrominoFalling);
    }

    #[test]
    fn held_piece_is_stored_at_spawn_orientation() {
        let mut engine = demo_engine(&["j"]);
        spawn(&mut engine);
        assert!(engine.rotate_clockwise().succeeded());
        assert!(engine.hold_piece());
        assert_eq!(
            engine.held_piece().map(Piece::rotation),
            Some(Rotation::Spawn)
        );
    }

    #[test]
    fn hard_drop_scores_rows_and_skips_lock_delay() {
        let mut engine = demo_engine(&["i"]);
        spawn(&mut engine);
        let ghost = engine.ghost_position().unwrap();
        assert_eq!(ghost, Point::new(5, 19));
        assert_eq!(engine.hard_drop(), Some(18));
        assert_eq!(engine.score(), 18);
        assert_eq!(engine.state(), GameplayState::LinesClearing);
        assert!(engine.current_piece().is_none());
    }

    #[test]
    fn hard_drop_input_is_edge_triggered() {
        let mut engine = demo_engine(&["o", "o"]);
        spawn(&mut engine);
        let drop = InputFrame {
            hard_drop: true,
            ..IDLE
        };
        let events = engine.update(16.0, drop);
        assert!(events.locked);
        while engine.state() != GameplayState::TetrominoFalling {
            engine.update(16.0, drop);
        }
        let events = engine.update(16.0, drop);
        assert!(!events.locked);
        assert_eq!(engine.state(), GameplayState::TetrominoFalling);
    }

    #[test]
    fn pause_freezes_and_resume_restores() {
        let mut engine = demo_engine(&["o"]);
        spawn(&mut engine);
        let cursor = engine.cursor();
        assert!(engine.pause());
        assert!(!engine.pause());
        engine.update(10_000.0, IDLE);
        assert_eq!(engine.cursor(), cursor);
        assert!(!engine.move_piece(1, 0));
        assert!(engine.resume());
        assert_eq!(engine.state(), GameplayState::TetrominoFalling);
    }

    #[test]
    fn blocked_spawn_ends_the_game() {
        let mut engine = demo_engine(&["o"]);
        let mut rows = vec![".........."; 20];
        rows[1] = "....SS....";
        engine.load_field(Field::from_rows(&rows).unwrap()).unwrap();
        engine.update(16.0, IDLE);
        let events = engine.update(16.0, IDLE);
        assert!(events.game_over);
        assert!(engine.is_game_over());
        engine.update(10_000.0, IDLE);
        assert_eq!(engine.state(), GameplayState::GameOver);
    }

    #[test]
    fn load_field_rejects_other_dimensions() {
        let mut engine = GameEngine::new(GameSettings::default(), None).unwrap();
        assert!(engine.load_field(Field::new(8, 20)).is_err());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = GameSettings {
            next_queue_len: 0,
            ..GameSettings::default()
        };
        assert!(matches!(
            GameEngine::new(settings, None),
            Err(EngineError::InvalidSettings(_))
        ));
    }
}
