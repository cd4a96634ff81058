use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::piece::Point;

pub const DEFAULT_FIELD_WIDTH: usize = 10;
pub const DEFAULT_FIELD_HEIGHT: usize = 20;
pub const LOCK_DELAY_MS: f32 = 500.0;
pub const MAX_LEVEL: u32 = 14;
pub const LEVEL_COUNT: usize = MAX_LEVEL as usize + 1;

/// Milliseconds per cell of gravity, indexed by level.
pub const FALL_SPEEDS_MS: [f32; LEVEL_COUNT] = [
    1200.0, 1100.0, 1000.0, 900.0, 800.0, 700.0, 600.0, 500.0, 400.0, 300.0, 200.0, 100.0, 50.0,
    25.0, 10.0,
];

/// Lines needed to leave each level.
pub const LEVEL_GOALS: [u32; LEVEL_COUNT] =
    [5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75];

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct GameSettings {
    pub field_width: usize,
    pub field_height: usize,
    pub spawn: Point,
    pub lock_delay_ms: f32,
    /// Delay before a held direction starts repeating.
    pub das: u32,
    /// Repeat interval once auto-shift kicks in.
    pub arr: u32,
    pub soft_drop: SoftDropSpeed,
    pub ghost_enabled: bool,
    pub next_queue_len: usize,
    pub fall_speeds: Vec<f32>,
    pub level_goals: Vec<u32>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            field_width: DEFAULT_FIELD_WIDTH,
            field_height: DEFAULT_FIELD_HEIGHT,
            spawn: Point::new(5, 1),
            lock_delay_ms: LOCK_DELAY_MS,
            das: 133,
            arr: 10,
            soft_drop: SoftDropSpeed::Medium,
            ghost_enabled: true,
            next_queue_len: 5,
            fall_speeds: FALL_SPEEDS_MS.to_vec(),
            level_goals: LEVEL_GOALS.to_vec(),
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidSettings(msg));

        if self.field_width < 4 || self.field_height < 4 {
            return invalid(format!(
                "field must be at least 4x4, got {}x{}",
                self.field_width, self.field_height
            ));
        }
        let spawn_ok = self.spawn.x >= 0
            && self.spawn.y >= 0
            && (self.spawn.x as usize) < self.field_width
            && (self.spawn.y as usize) < self.field_height;
        if !spawn_ok {
            return invalid(format!(
                "spawn ({}, {}) is outside the field",
                self.spawn.x, self.spawn.y
            ));
        }
        if !(self.lock_delay_ms > 0.0) {
            return invalid("lock delay must be positive".to_string());
        }
        if self.next_queue_len == 0 {
            return invalid("next queue must hold at least one piece".to_string());
        }
        if self.fall_speeds.len() != LEVEL_COUNT {
            return invalid(format!(
                "expected {LEVEL_COUNT} fall speeds, got {}",
                self.fall_speeds.len()
            ));
        }
        if self.fall_speeds.iter().any(|&s| !(s > 0.0)) {
            return invalid("fall speeds must be positive".to_string());
        }
        if self.fall_speeds.windows(2).any(|w| w[1] >= w[0]) {
            return invalid("fall speeds must strictly decrease with level".to_string());
        }
        if self.level_goals.len() != LEVEL_COUNT {
            return invalid(format!(
                "expected {LEVEL_COUNT} level goals, got {}",
                self.level_goals.len()
            ));
        }
        if self.level_goals.contains(&0) {
            return invalid("level goals must be positive".to_string());
        }
        Ok(())
    }

    pub fn fall_speed(&self, level: u32) -> f32 {
        let idx = (level as usize).min(self.fall_speeds.len().saturating_sub(1));
        self.fall_speeds.get(idx).copied().unwrap_or(FALL_SPEEDS_MS[0])
    }

    pub fn level_goal(&self, level: u32) -> i32 {
        let idx = (level as usize).min(self.level_goals.len().saturating_sub(1));
        self.level_goals.get(idx).copied().unwrap_or(LEVEL_GOALS[0]) as i32
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub enum SoftDropSpeed {
    Slow,
    Medium,
    Fast,
    Ultra,
    Instant,
}

impl SoftDropSpeed {
    /// Gravity multiplier while soft drop is held.
    pub fn factor(self) -> f32 {
        match self {
            SoftDropSpeed::Slow => 1.2,
            SoftDropSpeed::Medium => 2.0,
            SoftDropSpeed::Fast => 5.0,
            SoftDropSpeed::Ultra => 20.0,
            SoftDropSpeed::Instant => 999.0,
        }
    }
}
