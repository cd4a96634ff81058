use serde::{Deserialize, Serialize};

/// Input flags sampled once per frame by the presentation layer.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct InputFrame {
    pub left: bool,
    pub right: bool,
    pub soft_drop: bool,
    pub hard_drop: bool,
    pub rotate_ccw: bool,
    pub rotate_cw: bool,
    pub hold: bool,
}

impl InputFrame {
    /// -1 for left, 1 for right, 0 for neither or both.
    pub fn direction(&self) -> i32 {
        match (self.left, self.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

/// Turns level-triggered flags into commands: edge detection for rotations,
/// hard drop, and hold, and delayed auto-shift for lateral movement.
#[derive(Clone, Debug, Default)]
pub struct Controller {
    inputs: InputFrame,
    last_hard_drop: bool,
    last_rotate_cw: bool,
    last_rotate_ccw: bool,
    last_hold: bool,
    last_dir: i32,
    das_timer: f32,
    arr_timer: f32,
    shifted_initial: bool,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_inputs(&mut self, incoming: InputFrame) {
        self.inputs = incoming;
    }

    pub fn inputs(&self) -> &InputFrame {
        &self.inputs
    }

    pub fn take_hard_drop(&mut self) -> bool {
        let fire = self.inputs.hard_drop && !self.last_hard_drop;
        self.last_hard_drop = self.inputs.hard_drop;
        fire
    }

    pub fn take_rotate_cw(&mut self) -> bool {
        let fire = self.inputs.rotate_cw && !self.last_rotate_cw;
        self.last_rotate_cw = self.inputs.rotate_cw;
        fire
    }

    pub fn take_rotate_ccw(&mut self) -> bool {
        let fire = self.inputs.rotate_ccw && !self.last_rotate_ccw;
        self.last_rotate_ccw = self.inputs.rotate_ccw;
        fire
    }

    pub fn take_hold(&mut self) -> bool {
        let fire = self.inputs.hold && !self.last_hold;
        self.last_hold = self.inputs.hold;
        fire
    }

    /// Number of lateral steps to attempt this frame and their direction.
    /// The first step fires on press; the DAS delay starts counting on the
    /// following frame, and once it expires a step fires every `arr` ms.
    pub fn take_shifts(&mut self, dt_ms: f32, das: u32, arr: u32) -> (i32, u32) {
        let dir = self.inputs.direction();
        if dir != self.last_dir {
            self.das_timer = 0.0;
            self.arr_timer = 0.0;
            self.shifted_initial = false;
            self.last_dir = dir;
        }
        if dir == 0 {
            return (0, 0);
        }
        if !self.shifted_initial {
            self.shifted_initial = true;
            return (dir, 1);
        }

        let das = das as f32;
        let before = self.das_timer;
        self.das_timer += dt_ms;
        if self.das_timer < das {
            return (dir, 0);
        }
        // Only the time past the DAS threshold feeds auto-repeat.
        self.arr_timer += if before < das {
            self.das_timer - das
        } else {
            dt_ms
        };
        let step = arr.max(1) as f32;
        let mut steps = 0;
        while self.arr_timer >= step {
            steps += 1;
            self.arr_timer -= step;
        }
        (dir, steps)
    }

    /// Marks the current buttons as seen so presses made while no piece is
    /// controllable do not fire later.
    pub fn discard_edges(&mut self) {
        self.last_hard_drop = self.inputs.hard_drop;
        self.last_rotate_cw = self.inputs.rotate_cw;
        self.last_rotate_ccw = self.inputs.rotate_ccw;
        self.last_hold = self.inputs.hold;
    }
}
