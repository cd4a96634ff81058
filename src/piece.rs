use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    O,
    I,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceType {
    pub const COUNT: usize = 7;

    pub fn all() -> [PieceType; 7] {
        [
            PieceType::O,
            PieceType::I,
            PieceType::T,
            PieceType::L,
            PieceType::J,
            PieceType::S,
            PieceType::Z,
        ]
    }

    /// Stable index, also used as the field occupancy marker.
    pub fn index(self) -> usize {
        match self {
            PieceType::O => 0,
            PieceType::I => 1,
            PieceType::T => 2,
            PieceType::L => 3,
            PieceType::J => 4,
            PieceType::S => 5,
            PieceType::Z => 6,
        }
    }

    pub fn from_index(index: usize) -> Result<PieceType, EngineError> {
        Self::all()
            .get(index)
            .copied()
            .ok_or(EngineError::UnknownPieceIndex(index))
    }

    pub fn letter(self) -> char {
        match self {
            PieceType::O => 'O',
            PieceType::I => 'I',
            PieceType::T => 'T',
            PieceType::L => 'L',
            PieceType::J => 'J',
            PieceType::S => 'S',
            PieceType::Z => 'Z',
        }
    }

    pub fn kick_family(self) -> KickFamily {
        match self {
            PieceType::O => KickFamily::None,
            PieceType::I => KickFamily::I,
            _ => KickFamily::Jlstz,
        }
    }

    pub fn rotation_table(self) -> &'static RotationTable {
        &ROTATION_TABLES[self.index()]
    }
}

impl FromStr for PieceType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "o" | "O" => Ok(PieceType::O),
            "i" | "I" => Ok(PieceType::I),
            "t" | "T" => Ok(PieceType::T),
            "l" | "L" => Ok(PieceType::L),
            "j" | "J" => Ok(PieceType::J),
            "s" | "S" => Ok(PieceType::S),
            "z" | "Z" => Ok(PieceType::Z),
            _ => Err(EngineError::UnknownPieceType(s.to_string())),
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
    Spawn = 0,
    Right = 1,
    Reverse = 2,
    Left = 3,
}

impl Rotation {
    pub fn index(self) -> usize {
        self as usize
    }

    fn rotate_cw(self) -> Rotation {
        match self {
            Rotation::Spawn => Rotation::Right,
            Rotation::Right => Rotation::Reverse,
            Rotation::Reverse => Rotation::Left,
            Rotation::Left => Rotation::Spawn,
        }
    }

    fn rotate_ccw(self) -> Rotation {
        match self {
            Rotation::Spawn => Rotation::Left,
            Rotation::Left => Rotation::Reverse,
            Rotation::Reverse => Rotation::Right,
            Rotation::Right => Rotation::Spawn,
        }
    }
}

/// SRS rotation transition, one per direction of each orientation edge.
/// Discriminants index the kick tables.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum RotationTransition {
    SpawnToRight = 0,
    RightToSpawn = 1,
    RightToReverse = 2,
    ReverseToRight = 3,
    ReverseToLeft = 4,
    LeftToReverse = 5,
    LeftToSpawn = 6,
    SpawnToLeft = 7,
}

impl RotationTransition {
    pub fn between(from: Rotation, to: Rotation) -> Option<RotationTransition> {
        match (from, to) {
            (Rotation::Spawn, Rotation::Right) => Some(RotationTransition::SpawnToRight),
            (Rotation::Right, Rotation::Spawn) => Some(RotationTransition::RightToSpawn),
            (Rotation::Right, Rotation::Reverse) => Some(RotationTransition::RightToReverse),
            (Rotation::Reverse, Rotation::Right) => Some(RotationTransition::ReverseToRight),
            (Rotation::Reverse, Rotation::Left) => Some(RotationTransition::ReverseToLeft),
            (Rotation::Left, Rotation::Reverse) => Some(RotationTransition::LeftToReverse),
            (Rotation::Left, Rotation::Spawn) => Some(RotationTransition::LeftToSpawn),
            (Rotation::Spawn, Rotation::Left) => Some(RotationTransition::SpawnToLeft),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Conventional SRS label, e.g. `0R` or `L2`.
    pub fn label(self) -> &'static str {
        match self {
            RotationTransition::SpawnToRight => "0R",
            RotationTransition::RightToSpawn => "R0",
            RotationTransition::RightToReverse => "R2",
            RotationTransition::ReverseToRight => "2R",
            RotationTransition::ReverseToLeft => "2L",
            RotationTransition::LeftToReverse => "L2",
            RotationTransition::LeftToSpawn => "L0",
            RotationTransition::SpawnToLeft => "0L",
        }
    }
}

pub type RotationTable = [[Point; 4]; 4];
pub type KickTable = [[Point; 4]; 8];

const fn p(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

// Offsets are relative to the pivot mino, which is always listed first.
// y grows downward, so (0,-1) sits on top of the pivot.
//
//   T spawn:   #        [1]  #    [2]          [3]  #
//            # R #           R #        # R #     # R
//                            #            #         #
const ROTATION_TABLES: [RotationTable; PieceType::COUNT] = [
    // O
    [
        [p(0, 0), p(1, 0), p(0, -1), p(1, -1)],
        [p(0, 0), p(1, 0), p(0, -1), p(1, -1)],
        [p(0, 0), p(1, 0), p(0, -1), p(1, -1)],
        [p(0, 0), p(1, 0), p(0, -1), p(1, -1)],
    ],
    // I
    [
        [p(0, 0), p(-1, 0), p(1, 0), p(2, 0)],
        [p(0, 0), p(0, -1), p(0, 1), p(0, 2)],
        [p(0, 0), p(-1, 0), p(1, 0), p(2, 0)],
        [p(0, 0), p(0, -1), p(0, -2), p(0, 1)],
    ],
    // T
    [
        [p(0, 0), p(-1, 0), p(1, 0), p(0, -1)],
        [p(0, 0), p(0, 1), p(0, -1), p(1, 0)],
        [p(0, 0), p(1, 0), p(-1, 0), p(0, 1)],
        [p(0, 0), p(0, -1), p(0, 1), p(-1, 0)],
    ],
    // L
    [
        [p(0, 0), p(1, 0), p(-1, 0), p(1, -1)],
        [p(0, 0), p(0, -1), p(0, 1), p(1, 1)],
        [p(0, 0), p(-1, 0), p(1, 0), p(-1, 1)],
        [p(0, 0), p(0, 1), p(0, -1), p(-1, -1)],
    ],
    // J
    [
        [p(0, 0), p(-1, 0), p(1, 0), p(-1, -1)],
        [p(0, 0), p(0, 1), p(0, -1), p(1, -1)],
        [p(0, 0), p(1, 0), p(-1, 0), p(1, 1)],
        [p(0, 0), p(0, -1), p(0, 1), p(-1, 1)],
    ],
    // S
    [
        [p(0, 0), p(-1, 0), p(0, -1), p(1, -1)],
        [p(0, 0), p(0, -1), p(1, 0), p(1, 1)],
        [p(0, 0), p(1, 0), p(0, 1), p(-1, 1)],
        [p(0, 0), p(-1, 0), p(-1, -1), p(0, 1)],
    ],
    // Z
    [
        [p(0, 0), p(1, 0), p(0, -1), p(-1, -1)],
        [p(0, 0), p(0, 1), p(1, 0), p(1, -1)],
        [p(0, 0), p(-1, 0), p(0, 1), p(1, 1)],
        [p(0, 0), p(0, -1), p(-1, 0), p(-1, 1)],
    ],
];

// Rows follow RotationTransition order: 0R, R0, R2, 2R, 2L, L2, L0, 0L.
const JLSTZ_KICKS: KickTable = [
    [p(-1, 0), p(-1, -1), p(0, 2), p(-1, 2)],
    [p(1, 0), p(1, 1), p(0, -2), p(1, -2)],
    [p(1, 0), p(1, -1), p(0, 2), p(1, -2)],
    [p(-1, 0), p(-1, -1), p(0, 2), p(-1, 2)],
    [p(1, 0), p(1, -1), p(0, 2), p(1, 2)],
    [p(-1, 0), p(-1, 1), p(0, -2), p(-1, -2)],
    [p(-1, 0), p(-1, 1), p(0, -2), p(-1, -2)],
    [p(1, 0), p(1, -1), p(0, 2), p(1, 2)],
];

const I_KICKS: KickTable = [
    [p(-2, 0), p(1, 0), p(-2, 1), p(1, -2)],
    [p(2, 0), p(-1, 0), p(2, -1), p(-1, 2)],
    [p(-1, 0), p(2, 0), p(-1, -2), p(2, 1)],
    [p(1, 0), p(-2, 0), p(1, 2), p(-2, -1)],
    [p(2, 0), p(-1, 0), p(2, -1), p(-1, 2)],
    [p(-2, 0), p(1, 0), p(-2, 1), p(1, -2)],
    [p(1, 0), p(-2, 0), p(1, 2), p(-2, -1)],
    [p(-1, 0), p(2, 0), p(-1, -2), p(2, 1)],
];

/// Which wall-kick table a piece consults. The O piece never kicks.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum KickFamily {
    None,
    I,
    Jlstz,
}

impl KickFamily {
    /// Candidate offsets in the order they must be tried.
    pub fn offsets(self, transition: RotationTransition) -> &'static [Point] {
        match self {
            KickFamily::None => &[],
            KickFamily::I => &I_KICKS[transition.index()],
            KickFamily::Jlstz => &JLSTZ_KICKS[transition.index()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    kind: PieceType,
    rotations: &'static RotationTable,
    kicks: KickFamily,
    rotation: Rotation,
    // Only read by kick lookup right after a rotate call; stale otherwise.
    last_transition: Option<RotationTransition>,
}

impl Piece {
    pub fn new(kind: PieceType) -> Self {
        Self {
            kind,
            rotations: kind.rotation_table(),
            kicks: kind.kick_family(),
            rotation: Rotation::Spawn,
            last_transition: None,
        }
    }

    pub fn kind(&self) -> PieceType {
        self.kind
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// The i-th mino offset (0..4) of the current orientation.
    pub fn get(&self, i: usize) -> Point {
        self.rotations[self.rotation.index()][i]
    }

    pub fn cells(&self) -> [Point; 4] {
        self.rotations[self.rotation.index()]
    }

    /// Absolute cells with the pivot placed at `pos`.
    pub fn cells_at(&self, pos: Point) -> [Point; 4] {
        self.cells().map(|c| c + pos)
    }

    pub fn rotate_clockwise(&mut self) {
        let to = self.rotation.rotate_cw();
        self.last_transition = RotationTransition::between(self.rotation, to);
        self.rotation = to;
    }

    pub fn rotate_counter_clockwise(&mut self) {
        let to = self.rotation.rotate_ccw();
        self.last_transition = RotationTransition::between(self.rotation, to);
        self.rotation = to;
    }

    pub fn reset_rotation(&mut self) {
        self.rotation = Rotation::Spawn;
    }

    pub fn kick_family(&self) -> KickFamily {
        self.kicks
    }

    pub fn rotation_state(&self) -> Option<RotationTransition> {
        self.last_transition
    }

    /// Kick candidates for the most recent rotation, empty if there are none.
    pub fn wall_kicks(&self) -> &'static [Point] {
        match self.last_transition {
            Some(transition) => self.kicks.offsets(transition),
            None => &[],
        }
    }
}
