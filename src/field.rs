//! The playing field.
//!
//! Row 0 is the top row. Cells hold the type of the piece that filled them.
//! Every write goes through [`Field::insert_tetromino_at`], which checks all
//! four cells before touching the grid.

use crate::error::EngineError;
use crate::piece::{Piece, PieceType, Point};

pub type Cell = Option<PieceType>;

/// Snapshot value for an empty cell.
pub const EMPTY_CELL: i8 = -1;

/// Rows counted from the top that end the game when occupied after a lock.
const LOCK_OUT_ROWS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    width: usize,
    height: usize,
    rows: Vec<Vec<Cell>>,
    surface_heights: Vec<usize>,
}

impl Field {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![None; width]; height],
            surface_heights: vec![0; width],
        }
    }

    /// Builds a field from text rows, top row first: `.` is empty, a piece
    /// letter fills the cell. Rows must all have the same length.
    pub fn from_rows(rows: &[&str]) -> Result<Self, EngineError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut field = Field::new(width, height);
        for (y, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(EngineError::InvalidSettings(format!(
                    "field row {y} has {} cells, expected {width}",
                    line.chars().count()
                )));
            }
            for (x, ch) in line.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                let kind: PieceType = ch.to_string().parse()?;
                field.rows[y][x] = Some(kind);
                field.surface_heights[x] = field.surface_heights[x].max(height - y);
            }
        }
        Ok(field)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_in_bounds(&self, pt: Point) -> bool {
        pt.x >= 0 && pt.y >= 0 && (pt.x as usize) < self.width && (pt.y as usize) < self.height
    }

    /// Cell contents, `None` for empty or out-of-bounds points.
    pub fn cell(&self, pt: Point) -> Cell {
        if !self.is_in_bounds(pt) {
            return None;
        }
        self.rows[pt.y as usize][pt.x as usize]
    }

    fn is_free(&self, pt: Point) -> bool {
        self.is_in_bounds(pt) && self.rows[pt.y as usize][pt.x as usize].is_none()
    }

    pub fn is_tetromino_insertable_at(&self, piece: &Piece, pos: Point) -> bool {
        piece.cells_at(pos).iter().all(|&c| self.is_free(c))
    }

    pub fn insert_tetromino_at(&mut self, piece: &Piece, pos: Point) -> bool {
        if !self.is_tetromino_insertable_at(piece, pos) {
            return false;
        }
        for c in piece.cells_at(pos) {
            let (x, y) = (c.x as usize, c.y as usize);
            self.rows[y][x] = Some(piece.kind());
            self.surface_heights[x] = self.surface_heights[x].max(self.height - y);
        }
        true
    }

    /// Lowest cursor straight below `pos` at which `piece` still fits.
    pub fn drop_position(&self, piece: &Piece, pos: Point) -> Point {
        let mut landing = pos;
        while self.is_tetromino_insertable_at(piece, Point::new(landing.x, landing.y + 1)) {
            landing.y += 1;
        }
        landing
    }

    pub fn is_line_full(&self, row: usize) -> bool {
        self.rows[row].iter().all(Option::is_some)
    }

    /// Removes every full row, collapses the rest downward, and returns how
    /// many rows were removed.
    pub fn clear_lines(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().all(Option::is_some));
        let cleared = before - self.rows.len();
        if cleared == 0 {
            return 0;
        }
        let mut collapsed = vec![vec![None; self.width]; cleared];
        collapsed.append(&mut self.rows);
        self.rows = collapsed;
        for h in self.surface_heights.iter_mut() {
            *h = h.saturating_sub(cleared);
        }
        cleared
    }

    /// Lock-out: anything left in the two topmost rows.
    pub fn is_game_over(&self) -> bool {
        self.rows
            .iter()
            .take(LOCK_OUT_ROWS)
            .any(|row| row.iter().any(Option::is_some))
    }

    pub fn reset_field(&mut self) {
        for row in self.rows.iter_mut() {
            row.fill(None);
        }
        self.surface_heights.fill(0);
    }

    pub fn surface_heights(&self) -> &[usize] {
        &self.surface_heights
    }

    pub fn field_data(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Row-major cell values, `-1` for empty and the piece index otherwise.
    pub fn cell_values(&self) -> Vec<i8> {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .map(|c| c.map_or(EMPTY_CELL, |k| k.index() as i8))
            .collect()
    }

    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in &self.rows {
            for cell in row {
                out.push(cell.map_or('.', PieceType::letter));
            }
            out.push('\n');
        }
        out
    }
}
