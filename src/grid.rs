// vim: set ai et ts=4 sw=4 sts=4:
use std::fmt;
use ansi_term::{Colour, Style};

use super::util::{Direction, LineName};

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum CellState {
    Empty,
    Solid,
    Crossed,
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            CellState::Empty   => ' ',
            CellState::Solid   => '#',
            CellState::Crossed => '.',
        })
    }
}

// The single source of truth for puzzle state. Besides the cells it tracks
// which lines have unexamined writes (the dirty list), the line currently
// being inferred (so writes don't immediately re-queue it), and whether a
// write ever conflicted with an already-decided cell.
#[derive(Debug)]
pub struct Grid {
    pub width:   usize,
    pub height:  usize,
    pub cells:   Vec<CellState>,
    pub current: LineName,
    pub dirty:   Vec<LineName>,
    pub changes: Vec<u32>, // per line, dirty-notifications since its last inference
    pub failed:  bool,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        // every line starts out dirty: rows first, then columns, matching
        // the order the solver creates its Line objects in
        let mut dirty = Vec::with_capacity(width + height);
        dirty.extend((0..height).map(LineName::row));
        dirty.extend((0..width).map(LineName::column));
        Grid {
            width,
            height,
            cells: vec![CellState::Empty; width * height],
            current: LineName::empty(),
            dirty,
            changes: vec![0; width + height],
            failed: false,
        }
    }

    pub fn get(&self, x: usize, y: usize) -> CellState {
        self.cells[x + y * self.width]
    }

    // writes a cell. Writing the value already present is a no-op; writing
    // a different value over a decided cell raises the contradiction flag
    // and leaves the cell alone. A successful write marks the crossing
    // lines dirty, except the one currently running its inference.
    pub fn set(&mut self, x: usize, y: usize, val: CellState) {
        let old = self.get(x, y);
        if val == old {
            return;
        }
        if old != CellState::Empty {
            self.failed = true;
            return;
        }

        self.cells[x + y * self.width] = val;
        if self.current.dir != Direction::Row {
            self.mark_dirty(LineName::row(y));
        }
        if self.current.dir != Direction::Column {
            self.mark_dirty(LineName::column(x));
        }
    }

    pub fn mark_dirty(&mut self, n: LineName) {
        // the list is bounded by width + height, a linear membership scan
        // is fine
        if !self.dirty.contains(&n) {
            self.dirty.push(n);
            let i = self.line_index(n);
            self.changes[i] += 1;
        }
    }

    // rows occupy indices [0, height), columns [height, height + width)
    pub fn line_index(&self, n: LineName) -> usize {
        match n.dir {
            Direction::Row => n.index,
            _              => self.height + n.index,
        }
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != CellState::Empty)
    }

    pub fn render(&self, emit_color: bool) -> String {
        let mut out = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.get(x, y);
                if emit_color {
                    let painted = match cell {
                        CellState::Solid   => Colour::Cyan.bold().paint("#"),
                        CellState::Crossed => Style::new().dimmed().paint("."),
                        CellState::Empty   => Style::new().paint(" "),
                    };
                    out.push_str(&painted.to_string());
                } else {
                    out.push_str(&cell.to_string());
                }
            }
            out.push('\n');
        }
        out
    }
}
