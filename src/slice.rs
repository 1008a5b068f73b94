// vim: set ai et ts=4 sw=4 sts=4:
use super::grid::{CellState, Grid};
use super::util::{Direction, LineName};

// A strided view over one row or column of the grid, possibly reversed.
// It carries no reference of its own; every operation borrows the grid,
// and writes go through Grid::set so contradiction detection and dirty
// marking happen there.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct Slice {
    origin: usize,
    step:   isize,
    length: usize,
}

impl Slice {
    pub fn new(grid: &Grid, name: LineName) -> Slice {
        match name.dir {
            Direction::Column => Slice {
                origin: name.index,
                step:   grid.width as isize,
                length: grid.height,
            },
            _ => Slice {
                origin: grid.width * name.index,
                step:   1,
                length: grid.width,
            },
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    fn offset(&self, i: usize) -> usize {
        (self.origin as isize + self.step * i as isize) as usize
    }

    pub fn get(&self, grid: &Grid, i: usize) -> CellState {
        grid.cells[self.offset(i)]
    }

    pub fn set(&self, grid: &mut Grid, i: usize, val: CellState) {
        let o = self.offset(i);
        let x = o % grid.width;
        let y = (o - x) / grid.width;
        grid.set(x, y, val);
    }

    // first position >= start where a run of `length` cells contains no
    // CROSSED cell, or None if the slice has no such hole
    pub fn find_hole_starting_at(&self, grid: &Grid, start: isize, length: usize) -> Option<usize> {
        let mut found = 0usize;
        for i in start.max(0) as usize..self.length {
            if self.get(grid, i) == CellState::Crossed {
                found = 0;
            } else {
                found += 1;
                if found >= length {
                    return Some(i + 1 - found);
                }
            }
        }
        None
    }

    // length of the run of same-state cells starting at i
    pub fn strip_length(&self, grid: &Grid, i: usize) -> usize {
        let val = self.get(grid, i);
        let mut n = 0;
        for j in i..self.length {
            if self.get(grid, j) != val {
                break;
            }
            n += 1;
        }
        n
    }

    pub fn index_of_next_solid(&self, grid: &Grid, start: isize, bound: isize) -> Option<usize> {
        let upper = bound.min(self.length as isize);
        for i in start.max(0)..upper {
            if self.get(grid, i as usize) == CellState::Solid {
                return Some(i as usize);
            }
        }
        None
    }

    // writes val to every differing cell in [i, j), returns how many cells
    // changed; the range is clamped to the slice
    pub fn set_segment(&self, grid: &mut Grid, i: isize, j: isize, val: CellState) -> usize {
        let from = i.max(0) as usize;
        let to = j.min(self.length as isize).max(0) as usize;
        let mut changed = 0;
        for n in from..to {
            if self.get(grid, n) != val {
                self.set(grid, n, val);
                changed += 1;
            }
        }
        changed
    }

    // the same cells viewed back to front
    pub fn reverse(&self) -> Slice {
        Slice {
            origin: self.offset(self.length - 1),
            step:   -self.step,
            length: self.length,
        }
    }
}
