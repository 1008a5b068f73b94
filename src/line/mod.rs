// vim: set ai et ts=4 sw=4 sts=4:
mod infer;

use super::grid::Grid;
use super::slice::Slice;
use super::util::LineName;

#[derive(PartialEq, Copy, Clone, Debug, Default)]
pub struct LineStats {
    pub wiggle_room:   isize, // max over segments of feasible span minus own length
    pub num_segments:  usize,
    pub done_segments: usize,
    pub num_changes:   u32,   // dirty notifications since the last inference
}

// One row or column with its constraint and analytic state. The line never
// touches the grid directly; its slice computes indices and the grid's own
// write path handles conflicts and dirty marking.
#[derive(Debug)]
pub struct Line {
    pub name:  LineName,
    pub stats: LineStats,
    len:   Vec<usize>,
    lb:    Vec<isize>, // smallest index where segment i may start
    rb:    Vec<isize>, // leftmost-fit bounds of the reversed line; ub() derives from these
    done:  Vec<bool>,
    slice: Slice,
}

// snapshot of the backtrackable part of a Line
#[derive(PartialEq, Clone, Debug, Default)]
pub struct State {
    lb:   Vec<isize>,
    rb:   Vec<isize>,
    done: Vec<bool>,
}

impl Line {
    pub fn new(grid: &Grid, name: LineName, len: Vec<usize>) -> Line {
        let slice = Slice::new(grid, name);
        let sum: usize = len.iter().sum();
        let stats = LineStats {
            wiggle_room:   slice.length() as isize - sum as isize,
            num_segments:  len.len(),
            done_segments: 0,
            num_changes:   0,
        };
        Line {
            name,
            stats,
            lb: vec![0; len.len()],
            rb: vec![0; len.len()],
            done: vec![false; len.len()],
            len,
            slice,
        }
    }

    fn num_segments(&self) -> usize {
        self.len.len()
    }
    fn len(&self, i: usize) -> isize {
        self.len[i] as isize
    }
    fn lb(&self, i: usize) -> isize {
        self.lb[i]
    }
    // largest index at which segment i may end, recovered from the
    // reversed fit by mirroring
    fn ub(&self, i: usize) -> isize {
        self.slice.length() as isize - self.rb[self.rb.len() - 1 - i] - 1
    }

    // contiguous range of segment indices whose feasible span covers the
    // closed interval [start, end] (left inclusive, right exclusive)
    fn colliding_segments(&self, start: isize, end: isize) -> (usize, usize) {
        let mut first = 0;
        let mut second = 0;
        let mut found = false;
        for i in 0..self.num_segments() {
            if self.ub(i) < end {
                continue;
            }
            if self.lb(i) <= start {
                if !found {
                    found = true;
                    first = i;
                }
                second = i + 1;
            } else if found {
                break;
            }
        }
        (first, second)
    }

    pub fn update_stats(&mut self, grid: &mut Grid) {
        let mut w = 0;
        for i in 0..self.num_segments() {
            let wi = self.ub(i) - self.lb(i) + 1 - self.len(i);
            if w < wi {
                w = wi;
            }
        }
        self.stats.wiggle_room = w;
        self.stats.done_segments = self.done.iter().filter(|&&d| d).count();
        let idx = grid.line_index(self.name);
        grid.changes[idx] = 0;
    }

    pub fn state(&self) -> State {
        State {
            lb:   self.lb.clone(),
            rb:   self.rb.clone(),
            done: self.done.clone(),
        }
    }

    pub fn restore(&mut self, s: State) {
        self.lb = s.lb;
        self.rb = s.rb;
        self.done = s.done;
    }
}
