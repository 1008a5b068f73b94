// vim: set ai et ts=4 sw=4 sts=4:
use std::cmp::Ordering;
use std::mem;
use log::{debug, log_enabled, trace, Level::Debug};

use super::config::{Config, EDGE_SCORE_LEN, GRID_HALF_EDGE, GRID_SIZE};
use super::grid::{CellState, Grid};
use super::line::{Line, LineStats, State as LineState};
use super::util::LineName;

#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Guess {
    pub x:   usize,
    pub y:   usize,
    pub val: CellState,
}

// a checkpoint: everything needed to rewind one speculative decision
#[derive(Debug)]
struct State {
    cells:   Vec<CellState>,
    lines:   Vec<LineState>,
    guessed: Option<Guess>,
}

#[derive(PartialEq, Default, Debug, Copy, Clone)]
pub struct Stats {
    pub line_count:    u32,
    pub wrong_guesses: u32,
    pub max_depth:     usize,
}

pub struct Solver<'a> {
    config: &'a Config,
    pub grid:  Grid,
    pub lines: Vec<Line>,
    pub stats: Stats,
    guessed: Option<Guess>,
    states:  Vec<State>,
}

impl<'a> Solver<'a> {
    pub fn new(config: &'a Config, rows: Vec<Vec<usize>>, cols: Vec<Vec<usize>>) -> Solver<'a> {
        // the grid seeds its dirty list in the same order the lines are
        // created here: rows first, then columns
        let grid = Grid::new(cols.len(), rows.len());
        let mut lines = Vec::with_capacity(rows.len() + cols.len());
        for (i, len) in rows.into_iter().enumerate() {
            lines.push(Line::new(&grid, LineName::row(i), len));
        }
        for (i, len) in cols.into_iter().enumerate() {
            lines.push(Line::new(&grid, LineName::column(i), len));
        }
        Solver {
            config,
            grid,
            lines,
            stats: Stats::default(),
            guessed: None,
            states: Vec::new(),
        }
    }

    // a line's stats with the grid-side dirty-notification count folded in
    fn line_stats(&self, n: LineName) -> LineStats {
        let i = self.grid.line_index(n);
        let mut s = self.lines[i].stats;
        s.num_changes = self.grid.changes[i];
        s
    }

    // pops the dirty line with the highest priority score; priorities are
    // recomputed lazily with a sort-on-pop rather than maintained
    fn get_dirty(&mut self) -> Option<LineName> {
        let mut dirty = mem::take(&mut self.grid.dirty);
        dirty.sort_by(|&a, &b| {
            let sa = self.config.line_score(&self.line_stats(a));
            let sb = self.config.line_score(&self.line_stats(b));
            sa.partial_cmp(&sb).unwrap_or(Ordering::Equal)
        });
        let n = dirty.pop();
        self.grid.dirty = dirty;
        n
    }

    // runs line inference until the dirty list drains. Returns false on a
    // contradiction, an infeasible line, or once the line budget runs out.
    pub fn infer(&mut self) -> bool {
        while let Some(name) = self.get_dirty() {
            self.grid.current = name;
            trace!("inferring {}", name);
            let idx = self.grid.line_index(name);
            if !self.lines[idx].infer(&mut self.grid) {
                return false;
            }
            self.stats.line_count += 1;
            self.grid.current = LineName::empty();
            if self.grid.failed || self.stats.line_count >= self.config.max_lines {
                return false;
            }
        }
        true
    }

    pub fn push_state(&mut self) {
        let s = State {
            cells:   self.grid.cells.clone(),
            lines:   self.lines.iter().map(|l| l.state()).collect(),
            guessed: self.guessed,
        };
        self.states.push(s);
        if self.stats.max_depth < self.states.len() {
            self.stats.max_depth = self.states.len();
        }
    }

    // restores the most recent checkpoint; the dirty list is emptied and
    // reseeded by whatever write the caller performs next
    pub fn pop_state(&mut self) {
        if let Some(s) = self.states.pop() {
            self.grid.cells = s.cells;
            self.guessed = s.guessed;
            for (line, ls) in self.lines.iter_mut().zip(s.lines) {
                line.restore(ls);
            }
            self.grid.dirty.clear();
        }
    }

    // the local window around (x, y): solid = 1, crossed = -1, empty = 0,
    // outside the grid = -1
    fn grid_at(&self, x: usize, y: usize) -> Vec<f64> {
        let mut g = Vec::with_capacity(GRID_SIZE);
        let half = GRID_HALF_EDGE as isize;
        let (w, h) = (self.grid.width as isize, self.grid.height as isize);
        for i in x as isize - half..=x as isize + half {
            for j in y as isize - half..=y as isize + half {
                if i < 0 || i >= w || j < 0 || j >= h {
                    g.push(-1.0);
                    continue;
                }
                g.push(match self.grid.get(i as usize, j as usize) {
                    CellState::Solid   => 1.0,
                    CellState::Empty   => 0.0,
                    CellState::Crossed => -1.0,
                });
            }
        }
        g
    }

    fn guess_score(&self, x: usize, y: usize) -> (f64, CellState) {
        let c = self.config;
        let mut score = c.row_coef * c.line_score(&self.line_stats(LineName::row(y)))
            + c.col_coef * c.line_score(&self.line_stats(LineName::column(x)));

        let min_x = x.min(self.grid.width - 1 - x);
        let min_y = y.min(self.grid.height - 1 - y);
        if min_x < EDGE_SCORE_LEN {
            score += c.edge_score[min_x];
        }
        if min_y < EDGE_SCORE_LEN {
            score += c.edge_score[min_y];
        }

        let out = c.net.evaluate(&self.grid_at(x, y));
        if out[0] > out[1] {
            (score + out[0], CellState::Crossed)
        } else {
            (score + out[1], CellState::Solid)
        }
    }

    // picks the highest-scoring unknown cell together with the value to
    // try first; None once the grid is full
    pub fn guess(&self) -> Option<Guess> {
        let mut best = None;
        let mut max_score = f64::NEG_INFINITY;
        for x in 0..self.grid.width {
            for y in 0..self.grid.height {
                if self.grid.get(x, y) != CellState::Empty {
                    continue;
                }
                let (score, val) = self.guess_score(x, y);
                if score > max_score {
                    best = Some(Guess { x, y, val });
                    max_score = score;
                }
            }
        }
        best
    }

    pub fn solve(&mut self) -> bool {
        loop {
            if !self.infer() || self.grid.failed {
                if self.states.is_empty() {
                    return false;
                }
                self.grid.failed = false;
                self.pop_state();
                match self.guessed.take() {
                    Some(g) => {
                        let flipped = match g.val {
                            CellState::Solid => CellState::Crossed,
                            _                => CellState::Solid,
                        };
                        if log_enabled!(Debug) {
                            debug!("guess (x={}, y={}) -> {:?} ran into a contradiction; it must be {:?}",
                                   g.x, g.y, g.val, flipped);
                            debug!("\n{}", self.grid.render(false));
                        }
                        self.grid.set(g.x, g.y, flipped);
                        self.stats.wrong_guesses += 1;
                    }
                    None => return false,
                }
            } else {
                match self.guess() {
                    None => return true, // no unknown cells left
                    Some(g) => {
                        if log_enabled!(Debug) {
                            debug!("speculatively setting (x={}, y={}) to {:?} at depth {}",
                                   g.x, g.y, g.val, self.states.len() + 1);
                        }
                        self.guessed = Some(g);
                        self.push_state();
                        self.grid.set(g.x, g.y, g.val);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::net::Net;

    fn test_config() -> Config {
        Config {
            wiggle_room:   -1.0,
            num_segments:  0.0,
            done_segments: 0.0,
            num_changes:   1.0,
            row_coef:      1.0,
            col_coef:      1.0,
            edge_score:    [1.0, 0.5, 0.25, 0.0, 0.0],
            net:           Net::new(&[vec![0.0; (1 + GRID_SIZE) * 2]], GRID_SIZE).unwrap(),
            max_lines:     100_000,
        }
    }

    // reduce a solved line back to its run lengths
    fn runs_of(cells: &[CellState]) -> Vec<usize> {
        let mut runs = Vec::new();
        let mut n = 0;
        for &c in cells {
            match c {
                CellState::Solid => n += 1,
                _ => {
                    if n > 0 {
                        runs.push(n);
                    }
                    n = 0;
                }
            }
        }
        if n > 0 {
            runs.push(n);
        }
        runs
    }

    fn assert_satisfies(solver: &Solver, rows: &[Vec<usize>], cols: &[Vec<usize>]) {
        let (w, h) = (solver.grid.width, solver.grid.height);
        assert!(solver.grid.is_full());
        for y in 0..h {
            let cells: Vec<_> = (0..w).map(|x| solver.grid.get(x, y)).collect();
            assert_eq!(runs_of(&cells), rows[y], "row {} violates its constraint", y);
        }
        for x in 0..w {
            let cells: Vec<_> = (0..h).map(|y| solver.grid.get(x, y)).collect();
            assert_eq!(runs_of(&cells), cols[x], "column {} violates its constraint", x);
        }
    }

    #[test]
    fn degenerate_single_solid_cell() {
        let config = test_config();
        let mut s = Solver::new(&config, vec![vec![1]], vec![vec![1]]);
        assert!(s.solve());
        assert_eq!(s.grid.render(false), "#\n");
        assert!(s.stats.line_count >= 2);
        assert_eq!(s.stats.wrong_guesses, 0);
        assert_eq!(s.stats.max_depth, 0);
    }

    #[test]
    fn degenerate_single_empty_cell() {
        let config = test_config();
        let mut s = Solver::new(&config, vec![vec![]], vec![vec![]]);
        assert!(s.solve());
        assert_eq!(s.grid.render(false), ".\n");
    }

    #[test]
    fn three_by_three_cross() {
        let config = test_config();
        let rows = vec![vec![1], vec![3], vec![1]];
        let cols = vec![vec![1], vec![3], vec![1]];
        let mut s = Solver::new(&config, rows.clone(), cols.clone());
        assert!(s.solve());
        assert_eq!(s.grid.render(false), ".#.\n###\n.#.\n");
        assert_satisfies(&s, &rows, &cols);
        // the cross is fully determined by inference alone
        assert_eq!(s.stats.wrong_guesses, 0);
        assert_eq!(s.stats.max_depth, 0);
    }

    #[test]
    fn infeasible_puzzle_fails() {
        // a run of 2 in a 3x1 grid whose columns only allow singletons
        let config = test_config();
        let mut s = Solver::new(&config, vec![vec![2]], vec![vec![1], vec![1], vec![1]]);
        assert!(!s.solve());
    }

    #[test]
    fn full_line_single_segment() {
        let config = test_config();
        let rows = vec![vec![3]];
        let cols = vec![vec![1], vec![1], vec![1]];
        let mut s = Solver::new(&config, rows.clone(), cols.clone());
        assert!(s.solve());
        assert_eq!(s.grid.render(false), "###\n");
        assert_satisfies(&s, &rows, &cols);
    }

    #[test]
    fn ambiguous_puzzle_needs_a_guess() {
        // two valid solutions (diagonal or anti-diagonal); inference alone
        // cannot decide, so the solver has to speculate
        let config = test_config();
        let rows = vec![vec![1], vec![1]];
        let cols = vec![vec![1], vec![1]];
        let mut s = Solver::new(&config, rows.clone(), cols.clone());
        assert!(s.solve());
        assert_satisfies(&s, &rows, &cols);
        assert!(s.stats.wrong_guesses + s.stats.max_depth as u32 > 0);
    }

    #[test]
    fn five_by_five_inference_only() {
        let config = test_config();
        let rows = vec![vec![5], vec![1, 1], vec![1, 1], vec![1, 1], vec![5]];
        let cols = vec![vec![5], vec![1, 1], vec![1, 1], vec![1, 1], vec![5]];
        let mut s = Solver::new(&config, rows.clone(), cols.clone());
        assert!(s.solve());
        assert_satisfies(&s, &rows, &cols);
        assert_eq!(s.stats.wrong_guesses + s.stats.max_depth as u32, 0);
    }

    #[test]
    fn one_cell_wide_grid() {
        let config = test_config();
        let rows = vec![vec![1], vec![], vec![1]];
        let cols = vec![vec![1, 1]];
        let mut s = Solver::new(&config, rows.clone(), cols.clone());
        assert!(s.solve());
        assert_eq!(s.grid.render(false), "#\n.\n#\n");
    }

    #[test]
    fn exhaustion_reports_failure() {
        let mut config = test_config();
        config.max_lines = 1;
        let mut s = Solver::new(&config, vec![vec![1], vec![3], vec![1]], vec![vec![1], vec![3], vec![1]]);
        assert!(!s.solve());
    }

    #[test]
    fn checkpoint_round_trip_restores_everything() {
        let config = test_config();
        let mut s = Solver::new(&config, vec![vec![1], vec![3], vec![1]], vec![vec![1], vec![3], vec![1]]);
        assert!(s.infer());

        let cells = s.grid.cells.clone();
        let lines: Vec<_> = s.lines.iter().map(|l| l.state()).collect();
        s.guessed = Some(Guess { x: 0, y: 0, val: CellState::Solid });

        s.push_state();
        // arbitrary mutations past the checkpoint
        s.grid.cells[0] = CellState::Solid;
        s.guessed = None;
        let scratch = s.lines[0].state();
        s.lines[1].restore(scratch);

        s.pop_state();
        assert_eq!(s.grid.cells, cells);
        assert_eq!(s.guessed, Some(Guess { x: 0, y: 0, val: CellState::Solid }));
        let restored: Vec<_> = s.lines.iter().map(|l| l.state()).collect();
        assert_eq!(restored, lines);
        assert!(s.grid.dirty.is_empty());
    }

    #[test]
    fn guess_on_single_remaining_cell() {
        let config = test_config();
        let mut s = Solver::new(&config, vec![vec![1], vec![1]], vec![vec![1], vec![1]]);
        // decide everything except (1, 1) by hand
        s.grid.set(0, 0, CellState::Solid);
        s.grid.set(1, 0, CellState::Crossed);
        s.grid.set(0, 1, CellState::Crossed);
        let g = s.guess().unwrap();
        assert_eq!((g.x, g.y), (1, 1));
    }

    #[test]
    fn guess_window_encodes_surroundings() {
        let config = test_config();
        let s = Solver::new(&config, vec![vec![1], vec![1]], vec![vec![1], vec![1]]);
        let window = s.grid_at(0, 0);
        assert_eq!(window.len(), GRID_SIZE);
        // top-left corner: most of the window lies outside the grid
        assert_eq!(window.iter().filter(|&&v| v == -1.0).count(), 21);
        assert_eq!(window.iter().filter(|&&v| v == 0.0).count(), 4);
    }

    #[test]
    fn larger_puzzle_round_trips_constraints() {
        // #.#.#
        // .###.
        // #####
        // .###.
        // #.#.#
        let config = test_config();
        let rows = vec![vec![1, 1, 1], vec![3], vec![5], vec![3], vec![1, 1, 1]];
        let cols = vec![vec![1, 1, 1], vec![3], vec![5], vec![3], vec![1, 1, 1]];
        let mut s = Solver::new(&config, rows.clone(), cols.clone());
        assert!(s.solve());
        assert_satisfies(&s, &rows, &cols);
        assert_eq!(s.grid.render(false), "#.#.#\n.###.\n#####\n.###.\n#.#.#\n");
    }
}
