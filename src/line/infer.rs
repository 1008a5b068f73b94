// vim: set ai et ts=4 sw=4 sts=4:
use super::Line;
use super::super::grid::{CellState, Grid};
use super::super::slice::Slice;

impl Line {
    // Slide every segment to its leftmost feasible position, respecting
    // crossed-out cells, already-solid cells and the known lower bounds in
    // lb. Tightened positions are written back into lb. Returns false when
    // no placement exists.
    fn fit_leftmost(grid: &Grid, slice: Slice, len: &[usize], lb: &mut [isize]) -> bool {
        let n = slice.length() as isize;
        let mut cursor: isize = 0; // a position in the slice
        let mut i: isize = 0;      // indexes len / lb

        while cursor < n {
            let lbound = if i >= len.len() as isize { n } else { lb[i as usize] };
            if lbound > cursor {
                let next_solid = match slice.index_of_next_solid(grid, cursor, lbound) {
                    None => {
                        cursor = lbound;
                        continue;
                    }
                    Some(s) => s as isize,
                };

                // a solid strip sits before the next segment may start, so
                // some earlier segment has to come back and cover it; pull
                // back to the nearest one that is long enough
                let strip_len = slice.strip_length(grid, next_solid as usize) as isize;
                loop {
                    i -= 1;
                    if i < 0 || len[i as usize] as isize >= strip_len {
                        break;
                    }
                }
                if i < 0 {
                    return false;
                }

                // resume from where the pulled segment used to sit, then
                // shift it right up against the strip. Retry the same i:
                // pulling it may have exposed another solid strip.
                cursor = lb[i as usize];
                lb[i as usize] = next_solid + strip_len - len[i as usize] as isize;
                continue;
            }

            let seg = len[i as usize] as isize;
            let mut hole = match slice.find_hole_starting_at(grid, cursor, len[i as usize]) {
                None => return false,
                Some(h) => h as isize,
            };

            // slide forward while the cell just past the tail is solid (the
            // segment must swallow it); remember whether sliding uncovered
            // a solid at the old start, which an earlier segment then has
            // to come back for
            let mut skipped_solid = false;
            while hole + seg < n && slice.get(grid, (hole + seg) as usize) == CellState::Solid {
                skipped_solid = skipped_solid || slice.get(grid, hole as usize) == CellState::Solid;
                hole += 1;
            }
            lb[i as usize] = hole;
            if !skipped_solid {
                // locked in; move the cursor past the mandatory gap and
                // work on the next segment
                cursor = hole + seg + 1;
                i += 1;
            }
        }

        // every segment must have found a position
        i >= len.len() as isize
    }

    // For each segment, cross out the cells no placement can reach and fill
    // the cells every placement covers.
    fn infer_segments(&mut self, grid: &mut Grid) -> bool {
        let k = self.num_segments();
        let n = self.slice.length() as isize;
        for i in 0..k {
            let l = self.lb(i);
            let u = self.ub(i);
            let prev_u = if i > 0 { self.ub(i - 1) } else { -1 };
            let len = self.len(i);

            if l + len - 1 > u {
                // feasible span too small to hold the segment
                return false;
            }

            if l > prev_u + 1 {
                self.slice.set_segment(grid, prev_u + 1, l, CellState::Crossed);
            }

            if self.done[i] {
                continue;
            }

            if u - len + 1 <= l + len - 1 {
                // the span is tight enough that the middle cells are solid
                // under every placement
                self.slice.set_segment(grid, u - len + 1, l + len, CellState::Solid);
            }

            if u - l + 1 == len {
                self.done[i] = true;
            }
        }
        if self.ub(k - 1) + 1 < n {
            self.slice.set_segment(grid, self.ub(k - 1) + 1, n, CellState::Crossed);
        }
        true
    }

    // Deductions from strips (maximal same-state runs). Cases include:
    //
    // 1. "X X" can be marked "XXX" if all candidate segments are >= 2
    // 2. "?SSS?" can be marked "XSSSX" if all candidate segments are = 3
    // 3. "X SS " can be marked "X SSS" if all candidate segments are >= 4
    fn infer_strips(&mut self, grid: &mut Grid) -> bool {
        let n = self.slice.length() as isize;
        let mut i: isize = 0;
        while i < n {
            let mut strip_len = self.slice.strip_length(grid, i as usize) as isize;

            // strips touching either edge are fully handled by segment
            // propagation
            if i > 0 && i + strip_len < n {
                match self.slice.get(grid, i as usize) {
                    CellState::Empty => {
                        if self.slice.get(grid, (i - 1) as usize) == CellState::Crossed
                            && self.slice.get(grid, (i + strip_len) as usize) == CellState::Crossed
                        {
                            let (first, second) = self.colliding_segments(i, i + strip_len - 1);
                            if first != second {
                                let mut min_len = self.len(first);
                                for j in first..second {
                                    if min_len > self.len(j) {
                                        min_len = self.len(j);
                                    }
                                }
                                // a hole smaller than every candidate
                                // segment can never be filled
                                if min_len > strip_len {
                                    self.slice.set_segment(grid, i, i + strip_len, CellState::Crossed);
                                }
                            }
                        }
                    }
                    CellState::Solid => {
                        let (first, second) = self.colliding_segments(i, i + strip_len - 1);
                        if first != second && !(second - first == 1 && self.done[first]) {
                            let mut min_len = self.len(first);
                            let mut max_len = self.len(first);
                            for j in first..second {
                                if self.len(j) < min_len {
                                    min_len = self.len(j);
                                }
                                if self.len(j) > max_len {
                                    max_len = self.len(j);
                                }
                            }

                            // a crossed cell within min_len to the right
                            // bounds the strip there, so it extends left:
                            // "SSS  X" becomes "SSSS X" as needed
                            let mut j = i + strip_len;
                            while j < i + min_len && j < n {
                                match self.slice.get(grid, j as usize) {
                                    CellState::Solid => break,
                                    CellState::Empty => j += 1,
                                    CellState::Crossed => {
                                        if self.slice.set_segment(grid, j - min_len, i, CellState::Solid) > 0 {
                                            strip_len += i - (j - min_len);
                                            i = j - min_len;
                                        }
                                        break;
                                    }
                                }
                            }
                            // symmetric on the left: "X  SSS" appends
                            let mut j = i - 1;
                            while j >= i + strip_len - min_len && j >= 0 {
                                match self.slice.get(grid, j as usize) {
                                    CellState::Solid => break,
                                    CellState::Empty => j -= 1,
                                    CellState::Crossed => {
                                        if self.slice.set_segment(grid, i + strip_len, j + min_len + 1, CellState::Solid) > 0 {
                                            strip_len += j + min_len + 1 - (i + strip_len);
                                        }
                                        break;
                                    }
                                }
                            }
                            if max_len == strip_len {
                                // as long as the longest candidate; cap it
                                self.slice.set_segment(grid, i - 1, i, CellState::Crossed);
                                self.slice.set_segment(grid, i + strip_len, i + strip_len + 1, CellState::Crossed);
                            }
                        }
                    }
                    CellState::Crossed => {}
                }
            }
            i += strip_len;
        }
        true
    }

    // One full inference pass over this line: leftmost fit, rightmost fit
    // (the leftmost fit of the reversed slice), then segment and strip
    // propagation. Returns false on infeasibility; conflicting writes set
    // the grid's contradiction flag on the way through.
    pub fn infer(&mut self, grid: &mut Grid) -> bool {
        if self.num_segments() == 0 {
            self.slice.set_segment(grid, 0, self.slice.length() as isize, CellState::Crossed);
            return true;
        }

        if !Self::fit_leftmost(grid, self.slice, &self.len, &mut self.lb) {
            return false;
        }
        let len_reversed: Vec<usize> = self.len.iter().rev().cloned().collect();
        if !Self::fit_leftmost(grid, self.slice.reverse(), &len_reversed, &mut self.rb) {
            return false;
        }
        self.update_stats(grid);
        if !self.infer_segments(grid) {
            return false;
        }
        self.infer_strips(grid)
    }
}
