// vim: set ai et ts=4 sw=4 sts=4:
use std::fs;
use std::io;
use std::num::ParseIntError;
use serde::Deserialize;
use thiserror::Error;

use super::config::Config;
use super::solver::Solver;

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    ParseInt(#[from] ParseIntError),
}

// A nonogram puzzle as stored on disk: a JSON object whose "rows" and
// "cols" are arrays of strings, each string the whitespace-separated run
// lengths of that line. The grid is len(cols) wide and len(rows) high.
#[derive(Debug, Deserialize)]
pub struct PictureFile {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
}

impl PictureFile {
    pub fn load(path: &str) -> Result<PictureFile, PuzzleError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn row_runs(&self) -> Result<Vec<Vec<usize>>, PuzzleError> {
        self.rows.iter().map(|s| Self::_parse_runs(s)).collect()
    }

    pub fn col_runs(&self) -> Result<Vec<Vec<usize>>, PuzzleError> {
        self.cols.iter().map(|s| Self::_parse_runs(s)).collect()
    }

    // zero-length runs denote an empty line ("0" or "") and are dropped,
    // so the solver only ever sees positive segment lengths
    fn _parse_runs(input: &str) -> Result<Vec<usize>, PuzzleError> {
        let runs = input
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<usize>, _>>()?;
        Ok(runs.into_iter().filter(|&n| n > 0).collect())
    }
}

// The unit of work handed to the task queue: solve one puzzle file and
// describe the outcome in a single result string.
pub fn run_solver(path: &str, config: &Config, print: bool, emit_color: bool) -> String {
    match solve_file(path, config, print, emit_color) {
        Ok(line) => line,
        Err(e) => format!("{} error: {}", path, e),
    }
}

fn solve_file(path: &str, config: &Config, print: bool, emit_color: bool) -> Result<String, PuzzleError> {
    let picture = PictureFile::load(path)?;
    let rows = picture.row_runs()?;
    let cols = picture.col_runs()?;

    let mut solver = Solver::new(config, rows, cols);
    let solved = solver.solve();

    let mut out = format!(
        "{} {} {} {} {} {} {}",
        path,
        if solved { "solved" } else { "failed" },
        solver.grid.width,
        solver.grid.height,
        solver.stats.line_count,
        solver.stats.wrong_guesses,
        solver.stats.max_depth,
    );
    if print {
        out.push('\n');
        out.push_str(&solver.grid.render(emit_color));
    }
    Ok(out)
}
