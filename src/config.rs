// vim: set ai et ts=4 sw=4 sts=4:
use std::fs;
use std::io;
use serde::Deserialize;
use thiserror::Error;

use super::line::LineStats;
use super::net::{Net, NetError};

pub const EDGE_SCORE_LEN: usize = 5; // special treatment of edge cells
pub const GRID_HALF_EDGE: usize = 2; // net input window radius (5x5)
pub const GRID_SIZE: usize = (2 * GRID_HALF_EDGE + 1) * (2 * GRID_HALF_EDGE + 1);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("edgeScore must hold exactly {expected} entries, got {0}", expected = EDGE_SCORE_LEN)]
    EdgeScoreLength(usize),

    #[error("the scoring net must produce 2 outputs, got {0}")]
    NetOutput(usize),

    #[error(transparent)]
    Net(#[from] NetError),
}

// the on-disk shape; field names match the JSON schema
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    wiggle_room:   f64,
    num_segments:  f64,
    done_segments: f64,
    num_changes:   f64,
    row_coef:      f64,
    col_coef:      f64,
    edge_score:    Vec<f64>,
    coef:          Vec<Vec<f64>>,
    max_lines:     u32,
}

#[derive(Debug)]
pub struct Config {
    // weights of the dirty-line priority score
    pub wiggle_room:   f64,
    pub num_segments:  f64,
    pub done_segments: f64,
    pub num_changes:   f64,

    // weights for scoring a guess candidate at (x, y)
    pub row_coef:   f64,
    pub col_coef:   f64,
    pub edge_score: [f64; EDGE_SCORE_LEN],
    pub net:        Net,

    pub max_lines: u32, // line inferences to attempt before giving up
}

impl Config {
    pub fn load(path: &str) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        Config::from_json(&content)
    }

    pub fn from_json(text: &str) -> Result<Config, ConfigError> {
        let raw: RawConfig = serde_json::from_str(text)?;
        if raw.edge_score.len() != EDGE_SCORE_LEN {
            return Err(ConfigError::EdgeScoreLength(raw.edge_score.len()));
        }
        let net = Net::new(&raw.coef, GRID_SIZE)?;
        if net.dim_out() != 2 {
            return Err(ConfigError::NetOutput(net.dim_out()));
        }

        let mut edge_score = [0.0; EDGE_SCORE_LEN];
        edge_score.copy_from_slice(&raw.edge_score);

        Ok(Config {
            wiggle_room:   raw.wiggle_room,
            num_segments:  raw.num_segments,
            done_segments: raw.done_segments,
            num_changes:   raw.num_changes,
            row_coef:      raw.row_coef,
            col_coef:      raw.col_coef,
            edge_score,
            net,
            max_lines: raw.max_lines,
        })
    }

    pub fn line_score(&self, s: &LineStats) -> f64 {
        self.wiggle_room * s.wiggle_room as f64
            + self.num_segments * s.num_segments as f64
            + self.done_segments * s.done_segments as f64
            + self.num_changes * s.num_changes as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_json(edge_score: &str, coef: &str) -> String {
        format!(
            r#"{{
                "wiggleRoom": -1.0,
                "numSegments": 0.5,
                "doneSegments": -0.25,
                "numChanges": 2.0,
                "rowCoef": 1.0,
                "colCoef": 1.0,
                "edgeScore": {},
                "coef": {},
                "maxLines": 5000
            }}"#,
            edge_score, coef
        )
    }

    fn zero_net_coef() -> String {
        // single layer straight from the 25-cell window to the 2 logits
        format!("[{:?}]", vec![0.0; (1 + GRID_SIZE) * 2])
    }

    #[test]
    fn valid_config_parses() {
        let c = Config::from_json(&config_json("[5.0, 2.0, 1.0, 0.5, 0.25]", &zero_net_coef())).unwrap();
        assert_eq!(c.max_lines, 5000);
        assert_eq!(c.edge_score[0], 5.0);
        assert_eq!(c.net.dim_in(), GRID_SIZE);
        assert_eq!(c.net.dim_out(), 2);
    }

    #[test]
    fn edge_score_length_is_checked() {
        let err = Config::from_json(&config_json("[1.0, 2.0]", &zero_net_coef())).unwrap_err();
        assert!(matches!(err, ConfigError::EdgeScoreLength(2)));
    }

    #[test]
    fn net_output_dimension_is_checked() {
        // 25 -> 3 is not a valid scoring net
        let coef = format!("[{:?}]", vec![0.0; (1 + GRID_SIZE) * 3]);
        let err = Config::from_json(&config_json("[0.0, 0.0, 0.0, 0.0, 0.0]", &coef)).unwrap_err();
        assert!(matches!(err, ConfigError::NetOutput(3)));
    }

    #[test]
    fn bad_coefficient_vector_is_rejected() {
        let err = Config::from_json(&config_json("[0.0, 0.0, 0.0, 0.0, 0.0]", "[[1.0, 2.0, 3.0]]")).unwrap_err();
        assert!(matches!(err, ConfigError::Net(_)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(Config::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn line_score_is_the_weighted_sum() {
        let c = Config::from_json(&config_json("[0.0, 0.0, 0.0, 0.0, 0.0]", &zero_net_coef())).unwrap();
        let s = LineStats { wiggle_room: 3, num_segments: 2, done_segments: 1, num_changes: 4 };
        assert_eq!(c.line_score(&s), -3.0 + 1.0 - 0.25 + 8.0);
    }
}
