//! Team → side assignment for the Round of 32.
//!
//! Rows are candidate teams (ascending id), columns are the 32 sides
//! (`slot * 2 + side`). Weights are log-probabilities; higher is better.

use pathfinding::kuhn_munkres::kuhn_munkres;
use pathfinding::matrix::Matrix;

use super::policy::SolverPolicy;
use crate::round::TeamId;

/// Floor applied to zero probabilities before taking the log.
pub const PROBABILITY_FLOOR: f64 = 1e-10;

/// Fixed-point scale for log weights in the integer solver.
const LOG_SCALE: f64 = 1e6;

/// Dense `teams × sides` weight table.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    teams: Vec<TeamId>,
    sides: usize,
    log_weights: Vec<f64>,
    /// Secondary key: raw win counts.
    wins: Vec<u32>,
}

impl WeightMatrix {
    /// `teams` must be sorted ascending; row order is the id tie-break.
    pub fn new(teams: Vec<TeamId>, sides: usize) -> Self {
        let cells = teams.len() * sides;
        Self {
            teams,
            sides,
            log_weights: vec![PROBABILITY_FLOOR.ln(); cells],
            wins: vec![0; cells],
        }
    }

    pub fn rows(&self) -> usize {
        self.teams.len()
    }

    pub fn sides(&self) -> usize {
        self.sides
    }

    pub fn team(&self, row: usize) -> Option<TeamId> {
        self.teams.get(row).copied()
    }

    /// Store `ln(max(probability, floor))` for the cell.
    pub fn set(&mut self, row: usize, side: usize, probability: f64, wins: u32) {
        let i = row * self.sides + side;
        self.log_weights[i] = probability.max(PROBABILITY_FLOOR).ln();
        self.wins[i] = wins;
    }

    pub fn log_weight(&self, row: usize, side: usize) -> f64 {
        self.log_weights[row * self.sides + side]
    }

    pub fn wins(&self, row: usize, side: usize) -> u32 {
        self.wins[row * self.sides + side]
    }

    /// Distinct win counts in ascending order.
    pub(crate) fn distinct_wins(&self) -> Vec<u32> {
        let mut values = self.wins.clone();
        values.sort_unstable();
        values.dedup();
        values
    }
}

/// Row chosen for each side, `None` for sides left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub side_to_row: Vec<Option<usize>>,
}

impl Assignment {
    pub fn empty(sides: usize) -> Self {
        Self { side_to_row: vec![None; sides] }
    }

    pub fn team_at(&self, side: usize, matrix: &WeightMatrix) -> Option<TeamId> {
        self.side_to_row.get(side).copied().flatten().and_then(|row| matrix.team(row))
    }

    pub fn filled(&self) -> usize {
        self.side_to_row.iter().filter(|r| r.is_some()).count()
    }

    /// Sum of log weights over filled sides.
    pub fn total_log_weight(&self, matrix: &WeightMatrix) -> f64 {
        self.side_to_row
            .iter()
            .enumerate()
            .filter_map(|(side, row)| row.map(|r| matrix.log_weight(r, side)))
            .sum()
    }
}

pub trait AssignmentSolver {
    fn name(&self) -> &'static str;

    /// Each row used at most once; each side filled once while rows remain.
    fn solve(&self, matrix: &WeightMatrix) -> Assignment;
}

pub fn solver_for(policy: SolverPolicy) -> Box<dyn AssignmentSolver> {
    match policy {
        SolverPolicy::Optimal => Box::new(HungarianSolver),
        SolverPolicy::Greedy => Box::new(GreedySolver),
    }
}

// ============================================================================
// Hungarian
// ============================================================================

/// Maximum-weight assignment via Kuhn-Munkres on a padded square matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianSolver;

impl HungarianSolver {
    /// Integer weight with deterministic tie-breaks folded into the low
    /// digits: log weight, then win count, then lower row.
    ///
    /// Win counts enter as their dense rank among the matrix's distinct
    /// values. Each digit's scale exceeds the largest possible sum of the
    /// digits below it over a full assignment, so totals compare
    /// lexicographically.
    fn integer_weights(matrix: &WeightMatrix) -> impl Fn(usize, usize) -> i128 + '_ {
        let rows = matrix.rows() as i128;
        let picks = matrix.rows().min(matrix.sides()) as i128;
        let distinct = matrix.distinct_wins();
        let wins_scale = picks * rows + 1;
        let primary_scale = (picks * distinct.len() as i128 + 1) * wins_scale;
        let floor = PROBABILITY_FLOOR.ln();

        move |row, side| {
            let primary = ((matrix.log_weight(row, side) - floor) * LOG_SCALE).round().max(0.0) as i128;
            let wins_rank = distinct.binary_search(&matrix.wins(row, side)).unwrap_or(0) as i128;
            primary * primary_scale + wins_rank * wins_scale + (rows - row as i128)
        }
    }
}

impl AssignmentSolver for HungarianSolver {
    fn name(&self) -> &'static str {
        "hungarian"
    }

    fn solve(&self, matrix: &WeightMatrix) -> Assignment {
        let rows = matrix.rows();
        let sides = matrix.sides();
        if rows == 0 || sides == 0 {
            return Assignment::empty(sides);
        }

        let n = rows.max(sides);
        let weight = Self::integer_weights(matrix);
        // Padding rows/columns carry a constant zero weight.
        let weights = Matrix::from_fn(n, n, |(row, side)| {
            if row < rows && side < sides {
                weight(row, side)
            } else {
                0
            }
        });

        let (_, row_to_col) = kuhn_munkres(&weights);

        let mut assignment = Assignment::empty(sides);
        for (row, &side) in row_to_col.iter().enumerate() {
            if row < rows && side < sides {
                assignment.side_to_row[side] = Some(row);
            }
        }
        assignment
    }
}

// ============================================================================
// Greedy
// ============================================================================

/// Highest-weight-first allocation with a used-team bitmask.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver;

struct TeamMask {
    words: Vec<u64>,
}

impl TeamMask {
    fn new(rows: usize) -> Self {
        Self { words: vec![0; rows.div_ceil(64)] }
    }

    fn contains(&self, row: usize) -> bool {
        self.words[row / 64] & (1 << (row % 64)) != 0
    }

    fn insert(&mut self, row: usize) {
        self.words[row / 64] |= 1 << (row % 64);
    }
}

impl AssignmentSolver for GreedySolver {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn solve(&self, matrix: &WeightMatrix) -> Assignment {
        let rows = matrix.rows();
        let sides = matrix.sides();
        let mut assignment = Assignment::empty(sides);

        let mut cells: Vec<(usize, usize)> =
            (0..rows).flat_map(|r| (0..sides).map(move |s| (r, s))).collect();
        cells.sort_by(|&(ra, sa), &(rb, sb)| {
            matrix
                .log_weight(rb, sb)
                .total_cmp(&matrix.log_weight(ra, sa))
                .then(matrix.wins(rb, sb).cmp(&matrix.wins(ra, sa)))
                .then(ra.cmp(&rb))
                .then(sa.cmp(&sb))
        });

        let mut used = TeamMask::new(rows);
        let mut remaining = sides.min(rows);
        for (row, side) in cells {
            if remaining == 0 {
                break;
            }
            if used.contains(row) || assignment.side_to_row[side].is_some() {
                continue;
            }
            used.insert(row);
            assignment.side_to_row[side] = Some(row);
            remaining -= 1;
        }
        assignment
    }
}
