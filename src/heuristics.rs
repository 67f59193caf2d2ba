//! Heuristic estimates of the number of moves left to solve a board.
//!
//! The base estimator is [`AdmissibleHeuristic`]. Two decorators wrap any other heuristic:
//! [`NonAdmissibleHeuristic`] inflates it by a constant factor and
//! [`FiniteHorizonHeuristic`] refines it with a bounded lookahead. Decorators own the
//! heuristic they wrap, so chains are plain values:
//!
//! ```
//! use tubesort_solver::engine::Board;
//! use tubesort_solver::heuristics::{
//!     AdmissibleHeuristic, FiniteHorizonHeuristic, Heuristic, NonAdmissibleHeuristic,
//! };
//!
//! let chain = FiniteHorizonHeuristic::new(
//!     NonAdmissibleHeuristic::new(AdmissibleHeuristic, 1.5).unwrap(),
//!     2,
//! );
//! assert_eq!(chain.estimate(&Board::new(3, 2)), 0.0);
//! ```
use crate::engine::{Board, Color};
use crate::error::HeuristicError;
use std::collections::HashMap;

/// Estimates the number of moves needed to reach a solved board.
///
/// Estimates are finite and non-negative, and zero on solved boards.
pub trait Heuristic {
    fn estimate(&self, board: &Board) -> f64;
}

impl<H: Heuristic + ?Sized> Heuristic for Box<H> {
    fn estimate(&self, board: &Board) -> f64 {
        (**self).estimate(board)
    }
}

/// Length of the bottom run of a tube: how many pieces, counted from the bottom, share the
/// bottom piece's color.
fn bottom_run(tube: &[Color]) -> usize {
    match tube.first() {
        Some(bottom) => tube.iter().take_while(|&c| c == bottom).count(),
        None => 0,
    }
}

/// A lower bound on the number of moves left.
///
/// The estimate counts pieces that must move at least once in any solution:
/// - every piece resting above the bottom run of its tube, since a solved tube holds a
///   single color and the first mismatching piece can only leave once everything above it
///   has left;
/// - for each color whose bottom runs sit in more tubes than that color can fill in a solved
///   board, the shortest of the surplus runs, which must be lifted out entirely.
///
/// The two sets of pieces are disjoint and every move relocates a single piece, so the
/// estimate never exceeds the optimal number of moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmissibleHeuristic;

impl Heuristic for AdmissibleHeuristic {
    fn estimate(&self, board: &Board) -> f64 {
        let height = board.tube_height();
        if height == 0 {
            return 0.0;
        }

        let mut buried = 0usize;
        let mut totals: HashMap<Color, usize> = HashMap::new();
        let mut runs: HashMap<Color, Vec<usize>> = HashMap::new();

        for tube in board.tubes() {
            let run = bottom_run(tube);
            buried += tube.len() - run;
            for &color in tube {
                *totals.entry(color).or_default() += 1;
            }
            if let Some(&bottom) = tube.first() {
                runs.entry(bottom).or_default().push(run);
            }
        }

        let surplus: usize = runs
            .into_iter()
            .map(|(color, mut lengths)| {
                let tubes_needed = totals[&color].div_ceil(height);
                let extra = lengths.len().saturating_sub(tubes_needed);
                lengths.sort_unstable();
                lengths.iter().take(extra).sum::<usize>()
            })
            .sum();

        (buried + surplus) as f64
    }
}

/// Scales a base heuristic by a constant factor greater than one.
///
/// The inflated estimate is no longer admissible: A* built on it favours states that look
/// close to the goal and may return longer solutions in exchange for fewer expansions.
#[derive(Debug, Clone)]
pub struct NonAdmissibleHeuristic<H> {
    base: H,
    factor: f64,
}

impl<H: Heuristic> NonAdmissibleHeuristic<H> {
    /// Wraps `base`, scaling its estimates by `factor`.
    ///
    /// Returns `Err(HeuristicError::InvalidFactor)` unless `factor` is finite and greater than 1.
    pub fn new(base: H, factor: f64) -> Result<Self, HeuristicError> {
        if !factor.is_finite() || factor <= 1.0 {
            return Err(HeuristicError::InvalidFactor(factor));
        }
        Ok(NonAdmissibleHeuristic { base, factor })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl<H: Heuristic> Heuristic for NonAdmissibleHeuristic<H> {
    fn estimate(&self, board: &Board) -> f64 {
        self.factor * self.base.estimate(board)
    }
}

/// Refines a base heuristic with a lookahead of at most `horizon` moves.
///
/// The estimate is the minimum, over all move sequences of length up to `horizon`, of the
/// sequence length plus the base estimate of the board it ends on. Sequences that reach a
/// solved board score their length alone; boards without legal moves fall back to the base
/// estimate. With an admissible base the result stays admissible. A horizon of 0 is the base
/// heuristic itself.
///
/// Evaluation costs up to `b^horizon` base estimates for branching factor `b`.
#[derive(Debug, Clone)]
pub struct FiniteHorizonHeuristic<H> {
    base: H,
    horizon: usize,
}

impl<H: Heuristic> FiniteHorizonHeuristic<H> {
    pub fn new(base: H, horizon: usize) -> Self {
        FiniteHorizonHeuristic { base, horizon }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    fn lookahead(&self, board: &Board, depth: usize) -> f64 {
        if board.is_goal() {
            return depth as f64;
        }
        if depth == self.horizon {
            return depth as f64 + self.base.estimate(board);
        }
        board
            .adjacent_states()
            .iter()
            .map(|next| self.lookahead(next, depth + 1))
            .reduce(f64::min)
            .unwrap_or_else(|| depth as f64 + self.base.estimate(board))
    }
}

impl<H: Heuristic> Heuristic for FiniteHorizonHeuristic<H> {
    fn estimate(&self, board: &Board) -> f64 {
        self.lookahead(board, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{BreadthFirstSearch, SearchStrategy};
    use crate::utils::board_from_str_array;
    use std::collections::VecDeque;

    /// Optimal number of moves to a solved board, for every solvable board reachable
    /// from `start`. Runs a breadth-first search backwards from the solved boards over the
    /// explicit reachable graph.
    fn distances_to_goal(start: &Board) -> Vec<(Board, usize)> {
        let mut index: HashMap<Board, usize> = HashMap::new();
        let mut boards = vec![start.clone()];
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new()];
        index.insert(start.clone(), 0);

        let mut i = 0;
        while i < boards.len() {
            for next in boards[i].adjacent_states() {
                let j = match index.get(&next) {
                    Some(&j) => j,
                    None => {
                        let j = boards.len();
                        index.insert(next.clone(), j);
                        boards.push(next);
                        predecessors.push(Vec::new());
                        j
                    }
                };
                predecessors[j].push(i);
            }
            i += 1;
        }

        let mut dist = vec![usize::MAX; boards.len()];
        let mut queue = VecDeque::new();
        for (k, board) in boards.iter().enumerate() {
            if board.is_goal() {
                dist[k] = 0;
                queue.push_back(k);
            }
        }
        while let Some(k) = queue.pop_front() {
            for &p in &predecessors[k] {
                if dist[p] == usize::MAX {
                    dist[p] = dist[k] + 1;
                    queue.push_back(p);
                }
            }
        }

        boards
            .into_iter()
            .zip(dist)
            .filter(|&(_, d)| d != usize::MAX)
            .collect()
    }

    #[test]
    fn test_bottom_run() {
        assert_eq!(bottom_run(&[]), 0);
        assert_eq!(bottom_run(&[3]), 1);
        assert_eq!(bottom_run(&[3, 3, 1, 3]), 2);
        assert_eq!(bottom_run(&[1, 2, 2]), 1);
    }

    #[test]
    fn test_admissible_zero_on_goal() {
        let b = board_from_str_array(&["00", "11", ""], 2).unwrap();
        assert_eq!(AdmissibleHeuristic.estimate(&b), 0.0);
    }

    #[test]
    fn test_admissible_counts_buried_pieces() {
        // Tube 0 has one piece above its bottom run; tube 1 has two.
        let b = board_from_str_array(&["001", "120", "", "2"], 3).unwrap();
        // Colors 0, 1, 2 each have one bottom run and need one tube: no surplus.
        assert_eq!(AdmissibleHeuristic.estimate(&b), 3.0);
    }

    #[test]
    fn test_admissible_counts_surplus_runs() {
        // Color 0 sits at the bottom of two tubes but fills only one.
        let b = board_from_str_array(&["00", "0", "1", "1"], 3).unwrap();
        // Shortest surplus run of color 0 is 1; color 1 also has a surplus run of 1.
        assert_eq!(AdmissibleHeuristic.estimate(&b), 2.0);
    }

    #[test]
    fn test_reference_distances_match_bfs() {
        let mut start = Board::new(4, 2);
        start.fill_random(3, 1).unwrap();
        let distances = distances_to_goal(&start);
        for (board, optimal) in distances.iter().step_by(25) {
            let mut bfs = BreadthFirstSearch::new();
            bfs.initialize(board).unwrap();
            assert_eq!(bfs.solution_len(), *optimal);
        }
    }

    #[test]
    fn test_admissible_never_overestimates() {
        for (tubes, height, colors) in [(3, 2, 2), (4, 2, 3), (4, 3, 2), (4, 3, 3)] {
            for seed in 0..3 {
                let mut start = Board::new(tubes, height);
                start.fill_random(colors, seed).unwrap();
                for (board, optimal) in distances_to_goal(&start) {
                    let estimate = AdmissibleHeuristic.estimate(&board);
                    assert!(
                        estimate <= optimal as f64,
                        "estimate {} exceeds optimal {} on\n{}",
                        estimate,
                        optimal,
                        board
                    );
                }
            }
        }
    }

    #[test]
    fn test_non_admissible_scales_base() {
        let b = board_from_str_array(&["001", "120", "", "2"], 3).unwrap();
        let h = NonAdmissibleHeuristic::new(AdmissibleHeuristic, 2.5).unwrap();
        assert_eq!(h.factor(), 2.5);
        assert_eq!(h.estimate(&b), 2.5 * AdmissibleHeuristic.estimate(&b));
    }

    #[test]
    fn test_non_admissible_rejects_bad_factor() {
        for factor in [1.0, 0.5, -2.0, f64::NAN, f64::INFINITY] {
            assert!(NonAdmissibleHeuristic::new(AdmissibleHeuristic, factor).is_err());
        }
    }

    #[test]
    fn test_finite_horizon_zero_is_base() {
        let mut b = Board::new(5, 3);
        b.fill_random(3, 11).unwrap();
        let h = FiniteHorizonHeuristic::new(AdmissibleHeuristic, 0);
        assert_eq!(h.horizon(), 0);
        assert_eq!(h.estimate(&b), AdmissibleHeuristic.estimate(&b));
    }

    #[test]
    fn test_finite_horizon_sees_close_goal() {
        // One move from solved, but the base only sees that color 0 is split.
        let b = board_from_str_array(&["0", "0", "11"], 2).unwrap();
        assert_eq!(AdmissibleHeuristic.estimate(&b), 1.0);
        let h = FiniteHorizonHeuristic::new(AdmissibleHeuristic, 3);
        assert_eq!(h.estimate(&b), 1.0);
    }

    #[test]
    fn test_finite_horizon_stays_admissible() {
        let h = FiniteHorizonHeuristic::new(AdmissibleHeuristic, 2);
        for seed in 0..3 {
            let mut start = Board::new(4, 2);
            start.fill_random(3, seed).unwrap();
            for (board, optimal) in distances_to_goal(&start) {
                assert!(h.estimate(&board) <= optimal as f64);
            }
        }
    }

    #[test]
    fn test_finite_horizon_does_not_modify_board() {
        let mut b = Board::new(4, 3);
        b.fill_random(3, 4).unwrap();
        let before = b.clone();
        let h = FiniteHorizonHeuristic::new(AdmissibleHeuristic, 3);
        let _ = h.estimate(&b);
        assert_eq!(b, before);
    }

    #[test]
    fn test_boxed_chain() {
        let b = board_from_str_array(&["01", "10", ""], 2).unwrap();
        let boxed: Box<dyn Heuristic> =
            Box::new(NonAdmissibleHeuristic::new(AdmissibleHeuristic, 2.0).unwrap());
        let chain = FiniteHorizonHeuristic::new(boxed, 0);
        assert_eq!(chain.estimate(&b), 2.0 * AdmissibleHeuristic.estimate(&b));
    }
}
