//! Configuration for generating boards and assembling search strategies.
//!
//! Both structs derive [`clap::Args`] so the binaries can flatten them into their command
//! lines, and both implement [`Default`] for library callers.
use crate::engine::Board;
use crate::error::{BoardError, ConfigError, HeuristicError};
use crate::heuristics::{
    AdmissibleHeuristic, FiniteHorizonHeuristic, Heuristic, NonAdmissibleHeuristic,
};
use crate::informed::{AstarSearch, DepthFirstGreedySearch, GreedySearch};
use crate::solver::{
    BreadthFirstSearch, DepthFirstSearch, IterativeDeepeningSearch, SearchStrategy,
};
use clap::{Args, ValueEnum};

/// Inflation factor used by [`HeuristicKind::NonAdmissible`] when none is given.
pub const DEFAULT_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StrategyKind {
    #[default]
    Bfs,
    Dfs,
    IterativeDeepening,
    Greedy,
    DfsGreedy,
    Astar,
}

impl StrategyKind {
    /// Whether the strategy is guided by a heuristic.
    pub fn is_informed(self) -> bool {
        matches!(
            self,
            StrategyKind::Greedy | StrategyKind::DfsGreedy | StrategyKind::Astar
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HeuristicKind {
    #[default]
    Admissible,
    NonAdmissible,
    FiniteHorizon,
}

/// A board generated by [`Board::fill_random`].
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct BoardConfig {
    /// Number of tubes
    #[arg(long, default_value_t = 5)]
    pub tubes: usize,

    /// Capacity of every tube
    #[arg(long, default_value_t = 4)]
    pub height: usize,

    /// Number of distinct piece colors
    #[arg(long, default_value_t = 3)]
    pub colors: usize,

    /// Seed for the board generator
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            tubes: 5,
            height: 4,
            colors: 3,
            seed: 0,
        }
    }
}

impl BoardConfig {
    pub fn build(&self) -> Result<Board, BoardError> {
        let mut board = Board::new(self.tubes, self.height);
        board.fill_random(self.colors, self.seed)?;
        Ok(board)
    }
}

/// A search strategy and, for informed strategies, the heuristic chain guiding it.
///
/// The chain always starts from [`AdmissibleHeuristic`]:
/// - `admissible` uses it as is;
/// - `non-admissible` inflates it by `factor` (or [`DEFAULT_FACTOR`]);
/// - `finite-horizon` looks `horizon` moves ahead over it, inflated first when `factor` is set.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct SolverConfig {
    /// Search strategy
    #[arg(long, value_enum, default_value_t = StrategyKind::Bfs)]
    pub strategy: StrategyKind,

    /// Heuristic used by informed strategies
    #[arg(long, value_enum, default_value_t = HeuristicKind::Admissible)]
    pub heuristic: HeuristicKind,

    /// Inflation factor for the non-admissible heuristic, greater than 1
    #[arg(long)]
    pub factor: Option<f64>,

    /// Lookahead depth for the finite-horizon heuristic
    #[arg(long, default_value_t = 1)]
    pub horizon: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Bfs,
            heuristic: HeuristicKind::Admissible,
            factor: None,
            horizon: 1,
        }
    }
}

impl SolverConfig {
    pub fn build_heuristic(&self) -> Result<Box<dyn Heuristic>, HeuristicError> {
        let heuristic: Box<dyn Heuristic> = match (self.heuristic, self.factor) {
            (HeuristicKind::Admissible, _) => Box::new(AdmissibleHeuristic),
            (HeuristicKind::NonAdmissible, factor) => Box::new(NonAdmissibleHeuristic::new(
                AdmissibleHeuristic,
                factor.unwrap_or(DEFAULT_FACTOR),
            )?),
            (HeuristicKind::FiniteHorizon, None) => Box::new(FiniteHorizonHeuristic::new(
                AdmissibleHeuristic,
                self.horizon,
            )),
            (HeuristicKind::FiniteHorizon, Some(factor)) => Box::new(FiniteHorizonHeuristic::new(
                NonAdmissibleHeuristic::new(AdmissibleHeuristic, factor)?,
                self.horizon,
            )),
        };
        Ok(heuristic)
    }

    /// Assembles the configured strategy. Uninformed strategies ignore the heuristic settings.
    pub fn build(&self) -> Result<Box<dyn SearchStrategy>, ConfigError> {
        let strategy: Box<dyn SearchStrategy> = match self.strategy {
            StrategyKind::Bfs => Box::new(BreadthFirstSearch::new()),
            StrategyKind::Dfs => Box::new(DepthFirstSearch::new()),
            StrategyKind::IterativeDeepening => Box::new(IterativeDeepeningSearch::new()),
            StrategyKind::Greedy => Box::new(GreedySearch::new(self.build_heuristic()?)),
            StrategyKind::DfsGreedy => Box::new(DepthFirstGreedySearch::new(self.build_heuristic()?)),
            StrategyKind::Astar => Box::new(AstarSearch::new(self.build_heuristic()?)),
        };
        Ok(strategy)
    }
}
