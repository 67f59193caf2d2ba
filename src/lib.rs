//! # Tube Sort Solver Library
//!
//! This library models the tube-sorting puzzle, where colored pieces are stacked in tubes of
//! equal height and moved one at a time until every tube is empty or full of a single color,
//! and solves it with a family of search strategies.
//!
//! It is used by two binaries:
//! - `ai_solver`: Generates or reads a board, solves it with the chosen strategy and prints
//!   the moves.
//! - `benchmark`: Solves a batch of generated boards and prints one CSV line per board with
//!   the solution length, memory footprint and running time.
//!
//! ## Modules
//! - `engine`: The board representation (`Board`), moves (`Move`), move legality, seeded
//!   board generation and the goal test.
//! - `solver`: The `SearchStrategy` trait, `SolutionPath`, and the uninformed strategies:
//!   breadth-first, depth-first and iterative deepening.
//! - `informed`: Heuristic-guided strategies: greedy best-first, depth-first greedy and A*.
//! - `heuristics`: The `Heuristic` trait, the admissible estimate and its decorators.
//! - `config`: Board and solver configuration shared by the binaries.
//! - `error`: Error types for every fallible operation.
//! - `utils`: Parsing and rendering boards as text.

pub mod config;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod informed;
pub mod solver;
pub mod utils;
