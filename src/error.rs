use crate::engine::Move;

/// Errors raised while building or populating a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("more colors ({colors}) than tubes ({tubes})")]
    TooManyColors { colors: usize, tubes: usize },

    #[error("too many pieces ({pieces}) for a capacity of {capacity}")]
    TooManyPieces { pieces: usize, capacity: usize },

    #[error("{tubes} tubes of height {height} are too large to fill")]
    TooLarge { tubes: usize, height: usize },

    #[error("fewer pieces ({pieces}) than colors ({colors})")]
    Degenerate { pieces: usize, colors: usize },

    #[error("tube {tube} holds {len} pieces but the tube height is {height}")]
    TubeOverflow {
        tube: usize,
        len: usize,
        height: usize,
    },

    #[error("unrecognized piece character '{ch}' in tube {tube}")]
    UnknownPiece { ch: char, tube: usize },
}

/// Errors raised when a move is applied or undone on a board that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("illegal move {0}")]
    Illegal(Move),

    #[error("move {0} cannot be reversed")]
    Irreversible(Move),
}

/// Errors raised by search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("no solution: the reachable state space was exhausted")]
    NoSolution,

    #[error("solution path already exhausted")]
    Exhausted,

    #[error("strategy has not been initialized")]
    NotInitialized,

    #[error("solution contains an illegal move: {0}")]
    IllegalMove(#[from] MoveError),
}

/// Errors raised while assembling a heuristic chain.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum HeuristicError {
    #[error("inflation factor must be finite and greater than 1, got {0}")]
    InvalidFactor(f64),
}

/// Errors raised when turning configuration into boards and strategies.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("board error: {0}")]
    Board(#[from] BoardError),

    #[error("heuristic error: {0}")]
    Heuristic(#[from] HeuristicError),
}
