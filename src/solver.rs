//! Search strategies and their shared plumbing.
//!
//! A [`SearchStrategy`] is driven in two steps: [`SearchStrategy::initialize`] runs the whole
//! search from an initial board and stores the resulting [`SolutionPath`], then
//! [`SearchStrategy::next_move`] hands the moves out one at a time. [`play_out`] wraps both
//! steps and checks that the moves really solve the board.
//!
//! This module holds the uninformed strategies: [`BreadthFirstSearch`],
//! [`DepthFirstSearch`] and [`IterativeDeepeningSearch`]. The heuristic-guided ones live in
//! [`crate::informed`].
use crate::engine::{Board, Move};
use crate::error::SearchError;
use log::{debug, trace};
use std::collections::{HashMap, HashSet, VecDeque};

/// Ordered moves leading from an initial board to a solved one, consumed front to back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolutionPath {
    moves: Vec<Move>,
    next: usize,
}

impl SolutionPath {
    pub fn new(moves: Vec<Move>) -> Self {
        SolutionPath { moves, next: 0 }
    }

    /// Number of moves not yet handed out.
    pub fn len(&self) -> usize {
        self.moves.len() - self.next
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The moves not yet handed out, in order.
    pub fn remaining(&self) -> &[Move] {
        &self.moves[self.next..]
    }

    /// Hands out the next move, or `None` once the path is drained.
    pub fn pop(&mut self) -> Option<Move> {
        let mv = *self.moves.get(self.next)?;
        self.next += 1;
        Some(mv)
    }
}

/// A graph-search algorithm that solves a board ahead of time and then replays its answer.
pub trait SearchStrategy {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Searches for a solution from `board`, replacing any previously stored one.
    ///
    /// Blocks until the search finishes. Returns `Err(SearchError::NoSolution)` when every
    /// reachable board was explored without reaching a solved one. The caller's board is
    /// never modified.
    fn initialize(&mut self, board: &Board) -> Result<(), SearchError>;

    /// The stored solution, or `None` before a successful [`SearchStrategy::initialize`].
    fn solution(&self) -> Option<&SolutionPath>;

    fn solution_mut(&mut self) -> Option<&mut SolutionPath>;

    /// Approximate bytes of boards stored in frontiers and visited sets over the lifetime
    /// of this strategy. Never decreases.
    ///
    /// Every copy of a board a strategy stores adds that board's [`Board::footprint`] once:
    /// a board kept both as a map key and in a frontier counts twice.
    fn memory_footprint(&self) -> usize;

    /// Returns the next move of the stored solution.
    ///
    /// Fails with `SearchError::NotInitialized` before a successful initialization, and with
    /// `SearchError::Exhausted` once every move has been handed out.
    fn next_move(&mut self) -> Result<Move, SearchError> {
        self.solution_mut()
            .ok_or(SearchError::NotInitialized)?
            .pop()
            .ok_or(SearchError::Exhausted)
    }

    /// Number of moves left in the stored solution.
    fn solution_len(&self) -> usize {
        self.solution().map_or(0, SolutionPath::len)
    }
}

/// Initializes `strategy` on `board` and replays its moves on a private copy of the board.
///
/// # Returns
/// * `Ok((board, moves))` with the solved board and the number of moves played.
/// * `Err(SearchError::IllegalMove)` if the strategy hands out a move that is illegal on the
///   replayed board, or any error raised by initialization or by draining the solution.
///
/// # Examples
/// ```
/// use tubesort_solver::engine::Board;
/// use tubesort_solver::solver::{play_out, BreadthFirstSearch};
///
/// let mut board = Board::new(3, 2);
/// board.fill_random(2, 5).unwrap();
/// let (solved, _moves) = play_out(&mut BreadthFirstSearch::new(), &board).unwrap();
/// assert!(solved.is_goal());
/// ```
pub fn play_out<S: SearchStrategy + ?Sized>(
    strategy: &mut S,
    board: &Board,
) -> Result<(Board, usize), SearchError> {
    strategy.initialize(board)?;
    let mut current = board.clone();
    let mut moves = 0;
    while !current.is_goal() {
        let mv = strategy.next_move()?;
        current.apply_move(mv)?;
        moves += 1;
    }
    Ok((current, moves))
}

/// Rebuilds the path to `goal` by undoing, one at a time, the move that discovered each board.
///
/// `discovered_by` returns `None` for the initial board.
pub(crate) fn reconstruct<F>(goal: Board, discovered_by: F) -> Result<SolutionPath, SearchError>
where
    F: Fn(&Board) -> Option<Move>,
{
    let mut moves = Vec::new();
    let mut board = goal;
    while let Some(mv) = discovered_by(&board) {
        board.reverse_move(mv)?;
        moves.push(mv);
    }
    moves.reverse();
    Ok(SolutionPath::new(moves))
}

/// One level of an explicit depth-first stack: the moves to try and how far we got.
pub(crate) struct Frame {
    moves: Vec<Move>,
    cursor: usize,
}

impl Frame {
    pub(crate) fn new(moves: Vec<Move>) -> Self {
        Frame { moves, cursor: 0 }
    }

    pub(crate) fn advance(&mut self) -> Option<Move> {
        let mv = *self.moves.get(self.cursor)?;
        self.cursor += 1;
        Some(mv)
    }
}

/// Depth-first search over an explicit stack with a global visited set.
///
/// `order` lists, for a board, the moves to try and in which order. The walk keeps a single
/// board, applying moves on the way down and reversing them when backtracking. Every board
/// inserted into the visited set adds its footprint to `memory`.
pub(crate) fn depth_first<F>(
    start: &Board,
    mut order: F,
    memory: &mut usize,
) -> Result<Vec<Move>, SearchError>
where
    F: FnMut(&Board) -> Vec<Move>,
{
    let mut current = start.clone();
    let mut visited = HashSet::new();
    let mut path = Vec::new();

    *memory += current.footprint();
    visited.insert(current.clone());
    if current.is_goal() {
        return Ok(path);
    }

    let mut frames = vec![Frame::new(order(&current))];
    while let Some(frame) = frames.last_mut() {
        let Some(mv) = frame.advance() else {
            frames.pop();
            if let Some(mv) = path.pop() {
                current.reverse_move(mv)?;
            }
            continue;
        };

        current.apply_move(mv)?;
        if visited.contains(&current) {
            current.reverse_move(mv)?;
            continue;
        }
        *memory += current.footprint();
        visited.insert(current.clone());
        path.push(mv);
        trace!("descend {} to depth {}", mv, path.len());

        if current.is_goal() {
            debug!("depth-first: goal at depth {} after visiting {} boards", path.len(), visited.len());
            return Ok(path);
        }
        frames.push(Frame::new(order(&current)));
    }

    debug!("depth-first: exhausted {} boards", visited.len());
    Err(SearchError::NoSolution)
}

/// Breadth-first search.
///
/// Expands boards in FIFO order and remembers, for every discovered board, the move that
/// first reached it. All moves cost the same, so the solution has the minimum number of
/// moves. The set of discovered boards is never pruned.
#[derive(Debug, Default)]
pub struct BreadthFirstSearch {
    solution: Option<SolutionPath>,
    memory: usize,
}

impl BreadthFirstSearch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchStrategy for BreadthFirstSearch {
    fn name(&self) -> &'static str {
        "bfs"
    }

    fn initialize(&mut self, board: &Board) -> Result<(), SearchError> {
        self.solution = None;

        let mut discovered: HashMap<Board, Option<Move>> = HashMap::new();
        let mut frontier = VecDeque::new();
        self.memory += 2 * board.footprint();
        discovered.insert(board.clone(), None);
        frontier.push_back(board.clone());

        let mut expanded = 0usize;
        while let Some(current) = frontier.pop_front() {
            if current.is_goal() {
                debug!("bfs: goal found after expanding {} boards", expanded);
                let path = reconstruct(current, |b| discovered.get(b).copied().flatten())?;
                self.solution = Some(path);
                return Ok(());
            }
            expanded += 1;

            for (mv, next) in current.successors() {
                if discovered.contains_key(&next) {
                    continue;
                }
                self.memory += 2 * next.footprint();
                discovered.insert(next.clone(), Some(mv));
                frontier.push_back(next);
            }
        }

        debug!("bfs: exhausted {} boards", discovered.len());
        Err(SearchError::NoSolution)
    }

    fn solution(&self) -> Option<&SolutionPath> {
        self.solution.as_ref()
    }

    fn solution_mut(&mut self) -> Option<&mut SolutionPath> {
        self.solution.as_mut()
    }

    fn memory_footprint(&self) -> usize {
        self.memory
    }
}

/// Depth-first search in [`Board::all_moves`] order.
///
/// Finds some solution, usually far from the shortest one. Cycle checking is not limited to
/// the boards on the current path: the visited set spans the whole run, so a board first
/// reached in an abandoned branch is never entered again from another one. Each board is
/// expanded at most once and the walk terminates on every board.
#[derive(Debug, Default)]
pub struct DepthFirstSearch {
    solution: Option<SolutionPath>,
    memory: usize,
}

impl DepthFirstSearch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchStrategy for DepthFirstSearch {
    fn name(&self) -> &'static str {
        "dfs"
    }

    fn initialize(&mut self, board: &Board) -> Result<(), SearchError> {
        self.solution = None;
        let moves = depth_first(board, Board::all_moves, &mut self.memory)?;
        self.solution = Some(SolutionPath::new(moves));
        Ok(())
    }

    fn solution(&self) -> Option<&SolutionPath> {
        self.solution.as_ref()
    }

    fn solution_mut(&mut self) -> Option<&mut SolutionPath> {
        self.solution.as_mut()
    }

    fn memory_footprint(&self) -> usize {
        self.memory
    }
}

enum Deepening {
    Found(Vec<Move>),
    /// No solved board within the limit; carries how many distinct boards were reached.
    Covered(usize),
}

/// Iterative-deepening depth-first search.
///
/// Runs depth-limited searches with limits 0, 1, 2, ... without any frontier queue. Within
/// one iteration a table records the shallowest depth at which each board was reached, and
/// a board is only explored again when reached by a strictly shorter path; the table is
/// dropped between iterations. The first limit that reaches a solved board gives a solution
/// with the minimum number of moves, matching [`BreadthFirstSearch`]. When an iteration
/// reaches no more boards than the previous one, the reachable space is covered and the
/// search fails.
#[derive(Debug, Default)]
pub struct IterativeDeepeningSearch {
    solution: Option<SolutionPath>,
    memory: usize,
}

impl IterativeDeepeningSearch {
    pub fn new() -> Self {
        Self::default()
    }

    fn depth_limited(&mut self, start: &Board, limit: usize) -> Result<Deepening, SearchError> {
        let mut current = start.clone();
        let mut reached: HashMap<Board, usize> = HashMap::new();
        self.memory += current.footprint();
        reached.insert(current.clone(), 0);
        if current.is_goal() {
            return Ok(Deepening::Found(Vec::new()));
        }

        let mut path: Vec<Move> = Vec::new();
        let mut frames = Vec::new();
        if limit > 0 {
            frames.push(Frame::new(current.all_moves()));
        }
        while let Some(frame) = frames.last_mut() {
            let Some(mv) = frame.advance() else {
                frames.pop();
                if let Some(mv) = path.pop() {
                    current.reverse_move(mv)?;
                }
                continue;
            };

            current.apply_move(mv)?;
            let depth = path.len() + 1;
            match reached.get(&current) {
                Some(&seen) if seen <= depth => {
                    current.reverse_move(mv)?;
                    continue;
                }
                Some(_) => {}
                None => self.memory += current.footprint(),
            }
            reached.insert(current.clone(), depth);
            path.push(mv);

            if current.is_goal() {
                return Ok(Deepening::Found(path));
            }
            if depth < limit {
                frames.push(Frame::new(current.all_moves()));
            } else {
                path.pop();
                current.reverse_move(mv)?;
            }
        }

        Ok(Deepening::Covered(reached.len()))
    }
}

impl SearchStrategy for IterativeDeepeningSearch {
    fn name(&self) -> &'static str {
        "iterative-deepening"
    }

    fn initialize(&mut self, board: &Board) -> Result<(), SearchError> {
        self.solution = None;
        let mut limit = 0;
        let mut covered = 0;
        loop {
            match self.depth_limited(board, limit)? {
                Deepening::Found(moves) => {
                    debug!("iterative deepening: solved with depth limit {}", limit);
                    self.solution = Some(SolutionPath::new(moves));
                    return Ok(());
                }
                Deepening::Covered(reached) if reached == covered => {
                    debug!("iterative deepening: exhausted {} boards", reached);
                    return Err(SearchError::NoSolution);
                }
                Deepening::Covered(reached) => {
                    debug!("iterative deepening: depth limit {} reached {} boards", limit, reached);
                    covered = reached;
                    limit += 1;
                }
            }
        }
    }

    fn solution(&self) -> Option<&SolutionPath> {
        self.solution.as_ref()
    }

    fn solution_mut(&mut self) -> Option<&mut SolutionPath> {
        self.solution.as_mut()
    }

    fn memory_footprint(&self) -> usize {
        self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;

    fn uninformed() -> Vec<Box<dyn SearchStrategy>> {
        vec![
            Box::new(BreadthFirstSearch::new()),
            Box::new(DepthFirstSearch::new()),
            Box::new(IterativeDeepeningSearch::new()),
        ]
    }

    fn generated(tubes: usize, height: usize, colors: usize, seed: u64) -> Board {
        let mut board = Board::new(tubes, height);
        board.fill_random(colors, seed).unwrap();
        board
    }

    #[test]
    fn test_solution_path_pop() {
        let mut path = SolutionPath::new(vec![Move::new(0, 1), Move::new(2, 0)]);
        assert_eq!(path.len(), 2);
        assert_eq!(path.pop(), Some(Move::new(0, 1)));
        assert_eq!(path.remaining(), &[Move::new(2, 0)]);
        assert_eq!(path.pop(), Some(Move::new(2, 0)));
        assert!(path.is_empty());
        assert_eq!(path.pop(), None);
    }

    #[test]
    fn test_already_solved_board_gives_empty_path() {
        let board = board_from_str_array(&["00", "11", ""], 2).unwrap();
        for mut strategy in uninformed() {
            strategy.initialize(&board).unwrap();
            assert_eq!(strategy.solution_len(), 0, "{}", strategy.name());
            assert_eq!(strategy.next_move(), Err(SearchError::Exhausted));
        }
    }

    #[test]
    fn test_next_move_before_initialize() {
        for mut strategy in uninformed() {
            assert_eq!(strategy.next_move(), Err(SearchError::NotInitialized));
        }
    }

    #[test]
    fn test_next_move_after_exhaustion() {
        let board = board_from_str_array(&["0", "0", "11"], 2).unwrap();
        let mut bfs = BreadthFirstSearch::new();
        bfs.initialize(&board).unwrap();
        assert_eq!(bfs.next_move(), Ok(Move::new(0, 1)));
        assert_eq!(bfs.next_move(), Err(SearchError::Exhausted));
        assert_eq!(bfs.next_move(), Err(SearchError::Exhausted));
    }

    #[test]
    fn test_bfs_scenario_three_tubes() {
        let board = generated(3, 2, 2, 0);
        assert_eq!(board.tubes(), &[vec![0, 1], vec![0, 1], vec![]]);

        let mut bfs = BreadthFirstSearch::new();
        bfs.initialize(&board).unwrap();
        assert_eq!(
            bfs.solution().unwrap().remaining(),
            &[Move::new(0, 2), Move::new(1, 2), Move::new(0, 1)]
        );

        let (solved, moves) = play_out(&mut bfs, &board).unwrap();
        assert!(solved.is_goal());
        assert_eq!(moves, 3);
        assert_eq!(solved.tubes(), &[vec![], vec![0, 0], vec![1, 1]]);
    }

    #[test]
    fn test_bfs_finds_shortest_path() {
        // Only (0, 1) is legal at first. Afterwards (0, 2) and (2, 0) both finish the
        // puzzle and (0, 2) is enumerated first.
        let board = board_from_str_array(&["10", "0", "1"], 2).unwrap();
        let mut bfs = BreadthFirstSearch::new();
        bfs.initialize(&board).unwrap();
        assert_eq!(
            bfs.solution().unwrap().remaining(),
            &[Move::new(0, 1), Move::new(0, 2)]
        );
    }

    #[test]
    fn test_bfs_prefers_enumeration_order_on_ties() {
        // Either 0 can join the other; (0, 1) comes first.
        let board = board_from_str_array(&["0", "0", "11"], 2).unwrap();
        let mut bfs = BreadthFirstSearch::new();
        bfs.initialize(&board).unwrap();
        assert_eq!(bfs.solution().unwrap().remaining(), &[Move::new(0, 1)]);
    }

    #[test]
    fn test_bfs_and_ids_agree_on_length() {
        for seed in 0..6 {
            let board = generated(4, 2, 3, seed);
            let mut bfs = BreadthFirstSearch::new();
            let mut ids = IterativeDeepeningSearch::new();
            match bfs.initialize(&board) {
                Ok(()) => {
                    ids.initialize(&board).unwrap();
                    assert_eq!(bfs.solution_len(), ids.solution_len(), "seed {}", seed);
                }
                Err(e) => {
                    assert_eq!(e, SearchError::NoSolution);
                    assert_eq!(ids.initialize(&board), Err(SearchError::NoSolution));
                }
            }
        }
    }

    #[test]
    fn test_dfs_solution_is_valid_but_not_shorter() {
        for seed in 0..6 {
            let board = generated(4, 3, 2, seed);
            let mut bfs = BreadthFirstSearch::new();
            let mut dfs = DepthFirstSearch::new();
            let Ok((_, optimal)) = play_out(&mut bfs, &board) else {
                continue;
            };
            let (solved, moves) = play_out(&mut dfs, &board).unwrap();
            assert!(solved.is_goal());
            assert!(moves >= optimal);
        }
    }

    #[test]
    fn test_dfs_follows_enumeration_order() {
        let board = generated(4, 2, 3, 0);
        assert_eq!(board.tubes(), &[vec![0, 1], vec![], vec![0, 2], vec![1, 2]]);
        let mut dfs = DepthFirstSearch::new();
        dfs.initialize(&board).unwrap();
        let moves = dfs.solution().unwrap().remaining().to_vec();
        assert_eq!(
            moves,
            vec![Move::new(2, 1), Move::new(3, 1), Move::new(0, 3), Move::new(0, 2)]
        );

        // No board is entered twice along the path.
        let mut seen = HashSet::new();
        let mut current = board.clone();
        seen.insert(current.clone());
        for mv in moves {
            current.apply_move(mv).unwrap();
            assert!(seen.insert(current.clone()), "{} revisits a board", mv);
        }
        assert!(current.is_goal());
    }

    #[test]
    fn test_unsolvable_board_reports_no_solution() {
        // One piece of each color can never fill a tube of height 2.
        let board = board_from_str_array(&["0", "1", ""], 2).unwrap();
        for mut strategy in uninformed() {
            assert_eq!(
                strategy.initialize(&board),
                Err(SearchError::NoSolution),
                "{}",
                strategy.name()
            );
            assert_eq!(strategy.next_move(), Err(SearchError::NotInitialized));
        }

        // No legal move at all.
        let stuck = board_from_str_array(&["01", "10"], 2).unwrap();
        for mut strategy in uninformed() {
            assert_eq!(strategy.initialize(&stuck), Err(SearchError::NoSolution));
        }
    }

    #[test]
    fn test_initialize_does_not_modify_board() {
        let board = generated(4, 2, 3, 3);
        let copy = board.clone();
        for mut strategy in uninformed() {
            let _ = strategy.initialize(&board);
            assert_eq!(board, copy);
        }
    }

    #[test]
    fn test_reinitialize_replaces_solution() {
        let board = generated(3, 2, 2, 9);
        let solved = board_from_str_array(&["00", "11", ""], 2).unwrap();
        let mut bfs = BreadthFirstSearch::new();
        bfs.initialize(&board).unwrap();
        bfs.initialize(&solved).unwrap();
        assert_eq!(bfs.solution_len(), 0);
    }

    #[test]
    fn test_memory_footprint_is_monotone() {
        let board = generated(4, 2, 3, 4);
        for mut strategy in uninformed() {
            let before = strategy.memory_footprint();
            let _ = strategy.initialize(&board);
            let after_first = strategy.memory_footprint();
            assert!(after_first > before, "{}", strategy.name());
            let _ = strategy.initialize(&board);
            assert!(strategy.memory_footprint() >= after_first);
        }
    }

    #[test]
    fn test_play_out_detects_illegal_move() {
        struct Liar(Option<SolutionPath>);

        impl SearchStrategy for Liar {
            fn name(&self) -> &'static str {
                "liar"
            }
            fn initialize(&mut self, _board: &Board) -> Result<(), SearchError> {
                self.0 = Some(SolutionPath::new(vec![Move::new(1, 0)]));
                Ok(())
            }
            fn solution(&self) -> Option<&SolutionPath> {
                self.0.as_ref()
            }
            fn solution_mut(&mut self) -> Option<&mut SolutionPath> {
                self.0.as_mut()
            }
            fn memory_footprint(&self) -> usize {
                0
            }
        }

        let board = board_from_str_array(&["0", "1", "01"], 2).unwrap();
        let result = play_out(&mut Liar(None), &board);
        assert!(matches!(result, Err(SearchError::IllegalMove(_))));
    }
}
