//! Heuristic-guided search strategies.
//!
//! Each strategy owns the [`Heuristic`] it is built with. Ties between equally promising
//! boards go to the one generated first, which follows [`Board::all_moves`] order.
use crate::engine::{Board, Move};
use crate::error::SearchError;
use crate::heuristics::Heuristic;
use crate::solver::{depth_first, reconstruct, SearchStrategy, SolutionPath};
use log::debug;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// A frontier entry. The heap pops the lowest priority first, then the oldest entry.
struct Node {
    priority: f64,
    serial: u64,
    cost: usize,
    board: Board,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.serial.cmp(&self.serial))
    }
}

/// Min-priority frontier with insertion-order tie-breaking.
#[derive(Default)]
struct Frontier {
    heap: BinaryHeap<Node>,
    serial: u64,
}

impl Frontier {
    fn push(&mut self, priority: f64, cost: usize, board: Board) {
        self.heap.push(Node {
            priority,
            serial: self.serial,
            cost,
            board,
        });
        self.serial += 1;
    }

    fn pop(&mut self) -> Option<Node> {
        self.heap.pop()
    }
}

/// Greedy best-first search.
///
/// Always expands the frontier board with the lowest heuristic estimate, ignoring how many
/// moves it took to get there. Every discovered board is remembered so none is expanded
/// twice. Fast on most boards, with no guarantee on solution length.
pub struct GreedySearch<H> {
    heuristic: H,
    solution: Option<SolutionPath>,
    memory: usize,
}

impl<H: Heuristic> GreedySearch<H> {
    pub fn new(heuristic: H) -> Self {
        GreedySearch {
            heuristic,
            solution: None,
            memory: 0,
        }
    }
}

impl<H: Heuristic> SearchStrategy for GreedySearch<H> {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn initialize(&mut self, board: &Board) -> Result<(), SearchError> {
        self.solution = None;

        let mut discovered: HashMap<Board, Option<Move>> = HashMap::new();
        let mut frontier = Frontier::default();
        self.memory += 2 * board.footprint();
        discovered.insert(board.clone(), None);
        frontier.push(self.heuristic.estimate(board), 0, board.clone());

        let mut expanded = 0usize;
        while let Some(node) = frontier.pop() {
            if node.board.is_goal() {
                debug!("greedy: goal found after expanding {} boards", expanded);
                let path = reconstruct(node.board, |b| discovered.get(b).copied().flatten())?;
                self.solution = Some(path);
                return Ok(());
            }
            expanded += 1;

            for (mv, next) in node.board.successors() {
                if discovered.contains_key(&next) {
                    continue;
                }
                self.memory += 2 * next.footprint();
                discovered.insert(next.clone(), Some(mv));
                let estimate = self.heuristic.estimate(&next);
                frontier.push(estimate, node.cost + 1, next);
            }
        }

        debug!("greedy: exhausted {} boards", discovered.len());
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

/// Depth-first search that descends into the most promising successor first.
///
/// At every board the legal moves are ranked by the heuristic estimate of the board they
/// lead to; equal estimates keep [`Board::all_moves`] order. There is no global priority
/// queue, only the path being explored and the set of boards already visited.
pub struct DepthFirstGreedySearch<H> {
    heuristic: H,
    solution: Option<SolutionPath>,
    memory: usize,
}

impl<H: Heuristic> DepthFirstGreedySearch<H> {
    pub fn new(heuristic: H) -> Self {
        DepthFirstGreedySearch {
            heuristic,
            solution: None,
            memory: 0,
        }
    }
}

/// Legal moves of `board`, best heuristic estimate first.
fn ranked_moves<H: Heuristic>(heuristic: &H, board: &Board) -> Vec<Move> {
    let mut scored: Vec<(f64, Move)> = board
        .successors()
        .into_iter()
        .map(|(mv, next)| (heuristic.estimate(&next), mv))
        .collect();
    // Stable: equal estimates keep enumeration order.
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, mv)| mv).collect()
}

impl<H: Heuristic> SearchStrategy for DepthFirstGreedySearch<H> {
    fn name(&self) -> &'static str {
        "dfs-greedy"
    }

    fn initialize(&mut self, board: &Board) -> Result<(), SearchError> {
        self.solution = None;
        let heuristic = &self.heuristic;
        let moves = depth_first(board, |b| ranked_moves(heuristic, b), &mut self.memory)?;
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

/// A* search.
///
/// Expands boards by lowest `g + h`, where `g` is the number of moves from the initial
/// board and `h` the heuristic estimate. A board reached again by a shorter path is
/// reopened, and the goal test happens when a board leaves the frontier, so the solution
/// has the minimum number of moves whenever the heuristic is admissible. With an inflated
/// heuristic the search is faster but the solution may be longer.
pub struct AstarSearch<H> {
    heuristic: H,
    solution: Option<SolutionPath>,
    memory: usize,
}

impl<H: Heuristic> AstarSearch<H> {
    pub fn new(heuristic: H) -> Self {
        AstarSearch {
            heuristic,
            solution: None,
            memory: 0,
        }
    }
}

impl<H: Heuristic> SearchStrategy for AstarSearch<H> {
    fn name(&self) -> &'static str {
        "astar"
    }

    fn initialize(&mut self, board: &Board) -> Result<(), SearchError> {
        self.solution = None;

        // Best known cost of every board and the move that achieved it.
        let mut best: HashMap<Board, (usize, Option<Move>)> = HashMap::new();
        let mut frontier = Frontier::default();
        self.memory += 2 * board.footprint();
        best.insert(board.clone(), (0, None));
        frontier.push(self.heuristic.estimate(board), 0, board.clone());

        let mut expanded = 0usize;
        while let Some(node) = frontier.pop() {
            if best.get(&node.board).is_some_and(|&(cost, _)| node.cost > cost) {
                continue;
            }
            if node.board.is_goal() {
                debug!("astar: goal at cost {} after expanding {} boards", node.cost, expanded);
                let path = reconstruct(node.board, |b| best.get(b).and_then(|&(_, mv)| mv))?;
                self.solution = Some(path);
                return Ok(());
            }
            expanded += 1;

            let cost = node.cost + 1;
            for (mv, next) in node.board.successors() {
                let reopened = match best.get(&next) {
                    Some(&(known, _)) if known <= cost => continue,
                    Some(_) => true,
                    None => false,
                };
                // A reopened board keeps its key in `best`; only the new heap entry is stored.
                let copies = if reopened { 1 } else { 2 };
                self.memory += copies * next.footprint();
                best.insert(next.clone(), (cost, Some(mv)));
                let priority = cost as f64 + self.heuristic.estimate(&next);
                frontier.push(priority, cost, next);
            }
        }

        debug!("astar: exhausted {} boards", best.len());
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
