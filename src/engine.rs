//! Core state model for the tube-sorting puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Color`: The opaque tag carried by each piece.
//! - `Tube`: A capacity-bounded stack of pieces; the back of the vector is the top.
//! - `Move`: A `(from, to)` pair of tube indices.
//! - `Board`: The puzzle state, including move legality, move application and reversal,
//!   successor generation, the goal test and seeded random population.
use crate::error::{BoardError, MoveError};
use crate::utils::color_to_char;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;

/// Color of a piece. Colors carry no ordering beyond equality.
pub type Color = u32;

/// A tube of pieces, bottom first. The last element is the top piece.
pub type Tube = Vec<Color>;

/// Describes the relocation of the top piece of tube `from` onto tube `to`.
///
/// A `Move` is a plain value: constructing one says nothing about whether it is legal
/// on a given board. Moves order lexicographically on `(from, to)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    /// Tube the piece is taken from.
    pub from: usize,
    /// Tube the piece is placed on.
    pub to: usize,
}

impl Move {
    pub fn new(from: usize, to: usize) -> Self {
        Move { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A puzzle state: a fixed number of tubes of a fixed height.
///
/// The geometry (`num_tubes`, `tube_height`) never changes after construction and no tube
/// ever holds more than `tube_height` pieces.
///
/// Equality and hashing are literal: two boards are equal iff their tubes are equal
/// element-for-element at the same indices. Boards that only differ by a permutation of
/// tubes, or by a relabeling of colors, are distinct states. The recorded color count and
/// seed are diagnostic and take no part in equality.
#[derive(Clone, Debug)]
pub struct Board {
    tube_height: usize,
    tubes: Vec<Tube>,
    num_colors: usize,
    seed: u64,
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.tubes == other.tubes
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tubes.hash(state);
    }
}

impl Board {
    /// Creates a board with `num_tubes` empty tubes of height `tube_height`.
    ///
    /// # Examples
    /// ```
    /// use tubesort_solver::engine::Board;
    /// let board = Board::new(4, 3);
    /// assert_eq!(board.num_tubes(), 4);
    /// assert_eq!(board.tube_height(), 3);
    /// assert!(board.is_goal()); // every tube is empty
    /// ```
    pub fn new(num_tubes: usize, tube_height: usize) -> Self {
        Board {
            tube_height,
            tubes: vec![Tube::new(); num_tubes],
            num_colors: 0,
            seed: 0,
        }
    }

    /// Creates a board from explicit tube contents.
    ///
    /// Useful for tests and for boards read from text. The recorded color count is the
    /// number of distinct colors present.
    ///
    /// # Arguments
    /// * `tubes`: The tubes, each listed bottom first.
    /// * `tube_height`: The capacity shared by all tubes.
    ///
    /// # Returns
    /// * `Ok(Board)` if every tube fits.
    /// * `Err(BoardError::TubeOverflow)` naming the first tube holding more than `tube_height` pieces.
    pub fn from_tubes(tubes: Vec<Tube>, tube_height: usize) -> Result<Self, BoardError> {
        if let Some((tube, t)) = tubes.iter().enumerate().find(|(_, t)| t.len() > tube_height) {
            return Err(BoardError::TubeOverflow {
                tube,
                len: t.len(),
                height: tube_height,
            });
        }
        let num_colors = tubes.iter().flatten().collect::<HashSet<_>>().len();
        Ok(Board {
            tube_height,
            tubes,
            num_colors,
            seed: 0,
        })
    }

    pub fn tubes(&self) -> &[Tube] {
        &self.tubes
    }

    /// Returns the tube at index `i`, or `None` if out of range.
    pub fn tube(&self, i: usize) -> Option<&Tube> {
        self.tubes.get(i)
    }

    pub fn num_tubes(&self) -> usize {
        self.tubes.len()
    }

    pub fn tube_height(&self) -> usize {
        self.tube_height
    }

    /// Number of colors the board was populated with.
    pub fn num_colors(&self) -> usize {
        self.num_colors
    }

    /// Seed used by the last call to [`Board::fill_random`], or 0.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Empties every tube. The geometry is unchanged.
    pub fn clear(&mut self) {
        for tube in &mut self.tubes {
            tube.clear();
        }
    }

    /// Fills the board with `num_colors * tube_height` random pieces.
    ///
    /// Generation is deterministic for a given geometry, color count and seed. Randomness
    /// comes from a `Pcg32` seeded through `SeedableRng::seed_from_u64(seed)` and owned
    /// by this call alone.
    ///
    /// The fill runs in two phases:
    /// 1. Every color starts with one piece; the remaining pieces are handed out one at a
    ///    time to uniformly drawn colors, redrawing any color that already has
    ///    `tube_height` pieces.
    /// 2. All tubes are cleared, then colors are placed in ascending order, one piece at a
    ///    time, each into a uniformly drawn tube, redrawing any tube that is already full.
    ///
    /// # Arguments
    /// * `num_colors`: Number of distinct colors to place.
    /// * `seed`: Seed for the random generator.
    ///
    /// # Returns
    /// * `Err(BoardError::TooManyColors)` if there are more colors than tubes.
    /// * `Err(BoardError::TooLarge)` if the piece count or capacity does not fit in a `usize`.
    /// * `Err(BoardError::TooManyPieces)` if the pieces would not fit.
    /// * `Err(BoardError::Degenerate)` if there would be fewer pieces than colors.
    ///
    /// The board is left untouched when an error is returned.
    ///
    /// # Examples
    /// ```
    /// use tubesort_solver::engine::Board;
    /// let mut a = Board::new(5, 4);
    /// let mut b = Board::new(5, 4);
    /// a.fill_random(3, 42).unwrap();
    /// b.fill_random(3, 42).unwrap();
    /// assert_eq!(a, b);
    /// assert!(Board::new(2, 4).fill_random(3, 42).is_err());
    /// ```
    pub fn fill_random(&mut self, num_colors: usize, seed: u64) -> Result<(), BoardError> {
        let num_tubes = self.num_tubes();
        let height = self.tube_height;

        // Each color needs a tube of its own in a solved board.
        if num_colors > num_tubes {
            return Err(BoardError::TooManyColors {
                colors: num_colors,
                tubes: num_tubes,
            });
        }
        let (Some(num_pieces), Some(capacity)) =
            (num_colors.checked_mul(height), num_tubes.checked_mul(height))
        else {
            return Err(BoardError::TooLarge {
                tubes: num_tubes,
                height,
            });
        };
        if num_pieces > capacity {
            return Err(BoardError::TooManyPieces {
                pieces: num_pieces,
                capacity,
            });
        }
        // A color without pieces would not be a color.
        if num_pieces < num_colors {
            return Err(BoardError::Degenerate {
                pieces: num_pieces,
                colors: num_colors,
            });
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut pieces_per_color = vec![1usize; num_colors];

        for _ in 0..num_pieces - num_colors {
            let color = loop {
                let candidate = rng.gen_range(0..num_colors);
                if pieces_per_color[candidate] < height {
                    break candidate;
                }
            };
            pieces_per_color[color] += 1;
        }

        self.clear();
        for (color, count) in pieces_per_color.into_iter().enumerate() {
            for _ in 0..count {
                let tube = loop {
                    let candidate = rng.gen_range(0..num_tubes);
                    if self.tubes[candidate].len() < height {
                        break candidate;
                    }
                };
                self.tubes[tube].push(color as Color);
            }
        }

        self.num_colors = num_colors;
        self.seed = seed;
        Ok(())
    }

    /// Checks whether the top piece of `mv.from` can be placed on `mv.to`.
    ///
    /// A move is legal when the indices differ and are in range, the origin is not empty,
    /// the destination is not full, and the destination is either empty or topped by the
    /// same color as the origin.
    pub fn can_move(&self, mv: Move) -> bool {
        if mv.from == mv.to {
            return false;
        }
        let (Some(origin), Some(destination)) = (self.tube(mv.from), self.tube(mv.to)) else {
            return false;
        };
        match (origin.last(), destination.last()) {
            (None, _) => false,
            _ if destination.len() >= self.tube_height => false,
            (Some(_), None) => true,
            (Some(top), Some(dest_top)) => top == dest_top,
        }
    }

    /// Checks whether `mv` can be undone on this board.
    ///
    /// Meant to be called on a board where `mv` was just applied. Only the destination is
    /// inspected: it must hold exactly one piece, or its two topmost pieces must share a
    /// color.
    pub fn can_reverse_move(&self, mv: Move) -> bool {
        if mv.from == mv.to || mv.from >= self.num_tubes() {
            return false;
        }
        match self.tube(mv.to).map(|t| t.as_slice()) {
            Some([_]) => true,
            Some([.., below, top]) => below == top,
            _ => false,
        }
    }

    /// Moves the top piece of `mv.from` onto `mv.to`.
    ///
    /// # Returns
    /// `Err(MoveError::Illegal)` if [`Board::can_move`] rejects the move; the board is not
    /// modified in that case.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), MoveError> {
        if !self.can_move(mv) {
            return Err(MoveError::Illegal(mv));
        }
        let piece = self.tubes[mv.from].pop().ok_or(MoveError::Illegal(mv))?;
        self.tubes[mv.to].push(piece);
        Ok(())
    }

    /// Undoes `mv`, moving the top piece of `mv.to` back onto `mv.from`.
    ///
    /// # Returns
    /// `Err(MoveError::Irreversible)` if [`Board::can_reverse_move`] rejects the move or the
    /// origin tube has no room left; the board is not modified in that case.
    pub fn reverse_move(&mut self, mv: Move) -> Result<(), MoveError> {
        if !self.can_reverse_move(mv) || self.tubes[mv.from].len() >= self.tube_height {
            return Err(MoveError::Irreversible(mv));
        }
        let piece = self.tubes[mv.to].pop().ok_or(MoveError::Irreversible(mv))?;
        self.tubes[mv.from].push(piece);
        Ok(())
    }

    /// Returns every legal move, ordered by ascending `from` and then ascending `to`.
    ///
    /// Search strategies rely on this order for reproducible tie-breaking.
    pub fn all_moves(&self) -> Vec<Move> {
        let n = self.num_tubes();
        (0..n)
            .flat_map(|from| (0..n).map(move |to| Move::new(from, to)))
            .filter(|&mv| self.can_move(mv))
            .collect()
    }

    /// Returns every legal move paired with the board it leads to, in [`Board::all_moves`] order.
    pub fn successors(&self) -> Vec<(Move, Board)> {
        self.all_moves()
            .into_iter()
            .filter_map(|mv| {
                let mut next = self.clone();
                next.apply_move(mv).ok().map(|_| (mv, next))
            })
            .collect()
    }

    /// Returns all boards reachable from this one in a single move, in [`Board::all_moves`] order.
    pub fn adjacent_states(&self) -> Vec<Board> {
        self.successors().into_iter().map(|(_, board)| board).collect()
    }

    /// Checks whether the puzzle is solved.
    ///
    /// The board is solved when every tube is either empty, or full to its top with pieces
    /// of a single color. A partially filled monochrome tube does not count.
    ///
    /// # Examples
    /// ```
    /// use tubesort_solver::engine::Board;
    /// let solved = Board::from_tubes(vec![vec![1, 1], vec![2, 2], vec![]], 2).unwrap();
    /// assert!(solved.is_goal());
    /// let partial = Board::from_tubes(vec![vec![1], vec![2], vec![]], 2).unwrap();
    /// assert!(!partial.is_goal());
    /// ```
    pub fn is_goal(&self) -> bool {
        self.tubes.iter().all(|tube| {
            tube.is_empty() || (tube.len() == self.tube_height && tube.windows(2).all(|w| w[0] == w[1]))
        })
    }

    /// Approximate number of bytes this board occupies, inline and on the heap.
    ///
    /// Used by search strategies to report their memory footprint.
    pub fn footprint(&self) -> usize {
        mem::size_of::<Board>()
            + self.tubes.capacity() * mem::size_of::<Tube>()
            + self
                .tubes
                .iter()
                .map(|t| t.capacity() * mem::size_of::<Color>())
                .sum::<usize>()
    }
}

impl fmt::Display for Board {
    /// One line per tube, bottom first, padded with `.` up to the tube height.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tube) in self.tubes.iter().enumerate() {
            write!(f, "{:<3}|", i)?;
            for slot in 0..self.tube_height {
                match tube.get(slot) {
                    Some(&color) => write!(f, "{}", color_to_char(color))?,
                    None => write!(f, ".")?,
                }
            }
            if i + 1 < self.tubes.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
