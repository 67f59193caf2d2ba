use crate::engine::{Board, Color, Tube};
use crate::error::BoardError;

/// Maps a color to its single-character text form.
///
/// Colors `0..=9` print as digits and `10..=35` as lowercase letters. Larger colors have no
/// text form and print as `?`.
pub fn color_to_char(color: Color) -> char {
    char::from_digit(color, 36).unwrap_or('?')
}

/// Parses a single piece character back into a color. See [`color_to_char`].
pub fn char_to_color(ch: char) -> Option<Color> {
    if ch.is_ascii_uppercase() {
        return None;
    }
    ch.to_digit(36)
}

/// Parses an array of string slices into a `Board`.
///
/// Each string slice describes one tube, listing its pieces from the bottom to the top, one
/// character per piece (see [`color_to_char`]). `.` marks an empty slot and is skipped and
/// whitespace is ignored. Anything up to a `|` is a tube label and is dropped, so the lines
/// printed by the `Board` display parse back to the same board.
///
/// # Arguments
/// * `s`: One string slice per tube.
/// * `tube_height`: The capacity shared by all tubes.
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(BoardError::UnknownPiece)` on any character that is not a piece, `.` or whitespace.
/// * `Err(BoardError::TubeOverflow)` if a tube holds more than `tube_height` pieces.
///
/// # Examples
/// ```
/// use tubesort_solver::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["001", "1.", ""], 3).unwrap();
/// assert_eq!(board.tubes(), &[vec![0, 0, 1], vec![1], vec![]]);
///
/// assert!(board_from_str_array(&["0X"], 3).is_err());
/// assert!(board_from_str_array(&["0000"], 3).is_err());
/// ```
pub fn board_from_str_array(s: &[&str], tube_height: usize) -> Result<Board, BoardError> {
    let mut tubes = Vec::with_capacity(s.len());

    for (tube_idx, row_str) in s.iter().enumerate() {
        let pieces = row_str.rsplit_once('|').map_or(*row_str, |(_, pieces)| pieces);
        let mut tube = Tube::new();
        for ch in pieces.chars() {
            if ch == '.' || ch.is_whitespace() {
                continue;
            }
            let color = char_to_color(ch).ok_or(BoardError::UnknownPiece { ch, tube: tube_idx })?;
            tube.push(color);
        }
        tubes.push(tube);
    }

    Board::from_tubes(tubes, tube_height)
}

/// Renders a board as one string per tube, in the format read by [`board_from_str_array`].
///
/// Each string is padded with `.` up to the tube height, so empty tubes still produce a
/// non-blank line.
pub fn board_to_str_array(board: &Board) -> Vec<String> {
    board
        .tubes()
        .iter()
        .map(|tube| {
            let pieces = tube.iter().map(|&c| color_to_char(c));
            let padding = std::iter::repeat('.').take(board.tube_height() - tube.len());
            pieces.chain(padding).collect()
        })
        .collect()
}
