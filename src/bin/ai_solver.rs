use clap::Parser;
use log::info;
use std::fs;
use std::path::PathBuf;
use std::process;
use tubesort_solver::config::{BoardConfig, SolverConfig};
use tubesort_solver::engine::Board;
use tubesort_solver::utils::{board_from_str_array, board_to_str_array};

#[derive(Parser, Debug)]
#[command(author, version, about = "Solves a tube sort board and prints the moves", long_about = None)]
struct Args {
    /// Read the board from a file instead of generating it: one tube per line, bottom piece
    /// first, `.` for empty slots. The tube height comes from --height.
    #[arg(long)]
    board_file: Option<PathBuf>,

    /// Write the board to this file, in the --board-file format, before solving it
    #[arg(long)]
    save_board: Option<PathBuf>,

    #[command(flatten)]
    board: BoardConfig,

    #[command(flatten)]
    solver: SolverConfig,
}

fn read_board_file(path: &PathBuf, tube_height: usize) -> Result<Board, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;

    let lines: Vec<&str> = content
        .lines()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if lines.is_empty() {
        return Err("Board file contains no tubes".to_string());
    }

    board_from_str_array(&lines, tube_height).map_err(|e| format!("Invalid board format: {}", e))
}

fn write_board_file(path: &PathBuf, board: &Board) -> Result<(), String> {
    let mut content = board_to_str_array(board).join("\n");
    content.push('\n');
    fs::write(path, content).map_err(|e| format!("Failed to write file: {}", e))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let board = match &args.board_file {
        Some(path) => {
            let board = read_board_file(path, args.board.height).unwrap_or_else(|e| {
                eprintln!("Error: {}: {}", path.display(), e);
                process::exit(1);
            });
            println!("Loaded board from {}\n", path.display());
            board
        }
        None => args.board.build().unwrap_or_else(|e| {
            eprintln!("Error: cannot generate board: {}", e);
            process::exit(1);
        }),
    };

    let mut strategy = args.solver.build().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if let Some(path) = &args.save_board {
        if let Err(e) = write_board_file(path, &board) {
            eprintln!("Error: {}: {}", path.display(), e);
            process::exit(1);
        }
        println!("Saved board to {}\n", path.display());
    }

    println!("Initial board state:\n{}\n", board);
    if args.solver.strategy.is_informed() {
        println!(
            "Searching for a solution with {} ({:?} heuristic)...\n",
            strategy.name(),
            args.solver.heuristic
        );
    } else {
        println!("Searching for a solution with {}...\n", strategy.name());
    }

    if let Err(e) = strategy.initialize(&board) {
        println!("No solution found: {}\n", e);
        process::exit(2);
    }
    info!("memory footprint: {} bytes", strategy.memory_footprint());

    let mut state = board.clone();
    let mut moves = Vec::new();
    while !state.is_goal() {
        let mv = match strategy.next_move() {
            Ok(mv) => mv,
            Err(e) => {
                eprintln!("Error: solution stopped short of the goal: {}", e);
                process::exit(1);
            }
        };
        if let Err(e) = state.apply_move(mv) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        moves.push(mv);
    }

    println!("Solution found:\n");
    println!("Moves ({}):", moves.len());
    if moves.is_empty() {
        println!("  No moves made.");
    } else {
        for (i, mv) in moves.iter().enumerate() {
            println!("  Move {}: {}", i + 1, mv);
        }
    }
    println!("\nFinal board state:\n{}\n", state);
}
