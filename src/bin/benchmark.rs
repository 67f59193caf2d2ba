use clap::Parser;
use log::{debug, info, warn};
use std::process;
use std::time::Instant;
use tubesort_solver::config::{BoardConfig, SolverConfig};
use tubesort_solver::engine::Board;
use tubesort_solver::error::SearchError;
use tubesort_solver::solver::SearchStrategy;

/// Solves a batch of generated boards and prints one CSV line per board:
/// `tubes,height,colors,seed,moves,memory,ns_per_run`, or `-1` if the board has no solution.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
struct Args {
    /// Timed initializations per board
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// Number of boards, with consecutive seeds starting at --seed
    #[arg(long, default_value_t = 1)]
    count: u64,

    #[command(flatten)]
    board: BoardConfig,

    #[command(flatten)]
    solver: SolverConfig,
}

struct Measurement {
    moves: usize,
    memory: usize,
    ns_per_run: u128,
}

fn measure(
    strategy: &mut dyn SearchStrategy,
    board: &Board,
    runs: u32,
) -> Result<Measurement, SearchError> {
    let memory_before = strategy.memory_footprint();
    strategy.initialize(board)?;
    let memory = strategy.memory_footprint() - memory_before;

    let begin = Instant::now();
    for run in 0..runs {
        debug!("run {} of {}", run + 1, runs);
        strategy.initialize(board)?;
    }
    let elapsed = begin.elapsed();

    let mut state = board.clone();
    let mut moves = 0;
    while !state.is_goal() {
        state.apply_move(strategy.next_move()?)?;
        moves += 1;
    }

    Ok(Measurement {
        moves,
        memory,
        ns_per_run: elapsed.as_nanos() / u128::from(runs.max(1)),
    })
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    info!(
        "benchmarking {:?} on {} board(s), {} run(s) each",
        args.solver.strategy, args.count, args.runs
    );

    for offset in 0..args.count {
        let config = BoardConfig {
            seed: args.board.seed + offset,
            ..args.board.clone()
        };
        let board = config.build().unwrap_or_else(|e| {
            eprintln!("Error: cannot generate board: {}", e);
            process::exit(1);
        });
        let mut strategy = args.solver.build().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        });

        match measure(strategy.as_mut(), &board, args.runs) {
            Ok(m) => println!(
                "{},{},{},{},{},{},{}",
                board.num_tubes(),
                board.tube_height(),
                board.num_colors(),
                board.seed(),
                m.moves,
                m.memory,
                m.ns_per_run
            ),
            Err(e) => {
                warn!("seed {}: {}", config.seed, e);
                println!("-1");
            }
        }
    }
}
