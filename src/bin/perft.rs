//! Move-tree node counter.
//!
//! Walks the legal move tree of a position to a fixed depth and prints the
//! leaf count, optionally split per root move.

use clap::Parser;

use arrocco::{perft, GameState, START_FEN};

#[derive(Parser, Debug)]
#[command(author, version, about = "Count leaf nodes of the legal move tree", long_about = None)]
struct Args {
    /// Position to start from
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,
    /// Plies to search
    #[arg(short, long, default_value_t = 4)]
    depth: usize,
    /// Print per-root-move node counts
    #[arg(long)]
    divide: bool,
}

fn main() {
    let args = Args::parse();

    let mut state = match GameState::from_fen(&args.fen) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("cannot parse FEN '{}': {err}", args.fen);
            std::process::exit(1);
        }
    };

    println!("perft on '{}' to depth {}", args.fen, args.depth);

    if args.divide && args.depth > 0 {
        for turn in state.moves().to_vec() {
            let nodes = perft(&state.apply(&turn), args.depth - 1);
            println!("{turn}: {nodes}");
        }
    }

    let start = std::time::Instant::now();
    let total = perft(&state, args.depth);
    let elapsed = start.elapsed();

    println!(
        "perft({}) = {} ({} ms)",
        args.depth,
        total,
        elapsed.as_millis()
    );
}
