//! Search a position and print the recommended move.

use clap::Parser;

use arrocco::{GameState, Negamax, START_FEN};

#[derive(Parser, Debug)]
#[command(author, version, about = "Search a position for the best move", long_about = None)]
struct Args {
    /// Position to search
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,
    /// Plies to search
    #[arg(short, long, default_value_t = 4)]
    depth: usize,
    /// Disable alpha-beta pruning
    #[arg(long)]
    no_pruning: bool,
    /// Disable move ordering
    #[arg(long)]
    no_ordering: bool,
    /// Disable the transposition table
    #[arg(long)]
    no_table: bool,
}

fn main() {
    let args = Args::parse();

    let state = match GameState::from_fen(&args.fen) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("cannot parse FEN '{}': {err}", args.fen);
            std::process::exit(1);
        }
    };

    let mut search = Negamax::with_features(!args.no_pruning, !args.no_ordering, !args.no_table);
    let result = search.search(&state, args.depth);

    match result.turn {
        Some(turn) => println!("bestmove {turn} (score {})", result.score),
        None => println!("no move available (score {})", result.score),
    }
    if result.is_victory_certain() {
        println!("forced win found");
    }
    println!("{}", search.counters());
}
