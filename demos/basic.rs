//! Basic example of driving a session without a front-end

use casefile_core::{evidence, format_time, Session, SessionConfig};

fn main() {
    let mut session = Session::start_session(SessionConfig::default().with_seed(2024), 0)
        .expect("default config is valid");

    println!("Stage {}", session.stage());
    for slot in session.round().slots() {
        println!("  slot {}: needs {}", slot.index, evidence::label(slot.required_value));
    }
    println!("Offered:");
    for piece in session.round().pieces() {
        println!("  piece {}: {}", piece.id, evidence::label(piece.value));
    }

    // Place every piece that fits somewhere
    let moves: Vec<(usize, usize)> = session
        .round()
        .pieces()
        .iter()
        .filter_map(|p| session.round().placeable_slots(p.id).first().map(|&s| (p.id, s)))
        .collect();
    for (piece, slot) in moves {
        if session.place_piece(piece, slot).is_ok() {
            println!("Placed piece {} in slot {}", piece, slot);
        }
    }

    let now = 12_000;
    let outcome = if session.round().is_complete() {
        session.request_indict(now)
    } else {
        session.request_dismiss(now)
    };

    match outcome {
        Ok(outcome) => println!("\nOutcome: {} after {}", outcome, format_time(now)),
        Err(reason) => println!("\nNothing to do: {}", reason),
    }
    println!("Score: {}", session.score());
}
