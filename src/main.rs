//! Kanban Board - board summary
//!
//! Loads the board from the configured service (placeholder board when it is
//! unreachable) and prints one line per column and task.

use std::sync::Arc;

use kanban_board::{
    Board, BoardConfig, BoardController, DomainResult, HttpBoardStore, LoadOutcome,
};

const DEFAULT_CONFIG_PATH: &str = "board.json";

fn print_board(board: &Board) {
    if board.is_placeholder() {
        println!("(placeholder board, nothing here is saved)");
    }
    for column in board.columns() {
        println!("[{}] {} ({})", column.id, column.title, column.color);
        for task in &column.tasks {
            println!("    #{} {:<40} {:>3}%", task.id, task.title, task.percent());
        }
    }
}

#[tokio::main]
async fn main() -> DomainResult<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = BoardConfig::load(&config_path)?.with_env_overrides()?;

    if let Err(e) = board_logger::init_logger(&config.log_dir, "KanbanBoard", &config.log_level) {
        eprintln!("failed to init logger: {}", e);
    }
    board_logger::info(&format!("using board service at {}", config.base_url()));

    let store = HttpBoardStore::from_config(&config)?;
    let controller = BoardController::new(Arc::new(store));

    match controller.load_or_placeholder().await? {
        LoadOutcome::Loaded(board) => print_board(&board),
        LoadOutcome::Placeholder { board, cause } => {
            board_logger::error(&format!("board service unavailable: {}", cause));
            print_board(&board);
        }
    }
    Ok(())
}
