//! Kanban Board Client
//!
//! Layered architecture:
//! - domain: entities, checkpoint engine, errors
//! - board: the in-memory board value and its column/task managers
//! - repository: the `BoardStore` capability and its implementations
//! - controller: confirm-then-apply orchestration and task edit sessions
//! - config: client configuration

pub mod board;
pub mod config;
pub mod controller;
pub mod domain;
pub mod repository;

pub use board::{Board, BoardOrigin};
pub use config::BoardConfig;
pub use controller::{BoardController, LoadOutcome, TaskEditor};
pub use domain::{DomainError, DomainResult};
pub use repository::{BoardStore, HttpBoardStore, InMemoryBoardStore};
