//! Repository Layer
//!
//! The `BoardStore` abstraction and its implementations.

mod http_store;
mod memory_store;
mod traits;


pub use http_store::HttpBoardStore;
pub use memory_store::InMemoryBoardStore;
pub use traits::BoardStore;
