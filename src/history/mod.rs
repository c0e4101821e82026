mod memory;
mod reader;
mod store;
mod types;
mod writer;

pub use memory::MemoryHistoryStore;
pub use reader::read_history_file;
pub use store::{HistoryStore, JsonHistoryStore};
pub use types::*;
pub use writer::{write_history_file, HistoryError};
