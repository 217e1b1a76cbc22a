//! Durable storage backends for session state

pub mod file;
pub mod memory;
pub mod traits;

pub use file::JsonFileStorage;
pub use memory::MemoryStorage;
pub use traits::ContextStorage;
