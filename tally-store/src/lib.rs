pub mod memory;

pub use memory::MemoryLog;
