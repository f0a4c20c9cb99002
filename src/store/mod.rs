// Module declarations
pub(crate) mod memory;

// Re-export the public interface
pub use memory::MemoryStore;
