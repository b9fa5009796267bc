/*!
 * Memory Module
 * Fixed-capacity memory pool shared by Normal processes
 */

pub mod allocator;
pub mod types;

// Re-export for convenience
pub use allocator::MemoryAllocator;
pub use types::{MemoryPressure, MemoryStats};
