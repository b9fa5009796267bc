/*!
 * IPC Module
 * Producer/consumer shared buffer
 */

pub mod buffer;
pub mod types;

// Re-export for convenience
pub use buffer::SharedBuffer;
pub use types::BufferStats;
