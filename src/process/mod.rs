/*!
 * Process Module
 * Process records, the registry and creation
 */

pub mod factory;
pub mod registry;
pub mod types;
pub(crate) mod validation;

// Re-export for convenience
pub use factory::ProcessFactory;
pub use registry::ProcessRegistry;
pub use types::{ProcessKind, ProcessRecord, ProcessSpec, ProcessState, Transition};
