/*!
 * IPC Types
 * Snapshot types for the shared buffer
 */

use crate::core::types::Units;
use serde::{Deserialize, Serialize};

/// Shared buffer statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferStats {
    pub capacity: Units,
    pub occupied: Units,
    pub free: Units,
    pub usage_percentage: f64,
}

impl BufferStats {
    pub fn is_empty(&self) -> bool {
        self.occupied <= crate::core::types::EPSILON
    }
}
