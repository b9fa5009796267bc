/*!
 * Process Input Validation
 * Checks applied before a request reaches the registry
 */

use super::types::ProcessSpec;
use crate::core::limits::PRIORITY_RANGE;
use crate::core::types::Priority;
use crate::core::{SimError, SimResult};

/// Priority must be in 1..=10
pub(crate) fn validate_priority(priority: Priority) -> SimResult<()> {
    if !PRIORITY_RANGE.contains(&priority) {
        return Err(SimError::InvalidPriority(priority));
    }
    Ok(())
}

/// Validate explicit creation parameters
pub(crate) fn validate_spec(spec: &ProcessSpec) -> SimResult<()> {
    validate_priority(spec.priority)?;

    if spec.burst_time == 0 {
        return Err(SimError::InvalidBurstTime);
    }

    if !spec.memory_demand.is_finite() || spec.memory_demand < 0.0 {
        return Err(SimError::InvalidDemand(spec.memory_demand));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::types::ProcessKind;

    #[test]
    fn test_priority_bounds() {
        assert!(validate_priority(1).is_ok());
        assert!(validate_priority(10).is_ok());
        assert_eq!(validate_priority(0), Err(SimError::InvalidPriority(0)));
        assert_eq!(validate_priority(11), Err(SimError::InvalidPriority(11)));
    }

    #[test]
    fn test_spec_rejects_zero_burst() {
        let spec = ProcessSpec::new(ProcessKind::Normal, 3, 0, 64.0);
        assert_eq!(validate_spec(&spec), Err(SimError::InvalidBurstTime));
    }

    #[test]
    fn test_spec_rejects_bad_demand() {
        let spec = ProcessSpec::new(ProcessKind::Producer, 3, 4, f64::NAN);
        assert!(matches!(validate_spec(&spec), Err(SimError::InvalidDemand(_))));

        let spec = ProcessSpec::new(ProcessKind::Producer, 3, 4, -1.0);
        assert!(matches!(validate_spec(&spec), Err(SimError::InvalidDemand(_))));
    }
}
