use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Global solver tunables.
///
/// Invalid values are rejected by [`SimConfig::validate`] rather than
/// clamped; a silently coerced substep count would hide a
/// stability-critical misconfiguration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of sub-divisions of each frame delta. Higher = more stable.
    pub substeps: u32,
    /// Constraint-projection passes per sub-step.
    pub solver_iterations: u32,
    /// Gravity acceleration in m/s^2.
    pub gravity: Vec3,
    /// Post-commit velocity scale per sub-step, in (0, 1]. 1.0 = no damping.
    pub global_damping: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            substeps: 4,
            solver_iterations: 8,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            global_damping: 0.998,
        }
    }
}

impl SimConfig {
    /// Check that all tunables are in range.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.substeps == 0 {
            return Err(SimError::InvalidSubsteps);
        }
        if self.solver_iterations == 0 {
            return Err(SimError::InvalidIterations);
        }
        if !(self.global_damping > 0.0 && self.global_damping <= 1.0)
            || !self.global_damping.is_finite()
        {
            return Err(SimError::InvalidDamping(self.global_damping));
        }
        Ok(())
    }
}
