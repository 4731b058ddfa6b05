use glam::Vec3;

use crate::error::SimError;
use crate::particle::ParticleSet;

/// XPBD distance constraint between two particles.
///
/// Maintains a rest length with compliance (inverse stiffness);
/// compliance 0 is rigid.
///
/// Reference: "XPBD: Position-Based Simulation of Compliant Constrained Dynamics",
/// Macklin et al., 2016
pub struct DistanceConstraint {
    /// Particle index A.
    pub a: u32,
    /// Particle index B.
    pub b: u32,
    /// Target separation.
    pub rest_length: f32,
    /// Compliance (inverse stiffness). 0.0 = rigid.
    pub compliance: f32,
    /// Accumulated Lagrange multiplier (reset each substep).
    pub lambda: f32,
    pub active: bool,
}

impl DistanceConstraint {
    pub fn new(a: u32, b: u32, rest_length: f32, compliance: f32) -> Self {
        Self {
            a,
            b,
            rest_length,
            compliance,
            lambda: 0.0,
            active: true,
        }
    }

    /// Build a constraint whose rest length is the current separation.
    pub fn between(
        a: u32,
        b: u32,
        positions: &[Vec3],
        compliance: f32,
    ) -> Result<Self, SimError> {
        for index in [a as usize, b as usize] {
            if index >= positions.len() {
                return Err(SimError::ParticleOutOfBounds {
                    index,
                    count: positions.len(),
                });
            }
        }
        let rest_length = positions[a as usize].distance(positions[b as usize]);
        Ok(Self::new(a, b, rest_length, compliance))
    }

    /// Signed violation: `|p_b - p_a| - rest_length` over predicted positions.
    pub fn evaluate(&self, particles: &ParticleSet) -> f32 {
        let diff = particles.predicted[self.b as usize] - particles.predicted[self.a as usize];
        diff.length() - self.rest_length
    }

    /// One XPBD projection pass, mutating `predicted` in place.
    ///
    /// 1. C = |p_b - p_a| - rest_length
    /// 2. alpha_tilde = compliance / dt^2
    /// 3. delta_lambda = -(C + alpha_tilde * lambda) / (w_a + w_b + alpha_tilde)
    /// 4. apply corrections weighted by inverse mass
    pub fn solve(&mut self, particles: &mut ParticleSet, dt: f32) {
        let a = self.a as usize;
        let b = self.b as usize;

        let w_a = particles.inv_mass[a];
        let w_b = particles.inv_mass[b];
        let w_sum = w_a + w_b;
        if w_sum < 1e-10 {
            return; // both immovable
        }

        let diff = particles.predicted[b] - particles.predicted[a];
        let dist = diff.length();
        if dist < 1e-10 {
            return; // coincident: correction direction undefined, retry next iteration
        }

        let c_val = dist - self.rest_length;
        let n = diff / dist;

        let alpha_tilde = self.compliance / (dt * dt);
        let delta_lambda = -(c_val + alpha_tilde * self.lambda) / (w_sum + alpha_tilde);
        self.lambda += delta_lambda;

        // Gradient is -n on A, +n on B.
        let correction = n * delta_lambda;
        particles.predicted[a] -= correction * w_a;
        particles.predicted[b] += correction * w_b;
    }

    pub fn validate(&self, particle_count: usize) -> Result<(), SimError> {
        for index in [self.a as usize, self.b as usize] {
            if index >= particle_count {
                return Err(SimError::ParticleOutOfBounds {
                    index,
                    count: particle_count,
                });
            }
        }
        Ok(())
    }
}
