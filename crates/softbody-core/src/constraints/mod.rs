//! Constraint family: distance, volume, and ground-plane projection.
//!
//! A closed sum type keeps dispatch exhaustive; every variant shares the
//! same XPBD contract (evaluate violation, apply compliance-weighted
//! correction, live activity/compliance tuning).

pub mod distance;
pub mod ground;
pub mod volume;

pub use distance::DistanceConstraint;
pub use ground::GroundConstraint;
pub use volume::VolumeConstraint;

use crate::error::SimError;
use crate::particle::ParticleSet;

/// A physical rule over a subset of the particle arena.
pub enum Constraint {
    Distance(DistanceConstraint),
    Volume(VolumeConstraint),
    Ground(GroundConstraint),
}

impl Constraint {
    /// Signed magnitude of rule violation; exactly 0 when satisfied.
    pub fn evaluate(&self, particles: &ParticleSet) -> f32 {
        match self {
            Constraint::Distance(c) => c.evaluate(particles),
            Constraint::Volume(c) => c.evaluate(particles),
            Constraint::Ground(c) => c.evaluate(particles),
        }
    }

    /// One compliance-weighted correction pass over `predicted`.
    ///
    /// No-op when inactive or when every referenced particle is immovable.
    pub fn solve(&mut self, particles: &mut ParticleSet, dt: f32) {
        match self {
            Constraint::Distance(c) => c.solve(particles, dt),
            Constraint::Volume(c) => c.solve(particles, dt),
            Constraint::Ground(c) => c.solve(particles, dt),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Constraint::Distance(c) => c.active,
            Constraint::Volume(c) => c.active,
            Constraint::Ground(c) => c.active,
        }
    }

    pub fn set_active(&mut self, active: bool) {
        match self {
            Constraint::Distance(c) => c.active = active,
            Constraint::Volume(c) => c.active = active,
            Constraint::Ground(c) => c.active = active,
        }
    }

    /// Inverse stiffness. The ground plane is always rigid and reports 0.
    pub fn compliance(&self) -> f32 {
        match self {
            Constraint::Distance(c) => c.compliance,
            Constraint::Volume(c) => c.compliance,
            Constraint::Ground(_) => 0.0,
        }
    }

    /// Tune compliance live. Ignored by the ground plane.
    pub fn set_compliance(&mut self, compliance: f32) {
        match self {
            Constraint::Distance(c) => c.compliance = compliance,
            Constraint::Volume(c) => c.compliance = compliance,
            Constraint::Ground(_) => {}
        }
    }

    /// Reset the accumulated Lagrange multiplier. Called at the start of
    /// each substep.
    pub fn reset_lambda(&mut self) {
        match self {
            Constraint::Distance(c) => c.lambda = 0.0,
            Constraint::Volume(c) => c.lambda = 0.0,
            Constraint::Ground(_) => {}
        }
    }

    /// Check every referenced particle index against the arena size.
    pub fn validate(&self, particle_count: usize) -> Result<(), SimError> {
        match self {
            Constraint::Distance(c) => c.validate(particle_count),
            Constraint::Volume(c) => c.validate(particle_count),
            Constraint::Ground(c) => c.validate(particle_count),
        }
    }
}
