use std::time::{Duration, Instant};

use glam::Vec3;

use crate::config::SimConfig;
use crate::constraints::Constraint;
use crate::error::SimError;
use crate::particle::ParticleSet;

/// Per-frame diagnostics, exposed for monitoring only. Nothing in the
/// solve loop consumes these.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimStats {
    pub particle_count: usize,
    pub constraint_count: usize,
    pub last_step_duration: Duration,
    pub iterations_last_substep: u32,
}

/// Owner of the particle arena and constraint list; drives the
/// sub-stepped Predict -> Solve -> Commit+Damp loop.
///
/// Constraints are solved in insertion order within each iteration.
/// Constraints sharing a particle see each other's partial corrections in
/// the same iteration (Gauss-Seidel relaxation); that read-after-write is
/// part of the convergence design.
///
/// `step` is synchronous and not reentrant. Structural changes
/// (`add_particle`, `add_constraint`, `clear`) must happen between steps.
pub struct Solver {
    particles: ParticleSet,
    constraints: Vec<Constraint>,
    config: SimConfig,
    last_step_duration: Duration,
    iterations_last_substep: u32,
}

impl Solver {
    /// Create a solver with a validated configuration.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            particles: ParticleSet::new(),
            constraints: Vec::new(),
            config,
            last_step_duration: Duration::ZERO,
            iterations_last_substep: 0,
        })
    }

    /// Append a movable particle. Returns a stable index, valid until the
    /// next `clear`.
    pub fn add_particle(
        &mut self,
        position: Vec3,
        mass: f32,
        topology_index: u32,
    ) -> Result<usize, SimError> {
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(SimError::InvalidMass(mass));
        }
        Ok(self.particles.push(position, 1.0 / mass, false, topology_index))
    }

    /// Append an immovable particle (infinite mass).
    pub fn add_fixed_particle(&mut self, position: Vec3, topology_index: u32) -> usize {
        self.particles.push(position, 0.0, true, topology_index)
    }

    /// Append a constraint. Every particle index it references must
    /// already exist; out-of-range indices are a fatal configuration
    /// error, detected here rather than during a step.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<usize, SimError> {
        constraint.validate(self.particles.len())?;
        let idx = self.constraints.len();
        self.constraints.push(constraint);
        Ok(idx)
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// The frame delta is divided into `substeps` sub-steps; each runs
    /// Predict, `solver_iterations` constraint-projection passes over the
    /// active constraints, then Commit+Damp. An empty solver is a
    /// legitimate no-op.
    pub fn step(&mut self, dt: f32) {
        if self.particles.is_empty() {
            return;
        }

        let started = Instant::now();
        let sub_dt = dt / self.config.substeps as f32;

        for _substep in 0..self.config.substeps {
            for constraint in self.constraints.iter_mut() {
                constraint.reset_lambda();
            }

            self.particles.predict(self.config.gravity, sub_dt);

            let mut executed = 0;
            for _iter in 0..self.config.solver_iterations {
                for constraint in self.constraints.iter_mut() {
                    if constraint.is_active() {
                        constraint.solve(&mut self.particles, sub_dt);
                    }
                }
                executed += 1;
            }
            self.iterations_last_substep = executed;

            self.particles.commit_and_damp(self.config.global_damping);
        }

        self.last_step_duration = started.elapsed();
    }

    /// Apply an impulse to every particle within `radius` of `center`,
    /// scaled by linear falloff `1 - distance / radius`.
    pub fn apply_impulse(&mut self, center: Vec3, impulse: Vec3, radius: f32, dt: f32) {
        if radius <= 0.0 {
            return;
        }
        for i in 0..self.particles.len() {
            let distance = self.particles.position[i].distance(center);
            if distance < radius {
                let falloff = 1.0 - distance / radius;
                self.particles.apply_impulse(i, impulse * falloff, dt);
            }
        }
    }

    /// Drop all particles and constraints. Previously returned indices
    /// become invalid.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.constraints.clear();
    }

    /// Zero every implicit velocity without discarding particles or
    /// constraints.
    pub fn reset(&mut self) {
        self.particles.zero_velocities();
    }

    /// Read-only positions for rendering/mesh-sync collaborators.
    pub fn positions(&self) -> &[Vec3] {
        &self.particles.position
    }

    /// Raw byte view of the position buffer.
    pub fn position_bytes(&self) -> &[u8] {
        self.particles.position_bytes()
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn constraint(&self, index: usize) -> Option<&Constraint> {
        self.constraints.get(index)
    }

    /// Mutable access for live tuning (compliance, activity). Structural
    /// fields must not be changed mid-simulation.
    pub fn constraint_mut(&mut self, index: usize) -> Option<&mut Constraint> {
        self.constraints.get_mut(index)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Replace the configuration. Rejected values leave the old
    /// configuration in place.
    pub fn set_config(&mut self, config: SimConfig) -> Result<(), SimError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn stats(&self) -> SimStats {
        SimStats {
            particle_count: self.particles.len(),
            constraint_count: self.constraints.len(),
            last_step_duration: self.last_step_duration,
            iterations_last_substep: self.iterations_last_substep,
        }
    }
}
