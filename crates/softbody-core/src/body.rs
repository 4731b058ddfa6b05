//! Setup-time data contract for instantiating a deformable body.
//!
//! Topology generation (building a sphere, a block, an imported mesh) is a
//! collaborator's job; this module only consumes its output: initial
//! positions with masses, an edge list for structural distance
//! constraints, and optionally a closed triangle surface for a volume
//! constraint.

use glam::Vec3;

use crate::constraints::{Constraint, DistanceConstraint, VolumeConstraint};
use crate::error::SimError;
use crate::solver::Solver;

/// External description of one deformable body.
pub struct SoftBodyDesc {
    /// Initial particle positions, in simulation space.
    pub positions: Vec<Vec3>,
    /// Per-particle masses, same length as `positions`.
    pub masses: Vec<f32>,
    /// Structural connections; one distance constraint per pair, with the
    /// rest length taken from the initial positions.
    pub edges: Vec<(u32, u32)>,
    /// Closed triangle surface (outward winding), local vertex indices.
    /// Empty = no volume constraint.
    pub surface: Vec<[u32; 3]>,
    /// Compliance for the structural edges.
    pub edge_compliance: f32,
    /// Compliance for the volume constraint. Usually higher than
    /// `edge_compliance`.
    pub volume_compliance: f32,
    /// Local indices of particles to pin in place.
    pub fixed: Vec<u32>,
}

/// Index ranges of one instantiated body, for mesh-sync collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyHandle {
    pub first_particle: usize,
    pub particle_count: usize,
    pub first_constraint: usize,
    pub constraint_count: usize,
}

impl SoftBodyDesc {
    /// Instantiate this body into `solver`: particles first, then the
    /// constraints that reference them.
    ///
    /// The whole description is validated up front; a rejected body leaves
    /// the solver exactly as it was.
    pub fn build(&self, solver: &mut Solver) -> Result<BodyHandle, SimError> {
        if self.masses.len() != self.positions.len() {
            return Err(SimError::MismatchedMasses {
                masses: self.masses.len(),
                positions: self.positions.len(),
            });
        }
        for (local, &mass) in self.masses.iter().enumerate() {
            if self.fixed.contains(&(local as u32)) {
                continue; // pinned vertices ignore their mass entry
            }
            if !(mass > 0.0) || !mass.is_finite() {
                return Err(SimError::InvalidMass(mass));
            }
        }
        for &(a, b) in &self.edges {
            for index in [a as usize, b as usize] {
                if index >= self.positions.len() {
                    return Err(SimError::ParticleOutOfBounds {
                        index,
                        count: self.positions.len(),
                    });
                }
            }
        }
        for face in &self.surface {
            for &vertex in face {
                if vertex as usize >= self.positions.len() {
                    return Err(SimError::ParticleOutOfBounds {
                        index: vertex as usize,
                        count: self.positions.len(),
                    });
                }
            }
        }

        let first_particle = solver.particles().len();
        let first_constraint = solver.stats().constraint_count;

        for (local, (&position, &mass)) in
            self.positions.iter().zip(self.masses.iter()).enumerate()
        {
            if self.fixed.contains(&(local as u32)) {
                solver.add_fixed_particle(position, local as u32);
            } else {
                solver.add_particle(position, mass, local as u32)?;
            }
        }

        let base = first_particle as u32;
        let mut constraint_count = 0;

        for &(a, b) in &self.edges {
            let constraint = DistanceConstraint::between(
                base + a,
                base + b,
                solver.positions(),
                self.edge_compliance,
            )?;
            solver.add_constraint(Constraint::Distance(constraint))?;
            constraint_count += 1;
        }

        if !self.surface.is_empty() {
            let particles: Vec<u32> = (0..self.positions.len() as u32).map(|i| base + i).collect();
            let volume = VolumeConstraint::from_mesh(
                particles,
                self.surface.clone(),
                solver.positions(),
                self.volume_compliance,
            )?;
            solver.add_constraint(Constraint::Volume(volume))?;
            constraint_count += 1;
        }

        Ok(BodyHandle {
            first_particle,
            particle_count: self.positions.len(),
            first_constraint,
            constraint_count,
        })
    }
}
