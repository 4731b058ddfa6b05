//! Compliance-based position dynamics (XPBD) for deformable bodies.
//!
//! `softbody-core` advances a particle-and-constraint mesh frame by frame
//! with time-step-independent stiffness: constraints store compliance
//! (inverse stiffness) instead of stiffness, so the material response is
//! stable under 1x, 4x, or 16x sub-stepping.
//!
//! The crate is the simulation core only. Rendering, topology generation,
//! material presets, and host-loop scheduling are collaborators: the host
//! owns a [`Solver`], feeds it a setup-time data contract
//! ([`SoftBodyDesc`] or direct `add_particle`/`add_constraint` calls), and
//! calls [`Solver::step`] once per frame tick.
//!
//! Reference: "XPBD: Position-Based Simulation of Compliant Constrained Dynamics",
//! Macklin et al., 2016

pub mod body;
pub mod config;
pub mod constraints;
pub mod error;
pub mod particle;
pub mod solver;

pub use body::{BodyHandle, SoftBodyDesc};
pub use config::SimConfig;
pub use constraints::{Constraint, DistanceConstraint, GroundConstraint, VolumeConstraint};
pub use error::SimError;
pub use particle::ParticleSet;
pub use solver::{SimStats, Solver};
