use thiserror::Error;

/// Errors surfaced at setup/configuration time.
///
/// Steady-state numerical degeneracies (coincident particles, zero-area
/// faces) are handled by skipping the affected constraint for one
/// iteration and never produce an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// `substeps` must be at least 1.
    #[error("substeps must be at least 1")]
    InvalidSubsteps,

    /// `solver_iterations` must be at least 1.
    #[error("solver_iterations must be at least 1")]
    InvalidIterations,

    /// `global_damping` must be in (0, 1].
    #[error("global_damping must be in (0, 1], got {0}")]
    InvalidDamping(f32),

    /// Particle mass must be positive and finite.
    #[error("mass must be positive and finite, got {0}")]
    InvalidMass(f32),

    /// A constraint references a particle index outside the arena.
    #[error("particle index {index} out of bounds (count: {count})")]
    ParticleOutOfBounds { index: usize, count: usize },

    /// A constraint was constructed over an empty particle/face set.
    #[error("constraint references no particles")]
    EmptyConstraint,

    /// A body description's mass list does not match its position list.
    #[error("masses length {masses} does not match positions length {positions}")]
    MismatchedMasses { masses: usize, positions: usize },
}
