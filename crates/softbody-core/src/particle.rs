use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// SoA particle arena.
///
/// Velocity is implicit: `(position - prev_position) / dt`. Keeping it
/// implicit means there is no separate velocity state that can drift out
/// of sync with positions between the predict and commit phases.
///
/// The solver owns exactly one `ParticleSet`; constraints reference
/// particles through plain indices into these arrays.
pub struct ParticleSet {
    pub position: Vec<Vec3>,
    pub prev_position: Vec<Vec3>,
    /// Tentative positions written by `predict` and corrected in place by
    /// constraint projection.
    pub predicted: Vec<Vec3>,
    /// Reciprocal mass; 0.0 = infinite mass (immovable).
    pub inv_mass: Vec<f32>,
    /// Fixed particles ignore every position-mutating operation.
    pub fixed: Vec<bool>,
    /// Caller-supplied tag mapping a particle back to its source topology
    /// (mesh vertex id or similar). Not consumed internally.
    pub topology_index: Vec<u32>,
    /// Ground-contact bookkeeping: true while the particle is resting on
    /// or penetrating the ground plane. Lets the ground constraint apply
    /// restitution once per impact instead of once per iteration.
    pub grounded: Vec<bool>,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self {
            position: Vec::new(),
            prev_position: Vec::new(),
            predicted: Vec::new(),
            inv_mass: Vec::new(),
            fixed: Vec::new(),
            topology_index: Vec::new(),
            grounded: Vec::new(),
        }
    }

    /// Append a particle at rest and return its index.
    pub fn push(&mut self, position: Vec3, inv_mass: f32, fixed: bool, topology_index: u32) -> usize {
        let idx = self.position.len();
        self.position.push(position);
        self.prev_position.push(position);
        self.predicted.push(position);
        self.inv_mass.push(if fixed { 0.0 } else { inv_mass });
        self.fixed.push(fixed);
        self.topology_index.push(topology_index);
        self.grounded.push(false);
        idx
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Verlet prediction: `predicted = position + (position - prev) + g*dt^2`.
    ///
    /// Fixed particles get `predicted = position` so constraints see a
    /// consistent buffer without moving them.
    pub fn predict(&mut self, gravity: Vec3, dt: f32) {
        let accel_term = gravity * (dt * dt);

        #[cfg(feature = "parallel")]
        {
            let position = &self.position;
            let prev = &self.prev_position;
            let fixed = &self.fixed;
            self.predicted
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, p)| {
                    *p = if fixed[i] {
                        position[i]
                    } else {
                        position[i] + (position[i] - prev[i]) + accel_term
                    };
                });
        }

        #[cfg(not(feature = "parallel"))]
        for i in 0..self.position.len() {
            self.predicted[i] = if self.fixed[i] {
                self.position[i]
            } else {
                self.position[i] + (self.position[i] - self.prev_position[i]) + accel_term
            };
        }
    }

    /// Commit the solve result and damp the implicit velocity in one pass.
    ///
    /// Equivalent to `prev = position; position = predicted` followed by
    /// `prev = position - (position - prev) * damping`.
    pub fn commit_and_damp(&mut self, damping: f32) {
        #[cfg(feature = "parallel")]
        {
            let predicted = &self.predicted;
            let fixed = &self.fixed;
            self.position
                .par_iter_mut()
                .zip(self.prev_position.par_iter_mut())
                .enumerate()
                .for_each(|(i, (pos, prev))| {
                    if !fixed[i] {
                        *prev = predicted[i] - (predicted[i] - *pos) * damping;
                        *pos = predicted[i];
                    }
                });
        }

        #[cfg(not(feature = "parallel"))]
        for i in 0..self.position.len() {
            if !self.fixed[i] {
                let p = self.predicted[i];
                self.prev_position[i] = p - (p - self.position[i]) * damping;
                self.position[i] = p;
            }
        }
    }

    /// Apply a one-off impulse: shifts implicit velocity by `impulse * inv_mass`.
    ///
    /// Valid between steps; the next predict phase picks the change up
    /// through the position history.
    pub fn apply_impulse(&mut self, index: usize, impulse: Vec3, dt: f32) {
        if !self.fixed[index] {
            self.position[index] += impulse * self.inv_mass[index] * dt;
        }
    }

    /// Implicit velocity of one particle for the given step size.
    pub fn implicit_velocity(&self, index: usize, dt: f32) -> Vec3 {
        if dt.abs() < 1e-30 {
            return Vec3::ZERO;
        }
        (self.position[index] - self.prev_position[index]) / dt
    }

    /// Zero all implicit velocities without touching positions.
    pub fn zero_velocities(&mut self) {
        for i in 0..self.position.len() {
            self.prev_position[i] = self.position[i];
            self.predicted[i] = self.position[i];
            self.grounded[i] = false;
        }
    }

    pub fn clear(&mut self) {
        self.position.clear();
        self.prev_position.clear();
        self.predicted.clear();
        self.inv_mass.clear();
        self.fixed.clear();
        self.topology_index.clear();
        self.grounded.clear();
    }

    /// Raw byte view of the position buffer, for upload to a renderer.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.position)
    }
}

impl Default for ParticleSet {
    fn default() -> Self {
        Self::new()
    }
}
