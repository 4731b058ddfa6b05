use glam::Vec3;

use crate::error::SimError;
use crate::particle::ParticleSet;

/// XPBD volume constraint over a closed triangle surface.
///
/// Resists collapse/expansion of the enclosed region. Typically run with a
/// higher compliance than the structural distance constraints, since
/// volume preservation is a softer material behavior than edge rigidity.
///
/// The enclosed volume is the signed surface integral
/// `V = sum over faces of p0 . (p1 x p2) / 6`, which for a closed surface
/// equals the tetrahedral decomposition about any reference point.
pub struct VolumeConstraint {
    /// Global particle indices of the surface vertices.
    pub particles: Vec<u32>,
    /// Triangles as indices into `particles`, wound outward.
    pub faces: Vec<[u32; 3]>,
    /// Target enclosed volume.
    pub rest_volume: f32,
    /// Compliance (inverse stiffness). 0.0 = rigid.
    pub compliance: f32,
    /// Accumulated Lagrange multiplier (reset each substep).
    pub lambda: f32,
    pub active: bool,
    /// Per-vertex gradient scratch, reused across iterations.
    gradients: Vec<Vec3>,
}

impl VolumeConstraint {
    /// Build a constraint whose rest volume is computed from the current
    /// positions of the referenced particles.
    pub fn from_mesh(
        particles: Vec<u32>,
        faces: Vec<[u32; 3]>,
        positions: &[Vec3],
        compliance: f32,
    ) -> Result<Self, SimError> {
        if particles.is_empty() || faces.is_empty() {
            return Err(SimError::EmptyConstraint);
        }
        for face in &faces {
            for &local in face {
                if local as usize >= particles.len() {
                    return Err(SimError::ParticleOutOfBounds {
                        index: local as usize,
                        count: particles.len(),
                    });
                }
            }
        }
        for &global in &particles {
            if global as usize >= positions.len() {
                return Err(SimError::ParticleOutOfBounds {
                    index: global as usize,
                    count: positions.len(),
                });
            }
        }

        let rest_volume = enclosed_volume(&particles, &faces, positions);
        let vertex_count = particles.len();
        Ok(Self {
            particles,
            faces,
            rest_volume,
            compliance,
            lambda: 0.0,
            active: true,
            gradients: vec![Vec3::ZERO; vertex_count],
        })
    }

    fn current_volume(&self, positions: &[Vec3]) -> f32 {
        enclosed_volume(&self.particles, &self.faces, positions)
    }

    /// Signed violation: current volume minus rest volume, over predicted
    /// positions.
    pub fn evaluate(&self, particles: &ParticleSet) -> f32 {
        self.current_volume(&particles.predicted) - self.rest_volume
    }

    /// One XPBD projection pass shared across the whole vertex set.
    ///
    /// Per-vertex gradient is the accumulated face contribution: for a
    /// face (a, b, c), dV/da = (b x c)/6, dV/db = (c x a)/6,
    /// dV/dc = (a x b)/6.
    pub fn solve(&mut self, particles: &mut ParticleSet, dt: f32) {
        for g in self.gradients.iter_mut() {
            *g = Vec3::ZERO;
        }

        for face in &self.faces {
            let pa = particles.predicted[self.particles[face[0] as usize] as usize];
            let pb = particles.predicted[self.particles[face[1] as usize] as usize];
            let pc = particles.predicted[self.particles[face[2] as usize] as usize];
            self.gradients[face[0] as usize] += pb.cross(pc) / 6.0;
            self.gradients[face[1] as usize] += pc.cross(pa) / 6.0;
            self.gradients[face[2] as usize] += pa.cross(pb) / 6.0;
        }

        let alpha_tilde = self.compliance / (dt * dt);
        let mut weighted_grad_sq = 0.0;
        for (local, &global) in self.particles.iter().enumerate() {
            weighted_grad_sq +=
                particles.inv_mass[global as usize] * self.gradients[local].length_squared();
        }

        let denom = weighted_grad_sq + alpha_tilde;
        if denom < 1e-10 {
            return; // degenerate or fully immovable, retry next iteration
        }

        let c_val = self.current_volume(&particles.predicted) - self.rest_volume;
        let delta_lambda = -(c_val + alpha_tilde * self.lambda) / denom;
        self.lambda += delta_lambda;

        for (local, &global) in self.particles.iter().enumerate() {
            let w = particles.inv_mass[global as usize];
            particles.predicted[global as usize] += self.gradients[local] * (w * delta_lambda);
        }
    }

    pub fn validate(&self, particle_count: usize) -> Result<(), SimError> {
        if self.particles.is_empty() || self.faces.is_empty() {
            return Err(SimError::EmptyConstraint);
        }
        for &global in &self.particles {
            if global as usize >= particle_count {
                return Err(SimError::ParticleOutOfBounds {
                    index: global as usize,
                    count: particle_count,
                });
            }
        }
        Ok(())
    }
}

/// Signed enclosed volume of a closed triangle surface.
fn enclosed_volume(particles: &[u32], faces: &[[u32; 3]], positions: &[Vec3]) -> f32 {
    let mut volume = 0.0;
    for face in faces {
        let pa = positions[particles[face[0] as usize] as usize];
        let pb = positions[particles[face[1] as usize] as usize];
        let pc = positions[particles[face[2] as usize] as usize];
        volume += pa.dot(pb.cross(pc)) / 6.0;
    }
    volume
}

#[cfg(test)]
mod tests {
    use super::*;

    // Unit tetrahedron with outward-wound faces.
    fn tetrahedron() -> (Vec<Vec3>, Vec<u32>, Vec<[u32; 3]>) {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let particles = vec![0, 1, 2, 3];
        let faces = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
        (positions, particles, faces)
    }

    #[test]
    fn test_tetrahedron_volume() {
        let (positions, particles, faces) = tetrahedron();
        let volume = enclosed_volume(&particles, &faces, &positions);
        assert!(
            (volume - 1.0 / 6.0).abs() < 1e-6,
            "unit tetrahedron volume should be 1/6, got {}",
            volume
        );
    }

    #[test]
    fn test_volume_translation_invariant() {
        let (positions, particles, faces) = tetrahedron();
        let shifted: Vec<Vec3> = positions
            .iter()
            .map(|p| *p + Vec3::new(10.0, -3.0, 7.0))
            .collect();
        let volume = enclosed_volume(&particles, &faces, &shifted);
        assert!(
            (volume - 1.0 / 6.0).abs() < 1e-4,
            "closed-surface volume must not depend on the reference point, got {}",
            volume
        );
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let err = VolumeConstraint::from_mesh(vec![], vec![], &[], 0.0);
        assert!(err.is_err(), "empty mesh should be rejected");
    }
}
