use crate::error::SimError;
use crate::particle::ParticleSet;

/// Flat ground plane at `y = height`, applied to every particle.
///
/// The ground is modeled as effectively rigid: penetrating particles are
/// snapped to the plane regardless of compliance. Restitution is a
/// discrete bounce-once-per-impact event gated by the per-particle
/// `grounded` flag in the arena; friction uses a static/dynamic Coulomb
/// split on the tangential sub-step displacement.
pub struct GroundConstraint {
    /// Y coordinate of the plane.
    pub height: f32,
    /// Bounce coefficient in [0, 1]. 0 = inelastic.
    pub restitution: f32,
    /// Tangential motion below `static_friction * depth` is fully clamped.
    pub static_friction: f32,
    /// Above the static threshold, tangential motion is damped by
    /// `dynamic_friction * depth / |tangential|`.
    pub dynamic_friction: f32,
    pub active: bool,
}

impl GroundConstraint {
    pub fn new(height: f32, restitution: f32, static_friction: f32, dynamic_friction: f32) -> Self {
        Self {
            height,
            restitution,
            static_friction,
            dynamic_friction,
            active: true,
        }
    }

    /// Total penetration depth over predicted positions. Zero when no
    /// particle is below the plane.
    pub fn evaluate(&self, particles: &ParticleSet) -> f32 {
        let mut total = 0.0;
        for i in 0..particles.len() {
            if particles.fixed[i] {
                continue;
            }
            let depth = self.height - particles.predicted[i].y;
            if depth > 0.0 {
                total += depth;
            }
        }
        total
    }

    /// Resolve penetration for every non-fixed particle.
    ///
    /// 1. Hard snap: `predicted.y = height`.
    /// 2. Restitution, only on the non-penetrating -> penetrating
    ///    transition: reflect the vertical sub-step displacement scaled by
    ///    `restitution`, by moving the committed-from position so the next
    ///    implicit velocity points upward.
    /// 3. Friction on the tangential sub-step displacement.
    pub fn solve(&self, particles: &mut ParticleSet, _dt: f32) {
        for i in 0..particles.len() {
            if particles.fixed[i] {
                continue;
            }

            let depth = self.height - particles.predicted[i].y;
            if depth <= 0.0 {
                // A snapped particle sits exactly on the plane; only a
                // strictly-above position ends the contact.
                if depth < 0.0 {
                    particles.grounded[i] = false;
                }
                continue;
            }

            // Vertical displacement this sub-step, measured before the snap.
            let dy = particles.predicted[i].y - particles.position[i].y;
            particles.predicted[i].y = self.height;

            if !particles.grounded[i] {
                particles.grounded[i] = true;
                if dy < 0.0 {
                    // After commit the implicit velocity becomes
                    // predicted - position, so shifting position.y below the
                    // plane yields an upward rebound of restitution * |dy|.
                    particles.position[i].y = self.height + self.restitution * dy;
                }
            }

            // Friction acts on the tangential displacement accumulated
            // this sub-step.
            let dx = particles.predicted[i].x - particles.position[i].x;
            let dz = particles.predicted[i].z - particles.position[i].z;
            let tangential = (dx * dx + dz * dz).sqrt();
            if tangential < 1e-10 {
                continue;
            }

            if tangential < self.static_friction * depth {
                // Static: clamp horizontal motion entirely.
                particles.predicted[i].x = particles.position[i].x;
                particles.predicted[i].z = particles.position[i].z;
            } else {
                let scale = (self.dynamic_friction * depth / tangential).min(1.0);
                particles.predicted[i].x -= dx * scale;
                particles.predicted[i].z -= dz * scale;
            }
        }
    }

    /// The ground references no particle indices; always valid.
    pub fn validate(&self, _particle_count: usize) -> Result<(), SimError> {
        Ok(())
    }
}
