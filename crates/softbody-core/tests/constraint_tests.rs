use glam::Vec3;
use softbody_core::config::SimConfig;
use softbody_core::constraints::{Constraint, DistanceConstraint, VolumeConstraint};
use softbody_core::error::SimError;
use softbody_core::particle::ParticleSet;
use softbody_core::solver::Solver;

fn zero_gravity_config(substeps: u32, iterations: u32) -> SimConfig {
    SimConfig {
        substeps,
        solver_iterations: iterations,
        gravity: Vec3::ZERO,
        global_damping: 1.0,
    }
}

#[test]
fn test_rigid_distance_error_monotone() {
    // Single rigid constraint between two free particles: error must be
    // non-increasing per iteration and essentially zero after 50.
    let mut particles = ParticleSet::new();
    particles.push(Vec3::ZERO, 1.0, false, 0);
    particles.push(Vec3::new(2.0, 0.0, 0.0), 1.0, false, 1);

    let mut constraint = DistanceConstraint::new(0, 1, 1.0, 0.0);
    let dt = 1.0 / 60.0;

    let mut prev_error = constraint.evaluate(&particles).abs();
    for _ in 0..50 {
        constraint.solve(&mut particles, dt);
        let error = constraint.evaluate(&particles).abs();
        assert!(
            error <= prev_error + 1e-6,
            "error must not increase: {} -> {}",
            prev_error,
            error
        );
        prev_error = error;
    }
    assert!(prev_error < 1e-4, "final error too large: {}", prev_error);
}

#[test]
fn test_chain_converges() {
    // Two constraints sharing a particle exercise the within-iteration
    // read-after-write (Gauss-Seidel) path.
    let mut particles = ParticleSet::new();
    particles.push(Vec3::ZERO, 1.0, false, 0);
    particles.push(Vec3::new(1.0, 0.0, 0.0), 1.0, false, 1);
    particles.push(Vec3::new(2.0, 0.0, 0.0), 1.0, false, 2);

    let mut c0 = DistanceConstraint::new(0, 1, 0.5, 0.0);
    let mut c1 = DistanceConstraint::new(1, 2, 0.5, 0.0);
    let dt = 1.0 / 60.0;

    for _ in 0..50 {
        c0.solve(&mut particles, dt);
        c1.solve(&mut particles, dt);
    }

    assert!(
        c0.evaluate(&particles).abs() < 1e-4,
        "first link not satisfied: {}",
        c0.evaluate(&particles)
    );
    assert!(
        c1.evaluate(&particles).abs() < 1e-4,
        "second link not satisfied: {}",
        c1.evaluate(&particles)
    );
}

#[test]
fn test_symmetric_correction_preserves_midpoint() {
    let mut solver = Solver::new(zero_gravity_config(1, 20)).unwrap();
    let a = solver.add_particle(Vec3::ZERO, 1.0, 0).unwrap();
    let b = solver.add_particle(Vec3::new(2.0, 0.0, 0.0), 1.0, 1).unwrap();
    solver
        .add_constraint(Constraint::Distance(DistanceConstraint::new(
            a as u32, b as u32, 1.0, 0.0,
        )))
        .unwrap();

    solver.step(0.016);

    let pa = solver.positions()[a];
    let pb = solver.positions()[b];
    let separation = pa.distance(pb);
    assert!(
        (separation - 1.0).abs() < 1e-3,
        "separation should reach rest length, got {}",
        separation
    );

    let midpoint = (pa + pb) * 0.5;
    assert!(
        midpoint.distance(Vec3::new(1.0, 0.0, 0.0)) < 1e-4,
        "equal masses must be corrected symmetrically, midpoint {:?}",
        midpoint
    );
}

#[test]
fn test_coincident_particles_skipped() {
    // Correction direction is undefined; the solve must skip, not divide
    // by zero.
    let mut solver = Solver::new(zero_gravity_config(1, 10)).unwrap();
    let a = solver.add_particle(Vec3::new(1.0, 1.0, 1.0), 1.0, 0).unwrap();
    let b = solver.add_particle(Vec3::new(1.0, 1.0, 1.0), 1.0, 1).unwrap();
    solver
        .add_constraint(Constraint::Distance(DistanceConstraint::new(
            a as u32, b as u32, 1.0, 0.0,
        )))
        .unwrap();

    solver.step(0.016);

    for p in solver.positions() {
        assert!(p.is_finite(), "positions must stay finite, got {:?}", p);
        assert_eq!(*p, Vec3::new(1.0, 1.0, 1.0), "degenerate pair must not move");
    }
}

#[test]
fn test_higher_compliance_leaves_larger_residual() {
    let dt = 0.016;
    let mut residuals = Vec::new();

    for compliance in [0.0, 0.1] {
        let mut solver = Solver::new(zero_gravity_config(1, 4)).unwrap();
        let a = solver.add_particle(Vec3::ZERO, 1.0, 0).unwrap();
        let b = solver.add_particle(Vec3::new(2.0, 0.0, 0.0), 1.0, 1).unwrap();
        solver
            .add_constraint(Constraint::Distance(DistanceConstraint::new(
                a as u32, b as u32, 1.0, compliance,
            )))
            .unwrap();
        solver.step(dt);
        let separation = solver.positions()[a].distance(solver.positions()[b]);
        residuals.push((separation - 1.0).abs());
    }

    assert!(
        residuals[1] > residuals[0] + 1e-3,
        "compliant constraint should correct less per step: rigid residual {}, soft residual {}",
        residuals[0],
        residuals[1]
    );
}

#[test]
fn test_inactive_constraint_is_skipped() {
    let mut solver = Solver::new(zero_gravity_config(1, 20)).unwrap();
    let a = solver.add_particle(Vec3::ZERO, 1.0, 0).unwrap();
    let b = solver.add_particle(Vec3::new(2.0, 0.0, 0.0), 1.0, 1).unwrap();
    let c = solver
        .add_constraint(Constraint::Distance(DistanceConstraint::new(
            a as u32, b as u32, 1.0, 0.0,
        )))
        .unwrap();

    solver.constraint_mut(c).unwrap().set_active(false);
    solver.step(0.016);

    let separation = solver.positions()[a].distance(solver.positions()[b]);
    assert!(
        (separation - 2.0).abs() < 1e-6,
        "inactive constraint must not correct, separation {}",
        separation
    );

    // Re-enabling picks the violation back up.
    solver.constraint_mut(c).unwrap().set_active(true);
    solver.step(0.016);
    let separation = solver.positions()[a].distance(solver.positions()[b]);
    assert!(
        (separation - 1.0).abs() < 1e-3,
        "re-enabled constraint should solve, separation {}",
        separation
    );
}

#[test]
fn test_between_checks_bounds() {
    let positions = [Vec3::ZERO, Vec3::new(0.0, 0.0, 3.0)];

    let constraint = DistanceConstraint::between(0, 1, &positions, 0.0);
    assert!(constraint.is_ok());
    assert!((constraint.unwrap().rest_length - 3.0).abs() < 1e-6);

    assert_eq!(
        DistanceConstraint::between(0, 2, &positions, 0.0).err(),
        Some(SimError::ParticleOutOfBounds { index: 2, count: 2 })
    );
}

#[test]
fn test_all_fixed_is_noop() {
    let mut solver = Solver::new(zero_gravity_config(1, 20)).unwrap();
    let a = solver.add_fixed_particle(Vec3::ZERO, 0);
    let b = solver.add_fixed_particle(Vec3::new(2.0, 0.0, 0.0), 1);
    solver
        .add_constraint(Constraint::Distance(DistanceConstraint::new(
            a as u32, b as u32, 1.0, 0.0,
        )))
        .unwrap();

    solver.step(0.016);

    assert_eq!(solver.positions()[a], Vec3::ZERO);
    assert_eq!(solver.positions()[b], Vec3::new(2.0, 0.0, 0.0));
}

fn tetrahedron_particles() -> (ParticleSet, Vec<u32>, Vec<[u32; 3]>) {
    let mut particles = ParticleSet::new();
    particles.push(Vec3::new(0.0, 0.0, 0.0), 1.0, false, 0);
    particles.push(Vec3::new(1.0, 0.0, 0.0), 1.0, false, 1);
    particles.push(Vec3::new(0.0, 1.0, 0.0), 1.0, false, 2);
    particles.push(Vec3::new(0.0, 0.0, 1.0), 1.0, false, 3);
    let indices = vec![0, 1, 2, 3];
    let faces = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
    (particles, indices, faces)
}

#[test]
fn test_volume_satisfied_at_rest() {
    let (particles, indices, faces) = tetrahedron_particles();
    let constraint =
        VolumeConstraint::from_mesh(indices, faces, &particles.position, 0.0).unwrap();
    assert!(
        constraint.evaluate(&particles).abs() < 1e-6,
        "freshly built volume constraint must evaluate to zero"
    );
}

#[test]
fn test_volume_restored_after_compression() {
    let (mut particles, indices, faces) = tetrahedron_particles();
    let mut constraint =
        VolumeConstraint::from_mesh(indices, faces, &particles.position, 0.0).unwrap();
    let rest = constraint.rest_volume;

    // Squash all vertices toward the centroid.
    let centroid: Vec3 = particles.position.iter().sum::<Vec3>() / 4.0;
    for p in particles.predicted.iter_mut() {
        *p = centroid + (*p - centroid) * 0.5;
    }

    let initial_error = constraint.evaluate(&particles).abs();
    assert!(initial_error > 0.1 * rest, "compression should violate volume");

    let dt = 1.0 / 60.0;
    for _ in 0..50 {
        constraint.solve(&mut particles, dt);
    }

    let final_error = constraint.evaluate(&particles).abs();
    assert!(
        final_error < 0.05 * rest,
        "volume should be restored within 5%: rest {}, error {}",
        rest,
        final_error
    );
}

#[test]
fn test_volume_gradient_expands_compressed_body() {
    let (mut particles, indices, faces) = tetrahedron_particles();
    let mut constraint =
        VolumeConstraint::from_mesh(indices, faces, &particles.position, 0.0).unwrap();

    let centroid: Vec3 = particles.position.iter().sum::<Vec3>() / 4.0;
    for p in particles.predicted.iter_mut() {
        *p = centroid + (*p - centroid) * 0.5;
    }

    let before = constraint.evaluate(&particles);
    constraint.solve(&mut particles, 1.0 / 60.0);
    let after = constraint.evaluate(&particles);

    assert!(
        after > before,
        "a single pass must push the volume back toward rest: {} -> {}",
        before,
        after
    );
}
