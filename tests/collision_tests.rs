use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use impulse_physics::*;

const DT: f32 = 1.0 / 60.0;

fn shape(geometry: ShapeGeometry, config: ShapeConfig) -> ShapeDesc {
    ShapeDesc::new(geometry, config).expect("valid shape")
}

fn ground(world: &mut World) -> BodyHandle {
    world
        .add_rigid_body(
            RigidBody::fixed().with_shape(shape(ShapeGeometry::plane(Vec3::Y), ShapeConfig::default())),
        )
        .expect("ground")
}

/// Deterministic scatter of spheres and boxes drifting in zero gravity.
fn scattered_world(kind: BroadPhaseType) -> World {
    let config = WorldConfig::default()
        .with_gravity(Vec3::ZERO)
        .with_broad_phase(kind);
    let mut world = World::new(config);

    let mut seed: u32 = 0x2545_f491;
    let mut next = || {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (seed >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0
    };

    for i in 0..40 {
        let position = Vec3::new(next(), next(), next()) * 4.0;
        let velocity = Vec3::new(next(), next(), next());
        let geometry = if i % 2 == 0 {
            ShapeGeometry::sphere(0.5)
        } else {
            ShapeGeometry::cuboid(Vec3::splat(0.4))
        };
        world
            .add_rigid_body(
                RigidBody::dynamic()
                    .with_position(position)
                    .with_linear_velocity(velocity)
                    .with_shape(shape(geometry, ShapeConfig::default())),
            )
            .expect("body");
    }
    world
}

fn contact_pairs(world: &World) -> BTreeSet<(ShapeHandle, ShapeHandle)> {
    world.contacts().map(|(_, contact)| contact.shapes()).collect()
}

/// Every contact has overlapping bounds, and every overlapping pair of bodies has one contact.
fn assert_contacts_match_bounds(world: &World, step: usize) {
    for (_, contact) in world.contacts() {
        let (a, b) = contact.shapes();
        let (sa, sb) = (world.shape(a).expect("a"), world.shape(b).expect("b"));
        assert!(
            sa.aabb().overlaps(sb.aabb()),
            "step {step}: contact between {a:?} and {b:?} without overlapping bounds"
        );
    }

    let shapes: Vec<(ShapeHandle, &Shape)> = world.shapes().collect();
    let mut overlapping = 0;
    for (i, (ha, sa)) in shapes.iter().enumerate() {
        for (hb, sb) in &shapes[i + 1..] {
            if sa.body() != sb.body() && sa.aabb().overlaps(sb.aabb()) {
                overlapping += 1;
                assert!(
                    world.contact_between(*ha, *hb).is_some(),
                    "step {step}: missing contact for overlapping {ha:?}/{hb:?}"
                );
            }
        }
    }
    assert_eq!(world.contact_count(), overlapping, "step {step}: duplicate contacts");
}

#[test]
fn contacts_exist_exactly_for_overlapping_bounds() {
    let mut world = scattered_world(BroadPhaseType::SweepAndPrune);
    for step in 0..30 {
        world.step(DT).expect("step");
        assert_contacts_match_bounds(&world, step);
    }
}

#[test]
fn fast_bodies_keep_contacts_in_step_with_bounds() {
    let mut world = scattered_world(BroadPhaseType::BruteForce);
    let handles: Vec<BodyHandle> = world.bodies().map(|(handle, _)| handle).collect();
    for handle in handles {
        let body = world.body_mut(handle).expect("body");
        let velocity = body.linear_velocity() * 8.0;
        body.set_linear_velocity(velocity);
    }
    let mut observed = 0;
    for step in 0..30 {
        world.step(DT).expect("step");
        observed += world.contact_count();
        assert_contacts_match_bounds(&world, step);
    }
    assert!(observed > 0, "the scatter should produce some contacts");
}

#[test]
fn broad_phase_algorithms_agree() {
    let mut sweep = scattered_world(BroadPhaseType::SweepAndPrune);
    let mut brute = scattered_world(BroadPhaseType::BruteForce);
    for _ in 0..20 {
        sweep.step(DT).expect("sweep step");
        brute.step(DT).expect("brute step");
        assert_eq!(contact_pairs(&sweep), contact_pairs(&brute));
    }
}

#[test]
fn separated_shapes_lose_their_contact() {
    let mut world = World::new(WorldConfig::default().with_gravity(Vec3::ZERO));
    let ball = shape(ShapeGeometry::sphere(0.5), ShapeConfig::default());
    let a = world
        .add_rigid_body(RigidBody::dynamic().with_shape(ball.clone()))
        .expect("a");
    let b = world
        .add_rigid_body(
            RigidBody::dynamic()
                .with_position(Vec3::new(0.9, 0.0, 0.0))
                .with_shape(ball),
        )
        .expect("b");
    world.step(DT).expect("step");
    assert_eq!(world.contact_count(), 1);

    world.body_mut(b).expect("b").set_position(Vec3::new(10.0, 0.0, 0.0));
    world.step(DT).expect("step");
    assert_eq!(world.contact_count(), 0);
    assert!(world.body(a).expect("a").contacts().is_empty());
}

#[test]
fn collision_masks_filter_pairs() {
    let mut world = World::new(WorldConfig::default().with_gravity(Vec3::ZERO));
    let a = world
        .add_rigid_body(RigidBody::dynamic().with_shape(shape(
            ShapeGeometry::sphere(0.5),
            ShapeConfig::default().with_filter(0b01, 0b01),
        )))
        .expect("a");
    world
        .add_rigid_body(
            RigidBody::dynamic()
                .with_position(Vec3::new(0.8, 0.0, 0.0))
                .with_shape(shape(
                    ShapeGeometry::sphere(0.5),
                    ShapeConfig::default().with_filter(0b10, 0b10),
                )),
        )
        .expect("b");
    world.step(DT).expect("step");
    assert_eq!(world.contact_count(), 0);

    // Widening the mask takes effect at the next step.
    let shape_a = world.body(a).expect("a").shapes()[0];
    world
        .shape_mut(shape_a)
        .expect("shape")
        .set_collision_filter(0b11, 0b11)
        .expect("valid filter");
    world.step(DT).expect("step");
    assert_eq!(world.contact_count(), 1);
}

#[test]
fn shape_setters_reject_invalid_values() {
    let mut world = World::default();
    let body = world
        .add_rigid_body(RigidBody::dynamic().with_shape(shape(
            ShapeGeometry::sphere(0.5),
            ShapeConfig::default(),
        )))
        .expect("body");
    let handle = world.body(body).expect("body").shapes()[0];
    let shape = world.shape_mut(handle).expect("shape");

    assert!(shape.set_friction(-1.0).is_err());
    assert!(shape.set_restitution(f32::NAN).is_err());
    assert!(matches!(
        shape.set_collision_filter(0, u32::MAX),
        Err(PhysicsError::Configuration { .. })
    ));
    // Rejected values leave the previous configuration in place.
    assert_eq!(shape.config().filter, CollisionFilter::default());
    assert_eq!(shape.config().friction, ShapeConfig::default().friction);

    shape.set_collision_filter(0b100, 0b110).expect("valid filter");
    assert_eq!(shape.config().filter.belongs_to, 0b100);
}

#[test]
fn jointed_bodies_do_not_collide_unless_allowed() {
    let mut world = World::new(WorldConfig::default().with_gravity(Vec3::ZERO));
    let ball = shape(ShapeGeometry::sphere(0.5), ShapeConfig::default());
    let a = world
        .add_rigid_body(RigidBody::dynamic().with_shape(ball.clone()))
        .expect("a");
    let b = world
        .add_rigid_body(
            RigidBody::dynamic()
                .with_position(Vec3::new(0.9, 0.0, 0.0))
                .with_shape(ball),
        )
        .expect("b");
    let joint = world
        .add_joint(a, b, JointConfig::default(), JointDesc::distance(0.9, 0.9))
        .expect("joint");
    world.step(DT).expect("step");
    assert_eq!(world.contact_count(), 0);

    world.remove_joint(joint).expect("remove joint");
    world
        .add_joint(
            a,
            b,
            JointConfig::default().with_allow_collision(true),
            JointDesc::distance(0.9, 0.9),
        )
        .expect("joint");
    world.step(DT).expect("step");
    assert_eq!(world.contact_count(), 1);
}

#[test]
fn static_pairs_never_get_contacts() {
    let mut world = World::default();
    ground(&mut world);
    world
        .add_rigid_body(
            RigidBody::fixed().with_shape(shape(ShapeGeometry::cuboid(Vec3::ONE), ShapeConfig::default())),
        )
        .expect("static box");
    world.step(DT).expect("step");
    assert_eq!(world.contact_count(), 0);
}

#[test]
fn mixing_rules_are_symmetric() {
    let values = [0.0, 0.1, 0.35, 0.5, 1.0, 2.5];
    for &a in &values {
        for &b in &values {
            assert_eq!(mix_friction(a, b), mix_friction(b, a));
            assert_eq!(mix_restitution(a, b), mix_restitution(b, a));
        }
    }

    let mut world = World::new(WorldConfig::default().with_gravity(Vec3::ZERO));
    let slippery = ShapeConfig::default().with_friction(0.1).with_restitution(0.7);
    let grippy = ShapeConfig::default().with_friction(0.9).with_restitution(0.1);
    world
        .add_rigid_body(RigidBody::dynamic().with_shape(shape(ShapeGeometry::sphere(0.5), slippery)))
        .expect("a");
    world
        .add_rigid_body(
            RigidBody::dynamic()
                .with_position(Vec3::new(0.9, 0.0, 0.0))
                .with_shape(shape(ShapeGeometry::sphere(0.5), grippy)),
        )
        .expect("b");
    world.step(DT).expect("step");
    let (_, contact) = world.contacts().next().expect("contact");
    assert!((contact.friction() - 0.3).abs() < 1e-6);
    assert_eq!(contact.restitution(), 0.7);
}

#[test]
fn touching_transitions_fire_once() {
    let mut world = World::default();
    ground(&mut world);
    let begins = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&begins);
    world.set_contact_listener(move |event: &ContactEvent| {
        if event.is_begin() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let dead = ShapeConfig::default().with_restitution(0.0);
    let ball = world
        .add_rigid_body(
            RigidBody::dynamic()
                .with_position(Vec3::new(0.0, 1.5, 0.0))
                .with_shape(shape(ShapeGeometry::sphere(0.5), dead)),
        )
        .expect("ball");
    // The ground's default restitution would make the ball bounce.
    let plane = world
        .shapes()
        .find(|(_, s)| s.shape_type() == ShapeType::Plane)
        .map(|(h, _)| h)
        .expect("plane");
    world.shape_mut(plane).expect("plane").set_restitution(0.0).expect("restitution");

    for _ in 0..180 {
        world.step(DT).expect("step");
    }
    let events = world.drain_contact_events();
    assert_eq!(events.iter().filter(|e| e.is_begin()).count(), 1);
    assert_eq!(events.iter().filter(|e| !e.is_begin()).count(), 0);
    assert_eq!(begins.load(Ordering::SeqCst), 1);

    world.remove_rigid_body(ball).expect("remove");
    let events = world.drain_contact_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ContactEvent::End { .. }));
    assert_eq!(events[0].bodies().1, ball);
}
