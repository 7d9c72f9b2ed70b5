use approx::assert_abs_diff_eq;
use impulse_physics::*;

const DT: f32 = 1.0 / 60.0;

fn make_world(gravity: Vec3) -> World {
    World::new(WorldConfig::default().with_gravity(gravity))
}

fn add_base(world: &mut World) -> BodyHandle {
    world.add_rigid_body(RigidBody::fixed()).expect("base")
}

fn add_box(world: &mut World, position: Vec3) -> BodyHandle {
    let cube = ShapeDesc::new(ShapeGeometry::cuboid(Vec3::splat(0.5)), ShapeConfig::default())
        .expect("box shape");
    world
        .add_rigid_body(RigidBody::dynamic().with_position(position).with_shape(cube))
        .expect("box")
}

fn add_ball(world: &mut World, position: Vec3) -> BodyHandle {
    let ball = ShapeDesc::new(ShapeGeometry::sphere(0.5), ShapeConfig::default()).expect("sphere");
    world
        .add_rigid_body(RigidBody::dynamic().with_position(position).with_shape(ball))
        .expect("ball")
}

fn anchor_distance(world: &World, joint: JointHandle) -> f32 {
    let (a1, a2) = world.joint(joint).expect("joint").anchors();
    (a2 - a1).length()
}

#[test]
fn distance_joint_settles_at_its_length() {
    for start in [3.0, 1.2] {
        let mut world = make_world(Vec3::new(0.0, -9.8, 0.0));
        let base = add_base(&mut world);
        let ball = add_ball(&mut world, Vec3::new(0.0, -start, 0.0));
        let joint = world
            .add_joint(base, ball, JointConfig::default(), JointDesc::distance(2.0, 2.0))
            .expect("joint");

        for _ in 0..300 {
            world.step(DT).expect("step");
        }
        let distance = world.body(ball).expect("ball").position().length();
        assert!(
            (distance - 2.0).abs() < 0.02,
            "started at {start}, settled at {distance}"
        );
        assert!(anchor_distance(&world, joint) > 1.9);
    }
}

#[test]
fn distance_range_leaves_the_interior_free() {
    let mut world = make_world(Vec3::ZERO);
    let base = add_base(&mut world);
    let ball = add_ball(&mut world, Vec3::new(1.5, 0.0, 0.0));
    world
        .add_joint(base, ball, JointConfig::default(), JointDesc::distance(1.0, 2.0))
        .expect("joint");
    world
        .body_mut(ball)
        .expect("ball")
        .set_linear_velocity(Vec3::new(3.0, 0.0, 0.0));

    // Free inside [1, 2]: the ball coasts, then the upper limit stops it.
    world.step(DT).expect("step");
    assert_abs_diff_eq!(world.body(ball).expect("ball").linear_velocity().x, 3.0, epsilon = 1e-4);
    for _ in 0..60 {
        world.step(DT).expect("step");
    }
    let x = world.body(ball).expect("ball").position().x;
    assert!(x <= 2.0 + 0.02, "ball passed the upper limit: {x}");
    assert!(x > 1.9);
}

#[test]
fn ball_and_socket_keeps_anchors_together() {
    let mut world = make_world(Vec3::new(0.0, -9.8, 0.0));
    let base = add_base(&mut world);
    let bob = add_box(&mut world, Vec3::new(1.0, 0.0, 0.0));
    let config = JointConfig::from_world(
        world.body(base).expect("base"),
        world.body(bob).expect("bob"),
        Vec3::ZERO,
        Vec3::Z,
    );
    let joint = world
        .add_joint(base, bob, config, JointDesc::ball_and_socket())
        .expect("joint");

    let mut worst: f32 = 0.0;
    for _ in 0..180 {
        world.step(DT).expect("step");
        worst = worst.max(anchor_distance(&world, joint));
    }
    assert!(worst < 0.08, "anchors drifted apart by {worst}");
    // The bob swung down below the pivot.
    assert!(world.body(bob).expect("bob").position().y < 0.0);
}

#[test]
fn locked_hinge_holds_against_torque() {
    let mut world = make_world(Vec3::ZERO);
    let base = add_base(&mut world);
    let door = add_box(&mut world, Vec3::ZERO);
    let config = JointConfig::default().with_axes(Vec3::Z, Vec3::Z);
    let joint = world
        .add_joint(base, door, config, JointDesc::hinge(LimitMotor::locked()))
        .expect("joint");

    for _ in 0..120 {
        world.body_mut(door).expect("door").apply_torque(Vec3::new(0.0, 0.0, 5.0));
        world.step(DT).expect("step");
    }

    let angle = world.joint(joint).expect("joint").angle().expect("hinge angle");
    assert_abs_diff_eq!(angle, 0.0, epsilon = 0.02);
    let rotation = world.body(door).expect("door").rotation();
    assert!(rotation.angle_between(Quat::IDENTITY) < 0.02);
}

#[test]
fn hinge_motor_reaches_target_speed() {
    let mut world = make_world(Vec3::ZERO);
    let base = add_base(&mut world);
    let wheel = add_box(&mut world, Vec3::ZERO);
    let config = JointConfig::default().with_axes(Vec3::Z, Vec3::Z);
    let motor = LimitMotor::free().with_motor(2.0, 100.0);
    world
        .add_joint(base, wheel, config, JointDesc::hinge(motor))
        .expect("joint");

    for _ in 0..60 {
        world.step(DT).expect("step");
    }
    let spin = world.body(wheel).expect("wheel").angular_velocity();
    assert_abs_diff_eq!(spin.z, 2.0, epsilon = 1e-2);
    assert_abs_diff_eq!(spin.x, 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(spin.y, 0.0, epsilon = 1e-3);
}

#[test]
fn hinge_limit_stops_motor() {
    let mut world = make_world(Vec3::ZERO);
    let base = add_base(&mut world);
    let arm = add_box(&mut world, Vec3::ZERO);
    let config = JointConfig::default().with_axes(Vec3::Z, Vec3::Z);
    let rotation = LimitMotor::limited(-0.5, 0.5).with_motor(2.0, 100.0);
    let joint = world
        .add_joint(base, arm, config, JointDesc::hinge(rotation))
        .expect("joint");

    let mut widest: f32 = 0.0;
    for _ in 0..200 {
        world.step(DT).expect("step");
        let angle = world.joint(joint).expect("joint").angle().expect("angle");
        widest = widest.max(angle.abs());
    }
    assert!(widest < 0.55, "limit overshot to {widest}");
    assert!(widest > 0.4, "motor should drive the arm to the limit");
}

#[test]
fn prismatic_slides_to_its_limit() {
    let mut world = make_world(Vec3::new(5.0, 0.0, 0.0));
    let base = add_base(&mut world);
    let carriage = add_box(&mut world, Vec3::ZERO);
    let joint = world
        .add_joint(
            base,
            carriage,
            JointConfig::default(),
            JointDesc::prismatic(LimitMotor::limited(-1.0, 1.0)),
        )
        .expect("joint");

    for _ in 0..200 {
        world.step(DT).expect("step");
    }
    let body = world.body(carriage).expect("carriage");
    assert!(body.position().x > 0.95 && body.position().x < 1.03, "x = {}", body.position().x);
    assert_abs_diff_eq!(body.position().y, 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(body.position().z, 0.0, epsilon = 1e-3);
    assert!(body.rotation().angle_between(Quat::IDENTITY) < 1e-3);
    let translation = world.joint(joint).expect("joint").translation().expect("translation");
    assert_abs_diff_eq!(translation, body.position().x, epsilon = 0.05);
}

#[test]
fn slider_allows_spin_and_travel_on_one_axis() {
    let mut world = make_world(Vec3::ZERO);
    let base = add_base(&mut world);
    let collar = add_box(&mut world, Vec3::ZERO);
    world
        .add_joint(
            base,
            collar,
            JointConfig::default(),
            JointDesc::slider(LimitMotor::free(), LimitMotor::free()),
        )
        .expect("joint");

    {
        let body = world.body_mut(collar).expect("collar");
        body.set_linear_velocity(Vec3::new(1.0, 1.0, 0.0));
        body.set_angular_velocity(Vec3::new(2.0, 0.0, 2.0));
    }
    world.step(DT).expect("step");

    let body = world.body(collar).expect("collar");
    assert_abs_diff_eq!(body.linear_velocity().x, 1.0, epsilon = 1e-3);
    assert_abs_diff_eq!(body.linear_velocity().y, 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(body.angular_velocity().x, 2.0, epsilon = 1e-3);
    assert_abs_diff_eq!(body.angular_velocity().z, 0.0, epsilon = 1e-3);
}

#[test]
fn wheel_spins_freely_about_its_axle() {
    let mut world = make_world(Vec3::ZERO);
    let chassis = add_base(&mut world);
    let wheel = add_ball(&mut world, Vec3::ZERO);
    let config = JointConfig::default().with_axes(Vec3::Y, Vec3::X);
    world
        .add_joint(chassis, wheel, config, JointDesc::wheel())
        .expect("joint");

    for _ in 0..30 {
        world.body_mut(wheel).expect("wheel").apply_torque(Vec3::new(1.0, 0.3, 0.3));
        world.step(DT).expect("step");
    }
    let body = world.body(wheel).expect("wheel");
    assert!(body.angular_velocity().x > 5.0);
    assert_abs_diff_eq!(body.angular_velocity().y, 0.0, epsilon = 0.05);
    assert_abs_diff_eq!(body.angular_velocity().z, 0.0, epsilon = 0.05);
    assert!(body.position().length() < 0.01);
}

#[test]
fn removing_a_joint_releases_the_bodies() {
    let mut world = make_world(Vec3::new(0.0, -9.8, 0.0));
    let base = add_base(&mut world);
    let ball = add_ball(&mut world, Vec3::new(0.0, -2.0, 0.0));
    let joint = world
        .add_joint(base, ball, JointConfig::default(), JointDesc::distance(2.0, 2.0))
        .expect("joint");
    for _ in 0..30 {
        world.step(DT).expect("step");
    }
    world.remove_joint(joint).expect("remove");
    assert!(world.body(ball).expect("ball").joints().is_empty());
    for _ in 0..30 {
        world.step(DT).expect("step");
    }
    assert!(world.body(ball).expect("ball").position().y < -2.5);
}
