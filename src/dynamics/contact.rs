use super::solver::{ConstraintRow, ContactDirection, IslandSolver, Jacobian, RowSource};
use crate::collision::manifold::{CandidatePoint, ContactManifold};
use crate::collision::narrowphase::{CollisionInput, Detector};
use crate::config::ContactConfig;
use crate::core::shape::Shape;
use crate::core::types::Transform;
use crate::utils::allocator::{BodyHandle, ContactHandle, ShapeHandle};
use crate::utils::math::tangent_basis;

/// Touching-state change produced by one manifold update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchTransition {
    None,
    Began,
    Ended,
}

/// Persistent pairwise contact between two shapes on different bodies.
#[derive(Debug, Clone)]
pub struct Contact {
    pub(crate) shape1: ShapeHandle,
    pub(crate) shape2: ShapeHandle,
    pub(crate) body1: BodyHandle,
    pub(crate) body2: BodyHandle,
    pub(crate) detector: Detector,
    pub(crate) manifold: ContactManifold,
    pub(crate) friction: f32,
    pub(crate) restitution: f32,
    pub(crate) persisting: bool,
    pub(crate) touching: bool,
    pub(crate) close: bool,
    pub(crate) dist: f32,
    pub(crate) sleeping: bool,
    updated: bool,
    candidates: Vec<CandidatePoint>,
}

impl Contact {
    pub(crate) fn new(
        shapes: (ShapeHandle, ShapeHandle),
        bodies: (BodyHandle, BodyHandle),
        detector: Detector,
        friction: f32,
        restitution: f32,
    ) -> Self {
        Self {
            shape1: shapes.0,
            shape2: shapes.1,
            body1: bodies.0,
            body2: bodies.1,
            detector,
            manifold: ContactManifold::new(),
            friction,
            restitution,
            persisting: false,
            touching: false,
            close: false,
            dist: f32::MAX,
            sleeping: false,
            updated: false,
            candidates: Vec::new(),
        }
    }

    pub fn shapes(&self) -> (ShapeHandle, ShapeHandle) {
        (self.shape1, self.shape2)
    }

    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body1, self.body2)
    }

    pub fn manifold(&self) -> &ContactManifold {
        &self.manifold
    }

    /// Name of the narrow-phase detector serving this pair.
    pub fn detector_name(&self) -> &'static str {
        self.detector.name
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// The contact already existed during the previous step.
    pub fn is_persisting(&self) -> bool {
        self.persisting
    }

    pub fn is_touching(&self) -> bool {
        self.touching
    }

    /// At least one manifold point exists, touching or speculative.
    pub fn is_close(&self) -> bool {
        self.close
    }

    /// Smallest separation across the manifold.
    pub fn distance(&self) -> f32 {
        self.dist
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub(crate) fn other_body(&self, body: BodyHandle) -> BodyHandle {
        if self.body1 == body {
            self.body2
        } else {
            self.body1
        }
    }

    /// NARROWPHASE: refreshes persisted points, runs the detector and merges its output.
    pub(crate) fn update_manifold(
        &mut self,
        shapes: (&Shape, &Shape),
        bodies: (&Transform, &Transform),
        margin: f32,
        config: &ContactConfig,
    ) -> TouchTransition {
        let was_touching = self.touching;
        self.persisting = self.updated;
        self.updated = true;

        self.manifold
            .refresh(bodies.0, bodies.1, config.breaking_distance.max(margin));
        let first = CollisionInput {
            geometry: shapes.0.geometry(),
            transform: shapes.0.transform(),
        };
        let second = CollisionInput {
            geometry: shapes.1.geometry(),
            transform: shapes.1.transform(),
        };
        self.detector
            .detect(&first, &second, margin, &mut self.candidates);
        self.manifold.merge(
            &self.candidates,
            self.detector.mode,
            bodies.0,
            bodies.1,
            config.matching_radius,
        );

        self.close = !self.manifold.is_empty();
        self.dist = self.manifold.min_separation();
        self.touching = self.close && self.dist <= config.touch_tolerance;

        match (was_touching, self.touching) {
            (false, true) => TouchTransition::Began,
            (true, false) => TouchTransition::Ended,
            _ => TouchTransition::None,
        }
    }

    /// PRE_SOLVE: one normal and two friction rows per manifold point, friction first.
    pub(crate) fn build_rows(
        &self,
        handle: ContactHandle,
        indices: (usize, usize),
        job: &mut IslandSolver,
        dt: f32,
        config: &ContactConfig,
    ) {
        let (i1, i2) = indices;
        for (index, point) in self.manifold.points().iter().enumerate() {
            let b1 = job.bodies[i1];
            let b2 = job.bodies[i2];
            let normal = point.normal;
            let arm1 = point.position - b1.center;
            let arm2 = point.position - b2.center;
            let source = |direction| RowSource::Contact {
                contact: handle,
                point: index,
                direction,
            };

            let mut normal_row = ConstraintRow::new(
                i1,
                i2,
                Jacobian::translational(normal, arm1, arm2),
                source(ContactDirection::Normal),
            )
            .with_bounds(0.0, f32::INFINITY)
            .with_impulse(point.normal_impulse);

            let approach = normal_row.velocity_error(&job.bodies);
            let separation = point.separation;
            normal_row.target = if self.restitution > 0.0
                && approach < -config.bounce_threshold
                && separation + approach * dt <= config.linear_slop
            {
                -self.restitution * approach
            } else if separation > 0.0 {
                -separation / dt
            } else {
                config.baumgarte * (-separation - config.linear_slop).max(0.0) / dt
            };

            if !normal_row.prepare(&job.bodies) {
                job.skipped += 1;
                log::debug!("skipping degenerate contact point {index} of {handle:?}");
                continue;
            }

            let (tangent, binormal) = tangent_basis(normal);
            let mut friction_rows = Vec::with_capacity(2);
            for (axis, direction, impulse) in [
                (tangent, ContactDirection::Tangent, point.tangent_impulse),
                (binormal, ContactDirection::Binormal, point.binormal_impulse),
            ] {
                let row = ConstraintRow::new(
                    i1,
                    i2,
                    Jacobian::translational(axis, arm1, arm2),
                    source(direction),
                )
                .with_impulse(impulse);
                if let Some(at) = job.push_row(row) {
                    friction_rows.push(at);
                }
            }

            job.rows.push(normal_row);
            let normal_index = job.rows.len() - 1;
            for at in friction_rows {
                job.rows[at].friction = Some((normal_index, self.friction));
            }
        }
    }

    /// Stores solved impulses back into the manifold for next step's warm start.
    pub(crate) fn store_impulse(&mut self, point: usize, direction: ContactDirection, impulse: f32) {
        if let Some(p) = self.manifold.points_mut().get_mut(point) {
            match direction {
                ContactDirection::Normal => p.normal_impulse = impulse,
                ContactDirection::Tangent => p.tangent_impulse = impulse,
                ContactDirection::Binormal => p.binormal_impulse = impulse,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::narrowphase::DetectorTable;
    use crate::core::rigidbody::RigidBody;
    use crate::core::shape::{ShapeConfig, ShapeGeometry, ShapeType};
    use crate::utils::allocator::{ArenaHandle, GenerationalId};
    use glam::Vec3;

    fn id<H: ArenaHandle>(index: usize) -> H {
        H::from_id(GenerationalId::new(index, 0))
    }

    fn sphere_at(y: f32) -> (Shape, Transform) {
        let mut shape = Shape::new(id(0), ShapeGeometry::sphere(1.0), ShapeConfig::default());
        let transform = Transform::from_position(Vec3::new(0.0, y, 0.0));
        shape.update_proxy(&transform, 0.0, Vec3::ZERO);
        (shape, transform)
    }

    fn contact() -> Contact {
        let detector = DetectorTable::new()
            .get(ShapeType::Sphere, ShapeType::Sphere)
            .expect("supported");
        Contact::new((id(0), id(1)), (id(0), id(1)), detector, 0.5, 0.0)
    }

    #[test]
    fn touch_transitions_fire_once() {
        let config = ContactConfig::default();
        let mut contact = contact();
        let (s1, t1) = sphere_at(0.0);
        let (s2, t2) = sphere_at(1.9);
        assert_eq!(contact.update_manifold((&s1, &s2), (&t1, &t2), 0.0, &config), TouchTransition::Began);
        assert!(!contact.is_persisting());
        assert_eq!(contact.update_manifold((&s1, &s2), (&t1, &t2), 0.0, &config), TouchTransition::None);
        assert!(contact.is_persisting());

        let (s3, t3) = sphere_at(3.0);
        assert_eq!(contact.update_manifold((&s1, &s3), (&t1, &t3), 0.0, &config), TouchTransition::Ended);
        assert!(!contact.is_close());
    }

    #[test]
    fn rows_are_friction_first_and_linked() {
        let config = ContactConfig::default();
        let mut contact = contact();
        let (s1, t1) = sphere_at(0.0);
        let (s2, t2) = sphere_at(1.95);
        contact.update_manifold((&s1, &s2), (&t1, &t2), 0.0, &config);

        let fixed = RigidBody::fixed();
        let mut moving = RigidBody::dynamic();
        moving.setup_mass(&[(s2.mass_info(), Transform::default())]).expect("mass");
        let mut job = IslandSolver::new();
        let i1 = job.body_index(id(0), &fixed);
        let i2 = job.body_index(id(1), &moving);
        contact.build_rows(id(0), (i1, i2), &mut job, 1.0 / 60.0, &config);

        assert_eq!(job.rows.len(), 3);
        assert_eq!(job.rows[0].friction, Some((2, 0.5)));
        assert_eq!(job.rows[1].friction, Some((2, 0.5)));
        assert_eq!(job.rows[2].lower, 0.0);
        assert!(job.rows[2].target > 0.0, "penetration beyond slop is pushed out");
    }
}
