mod events;
mod snapshot;

pub use events::{ContactEvent, ContactListener};
pub use snapshot::{BodyPose, SnapshotReader, TransformSnapshot};

use std::collections::HashMap;
use std::time::Instant;

use glam::Vec3;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    collision::{broadphase::BroadPhase, narrowphase::DetectorTable},
    config::WorldConfig,
    core::{
        rigidbody::RigidBody,
        shape::{Shape, ShapeDesc, ShapeGeometry},
        types::{mix_friction, mix_restitution, MassInfo, Transform},
    },
    dynamics::{
        axis::JOINT_SLOTS,
        contact::{Contact, TouchTransition},
        island::IslandManager,
        joint::{Joint, JointConfig, JointDesc},
        solver::{IslandSolver, RowSource},
    },
    error::{PhysicsError, Result},
    utils::{
        allocator::{Arena, ArenaHandle, BodyHandle, ContactHandle, JointHandle, ShapeHandle},
        profiling::{ScopedTimer, StepProfile},
    },
};

fn stale<H: ArenaHandle>() -> PhysicsError {
    PhysicsError::StaleHandle { kind: H::KIND }
}

/// Central simulation container owning every body, shape, contact and joint.
pub struct World {
    config: WorldConfig,
    bodies: Arena<RigidBody, BodyHandle>,
    shapes: Arena<Shape, ShapeHandle>,
    contacts: Arena<Contact, ContactHandle>,
    joints: Arena<Joint, JointHandle>,
    pair_index: HashMap<(ShapeHandle, ShapeHandle), ContactHandle>,
    broad_phase: BroadPhase,
    detectors: DetectorTable,
    islands: IslandManager,
    pairs: Vec<(ShapeHandle, ShapeHandle)>,
    events: Vec<ContactEvent>,
    listener: Option<Box<dyn ContactListener>>,
    snapshot: SnapshotReader,
    profile: StepProfile,
    step_count: u64,
    last_dt: f32,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            bodies: Arena::new(),
            shapes: Arena::new(),
            contacts: Arena::new(),
            joints: Arena::new(),
            pair_index: HashMap::new(),
            broad_phase: BroadPhase::new(config.broad_phase),
            detectors: DetectorTable::new(),
            islands: IslandManager::new(),
            pairs: Vec::new(),
            events: Vec::new(),
            listener: None,
            snapshot: SnapshotReader::default(),
            profile: StepProfile::default(),
            step_count: 0,
            last_dt: 1.0 / 60.0,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    /// Number of completed steps.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Registers a body together with the shapes attached through `RigidBody::with_shape`.
    pub fn add_rigid_body(&mut self, mut body: RigidBody) -> Result<BodyHandle> {
        let descs = std::mem::take(&mut body.pending_shapes);
        for desc in &descs {
            check_plane(&body, desc)?;
        }
        let mass_infos: Vec<(MassInfo, Transform)> = descs.iter().map(desc_mass_info).collect();
        body.setup_mass(&mass_infos)?;
        body.shapes.clear();
        body.joints.clear();
        body.contacts.clear();

        let transform = body.transform;
        let handle = self.bodies.insert(body);
        let shape_handles: Vec<ShapeHandle> = descs
            .into_iter()
            .map(|desc| self.attach_shape(handle, &transform, desc))
            .collect();

        if let Some(body) = self.bodies.get_mut(handle) {
            log::debug!(
                "added {:?} body {:?} with {} shapes (mass {:.3})",
                body.body_type(),
                handle,
                shape_handles.len(),
                body.mass()
            );
            body.shapes = shape_handles;
        }
        Ok(handle)
    }

    /// Destroys a body. Its shapes go first, taking their contacts along, then attached joints.
    pub fn remove_rigid_body(&mut self, handle: BodyHandle) -> Result<()> {
        let body = self.bodies.get(handle).ok_or_else(stale::<BodyHandle>)?;
        let shapes = body.shapes.clone();
        let joints = body.joints.clone();

        for shape in shapes {
            self.detach_shape(shape);
        }
        for joint in joints {
            self.detach_joint(joint);
        }

        self.bodies.remove(handle).ok_or_else(stale::<BodyHandle>)?;
        log::debug!("removed body {handle:?}");
        Ok(())
    }

    /// Attaches another shape to a registered body and recomputes its mass.
    pub fn add_shape(&mut self, body: BodyHandle, desc: ShapeDesc) -> Result<ShapeHandle> {
        let owner = self.bodies.get(body).ok_or_else(stale::<BodyHandle>)?;
        check_plane(owner, &desc)?;
        let mut mass_infos = self.mass_infos(&owner.shapes);
        mass_infos.push(desc_mass_info(&desc));

        let owner = self.bodies.get_mut(body).ok_or_else(stale::<BodyHandle>)?;
        owner.setup_mass(&mass_infos)?;
        owner.wake_up();
        let transform = owner.transform;

        let handle = self.attach_shape(body, &transform, desc);
        if let Some(owner) = self.bodies.get_mut(body) {
            owner.shapes.push(handle);
        }
        log::debug!("added shape {handle:?} to body {body:?}");
        Ok(handle)
    }

    /// Detaches a shape, destroying its contacts and recomputing the owner's mass.
    /// The last shape of a dynamic body cannot be removed.
    pub fn remove_shape(&mut self, handle: ShapeHandle) -> Result<()> {
        let body = self.shapes.get(handle).ok_or_else(stale::<ShapeHandle>)?.body;
        let owner = self.bodies.get(body).ok_or_else(stale::<BodyHandle>)?;
        let remaining: Vec<ShapeHandle> = owner
            .shapes
            .iter()
            .copied()
            .filter(|&shape| shape != handle)
            .collect();
        let mass_infos = self.mass_infos(&remaining);

        let owner = self.bodies.get_mut(body).ok_or_else(stale::<BodyHandle>)?;
        owner.setup_mass(&mass_infos)?;
        owner.shapes = remaining;
        owner.wake_up();

        self.detach_shape(handle);
        log::debug!("removed shape {handle:?} from body {body:?}");
        Ok(())
    }

    /// Removes every body, shape, joint and contact. Touching contacts report `End` first.
    /// Handles issued before the call stay stale afterwards.
    pub fn clear(&mut self) {
        let contacts: Vec<ContactHandle> = self.contacts.handles().collect();
        for handle in contacts {
            self.destroy_contact(handle);
        }
        let joints: Vec<JointHandle> = self.joints.handles().collect();
        for handle in joints {
            self.joints.remove(handle);
        }
        let shapes: Vec<ShapeHandle> = self.shapes.handles().collect();
        for handle in shapes {
            self.shapes.remove(handle);
        }
        let bodies: Vec<BodyHandle> = self.bodies.handles().collect();
        for handle in bodies {
            self.bodies.remove(handle);
        }

        self.pair_index.clear();
        self.pairs.clear();
        self.broad_phase = BroadPhase::new(self.config.broad_phase);
        self.islands = IslandManager::new();
        self.publish_snapshot();
        log::debug!("cleared world at step {}", self.step_count);
    }

    pub fn add_joint(
        &mut self,
        body1: BodyHandle,
        body2: BodyHandle,
        config: JointConfig,
        desc: JointDesc,
    ) -> Result<JointHandle> {
        if body1 == body2 {
            return Err(PhysicsError::config(
                "joint",
                "a joint needs two different bodies",
            ));
        }
        let first = self.bodies.get(body1).ok_or_else(stale::<BodyHandle>)?;
        let second = self.bodies.get(body2).ok_or_else(stale::<BodyHandle>)?;
        let joint = Joint::new((body1, first), (body2, second), config, desc)?;
        let name = joint.desc().name();

        let handle = self.joints.insert(joint);
        for body in [body1, body2] {
            if let Some(body) = self.bodies.get_mut(body) {
                body.joints.push(handle);
                body.wake_up();
            }
        }
        log::debug!("added {name} joint {handle:?} between {body1:?} and {body2:?}");
        Ok(handle)
    }

    pub fn remove_joint(&mut self, handle: JointHandle) -> Result<()> {
        self.detach_joint(handle).ok_or_else(stale::<JointHandle>)?;
        log::debug!("removed joint {handle:?}");
        Ok(())
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> + '_ {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn shape(&self, handle: ShapeHandle) -> Option<&Shape> {
        self.shapes.get(handle)
    }

    pub fn shape_mut(&mut self, handle: ShapeHandle) -> Option<&mut Shape> {
        self.shapes.get_mut(handle)
    }

    pub fn shapes(&self) -> impl Iterator<Item = (ShapeHandle, &Shape)> + '_ {
        self.shapes.iter()
    }

    pub fn joint(&self, handle: JointHandle) -> Option<&Joint> {
        self.joints.get(handle)
    }

    pub fn joint_mut(&mut self, handle: JointHandle) -> Option<&mut Joint> {
        self.joints.get_mut(handle)
    }

    pub fn contact(&self, handle: ContactHandle) -> Option<&Contact> {
        self.contacts.get(handle)
    }

    pub fn contacts(&self) -> impl Iterator<Item = (ContactHandle, &Contact)> + '_ {
        self.contacts.iter()
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// The contact between two shapes, in either order.
    pub fn contact_between(&self, a: ShapeHandle, b: ShapeHandle) -> Option<&Contact> {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.pair_index
            .get(&key)
            .and_then(|&handle| self.contacts.get(handle))
    }

    /// Total kinetic energy of all dynamic bodies.
    pub fn kinetic_energy(&self) -> f32 {
        self.bodies.values().map(RigidBody::kinetic_energy).sum()
    }

    pub fn set_contact_listener(&mut self, listener: impl ContactListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_contact_listener(&mut self) {
        self.listener = None;
    }

    /// Takes the events queued since the last drain.
    pub fn drain_contact_events(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn last_step_profile(&self) -> &StepProfile {
        &self.profile
    }

    pub fn snapshot_reader(&self) -> SnapshotReader {
        self.snapshot.clone()
    }

    /// Syncs shapes and runs the broad phase without advancing time.
    pub fn update_contacts(&mut self) -> Result<()> {
        self.update_contacts_with(self.last_dt)
    }

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) -> Result<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PhysicsError::InvalidTimeStep(dt));
        }
        if self.bodies.is_empty() {
            return Ok(());
        }

        let started = Instant::now();
        let mut profile = StepProfile::default();
        self.last_dt = dt;

        self.islands
            .wake_disturbed(&mut self.bodies, &self.contacts, &self.joints, &self.config.sleep);

        {
            let _timer = ScopedTimer::new("broad_phase", &mut profile.broad_phase_time);
            self.update_contacts_with(dt)?;
        }
        {
            let _timer = ScopedTimer::new("narrow_phase", &mut profile.narrow_phase_time);
            profile.manifold_point_count = self.narrow_phase(dt);
        }
        {
            let _timer = ScopedTimer::new("solver", &mut profile.solver_time);
            let gravity = self.config.gravity;
            for (_, body) in self.bodies.iter_mut() {
                if !body.is_sleeping() {
                    body.integrate_velocity(gravity, dt);
                }
            }

            self.islands
                .build_islands(&mut self.bodies, &self.contacts, &self.joints);
            let mut jobs = self.prepare_jobs(dt);
            run_jobs(
                &mut jobs,
                self.config.velocity_iterations,
                self.config.parallel_islands,
            );
            let (rows, skipped) = self.write_back(&jobs);
            profile.solver_row_count = rows;
            profile.skipped_row_count = skipped;
            profile.active_island_count = jobs.len();
        }
        {
            let _timer = ScopedTimer::new("integrate", &mut profile.integrator_time);
            for (_, body) in self.bodies.iter_mut() {
                if !body.is_static() && !body.is_sleeping() {
                    body.integrate_position(dt);
                }
            }
            self.islands
                .update_sleeping(&mut self.bodies, &self.config.sleep, dt);
        }
        {
            // Published bounds are the resting ones; contacts must agree with them.
            let _timer = ScopedTimer::new("broad_phase", &mut profile.broad_phase_time);
            self.sync_shapes(0.0);
            self.refresh_pairs()?;
        }

        self.step_count += 1;
        self.publish_snapshot();

        profile.body_count = self.bodies.len();
        profile.contact_count = self.contacts.len();
        profile.total_frame_time = started.elapsed();
        if log::log_enabled!(log::Level::Debug) {
            profile.report();
        }
        self.profile = profile;
        Ok(())
    }

    fn update_contacts_with(&mut self, dt: f32) -> Result<()> {
        self.sync_shapes(dt);
        self.refresh_pairs()
    }

    /// Destroys contacts whose proxies stopped overlapping and creates contacts for new pairs.
    fn refresh_pairs(&mut self) -> Result<()> {
        let mut pairs = std::mem::take(&mut self.pairs);
        self.broad_phase.collect_pairs(&mut pairs);

        let expired: Vec<ContactHandle> = self
            .contacts
            .iter()
            .filter(|(_, contact)| {
                pairs.binary_search(&contact.shapes()).is_err()
                    || !self.pair_allowed(contact.shape1, contact.shape2)
            })
            .map(|(handle, _)| handle)
            .collect();
        for handle in expired {
            self.destroy_contact(handle);
        }

        let fresh: Vec<(ShapeHandle, ShapeHandle)> = pairs
            .iter()
            .copied()
            .filter(|pair| !self.pair_index.contains_key(pair) && self.pair_allowed(pair.0, pair.1))
            .collect();
        self.pairs = pairs;

        for (a, b) in fresh {
            self.create_contact(a, b)?;
        }
        Ok(())
    }

    /// Refreshes shape transforms and proxy bounds, sweeping by `v·dt`.
    fn sync_shapes(&mut self, dt: f32) {
        let margin = self.config.aabb_margin;
        for (_, body) in self.bodies.iter() {
            let displacement = if body.is_static() {
                Vec3::ZERO
            } else {
                body.velocity.linear * dt
            };
            for &handle in &body.shapes {
                let Some(shape) = self.shapes.get_mut(handle) else {
                    continue;
                };
                shape.update_proxy(&body.transform, margin, displacement);
                if let Some(proxy) = shape.proxy {
                    self.broad_phase.update_proxy(proxy, shape.aabb);
                }
            }
        }
    }

    fn pair_allowed(&self, a: ShapeHandle, b: ShapeHandle) -> bool {
        let (Some(s1), Some(s2)) = (self.shapes.get(a), self.shapes.get(b)) else {
            return false;
        };
        if s1.body == s2.body || !s1.config.filter.accepts(&s2.config.filter) {
            return false;
        }
        let (Some(b1), Some(b2)) = (self.bodies.get(s1.body), self.bodies.get(s2.body)) else {
            return false;
        };
        if !b1.is_dynamic() && !b2.is_dynamic() {
            return false;
        }
        !b1.joints.iter().any(|&handle| {
            self.joints
                .get(handle)
                .is_some_and(|joint| !joint.allow_collision() && joint.other_body(s1.body) == s2.body)
        })
    }

    fn create_contact(&mut self, a: ShapeHandle, b: ShapeHandle) -> Result<ContactHandle> {
        let s1 = self.shapes.get(a).ok_or_else(stale::<ShapeHandle>)?;
        let s2 = self.shapes.get(b).ok_or_else(stale::<ShapeHandle>)?;
        let detector = self.detectors.get(s1.shape_type(), s2.shape_type())?;
        let contact = Contact::new(
            (a, b),
            (s1.body, s2.body),
            detector,
            mix_friction(s1.config.friction, s2.config.friction),
            mix_restitution(s1.config.restitution, s2.config.restitution),
        );
        let bodies = contact.bodies();

        let handle = self.contacts.insert(contact);
        self.pair_index.insert((a, b), handle);
        for shape in [a, b] {
            if let Some(shape) = self.shapes.get_mut(shape) {
                shape.contacts.push(handle);
            }
        }
        for body in [bodies.0, bodies.1] {
            if let Some(body) = self.bodies.get_mut(body) {
                body.contacts.push(handle);
            }
        }
        log::debug!("created {} contact {handle:?} for {a:?}/{b:?}", detector.name);
        Ok(handle)
    }

    fn attach_shape(&mut self, body: BodyHandle, transform: &Transform, desc: ShapeDesc) -> ShapeHandle {
        let (geometry, config) = desc.into_parts();
        let mut shape = Shape::new(body, geometry, config);
        shape.update_proxy(transform, self.config.aabb_margin, Vec3::ZERO);
        let aabb = shape.aabb;
        let handle = self.shapes.insert(shape);
        let proxy = self.broad_phase.create_proxy(handle, aabb);
        if let Some(shape) = self.shapes.get_mut(handle) {
            shape.proxy = Some(proxy);
        }
        handle
    }

    /// Removes a shape with its proxy and contacts. Bodies that were touching it wake up.
    fn detach_shape(&mut self, handle: ShapeHandle) -> Option<Shape> {
        let shape = self.shapes.remove(handle)?;
        if let Some(proxy) = shape.proxy {
            self.broad_phase.remove_proxy(proxy);
        }
        for &contact in &shape.contacts {
            let Some(other) = self.contacts.get(contact).map(|c| c.other_body(shape.body)) else {
                continue;
            };
            if let Some(other) = self.bodies.get_mut(other) {
                other.wake_up();
            }
            self.destroy_contact(contact);
        }
        Some(shape)
    }

    fn mass_infos(&self, shapes: &[ShapeHandle]) -> Vec<(MassInfo, Transform)> {
        shapes
            .iter()
            .filter_map(|&handle| self.shapes.get(handle))
            .map(|shape| (shape.mass_info(), shape.local_transform()))
            .collect()
    }

    fn destroy_contact(&mut self, handle: ContactHandle) {
        let Some(contact) = self.contacts.remove(handle) else {
            return;
        };
        self.pair_index.remove(&contact.shapes());
        for shape in [contact.shape1, contact.shape2] {
            if let Some(shape) = self.shapes.get_mut(shape) {
                shape.contacts.retain(|&c| c != handle);
            }
        }
        for body in [contact.body1, contact.body2] {
            if let Some(body) = self.bodies.get_mut(body) {
                body.contacts.retain(|&c| c != handle);
            }
        }
        if contact.touching {
            self.emit(ContactEvent::End {
                shapes: contact.shapes(),
                bodies: contact.bodies(),
            });
        }
        log::debug!("destroyed contact {handle:?}");
    }

    fn detach_joint(&mut self, handle: JointHandle) -> Option<Joint> {
        let joint = self.joints.remove(handle)?;
        for body in [joint.body1, joint.body2] {
            if let Some(body) = self.bodies.get_mut(body) {
                body.joints.retain(|&j| j != handle);
                body.wake_up();
            }
        }
        Some(joint)
    }

    fn emit(&mut self, event: ContactEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_contact(&event);
        }
        self.events.push(event);
    }

    /// Updates every awake manifold. Returns the total number of manifold points.
    fn narrow_phase(&mut self, dt: f32) -> usize {
        let contact_config = self.config.contact;
        let mut transitions = Vec::new();
        let mut points = 0;

        for (_, contact) in self.contacts.iter_mut() {
            let (Some(b1), Some(b2)) = (self.bodies.get(contact.body1), self.bodies.get(contact.body2))
            else {
                continue;
            };
            contact.sleeping = (b1.is_sleeping() || b1.is_static()) && (b2.is_sleeping() || b2.is_static());
            if contact.sleeping {
                points += contact.manifold.len();
                continue;
            }
            let (Some(s1), Some(s2)) = (self.shapes.get(contact.shape1), self.shapes.get(contact.shape2))
            else {
                continue;
            };

            contact.friction = mix_friction(s1.config.friction, s2.config.friction);
            contact.restitution = mix_restitution(s1.config.restitution, s2.config.restitution);
            let travel = (b1.velocity.linear.length() + b2.velocity.linear.length()) * dt;
            let margin = contact_config.linear_slop + travel;
            let transition = contact.update_manifold(
                (s1, s2),
                (&b1.transform, &b2.transform),
                margin,
                &contact_config,
            );
            points += contact.manifold.len();

            let shapes = contact.shapes();
            let bodies = contact.bodies();
            match transition {
                TouchTransition::Began => transitions.push(ContactEvent::Begin { shapes, bodies }),
                TouchTransition::Ended => transitions.push(ContactEvent::End { shapes, bodies }),
                TouchTransition::None => {}
            }
        }

        for event in transitions {
            self.emit(event);
        }
        points
    }

    /// PRE_SOLVE: one solver job per island, joints first then contacts.
    fn prepare_jobs(&mut self, dt: f32) -> Vec<IslandSolver> {
        let contact_config = self.config.contact;
        let baumgarte = self.config.joint_baumgarte;
        let mut jobs = Vec::with_capacity(self.islands.islands().len());

        for island in self.islands.islands() {
            let mut job = IslandSolver::new();
            for &handle in &island.bodies {
                if let Some(body) = self.bodies.get(handle) {
                    job.body_index(handle, body);
                }
            }

            for &handle in &island.joints {
                let Some(joint) = self.joints.get_mut(handle) else {
                    continue;
                };
                let (Some(b1), Some(b2)) = (self.bodies.get(joint.body1), self.bodies.get(joint.body2))
                else {
                    continue;
                };
                let indices = (job.body_index(joint.body1, b1), job.body_index(joint.body2, b2));
                joint.build_rows(handle, (b1, b2), indices, &mut job, dt, baumgarte);
            }

            for &handle in &island.contacts {
                let Some(contact) = self.contacts.get(handle) else {
                    continue;
                };
                let (Some(b1), Some(b2)) = (self.bodies.get(contact.body1), self.bodies.get(contact.body2))
                else {
                    continue;
                };
                let indices = (job.body_index(contact.body1, b1), job.body_index(contact.body2, b2));
                contact.build_rows(handle, indices, &mut job, dt, &contact_config);
            }
            jobs.push(job);
        }
        jobs
    }

    /// Copies solved velocities and accumulated impulses back. Returns (rows, skipped rows).
    fn write_back(&mut self, jobs: &[IslandSolver]) -> (usize, usize) {
        for island in self.islands.islands() {
            for &handle in &island.joints {
                if let Some(joint) = self.joints.get_mut(handle) {
                    joint.impulses = [0.0; JOINT_SLOTS];
                }
            }
        }

        let mut rows = 0;
        let mut skipped = 0;
        for job in jobs {
            for (&handle, solved) in job.handles.iter().zip(&job.bodies) {
                if let Some(body) = self.bodies.get_mut(handle) {
                    if body.is_dynamic() {
                        body.velocity.linear = solved.linear;
                        body.velocity.angular = solved.angular;
                    }
                }
            }
            for row in &job.rows {
                match row.source {
                    RowSource::Contact {
                        contact,
                        point,
                        direction,
                    } => {
                        if let Some(contact) = self.contacts.get_mut(contact) {
                            contact.store_impulse(point, direction, row.impulse);
                        }
                    }
                    RowSource::Joint { joint, slot } => {
                        if let Some(impulse) = self
                            .joints
                            .get_mut(joint)
                            .and_then(|joint| joint.impulses.get_mut(slot))
                        {
                            *impulse = row.impulse;
                        }
                    }
                }
            }
            rows += job.rows.len();
            skipped += job.skipped;
        }
        (rows, skipped)
    }

    fn publish_snapshot(&self) {
        let poses = self
            .bodies
            .iter()
            .map(|(handle, body)| BodyPose {
                handle,
                position: body.transform.position,
                rotation: body.transform.rotation,
                sleeping: body.sleeping,
            })
            .collect();
        self.snapshot.publish(TransformSnapshot {
            step: self.step_count,
            poses,
        });
    }
}

fn desc_mass_info(desc: &ShapeDesc) -> (MassInfo, Transform) {
    let config = desc.config();
    (
        desc.geometry().mass_info(config.density),
        Transform::new(config.relative_position, config.relative_rotation),
    )
}

fn check_plane(body: &RigidBody, desc: &ShapeDesc) -> Result<()> {
    if body.is_dynamic() && matches!(desc.geometry(), ShapeGeometry::Plane { .. }) {
        return Err(PhysicsError::config(
            "rigid body",
            "planes can only be attached to static or kinematic bodies",
        ));
    }
    Ok(())
}

#[cfg(feature = "parallel")]
fn run_jobs(jobs: &mut [IslandSolver], iterations: u32, parallel: bool) {
    if parallel && jobs.len() > 1 {
        jobs.par_iter_mut().for_each(|job| job.run(iterations));
    } else {
        jobs.iter_mut().for_each(|job| job.run(iterations));
    }
}

#[cfg(not(feature = "parallel"))]
fn run_jobs(jobs: &mut [IslandSolver], iterations: u32, _parallel: bool) {
    jobs.iter_mut().for_each(|job| job.run(iterations));
}
