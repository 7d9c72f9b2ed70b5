use std::collections::HashSet;

use super::contact::Contact;
use super::joint::Joint;
use crate::config::SleepConfig;
use crate::core::rigidbody::RigidBody;
use crate::core::types::Velocity;
use crate::utils::allocator::{Arena, BodyHandle, ContactHandle, JointHandle};

/// A connected set of awake bodies with the contacts and joints linking them.
#[derive(Debug, Default, Clone)]
pub struct Island {
    pub bodies: Vec<BodyHandle>,
    pub contacts: Vec<ContactHandle>,
    pub joints: Vec<JointHandle>,
    /// Linked to a moving kinematic body, so it may not fall asleep.
    pub driven: bool,
}

/// Builds islands each step and manages sleeping state.
#[derive(Default)]
pub struct IslandManager {
    islands: Vec<Island>,
    visited_bodies: HashSet<BodyHandle>,
    visited_contacts: HashSet<ContactHandle>,
    visited_joints: HashSet<JointHandle>,
    stack: Vec<BodyHandle>,
}

fn above_threshold(body: &RigidBody, config: &SleepConfig) -> bool {
    body.velocity.linear.length() > config.linear_threshold
        || body.velocity.angular.length() > config.angular_threshold
}

/// A moving kinematic body pushes through anything it touches, however slowly it moves.
fn drives(body: &RigidBody) -> bool {
    body.is_kinematic() && body.velocity != Velocity::default()
}

fn disturbs(body: &RigidBody, config: &SleepConfig) -> bool {
    drives(body) || above_threshold(body, config)
}

impl IslandManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// Wakes the sleeping partner of every constraint whose other body is awake and
    /// moving fast, or is kinematic and moving at all.
    pub fn wake_disturbed(
        &self,
        bodies: &mut Arena<RigidBody, BodyHandle>,
        contacts: &Arena<Contact, ContactHandle>,
        joints: &Arena<Joint, JointHandle>,
        config: &SleepConfig,
    ) -> usize {
        let links = contacts
            .values()
            .filter(|c| !c.manifold.is_empty())
            .map(|c| (c.body1, c.body2))
            .chain(joints.values().map(|j| (j.body1, j.body2)));

        let mut to_wake = Vec::new();
        for (a, b) in links {
            for (sleeper, mover) in [(a, b), (b, a)] {
                let (Some(s), Some(m)) = (bodies.get(sleeper), bodies.get(mover)) else {
                    continue;
                };
                let disturbed = s.is_sleeping()
                    && s.is_dynamic()
                    && !m.is_sleeping()
                    && !m.is_static()
                    && disturbs(m, config);
                if disturbed {
                    to_wake.push(sleeper);
                }
            }
        }

        let mut woken = 0;
        for handle in to_wake {
            if let Some(body) = bodies.get_mut(handle) {
                if body.is_sleeping() {
                    body.wake_up();
                    woken += 1;
                }
            }
        }
        woken
    }

    /// Depth-first traversal from every awake dynamic body. Static and kinematic bodies
    /// end a branch; sleeping bodies reached through a link are woken.
    pub fn build_islands(
        &mut self,
        bodies: &mut Arena<RigidBody, BodyHandle>,
        contacts: &Arena<Contact, ContactHandle>,
        joints: &Arena<Joint, JointHandle>,
    ) {
        self.islands.clear();
        self.visited_bodies.clear();
        self.visited_contacts.clear();
        self.visited_joints.clear();

        let seeds: Vec<BodyHandle> = bodies
            .iter()
            .filter(|(_, body)| body.is_dynamic() && !body.is_sleeping())
            .map(|(handle, _)| handle)
            .collect();

        for seed in seeds {
            if !self.visited_bodies.insert(seed) {
                continue;
            }
            let mut island = Island::default();
            self.stack.clear();
            self.stack.push(seed);

            while let Some(current) = self.stack.pop() {
                island.bodies.push(current);
                let Some(body) = bodies.get(current) else {
                    continue;
                };
                let contact_links: Vec<ContactHandle> = body.contacts.clone();
                let joint_links: Vec<JointHandle> = body.joints.clone();

                let mut neighbours = Vec::new();
                for handle in contact_links {
                    let Some(contact) = contacts.get(handle) else {
                        continue;
                    };
                    if contact.manifold.is_empty() || !self.visited_contacts.insert(handle) {
                        continue;
                    }
                    island.contacts.push(handle);
                    neighbours.push(contact.other_body(current));
                }
                for handle in joint_links {
                    let Some(joint) = joints.get(handle) else {
                        continue;
                    };
                    if !self.visited_joints.insert(handle) {
                        continue;
                    }
                    island.joints.push(handle);
                    neighbours.push(joint.other_body(current));
                }

                for other in neighbours {
                    let Some(other_body) = bodies.get_mut(other) else {
                        continue;
                    };
                    if drives(other_body) {
                        island.driven = true;
                    }
                    if !other_body.is_dynamic() || self.visited_bodies.contains(&other) {
                        continue;
                    }
                    if other_body.is_sleeping() {
                        other_body.wake_up();
                    }
                    self.visited_bodies.insert(other);
                    self.stack.push(other);
                }
            }
            self.islands.push(island);
        }
    }

    /// SLEEP_UPDATE: accumulates sleep timers and puts whole islands to sleep.
    /// Returns the number of islands that fell asleep.
    pub fn update_sleeping(
        &mut self,
        bodies: &mut Arena<RigidBody, BodyHandle>,
        config: &SleepConfig,
        dt: f32,
    ) -> usize {
        let mut slept = 0;
        for island in &self.islands {
            let mut ready = config.enabled && !island.driven;
            for &handle in &island.bodies {
                let Some(body) = bodies.get_mut(handle) else {
                    continue;
                };
                if island.driven || !body.allow_sleep || above_threshold(body, config) {
                    body.sleep_time = 0.0;
                    ready = false;
                } else {
                    body.sleep_time += dt;
                    if body.sleep_time < config.time_to_sleep {
                        ready = false;
                    }
                }
            }

            if ready {
                for &handle in &island.bodies {
                    if let Some(body) = bodies.get_mut(handle) {
                        body.sleep();
                    }
                }
                slept += 1;
                log::trace!("island of {} bodies fell asleep", island.bodies.len());
            }
        }
        slept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::joint::{JointConfig, JointDesc};
    use glam::Vec3;

    fn arenas() -> (
        Arena<RigidBody, BodyHandle>,
        Arena<Contact, ContactHandle>,
        Arena<Joint, JointHandle>,
    ) {
        (Arena::new(), Arena::new(), Arena::new())
    }

    fn link(
        bodies: &mut Arena<RigidBody, BodyHandle>,
        joints: &mut Arena<Joint, JointHandle>,
        a: BodyHandle,
        b: BodyHandle,
    ) -> JointHandle {
        let joint = {
            let (Some(ba), Some(bb)) = (bodies.get(a), bodies.get(b)) else {
                panic!("bodies exist");
            };
            Joint::new((a, ba), (b, bb), JointConfig::default(), JointDesc::ball_and_socket())
                .expect("valid joint")
        };
        let handle = joints.insert(joint);
        bodies.get_mut(a).expect("a").joints.push(handle);
        bodies.get_mut(b).expect("b").joints.push(handle);
        handle
    }

    #[test]
    fn joints_merge_bodies_into_one_island() {
        let (mut bodies, contacts, mut joints) = arenas();
        let a = bodies.insert(RigidBody::dynamic());
        let b = bodies.insert(RigidBody::dynamic().with_position(Vec3::X));
        let _lonely = bodies.insert(RigidBody::dynamic().with_position(Vec3::Y * 5.0));
        link(&mut bodies, &mut joints, a, b);

        let mut manager = IslandManager::new();
        manager.build_islands(&mut bodies, &contacts, &joints);
        assert_eq!(manager.islands().len(), 2);
        let joined = manager
            .islands()
            .iter()
            .find(|island| island.bodies.len() == 2)
            .expect("joined island");
        assert_eq!(joined.joints.len(), 1);
    }

    #[test]
    fn static_bodies_do_not_bridge_islands() {
        let (mut bodies, contacts, mut joints) = arenas();
        let ground = bodies.insert(RigidBody::fixed());
        let a = bodies.insert(RigidBody::dynamic());
        let b = bodies.insert(RigidBody::dynamic());
        link(&mut bodies, &mut joints, ground, a);
        link(&mut bodies, &mut joints, ground, b);

        let mut manager = IslandManager::new();
        manager.build_islands(&mut bodies, &contacts, &joints);
        assert_eq!(manager.islands().len(), 2);
        assert!(manager.islands().iter().all(|island| island.bodies.len() == 1));
    }

    #[test]
    fn traversal_wakes_linked_sleepers() {
        let (mut bodies, contacts, mut joints) = arenas();
        let a = bodies.insert(RigidBody::dynamic());
        let b = bodies.insert(RigidBody::dynamic());
        link(&mut bodies, &mut joints, a, b);
        bodies.get_mut(b).expect("b").sleep();

        let mut manager = IslandManager::new();
        manager.build_islands(&mut bodies, &contacts, &joints);
        assert!(!bodies.get(b).expect("b").is_sleeping());
    }

    #[test]
    fn quiet_island_falls_asleep_after_timeout() {
        let (mut bodies, contacts, joints) = arenas();
        let a = bodies.insert(RigidBody::dynamic());
        let config = SleepConfig::default();
        let mut manager = IslandManager::new();

        let dt = 0.1;
        let mut slept = 0;
        for _ in 0..10 {
            manager.build_islands(&mut bodies, &contacts, &joints);
            slept += manager.update_sleeping(&mut bodies, &config, dt);
        }
        assert_eq!(slept, 1);
        assert!(bodies.get(a).expect("a").is_sleeping());
    }

    #[test]
    fn fast_neighbour_wakes_sleeper() {
        let (mut bodies, contacts, mut joints) = arenas();
        let a = bodies.insert(RigidBody::dynamic().with_linear_velocity(Vec3::X * 3.0));
        let b = bodies.insert(RigidBody::dynamic());
        link(&mut bodies, &mut joints, a, b);
        bodies.get_mut(b).expect("b").sleep();

        let manager = IslandManager::new();
        let woken = manager.wake_disturbed(&mut bodies, &contacts, &joints, &SleepConfig::default());
        assert_eq!(woken, 1);
        assert!(!bodies.get(b).expect("b").is_sleeping());
    }

    #[test]
    fn slow_kinematic_neighbour_wakes_sleeper() {
        let (mut bodies, contacts, mut joints) = arenas();
        let pusher = bodies.insert(RigidBody::kinematic().with_linear_velocity(Vec3::X * 0.01));
        let b = bodies.insert(RigidBody::dynamic());
        link(&mut bodies, &mut joints, pusher, b);
        bodies.get_mut(b).expect("b").sleep();

        let manager = IslandManager::new();
        let woken = manager.wake_disturbed(&mut bodies, &contacts, &joints, &SleepConfig::default());
        assert_eq!(woken, 1);
    }

    #[test]
    fn island_driven_by_kinematic_body_stays_awake() {
        let (mut bodies, contacts, mut joints) = arenas();
        let pusher = bodies.insert(RigidBody::kinematic().with_linear_velocity(Vec3::X * 0.01));
        let b = bodies.insert(RigidBody::dynamic());
        link(&mut bodies, &mut joints, pusher, b);

        let mut manager = IslandManager::new();
        for _ in 0..20 {
            manager.build_islands(&mut bodies, &contacts, &joints);
            assert!(manager.islands()[0].driven);
            assert_eq!(manager.update_sleeping(&mut bodies, &SleepConfig::default(), 0.1), 0);
        }
        assert!(!bodies.get(b).expect("b").is_sleeping());
    }
}
