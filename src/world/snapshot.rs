use std::sync::Arc;

use glam::{Quat, Vec3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::utils::allocator::BodyHandle;

/// Pose of one body at the end of a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPose {
    pub handle: BodyHandle,
    pub position: Vec3,
    pub rotation: Quat,
    pub sleeping: bool,
}

/// Body transforms published once per completed step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    pub step: u64,
    pub poses: Vec<BodyPose>,
}

impl TransformSnapshot {
    pub fn pose(&self, handle: BodyHandle) -> Option<&BodyPose> {
        self.poses.iter().find(|pose| pose.handle == handle)
    }
}

/// Read-only view of the latest snapshot, safe to hand to another thread.
#[derive(Debug, Clone, Default)]
pub struct SnapshotReader {
    slot: Arc<RwLock<Arc<TransformSnapshot>>>,
}

impl SnapshotReader {
    /// The most recently published snapshot. The lock is held only long enough to clone the `Arc`.
    pub fn latest(&self) -> Arc<TransformSnapshot> {
        Arc::clone(&self.slot.read())
    }

    pub(crate) fn publish(&self, snapshot: TransformSnapshot) {
        *self.slot.write() = Arc::new(snapshot);
    }
}
