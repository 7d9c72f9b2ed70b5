use serde::{Deserialize, Serialize};

use crate::utils::allocator::{BodyHandle, ShapeHandle};

/// Touching-state transition of a contact. Fired once per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactEvent {
    Begin {
        shapes: (ShapeHandle, ShapeHandle),
        bodies: (BodyHandle, BodyHandle),
    },
    End {
        shapes: (ShapeHandle, ShapeHandle),
        bodies: (BodyHandle, BodyHandle),
    },
}

impl ContactEvent {
    pub fn shapes(&self) -> (ShapeHandle, ShapeHandle) {
        match self {
            ContactEvent::Begin { shapes, .. } | ContactEvent::End { shapes, .. } => *shapes,
        }
    }

    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        match self {
            ContactEvent::Begin { bodies, .. } | ContactEvent::End { bodies, .. } => *bodies,
        }
    }

    pub fn is_begin(&self) -> bool {
        matches!(self, ContactEvent::Begin { .. })
    }
}

/// Callback invoked synchronously from `World::step` for each contact event.
pub trait ContactListener: Send + Sync {
    fn on_contact(&mut self, event: &ContactEvent);
}

impl<F> ContactListener for F
where
    F: FnMut(&ContactEvent) + Send + Sync,
{
    fn on_contact(&mut self, event: &ContactEvent) {
        self(event)
    }
}
