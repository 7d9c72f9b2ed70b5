use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::marker::PhantomData;

/// Slot index with generation tracking to prevent stale references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct GenerationalId {
    pub index: usize,
    pub generation: u32,
}

impl GenerationalId {
    pub fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// Typed handle into one of the world's arenas.
pub trait ArenaHandle: Copy + Eq + Ord + std::hash::Hash + std::fmt::Debug {
    /// Human readable kind used in error messages.
    const KIND: &'static str;

    fn from_id(id: GenerationalId) -> Self;
    fn id(self) -> GenerationalId;

    fn index(self) -> usize {
        self.id().index
    }

    fn generation(self) -> u32 {
        self.id().generation
    }
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
        pub struct $name(GenerationalId);

        impl ArenaHandle for $name {
            const KIND: &'static str = $kind;

            fn from_id(id: GenerationalId) -> Self {
                Self(id)
            }

            fn id(self) -> GenerationalId {
                self.0
            }
        }
    };
}

define_handle!(
    /// Handle to a registered rigid body.
    BodyHandle,
    "body"
);
define_handle!(
    /// Handle to a shape owned by a registered body.
    ShapeHandle,
    "shape"
);
define_handle!(
    /// Handle to a live contact between two shapes.
    ContactHandle,
    "contact"
);
define_handle!(
    /// Handle to a joint attached to two bodies.
    JointHandle,
    "joint"
);
define_handle!(
    /// Handle to a broad-phase proxy.
    ProxyHandle,
    "proxy"
);

/// World-scoped generational arena that hands out stable handles while preventing use-after-free.
pub struct Arena<T, H: ArenaHandle> {
    items: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: VecDeque<usize>,
    len: usize,
    _handle: PhantomData<H>,
}

impl<T, H: ArenaHandle> Default for Arena<T, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H: ArenaHandle> Arena<T, H> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            generations: Vec::new(),
            free_list: VecDeque::new(),
            len: 0,
            _handle: PhantomData,
        }
    }

    pub fn insert(&mut self, item: T) -> H {
        self.len += 1;
        if let Some(index) = self.free_list.pop_front() {
            let generation = self.generations[index];
            self.items[index] = Some(item);
            return H::from_id(GenerationalId::new(index, generation));
        }

        let index = self.items.len();
        self.items.push(Some(item));
        self.generations.push(0);
        H::from_id(GenerationalId::new(index, 0))
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        if self.is_valid(handle) {
            self.items.get(handle.index()).and_then(|slot| slot.as_ref())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        if self.is_valid(handle) {
            self.items.get_mut(handle.index()).and_then(|slot| slot.as_mut())
        } else {
            None
        }
    }

    pub fn get2_mut(&mut self, a: H, b: H) -> Option<(&mut T, &mut T)> {
        if a.index() == b.index() || !self.is_valid(a) || !self.is_valid(b) {
            return None;
        }

        let (first, second, flipped) = if a.index() < b.index() {
            (a, b, false)
        } else {
            (b, a, true)
        };

        let (left, right) = self.items.split_at_mut(second.index());
        let first_slot = left.get_mut(first.index()).and_then(|slot| slot.as_mut())?;
        let second_slot = right.get_mut(0).and_then(|slot| slot.as_mut())?;

        if flipped {
            Some((second_slot, first_slot))
        } else {
            Some((first_slot, second_slot))
        }
    }

    /// Frees the slot. A stale handle (already removed) returns `None` and leaves the arena untouched.
    pub fn remove(&mut self, handle: H) -> Option<T> {
        if !self.is_valid(handle) {
            return None;
        }
        let index = handle.index();
        let item = self.items.get_mut(index)?.take()?;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free_list.push_back(index);
        self.len -= 1;
        Some(item)
    }

    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Iterates live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.items.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref().map(|item| {
                (
                    H::from_id(GenerationalId::new(index, self.generations[index])),
                    item,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> + '_ {
        let generations = &self.generations;
        self.items
            .iter_mut()
            .enumerate()
            .filter_map(move |(index, slot)| {
                slot.as_mut()
                    .map(|item| (H::from_id(GenerationalId::new(index, generations[index])), item))
            })
    }

    pub fn handles(&self) -> impl Iterator<Item = H> + '_ {
        self.iter().map(|(handle, _)| handle)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().filter_map(|slot| slot.as_ref())
    }

    /// Raw slot access for data-parallel passes that do not add or remove entries.
    pub(crate) fn slots_mut(&mut self) -> &mut [Option<T>] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_valid(&self, handle: H) -> bool {
        self.generations
            .get(handle.index())
            .map(|generation| *generation == handle.generation())
            .unwrap_or(false)
    }
}
