/// Fixed-capacity entity pools.
///
/// Every slot is allocated when the pool is built.  Acquiring writes the
/// new entity into the first free slot; releasing only clears the slot's
/// active flag, so nothing is ever reallocated while the game runs.

/// Index of a slot inside a `Pool`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(usize);

impl Handle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
struct Slot<T> {
    active: bool,
    entity: T,
}

#[derive(Clone, Debug)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
}

impl<T: Default> Pool<T> {
    /// Build a pool with `capacity` inactive slots.
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                active: false,
                entity: T::default(),
            })
            .collect();
        Self { slots }
    }
}

impl<T> Pool<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    pub fn free_count(&self) -> usize {
        self.capacity() - self.active_count()
    }

    /// Place `entity` in the first free slot.  Returns `None` when every
    /// slot is taken; callers treat that as "skip this one".
    pub fn acquire(&mut self, entity: T) -> Option<Handle> {
        let index = self.slots.iter().position(|s| !s.active)?;
        let slot = &mut self.slots[index];
        slot.entity = entity;
        slot.active = true;
        Some(Handle(index))
    }

    /// Mark the slot free.  Returns `false` if it was already free.
    pub fn release(&mut self, handle: Handle) -> bool {
        match self.slots.get_mut(handle.0) {
            Some(slot) if slot.active => {
                slot.active = false;
                true
            }
            _ => false,
        }
    }

    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
        }
    }

    pub fn is_active(&self, handle: Handle) -> bool {
        self.slots.get(handle.0).map(|s| s.active).unwrap_or(false)
    }

    /// The entity in an active slot.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.0)
            .filter(|s| s.active)
            .map(|s| &s.entity)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.0)
            .filter(|s| s.active)
            .map(|s| &mut s.entity)
    }

    /// Active entities in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| (Handle(i), &s.entity))
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, s)| (Handle(i), &mut s.entity))
    }

    /// Snapshot of the active handles, for loops that release as they go.
    pub fn active_handles(&self) -> Vec<Handle> {
        self.iter_active().map(|(h, _)| h).collect()
    }
}
