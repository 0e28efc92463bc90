//! Debounced collision tracking. `Begin` returns `true` only on the
//! transition into "colliding", so "collision begin" effects fire exactly
//! once per contiguous contact no matter how many ticks the objects stay
//! overlapped.

use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollisionKey {
    pub object1_id: String,
    pub object2_id: String,
}

impl CollisionKey {
    pub fn new(object1_id: impl Into<String>, object2_id: impl Into<String>) -> Self {
        CollisionKey {
            object1_id: object1_id.into(),
            object2_id: object2_id.into(),
        }
    }
}

/// Internally synchronised so the type can be shared if ever needed, even
/// though in this crate only the owning room actor ever touches it.
#[derive(Default)]
pub struct CollisionTracker {
    active: Mutex<HashSet<CollisionKey>>,
}

impl CollisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly on the not-tracked -> tracked transition.
    pub fn begin(&self, key: CollisionKey) -> bool {
        self.active.lock().unwrap().insert(key)
    }

    pub fn end(&self, key: &CollisionKey) {
        self.active.lock().unwrap().remove(key);
    }

    pub fn is_colliding(&self, key: &CollisionKey) -> bool {
        self.active.lock().unwrap().contains(key)
    }

    pub fn active_for_object1(&self, object1_id: &str) -> Vec<CollisionKey> {
        self.active
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.object1_id == object1_id)
            .cloned()
            .collect()
    }

    pub fn clear_all(&self) {
        self.active.lock().unwrap().clear();
    }

    /// Drops every tracked key touching `object1_id` or `object2_id`, used
    /// when a ball or paddle is removed so its stale contacts don't linger.
    pub fn forget_object(&self, object_id: &str) {
        self.active
            .lock()
            .unwrap()
            .retain(|k| k.object1_id != object_id && k.object2_id != object_id);
    }
}
