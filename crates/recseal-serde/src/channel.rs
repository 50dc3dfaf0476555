//! Call-scoped key reference slot shared by a key-side and a value-side codec.
//!
//! Each channel owns one slot per thread. The key-side call overwrites the
//! slot of the calling thread and the value-side call on the same thread takes
//! it. This only works when the host serializes a record's key and value on
//! one thread, key first, with no other key serialized in between for the
//! same pair. That ordering is a usage precondition; the channel does not
//! detect violations.
//!
//! Dropping a channel clears the dropping thread's slot at once. Slots it left
//! pending on other threads are pruned by the next `publish` on those threads.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use recseal_envelope::KeyRef;
use tracing::trace;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static SLOTS: RefCell<HashMap<u64, Slot>> = RefCell::new(HashMap::new());
}

struct Slot {
    owner: Weak<()>,
    key_ref: KeyRef,
}

/// Per-pair, per-thread key reference slot.
pub struct KeyRefChannel {
    id: u64,
    alive: Arc<()>,
}

impl KeyRefChannel {
    pub fn new() -> Self {
        Self {
            id: NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed),
            alive: Arc::new(()),
        }
    }

    /// Process-unique channel id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Overwrite this thread's slot. `None` clears it.
    pub fn publish(&self, key_ref: Option<KeyRef>) {
        trace!(channel = self.id, present = key_ref.is_some(), "publishing key reference");
        SLOTS.with(|slots| {
            let mut slots = slots.borrow_mut();
            match key_ref {
                Some(key_ref) => {
                    slots.retain(|_, slot| slot.owner.strong_count() > 0);
                    slots.insert(
                        self.id,
                        Slot {
                            owner: Arc::downgrade(&self.alive),
                            key_ref,
                        },
                    );
                }
                None => {
                    slots.remove(&self.id);
                }
            }
        });
    }

    /// Read and clear this thread's slot.
    pub fn take(&self) -> Option<KeyRef> {
        SLOTS.with(|slots| slots.borrow_mut().remove(&self.id).map(|slot| slot.key_ref))
    }

    /// Read this thread's slot without clearing it.
    pub fn peek(&self) -> Option<KeyRef> {
        SLOTS.with(|slots| slots.borrow().get(&self.id).map(|slot| slot.key_ref.clone()))
    }
}

impl std::fmt::Debug for KeyRefChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRefChannel").field("id", &self.id).finish()
    }
}

impl Default for KeyRefChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for KeyRefChannel {
    fn drop(&mut self) {
        // Other threads' entries are pruned by their next publish.
        let _ = SLOTS.try_with(|slots| {
            if let Ok(mut slots) = slots.try_borrow_mut() {
                slots.remove(&self.id);
            }
        });
    }
}
