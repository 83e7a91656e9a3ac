//! Unbounded, order-preserving mailbox.
//!
//! The mailbox is only a lock-protected queue. Waking the consumer is the
//! job of the actor handle, so the same queue works under any scheduler.
//!
//! Contract:
//! - `enqueue` never blocks on capacity and never drops; any thread may call it
//! - `drain_all` takes everything queued so far, in enqueue order, and leaves
//!   the mailbox empty; only the owning worker calls it
//! - every enqueued message shows up in exactly one drain

use parking_lot::Mutex;

/// Pending messages for one actor.
#[derive(Debug)]
pub struct Mailbox<M> {
    queue: Mutex<Vec<M>>,
}

impl<M> Mailbox<M> {
    /// Creates an empty mailbox.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Appends a message to the tail.
    pub fn enqueue(&self, msg: M) {
        self.queue.lock().push(msg);
    }

    /// Removes and returns every queued message in enqueue order.
    pub fn drain_all(&self) -> Vec<M> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl<M> Default for Mailbox<M> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
