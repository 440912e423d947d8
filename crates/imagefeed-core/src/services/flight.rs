//! Single-flight bookkeeping.

use std::sync::Mutex;

use crate::util::lock;

/// Tracks the one request a service may have in flight.
#[derive(Debug, Default)]
pub(crate) struct FlightSlot {
    active: Option<u64>,
    next_id: u64,
}

impl FlightSlot {
    /// Claim the slot, or `None` when a request is already running.
    pub(crate) fn try_begin(&mut self) -> Option<u64> {
        if self.active.is_some() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.active = Some(id);
        Some(id)
    }

    /// Release the slot if `id` still holds it.
    pub(crate) fn finish(&mut self, id: u64) {
        if self.active == Some(id) {
            self.active = None;
        }
    }

    pub(crate) const fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// Releases a claimed [`FlightSlot`] on drop, including when the request
/// future is abandoned mid-flight.
pub(crate) struct FlightGuard<'a, S> {
    state: &'a Mutex<S>,
    slot: fn(&mut S) -> &mut FlightSlot,
    id: u64,
}

impl<'a, S> FlightGuard<'a, S> {
    pub(crate) fn new(state: &'a Mutex<S>, slot: fn(&mut S) -> &mut FlightSlot, id: u64) -> Self {
        Self { state, slot, id }
    }
}

impl<S> Drop for FlightGuard<'_, S> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        (self.slot)(&mut state).finish(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_admits_one_request_at_a_time() {
        let mut slot = FlightSlot::default();
        let first = slot.try_begin().unwrap();
        assert!(slot.try_begin().is_none());

        slot.finish(first);
        assert!(!slot.is_active());
        assert!(slot.try_begin().is_some());
    }

    #[test]
    fn stale_finish_does_not_release_newer_request() {
        let mut slot = FlightSlot::default();
        let first = slot.try_begin().unwrap();
        slot.finish(first);
        let _second = slot.try_begin().unwrap();

        slot.finish(first);
        assert!(slot.is_active());
    }

    #[test]
    fn guard_releases_on_drop() {
        let state = Mutex::new(FlightSlot::default());
        let id = lock(&state).try_begin().unwrap();
        {
            let _guard = FlightGuard::new(&state, |slot| slot, id);
            assert!(lock(&state).is_active());
        }
        assert!(!lock(&state).is_active());
    }
}
