use std::collections::VecDeque;

use parking_lot::Mutex;

use dockwatch_core_types::{DockerEvent, EventCounts};

/// Capacity-bounded, arrival-ordered store of normalized events.
///
/// Newest events sit at the head (index 0); appending past capacity evicts
/// from the tail. The ordering is strictly arrival order, never the
/// origin-reported timestamp, because the transport may deliver events whose
/// timestamps are out of sequence relative to delivery.
///
/// One mutex serializes append/clear/snapshot so a snapshot always observes
/// a consistent point-in-time copy under the multi-threaded runtime.
#[derive(Debug)]
pub struct EventLog {
    capacity: usize,
    queue: Mutex<VecDeque<DockerEvent>>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Inserts at the head, evicting from the tail past capacity.
    pub fn append(&self, event: DockerEvent) {
        let mut guard = self.queue.lock();
        guard.push_front(event);
        while self.capacity > 0 && guard.len() > self.capacity {
            guard.pop_back();
        }
    }

    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Independent copy of the current contents, newest first. Later
    /// appends or clears on the live log never mutate a returned snapshot.
    pub fn snapshot(&self) -> Vec<DockerEvent> {
        self.queue.lock().iter().cloned().collect()
    }

    /// Per-category totals over the full log.
    pub fn counts(&self) -> EventCounts {
        let guard = self.queue.lock();
        let mut counts = EventCounts::default();
        for event in guard.iter() {
            counts.record(event.category);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockwatch_core_types::{EventCategory, EventId};
    use std::collections::HashMap;

    fn event(id: u64) -> DockerEvent {
        DockerEvent {
            id: EventId(id),
            host: "h1".into(),
            category: EventCategory::Container,
            action: "start".into(),
            actor_id: format!("c{id}"),
            actor_name: String::new(),
            timestamp: 1_700_000_000 + id as i64,
            attrs: HashMap::new(),
        }
    }

    #[test]
    fn append_keeps_newest_at_head() {
        let log = EventLog::new(10);
        log.append(event(0));
        log.append(event(1));
        log.append(event(2));

        let snap = log.snapshot();
        let ids: Vec<u64> = snap.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[test]
    fn length_is_bounded_by_capacity() {
        let log = EventLog::new(500);
        for id in 0..520 {
            log.append(event(id));
        }
        assert_eq!(log.len(), 500);

        // Survivors are the 500 most recent, in arrival order.
        let snap = log.snapshot();
        assert_eq!(snap[0].id, EventId(519));
        assert_eq!(snap[499].id, EventId(20));
        for (i, ev) in snap.iter().enumerate() {
            assert_eq!(ev.id.0, 519 - i as u64);
        }
    }

    #[test]
    fn appending_to_full_log_evicts_exactly_the_oldest() {
        let log = EventLog::new(500);
        for id in 0..500 {
            log.append(event(id));
        }
        log.append(event(500));

        let snap = log.snapshot();
        assert_eq!(snap.len(), 500);
        assert_eq!(snap[0].id, EventId(500));
        assert_eq!(snap[499].id, EventId(1));
        assert!(!snap.iter().any(|e| e.id == EventId(0)));
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let log = EventLog::new(10);
        log.append(event(0));
        log.append(event(1));

        let snap = log.snapshot();
        log.append(event(2));
        log.clear();

        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].id, EventId(1));
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn counts_cover_the_full_log() {
        let log = EventLog::new(10);
        log.append(event(0));
        let mut net = event(1);
        net.category = EventCategory::Network;
        log.append(net);

        let counts = log.counts();
        assert_eq!(counts.all, 2);
        assert_eq!(counts.container, 1);
        assert_eq!(counts.network, 1);
        assert_eq!(counts.image, 0);
    }
}
