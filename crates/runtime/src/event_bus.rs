/// A queued event with its emission sequence number.
///
/// Sequence numbers are assigned per bus and never reused, so consumers that
/// drain at different times can still order what they saw.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<E> {
    pub seq: u64,
    pub payload: E,
}

/// Explicit, owned message queue between a producer and its consumers.
///
/// Producers `emit`; the single consumer thread `drain`s between redraws.
/// There is no global registry: whoever needs the events holds the bus.
/// An unbounded bus grows until drained; a [`bounded`](Self::bounded) bus
/// drops its oldest pending events instead.
#[derive(Debug)]
pub struct EventBus<E> {
    next_seq: u64,
    capacity: Option<usize>,
    events: Vec<Event<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            capacity: None,
            events: Vec::new(),
        }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `capacity` pending events (at least one).
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::default()
        }
    }

    pub fn emit(&mut self, payload: E) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        if let Some(cap) = self.capacity {
            if self.events.len() >= cap {
                let excess = self.events.len() + 1 - cap;
                self.events.drain(..excess);
            }
        }
        self.events.push(Event { seq, payload });
        seq
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn latest(&self) -> Option<&E> {
        self.events.last().map(|e| &e.payload)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }
}
