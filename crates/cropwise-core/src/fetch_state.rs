//! Latest-wins async slot.
//!
//! A slot hands out a [`Ticket`] for every request it starts. Only the most
//! recently issued ticket may settle the slot; results carried by older
//! tickets are dropped. Both the place-name lookup and the advisory/forecast
//! fetches go through this type.

/// State of one asynchronous data slot.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

/// Payload-free tag of a [`FetchState`], for renderers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTag {
    Idle,
    Loading,
    Ready,
    Failed,
}

impl<T> FetchState<T> {
    pub fn tag(&self) -> FetchTag {
        match self {
            FetchState::Idle => FetchTag::Idle,
            FetchState::Loading => FetchTag::Loading,
            FetchState::Ready(_) => FetchTag::Ready,
            FetchState::Failed(_) => FetchTag::Failed,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, FetchState::Ready(_))
    }

    /// The settled value, if any.
    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Identifies one request issued by a [`LatestSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A [`FetchState`] guarded by a monotonically increasing sequence number.
#[derive(Debug)]
pub struct LatestSlot<T> {
    state: FetchState<T>,
    latest: u64,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            state: FetchState::Idle,
            latest: 0,
        }
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    /// Sequence number of the most recently issued ticket.
    pub fn latest_seq(&self) -> u64 {
        self.latest
    }

    /// Start a new request and move the slot to `Loading`.
    ///
    /// Any request still loading is superseded first: its ticket stops being
    /// current before the new one is handed out. Returns the new ticket and
    /// the state that was displaced.
    pub fn issue(&mut self) -> (Ticket, FetchState<T>) {
        let displaced = std::mem::replace(&mut self.state, FetchState::Idle);
        if displaced.is_loading() {
            tracing::debug!("Superseding in-flight request #{}", self.latest);
        }
        self.latest += 1;
        self.state = FetchState::Loading;
        (Ticket(self.latest), displaced)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    /// Settle the slot with the outcome of `ticket`'s request.
    ///
    /// Returns `false` and leaves the slot untouched when the ticket has been
    /// superseded.
    pub fn settle(&mut self, ticket: Ticket, outcome: Result<T, String>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                "Discarding stale response {} (latest #{})",
                ticket,
                self.latest
            );
            return false;
        }
        self.state = match outcome {
            Ok(value) => FetchState::Ready(value),
            Err(reason) => FetchState::Failed(reason),
        };
        true
    }

    /// Invalidate outstanding tickets and set the value without a request.
    pub fn resolve_now(&mut self, value: T) {
        self.latest += 1;
        self.state = FetchState::Ready(value);
    }

    /// Invalidate outstanding tickets and return to `Idle`.
    pub fn reset(&mut self) {
        self.latest += 1;
        self.state = FetchState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_slot_is_idle() {
        let slot: LatestSlot<u32> = LatestSlot::new();
        assert_eq!(slot.state(), &FetchState::Idle);
        assert_eq!(slot.state().tag(), FetchTag::Idle);
    }

    #[test]
    fn issue_moves_to_loading() {
        let mut slot: LatestSlot<u32> = LatestSlot::new();
        let (ticket, displaced) = slot.issue();
        assert!(slot.state().is_loading());
        assert_eq!(displaced, FetchState::Idle);
        assert!(slot.is_current(ticket));
    }

    #[test]
    fn current_ticket_settles() {
        let mut slot = LatestSlot::new();
        let (ticket, _) = slot.issue();
        assert!(slot.settle(ticket, Ok(7)));
        assert_eq!(slot.state().ready(), Some(&7));
    }

    #[test]
    fn failure_settles_as_failed() {
        let mut slot: LatestSlot<u32> = LatestSlot::new();
        let (ticket, _) = slot.issue();
        assert!(slot.settle(ticket, Err("boom".into())));
        assert_eq!(slot.state(), &FetchState::Failed("boom".into()));
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut slot = LatestSlot::new();
        let (first, _) = slot.issue();
        let (second, _) = slot.issue();

        assert!(slot.settle(second, Ok("fresh")));
        assert!(!slot.settle(first, Ok("stale")));
        assert_eq!(slot.state().ready(), Some(&"fresh"));
    }

    #[test]
    fn stale_ticket_cannot_settle_loading_slot() {
        let mut slot = LatestSlot::new();
        let (first, _) = slot.issue();
        let (_second, _) = slot.issue();

        assert!(!slot.settle(first, Ok(1)));
        assert!(slot.state().is_loading());
    }

    #[test]
    fn issue_returns_displaced_value() {
        let mut slot = LatestSlot::new();
        let (ticket, _) = slot.issue();
        slot.settle(ticket, Ok(vec![1, 2]));

        let (_, displaced) = slot.issue();
        assert_eq!(displaced, FetchState::Ready(vec![1, 2]));
    }

    #[test]
    fn resolve_now_invalidates_in_flight() {
        let mut slot = LatestSlot::new();
        let (ticket, _) = slot.issue();
        slot.resolve_now(0);

        assert!(!slot.settle(ticket, Ok(9)));
        assert_eq!(slot.state().ready(), Some(&0));
    }

    #[test]
    fn reset_returns_to_idle_and_invalidates() {
        let mut slot = LatestSlot::new();
        let (ticket, _) = slot.issue();
        slot.reset();

        assert_eq!(slot.state().tag(), FetchTag::Idle);
        assert!(!slot.settle(ticket, Ok(1)));
        assert_eq!(slot.state().tag(), FetchTag::Idle);
    }

    #[test]
    fn sequence_is_monotonic() {
        let mut slot: LatestSlot<()> = LatestSlot::new();
        let (a, _) = slot.issue();
        slot.reset();
        let (b, _) = slot.issue();
        assert!(b.seq() > a.seq());
        assert_eq!(slot.latest_seq(), b.seq());
    }
}
