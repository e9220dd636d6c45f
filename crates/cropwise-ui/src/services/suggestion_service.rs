//! Place-name suggestions: debounced, latest-wins location lookups.
//! Timers and lookups run on the runtime; results come back over mpsc and
//! are applied by the owner.

use std::sync::Arc;
use std::time::Duration;

use cropwise_advisory::{AdvisoryApi, FetchErrorKind, Suggestion};
use cropwise_core::{FetchState, FetchTag, LatestSlot, Ticket};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Messages sent from async operations back to the owner
#[derive(Debug)]
pub enum SuggestionMessage {
    /// The input stayed unchanged for the quiet interval
    QuietElapsed { ticket: Ticket, query: String },
    /// Result of a location lookup; failures arrive as an empty list
    LookupDone {
        ticket: Ticket,
        suggestions: Vec<Suggestion>,
    },
}

/// Turns keystrokes into debounced location lookups.
///
/// Every keystroke takes a fresh ticket from the slot, so a quiet-interval
/// timer or lookup started for an older query can never settle the list.
pub struct SuggestionFetcher {
    api: Arc<dyn AdvisoryApi>,
    runtime: Handle,
    quiet: Duration,
    query: String,
    last_dispatched: Option<String>,
    slot: LatestSlot<Vec<Suggestion>>,
    /// List shown while a newer query is pending
    showing: Vec<Suggestion>,
    pending_timer: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SuggestionMessage>,
    rx: mpsc::UnboundedReceiver<SuggestionMessage>,
}

impl SuggestionFetcher {
    pub fn new(api: Arc<dyn AdvisoryApi>, runtime: Handle, quiet: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            runtime,
            quiet,
            query: String::new(),
            last_dispatched: None,
            slot: LatestSlot::new(),
            showing: Vec::new(),
            pending_timer: None,
            tx,
            rx,
        }
    }

    /// Raw text as last typed.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The most recent query handed to the lookup, trimmed.
    pub fn last_dispatched(&self) -> Option<&str> {
        self.last_dispatched.as_deref()
    }

    pub fn state_tag(&self) -> FetchTag {
        self.slot.state().tag()
    }

    pub fn is_pending(&self) -> bool {
        self.pending_timer.is_some() || self.slot.state().is_loading()
    }

    /// Suggestions to display.
    pub fn suggestions(&self) -> &[Suggestion] {
        match self.slot.state() {
            FetchState::Ready(list) => list,
            _ => &self.showing,
        }
    }

    /// The displayed suggestion whose label matches exactly.
    pub fn select(&self, label: &str) -> Option<Suggestion> {
        self.suggestions()
            .iter()
            .find(|s| s.label == label)
            .cloned()
    }

    /// Feed the full input text after a keystroke.
    pub fn input(&mut self, text: &str) {
        self.query = text.to_string();
        self.cancel_timer();

        let query = text.trim();
        if query.is_empty() {
            self.slot.resolve_now(Vec::new());
            self.showing.clear();
            return;
        }

        let (ticket, displaced) = self.slot.issue();
        if let FetchState::Ready(previous) = displaced {
            self.showing = previous;
        }

        let query = query.to_string();
        let quiet = self.quiet;
        let tx = self.tx.clone();
        self.pending_timer = Some(self.runtime.spawn(async move {
            tokio::time::sleep(quiet).await;
            let _ = tx.send(SuggestionMessage::QuietElapsed { ticket, query });
        }));
    }

    /// Wait for the next message and apply it. Returns `true` when the
    /// displayed list changed.
    pub async fn process_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(msg) => self.apply(msg),
            None => false,
        }
    }

    /// Apply every message already queued without waiting.
    pub fn try_process(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.rx.try_recv() {
            changed |= self.apply(msg);
        }
        changed
    }

    /// Process messages until no timer or lookup is outstanding.
    pub async fn settle(&mut self) {
        while self.is_pending() {
            self.process_next().await;
        }
    }

    fn apply(&mut self, msg: SuggestionMessage) -> bool {
        match msg {
            SuggestionMessage::QuietElapsed { ticket, query } => {
                if !self.slot.is_current(ticket) {
                    tracing::debug!("Ignoring superseded quiet interval {}", ticket);
                    return false;
                }
                self.pending_timer = None;
                self.dispatch(ticket, query);
                false
            }
            SuggestionMessage::LookupDone {
                ticket,
                suggestions,
            } => self.slot.settle(ticket, Ok(suggestions)),
        }
    }

    fn dispatch(&mut self, ticket: Ticket, query: String) {
        tracing::debug!("Looking up locations for {:?} ({})", query, ticket);
        self.last_dispatched = Some(query.clone());

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let suggestions = match api.lookup_locations(&query).await {
                Ok(list) => list,
                Err(e) if e.kind() == FetchErrorKind::EmptyResult => Vec::new(),
                Err(e) => {
                    tracing::warn!("Location lookup for {:?} failed: {}", query, e);
                    Vec::new()
                }
            };
            let _ = tx.send(SuggestionMessage::LookupDone {
                ticket,
                suggestions,
            });
        });
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.pending_timer.take() {
            timer.abort();
        }
    }
}

impl Drop for SuggestionFetcher {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
