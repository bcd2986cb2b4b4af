//! host::mock
//!
//! Mock host implementation for deterministic testing.
//!
//! # Design
//!
//! The mock host records every commit call, can be told to refuse calls,
//! and can hold calls open until released so tests can observe the board
//! while commits are in flight.
//!
//! # Example
//!
//! ```
//! use weekboard::host::mock::{FailOn, MockHost};
//! use weekboard::host::{BoardHost, HostError};
//! use weekboard::core::ops::ReorderOperation;
//! use weekboard::core::types::{CardId, ColumnId};
//!
//! # tokio_test::block_on(async {
//! let host = MockHost::new();
//! let op = ReorderOperation {
//!     card_id: CardId::new("B").unwrap(),
//!     column: ColumnId::new("mon").unwrap(),
//!     from_index: 1,
//!     to_index: 0,
//! };
//!
//! host.reorder_card(&op).await.unwrap();
//! assert_eq!(host.calls().len(), 1);
//!
//! host.fail_on(FailOn::Reorder(HostError::Rejected("read only".into())));
//! assert!(host.reorder_card(&op).await.is_err());
//! # });
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use super::traits::{BoardHost, HostError};
use crate::core::ops::{MoveOperation, Operation, ReorderOperation};
use crate::core::types::{CardId, ColumnId};

/// Mock host for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping. Clones share state.
#[derive(Debug, Clone)]
pub struct MockHost {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockHostInner>>,
    /// Which calls are currently held open.
    holds: Arc<watch::Sender<Holds>>,
    /// Number of calls that have started.
    started: Arc<watch::Sender<usize>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockHostInner {
    /// Calls in the order they started.
    calls: Vec<Operation>,
    /// Begin/end trail for overlap checks.
    trail: Vec<HostEvent>,
    /// Standing failure rules.
    fail_on: Vec<FailOn>,
    /// One-shot failures, consumed in order.
    fail_next: Vec<HostError>,
}

#[derive(Debug, Clone, Default)]
struct Holds {
    all: bool,
    cards: HashSet<CardId>,
}

impl Holds {
    fn holds(&self, card: &CardId) -> bool {
        self.all || self.cards.contains(card)
    }
}

/// Configuration for which calls should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every move_card call.
    Move(HostError),
    /// Fail every reorder_card call.
    Reorder(HostError),
    /// Fail any call relocating this card.
    Card(CardId, HostError),
    /// Fail every call.
    All(HostError),
}

impl FailOn {
    fn matches(&self, op: &Operation) -> Option<HostError> {
        match (self, op) {
            (FailOn::Move(e), Operation::Move(_)) => Some(e.clone()),
            (FailOn::Reorder(e), Operation::Reorder(_)) => Some(e.clone()),
            (FailOn::Card(card, e), op) if op.card_id() == card => Some(e.clone()),
            (FailOn::All(e), _) => Some(e.clone()),
            _ => None,
        }
    }
}

/// A recorded start or finish of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Begin(Operation),
    End(Operation),
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    /// Create a mock host that accepts everything immediately.
    pub fn new() -> Self {
        let (holds, _) = watch::channel(Holds::default());
        let (started, _) = watch::channel(0);
        Self {
            inner: Arc::new(Mutex::new(MockHostInner::default())),
            holds: Arc::new(holds),
            started: Arc::new(started),
        }
    }

    /// Add a standing failure rule.
    pub fn fail_on(&self, rule: FailOn) {
        self.inner.lock().unwrap().fail_on.push(rule);
    }

    /// Fail the next call (whatever it is) with `error`.
    pub fn fail_next(&self, error: HostError) {
        self.inner.lock().unwrap().fail_next.push(error);
    }

    /// Remove all failure rules.
    pub fn clear_failures(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on.clear();
        inner.fail_next.clear();
    }

    /// Hold every call open until [`MockHost::release`].
    pub fn hold(&self) {
        self.holds.send_modify(|h| h.all = true);
    }

    /// Hold calls for one card open until released.
    pub fn hold_card(&self, card: &CardId) {
        self.holds.send_modify(|h| {
            h.cards.insert(card.clone());
        });
    }

    /// Release every held call.
    pub fn release(&self) {
        self.holds.send_modify(|h| {
            h.all = false;
            h.cards.clear();
        });
    }

    /// Release held calls for one card.
    pub fn release_card(&self, card: &CardId) {
        self.holds.send_modify(|h| {
            h.cards.remove(card);
        });
    }

    /// Wait until at least `n` calls have started.
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.started.subscribe();
        // The sender lives in self, so the channel cannot close here.
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    /// All calls in the order they started.
    pub fn calls(&self) -> Vec<Operation> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Only the move calls.
    pub fn move_calls(&self) -> Vec<MoveOperation> {
        self.calls()
            .into_iter()
            .filter_map(|op| match op {
                Operation::Move(op) => Some(op),
                Operation::Reorder(_) => None,
            })
            .collect()
    }

    /// Only the reorder calls.
    pub fn reorder_calls(&self) -> Vec<ReorderOperation> {
        self.calls()
            .into_iter()
            .filter_map(|op| match op {
                Operation::Reorder(op) => Some(op),
                Operation::Move(_) => None,
            })
            .collect()
    }

    /// Number of calls per card.
    pub fn calls_by_card(&self) -> HashMap<CardId, usize> {
        let mut counts = HashMap::new();
        for op in self.calls() {
            *counts.entry(op.card_id().clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Begin/end trail.
    pub fn trail(&self) -> Vec<HostEvent> {
        self.inner.lock().unwrap().trail.clone()
    }

    /// Largest number of calls touching `column` that were open at once.
    pub fn max_concurrent(&self, column: &ColumnId) -> usize {
        let mut open = 0usize;
        let mut max = 0usize;
        for event in self.trail() {
            match event {
                HostEvent::Begin(op) if op.columns().contains(column) => {
                    open += 1;
                    max = max.max(open);
                }
                HostEvent::End(op) if op.columns().contains(column) => {
                    open = open.saturating_sub(1);
                }
                _ => {}
            }
        }
        max
    }

    /// Largest number of calls open at once, across all columns.
    pub fn max_concurrent_overall(&self) -> usize {
        let mut open = 0usize;
        let mut max = 0usize;
        for event in self.trail() {
            match event {
                HostEvent::Begin(_) => {
                    open += 1;
                    max = max.max(open);
                }
                HostEvent::End(_) => open = open.saturating_sub(1),
            }
        }
        max
    }

    async fn handle(&self, op: Operation) -> Result<(), HostError> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(op.clone());
            inner.trail.push(HostEvent::Begin(op.clone()));
        }
        self.started.send_modify(|n| *n += 1);

        let mut holds = self.holds.subscribe();
        let _ = holds.wait_for(|h| !h.holds(op.card_id())).await;

        let mut inner = self.inner.lock().unwrap();
        inner.trail.push(HostEvent::End(op.clone()));

        if !inner.fail_next.is_empty() {
            return Err(inner.fail_next.remove(0));
        }
        match inner.fail_on.iter().find_map(|rule| rule.matches(&op)) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BoardHost for MockHost {
    async fn move_card(&self, op: &MoveOperation) -> Result<(), HostError> {
        self.handle(Operation::Move(op.clone())).await
    }

    async fn reorder_card(&self, op: &ReorderOperation) -> Result<(), HostError> {
        self.handle(Operation::Reorder(op.clone())).await
    }
}
