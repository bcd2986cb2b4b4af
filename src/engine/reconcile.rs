//! engine::reconcile
//!
//! Optimistic apply, host commit, confirm or roll back.
//!
//! # Lifecycle
//!
//! ```text
//! apply(op)
//!   normalize -> visible = visible.apply(op) -> enqueue on column queues
//!   spawn commit task:
//!     wait for head of queues -> host call (with timeout)
//!       Ok  -> confirmed += op              -> DragEnd(Success)
//!       Err -> visible = confirmed + replay -> DragEnd(Failure)
//!     release queues -> send Settlement
//! ```
//!
//! The optimistic step runs synchronously on the caller's thread, so the
//! visible board reflects the drop before `apply` returns. The board store
//! is only locked for synchronous sections and never across the host call.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::queue::{ColumnQueues, QueueSlot};
use super::store::BoardStore;
use crate::announce::{Announcement, AnnouncementSink, DragEvent, DropResult, EventContext};
use crate::core::board::{Board, BoardError};
use crate::core::ops::{OpId, Operation};
use crate::host::{self, BoardHost, HostError};

/// Errors from starting a reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The operation does not fit the visible board.
    #[error("invalid operation: {0}")]
    Invalid(#[from] BoardError),

    /// `apply` was called outside a tokio runtime.
    #[error("no async runtime available to run the commit")]
    NoRuntime,

    /// The commit task panicked or was aborted.
    #[error("commit task failed: {0}")]
    TaskFailed(String),
}

/// Why a commit did not go through.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommitError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
}

/// The final word on one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub op_id: OpId,
    pub operation: Operation,
    pub outcome: Result<(), CommitError>,
}

impl Settlement {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// User-facing description of a failed commit.
    pub fn failure_message(&self) -> Option<String> {
        self.outcome.as_ref().err().map(|e| {
            format!(
                "could not {} {}: {}",
                self.operation.verb(),
                self.operation.card_id(),
                e
            )
        })
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(()) => write!(f, "{} committed", self.operation),
            Err(e) => write!(f, "{} rolled back: {}", self.operation, e),
        }
    }
}

/// Handle to an in-flight commit.
#[derive(Debug)]
pub struct CommitTicket {
    op_id: OpId,
    handle: JoinHandle<Settlement>,
}

impl CommitTicket {
    pub fn op_id(&self) -> &OpId {
        &self.op_id
    }

    pub fn is_settled(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the commit to settle.
    pub async fn settled(self) -> Result<Settlement, ReconcileError> {
        self.handle
            .await
            .map_err(|e| ReconcileError::TaskFailed(e.to_string()))
    }
}

/// Owns the board snapshots and drives commits against the host.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<Mutex<BoardStore>>,
    queues: Arc<ColumnQueues>,
    host: Arc<dyn BoardHost>,
    sink: Arc<dyn AnnouncementSink>,
    timeout: Option<Duration>,
    completions: mpsc::UnboundedSender<Settlement>,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("store", &self.store)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Create an engine over `board` and the receiving end of its
    /// completion channel.
    pub fn new(
        board: Board,
        host: Arc<dyn BoardHost>,
        sink: Arc<dyn AnnouncementSink>,
        timeout: Option<Duration>,
    ) -> (Self, mpsc::UnboundedReceiver<Settlement>) {
        let (completions, rx) = mpsc::unbounded_channel();
        let engine = Self {
            store: Arc::new(Mutex::new(BoardStore::new(board))),
            queues: Arc::new(ColumnQueues::new()),
            host,
            sink,
            timeout,
            completions,
        };
        (engine, rx)
    }

    /// The board as users should see it.
    pub fn visible(&self) -> Board {
        self.store.lock().unwrap().visible().clone()
    }

    /// The last snapshot the host acknowledged.
    pub fn confirmed(&self) -> Board {
        self.store.lock().unwrap().confirmed().clone()
    }

    /// Number of operations awaiting their commit.
    pub fn pending_len(&self) -> usize {
        self.store.lock().unwrap().pending_len()
    }

    /// Operations queued on `column`, including a running one.
    pub fn queue_depth(&self, column: &crate::core::types::ColumnId) -> usize {
        self.queues.depth(column)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Adopt a fresh confirmed snapshot; pending operations are replayed.
    pub fn sync_confirmed(&self, board: Board) {
        let mut store = self.store.lock().unwrap();
        store.replace_confirmed(board);
        tracing::debug!(
            fingerprint = store.visible().fingerprint().short(),
            pending = store.pending_len(),
            "confirmed board replaced"
        );
    }

    /// Apply `operation` optimistically and start its commit.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::Invalid`] if the card is not where the operation
    ///   says or a column is unknown; nothing is changed or dispatched
    /// - [`ReconcileError::NoRuntime`] outside a tokio runtime
    pub fn apply(&self, operation: Operation) -> Result<CommitTicket, ReconcileError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| ReconcileError::NoRuntime)?;

        let operation = operation.normalize();
        let op_id = OpId::new();

        let slot = {
            let mut store = self.store.lock().unwrap();
            store.begin(op_id.clone(), operation.clone())?;
            // Enqueue under the store lock so queue order matches apply order.
            QueueSlot::enqueue(self.queues.clone(), op_id.clone(), operation.columns())
        };

        tracing::info!(op_id = op_id.short(), op = %operation, "applied optimistically");

        let task = CommitTask {
            op_id: op_id.clone(),
            operation,
            slot,
            engine: self.clone(),
        };
        let handle = runtime.spawn(task.run());

        Ok(CommitTicket { op_id, handle })
    }

    async fn call_host(&self, operation: &Operation) -> Result<(), CommitError> {
        let call = host::commit(self.host.as_ref(), operation);
        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result.map_err(CommitError::from),
                Err(_) => Err(CommitError::TimedOut(limit)),
            },
            None => call.await.map_err(CommitError::from),
        }
    }
}

struct CommitTask {
    op_id: OpId,
    operation: Operation,
    slot: QueueSlot,
    engine: Reconciler,
}

impl CommitTask {
    async fn run(self) -> Settlement {
        let CommitTask {
            op_id,
            operation,
            slot,
            engine,
        } = self;

        slot.wait_turn().await;
        tracing::debug!(op_id = op_id.short(), "commit started");

        let outcome = engine.call_host(&operation).await;

        let event = {
            let mut store = engine.store.lock().unwrap();
            match &outcome {
                Ok(()) => {
                    store.confirm(&op_id);
                }
                Err(_) => {
                    store.reject(&op_id);
                }
            }
            settlement_event(store.visible(), &operation, &outcome)
        };
        drop(slot);

        match &outcome {
            Ok(()) => tracing::info!(op_id = op_id.short(), op = %operation, "commit confirmed"),
            Err(e) => tracing::warn!(
                op_id = op_id.short(),
                op = %operation,
                error = %e,
                "commit failed, rolled back"
            ),
        }

        engine.sink.announce(&Announcement::for_event(event));

        let settlement = Settlement {
            op_id,
            operation,
            outcome,
        };
        // The receiver may be gone when nobody listens for completions.
        let _ = engine.completions.send(settlement.clone());
        settlement
    }
}

fn settlement_event(
    board: &Board,
    operation: &Operation,
    outcome: &Result<(), CommitError>,
) -> DragEvent {
    let card = operation.card_id();
    let fallback = match outcome {
        Ok(()) => operation.target(),
        Err(_) => operation.source(),
    };
    let slot = board.locate(card).unwrap_or(fallback);
    let context = EventContext::at(board, card, &slot);
    let result = match outcome {
        Ok(()) => DropResult::Success,
        Err(e) => DropResult::Failure(e.to_string()),
    };
    DragEvent::DragEnd { context, result }
}
