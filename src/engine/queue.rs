//! engine::queue
//!
//! Per-column FIFO ordering of commits.
//!
//! # Invariants
//!
//! - An operation is appended to the queue of every column it touches in a
//!   single critical section, so any two operations that share columns
//!   appear in the same relative order in every shared queue
//! - An operation may call the host only while it is at the head of all
//!   its queues
//! - The oldest queued operation is always at the head of all its queues,
//!   so some operation can always make progress
//!
//! Operations on disjoint columns never wait for each other.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::core::ops::OpId;
use crate::core::types::ColumnId;

/// FIFO queues keyed by column id.
#[derive(Debug, Default)]
pub struct ColumnQueues {
    queues: Mutex<HashMap<ColumnId, VecDeque<OpId>>>,
    changed: Notify,
}

impl ColumnQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `op_id` to the queue of each column in `columns`.
    pub fn enqueue(&self, op_id: &OpId, columns: &[ColumnId]) {
        let mut queues = self.queues.lock().unwrap();
        for column in columns {
            queues
                .entry(column.clone())
                .or_default()
                .push_back(op_id.clone());
        }
    }

    /// Whether `op_id` heads every queue in `columns`.
    pub fn is_head(&self, op_id: &OpId, columns: &[ColumnId]) -> bool {
        let queues = self.queues.lock().unwrap();
        columns
            .iter()
            .all(|c| queues.get(c).and_then(|q| q.front()) == Some(op_id))
    }

    /// Number of operations queued on `column`, including a running one.
    pub fn depth(&self, column: &ColumnId) -> usize {
        self.queues
            .lock()
            .unwrap()
            .get(column)
            .map_or(0, VecDeque::len)
    }

    /// Wait until `op_id` heads every queue in `columns`.
    pub async fn wait_turn(&self, op_id: &OpId, columns: &[ColumnId]) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            // Register before checking so a release in between is not missed.
            notified.as_mut().enable();

            if self.is_head(op_id, columns) {
                return;
            }
            notified.await;
        }
    }

    /// Remove `op_id` from its queues and wake every waiter.
    pub fn release(&self, op_id: &OpId, columns: &[ColumnId]) {
        {
            let mut queues = self.queues.lock().unwrap();
            for column in columns {
                if let Some(queue) = queues.get_mut(column) {
                    queue.retain(|id| id != op_id);
                    if queue.is_empty() {
                        queues.remove(column);
                    }
                }
            }
        }
        self.changed.notify_waiters();
    }
}

/// Releases an operation's queue slots when dropped.
///
/// Held by a commit task for its whole life, so a task that panics or is
/// aborted does not stall its columns.
#[derive(Debug)]
pub struct QueueSlot {
    queues: Arc<ColumnQueues>,
    op_id: OpId,
    columns: Vec<ColumnId>,
}

impl QueueSlot {
    /// Enqueue `op_id` and return the guard for its slots.
    pub fn enqueue(queues: Arc<ColumnQueues>, op_id: OpId, columns: Vec<ColumnId>) -> Self {
        queues.enqueue(&op_id, &columns);
        Self {
            queues,
            op_id,
            columns,
        }
    }

    pub async fn wait_turn(&self) {
        self.queues.wait_turn(&self.op_id, &self.columns).await
    }
}

impl Drop for QueueSlot {
    fn drop(&mut self) {
        self.queues.release(&self.op_id, &self.columns);
    }
}
