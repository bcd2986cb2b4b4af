//! weekboard
//!
//! The entry point: one board, one drag at a time, commits in the
//! background.
//!
//! # Architecture
//!
//! [`WeekBoard`] wires the pieces together:
//!
//! ```text
//! gesture -> DragController -> resolve/step -> DropPolicy -> Reconciler -> BoardHost
//!                 ^                                             |
//!                 +------------- Settlement channel <-----------+
//! ```
//!
//! The drag state and the board are separate: the controller owns the
//! former, the reconciler the latter. Settlements travel back over a
//! channel and are folded into the controller by
//! [`WeekBoard::process_settlements`] or [`WeekBoard::next_settlement`].
//!
//! # Example
//!
//! ```
//! use weekboard::core::board::{Board, Card, Column};
//! use weekboard::core::types::{CardId, ColumnId, Slot};
//! use weekboard::drag::EndDrag;
//! use weekboard::host::mock::MockHost;
//! use weekboard::weekboard::WeekBoard;
//!
//! # tokio_test::block_on(async {
//! let mon = ColumnId::new("mon").unwrap();
//! let board = Board::new(vec![Column::new(mon.clone()).with_cards(vec![
//!     Card::new(CardId::new("A").unwrap(), "Laundry"),
//!     Card::new(CardId::new("B").unwrap(), "Dentist"),
//! ])])
//! .unwrap();
//!
//! let mut wb = WeekBoard::builder(board, MockHost::new()).build();
//! wb.start_drag(&CardId::new("B").unwrap()).unwrap();
//! wb.retarget(Slot::new(mon.clone(), 0)).unwrap();
//! assert!(matches!(wb.end_drag().unwrap(), EndDrag::Dispatched(_)));
//! assert_eq!(wb.board().card_ids(&mon), vec!["B", "A"]);
//!
//! let settlement = wb.next_settlement().await.unwrap();
//! assert!(settlement.is_success());
//! # });
//! ```

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::announce::{
    Announcement, AnnouncementSink, DragEvent, DropResult, EventContext, NullSink,
};
use crate::core::board::Board;
use crate::core::config::Config;
use crate::core::ops::{MoveOperation, Operation};
use crate::core::types::{CardId, Slot};
use crate::drag::controller::{
    DragController, DragError, DragSession, DragState, EndDrag, PendingCommit,
};
use crate::drag::policy::{AllowAll, DropPolicy};
use crate::drag::resolve::{self, Direction, DropCandidateProvider, Point};
use crate::engine::{ReconcileError, Reconciler, Settlement};
use crate::host::BoardHost;

/// Errors from the facade.
#[derive(Debug, Error)]
pub enum WeekBoardError {
    #[error(transparent)]
    Drag(#[from] DragError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Builder for [`WeekBoard`].
pub struct WeekBoardBuilder {
    board: Board,
    host: Arc<dyn BoardHost>,
    policy: Arc<dyn DropPolicy>,
    sink: Arc<dyn AnnouncementSink>,
    config: Config,
}

impl WeekBoardBuilder {
    /// Veto drops with `policy`. Defaults to [`AllowAll`].
    pub fn policy(mut self, policy: impl DropPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Deliver announcements to `sink`. Defaults to [`NullSink`].
    pub fn sink(mut self, sink: impl AnnouncementSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> WeekBoard {
        let (engine, completions) = Reconciler::new(
            self.board,
            self.host,
            self.sink.clone(),
            self.config.commit_timeout(),
        );
        WeekBoard {
            controller: DragController::new(self.config.history_limit()),
            engine,
            completions,
            policy: self.policy,
            sink: self.sink,
            announce_unchanged: self.config.announce_unchanged(),
        }
    }
}

/// A week board with drag and drop and optimistic commits.
pub struct WeekBoard {
    controller: DragController,
    engine: Reconciler,
    completions: mpsc::UnboundedReceiver<Settlement>,
    policy: Arc<dyn DropPolicy>,
    sink: Arc<dyn AnnouncementSink>,
    announce_unchanged: bool,
}

impl std::fmt::Debug for WeekBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeekBoard")
            .field("controller", &self.controller)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl WeekBoard {
    /// Start building a board over `board`, the host's confirmed snapshot.
    pub fn builder(board: Board, host: impl BoardHost + 'static) -> WeekBoardBuilder {
        WeekBoardBuilder {
            board,
            host: Arc::new(host),
            policy: Arc::new(AllowAll),
            sink: Arc::new(NullSink),
            config: Config::default(),
        }
    }

    // =========================================================================
    // Reading state
    // =========================================================================

    /// The board to render.
    pub fn board(&self) -> Board {
        self.engine.visible()
    }

    /// The last board the host acknowledged.
    pub fn confirmed(&self) -> Board {
        self.engine.confirmed()
    }

    pub fn drag_state(&self) -> &DragState {
        self.controller.state()
    }

    pub fn controller(&self) -> &DragController {
        &self.controller
    }

    pub fn engine(&self) -> &Reconciler {
        &self.engine
    }

    /// Dispatched drops that have not settled.
    pub fn pending(&self) -> &[PendingCommit] {
        self.controller.pending()
    }

    /// The last commit failure, until dismissed.
    pub fn error(&self) -> Option<&str> {
        self.controller.error()
    }

    pub fn dismiss_error(&mut self) {
        self.controller.dismiss_error();
    }

    // =========================================================================
    // Dragging
    // =========================================================================

    fn announce(&self, event: DragEvent) {
        self.sink.announce(&Announcement::for_event(event));
    }

    /// Pick up a card where it currently sits.
    pub fn start_drag(&mut self, card_id: &CardId) -> Result<DragSession, DragError> {
        let board = self.engine.visible();
        let card = board
            .card(card_id)
            .ok_or_else(|| DragError::CardNotFound(card_id.clone()))?;
        let source = board
            .locate(card_id)
            .ok_or_else(|| DragError::CardNotFound(card_id.clone()))?;

        let session = self.controller.start(card, source.clone())?.clone();
        self.announce(DragEvent::DragStart(EventContext::at(
            &board, card_id, &source,
        )));
        Ok(session)
    }

    /// Where the dragged card sits on `board` now. Rollbacks and synced
    /// boards can shift it while the drag is in progress.
    fn current_source(board: &Board, session: &DragSession) -> Slot {
        board
            .locate(&session.card)
            .unwrap_or_else(|| session.source.clone())
    }

    fn set_target(&mut self, board: &Board, target: Slot) -> Result<Slot, DragError> {
        let card = self.controller.dragging("update the target")?.card.clone();
        if self.controller.retarget(target.clone())? {
            self.announce(DragEvent::DragOver(EventContext::at(board, &card, &target)));
        }
        Ok(target)
    }

    /// Retarget from a pointer position over the rendered candidates.
    ///
    /// Returns the target after the update. A position that resolves to
    /// nothing leaves the target as it was.
    pub fn update_target<P>(&mut self, position: Point, provider: &P) -> Result<Slot, DragError>
    where
        P: DropCandidateProvider + ?Sized,
    {
        let session = self.controller.dragging("update the target")?.clone();
        let board = self.engine.visible();
        let source = Self::current_source(&board, &session);
        // past-the-end of the source column is where the card already is
        let resolved = resolve::resolve(position, &provider.list_candidates(), &board)
            .and_then(|target| resolve::clamp_target(&board, &source, &target));
        match resolved {
            Some(target) => self.set_target(&board, target),
            None => Ok(session.target),
        }
    }

    /// Retarget by one keyboard step.
    pub fn step_target(&mut self, direction: Direction) -> Result<Slot, DragError> {
        let session = self.controller.dragging("step the target")?.clone();
        let board = self.engine.visible();
        let source = Self::current_source(&board, &session);
        let target = resolve::step(&board, &source, &session.target, direction);
        self.set_target(&board, target)
    }

    /// Choose the target directly. The index is clamped to the column.
    pub fn retarget(&mut self, target: Slot) -> Result<Slot, DragError> {
        let session = self.controller.dragging("update the target")?.clone();
        let board = self.engine.visible();
        let source = Self::current_source(&board, &session);
        let target = resolve::clamp_target(&board, &source, &target)
            .ok_or(DragError::InvalidTarget(target))?;
        self.set_target(&board, target)
    }

    /// Let go of the card.
    ///
    /// # Errors
    ///
    /// - [`DragError::InvalidPhase`] if no drag is in progress
    /// - [`ReconcileError`] if the engine refuses the operation; the drag
    ///   still ends and nothing changes
    pub fn end_drag(&mut self) -> Result<EndDrag, WeekBoardError> {
        let session = self.controller.release()?;
        let board = self.engine.visible();

        let Some(from) = board.locate(&session.card) else {
            self.controller.settle_release()?;
            return Err(DragError::CardNotFound(session.card).into());
        };

        // compare against where the card is now, not where it was picked up
        if from == session.target {
            self.controller.settle_release()?;
            if self.announce_unchanged {
                self.announce(DragEvent::DragEnd {
                    context: EventContext::at(&board, &session.card, &from),
                    result: DropResult::Unchanged,
                });
            }
            return Ok(EndDrag::Unchanged);
        }

        let (Some(card), Some(column)) = (
            board.card(&session.card),
            board.column(&session.target.column),
        ) else {
            self.controller.settle_release()?;
            return Err(DragError::CardNotFound(session.card).into());
        };

        if !self.policy.allow_drop(card, column) {
            tracing::debug!(
                card = session.card.as_str(),
                column = session.target.column.as_str(),
                "drop refused by policy"
            );
            self.controller.settle_release()?;
            return Ok(EndDrag::Rejected);
        }

        let operation = Operation::from_move(MoveOperation::between(
            session.card.clone(),
            from,
            session.target.clone(),
        ));

        match self.engine.apply(operation) {
            Ok(ticket) => {
                let op_id = ticket.op_id().clone();
                self.controller.dispatch(op_id.clone())?;
                Ok(EndDrag::Dispatched(op_id))
            }
            Err(e) => {
                self.controller.settle_release()?;
                Err(e.into())
            }
        }
    }

    /// Abandon the drag. The board is untouched.
    pub fn cancel(&mut self) -> Result<DragSession, DragError> {
        let session = self.controller.cancel()?;
        let board = self.engine.visible();
        let at = board.locate(&session.card).unwrap_or(session.source.clone());
        self.announce(DragEvent::DragCancel(EventContext::at(
            &board,
            &session.card,
            &at,
        )));
        Ok(session)
    }

    // =========================================================================
    // Settlements
    // =========================================================================

    fn settle(&mut self, settlement: &Settlement) {
        if let Err(e) = self
            .controller
            .settle(&settlement.op_id, settlement.failure_message())
        {
            tracing::error!(op_id = settlement.op_id.short(), error = %e, "settlement out of order");
        }
    }

    /// Fold every settlement that has arrived into the drag state.
    pub fn process_settlements(&mut self) -> Vec<Settlement> {
        let mut settled = Vec::new();
        while let Ok(settlement) = self.completions.try_recv() {
            self.settle(&settlement);
            settled.push(settlement);
        }
        settled
    }

    /// Wait for the next settlement.
    ///
    /// Returns `None` at once when nothing is pending.
    pub async fn next_settlement(&mut self) -> Option<Settlement> {
        let settlement = match self.completions.try_recv() {
            Ok(settlement) => settlement,
            Err(_) if self.controller.pending().is_empty() => return None,
            Err(_) => self.completions.recv().await?,
        };
        self.settle(&settlement);
        Some(settlement)
    }

    /// Wait until every dispatched drop has settled.
    pub async fn settle_all(&mut self) -> Vec<Settlement> {
        let mut settled = Vec::new();
        while let Some(settlement) = self.next_settlement().await {
            settled.push(settlement);
        }
        settled
    }

    /// Adopt a fresh confirmed board from the host.
    pub fn sync_confirmed(&self, board: Board) {
        self.engine.sync_confirmed(board);
    }
}
