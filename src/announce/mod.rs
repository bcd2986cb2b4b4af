//! announce
//!
//! Fire-and-forget notifications for assistive technology and status lines.
//!
//! # Design
//!
//! The drag controller and the reconciliation engine describe what happened
//! as a [`DragEvent`]; [`Announcement::for_event`] turns it into a message
//! with an [`Urgency`]. Sinks receive finished announcements and must not
//! block: they run inline on the event path and on commit tasks.
//!
//! # Events
//!
//! | Event | Emitted by | Urgency |
//! |-------|------------|---------|
//! | `DragStart` | controller, on pick-up | polite |
//! | `DragOver` | controller, when the target changes | polite |
//! | `DragEnd(Success)` | engine, on confirmed commit | polite |
//! | `DragEnd(Unchanged)` | controller, on a drop at the source | polite |
//! | `DragEnd(Failure)` | engine, on rollback | assertive |
//! | `DragCancel` | controller, on cancel | polite |

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::core::board::Board;
use crate::core::types::{CardId, ColumnId, Slot};

/// How insistently an announcement should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Wait for the current utterance to finish.
    Polite,
    /// Interrupt whatever is being read.
    Assertive,
}

/// How a drop ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum DropResult {
    /// The host confirmed the relocation.
    Success,
    /// The host refused or timed out; the board was rolled back.
    Failure(String),
    /// The card was dropped where it started.
    Unchanged,
}

/// Card and column context carried by every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventContext {
    pub card: CardId,
    pub card_title: String,
    pub column: ColumnId,
    pub column_label: String,
    /// Zero-based index in the column.
    pub index: usize,
}

impl EventContext {
    /// Build the context for a card at a slot, reading titles from `board`.
    ///
    /// Unknown cards or columns fall back to their ids.
    pub fn at(board: &Board, card: &CardId, slot: &Slot) -> Self {
        let card_title = board
            .card(card)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| card.to_string());
        let column_label = board
            .column(&slot.column)
            .map(|c| c.label().to_string())
            .unwrap_or_else(|| slot.column.to_string());
        Self {
            card: card.clone(),
            card_title,
            column: slot.column.clone(),
            column_label,
            index: slot.index,
        }
    }
}

/// Something observable happened to a drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DragEvent {
    /// A card was picked up at its source.
    DragStart(EventContext),
    /// The drop target changed.
    DragOver(EventContext),
    /// A drop finished; the context names the target.
    DragEnd {
        context: EventContext,
        result: DropResult,
    },
    /// The drag was abandoned; the context names the source.
    DragCancel(EventContext),
}

impl DragEvent {
    /// The context of this event.
    pub fn context(&self) -> &EventContext {
        match self {
            DragEvent::DragStart(ctx)
            | DragEvent::DragOver(ctx)
            | DragEvent::DragCancel(ctx) => ctx,
            DragEvent::DragEnd { context, .. } => context,
        }
    }

    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            DragEvent::DragStart(_) => "drag-start",
            DragEvent::DragOver(_) => "drag-over",
            DragEvent::DragEnd { .. } => "drag-end",
            DragEvent::DragCancel(_) => "drag-cancel",
        }
    }
}

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    pub event: DragEvent,
    pub message: String,
    pub urgency: Urgency,
}

impl Announcement {
    /// Describe an event in plain English.
    pub fn for_event(event: DragEvent) -> Self {
        let (message, urgency) = {
            let ctx = event.context();
            let position = ctx.index + 1;
            match &event {
                DragEvent::DragStart(_) => (
                    format!(
                        "Picked up {}. It is in {}, position {}.",
                        ctx.card_title, ctx.column_label, position
                    ),
                    Urgency::Polite,
                ),
                DragEvent::DragOver(_) => (
                    format!(
                        "{} is over {}, position {}.",
                        ctx.card_title, ctx.column_label, position
                    ),
                    Urgency::Polite,
                ),
                DragEvent::DragEnd { result, .. } => match result {
                    DropResult::Success => (
                        format!(
                            "{} was dropped in {}, position {}.",
                            ctx.card_title, ctx.column_label, position
                        ),
                        Urgency::Polite,
                    ),
                    DropResult::Unchanged => (
                        format!("{} was dropped in its original position.", ctx.card_title),
                        Urgency::Polite,
                    ),
                    DropResult::Failure(reason) => (
                        format!(
                            "Could not move {}: {}. It was returned to its previous position.",
                            ctx.card_title, reason
                        ),
                        Urgency::Assertive,
                    ),
                },
                DragEvent::DragCancel(_) => (
                    format!(
                        "Dragging was cancelled. {} was returned to {}.",
                        ctx.card_title, ctx.column_label
                    ),
                    Urgency::Polite,
                ),
            }
        };
        Self {
            event,
            message,
            urgency,
        }
    }
}

/// Receiver of announcements.
///
/// Implementations must return promptly and must not panic; delivery is
/// fire-and-forget.
pub trait AnnouncementSink: Send + Sync {
    fn announce(&self, announcement: &Announcement);
}

impl<F> AnnouncementSink for F
where
    F: Fn(&Announcement) + Send + Sync,
{
    fn announce(&self, announcement: &Announcement) {
        self(announcement)
    }
}

/// Discards every announcement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AnnouncementSink for NullSink {
    fn announce(&self, _announcement: &Announcement) {}
}

/// Writes announcements to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AnnouncementSink for TracingSink {
    fn announce(&self, announcement: &Announcement) {
        let event = announcement.event.name();
        match announcement.urgency {
            Urgency::Polite => tracing::debug!(event, "{}", announcement.message),
            Urgency::Assertive => tracing::info!(event, "{}", announcement.message),
        }
    }
}

/// Keeps every announcement in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the board
/// and inspect another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Vec<Announcement>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything announced so far.
    pub fn announcements(&self) -> Vec<Announcement> {
        self.inner.lock().unwrap().clone()
    }

    /// Event names in delivery order.
    pub fn event_names(&self) -> Vec<&'static str> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.event.name())
            .collect()
    }

    /// Take and clear the buffer.
    pub fn drain(&self) -> Vec<Announcement> {
        std::mem::take(&mut *self.inner.lock().unwrap())
    }
}

impl AnnouncementSink for RecordingSink {
    fn announce(&self, announcement: &Announcement) {
        self.inner.lock().unwrap().push(announcement.clone());
    }
}
