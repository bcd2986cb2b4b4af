//! Integration tests for complete drag sessions.
//!
//! Each test drives a `WeekBoard` over a `MockHost` the way a front end
//! would: pick up, target, release, then wait for the commit to settle.

use weekboard::announce::{DropResult, RecordingSink, Urgency};
use weekboard::core::board::{Board, Card, Column};
use weekboard::core::config::{Config, ConfigFile, DragConfig};
use weekboard::core::ops::{MoveOperation, ReorderOperation};
use weekboard::core::types::{CardId, ColumnId, Slot};
use weekboard::drag::{
    Direction, DragError, DragPhase, DragState, DropCandidate, EndDrag, Point,
};
use weekboard::host::mock::{FailOn, MockHost};
use weekboard::host::HostError;
use weekboard::WeekBoard;

// =============================================================================
// Test Helpers
// =============================================================================

fn col(id: &str) -> ColumnId {
    ColumnId::new(id).unwrap()
}

fn card(id: &str) -> CardId {
    CardId::new(id).unwrap()
}

fn c(id: &str) -> Card {
    Card::new(card(id), format!("Card {}", id))
}

/// mon: [A, B], tue: [C], wed: []
fn board() -> Board {
    Board::new(vec![
        Column::new(col("mon"))
            .with_title("Monday")
            .with_cards(vec![c("A"), c("B")]),
        Column::new(col("tue"))
            .with_title("Tuesday")
            .with_cards(vec![c("C")]),
        Column::new(col("wed")).with_title("Wednesday"),
    ])
    .unwrap()
}

struct Harness {
    wb: WeekBoard,
    host: MockHost,
    sink: RecordingSink,
}

fn harness() -> Harness {
    let host = MockHost::new();
    let sink = RecordingSink::new();
    let wb = WeekBoard::builder(board(), host.clone())
        .sink(sink.clone())
        .build();
    Harness { wb, host, sink }
}

// =============================================================================
// Documented scenarios
// =============================================================================

#[tokio::test]
async fn reorder_within_a_day() {
    let Harness { mut wb, host, .. } = harness();

    wb.start_drag(&card("B")).unwrap();
    wb.retarget(Slot::new(col("mon"), 0)).unwrap();
    let end = wb.end_drag().unwrap();
    assert!(matches!(end, EndDrag::Dispatched(_)));

    // visible before the host has answered
    assert_eq!(wb.board().card_ids(&col("mon")), vec!["B", "A"]);

    let settlement = wb.next_settlement().await.unwrap();
    assert!(settlement.is_success());
    assert_eq!(
        host.reorder_calls(),
        vec![ReorderOperation {
            card_id: card("B"),
            column: col("mon"),
            from_index: 1,
            to_index: 0,
        }]
    );
    assert!(host.move_calls().is_empty());
    assert_eq!(wb.confirmed(), wb.board());
}

#[tokio::test]
async fn move_to_another_day() {
    let Harness { mut wb, host, .. } = harness();

    wb.start_drag(&card("B")).unwrap();
    wb.retarget(Slot::new(col("tue"), 0)).unwrap();
    wb.end_drag().unwrap();

    let visible = wb.board();
    assert_eq!(visible.card_ids(&col("mon")), vec!["A"]);
    assert_eq!(visible.card_ids(&col("tue")), vec!["B", "C"]);

    wb.next_settlement().await.unwrap();
    assert_eq!(
        host.move_calls(),
        vec![MoveOperation {
            card_id: card("B"),
            from_column: col("mon"),
            from_index: 1,
            to_column: col("tue"),
            to_index: 0,
        }]
    );
}

#[tokio::test]
async fn policy_rejection_changes_nothing() {
    let host = MockHost::new();
    let sink = RecordingSink::new();
    let mut wb = WeekBoard::builder(board(), host.clone())
        .policy(|card: &Card, target: &Column| {
            !(card.id.as_str() == "B" && target.id.as_str() == "wed")
        })
        .sink(sink.clone())
        .build();

    wb.start_drag(&card("B")).unwrap();
    wb.retarget(Slot::new(col("wed"), 0)).unwrap();
    assert_eq!(wb.end_drag().unwrap(), EndDrag::Rejected);

    assert_eq!(wb.board(), board());
    assert!(host.calls().is_empty());
    assert_eq!(wb.drag_state(), &DragState::Idle);
    assert_eq!(wb.error(), None);
    assert_eq!(sink.event_names(), vec!["drag-start", "drag-over"]);
}

#[tokio::test]
async fn failed_commit_rolls_back() {
    let Harness {
        mut wb, host, sink, ..
    } = harness();
    host.fail_on(FailOn::Reorder(HostError::Rejected("board is read only".into())));

    wb.start_drag(&card("B")).unwrap();
    wb.retarget(Slot::new(col("mon"), 0)).unwrap();
    wb.end_drag().unwrap();

    let settlement = wb.next_settlement().await.unwrap();
    assert!(!settlement.is_success());
    assert_eq!(wb.board().card_ids(&col("mon")), vec!["A", "B"]);
    assert_eq!(wb.board(), board());

    let error = wb.error().unwrap();
    assert!(error.contains("board is read only"), "{}", error);

    let last = sink.announcements().pop().unwrap();
    assert_eq!(last.urgency, Urgency::Assertive);
    assert!(matches!(
        last.event,
        weekboard::announce::DragEvent::DragEnd {
            result: DropResult::Failure(_),
            ..
        }
    ));

    wb.dismiss_error();
    assert_eq!(wb.error(), None);
}

// =============================================================================
// No-op, cancel and phase rules
// =============================================================================

#[tokio::test]
async fn drop_in_place_is_a_no_op() {
    let Harness {
        mut wb, host, sink, ..
    } = harness();

    wb.start_drag(&card("A")).unwrap();
    assert_eq!(wb.end_drag().unwrap(), EndDrag::Unchanged);

    assert_eq!(wb.board(), board());
    assert!(host.calls().is_empty());
    assert!(wb.pending().is_empty());
    assert_eq!(sink.event_names(), vec!["drag-start", "drag-end"]);
    assert_eq!(wb.next_settlement().await, None);
}

#[tokio::test]
async fn unchanged_announcement_can_be_turned_off() {
    let sink = RecordingSink::new();
    let config = Config::from_file(ConfigFile {
        drag: Some(DragConfig {
            announce_unchanged: Some(false),
            ..Default::default()
        }),
        ..Default::default()
    })
    .unwrap();
    let mut wb = WeekBoard::builder(board(), MockHost::new())
        .sink(sink.clone())
        .config(config)
        .build();

    wb.start_drag(&card("A")).unwrap();
    wb.end_drag().unwrap();
    assert_eq!(sink.event_names(), vec!["drag-start"]);
}

#[tokio::test]
async fn moving_away_and_back_is_a_no_op() {
    let Harness { mut wb, host, .. } = harness();

    wb.start_drag(&card("A")).unwrap();
    wb.retarget(Slot::new(col("tue"), 1)).unwrap();
    wb.retarget(Slot::new(col("mon"), 0)).unwrap();
    assert_eq!(wb.end_drag().unwrap(), EndDrag::Unchanged);
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn cancel_is_pure() {
    let Harness {
        mut wb, host, sink, ..
    } = harness();

    wb.start_drag(&card("B")).unwrap();
    wb.step_target(Direction::Right).unwrap();
    wb.step_target(Direction::Right).unwrap();
    let session = wb.cancel().unwrap();

    assert_eq!(session.source, Slot::new(col("mon"), 1));
    assert_eq!(wb.board(), board());
    assert!(host.calls().is_empty());
    assert_eq!(wb.drag_state(), &DragState::Idle);
    assert_eq!(sink.event_names().last(), Some(&"drag-cancel"));
    assert!(wb.controller().history().any(|p| p == DragPhase::Cancelled));
}

#[tokio::test]
async fn disabled_cards_cannot_be_picked_up() {
    let board = Board::new(vec![
        Column::new(col("mon")).with_cards(vec![c("A").disabled()]),
    ])
    .unwrap();
    let mut wb = WeekBoard::builder(board, MockHost::new()).build();

    assert_eq!(
        wb.start_drag(&card("A")),
        Err(DragError::CardDisabled(card("A")))
    );
    assert_eq!(
        wb.start_drag(&card("Z")),
        Err(DragError::CardNotFound(card("Z")))
    );
}

#[tokio::test]
async fn one_drag_at_a_time() {
    let Harness { mut wb, .. } = harness();
    wb.start_drag(&card("A")).unwrap();
    assert_eq!(
        wb.start_drag(&card("C")),
        Err(DragError::SessionActive(card("A")))
    );
}

#[tokio::test]
async fn targeting_requires_a_drag() {
    let Harness { mut wb, .. } = harness();
    assert!(matches!(
        wb.step_target(Direction::Down),
        Err(DragError::InvalidPhase { .. })
    ));
    assert!(wb.end_drag().is_err());
    assert!(wb.cancel().is_err());
}

#[tokio::test]
async fn unknown_column_is_not_a_target() {
    let Harness { mut wb, .. } = harness();
    wb.start_drag(&card("A")).unwrap();
    assert!(matches!(
        wb.retarget(Slot::new(col("sun"), 0)),
        Err(DragError::InvalidTarget(_))
    ));
    assert_eq!(wb.drag_state().session().unwrap().target, Slot::new(col("mon"), 0));
}

// =============================================================================
// Targeting
// =============================================================================

#[tokio::test]
async fn pointer_targeting_over_candidates() {
    let Harness {
        mut wb, host, sink, ..
    } = harness();
    let candidates = vec![
        DropCandidate::card(col("mon"), card("A"), Point::new(50.0, 20.0)),
        DropCandidate::card(col("mon"), card("B"), Point::new(50.0, 60.0)),
        DropCandidate::card(col("tue"), card("C"), Point::new(150.0, 20.0)),
        DropCandidate::column(col("wed"), Point::new(250.0, 100.0)),
    ];

    wb.start_drag(&card("A")).unwrap();

    let target = wb.update_target(Point::new(245.0, 90.0), &candidates).unwrap();
    assert_eq!(target, Slot::new(col("wed"), 0));

    // below the last card of tue: append
    let target = wb.update_target(Point::new(150.0, 40.0), &candidates).unwrap();
    assert_eq!(target, Slot::new(col("tue"), 1));

    // nothing resolvable: target unchanged
    let nothing: Vec<DropCandidate> = Vec::new();
    let target = wb.update_target(Point::new(0.0, 0.0), &nothing).unwrap();
    assert_eq!(target, Slot::new(col("tue"), 1));

    wb.end_drag().unwrap();
    wb.next_settlement().await.unwrap();

    assert_eq!(wb.board().card_ids(&col("tue")), vec!["C", "A"]);
    assert_eq!(host.move_calls().len(), 1);
    assert_eq!(
        sink.event_names(),
        vec!["drag-start", "drag-over", "drag-over", "drag-end"]
    );
}

#[tokio::test]
async fn keyboard_targeting() {
    let Harness { mut wb, host, .. } = harness();

    wb.start_drag(&card("A")).unwrap();
    // mon[0] -> tue[0] -> tue[1] -> tue[1] (ceiling)
    wb.step_target(Direction::Right).unwrap();
    wb.step_target(Direction::Down).unwrap();
    let target = wb.step_target(Direction::Down).unwrap();
    assert_eq!(target, Slot::new(col("tue"), 1));

    wb.end_drag().unwrap();
    wb.next_settlement().await.unwrap();

    assert_eq!(wb.board().card_ids(&col("mon")), vec!["B"]);
    assert_eq!(wb.board().card_ids(&col("tue")), vec!["C", "A"]);
    assert_eq!(host.calls().len(), 1);
}

#[tokio::test]
async fn drag_over_only_fires_on_change() {
    let Harness {
        mut wb, sink, ..
    } = harness();

    wb.start_drag(&card("A")).unwrap();
    wb.step_target(Direction::Up).unwrap();
    wb.step_target(Direction::Left).unwrap();
    assert_eq!(sink.event_names(), vec!["drag-start"]);
}

#[tokio::test]
async fn announcements_describe_positions() {
    let Harness {
        mut wb, sink, ..
    } = harness();

    wb.start_drag(&card("B")).unwrap();
    wb.retarget(Slot::new(col("tue"), 0)).unwrap();
    wb.end_drag().unwrap();
    wb.next_settlement().await.unwrap();

    let messages: Vec<_> = sink.announcements().into_iter().map(|a| a.message).collect();
    assert_eq!(
        messages,
        vec![
            "Picked up Card B. It is in Monday, position 2.",
            "Card B is over Tuesday, position 1.",
            "Card B was dropped in Tuesday, position 1.",
        ]
    );
}

// =============================================================================
// Pending commits
// =============================================================================

#[tokio::test]
async fn pending_commit_does_not_block_next_drag() {
    let Harness { mut wb, host, .. } = harness();
    host.hold();

    wb.start_drag(&card("B")).unwrap();
    wb.retarget(Slot::new(col("wed"), 0)).unwrap();
    wb.end_drag().unwrap();
    assert_eq!(wb.pending().len(), 1);
    assert_eq!(wb.pending()[0].phase, DragPhase::Committing);

    // a second drag while the first commit is held
    wb.start_drag(&card("C")).unwrap();
    wb.retarget(Slot::new(col("mon"), 0)).unwrap();
    wb.end_drag().unwrap();
    assert_eq!(wb.pending().len(), 2);

    host.release();
    let settled = wb.settle_all().await;
    assert_eq!(settled.len(), 2);
    assert!(settled.iter().all(|s| s.is_success()));
    assert!(wb.pending().is_empty());

    let visible = wb.board();
    assert_eq!(visible.card_ids(&col("mon")), vec!["C", "A"]);
    assert!(visible.card_ids(&col("tue")).is_empty());
    assert_eq!(visible.card_ids(&col("wed")), vec!["B"]);
    assert_eq!(wb.confirmed(), visible);
}

#[tokio::test]
async fn process_settlements_folds_arrived_results() {
    let Harness { mut wb, host, .. } = harness();

    wb.start_drag(&card("B")).unwrap();
    wb.retarget(Slot::new(col("mon"), 0)).unwrap();
    wb.end_drag().unwrap();

    host.wait_for_calls(1).await;
    // give the commit task a moment to report back
    let mut settled = Vec::new();
    for _ in 0..50 {
        settled.extend(wb.process_settlements());
        if !settled.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(settled.len(), 1);
    assert!(wb.pending().is_empty());
    assert!(wb
        .controller()
        .history()
        .any(|p| p == DragPhase::Committed));
}

#[tokio::test]
async fn pointer_below_own_column_end_is_a_no_op() {
    let Harness { mut wb, host, .. } = harness();
    let candidates = vec![
        DropCandidate::card(col("mon"), card("A"), Point::new(50.0, 20.0)),
        DropCandidate::card(col("mon"), card("B"), Point::new(50.0, 60.0)),
    ];

    wb.start_drag(&card("B")).unwrap();
    let target = wb.update_target(Point::new(50.0, 90.0), &candidates).unwrap();
    assert_eq!(target, Slot::new(col("mon"), 1));

    assert_eq!(wb.end_drag().unwrap(), EndDrag::Unchanged);
    assert!(host.calls().is_empty());
}

// =============================================================================
// Board shifting under an active drag
// =============================================================================

/// Drag A below B with its commit held, pick up B (now at mon[0]), then let
/// A's commit fail so B slides back to mon[1] mid-drag.
async fn pick_up_b_then_roll_back_a(wb: &mut WeekBoard, host: &MockHost) {
    host.fail_on(FailOn::Card(card("A"), HostError::Rejected("nope".into())));
    host.hold_card(&card("A"));

    wb.start_drag(&card("A")).unwrap();
    wb.retarget(Slot::new(col("mon"), 1)).unwrap();
    wb.end_drag().unwrap();
    assert_eq!(wb.board().card_ids(&col("mon")), vec!["B", "A"]);

    let session = wb.start_drag(&card("B")).unwrap();
    assert_eq!(session.source, Slot::new(col("mon"), 0));

    host.release_card(&card("A"));
    let settlement = wb.next_settlement().await.unwrap();
    assert!(!settlement.is_success());
    assert_eq!(wb.board().card_ids(&col("mon")), vec!["A", "B"]);
}

#[tokio::test]
async fn drop_on_current_slot_after_rollback_is_a_no_op() {
    let Harness { mut wb, host, .. } = harness();
    pick_up_b_then_roll_back_a(&mut wb, &host).await;

    let target = wb.retarget(Slot::new(col("mon"), 1)).unwrap();
    assert_eq!(target, Slot::new(col("mon"), 1));
    assert_eq!(wb.end_drag().unwrap(), EndDrag::Unchanged);

    // only A's failed commit reached the host
    assert_eq!(host.calls().len(), 1);
    assert_eq!(wb.board().card_ids(&col("mon")), vec!["A", "B"]);
}

#[tokio::test]
async fn drop_on_pickup_slot_after_rollback_still_moves() {
    let Harness { mut wb, host, .. } = harness();
    pick_up_b_then_roll_back_a(&mut wb, &host).await;

    wb.retarget(Slot::new(col("mon"), 0)).unwrap();
    assert!(matches!(wb.end_drag().unwrap(), EndDrag::Dispatched(_)));
    assert!(wb.next_settlement().await.unwrap().is_success());

    assert_eq!(
        host.reorder_calls().last().unwrap(),
        &ReorderOperation {
            card_id: card("B"),
            column: col("mon"),
            from_index: 1,
            to_index: 0,
        }
    );
    assert_eq!(wb.board().card_ids(&col("mon")), vec!["B", "A"]);
}

#[tokio::test]
async fn target_limits_follow_the_card_after_rollback() {
    let Harness { mut wb, host, .. } = harness();
    host.fail_on(FailOn::Card(card("A"), HostError::Rejected("nope".into())));
    host.hold_card(&card("A"));

    // A goes to tue[1] optimistically and is picked up again there
    wb.start_drag(&card("A")).unwrap();
    wb.retarget(Slot::new(col("tue"), 1)).unwrap();
    wb.end_drag().unwrap();
    let session = wb.start_drag(&card("A")).unwrap();
    assert_eq!(session.source, Slot::new(col("tue"), 1));

    // the move fails and A is back in mon[0], its own column now
    host.release_card(&card("A"));
    assert!(!wb.next_settlement().await.unwrap().is_success());
    assert_eq!(wb.board().card_ids(&col("mon")), vec!["A", "B"]);

    let target = wb.retarget(Slot::new(col("mon"), 9)).unwrap();
    assert_eq!(target, Slot::new(col("mon"), 1));
    let target = wb.step_target(Direction::Down).unwrap();
    assert_eq!(target, Slot::new(col("mon"), 1));

    host.clear_failures();
    wb.end_drag().unwrap();
    assert!(wb.next_settlement().await.unwrap().is_success());
    assert_eq!(wb.board().card_ids(&col("mon")), vec!["B", "A"]);
    assert_eq!(
        host.reorder_calls(),
        vec![ReorderOperation {
            card_id: card("A"),
            column: col("mon"),
            from_index: 0,
            to_index: 1,
        }]
    );
}
