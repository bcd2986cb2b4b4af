//! drag::policy
//!
//! The constraint seam: may this card be dropped in that column?
//!
//! The policy is asked exactly once per drop attempt, when the drag is
//! released, with the target column taken from the visible board. A `false`
//! answer is an ordinary outcome; the drag simply ends with nothing changed.

use crate::core::board::{Card, Column};

/// Decides whether a drop is permitted.
pub trait DropPolicy: Send + Sync {
    fn allow_drop(&self, card: &Card, target: &Column) -> bool;
}

/// Permits every drop.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl DropPolicy for AllowAll {
    fn allow_drop(&self, _card: &Card, _target: &Column) -> bool {
        true
    }
}

/// Keeps pinned cards in their own column.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinnedStayPut;

impl DropPolicy for PinnedStayPut {
    fn allow_drop(&self, card: &Card, target: &Column) -> bool {
        !card.pinned || target.position(&card.id).is_some()
    }
}

impl<F> DropPolicy for F
where
    F: Fn(&Card, &Column) -> bool + Send + Sync,
{
    fn allow_drop(&self, card: &Card, target: &Column) -> bool {
        self(card, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CardId, ColumnId};

    fn card(id: &str) -> Card {
        Card::new(CardId::new(id).unwrap(), id)
    }

    #[test]
    fn allow_all_allows() {
        let column = Column::new(ColumnId::new("mon").unwrap());
        assert!(AllowAll.allow_drop(&card("A"), &column));
    }

    #[test]
    fn closures_are_policies() {
        let no_sundays = |_: &Card, target: &Column| target.id.as_str() != "sun";
        let sun = Column::new(ColumnId::new("sun").unwrap());
        let sat = Column::new(ColumnId::new("sat").unwrap());
        assert!(!no_sundays.allow_drop(&card("A"), &sun));
        assert!(no_sundays.allow_drop(&card("A"), &sat));
    }

    #[test]
    fn pinned_cards_stay_in_their_column() {
        let pinned = card("A").pinned();
        let home = Column::new(ColumnId::new("mon").unwrap()).with_cards(vec![pinned.clone()]);
        let away = Column::new(ColumnId::new("tue").unwrap());

        assert!(PinnedStayPut.allow_drop(&pinned, &home));
        assert!(!PinnedStayPut.allow_drop(&pinned, &away));
        assert!(PinnedStayPut.allow_drop(&card("B"), &away));
    }
}
