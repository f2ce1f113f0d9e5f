//! Slots-variant play state: tableau picks feeding the rack.

use cascade_core::{CardId, Event, GameOverReason, Palette, PickError, Position};
use cascade_topology_slots::{SlotLevel, SlotRack, Tableau, SLOT_CAPACITY};

use crate::StepResult;

/// Points per rack triple collapsed.
pub(crate) const MATCH_POINTS: u32 = 100;

/// Completion bonus per unspent move.
pub(crate) const MOVE_BONUS: u32 = 10;

pub(crate) struct SlotsPlay {
    pub(crate) tableau: Tableau,
    pub(crate) rack: SlotRack,
    pub(crate) moves_remaining: u32,
}

impl SlotsPlay {
    pub(crate) fn generate(level: u32, seed: u64) -> Self {
        let tuning = SlotLevel::for_level(level);
        Self::from_tableau(
            cascade_topology_slots::generate(level, seed),
            tuning.move_budget(level),
        )
    }

    pub(crate) fn from_tableau(tableau: Tableau, move_budget: u32) -> Self {
        Self {
            tableau,
            rack: SlotRack::new(SLOT_CAPACITY),
            moves_remaining: move_budget,
        }
    }

    pub(crate) fn palette(level: u32) -> Palette {
        SlotLevel::for_level(level).palette()
    }
}

/// Moves an exposed card into the rack and resolves any triple.
pub(crate) fn pick(play: &mut SlotsPlay, card: CardId, out: &mut Vec<Event>) -> StepResult {
    let mut result = StepResult::default();
    if play.tableau.get(card).is_none() {
        out.push(Event::PickRejected {
            card,
            reason: PickError::UnknownCard,
        });
        return result;
    }
    if !play.tableau.is_exposed(card) {
        out.push(Event::PickRejected {
            card,
            reason: PickError::Occluded,
        });
        return result;
    }
    let Some(taken) = play.tableau.take(card) else {
        out.push(Event::PickRejected {
            card,
            reason: PickError::UnknownCard,
        });
        return result;
    };

    play.moves_remaining = play.moves_remaining.saturating_sub(1);
    let Some(slot) = play.rack.push(taken.color()) else {
        result.game_over = Some(GameOverReason::SlotsFull);
        return result;
    };
    out.push(Event::CardMoved { card, slot });

    if let Some((_, positions)) = play.rack.take_triple() {
        result.score_delta += MATCH_POINTS;
        out.push(Event::Matched {
            positions: positions.iter().copied().map(Position::Slot).collect(),
            score_delta: MATCH_POINTS,
        });
    }

    for (revealed, color) in play.tableau.reveal_exposed() {
        out.push(Event::CardRevealed {
            card: revealed,
            color,
        });
    }

    result.resolved = true;
    if play.tableau.is_empty() {
        result.level_bonus = Some(play.moves_remaining * MOVE_BONUS);
    } else if play.moves_remaining == 0 {
        result.game_over = Some(GameOverReason::MovesExhausted);
    } else if play.rack.is_full() {
        result.game_over = Some(GameOverReason::SlotsFull);
    }
    result
}
