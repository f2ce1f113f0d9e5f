use cascade_core::{CardId, Palette, TokenColor};
use cascade_topology_slots::{SlotRack, Tableau, TableauCard, SLOT_CAPACITY};

fn palette() -> Palette {
    Palette::new(8)
}

fn color(index: u8) -> TokenColor {
    palette().color(index).expect("index inside test palette")
}

fn card(id: u32, color_index: u8, layer: u32, x: f32, y: f32) -> TableauCard {
    TableauCard::new(CardId::new(id), color(color_index), layer, x, y, false)
}

#[test]
fn higher_layer_overlap_occludes_the_card_below() {
    let tableau = Tableau::from_cards(vec![
        card(0, 0, 0, 100.0, 100.0),
        card(1, 1, 1, 130.0, 140.0),
    ]);
    assert!(!tableau.is_exposed(CardId::new(0)));
    assert!(tableau.is_exposed(CardId::new(1)));
    assert_eq!(tableau.exposed(), vec![CardId::new(1)]);
}

#[test]
fn touching_footprints_count_as_overlap() {
    // Card 1 starts exactly one card-width to the right of card 0.
    let tableau = Tableau::from_cards(vec![
        card(0, 0, 0, 100.0, 100.0),
        card(1, 1, 1, 160.0, 100.0),
    ]);
    assert!(!tableau.is_exposed(CardId::new(0)));
}

#[test]
fn separated_footprints_do_not_occlude() {
    let tableau = Tableau::from_cards(vec![
        card(0, 0, 0, 100.0, 100.0),
        card(1, 1, 1, 300.0, 100.0),
    ]);
    assert!(tableau.is_exposed(CardId::new(0)));
    assert!(tableau.is_exposed(CardId::new(1)));
}

#[test]
fn same_layer_overlap_does_not_occlude() {
    let tableau = Tableau::from_cards(vec![
        card(0, 0, 1, 100.0, 100.0),
        card(1, 1, 1, 120.0, 110.0),
    ]);
    assert!(tableau.is_exposed(CardId::new(0)));
    assert!(tableau.is_exposed(CardId::new(1)));
}

#[test]
fn taking_the_cover_re_exposes_the_card_below() {
    let mut tableau = Tableau::from_cards(vec![
        card(0, 0, 0, 100.0, 100.0),
        card(1, 1, 1, 130.0, 140.0),
    ]);
    let taken = tableau.take(CardId::new(1)).expect("card present");
    assert_eq!(taken.id(), CardId::new(1));
    assert!(tableau.is_exposed(CardId::new(0)));
    assert_eq!(tableau.len(), 1);
    assert!(tableau.take(CardId::new(1)).is_none());
}

#[test]
fn exposed_face_down_cards_are_revealed() {
    let hidden = TableauCard::new(CardId::new(0), color(4), 0, 100.0, 100.0, true);
    let cover = card(1, 1, 1, 120.0, 110.0);
    let mut tableau = Tableau::from_cards(vec![hidden, cover]);

    // Covered: nothing to reveal yet.
    assert!(tableau.reveal_exposed().is_empty());

    let _ = tableau.take(CardId::new(1)).expect("cover present");
    let revealed = tableau.reveal_exposed();
    assert_eq!(revealed, vec![(CardId::new(0), color(4))]);
    assert!(!tableau
        .get(CardId::new(0))
        .expect("card present")
        .is_face_down());
}

#[test]
fn rack_fills_leftmost_first() {
    let mut rack = SlotRack::new(SLOT_CAPACITY);
    assert_eq!(rack.push(color(0)), Some(0));
    assert_eq!(rack.push(color(1)), Some(1));
    assert_eq!(rack.push(color(0)), Some(2));
    assert_eq!(rack.occupied_count(), 3);
}

#[test]
fn full_rack_rejects_further_pushes() {
    let mut rack = SlotRack::new(3);
    assert!(rack.push(color(0)).is_some());
    assert!(rack.push(color(1)).is_some());
    assert!(rack.push(color(2)).is_some());
    assert!(rack.is_full());
    assert_eq!(rack.push(color(3)), None);
}

#[test]
fn two_of_a_kind_do_not_collapse() {
    let mut rack = SlotRack::new(SLOT_CAPACITY);
    let _ = rack.push(color(0));
    let _ = rack.push(color(0));
    let _ = rack.push(color(1));
    assert_eq!(rack.take_triple(), None);
    assert_eq!(rack.occupied_count(), 3);
}

#[test]
fn a_triple_collapses_and_survivors_compact_leftward() {
    let mut rack = SlotRack::new(SLOT_CAPACITY);
    let _ = rack.push(color(0));
    let _ = rack.push(color(1));
    let _ = rack.push(color(0));
    let _ = rack.push(color(2));
    let _ = rack.push(color(0));

    let (matched, positions) = rack.take_triple().expect("triple present");
    assert_eq!(matched, color(0));
    assert_eq!(positions, [0, 2, 4]);

    // Survivors slide left, preserving their relative order.
    assert_eq!(rack.occupied_count(), 2);
    assert_eq!(rack.slots()[0], Some(color(1)));
    assert_eq!(rack.slots()[1], Some(color(2)));
    assert_eq!(rack.slots()[2], None);
}

#[test]
fn the_color_completing_first_wins_the_collapse() {
    let mut rack = SlotRack::new(SLOT_CAPACITY);
    // color 1 reaches three copies before color 0 does.
    let _ = rack.push(color(0));
    let _ = rack.push(color(1));
    let _ = rack.push(color(1));
    let _ = rack.push(color(0));
    let _ = rack.push(color(1));
    let _ = rack.push(color(0));

    let (matched, positions) = rack.take_triple().expect("triple present");
    assert_eq!(matched, color(1));
    assert_eq!(positions, [1, 2, 4]);
}

#[test]
fn collapse_runs_once_per_invocation() {
    let mut rack = SlotRack::new(SLOT_CAPACITY);
    for index in [0u8, 0, 0, 1, 1, 1] {
        let _ = rack.push(color(index));
    }
    let (first, _) = rack.take_triple().expect("first triple");
    assert_eq!(first, color(0));
    // The second triple waits for the next invocation.
    let (second, _) = rack.take_triple().expect("second triple");
    assert_eq!(second, color(1));
    assert!(rack.is_empty());
}
