#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Layered tableau topology: occlusion, slot rack and triple collapse.
//!
//! Unlike the grid and chain variants, matching here is not spatial at all.
//! The tableau only decides which cards may be picked: a card is exposed
//! when no card on a strictly higher layer overlaps its footprint. Picked
//! cards enter a first-in-first-out slot rack, and three rack cards of one
//! color collapse together. Forcing this through a flood-fill interface
//! would misstate both halves, so the crate exposes the two structures
//! directly.

use cascade_core::{rng::GameRng, CardId, Palette, TokenColor};

/// Width of a tableau card footprint in world units.
pub const CARD_WIDTH: f32 = 60.0;

/// Height of a tableau card footprint in world units.
pub const CARD_HEIGHT: f32 = 80.0;

/// Number of slots in the rack.
pub const SLOT_CAPACITY: usize = 7;

/// Cards matched and removed by a single rack collapse.
pub const TRIPLE: usize = 3;

/// A card laid out on the tableau.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableauCard {
    id: CardId,
    color: TokenColor,
    layer: u32,
    x: f32,
    y: f32,
    face_down: bool,
}

impl TableauCard {
    /// Creates a card at the provided layer and footprint origin.
    #[must_use]
    pub const fn new(
        id: CardId,
        color: TokenColor,
        layer: u32,
        x: f32,
        y: f32,
        face_down: bool,
    ) -> Self {
        Self {
            id,
            color,
            layer,
            x,
            y,
            face_down,
        }
    }

    /// Identifier assigned to the card.
    #[must_use]
    pub const fn id(&self) -> CardId {
        self.id
    }

    /// Color the card carries; hidden from players while face down.
    #[must_use]
    pub const fn color(&self) -> TokenColor {
        self.color
    }

    /// Layer the card sits on; higher layers occlude lower ones.
    #[must_use]
    pub const fn layer(&self) -> u32 {
        self.layer
    }

    /// Upper-left corner of the card footprint.
    #[must_use]
    pub const fn origin(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Reports whether the card is still face down.
    #[must_use]
    pub const fn is_face_down(&self) -> bool {
        self.face_down
    }

    fn overlaps(&self, other: &Self) -> bool {
        !(self.x + CARD_WIDTH < other.x
            || other.x + CARD_WIDTH < self.x
            || self.y + CARD_HEIGHT < other.y
            || other.y + CARD_HEIGHT < self.y)
    }
}

/// Layered stack of cards awaiting picks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tableau {
    cards: Vec<TableauCard>,
}

impl Tableau {
    /// Creates a tableau from the provided cards.
    #[must_use]
    pub fn from_cards(cards: Vec<TableauCard>) -> Self {
        Self { cards }
    }

    /// Number of cards still on the tableau.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Reports whether every card has been picked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterator over the remaining cards.
    pub fn cards(&self) -> impl Iterator<Item = &TableauCard> {
        self.cards.iter()
    }

    /// Returns the card with the provided identifier, if it remains.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&TableauCard> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// Reports whether the card may be picked.
    ///
    /// A card is exposed when no card on a strictly higher layer overlaps
    /// its footprint; cards sharing a layer never occlude each other.
    #[must_use]
    pub fn is_exposed(&self, id: CardId) -> bool {
        let Some(card) = self.get(id) else {
            return false;
        };
        !self
            .cards
            .iter()
            .any(|other| other.layer > card.layer && other.overlaps(card))
    }

    /// Identifiers of every exposed card, in layout order.
    #[must_use]
    pub fn exposed(&self) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|card| self.is_exposed(card.id))
            .map(|card| card.id)
            .collect()
    }

    /// Removes and returns the card with the provided identifier.
    pub fn take(&mut self, id: CardId) -> Option<TableauCard> {
        let index = self.cards.iter().position(|card| card.id == id)?;
        Some(self.cards.remove(index))
    }

    /// Flips every exposed face-down card face up, reporting the reveals.
    pub fn reveal_exposed(&mut self) -> Vec<(CardId, TokenColor)> {
        let flips: Vec<CardId> = self
            .cards
            .iter()
            .filter(|card| card.face_down && self.is_exposed(card.id))
            .map(|card| card.id)
            .collect();
        let mut revealed = Vec::with_capacity(flips.len());
        for id in flips {
            if let Some(card) = self.cards.iter_mut().find(|card| card.id == id) {
                card.face_down = false;
                revealed.push((card.id, card.color));
            }
        }
        revealed
    }

    /// Distinct colors still on the tableau, in index order.
    #[must_use]
    pub fn active_colors(&self) -> Vec<TokenColor> {
        let mut colors: Vec<TokenColor> = self.cards.iter().map(|card| card.color).collect();
        colors.sort_unstable();
        colors.dedup();
        colors
    }
}

/// First-in-first-out rack collecting picked cards until a triple forms.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotRack {
    slots: Vec<Option<TokenColor>>,
}

impl SlotRack {
    /// Creates an empty rack with the provided capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Number of slots in the rack.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Reports whether every slot is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Reports whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Current slot contents, leftmost first.
    #[must_use]
    pub fn slots(&self) -> &[Option<TokenColor>] {
        &self.slots
    }

    /// Places a color into the first open slot, returning its index.
    ///
    /// Returns `None` when the rack is full; the caller treats that as the
    /// rack-overflow loss condition, not as a fault.
    pub fn push(&mut self, color: TokenColor) -> Option<usize> {
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(color);
        Some(index)
    }

    /// Collapses the first color holding three or more slots.
    ///
    /// Slots are scanned left to right, so the winning color is the one
    /// whose third copy sits leftmost. The three removed positions are
    /// reported as they stood before survivors were compacted leftward.
    pub fn take_triple(&mut self) -> Option<(TokenColor, [usize; TRIPLE])> {
        let mut winner: Option<TokenColor> = None;
        'scan: for (index, slot) in self.slots.iter().enumerate() {
            if let Some(color) = slot {
                let copies = self.slots[..=index]
                    .iter()
                    .filter(|other| other.as_ref() == Some(color))
                    .count();
                if copies >= TRIPLE {
                    winner = Some(*color);
                    break 'scan;
                }
            }
        }

        let color = winner?;
        let mut positions = [0usize; TRIPLE];
        let mut found = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if found < TRIPLE && *slot == Some(color) {
                positions[found] = index;
                found += 1;
                *slot = None;
            }
        }
        self.compact();
        Some((color, positions))
    }

    fn compact(&mut self) {
        let survivors: Vec<TokenColor> = self.slots.iter().filter_map(|slot| *slot).collect();
        for slot in &mut self.slots {
            *slot = None;
        }
        for (index, color) in survivors.into_iter().enumerate() {
            self.slots[index] = Some(color);
        }
    }
}

impl Default for SlotRack {
    fn default() -> Self {
        Self::new(SLOT_CAPACITY)
    }
}

/// Per-level tuning for the slots topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotLevel {
    /// Cards dealt onto the main tableau area.
    pub card_count: u32,
    /// Number of distinct colors in play.
    pub colors: u8,
    /// Number of tableau layers.
    pub layers: u32,
    /// Face-down cards dealt into the side stacks.
    pub blind_cards: u32,
}

impl SlotLevel {
    /// Derives the tuning for the provided one-based level; levels past the
    /// table reuse its last row.
    #[must_use]
    pub fn for_level(level: u32) -> Self {
        let index = level.clamp(1, LEVEL_TABLE.len() as u32) as usize - 1;
        LEVEL_TABLE[index]
    }

    /// Palette active for the level.
    #[must_use]
    pub fn palette(&self) -> Palette {
        Palette::new(self.colors)
    }

    /// Move budget granted when the level opens.
    #[must_use]
    pub fn move_budget(&self, level: u32) -> u32 {
        (30u32.saturating_sub(level * 2)).max(20)
    }
}

const LEVEL_TABLE: [SlotLevel; 10] = [
    SlotLevel { card_count: 24, colors: 6, layers: 2, blind_cards: 6 },
    SlotLevel { card_count: 30, colors: 8, layers: 2, blind_cards: 8 },
    SlotLevel { card_count: 36, colors: 9, layers: 3, blind_cards: 10 },
    SlotLevel { card_count: 42, colors: 10, layers: 3, blind_cards: 12 },
    SlotLevel { card_count: 48, colors: 12, layers: 3, blind_cards: 14 },
    SlotLevel { card_count: 54, colors: 14, layers: 3, blind_cards: 16 },
    SlotLevel { card_count: 60, colors: 16, layers: 3, blind_cards: 18 },
    SlotLevel { card_count: 66, colors: 18, layers: 3, blind_cards: 20 },
    SlotLevel { card_count: 72, colors: 20, layers: 3, blind_cards: 22 },
    SlotLevel { card_count: 78, colors: 22, layers: 3, blind_cards: 24 },
];

/// Main tableau area the cards are scattered across, in world units.
const AREA_WIDTH: f32 = 600.0;
const AREA_HEIGHT: f32 = 400.0;

/// Horizontal positions of the face-down side stacks.
const BLIND_STACK_X: [f32; 2] = [20.0, AREA_WIDTH - CARD_WIDTH - 20.0];

/// Generates the opening tableau for the provided level and seed.
///
/// Every color's main-area card count is a multiple of three so the level
/// stays clearable; face-down cards are dealt into two side stacks where
/// only the top of each stack starts exposed.
#[must_use]
pub fn generate(level: u32, seed: u64) -> Tableau {
    let tuning = SlotLevel::for_level(level);
    let palette = tuning.palette();
    let mut rng = GameRng::new(seed);

    let colors = u32::from(tuning.colors);
    let per_color = ((tuning.card_count / colors) / TRIPLE as u32 * TRIPLE as u32).max(3);

    let mut colors_out: Vec<TokenColor> = Vec::new();
    for color in palette.iter() {
        for _ in 0..per_color {
            colors_out.push(color);
        }
    }
    rng.shuffle(&mut colors_out);

    let mut cards = Vec::with_capacity(colors_out.len() + tuning.blind_cards as usize);
    let mut next_id = 0u32;
    for color in colors_out {
        let x = 40.0 + rng.next_f32() * (AREA_WIDTH - CARD_WIDTH - 80.0);
        let y = 40.0 + rng.next_f32() * (AREA_HEIGHT - CARD_HEIGHT - 80.0);
        let layer = rng.next_range(tuning.layers);
        cards.push(TableauCard::new(
            CardId::new(next_id),
            color,
            layer,
            x,
            y,
            false,
        ));
        next_id += 1;
    }

    for blind_index in 0..tuning.blind_cards {
        let stack = (blind_index % 2) as usize;
        let depth = blind_index / 2;
        let color = palette.sample(&mut rng);
        cards.push(TableauCard::new(
            CardId::new(next_id),
            color,
            depth,
            BLIND_STACK_X[stack],
            AREA_HEIGHT - CARD_HEIGHT - 20.0 - depth as f32 * 2.0,
            true,
        ));
        next_id += 1;
    }

    Tableau::from_cards(cards)
}
