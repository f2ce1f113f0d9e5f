#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Path-bound chain topology: ordered store, insertion and gap closure.
//!
//! Tokens ride a fixed polyline in single file. Each carries a path offset
//! that strictly increases along the sequence, so index zero is the tail and
//! the last index leads the march toward the path end. Every mutation keeps
//! survivors exactly one pitch apart, which is what "the gap closes" means
//! for this topology; there is no separate collapse pass.

use std::ops::Range;

use cascade_core::{
    rng::GameRng, Palette, Position, Token, TokenColor, TokenEffect, TopologyError,
};

/// Radius of a chain token in world units.
pub const BALL_RADIUS: f32 = 15.0;

/// Spacing between adjacent chain tokens, in path slots.
pub const PATH_PITCH: f32 = 2.0;

/// Tokens removed on each side of an exploding power token.
pub const EXPLOSION_RADIUS: usize = 3;

/// Path slots the chain retreats when a reverse power token fires.
pub const PUSH_BACK_SLOTS: f32 = 20.0;

/// Chance that a generated token carries a power effect.
const POWER_CHANCE: f32 = 0.15;

/// A token riding the chain at a specific path offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainToken {
    token: Token,
    path_offset: f32,
}

impl ChainToken {
    /// Token carried at this position.
    #[must_use]
    pub const fn token(&self) -> Token {
        self.token
    }

    /// Offset along the path, in path slots.
    #[must_use]
    pub const fn path_offset(&self) -> f32 {
        self.path_offset
    }
}

/// Ordered sequence of tokens mapped onto a path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chain {
    tokens: Vec<ChainToken>,
}

impl Chain {
    /// Creates an empty chain.
    #[must_use]
    pub const fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Creates a chain from tokens spaced one pitch apart starting at zero.
    #[must_use]
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .enumerate()
                .map(|(index, token)| ChainToken {
                    token,
                    path_offset: index as f32 * PATH_PITCH,
                })
                .collect(),
        }
    }

    /// Number of tokens riding the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Reports whether the chain holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the chain token at the provided index.
    pub fn get(&self, index: usize) -> Result<&ChainToken, TopologyError> {
        self.tokens
            .get(index)
            .ok_or(TopologyError::OutOfBounds(Position::Chain(index)))
    }

    /// Iterator over the live sequence in path order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainToken> {
        self.tokens.iter()
    }

    /// Distinct colors currently riding the chain, in index order.
    #[must_use]
    pub fn active_colors(&self) -> Vec<TokenColor> {
        let mut colors: Vec<TokenColor> = self
            .tokens
            .iter()
            .filter(|entry| entry.token.effect().is_none())
            .map(|entry| entry.token.color())
            .collect();
        colors.sort_unstable();
        colors.dedup();
        colors
    }

    /// Advances every token by `delta` path slots.
    ///
    /// Tokens whose offset reaches `path_end` have escaped; they are removed
    /// and returned front-most first.
    pub fn advance(&mut self, delta: f32, path_end: f32) -> Vec<Token> {
        for entry in &mut self.tokens {
            entry.path_offset += delta;
        }
        let mut escaped = Vec::new();
        while let Some(front) = self.tokens.last() {
            if front.path_offset >= path_end {
                if let Some(entry) = self.tokens.pop() {
                    escaped.push(entry.token);
                }
            } else {
                break;
            }
        }
        escaped
    }

    /// Inserts a projectile token immediately before the struck index.
    ///
    /// The new token takes over the struck token's offset and every token
    /// after it is renumbered to one pitch past its predecessor, preserving
    /// the strict ordering invariant.
    pub fn insert(&mut self, token: Token, hit_index: usize) -> Result<usize, TopologyError> {
        if hit_index >= self.tokens.len() {
            return Err(TopologyError::OutOfBounds(Position::Chain(hit_index)));
        }
        let path_offset = self.tokens[hit_index].path_offset;
        self.tokens.insert(hit_index, ChainToken { token, path_offset });
        self.renumber_from(hit_index + 1);
        Ok(hit_index)
    }

    /// Returns the maximal contiguous same-color run containing the seed.
    ///
    /// An out-of-range seed yields an empty run; callers decide whether the
    /// run length qualifies as a match.
    #[must_use]
    pub fn find_run(&self, seed: usize) -> Range<usize> {
        let Some(entry) = self.tokens.get(seed) else {
            return seed..seed;
        };
        let color = entry.token.color();
        let mut start = seed;
        while start > 0 && self.tokens[start - 1].token.color() == color {
            start -= 1;
        }
        let mut end = seed + 1;
        while end < self.tokens.len() && self.tokens[end].token.color() == color {
            end += 1;
        }
        start..end
    }

    /// Removes the provided run and closes the gap behind it.
    ///
    /// Returns the removed tokens along with the junction index where the
    /// former left and right neighbors now meet, so callers can re-detect
    /// newly exposed runs there.
    pub fn remove_run(&mut self, run: Range<usize>) -> Result<(Vec<Token>, Option<usize>), TopologyError> {
        if run.end > self.tokens.len() || run.start > run.end {
            return Err(TopologyError::OutOfBounds(Position::Chain(run.end)));
        }
        let removed: Vec<Token> = self
            .tokens
            .drain(run.clone())
            .map(|entry| entry.token)
            .collect();
        self.renumber_from(run.start);
        let junction = if run.start < self.tokens.len() {
            Some(run.start)
        } else {
            None
        };
        Ok((removed, junction))
    }

    /// Removes the tokens surrounding an exploding power token.
    pub fn explode(&mut self, center: usize) -> Result<Vec<Token>, TopologyError> {
        if center >= self.tokens.len() {
            return Err(TopologyError::OutOfBounds(Position::Chain(center)));
        }
        let start = center.saturating_sub(EXPLOSION_RADIUS);
        let end = (center + EXPLOSION_RADIUS + 1).min(self.tokens.len());
        let (removed, _) = self.remove_run(start..end)?;
        Ok(removed)
    }

    /// Pushes the whole chain back along its path.
    ///
    /// The retreat is capped so the tail never drops below offset zero, which
    /// keeps survivor spacing intact instead of piling tokens at the start.
    pub fn push_back(&mut self, slots: f32) {
        let Some(tail) = self.tokens.first() else {
            return;
        };
        let shift = slots.min(tail.path_offset).max(0.0);
        for entry in &mut self.tokens {
            entry.path_offset -= shift;
        }
    }

    /// Renumbers every token from `start` to one pitch past its predecessor.
    ///
    /// The token at index zero returns to offset zero, matching the chain
    /// re-entering from the path start after its head segment was removed.
    fn renumber_from(&mut self, start: usize) {
        for index in start..self.tokens.len() {
            self.tokens[index].path_offset = if index == 0 {
                0.0
            } else {
                self.tokens[index - 1].path_offset + PATH_PITCH
            };
        }
    }
}

/// Fixed polyline the chain rides, spiraling toward the arena center.
#[derive(Clone, Debug, PartialEq)]
pub struct SpiralPath {
    points: Vec<(f32, f32)>,
}

impl SpiralPath {
    /// Generates the spiral for an arena of the provided dimensions:
    /// three turns sampled every two degrees, tightening toward the center.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        let center_x = width / 2.0;
        let center_y = height / 2.0;
        let base_radius = 200.0;
        let mut points = Vec::with_capacity(360 * 3 / 2);
        let mut step = 0;
        while step < 360 * 3 {
            let angle = (step as f32).to_radians();
            let radius = base_radius - step as f32 / 10.0;
            points.push((
                center_x + angle.cos() * radius,
                center_y + angle.sin() * radius,
            ));
            step += 2;
        }
        Self { points }
    }

    /// Number of sampled points along the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the path holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Offset just past the final point; tokens reaching it have escaped.
    #[must_use]
    pub fn end(&self) -> f32 {
        self.points.len() as f32
    }

    /// World coordinates of the provided path offset, if it lies on the path.
    #[must_use]
    pub fn point_at(&self, offset: f32) -> Option<(f32, f32)> {
        if offset < 0.0 {
            return None;
        }
        self.points.get(offset as usize).copied()
    }
}

/// Index of the first chain token within contact range of `(x, y)`.
#[must_use]
pub fn impact_index(chain: &Chain, path: &SpiralPath, x: f32, y: f32, radius: f32) -> Option<usize> {
    let contact_distance = radius * 2.0;
    chain.iter().enumerate().find_map(|(index, entry)| {
        let (token_x, token_y) = path.point_at(entry.path_offset())?;
        let dx = x - token_x;
        let dy = y - token_y;
        if dx * dx + dy * dy < contact_distance * contact_distance {
            Some(index)
        } else {
            None
        }
    })
}

/// Per-level tuning for the chain topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainLevel {
    /// Number of tokens the level opens with.
    pub token_count: u32,
    /// Palette active for the level.
    pub palette: Palette,
}

impl ChainLevel {
    /// Derives the tuning for the provided one-based level.
    #[must_use]
    pub fn for_level(level: u32) -> Self {
        Self {
            token_count: 20 + level * 5,
            palette: Palette::new(6),
        }
    }
}

/// Generates the opening chain for the provided level and seed.
#[must_use]
pub fn generate(level: u32, seed: u64) -> Chain {
    let tuning = ChainLevel::for_level(level);
    let mut rng = GameRng::new(seed);
    let mut tokens = Vec::with_capacity(tuning.token_count as usize);
    for _ in 0..tuning.token_count {
        let color = tuning.palette.sample(&mut rng);
        let token = if rng.next_f32() < POWER_CHANCE {
            let effect = TokenEffect::ALL[rng.next_range(TokenEffect::ALL.len() as u32) as usize];
            Token::power(color, effect)
        } else {
            Token::plain(color)
        };
        tokens.push(token);
    }
    Chain::from_tokens(tokens)
}
