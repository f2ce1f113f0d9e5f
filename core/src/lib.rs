#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cascade match engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative game session, and the topology strategies. Adapters submit
//! [`Command`] values describing desired mutations, the session executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values describing every placement, removal, score change and terminal
//! transition. The topology crates consume the token and position vocabulary
//! defined here and never observe commands or events directly.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod rng;

/// Minimum number of same-color tokens that qualifies a group as a match.
pub const MATCH_THRESHOLD: usize = 3;

/// Largest palette size supported by any game configuration.
pub const MAX_PALETTE_COLORS: u8 = 22;

/// Seed used when a configuration does not supply one.
pub const DEFAULT_GENERATION_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Fixed set of token colors active within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Palette {
    colors: u8,
}

impl Palette {
    /// Creates a palette with the provided color count, clamped to the
    /// supported range of two to [`MAX_PALETTE_COLORS`] colors.
    #[must_use]
    pub fn new(colors: u8) -> Self {
        Self {
            colors: colors.clamp(2, MAX_PALETTE_COLORS),
        }
    }

    /// Number of colors contained in the palette.
    #[must_use]
    pub const fn colors(&self) -> u8 {
        self.colors
    }

    /// Resolves a color index into a validated [`TokenColor`].
    pub fn color(&self, index: u8) -> Result<TokenColor, InvalidColor> {
        if index < self.colors {
            Ok(TokenColor(index))
        } else {
            Err(InvalidColor {
                index,
                palette: self.colors,
            })
        }
    }

    /// Reports whether the provided color belongs to this palette.
    #[must_use]
    pub const fn contains(&self, color: TokenColor) -> bool {
        color.0 < self.colors
    }

    /// Iterator over every color in the palette, in index order.
    pub fn iter(&self) -> impl Iterator<Item = TokenColor> {
        (0..self.colors).map(TokenColor)
    }

    /// Draws a uniformly random color from the palette.
    pub fn sample(&self, rng: &mut rng::GameRng) -> TokenColor {
        TokenColor(rng.next_range(u32::from(self.colors)) as u8)
    }
}

/// Color assigned to a matchable token.
///
/// Values are only constructible through [`Palette::color`], which keeps
/// out-of-palette indices from ever reaching match detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenColor(u8);

impl TokenColor {
    /// Zero-based index of the color within its palette.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.0
    }
}

/// Special behavior carried by a power token, applied when the token commits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenEffect {
    /// Slows the chain's forward motion for a fixed duration.
    Slow,
    /// Removes the tokens surrounding the impact point.
    Explode,
    /// Pushes the whole chain back along its path.
    Reverse,
    /// Raises the launch speed for a fixed duration.
    SpeedBoost,
}

impl TokenEffect {
    /// Every effect, in dispatch-table order.
    pub const ALL: [Self; 4] = [Self::Slow, Self::Explode, Self::Reverse, Self::SpeedBoost];

    /// Score credited for activating the effect, before any per-token award.
    #[must_use]
    pub const fn activation_bonus(self) -> u32 {
        match self {
            Self::Slow | Self::SpeedBoost => 50,
            Self::Explode => 100,
            Self::Reverse => 75,
        }
    }
}

/// Distinguishes plain matchable tokens from effect-carrying power tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Ordinary token that participates in color matching.
    Plain,
    /// Token that triggers the wrapped effect instead of matching.
    Power(TokenEffect),
}

/// Atomic matchable unit owned by a board, chain or tableau.
///
/// A token does not know its own position; the owning store maps positions
/// to tokens and guarantees that a position holds at most one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    color: TokenColor,
    kind: TokenKind,
}

impl Token {
    /// Creates a plain token of the provided color.
    #[must_use]
    pub const fn plain(color: TokenColor) -> Self {
        Self {
            color,
            kind: TokenKind::Plain,
        }
    }

    /// Creates a power token that triggers the provided effect on commit.
    #[must_use]
    pub const fn power(color: TokenColor, effect: TokenEffect) -> Self {
        Self {
            color,
            kind: TokenKind::Power(effect),
        }
    }

    /// Color used for match detection.
    #[must_use]
    pub const fn color(&self) -> TokenColor {
        self.color
    }

    /// Kind of the token.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Effect carried by the token, if it is a power token.
    #[must_use]
    pub const fn effect(&self) -> Option<TokenEffect> {
        match self.kind {
            TokenKind::Power(effect) => Some(effect),
            TokenKind::Plain => None,
        }
    }
}

/// Location of a single hex-offset board cell expressed as row and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    row: u32,
    column: u32,
}

impl GridPos {
    /// Creates a new board position.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index; row zero is the ceiling.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

/// Topology-tagged location of a token, as reported in events and errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Cell of the hex-offset board.
    Grid(GridPos),
    /// Zero-based index into the live chain sequence at removal time.
    Chain(usize),
    /// Zero-based slot index within the rack.
    Slot(usize),
}

/// Unique identifier assigned to a tableau card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(u32);

impl CardId {
    /// Creates a new card identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Board topology driven by a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyKind {
    /// Hex-offset bubble grid resolved by flood fill.
    Grid,
    /// Path-bound token chain resolved by run scanning.
    Chain,
    /// Layered tableau feeding a first-in-first-out slot rack.
    Slots,
}

/// Configuration used to construct a game session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Topology the session drives.
    pub topology: TopologyKind,
    /// One-based level to generate.
    pub level: u32,
    /// Seed for deterministic level generation.
    pub seed: u64,
    /// Shots available on the grid topology; `None` means unlimited.
    pub shot_budget: Option<u32>,
    /// Lives available on the chain topology.
    pub lives: u32,
}

impl SessionConfig {
    /// Creates a configuration for the provided topology with default tuning.
    #[must_use]
    pub const fn new(topology: TopologyKind) -> Self {
        Self {
            topology,
            level: 1,
            seed: DEFAULT_GENERATION_SEED,
            shot_budget: None,
            lives: 3,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(TopologyKind::Grid)
    }
}

/// Failure raised by topology stores for malformed access or exhausted
/// capacity.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopologyError {
    /// The provided position lies outside the store's extent.
    ///
    /// Always a caller bug; traversal functions never produce positions that
    /// trip this.
    #[error("position {0:?} lies outside the active extent")]
    OutOfBounds(Position),
    /// Placement search exhausted every reachable cell.
    #[error("no open cell is reachable from the impact point")]
    BoardFull,
}

/// Rejection raised when a color index falls outside the active palette.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[error("color index {index} is not part of the {palette}-color palette")]
pub struct InvalidColor {
    /// Color index that was requested.
    pub index: u8,
    /// Number of colors in the rejecting palette.
    pub palette: u8,
}

/// Reasons a projectile launch request may be rejected by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaunchError {
    /// The requested color is not part of the active palette.
    InvalidColor,
    /// The session is not in a state that accepts a launch.
    NotReady,
    /// The session is paused.
    Paused,
}

/// Reasons a card pick request may be rejected by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickError {
    /// No card with the provided identifier remains in the tableau.
    UnknownCard,
    /// A higher-layer card overlaps the requested one.
    Occluded,
    /// The session is not in a state that accepts a pick.
    NotReady,
    /// The session is paused.
    Paused,
}

/// Structural loss conditions that terminate a level.
///
/// These are expected terminal transitions, not faults; they are signaled
/// through [`Event::GameOver`] rather than through an error type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverReason {
    /// A grid token reached the forbidden bottom row.
    BottomRowReached,
    /// The chain ran out of lives after tokens escaped the path end.
    ChainReachedEnd,
    /// The shot budget was spent without clearing the board.
    ShotsExhausted,
    /// The move budget was spent without clearing the tableau.
    MovesExhausted,
    /// Every rack slot filled without forming a match.
    SlotsFull,
    /// Placement found no open cell anywhere on the board.
    BoardFull,
}

/// Lifecycle phase of an active session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for player intent.
    Idle,
    /// An aim angle has been staged but nothing launched.
    Aiming,
    /// At least one projectile is traveling through the arena.
    ProjectileInFlight,
    /// A committed token is being matched and collapsed.
    Resolving,
    /// The board or chain emptied; awaiting [`Command::AdvanceLevel`].
    LevelComplete,
    /// A structural loss condition ended the session.
    GameOver,
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the session from the provided configuration.
    ConfigureSession {
        /// Configuration describing topology, level and tuning.
        config: SessionConfig,
    },
    /// Stages an aim angle ahead of a launch.
    Aim {
        /// Desired launch angle in radians; clamped to the topology's arc.
        angle_radians: f32,
    },
    /// Launches a projectile token toward the board or chain.
    LaunchProjectile {
        /// Palette index of the projectile color.
        color_index: u8,
        /// Effect the projectile carries, if it is a power token.
        effect: Option<TokenEffect>,
        /// Launch angle in radians; clamped to the topology's arc.
        angle_radians: f32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Picks an exposed tableau card and moves it to the rack.
    PickCard {
        /// Identifier of the card to pick.
        card: CardId,
    },
    /// Freezes motion and timers without losing in-flight state.
    Pause,
    /// Resumes a paused session exactly where it stopped.
    Resume,
    /// Generates the next level after a completed one.
    AdvanceLevel,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the session rebuilt itself from a configuration.
    SessionConfigured {
        /// Topology that became active.
        topology: TopologyKind,
        /// Level that was generated.
        level: u32,
        /// Palette active for the level.
        palette: Palette,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a projectile entered the arena.
    ProjectileLaunched {
        /// Token the projectile carries.
        token: Token,
        /// Launch angle after arc clamping, in radians.
        angle_radians: f32,
    },
    /// Reports that a launch request was rejected.
    ProjectileRejected {
        /// Specific reason the launch failed.
        reason: LaunchError,
    },
    /// Confirms that a projectile committed to the board or chain.
    TokenCommitted {
        /// Token that was committed.
        token: Token,
        /// Position the token now occupies.
        position: Position,
    },
    /// Reports the removal of a qualifying same-color group.
    Matched {
        /// Positions removed by the match, in detection order.
        positions: Vec<Position>,
        /// Score credited for the removal.
        score_delta: u32,
    },
    /// Reports secondary removals caused by support loss or gap closure.
    Collapsed {
        /// Positions removed by the collapse, in detection order.
        positions: Vec<Position>,
        /// Score credited for the removal.
        score_delta: u32,
    },
    /// Confirms that a power token's effect fired at commit time.
    EffectActivated {
        /// Effect that fired.
        effect: TokenEffect,
        /// Score credited for the activation, including per-token awards.
        score_delta: u32,
    },
    /// Confirms that a tableau card moved into the rack.
    CardMoved {
        /// Identifier of the card that moved.
        card: CardId,
        /// Rack slot the card landed in.
        slot: usize,
    },
    /// Reports that a face-down card became exposed and was revealed.
    CardRevealed {
        /// Identifier of the revealed card.
        card: CardId,
        /// Color the card turned out to carry.
        color: TokenColor,
    },
    /// Reports that a pick request was rejected.
    PickRejected {
        /// Identifier of the card named in the request.
        card: CardId,
        /// Specific reason the pick failed.
        reason: PickError,
    },
    /// Reports tokens escaping the end of the chain path.
    LifeLost {
        /// Number of tokens that escaped this tick.
        escaped: usize,
        /// Lives remaining after the loss.
        remaining: u32,
    },
    /// Confirms that the session froze.
    Paused,
    /// Confirms that the session resumed.
    Resumed,
    /// Signals that the board or chain emptied.
    LevelComplete {
        /// Level that was completed.
        level: u32,
        /// Bonus score credited for the completion.
        bonus: u32,
    },
    /// Signals a structural loss condition.
    GameOver {
        /// Specific condition that ended the session.
        reason: GameOverReason,
    },
}
