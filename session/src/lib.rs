#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative per-game state for the Cascade match engine.
//!
//! A [`GameSession`] owns exactly one topology state and is its single
//! writer. Adapters submit [`Command`] values through [`apply`], which runs
//! placement, match detection and collapse to completion within the call and
//! broadcasts [`Event`] values for everything that happened. Read access
//! goes through the [`query`] module, which only ever hands out snapshots.
//! Nothing here blocks or defers: "no match" and "board full" are immediate
//! synchronous outcomes.

use std::time::Duration;

use cascade_core::{
    Command, Event, GameOverReason, LaunchError, Palette, Phase, PickError, SessionConfig, Token,
    TopologyKind,
};

mod chain;
mod grid;
mod projectile;
mod slots;

/// Authoritative state for one running game.
///
/// Sessions are independent: hosting several concurrent games means one
/// session per room, each owned by its caller, with no shared mutable state.
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    level: u32,
    score: u32,
    phase: Phase,
    paused: bool,
    staged_angle: Option<f32>,
    play: Play,
}

enum Play {
    Grid(grid::GridPlay),
    Chain(chain::ChainPlay),
    Slots(slots::SlotsPlay),
}

impl std::fmt::Debug for Play {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grid(_) => f.write_str("Play::Grid"),
            Self::Chain(_) => f.write_str("Play::Chain"),
            Self::Slots(_) => f.write_str("Play::Slots"),
        }
    }
}

impl Play {
    fn generate(config: &SessionConfig, level: u32, seed: u64, lives: u32) -> Self {
        match config.topology {
            TopologyKind::Grid => Self::Grid(grid::GridPlay::generate(
                level,
                seed,
                config.shot_budget,
            )),
            TopologyKind::Chain => Self::Chain(chain::ChainPlay::generate(level, seed, lives)),
            TopologyKind::Slots => Self::Slots(slots::SlotsPlay::generate(level, seed)),
        }
    }
}

impl GameSession {
    /// Creates a session with the default configuration.
    ///
    /// Adapters normally follow up with [`Command::ConfigureSession`] to
    /// select a topology, level and seed.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(SessionConfig::default())
    }

    fn from_config(config: SessionConfig) -> Self {
        let level = config.level.max(1);
        Self {
            config,
            level,
            score: 0,
            phase: Phase::Idle,
            paused: false,
            staged_angle: None,
            play: Play::generate(&config, level, config.seed, config.lives),
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::LevelComplete | Phase::GameOver)
    }

    fn palette(&self) -> Palette {
        match self.config.topology {
            TopologyKind::Grid => grid::GridPlay::palette(self.level),
            TopologyKind::Chain => chain::ChainPlay::palette(self.level),
            TopologyKind::Slots => slots::SlotsPlay::palette(self.level),
        }
    }

    fn clamp_angle(&self, angle: f32) -> f32 {
        match self.config.topology {
            TopologyKind::Grid => grid::clamp_angle(angle),
            TopologyKind::Chain | TopologyKind::Slots => angle,
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one resolution step, folded into the session by `finish`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct StepResult {
    score_delta: u32,
    level_bonus: Option<u32>,
    game_over: Option<GameOverReason>,
    resolved: bool,
    in_flight: bool,
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(session: &mut GameSession, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureSession { config } => {
            *session = GameSession::from_config(config);
            announce(session, out_events);
        }
        Command::Pause => {
            if !session.paused && !session.is_terminal() {
                session.paused = true;
                out_events.push(Event::Paused);
            }
        }
        Command::Resume => {
            if session.paused {
                session.paused = false;
                out_events.push(Event::Resumed);
            }
        }
        Command::Aim { angle_radians } => {
            if session.paused || session.is_terminal() {
                return;
            }
            session.staged_angle = Some(session.clamp_angle(angle_radians));
            if session.phase == Phase::Idle {
                session.phase = Phase::Aiming;
            }
        }
        Command::LaunchProjectile {
            color_index,
            effect,
            angle_radians,
        } => launch(session, color_index, effect, angle_radians, out_events),
        Command::Tick { dt } => tick(session, dt, out_events),
        Command::PickCard { card } => pick_card(session, card, out_events),
        Command::AdvanceLevel => advance_level(session, out_events),
    }
}

fn announce(session: &mut GameSession, out_events: &mut Vec<Event>) {
    out_events.push(Event::SessionConfigured {
        topology: session.config.topology,
        level: session.level,
        palette: session.palette(),
    });
    if let Play::Slots(play) = &mut session.play {
        for (card, color) in play.tableau.reveal_exposed() {
            out_events.push(Event::CardRevealed { card, color });
        }
    }
}

fn launch(
    session: &mut GameSession,
    color_index: u8,
    effect: Option<cascade_core::TokenEffect>,
    angle_radians: f32,
    out_events: &mut Vec<Event>,
) {
    if session.paused {
        out_events.push(Event::ProjectileRejected {
            reason: LaunchError::Paused,
        });
        return;
    }
    if session.is_terminal() {
        out_events.push(Event::ProjectileRejected {
            reason: LaunchError::NotReady,
        });
        return;
    }
    let Ok(color) = session.palette().color(color_index) else {
        out_events.push(Event::ProjectileRejected {
            reason: LaunchError::InvalidColor,
        });
        return;
    };
    let token = match effect {
        Some(effect) => Token::power(color, effect),
        None => Token::plain(color),
    };
    let angle = session.clamp_angle(angle_radians);

    match &mut session.play {
        Play::Grid(play) => {
            // One projectile at a time on the grid; the chain takes volleys.
            if play.projectile.is_some() || play.shots_remaining == Some(0) {
                out_events.push(Event::ProjectileRejected {
                    reason: LaunchError::NotReady,
                });
                return;
            }
            grid::spawn_projectile(play, token, angle);
        }
        Play::Chain(play) => chain::spawn_projectile(play, token, angle),
        Play::Slots(_) => {
            out_events.push(Event::ProjectileRejected {
                reason: LaunchError::NotReady,
            });
            return;
        }
    }

    session.staged_angle = None;
    session.phase = Phase::ProjectileInFlight;
    out_events.push(Event::ProjectileLaunched {
        token,
        angle_radians: angle,
    });
}

fn tick(session: &mut GameSession, dt: Duration, out_events: &mut Vec<Event>) {
    if session.paused || session.is_terminal() {
        return;
    }
    out_events.push(Event::TimeAdvanced { dt });
    let level = session.level;
    let result = match &mut session.play {
        Play::Grid(play) => grid::tick(play, level, dt.as_secs_f32(), out_events),
        Play::Chain(play) => chain::tick(play, level, dt, out_events),
        Play::Slots(_) => StepResult::default(),
    };
    finish(session, result, out_events);
}

fn pick_card(session: &mut GameSession, card: cascade_core::CardId, out_events: &mut Vec<Event>) {
    if session.paused {
        out_events.push(Event::PickRejected {
            card,
            reason: PickError::Paused,
        });
        return;
    }
    if session.is_terminal() {
        out_events.push(Event::PickRejected {
            card,
            reason: PickError::NotReady,
        });
        return;
    }
    let result = match &mut session.play {
        Play::Slots(play) => slots::pick(play, card, out_events),
        Play::Grid(_) | Play::Chain(_) => {
            out_events.push(Event::PickRejected {
                card,
                reason: PickError::NotReady,
            });
            return;
        }
    };
    finish(session, result, out_events);
}

fn advance_level(session: &mut GameSession, out_events: &mut Vec<Event>) {
    if session.phase != Phase::LevelComplete {
        return;
    }
    session.level += 1;
    let seed = session.config.seed.wrapping_add(u64::from(session.level));
    let lives = match &session.play {
        Play::Chain(play) => play.lives,
        Play::Grid(_) | Play::Slots(_) => session.config.lives,
    };
    session.play = Play::generate(&session.config, session.level, seed, lives);
    session.phase = Phase::Idle;
    session.staged_angle = None;
    announce(session, out_events);
}

fn finish(session: &mut GameSession, result: StepResult, out_events: &mut Vec<Event>) {
    session.score = session.score.saturating_add(result.score_delta);
    if let Some(reason) = result.game_over {
        session.phase = Phase::GameOver;
        out_events.push(Event::GameOver { reason });
    } else if let Some(bonus) = result.level_bonus {
        session.score = session.score.saturating_add(bonus);
        session.phase = Phase::LevelComplete;
        out_events.push(Event::LevelComplete {
            level: session.level,
            bonus,
        });
    } else if result.in_flight {
        session.phase = Phase::ProjectileInFlight;
    } else if result.resolved || session.phase == Phase::ProjectileInFlight {
        session.phase = Phase::Idle;
    }
}

/// Installs hand-built layouts into a session.
///
/// Custom layouts back both puzzle imports (a decoded board snapshot becomes
/// a playable session) and fixture-driven tests; they replace the generated
/// state wholesale and reset the lifecycle to idle.
pub mod layout {
    use cascade_topology_chain::Chain;
    use cascade_topology_grid::HexBoard;
    use cascade_topology_slots::Tableau;

    use super::{chain, grid, slots, GameSession, Phase, Play, TopologyKind};

    /// Replaces the session state with a grid topology holding the board.
    pub fn install_board(session: &mut GameSession, board: HexBoard) {
        session.config.topology = TopologyKind::Grid;
        session.play = Play::Grid(grid::GridPlay::from_board(board, session.config.shot_budget));
        reset(session);
    }

    /// Replaces the session state with a chain topology riding the chain.
    pub fn install_chain(session: &mut GameSession, chain: Chain) {
        session.config.topology = TopologyKind::Chain;
        session.play = Play::Chain(chain::ChainPlay::from_chain(chain, session.config.lives));
        reset(session);
    }

    /// Replaces the session state with a slots topology over the tableau.
    pub fn install_tableau(session: &mut GameSession, tableau: Tableau, move_budget: u32) {
        session.config.topology = TopologyKind::Slots;
        session.play = Play::Slots(slots::SlotsPlay::from_tableau(tableau, move_budget));
        reset(session);
    }

    fn reset(session: &mut GameSession) {
        session.phase = Phase::Idle;
        session.paused = false;
        session.staged_angle = None;
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use cascade_core::{CardId, GridPos, Phase, Token, TokenColor, TopologyKind};

    use super::{GameSession, Palette, Play};

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(session: &GameSession) -> Phase {
        session.phase
    }

    /// Reports whether the session is frozen by a pause.
    #[must_use]
    pub fn is_paused(session: &GameSession) -> bool {
        session.paused
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(session: &GameSession) -> u32 {
        session.score
    }

    /// Current one-based level.
    #[must_use]
    pub fn level(session: &GameSession) -> u32 {
        session.level
    }

    /// Topology the session drives.
    #[must_use]
    pub fn topology(session: &GameSession) -> TopologyKind {
        session.config.topology
    }

    /// Palette active for the current level.
    #[must_use]
    pub fn palette(session: &GameSession) -> Palette {
        session.palette()
    }

    /// Aim angle staged by the last [`cascade_core::Command::Aim`], if any.
    #[must_use]
    pub fn aim_angle(session: &GameSession) -> Option<f32> {
        session.staged_angle
    }

    /// Shots left on the grid topology; `None` when unlimited or not grid.
    #[must_use]
    pub fn shots_remaining(session: &GameSession) -> Option<u32> {
        match &session.play {
            Play::Grid(play) => play.shots_remaining,
            Play::Chain(_) | Play::Slots(_) => None,
        }
    }

    /// Lives left on the chain topology.
    #[must_use]
    pub fn lives(session: &GameSession) -> Option<u32> {
        match &session.play {
            Play::Chain(play) => Some(play.lives),
            Play::Grid(_) | Play::Slots(_) => None,
        }
    }

    /// Moves left on the slots topology.
    #[must_use]
    pub fn moves_remaining(session: &GameSession) -> Option<u32> {
        match &session.play {
            Play::Slots(play) => Some(play.moves_remaining),
            Play::Grid(_) | Play::Chain(_) => None,
        }
    }

    /// Colors a player could usefully launch or pick right now.
    #[must_use]
    pub fn active_colors(session: &GameSession) -> Vec<TokenColor> {
        match &session.play {
            Play::Grid(play) => play.board.active_colors(),
            Play::Chain(play) => play.chain.active_colors(),
            Play::Slots(play) => play.tableau.active_colors(),
        }
    }

    /// Captures a read-only view of the grid board, when the grid is active.
    #[must_use]
    pub fn board_view(session: &GameSession) -> Option<BoardView> {
        match &session.play {
            Play::Grid(play) => Some(BoardView {
                columns: play.board.columns(),
                rows: play.board.rows(),
                tokens: play.board.occupied().collect(),
            }),
            Play::Chain(_) | Play::Slots(_) => None,
        }
    }

    /// Captures a read-only view of the chain, when the chain is active.
    #[must_use]
    pub fn chain_view(session: &GameSession) -> Option<ChainView> {
        match &session.play {
            Play::Chain(play) => Some(ChainView {
                tokens: play
                    .chain
                    .iter()
                    .map(|entry| ChainTokenSnapshot {
                        token: entry.token(),
                        path_offset: entry.path_offset(),
                        world_position: play.path.point_at(entry.path_offset()),
                    })
                    .collect(),
            }),
            Play::Grid(_) | Play::Slots(_) => None,
        }
    }

    /// Captures a read-only view of the tableau, when slots are active.
    #[must_use]
    pub fn tableau_view(session: &GameSession) -> Option<TableauView> {
        match &session.play {
            Play::Slots(play) => Some(TableauView {
                cards: play
                    .tableau
                    .cards()
                    .map(|card| CardSnapshot {
                        id: card.id(),
                        color: (!card.is_face_down()).then(|| card.color()),
                        layer: card.layer(),
                        origin: card.origin(),
                        exposed: play.tableau.is_exposed(card.id()),
                    })
                    .collect(),
            }),
            Play::Grid(_) | Play::Chain(_) => None,
        }
    }

    /// Current rack contents, when slots are active.
    #[must_use]
    pub fn rack_view(session: &GameSession) -> Option<Vec<Option<TokenColor>>> {
        match &session.play {
            Play::Slots(play) => Some(play.rack.slots().to_vec()),
            Play::Grid(_) | Play::Chain(_) => None,
        }
    }

    /// Identifiers of every card currently exposed for picking.
    #[must_use]
    pub fn exposed_cards(session: &GameSession) -> Vec<CardId> {
        match &session.play {
            Play::Slots(play) => play.tableau.exposed(),
            Play::Grid(_) | Play::Chain(_) => Vec::new(),
        }
    }

    /// Snapshots of every projectile currently in flight.
    #[must_use]
    pub fn projectiles(session: &GameSession) -> Vec<ProjectileSnapshot> {
        let snapshot = |projectile: &super::projectile::Projectile| ProjectileSnapshot {
            token: projectile.token,
            position: (projectile.position.x, projectile.position.y),
            velocity: (projectile.velocity.x, projectile.velocity.y),
        };
        match &session.play {
            Play::Grid(play) => play.projectile.iter().map(snapshot).collect(),
            Play::Chain(play) => play.projectiles.iter().map(snapshot).collect(),
            Play::Slots(_) => Vec::new(),
        }
    }

    /// Read-only snapshot of the grid board.
    #[derive(Clone, Debug, PartialEq)]
    pub struct BoardView {
        columns: u32,
        rows: u32,
        tokens: Vec<(GridPos, Token)>,
    }

    impl BoardView {
        /// Number of columns on the board.
        #[must_use]
        pub const fn columns(&self) -> u32 {
            self.columns
        }

        /// Number of rows on the board.
        #[must_use]
        pub const fn rows(&self) -> u32 {
            self.rows
        }

        /// Occupied cells in row-major order.
        #[must_use]
        pub fn tokens(&self) -> &[(GridPos, Token)] {
            &self.tokens
        }
    }

    /// Read-only snapshot of the chain.
    #[derive(Clone, Debug, PartialEq)]
    pub struct ChainView {
        tokens: Vec<ChainTokenSnapshot>,
    }

    impl ChainView {
        /// Chain entries in path order, tail first.
        #[must_use]
        pub fn tokens(&self) -> &[ChainTokenSnapshot] {
            &self.tokens
        }
    }

    /// One chain entry with its resolved world position.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ChainTokenSnapshot {
        /// Token riding the chain.
        pub token: Token,
        /// Offset along the path, in path slots.
        pub path_offset: f32,
        /// World coordinates, when the offset lies on the path.
        pub world_position: Option<(f32, f32)>,
    }

    /// Read-only snapshot of the tableau.
    #[derive(Clone, Debug, PartialEq)]
    pub struct TableauView {
        cards: Vec<CardSnapshot>,
    }

    impl TableauView {
        /// Remaining cards in layout order.
        #[must_use]
        pub fn cards(&self) -> &[CardSnapshot] {
            &self.cards
        }
    }

    /// One tableau card as a player sees it.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct CardSnapshot {
        /// Identifier of the card.
        pub id: CardId,
        /// Color of the card; hidden while it is face down.
        pub color: Option<TokenColor>,
        /// Layer the card sits on.
        pub layer: u32,
        /// Upper-left corner of the card footprint.
        pub origin: (f32, f32),
        /// Whether the card may be picked right now.
        pub exposed: bool,
    }

    /// One projectile in flight.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Token the projectile carries.
        pub token: Token,
        /// World position of the projectile center.
        pub position: (f32, f32),
        /// Velocity in world units per second.
        pub velocity: (f32, f32),
    }
}
