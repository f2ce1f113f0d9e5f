#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that drives headless Cascade sessions.
//!
//! The binary configures a session from flags or a TOML file, then plays it
//! with a seeded autopilot, logging every event the session broadcasts. Grid
//! boards can be exported to and imported from single-line transfer strings.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use cascade_core::{Command, Event, Phase, SessionConfig, TopologyKind};
use cascade_session::{apply, layout, query, GameSession};
use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

mod board_transfer;
mod config;

const TICK: Duration = Duration::from_millis(50);

/// Headless driver for the Cascade match engine.
#[derive(Debug, Parser)]
#[command(name = "cascade")]
struct Cli {
    /// Topology to play.
    #[arg(long, value_enum, default_value = "grid")]
    topology: TopologyArg,

    /// One-based level to generate.
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Seed shared by level generation and the autopilot.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Shot budget for the grid topology; unlimited when omitted.
    #[arg(long)]
    shots: Option<u32>,

    /// Number of autopilot rounds to play before giving up.
    #[arg(long, default_value_t = 200)]
    budget: u32,

    /// TOML session configuration; overrides the flags above.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Prints the opening grid board as a transfer string and exits.
    #[arg(long)]
    export_layout: bool,

    /// Installs a previously exported board before playing.
    #[arg(long)]
    import_layout: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TopologyArg {
    Grid,
    Chain,
    Slots,
}

impl From<TopologyArg> for TopologyKind {
    fn from(value: TopologyArg) -> Self {
        match value {
            TopologyArg::Grid => Self::Grid,
            TopologyArg::Chain => Self::Chain,
            TopologyArg::Slots => Self::Slots,
        }
    }
}

impl Cli {
    fn session_config(&self) -> Result<SessionConfig> {
        if let Some(path) = &self.config {
            return config::load(path);
        }
        let mut config = SessionConfig::new(self.topology.into());
        config.level = self.level;
        config.seed = self.seed;
        config.shot_budget = self.shots;
        Ok(config)
    }
}

/// Entry point for the Cascade command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.session_config()?;
    let mut session = GameSession::new();
    let mut events = Vec::new();
    apply(
        &mut session,
        Command::ConfigureSession { config },
        &mut events,
    );
    drain(&mut events);

    if let Some(encoded) = &cli.import_layout {
        let snapshot =
            board_transfer::BoardSnapshot::decode(encoded).context("decoding board layout")?;
        let board = snapshot.to_board().context("rebuilding board layout")?;
        layout::install_board(&mut session, board);
        log::info!("installed imported board layout");
    }

    if cli.export_layout {
        let view =
            query::board_view(&session).context("layout export requires the grid topology")?;
        println!("{}", board_transfer::BoardSnapshot::capture(&view).encode());
        return Ok(());
    }

    autoplay(&mut session, cli.budget, cli.seed);

    println!(
        "session finished: topology {:?}, level {}, score {}, phase {:?}",
        query::topology(&session),
        query::level(&session),
        query::score(&session),
        query::phase(&session),
    );
    Ok(())
}

/// Plays rounds until the budget runs out or the session ends.
fn autoplay(session: &mut GameSession, budget: u32, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut events = Vec::new();

    for _ in 0..budget {
        match query::phase(session) {
            Phase::GameOver => break,
            Phase::LevelComplete => {
                apply(session, Command::AdvanceLevel, &mut events);
                drain(&mut events);
                continue;
            }
            _ => {}
        }

        match query::topology(session) {
            TopologyKind::Grid => {
                let color_index = pick_color(session, &mut rng);
                let angle_radians = rng.gen_range(0.25..std::f32::consts::PI - 0.25);
                apply(
                    session,
                    Command::LaunchProjectile {
                        color_index,
                        effect: None,
                        angle_radians,
                    },
                    &mut events,
                );
                for _ in 0..400 {
                    apply(session, Command::Tick { dt: TICK }, &mut events);
                    if query::phase(session) != Phase::ProjectileInFlight {
                        break;
                    }
                }
            }
            TopologyKind::Chain => {
                let color_index = pick_color(session, &mut rng);
                let angle_radians = rng.gen_range(0.0..std::f32::consts::TAU);
                apply(
                    session,
                    Command::LaunchProjectile {
                        color_index,
                        effect: None,
                        angle_radians,
                    },
                    &mut events,
                );
                for _ in 0..8 {
                    apply(session, Command::Tick { dt: TICK }, &mut events);
                }
            }
            TopologyKind::Slots => {
                let exposed = query::exposed_cards(session);
                if exposed.is_empty() {
                    break;
                }
                let card = exposed[rng.gen_range(0..exposed.len())];
                apply(session, Command::PickCard { card }, &mut events);
            }
        }
        drain(&mut events);
    }
    drain(&mut events);
}

/// Chooses a launchable color, preferring ones still in play.
fn pick_color(session: &GameSession, rng: &mut ChaCha8Rng) -> u8 {
    let colors = query::active_colors(session);
    if colors.is_empty() {
        0
    } else {
        colors[rng.gen_range(0..colors.len())].index()
    }
}

fn drain(events: &mut Vec<Event>) {
    for event in events.drain(..) {
        log::info!("{event:?}");
    }
}
