use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use cascade_core::{
    CardId, Command, Event, LaunchError, Palette, Phase, SessionConfig, TopologyKind,
};
use cascade_session::{apply, layout, query, GameSession};
use cascade_topology_grid::HexBoard;
use cascade_topology_slots::{Tableau, TableauCard};

const TICK: Duration = Duration::from_millis(50);

fn configured(topology: TopologyKind, seed: u64) -> (GameSession, Vec<Event>) {
    let mut session = GameSession::new();
    let mut events = Vec::new();
    let mut config = SessionConfig::new(topology);
    config.seed = seed;
    apply(&mut session, Command::ConfigureSession { config }, &mut events);
    (session, events)
}

#[test]
fn configuration_announces_topology_level_and_palette() {
    let (session, events) = configured(TopologyKind::Grid, 3);
    assert_eq!(
        events.first(),
        Some(&Event::SessionConfigured {
            topology: TopologyKind::Grid,
            level: 1,
            palette: Palette::new(3),
        })
    );
    assert_eq!(query::phase(&session), Phase::Idle);
    assert_eq!(query::score(&session), 0);
}

#[test]
fn level_zero_configurations_are_lifted_to_level_one() {
    let mut session = GameSession::new();
    let mut events = Vec::new();
    let mut config = SessionConfig::new(TopologyKind::Chain);
    config.level = 0;
    apply(&mut session, Command::ConfigureSession { config }, &mut events);
    assert_eq!(query::level(&session), 1);
}

#[test]
fn aiming_stages_a_clamped_angle() {
    let (mut session, _) = configured(TopologyKind::Grid, 3);
    let mut events = Vec::new();
    apply(
        &mut session,
        Command::Aim { angle_radians: 0.0 },
        &mut events,
    );
    assert!(events.is_empty());
    assert_eq!(query::phase(&session), Phase::Aiming);
    assert_eq!(query::aim_angle(&session), Some(0.2));
}

#[test]
fn pausing_freezes_projectiles_and_timers_exactly() {
    let (mut session, _) = configured(TopologyKind::Grid, 3);
    layout::install_board(&mut session, HexBoard::new(8, 12));
    let mut events = Vec::new();
    apply(
        &mut session,
        Command::LaunchProjectile {
            color_index: 0,
            effect: None,
            angle_radians: FRAC_PI_2,
        },
        &mut events,
    );
    apply(&mut session, Command::Tick { dt: TICK }, &mut events);
    let in_flight = query::projectiles(&session);
    assert_eq!(in_flight.len(), 1);

    events.clear();
    apply(&mut session, Command::Pause, &mut events);
    assert_eq!(events, vec![Event::Paused]);
    assert!(query::is_paused(&session));

    // Frozen ticks advance nothing and emit nothing.
    events.clear();
    for _ in 0..10 {
        apply(&mut session, Command::Tick { dt: TICK }, &mut events);
    }
    assert!(events.is_empty());
    assert_eq!(query::projectiles(&session), in_flight);

    // Launching while frozen is rejected outright.
    apply(
        &mut session,
        Command::LaunchProjectile {
            color_index: 0,
            effect: None,
            angle_radians: FRAC_PI_2,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::ProjectileRejected {
            reason: LaunchError::Paused
        }]
    );

    // Resuming picks up with the same projectile state.
    events.clear();
    apply(&mut session, Command::Resume, &mut events);
    apply(&mut session, Command::Tick { dt: TICK }, &mut events);
    assert!(events.contains(&Event::Resumed));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TimeAdvanced { .. })));
    assert_ne!(query::projectiles(&session), in_flight);
}

#[test]
fn advancing_past_a_completed_level_regenerates_the_next_one() {
    let (mut session, _) = configured(TopologyKind::Slots, 13);
    let palette = Palette::new(8);
    let cards: Vec<TableauCard> = (0..3)
        .map(|id| {
            TableauCard::new(
                CardId::new(id),
                palette.color(4).expect("color"),
                0,
                id as f32 * 100.0,
                40.0,
                false,
            )
        })
        .collect();
    layout::install_tableau(&mut session, Tableau::from_cards(cards), 10);

    let mut events = Vec::new();
    for id in 0..3 {
        apply(
            &mut session,
            Command::PickCard {
                card: CardId::new(id),
            },
            &mut events,
        );
    }
    assert_eq!(query::phase(&session), Phase::LevelComplete);
    let score_after_clear = query::score(&session);

    events.clear();
    apply(&mut session, Command::AdvanceLevel, &mut events);
    assert_eq!(
        events.first(),
        Some(&Event::SessionConfigured {
            topology: TopologyKind::Slots,
            level: 2,
            palette: Palette::new(8),
        })
    );
    assert_eq!(query::phase(&session), Phase::Idle);
    assert_eq!(query::level(&session), 2);
    // Score carries across levels.
    assert_eq!(query::score(&session), score_after_clear);
    assert!(query::tableau_view(&session)
        .expect("slots topology active")
        .cards()
        .len()
        > 0);
}

#[test]
fn advancing_mid_level_is_ignored() {
    let (mut session, _) = configured(TopologyKind::Grid, 3);
    let mut events = Vec::new();
    apply(&mut session, Command::AdvanceLevel, &mut events);
    assert!(events.is_empty());
    assert_eq!(query::level(&session), 1);
}

#[test]
fn identical_configurations_replay_identically() {
    let script = |session: &mut GameSession| {
        let mut events = Vec::new();
        for round in 0..40 {
            apply(
                session,
                Command::LaunchProjectile {
                    color_index: (round % 6) as u8,
                    effect: None,
                    angle_radians: round as f32 * 0.17,
                },
                &mut events,
            );
            apply(session, Command::Tick { dt: TICK }, &mut events);
        }
        events
    };

    let (mut first, _) = configured(TopologyKind::Chain, 42);
    let (mut second, _) = configured(TopologyKind::Chain, 42);
    assert_eq!(script(&mut first), script(&mut second));
    assert_eq!(query::score(&first), query::score(&second));
}
