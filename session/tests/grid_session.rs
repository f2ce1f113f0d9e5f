use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use cascade_core::{
    Command, Event, GameOverReason, GridPos, LaunchError, Palette, Phase, SessionConfig, Token,
    TopologyKind,
};
use cascade_session::{apply, layout, query, GameSession};
use cascade_topology_grid::HexBoard;

const TICK: Duration = Duration::from_millis(50);

fn grid_session(shot_budget: Option<u32>) -> GameSession {
    let mut session = GameSession::new();
    let mut events = Vec::new();
    let mut config = SessionConfig::new(TopologyKind::Grid);
    config.seed = 7;
    config.shot_budget = shot_budget;
    apply(&mut session, Command::ConfigureSession { config }, &mut events);
    session
}

fn fixture_board(cells: &[(u32, u32, u8)]) -> HexBoard {
    let palette = Palette::new(6);
    let mut board = HexBoard::new(8, 12);
    for (row, column, color) in cells {
        board
            .set(
                GridPos::new(*row, *column),
                Some(Token::plain(
                    palette.color(*color).expect("fixture color in palette"),
                )),
            )
            .expect("fixture cell inside the board");
    }
    board
}

/// Launches and ticks until the projectile commits, returning the new events.
fn shoot(session: &mut GameSession, color_index: u8, angle: f32) -> Vec<Event> {
    let mut events = Vec::new();
    apply(
        session,
        Command::LaunchProjectile {
            color_index,
            effect: None,
            angle_radians: angle,
        },
        &mut events,
    );
    assert!(
        events
            .iter()
            .any(|event| matches!(event, Event::ProjectileLaunched { .. })),
        "launch should be accepted, got {events:?}"
    );
    for _ in 0..200 {
        apply(session, Command::Tick { dt: TICK }, &mut events);
        let done = events.iter().any(|event| {
            matches!(
                event,
                Event::TokenCommitted { .. } | Event::GameOver { .. }
            )
        });
        if done {
            break;
        }
    }
    events
}

#[test]
fn three_matching_commits_clear_the_board_and_complete_the_level() {
    let mut session = grid_session(None);
    layout::install_board(&mut session, HexBoard::new(8, 12));

    // Two straight-up shots stack reds near the ceiling without matching.
    let events = shoot(&mut session, 0, FRAC_PI_2);
    assert!(!events.iter().any(|event| matches!(event, Event::Matched { .. })));
    let events = shoot(&mut session, 0, FRAC_PI_2);
    assert!(!events.iter().any(|event| matches!(event, Event::Matched { .. })));

    // The third shot joins them into a qualifying group.
    let events = shoot(&mut session, 0, FRAC_PI_2);
    let matched = events
        .iter()
        .find_map(|event| match event {
            Event::Matched {
                positions,
                score_delta,
            } => Some((positions.clone(), *score_delta)),
            _ => None,
        })
        .expect("third commit forms a match");
    assert_eq!(matched.0.len(), 3);
    assert_eq!(matched.1, 3 * 10);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LevelComplete { level: 1, bonus: 100 })));
    assert_eq!(query::score(&session), 30 + 100);
    assert_eq!(query::phase(&session), Phase::LevelComplete);
}

#[test]
fn severed_clusters_fall_for_the_reduced_bonus() {
    let mut session = grid_session(None);
    // Two reds on the ceiling with a blue hanging off them.
    layout::install_board(
        &mut session,
        fixture_board(&[(0, 0, 0), (0, 1, 0), (1, 0, 1)]),
    );

    // Aim the red completion shot at the open cell beside the pair.
    let shooter = (160.0f32, 550.0f32);
    let target = (100.0f32, 20.0f32);
    let angle = (shooter.1 - target.1).atan2(target.0 - shooter.0);
    let events = shoot(&mut session, 0, angle);

    let matched = events
        .iter()
        .find_map(|event| match event {
            Event::Matched { score_delta, .. } => Some(*score_delta),
            _ => None,
        })
        .expect("completion shot forms a match");
    assert_eq!(matched, 30);

    let collapsed = events
        .iter()
        .find_map(|event| match event {
            Event::Collapsed {
                positions,
                score_delta,
            } => Some((positions.clone(), *score_delta)),
            _ => None,
        })
        .expect("unsupported blue token falls");
    assert_eq!(collapsed.0.len(), 1);
    assert_eq!(collapsed.1, 5);

    // Board emptied, so the completion bonus lands too.
    assert_eq!(query::score(&session), 30 + 5 + 100);
    assert_eq!(query::phase(&session), Phase::LevelComplete);
}

#[test]
fn spending_the_last_shot_without_clearing_ends_the_game() {
    let mut session = grid_session(Some(1));
    layout::install_board(&mut session, fixture_board(&[(0, 0, 1)]));

    let events = shoot(&mut session, 0, FRAC_PI_2);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::GameOver {
            reason: GameOverReason::ShotsExhausted
        }
    )));
    assert_eq!(query::shots_remaining(&session), Some(0));

    // Terminal sessions refuse further launches.
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
    assert_eq!(
        events,
        vec![Event::ProjectileRejected {
            reason: LaunchError::NotReady
        }]
    );
}

#[test]
fn a_token_on_the_bottom_row_ends_the_game() {
    let mut session = grid_session(None);
    layout::install_board(
        &mut session,
        fixture_board(&[(0, 0, 1), (11, 0, 1)]),
    );

    let events = shoot(&mut session, 0, FRAC_PI_2);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::GameOver {
            reason: GameOverReason::BottomRowReached
        }
    )));
    assert_eq!(query::phase(&session), Phase::GameOver);
}

#[test]
fn a_saturated_board_ends_the_game_with_board_full() {
    let mut session = grid_session(None);
    let mut board = HexBoard::new(8, 12);
    let palette = Palette::new(6);
    for position in board.positions().collect::<Vec<_>>() {
        board
            .set(
                position,
                Some(Token::plain(
                    // Alternate colors so the landing never matches.
                    palette
                        .color((position.row() % 2) as u8)
                        .expect("color in palette"),
                )),
            )
            .expect("cell inside the board");
    }
    layout::install_board(&mut session, board);

    let events = shoot(&mut session, 2, FRAC_PI_2);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::GameOver {
            reason: GameOverReason::BoardFull
        }
    )));
}

#[test]
fn colors_outside_the_palette_are_rejected_at_launch() {
    let mut session = grid_session(None);
    let mut events = Vec::new();
    apply(
        &mut session,
        Command::LaunchProjectile {
            color_index: 200,
            effect: None,
            angle_radians: FRAC_PI_2,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::ProjectileRejected {
            reason: LaunchError::InvalidColor
        }]
    );
}

#[test]
fn only_one_grid_projectile_flies_at_a_time() {
    let mut session = grid_session(None);
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
    apply(
        &mut session,
        Command::LaunchProjectile {
            color_index: 0,
            effect: None,
            angle_radians: FRAC_PI_2,
        },
        &mut events,
    );
    assert!(events.contains(&Event::ProjectileRejected {
        reason: LaunchError::NotReady
    }));
    assert_eq!(query::projectiles(&session).len(), 1);
}
