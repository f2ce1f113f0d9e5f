use std::time::Duration;

use cascade_core::{
    Command, Event, GameOverReason, Palette, Phase, SessionConfig, Token, TokenEffect,
    TopologyKind,
};
use cascade_session::{apply, layout, query, GameSession};
use cascade_topology_chain::Chain;

const TICK: Duration = Duration::from_millis(50);

fn chain_session() -> GameSession {
    let mut session = GameSession::new();
    let mut events = Vec::new();
    let mut config = SessionConfig::new(TopologyKind::Chain);
    config.seed = 21;
    apply(&mut session, Command::ConfigureSession { config }, &mut events);
    session
}

fn tokens_of(colors: &[u8]) -> Vec<Token> {
    let palette = Palette::new(6);
    colors
        .iter()
        .map(|color| Token::plain(palette.color(*color).expect("color in palette")))
        .collect()
}

/// Fires a spread of launches while ticking until the predicate holds.
fn volley<F>(
    session: &mut GameSession,
    color_index: u8,
    effect: Option<TokenEffect>,
    mut stop: F,
) -> Vec<Event>
where
    F: FnMut(&[Event]) -> bool,
{
    let mut events = Vec::new();
    for round in 0..240 {
        apply(
            session,
            Command::LaunchProjectile {
                color_index,
                effect,
                angle_radians: round as f32 * 0.13,
            },
            &mut events,
        );
        apply(session, Command::Tick { dt: TICK }, &mut events);
        if stop(&events) {
            return events;
        }
    }
    panic!("volley never reached its goal; events: {events:?}");
}

#[test]
fn matching_the_whole_chain_completes_the_level() {
    let mut session = chain_session();
    layout::install_chain(&mut session, Chain::from_tokens(tokens_of(&[0, 0, 0, 0, 0])));

    let events = volley(&mut session, 0, None, |events| {
        events
            .iter()
            .any(|event| matches!(event, Event::LevelComplete { .. }))
    });

    let matched = events
        .iter()
        .find_map(|event| match event {
            Event::Matched {
                positions,
                score_delta,
            } => Some((positions.len(), *score_delta)),
            _ => None,
        })
        .expect("the insert joined an all-red chain");
    assert_eq!(matched.0, 6);
    assert_eq!(matched.1, 6 * 100);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LevelComplete { level: 1, bonus: 2000 })));
    // Six removed tokens plus the completion bonus for entering level two.
    assert_eq!(query::score(&session), 600 + 2000);
    assert_eq!(query::lives(&session), Some(3));
    assert_eq!(query::phase(&session), Phase::LevelComplete);
}

#[test]
fn tokens_escaping_the_path_end_cost_lives() {
    let mut session = chain_session();
    let mut chain = Chain::from_tokens(tokens_of(&[0, 1, 2]));
    // Park the chain just short of the path end.
    let escaped = chain.advance(533.0, 10_000.0);
    assert!(escaped.is_empty());
    layout::install_chain(&mut session, chain);

    let mut events = Vec::new();
    apply(
        &mut session,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
        &mut events,
    );

    assert!(events.contains(&Event::LifeLost {
        escaped: 3,
        remaining: 0
    }));
    assert!(events.contains(&Event::GameOver {
        reason: GameOverReason::ChainReachedEnd
    }));
    assert_eq!(query::phase(&session), Phase::GameOver);
}

#[test]
fn an_exploding_projectile_blasts_the_impact_window() {
    let mut session = chain_session();
    layout::install_chain(
        &mut session,
        Chain::from_tokens(tokens_of(&[0, 1, 2, 3, 4, 5, 0])),
    );

    let events = volley(&mut session, 0, Some(TokenEffect::Explode), |events| {
        events
            .iter()
            .any(|event| matches!(event, Event::EffectActivated { .. }))
    });

    assert!(events.contains(&Event::EffectActivated {
        effect: TokenEffect::Explode,
        score_delta: 100
    }));
    let blasted = events
        .iter()
        .find_map(|event| match event {
            Event::Collapsed {
                positions,
                score_delta,
            } => Some((positions.len(), *score_delta)),
            _ => None,
        })
        .expect("the explosion removes surrounding tokens");
    assert_eq!(blasted.0 as u32 * 10, blasted.1);

    let remaining = query::chain_view(&session).expect("chain topology active");
    assert!(remaining.tokens().len() < 7);
}

#[test]
fn power_tokens_never_join_the_chain() {
    let mut session = chain_session();
    layout::install_chain(&mut session, Chain::from_tokens(tokens_of(&[0, 1, 2, 3])));

    let events = volley(&mut session, 0, Some(TokenEffect::Slow), |events| {
        events
            .iter()
            .any(|event| matches!(event, Event::EffectActivated { .. }))
    });

    assert!(events.contains(&Event::EffectActivated {
        effect: TokenEffect::Slow,
        score_delta: 50
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::TokenCommitted { .. })));
    let remaining = query::chain_view(&session).expect("chain topology active");
    assert_eq!(remaining.tokens().len(), 4);
}
