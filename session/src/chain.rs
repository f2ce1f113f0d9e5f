//! Chain-variant play state: creeping chain, volleys and effect dispatch.

use std::time::Duration;

use cascade_core::{Event, GameOverReason, Palette, Position, Token, TokenEffect, MATCH_THRESHOLD};
use cascade_topology_chain::{
    impact_index, Chain, ChainLevel, SpiralPath, BALL_RADIUS, EXPLOSION_RADIUS, PUSH_BACK_SLOTS,
};
use glam::Vec2;

use crate::projectile::Projectile;
use crate::StepResult;

/// Points per token removed from the chain, scaled by level.
pub(crate) const MATCH_POINTS: u32 = 100;

/// Completion bonus, scaled by the level being entered.
pub(crate) const LEVEL_BONUS: u32 = 1000;

/// Points per token destroyed by an explosion.
const EXPLOSION_POINTS: u32 = 10;

/// Launch speed in world units per second before any boost.
pub(crate) const LAUNCH_SPEED: f32 = 480.0;

/// Chain creep in path slots per second.
pub(crate) const BASE_SPEED: f32 = 30.0;

const SLOW_FACTOR: f32 = 0.3;
const BOOST_FACTOR: f32 = 2.0;
const SLOW_DURATION: Duration = Duration::from_secs(5);
const BOOST_DURATION: Duration = Duration::from_secs(10);

/// Arena the spiral path is generated for.
pub(crate) const ARENA_WIDTH: f32 = 800.0;
pub(crate) const ARENA_HEIGHT: f32 = 600.0;

pub(crate) struct ChainPlay {
    pub(crate) chain: Chain,
    pub(crate) path: SpiralPath,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) lives: u32,
    pub(crate) slow_remaining: Duration,
    pub(crate) boost_remaining: Duration,
}

impl ChainPlay {
    pub(crate) fn generate(level: u32, seed: u64, lives: u32) -> Self {
        Self::from_chain(cascade_topology_chain::generate(level, seed), lives)
    }

    pub(crate) fn from_chain(chain: Chain, lives: u32) -> Self {
        Self {
            chain,
            path: SpiralPath::new(ARENA_WIDTH, ARENA_HEIGHT),
            projectiles: Vec::new(),
            lives,
            slow_remaining: Duration::ZERO,
            boost_remaining: Duration::ZERO,
        }
    }

    pub(crate) fn palette(level: u32) -> Palette {
        ChainLevel::for_level(level).palette
    }

    pub(crate) fn shooter() -> Vec2 {
        Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0)
    }

    fn launch_speed(&self) -> f32 {
        if self.boost_remaining > Duration::ZERO {
            LAUNCH_SPEED * BOOST_FACTOR
        } else {
            LAUNCH_SPEED
        }
    }
}

/// Puts a projectile into the arena; the chain accepts whole volleys.
pub(crate) fn spawn_projectile(play: &mut ChainPlay, token: Token, angle: f32) {
    let velocity = Vec2::new(angle.cos(), angle.sin()) * play.launch_speed();
    play.projectiles
        .push(Projectile::new(token, ChainPlay::shooter(), velocity));
}

/// Creeps the chain forward, flies the volley and resolves any impacts.
pub(crate) fn tick(
    play: &mut ChainPlay,
    level: u32,
    dt: Duration,
    out: &mut Vec<Event>,
) -> StepResult {
    let mut result = StepResult::default();
    let dt_secs = dt.as_secs_f32();

    play.slow_remaining = play.slow_remaining.saturating_sub(dt);
    play.boost_remaining = play.boost_remaining.saturating_sub(dt);
    let speed_factor = if play.slow_remaining > Duration::ZERO {
        SLOW_FACTOR
    } else {
        1.0
    };

    let escaped = play
        .chain
        .advance(BASE_SPEED * speed_factor * dt_secs, play.path.end());
    if !escaped.is_empty() {
        play.lives = play.lives.saturating_sub(escaped.len() as u32);
        out.push(Event::LifeLost {
            escaped: escaped.len(),
            remaining: play.lives,
        });
        if play.lives == 0 {
            result.game_over = Some(GameOverReason::ChainReachedEnd);
            return result;
        }
    }

    for projectile in &mut play.projectiles {
        projectile.advance(dt_secs);
    }
    play.projectiles.retain(|projectile| {
        let position = projectile.position;
        position.x >= -BALL_RADIUS
            && position.x <= ARENA_WIDTH + BALL_RADIUS
            && position.y >= -BALL_RADIUS
            && position.y <= ARENA_HEIGHT + BALL_RADIUS
    });

    let mut index = 0;
    while index < play.projectiles.len() {
        let projectile = play.projectiles[index];
        match impact_index(
            &play.chain,
            &play.path,
            projectile.position.x,
            projectile.position.y,
            BALL_RADIUS,
        ) {
            None => index += 1,
            Some(hit) => {
                let _ = play.projectiles.remove(index);
                resolve_impact(play, level, projectile.token, hit, &mut result, out);
                if result.game_over.is_some() || result.level_bonus.is_some() {
                    break;
                }
            }
        }
    }

    result.in_flight = !play.projectiles.is_empty();
    result
}

fn resolve_impact(
    play: &mut ChainPlay,
    level: u32,
    token: Token,
    hit: usize,
    result: &mut StepResult,
    out: &mut Vec<Event>,
) {
    if let Some(effect) = token.effect() {
        apply_effect(play, effect, hit, result, out);
    } else {
        let Ok(index) = play.chain.insert(token, hit) else {
            return;
        };
        out.push(Event::TokenCommitted {
            token,
            position: Position::Chain(index),
        });

        let run = play.chain.find_run(index);
        if run.len() >= MATCH_THRESHOLD {
            let Ok((removed, mut junction)) = play.chain.remove_run(run.clone()) else {
                return;
            };
            let score_delta = removed.len() as u32 * MATCH_POINTS * level;
            result.score_delta += score_delta;
            out.push(Event::Matched {
                positions: run.map(Position::Chain).collect(),
                score_delta,
            });

            // Gap closure may expose fresh runs at the junction; drain them.
            while let Some(seed) = junction {
                let next = play.chain.find_run(seed);
                if next.len() < MATCH_THRESHOLD {
                    break;
                }
                let Ok((removed, next_junction)) = play.chain.remove_run(next.clone()) else {
                    break;
                };
                let score_delta = removed.len() as u32 * MATCH_POINTS * level;
                result.score_delta += score_delta;
                out.push(Event::Collapsed {
                    positions: next.map(Position::Chain).collect(),
                    score_delta,
                });
                junction = next_junction;
            }
        }
        result.resolved = true;
    }

    if play.chain.is_empty() {
        result.level_bonus = Some(LEVEL_BONUS * (level + 1));
    }
}

fn apply_effect(
    play: &mut ChainPlay,
    effect: TokenEffect,
    hit: usize,
    result: &mut StepResult,
    out: &mut Vec<Event>,
) {
    let bonus = effect.activation_bonus();
    result.score_delta += bonus;
    out.push(Event::EffectActivated {
        effect,
        score_delta: bonus,
    });

    match effect {
        TokenEffect::Slow => play.slow_remaining = SLOW_DURATION,
        TokenEffect::SpeedBoost => play.boost_remaining = BOOST_DURATION,
        TokenEffect::Reverse => play.chain.push_back(PUSH_BACK_SLOTS),
        TokenEffect::Explode => {
            let start = hit.saturating_sub(EXPLOSION_RADIUS);
            if let Ok(removed) = play.chain.explode(hit) {
                if !removed.is_empty() {
                    let score_delta = removed.len() as u32 * EXPLOSION_POINTS;
                    result.score_delta += score_delta;
                    out.push(Event::Collapsed {
                        positions: (start..start + removed.len()).map(Position::Chain).collect(),
                        score_delta,
                    });
                }
            }
        }
    }
    result.resolved = true;
}
