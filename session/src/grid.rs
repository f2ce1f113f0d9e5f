//! Grid-variant play state: shooter, projectile flight and board resolution.

use cascade_core::{Event, GameOverReason, Palette, Position, Token, MATCH_THRESHOLD};
use cascade_topology_grid::{GridLevel, HexBoard, TOKEN_RADIUS};
use glam::Vec2;

use crate::projectile::Projectile;
use crate::StepResult;

/// Points per token removed by a direct match, scaled by level.
pub(crate) const MATCH_POINTS: u32 = 10;

/// Points per token dropped by the support sweep, scaled by level.
pub(crate) const FLOATING_POINTS: u32 = 5;

/// Completion bonus, scaled by level.
pub(crate) const LEVEL_BONUS: u32 = 100;

/// Projectile speed in world units per second.
pub(crate) const PROJECTILE_SPEED: f32 = 480.0;

/// Vertical position of the shooter mouth.
pub(crate) const SHOOTER_Y: f32 = 550.0;

/// Launch angles are kept this far away from the horizontal, in radians.
const AIM_MARGIN: f32 = 0.2;

pub(crate) struct GridPlay {
    pub(crate) board: HexBoard,
    pub(crate) projectile: Option<Projectile>,
    pub(crate) shots_remaining: Option<u32>,
}

impl GridPlay {
    pub(crate) fn generate(level: u32, seed: u64, shot_budget: Option<u32>) -> Self {
        Self::from_board(cascade_topology_grid::generate(level, seed), shot_budget)
    }

    pub(crate) fn from_board(board: HexBoard, shot_budget: Option<u32>) -> Self {
        Self {
            board,
            projectile: None,
            shots_remaining: shot_budget,
        }
    }

    pub(crate) fn palette(level: u32) -> Palette {
        GridLevel::for_level(level).palette
    }

    pub(crate) fn arena_width(&self) -> f32 {
        self.board.columns() as f32 * TOKEN_RADIUS * 2.0
    }

    pub(crate) fn shooter(&self) -> Vec2 {
        Vec2::new(self.arena_width() / 2.0, SHOOTER_Y)
    }
}

/// Clamps a launch angle into the upward-facing arc.
pub(crate) fn clamp_angle(angle: f32) -> f32 {
    angle.clamp(AIM_MARGIN, std::f32::consts::PI - AIM_MARGIN)
}

/// Spends a shot and puts a projectile into the arena.
pub(crate) fn spawn_projectile(play: &mut GridPlay, token: Token, angle: f32) {
    let velocity = Vec2::new(angle.cos(), -angle.sin()) * PROJECTILE_SPEED;
    play.projectile = Some(Projectile::new(token, play.shooter(), velocity));
    if let Some(shots) = play.shots_remaining.as_mut() {
        *shots = shots.saturating_sub(1);
    }
}

/// Advances the projectile and resolves a commit when it lands.
pub(crate) fn tick(play: &mut GridPlay, level: u32, dt: f32, out: &mut Vec<Event>) -> StepResult {
    let mut result = StepResult::default();
    let Some(mut projectile) = play.projectile.take() else {
        return result;
    };
    projectile.advance(dt);

    let width = play.arena_width();
    if projectile.position.x - TOKEN_RADIUS <= 0.0 || projectile.position.x + TOKEN_RADIUS >= width
    {
        projectile.velocity.x = -projectile.velocity.x;
        projectile.position.x = projectile
            .position
            .x
            .clamp(TOKEN_RADIUS, width - TOKEN_RADIUS);
    }

    let reached_ceiling = projectile.position.y <= TOKEN_RADIUS;
    let contact =
        play.board
            .contacts_token(projectile.position.x, projectile.position.y, TOKEN_RADIUS);
    if !reached_ceiling && !contact {
        play.projectile = Some(projectile);
        result.in_flight = true;
        return result;
    }

    let Ok(position) = play.board.place(
        projectile.position.x,
        projectile.position.y,
        TOKEN_RADIUS,
        projectile.token,
    ) else {
        result.game_over = Some(GameOverReason::BoardFull);
        return result;
    };

    out.push(Event::TokenCommitted {
        token: projectile.token,
        position: Position::Grid(position),
    });

    let region = play.board.find_match(position);
    if region.len() >= MATCH_THRESHOLD {
        let _ = play.board.remove_all(&region);
        let score_delta = region.len() as u32 * MATCH_POINTS * level;
        result.score_delta += score_delta;
        out.push(Event::Matched {
            positions: region.iter().copied().map(Position::Grid).collect(),
            score_delta,
        });

        let floating = play.board.collapse();
        if !floating.is_empty() {
            let score_delta = floating.len() as u32 * FLOATING_POINTS * level;
            result.score_delta += score_delta;
            out.push(Event::Collapsed {
                positions: floating.into_iter().map(Position::Grid).collect(),
                score_delta,
            });
        }
    }

    result.resolved = true;
    if play.board.is_empty() {
        result.level_bonus = Some(LEVEL_BONUS * level);
    } else if play.board.bottom_row_occupied() {
        result.game_over = Some(GameOverReason::BottomRowReached);
    } else if play.shots_remaining == Some(0) {
        result.game_over = Some(GameOverReason::ShotsExhausted);
    }
    result
}
