//! Kinematics for tokens in flight.

use cascade_core::Token;
use glam::Vec2;

/// A launched token traveling through the arena, not yet committed.
///
/// The projectile owns its token until the collision handler transfers it
/// into a board or chain; discarding the projectile discards the token.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Projectile {
    pub(crate) token: Token,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
}

impl Projectile {
    pub(crate) const fn new(token: Token, position: Vec2, velocity: Vec2) -> Self {
        Self {
            token,
            position,
            velocity,
        }
    }

    /// Integrates one frame of straight-line motion.
    pub(crate) fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}
