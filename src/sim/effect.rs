//! Brick effects
//!
//! Every brick carries one `Effect`, assigned when the grid is built. When the
//! brick is destroyed its effect resolves into a list of `Mutation`s that the
//! game state applies in order. Effects never touch the world directly, so
//! the guards (max lives, single temporary paddle, turbo already on) live in
//! one place: the mutators on `GameState`.

use std::f64::consts::PI;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::counter::Counter;
use super::selector::EffectSelector;

/// Secondary balls released by one extra-ball effect
pub const PUCKS_PER_EFFECT: usize = 2;
/// Effects applied by one double effect
pub const DOUBLE_FAN_OUT: usize = 2;

/// What happens when a brick is destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Effect {
    /// Plain destruction
    #[default]
    None,
    /// Drop a heart that grants a life when caught
    ExtraLife,
    /// Release two secondary balls
    ExtraBall,
    /// Spawn a temporary paddle in the middle of the field
    TemporaryPaddle,
    /// Speed up the primary ball
    Turbo,
    /// Draw and apply two more effects
    Double,
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::None => "none",
            Effect::ExtraLife => "extra-life",
            Effect::ExtraBall => "extra-ball",
            Effect::TemporaryPaddle => "temporary-paddle",
            Effect::Turbo => "turbo",
            Effect::Double => "double",
        }
    }

    /// Resolve this effect at an impact point
    pub fn resolve(self, at: Vec2, ctx: &mut EffectContext<'_>) -> Vec<Mutation> {
        let mut out = Vec::new();
        self.resolve_into(at, ctx, 0, &mut out);
        out
    }

    fn resolve_into(self, at: Vec2, ctx: &mut EffectContext<'_>, depth: u32, out: &mut Vec<Mutation>) {
        ctx.fired.push(self);
        match self {
            Effect::None => {}
            Effect::ExtraLife => out.push(Mutation::SpawnFallingHeart { at }),
            Effect::ExtraBall => {
                for _ in 0..PUCKS_PER_EFFECT {
                    let vel = scatter_velocity(&mut *ctx.rng, ctx.puck_speed);
                    out.push(Mutation::SpawnSecondaryBall { at, vel });
                }
            }
            Effect::TemporaryPaddle => out.push(Mutation::SpawnTemporaryPaddle),
            Effect::Turbo => out.push(Mutation::EngageTurbo {
                factor: ctx.turbo_factor,
            }),
            Effect::Double => {
                // Nesting depth never exceeds the per-grid cap, whatever the counter says
                let allow_double = depth + 1 < ctx.selector.cap();
                for _ in 0..DOUBLE_FAN_OUT {
                    let inner = ctx
                        .selector
                        .draw(&mut *ctx.double_count, &mut *ctx.rng, allow_double);
                    inner.resolve_into(at, ctx, depth + 1, out);
                }
            }
        }
    }
}

/// A single change an effect asks the game state to make
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    /// Drop a heart from `at` (no-op at max lives)
    SpawnFallingHeart { at: Vec2 },
    /// Release a secondary ball centered on `at`
    SpawnSecondaryBall { at: Vec2, vel: Vec2 },
    /// Spawn the temporary paddle (no-op while one exists)
    SpawnTemporaryPaddle,
    /// Multiply primary ball velocity (no-op while turbo is on)
    EngageTurbo { factor: f32 },
}

/// Round state an effect may read or advance while resolving
pub struct EffectContext<'a> {
    pub rng: &'a mut Pcg32,
    pub selector: EffectSelector,
    pub double_count: &'a mut Counter,
    /// Speed of released secondary balls
    pub puck_speed: f32,
    pub turbo_factor: f32,
    /// Every effect resolved, nested ones included, in order
    pub fired: Vec<Effect>,
}

/// Random secondary ball velocity with a fixed speed
///
/// Angle is drawn in [0, π), then each axis sign is flipped by its own coin.
pub fn scatter_velocity<R: Rng + ?Sized>(rng: &mut R, speed: f32) -> Vec2 {
    let angle = rng.random::<f64>() * PI;
    let mut vx = angle.cos() as f32 * speed;
    let mut vy = angle.sin() as f32 * speed;
    if rng.random_bool(0.5) {
        vx = -vx;
    }
    if rng.random_bool(0.5) {
        vy = -vy;
    }
    Vec2::new(vx, vy)
}
