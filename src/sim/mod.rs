//! Deterministic simulation module
//!
//! All round logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies beyond the `Prompt` trait

pub mod collision;
pub mod counter;
pub mod effect;
pub mod selector;
pub mod state;
pub mod tick;

pub use collision::{Aabb, CollisionResult, box_collision, reflect_velocity};
pub use counter::Counter;
pub use effect::{Effect, EffectContext, Mutation};
pub use selector::EffectSelector;
pub use state::{
    Ball, BallKind, BallLook, Brick, EffectTally, GameState, Heart, Paddle, PaddleTag,
    RoundPhase, RoundSummary, Snapshot, TemporaryPaddle,
};
pub use tick::{Impact, TickInput, tick};
