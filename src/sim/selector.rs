//! Weighted random effect selection
//!
//! One uniform draw per brick. Half of the outcome range is the plain
//! no-op bucket, every other effect owns a single slot. The double effect
//! owns the last slot, which drops out of the range once the per-grid cap
//! has been reached.

use rand::Rng;

use super::counter::Counter;
use super::effect::Effect;

/// Outcome range while the double effect is still drawable
pub const OUTCOMES: u32 = 10;
/// Rolls below this land in the no-op bucket
pub const NO_OP_BUCKET: u32 = 5;

/// Effect factory enforcing the double-effect cap
#[derive(Debug, Clone, Copy)]
pub struct EffectSelector {
    cap: u32,
}

impl EffectSelector {
    pub fn new(cap: u32) -> Self {
        Self { cap }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Draw one effect, counting double effect picks in `double_count`
    pub fn select<R: Rng + ?Sized>(&self, double_count: &mut Counter, rng: &mut R) -> Effect {
        self.draw(double_count, rng, true)
    }

    /// Draw one effect with an extra gate on the double effect
    ///
    /// Nested draws inside a double effect pass `allow_double = false` once
    /// their depth reaches the cap.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        double_count: &mut Counter,
        rng: &mut R,
        allow_double: bool,
    ) -> Effect {
        let double_open = allow_double && double_count.value() < self.cap;
        let range = if double_open { OUTCOMES } else { OUTCOMES - 1 };

        let effect = effect_for_roll(rng.random_range(0..range));
        if effect == Effect::Double {
            double_count.increment();
        }
        effect
    }
}

/// Map a roll in `0..OUTCOMES` to its effect
pub fn effect_for_roll(roll: u32) -> Effect {
    match roll {
        r if r < NO_OP_BUCKET => Effect::None,
        5 => Effect::ExtraBall,
        6 => Effect::ExtraLife,
        7 => Effect::TemporaryPaddle,
        8 => Effect::Turbo,
        _ => Effect::Double,
    }
}
