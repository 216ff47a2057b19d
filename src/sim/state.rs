//! Round state and entity types
//!
//! `GameState` owns everything a round needs: lives, the brick grid, the
//! balls, hearts and paddles, the shared counters, and the seeded RNG. Brick
//! effects reach the world only through its mutators, which is where the
//! single-instance and max-lives guards are enforced.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::counter::Counter;
use super::effect::{Effect, EffectContext, Mutation};
use super::selector::EffectSelector;
use crate::consts::*;
use crate::hud::LifeCounter;
use crate::platform::Prompt;
use crate::settings::Settings;
use crate::{box_center, box_top_left};

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Active gameplay
    Playing,
    /// Every brick destroyed (or the debug win key)
    Won,
    /// Out of lives
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallKind {
    /// The one ball that costs a life when it falls
    Primary,
    /// Extra "puck" ball, discarded when it leaves the field
    Secondary,
}

/// Which sprite the renderer should use for a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallLook {
    Normal,
    Turbo,
    Puck,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub kind: BallKind,
    /// Center position
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub look: BallLook,
    /// Impacts counted since turbo was engaged
    pub turbo_hits: u32,
}

impl Ball {
    pub fn primary(id: u32, center: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            kind: BallKind::Primary,
            pos: center,
            size: Vec2::splat(BALL_SIZE),
            vel,
            look: BallLook::Normal,
            turbo_hits: 0,
        }
    }

    pub fn secondary(id: u32, center: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            kind: BallKind::Secondary,
            pos: center,
            size: Vec2::splat(BALL_SIZE * PUCK_SIZE_RATIO),
            vel,
            look: BallLook::Puck,
            turbo_hits: 0,
        }
    }

    #[inline]
    pub fn is_primary(&self) -> bool {
        self.kind == BallKind::Primary
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }
}

/// A brick entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Fired once, when the brick is destroyed
    pub effect: Effect,
}

impl Brick {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_top_left(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        box_center(self.pos, self.size)
    }
}

/// Collision tag for paddles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaddleTag {
    Main,
    Temporary,
}

/// A player paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub tag: PaddleTag,
}

impl Paddle {
    pub fn centered(center: Vec2, tag: PaddleTag) -> Self {
        let size = Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT);
        Self {
            pos: box_top_left(center, size),
            size,
            tag,
        }
    }

    /// The player's paddle, near the bottom of the field
    pub fn main(field: Vec2) -> Self {
        Self::centered(
            Vec2::new(field.x / 2.0, field.y - PADDLE_GAP_FROM_BOTTOM),
            PaddleTag::Main,
        )
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_top_left(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        box_center(self.pos, self.size)
    }

    /// Move horizontally from arrow-key input, staying inside the window
    pub fn steer(&mut self, left: bool, right: bool, dt: f32, field_width: f32) {
        let mut dir = 0.0;
        if left && self.pos.x > 0.0 {
            dir -= 1.0;
        }
        if right && self.pos.x + self.size.x < field_width {
            dir += 1.0;
        }
        self.pos.x = (self.pos.x + dir * PADDLE_SPEED * dt).clamp(0.0, field_width - self.size.x);
    }
}

/// Extra paddle that disappears after a few hits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporaryPaddle {
    pub id: u32,
    pub paddle: Paddle,
    pub hits_remaining: u32,
}

impl TemporaryPaddle {
    pub fn new(id: u32, center: Vec2, hits: u32) -> Self {
        Self {
            id,
            paddle: Paddle::centered(center, PaddleTag::Temporary),
            hits_remaining: hits,
        }
    }

    /// Absorb one hit, returns true once worn out
    pub fn absorb_hit(&mut self) -> bool {
        self.hits_remaining = self.hits_remaining.saturating_sub(1);
        self.hits_remaining == 0
    }
}

/// A heart: either a HUD life indicator or a falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heart {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
}

impl Heart {
    /// Static life indicator for the given life slot (0-based)
    pub fn indicator(id: u32, slot: u8, field_height: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(
                HEART_BORDER_OFFSET + slot as f32 * (HEART_SIZE + HEART_GAP),
                field_height - HEART_SIZE,
            ),
            size: Vec2::splat(HEART_SIZE),
            vel: Vec2::ZERO,
        }
    }

    /// Pickup dropping from an impact point
    pub fn falling(id: u32, center: Vec2) -> Self {
        let size = Vec2::splat(HEART_SIZE);
        Self {
            id,
            pos: box_top_left(center, size),
            size,
            vel: Vec2::new(0.0, HEART_FALL_SPEED),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_top_left(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        box_center(self.pos, self.size)
    }

    /// Hearts are only caught by the main paddle
    pub fn should_collide_with(tag: PaddleTag) -> bool {
        tag == PaddleTag::Main
    }
}

/// How many times each effect fired this round (nested ones included)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectTally {
    pub none: u32,
    pub extra_life: u32,
    pub extra_ball: u32,
    pub temporary_paddle: u32,
    pub turbo: u32,
    pub double: u32,
}

impl EffectTally {
    pub fn record(&mut self, effect: Effect) {
        let slot = match effect {
            Effect::None => &mut self.none,
            Effect::ExtraLife => &mut self.extra_life,
            Effect::ExtraBall => &mut self.extra_ball,
            Effect::TemporaryPaddle => &mut self.temporary_paddle,
            Effect::Turbo => &mut self.turbo,
            Effect::Double => &mut self.double,
        };
        *slot += 1;
    }
}

/// One-line outcome of a round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u32,
    pub seed: u64,
    pub phase: RoundPhase,
    pub lives: u8,
    pub bricks_remaining: usize,
    pub frames: u64,
    pub effects: EffectTally,
}

/// Borrowed view of the live round for debugging dumps
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub round: u32,
    pub phase: RoundPhase,
    pub lives: u8,
    pub bricks_remaining: usize,
    pub turbo: bool,
    pub double_effect_count: u32,
    pub temporary_paddle_guard: u32,
    pub ball: &'a Ball,
    pub paddle: &'a Paddle,
    pub temporary_paddle: Option<&'a TemporaryPaddle>,
    pub secondary_balls: &'a [Ball],
    pub falling_hearts: &'a [Heart],
    pub life_counter: &'a LifeCounter,
    pub bricks: &'a [Brick],
}

/// Complete round state (deterministic for a given seed)
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    /// Run seed for reproducibility
    pub seed: u64,
    /// 1-based round number, bumped on every "play again"
    pub round: u32,
    pub phase: RoundPhase,
    pub lives: u8,
    pub bricks_remaining: usize,
    pub turbo: bool,
    /// Double effect picks since the last grid build
    pub double_effect_count: Counter,
    /// Non-zero while a temporary paddle exists
    pub temporary_paddle_guard: Counter,
    pub ball: Ball,
    pub paddle: Paddle,
    pub temporary_paddle: Option<TemporaryPaddle>,
    /// Live bricks (sorted by id)
    pub bricks: Vec<Brick>,
    pub secondary_balls: Vec<Ball>,
    pub falling_hearts: Vec<Heart>,
    /// HUD hearts, one per remaining life
    pub life_hearts: Vec<Heart>,
    pub life_counter: LifeCounter,
    pub tally: EffectTally,
    /// Simulation tick counter for the current round
    pub time_ticks: u64,
    selector: EffectSelector,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a new game and build its first round
    pub fn new(settings: Settings, seed: u64) -> Self {
        let field = Vec2::new(settings.window_width, settings.window_height);
        let mut state = Self {
            selector: EffectSelector::new(settings.double_effect_cap),
            lives: settings.start_lives,
            life_counter: LifeCounter::new(settings.start_lives),
            paddle: Paddle::main(field),
            settings,
            seed,
            round: 1,
            phase: RoundPhase::Playing,
            bricks_remaining: 0,
            turbo: false,
            double_effect_count: Counter::default(),
            temporary_paddle_guard: Counter::default(),
            ball: Ball::primary(0, field / 2.0, Vec2::ZERO),
            temporary_paddle: None,
            bricks: Vec::new(),
            secondary_balls: Vec::new(),
            falling_hearts: Vec::new(),
            life_hearts: Vec::new(),
            tally: EffectTally::default(),
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };

        state.reset_round();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn field_size(&self) -> Vec2 {
        Vec2::new(self.settings.window_width, self.settings.window_height)
    }

    pub fn field_center(&self) -> Vec2 {
        self.field_size() / 2.0
    }

    /// Reset every piece of round state and rebuild the field
    pub fn reset_round(&mut self) {
        self.phase = RoundPhase::Playing;
        self.lives = self.settings.start_lives;
        self.turbo = false;
        self.temporary_paddle_guard.reset();
        self.tally = EffectTally::default();
        self.time_ticks = 0;

        self.temporary_paddle = None;
        self.secondary_balls.clear();
        self.falling_hearts.clear();

        self.paddle = Paddle::main(self.field_size());
        self.spawn_primary_ball();
        self.build_bricks();
        self.build_life_hearts();
        self.life_counter = LifeCounter::new(self.lives);

        log::info!(
            "Round {} started: {}x{} bricks, {} lives, {} double effects assigned",
            self.round,
            self.settings.brick_rows,
            self.settings.brick_cols,
            self.lives,
            self.double_effect_count.value()
        );
    }

    /// Start the next round from scratch after "play again?"
    pub fn restart(&mut self) {
        self.round += 1;
        self.reset_round();
    }

    /// Random diagonal launch: (±speed, ±speed)
    fn launch_velocity(&mut self, speed: f32) -> Vec2 {
        let mut vel = Vec2::splat(speed);
        if self.rng.random_bool(0.5) {
            vel.x = -vel.x;
        }
        if self.rng.random_bool(0.5) {
            vel.y = -vel.y;
        }
        vel
    }

    fn spawn_primary_ball(&mut self) {
        let id = self.next_entity_id();
        let vel = self.launch_velocity(self.settings.ball_speed);
        self.ball = Ball::primary(id, self.field_center(), vel);
    }

    /// Lay out the brick grid, assigning each brick its effect up front
    fn build_bricks(&mut self) {
        self.bricks = Vec::with_capacity(self.settings.brick_count());
        self.double_effect_count.reset();

        let brick_width = self.settings.brick_width();
        let size = Vec2::new(brick_width, BRICK_HEIGHT);

        for row in 0..self.settings.brick_rows {
            for col in 0..self.settings.brick_cols {
                let pos = Vec2::new(
                    col as f32 * (brick_width + BRICK_GAP) + BRICK_GAP + BORDER_WIDTH,
                    row as f32 * (BRICK_HEIGHT + BRICK_GAP) + BRICK_GAP + BORDER_WIDTH,
                );
                let effect = self
                    .selector
                    .select(&mut self.double_effect_count, &mut self.rng);
                let id = self.next_entity_id();
                self.bricks.push(Brick {
                    id,
                    pos,
                    size,
                    effect,
                });
            }
        }

        self.bricks_remaining = self.bricks.len();
    }

    fn build_life_hearts(&mut self) {
        self.life_hearts.clear();
        for slot in 0..self.lives {
            let id = self.next_entity_id();
            self.life_hearts
                .push(Heart::indicator(id, slot, self.settings.window_height));
        }
    }

    // === Effect-facing mutators ===

    /// Apply one effect mutation
    pub fn apply_mutation(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::SpawnFallingHeart { at } => {
                self.spawn_falling_heart(at);
            }
            Mutation::SpawnSecondaryBall { at, vel } => self.spawn_secondary_ball(at, vel),
            Mutation::SpawnTemporaryPaddle => {
                self.spawn_temporary_paddle();
            }
            Mutation::EngageTurbo { factor } => {
                self.engage_turbo(factor);
            }
        }
    }

    /// Drop a heart from `at`; nothing spawns while lives are at max
    pub fn spawn_falling_heart(&mut self, at: Vec2) -> bool {
        if self.lives >= self.settings.max_lives {
            log::debug!("Heart not spawned: lives already at {}", self.lives);
            return false;
        }
        let id = self.next_entity_id();
        self.falling_hearts.push(Heart::falling(id, at));
        true
    }

    pub fn spawn_secondary_ball(&mut self, at: Vec2, vel: Vec2) {
        let id = self.next_entity_id();
        self.secondary_balls.push(Ball::secondary(id, at, vel));
    }

    /// Spawn the temporary paddle in the middle of the field, unless one exists
    pub fn spawn_temporary_paddle(&mut self) -> bool {
        if !self.temporary_paddle_guard.is_zero() {
            log::debug!("Temporary paddle not spawned: one is already active");
            return false;
        }
        let id = self.next_entity_id();
        let center = self.field_center();
        self.temporary_paddle = Some(TemporaryPaddle::new(
            id,
            center,
            self.settings.temporary_paddle_hits,
        ));
        self.temporary_paddle_guard.increment();
        log::info!("Temporary paddle spawned");
        true
    }

    /// Speed up the primary ball, unless turbo is already on
    pub fn engage_turbo(&mut self, factor: f32) -> bool {
        if self.turbo {
            log::debug!("Turbo already active");
            return false;
        }
        self.ball.vel *= factor;
        self.ball.look = BallLook::Turbo;
        self.ball.turbo_hits = 0;
        self.turbo = true;
        log::info!("Turbo engaged (x{})", factor);
        true
    }

    /// Return the primary ball to baseline speed and look
    pub fn expire_turbo(&mut self) {
        let speed = self.settings.ball_speed * std::f32::consts::SQRT_2;
        self.ball.vel = match self.ball.vel.try_normalize() {
            Some(dir) => dir * speed,
            None => self.launch_velocity(self.settings.ball_speed),
        };
        self.ball.look = BallLook::Normal;
        self.ball.turbo_hits = 0;
        self.turbo = false;
        log::info!("Turbo expired");
    }

    // === Collision callbacks ===

    /// Destroy a brick and fire its effect; false if it was already gone
    pub fn on_brick_impact(&mut self, brick_id: u32, at: Vec2) -> bool {
        let Some(idx) = self.bricks.iter().position(|b| b.id == brick_id) else {
            log::debug!("Brick {} already destroyed", brick_id);
            return false;
        };
        let brick = self.bricks.remove(idx);
        self.bricks_remaining = self.bricks_remaining.saturating_sub(1);

        let mut ctx = EffectContext {
            rng: &mut self.rng,
            selector: self.selector,
            double_count: &mut self.double_effect_count,
            puck_speed: self.settings.ball_speed,
            turbo_factor: self.settings.turbo_factor,
            fired: Vec::new(),
        };
        let mutations = brick.effect.resolve(at, &mut ctx);
        let fired = ctx.fired;

        log::debug!(
            "Brick {} destroyed ({} left), effect {}",
            brick.id,
            self.bricks_remaining,
            brick.effect.name()
        );
        for effect in fired {
            self.tally.record(effect);
        }
        for mutation in mutations {
            self.apply_mutation(mutation);
        }
        true
    }

    /// The primary ball hit something: count it toward turbo expiry
    pub fn on_primary_ball_impact(&mut self) {
        if !self.turbo {
            return;
        }
        self.ball.turbo_hits += 1;
        if self.ball.turbo_hits >= self.settings.turbo_impact_limit {
            self.expire_turbo();
        }
    }

    /// A ball hit the temporary paddle
    pub fn on_temporary_paddle_impact(&mut self) {
        let Some(paddle) = self.temporary_paddle.as_mut() else {
            return;
        };
        if paddle.absorb_hit() {
            self.temporary_paddle = None;
            self.temporary_paddle_guard.reset();
            log::info!("Temporary paddle worn out");
        }
    }

    /// The main paddle caught a falling heart
    pub fn collect_heart(&mut self, heart_id: u32) -> bool {
        let Some(idx) = self.falling_hearts.iter().position(|h| h.id == heart_id) else {
            return false;
        };
        self.falling_hearts.remove(idx);
        self.add_life();
        self.life_counter.refresh(self.lives);
        true
    }

    // === Lives ===

    /// Gain a life and its HUD heart, capped at max
    pub fn add_life(&mut self) -> bool {
        if self.lives >= self.settings.max_lives {
            return false;
        }
        let id = self.next_entity_id();
        self.life_hearts
            .push(Heart::indicator(id, self.lives, self.settings.window_height));
        self.lives += 1;
        log::info!("Life gained ({} lives)", self.lives);
        true
    }

    /// Lose a life and its HUD heart
    pub fn lose_life(&mut self) {
        if self.lives == 0 {
            return;
        }
        self.lives -= 1;
        self.life_hearts.pop();
        self.life_counter.refresh(self.lives);
    }

    // === Per-frame lifecycle ===

    /// Reconcile lifecycle after the frame's collisions
    ///
    /// Order: sweep off-field pucks and hearts, handle the primary ball
    /// falling through, then check for the end of the round.
    pub fn update(&mut self, force_win: bool) -> RoundPhase {
        if self.phase != RoundPhase::Playing {
            return self.phase;
        }

        let bottom = self.settings.window_height;
        self.secondary_balls.retain(|b| b.pos.y <= bottom);
        self.falling_hearts.retain(|h| h.center().y <= bottom);

        if self.ball.pos.y > bottom {
            self.handle_ball_fall();
        }

        self.phase = if self.lives == 0 {
            RoundPhase::Lost
        } else if self.bricks_remaining == 0 || force_win {
            RoundPhase::Won
        } else {
            RoundPhase::Playing
        };

        if self.phase != RoundPhase::Playing {
            log::info!(
                "Round {} over: {:?} with {} lives, {} bricks left",
                self.round,
                self.phase,
                self.lives,
                self.bricks_remaining
            );
        }
        self.phase
    }

    /// Primary ball fell through the bottom: lose a life and relaunch
    fn handle_ball_fall(&mut self) {
        self.lose_life();

        let speed = if self.turbo {
            self.settings.ball_speed * self.settings.turbo_factor
        } else {
            self.settings.ball_speed
        };
        // Relaunch from the field center even when the temporary paddle sits
        // there: the first contact costs that paddle a hit
        self.ball.pos = self.field_center();
        self.ball.vel = self.launch_velocity(speed);
        self.ball.look = BallLook::Normal;
        self.ball.turbo_hits = 0;
        self.turbo = false;

        log::info!("Ball lost, {} lives left", self.lives);
    }

    /// Ask to play again after a finished round
    ///
    /// Returns true if a new round started, false if the player quit.
    pub fn resolve_round_end(&mut self, prompt: &mut dyn Prompt) -> bool {
        let message = match self.phase {
            RoundPhase::Playing => return true,
            RoundPhase::Won => "You win! Play again?",
            RoundPhase::Lost => "Game Over! Play again?",
        };
        if prompt.ask_yes_no(message) {
            self.restart();
            true
        } else {
            prompt.close();
            false
        }
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            round: self.round,
            seed: self.seed,
            phase: self.phase,
            lives: self.lives,
            bricks_remaining: self.bricks_remaining,
            frames: self.time_ticks,
            effects: self.tally.clone(),
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            round: self.round,
            phase: self.phase,
            lives: self.lives,
            bricks_remaining: self.bricks_remaining,
            turbo: self.turbo,
            double_effect_count: self.double_effect_count.value(),
            temporary_paddle_guard: self.temporary_paddle_guard.value(),
            ball: &self.ball,
            paddle: &self.paddle,
            temporary_paddle: self.temporary_paddle.as_ref(),
            secondary_balls: &self.secondary_balls,
            falling_hearts: &self.falling_hearts,
            life_counter: &self.life_counter,
            bricks: &self.bricks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::HudColor;
    use crate::platform::ScriptedPrompt;
    use proptest::prelude::*;

    fn new_state() -> GameState {
        GameState::new(Settings::default(), 12345)
    }

    fn single_brick_state(effect: Effect) -> GameState {
        let mut state = GameState::new(Settings::with_grid(1, 1), 1);
        state.bricks[0].effect = effect;
        state
    }

    #[test]
    fn test_new_round_layout() {
        let state = new_state();
        assert_eq!(state.phase, RoundPhase::Playing);
        assert_eq!(state.bricks.len(), 56);
        assert_eq!(state.bricks_remaining, 56);
        assert_eq!(state.lives, 5);
        assert_eq!(state.life_hearts.len(), 5);
        assert_eq!(state.life_counter.text, "5");
        assert_eq!(state.ball.pos, Vec2::new(500.0, 350.0));
        assert_eq!(state.ball.vel.abs(), Vec2::splat(200.0));
        assert_eq!(state.paddle.center(), Vec2::new(500.0, 670.0));
        assert!(state.temporary_paddle.is_none());
        assert!(state.temporary_paddle_guard.is_zero());
    }

    #[test]
    fn test_brick_grid_geometry() {
        let state = new_state();
        assert_eq!(state.bricks[0].pos, Vec2::new(7.0, 7.0));
        assert_eq!(state.bricks[0].size, Vec2::new(121.0, 15.0));
        assert_eq!(state.bricks[1].pos, Vec2::new(130.0, 7.0));
        // Second row starts one brick height plus a gap lower
        assert_eq!(state.bricks[8].pos, Vec2::new(7.0, 24.0));
    }

    #[test]
    fn test_life_hearts_layout() {
        let state = new_state();
        assert_eq!(state.life_hearts[0].pos, Vec2::new(40.0, 680.0));
        assert_eq!(state.life_hearts[2].pos, Vec2::new(90.0, 680.0));
    }

    #[test]
    fn test_heart_spawn_is_noop_at_max_lives() {
        let mut state = new_state();
        assert!(!state.spawn_falling_heart(Vec2::new(100.0, 100.0)));
        assert!(state.falling_hearts.is_empty());

        state.lose_life();
        assert!(state.spawn_falling_heart(Vec2::new(100.0, 100.0)));
        assert_eq!(state.falling_hearts.len(), 1);
        assert_eq!(state.falling_hearts[0].center(), Vec2::new(100.0, 100.0));
        assert_eq!(state.falling_hearts[0].vel, Vec2::new(0.0, HEART_FALL_SPEED));
    }

    #[test]
    fn test_collect_heart_adds_exactly_one_life() {
        let mut state = new_state();
        state.lose_life();
        state.lose_life();
        assert_eq!(state.lives, 3);
        assert!(state.spawn_falling_heart(Vec2::new(300.0, 300.0)));
        let heart_id = state.falling_hearts[0].id;

        assert!(state.collect_heart(heart_id));
        assert_eq!(state.lives, 4);
        assert!(state.falling_hearts.is_empty());
        assert_eq!(state.life_hearts.len(), 4);
        assert_eq!(state.life_hearts[3].pos.x, 40.0 + 3.0 * 25.0);
        assert_eq!(state.life_counter.text, "4");
        assert_eq!(state.life_counter.color, HudColor::Green);

        // Gone already
        assert!(!state.collect_heart(heart_id));
        assert_eq!(state.lives, 4);
    }

    #[test]
    fn test_collect_heart_at_max_only_removes_heart() {
        let mut state = new_state();
        state.lose_life();
        state.spawn_falling_heart(Vec2::new(300.0, 300.0));
        assert!(state.add_life());
        let heart_id = state.falling_hearts[0].id;

        assert!(state.collect_heart(heart_id));
        assert_eq!(state.lives, 5);
        assert_eq!(state.life_hearts.len(), 5);
        assert!(state.falling_hearts.is_empty());
    }

    #[test]
    fn test_temporary_paddle_single_instance() {
        let mut state = new_state();
        state.apply_mutation(Mutation::SpawnTemporaryPaddle);
        state.apply_mutation(Mutation::SpawnTemporaryPaddle);

        assert_eq!(state.temporary_paddle_guard.value(), 1);
        let paddle = state.temporary_paddle.as_ref().unwrap();
        assert_eq!(paddle.paddle.center(), Vec2::new(500.0, 350.0));
        assert_eq!(paddle.paddle.tag, PaddleTag::Temporary);
        assert_eq!(paddle.hits_remaining, TEMPORARY_PADDLE_HITS);
    }

    #[test]
    fn test_temporary_paddle_effect_twice_spawns_one() {
        let mut state = single_brick_state(Effect::TemporaryPaddle);
        let first = state.bricks[0].id;
        state.on_brick_impact(first, Vec2::ZERO);
        assert!(state.temporary_paddle.is_some());
        let paddle_id = state.temporary_paddle.as_ref().unwrap().id;

        state.apply_mutation(Mutation::SpawnTemporaryPaddle);
        assert_eq!(state.temporary_paddle.as_ref().unwrap().id, paddle_id);
        assert_eq!(state.temporary_paddle_guard.value(), 1);
    }

    #[test]
    fn test_temporary_paddle_wears_out() {
        let mut state = new_state();
        assert!(state.spawn_temporary_paddle());
        for _ in 0..3 {
            state.on_temporary_paddle_impact();
        }
        assert_eq!(state.temporary_paddle.as_ref().unwrap().hits_remaining, 1);

        state.on_temporary_paddle_impact();
        assert!(state.temporary_paddle.is_none());
        assert!(state.temporary_paddle_guard.is_zero());

        // Gate is open again
        assert!(state.spawn_temporary_paddle());
    }

    #[test]
    fn test_turbo_engages_once() {
        let mut state = new_state();
        let vel = state.ball.vel;
        assert!(state.engage_turbo(1.4));
        assert_eq!(state.ball.vel, vel * 1.4);
        assert_eq!(state.ball.look, BallLook::Turbo);

        assert!(!state.engage_turbo(1.4));
        assert_eq!(state.ball.vel, vel * 1.4);
    }

    #[test]
    fn test_turbo_expires_after_six_impacts() {
        let mut state = new_state();
        state.engage_turbo(TURBO_FACTOR);
        for _ in 0..5 {
            state.on_primary_ball_impact();
        }
        assert!(state.turbo);
        assert_eq!(state.ball.turbo_hits, 5);

        state.on_primary_ball_impact();
        assert!(!state.turbo);
        assert_eq!(state.ball.look, BallLook::Normal);
        assert!((state.ball.vel.length() - 200.0 * std::f32::consts::SQRT_2).abs() < 0.01);

        // Impacts without turbo are not counted
        state.on_primary_ball_impact();
        assert_eq!(state.ball.turbo_hits, 0);
    }

    #[test]
    fn test_ball_fall_costs_life_and_clears_turbo() {
        let mut state = new_state();
        state.engage_turbo(TURBO_FACTOR);
        state.on_primary_ball_impact();
        state.ball.pos.y = state.settings.window_height + 1.0;

        assert_eq!(state.update(false), RoundPhase::Playing);
        assert_eq!(state.lives, 4);
        assert_eq!(state.life_hearts.len(), 4);
        assert_eq!(state.life_counter.text, "4");
        assert!(!state.turbo);
        assert_eq!(state.ball.turbo_hits, 0);
        assert_eq!(state.ball.pos, state.field_center());
        // Relaunched at turbo speed since turbo was on when it fell
        assert!((state.ball.vel.abs() - Vec2::splat(280.0)).length() < 0.01);
    }

    #[test]
    fn test_last_life_lost_ends_round() {
        let settings = Settings {
            start_lives: 1,
            ..Settings::default()
        };
        let mut state = GameState::new(settings, 5);
        state.ball.pos.y = state.settings.window_height + 1.0;

        assert_eq!(state.update(false), RoundPhase::Lost);
        assert_eq!(state.lives, 0);
        assert!(state.life_hearts.is_empty());
        assert_eq!(state.life_counter.text, "0");
    }

    #[test]
    fn test_low_starting_lives_color_the_counter() {
        let settings = Settings {
            start_lives: 1,
            ..Settings::default()
        };
        let state = GameState::new(settings, 1);
        assert_eq!(state.life_counter.color, HudColor::Red);

        let settings = Settings {
            start_lives: 2,
            ..Settings::default()
        };
        let state = GameState::new(settings, 1);
        assert_eq!(state.life_counter.color, HudColor::Yellow);
    }

    #[test]
    fn test_clearing_the_grid_wins() {
        let mut state = single_brick_state(Effect::None);
        let id = state.bricks[0].id;
        let at = state.bricks[0].center();

        assert!(state.on_brick_impact(id, at));
        assert_eq!(state.bricks_remaining, 0);
        assert!(state.bricks.is_empty());
        assert_eq!(state.update(false), RoundPhase::Won);
    }

    #[test]
    fn test_force_win() {
        let mut state = new_state();
        assert_eq!(state.update(true), RoundPhase::Won);
        // Terminal phases stay put
        assert_eq!(state.update(false), RoundPhase::Won);
    }

    #[test]
    fn test_brick_effect_fires_once() {
        let mut state = single_brick_state(Effect::ExtraBall);
        let id = state.bricks[0].id;
        assert!(state.on_brick_impact(id, Vec2::new(50.0, 50.0)));
        assert!(!state.on_brick_impact(id, Vec2::new(50.0, 50.0)));

        assert_eq!(state.secondary_balls.len(), 2);
        assert_eq!(state.tally.extra_ball, 1);
        assert!(state.secondary_balls.iter().all(|b| b.look == BallLook::Puck));
    }

    #[test]
    fn test_turbo_brick_speeds_up_ball() {
        let mut state = single_brick_state(Effect::Turbo);
        let vel = state.ball.vel;
        let id = state.bricks[0].id;
        state.on_brick_impact(id, Vec2::ZERO);
        assert!(state.turbo);
        assert_eq!(state.ball.vel, vel * TURBO_FACTOR);
    }

    #[test]
    fn test_double_brick_fires_two_effects() {
        for seed in 0..50 {
            let mut state = GameState::new(Settings::with_grid(1, 1), seed);
            state.bricks[0].effect = Effect::Double;
            state.double_effect_count = Counter::new(2);
            let id = state.bricks[0].id;
            state.on_brick_impact(id, Vec2::new(400.0, 50.0));

            let tally = &state.tally;
            let total = tally.none
                + tally.extra_life
                + tally.extra_ball
                + tally.temporary_paddle
                + tally.turbo
                + tally.double;
            assert_eq!(tally.double, 1);
            assert_eq!(total, 3);
        }
    }

    #[test]
    fn test_sweep_removes_off_field_entities() {
        let mut state = new_state();
        let bottom = state.settings.window_height;
        state.spawn_secondary_ball(Vec2::new(100.0, bottom + 5.0), Vec2::new(0.0, 100.0));
        state.spawn_secondary_ball(Vec2::new(100.0, 200.0), Vec2::new(0.0, 100.0));
        state.lose_life();
        state.spawn_falling_heart(Vec2::new(100.0, bottom + 5.0));

        state.update(false);
        assert_eq!(state.secondary_balls.len(), 1);
        assert!(state.falling_hearts.is_empty());
        // Pucks falling out never cost a life
        assert_eq!(state.lives, 4);
    }

    #[test]
    fn test_play_again_resets_round() {
        let mut state = new_state();
        state.lose_life();
        state.lose_life();
        state.engage_turbo(TURBO_FACTOR);
        state.spawn_temporary_paddle();
        state.spawn_secondary_ball(Vec2::ZERO, Vec2::ZERO);
        let first = state.bricks[0].id;
        state.on_brick_impact(first, Vec2::ZERO);
        state.update(true);

        let mut prompt = ScriptedPrompt::new([true]);
        assert!(state.resolve_round_end(&mut prompt));
        assert_eq!(prompt.asked, vec!["You win! Play again?"]);

        assert_eq!(state.round, 2);
        assert_eq!(state.phase, RoundPhase::Playing);
        assert_eq!(state.lives, 5);
        assert_eq!(state.life_hearts.len(), 5);
        assert_eq!(state.bricks_remaining, 56);
        assert!(!state.turbo);
        assert!(state.temporary_paddle.is_none());
        assert!(state.temporary_paddle_guard.is_zero());
        assert!(state.secondary_balls.is_empty());
        assert_eq!(state.tally, EffectTally::default());
    }

    #[test]
    fn test_declining_closes_window() {
        let settings = Settings {
            start_lives: 1,
            ..Settings::default()
        };
        let mut state = GameState::new(settings, 5);
        state.lose_life();
        state.update(false);

        let mut prompt = ScriptedPrompt::new([false]);
        assert!(!state.resolve_round_end(&mut prompt));
        assert_eq!(prompt.asked, vec!["Game Over! Play again?"]);
        assert!(prompt.closed);
        assert_eq!(state.round, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = new_state();
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"lives\":5"));
        let summary = serde_json::to_string(&state.summary()).unwrap();
        assert!(summary.contains("\"phase\":\"Playing\""));
    }

    proptest! {
        #[test]
        fn prop_grid_build_assigns_at_most_two_doubles(seed in any::<u64>(), rows in 1u32..12, cols in 1u32..12) {
            let state = GameState::new(Settings::with_grid(rows, cols), seed);
            let doubles = state.bricks.iter().filter(|b| b.effect == Effect::Double).count();
            prop_assert!(doubles <= 2);
            prop_assert_eq!(doubles as u32, state.double_effect_count.value());
            prop_assert_eq!(state.bricks_remaining, (rows * cols) as usize);
        }

        #[test]
        fn prop_round_invariants_hold(seed in any::<u64>(), ops in prop::collection::vec(0u8..7, 1..150)) {
            let mut state = GameState::new(Settings::with_grid(3, 4), seed);
            for op in ops {
                match op {
                    0 => {
                        state.ball.pos.y = state.settings.window_height + 1.0;
                    }
                    1 => {
                        let at = Vec2::new(200.0, 200.0);
                        if state.spawn_falling_heart(at) {
                            let id = state.falling_hearts[state.falling_hearts.len() - 1].id;
                            state.collect_heart(id);
                        }
                    }
                    2 => state.apply_mutation(Mutation::SpawnTemporaryPaddle),
                    3 => state.on_temporary_paddle_impact(),
                    4 => {
                        if let Some(brick) = state.bricks.first() {
                            let (id, at) = (brick.id, brick.center());
                            state.on_brick_impact(id, at);
                        }
                    }
                    5 => state.on_primary_ball_impact(),
                    _ => state.apply_mutation(Mutation::EngageTurbo { factor: TURBO_FACTOR }),
                }
                state.update(false);

                prop_assert!(state.lives <= state.settings.max_lives);
                prop_assert_eq!(state.life_hearts.len(), state.lives as usize);
                prop_assert!(state.temporary_paddle_guard.value() <= 1);
                prop_assert_eq!(state.temporary_paddle.is_some(), !state.temporary_paddle_guard.is_zero());
                prop_assert_eq!(state.bricks_remaining, state.bricks.len());
                prop_assert!(state.ball.turbo_hits < state.settings.turbo_impact_limit);

                if state.phase != RoundPhase::Playing {
                    state.restart();
                }
            }
        }
    }
}
