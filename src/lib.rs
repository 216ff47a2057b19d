//! Bricker - rule engine for a brick-breaking arcade game
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (effects, counters, lifecycle)
//! - `hud`: Numeric life counter shown next to the life hearts
//! - `platform`: Window/dialog abstraction (play-again prompt)
//! - `settings`: Tunable round configuration

pub mod hud;
pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one update per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Window dimensions
    pub const WINDOW_WIDTH: f32 = 1000.0;
    pub const WINDOW_HEIGHT: f32 = 700.0;

    /// Borders sit just outside the left, right and top edges
    pub const BORDER_WIDTH: f32 = 5.0;
    pub const BORDER_OUTSIDE_FRAME: f32 = 200.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    pub const PADDLE_GAP_FROM_BOTTOM: f32 = 30.0;
    pub const PADDLE_SPEED: f32 = 400.0;

    /// Brick grid defaults
    pub const BRICK_HEIGHT: f32 = 15.0;
    pub const BRICK_GAP: f32 = 2.0;
    pub const DEFAULT_BRICK_ROWS: u32 = 7;
    pub const DEFAULT_BRICK_COLS: u32 = 8;

    /// Lives
    pub const START_LIVES: u8 = 5;
    pub const MAX_LIVES: u8 = 5;

    /// Heart (life indicator and falling pickup)
    pub const HEART_SIZE: f32 = 20.0;
    pub const HEART_GAP: f32 = 5.0;
    pub const HEART_BORDER_OFFSET: f32 = 40.0;
    pub const HEART_FALL_SPEED: f32 = 100.0;

    /// Ball defaults (speed is per axis: launch velocity is (±speed, ±speed))
    pub const BALL_SIZE: f32 = 20.0;
    pub const BALL_SPEED: f32 = 200.0;
    /// Secondary "puck" balls are smaller than the primary ball
    pub const PUCK_SIZE_RATIO: f32 = 0.75;

    /// Turbo multiplies the primary ball velocity
    pub const TURBO_FACTOR: f32 = 1.4;
    /// Primary ball impacts before turbo wears off
    pub const TURBO_IMPACT_LIMIT: u32 = 6;

    /// Hits a temporary paddle absorbs before disappearing
    pub const TEMPORARY_PADDLE_HITS: u32 = 4;

    /// Double effect draws allowed per brick grid build
    pub const DOUBLE_EFFECT_CAP: u32 = 2;
}

/// Center of an axis-aligned box given its top-left corner and size
#[inline]
pub fn box_center(top_left: Vec2, size: Vec2) -> Vec2 {
    top_left + size * 0.5
}

/// Top-left corner of an axis-aligned box given its center and size
#[inline]
pub fn box_top_left(center: Vec2, size: Vec2) -> Vec2 {
    center - size * 0.5
}
