//! Round settings
//!
//! Loaded from an optional JSON file, then overridden from the command line.
//! Every field has a default matching the classic game, so a partial file is fine.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable round configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Grid ===
    /// Brick grid row count
    pub brick_rows: u32,
    /// Brick grid column count
    pub brick_cols: u32,

    // === Field ===
    pub window_width: f32,
    pub window_height: f32,

    // === Lives ===
    pub start_lives: u8,
    pub max_lives: u8,

    // === Ball ===
    /// Per-axis launch speed of the primary ball (pixels/s)
    pub ball_speed: f32,
    /// Velocity multiplier applied by the turbo effect
    pub turbo_factor: f32,
    /// Primary ball impacts before turbo wears off
    pub turbo_impact_limit: u32,

    // === Effects ===
    /// Hits a temporary paddle absorbs
    pub temporary_paddle_hits: u32,
    /// Double effect draws allowed per grid build
    pub double_effect_cap: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brick_rows: DEFAULT_BRICK_ROWS,
            brick_cols: DEFAULT_BRICK_COLS,

            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,

            start_lives: START_LIVES,
            max_lives: MAX_LIVES,

            ball_speed: BALL_SPEED,
            turbo_factor: TURBO_FACTOR,
            turbo_impact_limit: TURBO_IMPACT_LIMIT,

            temporary_paddle_hits: TEMPORARY_PADDLE_HITS,
            double_effect_cap: DOUBLE_EFFECT_CAP,
        }
    }
}

impl Settings {
    /// Default settings with a custom brick grid
    pub fn with_grid(rows: u32, cols: u32) -> Self {
        Self {
            brick_rows: rows,
            brick_cols: cols,
            ..Self::default()
        }
    }

    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json).context("malformed settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        let settings = Self::from_json(&json)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject configurations the round lifecycle cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(self.brick_rows > 0, "brick_rows must be positive");
        ensure!(self.brick_cols > 0, "brick_cols must be positive");
        ensure!(self.max_lives > 0, "max_lives must be positive");
        ensure!(
            self.start_lives > 0 && self.start_lives <= self.max_lives,
            "start_lives must be in 1..={} (got {})",
            self.max_lives,
            self.start_lives
        );
        ensure!(
            self.window_width > 2.0 * BORDER_WIDTH + PADDLE_WIDTH && self.window_height > 0.0,
            "window is too small ({}x{})",
            self.window_width,
            self.window_height
        );
        ensure!(
            self.brick_width() >= 1.0,
            "{} columns do not fit in a {} px wide window",
            self.brick_cols,
            self.window_width
        );
        ensure!(self.ball_speed > 0.0, "ball_speed must be positive");
        ensure!(self.turbo_factor > 0.0, "turbo_factor must be positive");
        ensure!(self.turbo_impact_limit > 0, "turbo_impact_limit must be positive");
        ensure!(
            self.temporary_paddle_hits > 0,
            "temporary_paddle_hits must be positive"
        );
        Ok(())
    }

    /// Total number of bricks in a freshly built grid
    pub fn brick_count(&self) -> usize {
        self.brick_rows as usize * self.brick_cols as usize
    }

    /// Brick width in whole pixels: the row spans the window minus the
    /// gaps and both borders
    pub fn brick_width(&self) -> f32 {
        let cols = self.brick_cols.max(1) as f32;
        ((self.window_width - BRICK_GAP * cols - 1.0 - 2.0 * BORDER_WIDTH) / cols).floor()
    }
}
