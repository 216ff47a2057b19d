//! Numeric life counter
//!
//! The renderer draws `text` in `color` next to the life hearts.

use serde::{Deserialize, Serialize};

/// Text colors used by the life counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HudColor {
    Green,
    Yellow,
    Red,
}

/// Life count as displayed in the HUD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeCounter {
    pub text: String,
    pub color: HudColor,
}

impl LifeCounter {
    /// Counter for a fresh round, green unless the life count says otherwise
    pub fn new(lives: u8) -> Self {
        let mut counter = Self {
            text: lives.to_string(),
            color: HudColor::Green,
        };
        counter.refresh(lives);
        counter
    }

    /// Refresh text and color after the life count changed
    pub fn refresh(&mut self, lives: u8) {
        self.text = lives.to_string();
        // Counts outside 1..=4 keep whatever color they had
        match lives {
            3 | 4 => self.color = HudColor::Green,
            2 => self.color = HudColor::Yellow,
            1 => self.color = HudColor::Red,
            _ => {}
        }
    }
}
