//! Layout dimensions in canvas units.

use serde::{Deserialize, Serialize};

use crate::error::{BracketError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub slot_width: f64,
    pub slot_height: f64,
    /// Horizontal space between adjacent rounds; connectors turn at its middle.
    pub round_gap: f64,
    /// Space below the lowest slot.
    pub vertical_padding: f64,
    /// Vertical gap between first-round slots.
    pub base_slot_gap: f64,
    /// Space above the first slot (round headers live here).
    pub header_offset: f64,
    /// Space left of the first round and right of the last.
    pub horizontal_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            slot_width: 130.0,
            slot_height: 60.0,
            round_gap: 50.0,
            vertical_padding: 20.0,
            base_slot_gap: 12.0,
            header_offset: 60.0,
            horizontal_padding: 20.0,
        }
    }
}

impl LayoutConfig {
    /// Dense layout for small viewports.
    pub fn compact() -> Self {
        Self {
            slot_width: 110.0,
            slot_height: 44.0,
            round_gap: 32.0,
            vertical_padding: 12.0,
            base_slot_gap: 8.0,
            header_offset: 40.0,
            horizontal_padding: 12.0,
        }
    }

    /// Roomy layout for posters and exports.
    pub fn spacious() -> Self {
        Self {
            slot_width: 160.0,
            slot_height: 72.0,
            round_gap: 72.0,
            vertical_padding: 32.0,
            base_slot_gap: 20.0,
            header_offset: 80.0,
            horizontal_padding: 32.0,
        }
    }

    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "standard" => Some(Self::default()),
            "compact" => Some(Self::compact()),
            "spacious" => Some(Self::spacious()),
            _ => None,
        }
    }

    fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("slot_width", self.slot_width),
            ("slot_height", self.slot_height),
            ("round_gap", self.round_gap),
            ("vertical_padding", self.vertical_padding),
            ("base_slot_gap", self.base_slot_gap),
            ("header_offset", self.header_offset),
            ("horizontal_padding", self.horizontal_padding),
        ]
    }

    /// Every dimension must be finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.fields() {
            if !value.is_finite() || value <= 0.0 {
                return Err(BracketError::InvalidConfiguration { field, value });
            }
        }
        Ok(())
    }

    /// Vertical distance between the tops of consecutive first-round slots.
    pub fn slot_pitch(&self) -> f64 {
        self.slot_height + self.base_slot_gap
    }

    /// Horizontal distance between the left edges of consecutive rounds.
    pub fn round_pitch(&self) -> f64 {
        self.slot_width + self.round_gap
    }
}
