use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::config::LayoutConfig;
use super::geometry::{BracketDimensions, Connector, LayoutGeometry, SlotRect};
use crate::error::{BracketError, Result};
use crate::round::Round;

/// Slot count per round of a single-elimination tree, first round first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct BracketShape {
    rounds: Vec<usize>,
}

impl Default for BracketShape {
    fn default() -> Self {
        Self { rounds: Round::ALL.iter().map(|r| r.slot_count()).collect() }
    }
}

impl BracketShape {
    /// Each round must hold half the slots of the previous one, ending in 1.
    pub fn new(rounds: Vec<usize>) -> Result<Self> {
        match rounds.last() {
            None => return Err(BracketError::InvalidShape("no rounds".to_string())),
            Some(&last) if last != 1 => {
                return Err(BracketError::InvalidShape(format!("last round has {} slots, expected 1", last)))
            }
            Some(_) => {}
        }
        for (i, pair) in rounds.windows(2).enumerate() {
            if pair[0] != pair[1] * 2 {
                return Err(BracketError::InvalidShape(format!(
                    "round {} has {} slots but round {} has {}",
                    i, pair[0], i + 1, pair[1]
                )));
            }
        }
        Ok(Self { rounds })
    }

    /// Shape for `slots` first-round matches (a power of two).
    pub fn from_first_round(slots: usize) -> Result<Self> {
        if slots == 0 || !slots.is_power_of_two() {
            return Err(BracketError::InvalidShape(format!("{} first-round slots is not a power of two", slots)));
        }
        let mut n = slots;
        let mut rounds = vec![n];
        while n > 1 {
            n /= 2;
            rounds.push(n);
        }
        Ok(Self { rounds })
    }

    pub fn rounds(&self) -> &[usize] {
        &self.rounds
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn total_slots(&self) -> usize {
        self.rounds.iter().sum()
    }

    /// Two feeders per slot outside the first round.
    pub fn connector_count(&self) -> usize {
        self.rounds.iter().skip(1).map(|n| n * 2).sum()
    }
}

impl TryFrom<Vec<usize>> for BracketShape {
    type Error = BracketError;

    fn try_from(rounds: Vec<usize>) -> Result<Self> {
        Self::new(rounds)
    }
}

impl From<BracketShape> for Vec<usize> {
    fn from(shape: BracketShape) -> Self {
        shape.rounds
    }
}

/// Pure layout over a validated config and shape.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    shape: BracketShape,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        Self::with_shape(config, BracketShape::default())
    }

    pub fn with_shape(config: LayoutConfig, shape: BracketShape) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, shape })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn shape(&self) -> &BracketShape {
        &self.shape
    }

    /// Rectangles for every slot, round-major.
    ///
    /// First-round slots stack at a fixed pitch below the header; every later
    /// slot is centred on the midpoint of its two feeders' centres.
    pub fn slot_positions(&self) -> Vec<SlotRect> {
        let c = &self.config;
        let mut rects: Vec<SlotRect> = Vec::with_capacity(self.shape.total_slots());
        let mut previous: Vec<SlotRect> = Vec::new();

        for (round, &count) in self.shape.rounds().iter().enumerate() {
            let x = c.horizontal_padding + round as f64 * c.round_pitch();
            let current: Vec<SlotRect> = (0..count)
                .map(|slot| {
                    let y = if round == 0 {
                        c.header_offset + slot as f64 * c.slot_pitch()
                    } else {
                        let upper = &previous[slot * 2];
                        let lower = &previous[slot * 2 + 1];
                        (upper.center_y() + lower.center_y()) / 2.0 - c.slot_height / 2.0
                    };
                    SlotRect { round, slot, x, y, width: c.slot_width, height: c.slot_height }
                })
                .collect();
            rects.extend_from_slice(&current);
            previous = current;
        }
        rects
    }

    pub fn connector_path(&self, from: &SlotRect, to: &SlotRect) -> Connector {
        Connector::between(from, to, self.config.round_gap)
    }

    pub fn all_connectors(&self, positions: &[SlotRect]) -> Vec<Connector> {
        compute_all_connectors(positions, &self.config)
    }

    pub fn dimensions(&self, positions: &[SlotRect]) -> BracketDimensions {
        compute_bracket_dimensions(positions, &self.config)
    }

    pub fn layout(&self) -> LayoutGeometry {
        let slots = self.slot_positions();
        let connectors = self.all_connectors(&slots);
        let dimensions = self.dimensions(&slots);
        log::debug!(
            "Layout: {} slots, {} connectors, {}x{}",
            slots.len(),
            connectors.len(),
            dimensions.width,
            dimensions.height
        );
        LayoutGeometry { slots, connectors, dimensions }
    }
}

pub fn compute_slot_positions(config: &LayoutConfig) -> Result<Vec<SlotRect>> {
    Ok(LayoutEngine::new(*config)?.slot_positions())
}

pub fn compute_connector_path(from: &SlotRect, to: &SlotRect, config: &LayoutConfig) -> Connector {
    Connector::between(from, to, config.round_gap)
}

/// One connector from each feeder into every slot past the first round.
/// Feeders missing from `positions` are skipped.
pub fn compute_all_connectors(positions: &[SlotRect], config: &LayoutConfig) -> Vec<Connector> {
    let by_key: HashMap<(usize, usize), &SlotRect> = positions.iter().map(|r| ((r.round, r.slot), r)).collect();

    let mut connectors = Vec::new();
    for to in positions.iter().filter(|r| r.round > 0) {
        for feeder in [to.slot * 2, to.slot * 2 + 1] {
            if let Some(from) = by_key.get(&(to.round - 1, feeder)) {
                connectors.push(Connector::between(from, to, config.round_gap));
            }
        }
    }
    connectors
}

/// Canvas size: furthest right edge and bottom edge plus padding.
pub fn compute_bracket_dimensions(positions: &[SlotRect], config: &LayoutConfig) -> BracketDimensions {
    if positions.is_empty() {
        return BracketDimensions::default();
    }
    let right = positions.iter().map(SlotRect::right).fold(f64::MIN, f64::max);
    let bottom = positions.iter().map(SlotRect::bottom).fold(f64::MIN, f64::max);
    BracketDimensions {
        width: right + config.horizontal_padding,
        height: bottom + config.vertical_padding,
    }
}

pub fn compute_layout(config: &LayoutConfig) -> Result<LayoutGeometry> {
    Ok(LayoutEngine::new(*config)?.layout())
}
