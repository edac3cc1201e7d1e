use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::round::{Round, SlotCoordinate};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Screen rectangle of one slot. `round` 0 is the first round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRect {
    pub round: usize,
    pub slot: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SlotRect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// `true` when the vertical extents share more than an edge.
    pub fn overlaps_vertically(&self, other: &SlotRect) -> bool {
        self.y < other.bottom() && other.y < self.bottom()
    }

    /// Coordinate in the standard 32-team bracket, if this rect belongs to it.
    pub fn coordinate(&self) -> Option<SlotCoordinate> {
        let round = Round::from_index(self.round)?;
        SlotCoordinate::new(round, u8::try_from(self.slot).ok()?)
    }
}

/// Three-segment orthogonal line from a feeder slot into its destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub from_round: usize,
    pub from_slot: usize,
    pub to_round: usize,
    pub to_slot: usize,
    /// Start, first bend, second bend, end.
    pub points: [Point; 4],
    /// SVG path, `M x y H x V y H x`.
    pub path_data: String,
}

impl Connector {
    pub(crate) fn between(from: &SlotRect, to: &SlotRect, round_gap: f64) -> Self {
        let start = Point { x: from.right(), y: from.center_y() };
        let mid_x = from.right() + round_gap / 2.0;
        let end = Point { x: to.x, y: to.center_y() };
        let points = [start, Point { x: mid_x, y: start.y }, Point { x: mid_x, y: end.y }, end];

        let mut path_data = String::new();
        let _ = write!(path_data, "M {} {} H {} V {} H {}", start.x, start.y, mid_x, end.y, end.x);

        Self {
            from_round: from.round,
            from_slot: from.slot,
            to_round: to.round,
            to_slot: to.slot,
            points,
            path_data,
        }
    }

    /// Total drawn length.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1].x - w[0].x).abs() + (w[1].y - w[0].y).abs()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BracketDimensions {
    pub width: f64,
    pub height: f64,
}

/// Everything a renderer needs to draw an empty bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutGeometry {
    pub slots: Vec<SlotRect>,
    pub connectors: Vec<Connector>,
    pub dimensions: BracketDimensions,
}

impl LayoutGeometry {
    pub fn slot(&self, round: usize, slot: usize) -> Option<&SlotRect> {
        self.slots.iter().find(|r| r.round == round && r.slot == slot)
    }

    pub fn slot_at(&self, coord: SlotCoordinate) -> Option<&SlotRect> {
        self.slot(coord.round.index(), coord.slot as usize)
    }
}
