//! Bracket layout: slot rectangles, orthogonal connectors and canvas size.
//!
//! ```text
//!  R32        R16        QF
//! ┌────┐
//! │ 0  ├──┐
//! └────┘  │  ┌────┐
//!         ├──┤ 0  ├──┐
//! ┌────┐  │  └────┘  │
//! │ 1  ├──┘          │
//! └────┘             ├── ...
//! ```
//!
//! Output is pure geometry; nothing here knows about teams.

mod config;
mod engine;
mod geometry;

pub use config::LayoutConfig;
pub use engine::{
    compute_all_connectors, compute_bracket_dimensions, compute_connector_path, compute_layout,
    compute_slot_positions, BracketShape, LayoutEngine,
};
pub use geometry::{BracketDimensions, Connector, LayoutGeometry, Point, SlotRect};
