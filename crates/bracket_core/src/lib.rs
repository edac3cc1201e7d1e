//! # bracket_core - Knockout Bracket Statistics and Layout
//!
//! Turns aggregate results of many simulated single-elimination
//! tournaments into structures a renderer can draw directly.
//!
//! ## Features
//! - Participation / win / opponent / path statistics per bracket slot
//! - One consistent most-likely bracket (optimal or greedy Round-of-32 assignment)
//! - Tree-centred slot layout with orthogonal connectors
//! - Official match number ↔ slot lookup
//!
//! ## Example
//! ```
//! use bracket_core::{reconstruct, StatisticsAccumulator, TeamId, TrialOutcome};
//!
//! let entrants: [TeamId; 32] = std::array::from_fn(|i| TeamId(i as u16));
//! let mut acc = StatisticsAccumulator::new(entrants);
//! acc.record_trial(&TrialOutcome::from_entrants(&entrants, |_, home, _| home));
//! let stats = acc.finish();
//!
//! let bracket = reconstruct(&stats).unwrap();
//! assert_eq!(bracket.champion.map(|p| p.team_id), Some(TeamId(0)));
//! ```

// Doc formatting lints - purely cosmetic
#![allow(clippy::doc_lazy_continuation)]
// Plain data records are built with struct update syntax on purpose
#![allow(clippy::field_reassign_with_default)]
// Index loops over fixed-size bracket rounds read better than iterator chains
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod error;
pub mod layout;
pub mod reconstruct;
pub mod round;
pub mod slot_mapper;
pub mod stats;

pub use config::{load_config_file, BracketConfig};
pub use error::{BracketError, Result};
pub use layout::{compute_layout, LayoutConfig, LayoutEngine, LayoutGeometry};
pub use reconstruct::{
    reconstruct, BracketReconstructor, EvidencePolicy, ReconstructedBracket, ReconstructionConfig, SolverPolicy,
};
pub use round::{Round, SlotArena, SlotCoordinate, TeamId};
pub use slot_mapper::{MatchNumberTable, MatchPosition, SlotIndexMapper};
pub use stats::{BracketStatistics, StatisticsAccumulator, StatisticsBlob, TrialOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
