//! Most-likely bracket reconstruction.
//!
//! Aggregate statistics never contain a bracket: a team's most likely R32
//! slot, its most likely R16 slot and so on need not be mutually consistent.
//! The reconstructor turns the tables into one bracket that obeys the
//! tree:
//!
//! 1. Round-of-32 sides are filled by an [`AssignmentSolver`] (each team once).
//! 2. Each R32 winner is the side with the stronger evidence at its slot.
//! 3. Later winners are picked from the two feeder winners only, by the win
//!    count recorded at that exact slot.
//! 4. The chosen probabilities multiply into the joint probability.

mod assignment;
mod policy;
mod reconstructor;

#[cfg(test)]
mod reconstructor_tests;

pub use assignment::{
    solver_for, Assignment, AssignmentSolver, GreedySolver, HungarianSolver, WeightMatrix, PROBABILITY_FLOOR,
};
pub use policy::{EvidenceBasis, EvidencePolicy, ReconstructionConfig, SolverPolicy};
pub use reconstructor::{
    joint_probability, reconstruct, BracketReconstructor, R32Match, ReconstructedBracket, SlotPick,
};
