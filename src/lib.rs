//! Two-Phase Cube Solver Library
//!
//! Solves arbitrary 3x3x3 Rubik's Cube positions with Kociemba's two-phase
//! algorithm: a coordinate-level cube model, precomputed move and pruning
//! tables (cached on disk), an iterative IDA* search, and a validator for
//! facelet input.

pub mod cache;
pub mod coord;
pub mod cubie;
pub mod facelet;
pub mod search;
pub mod tables;
pub mod verify;

pub use cubie::CubieCube;
pub use facelet::{Face, FaceCube};
pub use search::{solve, solve_cubie, Move, Solution, SolveOptions, SolveOutcome};
pub use tables::{TableError, Tables};
pub use verify::verify;

use thiserror::Error;

/// Everything that can be wrong with a cube given as input.
///
/// Structural checks report the first failure in a fixed order: facelet
/// shape, color counts, cubie conversion, edge permutation, edge flip,
/// corner permutation, corner twist, permutation parity.
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
pub enum CubeError {
    #[error("expected 54 facelets, got {0}")]
    WrongLength(usize),
    #[error("invalid facelet letter '{0}', expected one of U R F D L B")]
    InvalidFacelet(char),
    #[error("each of the six colors must appear exactly 9 times")]
    WrongColorCounts,
    #[error("facelets do not form any corner or edge cubie")]
    MalformedFacelets,
    #[error("not all 12 edges exist exactly once")]
    BadEdgePermutation,
    #[error("total edge flip is odd")]
    EdgeFlipError,
    #[error("not all 8 corners exist exactly once")]
    BadCornerPermutation,
    #[error("total corner twist is not a multiple of 3")]
    CornerTwistError,
    #[error("corner and edge permutation parities differ")]
    ParityError,
}
